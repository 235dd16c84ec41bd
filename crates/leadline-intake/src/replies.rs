// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use leadline_config::model::RepliesConfig;
use leadline_core::{AvailabilityResult, CheckStatus};

/// Customer-facing summary of an availability result.
///
/// Returns `None` for a failed lookup; the agent follows up instead.
pub fn availability_reply(result: &AvailabilityResult, replies: &RepliesConfig) -> Option<String> {
    if matches!(result.status, CheckStatus::Error | CheckStatus::Pending) {
        return None;
    }

    let has_fiber = result
        .services
        .iter()
        .any(|s| s.to_lowercase().contains("fiber"));
    let text = if has_fiber && !result.fiber_speeds.is_empty() {
        replies
            .fiber_available
            .replace("{speeds}", &result.fiber_speeds.join(", "))
    } else if result.internet_air {
        replies.internet_air_available.clone()
    } else {
        replies.not_available.clone()
    };
    Some(text)
}
