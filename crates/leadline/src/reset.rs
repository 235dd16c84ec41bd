// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadline reset` command implementation.

use leadline_config::LeadlineConfig;
use leadline_core::{LeadlineError, StorageAdapter};
use leadline_storage::SqliteStorage;

/// Bulk-delete conversation data. Customers are kept.
pub async fn run_reset(config: &LeadlineConfig, clear_addresses: bool) -> Result<(), LeadlineError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;

    let summary = storage.reset_conversations(clear_addresses).await;
    storage.close().await?;
    let summary = summary?;

    println!(
        "leadline reset: removed {} conversations, {} messages, {} availability checks",
        summary.conversations, summary.messages, summary.availability_checks
    );
    if clear_addresses {
        println!(
            "leadline reset: cleared addresses on {} customers",
            summary.addresses_cleared
        );
    }
    Ok(())
}
