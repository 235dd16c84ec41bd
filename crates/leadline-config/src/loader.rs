// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: `./leadline.toml` > `~/.config/leadline/leadline.toml` >
//! `/etc/leadline/leadline.toml`, with `LEADLINE_*` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::LeadlineConfig;

/// Local config file name, resolved against the working directory.
pub const LOCAL_CONFIG_FILE: &str = "leadline.toml";

/// System-wide config file.
pub const SYSTEM_CONFIG_FILE: &str = "/etc/leadline/leadline.toml";

/// Section prefixes recognized in environment variable names, longest first so
/// that `sms_twilio_` wins over `sms_`.
const ENV_SECTIONS: &[(&str, &str)] = &[
    ("intake_replies_", "intake.replies."),
    ("installations_", "installations."),
    ("sms_twilio_", "sms.twilio."),
    ("sms_telnyx_", "sms.telnyx."),
    ("rate_limit_", "rate_limit."),
    ("availability_", "availability."),
    ("completion_", "completion."),
    ("gateway_", "gateway."),
    ("storage_", "storage."),
    ("intake_", "intake."),
    ("notify_", "notify."),
    ("agent_", "agent."),
    ("sms_", "sms."),
];

/// User-level config path under the platform config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("leadline").join("leadline.toml"))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/leadline/leadline.toml`
/// 3. `~/.config/leadline/leadline.toml`
/// 4. `./leadline.toml`
/// 5. `LEADLINE_*` environment variables
pub fn load_config() -> Result<LeadlineConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from an inline TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<LeadlineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadlineConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LeadlineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadlineConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(LeadlineConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_FILE))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `LEADLINE_<SECTION>_<KEY>` to `section.key`.
///
/// Keys themselves contain underscores (`bearer_token`, `max_attempts`), so
/// `Env::split("_")` would be ambiguous; only a known section prefix at the
/// start of the name is turned into a dot.
fn env_provider() -> Env {
    Env::prefixed("LEADLINE_").map(|key| env_key_to_path(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env var name to a dotted config path.
pub fn env_key_to_path(key: &str) -> String {
    for (prefix, section) in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(prefix) {
            return format!("{section}{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(env_key_to_path("gateway_bearer_token"), "gateway.bearer_token");
        assert_eq!(env_key_to_path("sms_twilio_auth_token"), "sms.twilio.auth_token");
        assert_eq!(env_key_to_path("sms_max_attempts"), "sms.max_attempts");
        assert_eq!(env_key_to_path("rate_limit_window_secs"), "rate_limit.window_secs");
        assert_eq!(
            env_key_to_path("intake_replies_opt_out"),
            "intake.replies.opt_out"
        );
        assert_eq!(env_key_to_path("notify_smtp_host"), "notify.smtp_host");
        assert_eq!(
            env_key_to_path("installations_commission_amount"),
            "installations.commission_amount"
        );
    }

    #[test]
    fn unknown_section_passes_through() {
        assert_eq!(env_key_to_path("bogus_key"), "bogus_key");
    }

    #[test]
    fn env_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "leadline.toml",
                r#"
[gateway]
port = 4000
"#,
            )?;
            jail.set_env("LEADLINE_GATEWAY_PORT", "5000");
            jail.set_env("LEADLINE_SMS_TWILIO_ACCOUNT_SID", "AC999");

            let config = load_config_from_path(Path::new("leadline.toml"))?;
            assert_eq!(config.gateway.port, 5000);
            assert_eq!(config.sms.twilio.account_sid.as_deref(), Some("AC999"));
            Ok(())
        });
    }
}
