// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for loading, validating, and diagnosing configuration.

use std::io::Write;

use leadline_config::model::{DeciderKind, SmsProvider};
use leadline_config::{load_and_validate_path, load_and_validate_str, ConfigError};
use serial_test::serial;

#[test]
fn empty_config_uses_defaults() {
    let config = load_and_validate_str("").unwrap();
    assert_eq!(config.agent.name, "leadline");
    assert_eq!(config.gateway.port, 3000);
    assert_eq!(config.sms.provider, SmsProvider::Log);
    assert_eq!(config.intake.decider, DeciderKind::Heuristic);
}

#[test]
fn full_production_config_loads() {
    let toml = r#"
[agent]
name = "dallas-store"
log_level = "debug"

[storage]
database_path = "/var/lib/leadline/crm.db"

[gateway]
host = "0.0.0.0"
port = 8080
bearer_token = "agent-token"
public_url = "https://crm.example.com"

[sms]
provider = "twilio"
from_number = "+1 214 555 0199"

[sms.twilio]
account_sid = "AC0123"
auth_token = "secret"
validate_signatures = true

[completion]
enabled = true
api_key = "nv-key"

[intake]
decider = "llm"
history_limit = 8

[availability]
endpoint_url = "http://127.0.0.1:9000/check"

[notify]
enabled = true
smtp_host = "smtp.example.com"
from = "alerts@example.com"
to = "sales@example.com"
"#;
    let config = load_and_validate_str(toml).unwrap();
    assert_eq!(config.gateway.port, 8080);
    assert!(config.sms.twilio.validate_signatures);
    assert_eq!(config.intake.decider, DeciderKind::Llm);
    assert_eq!(config.intake.history_limit, 8);
    assert_eq!(config.notify.smtp_port, 587);
}

#[test]
fn typo_produces_suggestion() {
    let toml = r#"
[gateway]
prot = 8080
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, .. }
            if key == "prot" && suggestion.as_deref() == Some("port"))
    });
    assert!(found, "expected unknown key `prot` with suggestion `port`: {errors:?}");
}

#[test]
fn wrong_type_is_reported() {
    let toml = r#"
[gateway]
port = "eighty"
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("port"))),
        "{errors:?}"
    );
}

#[test]
fn semantic_errors_surface_as_validation() {
    let toml = r#"
[sms]
provider = "telnyx"
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(errors
        .iter()
        .all(|e| matches!(e, ConfigError::Validation { .. })));
    assert_eq!(errors.len(), 2, "{errors:?}");
}

#[test]
#[serial]
fn file_on_disk_reports_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("leadline.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "[notify]\nenabeld = true").unwrap();

    let errors = load_and_validate_path(&path).unwrap_err();
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "enabeld");
            assert_eq!(suggestion.as_deref(), Some("enabled"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
