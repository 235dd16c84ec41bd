// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is a
//! startup error rather than a silently ignored setting.

use serde::{Deserialize, Serialize};

/// Top-level Leadline configuration.
///
/// Every section is optional and defaults to a runnable local setup: SQLite
/// under the user data dir, log-only SMS delivery, heuristic intent decisions.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LeadlineConfig {
    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP server for webhooks and the agent API.
    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Outbound SMS provider.
    #[serde(default)]
    pub sms: SmsConfig,

    /// LLM endpoint used by the `llm` decider.
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Inbound workflow behavior and reply templates.
    #[serde(default)]
    pub intake: IntakeConfig,

    /// Service-availability lookup endpoint.
    #[serde(default)]
    pub availability: AvailabilityConfig,

    /// Staff email alerts.
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Installation reminders and sale commissions.
    #[serde(default)]
    pub installations: InstallationsConfig,
}

/// Process identity and logging.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "leadline".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: true,
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("leadline").join("leadline.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("leadline.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_true() -> bool {
    true
}

/// HTTP gateway configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token for the `/v1` agent API. `None` rejects every API call.
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Externally visible base URL (e.g. `https://crm.example.com`), used to
    /// rebuild the signed URL for Twilio signature validation.
    #[serde(default)]
    pub public_url: Option<String>,

    /// Seconds a webhook waits for the intake pipeline before acknowledging.
    /// Work still running at the deadline continues in the background.
    #[serde(default = "default_webhook_timeout_secs")]
    pub webhook_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
            public_url: None,
            webhook_timeout_secs: default_webhook_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .field("public_url", &self.public_url)
            .field("webhook_timeout_secs", &self.webhook_timeout_secs)
            .finish()
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_webhook_timeout_secs() -> u64 {
    10
}

/// Fixed-window rate limiting for the agent API.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Requests allowed per client and path within one window.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

fn default_max_requests() -> u32 {
    100
}

fn default_window_secs() -> u64 {
    60
}

/// Which SMS provider delivers outbound messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SmsProvider {
    Twilio,
    Telnyx,
    /// Writes messages to the log instead of sending them.
    #[default]
    Log,
}

/// Outbound SMS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SmsConfig {
    #[serde(default)]
    pub provider: SmsProvider,

    /// Sending number, in any format accepted by phone normalization.
    #[serde(default)]
    pub from_number: Option<String>,

    /// Total delivery attempts for one message, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry; doubles on each further retry.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "default_sms_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub twilio: TwilioConfig,

    #[serde(default)]
    pub telnyx: TelnyxConfig,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            provider: SmsProvider::default(),
            from_number: None,
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            timeout_secs: default_sms_timeout_secs(),
            twilio: TwilioConfig::default(),
            telnyx: TelnyxConfig::default(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_sms_timeout_secs() -> u64 {
    15
}

/// Twilio credentials.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TwilioConfig {
    #[serde(default)]
    pub account_sid: Option<String>,

    #[serde(default)]
    pub auth_token: Option<String>,

    /// Reject webhooks whose `X-Twilio-Signature` does not verify.
    #[serde(default)]
    pub validate_signatures: bool,
}

impl std::fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[redacted]"))
            .field("validate_signatures", &self.validate_signatures)
            .finish()
    }
}

/// Telnyx credentials.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelnyxConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub messaging_profile_id: Option<String>,
}

impl std::fmt::Debug for TelnyxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelnyxConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("messaging_profile_id", &self.messaging_profile_id)
            .finish()
    }
}

/// OpenAI-compatible chat completion endpoint.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompletionConfig {
    #[serde(default)]
    pub enabled: bool,

    /// API key. Falls back to the `NVIDIA_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_completion_base_url")]
    pub base_url: String,

    #[serde(default = "default_completion_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_completion_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_completion_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            base_url: default_completion_base_url(),
            model: default_completion_model(),
            temperature: default_temperature(),
            max_tokens: default_completion_max_tokens(),
            timeout_secs: default_completion_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("enabled", &self.enabled)
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_completion_base_url() -> String {
    "https://integrate.api.nvidia.com/v1".to_string()
}

fn default_completion_model() -> String {
    "nvidia/llama-3.1-nemotron-70b-instruct".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_completion_max_tokens() -> u32 {
    1024
}

fn default_completion_timeout_secs() -> u64 {
    20
}

/// Strategy that turns an inbound message into an intent decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeciderKind {
    /// Regex address parser plus keyword classifier. No network calls.
    #[default]
    Heuristic,
    /// LLM classifier with the keyword classifier as fallback.
    Llm,
}

/// Inbound workflow configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IntakeConfig {
    #[serde(default)]
    pub decider: DeciderKind,

    /// Dispatch an availability lookup after an address is captured.
    #[serde(default = "default_true")]
    pub availability_checks: bool,

    /// Prior messages passed to the classifier as conversation history.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    #[serde(default)]
    pub replies: RepliesConfig,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            decider: DeciderKind::default(),
            availability_checks: true,
            history_limit: default_history_limit(),
            replies: RepliesConfig::default(),
        }
    }
}

fn default_history_limit() -> usize {
    5
}

/// Customer-facing reply texts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RepliesConfig {
    /// First reply on a new conversation.
    #[serde(default = "default_qualification")]
    pub qualification: String,

    /// Sent after a complete address is captured.
    #[serde(default = "default_address_received")]
    pub address_received: String,

    /// Sent when the address is still missing or incomplete.
    #[serde(default = "default_address_reprompt")]
    pub address_reprompt: String,

    #[serde(default = "default_opt_out")]
    pub opt_out: String,

    /// Fiber result. `{speeds}` is replaced with the comma-joined tiers.
    #[serde(default = "default_fiber_available")]
    pub fiber_available: String,

    #[serde(default = "default_internet_air_available")]
    pub internet_air_available: String,

    #[serde(default = "default_not_available")]
    pub not_available: String,
}

impl Default for RepliesConfig {
    fn default() -> Self {
        Self {
            qualification: default_qualification(),
            address_received: default_address_received(),
            address_reprompt: default_address_reprompt(),
            opt_out: default_opt_out(),
            fiber_available: default_fiber_available(),
            internet_air_available: default_internet_air_available(),
            not_available: default_not_available(),
        }
    }
}

fn default_qualification() -> String {
    "Hi! To confirm you qualify for the $55 Fiber deal, please reply with your Zip Code and Street Address so I can check the map.".to_string()
}

fn default_address_received() -> String {
    "Thank you! Let me check availability at your address. An agent will reach out shortly with your options.".to_string()
}

fn default_address_reprompt() -> String {
    "Thanks! To check availability, I'll need your complete address including street, city, state, and ZIP code. Could you provide that?".to_string()
}

fn default_opt_out() -> String {
    "You've been unsubscribed from our messages. If you need assistance in the future, feel free to reach out. Have a great day!".to_string()
}

fn default_fiber_available() -> String {
    "Great news! 🎉 AT&T Fiber is available at your address with speeds up to {speeds} Mbps! Fiber provides the fastest, most reliable internet with symmetrical upload and download speeds. Would you like to learn more about our Fiber plans or schedule an installation?".to_string()
}

fn default_internet_air_available() -> String {
    "Good news! AT&T Internet Air is available at your address. Internet Air delivers high-speed wireless internet using our reliable 5G network - perfect for streaming, gaming, and working from home. No installation appointment needed! Would you like to learn more about our Internet Air plans?".to_string()
}

fn default_not_available() -> String {
    "I checked AT&T availability at your address, and unfortunately we don't currently offer Fiber or Internet Air service there. However, we may have other options available or be expanding to your area soon. Would you like me to have a representative contact you about alternative solutions or notify you when service becomes available?".to_string()
}

/// Availability lookup endpoint. Leaving `endpoint_url` unset disables lookups.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AvailabilityConfig {
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Browser-driven lookups are slow; this bounds one request.
    #[serde(default = "default_availability_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            timeout_secs: default_availability_timeout_secs(),
        }
    }
}

fn default_availability_timeout_secs() -> u64 {
    120
}

/// SMTP alert configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotifyConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub smtp_host: Option<String>,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub smtp_username: Option<String>,

    #[serde(default)]
    pub smtp_password: Option<String>,

    /// Sender mailbox, e.g. `Leadline <alerts@example.com>`.
    #[serde(default)]
    pub from: Option<String>,

    /// Staff mailbox that receives alerts.
    #[serde(default)]
    pub to: Option<String>,

    /// Base URL of the CRM UI, used to link to the conversation.
    #[serde(default = "default_crm_url")]
    pub crm_url: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_username: None,
            smtp_password: None,
            from: None,
            to: None,
            crm_url: default_crm_url(),
        }
    }
}

impl std::fmt::Debug for NotifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyConfig")
            .field("enabled", &self.enabled)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field(
                "smtp_password",
                &self.smtp_password.as_ref().map(|_| "[redacted]"),
            )
            .field("from", &self.from)
            .field("to", &self.to)
            .field("crm_url", &self.crm_url)
            .finish()
    }
}

fn default_smtp_port() -> u16 {
    587
}

fn default_crm_url() -> String {
    "http://localhost:3000".to_string()
}

/// Installation scheduling and commission settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InstallationsConfig {
    /// Whole dollars earned per completed installation.
    #[serde(default = "default_commission_amount")]
    pub commission_amount: i64,

    /// Text sent by the reminder action.
    #[serde(default = "default_installation_reminder")]
    pub reminder: String,
}

impl Default for InstallationsConfig {
    fn default() -> Self {
        Self {
            commission_amount: default_commission_amount(),
            reminder: default_installation_reminder(),
        }
    }
}

fn default_commission_amount() -> i64 {
    200
}

fn default_installation_reminder() -> String {
    "Reminder: Your AT&T installation is scheduled. Please confirm your availability. Reply STOP to opt out.".to_string()
}
