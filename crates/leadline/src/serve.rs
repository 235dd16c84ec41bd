// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadline serve` command implementation.
//!
//! Wires storage, the SMS gateway, the optional completion provider, email
//! notifier and availability checker into an [`IntakeService`], then serves
//! webhooks and the agent API until SIGINT or SIGTERM.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use leadline_completion::ChatCompletionsProvider;
use leadline_config::LeadlineConfig;
use leadline_core::{CompletionProvider, LeadlineError, PluginAdapter, StorageAdapter};
use leadline_email::SmtpNotifier;
use leadline_gateway::{
    AuthConfig, FixedWindowLimiter, GatewayState, RateLimiter, ServerConfig, WebhookSettings,
    start_server,
};
use leadline_intake::{
    HttpAvailabilityChecker, InstallationService, IntakeService, build_decider,
};
use leadline_sms::{RetryPolicy, build_gateway};
use leadline_storage::SqliteStorage;

/// How long shutdown waits for in-flight intake work.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn run_serve(config: LeadlineConfig) -> Result<(), LeadlineError> {
    init_tracing(&config.agent.log_level);

    info!(name = %config.agent.name, "starting leadline serve");

    let storage = {
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        Arc::new(storage) as Arc<dyn StorageAdapter>
    };

    let gateway = build_gateway(&config.sms)?;
    let capabilities = gateway.capabilities();
    info!(
        provider = gateway.name(),
        native_opt_out = capabilities.native_opt_out,
        "sms gateway ready"
    );

    let completion: Option<Arc<dyn CompletionProvider>> = if config.completion.enabled {
        Some(Arc::new(ChatCompletionsProvider::new(&config.completion)?))
    } else {
        debug!("completion provider disabled");
        None
    };
    let decider = build_decider(config.intake.decider, completion);

    let mut intake = IntakeService::new(
        storage.clone(),
        gateway,
        decider,
        &config.intake,
        RetryPolicy::from_config(&config.sms),
    );
    info!(decider = intake.decider_name(), "intake pipeline ready");

    if config.notify.enabled {
        intake = intake.with_notifier(Arc::new(SmtpNotifier::from_config(&config.notify)?));
        info!("email notifications enabled");
    } else {
        info!("email notifications disabled");
    }

    match HttpAvailabilityChecker::from_config(&config.availability)? {
        Some(checker) => {
            intake = intake.with_availability_checker(Arc::new(checker));
            info!(
                automatic = config.intake.availability_checks,
                "availability checker configured"
            );
        }
        None => warn!("no availability endpoint configured -- availability checks disabled"),
    }

    let limiter: Option<Arc<dyn RateLimiter>> = if config.rate_limit.enabled {
        info!(
            max_requests = config.rate_limit.max_requests,
            window_secs = config.rate_limit.window_secs,
            "api rate limiting enabled (per process)"
        );
        Some(Arc::new(FixedWindowLimiter::new(
            config.rate_limit.max_requests,
            Duration::from_secs(config.rate_limit.window_secs),
        )))
    } else {
        None
    };

    if config.gateway.bearer_token.is_none() {
        warn!("gateway.bearer_token is not set -- the agent API will reject every request");
    }

    let installations = InstallationService::new(
        storage.clone(),
        intake.outbox().clone(),
        &config.installations,
    );
    info!(
        commission_amount = config.installations.commission_amount,
        "installation tracking ready"
    );

    let state = GatewayState {
        intake: intake.clone(),
        installations,
        webhooks: WebhookSettings {
            twilio_auth_token: config.sms.twilio.auth_token.clone(),
            validate_signatures: config.sms.twilio.validate_signatures,
            public_url: config.gateway.public_url.clone(),
            ack_timeout: Duration::from_secs(config.gateway.webhook_timeout_secs),
        },
        auth: AuthConfig {
            bearer_token: config.gateway.bearer_token.clone(),
        },
        limiter,
        start_time: Instant::now(),
    };
    let server = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };

    let cancel = install_signal_handler();
    let served = start_server(&server, state, cancel).await;

    intake.drain(DRAIN_TIMEOUT).await;
    storage.close().await?;
    served?;

    info!("leadline serve shutdown complete");
    Ok(())
}

/// Returns a token cancelled on SIGINT or SIGTERM.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => info!("received SIGINT (Ctrl+C), initiating shutdown"),
                        _ = sigterm.recv() => info!("received SIGTERM, initiating shutdown"),
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler; only Ctrl+C will stop the server");
                    let _ = ctrl_c.await;
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        trigger.cancel();
    });

    token
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("leadline={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
