// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end intake tests.
//!
//! `TestHarness` wires an [`IntakeService`] to a temp SQLite database and
//! mock collaborators. `receive()` drives one inbound SMS through the full
//! pipeline.

use std::sync::Arc;
use std::time::Duration;

use leadline_config::model::{DeciderKind, InstallationsConfig, IntakeConfig, StorageConfig};
use leadline_core::{
    AvailabilityChecker, CompletionProvider, Conversation, Customer, Direction, InboundSms,
    LeadlineError, Message, Notifier, SmsGateway, StorageAdapter, normalize_phone,
};
use leadline_intake::{InboundOutcome, InstallationService, IntakeService, build_decider};
use leadline_sms::RetryPolicy;
use leadline_storage::SqliteStorage;

use crate::mock_availability::MockAvailabilityChecker;
use crate::mock_completion::MockCompletionProvider;
use crate::mock_notifier::MockNotifier;
use crate::mock_sms::MockSmsGateway;

/// Builder for configuring a [`TestHarness`].
pub struct TestHarnessBuilder {
    intake: IntakeConfig,
    completion_responses: Vec<String>,
    availability: Option<MockAvailabilityChecker>,
    notifier: MockNotifier,
    native_opt_out: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            intake: IntakeConfig::default(),
            completion_responses: Vec::new(),
            availability: None,
            notifier: MockNotifier::new(),
            native_opt_out: false,
        }
    }

    pub fn with_decider(mut self, kind: DeciderKind) -> Self {
        self.intake.decider = kind;
        self
    }

    /// Queue completion responses; implies the LLM decider.
    pub fn with_completion_responses(mut self, responses: Vec<String>) -> Self {
        self.intake.decider = DeciderKind::Llm;
        self.completion_responses = responses;
        self
    }

    pub fn with_availability(mut self, checker: MockAvailabilityChecker) -> Self {
        self.availability = Some(checker);
        self
    }

    pub fn with_notifier(mut self, notifier: MockNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_native_opt_out(mut self, native: bool) -> Self {
        self.native_opt_out = native;
        self
    }

    pub fn with_intake_config(mut self, intake: IntakeConfig) -> Self {
        self.intake = intake;
        self
    }

    pub async fn build(self) -> Result<TestHarness, LeadlineError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| LeadlineError::Storage { source: e.into() })?;
        let storage = SqliteStorage::new(StorageConfig {
            database_path: temp_dir.path().join("test.db").to_string_lossy().to_string(),
            wal_mode: true,
        });
        storage.initialize().await?;
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

        let sms = Arc::new(MockSmsGateway::new().with_native_opt_out(self.native_opt_out));
        let completion = Arc::new(MockCompletionProvider::with_responses(
            self.completion_responses,
        ));
        let notifier = Arc::new(self.notifier);
        let availability = self.availability.map(Arc::new);

        let decider = build_decider(
            self.intake.decider,
            Some(completion.clone() as Arc<dyn CompletionProvider>),
        );
        let retry = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
        };
        let mut service = IntakeService::new(
            storage.clone(),
            sms.clone() as Arc<dyn SmsGateway>,
            decider,
            &self.intake,
            retry,
        )
        .with_notifier(notifier.clone() as Arc<dyn Notifier>);
        if let Some(checker) = &availability {
            service = service.with_availability_checker(checker.clone() as Arc<dyn AvailabilityChecker>);
        }
        let installations = InstallationService::new(
            storage.clone(),
            service.outbox().clone(),
            &InstallationsConfig::default(),
        );

        Ok(TestHarness {
            service,
            installations,
            storage,
            sms,
            completion,
            notifier,
            availability,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete intake stack with mock collaborators and temp storage.
pub struct TestHarness {
    pub service: IntakeService,
    /// Shares the service's outbox, so reminders reach `sms`.
    pub installations: InstallationService,
    /// SQLite storage (temp DB, removed on drop).
    pub storage: Arc<dyn StorageAdapter>,
    pub sms: Arc<MockSmsGateway>,
    pub completion: Arc<MockCompletionProvider>,
    pub notifier: Arc<MockNotifier>,
    pub availability: Option<Arc<MockAvailabilityChecker>>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with the heuristic decider and no availability checker.
    pub async fn new() -> Result<Self, LeadlineError> {
        Self::builder().build().await
    }

    /// Deliver an inbound SMS with a fresh provider id and wait for
    /// background work to finish.
    pub async fn receive(&self, from: &str, body: &str) -> Result<InboundOutcome, LeadlineError> {
        let id = format!("SM{}", uuid::Uuid::new_v4().simple());
        self.receive_with_id(from, body, &id).await
    }

    /// Deliver an inbound SMS with an explicit provider id.
    pub async fn receive_with_id(
        &self,
        from: &str,
        body: &str,
        external_id: &str,
    ) -> Result<InboundOutcome, LeadlineError> {
        let outcome = self
            .service
            .handle_inbound(InboundSms {
                provider: "twilio".into(),
                from: from.into(),
                to: Some("+18005550199".into()),
                body: body.into(),
                external_id: Some(external_id.into()),
            })
            .await;
        self.service.wait_idle().await;
        outcome
    }

    /// The stored customer for `phone` in any representation.
    pub async fn customer(&self, phone: &str) -> Result<Customer, LeadlineError> {
        let normalized = normalize_phone(phone)?;
        self.storage
            .list_customers()
            .await?
            .into_iter()
            .find(|c| c.phone_number == normalized)
            .ok_or(LeadlineError::NotFound {
                entity: "customer",
                id: normalized,
            })
    }

    pub async fn conversation(&self, id: &str) -> Result<Conversation, LeadlineError> {
        self.storage
            .get_conversation(id)
            .await?
            .ok_or_else(|| LeadlineError::NotFound {
                entity: "conversation",
                id: id.to_string(),
            })
    }

    pub async fn messages(&self, conversation_id: &str) -> Result<Vec<Message>, LeadlineError> {
        self.storage.list_messages(conversation_id, None).await
    }

    pub async fn outbound(&self, conversation_id: &str) -> Result<Vec<Message>, LeadlineError> {
        Ok(self
            .messages(conversation_id)
            .await?
            .into_iter()
            .filter(|m| m.direction == Direction::Outbound)
            .collect())
    }
}
