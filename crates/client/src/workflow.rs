//! Registration workflow driver.
//!
//! [`RegistrationWorkflow`] owns a [`RegistrationSession`] and moves it
//! through the wizard by calling a [`HeadshotProvider`] for generation and
//! an [`AttendeeSink`] for persistence.
//!
//! One generation runs at a time. It can be abandoned from another task
//! through an [`AbandonHandle`]: polling stops, the in-flight result is
//! dropped and the session returns to Photo.
//!
//! The polling ceiling is a budget measured from submission: upload, task
//! creation and polling together must finish before it runs out.

use std::future::Future;
use std::sync::{Arc, Mutex};

use eventconnect_core::error::CoreError;
use eventconnect_core::headshot::{PollOutcome, PollPolicy, TIMEOUT_MESSAGE};
use eventconnect_core::image_prep::{prepare_for_upload, ImageUpload, PreparedImage};
use eventconnect_core::registration::{
    AttemptId, GenerationResult, ProfileForm, RegistrationSession, NO_PHOTO_MESSAGE,
};
use eventconnect_core::types::DbId;
use eventconnect_youcam::poller::{PollError, TaskPoller};
use eventconnect_youcam::{HeadshotProvider, ProviderError};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::api::{AttendeeSink, ClientError, StoredAttendee};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a generation attempt ended without a headshot.
///
/// Every variant displays as the single message shown to the attendee.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Rejected locally before contacting the provider.
    #[error("{0}")]
    Validation(String),

    /// The provider could not be reached.
    #[error("Could not reach the headshot service: {0}")]
    Transport(String),

    /// The provider refused the request or reported a task error.
    #[error("{message}")]
    Provider {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// The task did not finish within the polling ceiling.
    #[error("{0}")]
    Timeout(String),

    /// The attempt was abandoned.
    #[error("Generation cancelled")]
    Cancelled,

    /// The action is not allowed in the current stage.
    #[error(transparent)]
    Session(CoreError),
}

impl From<ProviderError> for GenerationError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Transport(msg) => GenerationError::Transport(msg),
            ProviderError::Rejected { message, details } => {
                GenerationError::Provider { message, details }
            }
            malformed @ ProviderError::Malformed(_) => GenerationError::Provider {
                message: malformed.to_string(),
                details: None,
            },
        }
    }
}

impl From<PollError> for GenerationError {
    fn from(err: PollError) -> Self {
        match err {
            PollError::Cancelled => GenerationError::Cancelled,
            PollError::Provider(e) => e.into(),
        }
    }
}

impl From<CoreError> for GenerationError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => GenerationError::Validation(msg),
            other => GenerationError::Session(other),
        }
    }
}

/// Failure confirming a reviewed registration.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Session(#[from] CoreError),

    /// Saving failed; the session stays in Review with its data intact.
    #[error("Could not save registration: {0}")]
    Persistence(#[source] ClientError),
}

// ---------------------------------------------------------------------------
// Abandon handle
// ---------------------------------------------------------------------------

/// Abandons the generation currently running in a [`RegistrationWorkflow`].
///
/// Cloneable and `Send`, so it can be moved into a Ctrl-C handler or another
/// task. Abandoning when nothing is running is a no-op.
#[derive(Clone)]
pub struct AbandonHandle {
    current: Arc<Mutex<CancellationToken>>,
}

impl AbandonHandle {
    pub fn abandon(&self) {
        if let Ok(token) = self.current.lock() {
            token.cancel();
        }
    }
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

pub struct RegistrationWorkflow {
    provider: Arc<dyn HeadshotProvider>,
    sink: Arc<dyn AttendeeSink>,
    policy: PollPolicy,
    session: RegistrationSession,
    current: Arc<Mutex<CancellationToken>>,
}

impl RegistrationWorkflow {
    pub fn new(
        event_id: DbId,
        provider: Arc<dyn HeadshotProvider>,
        sink: Arc<dyn AttendeeSink>,
    ) -> Self {
        Self {
            provider,
            sink,
            policy: PollPolicy::default(),
            session: RegistrationSession::new(event_id),
            current: Arc::new(Mutex::new(CancellationToken::new())),
        }
    }

    /// Override the polling interval and ceiling.
    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn session(&self) -> &RegistrationSession {
        &self.session
    }

    pub fn abandon_handle(&self) -> AbandonHandle {
        AbandonHandle {
            current: Arc::clone(&self.current),
        }
    }

    // ---- stage transitions ----

    pub fn submit_info(&mut self, form: ProfileForm) -> Result<(), CoreError> {
        self.session.submit_info(form)
    }

    pub fn back_to_info(&mut self) -> Result<(), CoreError> {
        self.session.back_to_info()
    }

    pub fn select_photo(&mut self, photo: ImageUpload) -> Result<(), CoreError> {
        self.session.select_photo(photo)
    }

    /// Skip generation and review the original photo hosted at `image_url`.
    pub fn keep_original(&mut self, image_url: impl Into<String>) -> Result<(), CoreError> {
        self.session.keep_original(image_url)
    }

    pub fn retry(&mut self) -> Result<(), CoreError> {
        self.session.retry()
    }

    // ---- generation ----

    /// Upload the selected photo, start a headshot task and poll it to a
    /// terminal outcome.
    ///
    /// On success the session is in Review and the headshot URL is returned.
    /// On any failure the session is back in Photo with the error recorded.
    pub async fn generate(&mut self) -> Result<String, GenerationError> {
        // The attempt's token is in place before the attempt begins.
        let cancel = self.fresh_token();
        let attempt = self.session.begin_generation()?;
        let Some(photo) = self.session.photo().cloned() else {
            return Err(GenerationError::Validation(NO_PHOTO_MESSAGE.to_string()));
        };

        tracing::info!(
            event_id = self.session.event_id(),
            attempt = %attempt,
            provider = self.provider.name(),
            "Starting headshot generation",
        );

        let result = self.run_attempt(attempt, &photo, &cancel).await;

        match result {
            Ok(image_url) => {
                let applied = self.session.finish_generation(
                    attempt,
                    GenerationResult::Generated {
                        image_url: image_url.clone(),
                    },
                );
                if applied {
                    Ok(image_url)
                } else {
                    tracing::debug!(attempt = %attempt, "Discarding stale headshot result");
                    Err(GenerationError::Cancelled)
                }
            }
            Err(GenerationError::Cancelled) => {
                self.session.abandon_generation()?;
                tracing::info!(attempt = %attempt, "Headshot generation abandoned");
                Err(GenerationError::Cancelled)
            }
            Err(err) => {
                tracing::warn!(attempt = %attempt, error = %err, "Headshot generation failed");
                self.session.finish_generation(
                    attempt,
                    GenerationResult::Failed {
                        message: err.to_string(),
                    },
                );
                Err(err)
            }
        }
    }

    async fn run_attempt(
        &mut self,
        attempt: AttemptId,
        photo: &ImageUpload,
        cancel: &CancellationToken,
    ) -> Result<String, GenerationError> {
        let prepared = prepare_off_runtime(photo, cancel).await?;
        if let Some(reason) = &prepared.fallback_reason {
            tracing::warn!(attempt = %attempt, reason = %reason, "Uploading photo without downscaling");
        }

        let started = Instant::now();
        let deadline = started + self.policy.timeout;
        let provider = Arc::clone(&self.provider);

        let file_id = within_budget(cancel, deadline, provider.upload(&prepared.upload)).await?;
        let task_id =
            within_budget(cancel, deadline, provider.start_generation(&file_id)).await?;
        if !self.session.record_task(attempt, task_id.as_str()) {
            return Err(GenerationError::Cancelled);
        }

        let poller = TaskPoller::new(provider.as_ref(), self.policy);
        match poller.poll(&task_id, started, cancel).await? {
            PollOutcome::Success { image_url } => Ok(image_url),
            PollOutcome::TimedOut => Err(GenerationError::Timeout(TIMEOUT_MESSAGE.to_string())),
            other => Err(GenerationError::Provider {
                message: other.failure_message().unwrap_or_default(),
                details: None,
            }),
        }
    }

    fn fresh_token(&self) -> CancellationToken {
        let token = CancellationToken::new();
        match self.current.lock() {
            Ok(mut current) => *current = token.clone(),
            Err(poisoned) => *poisoned.into_inner() = token.clone(),
        }
        token
    }

    // ---- review ----

    /// Persist the reviewed registration.
    ///
    /// On failure the session stays in Review with the error recorded, so the
    /// attendee can confirm again without redoing the photo.
    pub async fn confirm(&mut self) -> Result<StoredAttendee, WorkflowError> {
        let submission = self.session.submission()?;

        match self.sink.save(&submission).await {
            Ok(stored) => {
                self.session.submission_succeeded()?;
                tracing::info!(
                    event_id = stored.event_id,
                    attendee_id = stored.id,
                    "Registration complete",
                );
                Ok(stored)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Saving registration failed");
                self.session.submission_failed(err.to_string());
                Err(WorkflowError::Persistence(err))
            }
        }
    }
}

/// Run a provider call until it answers, the attempt is abandoned, or the
/// budget measured from submission runs out.
async fn within_budget<T>(
    cancel: &CancellationToken,
    deadline: Instant,
    fut: impl Future<Output = Result<T, ProviderError>>,
) -> Result<T, GenerationError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(GenerationError::Cancelled),
        result = fut => result.map_err(GenerationError::from),
        _ = tokio::time::sleep_until(deadline) => {
            Err(GenerationError::Timeout(TIMEOUT_MESSAGE.to_string()))
        }
    }
}

/// Decode, downscale and re-encode on the blocking pool. A failed blocking
/// task falls back to the original bytes.
async fn prepare_off_runtime(
    photo: &ImageUpload,
    cancel: &CancellationToken,
) -> Result<PreparedImage, GenerationError> {
    let original = photo.clone();
    let task = tokio::task::spawn_blocking(move || prepare_for_upload(&original));

    tokio::select! {
        _ = cancel.cancelled() => Err(GenerationError::Cancelled),
        joined = task => Ok(joined.unwrap_or_else(|e| PreparedImage {
            upload: photo.clone(),
            reencoded: false,
            fallback_reason: Some(format!("image preparation task failed: {e}")),
        })),
    }
}
