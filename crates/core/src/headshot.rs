//! Headshot generation task model and poll state machine.
//!
//! A task lives at the external image provider; locally it only exists
//! while the registration workflow is waiting on it. [`PollTracker`]
//! folds successive status snapshots into a terminal [`PollOutcome`],
//! enforcing the local wall-clock ceiling independently of the provider.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Fixed delay between two status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Local ceiling on the total time spent waiting for a task.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(60);

/// File id returned by the placeholder provider.
pub const PLACEHOLDER_FILE_ID: &str = "mock_file_id_12345";

/// Task id returned by the placeholder provider.
pub const PLACEHOLDER_TASK_ID: &str = "mock_task_id_98765";

/// Stock portrait returned as the result of a placeholder task.
pub const PLACEHOLDER_HEADSHOT_URL: &str =
    "https://images.unsplash.com/photo-1560250097-0b93528c311a?w=400&auto=format&fit=crop";

/// Message surfaced when a task exceeds the local ceiling.
pub const TIMEOUT_MESSAGE: &str = "Task timed out.";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Status of a task as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Running,
    Success,
    Error,
}

impl TaskStatus {
    /// Whether no further polling is needed after this status.
    pub fn is_terminal(self) -> bool {
        !matches!(self, TaskStatus::Running)
    }
}

/// Result payload attached to a successful task.
///
/// The provider has been observed to return either a list under `images`
/// or a single URL under `image`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResults {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl TaskResults {
    /// First usable result image, preferring the `images` list.
    pub fn first_image(&self) -> Option<&str> {
        self.images
            .iter()
            .chain(self.image.iter())
            .map(String::as_str)
            .find(|url| !url.trim().is_empty())
    }
}

/// One status observation for a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub task_status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<TaskResults>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskSnapshot {
    pub fn running() -> Self {
        Self {
            task_status: TaskStatus::Running,
            results: None,
            error: None,
        }
    }

    pub fn success(image_url: impl Into<String>) -> Self {
        Self {
            task_status: TaskStatus::Success,
            results: Some(TaskResults {
                images: vec![image_url.into()],
                image: None,
            }),
            error: None,
        }
    }

    pub fn error(detail: impl Into<String>) -> Self {
        Self {
            task_status: TaskStatus::Error,
            results: None,
            error: Some(detail.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Poll state machine
// ---------------------------------------------------------------------------

/// Interval and ceiling used while waiting on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

/// Terminal result of waiting on a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Success { image_url: String },
    Error { detail: String },
    /// The provider claimed success but attached no image.
    MissingResult,
    TimedOut,
}

impl PollOutcome {
    /// Human-readable message for non-success outcomes.
    pub fn failure_message(&self) -> Option<String> {
        match self {
            PollOutcome::Success { .. } => None,
            PollOutcome::Error { detail } => Some(format!("Headshot task error: {detail}")),
            PollOutcome::MissingResult => {
                Some("Provider reported success without a result image".to_string())
            }
            PollOutcome::TimedOut => Some(TIMEOUT_MESSAGE.to_string()),
        }
    }
}

/// What the poll loop should do after an observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep {
    /// Wait one interval and query again.
    Continue,
    Finished(PollOutcome),
}

/// Folds status snapshots into a terminal outcome.
///
/// Elapsed time is measured from submission by the caller. An `error`
/// report wins over the ceiling; once the ceiling is exceeded any other
/// report ends in [`PollOutcome::TimedOut`].
#[derive(Debug, Clone)]
pub struct PollTracker {
    policy: PollPolicy,
    polls: u32,
    finished: bool,
}

impl PollTracker {
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            polls: 0,
            finished: false,
        }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Number of snapshots recorded so far.
    pub fn polls(&self) -> u32 {
        self.polls
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether the ceiling has been exceeded at `elapsed`.
    pub fn is_expired(&self, elapsed: Duration) -> bool {
        elapsed > self.policy.timeout
    }

    /// Record one status snapshot observed at `elapsed` since submission.
    pub fn record(&mut self, snapshot: &TaskSnapshot, elapsed: Duration) -> PollStep {
        debug_assert!(!self.finished, "recorded a snapshot after a terminal outcome");
        self.polls += 1;

        let step = match snapshot.task_status {
            TaskStatus::Error => PollStep::Finished(PollOutcome::Error {
                detail: snapshot
                    .error
                    .clone()
                    .unwrap_or_else(|| "unknown provider error".to_string()),
            }),
            _ if self.is_expired(elapsed) => PollStep::Finished(PollOutcome::TimedOut),
            TaskStatus::Success => {
                let image = snapshot.results.as_ref().and_then(TaskResults::first_image);
                match image {
                    Some(url) => PollStep::Finished(PollOutcome::Success {
                        image_url: url.to_string(),
                    }),
                    None => PollStep::Finished(PollOutcome::MissingResult),
                }
            }
            TaskStatus::Running => PollStep::Continue,
        };

        if matches!(step, PollStep::Finished(_)) {
            self.finished = true;
        }
        step
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
