//! Fixed-interval status poller for headshot tasks.
//!
//! [`TaskPoller::poll`] waits one interval, queries the provider, and feeds
//! the snapshot to a [`PollTracker`] until the tracker reports a terminal
//! outcome. Queries are strictly sequential: the next wait only starts once
//! the previous query has returned. The local ceiling is measured from the
//! `started` instant supplied by the caller (the moment of submission) and
//! is enforced on the local clock: a stalled query is abandoned at the
//! deadline and no query is started once it has passed.
//!
//! Cancellation is cooperative: when the token fires, the poller stops and
//! discards whatever the in-flight query returns. Nothing is sent to the
//! provider.

use eventconnect_core::headshot::{PollOutcome, PollPolicy, PollStep, PollTracker};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::provider::{HeadshotProvider, ProviderError};

/// Why polling stopped without a terminal outcome.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// The caller abandoned the task.
    #[error("Polling cancelled")]
    Cancelled,

    /// A status query failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Polls one provider for task completion.
pub struct TaskPoller<'a, P: HeadshotProvider + ?Sized> {
    provider: &'a P,
    policy: PollPolicy,
}

impl<'a, P: HeadshotProvider + ?Sized> TaskPoller<'a, P> {
    pub fn new(provider: &'a P, policy: PollPolicy) -> Self {
        Self { provider, policy }
    }

    /// Poll `task_id` until it reaches a terminal outcome, a query fails, or
    /// `cancel` fires.
    pub async fn poll(
        &self,
        task_id: &str,
        started: Instant,
        cancel: &CancellationToken,
    ) -> Result<PollOutcome, PollError> {
        let mut tracker = PollTracker::new(self.policy);

        tracing::debug!(
            task_id,
            provider = self.provider.name(),
            interval_ms = self.policy.interval.as_millis() as u64,
            timeout_ms = self.policy.timeout.as_millis() as u64,
            "Polling headshot task",
        );

        let deadline = started + self.policy.timeout;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Self::cancelled(task_id)),
                _ = tokio::time::sleep_until(deadline) => {
                    return Ok(Self::timed_out(task_id, &tracker, started));
                }
                _ = tokio::time::sleep(self.policy.interval) => {}
            }

            let snapshot = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Self::cancelled(task_id)),
                result = self.provider.task_status(task_id) => result?,
                _ = tokio::time::sleep_until(deadline) => {
                    return Ok(Self::timed_out(task_id, &tracker, started));
                }
            };

            let elapsed = started.elapsed();
            match tracker.record(&snapshot, elapsed) {
                PollStep::Continue => {
                    tracing::debug!(
                        task_id,
                        polls = tracker.polls(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Headshot task still running",
                    );
                }
                PollStep::Finished(outcome) => {
                    tracing::info!(
                        task_id,
                        polls = tracker.polls(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        outcome = ?outcome,
                        "Headshot task finished",
                    );
                    return Ok(outcome);
                }
            }
        }
    }

    fn timed_out(task_id: &str, tracker: &PollTracker, started: Instant) -> PollOutcome {
        tracing::info!(
            task_id,
            polls = tracker.polls(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Headshot task timed out",
        );
        PollOutcome::TimedOut
    }

    fn cancelled(task_id: &str) -> PollError {
        tracing::info!(task_id, "Headshot polling cancelled");
        PollError::Cancelled
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use eventconnect_core::headshot::TaskSnapshot;
    use eventconnect_core::image_prep::ImageUpload;

    use super::*;

    /// Provider that replays a fixed script of status responses and then
    /// keeps answering `running`.
    struct ScriptedProvider {
        script: Mutex<VecDeque<Result<TaskSnapshot, ProviderError>>>,
        queries: AtomicU32,
        in_flight: AtomicBool,
        overlapped: AtomicBool,
        query_delay: Duration,
        stall_on: Option<(u32, Duration)>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Result<TaskSnapshot, ProviderError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                queries: AtomicU32::new(0),
                in_flight: AtomicBool::new(false),
                overlapped: AtomicBool::new(false),
                query_delay: Duration::ZERO,
                stall_on: None,
            }
        }

        /// Make query number `n` (1-based) take `delay` before answering.
        fn stalling_on(mut self, n: u32, delay: Duration) -> Self {
            self.stall_on = Some((n, delay));
            self
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.query_delay = delay;
            self
        }

        fn queries(&self) -> u32 {
            self.queries.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HeadshotProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn upload(&self, _image: &ImageUpload) -> Result<String, ProviderError> {
            Ok("file".into())
        }

        async fn start_generation(&self, _file_id: &str) -> Result<String, ProviderError> {
            Ok("task".into())
        }

        async fn task_status(&self, _task_id: &str) -> Result<TaskSnapshot, ProviderError> {
            if self.in_flight.swap(true, Ordering::SeqCst) {
                self.overlapped.store(true, Ordering::SeqCst);
            }
            let n = self.queries.fetch_add(1, Ordering::SeqCst) + 1;
            if !self.query_delay.is_zero() {
                tokio::time::sleep(self.query_delay).await;
            }
            if let Some((stall, delay)) = self.stall_on {
                if n == stall {
                    tokio::time::sleep(delay).await;
                }
            }
            let next = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(TaskSnapshot::running()));
            self.in_flight.store(false, Ordering::SeqCst);
            next
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reaches_success_after_running_reports() {
        let provider = ScriptedProvider::new(vec![
            Ok(TaskSnapshot::running()),
            Ok(TaskSnapshot::running()),
            Ok(TaskSnapshot::success("https://img/1.png")),
        ]);
        let poller = TaskPoller::new(&provider, PollPolicy::default());
        let started = Instant::now();

        let outcome = poller.poll("T1", started, &CancellationToken::new()).await.unwrap();

        assert_eq!(
            outcome,
            PollOutcome::Success {
                image_url: "https://img/1.png".into()
            }
        );
        assert_eq!(provider.queries(), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn provider_error_ends_polling() {
        let provider = ScriptedProvider::new(vec![Ok(TaskSnapshot::error("bad image"))]);
        let poller = TaskPoller::new(&provider, PollPolicy::default());

        let outcome = poller
            .poll("T2", Instant::now(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            PollOutcome::Error {
                detail: "bad image".into()
            }
        );
        assert_eq!(provider.queries(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn endless_running_times_out_and_stops_querying() {
        let provider = ScriptedProvider::new(vec![]);
        let poller = TaskPoller::new(&provider, PollPolicy::default());
        let started = Instant::now();

        let outcome = poller.poll("T3", started, &CancellationToken::new()).await.unwrap();

        assert_eq!(outcome, PollOutcome::TimedOut);
        // Queries at 2s, 4s, ..., 58s; the wait ending at 60s hits the ceiling.
        assert_eq!(provider.queries(), 29);
        assert_eq!(started.elapsed(), Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(provider.queries(), 29);
    }

    #[tokio::test(start_paused = true)]
    async fn ceiling_counts_from_submission_not_first_poll() {
        let provider = ScriptedProvider::new(vec![]);
        let poller = TaskPoller::new(&provider, PollPolicy::default());
        let started = Instant::now();
        // Upload and task creation already took 50 seconds.
        tokio::time::sleep(Duration::from_secs(50)).await;

        let outcome = poller.poll("T4", started, &CancellationToken::new()).await.unwrap();

        assert_eq!(outcome, PollOutcome::TimedOut);
        // 52s, 54s, 56s, 58s.
        assert_eq!(provider.queries(), 4);
        assert_eq!(started.elapsed(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn running_report_at_ceiling_sends_no_further_query() {
        let provider = ScriptedProvider::new(vec![]).with_delay(Duration::from_secs(1));
        let poller = TaskPoller::new(&provider, PollPolicy::default());
        let started = Instant::now();

        let outcome = poller.poll("T3b", started, &CancellationToken::new()).await.unwrap();

        // Rounds of 2s wait + 1s query end at 3s, 6s, ..., 60s.
        assert_eq!(outcome, PollOutcome::TimedOut);
        assert_eq!(provider.queries(), 20);
        assert_eq!(started.elapsed(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_query_is_cut_off_at_the_ceiling() {
        let provider =
            ScriptedProvider::new(vec![]).stalling_on(28, Duration::from_secs(600));
        let poller = TaskPoller::new(&provider, PollPolicy::default());
        let started = Instant::now();

        let outcome = poller.poll("T3c", started, &CancellationToken::new()).await.unwrap();

        assert_eq!(outcome, PollOutcome::TimedOut);
        assert_eq!(started.elapsed(), Duration::from_secs(60));
        assert_eq!(provider.queries(), 28);
    }

    #[tokio::test(start_paused = true)]
    async fn query_that_never_answers_times_out() {
        struct SilentProvider;

        #[async_trait]
        impl HeadshotProvider for SilentProvider {
            fn name(&self) -> &str {
                "silent"
            }

            async fn upload(&self, _image: &ImageUpload) -> Result<String, ProviderError> {
                Ok("file".into())
            }

            async fn start_generation(&self, _file_id: &str) -> Result<String, ProviderError> {
                Ok("task".into())
            }

            async fn task_status(&self, _task_id: &str) -> Result<TaskSnapshot, ProviderError> {
                std::future::pending().await
            }
        }

        let poller = TaskPoller::new(&SilentProvider, PollPolicy::default());
        let started = Instant::now();

        let outcome = poller.poll("T3d", started, &CancellationToken::new()).await.unwrap();

        assert_eq!(outcome, PollOutcome::TimedOut);
        assert_eq!(started.elapsed(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn queries_never_overlap_even_when_slow() {
        let provider = ScriptedProvider::new(vec![
            Ok(TaskSnapshot::running()),
            Ok(TaskSnapshot::running()),
            Ok(TaskSnapshot::success("https://img/slow.png")),
        ])
        .with_delay(Duration::from_secs(5));
        let poller = TaskPoller::new(&provider, PollPolicy::default());
        let started = Instant::now();

        let outcome = poller.poll("T5", started, &CancellationToken::new()).await.unwrap();

        assert_matches!(outcome, PollOutcome::Success { .. });
        assert!(!provider.overlapped.load(Ordering::SeqCst));
        // Three rounds of 2s wait + 5s query.
        assert_eq!(started.elapsed(), Duration::from_secs(21));
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failure_is_returned() {
        let provider = ScriptedProvider::new(vec![
            Ok(TaskSnapshot::running()),
            Err(ProviderError::Transport("connection reset".into())),
        ]);
        let poller = TaskPoller::new(&provider, PollPolicy::default());

        let result = poller.poll("T6", Instant::now(), &CancellationToken::new()).await;

        assert_matches!(result, Err(PollError::Provider(ProviderError::Transport(_))));
        assert_eq!(provider.queries(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_during_wait_stops_before_querying() {
        let provider = ScriptedProvider::new(vec![]);
        let poller = TaskPoller::new(&provider, PollPolicy::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = poller.poll("T7", Instant::now(), &cancel).await;

        assert_matches!(result, Err(PollError::Cancelled));
        assert_eq!(provider.queries(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_discards_in_flight_response() {
        let provider = ScriptedProvider::new(vec![Ok(TaskSnapshot::success("https://img/late.png"))])
            .with_delay(Duration::from_secs(10));
        let poller = TaskPoller::new(&provider, PollPolicy::default());
        let cancel = CancellationToken::new();

        let canceller = {
            let cancel = cancel.clone();
            async move {
                tokio::time::sleep(Duration::from_secs(5)).await;
                cancel.cancel();
            }
        };

        let (result, ()) = tokio::join!(poller.poll("T8", Instant::now(), &cancel), canceller);

        assert_matches!(result, Err(PollError::Cancelled));
        assert_eq!(provider.queries(), 1);
    }
}
