//! Action completion polling.
//!
//! Unique responsibility: block a caller until an asynchronous action reaches a
//! terminal status, or until the caller stops waiting.
//!
//! State machine per wait:
//! - `in-progress` -> sleep one interval, probe again
//! - `completed`   -> `Ok(())`
//! - `errored`     -> `BinaryLaneError::ActionFailed`
//!
//! The interval is fixed. Cancellation is observed before each probe, while a
//! probe is in flight, and during the sleep between probes.

use std::{future::Future, time::Duration};

use tracing::{debug, info, warn};

use crate::binarylane_actions::{ActionReference, ActionStatus};
use crate::binarylane_client::BinaryLaneClient;
use crate::binarylane_error::BinaryLaneError;

/// Default interval between two status probes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Polls an action status until it is terminal.
///
/// Holds configuration only; one waiter can serve any number of concurrent waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionWaiter {
    poll_interval: Duration,
    probe_failure_budget: u32,
}

impl Default for ActionWaiter {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl ActionWaiter {
    /// Create a waiter probing every `poll_interval`.
    #[must_use]
    pub const fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            probe_failure_budget: 0,
        }
    }

    /// Tolerate up to `budget` consecutive probe errors before giving up.
    ///
    /// The default is 0: the first probe error is returned as-is.
    #[must_use]
    pub const fn with_probe_failure_budget(mut self, budget: u32) -> Self {
        self.probe_failure_budget = budget;
        self
    }

    /// Interval between probes.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Wait until `probe` reports a terminal status or `cancel` resolves.
    ///
    /// If `cancel` is already resolved, `probe` is never called.
    ///
    /// # Errors
    ///
    /// - `ActionFailed` when the action reaches `errored`,
    /// - `WaitCanceled` when `cancel` resolves first,
    /// - the probe's own error, unchanged, once the failure budget is spent.
    pub async fn wait_for_completion<C, P, Fut>(&self, cancel: C, probe: P) -> Result<(), BinaryLaneError>
    where
        C: Future<Output = ()>,
        P: FnMut() -> Fut,
        Fut: Future<Output = Result<ActionStatus, BinaryLaneError>>,
    {
        self.poll(cancel, || BinaryLaneError::WaitCanceled, probe).await
    }

    /// Wait until `probe` reports a terminal status or `timeout` elapses.
    ///
    /// # Errors
    ///
    /// Same as [`Self::wait_for_completion`], with `WaitTimedOut` in place of
    /// `WaitCanceled`.
    pub async fn wait_with_timeout<P, Fut>(&self, timeout: Duration, probe: P) -> Result<(), BinaryLaneError>
    where
        P: FnMut() -> Fut,
        Fut: Future<Output = Result<ActionStatus, BinaryLaneError>>,
    {
        self.poll(
            tokio::time::sleep(timeout),
            || BinaryLaneError::WaitTimedOut(timeout),
            probe,
        )
        .await
    }

    async fn poll<C, E, P, Fut>(&self, stop: C, stopped: E, mut probe: P) -> Result<(), BinaryLaneError>
    where
        C: Future<Output = ()>,
        E: Fn() -> BinaryLaneError,
        P: FnMut() -> Fut,
        Fut: Future<Output = Result<ActionStatus, BinaryLaneError>>,
    {
        let mut stop = std::pin::pin!(stop);
        let mut probes: u32 = 0;
        let mut failures: u32 = 0;

        loop {
            // `biased` polls `stop` first; the probe block is lazy, so a fired
            // stop signal means the probe is never called.
            let outcome = tokio::select! {
                biased;
                () = stop.as_mut() => return Err(stopped()),
                outcome = async { probe().await } => outcome,
            };
            probes = probes.saturating_add(1);

            match outcome {
                Ok(ActionStatus::Completed) => {
                    info!(probes, "action completed");
                    return Ok(());
                }
                Ok(ActionStatus::Errored) => {
                    info!(probes, "action errored");
                    return Err(BinaryLaneError::ActionFailed);
                }
                Ok(ActionStatus::InProgress) => {
                    failures = 0;
                    debug!(probes, "action in progress");
                }
                Err(e) if failures < self.probe_failure_budget => {
                    failures = failures.saturating_add(1);
                    warn!(probes, failures, error = %e, "action probe failed, retrying");
                }
                Err(e) => return Err(e),
            }

            tokio::select! {
                biased;
                () = stop.as_mut() => return Err(stopped()),
                () = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }
}

impl BinaryLaneClient {
    /// Block until the referenced action is terminal or `cancel` resolves.
    ///
    /// Polls at the configured `action_poll_interval`.
    ///
    /// # Errors
    ///
    /// See [`ActionWaiter::wait_for_completion`]; an empty status URI is
    /// rejected before any request is made.
    pub async fn wait_for_action<C>(&self, reference: &ActionReference, cancel: C) -> Result<(), BinaryLaneError>
    where
        C: Future<Output = ()>,
    {
        reference.location()?;
        debug!(%reference, "waiting for action");

        let actions = &self.actions();
        ActionWaiter::new(self.config().action_poll_interval())
            .wait_for_completion(cancel, move || async move {
                actions.get_by_reference(reference).await.map(|a| a.status)
            })
            .await
    }

    /// Block until the referenced action is terminal or `timeout` elapses.
    ///
    /// # Errors
    ///
    /// See [`ActionWaiter::wait_with_timeout`].
    pub async fn wait_for_action_with_timeout(
        &self,
        reference: &ActionReference,
        timeout: Duration,
    ) -> Result<(), BinaryLaneError> {
        reference.location()?;
        debug!(%reference, ?timeout, "waiting for action");

        let actions = &self.actions();
        ActionWaiter::new(self.config().action_poll_interval())
            .wait_with_timeout(timeout, move || async move {
                actions.get_by_reference(reference).await.map(|a| a.status)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::future::{pending, ready};

    const FAST: Duration = Duration::from_millis(1);

    fn api_error() -> BinaryLaneError {
        BinaryLaneError::Api {
            status: reqwest::StatusCode::BAD_GATEWAY,
            body: String::new(),
        }
    }

    #[tokio::test]
    async fn completes_after_k_in_progress_probes() {
        let mut script = VecDeque::from(vec![
            ActionStatus::InProgress,
            ActionStatus::InProgress,
            ActionStatus::InProgress,
            ActionStatus::Completed,
        ]);
        let mut calls = 0;

        let result = ActionWaiter::new(FAST)
            .wait_for_completion(pending(), || {
                calls += 1;
                let next = script.pop_front().unwrap_or(ActionStatus::InProgress);
                ready(Ok(next))
            })
            .await;

        assert!(result.is_ok());
        assert_eq!(calls, 4);
    }

    #[tokio::test]
    async fn errored_fails_immediately() {
        let mut calls = 0;
        let result = ActionWaiter::new(FAST)
            .wait_for_completion(pending(), || {
                calls += 1;
                ready(Ok(ActionStatus::Errored))
            })
            .await;

        assert!(matches!(result, Err(BinaryLaneError::ActionFailed)));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn probe_error_is_propagated_without_retry() {
        let mut calls = 0;
        let result = ActionWaiter::new(FAST)
            .wait_for_completion(pending(), || {
                calls += 1;
                ready(Err(api_error()))
            })
            .await;

        assert!(matches!(result, Err(BinaryLaneError::Api { .. })));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn failure_budget_tolerates_consecutive_errors() {
        let mut script = VecDeque::from(vec![
            Err(api_error()),
            Err(api_error()),
            Ok(ActionStatus::InProgress),
            Err(api_error()),
            Ok(ActionStatus::Completed),
        ]);
        let mut calls = 0;

        let result = ActionWaiter::new(FAST)
            .with_probe_failure_budget(2)
            .wait_for_completion(pending(), || {
                calls += 1;
                ready(script.pop_front().unwrap_or(Ok(ActionStatus::Completed)))
            })
            .await;

        assert!(result.is_ok());
        assert_eq!(calls, 5);
    }

    #[tokio::test]
    async fn failure_budget_is_bounded() {
        let mut calls = 0;
        let result = ActionWaiter::new(FAST)
            .with_probe_failure_budget(2)
            .wait_for_completion(pending(), || {
                calls += 1;
                ready(Err(api_error()))
            })
            .await;

        assert!(matches!(result, Err(BinaryLaneError::Api { .. })));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn canceled_before_first_probe_never_probes() {
        let mut calls = 0;
        let result = ActionWaiter::new(FAST)
            .wait_for_completion(ready(()), || {
                calls += 1;
                ready(Ok(ActionStatus::Completed))
            })
            .await;

        assert!(matches!(result, Err(BinaryLaneError::WaitCanceled)));
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn cancel_interrupts_the_sleep() {
        let mut calls = 0;
        let started = tokio::time::Instant::now();

        let result = ActionWaiter::new(Duration::from_secs(3600))
            .wait_for_completion(tokio::time::sleep(Duration::from_millis(20)), || {
                calls += 1;
                ready(Ok(ActionStatus::InProgress))
            })
            .await;

        assert!(matches!(result, Err(BinaryLaneError::WaitCanceled)));
        assert_eq!(calls, 1);
        assert!(started.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test]
    async fn cancel_interrupts_an_in_flight_probe() {
        let mut calls = 0;
        let result = ActionWaiter::new(FAST)
            .wait_for_completion(tokio::time::sleep(Duration::from_millis(20)), || {
                calls += 1;
                pending::<Result<ActionStatus, BinaryLaneError>>()
            })
            .await;

        assert!(matches!(result, Err(BinaryLaneError::WaitCanceled)));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn timeout_reports_timed_out() {
        let timeout = Duration::from_millis(30);
        let result = ActionWaiter::new(Duration::from_millis(5))
            .wait_with_timeout(timeout, || ready(Ok(ActionStatus::InProgress)))
            .await;

        assert!(matches!(result, Err(BinaryLaneError::WaitTimedOut(d)) if d == timeout));
    }

    #[tokio::test]
    async fn independent_waits_run_concurrently() {
        let waiter = ActionWaiter::new(FAST);
        let mut left = 2;
        let mut right = 5;

        let (a, b) = tokio::join!(
            waiter.wait_for_completion(pending(), || {
                left -= 1;
                ready(Ok(if left == 0 { ActionStatus::Completed } else { ActionStatus::InProgress }))
            }),
            waiter.wait_for_completion(pending(), || {
                right -= 1;
                ready(Ok(if right == 0 { ActionStatus::Errored } else { ActionStatus::InProgress }))
            }),
        );

        assert!(a.is_ok());
        assert!(matches!(b, Err(BinaryLaneError::ActionFailed)));
    }
}
