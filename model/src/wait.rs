/*!

A bounded readiness poller. Every step of cluster bring-up waits on some
external condition (a namespace settling, a secret appearing, pods becoming
ready), and each of those waits is the same shape: evaluate a check, sleep a
fixed interval, evaluate again, give up after a bounded time. This module
provides that shape once, as [`poll`], so the individual checks only describe
*what* they are waiting for.

A timeout is not an error here. [`PollOutcome::TimedOut`] and
[`PollOutcome::Failed`] are distinct outcomes because callers treat them
differently: a pod-readiness timeout is advisory (print the status and move
on) while a hard failure from the underlying query halts the calling flow.

!*/

use log::debug;
use snafu::Snafu;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// The default delay between successive check evaluations.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// The default bound on how long a poll will wait before giving up.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(120);

/// The observable state reported by one evaluation of a check.
#[derive(Debug)]
pub enum CheckState<T> {
    /// The condition holds. Carries whatever the check retrieved while
    /// observing it (for example the contents of a secret).
    Ready(T),
    /// The condition does not hold yet. Carries a description of the last
    /// observed state for timeout messages.
    NotReady(String),
}

/// A named, side-effect-free predicate evaluated against external state.
#[async_trait::async_trait]
pub trait Check: Send + Sync {
    /// The payload returned when the condition is observed to hold.
    type Ready: Send;

    /// An identifier for log and error messages, e.g. `pods-ready`.
    fn id(&self) -> &str;

    /// Query the external collaborator once. `Err` means the query itself
    /// could not be completed, which is distinct from `NotReady`.
    async fn evaluate(&self) -> Result<CheckState<Self::Ready>, CheckError>;
}

/// The hard-error type a check may raise when its underlying query cannot be
/// completed (as opposed to completing and observing "not ready").
#[derive(Debug, Snafu)]
pub enum CheckError {
    #[snafu(display("{}", message))]
    Precondition { message: String },

    #[snafu(display("{}: {}", message, source))]
    Query {
        message: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl CheckError {
    /// A hard error with no underlying error value, e.g. a missing tool.
    pub fn message<S: Into<String>>(message: S) -> Self {
        CheckError::Precondition {
            message: message.into(),
        }
    }

    /// A hard error caused by a failed call to an external collaborator.
    pub fn query<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        CheckError::Query {
            message: message.into(),
            source: Box::new(source),
        }
    }
}

/// How a poll treats a hard error raised by its check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDisposition {
    /// Treat the error like "not yet ready" and retry at the next interval.
    Retry,
    /// Abort the poll immediately with `PollOutcome::Failed`.
    Fatal,
}

/// Configuration for one poll invocation. The interval is fixed; there is no
/// backoff, matching the constant-interval waits this replaces.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    /// Delay between successive evaluations.
    pub interval: Duration,
    /// Bound on total wait time. Once elapsed time reaches this, the poll
    /// returns `TimedOut` instead of sleeping again.
    pub max_wait: Duration,
    /// Whether a check error aborts the poll or counts as "not yet ready".
    pub on_error: ErrorDisposition,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_wait: DEFAULT_MAX_WAIT,
            on_error: ErrorDisposition::Retry,
        }
    }
}

impl PollPolicy {
    pub fn new(interval: Duration, max_wait: Duration) -> Self {
        Self {
            interval,
            max_wait,
            on_error: ErrorDisposition::Retry,
        }
    }

    /// A policy that evaluates the check exactly once, with errors fatal.
    /// Used for preconditions such as tool lookups.
    pub fn once() -> Self {
        Self {
            interval: Duration::ZERO,
            max_wait: Duration::ZERO,
            on_error: ErrorDisposition::Fatal,
        }
    }

    pub fn errors_fatal(mut self) -> Self {
        self.on_error = ErrorDisposition::Fatal;
        self
    }
}

/// The result of one poll invocation.
#[derive(Debug)]
pub enum PollOutcome<T> {
    /// The check reported ready within the bound.
    Ready(T),
    /// The bound elapsed before the check reported ready. Advisory; the
    /// caller decides whether this halts the flow.
    TimedOut {
        /// The check's identifier.
        check: String,
        /// The last observed state, for display.
        last: String,
        /// How long the poll waited before giving up.
        waited: Duration,
    },
    /// The check raised a hard error under a `Fatal` disposition.
    Failed { check: String, source: CheckError },
}

impl<T> PollOutcome<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, PollOutcome::Ready(_))
    }

    /// The payload, if the poll succeeded.
    pub fn ready(self) -> Option<T> {
        match self {
            PollOutcome::Ready(payload) => Some(payload),
            _ => None,
        }
    }
}

/// Evaluate `check` at `policy.interval` until it reports ready, a hard error
/// aborts the poll, or `policy.max_wait` elapses. The first evaluation runs
/// immediately, before any sleep. The poller performs no I/O of its own and
/// holds no state between invocations.
pub async fn poll<C>(check: &C, policy: &PollPolicy) -> PollOutcome<C::Ready>
where
    C: Check + ?Sized,
{
    let start = Instant::now();
    let mut last = String::from("not yet evaluated");
    loop {
        match check.evaluate().await {
            Ok(CheckState::Ready(payload)) => {
                debug!("check '{}' is ready", check.id());
                return PollOutcome::Ready(payload);
            }
            Ok(CheckState::NotReady(state)) => {
                debug!("check '{}' is not ready: {}", check.id(), state);
                last = state;
            }
            Err(source) => match policy.on_error {
                ErrorDisposition::Fatal => {
                    return PollOutcome::Failed {
                        check: check.id().to_string(),
                        source,
                    }
                }
                ErrorDisposition::Retry => {
                    debug!("check '{}' errored, will retry: {}", check.id(), source);
                    last = source.to_string();
                }
            },
        }
        let waited = start.elapsed();
        if waited >= policy.max_wait {
            return PollOutcome::TimedOut {
                check: check.id().to_string(),
                last,
                waited,
            };
        }
        sleep(policy.interval).await;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// What a scripted check reports on one evaluation.
    enum Attempt {
        Ready(u32),
        NotReady(&'static str),
        Error(&'static str),
    }

    /// A check that plays back a script of attempts, repeating the final
    /// entry once the script is exhausted, and counts its evaluations.
    struct Scripted {
        script: Mutex<VecDeque<Attempt>>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(script: Vec<Attempt>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl Check for Scripted {
        type Ready = u32;

        fn id(&self) -> &str {
            "scripted"
        }

        async fn evaluate(&self) -> Result<CheckState<u32>, CheckError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            let attempt = if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                match script.front().unwrap() {
                    Attempt::Ready(payload) => Attempt::Ready(*payload),
                    Attempt::NotReady(state) => Attempt::NotReady(*state),
                    Attempt::Error(message) => Attempt::Error(*message),
                }
            };
            match attempt {
                Attempt::Ready(payload) => Ok(CheckState::Ready(payload)),
                Attempt::NotReady(state) => Ok(CheckState::NotReady(state.to_string())),
                Attempt::Error(message) => Err(CheckError::message(message)),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_overshoots_by_less_than_one_interval() {
        let check = Scripted::new(vec![Attempt::NotReady("still waiting")]);
        let policy = PollPolicy::new(Duration::from_secs(5), Duration::from_secs(10));
        let start = Instant::now();
        let outcome = poll(&check, &policy).await;
        let elapsed = start.elapsed();
        assert!(matches!(outcome, PollOutcome::TimedOut { .. }));
        assert!(elapsed >= Duration::from_secs(10));
        assert!(elapsed < Duration::from_secs(15));
        // Evaluations at t=0s, 5s and 10s.
        assert_eq!(check.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn ready_on_fourth_attempt_stops_polling() {
        let check = Scripted::new(vec![
            Attempt::NotReady("0 of 3 ready"),
            Attempt::NotReady("1 of 3 ready"),
            Attempt::NotReady("2 of 3 ready"),
            Attempt::Ready(3),
        ]);
        let policy = PollPolicy::new(Duration::from_secs(5), Duration::from_secs(20));
        let start = Instant::now();
        let outcome = poll(&check, &policy).await;
        assert!(matches!(outcome, PollOutcome::Ready(3)));
        assert_eq!(check.calls(), 4);
        assert_eq!(start.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_error_aborts_without_sleeping() {
        let check = Scripted::new(vec![Attempt::Error("k3d: command not found")]);
        let policy =
            PollPolicy::new(Duration::from_secs(5), Duration::from_secs(600)).errors_fatal();
        let start = Instant::now();
        let outcome = poll(&check, &policy).await;
        match outcome {
            PollOutcome::Failed { check: id, source } => {
                assert_eq!(id, "scripted");
                assert!(source.to_string().contains("command not found"));
            }
            other => panic!("expected Failed, got {:?}", other),
        }
        assert_eq!(check.calls(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn error_is_retried_when_not_fatal() {
        let check = Scripted::new(vec![Attempt::Error("transient"), Attempt::Ready(1)]);
        let policy = PollPolicy::new(Duration::from_secs(1), Duration::from_secs(10));
        let outcome = poll(&check, &policy).await;
        assert!(matches!(outcome, PollOutcome::Ready(1)));
        assert_eq!(check.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn always_ready_check_is_evaluated_exactly_once_per_poll() {
        let check = Scripted::new(vec![Attempt::Ready(7)]);
        let policy = PollPolicy::default();
        assert!(poll(&check, &policy).await.is_ready());
        assert!(poll(&check, &policy).await.is_ready());
        assert_eq!(check.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn once_policy_times_out_after_a_single_attempt() {
        let check = Scripted::new(vec![Attempt::NotReady("absent")]);
        let outcome = poll(&check, &PollPolicy::once()).await;
        match outcome {
            PollOutcome::TimedOut { last, waited, .. } => {
                assert_eq!(last, "absent");
                assert_eq!(waited, Duration::ZERO);
            }
            other => panic!("expected TimedOut, got {:?}", other),
        }
        assert_eq!(check.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_reports_the_last_observed_state() {
        let check = Scripted::new(vec![
            Attempt::NotReady("0 of 5 pods ready"),
            Attempt::NotReady("2 of 5 pods ready"),
        ]);
        let policy = PollPolicy::new(Duration::from_secs(5), Duration::from_secs(5));
        match poll(&check, &policy).await {
            PollOutcome::TimedOut { check: id, last, .. } => {
                assert_eq!(id, "scripted");
                assert_eq!(last, "2 of 5 pods ready");
            }
            other => panic!("expected TimedOut, got {:?}", other),
        }
    }
}
