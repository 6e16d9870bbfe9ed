use async_trait::async_trait;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Bounded attempts with a fixed pause between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackoffOutcome {
    Succeeded { attempts: u32 },
    Exhausted { attempts: u32, last_error: String },
    Cancelled { attempts: u32 },
}

impl BackoffOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            BackoffOutcome::Succeeded { attempts }
            | BackoffOutcome::Exhausted { attempts, .. }
            | BackoffOutcome::Cancelled { attempts } => *attempts,
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self, BackoffOutcome::Succeeded { .. })
    }
}

/// Retry driver. Sleeping goes through [`Sleeper`] so tests never wait on
/// real time, and the wait can be cut short through the cancellation token.
#[derive(Clone)]
pub struct Backoff {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    cancel: CancellationToken,
}

impl Backoff {
    pub fn new(policy: RetryPolicy, sleeper: Arc<dyn Sleeper>, cancel: CancellationToken) -> Self {
        Self { policy, sleeper, cancel }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Runs `op` until it succeeds, attempts run out, or the token fires.
    /// `on_failure` sees every failed attempt with its 1-based number.
    pub async fn run<F, Fut, E, L>(&self, mut op: F, mut on_failure: L) -> BackoffOutcome
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
        L: FnMut(u32, &E),
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            if self.cancel.is_cancelled() {
                return BackoffOutcome::Cancelled { attempts: attempt };
            }

            attempt += 1;
            let err = match op(attempt).await {
                Ok(()) => return BackoffOutcome::Succeeded { attempts: attempt },
                Err(e) => e,
            };

            on_failure(attempt, &err);

            if attempt >= max_attempts {
                return BackoffOutcome::Exhausted {
                    attempts: attempt,
                    last_error: err.to_string(),
                };
            }

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    warn!(attempt, "Retry wait cancelled");
                    return BackoffOutcome::Cancelled { attempts: attempt };
                }
                _ = self.sleeper.sleep(self.policy.delay) => {}
            }
        }
    }
}
