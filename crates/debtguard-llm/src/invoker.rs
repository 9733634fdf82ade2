use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use debtguard_core::errors::{GatewayError, GenerationError};
use debtguard_core::provider::{GenerationProvider, GenerationRequest, Generator};
use debtguard_settings::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAYS_MS};

/// Returned in place of model text when a response carries none.
pub const NO_RESPONSE_SENTINEL: &str = "Error: Sin respuesta del modelo.";

/// Attempt budget plus a fixed (unjittered) delay schedule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delays: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed_backoff()
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delays: Vec<Duration>) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delays,
        }
    }

    /// Five attempts, waiting 1s, 2s, 4s, 8s between them.
    pub fn fixed_backoff() -> Self {
        Self::from_millis(DEFAULT_MAX_ATTEMPTS, &DEFAULT_RETRY_DELAYS_MS)
    }

    pub fn from_millis(max_attempts: u32, delays_ms: &[u64]) -> Self {
        Self::new(
            max_attempts,
            delays_ms.iter().copied().map(Duration::from_millis).collect(),
        )
    }

    /// No waiting between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Vec::new())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay after the `attempt`-th failure (1-based). The last schedule
    /// entry repeats; an empty schedule means no delay.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let idx = attempt.saturating_sub(1) as usize;
        self.delays
            .get(idx)
            .or_else(|| self.delays.last())
            .copied()
            .unwrap_or(Duration::ZERO)
    }
}

/// Wraps a [`GenerationProvider`] with bounded retries.
///
/// - Every attempt failure is retried until the policy is exhausted
/// - No sleep after the final attempt
/// - A response without text resolves to [`NO_RESPONSE_SENTINEL`], not an error
pub struct Invoker<P: GenerationProvider> {
    inner: P,
    policy: RetryPolicy,
    total_attempts: AtomicU64,
    total_retries: AtomicU64,
}

impl<P: GenerationProvider> Invoker<P> {
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            total_attempts: AtomicU64::new(0),
            total_retries: AtomicU64::new(0),
        }
    }

    pub fn with_defaults(inner: P) -> Self {
        Self::new(inner, RetryPolicy::default())
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn total_attempts(&self) -> u64 {
        self.total_attempts.load(Ordering::Relaxed)
    }

    pub fn total_retries(&self) -> u64 {
        self.total_retries.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl<P: GenerationProvider> Generator for Invoker<P> {
    fn has_credential(&self) -> bool {
        self.inner.has_credential()
    }

    async fn invoke(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let max_attempts = self.policy.max_attempts;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            self.total_attempts.fetch_add(1, Ordering::Relaxed);

            let err: GatewayError = match self.inner.generate(&request).await {
                Ok(text) => {
                    debug!(attempt, provider = self.inner.name(), "generation succeeded");
                    return Ok(text.unwrap_or_else(|| NO_RESPONSE_SENTINEL.to_string()));
                }
                Err(e) => e,
            };

            if attempt >= max_attempts {
                error!(
                    attempts = attempt,
                    error = %err,
                    kind = err.error_kind(),
                    "generation failed after exhausting retries"
                );
                return Err(GenerationError::exhausted(attempt, err));
            }

            let delay = self.policy.delay_after(attempt);
            self.total_retries.fetch_add(1, Ordering::Relaxed);

            warn!(
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                kind = err.error_kind(),
                "retrying after error"
            );

            tokio::time::sleep(delay).await;
        }
    }
}
