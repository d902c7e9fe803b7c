//! # Retry Policies
//!
//! A policy is built fresh for every logical operation and asked, after each
//! transient failure, whether to resubmit. Decisions depend only on the
//! failure code, the number of submissions made so far, and state captured at
//! construction (e.g. the start instant of a [`TimeBudget`]).
//!
//! `attempt` is 1-based: after the first submission fails, `attempt == 1`.
//!
//! | Policy | Retries | Delay |
//! |--------|---------|-------|
//! | [`DefaultRetryPolicy`] | `RequestTimedOut` only | none |
//! | [`ExponentialBackoffPolicy`] | every transient code | `base * 2^(attempt-1)`, capped, jittered |
//! | [`NeverRetry`] | nothing | - |
//! | [`TimeBudget`] | as the wrapped policy, until the budget is spent | as the wrapped policy |

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::errors::ConfigError;
use super::outcome::ErrorCode;

/// What to do after a transient failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    GiveUp,
}

/// Per-operation retry decision object.
pub trait RetryPolicy: Send {
    /// Whether a transient failure with `code` after `attempt` submissions
    /// should be resubmitted.
    fn should_retry(&self, code: ErrorCode, attempt: u32) -> bool;

    /// Pause before the next submission.
    fn delay(&self, attempt: u32) -> Duration;

    /// Upper bound on submissions this policy will ever allow.
    fn max_attempts(&self) -> u32;

    fn decide(&self, code: ErrorCode, attempt: u32) -> RetryDecision {
        if self.should_retry(code, attempt) {
            RetryDecision::RetryAfter(self.delay(attempt))
        } else {
            RetryDecision::GiveUp
        }
    }
}

/// Builds one policy per logical operation.
pub trait RetryPolicyFactory: Send + Sync {
    fn create(&self) -> Box<dyn RetryPolicy>;
}

impl<F> RetryPolicyFactory for F
where
    F: Fn() -> Box<dyn RetryPolicy> + Send + Sync,
{
    fn create(&self) -> Box<dyn RetryPolicy> {
        self()
    }
}

// =============================================================================
// POLICIES
// =============================================================================

/// Retries only `RequestTimedOut`, immediately, up to `max_attempts`
/// submissions in total.
#[derive(Debug, Clone, Copy)]
pub struct DefaultRetryPolicy {
    max_attempts: u32,
}

impl DefaultRetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }
}

impl Default for DefaultRetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS)
    }
}

impl RetryPolicy for DefaultRetryPolicy {
    fn should_retry(&self, code: ErrorCode, attempt: u32) -> bool {
        code == ErrorCode::RequestTimedOut && attempt < self.max_attempts
    }

    fn delay(&self, _attempt: u32) -> Duration {
        Duration::ZERO
    }

    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

/// Retries every transient code with exponential backoff.
///
/// With jitter enabled, 0-50% of the computed delay is added so that many
/// operations failing together do not resubmit in lockstep. The result is
/// still capped at `max_delay`.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoffPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    jitter: bool,
}

impl ExponentialBackoffPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration, jitter: bool) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            jitter,
        }
    }

    fn unjittered(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }
}

impl RetryPolicy for ExponentialBackoffPolicy {
    fn should_retry(&self, code: ErrorCode, attempt: u32) -> bool {
        code.is_transient() && attempt < self.max_attempts
    }

    fn delay(&self, attempt: u32) -> Duration {
        let delay = self.unjittered(attempt);
        if !self.jitter || delay.is_zero() {
            return delay;
        }
        let extra_ms = rand::thread_rng().gen_range(0..=delay.as_millis() as u64 / 2);
        (delay + Duration::from_millis(extra_ms)).min(self.max_delay)
    }

    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

/// Gives up on the first failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverRetry;

impl RetryPolicy for NeverRetry {
    fn should_retry(&self, _code: ErrorCode, _attempt: u32) -> bool {
        false
    }

    fn delay(&self, _attempt: u32) -> Duration {
        Duration::ZERO
    }

    fn max_attempts(&self) -> u32 {
        1
    }
}

/// Wraps a policy with a wall-clock ceiling measured from construction.
///
/// A retry is refused if the budget is already spent or would be spent by
/// the wrapped policy's delay.
#[derive(Debug)]
pub struct TimeBudget<P> {
    inner: P,
    budget: Duration,
    started: Instant,
}

impl<P: RetryPolicy> TimeBudget<P> {
    pub fn new(inner: P, budget: Duration) -> Self {
        Self {
            inner,
            budget,
            started: Instant::now(),
        }
    }

    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.started.elapsed())
    }
}

impl<P: RetryPolicy> RetryPolicy for TimeBudget<P> {
    fn should_retry(&self, code: ErrorCode, attempt: u32) -> bool {
        self.inner.should_retry(code, attempt) && self.inner.delay(attempt) < self.remaining()
    }

    fn delay(&self, attempt: u32) -> Duration {
        self.inner.delay(attempt)
    }

    fn max_attempts(&self) -> u32 {
        self.inner.max_attempts()
    }

    // Delay computed once so the jittered value checked is the one returned.
    fn decide(&self, code: ErrorCode, attempt: u32) -> RetryDecision {
        if !self.inner.should_retry(code, attempt) {
            return RetryDecision::GiveUp;
        }
        let delay = self.inner.delay(attempt);
        if delay < self.remaining() {
            RetryDecision::RetryAfter(delay)
        } else {
            RetryDecision::GiveUp
        }
    }
}

impl RetryPolicy for Box<dyn RetryPolicy> {
    fn should_retry(&self, code: ErrorCode, attempt: u32) -> bool {
        (**self).should_retry(code, attempt)
    }

    fn delay(&self, attempt: u32) -> Duration {
        (**self).delay(attempt)
    }

    fn max_attempts(&self) -> u32 {
        (**self).max_attempts()
    }

    fn decide(&self, code: ErrorCode, attempt: u32) -> RetryDecision {
        (**self).decide(code, attempt)
    }
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Which policy family [`RetryConfig`] builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryStrategy {
    #[default]
    Default,
    Exponential,
    Never,
}

/// Retry configuration; also the default [`RetryPolicyFactory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub strategy: RetryStrategy,
    /// Total submissions allowed per operation (first one included)
    pub max_attempts: u32,
    /// First backoff step (exponential strategy)
    #[serde(with = "shared_types::duration_serde")]
    pub base_delay: Duration,
    /// Backoff ceiling (exponential strategy)
    #[serde(with = "shared_types::duration_serde")]
    pub max_delay: Duration,
    pub jitter: bool,
    /// Optional wall-clock ceiling per operation; off when absent
    #[serde(with = "shared_types::duration_serde::option")]
    pub time_budget: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            strategy: RetryStrategy::Default,
            max_attempts: DefaultRetryPolicy::DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
            jitter: true,
            time_budget: None,
        }
    }
}

impl RetryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retry.max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.base_delay > self.max_delay {
            return Err(ConfigError::InvalidValue {
                field: "retry.base_delay",
                reason: format!(
                    "{:?} exceeds max_delay {:?}",
                    self.base_delay, self.max_delay
                ),
            });
        }
        if self.time_budget == Some(Duration::ZERO) {
            return Err(ConfigError::InvalidValue {
                field: "retry.time_budget",
                reason: "must be positive when set".to_string(),
            });
        }
        Ok(())
    }

    fn base_policy(&self) -> Box<dyn RetryPolicy> {
        match self.strategy {
            RetryStrategy::Default => Box::new(DefaultRetryPolicy::new(self.max_attempts)),
            RetryStrategy::Exponential => Box::new(ExponentialBackoffPolicy::new(
                self.max_attempts,
                self.base_delay,
                self.max_delay,
                self.jitter,
            )),
            RetryStrategy::Never => Box::new(NeverRetry),
        }
    }
}

impl RetryPolicyFactory for RetryConfig {
    fn create(&self) -> Box<dyn RetryPolicy> {
        let policy = self.base_policy();
        match self.time_budget {
            Some(budget) => Box::new(TimeBudget::new(policy, budget)),
            None => policy,
        }
    }
}
