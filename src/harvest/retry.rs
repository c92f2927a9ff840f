//! Bounded retry combinator
//!
//! `retry` runs an async operation until it succeeds, fails with a
//! non-retryable error, or uses up the attempts allowed by a [`RetryPolicy`].

use crate::config::FetchConfig;
use std::future::Future;
use std::time::Duration;

/// Delay applied between two attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Retry immediately
    None,

    /// Sleep the same interval before every retry
    Fixed(Duration),
}

impl Backoff {
    /// Returns the delay to wait after a failed attempt
    pub fn delay(&self) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Fixed(delay) => *delay,
        }
    }
}

/// How many times an operation is attempted and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one; never less than 1
    pub max_attempts: u32,

    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: Backoff::Fixed(delay),
        }
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self::fixed(config.max_retries, config.retry_sleep())
    }
}

/// Terminal outcome of a retried operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// Every allowed attempt failed; `last` is the final error
    Exhausted { attempts: u32, last: E },

    /// The operation failed with an error the caller marked as not retryable
    Fatal { attempt: u32, error: E },
}

impl<E> RetryError<E> {
    /// Number of attempts made before giving up
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } => *attempts,
            Self::Fatal { attempt, .. } => *attempt,
        }
    }

    /// The last error seen
    pub fn into_inner(self) -> E {
        match self {
            Self::Exhausted { last, .. } => last,
            Self::Fatal { error, .. } => error,
        }
    }
}

/// Runs `op` until it succeeds or the policy gives up
///
/// `op` receives the 1-based attempt number. Errors for which `is_retryable`
/// returns false end the loop at once.
///
/// # Example
///
/// ```
/// use ces_harvest::harvest::{retry, Backoff, RetryPolicy};
///
/// # async fn example() {
/// let policy = RetryPolicy { max_attempts: 3, backoff: Backoff::None };
/// let result: Result<u32, _> = retry(&policy, |_: &String| true, |attempt| async move {
///     if attempt < 3 { Err(format!("attempt {} failed", attempt)) } else { Ok(attempt) }
/// })
/// .await;
/// assert_eq!(result.unwrap(), 3);
/// # }
/// ```
pub async fn retry<T, E, F, Fut, R>(
    policy: &RetryPolicy,
    is_retryable: R,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) if !is_retryable(&error) => {
                return Err(RetryError::Fatal { attempt, error });
            }
            Err(error) => {
                if attempt >= max_attempts {
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last: error,
                    });
                }

                let delay = policy.backoff.delay();
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                attempt += 1;
            }
        }
    }
}
