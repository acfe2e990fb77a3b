//! Bounded retry with a fixed delay between attempts.
//!
//! Every readiness check polls through [`retry_after`]. Probes classify their
//! own failures as [`ProbeError::Retriable`] or [`ProbeError::Fatal`]; the
//! loop only reads the tag.

use std::future::Future;
use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::Result;

use crate::application::ports::{ProgressReporter, Sleeper};
use crate::domain::error::ProbeError;

/// How many times to try and how long to wait in between.
///
/// The delay is constant; there is no backoff growth. Worst-case time spent
/// sleeping is `(max_attempts - 1) * delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: NonZeroU32,
    pub delay: Duration,
}

const fn attempts(n: u32) -> NonZeroU32 {
    match NonZeroU32::new(n) {
        Some(n) => n,
        None => panic!("a retry policy needs at least one attempt"),
    }
}

impl RetryPolicy {
    /// Node boot: `exit 0` over SSH.
    pub const SSH: Self = Self::fixed(attempts(60), Duration::from_secs(1));
    /// Resource type becoming queryable before a mutation.
    pub const RESOURCE_EXISTENCE: Self = Self::fixed(attempts(40), Duration::from_secs(3));
    /// A configmap field being filled in.
    pub const FIELD_POPULATION: Self = Self::fixed(attempts(90), Duration::from_secs(2));
    /// `delete pod --all` being accepted.
    pub const POD_DELETION: Self = Self::fixed(attempts(60), Duration::from_secs(1));

    #[must_use]
    pub const fn fixed(max_attempts: NonZeroU32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// # Errors
    ///
    /// Returns an error if `max_attempts` is zero.
    pub fn new(max_attempts: u32, delay: Duration) -> Result<Self> {
        let max_attempts = NonZeroU32::new(max_attempts)
            .ok_or_else(|| anyhow::anyhow!("max_attempts must be at least 1"))?;
        Ok(Self::fixed(max_attempts, delay))
    }

    /// Upper bound on total sleep time.
    #[must_use]
    pub fn max_wait(&self) -> Duration {
        self.delay * (self.max_attempts.get() - 1)
    }
}

/// Run `probe` until it succeeds, fails fatally, or runs out of attempts.
///
/// - `Ok` returns at once, without a trailing sleep.
/// - `Fatal` returns its inner error at once, without sleeping.
/// - `Retriable` sleeps `policy.delay` and tries again while attempts remain;
///   on the last attempt the inner error is returned untagged.
///
/// # Errors
///
/// Returns the probe's fatal error, or its last retriable error once
/// `policy.max_attempts` is used up.
pub async fn retry_after<T, F, Fut>(
    policy: RetryPolicy,
    sleeper: &impl Sleeper,
    reporter: &impl ProgressReporter,
    operation: &str,
    mut probe: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProbeError>>,
{
    let max_attempts = policy.max_attempts.get();
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        match probe().await {
            Ok(value) => {
                if attempt > 1 {
                    reporter.debug(&format!("{operation}: succeeded on attempt {attempt}"));
                }
                return Ok(value);
            }
            Err(ProbeError::Fatal(err)) => return Err(err),
            Err(ProbeError::Retriable(err)) => {
                if attempt >= max_attempts {
                    reporter.warn(&format!(
                        "{operation}: giving up after {attempt} attempts: {err:#}"
                    ));
                    return Err(err);
                }
                reporter.debug(&format!(
                    "{operation}: attempt {attempt}/{max_attempts} failed, retrying in {}ms: {err:#}",
                    policy.delay.as_millis()
                ));
                sleeper.sleep(policy.delay).await;
            }
        }
    }
}

/// Sleeper and reporter bundled for the readiness checks.
pub struct Retrier<'a, S, R> {
    sleeper: &'a S,
    reporter: &'a R,
}

impl<'a, S: Sleeper, R: ProgressReporter> Retrier<'a, S, R> {
    #[must_use]
    pub fn new(sleeper: &'a S, reporter: &'a R) -> Self {
        Self { sleeper, reporter }
    }

    #[must_use]
    pub fn reporter(&self) -> &'a R {
        self.reporter
    }

    /// [`retry_after`] with this retrier's sleeper and reporter.
    ///
    /// # Errors
    ///
    /// Same as [`retry_after`].
    pub async fn run<T, F, Fut>(&self, policy: RetryPolicy, operation: &str, probe: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProbeError>>,
    {
        retry_after(policy, self.sleeper, self.reporter, operation, probe).await
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod proptests {
    use std::cell::Cell;

    use proptest::prelude::*;

    use super::*;
    use crate::application::test_support::{RecordingReporter, SpySleeper, block_on};

    #[derive(Debug, Clone, Copy)]
    enum Outcome {
        Retriable,
        Fatal,
        Success,
    }

    /// Probe that fails retriably until `k`, then produces `outcome`.
    fn run(n: u32, k: u32, outcome: Outcome) -> (Result<u32>, u32, usize) {
        let sleeper = SpySleeper::default();
        let calls = Cell::new(0u32);
        let policy = RetryPolicy::new(n, Duration::from_millis(1)).expect("policy");
        let result = block_on(retry_after(
            policy,
            &sleeper,
            &RecordingReporter::default(),
            "prop",
            || {
                calls.set(calls.get() + 1);
                let attempt = calls.get();
                async move {
                    match (attempt == k, outcome) {
                        (true, Outcome::Success) => Ok(attempt),
                        (true, Outcome::Fatal) => Err(ProbeError::fatal(anyhow::anyhow!("fatal"))),
                        _ => Err(ProbeError::retriable(anyhow::anyhow!("retry {attempt}"))),
                    }
                }
            },
        ));
        (result, calls.get(), sleeper.count())
    }

    proptest! {
        /// always-retriable probe runs exactly n times with n-1 sleeps
        #[test]
        fn prop_retriable_runs_n_times(n in 1u32..40) {
            let (result, calls, sleeps) = run(n, 0, Outcome::Retriable);
            prop_assert!(result.is_err());
            prop_assert_eq!(calls, n);
            prop_assert_eq!(sleeps, (n - 1) as usize);
        }

        /// fatal on attempt k < n stops after k calls and k-1 sleeps
        #[test]
        fn prop_fatal_stops_at_k((n, k) in (2u32..40).prop_flat_map(|n| (Just(n), 1..n))) {
            let (result, calls, sleeps) = run(n, k, Outcome::Fatal);
            prop_assert_eq!(result.unwrap_err().to_string(), "fatal");
            prop_assert_eq!(calls, k);
            prop_assert_eq!(sleeps, (k - 1) as usize);
        }

        /// success on attempt k <= n returns after k calls and k-1 sleeps
        #[test]
        fn prop_success_stops_at_k((n, k) in (1u32..40).prop_flat_map(|n| (Just(n), 1..=n))) {
            let (result, calls, sleeps) = run(n, k, Outcome::Success);
            prop_assert_eq!(result.expect("success"), k);
            prop_assert_eq!(calls, k);
            prop_assert_eq!(sleeps, (k - 1) as usize);
        }
    }
}
