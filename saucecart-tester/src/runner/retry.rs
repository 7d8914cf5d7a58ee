use crate::fixture::Fixture;

/// Re-runs allowed after the first failed attempt.
pub const MAX_RETRIES: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Run again; `attempt` is the 1-based number of the upcoming attempt.
    Retry { attempt: u32 },
    GiveUp,
}

/// Retries used by one test-method invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryCounter {
    used: u32,
    limit: u32,
}

impl RetryCounter {
    #[must_use]
    pub const fn used(&self) -> u32 {
        self.used
    }

    #[must_use]
    pub const fn can_retry(&self) -> bool {
        self.used < self.limit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(MAX_RETRIES)
    }
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Fresh counter for one invocation; counters are never shared between methods.
    #[must_use]
    pub const fn counter(&self) -> RetryCounter {
        RetryCounter {
            used: 0,
            limit: self.max_retries,
        }
    }

    /// Called after a failed attempt. When a retry remains, the fixture gets a
    /// brand-new session before the decision is returned. A session that cannot
    /// be started ends the retries; the failure just seen becomes final.
    pub async fn intercept(
        &self,
        counter: &mut RetryCounter,
        fixture: &mut Fixture,
    ) -> RetryDecision {
        if !counter.can_retry() {
            log::info!(
                "Retry budget of {} exhausted for {}",
                self.max_retries,
                fixture.suite().name()
            );
            return RetryDecision::GiveUp;
        }
        counter.used += 1;
        log::info!(
            "Retrying test (retry {} of {}) on {}",
            counter.used,
            self.max_retries,
            fixture.suite().name()
        );
        if let Err(err) = fixture.reprovision().await {
            log::error!("Failed to start a fresh session for the retry: {err}");
            return RetryDecision::GiveUp;
        }
        RetryDecision::Retry {
            attempt: counter.used + 1,
        }
    }
}
