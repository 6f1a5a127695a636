//! Polling verifier
//!
//! Azure deletes and provisions asynchronously, so after a lifecycle action
//! the group is polled until it reaches the expected state or the attempt
//! budget runs out. Errors from a single poll are logged and the poll is
//! retried.

use crate::provider::CloudProvider;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// State the group should converge to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    /// Group deleted
    Absent,
    /// Group exists with at least `min_resources` resources
    Present { min_resources: usize },
}

impl std::fmt::Display for Expectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expectation::Absent => write!(f, "absent"),
            Expectation::Present { min_resources } => {
                write!(f, "present with at least {} resources", min_resources)
            }
        }
    }
}

/// One poll of the group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub exists: bool,
    pub resources: usize,
}

impl Observation {
    pub fn absent() -> Self {
        Self {
            exists: false,
            resources: 0,
        }
    }

    pub fn satisfies(&self, expectation: Expectation) -> bool {
        match expectation {
            Expectation::Absent => !self.exists,
            Expectation::Present { min_resources } => {
                self.exists && self.resources >= min_resources
            }
        }
    }
}

impl std::fmt::Display for Observation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.exists {
            write!(f, "exists with {} resources", self.resources)
        } else {
            write!(f, "does not exist")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Confirmed {
        attempts: u32,
        observation: Observation,
    },
    /// Budget exhausted; `last` is the final successful poll, if any
    TimedOut {
        attempts: u32,
        last: Option<Observation>,
    },
}

impl VerifyOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, VerifyOutcome::Confirmed { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            VerifyOutcome::Confirmed { attempts, .. } | VerifyOutcome::TimedOut { attempts, .. } => {
                *attempts
            }
        }
    }
}

/// Polls a resource group until it matches an [`Expectation`]
#[derive(Debug, Clone, Copy)]
pub struct Verifier {
    interval: Duration,
    max_attempts: u32,
}

impl Verifier {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Upper bound on how long [`Verifier::wait_for`] sleeps
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }

    /// Single poll
    pub async fn observe(
        provider: &dyn CloudProvider,
        group: &str,
    ) -> crate::Result<Observation> {
        if !provider.group_exists(group).await? {
            return Ok(Observation::absent());
        }
        let resources = provider.list_resources(group).await?.len();
        Ok(Observation {
            exists: true,
            resources,
        })
    }

    /// Poll until `expectation` holds, sleeping `interval` between polls
    ///
    /// `on_poll` is called after every successful poll with the attempt
    /// number, for progress output.
    pub async fn wait_for(
        &self,
        provider: &dyn CloudProvider,
        group: &str,
        expectation: Expectation,
        on_poll: &mut (dyn FnMut(u32, &Observation) + Send),
    ) -> VerifyOutcome {
        let mut last = None;

        for attempt in 1..=self.max_attempts {
            match Self::observe(provider, group).await {
                Ok(observation) => {
                    debug!(
                        resource_group = group,
                        attempt,
                        %observation,
                        "Verification poll"
                    );
                    on_poll(attempt, &observation);
                    if observation.satisfies(expectation) {
                        return VerifyOutcome::Confirmed {
                            attempts: attempt,
                            observation,
                        };
                    }
                    last = Some(observation);
                }
                Err(e) => {
                    warn!(resource_group = group, attempt, error = %e, "Verification poll failed");
                }
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(self.interval).await;
            }
        }

        warn!(
            resource_group = group,
            attempts = self.max_attempts,
            %expectation,
            "Verification timed out"
        );
        VerifyOutcome::TimedOut {
            attempts: self.max_attempts,
            last,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockProvider;
    use crate::provider::CloudResource;

    fn res(name: &str) -> CloudResource {
        CloudResource::new(format!("/rg-it/{}", name), name, "Microsoft.Web/sites")
    }

    #[test]
    fn test_observation_satisfies() {
        let absent = Observation::absent();
        assert!(absent.satisfies(Expectation::Absent));
        assert!(!absent.satisfies(Expectation::Present { min_resources: 0 }));

        let up = Observation {
            exists: true,
            resources: 14,
        };
        assert!(up.satisfies(Expectation::Present { min_resources: 14 }));
        assert!(!up.satisfies(Expectation::Present { min_resources: 15 }));
        assert!(!up.satisfies(Expectation::Absent));
    }

    #[test]
    fn test_budget() {
        let verifier = Verifier::new(Duration::from_secs(10), 30);
        assert_eq!(verifier.budget(), Duration::from_secs(290));
        // Zero attempts still polls once
        assert_eq!(Verifier::new(Duration::from_secs(1), 0).max_attempts(), 1);
    }

    #[tokio::test]
    async fn test_confirms_absent_group_immediately() {
        let provider = MockProvider::new();
        let verifier = Verifier::new(Duration::from_millis(1), 5);
        let mut polls = 0;

        let outcome = verifier
            .wait_for(&provider, "rg-it", Expectation::Absent, &mut |_, _| polls += 1)
            .await;

        assert_eq!(
            outcome,
            VerifyOutcome::Confirmed {
                attempts: 1,
                observation: Observation::absent()
            }
        );
        assert_eq!(polls, 1);
    }

    #[tokio::test]
    async fn test_waits_for_lingering_group() {
        let provider = MockProvider::builder()
            .group("rg-it", vec![res("web")])
            .linger_polls(2)
            .build();
        provider.delete_group("rg-it").await.unwrap();

        let verifier = Verifier::new(Duration::from_millis(1), 5);
        let outcome = verifier
            .wait_for(&provider, "rg-it", Expectation::Absent, &mut |_, _| {})
            .await;

        assert!(outcome.is_confirmed());
        assert_eq!(outcome.attempts(), 3);
    }

    #[tokio::test]
    async fn test_times_out() {
        let provider = MockProvider::builder()
            .group("rg-it", vec![res("web")])
            .build();

        let verifier = Verifier::new(Duration::from_millis(1), 3);
        let outcome = verifier
            .wait_for(&provider, "rg-it", Expectation::Absent, &mut |_, _| {})
            .await;

        assert_eq!(
            outcome,
            VerifyOutcome::TimedOut {
                attempts: 3,
                last: Some(Observation {
                    exists: true,
                    resources: 1
                })
            }
        );
    }

    #[tokio::test]
    async fn test_present_needs_enough_resources() {
        let provider = MockProvider::builder()
            .group("rg-it", vec![res("web"), res("api")])
            .build();
        let verifier = Verifier::new(Duration::from_millis(1), 2);

        let enough = verifier
            .wait_for(
                &provider,
                "rg-it",
                Expectation::Present { min_resources: 2 },
                &mut |_, _| {},
            )
            .await;
        assert!(enough.is_confirmed());

        let short = verifier
            .wait_for(
                &provider,
                "rg-it",
                Expectation::Present { min_resources: 3 },
                &mut |_, _| {},
            )
            .await;
        assert!(!short.is_confirmed());
    }

    #[tokio::test]
    async fn test_poll_errors_are_retried() {
        let provider = MockProvider::builder().failing_polls(2).build();
        let verifier = Verifier::new(Duration::from_millis(1), 4);
        let mut seen = Vec::new();

        let outcome = verifier
            .wait_for(&provider, "rg-it", Expectation::Absent, &mut |attempt, _| {
                seen.push(attempt)
            })
            .await;

        assert!(outcome.is_confirmed());
        assert_eq!(seen, vec![3]);
    }
}
