//! Eligibility policy: voting window and minimum balance.
//!
//! The window is inclusive at both ends. A vote at exactly `start_date` or
//! exactly `end_date` counts; one millisecond outside does not.

use serde::{Deserialize, Serialize};
use tally_types::{Project, Timestamp, TokenAmount, WalletAddress};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EligibilityError {
    #[error("voting opens at {starts_at}")]
    VotingNotStarted { starts_at: Timestamp },

    #[error("voting closed at {ended_at}")]
    VotingEnded { ended_at: Timestamp },

    #[error("balance {have} is below the minimum of {need}")]
    InsufficientBalance { have: TokenAmount, need: TokenAmount },
}

/// Deployment-supplied eligibility settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EligibilityConfig {
    /// Minimum weight needed to vote. `None` disables the check.
    pub min_vote_tokens: Option<TokenAmount>,
}

pub struct EligibilityPolicy {
    config: EligibilityConfig,
}

impl EligibilityPolicy {
    pub fn new(config: EligibilityConfig) -> Self {
        Self { config }
    }

    /// Decide whether `wallet`, holding `weight`, may vote on `project` at `now`.
    ///
    /// Checks run in order: window start, window end, balance.
    pub fn check_eligible(
        &self,
        project: &Project,
        wallet: &WalletAddress,
        weight: &TokenAmount,
        now: Timestamp,
    ) -> Result<(), EligibilityError> {
        if now < project.start_date {
            return Err(EligibilityError::VotingNotStarted {
                starts_at: project.start_date,
            });
        }
        if now > project.end_date {
            return Err(EligibilityError::VotingEnded {
                ended_at: project.end_date,
            });
        }
        if let Some(min) = &self.config.min_vote_tokens {
            if weight < min {
                return Err(EligibilityError::InsufficientBalance {
                    have: weight.clone(),
                    need: min.clone(),
                });
            }
        }
        debug!(project = %project.id, %wallet, %weight, %now, "wallet eligible");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_types::Participant;

    fn project() -> Project {
        Project::new(
            "p1",
            "Round",
            Timestamp::from_millis(1000),
            Timestamp::from_millis(2000),
            vec![Participant::new("a", "Alice")],
        )
    }

    fn wallet() -> WalletAddress {
        WalletAddress::from_bytes([7; 20])
    }

    fn policy(min: Option<u64>) -> EligibilityPolicy {
        EligibilityPolicy::new(EligibilityConfig {
            min_vote_tokens: min.map(TokenAmount::from_u64),
        })
    }

    fn check(policy: &EligibilityPolicy, weight: u64, now: u64) -> Result<(), EligibilityError> {
        policy.check_eligible(
            &project(),
            &wallet(),
            &TokenAmount::from_u64(weight),
            Timestamp::from_millis(now),
        )
    }

    #[test]
    fn window_is_inclusive_at_both_ends() {
        let p = policy(None);
        assert_eq!(check(&p, 1, 1000), Ok(()));
        assert_eq!(check(&p, 1, 2000), Ok(()));
        assert_eq!(check(&p, 1, 1500), Ok(()));
    }

    #[test]
    fn one_millisecond_early_is_rejected() {
        assert_eq!(
            check(&policy(None), 1, 999),
            Err(EligibilityError::VotingNotStarted {
                starts_at: Timestamp::from_millis(1000)
            })
        );
    }

    #[test]
    fn one_millisecond_late_is_rejected() {
        assert_eq!(
            check(&policy(None), 1, 2001),
            Err(EligibilityError::VotingEnded {
                ended_at: Timestamp::from_millis(2000)
            })
        );
    }

    #[test]
    fn threshold_enforced_when_configured() {
        let p = policy(Some(50));
        assert_eq!(check(&p, 100, 1500), Ok(()));
        assert_eq!(check(&p, 50, 1500), Ok(()));
        assert!(matches!(
            check(&p, 10, 1500),
            Err(EligibilityError::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn no_threshold_allows_zero_weight() {
        assert_eq!(check(&policy(None), 0, 1500), Ok(()));
    }

    #[test]
    fn window_checked_before_balance() {
        assert!(matches!(
            check(&policy(Some(50)), 10, 3000),
            Err(EligibilityError::VotingEnded { .. })
        ));
    }

    #[test]
    fn fractional_weights_compare_exactly() {
        let p = EligibilityPolicy::new(EligibilityConfig {
            min_vote_tokens: Some(TokenAmount::parse("0.000000000000000002").unwrap()),
        });
        let weight = TokenAmount::parse("0.000000000000000001").unwrap();
        assert!(p
            .check_eligible(&project(), &wallet(), &weight, Timestamp::from_millis(1500))
            .is_err());
    }
}
