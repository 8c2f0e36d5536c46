//! Vote service: runs one vote request through the whole pipeline.

use std::sync::Arc;
use std::time::Duration;

use tally_oracle::BalanceOracle;
use tally_store::ProjectStore;
use tally_types::{Clock, Project, ProjectId, TokenAmount, WalletAddress};
use tracing::{debug, info};

use crate::auth::authenticate;
use crate::config::VoteServiceConfig;
use crate::eligibility::EligibilityPolicy;
use crate::ledger::VoteLedger;
use crate::repo::StoreAccess;
use crate::request::VoteRequest;
use crate::VoteError;

pub struct VoteService {
    oracle: Arc<dyn BalanceOracle>,
    oracle_timeout: Duration,
    repo: StoreAccess,
    policy: EligibilityPolicy,
    ledger: VoteLedger,
    clock: Arc<dyn Clock>,
}

impl VoteService {
    pub fn new(
        config: VoteServiceConfig,
        oracle: Arc<dyn BalanceOracle>,
        store: Arc<dyn ProjectStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let repo = StoreAccess::new(store, config.store_timeout);
        Self {
            oracle,
            oracle_timeout: config.oracle_timeout,
            ledger: VoteLedger::new(repo.clone(), config.max_save_attempts),
            repo,
            policy: EligibilityPolicy::new(config.eligibility),
            clock,
        }
    }

    /// Validate, authorize and record a vote on `project_id`.
    ///
    /// Stages run in a fixed order and the first failure is returned:
    /// request shape, ballot, balance lookup, project lookup, eligibility,
    /// signature, ledger write. Nothing is written unless every earlier
    /// stage passed. On success the updated project is returned.
    pub async fn cast_vote(
        &self,
        project_id: &ProjectId,
        request: VoteRequest,
    ) -> Result<Project, VoteError> {
        let validated = request.validate()?;
        let ballot = validated.ballot;
        let vote = validated.vote;

        if &ballot.project_id != project_id {
            return Err(VoteError::malformed(
                format!("ballot is for project {}, not {project_id}", ballot.project_id),
                "signedMessage",
            ));
        }

        let weight = self.fetch_weight(&vote.wallet).await?;

        let project = self
            .repo
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| VoteError::ProjectNotFound(project_id.clone()))?;

        let now = self.clock.now();
        self.policy
            .check_eligible(&project, &vote.wallet, &weight, now)?;

        let wallet = authenticate(&vote)?;

        let updated = self
            .ledger
            .record_vote(project_id, &ballot.participant_id, &wallet, weight.clone(), now)
            .await?;

        info!(
            project = %project_id,
            participant = %ballot.participant_id,
            %wallet,
            %weight,
            "vote recorded"
        );
        Ok(updated)
    }

    async fn fetch_weight(&self, wallet: &WalletAddress) -> Result<TokenAmount, VoteError> {
        let weight = tokio::time::timeout(self.oracle_timeout, self.oracle.get_balance(wallet))
            .await
            .map_err(|_| VoteError::OracleUnavailable {
                reason: format!("no answer within {:?}", self.oracle_timeout),
                retryable: true,
            })??;
        debug!(%wallet, %weight, "balance fetched");
        Ok(weight)
    }
}
