//! Vote ledger: the one place a project is mutated.
//!
//! Recording a vote is a read-check-modify-write over the whole project
//! aggregate. Two guards make it atomic:
//!
//! - a per-project async mutex, held from the load through the save, so two
//!   requests in this process can never both pass the duplicate check;
//! - the repository's version-checked save, so a writer in another process
//!   that got in between load and save turns our write into a conflict. On
//!   conflict the whole step is redone against fresh state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tally_store::StoreError;
use tally_types::{ParticipantId, Project, ProjectId, Timestamp, TokenAmount, VoteRecord, WalletAddress};
use tracing::{debug, warn};

use crate::repo::StoreAccess;
use crate::VoteError;

type ProjectLock = Arc<tokio::sync::Mutex<()>>;

pub struct VoteLedger {
    repo: StoreAccess,
    locks: Mutex<HashMap<ProjectId, ProjectLock>>,
    max_save_attempts: u32,
}

impl VoteLedger {
    pub fn new(repo: StoreAccess, max_save_attempts: u32) -> Self {
        Self {
            repo,
            locks: Mutex::new(HashMap::new()),
            max_save_attempts: max_save_attempts.max(1),
        }
    }

    /// Record `wallet`'s vote for `participant_id` with `weight`.
    ///
    /// Fails with `ProjectNotFound`, `AlreadyVoted` or `ParticipantNotFound`
    /// without writing anything. Returns the project as persisted.
    pub async fn record_vote(
        &self,
        project_id: &ProjectId,
        participant_id: &ParticipantId,
        wallet: &WalletAddress,
        weight: TokenAmount,
        now: Timestamp,
    ) -> Result<Project, VoteError> {
        let lease = self.lease(project_id);
        let _guard = lease.lock.lock().await;
        self.apply(project_id, participant_id, wallet, &weight, now)
            .await
    }

    async fn apply(
        &self,
        project_id: &ProjectId,
        participant_id: &ParticipantId,
        wallet: &WalletAddress,
        weight: &TokenAmount,
        now: Timestamp,
    ) -> Result<Project, VoteError> {
        for attempt in 1..=self.max_save_attempts {
            let mut project = self
                .repo
                .find_by_id(project_id)
                .await?
                .ok_or_else(|| VoteError::ProjectNotFound(project_id.clone()))?;

            if project.has_voted(wallet) {
                return Err(VoteError::AlreadyVoted(wallet.clone()));
            }

            let participant = project
                .participant_mut(participant_id)
                .ok_or_else(|| VoteError::ParticipantNotFound(participant_id.clone()))?;
            participant.vote_count += weight;

            project.vote_history.push(VoteRecord {
                wallet: wallet.clone(),
                weight: weight.clone(),
                vote_date: now,
                participant_id: participant_id.clone(),
            });

            match self.repo.save(project).await {
                Ok(saved) => return Ok(saved),
                Err(VoteError::Store(StoreError::Conflict { expected, found, .. })) => {
                    debug!(
                        project = %project_id,
                        attempt,
                        expected,
                        found,
                        "concurrent project write, reloading"
                    );
                }
                Err(e) => return Err(e),
            }
        }
        warn!(project = %project_id, attempts = self.max_save_attempts, "gave up after repeated conflicts");
        Err(VoteError::Contention(project_id.clone()))
    }

    fn lease(&self, project_id: &ProjectId) -> LockLease<'_> {
        let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
        let lock = locks.entry(project_id.clone()).or_default().clone();
        LockLease {
            ledger: self,
            project_id: project_id.clone(),
            lock,
        }
    }

    #[cfg(test)]
    fn tracked_locks(&self) -> usize {
        self.locks.lock().unwrap().len()
    }
}

/// A request's claim on a project lock. Dropping it, including when the
/// request future is cancelled while waiting, forgets the map entry once no
/// other request holds or waits on it.
struct LockLease<'a> {
    ledger: &'a VoteLedger,
    project_id: ProjectId,
    lock: ProjectLock,
}

impl Drop for LockLease<'_> {
    fn drop(&mut self) {
        let mut locks = self.ledger.locks.lock().unwrap_or_else(|p| p.into_inner());
        // The map and this lease are the only owners left.
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.project_id);
        }
    }
}
