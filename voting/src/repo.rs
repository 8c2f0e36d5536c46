//! Time-bounded access to the project repository from async code.
//!
//! Repository implementations are synchronous (LMDB, in-memory), so every
//! call runs on the blocking pool and is cut off after `timeout`. A save that
//! times out may still land; the version guard keeps that harmless and a
//! retry of the same vote then reports `AlreadyVoted`.

use std::sync::Arc;
use std::time::Duration;

use tally_store::{ProjectStore, StoreError};
use tally_types::{Project, ProjectId};

use crate::VoteError;

#[derive(Clone)]
pub struct StoreAccess {
    store: Arc<dyn ProjectStore>,
    timeout: Duration,
}

impl StoreAccess {
    pub fn new(store: Arc<dyn ProjectStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, VoteError> {
        let id = id.clone();
        self.run("project load", move |store| store.find_by_id(&id))
            .await
    }

    /// Conditional save. Returns the project with its new version.
    pub async fn save(&self, mut project: Project) -> Result<Project, VoteError> {
        self.run("project save", move |store| {
            store.save(&mut project)?;
            Ok(project)
        })
        .await
    }

    async fn run<T, F>(&self, what: &'static str, op: F) -> Result<T, VoteError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn ProjectStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = self.store.clone();
        let task = tokio::task::spawn_blocking(move || op(store.as_ref()));
        match tokio::time::timeout(self.timeout, task).await {
            Err(_) => Err(VoteError::Timeout(what)),
            Ok(Err(join_err)) => Err(VoteError::Internal(format!("{what} task failed: {join_err}"))),
            Ok(Ok(result)) => result.map_err(VoteError::from),
        }
    }
}
