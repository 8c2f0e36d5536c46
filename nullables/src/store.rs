//! Nullable store: thread-safe in-memory project storage for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tally_store::{ProjectStore, StoreError};
use tally_types::{Project, ProjectId};

/// An in-memory project store with the same version-checked save semantics
/// as the LMDB backend.
///
/// Thread-safe for use with tokio's multi-threaded runtime. Calls are meant
/// to run on the blocking pool, so injected latency is a plain thread sleep.
pub struct NullProjectStore {
    projects: Mutex<HashMap<ProjectId, Project>>,
    latency: Mutex<Duration>,
    unavailable: AtomicBool,
    pending_conflicts: AtomicU32,
    saves: AtomicU64,
}

impl NullProjectStore {
    pub fn new() -> Self {
        Self {
            projects: Mutex::new(HashMap::new()),
            latency: Mutex::new(Duration::ZERO),
            unavailable: AtomicBool::new(false),
            pending_conflicts: AtomicU32::new(0),
            saves: AtomicU64::new(0),
        }
    }

    /// Delay every call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    /// Make every call fail with a backend error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Fail the next `n` saves with a version conflict, as if another writer
    /// got in first. The stored document is left untouched.
    pub fn inject_conflicts(&self, n: u32) {
        self.pending_conflicts.store(n, Ordering::SeqCst);
    }

    /// Number of saves that were committed.
    pub fn save_count(&self) -> u64 {
        self.saves.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Result<(), StoreError> {
        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            std::thread::sleep(latency);
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("null store marked unavailable".into()));
        }
        Ok(())
    }

    fn take_injected_conflict(&self) -> bool {
        self.pending_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Default for NullProjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectStore for NullProjectStore {
    fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, StoreError> {
        self.enter()?;
        Ok(self.projects.lock().unwrap().get(id).cloned())
    }

    fn save(&self, project: &mut Project) -> Result<(), StoreError> {
        self.enter()?;
        let mut projects = self.projects.lock().unwrap();
        let found = projects.get(&project.id).map_or(0, |p| p.version);
        if self.take_injected_conflict() {
            return Err(StoreError::Conflict {
                id: project.id.to_string(),
                expected: project.version,
                found: found + 1,
            });
        }
        if found != project.version {
            return Err(StoreError::Conflict {
                id: project.id.to_string(),
                expected: project.version,
                found,
            });
        }
        project.version = found + 1;
        projects.insert(project.id.clone(), project.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn list_ids(&self) -> Result<Vec<ProjectId>, StoreError> {
        self.enter()?;
        let mut ids: Vec<ProjectId> = self.projects.lock().unwrap().keys().cloned().collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_types::{Participant, Timestamp};

    fn project(id: &str) -> Project {
        Project::new(
            id,
            "Round",
            Timestamp::from_millis(1),
            Timestamp::from_millis(2),
            vec![Participant::new("a", "Alice")],
        )
    }

    #[test]
    fn stale_version_is_a_conflict() {
        let store = NullProjectStore::new();
        let mut first = project("p1");
        store.save(&mut first).unwrap();
        let mut stale = store.find_by_id(&first.id).unwrap().unwrap();
        store.save(&mut first).unwrap();

        let err = store.save(&mut stale).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Conflict {
                expected: 1,
                found: 2,
                ..
            }
        ));
        assert_eq!(store.save_count(), 2);
    }

    #[test]
    fn injected_conflicts_run_out() {
        let store = NullProjectStore::new();
        store.inject_conflicts(1);
        let mut p = project("p1");
        assert!(store.save(&mut p).is_err());
        assert_eq!(p.version, 0);
        store.save(&mut p).unwrap();
        assert_eq!(p.version, 1);
    }

    #[test]
    fn unavailable_store_fails_every_call() {
        let store = NullProjectStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.list_ids(),
            Err(StoreError::Backend(_))
        ));
    }
}
