//! LMDB implementation of ProjectStore.

use std::sync::Arc;

use heed::types::{Bytes, Str};
use heed::{Database, Env};
use tally_store::{ProjectStore, StoreError};
use tally_types::{Project, ProjectId};

use crate::LmdbError;

pub struct LmdbProjectStore {
    env: Arc<Env>,
    projects_db: Database<Str, Bytes>,
}

impl LmdbProjectStore {
    pub fn new(env: Arc<Env>, projects_db: Database<Str, Bytes>) -> Self {
        Self { env, projects_db }
    }
}

fn decode(bytes: &[u8]) -> Result<Project, LmdbError> {
    serde_json::from_slice(bytes).map_err(|e| LmdbError::Serialization(e.to_string()))
}

fn encode(project: &Project) -> Result<Vec<u8>, LmdbError> {
    serde_json::to_vec(project).map_err(|e| LmdbError::Serialization(e.to_string()))
}

impl ProjectStore for LmdbProjectStore {
    fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, StoreError> {
        let txn = self.env.read_txn().map_err(LmdbError::from)?;
        match self.projects_db.get(&txn, id.as_str()) {
            Ok(Some(bytes)) => Ok(Some(decode(bytes)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(LmdbError::from(e).into()),
        }
    }

    fn save(&self, project: &mut Project) -> Result<(), StoreError> {
        let mut txn = self.env.write_txn().map_err(LmdbError::from)?;

        let found = match self
            .projects_db
            .get(&txn, project.id.as_str())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => decode(bytes)?.version,
            None => 0,
        };
        if found != project.version {
            // Dropping the transaction aborts it.
            return Err(StoreError::Conflict {
                id: project.id.to_string(),
                expected: project.version,
                found,
            });
        }

        let mut next = project.clone();
        next.version = found + 1;
        let bytes = encode(&next)?;
        self.projects_db
            .put(&mut txn, project.id.as_str(), &bytes)
            .map_err(LmdbError::from)?;
        txn.commit().map_err(LmdbError::from)?;

        project.version = next.version;
        tracing::trace!(project = %project.id, version = project.version, "project saved");
        Ok(())
    }

    fn list_ids(&self) -> Result<Vec<ProjectId>, StoreError> {
        let txn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut ids = Vec::new();
        let iter = self.projects_db.iter(&txn).map_err(LmdbError::from)?;
        for item in iter {
            let (key, _) = item.map_err(LmdbError::from)?;
            ids.push(ProjectId::new(key));
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LmdbEnvironment;
    use tally_types::{Participant, Timestamp, TokenAmount};

    /// Helper: open a temporary LMDB environment.
    fn temp_env() -> (tempfile::TempDir, LmdbEnvironment) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let env = LmdbEnvironment::open(dir.path(), 4, 10 * 1024 * 1024)
            .expect("failed to open env");
        (dir, env)
    }

    fn project(id: &str) -> Project {
        Project::new(
            id,
            "Round",
            Timestamp::from_millis(1000),
            Timestamp::from_millis(2000),
            vec![Participant::new("a", "Alice")],
        )
    }

    #[test]
    fn missing_project_is_none() {
        let (_dir, env) = temp_env();
        let store = env.project_store();
        assert!(store.find_by_id(&ProjectId::new("nope")).unwrap().is_none());
    }

    #[test]
    fn save_then_find_roundtrip() {
        let (_dir, env) = temp_env();
        let store = env.project_store();
        let mut p = project("p1");
        p.participants[0].vote_count = TokenAmount::parse("123456789012345678901234.5").unwrap();
        store.save(&mut p).unwrap();
        assert_eq!(p.version, 1);

        let loaded = store.find_by_id(&ProjectId::new("p1")).unwrap().unwrap();
        assert_eq!(loaded, p);
        assert_eq!(
            loaded.participants[0].vote_count.to_string(),
            "123456789012345678901234.5"
        );
    }

    #[test]
    fn stale_version_conflicts() {
        let (_dir, env) = temp_env();
        let store = env.project_store();
        let mut p = project("p1");
        store.save(&mut p).unwrap();

        let mut first = store.find_by_id(&p.id).unwrap().unwrap();
        let mut second = first.clone();
        store.save(&mut first).unwrap();

        match store.save(&mut second) {
            Err(StoreError::Conflict { expected, found, .. }) => {
                assert_eq!(expected, 1);
                assert_eq!(found, 2);
            }
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(second.version, 1);
    }

    #[test]
    fn creating_twice_conflicts() {
        let (_dir, env) = temp_env();
        let store = env.project_store();
        store.save(&mut project("p1")).unwrap();
        assert!(matches!(
            store.save(&mut project("p1")),
            Err(StoreError::Conflict { .. })
        ));
    }

    #[test]
    fn list_ids_returns_all() {
        let (_dir, env) = temp_env();
        let store = env.project_store();
        store.save(&mut project("b")).unwrap();
        store.save(&mut project("a")).unwrap();
        let ids = store.list_ids().unwrap();
        assert_eq!(ids, vec![ProjectId::new("a"), ProjectId::new("b")]);
    }
}
