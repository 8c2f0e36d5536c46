//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::{Bytes, Str};
use heed::{Database, Env, EnvOpenOptions};

use crate::project::LmdbProjectStore;
use crate::LmdbError;

/// Name of the database holding project documents.
pub const PROJECTS_DB: &str = "projects";

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    projects_db: Database<Str, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, max_dbs: u32, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;
        // SAFETY: the environment is opened once per process per path and the
        // memory map is never accessed outside heed's transactions.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(max_dbs)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let projects_db: Database<Str, Bytes> = env.create_database(&mut wtxn, Some(PROJECTS_DB))?;
        wtxn.commit()?;

        tracing::debug!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            env: Arc::new(env),
            projects_db,
        })
    }

    /// Shared handle to the raw environment.
    pub fn env(&self) -> &Arc<Env> {
        &self.env
    }

    /// A project repository backed by this environment.
    pub fn project_store(&self) -> LmdbProjectStore {
        LmdbProjectStore::new(self.env.clone(), self.projects_db)
    }
}
