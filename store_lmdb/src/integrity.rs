//! LMDB database integrity checks.
//!
//! Run on startup to detect corruption early, before the daemon starts
//! accepting votes.

use std::path::Path;
use std::sync::Arc;

use heed::types::{Bytes, Str};
use heed::Env;
use tally_types::Project;

use crate::environment::PROJECTS_DB;
use crate::LmdbError;

/// Summary of an integrity check run.
pub struct IntegrityReport {
    pub projects_checked: u64,
    pub votes_checked: u64,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    /// Returns `true` if no errors were detected.
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Decode every stored project and check its invariants.
///
/// Per-project failures are recorded in the report rather than causing a
/// hard error; only failing to read the database at all is an `Err`.
pub fn check_integrity(env: &Arc<Env>) -> Result<IntegrityReport, LmdbError> {
    let mut report = IntegrityReport {
        projects_checked: 0,
        votes_checked: 0,
        errors: Vec::new(),
    };

    let rtxn = env.read_txn()?;
    let Some(db) = env.open_database::<Str, Bytes>(&rtxn, Some(PROJECTS_DB))? else {
        // Fresh environment.
        return Ok(report);
    };

    for item in db.iter(&rtxn)? {
        let (key, bytes) = match item {
            Ok(entry) => entry,
            Err(e) => {
                report.errors.push(format!("failed to read entry: {e}"));
                continue;
            }
        };
        report.projects_checked += 1;

        let project: Project = match serde_json::from_slice(bytes) {
            Ok(p) => p,
            Err(e) => {
                report.errors.push(format!("project '{key}' does not decode: {e}"));
                continue;
            }
        };
        if project.id.as_str() != key {
            report.errors.push(format!(
                "project stored under '{key}' claims id '{}'",
                project.id
            ));
        }
        if let Err(e) = project.validate() {
            report.errors.push(e.to_string());
        }
        for participant in &project.participants {
            let recorded = project.recorded_weight_for(&participant.id);
            if recorded != participant.vote_count {
                report.errors.push(format!(
                    "project '{key}' participant '{}' tally {} != recorded votes {}",
                    participant.id, participant.vote_count, recorded
                ));
            }
        }
        report.votes_checked += project.vote_history.len() as u64;
    }

    Ok(report)
}

/// Check if the LMDB data directory looks valid before opening.
///
/// Returns `Ok(())` for a fresh (nonexistent) directory. Returns an error
/// if the directory exists but `data.mdb` is missing, which suggests
/// corruption or misconfiguration.
pub fn check_data_dir(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Ok(()); // Fresh start
    }
    let data_file = path.join("data.mdb");
    if !data_file.exists() {
        return Err(format!(
            "LMDB directory exists but data.mdb is missing at {}",
            path.display()
        ));
    }
    Ok(())
}
