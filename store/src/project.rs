//! Project repository trait.

use crate::StoreError;
use tally_types::{Project, ProjectId};

/// Repository for project aggregates.
///
/// `save` is a conditional write: it succeeds only when the stored version
/// equals `project.version` (a missing project counts as version 0), and on
/// success bumps `project.version` to the newly stored version. Two writers
/// that loaded the same version can therefore never both succeed.
pub trait ProjectStore: Send + Sync {
    /// Load a project by id. `Ok(None)` when absent.
    fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, StoreError>;

    /// Persist `project` atomically if its version is still current.
    fn save(&self, project: &mut Project) -> Result<(), StoreError>;

    /// Ids of every stored project.
    fn list_ids(&self) -> Result<Vec<ProjectId>, StoreError>;
}
