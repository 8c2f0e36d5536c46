//! `tally-daemon project ...`: out-of-band project administration.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tally_store::ProjectStore;
use tally_types::{Project, ProjectId};

#[derive(clap::Subcommand)]
pub enum ProjectAction {
    /// Create or replace a project from a JSON file.
    Put { file: PathBuf },
    /// Print a project as JSON.
    Show { id: String },
    /// List stored project ids.
    List,
}

pub fn run(action: ProjectAction, store: &dyn ProjectStore) -> anyhow::Result<()> {
    match action {
        ProjectAction::Put { file } => {
            let project = put(store, &file)?;
            println!(
                "saved project {} (version {}, {} participants)",
                project.id,
                project.version,
                project.participants.len()
            );
        }
        ProjectAction::Show { id } => {
            let project = store
                .find_by_id(&ProjectId::new(id.clone()))?
                .with_context(|| format!("project {id} not found"))?;
            println!("{}", serde_json::to_string_pretty(&project)?);
        }
        ProjectAction::List => {
            for id in store.list_ids()? {
                println!("{id}");
            }
        }
    }
    Ok(())
}

/// Validate the project in `file` and write it over whatever is stored
/// under its id.
pub fn put(store: &dyn ProjectStore, file: &Path) -> anyhow::Result<Project> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let mut project: Project = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", file.display()))?;
    project.validate()?;

    project.version = store
        .find_by_id(&project.id)?
        .map_or(0, |existing| existing.version);
    store.save(&mut project)?;
    tracing::info!(project = %project.id, version = project.version, "project stored");
    Ok(project)
}
