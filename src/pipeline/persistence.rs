// called on startup and quit; saves app state so we can reload it later
use std::path::{Path, PathBuf};

use crate::pipeline::project::ProjectState;

const LICKBOX_DIR: &str = ".lickbox";
const PROJECT_FILE: &str = "project.json";

// <project_dir>/.lickbox/project.json
fn project_file_path(project_dir: &Path) -> PathBuf {
    project_dir.join(LICKBOX_DIR).join(PROJECT_FILE)
}

// Missing or unreadable files are not errors, just "no saved project";
// whatever does parse gets repaired into a valid state before anyone sees it.
pub fn load_project(project_dir: &Path) -> Option<ProjectState> {
    let path = project_file_path(project_dir);
    let data = std::fs::read_to_string(&path).ok()?;
    let mut state: ProjectState = serde_json::from_str(&data).ok()?;
    state.normalize();
    Some(state)
}

// Save the project state to disk, making the files if they don't exist already
pub fn save_project(project_dir: &Path, state: &ProjectState) -> anyhow::Result<()> {
    let path = project_file_path(project_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?; // create .lickbox/ if needed
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(&path, json)?;
    Ok(())
}
