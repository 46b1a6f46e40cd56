//! Reading and writing plan documents on disk.

use std::{fs, path::Path};

use log::debug;

use crate::{
    error::{PlanKitError, Result},
    generator::to_markdown,
    models::Plan,
    parser::parse,
};

/// Reads and parses a plan file.
///
/// # Errors
///
/// Returns `PlanKitError::FileSystem` if the file cannot be read. The
/// contents themselves never cause an error.
pub fn read_plan(path: impl AsRef<Path>) -> Result<Plan> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| PlanKitError::file_system(path, e))?;
    let plan = parse(&text);
    debug!(
        "read plan '{}' with {} tasks from {}",
        plan.name,
        plan.tasks.len(),
        path.display()
    );
    Ok(plan)
}

/// Writes `plan` as markdown, creating parent directories as needed.
///
/// # Errors
///
/// Returns `PlanKitError::FileSystem` if the directory or file cannot be
/// written.
pub fn write_plan(path: impl AsRef<Path>, plan: &Plan) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| PlanKitError::file_system(parent, e))?;
    }
    fs::write(path, to_markdown(plan)).map_err(|e| PlanKitError::file_system(path, e))?;
    debug!("wrote plan '{}' to {}", plan.name, path.display());
    Ok(())
}
