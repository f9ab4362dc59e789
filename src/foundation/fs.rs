use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::PcboothResult;

pub fn ensure_parent_dir(path: &Path) -> PcboothResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Remove a file, treating an already missing file as success.
pub fn remove_file_if_exists(path: &Path) -> PcboothResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
