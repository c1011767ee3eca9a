use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;

/// A working directory created fresh for one run and removed when dropped,
/// on success and failure alike. Creation fails if the directory already
/// exists, so two runs cannot share scratch space.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, PipelineError> {
        let path = path.into();
        fs::create_dir(&path).map_err(|e| PipelineError::io(&path, e))?;
        Ok(ScratchDir { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.path) {
            eprintln!("can't clean up {}: {}", self.path.display(), e);
        }
    }
}
