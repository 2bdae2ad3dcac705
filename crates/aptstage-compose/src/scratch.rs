use crate::journal::Journal;
use crate::ComposeError;
use std::path::PathBuf;
use tracing::debug;

/// Create a uniquely named directory that outlives its `TempDir` guard.
///
/// The tempfile suffix keeps concurrent sessions collision-free.
pub fn unique_dir(prefix: &str) -> std::io::Result<PathBuf> {
    Ok(tempfile::Builder::new().prefix(prefix).tempdir()?.keep())
}

/// Pool of scratch directories owned by one session.
#[derive(Default)]
pub struct ScratchPool {
    dirs: Journal<PathBuf>,
}

impl ScratchPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directories allocated so far, oldest first.
    pub fn tracked(&self) -> &[PathBuf] {
        self.dirs.entries()
    }

    /// Allocate a scratch directory that lives until `unwind`.
    pub fn new_dir(&mut self) -> Result<PathBuf, ComposeError> {
        let dir = unique_dir("aptstage-")?;
        debug!("allocated scratch dir {}", dir.display());
        self.dirs.record(dir.clone());
        Ok(dir)
    }

    /// Recursively remove every pooled directory. Mounts referencing them
    /// must already be released.
    pub fn unwind(&mut self) -> Result<(), ComposeError> {
        self.dirs.unwind(|dir| {
            if dir.exists() {
                std::fs::remove_dir_all(dir)?;
            }
            debug!("removed scratch dir {}", dir.display());
            Ok::<(), std::io::Error>(())
        })?;
        Ok(())
    }
}
