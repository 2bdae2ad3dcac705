use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything a configure/deconfigure pair needs to know about the install
/// it serves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallContext {
    /// Root under which installer logs and records are written.
    pub log_root: PathBuf,
    /// Mounted installation media carrying the package pool.
    pub media: PathBuf,
    /// Whether the installed system will be able to reach remote mirrors.
    pub has_network: bool,
    /// Release codename used for the media source line.
    pub codename: String,
    /// Mirror selection to record alongside the install.
    pub mirror: toml::Value,
}

/// Receives notice of files the session generates, so installer records can
/// point at them.
pub trait DiagnosticSink: Send + Sync {
    fn note(&self, label: &str, path: &Path);
}

/// Sink that only logs. The default for command-line use, where there is no
/// surrounding installer to collect records.
#[derive(Default)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

impl DiagnosticSink for LogSink {
    fn note(&self, label: &str, path: &Path) {
        info!("recorded {label}: {}", path.display());
    }
}

/// Read the release codename from `etc/lsb-release` under `root`.
pub fn detect_codename(root: &Path) -> Result<String, CoreError> {
    let file = std::fs::File::open(root.join("etc/lsb-release"))?;
    for line in BufReader::new(file).lines() {
        let line = line?;
        if let Some(value) = line.strip_prefix("DISTRIB_CODENAME=") {
            return Ok(value.trim().to_owned());
        }
    }
    Err(CoreError::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("no DISTRIB_CODENAME in {}/etc/lsb-release", root.display()),
    )))
}
