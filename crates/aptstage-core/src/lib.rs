//! Configurer state machine for installation-time package sources.
//!
//! This crate ties the layer-composition crate to the external installer
//! tooling: it builds the two-stage view that makes package installs prefer
//! the pool on the installation media, and restores the media-agnostic
//! configuration once installation is done.

pub mod configurer;
pub mod context;
pub mod lifecycle;
pub mod sources;
pub mod tooling;

pub use configurer::Configurer;
pub use context::{detect_codename, DiagnosticSink, InstallContext, LogSink};
pub use lifecycle::{validate_transition, Phase};
pub use tooling::{HostTooling, PackageTooling, RecordingTooling};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("compose error: {0}")]
    Compose(#[from] aptstage_compose::ComposeError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("intent serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("{operation} failed in {root}: {detail}")]
    Tooling {
        operation: String,
        root: String,
        detail: String,
    },
    #[error("invalid configurer transition: {from} -> {to}")]
    InvalidTransition { from: Phase, to: Phase },
    #[error("deconfigure called on a session that never configured")]
    NotConfigured,
}
