//! Layer composition and mount bookkeeping for aptstage sessions.
//!
//! This crate implements the resource layer: the pluggable `LayerComposer`
//! trait with overlay-mount and copy-based strategies, the mount journal that
//! guarantees mirrored teardown, scratch directory pooling, and the external
//! command runner seam used for mount and unmount.

pub mod command;
pub mod composer;
pub mod copydir;
pub mod fsutil;
pub mod journal;
pub mod mock;
pub mod mounts;
pub mod overlay;
pub mod scratch;

pub use command::{CommandRunner, HostRunner, NullRunner, RecordingRunner};
pub use composer::{select_composer, LayerComposer, LowerLayer, LowerSpec, UpperHandle};
pub use fsutil::copy_tree;
pub use journal::Journal;
pub use mounts::MountJournal;
pub use scratch::{unique_dir, ScratchPool};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("compose I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("external command failed: {0}")]
    Command(String),
    #[error("composer '{0}' is not available")]
    ComposerUnavailable(String),
    #[error("mountpoint is not tracked by this session: {0}")]
    UntrackedMount(String),
    #[error("lower spec has no usable layer for the '{0}' composer")]
    EmptyLowerSpec(String),
}
