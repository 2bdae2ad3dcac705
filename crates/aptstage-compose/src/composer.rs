use crate::mounts::MountJournal;
use crate::scratch::ScratchPool;
use crate::ComposeError;
use std::path::{Path, PathBuf};

/// Handle to the writable layer of a composed view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpperHandle {
    path: PathBuf,
}

impl UpperHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// One read-only layer of a lower specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LowerLayer {
    /// A literal directory on disk.
    Path(PathBuf),
    /// The writable layer produced by an earlier compose call in the same
    /// session. Kept distinct from `Path` so composers that cannot look
    /// through a real overlay still know which layer carries the prior
    /// stage's edits.
    Stage(UpperHandle),
}

impl LowerLayer {
    pub fn path(&self) -> &Path {
        match self {
            LowerLayer::Path(path) => path,
            LowerLayer::Stage(handle) => handle.path(),
        }
    }
}

/// Ordered read-only base for a composed view. Search order is left to
/// right; the leftmost layer wins on conflicting paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LowerSpec {
    layers: Vec<LowerLayer>,
}

impl LowerSpec {
    /// A single literal directory.
    pub fn path(dir: impl Into<PathBuf>) -> Self {
        Self {
            layers: vec![LowerLayer::Path(dir.into())],
        }
    }

    /// A prior stage's writable layer composed over a base directory, so the
    /// stage's edits are visible along with everything it did not touch.
    pub fn stacked(stage: UpperHandle, base: impl Into<PathBuf>) -> Self {
        Self {
            layers: vec![LowerLayer::Stage(stage), LowerLayer::Path(base.into())],
        }
    }

    pub fn layers(&self) -> &[LowerLayer] {
        &self.layers
    }

    /// Colon-joined `lowerdir=` value, leftmost layer first.
    pub fn lowerdir(&self) -> String {
        self.layers
            .iter()
            .map(|layer| layer.path().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(":")
    }
}

/// Strategy for composing a layered, writable view of read-only content.
pub trait LayerComposer: Send + Sync {
    fn name(&self) -> &str;

    /// Whether composed views are real mounts that need mirrored teardown.
    fn performs_mounts(&self) -> bool;

    /// Compose `lower` into a writable view at `target`, returning a handle
    /// to the writable layer suitable for stacking a further view on top.
    fn compose(
        &self,
        mounts: &mut MountJournal,
        scratch: &mut ScratchPool,
        lower: &LowerSpec,
        target: &Path,
    ) -> Result<UpperHandle, ComposeError>;

    /// Release one composed view (or bind) mounted at `target`.
    fn teardown(&self, mounts: &mut MountJournal, target: &Path) -> Result<(), ComposeError>;
}

pub fn select_composer(name: &str) -> Result<Box<dyn LayerComposer>, ComposeError> {
    match name {
        "overlay" => Ok(Box::new(crate::overlay::OverlayComposer::new())),
        "copy" => Ok(Box::new(crate::copydir::CopyComposer::new())),
        "mock" => Ok(Box::new(crate::mock::MockComposer::new())),
        other => Err(ComposeError::ComposerUnavailable(other.to_owned())),
    }
}
