use crate::composer::{LayerComposer, LowerSpec, UpperHandle};
use crate::fsutil::copy_tree;
use crate::mounts::MountJournal;
use crate::scratch::ScratchPool;
use crate::ComposeError;
use std::path::Path;

/// In-memory strategy for tests.
///
/// Materializes the merged view by copying every lower layer so callers see
/// real filesystem content, while still recording an overlay mount in the
/// journal so the same teardown bookkeeping is exercised as with the real
/// composer.
#[derive(Default)]
pub struct MockComposer;

impl MockComposer {
    pub fn new() -> Self {
        Self
    }
}

impl LayerComposer for MockComposer {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn performs_mounts(&self) -> bool {
        true
    }

    fn compose(
        &self,
        mounts: &mut MountJournal,
        _scratch: &mut ScratchPool,
        lower: &LowerSpec,
        target: &Path,
    ) -> Result<UpperHandle, ComposeError> {
        // Rightmost layer first, so the leftmost wins conflicts, matching
        // overlay search order.
        for layer in lower.layers().iter().rev() {
            if layer.path().is_dir() {
                copy_tree(layer.path(), target)?;
            }
        }

        let options = format!("lowerdir={}", lower.lowerdir());
        mounts.mount("overlay", target, Some(&options), Some("overlay"))?;

        Ok(UpperHandle::new(target))
    }

    fn teardown(&self, mounts: &mut MountJournal, target: &Path) -> Result<(), ComposeError> {
        mounts.release(target)
    }
}
