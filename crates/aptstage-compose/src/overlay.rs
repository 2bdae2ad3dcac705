use crate::composer::{LayerComposer, LowerSpec, UpperHandle};
use crate::mounts::MountJournal;
use crate::scratch::ScratchPool;
use crate::ComposeError;
use std::path::Path;

/// Composes views with real overlay filesystem mounts.
///
/// Each view gets a fresh upper and work directory under a pooled scratch
/// dir; lower layers are never mutated. A failed mount is fatal to the
/// calling operation, there is no retry.
#[derive(Default)]
pub struct OverlayComposer;

impl OverlayComposer {
    pub fn new() -> Self {
        Self
    }
}

impl LayerComposer for OverlayComposer {
    fn name(&self) -> &'static str {
        "overlay"
    }

    fn performs_mounts(&self) -> bool {
        true
    }

    fn compose(
        &self,
        mounts: &mut MountJournal,
        scratch: &mut ScratchPool,
        lower: &LowerSpec,
        target: &Path,
    ) -> Result<UpperHandle, ComposeError> {
        let layer_dir = scratch.new_dir()?;
        let upper = layer_dir.join("upper");
        let work = layer_dir.join("work");
        for dir in [&upper, &work] {
            std::fs::create_dir(dir)?;
        }

        let options = format!(
            "lowerdir={},upperdir={},workdir={}",
            lower.lowerdir(),
            upper.display(),
            work.display()
        );
        mounts.mount("overlay", target, Some(&options), Some("overlay"))?;

        Ok(UpperHandle::new(upper))
    }

    fn teardown(&self, mounts: &mut MountJournal, target: &Path) -> Result<(), ComposeError> {
        mounts.release(target)
    }
}
