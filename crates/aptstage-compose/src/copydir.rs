use crate::composer::{LayerComposer, LowerLayer, LowerSpec, UpperHandle};
use crate::fsutil::copy_tree;
use crate::mounts::MountJournal;
use crate::scratch::ScratchPool;
use crate::ComposeError;
use std::path::Path;

/// Copy-based stand-in for overlay composition.
///
/// For environments without real mount privileges: reproduces the effect of
/// a fresh upper layer over the package-config subtree with plain directory
/// copies. Only `etc/apt` is materialized. Nothing is ever mounted, so the
/// session has nothing to tear down.
#[derive(Default)]
pub struct CopyComposer;

impl CopyComposer {
    pub fn new() -> Self {
        Self
    }
}

impl LayerComposer for CopyComposer {
    fn name(&self) -> &'static str {
        "copy"
    }

    fn performs_mounts(&self) -> bool {
        false
    }

    fn compose(
        &self,
        _mounts: &mut MountJournal,
        _scratch: &mut ScratchPool,
        lower: &LowerSpec,
        target: &Path,
    ) -> Result<UpperHandle, ComposeError> {
        // A prior stage's layer already carries its edits. Without a real
        // overlay to look through, it takes precedence over the literal base.
        let source = lower
            .layers()
            .iter()
            .find_map(|layer| match layer {
                LowerLayer::Stage(handle) => Some(handle.path()),
                LowerLayer::Path(_) => None,
            })
            .or_else(|| lower.layers().first().map(LowerLayer::path))
            .ok_or_else(|| ComposeError::EmptyLowerSpec(self.name().to_owned()))?;

        std::fs::create_dir_all(target.join("etc"))?;
        copy_tree(&source.join("etc/apt"), &target.join("etc/apt"))?;

        let fragments = target.join("etc/apt/sources.list.d");
        if fragments.is_dir() {
            std::fs::remove_dir_all(&fragments)?;
        }
        std::fs::create_dir(&fragments)?;

        Ok(UpperHandle::new(target))
    }

    fn teardown(&self, _mounts: &mut MountJournal, _target: &Path) -> Result<(), ComposeError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandRunner, RecordingRunner};
    use std::fs;
    use std::sync::Arc;

    fn fixture() -> (MountJournal, ScratchPool) {
        let runner = Arc::new(RecordingRunner::new()) as Arc<dyn CommandRunner>;
        (MountJournal::new(runner), ScratchPool::new())
    }

    fn seed(root: &Path) {
        fs::create_dir_all(root.join("etc/apt/sources.list.d")).unwrap();
        fs::write(root.join("etc/apt/sources.list"), "deb http://x xyz main\n").unwrap();
        fs::write(root.join("etc/apt/sources.list.d/ppa.list"), "deb ppa\n").unwrap();
    }

    #[test]
    fn compose_copies_apt_tree_with_fresh_fragment_dir() {
        let (mut mounts, mut scratch) = fixture();
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        seed(source.path());

        let upper = CopyComposer::new()
            .compose(
                &mut mounts,
                &mut scratch,
                &LowerSpec::path(source.path()),
                target.path(),
            )
            .unwrap();

        assert_eq!(upper.path(), target.path());
        assert_eq!(
            fs::read_to_string(target.path().join("etc/apt/sources.list")).unwrap(),
            "deb http://x xyz main\n"
        );
        // The fragment dir mirrors a fresh upper layer: present but empty.
        let fragments = target.path().join("etc/apt/sources.list.d");
        assert!(fragments.is_dir());
        assert_eq!(fs::read_dir(&fragments).unwrap().count(), 0);
        assert!(mounts.tracked().is_empty());
    }

    #[test]
    fn stage_layer_takes_precedence_over_base() {
        let (mut mounts, mut scratch) = fixture();
        let base = tempfile::tempdir().unwrap();
        let stage = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        seed(base.path());
        fs::create_dir_all(stage.path().join("etc/apt")).unwrap();
        fs::write(stage.path().join("etc/apt/sources.list"), "deb staged\n").unwrap();

        CopyComposer::new()
            .compose(
                &mut mounts,
                &mut scratch,
                &LowerSpec::stacked(UpperHandle::new(stage.path()), base.path()),
                target.path(),
            )
            .unwrap();

        assert_eq!(
            fs::read_to_string(target.path().join("etc/apt/sources.list")).unwrap(),
            "deb staged\n"
        );
    }
}
