use crate::command::CommandRunner;
use crate::journal::Journal;
use crate::ComposeError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Tracks every mount performed by a session so teardown can mirror it.
///
/// Mountpoints are recorded only after the mount command succeeds, and they
/// come down in exact reverse order: later mounts may be layered on top of or
/// bound into earlier ones, and unmounting out of order can fail or leave the
/// bookkeeping out of sync with the kernel.
pub struct MountJournal {
    runner: Arc<dyn CommandRunner>,
    tracked: Journal<PathBuf>,
}

impl MountJournal {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            tracked: Journal::new(),
        }
    }

    pub fn runner(&self) -> Arc<dyn CommandRunner> {
        Arc::clone(&self.runner)
    }

    /// Mountpoints recorded so far, oldest first.
    pub fn tracked(&self) -> &[PathBuf] {
        self.tracked.entries()
    }

    pub fn mount(
        &mut self,
        device: &str,
        mountpoint: &Path,
        options: Option<&str>,
        fstype: Option<&str>,
    ) -> Result<(), ComposeError> {
        let mut argv = vec!["mount".to_owned()];
        if let Some(options) = options {
            argv.push("-o".to_owned());
            argv.push(options.to_owned());
        }
        if let Some(fstype) = fstype {
            argv.push("-t".to_owned());
            argv.push(fstype.to_owned());
        }
        argv.push(device.to_owned());
        argv.push(mountpoint.to_string_lossy().into_owned());

        self.runner.run(&argv)?;
        self.tracked.record(mountpoint.to_path_buf());
        debug!("mounted {device} at {}", mountpoint.display());
        Ok(())
    }

    /// Expose an existing tree at an additional mountpoint.
    pub fn bind(&mut self, source: &Path, mountpoint: &Path) -> Result<(), ComposeError> {
        self.mount(&source.to_string_lossy(), mountpoint, Some("bind"), None)
    }

    /// Unmount one tracked mountpoint ahead of the final unwind, removing it
    /// from the journal so teardown stays symmetric.
    pub fn release(&mut self, mountpoint: &Path) -> Result<(), ComposeError> {
        self.tracked
            .remove(|m| m == mountpoint)
            .ok_or_else(|| ComposeError::UntrackedMount(mountpoint.display().to_string()))?;
        self.runner.run(&[
            "umount".to_owned(),
            mountpoint.to_string_lossy().into_owned(),
        ])?;
        debug!("unmounted {}", mountpoint.display());
        Ok(())
    }

    /// Unmount every tracked mountpoint, newest first. The first failure
    /// aborts the unwind: a stuck mount blocks scratch directory removal.
    pub fn unwind(&mut self) -> Result<(), ComposeError> {
        self.tracked.unwind(|mountpoint| {
            self.runner.run(&[
                "umount".to_owned(),
                mountpoint.to_string_lossy().into_owned(),
            ])?;
            debug!("unmounted {}", mountpoint.display());
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::RecordingRunner;

    fn journal() -> (Arc<RecordingRunner>, MountJournal) {
        let runner = Arc::new(RecordingRunner::new());
        let journal = MountJournal::new(Arc::clone(&runner) as Arc<dyn CommandRunner>);
        (runner, journal)
    }

    #[test]
    fn mount_builds_full_argv_and_tracks() {
        let (runner, mut mounts) = journal();
        mounts
            .mount(
                "overlay",
                Path::new("/mnt/view"),
                Some("lowerdir=/a:/b"),
                Some("overlay"),
            )
            .unwrap();

        assert_eq!(
            runner.calls(),
            vec![vec![
                "mount".to_owned(),
                "-o".to_owned(),
                "lowerdir=/a:/b".to_owned(),
                "-t".to_owned(),
                "overlay".to_owned(),
                "overlay".to_owned(),
                "/mnt/view".to_owned(),
            ]]
        );
        assert_eq!(mounts.tracked(), &[PathBuf::from("/mnt/view")]);
    }

    #[test]
    fn failed_mount_is_not_tracked() {
        let (runner, mut mounts) = journal();
        runner.fail_program("mount");

        assert!(mounts.mount("/cdrom", Path::new("/mnt/c"), None, None).is_err());
        assert!(mounts.tracked().is_empty());
    }

    #[test]
    fn bind_uses_bind_option() {
        let (runner, mut mounts) = journal();
        mounts
            .bind(Path::new("/cdrom"), Path::new("/mnt/root/cdrom"))
            .unwrap();

        let call = &runner.calls()[0];
        assert_eq!(call[1], "-o");
        assert_eq!(call[2], "bind");
        assert_eq!(call[3], "/cdrom");
    }

    #[test]
    fn unwind_unmounts_in_reverse_order() {
        let (runner, mut mounts) = journal();
        for name in ["a", "b", "c"] {
            mounts
                .mount("dev", &PathBuf::from("/mnt").join(name), None, None)
                .unwrap();
        }

        mounts.unwind().unwrap();

        let calls = runner.calls();
        let umounted: Vec<&str> = calls
            .iter()
            .filter(|argv| argv[0] == "umount")
            .map(|argv| argv[1].as_str())
            .collect();
        assert_eq!(umounted, vec!["/mnt/c", "/mnt/b", "/mnt/a"]);
        assert!(mounts.tracked().is_empty());
    }

    #[test]
    fn release_pops_the_journal() {
        let (runner, mut mounts) = journal();
        mounts.mount("dev", Path::new("/mnt/a"), None, None).unwrap();
        mounts.mount("dev", Path::new("/mnt/b"), None, None).unwrap();

        mounts.release(Path::new("/mnt/b")).unwrap();
        assert_eq!(mounts.tracked(), &[PathBuf::from("/mnt/a")]);

        mounts.unwind().unwrap();
        let calls = runner.calls();
        let umount_count = calls.iter().filter(|argv| argv[0] == "umount").count();
        // One release plus one unwind: exactly as many unmounts as mounts.
        assert_eq!(umount_count, 2);
    }

    #[test]
    fn release_of_untracked_mountpoint_is_an_error() {
        let (_, mut mounts) = journal();
        let err = mounts.release(Path::new("/mnt/ghost")).unwrap_err();
        assert!(matches!(err, ComposeError::UntrackedMount(_)));
    }

    #[test]
    fn failed_unwind_leaves_remaining_mounts_tracked() {
        let (runner, mut mounts) = journal();
        for name in ["a", "b"] {
            mounts
                .mount("dev", &PathBuf::from("/mnt").join(name), None, None)
                .unwrap();
        }
        runner.fail_program("umount");

        assert!(mounts.unwind().is_err());
        assert_eq!(mounts.tracked().len(), 2);
    }
}
