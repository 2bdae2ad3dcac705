use crate::CoreError;
use aptstage_compose::CommandRunner;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// External package tooling the configurer drives against a target root.
pub trait PackageTooling: Send + Sync {
    /// Apply the mirror configuration document at `config` to `root`.
    fn apply_config(&self, root: &Path, config: &Path) -> Result<(), CoreError>;

    /// Refresh the package index inside `root`.
    fn update_index(&self, root: &Path) -> Result<(), CoreError>;
}

/// Tooling that shells out to curtin, the way the rest of the installer does.
pub struct HostTooling {
    runner: Arc<dyn CommandRunner>,
}

impl HostTooling {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    fn run(&self, operation: &str, root: &Path, argv: Vec<String>) -> Result<(), CoreError> {
        self.runner
            .run(&argv)
            .map_err(|err| CoreError::Tooling {
                operation: operation.to_owned(),
                root: root.display().to_string(),
                detail: err.to_string(),
            })
    }
}

impl PackageTooling for HostTooling {
    fn apply_config(&self, root: &Path, config: &Path) -> Result<(), CoreError> {
        self.run(
            "apply-config",
            root,
            vec![
                "curtin".to_owned(),
                "apt-config".to_owned(),
                "-t".to_owned(),
                root.to_string_lossy().into_owned(),
                format!("config={}", config.display()),
            ],
        )
    }

    fn update_index(&self, root: &Path) -> Result<(), CoreError> {
        self.run(
            "update-index",
            root,
            vec![
                "curtin".to_owned(),
                "in-target".to_owned(),
                "-t".to_owned(),
                root.to_string_lossy().into_owned(),
                "--".to_owned(),
                "apt-get".to_owned(),
                "update".to_owned(),
            ],
        )
    }
}

type Hook = Box<dyn Fn(&Path) -> Result<(), CoreError> + Send + Sync>;

/// Test double that records operations in order and optionally runs a hook
/// per operation, so scenarios can simulate the side effects the real
/// tooling would have on the target root.
#[derive(Default)]
pub struct RecordingTooling {
    ops: Mutex<Vec<(String, PathBuf)>>,
    on_apply_config: Option<Hook>,
    on_update_index: Option<Hook>,
}

impl RecordingTooling {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_apply_config_hook(mut self, hook: Hook) -> Self {
        self.on_apply_config = Some(hook);
        self
    }

    pub fn with_update_index_hook(mut self, hook: Hook) -> Self {
        self.on_update_index = Some(hook);
        self
    }

    /// Operations performed so far, as `(operation, root)` pairs in order.
    pub fn ops(&self) -> Vec<(String, PathBuf)> {
        self.ops.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }

    fn record(&self, operation: &str, root: &Path) {
        self.ops
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((operation.to_owned(), root.to_path_buf()));
    }
}

impl PackageTooling for RecordingTooling {
    fn apply_config(&self, root: &Path, _config: &Path) -> Result<(), CoreError> {
        self.record("apply-config", root);
        if let Some(hook) = &self.on_apply_config {
            hook(root)?;
        }
        Ok(())
    }

    fn update_index(&self, root: &Path) -> Result<(), CoreError> {
        self.record("update-index", root);
        if let Some(hook) = &self.on_update_index {
            hook(root)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aptstage_compose::RecordingRunner;

    #[test]
    fn host_tooling_builds_curtin_argv() {
        let runner = Arc::new(RecordingRunner::new());
        let tooling = HostTooling::new(Arc::clone(&runner) as Arc<dyn CommandRunner>);

        tooling
            .apply_config(Path::new("/target"), Path::new("/cfg/apt.conf"))
            .unwrap();
        tooling.update_index(Path::new("/target")).unwrap();

        let calls = runner.calls();
        assert_eq!(
            calls[0],
            vec![
                "curtin".to_owned(),
                "apt-config".to_owned(),
                "-t".to_owned(),
                "/target".to_owned(),
                "config=/cfg/apt.conf".to_owned(),
            ]
        );
        assert_eq!(calls[1][..2], ["curtin".to_owned(), "in-target".to_owned()]);
        assert_eq!(calls[1][4..], ["--".to_owned(), "apt-get".to_owned(), "update".to_owned()]);
    }

    #[test]
    fn host_tooling_failure_names_operation_and_root() {
        let runner = Arc::new(RecordingRunner::new());
        runner.fail_program("curtin");
        let tooling = HostTooling::new(Arc::clone(&runner) as Arc<dyn CommandRunner>);

        let err = tooling.update_index(Path::new("/target")).unwrap_err();
        match err {
            CoreError::Tooling { operation, root, .. } => {
                assert_eq!(operation, "update-index");
                assert_eq!(root, "/target");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn recording_tooling_keeps_order_and_runs_hooks() {
        let tooling = RecordingTooling::new().with_update_index_hook(Box::new(|root| {
            std::fs::write(root.join("marker"), "updated").map_err(CoreError::from)
        }));
        let root = tempfile::tempdir().unwrap();

        tooling.apply_config(root.path(), Path::new("/cfg")).unwrap();
        tooling.update_index(root.path()).unwrap();

        let ops = tooling.ops();
        assert_eq!(ops[0].0, "apply-config");
        assert_eq!(ops[1].0, "update-index");
        assert!(root.path().join("marker").is_file());
    }
}
