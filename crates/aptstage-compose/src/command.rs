use crate::ComposeError;
use std::process::Command;
use std::sync::Mutex;
use tracing::{debug, info};

/// Seam for the external processes this crate spawns.
///
/// Mount and unmount always go through this trait so sessions can be
/// exercised without real mount privileges.
pub trait CommandRunner: Send + Sync {
    /// Run `argv`, treating a non-zero exit as an error.
    fn run(&self, argv: &[String]) -> Result<(), ComposeError>;
}

/// Runs commands on the host, folding stderr into the error message.
pub struct HostRunner;

impl CommandRunner for HostRunner {
    fn run(&self, argv: &[String]) -> Result<(), ComposeError> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| ComposeError::Command("empty argv".to_owned()))?;
        debug!("running {}", argv.join(" "));
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| ComposeError::Command(format!("failed to execute '{program}': {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ComposeError::Command(format!(
                "'{}' exited with {}: {}",
                argv.join(" "),
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// Logs commands instead of executing them (dry-run sessions).
pub struct NullRunner;

impl CommandRunner for NullRunner {
    fn run(&self, argv: &[String]) -> Result<(), ComposeError> {
        info!("dry-run: {}", argv.join(" "));
        Ok(())
    }
}

/// Records every argv it is asked to run; failures can be injected per
/// program name.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<Vec<String>>>,
    fail_programs: Mutex<Vec<String>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent invocation of `program` fail.
    pub fn fail_program(&self, program: &str) {
        if let Ok(mut failing) = self.fail_programs.lock() {
            failing.push(program.to_owned());
        }
    }

    /// Recorded argv vectors, in call order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Programs of the recorded calls, in order.
    pub fn programs(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter_map(|argv| argv.first().cloned())
            .collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, argv: &[String]) -> Result<(), ComposeError> {
        let mut calls = self
            .calls
            .lock()
            .map_err(|e| ComposeError::Command(format!("mutex poisoned: {e}")))?;
        calls.push(argv.to_vec());

        let failing = self
            .fail_programs
            .lock()
            .map_err(|e| ComposeError::Command(format!("mutex poisoned: {e}")))?;
        match argv.first() {
            Some(program) if failing.contains(program) => Err(ComposeError::Command(format!(
                "injected failure for '{program}'"
            ))),
            _ => Ok(()),
        }
    }
}
