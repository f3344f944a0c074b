use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

use crate::{AgentError, ModelConfig};

/// Output captured from a model process
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Utility for running CLI model backends
pub struct ProcessSpawner;

impl ProcessSpawner {
    /// Run a process to completion and capture its output
    pub async fn spawn(
        binary: &Path,
        args: &[&str],
        config: &ModelConfig,
    ) -> Result<ProcessOutput, AgentError> {
        let start = Instant::now();

        debug!(
            binary = %binary.display(),
            arg_count = args.len(),
            working_dir = %config.working_dir.display(),
            "Spawning model process"
        );

        let output = Command::new(binary)
            .args(args)
            .current_dir(&config.working_dir)
            .stdin(Stdio::null()) // Non-interactive
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        let duration = start.elapsed();
        let exit_code = output.status.code().unwrap_or(-1);

        debug!(
            exit_code,
            duration_ms = duration.as_millis(),
            "Model process completed"
        );

        Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code,
            duration,
        })
    }
}
