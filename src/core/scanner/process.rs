// src/core/scanner/process.rs

use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::core::error::ScanError;

/// What a finished external command left behind. A non-zero exit code is
/// reconcilable and recorded here rather than raised; only exceeding the
/// time ceiling is an error.
#[derive(Debug, Clone, Default)]
pub struct ExitOutcome {
    pub status_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Seam between the scan wrapper and the operating system. Production
/// code spawns real processes; tests substitute deterministic runners.
pub trait ProcessRunner {
    fn run(
        &self,
        command: &[String],
        ceiling: Duration,
    ) -> impl Future<Output = Result<ExitOutcome, ScanError>> + Send;
}

/// Runs commands as real child processes with piped output and a hard
/// time ceiling. On timeout the child is killed before the error is
/// returned, so no scanner process outlives its budget.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    async fn run(&self, command: &[String], ceiling: Duration) -> Result<ExitOutcome, ScanError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| ScanError::Configuration("empty command".to_string()))?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let mut stdout_pipe = child.stdout.take();
        let mut stderr_pipe = child.stderr.take();
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        // Drain both pipes while waiting so a chatty child can never
        // fill a pipe buffer and stall against an un-read descriptor.
        let completion = async {
            tokio::join!(
                async {
                    if let Some(pipe) = stdout_pipe.as_mut() {
                        let _ = pipe.read_to_end(&mut stdout).await;
                    }
                },
                async {
                    if let Some(pipe) = stderr_pipe.as_mut() {
                        let _ = pipe.read_to_end(&mut stderr).await;
                    }
                },
            );
            child.wait().await
        };

        match tokio::time::timeout(ceiling, completion).await {
            Ok(status) => {
                let status = status?;
                debug!(program, code = ?status.code(), "command finished");
                Ok(ExitOutcome {
                    status_code: status.code(),
                    stdout: String::from_utf8_lossy(&stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&stderr).into_owned(),
                })
            }
            Err(_elapsed) => {
                warn!(program, ?ceiling, "command exceeded its ceiling, killing it");
                let _ = child.start_kill();
                let _ = child.wait().await;
                Err(ScanError::Timeout(ceiling))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_output_and_exit_code() {
        let outcome = SystemProcessRunner
            .run(
                &["sh".to_string(), "-c".to_string(), "echo out; echo err >&2".to_string()],
                Duration::from_secs(5),
            )
            .await
            .unwrap();
        assert_eq!(outcome.status_code, Some(0));
        assert_eq!(outcome.stdout.trim(), "out");
        assert_eq!(outcome.stderr.trim(), "err");
    }

    #[tokio::test]
    async fn nonzero_exit_is_not_an_error() {
        let outcome = SystemProcessRunner
            .run(
                &["sh".to_string(), "-c".to_string(), "exit 3".to_string()],
                Duration::from_secs(5),
            )
            .await
            .unwrap();
        assert_eq!(outcome.status_code, Some(3));
    }

    #[tokio::test]
    async fn exceeding_the_ceiling_raises_timeout() {
        let result = SystemProcessRunner
            .run(
                &["sleep".to_string(), "5".to_string()],
                Duration::from_millis(100),
            )
            .await;
        assert!(matches!(result, Err(ScanError::Timeout(_))));
    }

    #[tokio::test]
    async fn empty_command_is_a_configuration_error() {
        let result = SystemProcessRunner.run(&[], Duration::from_secs(1)).await;
        assert!(matches!(result, Err(ScanError::Configuration(_))));
    }
}
