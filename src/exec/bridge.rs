use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;

const FLATPAK_SPAWN: &str = "flatpak-spawn";
/// `--watch-bus` makes the host process die with `flatpak-spawn`, which is
/// what a timeout kills. Without it the host command outlives the timeout.
const FLATPAK_SPAWN_ARGS: &[&str] = &["--host", "--watch-bus"];
const FLATPAK_INFO: &str = "/.flatpak-info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("process timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to launch process: {0}")]
    Launch(#[from] std::io::Error),

    #[error("empty argument vector")]
    EmptyCommand,
}

/// Launches a process on the host and collects its output.
#[async_trait]
pub trait HostBridge: Send + Sync {
    async fn run(&self, argv: &[String], limit: Duration) -> Result<ProcessOutput, BridgeError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeMode {
    /// Escape the sandbox only when running inside one.
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone)]
pub struct ProcessBridge {
    escape_sandbox: bool,
}

impl ProcessBridge {
    #[must_use]
    pub fn new(mode: BridgeMode) -> Self {
        let escape_sandbox = match mode {
            BridgeMode::Auto => in_flatpak_sandbox(),
            BridgeMode::Always => true,
            BridgeMode::Never => false,
        };
        Self { escape_sandbox }
    }

    #[must_use]
    pub const fn direct() -> Self {
        Self {
            escape_sandbox: false,
        }
    }

    #[must_use]
    pub const fn escapes_sandbox(&self) -> bool {
        self.escape_sandbox
    }

    /// The argv actually launched for `argv`, sandbox prefix included.
    pub fn launch_argv(&self, argv: &[String]) -> Result<Vec<String>, BridgeError> {
        if argv.is_empty() {
            return Err(BridgeError::EmptyCommand);
        }
        if !self.escape_sandbox {
            return Ok(argv.to_vec());
        }

        Ok(std::iter::once(FLATPAK_SPAWN)
            .chain(FLATPAK_SPAWN_ARGS.iter().copied())
            .map(str::to_string)
            .chain(argv.iter().cloned())
            .collect())
    }

    fn build_command(&self, argv: &[String]) -> Result<Command, BridgeError> {
        let launch = self.launch_argv(argv)?;
        let (program, rest) = launch.split_first().ok_or(BridgeError::EmptyCommand)?;

        let mut cmd = Command::new(program);
        cmd.args(rest)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        Ok(cmd)
    }
}

impl Default for ProcessBridge {
    fn default() -> Self {
        Self::new(BridgeMode::Auto)
    }
}

#[async_trait]
impl HostBridge for ProcessBridge {
    async fn run(&self, argv: &[String], limit: Duration) -> Result<ProcessOutput, BridgeError> {
        let mut cmd = self.build_command(argv)?;
        tracing::debug!(?argv, escape = self.escape_sandbox, "Launching host process");

        let child = cmd.spawn()?;

        match timeout(limit, child.wait_with_output()).await {
            Ok(output) => {
                let output = output?;
                Ok(ProcessOutput {
                    exit_code: output.status.code().unwrap_or(-1),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
            // Dropping the future drops the child, and kill_on_drop reaps it.
            Err(_) => Err(BridgeError::Timeout(limit)),
        }
    }
}

fn in_flatpak_sandbox() -> bool {
    std::env::var_os("FLATPAK_ID").is_some() || Path::new(FLATPAK_INFO).exists()
}
