//! Host command execution for shell snippets found in chat messages.
//!
//! Nothing here runs on its own: callers must invoke [`CommandRunner::execute`]
//! from an explicit user action unless [`ExecutionPolicy::auto_execute`] is set.

mod bridge;

pub use bridge::{BridgeError, BridgeMode, HostBridge, ProcessBridge, ProcessOutput};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CHAINED_TIMEOUT: Duration = Duration::from_secs(60);
pub const NO_OUTPUT_MARKER: &str = "Command succeeded (no output)";

const INTERPRETER: &str = "sh";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionPolicy {
    /// Run shell blocks as soon as a reply completes them. Off unless the
    /// user turns it on in the config file.
    pub auto_execute: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandInput {
    Script(String),
    List(Vec<String>),
}

impl From<&str> for CommandInput {
    fn from(script: &str) -> Self {
        Self::Script(script.to_string())
    }
}

impl From<String> for CommandInput {
    fn from(script: String) -> Self {
        Self::Script(script)
    }
}

impl From<Vec<String>> for CommandInput {
    fn from(commands: Vec<String>) -> Self {
        Self::List(commands)
    }
}

impl From<&[&str]> for CommandInput {
    fn from(commands: &[&str]) -> Self {
        Self::List(commands.iter().map(ToString::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for CommandInput {
    fn from(commands: [&str; N]) -> Self {
        Self::from(&commands[..])
    }
}

impl CommandInput {
    /// Flattens the input into the list of commands that will actually run.
    #[must_use]
    pub fn normalize(&self) -> Vec<String> {
        match self {
            Self::Script(script) if script.contains('\n') => script
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .filter(|line| !line.starts_with('#') && !line.starts_with('!'))
                .map(ToString::to_string)
                .collect(),
            Self::Script(script) => {
                let trimmed = script.trim();
                if trimmed.is_empty() {
                    Vec::new()
                } else {
                    vec![trimmed.to_string()]
                }
            }
            Self::List(commands) => commands
                .iter()
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .map(ToString::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    Output(String),
    Failed { code: i32, stderr: String },
    TimedOut { command: String, limit: Duration },
    LaunchFailed(String),
}

impl ExecutionResult {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Output(_))
    }

    fn from_process(command: &str, limit: Duration, outcome: Result<ProcessOutput, BridgeError>) -> Self {
        match outcome {
            Ok(out) if out.exit_code == 0 => {
                let stdout = out.stdout.trim();
                if stdout.is_empty() {
                    Self::Output(NO_OUTPUT_MARKER.to_string())
                } else {
                    Self::Output(stdout.to_string())
                }
            }
            Ok(out) => Self::Failed {
                code: out.exit_code,
                stderr: out.stderr.trim().to_string(),
            },
            Err(BridgeError::Timeout(_)) => Self::TimedOut {
                command: command.to_string(),
                limit,
            },
            Err(e) => Self::LaunchFailed(e.to_string()),
        }
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Output(text) => f.write_str(text),
            Self::Failed { code, stderr } => write!(f, "Error (code {code}): {stderr}"),
            Self::TimedOut { command, limit } => {
                write!(f, "Timed out after {}s: {command}", limit.as_secs())
            }
            Self::LaunchFailed(detail) => write!(f, "Launch error: {detail}"),
        }
    }
}

#[derive(Clone)]
pub struct CommandRunner {
    bridge: Arc<dyn HostBridge>,
    command_timeout: Duration,
    chained_timeout: Duration,
}

impl fmt::Debug for CommandRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRunner")
            .field("command_timeout", &self.command_timeout)
            .field("chained_timeout", &self.chained_timeout)
            .finish_non_exhaustive()
    }
}

impl CommandRunner {
    #[must_use]
    pub fn new(bridge: Arc<dyn HostBridge>) -> Self {
        Self {
            bridge,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            chained_timeout: DEFAULT_CHAINED_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_timeouts(mut self, command: Duration, chained: Duration) -> Self {
        self.command_timeout = command;
        self.chained_timeout = chained;
        self
    }

    /// Runs `input` and returns one result per command, or a single result
    /// when the commands had to be chained to keep a `cd` in effect.
    pub async fn execute(&self, input: impl Into<CommandInput>) -> Vec<ExecutionResult> {
        let commands = input.into().normalize();
        if commands.is_empty() {
            return Vec::new();
        }

        if needs_chaining(&commands) {
            let chained = commands.join(" && ");
            tracing::info!(count = commands.len(), "Running chained commands");
            return vec![self.run_one(&chained, self.chained_timeout).await];
        }

        let mut results = Vec::with_capacity(commands.len());
        for command in &commands {
            results.push(self.run_one(command, self.command_timeout).await);
        }
        results
    }

    async fn run_one(&self, command: &str, limit: Duration) -> ExecutionResult {
        let argv = vec![
            INTERPRETER.to_string(),
            "-c".to_string(),
            command.to_string(),
        ];

        let outcome = self.bridge.run(&argv, limit).await;
        let result = ExecutionResult::from_process(command, limit, outcome);

        if result.is_success() {
            tracing::info!(command, "Command succeeded");
        } else {
            tracing::warn!(command, result = %result, "Command failed");
        }
        result
    }
}

fn needs_chaining(commands: &[String]) -> bool {
    commands.len() > 1 && commands.iter().any(|c| is_directory_change(c))
}

fn is_directory_change(command: &str) -> bool {
    command == "cd" || command.starts_with("cd ") || command.starts_with("cd\t")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    fn runner() -> CommandRunner {
        CommandRunner::new(Arc::new(ProcessBridge::direct()))
    }

    #[derive(Default)]
    struct RecordingBridge {
        calls: Mutex<Vec<(Vec<String>, Duration)>>,
    }

    #[async_trait]
    impl HostBridge for RecordingBridge {
        async fn run(&self, argv: &[String], limit: Duration) -> Result<ProcessOutput, BridgeError> {
            self.calls.lock().push((argv.to_vec(), limit));
            Ok(ProcessOutput {
                exit_code: 0,
                stdout: String::new(),
                stderr: String::new(),
            })
        }
    }

    #[test]
    fn multiline_script_drops_blank_and_comment_lines() {
        let input = CommandInput::from("# setup\necho a\n\n! magic\n  echo b  \n");
        assert_eq!(input.normalize(), vec!["echo a", "echo b"]);
    }

    #[test]
    fn single_line_script_is_one_command() {
        assert_eq!(CommandInput::from("  ls -la ").normalize(), vec!["ls -la"]);
        assert!(CommandInput::from("   ").normalize().is_empty());
    }

    #[test]
    fn list_input_is_trimmed() {
        let input = CommandInput::from(vec![" pwd ".to_string(), String::new(), "ls".to_string()]);
        assert_eq!(input.normalize(), vec!["pwd", "ls"]);
    }

    #[test]
    fn chaining_requires_cd_and_several_commands() {
        assert!(needs_chaining(&["cd /tmp".into(), "pwd".into()]));
        assert!(!needs_chaining(&["cd /tmp".into()]));
        assert!(!needs_chaining(&["echo cd".into(), "pwd".into()]));
        assert!(!needs_chaining(&["cdrecord x".into(), "pwd".into()]));
    }

    #[tokio::test]
    async fn cd_sequence_runs_as_one_invocation() {
        let results = runner().execute(["cd /tmp", "pwd"]).await;

        assert_eq!(results.len(), 1);
        let ExecutionResult::Output(out) = &results[0] else {
            panic!("expected output, got {:?}", results[0]);
        };
        assert!(out.ends_with("tmp"), "unexpected pwd output: {out}");
    }

    #[tokio::test]
    async fn chained_run_uses_long_timeout_and_fixed_argv() {
        let bridge = Arc::new(RecordingBridge::default());
        let runner = CommandRunner::new(bridge.clone());

        runner.execute(["cd /srv", "ls"]).await;

        let calls = bridge.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, vec!["sh", "-c", "cd /srv && ls"]);
        assert_eq!(calls[0].1, DEFAULT_CHAINED_TIMEOUT);
    }

    #[tokio::test]
    async fn independent_commands_each_get_a_result() {
        let results = runner().execute(["echo one", "false", "echo three"]).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0], ExecutionResult::Output("one".into()));
        assert!(matches!(results[1], ExecutionResult::Failed { code: 1, .. }));
        assert_eq!(results[2], ExecutionResult::Output("three".into()));
    }

    #[tokio::test]
    async fn failing_command_reports_code() {
        let results = runner().execute("false").await;
        let texts: Vec<String> = results.iter().map(ToString::to_string).collect();
        assert_eq!(texts, vec!["Error (code 1): "]);
    }

    #[tokio::test]
    async fn stderr_is_included_in_failure() {
        let results = runner().execute("echo nope >&2; exit 2").await;
        assert_eq!(results[0].to_string(), "Error (code 2): nope");
    }

    #[tokio::test]
    async fn silent_success_uses_marker() {
        let results = runner().execute("true").await;
        assert_eq!(results, vec![ExecutionResult::Output(NO_OUTPUT_MARKER.into())]);
    }

    #[tokio::test]
    async fn timeout_names_the_command() {
        let runner = runner().with_timeouts(Duration::from_millis(200), Duration::from_secs(1));
        let results = runner.execute("sleep 5").await;

        assert_eq!(results.len(), 1);
        let text = results[0].to_string();
        assert!(text.contains("Timed out"));
        assert!(text.contains("sleep 5"));
    }

    #[tokio::test]
    async fn empty_input_runs_nothing() {
        let bridge = Arc::new(RecordingBridge::default());
        let results = CommandRunner::new(bridge.clone()).execute("\n# only a comment\n").await;

        assert!(results.is_empty());
        assert!(bridge.calls.lock().is_empty());
    }
}
