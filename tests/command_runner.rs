#![cfg(unix)]

use std::sync::Arc;
use std::time::Duration;

use ollama_chat::exec::{CommandRunner, ExecutionResult, ProcessBridge};

fn runner() -> CommandRunner {
    CommandRunner::new(Arc::new(ProcessBridge::direct()))
}

#[tokio::test]
async fn cd_carries_over_to_later_commands() {
    let results = runner().execute(["cd /tmp", "pwd"]).await;

    assert_eq!(results.len(), 1);
    let text = results[0].to_string();
    assert!(text.trim_end().ends_with("/tmp"), "got {text:?}");
}

#[tokio::test]
async fn failing_command_reports_exit_code() {
    let results = runner().execute("false").await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].to_string(), "Error (code 1): ");
    assert!(!results[0].is_success());
}

#[tokio::test]
async fn slow_command_times_out() {
    let runner = runner().with_timeouts(Duration::from_millis(200), Duration::from_millis(400));
    let results = runner.execute("sleep 5").await;

    assert!(matches!(results[0], ExecutionResult::TimedOut { .. }));
}

#[tokio::test]
async fn silent_success_is_reported() {
    let results = runner().execute("true").await;
    assert!(results[0].is_success());
    assert!(!results[0].to_string().is_empty());
}
