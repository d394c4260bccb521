use std::io::{self, BufRead, Read, Write};
use std::path::Path;
use std::sync::Arc;

use futures::StreamExt;
use ollama_chat::config::AppConfig;
use ollama_chat::core::{AppError, Result};
use ollama_chat::exec::{CommandRunner, ProcessBridge};
use ollama_chat::ollama::{ChatBackend, LocalModel, ProviderError, PullProgress};
use ollama_chat::render::{self, Segment};
use ollama_chat::store::ConversationStore;

use super::args::{Cli, ConfigSubcommands, ConversationSubcommands};

const TEMPERATURE_RANGE: std::ops::RangeInclusive<f32> = 0.0..=2.0;

/// Layers command-line flags over the loaded configuration.
pub fn apply_overrides(cli: &Cli, config: &mut AppConfig) -> Result<()> {
    if let Some(model) = &cli.model {
        config.model = Some(model.clone());
    }
    if let Some(server) = &cli.server {
        config.server_url.clone_from(server);
    }
    if let Some(temperature) = cli.temperature {
        if !TEMPERATURE_RANGE.contains(&temperature) {
            return Err(AppError::Config(format!(
                "temperature must be between 0.0 and 2.0, got {temperature}"
            )));
        }
        config.temperature = temperature;
    }
    Ok(())
}

pub fn run_config(command: &ConfigSubcommands) -> Result<()> {
    match command {
        ConfigSubcommands::Init => {
            let path = AppConfig::init_default()?;
            println!("✓ Created config file at {}", path.display());
        }
        ConfigSubcommands::Where => match AppConfig::get_config_path() {
            Some(path) => {
                println!("{}", path.display());
                if let Some(log) = ollama_chat::logging::log_file_path() {
                    println!("Debug log: {}", log.display());
                }
            }
            None => {
                return Err(AppError::Config(
                    "could not determine config path".to_string(),
                ));
            }
        },
    }
    Ok(())
}

pub async fn list_models(backend: &dyn ChatBackend, current: Option<&str>) -> Result<()> {
    let models = backend.list_local_models().await?;
    let mut out = io::stdout().lock();
    write_models(&mut out, &models, current)?;
    Ok(())
}

fn write_models(out: &mut impl Write, models: &[LocalModel], current: Option<&str>) -> io::Result<()> {
    if models.is_empty() {
        writeln!(out, "No models installed. Try `ollama-chat pull llama3.2`.")?;
        return Ok(());
    }

    let name_width = models.iter().map(|m| m.name.len()).max().unwrap_or(0);
    for model in models {
        let marker = if Some(model.name.as_str()) == current { "*" } else { " " };
        let details = model
            .details
            .as_ref()
            .map(|d| {
                [d.parameter_size.as_deref(), d.quantization_level.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();
        let modified = model
            .modified_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        writeln!(
            out,
            "{marker} {:<name_width$}  {:>8}  {details:<12}  {modified}",
            model.name,
            model.size_label(),
        )?;
    }
    Ok(())
}

pub async fn pull_model(backend: &dyn ChatBackend, name: &str) -> Result<()> {
    let mut progress = backend.pull_model(name).await?;
    let mut err = io::stderr();

    while let Some(update) = progress.next().await {
        match update {
            PullProgress::Status(status) => writeln!(err, "\r{status}")?,
            PullProgress::Progress(fraction) => {
                write!(err, "\r{name}: {:>5.1}%", fraction * 100.0)?;
                err.flush()?;
            }
            PullProgress::Success => {
                writeln!(err, "\n✓ Pulled {name}")?;
                return Ok(());
            }
            PullProgress::Failed(error) => {
                writeln!(err)?;
                return Err(ProviderError::StreamError(error).into());
            }
        }
    }

    Err(ProviderError::StreamError(format!("server closed the pull of {name} before it finished")).into())
}

pub fn run_conversations(command: &ConversationSubcommands, path: &Path) -> Result<()> {
    let mut store = ConversationStore::load(path);
    let mut out = io::stdout().lock();

    match command {
        ConversationSubcommands::List => write_summaries(&mut out, &store)?,
        ConversationSubcommands::Show { id } => {
            let conversation = store
                .get_conversation(*id)
                .ok_or(AppError::ConversationNotFound(*id))?;
            writeln!(out, "# {} ({})", conversation.title, conversation.model)?;
            if let Some(system) = &conversation.system {
                writeln!(out, "\n[system]\n{system}")?;
            }
            for entry in &conversation.history {
                writeln!(out, "\n[{}]\n{}", entry.role.as_str(), entry.content)?;
            }
        }
        ConversationSubcommands::Delete { id } => {
            if !store.delete_conversation(*id) {
                return Err(AppError::ConversationNotFound(*id));
            }
            store.save()?;
            writeln!(out, "✓ Deleted conversation {id}")?;
        }
    }
    Ok(())
}

fn write_summaries(out: &mut impl Write, store: &ConversationStore) -> io::Result<()> {
    if store.is_empty() {
        return writeln!(out, "No saved conversations.");
    }
    for summary in store.summaries() {
        writeln!(
            out,
            "{:>4}  {}  ({}, {} messages)",
            summary.id, summary.title, summary.model, summary.messages
        )?;
    }
    Ok(())
}

/// Runs `commands` as one chain. Returns whether every command succeeded.
pub async fn run_commands(commands: Vec<String>, yes: bool, config: &AppConfig) -> Result<bool> {
    if !yes && !confirm(&commands)? {
        eprintln!("Aborted.");
        return Ok(false);
    }

    let runner = CommandRunner::new(Arc::new(ProcessBridge::new(config.execution.host_bridge)))
        .with_timeouts(
            config.execution.command_timeout(),
            config.execution.chained_timeout(),
        );

    let results = runner.execute(commands).await;
    let mut out = io::stdout().lock();
    for result in &results {
        writeln!(out, "{result}")?;
    }
    Ok(results.iter().all(|r| r.is_success()))
}

fn confirm(commands: &[String]) -> Result<bool> {
    let mut err = io::stderr().lock();
    writeln!(err, "About to run on this machine:")?;
    for command in commands {
        writeln!(err, "  $ {command}")?;
    }
    write!(err, "Continue? [y/N] ")?;
    err.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub fn split_message(file: Option<&Path>) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    let mut out = io::stdout().lock();
    write_segments(&mut out, &render::split(&text))?;
    Ok(())
}

fn write_segments(out: &mut impl Write, segments: &[Segment]) -> io::Result<()> {
    for (index, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Plain(text) => writeln!(out, "{}. plain {text:?}", index + 1)?,
            Segment::Code(block) => {
                writeln!(out, "{}. code ({})", index + 1, block.language)?;
                for line in block.content.lines() {
                    writeln!(out, "   | {line}")?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use ollama_chat::store::HistoryEntry;

    fn output(write: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        write(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn segments_are_listed_in_order() {
        let segments = render::split("Run ```\nls -la\n``` now");
        let text = output(|out| write_segments(out, &segments));

        assert_eq!(text, "1. plain \"Run \"\n2. code (shell)\n   | ls -la\n3. plain \" now\"\n");
    }

    #[test]
    fn overrides_replace_config_values() {
        let cli = Cli::parse_from(["ollama-chat", "--model", "qwen2.5", "--temperature", "0.3"]);
        let mut config = AppConfig::default();
        apply_overrides(&cli, &mut config).unwrap();

        assert_eq!(config.model.as_deref(), Some("qwen2.5"));
        assert!((config.temperature - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let cli = Cli::parse_from(["ollama-chat", "--temperature", "3.5"]);
        let mut config = AppConfig::default();
        assert!(matches!(apply_overrides(&cli, &mut config), Err(AppError::Config(_))));
    }

    #[test]
    fn empty_model_list_suggests_pull() {
        let text = output(|out| write_models(out, &[], None));
        assert!(text.contains("pull"));
    }

    #[test]
    fn summaries_list_saved_conversations() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ConversationStore::new(dir.path().join("c.json"));
        store.add_conversation(
            "llama3",
            "Disk usage",
            HistoryEntry::user("how full is my disk"),
            HistoryEntry::assistant("```\ndf -h\n```"),
        );

        let text = output(|out| write_summaries(out, &store));
        assert_eq!(text, "   1  Disk usage  (llama3, 2 messages)\n");
    }
}
