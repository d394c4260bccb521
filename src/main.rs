mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use ollama_chat::config::AppConfig;
use ollama_chat::core::Result;
use ollama_chat::logging;
use ollama_chat::ollama::{ChatBackend, OllamaClient};
use ollama_chat::tui;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let _log_guard = logging::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("✗ {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    let config_path = cli.config.clone().or_else(AppConfig::get_config_path);
    let mut config = AppConfig::load_from(config_path.clone());
    cli::apply_overrides(&cli, &mut config)?;

    let connect = || -> Result<Arc<dyn ChatBackend>> {
        Ok(Arc::new(OllamaClient::new(config.server_url.clone())?))
    };

    match cli.command {
        Some(Commands::Config { command }) => {
            cli::run_config(&command)?;
        }
        None => {
            tui::run_tui(&config, config_path, connect()?, cli.conversation).await?;
        }
        Some(Commands::Models) => {
            cli::list_models(connect()?.as_ref(), config.model.as_deref()).await?;
        }
        Some(Commands::Pull { name }) => {
            cli::pull_model(connect()?.as_ref(), &name).await?;
        }
        Some(Commands::Conversations { command }) => {
            cli::run_conversations(&command, &config.conversations_path())?;
        }
        Some(Commands::Run { yes, commands }) => {
            return cli::run_commands(commands, yes, &config).await;
        }
        Some(Commands::Split { file }) => {
            cli::split_message(file.as_deref())?;
        }
    }

    Ok(true)
}
