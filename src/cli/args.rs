//! CLI argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ollama-chat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Model to chat with (e.g., llama3.2, qwen2.5-coder:7b)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Ollama server URL
    #[arg(short, long, global = true)]
    pub server: Option<String>,

    /// Sampling temperature, between 0.0 and 2.0
    #[arg(short, long, global = true)]
    pub temperature: Option<f32>,

    /// Reopen a saved conversation by id
    #[arg(short, long)]
    pub conversation: Option<u64>,

    /// Read settings from this file instead of the default config
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the models installed on the server
    Models,
    /// Download a model from the Ollama library
    Pull {
        /// Model name, e.g. llama3.2:3b
        name: String,
    },
    /// Inspect or delete saved conversations
    Conversations {
        #[command(subcommand)]
        command: ConversationSubcommands,
    },
    /// Run shell commands on this machine, like a confirmed /run
    Run {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Commands to run in order; `cd` carries over to the next one
        #[arg(required = true, num_args = 1..)]
        commands: Vec<String>,
    },
    /// Split a message into prose and code segments
    Split {
        /// File holding the message; stdin when omitted
        file: Option<PathBuf>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigSubcommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConversationSubcommands {
    /// List saved conversations
    List,
    /// Print one conversation
    Show { id: u64 },
    /// Delete one conversation
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommands {
    /// Initialize a new config file
    Init,
    /// Print config file location
    Where,
}
