mod args;
mod commands;

pub use args::{Cli, Commands};
pub use commands::{
    apply_overrides, list_models, pull_model, run_commands, run_config, run_conversations,
    split_message,
};
