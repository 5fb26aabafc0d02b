//! CLI help: stable command names for logging.

use crate::cli::parse::{Commands, ConfigCommands};

pub fn command_name(command: &Commands) -> String {
    match command {
        Commands::Generate { .. } => "generate".to_string(),
        Commands::Categories { .. } => "categories".to_string(),
        Commands::Template { .. } => "template".to_string(),
        Commands::Config { command } => format!("config.{}", config_command_name(command)),
    }
}

fn config_command_name(command: &ConfigCommands) -> &'static str {
    match command {
        ConfigCommands::Validate { .. } => "validate",
        ConfigCommands::Show => "show",
    }
}
