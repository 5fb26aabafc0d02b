//! CLI domain: parse, route, help, output, and presentation only.
//! No engine orchestration; single route table dispatches to the session controller.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands, ConfigCommands};
pub use presentation::{
    format_categories_json, format_categories_text, format_export_outcome,
    format_section_heading, format_session_summary_json, format_session_summary_text,
    format_template_text, format_validation_result_json, format_validation_result_text,
};
pub use route::RunContext;
