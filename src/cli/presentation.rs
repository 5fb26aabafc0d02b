//! CLI presentation: text and JSON formatting for command results.

mod catalog;
mod config;
mod session;
mod shared;

pub use catalog::{
    format_categories_json, format_categories_text, format_template_text,
};
pub use config::{format_validation_result_json, format_validation_result_text};
pub use session::{
    format_export_outcome, format_session_summary_json, format_session_summary_text,
};
pub use shared::format_section_heading;
