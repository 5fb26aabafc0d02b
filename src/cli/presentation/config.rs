//! Config validation presentation.

use super::shared::to_pretty_json;
use crate::config::ValidationError;
use owo_colors::OwoColorize;
use serde_json::json;

pub fn format_validation_result_text(result: &Result<(), Vec<ValidationError>>) -> String {
    match result {
        Ok(()) => format!("{} Configuration is valid", "✓".green()),
        Err(errors) => {
            let mut out = format!(
                "{} Configuration has {} error(s):\n",
                "✗".red(),
                errors.len()
            );
            for error in errors {
                out.push_str(&format!("  - {}\n", error));
            }
            out.trim_end().to_string()
        }
    }
}

pub fn format_validation_result_json(result: &Result<(), Vec<ValidationError>>) -> String {
    let errors: Vec<String> = match result {
        Ok(()) => Vec::new(),
        Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
    };
    to_pretty_json(&json!({ "valid": errors.is_empty(), "errors": errors }))
}
