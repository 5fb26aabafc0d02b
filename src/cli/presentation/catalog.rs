//! Category catalogue and template presentation.

use super::shared::{bordered_table, format_section_heading, to_pretty_json};
use crate::template::Template;
use crate::types::DocumentCategory;
use serde_json::json;

pub fn format_categories_text() -> String {
    let mut out = format!("{}\n\n", format_section_heading("Document Categories"));
    let mut table = bordered_table(vec!["Category", "Label", "Description"]);
    for category in DocumentCategory::ALL {
        table.add_row(vec![
            category.slug().to_string(),
            category.label().to_string(),
            category.description().to_string(),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out.push_str("\nUse 'draftline generate --category <name> --use-example' to try one.");
    out
}

pub fn format_categories_json() -> String {
    let categories: Vec<_> = DocumentCategory::ALL
        .iter()
        .map(|category| {
            json!({
                "slug": category.slug(),
                "label": category.label(),
                "description": category.description(),
                "example_prompt": category.example_prompt(),
            })
        })
        .collect();
    let total = categories.len();
    to_pretty_json(&json!({ "categories": categories, "total": total }))
}

/// Raw template body, preceded by a heading naming the category.
pub fn format_template_text(template: &Template) -> String {
    format!(
        "{}\n\n{}",
        format_section_heading(&format!("{} template", template.category().label())),
        template.body()
    )
}
