//! Template Registry
//!
//! Holds exactly one template per document category. Templates are parsed once
//! at registry construction; lookup is a total, allocation-free index.
//!
//! Placeholder syntax:
//! - `{{client_name}}` and `{{project_details}}` substitute request fields.
//! - `{{#client_name}}...{{/client_name}}` renders its body only when the field
//!   has a value.

use crate::error::{ApiError, BindError};
use crate::types::DocumentCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

mod builtin;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Request field a placeholder refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ClientName,
    ProjectDetails,
}

impl Field {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "client_name" => Some(Field::ClientName),
            "project_details" => Some(Field::ProjectDetails),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::ClientName => "client_name",
            Field::ProjectDetails => "project_details",
        }
    }
}

/// Parsed template fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Field(Field),
    Section { field: Field, body: Vec<Segment> },
}

/// A category's template: raw body plus its parsed form.
#[derive(Debug, Clone)]
pub struct Template {
    category: DocumentCategory,
    body: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(category: DocumentCategory, body: impl Into<String>) -> Result<Self, BindError> {
        let body = body.into();
        let segments = parse_segments(&body)?;
        Ok(Self {
            category,
            body,
            segments,
        })
    }

    pub fn category(&self) -> DocumentCategory {
        self.category
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

fn parse_segments(body: &str) -> Result<Vec<Segment>, BindError> {
    // Stack of open sections; the bottom frame is the document itself.
    let mut stack: Vec<(Option<Field>, Vec<Segment>)> = vec![(None, Vec::new())];
    let mut cursor = 0;

    while let Some(rel) = body[cursor..].find(OPEN) {
        let start = cursor + rel;
        let tag_start = start + OPEN.len();
        let tag_len = body[tag_start..]
            .find(CLOSE)
            .ok_or(BindError::UnterminatedPlaceholder { offset: start })?;
        let tag = body[tag_start..tag_start + tag_len].trim();

        if start > cursor {
            if let Some((_, segs)) = stack.last_mut() {
                segs.push(Segment::Text(body[cursor..start].to_string()));
            }
        }

        if let Some(name) = tag.strip_prefix('#') {
            let field = Field::from_name(name.trim())
                .ok_or_else(|| BindError::UnknownPlaceholder(tag.to_string()))?;
            stack.push((Some(field), Vec::new()));
        } else if let Some(name) = tag.strip_prefix('/') {
            let name = name.trim();
            match stack.pop() {
                Some((Some(field), section_body)) if field.name() == name => {
                    if let Some((_, parent)) = stack.last_mut() {
                        parent.push(Segment::Section {
                            field,
                            body: section_body,
                        });
                    }
                }
                _ => return Err(BindError::UnbalancedSection(name.to_string())),
            }
        } else {
            let field = Field::from_name(tag)
                .ok_or_else(|| BindError::UnknownPlaceholder(tag.to_string()))?;
            if let Some((_, segs)) = stack.last_mut() {
                segs.push(Segment::Field(field));
            }
        }

        cursor = tag_start + tag_len + CLOSE.len();
    }

    if stack.len() > 1 {
        let open = stack
            .last()
            .and_then(|(field, _)| *field)
            .map(Field::name)
            .unwrap_or_default();
        return Err(BindError::UnbalancedSection(open.to_string()));
    }

    let (_, mut segments) = stack.pop().unwrap_or_default();
    if cursor < body.len() {
        segments.push(Segment::Text(body[cursor..].to_string()));
    }
    Ok(segments)
}

/// Per-category template override, from inline text or a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// One template per category, read-only after construction.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    // Indexed by `DocumentCategory::index`.
    templates: Vec<Template>,
}

impl TemplateRegistry {
    /// Registry holding the built-in templates.
    pub fn builtin() -> Result<Self, ApiError> {
        let templates = DocumentCategory::ALL
            .into_iter()
            .map(|category| {
                Template::parse(category, builtin::body_for(category))
                    .map_err(|e| template_error(category, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_templates(templates)
    }

    /// Build a registry from an explicit set. Every category must appear exactly once.
    pub fn from_templates(templates: Vec<Template>) -> Result<Self, ApiError> {
        let mut slots: Vec<Option<Template>> = vec![None; DocumentCategory::ALL.len()];
        for template in templates {
            let category = template.category();
            let slot = &mut slots[category.index()];
            if slot.is_some() {
                return Err(ApiError::TemplateError {
                    category: category.slug().to_string(),
                    message: "registered more than once".to_string(),
                });
            }
            *slot = Some(template);
        }

        let templates = DocumentCategory::ALL
            .into_iter()
            .zip(slots)
            .map(|(category, slot)| {
                slot.ok_or_else(|| ApiError::UnknownCategory(category.slug().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { templates })
    }

    /// Apply configured overrides on top of this registry.
    ///
    /// Relative `path` entries resolve against `base_dir`. Keys that do not name
    /// a category are rejected.
    pub fn with_overrides(
        mut self,
        overrides: &BTreeMap<String, TemplateSource>,
        base_dir: &Path,
    ) -> Result<Self, ApiError> {
        for (key, source) in overrides {
            let category: DocumentCategory = key.parse()?;
            let body = match (&source.body, &source.path) {
                (Some(body), None) => body.clone(),
                (None, Some(path)) => {
                    let path = if path.is_absolute() {
                        path.clone()
                    } else {
                        base_dir.join(path)
                    };
                    std::fs::read_to_string(&path).map_err(|e| ApiError::TemplateError {
                        category: key.clone(),
                        message: format!("failed to read {}: {}", path.display(), e),
                    })?
                }
                (Some(_), Some(_)) => {
                    return Err(ApiError::TemplateError {
                        category: key.clone(),
                        message: "set either 'body' or 'path', not both".to_string(),
                    })
                }
                (None, None) => continue,
            };
            let template =
                Template::parse(category, body).map_err(|e| template_error(category, e))?;
            debug!(category = %category, "Template override applied");
            self.templates[category.index()] = template;
        }
        Ok(self)
    }

    /// Template for a category. Total over the closed enumeration.
    pub fn lookup(&self, category: DocumentCategory) -> &Template {
        &self.templates[category.index()]
    }
}

fn template_error(category: DocumentCategory, err: BindError) -> ApiError {
    ApiError::TemplateError {
        category: category.slug().to_string(),
        message: err.to_string(),
    }
}
