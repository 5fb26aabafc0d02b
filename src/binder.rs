//! Binder
//!
//! Merges a request's fields into its category template. Binding is pure and
//! deterministic: identical inputs always produce byte-identical output.
//!
//! [`Synthesizer`] is the seam a generative backend would implement; it must keep
//! the same contract (synchronous, returns the complete text at once) so that
//! delivery does not change.

use crate::error::BindError;
use crate::template::{Field, Segment, Template};
use crate::types::GenerationRequest;

/// Substituted for `{{client_name}}` when the request names no client.
pub const DEFAULT_CLIENT_NAME: &str = "Client";

/// Produces the complete document text for a request.
pub trait Synthesizer: Send + Sync {
    fn synthesize(
        &self,
        template: &Template,
        request: &GenerationRequest,
    ) -> Result<String, BindError>;
}

/// Default synthesizer: plain placeholder substitution.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateBinder;

impl Synthesizer for TemplateBinder {
    fn synthesize(
        &self,
        template: &Template,
        request: &GenerationRequest,
    ) -> Result<String, BindError> {
        Ok(bind(template, request))
    }
}

/// Bind `request` into `template`.
///
/// Field values are inserted verbatim; output is plain text and is never
/// interpreted as markup.
pub fn bind(template: &Template, request: &GenerationRequest) -> String {
    let mut out = String::with_capacity(template.body().len() + request.project_details.len());
    render(template.segments(), request, &mut out);
    out
}

fn render(segments: &[Segment], request: &GenerationRequest, out: &mut String) {
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Field(field) => out.push_str(field_value(*field, request)),
            Segment::Section { field, body } => {
                if field_present(*field, request) {
                    render(body, request, out);
                }
            }
        }
    }
}

fn field_value(field: Field, request: &GenerationRequest) -> &str {
    match field {
        Field::ClientName => request.client().unwrap_or(DEFAULT_CLIENT_NAME),
        Field::ProjectDetails => &request.project_details,
    }
}

fn field_present(field: Field, request: &GenerationRequest) -> bool {
    match field {
        Field::ClientName => request.client().is_some(),
        Field::ProjectDetails => request.has_details(),
    }
}
