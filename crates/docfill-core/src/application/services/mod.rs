//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "fill a template" or "describe a template".

pub mod generate_service;
pub mod template_service;

pub use generate_service::{GenerateOutcome, GenerateRequest, GenerateService, GenerationPlan};
pub use template_service::{TemplateDetails, TemplateInfo, TemplateService};

use crate::{
    application::ports::Filesystem,
    domain::{Template, TemplateContent},
    error::DocfillResult,
};

/// Fetch a template's document bytes through the filesystem port.
fn load_document(filesystem: &dyn Filesystem, template: &Template) -> DocfillResult<Vec<u8>> {
    match template.content() {
        TemplateContent::File(path) => filesystem.read(path),
        TemplateContent::Inline(bytes) => Ok(bytes.to_vec()),
    }
}
