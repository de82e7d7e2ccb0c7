// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for docfill.
//!
//! Pure logic only: no filesystem, no archive handling, no XML.
//!
//! - **Variables**: mappings, override parsing, layered resolution
//! - **Substitution**: `{{name}}` scan-and-replace over text runs
//! - **Template / Registry**: the read-only template records
//!
pub mod error;
pub mod registry;
pub mod substitution;
pub mod template;
pub mod variables;

// Re-exports for convenience
pub use error::{DomainError, ErrorCategory};
pub use registry::TemplateRegistry;
pub use substitution::{
    MissingPolicy, SubstitutionReport, Token, placeholders, render_text, substitute, tokens,
};
pub use template::{Template, TemplateBuilder, TemplateContent};
pub use variables::{
    VariableMap, is_valid_name, parse_override, parse_overrides, resolve, resolve_layers,
};
