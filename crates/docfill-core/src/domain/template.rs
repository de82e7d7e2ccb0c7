//! The template record.
//!
//! A template is a small, read-only value: a name, an optional category and
//! description, the defaults its author declared, and a handle to the
//! document bytes. Keeping the handle abstract lets the resolver and the
//! substitution engine be tested without real files.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::{error::DomainError, variables::VariableMap};

/// Where a template's document bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateContent {
    /// A document file on disk, read when the template is used.
    File(PathBuf),
    /// Bytes held in memory (tests, embedded templates).
    Inline(Arc<[u8]>),
}

impl TemplateContent {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File(p) => Some(p),
            Self::Inline(_) => None,
        }
    }
}

impl fmt::Display for TemplateContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(p) => write!(f, "{}", p.display()),
            Self::Inline(bytes) => write!(f, "<inline, {} bytes>", bytes.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    category: Option<String>,
    description: Option<String>,
    defaults: VariableMap,
    content: TemplateContent,
}

impl Template {
    pub fn builder() -> TemplateBuilder {
        TemplateBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn defaults(&self) -> &VariableMap {
        &self.defaults
    }

    pub fn content(&self) -> &TemplateContent {
        &self.content
    }

    /// Qualified id: `category/name`, or just `name` at the library root.
    pub fn id(&self) -> String {
        match &self.category {
            Some(c) => format!("{c}/{}", self.name),
            None => self.name.clone(),
        }
    }
}

/// Builder for [`Template`]; `name` and `content` are required.
#[derive(Debug, Default)]
pub struct TemplateBuilder {
    name: Option<String>,
    category: Option<String>,
    description: Option<String>,
    defaults: VariableMap,
    content: Option<TemplateContent>,
}

impl TemplateBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Category path; backslashes are normalised and empty values ignored.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        let c = category.into().replace('\\', "/");
        let c = c.trim_matches('/');
        self.category = (!c.is_empty()).then(|| c.to_string());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        let d = description.into();
        self.description = (!d.trim().is_empty()).then_some(d);
        self
    }

    pub fn defaults(mut self, defaults: VariableMap) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn content(mut self, content: TemplateContent) -> Self {
        self.content = Some(content);
        self
    }

    pub fn build(self) -> Result<Template, DomainError> {
        let name = self
            .name
            .ok_or_else(|| DomainError::InvalidTemplate("template name is required".into()))?;
        validate_template_name(&name)?;

        let content = self.content.ok_or_else(|| {
            DomainError::InvalidTemplate(format!("template '{name}' has no document"))
        })?;

        Ok(Template {
            name,
            category: self.category,
            description: self.description,
            defaults: self.defaults,
            content,
        })
    }
}

fn validate_template_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidTemplate(
            "template name cannot be empty".into(),
        ));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(DomainError::InvalidTemplate(format!(
            "template name '{name}' cannot contain path separators"
        )));
    }
    Ok(())
}
