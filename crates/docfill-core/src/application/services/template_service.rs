//! Template Service - template library queries.
//!
//! Listing and inspection only; generation lives in GenerateService.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::{
    application::{
        ports::{DocumentCodec, Filesystem, TemplateStore},
        services::load_document,
    },
    domain::{Template, VariableMap},
    error::DocfillResult,
};

/// Serializable summary of one template, used by `list` and `inspect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub defaults: VariableMap,
    pub source: String,
}

impl From<&Template> for TemplateInfo {
    fn from(t: &Template) -> Self {
        Self {
            id: t.id(),
            name: t.name().to_string(),
            category: t.category().map(str::to_string),
            description: t.description().map(str::to_string),
            defaults: t.defaults().clone(),
            source: t.content().to_string(),
        }
    }
}

/// A template together with what its document actually contains.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateDetails {
    #[serde(flatten)]
    pub info: TemplateInfo,
    /// Placeholder names found in the document.
    pub placeholders: BTreeSet<String>,
    /// Placeholders with no declared default.
    pub undeclared: BTreeSet<String>,
    /// Declared defaults that no placeholder uses.
    pub unused_defaults: BTreeSet<String>,
}

/// Service for template library operations.
pub struct TemplateService {
    store: Box<dyn TemplateStore>,
    codec: Box<dyn DocumentCodec>,
    filesystem: Box<dyn Filesystem>,
}

impl TemplateService {
    pub fn new(
        store: Box<dyn TemplateStore>,
        codec: Box<dyn DocumentCodec>,
        filesystem: Box<dyn Filesystem>,
    ) -> Self {
        Self {
            store,
            codec,
            filesystem,
        }
    }

    /// List all templates.
    pub fn list(&self) -> DocfillResult<Vec<TemplateInfo>> {
        Ok(self.store.list()?.iter().map(TemplateInfo::from).collect())
    }

    /// List templates in `category`, including nested categories.
    pub fn in_category(&self, category: &str) -> DocfillResult<Vec<TemplateInfo>> {
        let category = category.trim_matches('/');
        Ok(self
            .store
            .list()?
            .iter()
            .filter(|t| {
                t.category().is_some_and(|c| {
                    c == category
                        || c.strip_prefix(category)
                            .is_some_and(|rest| rest.starts_with('/'))
                })
            })
            .map(TemplateInfo::from)
            .collect())
    }

    /// Read a template's document and report its placeholders.
    pub fn describe(&self, name: &str) -> DocfillResult<TemplateDetails> {
        let template = self.store.get(name)?;
        let document = load_document(self.filesystem.as_ref(), &template)?;
        let placeholders = self.codec.placeholders(&document)?;

        let declared: BTreeSet<String> = template.defaults().keys().map(str::to_string).collect();
        let undeclared = placeholders.difference(&declared).cloned().collect();
        let unused_defaults = declared.difference(&placeholders).cloned().collect();

        Ok(TemplateDetails {
            info: TemplateInfo::from(&template),
            placeholders,
            undeclared,
            unused_defaults,
        })
    }
}
