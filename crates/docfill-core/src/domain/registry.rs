//! Read-only registry of known templates.
//!
//! Built once at start-up from whatever the template loader found and then
//! passed explicitly to the services that need it. Nothing in the crate
//! keeps templates in global state.

use std::collections::{BTreeSet, HashMap};

use crate::domain::{error::DomainError, template::Template};

#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    /// Sorted by qualified id.
    templates: Vec<Template>,
    by_id: HashMap<String, usize>,
}

impl TemplateRegistry {
    /// Build a registry, rejecting two templates with the same qualified id.
    pub fn from_templates(
        templates: impl IntoIterator<Item = Template>,
    ) -> Result<Self, DomainError> {
        let mut templates: Vec<Template> = templates.into_iter().collect();
        templates.sort_by_key(Template::id);

        let mut by_id = HashMap::with_capacity(templates.len());
        for (idx, t) in templates.iter().enumerate() {
            if by_id.insert(t.id(), idx).is_some() {
                return Err(DomainError::DuplicateTemplate { id: t.id() });
            }
        }

        Ok(Self { templates, by_id })
    }

    /// Look a template up by qualified id, falling back to its bare name.
    ///
    /// A bare name shared by templates in different categories is reported
    /// as [`DomainError::AmbiguousTemplate`] rather than picking one.
    pub fn get(&self, name: &str) -> Result<&Template, DomainError> {
        let name = name.trim().trim_matches('/');

        if let Some(&idx) = self.by_id.get(name) {
            return Ok(&self.templates[idx]);
        }

        let matches: Vec<&Template> = self.templates.iter().filter(|t| t.name() == name).collect();
        match matches.as_slice() {
            [] => Err(DomainError::TemplateNotFound { name: name.into() }),
            [only] => Ok(*only),
            many => Err(DomainError::AmbiguousTemplate {
                name: name.into(),
                candidates: many.iter().map(|t| t.id()).collect(),
            }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }

    /// Templates whose category is `category` or nested below it.
    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Template> {
        let category = category.trim_matches('/');
        self.templates.iter().filter(move |t| {
            t.category().is_some_and(|c| {
                c == category || c.strip_prefix(category).is_some_and(|rest| rest.starts_with('/'))
            })
        })
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.templates.iter().filter_map(Template::category).collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
