//! Docfill Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for docfill, a
//! tool that fills `{{name}}` placeholders in Word documents.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            docfill-cli (CLI)            │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │   (GenerateService, TemplateService)    │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │       Application Ports (Traits)        │
//! │ (TemplateStore, DocumentCodec, Filesys) │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    docfill-adapters (Infrastructure)    │
//! │ (DocxCodec, LocalFilesystem, loader)    │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (VariableMap, substitute, Template)     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use docfill_core::domain::{MissingPolicy, VariableMap, parse_overrides, render_text, resolve};
//!
//! let defaults = VariableMap::from_pairs([("title", "默认标题"), ("author", "默认作者")]).unwrap();
//! let overrides = parse_overrides(["title=年度通知"]).unwrap();
//! let mapping = resolve(&defaults, &overrides);
//!
//! let (text, _report) = render_text("{{title}} by {{author}}", &mapping, MissingPolicy::Keep);
//! assert_eq!(text, "年度通知 by 默认作者");
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        GenerateOutcome, GenerateRequest, GenerateService, GenerationPlan, TemplateDetails,
        TemplateInfo, TemplateService,
        ports::{DocumentCodec, FilledDocument, Filesystem, TemplateStore},
    };
    pub use crate::domain::{
        MissingPolicy, SubstitutionReport, Template, TemplateContent, TemplateRegistry,
        VariableMap,
    };
    pub use crate::error::{DocfillError, DocfillResult};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
