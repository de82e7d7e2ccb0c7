//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `docfill-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `TemplateStore`: Template lookup and listing
//!   - `DocumentCodec`: Reading placeholders from, and filling, document bytes
//!   - `Filesystem`: Reading templates, writing the output document
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{DocumentCodec, FilledDocument, Filesystem, TemplateStore};
