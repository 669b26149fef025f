//! # schemaforge-core
//!
//! Core library for generating schema.org structured-data graphs (JSON-LD)
//! from web pages.
//!
//! Given a URL, a display name, and a schema type, the workflow:
//! - fetches and extracts salient content from the page,
//! - maps the extracted facts onto the schema.org vocabulary for the
//!   requested type,
//! - assembles an internally consistent JSON-LD graph with `@id`-linked
//!   entities,
//! - serializes it as pretty JSON or as a ready-to-embed
//!   `<script type="application/ld+json">` block.
//!
//! ## Example
//!
//! ```no_run
//! use schemaforge_core::generate_schema;
//!
//! # async fn example() -> Result<(), schemaforge_core::WorkflowError> {
//! let result = generate_schema(
//!     "https://example.com/card",
//!     "Example Card",
//!     "payment_card",
//!     false,
//! )
//! .await?;
//!
//! println!("{}", result.schema);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod extract;
pub mod fetch;
pub mod graph;
pub mod serialize;
pub mod template;
pub mod types;
pub mod url_utils;
pub mod workflow;

pub use error::{Error, Stage, WorkflowError};
pub use fetch::{Fetcher, PageCache};
pub use template::{FieldSource, PropertySpec, SchemaTemplate, SchemaType, resolve};
pub use types::{Faq, GenerationResult, IntermediateRecord, SchemaGraph};
pub use workflow::{generate_schema, generate_schema_with_cache};

pub use extract::extract;
pub use graph::assemble;
pub use serialize::{to_json, to_script_tag};
