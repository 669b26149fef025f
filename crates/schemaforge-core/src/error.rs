//! Error taxonomy for the generation workflow.
//!
//! Every component raises its own specific error kind; all of them are
//! terminal for the current invocation and nothing is retried internally.

use std::fmt;

use thiserror::Error;

/// Errors raised by the individual pipeline components.
#[derive(Debug, Error)]
pub enum Error {
    /// The URL was malformed or used an unsupported scheme. Raised before
    /// any network call is made.
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Network failure, timeout, or non-success HTTP status. `url` is empty
    /// when the HTTP client itself could not be constructed, before any
    /// request existed.
    #[error("{}: {}", fetch_context(.url), .source)]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The fetched content was not parsable markup at all. Missing
    /// individual fields never raise this; only total unparsability does.
    #[error("content is not parsable markup: {reason}")]
    Extraction { reason: String },

    /// The requested schema-type tag is not in the supported set.
    #[error("unsupported schema type: {0:?}")]
    UnsupportedSchemaType(String),

    /// A property the template marks required resolved to nothing and the
    /// template declares no fallback for it.
    #[error("required property {property:?} on {schema_type} has no value and no fallback")]
    IncompleteSchema {
        schema_type: &'static str,
        property: &'static str,
    },
}

fn fetch_context(url: &str) -> String {
    if url.is_empty() {
        "building the http client failed".to_string()
    } else {
        format!("fetch failed for {url}")
    }
}

impl Error {
    /// Stable machine-readable kind string, used by the CLI for stderr output.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidUrl { .. } => "invalid-url",
            Error::Fetch { .. } => "fetch",
            Error::Extraction { .. } => "extraction",
            Error::UnsupportedSchemaType(_) => "unsupported-schema-type",
            Error::IncompleteSchema { .. } => "incomplete-schema",
        }
    }
}

/// The pipeline stage that produced a [`WorkflowError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolveType,
    Fetch,
    Extract,
    Assemble,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ResolveType => "resolve-type",
            Stage::Fetch => "fetch",
            Stage::Extract => "extract",
            Stage::Assemble => "assemble",
        };
        f.write_str(name)
    }
}

/// Orchestrator wrapper: the underlying domain error, tagged with the stage
/// that failed. The domain error is never reinterpreted.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct WorkflowError {
    pub stage: Stage,
    #[source]
    pub source: Error,
}

impl WorkflowError {
    pub(crate) fn at(stage: Stage) -> impl FnOnce(Error) -> WorkflowError {
        move |source| WorkflowError { stage, source }
    }

    /// Kind of the underlying domain error.
    pub fn kind(&self) -> &'static str {
        self.source.kind()
    }
}
