//! Rich diagnostic error types for rxgraph.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so callers know what
//! went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;

/// Top-level error type for rxgraph.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum RxError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("malformed interaction record: {message}")]
    #[diagnostic(
        code(rx::graph::malformed_record),
        help(
            "The interaction document is missing a field the graph needs \
             (endpoint rxcui/name, source, severity or description). \
             Check that the input came from the interaction-list service unmodified."
        )
    )]
    MalformedRecord { message: String },

    #[error("cannot estimate distances over an empty population")]
    #[diagnostic(
        code(rx::graph::empty_population),
        help("Ingest at least one interaction before estimating path lengths.")
    )]
    EmptyPopulation,

    #[error("no reachable vertex sampled from \"{reference}\" in {draws} draws")]
    #[diagnostic(
        code(rx::graph::no_reachable_samples),
        help(
            "Every sampled vertex was either the reference itself or in another \
             connected component. Pick a reference inside a larger component, \
             or raise `max_draws`."
        )
    )]
    NoReachableSamples { reference: String, draws: usize },

    #[error("invalid sampling configuration: {message}")]
    #[diagnostic(
        code(rx::graph::invalid_sampling),
        help(
            "`threshold` must be a finite, non-negative number and both \
             `max_samples` and `max_draws` must be at least 1."
        )
    )]
    InvalidSampling { message: String },

    #[error("I/O error reading {path}")]
    #[diagnostic(
        code(rx::graph::io),
        help("Check that the record file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Resolution errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ResolveError {
    #[error("not enough terms to resolve: got {count} distinct term(s)")]
    #[diagnostic(
        code(rx::resolve::invalid_input),
        help(
            "A lookup needs a non-blank name; a batch needs a comma-separated list \
             of two or more names, e.g. \"tylenol, zocor\"."
        )
    )]
    InvalidInput { count: usize },

    #[error("upstream response for \"{term}\" is missing {field}")]
    #[diagnostic(
        code(rx::resolve::upstream_missing_data),
        help("The name service returned no usable concepts for this term; it is skipped.")
    )]
    UpstreamMissingData { term: String, field: String },

    #[error("upstream request for \"{term}\" failed: {message}")]
    #[diagnostic(
        code(rx::resolve::upstream),
        help(
            "The name resolution service could not be reached or returned an error. \
             Check network access and the `[upstream] base_url` setting."
        )
    )]
    Upstream { term: String, message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("I/O error: {source}")]
    #[diagnostic(
        code(rx::store::io),
        help(
            "A filesystem operation failed. Check that the cache directory exists, \
             has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("redb transaction error: {message}")]
    #[diagnostic(
        code(rx::store::redb),
        help(
            "The embedded database encountered a transaction error. \
             Delete the cache file to start over; it only holds name lookups."
        )
    )]
    Redb { message: String },

    #[error("serialization error: {message}")]
    #[diagnostic(
        code(rx::store::serde),
        help(
            "Failed to serialize or deserialize the resolution cache. \
             The file may be truncated or hand-edited; delete it to rebuild."
        )
    )]
    Serialization { message: String },

    #[error("resolution cache lock poisoned")]
    #[diagnostic(
        code(rx::store::poisoned),
        help("A previous resolution panicked while holding the cache. Reopen the cache.")
    )]
    Poisoned,
}

/// Convenience alias for functions returning rxgraph results.
pub type RxResult<T> = std::result::Result<T, RxError>;
