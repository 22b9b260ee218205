//! Diff errors.

/// Errors raised while preparing or comparing RDF data.
///
/// Most operations of [`DiffService`](crate::DiffService) never surface these:
/// they log them and degrade to a lower-fidelity result instead.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DiffError {
    /// The source text could not be parsed.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// The base IRI given for parsing is not a valid IRI.
    #[error("invalid base IRI <{iri}>: {message}")]
    InvalidBase {
        /// The rejected IRI
        iri: String,
        /// Why it was rejected
        message: String,
    },

    /// A literal was built with both a language tag and a datatype.
    #[error("literal {0:?} can not have both a language tag and a datatype")]
    LanguageAndDatatype(Box<str>),

    /// The data contains a term that can not be compared (variable, quoted triple)
    /// or a predicate that is not an IRI.
    #[error("unsupported term: {0}")]
    UnsupportedTerm(String),

    /// The canonicalization algorithm failed on this data.
    ///
    /// NB: `C14nError` is generic, so we keep the message only
    #[error("canonicalization failed: {0}")]
    Canonicalization(String),

    /// The canonicalization backend did not pass its self-test.
    /// This is fatal for the whole diff feature.
    #[error("canonicalization backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A configuration value could not be understood.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A blocking canonicalization task panicked or was cancelled.
    #[error("canonicalization task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
