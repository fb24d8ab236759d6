//! Error types for cidrex.
//!
//! The taxonomy follows the data flow: identifier and span format errors are
//! fatal to the entity being built, alignment errors indicate a broken
//! sentence-segmentation collaborator, and invariant errors indicate a logic
//! bug in relation classification. All of them abort the enclosing paper's
//! construction; callers processing a corpus isolate failures per paper
//! (see [`crate::corpus::build_papers`]).

use thiserror::Error;

/// Result type for cidrex operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for cidrex operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Malformed concept identifier string.
    #[error("malformed identifier `{identifier}`: {reason}")]
    IdentifierFormat {
        /// The offending identifier text.
        identifier: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Unknown annotation semantic type (expected "chemical" or "disease").
    #[error("unknown semantic type `{0}` (expected chemical or disease)")]
    SemanticType(String),

    /// Span offsets are inconsistent with the span text.
    #[error("invalid span [{start}, {stop}) for {text:?}: {reason}")]
    SpanFormat {
        /// Start offset (characters, inclusive).
        start: usize,
        /// Stop offset (characters, exclusive).
        stop: usize,
        /// The span's literal text.
        text: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An annotation's text does not match the document at its offsets.
    #[error("annotation {text:?} at [{start}, {stop}) does not match document text {found:?}")]
    SpanMismatch {
        /// Start offset of the annotation.
        start: usize,
        /// Stop offset of the annotation.
        stop: usize,
        /// What the annotation claims to denote.
        text: String,
        /// What the document actually contains there.
        found: String,
    },

    /// A sentence produced by the segmentation collaborator could not be
    /// located at or after the running cursor in the document text.
    #[error("sentence {index} ({text:?}) not found at or after character {cursor}")]
    Alignment {
        /// Zero-based sentence index (0 = title).
        index: usize,
        /// The sentence text that failed to align.
        text: String,
        /// The character offset the search started from.
        cursor: usize,
    },

    /// Non-whitespace document text not covered by any sentence from the
    /// segmentation collaborator, either between two located sentences or
    /// after the last one.
    #[error("unsegmented text {text:?} at character {cursor}")]
    UnsegmentedText {
        /// The uncovered text, trimmed.
        text: String,
        /// The character offset where the uncovered region begins.
        cursor: usize,
    },

    /// Two annotations occupy overlapping spans.
    ///
    /// Only raised under [`crate::paper::OverlapPolicy::Strict`]; the lenient
    /// policy logs a warning instead.
    #[error("overlapping annotations: {first} and {second}")]
    OverlappingAnnotations {
        /// Description of the earlier annotation.
        first: String,
        /// Description of the later annotation.
        second: String,
    },

    /// A relation-partition postcondition failed. Indicates a logic bug,
    /// never expected on real data.
    #[error("relation partition invariant violated: {0}")]
    Invariant(String),

    /// Malformed line in a PubTator-format input.
    #[error("line {line}: {reason}")]
    Parse {
        /// One-based line number.
        line: usize,
        /// Why the line was rejected.
        reason: String,
    },

    /// An error attributed to a specific paper.
    #[error("pmid {pmid}: {source}")]
    Record {
        /// The paper the error belongs to.
        pmid: u32,
        /// The underlying error.
        #[source]
        source: Box<Error>,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an identifier format error.
    pub fn identifier(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::IdentifierFormat {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    /// Create an invariant violation error.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Error::Invariant(msg.into())
    }

    /// Create a parse error for a one-based line number.
    pub fn parse(line: usize, reason: impl Into<String>) -> Self {
        Error::Parse {
            line,
            reason: reason.into(),
        }
    }

    /// Attribute this error to a paper. Already-attributed errors are
    /// returned unchanged so the innermost pmid wins.
    #[must_use]
    pub fn with_pmid(self, pmid: u32) -> Self {
        match self {
            Error::Record { .. } => self,
            other => Error::Record {
                pmid,
                source: Box::new(other),
            },
        }
    }

    /// The pmid this error is attributed to, if any.
    #[must_use]
    pub fn pmid(&self) -> Option<u32> {
        match self {
            Error::Record { pmid, .. } => Some(*pmid),
            _ => None,
        }
    }
}
