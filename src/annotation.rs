//! Concept mentions located in a paper's text.

use crate::error::{Error, Result};
use crate::ontology::ConceptIdentitySet;
use crate::span::TextSpan;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The semantic type of a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnnotationType {
    /// A chemical/drug mention.
    Chemical,
    /// A disease mention.
    Disease,
}

impl AnnotationType {
    /// Convert to the lower-case label used in PubTator records.
    #[must_use]
    pub fn as_label(&self) -> &str {
        match self {
            AnnotationType::Chemical => "chemical",
            AnnotationType::Disease => "disease",
        }
    }

    /// Parse from a PubTator semantic-type label (case-insensitive).
    ///
    /// # Errors
    ///
    /// Fails on anything other than "chemical" or "disease".
    pub fn from_label(label: &str) -> Result<Self> {
        match label.to_lowercase().as_str() {
            "chemical" => Ok(AnnotationType::Chemical),
            "disease" => Ok(AnnotationType::Disease),
            other => Err(Error::SemanticType(other.to_string())),
        }
    }
}

impl fmt::Display for AnnotationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

/// A single mention of a chemical or disease concept, position-bound to the
/// paper's concatenated `"{title} {abstract}"` text.
///
/// The identity set is immutable except through [`Annotation::rebind_identity`],
/// which replaces it atomically. Acronym resolution is the only caller; there
/// is deliberately no way to edit individual identifiers in place, so a
/// retried resolution pass can never observe partially-updated state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    span: TextSpan,
    stype: AnnotationType,
    identity: ConceptIdentitySet,
}

impl Annotation {
    /// Build an annotation from the raw fields of a parsed record.
    ///
    /// # Errors
    ///
    /// Fails if the identifier text, semantic type, or span offsets are
    /// malformed.
    pub fn new(
        identifier_text: &str,
        semantic_type: &str,
        mention_text: &str,
        start: usize,
        stop: usize,
    ) -> Result<Self> {
        Ok(Self {
            span: TextSpan::new(mention_text, start, stop)?,
            stype: AnnotationType::from_label(semantic_type)?,
            identity: ConceptIdentitySet::parse_compound(identifier_text)?,
        })
    }

    /// Build from already-validated parts.
    #[must_use]
    pub fn from_parts(span: TextSpan, stype: AnnotationType, identity: ConceptIdentitySet) -> Self {
        Self {
            span,
            stype,
            identity,
        }
    }

    /// The mention's span.
    #[must_use]
    pub fn span(&self) -> &TextSpan {
        &self.span
    }

    /// The mention's literal text.
    #[must_use]
    pub fn text(&self) -> &str {
        self.span.text()
    }

    /// Start offset (characters, inclusive).
    #[must_use]
    pub fn start(&self) -> usize {
        self.span.start()
    }

    /// Stop offset (characters, exclusive).
    #[must_use]
    pub fn stop(&self) -> usize {
        self.span.stop()
    }

    /// The mention's semantic type.
    #[must_use]
    pub fn stype(&self) -> AnnotationType {
        self.stype
    }

    /// The mention's concept identity.
    #[must_use]
    pub fn identity(&self) -> &ConceptIdentitySet {
        &self.identity
    }

    /// Whether the identity carries at least one MeSH identifier.
    #[must_use]
    pub fn has_mesh(&self) -> bool {
        self.identity.has_mesh()
    }

    /// Atomically replace the whole identity set.
    ///
    /// The single mutation point on an annotation, used by acronym
    /// resolution to propagate a definition's identity to its acronym
    /// occurrences.
    pub fn rebind_identity(&mut self, identity: ConceptIdentitySet) {
        self.identity = identity;
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.stype, self.span, self.identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_from_record_fields() {
        let ann = Annotation::new("D002544|-1", "Chemical", "aspirin", 10, 17).unwrap();
        assert_eq!(ann.stype(), AnnotationType::Chemical);
        assert_eq!(ann.text(), "aspirin");
        assert!(ann.has_mesh());
        assert_eq!(ann.identity().len(), 2);
    }

    #[test]
    fn test_semantic_type_is_case_insensitive() {
        assert_eq!(
            AnnotationType::from_label("DISEASE").unwrap(),
            AnnotationType::Disease
        );
        assert!(AnnotationType::from_label("gene").is_err());
    }

    #[test]
    fn test_bad_span_rejected() {
        assert!(Annotation::new("D002544", "chemical", "aspirin", 17, 10).is_err());
        assert!(Annotation::new("D002544", "chemical", "aspirin", 10, 16).is_err());
    }

    #[test]
    fn test_rebind_identity_replaces_whole_set() {
        let mut ann = Annotation::new("-1", "disease", "ulcer", 0, 5).unwrap();
        assert!(!ann.has_mesh());

        let identity = ConceptIdentitySet::parse_compound("D013276").unwrap();
        ann.rebind_identity(identity.clone());
        assert!(ann.has_mesh());
        assert_eq!(ann.identity(), &identity);
    }
}
