//! Ontology identifiers and concept identity sets.
//!
//! Concept normalizers (DNorm, tmChem) emit identifiers like `MESH:D002544`,
//! `OMIM:601665`, bare MeSH codes, or `-1` for mentions they could not
//! resolve. One mention may carry several alternate identifiers joined with
//! `|` (e.g. `D002544|-1`). This module parses those strings once, at the
//! boundary, into typed values the rest of the crate can rely on:
//!
//! - [`OntologyIdentifier`]: a single `(namespace, code)` pair
//! - [`ConceptIdentitySet`]: the ordered, deduplicated identity of one mention
//!
//! Only MeSH identifiers participate in relation classification and
//! gold-standard comparison; everything else is retained for bookkeeping.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Delimiter separating alternate identifiers of a compound identity.
pub const COMPOUND_DELIMITER: char = '|';

/// Delimiter separating a namespace prefix from a code.
const NAMESPACE_DELIMITER: char = ':';

/// Check whether a bare code matches the MeSH shape: exactly seven
/// characters beginning with 'C' or 'D'.
#[must_use]
pub fn is_mesh_code(code: &str) -> bool {
    code.len() == 7 && matches!(code.as_bytes()[0], b'C' | b'D')
}

/// The vocabulary an identifier belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Namespace {
    /// Medical Subject Headings. Authoritative for gold-standard comparison.
    Mesh,
    /// Online Mendelian Inheritance in Man.
    Omim,
    /// Unresolved mention (`-1` and friends).
    Unknown,
    /// Any other explicitly-prefixed vocabulary.
    Other(String),
}

impl Namespace {
    /// Convert to the label used in serialized identifier strings.
    #[must_use]
    pub fn as_label(&self) -> &str {
        match self {
            Namespace::Mesh => "MESH",
            Namespace::Omim => "OMIM",
            Namespace::Unknown => "unknown",
            Namespace::Other(s) => s.as_str(),
        }
    }

    /// Parse from an explicit namespace prefix. MeSH and OMIM are
    /// recognized case-insensitively; any other prefix is kept verbatim so
    /// its canonical form round-trips.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.to_uppercase().as_str() {
            "MESH" => Namespace::Mesh,
            "OMIM" => Namespace::Omim,
            _ => Namespace::Other(label.to_string()),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

/// A single normalized concept identifier.
///
/// Immutable after parsing. Equality and hashing are by `(namespace, code)`;
/// ordering is by canonical string form so that identity sets iterate
/// deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OntologyIdentifier {
    namespace: Namespace,
    code: String,
}

impl OntologyIdentifier {
    /// Parse an identifier string.
    ///
    /// An optional `NAMESPACE:CODE` prefix is honored; bare codes matching
    /// the MeSH shape are auto-tagged [`Namespace::Mesh`], anything else is
    /// [`Namespace::Unknown`].
    ///
    /// # Errors
    ///
    /// Fails if the text contains more than one namespace delimiter, or if
    /// an explicitly MeSH-tagged code does not match the MeSH shape.
    pub fn parse(text: &str) -> Result<Self> {
        let mut parts = text.split(NAMESPACE_DELIMITER);
        let first = parts.next().unwrap_or("");
        match (parts.next(), parts.next()) {
            (None, _) => {
                let namespace = if is_mesh_code(first) {
                    Namespace::Mesh
                } else {
                    Namespace::Unknown
                };
                Ok(Self {
                    namespace,
                    code: first.to_string(),
                })
            }
            (Some(code), None) => {
                let namespace = Namespace::from_label(first);
                if namespace == Namespace::Mesh && !is_mesh_code(code) {
                    return Err(Error::identifier(
                        text,
                        "MeSH codes must be 7 characters beginning with 'C' or 'D'",
                    ));
                }
                Ok(Self {
                    namespace,
                    code: code.to_string(),
                })
            }
            (Some(_), Some(_)) => Err(Error::identifier(
                text,
                "more than one namespace delimiter",
            )),
        }
    }

    /// The vocabulary this identifier belongs to.
    #[must_use]
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// The bare code within its vocabulary.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Whether this is a MeSH identifier.
    #[must_use]
    pub fn is_mesh(&self) -> bool {
        self.namespace == Namespace::Mesh
    }

    /// Canonical string form. MeSH and unresolved identifiers render as the
    /// bare code (matching the PubTator convention); explicitly-namespaced
    /// identifiers keep their prefix.
    #[must_use]
    pub fn canonical(&self) -> String {
        match &self.namespace {
            Namespace::Mesh | Namespace::Unknown => self.code.clone(),
            other => format!("{}{}{}", other.as_label(), NAMESPACE_DELIMITER, self.code),
        }
    }
}

impl Ord for OntologyIdentifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical()
            .cmp(&other.canonical())
            .then_with(|| self.namespace.cmp(&other.namespace))
    }
}

impl PartialOrd for OntologyIdentifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for OntologyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

/// The (possibly compound) identity of one mention.
///
/// An ordered, deduplicated collection of [`OntologyIdentifier`], sorted by
/// canonical string form so iteration and the flat string form are
/// deterministic. Immutable; acronym resolution swaps the whole set on the
/// owning annotation via [`crate::annotation::Annotation::rebind_identity`],
/// never edits it in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConceptIdentitySet {
    ids: Vec<OntologyIdentifier>,
}

impl ConceptIdentitySet {
    /// Parse a compound identifier string, splitting on [`COMPOUND_DELIMITER`].
    ///
    /// # Errors
    ///
    /// Fails if any component fails [`OntologyIdentifier::parse`].
    pub fn parse_compound(text: &str) -> Result<Self> {
        let ids = text
            .split(COMPOUND_DELIMITER)
            .filter(|part| !part.is_empty())
            .map(OntologyIdentifier::parse)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_ids(ids))
    }

    /// Build from already-parsed identifiers, sorting and deduplicating.
    #[must_use]
    pub fn from_ids(mut ids: Vec<OntologyIdentifier>) -> Self {
        ids.sort();
        ids.dedup();
        Self { ids }
    }

    /// Iterate over all identifiers in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &OntologyIdentifier> {
        self.ids.iter()
    }

    /// The MeSH-only subsequence, preserving relative order. May be empty.
    pub fn mesh_only(&self) -> impl Iterator<Item = &OntologyIdentifier> {
        self.ids.iter().filter(|id| id.is_mesh())
    }

    /// Whether at least one identifier is MeSH.
    #[must_use]
    pub fn has_mesh(&self) -> bool {
        self.ids.iter().any(OntologyIdentifier::is_mesh)
    }

    /// Number of identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Membership test.
    #[must_use]
    pub fn contains(&self, id: &OntologyIdentifier) -> bool {
        self.ids.binary_search(id).is_ok()
    }

    /// Whether the two sets share at least one identifier.
    ///
    /// This is the primitive underneath the noisy-gold matching predicate
    /// (see [`crate::relation::GoldRelation::intersects`]); note that
    /// "shares an identifier" is not transitive.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.ids.iter().any(|id| other.contains(id))
    }

    /// Flat canonical string form, components joined with
    /// [`COMPOUND_DELIMITER`]. Two sets are equal iff their flat forms are.
    #[must_use]
    pub fn flat(&self) -> String {
        self.ids
            .iter()
            .map(OntologyIdentifier::canonical)
            .collect::<Vec<_>>()
            .join(&COMPOUND_DELIMITER.to_string())
    }
}

impl fmt::Display for ConceptIdentitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.flat())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_mesh_code_auto_tagged() {
        let id = OntologyIdentifier::parse("D002544").unwrap();
        assert_eq!(id.namespace(), &Namespace::Mesh);
        assert_eq!(id.code(), "D002544");
        assert_eq!(id.canonical(), "D002544");
    }

    #[test]
    fn test_explicit_namespace_prefix() {
        let id = OntologyIdentifier::parse("MESH:C565941").unwrap();
        assert_eq!(id.namespace(), &Namespace::Mesh);
        assert_eq!(id.code(), "C565941");

        let id = OntologyIdentifier::parse("OMIM:601665").unwrap();
        assert_eq!(id.namespace(), &Namespace::Omim);
        assert_eq!(id.canonical(), "OMIM:601665");
    }

    #[test]
    fn test_other_namespace_preserves_casing() {
        let id = OntologyIdentifier::parse("chebi:15365").unwrap();
        assert_eq!(id.namespace(), &Namespace::Other("chebi".to_string()));
        assert_eq!(id.canonical(), "chebi:15365");

        let reparsed = OntologyIdentifier::parse(&id.canonical()).unwrap();
        assert_eq!(id, reparsed);
    }

    #[test]
    fn test_unresolved_mention() {
        let id = OntologyIdentifier::parse("-1").unwrap();
        assert_eq!(id.namespace(), &Namespace::Unknown);
        assert!(!id.is_mesh());
    }

    #[test]
    fn test_double_delimiter_rejected() {
        let err = OntologyIdentifier::parse("MESH:D002544:extra").unwrap_err();
        assert!(err.to_string().contains("more than one namespace delimiter"));
    }

    #[test]
    fn test_explicit_mesh_shape_enforced() {
        assert!(OntologyIdentifier::parse("MESH:X123").is_err());
        // Bare codes that merely fail the shape fall back to unknown.
        let id = OntologyIdentifier::parse("X123").unwrap();
        assert_eq!(id.namespace(), &Namespace::Unknown);
    }

    #[test]
    fn test_mesh_shape() {
        assert!(is_mesh_code("D002544"));
        assert!(is_mesh_code("C565941"));
        assert!(!is_mesh_code("E002544"));
        assert!(!is_mesh_code("D00254"));
        assert!(!is_mesh_code("D0025441"));
        assert!(!is_mesh_code(""));
    }

    #[test]
    fn test_compound_identity() {
        // One MeSH identifier and one unresolved component.
        let set = ConceptIdentitySet::parse_compound("D002544|-1").unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.has_mesh());
        assert_eq!(set.mesh_only().count(), 1);
        assert_eq!(set.mesh_only().next().unwrap().code(), "D002544");
    }

    #[test]
    fn test_compound_sorted_and_deduplicated() {
        let set = ConceptIdentitySet::parse_compound("D009270|D002544|D002544").unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.flat(), "D002544|D009270");

        let same = ConceptIdentitySet::parse_compound("D002544|D009270").unwrap();
        assert_eq!(set, same);
    }

    #[test]
    fn test_intersects_is_not_transitive() {
        let a = ConceptIdentitySet::parse_compound("D000001|D000002").unwrap();
        let b = ConceptIdentitySet::parse_compound("D000002|D000003").unwrap();
        let c = ConceptIdentitySet::parse_compound("D000003|D000004").unwrap();
        assert!(a.intersects(&b));
        assert!(b.intersects(&c));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_serde_roundtrip() {
        let set = ConceptIdentitySet::parse_compound("D002544|-1").unwrap();
        let json = serde_json::to_string(&set).unwrap();
        let restored: ConceptIdentitySet = serde_json::from_str(&json).unwrap();
        assert_eq!(set, restored);
    }
}
