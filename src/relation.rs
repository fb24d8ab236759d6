//! Chemical-disease relation pairs and the gold standard.

use crate::error::{Error, Result};
use crate::ontology::ConceptIdentitySet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A predicted `(chemical, disease)` pair of bare MeSH codes.
///
/// These are the elements of the three partition sets on
/// [`crate::paper::RelationPartition`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelationPair {
    /// MeSH code of the chemical concept.
    pub chemical: String,
    /// MeSH code of the disease concept.
    pub disease: String,
}

impl RelationPair {
    /// Create a pair from bare MeSH codes.
    #[must_use]
    pub fn new(chemical: impl Into<String>, disease: impl Into<String>) -> Self {
        Self {
            chemical: chemical.into(),
            disease: disease.into(),
        }
    }
}

impl fmt::Display for RelationPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.chemical, self.disease)
    }
}

/// Which part of the three-way partition a pair landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationOrigin {
    /// The pair matched the chemical-induced-disease surface pattern in at
    /// least one sentence.
    Cid,
    /// The two concepts co-occur in at least one sentence, but never in CID
    /// configuration.
    SentenceNonCid,
    /// The two concepts never co-occur within a single sentence.
    NotSentenceBound,
}

impl RelationOrigin {
    /// All origins, in partition order.
    pub const ALL: [RelationOrigin; 3] = [
        RelationOrigin::Cid,
        RelationOrigin::SentenceNonCid,
        RelationOrigin::NotSentenceBound,
    ];

    /// Convert to the label used in serialized output and work units.
    #[must_use]
    pub fn as_label(&self) -> &str {
        match self {
            RelationOrigin::Cid => "CID",
            RelationOrigin::SentenceNonCid => "sentence_non_CID",
            RelationOrigin::NotSentenceBound => "not_sentence_bound",
        }
    }

    /// Parse from a partition label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "CID" => Some(RelationOrigin::Cid),
            "sentence_non_CID" => Some(RelationOrigin::SentenceNonCid),
            "not_sentence_bound" => Some(RelationOrigin::NotSentenceBound),
            _ => None,
        }
    }
}

impl fmt::Display for RelationOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

/// A human-curated true relation from the gold standard.
///
/// Gold identifiers may be compound (several alternate ids for one concept),
/// so matching against predictions uses set intersection on each side. That
/// predicate is **not** an equivalence relation: `a` can intersect `b` and
/// `b` intersect `c` while `a` and `c` are disjoint. It is therefore exposed
/// as the explicit [`GoldRelation::intersects`] / [`GoldRelation::matches_pair`]
/// methods and never as `PartialEq` (which remains plain structural
/// equality). Callers must use linear scans, not hash-set membership, when
/// matching with it — see [`crate::eval`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldRelation {
    chemical: ConceptIdentitySet,
    disease: ConceptIdentitySet,
}

impl GoldRelation {
    /// Parse a gold relation from raw identifier texts.
    ///
    /// # Errors
    ///
    /// Fails if either side is malformed or carries no MeSH identifier
    /// (gold relations are defined over MeSH concepts only).
    pub fn new(chemical_text: &str, disease_text: &str) -> Result<Self> {
        let chemical = ConceptIdentitySet::parse_compound(chemical_text)?;
        let disease = ConceptIdentitySet::parse_compound(disease_text)?;
        if !chemical.has_mesh() {
            return Err(Error::identifier(
                chemical_text,
                "gold chemical has no MeSH identifier",
            ));
        }
        if !disease.has_mesh() {
            return Err(Error::identifier(
                disease_text,
                "gold disease has no MeSH identifier",
            ));
        }
        Ok(Self { chemical, disease })
    }

    /// The chemical side's identity set.
    #[must_use]
    pub fn chemical(&self) -> &ConceptIdentitySet {
        &self.chemical
    }

    /// The disease side's identity set.
    #[must_use]
    pub fn disease(&self) -> &ConceptIdentitySet {
        &self.disease
    }

    /// Whether a predicted pair matches this gold relation: the chemical
    /// code appears among the gold chemical's identifiers and likewise for
    /// the disease.
    #[must_use]
    pub fn matches_pair(&self, pair: &RelationPair) -> bool {
        self.chemical
            .iter()
            .any(|id| id.canonical() == pair.chemical)
            && self.disease.iter().any(|id| id.canonical() == pair.disease)
    }

    /// Whether two gold relations share identifiers on both sides.
    ///
    /// Non-transitive by construction; see the type-level docs.
    #[must_use]
    pub fn intersects(&self, other: &GoldRelation) -> bool {
        self.chemical.intersects(&other.chemical) && self.disease.intersects(&other.disease)
    }
}

impl fmt::Display for GoldRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.chemical, self.disease)
    }
}
