//! Sentences and the CID surface-pattern classifier.
//!
//! A sentence owns the sub-list of its paper's annotations that fall fully
//! within its span, and classifies every MeSH chemical/disease identifier
//! pair realized by those annotations into CID or non-CID. The CID pattern
//! is a deliberately simple surface heuristic for "chemical-induced disease"
//! phrasing:
//!
//! ```text
//!   ... amiodarone induced pulmonary toxicity ...
//!       └chemical┘ └─gap─┘ └─────disease────┘
//! ```
//!
//! The chemical must end strictly before the disease starts, the gap must be
//! at most [`CID_MAX_GAP`] characters, and the gap text must contain the
//! morpheme "induce" (case-insensitive, so "induced"/"inducing" also hit).
//! The pattern is asymmetric on purpose: "disease ... induced by chemical"
//! does not match.

use crate::annotation::{Annotation, AnnotationType};
use crate::relation::RelationPair;
use crate::span::{char_slice, TextSpan};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Maximum characters allowed between the chemical's end and the disease's
/// start for the CID pattern.
pub const CID_MAX_GAP: usize = 15;

/// Morpheme the gap text must contain (after lower-casing).
pub const CID_MARKER: &str = "induce";

/// A single sentence of a paper, with its contained annotations and the
/// relation classification derived purely from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pmid: u32,
    index: usize,
    span: TextSpan,
    annotations: Vec<Annotation>,
    cid: BTreeSet<RelationPair>,
    non_cid: BTreeSet<RelationPair>,
}

impl Sentence {
    /// Build a sentence from its span and the annotations the owning paper
    /// assigned to it, classifying relations eagerly.
    ///
    /// `annotations` must all satisfy [`Sentence::contains`]; the paper's
    /// alignment sweep guarantees this.
    #[must_use]
    pub fn new(pmid: u32, index: usize, span: TextSpan, annotations: Vec<Annotation>) -> Self {
        debug_assert!(annotations.iter().all(|a| span.contains(a.span())));
        let mut sentence = Self {
            pmid,
            index,
            span,
            annotations,
            cid: BTreeSet::new(),
            non_cid: BTreeSet::new(),
        };
        sentence.classify_relations();
        sentence
    }

    /// The owning paper's pmid.
    #[must_use]
    pub fn pmid(&self) -> u32 {
        self.pmid
    }

    /// Zero-based index within the paper (0 = title).
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The sentence's span over the paper's concatenated text.
    #[must_use]
    pub fn span(&self) -> &TextSpan {
        &self.span
    }

    /// The sentence text.
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

    /// The annotations fully contained in this sentence, in position order.
    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Whether an annotation's span lies fully within this sentence.
    #[must_use]
    pub fn contains(&self, annotation: &Annotation) -> bool {
        self.span.contains(annotation.span())
    }

    /// Identifier pairs realized in CID configuration in this sentence.
    #[must_use]
    pub fn cid_pairs(&self) -> &BTreeSet<RelationPair> {
        &self.cid
    }

    /// Identifier pairs co-occurring here but never in CID configuration.
    /// Disjoint from [`Sentence::cid_pairs`].
    #[must_use]
    pub fn non_cid_pairs(&self) -> &BTreeSet<RelationPair> {
        &self.non_cid
    }

    /// Check the CID surface pattern for one chemical/disease mention pair.
    #[must_use]
    pub fn is_cid_configuration(&self, chemical: &Annotation, disease: &Annotation) -> bool {
        debug_assert_eq!(chemical.stype(), AnnotationType::Chemical);
        debug_assert_eq!(disease.stype(), AnnotationType::Disease);

        if chemical.stop() >= disease.start() {
            return false;
        }
        if disease.start() - chemical.stop() > CID_MAX_GAP {
            return false;
        }
        let gap_start = chemical.stop() - self.span.start();
        let gap_stop = disease.start() - self.span.start();
        match char_slice(self.text(), gap_start, gap_stop) {
            Some(gap) => gap.to_lowercase().contains(CID_MARKER),
            None => false,
        }
    }

    /// Partition every MeSH identifier pair realized by this sentence's
    /// annotations into CID and non-CID.
    ///
    /// The same identifier pair can be realized by several mention
    /// occurrences (e.g. a D-C-D pattern); both sets are accumulated across
    /// all occurrences and the CID set is subtracted from the non-CID set
    /// afterwards, so one CID occurrence wins.
    fn classify_relations(&mut self) {
        let chemicals: Vec<&Annotation> = self
            .annotations
            .iter()
            .filter(|a| a.stype() == AnnotationType::Chemical && a.has_mesh())
            .collect();
        let diseases: Vec<&Annotation> = self
            .annotations
            .iter()
            .filter(|a| a.stype() == AnnotationType::Disease && a.has_mesh())
            .collect();

        for chemical in &chemicals {
            for disease in &diseases {
                let is_cid = self.is_cid_configuration(chemical, disease);
                for chem_id in chemical.identity().mesh_only() {
                    for dise_id in disease.identity().mesh_only() {
                        let pair = RelationPair::new(chem_id.code(), dise_id.code());
                        if is_cid {
                            self.cid.insert(pair);
                        } else {
                            self.non_cid.insert(pair);
                        }
                    }
                }
            }
        }

        self.non_cid = &self.non_cid - &self.cid;
        debug_assert!(self.cid.is_disjoint(&self.non_cid));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;

    /// Build a sentence over `text` (placed at offset 0) with annotations
    /// given as (mention, stype, ids) triples located by substring search.
    fn sentence(text: &str, mentions: &[(&str, &str, &str)]) -> Result<Sentence> {
        let mut annotations = Vec::new();
        let mut cursor = 0;
        for (mention, stype, ids) in mentions {
            let at = text[cursor..].find(mention).expect("mention not in text") + cursor;
            annotations.push(Annotation::new(
                ids,
                stype,
                mention,
                at,
                at + mention.chars().count(),
            )?);
            cursor = at + mention.len();
        }
        let span = TextSpan::new(text, 0, text.chars().count())?;
        Ok(Sentence::new(100, 0, span, annotations))
    }

    #[test]
    fn test_cid_scenario() {
        // Gap " induced " is 9 characters and contains the marker.
        let s = sentence(
            "Aspirin induced gastric ulcer in 10 patients.",
            &[
                ("Aspirin", "chemical", "D001241"),
                ("gastric ulcer", "disease", "D013276"),
            ],
        )
        .unwrap();
        let expected = RelationPair::new("D001241", "D013276");
        assert!(s.cid_pairs().contains(&expected));
        assert!(s.non_cid_pairs().is_empty());
    }

    #[test]
    fn test_long_gap_without_marker_is_non_cid() {
        let s = sentence(
            "Aspirin was not related to the occurrence of gastric ulcer.",
            &[
                ("Aspirin", "chemical", "D001241"),
                ("gastric ulcer", "disease", "D013276"),
            ],
        )
        .unwrap();
        let expected = RelationPair::new("D001241", "D013276");
        assert!(s.cid_pairs().is_empty());
        assert!(s.non_cid_pairs().contains(&expected));
    }

    #[test]
    fn test_marker_within_short_gap_required() {
        // Marker present but the gap is longer than 15 characters.
        let s = sentence(
            "Aspirin is thought to have induced gastric ulcer.",
            &[
                ("Aspirin", "chemical", "D001241"),
                ("gastric ulcer", "disease", "D013276"),
            ],
        )
        .unwrap();
        assert!(s.cid_pairs().is_empty());
        assert_eq!(s.non_cid_pairs().len(), 1);
    }

    #[test]
    fn test_cid_is_asymmetric() {
        // Disease precedes the chemical; must never classify CID.
        let s = sentence(
            "Gastric ulcer induced Aspirin withdrawal.",
            &[
                ("Gastric ulcer", "disease", "D013276"),
                ("Aspirin", "chemical", "D001241"),
            ],
        )
        .unwrap();
        assert!(s.cid_pairs().is_empty());
        assert_eq!(s.non_cid_pairs().len(), 1);
    }

    #[test]
    fn test_repeated_mention_resolves_to_cid_only() {
        // D-C-D pattern: first disease occurrence is non-CID, the second is
        // CID. The pair must end up in the CID set only.
        let s = sentence(
            "Seizures appeared after phenytoin induced seizures.",
            &[
                ("Seizures", "disease", "D012640"),
                ("phenytoin", "chemical", "D010672"),
                ("seizures", "disease", "D012640"),
            ],
        )
        .unwrap();
        let pair = RelationPair::new("D010672", "D012640");
        assert!(s.cid_pairs().contains(&pair));
        assert!(!s.non_cid_pairs().contains(&pair));
    }

    #[test]
    fn test_pairs_need_mesh_on_both_sides() {
        let s = sentence(
            "Aspirin induced gastric ulcer.",
            &[
                ("Aspirin", "chemical", "-1"),
                ("gastric ulcer", "disease", "D013276"),
            ],
        )
        .unwrap();
        assert!(s.cid_pairs().is_empty());
        assert!(s.non_cid_pairs().is_empty());
    }

    #[test]
    fn test_compound_identity_contributes_all_mesh_ids() {
        let s = sentence(
            "Aspirin induced gastric ulcer.",
            &[
                ("Aspirin", "chemical", "D001241|C000001"),
                ("gastric ulcer", "disease", "D013276"),
            ],
        )
        .unwrap();
        assert!(s.cid_pairs().contains(&RelationPair::new("D001241", "D013276")));
        assert!(s.cid_pairs().contains(&RelationPair::new("C000001", "D013276")));
    }

    #[test]
    fn test_sets_are_disjoint() {
        let s = sentence(
            "Phenytoin induced seizures but carbamazepine did not affect seizures.",
            &[
                ("Phenytoin", "chemical", "D010672"),
                ("seizures", "disease", "D012640"),
                ("carbamazepine", "chemical", "D002220"),
                ("seizures", "disease", "D012640"),
            ],
        )
        .unwrap();
        assert!(s.cid_pairs().is_disjoint(s.non_cid_pairs()));
        assert!(s.cid_pairs().contains(&RelationPair::new("D010672", "D012640")));
        assert!(s
            .non_cid_pairs()
            .contains(&RelationPair::new("D002220", "D012640")));
    }
}
