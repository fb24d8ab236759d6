//! Scoring predicted relations against a gold standard.
//!
//! Set-based precision/recall/F1 over `(chemical, disease)` identifier
//! pairs. Because gold identifiers can be compound and noisy, a prediction
//! matches a gold relation when the identifier sets intersect on both sides
//! ([`GoldRelation::matches_pair`]); that predicate is not transitive, so
//! matching is done with explicit linear scans on both sides of the
//! comparison rather than hash-set intersection.

use crate::paper::Paper;
use crate::relation::{GoldRelation, RelationPair};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// True/false positive and false negative counts for relation scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationCounts {
    /// Predicted pairs matching at least one gold relation.
    pub true_pos: usize,
    /// Predicted pairs matching no gold relation.
    pub false_pos: usize,
    /// Gold relations matched by no predicted pair.
    pub false_neg: usize,
}

impl RelationCounts {
    /// Precision: `tp / (tp + fp)`. Zero when nothing was predicted.
    #[must_use]
    pub fn precision(&self) -> f64 {
        ratio(self.true_pos, self.true_pos + self.false_pos)
    }

    /// Recall: `tp / (tp + fn)`. Zero when the gold set is empty.
    #[must_use]
    pub fn recall(&self) -> f64 {
        ratio(self.true_pos, self.true_pos + self.false_neg)
    }

    /// Harmonic mean of precision and recall.
    #[must_use]
    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            return 0.0;
        }
        2.0 * p * r / (p + r)
    }

    /// Accumulate counts from another paper or batch.
    pub fn merge(&mut self, other: &RelationCounts) {
        self.true_pos += other.true_pos;
        self.false_pos += other.false_pos;
        self.false_neg += other.false_neg;
    }

    /// Summary with the derived metrics materialized.
    #[must_use]
    pub fn summary(&self) -> RelationScoreSummary {
        RelationScoreSummary {
            precision: self.precision(),
            recall: self.recall(),
            f1: self.f1(),
            counts: *self,
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}

/// Materialized precision/recall/F1 with the underlying counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationScoreSummary {
    /// Precision over predicted pairs.
    pub precision: f64,
    /// Recall over gold relations.
    pub recall: f64,
    /// Harmonic mean of the two.
    pub f1: f64,
    /// The raw counts.
    pub counts: RelationCounts,
}

/// Score a predicted pair set against one paper's gold relations.
///
/// True positives are counted on the prediction side and false negatives on
/// the gold side; with intersection matching these are not mirror images of
/// each other, which is the intended behavior for compound gold ids.
#[must_use]
pub fn evaluate_relations(
    gold: &[GoldRelation],
    predicted: &BTreeSet<RelationPair>,
) -> RelationCounts {
    let mut counts = RelationCounts::default();
    for pair in predicted {
        if gold.iter().any(|g| g.matches_pair(pair)) {
            counts.true_pos += 1;
        } else {
            counts.false_pos += 1;
        }
    }
    for relation in gold {
        if !predicted.iter().any(|pair| relation.matches_pair(pair)) {
            counts.false_neg += 1;
        }
    }
    counts
}

/// Score a batch of papers, taking each paper's CID set as its prediction.
#[must_use]
pub fn evaluate_papers(papers: &[Paper]) -> RelationCounts {
    let mut counts = RelationCounts::default();
    for paper in papers {
        let per_paper = evaluate_relations(paper.gold_relations(), paper.relations().cid());
        counts.merge(&per_paper);
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gold(pairs: &[(&str, &str)]) -> Vec<GoldRelation> {
        pairs
            .iter()
            .map(|(c, d)| GoldRelation::new(c, d).unwrap())
            .collect()
    }

    fn predicted(pairs: &[(&str, &str)]) -> BTreeSet<RelationPair> {
        pairs
            .iter()
            .map(|(c, d)| RelationPair::new(*c, *d))
            .collect()
    }

    #[test]
    fn test_perfect_prediction() {
        let g = gold(&[("D000001", "D000002"), ("D000003", "D000004")]);
        let p = predicted(&[("D000001", "D000002"), ("D000003", "D000004")]);
        let counts = evaluate_relations(&g, &p);
        assert_eq!(counts.true_pos, 2);
        assert_eq!(counts.false_pos, 0);
        assert_eq!(counts.false_neg, 0);
        assert_eq!(counts.precision(), 1.0);
        assert_eq!(counts.recall(), 1.0);
        assert_eq!(counts.f1(), 1.0);
    }

    #[test]
    fn test_empty_prediction() {
        let g = gold(&[("D000001", "D000002")]);
        let counts = evaluate_relations(&g, &BTreeSet::new());
        assert_eq!(counts.precision(), 0.0);
        assert_eq!(counts.recall(), 0.0);
        assert_eq!(counts.f1(), 0.0);
        assert_eq!(counts.false_neg, 1);
    }

    #[test]
    fn test_mixed_prediction() {
        let g = gold(&[("D000001", "D000002"), ("D000003", "D000004")]);
        let p = predicted(&[("D000001", "D000002"), ("D000009", "D000002")]);
        let counts = evaluate_relations(&g, &p);
        assert_eq!(counts.true_pos, 1);
        assert_eq!(counts.false_pos, 1);
        assert_eq!(counts.false_neg, 1);
        assert!((counts.precision() - 0.5).abs() < f64::EPSILON);
        assert!((counts.recall() - 0.5).abs() < f64::EPSILON);
        assert!((counts.f1() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_compound_gold_matches_on_any_alternate_id() {
        let g = vec![GoldRelation::new("D000001|C000009", "D000002").unwrap()];
        let p = predicted(&[("C000009", "D000002")]);
        let counts = evaluate_relations(&g, &p);
        assert_eq!(counts.true_pos, 1);
        assert_eq!(counts.false_neg, 0);
    }

    #[test]
    fn test_two_predictions_can_match_one_gold() {
        // Intersection matching is many-to-many on purpose: both alternates
        // count as true positives, and the gold relation is not missed.
        let g = vec![GoldRelation::new("D000001|C000009", "D000002").unwrap()];
        let p = predicted(&[("D000001", "D000002"), ("C000009", "D000002")]);
        let counts = evaluate_relations(&g, &p);
        assert_eq!(counts.true_pos, 2);
        assert_eq!(counts.false_pos, 0);
        assert_eq!(counts.false_neg, 0);
    }

    #[test]
    fn test_summary_roundtrips_through_serde() {
        let g = gold(&[("D000001", "D000002")]);
        let p = predicted(&[("D000001", "D000002")]);
        let summary = evaluate_relations(&g, &p).summary();
        let json = serde_json::to_string(&summary).unwrap();
        let restored: RelationScoreSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(summary, restored);
    }
}
