//! The paper aggregate: validation, acronym resolution, sentence alignment
//! and the paper-level relation partition.
//!
//! # Construction state machine
//!
//! ```text
//! Raw record ──validate──► Validated ──resolve_acronyms──► AcronymResolved
//!     ──align sentences──► Segmented ──classify──► Classified
//!     ──attach gold──► Finalized (the returned Paper)
//! ```
//!
//! Each stage is a pure function of the previous one and runs exactly once,
//! inside [`Paper::with_policy`]; a finished `Paper` is immutable. Any fatal
//! error aborts the whole construction and is attributed to the paper's
//! pmid, so a corpus run can skip one malformed record and keep going.
//!
//! # The three-way partition
//!
//! For every paper, the cross product of its unique MeSH chemical ids and
//! unique MeSH disease ids is split into `CID`, `sentence_non_CID` and
//! `not_sentence_bound`. The partition is computed by set subtraction and
//! its postconditions (pairwise disjoint, union equals the cross product)
//! are verified before the paper is returned; a violation is a logic bug
//! and fails construction with [`Error::Invariant`].

use crate::annotation::Annotation;
use crate::error::{Error, Result};
use crate::ontology::ConceptIdentitySet;
use crate::relation::{GoldRelation, RelationOrigin, RelationPair};
use crate::segment::SentenceSplitter;
use crate::sentence::Sentence;
use crate::span::{char_slice, TextSpan};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How strictly overlapping annotation spans are treated during validation.
///
/// Overlap is a data-quality signal, not a format error: some corpus
/// variants contain nested or doubled mentions. The default keeps them and
/// logs; strict mode fails the paper's construction instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlapPolicy {
    /// Overlap fails construction with
    /// [`Error::OverlappingAnnotations`].
    Strict,
    /// Overlap logs a warning; both annotations are kept.
    #[default]
    Lenient,
}

/// One annotation row of a raw parsed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// Raw (possibly compound) identifier text, e.g. `"D002544|-1"`.
    pub identifier: String,
    /// Semantic type label, `"chemical"` or `"disease"`.
    pub semantic_type: String,
    /// The mention's literal text.
    pub mention: String,
    /// Start offset in characters over `"{title} {abstract}"`.
    pub start: usize,
    /// Stop offset (exclusive).
    pub stop: usize,
}

/// A raw parsed paper record: the core's input interface.
///
/// Produced by the PubTator parser in [`crate::corpus`], or assembled
/// directly by callers with other upstream formats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    /// PubMed identifier.
    pub pmid: u32,
    /// Title text.
    pub title: String,
    /// Abstract body text.
    pub abstract_text: String,
    /// Annotation rows, in any order.
    pub annotations: Vec<AnnotationRecord>,
    /// Gold `(chemical_id, disease_id)` identifier texts, if curated.
    pub gold_relations: Vec<(String, String)>,
}

/// The three-way relation partition of one paper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationPartition {
    cid: BTreeSet<RelationPair>,
    sentence_non_cid: BTreeSet<RelationPair>,
    not_sentence_bound: BTreeSet<RelationPair>,
}

impl RelationPartition {
    /// Pairs matching the CID pattern in at least one sentence.
    #[must_use]
    pub fn cid(&self) -> &BTreeSet<RelationPair> {
        &self.cid
    }

    /// Pairs co-occurring in a sentence, but never in CID configuration.
    #[must_use]
    pub fn sentence_non_cid(&self) -> &BTreeSet<RelationPair> {
        &self.sentence_non_cid
    }

    /// Pairs whose concepts never share a sentence.
    #[must_use]
    pub fn not_sentence_bound(&self) -> &BTreeSet<RelationPair> {
        &self.not_sentence_bound
    }

    /// The set for one partition class.
    #[must_use]
    pub fn by_origin(&self, origin: RelationOrigin) -> &BTreeSet<RelationPair> {
        match origin {
            RelationOrigin::Cid => &self.cid,
            RelationOrigin::SentenceNonCid => &self.sentence_non_cid,
            RelationOrigin::NotSentenceBound => &self.not_sentence_bound,
        }
    }

    /// Which class a pair landed in, if it is in the partition at all.
    #[must_use]
    pub fn origin_of(&self, pair: &RelationPair) -> Option<RelationOrigin> {
        RelationOrigin::ALL
            .into_iter()
            .find(|origin| self.by_origin(*origin).contains(pair))
    }

    /// Total number of pairs across all three classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cid.len() + self.sentence_non_cid.len() + self.not_sentence_bound.len()
    }

    /// Whether the partition is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Verify the partition postconditions against the concept sets.
    fn verify(&self, chemicals: &BTreeSet<String>, diseases: &BTreeSet<String>) -> Result<()> {
        if !self.cid.is_disjoint(&self.sentence_non_cid)
            || !self.cid.is_disjoint(&self.not_sentence_bound)
            || !self.sentence_non_cid.is_disjoint(&self.not_sentence_bound)
        {
            return Err(Error::invariant("partition sets are not pairwise disjoint"));
        }
        let expected = chemicals.len() * diseases.len();
        if self.len() != expected {
            return Err(Error::invariant(format!(
                "partition holds {} pairs, cross product has {}",
                self.len(),
                expected
            )));
        }
        for set in RelationOrigin::ALL.map(|origin| self.by_origin(origin)) {
            for pair in set {
                if !chemicals.contains(&pair.chemical) || !diseases.contains(&pair.disease) {
                    return Err(Error::invariant(format!(
                        "pair {pair} is outside the chemical x disease cross product"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// A single academic publication with its annotations, sentences and
/// relation partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paper {
    pmid: u32,
    title: String,
    abstract_text: String,
    full_text: String,
    annotations: Vec<Annotation>,
    sentences: Vec<Sentence>,
    chemicals: BTreeSet<String>,
    diseases: BTreeSet<String>,
    relations: RelationPartition,
    gold_relations: Vec<GoldRelation>,
}

impl Paper {
    /// Build a paper from a raw record with the default (lenient) overlap
    /// policy.
    ///
    /// # Errors
    ///
    /// See [`Paper::with_policy`].
    pub fn new(record: PaperRecord, splitter: &dyn SentenceSplitter) -> Result<Self> {
        Self::with_policy(record, splitter, OverlapPolicy::default())
    }

    /// Build a paper from a raw record, running the full construction
    /// pipeline: validate, resolve acronyms, segment and align sentences,
    /// classify relations, attach gold relations.
    ///
    /// # Errors
    ///
    /// Any format, alignment or invariant failure aborts construction; the
    /// error is attributed to the record's pmid.
    pub fn with_policy(
        record: PaperRecord,
        splitter: &dyn SentenceSplitter,
        policy: OverlapPolicy,
    ) -> Result<Self> {
        let pmid = record.pmid;
        Self::build(record, splitter, policy).map_err(|e| e.with_pmid(pmid))
    }

    fn build(
        record: PaperRecord,
        splitter: &dyn SentenceSplitter,
        policy: OverlapPolicy,
    ) -> Result<Self> {
        let PaperRecord {
            pmid,
            title,
            abstract_text,
            annotations: raw_annotations,
            gold_relations: raw_gold,
        } = record;

        let full_text = format!("{title} {abstract_text}");

        // Raw -> Validated
        let mut annotations = raw_annotations
            .iter()
            .map(|r| Annotation::new(&r.identifier, &r.semantic_type, &r.mention, r.start, r.stop))
            .collect::<Result<Vec<_>>>()?;
        annotations.sort_by(|a, b| a.span().cmp(b.span()));
        validate_annotations(&annotations, &full_text, policy)?;

        // Validated -> AcronymResolved
        resolve_acronyms(&mut annotations, &full_text);

        // AcronymResolved -> Segmented
        let sentences = align_sentences(pmid, &full_text, &annotations, splitter)?;

        // Segmented -> Classified
        let (chemicals, diseases) = unique_concepts(&annotations);
        let relations = classify_relations(&sentences, &chemicals, &diseases)?;

        // Classified -> Finalized
        let gold_relations = raw_gold
            .iter()
            .map(|(chem, dise)| GoldRelation::new(chem, dise))
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "pmid {pmid}: {} annotations, {} sentences, {} chemicals x {} diseases",
            annotations.len(),
            sentences.len(),
            chemicals.len(),
            diseases.len()
        );

        Ok(Self {
            pmid,
            title,
            abstract_text,
            full_text,
            annotations,
            sentences,
            chemicals,
            diseases,
            relations,
            gold_relations,
        })
    }

    /// PubMed identifier.
    #[must_use]
    pub fn pmid(&self) -> u32 {
        self.pmid
    }

    /// Title text.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Abstract body text.
    #[must_use]
    pub fn abstract_text(&self) -> &str {
        &self.abstract_text
    }

    /// The shared coordinate space: `"{title} {abstract}"`.
    #[must_use]
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// All annotations, sorted by position.
    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Sentences in document order (index 0 is the title).
    #[must_use]
    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    /// Unique MeSH chemical codes in this paper.
    #[must_use]
    pub fn chemicals(&self) -> &BTreeSet<String> {
        &self.chemicals
    }

    /// Unique MeSH disease codes in this paper.
    #[must_use]
    pub fn diseases(&self) -> &BTreeSet<String> {
        &self.diseases
    }

    /// The three-way relation partition.
    #[must_use]
    pub fn relations(&self) -> &RelationPartition {
        &self.relations
    }

    /// Gold relations attached to this paper, if any.
    #[must_use]
    pub fn gold_relations(&self) -> &[GoldRelation] {
        &self.gold_relations
    }
}

/// Check substring fidelity for every annotation and apply the overlap
/// policy. Annotations must already be sorted by span.
fn validate_annotations(
    annotations: &[Annotation],
    full_text: &str,
    policy: OverlapPolicy,
) -> Result<()> {
    for annotation in annotations {
        let found = char_slice(full_text, annotation.start(), annotation.stop());
        if found != Some(annotation.text()) {
            return Err(Error::SpanMismatch {
                start: annotation.start(),
                stop: annotation.stop(),
                text: annotation.text().to_string(),
                found: found.unwrap_or("<past end of text>").to_string(),
            });
        }
    }

    // One forward sweep finds all overlaps among sorted spans: a span
    // overlaps some earlier span iff it starts before the running maximum
    // stop seen so far.
    let mut max_stop = 0;
    let mut max_idx = 0;
    for (idx, annotation) in annotations.iter().enumerate() {
        if idx > 0 && annotation.start() < max_stop {
            let first = annotations[max_idx].to_string();
            let second = annotation.to_string();
            match policy {
                OverlapPolicy::Strict => {
                    return Err(Error::OverlappingAnnotations { first, second });
                }
                OverlapPolicy::Lenient => {
                    log::warn!("overlapping annotations kept: {first} and {second}");
                }
            }
        }
        if annotation.stop() > max_stop {
            max_stop = annotation.stop();
            max_idx = idx;
        }
    }
    Ok(())
}

/// Resolve parenthetical acronym definitions and back-propagate identities.
///
/// Single left-to-right pass over position-sorted annotations. When an
/// annotation `A` with a MeSH identity is immediately followed by a
/// same-type annotation `B` starting exactly two characters after `A`'s end
/// and enclosed in parentheses, `B` is taken as the acronym form of `A`'s
/// concept: `B` (when unresolved) and every later unresolved same-type
/// annotation with `B`'s exact text receive `A`'s identity via an atomic
/// rebind. Best-effort: non-parenthetical definitions are not recognized.
/// Running the pass twice produces the same assignments as running it once.
fn resolve_acronyms(annotations: &mut [Annotation], full_text: &str) {
    let chars: Vec<char> = full_text.chars().collect();
    let mut rebound = vec![false; annotations.len()];

    for i in 0..annotations.len().saturating_sub(1) {
        let definition = &annotations[i];
        // An annotation that itself received its identity as an acronym
        // target never serves as a definition.
        if rebound[i] || !definition.has_mesh() {
            continue;
        }
        let acronym = &annotations[i + 1];
        if acronym.stype() != definition.stype() {
            continue;
        }
        if acronym.start() != definition.stop() + 2 {
            continue;
        }
        let open = acronym.start().checked_sub(1).and_then(|p| chars.get(p));
        let close = chars.get(acronym.stop());
        if open != Some(&'(') || close != Some(&')') {
            continue;
        }

        let identity: ConceptIdentitySet = definition.identity().clone();
        let stype = definition.stype();
        let acronym_text = acronym.text().to_string();

        for (j, candidate) in annotations.iter_mut().enumerate().skip(i + 1) {
            if rebound[j] || candidate.has_mesh() {
                continue;
            }
            if candidate.stype() == stype && candidate.text() == acronym_text {
                candidate.rebind_identity(identity.clone());
                rebound[j] = true;
            }
        }
    }
}

/// Align the splitter's sentences against the document text and assign
/// annotations with a linear two-pointer sweep.
///
/// Each sentence is located at the first occurrence at or after the running
/// cursor (repeated short "sentences" such as abbreviations therefore land
/// on distinct positions); failure to locate one is a fatal
/// [`Error::Alignment`]. The sentences must jointly reconstruct the
/// document: non-whitespace text skipped between two located sentences (a
/// dropped sentence) or left over after the last one is a fatal
/// [`Error::UnsegmentedText`].
fn align_sentences(
    pmid: u32,
    full_text: &str,
    annotations: &[Annotation],
    splitter: &dyn SentenceSplitter,
) -> Result<Vec<Sentence>> {
    let segments = splitter.segment(full_text);

    let mut sentences = Vec::with_capacity(segments.len());
    let mut byte_cursor = 0;
    let mut char_cursor = 0;
    let mut ann_idx = 0;

    for (index, segment) in segments.iter().enumerate() {
        let rel = full_text[byte_cursor..]
            .find(segment.as_str())
            .ok_or_else(|| Error::Alignment {
                index,
                text: segment.clone(),
                cursor: char_cursor,
            })?;

        let skipped = &full_text[byte_cursor..byte_cursor + rel];
        if !skipped.trim().is_empty() {
            return Err(Error::UnsegmentedText {
                text: skipped.trim().to_string(),
                cursor: char_cursor,
            });
        }

        let start = char_cursor + skipped.chars().count();
        let stop = start + segment.chars().count();
        byte_cursor += rel + segment.len();
        char_cursor = stop;

        // Two-pointer sweep: the annotation cursor only moves forward.
        while ann_idx < annotations.len() && annotations[ann_idx].stop() <= start {
            log::warn!(
                "pmid {pmid}: annotation {} falls between sentences",
                annotations[ann_idx]
            );
            ann_idx += 1;
        }
        let mut contained = Vec::new();
        let mut next = ann_idx;
        while next < annotations.len() && annotations[next].start() < stop {
            let candidate = &annotations[next];
            if candidate.start() >= start && candidate.stop() <= stop {
                contained.push(candidate.clone());
            } else {
                log::warn!("pmid {pmid}: annotation {candidate} crosses a sentence boundary");
            }
            next += 1;
        }
        ann_idx = next;

        let span = TextSpan::new(segment.clone(), start, stop)?;
        sentences.push(Sentence::new(pmid, index, span, contained));
    }

    let remainder = &full_text[byte_cursor..];
    if !remainder.trim().is_empty() {
        return Err(Error::UnsegmentedText {
            text: remainder.trim().to_string(),
            cursor: char_cursor,
        });
    }

    Ok(sentences)
}

/// Unique MeSH chemical and disease codes across all annotations.
fn unique_concepts(annotations: &[Annotation]) -> (BTreeSet<String>, BTreeSet<String>) {
    let mut chemicals = BTreeSet::new();
    let mut diseases = BTreeSet::new();
    for annotation in annotations {
        let target = match annotation.stype() {
            crate::annotation::AnnotationType::Chemical => &mut chemicals,
            crate::annotation::AnnotationType::Disease => &mut diseases,
        };
        for id in annotation.identity().mesh_only() {
            target.insert(id.code().to_string());
        }
    }
    (chemicals, diseases)
}

/// Aggregate per-sentence classifications into the paper-level partition.
fn classify_relations(
    sentences: &[Sentence],
    chemicals: &BTreeSet<String>,
    diseases: &BTreeSet<String>,
) -> Result<RelationPartition> {
    let mut cid = BTreeSet::new();
    let mut sentence_bound = BTreeSet::new();
    for sentence in sentences {
        cid.extend(sentence.cid_pairs().iter().cloned());
        sentence_bound.extend(sentence.non_cid_pairs().iter().cloned());
    }
    // A pair seen as non-CID in one sentence and CID in another resolves to
    // CID at the paper level.
    let sentence_non_cid = &sentence_bound - &cid;

    let mut not_sentence_bound = BTreeSet::new();
    for chemical in chemicals {
        for disease in diseases {
            let pair = RelationPair::new(chemical, disease);
            if !cid.contains(&pair) && !sentence_non_cid.contains(&pair) {
                not_sentence_bound.insert(pair);
            }
        }
    }

    let partition = RelationPartition {
        cid,
        sentence_non_cid,
        not_sentence_bound,
    };
    partition.verify(chemicals, diseases)?;
    Ok(partition)
}
