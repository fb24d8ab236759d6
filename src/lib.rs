//! # cidrex
//!
//! Chemical-induced disease relation extraction for PubMed abstracts.
//!
//! - **Corpus**: PubTator-format parsing (title/abstract lines, annotation
//!   rows, gold CID rows)
//! - **Documents**: offset-validated mention spans, Medline-tuned sentence
//!   segmentation, acronym identity resolution
//! - **Relations**: every chemical/disease pair classified into exactly one
//!   of three origins (`CID`, `sentence_non_CID`, `not_sentence_bound`)
//! - **Evaluation**: precision/recall/F1 against noisy compound-identifier
//!   gold standards
//!
//! ## Quick Start
//!
//! ```rust
//! use cidrex::{parse_pubtator, MedlineSplitter, Paper, RelationOrigin, RelationPair};
//!
//! let input = "\
//! 1001|t|Morphine-induced bradycardia.
//! 1001|a|No further findings.
//! 1001\t0\t8\tMorphine\tChemical\tD009020
//! 1001\t17\t28\tbradycardia\tDisease\tD001919
//! 1001\tCID\tD009020\tD001919
//! ";
//!
//! let mut records = parse_pubtator(input)?;
//! let paper = Paper::new(records.remove(0), &MedlineSplitter::new())?;
//!
//! assert_eq!(paper.sentences().len(), 2);
//! assert_eq!(
//!     paper.relations().origin_of(&RelationPair::new("D009020", "D001919")),
//!     Some(RelationOrigin::Cid),
//! );
//! # Ok::<(), cidrex::Error>(())
//! ```
//!
//! ## Pipeline
//!
//! [`parse_pubtator`] (or [`load_pubtator`]) turns raw text into
//! [`PaperRecord`]s without interpreting them. [`Paper::new`] then does the
//! heavy lifting for one record: validates every annotation span against the
//! document text, resolves parenthetical acronym definitions so short forms
//! inherit the long form's ontology identity, aligns the sentences produced
//! by a [`SentenceSplitter`] back onto document offsets, and partitions the
//! chemical/disease cross product into a [`RelationPartition`].
//! [`build_papers`] runs that over a whole corpus, isolating per-record
//! failures (and fanning out with rayon under the `parallel` feature).
//!
//! All offsets throughout the crate are **character** offsets into
//! `"{title} {abstract}"`, matching the upstream annotation convention, not
//! byte offsets.
//!
//! ## Feature Flags
//!
//! ```toml
//! [dependencies]
//! cidrex = "0.1"                                    # sequential
//! cidrex = { version = "0.1", features = ["parallel"] } # rayon corpus build
//! ```

#![warn(missing_docs)]

mod annotation;
mod corpus;
mod error;
mod eval;
mod ontology;
mod paper;
mod relation;
mod segment;
mod sentence;
mod span;

pub use annotation::{Annotation, AnnotationType};
pub use corpus::{build_papers, load_pubtator, parse_pubtator};
pub use error::{Error, Result};
pub use eval::{evaluate_papers, evaluate_relations, RelationCounts, RelationScoreSummary};
pub use ontology::{
    is_mesh_code, ConceptIdentitySet, Namespace, OntologyIdentifier, COMPOUND_DELIMITER,
};
pub use paper::{
    AnnotationRecord, OverlapPolicy, Paper, PaperRecord, RelationPartition,
};
pub use relation::{GoldRelation, RelationOrigin, RelationPair};
pub use segment::{MedlineSplitter, SentenceSplitter};
pub use sentence::{Sentence, CID_MARKER, CID_MAX_GAP};
pub use span::TextSpan;
