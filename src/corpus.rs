//! PubTator-format corpus parsing and batch paper construction.
//!
//! The BioCreative V CDR corpus ships as line-oriented PubTator records:
//!
//! ```text
//! 2377|t|Title text
//! 2377|a|Abstract text
//! 2377<TAB>start<TAB>stop<TAB>mention<TAB>type<TAB>identifier
//! 2377<TAB>CID<TAB>chemical_id<TAB>disease_id
//! <blank line>
//! ```
//!
//! Parsing is plain line dispatch into [`PaperRecord`] values; all real
//! validation happens during [`Paper`] construction. Batch construction
//! isolates failures per paper: one malformed record is reported alongside
//! the papers that did build, rather than aborting the corpus run. Paper
//! constructions are independent, so the batch map parallelizes across
//! papers (enable the `parallel` feature); classification inside one paper
//! stays sequential.

use crate::error::{Error, Result};
use crate::paper::{AnnotationRecord, OverlapPolicy, Paper, PaperRecord};
use crate::segment::SentenceSplitter;
use std::path::Path;

/// Parse a PubTator-format file.
///
/// # Errors
///
/// IO failures and malformed lines are fatal to the whole parse; per-paper
/// semantic problems are deferred to construction.
pub fn load_pubtator(path: impl AsRef<Path>) -> Result<Vec<PaperRecord>> {
    parse_pubtator(&std::fs::read_to_string(path)?)
}

/// Parse PubTator-format text into raw paper records.
///
/// # Errors
///
/// Fails on structurally malformed lines (wrong field counts, bad offsets,
/// pmid mismatches), identifying the one-based line number.
pub fn parse_pubtator(content: &str) -> Result<Vec<PaperRecord>> {
    let mut papers = Vec::new();
    // The bool tracks whether the abstract line has been consumed yet.
    let mut current: Option<(PaperRecord, bool)> = None;

    for (i, line) in content.lines().enumerate() {
        let lineno = i + 1;
        let line = line.trim_end_matches('\r');

        if line.is_empty() {
            if let Some((record, _)) = current.take() {
                papers.push(record);
            }
            continue;
        }

        match current.as_mut() {
            None => {
                let (pmid, title) = parse_text_line(line, lineno, "t")?;
                current = Some((
                    PaperRecord {
                        pmid,
                        title,
                        ..PaperRecord::default()
                    },
                    false,
                ));
            }
            Some((record, has_abstract @ false)) => {
                let (pmid, abstract_text) = parse_text_line(line, lineno, "a")?;
                if pmid != record.pmid {
                    return Err(Error::parse(
                        lineno,
                        format!("abstract pmid {pmid} does not match title pmid {}", record.pmid),
                    ));
                }
                record.abstract_text = abstract_text;
                *has_abstract = true;
            }
            Some((record, true)) => parse_body_line(line, lineno, record)?,
        }
    }

    if let Some((record, _)) = current.take() {
        papers.push(record);
    }

    Ok(papers)
}

/// Parse a `PMID|t|...` or `PMID|a|...` line.
fn parse_text_line(line: &str, lineno: usize, expected: &str) -> Result<(u32, String)> {
    let mut parts = line.splitn(3, '|');
    let pmid = parts.next().unwrap_or("");
    let kind = parts.next().unwrap_or("");
    let text = parts
        .next()
        .ok_or_else(|| Error::parse(lineno, "expected PMID|t|text or PMID|a|text"))?;
    if kind != expected {
        return Err(Error::parse(
            lineno,
            format!("expected a `{expected}` line, found `{kind}`"),
        ));
    }
    let pmid = pmid
        .parse::<u32>()
        .map_err(|_| Error::parse(lineno, format!("invalid pmid `{pmid}`")))?;
    Ok((pmid, text.to_string()))
}

/// Parse an annotation or relation row into the current record.
fn parse_body_line(line: &str, lineno: usize, record: &mut PaperRecord) -> Result<()> {
    let fields: Vec<&str> = line.split('\t').collect();

    match fields.as_slice() {
        [pmid, "CID", chemical, disease] => {
            check_pmid(pmid, record.pmid, lineno)?;
            record
                .gold_relations
                .push(((*chemical).to_string(), (*disease).to_string()));
            Ok(())
        }
        // Annotation rows carry 6 fields, or 7 when a normalizer appends
        // per-component mention text.
        [pmid, start, stop, mention, stype, identifier]
        | [pmid, start, stop, mention, stype, identifier, _] => {
            check_pmid(pmid, record.pmid, lineno)?;
            let start = parse_offset(start, lineno)?;
            let stop = parse_offset(stop, lineno)?;
            record.annotations.push(AnnotationRecord {
                identifier: (*identifier).to_string(),
                semantic_type: (*stype).to_string(),
                mention: (*mention).to_string(),
                start,
                stop,
            });
            Ok(())
        }
        _ => Err(Error::parse(
            lineno,
            format!("expected 4-field relation or 6-7 field annotation, found {} fields", fields.len()),
        )),
    }
}

fn check_pmid(field: &str, expected: u32, lineno: usize) -> Result<()> {
    let pmid = field
        .parse::<u32>()
        .map_err(|_| Error::parse(lineno, format!("invalid pmid `{field}`")))?;
    if pmid != expected {
        return Err(Error::parse(
            lineno,
            format!("row pmid {pmid} does not match record pmid {expected}"),
        ));
    }
    Ok(())
}

fn parse_offset(field: &str, lineno: usize) -> Result<usize> {
    field
        .parse::<usize>()
        .map_err(|_| Error::parse(lineno, format!("invalid offset `{field}`")))
}

/// Construct papers from raw records, isolating per-paper failures.
///
/// Returns the successfully built papers and, separately, the pmid and
/// error of every record that failed. With the `parallel` feature enabled
/// the map runs across papers with rayon; order of the returned papers
/// follows the input either way.
#[must_use]
pub fn build_papers(
    records: Vec<PaperRecord>,
    splitter: &(dyn SentenceSplitter + Sync),
    policy: OverlapPolicy,
) -> (Vec<Paper>, Vec<(u32, Error)>) {
    #[cfg(feature = "parallel")]
    let results: Vec<(u32, Result<Paper>)> = {
        use rayon::prelude::*;
        records
            .into_par_iter()
            .map(|record| {
                let pmid = record.pmid;
                (pmid, Paper::with_policy(record, splitter, policy))
            })
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let results: Vec<(u32, Result<Paper>)> = records
        .into_iter()
        .map(|record| {
            let pmid = record.pmid;
            (pmid, Paper::with_policy(record, splitter, policy))
        })
        .collect();

    let mut papers = Vec::new();
    let mut failures = Vec::new();
    for (pmid, result) in results {
        match result {
            Ok(paper) => papers.push(paper),
            Err(err) => {
                log::warn!("pmid {pmid}: construction failed: {err}");
                failures.push((pmid, err));
            }
        }
    }
    (papers, failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::MedlineSplitter;

    const SAMPLE: &str = "\
2377|t|Aspirin induced gastric ulcer.
2377|a|A case report with follow-up.
2377\t0\t7\tAspirin\tChemical\tD001241
2377\t16\t29\tgastric ulcer\tDisease\tD013276
2377\tCID\tD001241\tD013276

2378|t|Unrelated title.
2378|a|Unrelated abstract.

";

    #[test]
    fn test_parse_two_records() {
        let records = parse_pubtator(SAMPLE).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.pmid, 2377);
        assert_eq!(first.title, "Aspirin induced gastric ulcer.");
        assert_eq!(first.abstract_text, "A case report with follow-up.");
        assert_eq!(first.annotations.len(), 2);
        assert_eq!(first.annotations[0].mention, "Aspirin");
        assert_eq!(first.annotations[1].start, 16);
        assert_eq!(first.gold_relations, vec![("D001241".into(), "D013276".into())]);

        assert_eq!(records[1].pmid, 2378);
        assert!(records[1].annotations.is_empty());
    }

    #[test]
    fn test_missing_trailing_blank_line() {
        let records = parse_pubtator(SAMPLE.trim_end()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_seven_field_annotation_row() {
        let content = "\
100|t|Aspirin study.
100|a|Notes.
100\t0\t7\tAspirin\tChemical\tD001241\tAspirin
";
        let records = parse_pubtator(content).unwrap();
        assert_eq!(records[0].annotations.len(), 1);
    }

    #[test]
    fn test_malformed_lines_report_line_numbers() {
        let err = parse_pubtator("2377|x|Bad kind.").unwrap_err();
        assert!(err.to_string().starts_with("line 1"));

        let err = parse_pubtator("notanumber|t|Title.").unwrap_err();
        assert!(err.to_string().contains("invalid pmid"));

        let content = "2377|t|Title.\n2378|a|Mismatched.";
        let err = parse_pubtator(content).unwrap_err();
        assert!(err.to_string().contains("does not match"));

        let content = "2377|t|Title.\n2377|a|Abstract.\n2377\ttoo\tfew";
        let err = parse_pubtator(content).unwrap_err();
        assert!(err.to_string().starts_with("line 3"));
    }

    #[test]
    fn test_build_papers_isolates_failures() {
        // Second record's annotation offsets do not match its text.
        let content = "\
2377|t|Aspirin induced gastric ulcer.
2377|a|A case report with follow-up.
2377\t0\t7\tAspirin\tChemical\tD001241
2377\t16\t29\tgastric ulcer\tDisease\tD013276

9999|t|Broken record.
9999|a|Nothing aligns.
9999\t0\t7\tAspirin\tChemical\tD001241
";
        let records = parse_pubtator(content).unwrap();
        let (papers, failures) =
            build_papers(records, &MedlineSplitter::new(), OverlapPolicy::default());

        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].pmid(), 2377);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, 9999);
        assert_eq!(failures[0].1.pmid(), Some(9999));
    }
}
