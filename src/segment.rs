//! Sentence segmentation collaborator.
//!
//! The classification core does not care how sentence boundaries are found;
//! it only requires a [`SentenceSplitter`] whose output consists of
//! contiguous substrings of the input, in order. The paper's alignment pass
//! re-locates every returned sentence in the document text and fails hard if
//! one cannot be found or if the sentences do not jointly cover the
//! document, so a broken splitter surfaces as [`crate::Error::Alignment`] or
//! [`crate::Error::UnsegmentedText`] rather than silently misassigned
//! annotations.
//!
//! [`MedlineSplitter`] is the built-in rule-based implementation, tuned for
//! Medline abstracts the way LingPipe's `MedlineSentenceModel` is: sentence
//! terminators are `.`, `!`, `?` followed by whitespace and an upper-case or
//! digit continuation, with guards for common abbreviations, initials and
//! decimal numbers.

/// Splits a document into sentences.
///
/// Implementations must return contiguous substrings of `text` in order of
/// appearance; they may drop inter-sentence whitespace but must not alter
/// the sentence text itself.
pub trait SentenceSplitter {
    /// Split `text` into ordered sentence substrings.
    fn segment(&self, text: &str) -> Vec<String>;
}

/// Any closure with the right shape is a splitter. Handy for tests and for
/// wiring in an external segmenter.
impl<F> SentenceSplitter for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn segment(&self, text: &str) -> Vec<String> {
        self(text)
    }
}

/// Abbreviations (compared lower-case, without the trailing period) after
/// which a period never ends a sentence.
const ABBREVIATIONS: &[&str] = &[
    "al", "approx", "ca", "cf", "dr", "e.g", "etc", "fig", "figs", "i.e", "i.m", "i.p", "i.v",
    "inc", "ltd", "no", "nos", "p.o", "prof", "ref", "refs", "resp", "s.c", "spp", "subsp", "vs",
];

/// Rule-based sentence splitter for Medline titles and abstracts.
#[derive(Debug, Clone, Copy, Default)]
pub struct MedlineSplitter;

impl MedlineSplitter {
    /// Create a splitter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Whether the terminator at byte position `idx` ends a sentence.
    fn is_boundary(text: &str, idx: usize, terminator: char) -> bool {
        let mut rest = text[idx + terminator.len_utf8()..].chars().peekable();

        // Closing brackets and quotes stay with the sentence.
        while matches!(rest.peek(), Some(')' | ']' | '"' | '\'')) {
            rest.next();
        }

        // Require whitespace, then an upper-case or digit continuation.
        // End of text is always a boundary.
        let mut saw_whitespace = false;
        for c in rest {
            if c.is_whitespace() {
                saw_whitespace = true;
                continue;
            }
            if !saw_whitespace {
                return false;
            }
            if !(c.is_uppercase() || c.is_ascii_digit()) {
                return false;
            }
            break;
        }

        if terminator != '.' {
            return true;
        }

        // Word immediately before the period, lower-cased. Periods inside it
        // are kept so "e.g." and "i.v." match as units.
        let word: String = text[..idx]
            .chars()
            .rev()
            .take_while(|c| c.is_alphanumeric() || *c == '.' || *c == '-')
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        let word = word.trim_end_matches('.').to_lowercase();

        if ABBREVIATIONS.contains(&word.as_str()) {
            return false;
        }
        // Single letters are initials or species abbreviations ("S. aureus").
        if word.len() == 1 && word.chars().all(char::is_alphabetic) {
            return false;
        }
        true
    }
}

impl SentenceSplitter for MedlineSplitter {
    fn segment(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut seg_start = 0;

        for (idx, c) in text.char_indices() {
            if matches!(c, '.' | '!' | '?') && Self::is_boundary(text, idx, c) {
                let stop = idx + c.len_utf8();
                push_trimmed(&mut sentences, &text[seg_start..stop]);
                seg_start = stop;
            }
        }
        push_trimmed(&mut sentences, &text[seg_start..]);

        sentences
    }
}

fn push_trimmed(sentences: &mut Vec<String>, segment: &str) {
    let trimmed = segment.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(text: &str) -> Vec<String> {
        MedlineSplitter::new().segment(text)
    }

    #[test]
    fn test_basic_split() {
        let got = split("This is a test. Roflcopter sentence 2!!!");
        assert_eq!(got, vec!["This is a test.", "Roflcopter sentence 2!!!"]);
    }

    #[test]
    fn test_terminator_needs_capital_continuation() {
        let got = split("Treatment with 5 mg/kg i.p. was continued. Symptoms resolved.");
        assert_eq!(
            got,
            vec![
                "Treatment with 5 mg/kg i.p. was continued.",
                "Symptoms resolved."
            ]
        );
    }

    #[test]
    fn test_abbreviations_do_not_split() {
        let got = split("Drugs (e.g. aspirin) were given. Outcomes improved.");
        assert_eq!(
            got,
            vec!["Drugs (e.g. aspirin) were given.", "Outcomes improved."]
        );
    }

    #[test]
    fn test_species_initial_does_not_split() {
        let got = split("Infection with S. aureus was confirmed. Therapy began.");
        assert_eq!(
            got,
            vec!["Infection with S. aureus was confirmed.", "Therapy began."]
        );
    }

    #[test]
    fn test_decimal_numbers_do_not_split() {
        let got = split("The dose was 2.5 mg daily. Tolerance was good.");
        assert_eq!(got, vec!["The dose was 2.5 mg daily.", "Tolerance was good."]);
    }

    #[test]
    fn test_digit_continuation_splits() {
        let got = split("Ten patients enrolled. 3 withdrew early.");
        assert_eq!(got, vec!["Ten patients enrolled.", "3 withdrew early."]);
    }

    #[test]
    fn test_sentences_are_substrings_in_order() {
        let text = "A double-blind trial of propranolol (40 mg b.i.d.) in migraine. \
                    Headache frequency fell by 50%. No serious adverse events occurred.";
        let mut cursor = 0;
        for sentence in split(text) {
            let at = text[cursor..]
                .find(&sentence)
                .expect("sentence must be a substring at or after the cursor");
            cursor += at + sentence.len();
        }
    }

    #[test]
    fn test_idempotent_resegmentation() {
        let text = "Amiodarone induced pulmonary toxicity. Two patients recovered fully.";
        assert_eq!(split(text), split(text));
        // Re-segmenting a single produced sentence yields that sentence.
        for sentence in split(text) {
            assert_eq!(split(&sentence), vec![sentence]);
        }
    }

    #[test]
    fn test_no_trailing_terminator() {
        let got = split("Title without terminator");
        assert_eq!(got, vec!["Title without terminator"]);
    }
}
