/*!
 * Sentence segmentation for narration text.
 *
 * Boundaries come from Unicode sentence segmentation (UAX #29), which
 * already keeps decimal numbers such as `3.5` or `1.000` in one piece.
 * A per-language abbreviation table then rejoins pieces that were split
 * after a known abbreviation (`Mr.`, `e.g.`, `approx.`), a number sign
 * followed by a number (`No. 5`) or an initial inside a name (`J. R. R.
 * Tolkien`, `John F. Kennedy`).
 */

use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

use crate::errors::PipelineError;
use crate::language_utils;

const ENGLISH_ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "vs", "etc", "e.g", "i.e",
    "approx", "dept", "est", "inc", "ltd", "co", "corp", "jan", "feb", "mar", "apr", "jun",
    "jul", "aug", "sep", "sept", "oct", "nov", "dec", "u.s", "u.k", "a.m", "p.m", "fig",
    "gen", "gov", "lt", "col", "sgt", "capt", "rev", "ave", "blvd", "misc",
];

const GERMAN_ABBREVIATIONS: &[&str] = &[
    "z.b", "bzw", "usw", "d.h", "ca", "dr", "hr", "fr", "str", "vgl", "ggf", "evtl",
    "inkl", "u.a", "s", "z.t", "bspw", "prof",
];

const FRENCH_ABBREVIATIONS: &[&str] = &[
    "m", "mm", "mme", "mlle", "dr", "pr", "etc", "p.ex", "cf", "av", "bd", "st", "ste", "env",
    "vol", "chap",
];

const SPANISH_ABBREVIATIONS: &[&str] = &[
    "sr", "sra", "srta", "dr", "dra", "ud", "uds", "etc", "p.ej", "av", "pág", "aprox",
    "lic", "ing", "prof",
];

const ITALIAN_ABBREVIATIONS: &[&str] = &[
    "sig", "sigg", "sig.ra", "dott", "dr", "prof", "ing", "avv", "ecc", "es", "pag", "p.es",
];

const PORTUGUESE_ABBREVIATIONS: &[&str] = &[
    "sr", "sra", "dr", "dra", "prof", "etc", "p.ex", "av", "pág", "aprox", "ex",
];

/// Number signs, which only abbreviate when a number follows
const NUMBER_SIGNS: &[&str] = &["no", "nos", "nr", "n", "n°", "nº", "núm"];

/// Splits narration text into sentences for one language
#[derive(Debug, Clone)]
pub struct SentenceSegmenter {
    language: String,
    abbreviations: HashSet<&'static str>,
}

impl SentenceSegmenter {
    /// Create a segmenter for an ISO 639 language code.
    ///
    /// Fails when the code is invalid or no boundary data exists for it.
    pub fn for_language(code: &str) -> Result<Self, PipelineError> {
        let language = language_utils::normalize_to_part1(code)
            .map_err(|e| PipelineError::SegmentationFailure(e.to_string()))?;

        let table = match language.as_str() {
            "en" => ENGLISH_ABBREVIATIONS,
            "de" => GERMAN_ABBREVIATIONS,
            "fr" => FRENCH_ABBREVIATIONS,
            "es" => SPANISH_ABBREVIATIONS,
            "it" => ITALIAN_ABBREVIATIONS,
            "pt" => PORTUGUESE_ABBREVIATIONS,
            other => {
                return Err(PipelineError::SegmentationFailure(format!(
                    "no sentence boundary data for language '{}'",
                    other
                )));
            }
        };

        Ok(Self {
            language,
            abbreviations: table.iter().copied().collect(),
        })
    }

    /// ISO 639-1 code of the segmenter's language
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Split `text` into trimmed, non-empty sentences in reading order
    pub fn segment(&self, text: &str) -> Vec<String> {
        let pieces: Vec<&str> = text.split_sentence_bounds().collect();
        let mut sentences = Vec::new();
        let mut pending = String::new();

        for (i, piece) in pieces.iter().enumerate() {
            pending.push_str(piece);
            let continues = match pieces.get(i + 1) {
                Some(next) => !ends_paragraph(piece) && self.continues_into(&pending, next),
                None => false,
            };
            if !continues {
                push_sentence(&mut sentences, &pending);
                pending.clear();
            }
        }

        sentences
    }

    /// Whether the period ending `text` belongs to an abbreviation, so the
    /// sentence goes on into `next`
    fn continues_into(&self, text: &str, next: &str) -> bool {
        let mut words = text.split_whitespace().rev();
        let Some(last_word) = words.next() else {
            return false;
        };
        let Some(stem) = last_word.strip_suffix('.') else {
            return false;
        };
        let stem = stem.trim_start_matches(|c: char| !c.is_alphanumeric());
        if stem.is_empty() {
            return false;
        }
        let next_word = next.split_whitespace().next().unwrap_or_default();

        if is_initial(stem) {
            return continues_name(words.next(), next_word);
        }

        let stem = stem.to_lowercase();
        if NUMBER_SIGNS.contains(&stem.as_str()) {
            return next_word.starts_with(|c: char| c.is_ascii_digit());
        }
        self.abbreviations.contains(stem.as_str())
    }
}

/// A single capital letter other than the pronoun "I"
fn is_initial(stem: &str) -> bool {
    let mut chars = stem.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_uppercase() && c != 'I')
}

fn starts_uppercase(word: &str) -> bool {
    word.chars().find(|c| c.is_alphabetic()).is_some_and(char::is_uppercase)
}

/// An initial continues the sentence when another initial follows it, or
/// when it sits after a capitalised word and before one ("John F. Kennedy").
/// "vitamin C. It helps." ends after the letter.
fn continues_name(previous: Option<&str>, next_word: &str) -> bool {
    if next_word.strip_suffix('.').is_some_and(is_initial) {
        return true;
    }
    starts_uppercase(next_word) && previous.is_none_or(starts_uppercase)
}

fn ends_paragraph(piece: &str) -> bool {
    piece.ends_with('\n') || piece.ends_with('\r') || piece.ends_with('\u{2029}')
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
    let sentence = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if sentence.chars().any(|c| c.is_alphanumeric()) {
        sentences.push(sentence);
    }
}
