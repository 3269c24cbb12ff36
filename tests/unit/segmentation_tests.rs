/*!
 * Tests for sentence segmentation
 */

use storyparts::errors::PipelineError;
use storyparts::segmentation::SentenceSegmenter;

fn english() -> SentenceSegmenter {
    SentenceSegmenter::for_language("en").unwrap()
}

/// Question and exclamation marks end sentences too
#[test]
fn test_segment_withMixedPunctuation_shouldSplitOnEveryTerminator() {
    let sentences = english().segment("Did he really leave? Yes! He packed everything and left.");
    assert_eq!(sentences, vec!["Did he really leave?", "Yes!", "He packed everything and left."]);
}

/// Initials and common abbreviations do not end a sentence
#[test]
fn test_segment_withInitialsAndAbbreviations_shouldKeepThemInside() {
    let sentences = english().segment("I read J. R. R. Tolkien, e.g. The Hobbit, at approx. ten. It stuck.");
    assert_eq!(
        sentences,
        vec!["I read J. R. R. Tolkien, e.g. The Hobbit, at approx. ten.", "It stuck."]
    );
}

/// Paragraph breaks end a sentence even after an abbreviation
#[test]
fn test_segment_withParagraphs_shouldTrimAndDropBlankLines() {
    let sentences = english().segment("  First paragraph ends here.\n\n\nSecond one starts.  ");
    assert_eq!(sentences, vec!["First paragraph ends here.", "Second one starts."]);
}

/// Text without a terminator is a single sentence
#[test]
fn test_segment_withoutTerminator_shouldReturnWholeText() {
    assert_eq!(english().segment("no punctuation at all"), vec!["no punctuation at all"]);
    assert!(english().segment("   ").is_empty());
}

/// Sentence order follows reading order
#[test]
fn test_segment_withManySentences_shouldPreserveOrder() {
    let text = (1..=20).map(|i| format!("Line {} of the story goes on.", i)).collect::<Vec<_>>().join(" ");
    let sentences = english().segment(&text);
    assert_eq!(sentences.len(), 20);
    assert_eq!(sentences[0], "Line 1 of the story goes on.");
    assert_eq!(sentences[19], "Line 20 of the story goes on.");
}

/// Three-letter codes resolve to the same boundary data
#[test]
fn test_for_language_withIso639_2Code_shouldNormalize() {
    assert_eq!(SentenceSegmenter::for_language("eng").unwrap().language(), "en");
    assert_eq!(SentenceSegmenter::for_language("ger").unwrap().language(), "de");
}

/// German abbreviations are language specific
#[test]
fn test_segment_withGermanAbbreviation_shouldNotSplit() {
    let segmenter = SentenceSegmenter::for_language("de").unwrap();
    let sentences = segmenter.segment("Wir treffen uns bzw. telefonieren morgen. Bis dann.");
    assert_eq!(sentences, vec!["Wir treffen uns bzw. telefonieren morgen.", "Bis dann."]);
}

#[test]
fn test_for_language_withInvalidCode_shouldFail() {
    assert!(matches!(
        SentenceSegmenter::for_language("zz"),
        Err(PipelineError::SegmentationFailure(_))
    ));
}

/// The pronoun "I" and a letter after a lowercase word end a sentence
#[test]
fn test_segment_withSentenceEndingInLetter_shouldSplit() {
    assert_eq!(
        english().segment("Nobody else went but I. We met at noon."),
        vec!["Nobody else went but I.", "We met at noon."]
    );
    assert_eq!(english().segment("I take vitamin C. It helps."), vec!["I take vitamin C.", "It helps."]);
}

/// A middle initial between two capitalised words stays inside the name
#[test]
fn test_segment_withMiddleInitial_shouldKeepNameTogether() {
    let sentences = english().segment("I read about John F. Kennedy today. It was long.");
    assert_eq!(sentences, vec!["I read about John F. Kennedy today.", "It was long."]);
}

/// "no." is only an abbreviation before a number
#[test]
fn test_segment_withSentenceEndingInNo_shouldSplit() {
    let sentences = english().segment("She asked me to stay. I said no. He left anyway.");
    assert_eq!(sentences, vec!["She asked me to stay.", "I said no.", "He left anyway."]);
}
