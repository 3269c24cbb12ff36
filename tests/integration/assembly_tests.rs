/*!
 * Integration tests for cutting narrated sentences into titled parts
 */

use indicatif::ProgressBar;
use storyparts::app_config::RemainderPolicy;
use storyparts::errors::PipelineError;
use storyparts::pipeline::{AssembledPart, PartAssembler, compute_budget};
use storyparts::providers::mock::MockSynthesizer;
use crate::common;

async fn assemble(
    synthesizer: &MockSynthesizer,
    sentences: &[String],
    budget: f64,
    policy: RemainderPolicy,
) -> Result<Vec<AssembledPart>, PipelineError> {
    PartAssembler::new(synthesizer, "test-voice", policy)
        .assemble("My Story", sentences, budget, &ProgressBar::hidden())
        .await
}

fn body_total(parts: &[AssembledPart]) -> f64 {
    parts.iter().map(|p| p.body_duration).sum()
}

/// Four minutes of narration are cut in thirds
#[tokio::test]
async fn test_assemble_withFourMinuteNarration_shouldProduceThreeParts() {
    common::init_logging();
    let synthesizer = MockSynthesizer::new().with_default_duration(20.0);
    let sentences = common::numbered_sentences(12);
    let budget = compute_budget(240.0);
    assert_eq!(budget, 80.0);

    let parts = assemble(&synthesizer, &sentences, budget, RemainderPolicy::Flush).await.unwrap();

    assert_eq!(parts.len(), 3);
    assert_eq!(parts.iter().map(|p| p.index).collect::<Vec<_>>(), vec![1, 2, 3]);
    for part in &parts {
        assert_eq!(part.sentence_count, 4);
        assert_eq!(part.body_duration, 80.0);
        // Title announcement (2 s) comes first
        assert_eq!(part.audio.duration(), 82.0);
    }
    assert_eq!(body_total(&parts), 240.0);
    // One call per sentence plus one title per part
    assert_eq!(synthesizer.call_count(), 15);
}

/// A narration shorter than two minutes stays in one part
#[tokio::test]
async fn test_assemble_withNinetySecondNarration_shouldProduceSinglePart() {
    let synthesizer = MockSynthesizer::new().with_default_duration(30.0);
    let sentences = common::numbered_sentences(3);
    let budget = compute_budget(90.0);

    let parts = assemble(&synthesizer, &sentences, budget, RemainderPolicy::Flush).await.unwrap();

    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].index, 1);
    assert_eq!(parts[0].body_duration, 90.0);
    assert_eq!(parts[0].audio.duration(), 92.0);

    let calls = synthesizer.calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls.last().map(String::as_str), Some("My Story\nPart 1\n"));
}

/// Titles are synthesized after their part's sentences, with the part number
#[tokio::test]
async fn test_assemble_shouldAnnounceEveryPartWithItsNumber() {
    let synthesizer = MockSynthesizer::new().with_default_duration(20.0);
    let sentences = common::numbered_sentences(4);

    assemble(&synthesizer, &sentences, 40.0, RemainderPolicy::Flush).await.unwrap();

    let titles: Vec<String> = synthesizer
        .calls()
        .into_iter()
        .filter(|text| text.starts_with("My Story\n"))
        .collect();
    assert_eq!(titles, vec!["My Story\nPart 1\n", "My Story\nPart 2\n"]);
    assert_eq!(synthesizer.calls()[2], "My Story\nPart 1\n");
}

/// A short remainder becomes a final part under the flush policy
#[tokio::test]
async fn test_assemble_withRemainderAndFlush_shouldKeepAllNarration() {
    let synthesizer = MockSynthesizer::new().with_default_duration(20.0);
    let sentences = common::numbered_sentences(5);

    let parts = assemble(&synthesizer, &sentences, 80.0, RemainderPolicy::Flush).await.unwrap();

    assert_eq!(parts.len(), 2);
    assert_eq!(parts[1].index, 2);
    assert_eq!(parts[1].sentence_count, 1);
    assert_eq!(parts[1].body_duration, 20.0);
    assert_eq!(body_total(&parts), 100.0);
}

/// A short remainder is dropped under the discard policy
#[tokio::test]
async fn test_assemble_withRemainderAndDiscard_shouldDropTail() {
    let synthesizer = MockSynthesizer::new().with_default_duration(20.0);
    let sentences = common::numbered_sentences(5);

    let parts = assemble(&synthesizer, &sentences, 80.0, RemainderPolicy::Discard).await.unwrap();

    assert_eq!(parts.len(), 1);
    assert_eq!(body_total(&parts), 80.0);
    // The dropped sentence was still narrated, but never titled
    assert_eq!(synthesizer.call_count(), 6);
}

/// Uneven sentences overshoot the budget rather than being split
#[tokio::test]
async fn test_assemble_withLongSentence_shouldCloseAfterOvershoot() {
    let sentences = common::numbered_sentences(3);
    let synthesizer = MockSynthesizer::new()
        .with_default_duration(10.0)
        .with_duration(sentences[1].clone(), 50.0);

    let parts = assemble(&synthesizer, &sentences, 30.0, RemainderPolicy::Flush).await.unwrap();

    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].body_duration, 60.0);
    assert_eq!(parts[0].sentence_count, 2);
    assert_eq!(parts[1].body_duration, 10.0);
}

/// A failing sentence aborts the assembly and names the sentence
#[tokio::test]
async fn test_assemble_withFailingSentence_shouldReturnSynthesisFailure() {
    let synthesizer = MockSynthesizer::new()
        .with_default_duration(20.0)
        .failing_on("Line 3 ");
    let sentences = common::numbered_sentences(6);

    let result = assemble(&synthesizer, &sentences, 40.0, RemainderPolicy::Flush).await;

    match result {
        Err(PipelineError::SynthesisFailure { context, .. }) => assert_eq!(context, "sentence 3"),
        other => panic!("Expected SynthesisFailure, got {:?}", other),
    }
}

/// A failing title aborts the assembly as well
#[tokio::test]
async fn test_assemble_withFailingTitle_shouldReturnSynthesisFailure() {
    let synthesizer = MockSynthesizer::new()
        .with_default_duration(20.0)
        .failing_on("\nPart 2\n");
    let sentences = common::numbered_sentences(4);

    let result = assemble(&synthesizer, &sentences, 40.0, RemainderPolicy::Flush).await;

    match result {
        Err(PipelineError::SynthesisFailure { context, .. }) => assert_eq!(context, "title of part 2"),
        other => panic!("Expected SynthesisFailure, got {:?}", other),
    }
}

/// No sentences means no parts
#[tokio::test]
async fn test_assemble_withoutSentences_shouldProduceNothing() {
    let synthesizer = MockSynthesizer::new();

    let parts = assemble(&synthesizer, &[], 60.0, RemainderPolicy::Flush).await.unwrap();

    assert!(parts.is_empty());
    assert_eq!(synthesizer.call_count(), 0);
}
