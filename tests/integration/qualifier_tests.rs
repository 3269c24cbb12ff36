/*!
 * Integration tests for selecting the post to narrate
 */

use futures::stream::BoxStream;
use storyparts::errors::{PipelineError, ProviderError};
use storyparts::pipeline::PostQualifier;
use storyparts::processed_store::{MemoryStore, ProcessedStore};
use storyparts::providers::mock::{MockCandidate, MockSource, MockSynthesizer};
use storyparts::providers::{CandidateFilter, ContentSource, Post};

const MIN_NARRATION_SECS: f64 = 60.0;

fn three_posts() -> (Vec<Post>, MockSynthesizer) {
    let posts = vec![
        Post::new("a", "Short one", "Body of post A."),
        Post::new("b", "Long enough", "Body of post B."),
        Post::new("c", "Longest", "Body of post C."),
    ];
    let synthesizer = MockSynthesizer::new()
        .with_duration("Body of post A.", 40.0)
        .with_duration("Body of post B.", 75.0)
        .with_duration("Body of post C.", 90.0);
    (posts, synthesizer)
}

fn candidates(source: &MockSource) -> BoxStream<'static, Result<Post, ProviderError>> {
    source.fetch_candidates(&CandidateFilter::default())
}

/// The first candidate over the threshold wins, not the longest
#[tokio::test]
async fn test_select_withMixedLengths_shouldPickFirstLongEnough() {
    let (posts, synthesizer) = three_posts();
    let source = MockSource::new(posts);
    let store = MemoryStore::new();
    let mut stream = candidates(&source);

    let qualified = PostQualifier::new(&synthesizer, &store, "test-voice", MIN_NARRATION_SECS)
        .select(&mut stream)
        .await
        .unwrap();

    assert_eq!(qualified.post.id, "b");
    assert_eq!(qualified.narration_secs, 75.0);
    assert_eq!(synthesizer.calls(), vec!["Body of post A.", "Body of post B."]);
}

/// Processed posts are skipped without a single synthesis call
#[tokio::test]
async fn test_select_withProcessedPost_shouldSkipWithoutSynthesis() {
    let (posts, synthesizer) = three_posts();
    let source = MockSource::new(posts);
    let store = MemoryStore::with_ids(["b"]);
    let mut stream = candidates(&source);

    let qualified = PostQualifier::new(&synthesizer, &store, "test-voice", MIN_NARRATION_SECS)
        .select(&mut stream)
        .await
        .unwrap();

    assert_eq!(qualified.post.id, "c");
    assert!(!synthesizer.calls().iter().any(|text| text == "Body of post B."));
}

/// Selecting twice against the same store never returns a processed post
#[tokio::test]
async fn test_select_afterMarkingProcessed_shouldMoveOn() {
    let (posts, synthesizer) = three_posts();
    let source = MockSource::new(posts);
    let store = MemoryStore::new();
    let qualifier = PostQualifier::new(&synthesizer, &store, "test-voice", MIN_NARRATION_SECS);

    let first = qualifier.select(&mut candidates(&source)).await.unwrap();
    store.mark_processed(&first.post.id).unwrap();
    let second = qualifier.select(&mut candidates(&source)).await.unwrap();

    assert_eq!(first.post.id, "b");
    assert_eq!(second.post.id, "c");
}

/// Every candidate already processed: nothing qualifies, nothing is synthesized
#[tokio::test]
async fn test_select_withAllProcessed_shouldReturnNoQualifyingPost() {
    let (posts, synthesizer) = three_posts();
    let source = MockSource::new(posts);
    let store = MemoryStore::with_ids(["a", "b", "c"]);
    let mut stream = candidates(&source);

    let result = PostQualifier::new(&synthesizer, &store, "test-voice", MIN_NARRATION_SECS)
        .select(&mut stream)
        .await;

    assert!(matches!(result, Err(PipelineError::NoQualifyingPost { examined: 3 })));
    assert_eq!(synthesizer.call_count(), 0);
}

/// Nothing long enough: the source runs dry
#[tokio::test]
async fn test_select_withOnlyShortPosts_shouldReturnNoQualifyingPost() {
    let source = MockSource::new(vec![Post::new("a", "Short", "Tiny body.")]);
    let synthesizer = MockSynthesizer::new().with_duration("Tiny body.", 12.0);
    let store = MemoryStore::new();
    let mut stream = candidates(&source);

    let result = PostQualifier::new(&synthesizer, &store, "test-voice", MIN_NARRATION_SECS)
        .select(&mut stream)
        .await;

    match result {
        Err(e @ PipelineError::NoQualifyingPost { .. }) => assert!(e.is_fatal()),
        other => panic!("Expected NoQualifyingPost, got {:?}", other),
    }
}

/// Empty bodies are skipped before synthesis
#[tokio::test]
async fn test_select_withEmptyBody_shouldSkipWithoutSynthesis() {
    let source = MockSource::new(vec![
        Post::new("empty", "Nothing here", "   \n "),
        Post::new("b", "Long enough", "Body of post B."),
    ]);
    let synthesizer = MockSynthesizer::new().with_duration("Body of post B.", 75.0);
    let store = MemoryStore::new();
    let mut stream = candidates(&source);

    let qualified = PostQualifier::new(&synthesizer, &store, "test-voice", MIN_NARRATION_SECS)
        .select(&mut stream)
        .await
        .unwrap();

    assert_eq!(qualified.post.id, "b");
    assert_eq!(synthesizer.call_count(), 1);
}

/// Source and probe errors skip the candidate instead of ending selection
#[tokio::test]
async fn test_select_withFailingCandidates_shouldSkipThem() {
    let source = MockSource::from_candidates(vec![
        MockCandidate::Error("listing page unavailable".to_string()),
        MockCandidate::Post(Post::new("broken", "Unspeakable", "Cannot be read aloud.")),
        MockCandidate::Post(Post::new("b", "Long enough", "Body of post B.")),
    ]);
    let synthesizer = MockSynthesizer::new()
        .failing_on("Cannot be read")
        .with_duration("Body of post B.", 75.0);
    let store = MemoryStore::new();
    let mut stream = candidates(&source);

    let qualified = PostQualifier::new(&synthesizer, &store, "test-voice", MIN_NARRATION_SECS)
        .select(&mut stream)
        .await
        .unwrap();

    assert_eq!(qualified.post.id, "b");
}

/// The threshold is inclusive
#[tokio::test]
async fn test_select_withExactThreshold_shouldQualify() {
    let source = MockSource::new(vec![Post::new("edge", "Exactly a minute", "Sixty seconds.")]);
    let synthesizer = MockSynthesizer::new().with_duration("Sixty seconds.", 60.0);
    let store = MemoryStore::new();
    let mut stream = candidates(&source);

    let qualified = PostQualifier::new(&synthesizer, &store, "test-voice", MIN_NARRATION_SECS)
        .select(&mut stream)
        .await
        .unwrap();

    assert_eq!(qualified.post.id, "edge");
}
