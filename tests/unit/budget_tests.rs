/*!
 * Tests for the part duration budget
 */

use storyparts::pipeline::compute_budget;

/// Long narrations are cut in thirds
#[test]
fn test_compute_budget_withFourMinutes_shouldReturnThird() {
    assert_eq!(compute_budget(240.0), 80.0);
    assert_eq!(compute_budget(600.0), 200.0);
}

/// Narrations between two and three minutes are cut in halves
#[test]
fn test_compute_budget_withTwoAndAHalfMinutes_shouldReturnHalf() {
    assert_eq!(compute_budget(150.0), 75.0);
}

/// Anything under two minutes is a single part
#[test]
fn test_compute_budget_underTwoMinutes_shouldReturnWholeNarration() {
    assert_eq!(compute_budget(90.0), 90.0);
    assert_eq!(compute_budget(60.0), 60.0);
}

/// The budget never drops below the one-minute floor for qualifying posts
#[test]
fn test_compute_budget_forQualifyingNarrations_shouldStayAboveFortySeconds() {
    let mut total = 60.0;
    while total < 400.0 {
        assert!(compute_budget(total) >= 40.0, "budget too small for {}", total);
        total += 0.5;
    }
}
