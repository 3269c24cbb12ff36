/// Target duration of one part for a narration lasting `total_duration`
/// seconds.
///
/// Narrations of three minutes or more are cut in thirds, those of two
/// minutes or more in halves; anything shorter stays in one piece.
pub fn compute_budget(total_duration: f64) -> f64 {
    if total_duration >= 180.0 {
        total_duration / 3.0
    } else if total_duration >= 120.0 {
        total_duration / 2.0
    } else {
        total_duration
    }
}
