/*!
 * Tests for language utility functions
 */

use storyparts::language_utils::{get_language_name, normalize_to_part1};

/// Test normalization of two and three letter codes
#[test]
fn test_normalize_to_part1_withVariousCodes_shouldReturnTwoLetterCode() {
    assert_eq!(normalize_to_part1("en").unwrap(), "en");
    assert_eq!(normalize_to_part1(" FR ").unwrap(), "fr");
    assert_eq!(normalize_to_part1("spa").unwrap(), "es");
    assert_eq!(normalize_to_part1("fre").unwrap(), "fr");
    assert_eq!(normalize_to_part1("deu").unwrap(), "de");
}

/// Test rejection of unknown codes
#[test]
fn test_normalize_to_part1_withInvalidCode_shouldFail() {
    assert!(normalize_to_part1("").is_err());
    assert!(normalize_to_part1("english").is_err());
    assert!(normalize_to_part1("qqq").is_err());
}

/// Test English language names
#[test]
fn test_get_language_name_withValidCodes_shouldReturnName() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("ger").unwrap(), "German");
    assert!(get_language_name("xx").is_err());
}
