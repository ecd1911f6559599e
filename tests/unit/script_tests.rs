/*!
 * Tests for script loading and sentence splitting
 */

use anyhow::Result;
use shortreel::script::{load_sentences, spoken_sentences, split_sentences};
use crate::common;

#[test]
fn test_split_sentences_withTrailingPeriod_shouldKeepEmptyTail() {
    let sentences = split_sentences("Hello world. This is a test.");
    assert_eq!(sentences, vec!["Hello world", " This is a test", ""]);
}

#[test]
fn test_split_sentences_withoutPeriod_shouldReturnWholeScript() {
    assert_eq!(split_sentences("No period here"), vec!["No period here"]);
}

#[test]
fn test_split_sentences_withAbbreviation_shouldSplitNaively() {
    let sentences = split_sentences("Dr. Smith paid 3.5 dollars");
    assert_eq!(sentences, vec!["Dr", " Smith paid 3", "5 dollars"]);
}

#[test]
fn test_split_sentences_withEmptyScript_shouldReturnOneEmptySegment() {
    assert_eq!(split_sentences(""), vec![""]);
}

#[test]
fn test_spoken_sentences_withBlankSegments_shouldDropThem() {
    let spoken = spoken_sentences(split_sentences("One.  . Two.\n"));
    assert_eq!(spoken, vec!["One", " Two"]);
}

#[test]
fn test_load_sentences_withSkipEmpty_shouldReturnSpokenOnly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let script = common::create_test_file(temp_dir.path(), "script.txt", "First line. Second line.")?;

    let skipped = load_sentences(&script, true)?;
    assert_eq!(skipped, vec!["First line", " Second line"]);

    let raw = load_sentences(&script, false)?;
    assert_eq!(raw.len(), 3);
    assert_eq!(raw[2], "");

    Ok(())
}

#[test]
fn test_load_sentences_withMissingFile_shouldFail() {
    let result = load_sentences("does/not/exist.txt", true);
    assert!(result.is_err());
    assert!(format!("{:#}", result.unwrap_err()).contains("Failed to read script file"));
}
