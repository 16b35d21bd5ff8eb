/*!
 * Tests for file utilities
 */

use std::path::PathBuf;
use anyhow::Result;
use subtrans::file_utils::FileManager;
use crate::common;

#[test]
fn test_generate_output_path_shouldPlaceOutputNextToInput() {
    let output = FileManager::generate_output_path("/movies/film.srt", "ko");
    assert_eq!(output, PathBuf::from("/movies/film_ko.srt"));
}

#[test]
fn test_generate_output_path_withBareFilename_shouldStayRelative() {
    let output = FileManager::generate_output_path("film.srt", "ja");
    assert_eq!(output, PathBuf::from("film_ja.srt"));
}

#[test]
fn test_generate_output_path_in_shouldUseGivenDirectory() {
    let output = FileManager::generate_output_path_in("/movies/film.srt", "/out", "fr");
    assert_eq!(output, PathBuf::from("/out/film_fr.srt"));
}

#[test]
fn test_is_translation_output_shouldRecognizeGeneratedNames() {
    let output = FileManager::generate_output_path("/movies/film.srt", "ko");
    assert!(FileManager::is_translation_output(&output, "ko"));
    assert!(!FileManager::is_translation_output(&output, "ja"));
}

#[test]
fn test_find_files_shouldReturnSortedMatchesRecursively() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("season1");
    FileManager::ensure_dir(&nested)?;
    common::create_test_file(temp_dir.path(), "b.srt", "")?;
    common::create_test_file(temp_dir.path(), "a.SRT", "")?;
    common::create_test_file(&nested, "c.srt", "")?;
    common::create_test_file(temp_dir.path(), "notes.txt", "")?;

    let files = FileManager::find_files(temp_dir.path(), "srt")?;
    let names: Vec<String> = files.iter()
        .map(|f| f.strip_prefix(temp_dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(names, vec!["a.SRT", "b.srt", "season1/c.srt"]);
    Ok(())
}

#[test]
fn test_write_atomic_shouldReplaceExistingContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "out.srt", "old")?;

    FileManager::write_atomic(&path, "new content")?;
    assert_eq!(FileManager::read_to_string(&path)?, "new content");

    let leftovers = std::fs::read_dir(temp_dir.path())?.count();
    assert_eq!(leftovers, 1);
    Ok(())
}

#[test]
fn test_write_atomic_shouldCreateMissingDirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("a").join("b").join("out.srt");
    FileManager::write_atomic(&path, "x")?;
    assert!(FileManager::file_exists(&path));
    Ok(())
}

#[test]
fn test_write_to_file_and_read_to_string_shouldRoundTrip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("plain.txt");
    FileManager::write_to_file(&path, "안녕\r\n")?;
    assert_eq!(FileManager::read_to_string(&path)?, "안녕\r\n");
    Ok(())
}

#[test]
fn test_read_to_string_withMissingFile_shouldFail() {
    assert!(FileManager::read_to_string("/definitely/not/here.srt").is_err());
}

#[test]
fn test_dir_exists_shouldDistinguishFilesAndDirs() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = common::create_test_file(temp_dir.path(), "f.srt", "")?;
    assert!(FileManager::dir_exists(temp_dir.path()));
    assert!(!FileManager::dir_exists(&file));
    assert!(FileManager::file_exists(&file));
    Ok(())
}
