/*!
 * Integration tests for the application controller
 */

use std::sync::Arc;
use anyhow::Result;

use subtrans::app_config::Config;
use subtrans::app_controller::{Controller, FolderSummary, RunOutcome};
use subtrans::credentials::Credentials;
use subtrans::file_utils::FileManager;
use subtrans::providers::mock::MockProvider;
use crate::common;

fn controller_with(mock: Arc<MockProvider>) -> Controller {
    Controller::with_service(common::service_with(common::mymemory_registry(mock), Credentials::new()))
}

#[test]
fn test_with_config_withDefaults_shouldSucceed() {
    assert!(Controller::with_config(Config::default(), Credentials::new()).is_ok());
}

#[test]
fn test_with_config_withUnknownTarget_shouldFail() {
    let mut config = Config::default();
    config.target_language = "qqqqq".to_string();
    assert!(Controller::with_config(config, Credentials::new()).is_err());
}

#[tokio::test]
async fn test_run_shouldTranslateThenSkipExistingOutput() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "episode.srt")?;
    let mock = Arc::new(MockProvider::working());
    let controller = controller_with(mock.clone());
    let expected_output = temp_dir.path().join("episode_ko.srt");

    let first = controller.run(input.clone(), None, false).await?;
    assert_eq!(first, RunOutcome::Translated(expected_output.clone()));
    assert!(FileManager::read_to_string(&expected_output)?.contains("[mock:ko] Hello"));

    let second = controller.run(input, None, false).await?;
    assert_eq!(second, RunOutcome::Skipped(expected_output));
    assert_eq!(mock.call_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_run_withForce_shouldOverwriteExistingOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "episode.srt")?;
    let stale = common::create_test_file(temp_dir.path(), "episode_ko.srt", "stale")?;
    let controller = controller_with(Arc::new(MockProvider::working()));

    let outcome = controller.run(input, None, true).await?;

    assert_eq!(outcome, RunOutcome::Translated(stale.clone()));
    assert_ne!(FileManager::read_to_string(&stale)?, "stale");
    Ok(())
}

#[tokio::test]
async fn test_run_withOutputDir_shouldCreateItAndWriteThere() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "episode.srt")?;
    let out_dir = temp_dir.path().join("translated");
    let controller = controller_with(Arc::new(MockProvider::working()));

    let outcome = controller.run(input, Some(out_dir.clone()), false).await?;

    assert_eq!(outcome, RunOutcome::Translated(out_dir.join("episode_ko.srt")));
    assert!(FileManager::dir_exists(&out_dir));
    Ok(())
}

#[tokio::test]
async fn test_run_withMissingInput_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = controller_with(Arc::new(MockProvider::working()));

    let result = controller.run(temp_dir.path().join("nope.srt"), None, false).await;
    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_run_folder_shouldTranslateEachFileOnce() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let season = temp_dir.path().join("season1");
    FileManager::ensure_dir(&season)?;
    common::create_test_subtitle(temp_dir.path(), "pilot.srt")?;
    common::create_test_subtitle(&season, "e01.srt")?;
    common::create_test_file(temp_dir.path(), "readme.txt", "not a subtitle")?;
    let controller = controller_with(Arc::new(MockProvider::working()));

    let summary = controller.run_folder(temp_dir.path().to_path_buf(), false).await?;
    assert_eq!(summary, FolderSummary { translated: 2, skipped: 0, failed: 0 });
    assert!(FileManager::file_exists(temp_dir.path().join("pilot_ko.srt")));
    assert!(FileManager::file_exists(season.join("e01_ko.srt")));

    // Generated outputs are not picked up as new inputs
    let rerun = controller.run_folder(temp_dir.path().to_path_buf(), false).await?;
    assert_eq!(rerun, FolderSummary { translated: 0, skipped: 2, failed: 0 });
    Ok(())
}

#[tokio::test]
async fn test_run_folder_withNoSubtitles_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "notes.txt", "")?;
    let controller = controller_with(Arc::new(MockProvider::working()));

    assert!(controller.run_folder(temp_dir.path().to_path_buf(), false).await.is_err());
    assert!(controller.run_folder(temp_dir.path().join("missing"), false).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_run_folder_withUnreadableFile_shouldCountFailure() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_subtitle(temp_dir.path(), "good.srt")?;
    std::fs::write(temp_dir.path().join("broken.srt"), [0xff, 0xfe, 0xfd])?;
    let controller = controller_with(Arc::new(MockProvider::working()));

    let summary = controller.run_folder(temp_dir.path().to_path_buf(), false).await?;
    assert_eq!(summary, FolderSummary { translated: 1, skipped: 0, failed: 1 });
    Ok(())
}

#[test]
fn test_translate_text_shouldUseConfiguredTarget() {
    let mock = Arc::new(MockProvider::working().with_translation("Thanks", "고마워"));
    let controller = controller_with(mock);
    let translated = tokio_test::block_on(controller.translate_text("Thanks"));
    assert_eq!(translated, "고마워");
}
