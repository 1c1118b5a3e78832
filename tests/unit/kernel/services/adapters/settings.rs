use super::*;
use crate::kernel::services::ports::settings::AutosaveMode;
use tempfile::tempdir;

#[test]
fn test_missing_files_load_defaults() {
    let dir = tempdir().unwrap();
    let store = SettingsStore::new(dir.path().join("cfg"));
    assert_eq!(store.settings(), &Settings::default());
    assert!(store.history().entries.is_empty());
}

#[test]
fn test_malformed_settings_soft_fail() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join(SETTINGS_FILE), "{ not json").unwrap();
    std::fs::write(dir.path().join(HISTORY_FILE), "[1, 2]").unwrap();

    let store = SettingsStore::new(dir.path());
    assert_eq!(store.settings(), &Settings::default());
    assert!(store.history().entries.is_empty());
}

#[test]
fn test_update_writes_back() {
    let dir = tempdir().unwrap();
    let mut store = SettingsStore::new(dir.path().join("nested"));
    store
        .update(|s| {
            s.autosave.mode = AutosaveMode::OnFocusChange;
            s.search.max_results = 50;
        })
        .unwrap();
    assert!(store.settings_path().exists());

    let reopened = SettingsStore::new(dir.path().join("nested"));
    assert_eq!(reopened.settings().autosave.mode, AutosaveMode::OnFocusChange);
    assert_eq!(reopened.settings().search.max_results, 50);
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join(SETTINGS_FILE),
        r#"{"autosave": {"mode": "off"}}"#,
    )
    .unwrap();

    let store = SettingsStore::new(dir.path());
    assert_eq!(store.settings().autosave.mode, AutosaveMode::Off);
    assert_eq!(store.settings().autosave.delay_ms, 1000);
    assert_eq!(store.settings().editor.theme, "dark");
}

#[test]
fn test_record_command_persists_history() {
    let dir = tempdir().unwrap();
    let mut store = SettingsStore::new(dir.path());
    store.record_command_at("workspace.search", 100).unwrap();
    store.record_command_at("workspace.search", 200).unwrap();
    store.record_command_at("workspace.save", 150).unwrap();

    let mut reopened = SettingsStore::new(dir.path());
    assert_eq!(
        reopened.history().recent(5),
        vec!["workspace.search", "workspace.save"]
    );
    assert_eq!(reopened.history().usage("workspace.search").unwrap().count, 2);

    std::fs::remove_file(reopened.history_path()).unwrap();
    reopened.reload();
    assert!(reopened.history().entries.is_empty());
}
