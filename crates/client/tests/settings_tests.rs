use mtxpanel_client::settings::{PanelSettings, SettingsError, SettingsStore, Theme};

#[test]
fn missing_file_loads_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::new(dir.path().join("settings.toml"));
    let settings = store.load().unwrap();
    assert_eq!(settings.api_url, "http://localhost:9997");
    assert_eq!(settings.auto_refresh_interval_ms, 5000);
    assert!(!store.path().exists());
}

#[test]
fn save_creates_parent_and_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::new(dir.path().join("nested").join("mtxpanel").join("settings.toml"));

    let mut settings = PanelSettings::default();
    settings.set_api_url("http://10.0.0.2:9997").unwrap();
    settings.theme = Theme::Dark;
    settings.notifications_enabled = true;
    store.save(&settings).unwrap();

    assert_eq!(store.load().unwrap(), settings);
    let raw = std::fs::read_to_string(store.path()).unwrap();
    assert!(raw.contains(r#"theme = "dark""#));
}

#[test]
fn update_persists_only_valid_changes() {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::new(dir.path().join("settings.toml"));

    let saved = store.update(|s| s.set_auto_refresh_interval(1500)).unwrap();
    assert_eq!(saved.auto_refresh_interval_ms, 1500);

    let err = store.update(|s| s.set_api_url("ws://nope")).unwrap_err();
    assert!(matches!(err, SettingsError::InvalidApiUrl(_)));
    assert_eq!(store.load().unwrap().api_url, "http://localhost:9997");
}

#[test]
fn malformed_file_is_reported_with_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "api_url = [").unwrap();

    let err = SettingsStore::new(&path).load().unwrap_err();
    assert!(matches!(err, SettingsError::Parse { .. }));
    assert!(err.to_string().contains("settings.toml"));
}
