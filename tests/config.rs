use std::fs;

use pixelpet::models::Settings;
use pixelpet::utils::config::{read_settings, resolve_timezone, write_settings};

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = read_settings(&dir.path().join("absent.json")).unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.api.base_url, "http://localhost:5000");
    assert_eq!(settings.dashboard.upcoming_limit, 3);
}

#[test]
fn partial_file_keeps_other_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(
        &path,
        r#"{"session": {"access_token": "abc"}, "dashboard": {"timezone": "Europe/Berlin"}}"#,
    )
    .unwrap();

    let settings = read_settings(&path).unwrap();
    assert_eq!(settings.session.access_token, "abc");
    assert_eq!(settings.dashboard.poll_interval_secs, 30);
    assert!(settings.notifications.enabled);
    assert_eq!(resolve_timezone(&settings).unwrap(), Some(chrono_tz::Europe::Berlin));
}

#[test]
fn written_settings_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.json");
    let mut settings = Settings::default();
    settings.notifications.muted_events = vec!["task_updated".into()];

    write_settings(&path, &settings).unwrap();
    assert_eq!(read_settings(&path).unwrap(), settings);
}

#[test]
fn broken_file_and_bad_zone_are_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "{not json").unwrap();
    assert!(read_settings(&path).is_err());

    let mut settings = Settings::default();
    settings.dashboard.timezone = Some("Mars/Olympus".into());
    assert!(resolve_timezone(&settings).is_err());
    settings.dashboard.timezone = Some("  ".into());
    assert_eq!(resolve_timezone(&settings).unwrap(), None);
}
