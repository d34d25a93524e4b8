use super::*;
use crate::config::settings::HOME_ENV_VAR;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

const OFFLINE_CONFIG: &str = r#"
[ollama]
host = "127.0.0.1"
port = 9
retry_attempts = 1
timeout_seconds = 2
"#;

fn with_home<T>(home: &Path, f: impl FnOnce() -> T) -> T {
    // SAFETY: serialized with the other environment-mutating tests
    unsafe { std::env::set_var(HOME_ENV_VAR, home) };
    let result = f();
    unsafe { std::env::remove_var(HOME_ENV_VAR) };
    result
}

#[test]
#[serial]
fn status_fails_on_unreadable_config_without_creating_stores() {
    let home = TempDir::new().expect("should create temp dir");
    fs::write(home.path().join("config.toml"), "[ollama\nport = ")
        .expect("should write config");
    let cwd_store_existed = Path::new("vector_store").exists();
    let cwd_pdfs_existed = Path::new("pdfs").exists();

    let result = with_home(home.path(), show_status);

    assert!(result.is_err());
    assert!(!home.path().join("vector_store").exists());
    assert!(!home.path().join("pdfs").exists());
    assert_eq!(Path::new("vector_store").exists(), cwd_store_existed);
    assert_eq!(Path::new("pdfs").exists(), cwd_pdfs_existed);
}

#[test]
#[serial]
fn status_reports_against_configured_home() {
    let home = TempDir::new().expect("should create temp dir");
    fs::write(home.path().join("config.toml"), OFFLINE_CONFIG).expect("should write config");

    let result = with_home(home.path(), show_status);

    assert!(result.is_ok(), "status should succeed offline: {:?}", result);
    assert!(home.path().join("vector_store").is_dir());
    assert!(home.path().join("pdfs").is_dir());
}
