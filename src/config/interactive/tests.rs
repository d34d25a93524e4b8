use super::load_existing_config as load_existing_config_impl;
use crate::config::settings::HOME_ENV_VAR;
use serial_test::serial;
use tempfile::TempDir;

#[test]
#[serial]
fn load_existing_config() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    // SAFETY: serialized with the other environment-mutating tests
    unsafe { std::env::set_var(HOME_ENV_VAR, temp_dir.path()) };

    let config = load_existing_config_impl();

    unsafe { std::env::remove_var(HOME_ENV_VAR) };

    let config = config.expect("config loaded successfully");
    assert_eq!(config.get_base_dir(), temp_dir.path());
    assert!(!config.ollama.host.is_empty());
    assert!(config.ollama.port > 0);
    assert!(!config.gemini.model.is_empty());
    assert!(config.retrieval.top_k > 0);
}

#[test]
fn unreachable_ollama_reports_failure() {
    let ollama = crate::config::OllamaConfig {
        host: "127.0.0.1".to_string(),
        port: 9,
        ..crate::config::OllamaConfig::default()
    };
    assert!(!super::test_ollama_connection(&ollama));
}
