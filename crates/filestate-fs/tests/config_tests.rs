use filestate_fs::ConfigStore;
use serde::Deserialize;
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Deserialize, PartialEq)]
struct TestConfig {
    name: String,
    count: i32,
}

fn load(file_name: &str, content: &str) -> filestate_fs::Result<TestConfig> {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join(file_name);
    fs::write(&file_path, content).unwrap();
    ConfigStore::new().load(&file_path)
}

#[test]
fn test_load_toml() {
    let config = load("config.toml", "name = \"test\"\ncount = 42").unwrap();
    assert_eq!(config, TestConfig { name: "test".into(), count: 42 });
}

#[test]
fn test_load_json() {
    let config = load("config.json", r#"{"name": "test", "count": 42}"#).unwrap();
    assert_eq!(config.count, 42);
}

#[test]
fn test_load_yaml() {
    let config = load("config.YML", "name: test\ncount: 42").unwrap();
    assert_eq!(config.name, "test");
}

#[test]
fn test_unsupported_format() {
    let result = load("config.xyz", "data");
    assert!(matches!(
        result,
        Err(filestate_fs::Error::UnsupportedFormat { .. })
    ));
}

#[test]
fn test_parse_error_names_format() {
    let err = load("config.toml", "name = ").unwrap_err();
    assert!(err.to_string().contains("TOML"), "got: {err}");
}
