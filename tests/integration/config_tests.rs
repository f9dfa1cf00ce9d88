use super::ENV_MUTEX;
use dupdirs::config::Config;
use dupdirs::scanner::SizeFormat;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert!(!config.show_size_in_bytes);
    assert!(config.remember_roots);
    assert!(config.compute_sizes);
    assert_eq!(config.max_recent_dirs, None);
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
show_size_in_bytes = true
max_recent_dirs = 5
skip_hidden = true
"#,
    )
    .unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();

    assert_eq!(config.size_format(), SizeFormat::Bytes);
    assert_eq!(config.max_recent_dirs, Some(5));
    assert!(config.skip_hidden);
    // Unset keys keep their defaults
    assert!(!config.follow_symlinks);
    assert!(config.remember_roots);
}

#[test]
fn test_env_overrides_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "max_recent_dirs = 5\nfollow_symlinks = false\n").unwrap();

    std::env::set_var("DUPDIRS_MAX_RECENT_DIRS", "9");
    std::env::set_var("DUPDIRS_FOLLOW_SYMLINKS", "true");

    let config = Config::load_from_path(&config_path);

    std::env::remove_var("DUPDIRS_MAX_RECENT_DIRS");
    std::env::remove_var("DUPDIRS_FOLLOW_SYMLINKS");

    let config = config.unwrap();
    assert_eq!(config.max_recent_dirs, Some(9));
    assert!(config.follow_symlinks);
}

#[test]
fn test_env_layer_alone() {
    let _lock = ENV_MUTEX.lock().unwrap();
    std::env::set_var("DUPDIRS_REMEMBER_ROOTS", "false");

    let config: Result<Config, _> = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("DUPDIRS_"))
        .extract();

    std::env::remove_var("DUPDIRS_REMEMBER_ROOTS");
    assert!(!config.unwrap().remember_roots);
}

#[test]
fn test_missing_file_contributes_nothing() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let temp_dir = tempdir().unwrap();
    let config = Config::load_from_path(&temp_dir.path().join("absent.toml")).unwrap();
    assert!(config.compute_sizes);
    assert!(!config.skip_hidden);
}

#[test]
fn test_malformed_file_is_an_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "max_recent_dirs = \"many\"\n").unwrap();

    assert!(Config::load_from_path(&config_path).is_err());
}

#[test]
fn test_config_serializes_to_toml() {
    let config = Config {
        max_recent_dirs: Some(3),
        ..Config::default()
    };
    let text = toml::to_string(&config).unwrap();
    assert!(text.contains("max_recent_dirs = 3"));

    let unset = toml::to_string(&Config::default()).unwrap();
    assert!(!unset.contains("max_recent_dirs"));
}
