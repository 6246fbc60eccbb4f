//! Integration tests for the configuration system

use lepkehalo_config::{
    apply_overrides_from, AppConfig, CatalogConfig, Config, ConfigManager, ConfigSection,
    LogLevel, StorageConfig, CONFIG_VERSION, ENV_API_BASE, ENV_API_KEY, ENV_DATA_DIR,
};
use lepkehalo_core::{AppError, RecoveryAction};
use std::path::PathBuf;
use tempfile::TempDir;

fn setup_test_manager() -> Result<(TempDir, ConfigManager), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf());
    Ok((temp_dir, manager))
}

#[test]
fn test_full_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;

    let created = manager.initialize()?;
    assert!(created);

    let config = manager.load()?;
    assert_eq!(config.version, CONFIG_VERSION);

    let mut modified = config.clone();
    modified.app.log_level = LogLevel::Debug;
    modified.catalog.api_key = "prod-key".to_string();
    modified.storage.data_dir = Some(PathBuf::from("/data/lepkehalo"));
    manager.save(&modified)?;

    let reloaded = manager.load()?;
    assert_eq!(reloaded, modified);

    assert!(!manager.initialize()?);
    assert_eq!(manager.load()?, modified);

    Ok(())
}

#[test]
fn test_config_validation_integration() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;

    manager.save(&Config::default())?;

    let mut invalid = Config::default();
    invalid.catalog.timeout_ms = CatalogConfig::MAX_TIMEOUT_MS + 1;
    assert!(manager.save(&invalid).is_err());

    // The previous file is left untouched
    assert_eq!(manager.load()?, Config::default());

    Ok(())
}

#[test]
fn test_save_replaces_file_whole() -> Result<(), Box<dyn std::error::Error>> {
    let (temp_dir, manager) = setup_test_manager()?;

    let mut config = Config::default();
    manager.save(&config)?;
    config.catalog.api_key = "second".to_string();
    manager.save(&config)?;

    assert_eq!(manager.load()?.catalog.api_key, "second");
    let entries = std::fs::read_dir(temp_dir.path())?.count();
    assert_eq!(entries, 1);

    Ok(())
}

#[test]
fn test_all_sections_default_are_valid() {
    assert!(AppConfig::default().validate().is_ok());
    assert!(CatalogConfig::default().validate().is_ok());
    assert!(StorageConfig::default().validate().is_ok());
    assert!(Config::default().validate().is_ok());
}

#[test]
fn test_defaults_match_public_endpoints() {
    let config = Config::default();
    assert_eq!(config.catalog.api_base, "https://moly.hu/api");
    assert_eq!(config.catalog.book_url_base, "https://moly.hu/konyvek");
    assert_eq!(config.catalog.api_key, "dev-api-key");
    assert_eq!(config.catalog.timeout_ms, 10_000);
    assert_eq!(config.storage.books_key, "books");
}

#[test]
fn test_timeout_boundaries() {
    let mut config = Config::default();

    config.catalog.timeout_ms = CatalogConfig::MIN_TIMEOUT_MS;
    assert!(config.validate().is_ok());
    config.catalog.timeout_ms = CatalogConfig::MAX_TIMEOUT_MS;
    assert!(config.validate().is_ok());

    config.catalog.timeout_ms = CatalogConfig::MIN_TIMEOUT_MS - 1;
    assert!(config.validate().is_err());
}

#[test]
fn test_corrupted_config_recovers_with_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    std::fs::write(manager.config_path(), "version = \"one\"\n[[[")?;

    let err = AppError::from(manager.load().unwrap_err());
    assert!(matches!(err, AppError::ConfigurationCorrupted { .. }));
    assert_eq!(err.recovery_action(), RecoveryAction::UseDefaults);

    Ok(())
}

#[test]
fn test_unknown_keys_are_ignored() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    std::fs::write(
        manager.config_path(),
        "version = 1\n[scanner]\nbeep = true\n[catalog]\napi_key = \"k\"\n",
    )?;

    let config = manager.load()?;
    assert_eq!(config.catalog.api_key, "k");

    Ok(())
}

#[test]
fn test_log_level_is_lowercase_in_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::default();
    config.app.log_level = LogLevel::Trace;

    let text = toml::to_string(&config)?;
    assert!(text.contains("log_level = \"trace\""));
    assert!(!text.contains("data_dir"));

    Ok(())
}

#[test]
fn test_env_overrides_over_file() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;

    let mut saved = Config::default();
    saved.catalog.api_key = "from-file".to_string();
    manager.save(&saved)?;

    let mut config = manager.load()?;
    apply_overrides_from(&mut config, |name| match name {
        n if n == ENV_API_KEY => Some("from-env".to_string()),
        n if n == ENV_DATA_DIR => Some("/env/data".to_string()),
        _ => None,
    });

    assert_eq!(config.catalog.api_key, "from-env");
    assert_eq!(config.catalog.api_base, "https://moly.hu/api");
    assert_eq!(manager.data_dir(&config), PathBuf::from("/env/data"));

    Ok(())
}

#[test]
fn test_env_override_names() {
    assert_eq!(ENV_API_KEY, "LEPKEHALO_MOLY_API_KEY");
    assert_eq!(ENV_API_BASE, "LEPKEHALO_MOLY_API_BASE");
    assert_eq!(ENV_DATA_DIR, "LEPKEHALO_DATA_DIR");
}

#[test]
fn test_rapid_saves() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;

    for i in 0..20u64 {
        let mut config = Config::default();
        config.catalog.timeout_ms = 1_000 + i;
        manager.save(&config)?;
    }

    assert_eq!(manager.load()?.catalog.timeout_ms, 1_019);
    Ok(())
}

#[test]
fn test_concurrent_config_loads() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let config_dir = temp_dir.path().to_path_buf();
    let manager = ConfigManager::with_directory(config_dir.clone());
    manager.initialize()?;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let dir = config_dir.clone();
            std::thread::spawn(move || {
                let mgr = ConfigManager::with_directory(dir);
                for _ in 0..10 {
                    assert!(mgr.load().is_ok());
                }
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().is_ok());
    }

    Ok(())
}

#[test]
fn test_serialization_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
    let original = Config::default();
    let toml_string = toml::to_string(&original)?;
    let deserialized: Config = toml::from_str(&toml_string)?;
    assert_eq!(original, deserialized);
    Ok(())
}
