//! Configuration document persistence and validation.

use pwmconv_engine::{EngineConfig, SCHEMA_VERSION, SignalLossPolicy};
use pwmconv_errors::{ErrorCategory, Result};

#[test]
fn snapshot_default_config() -> Result<()> {
    insta::assert_snapshot!("default_config", EngineConfig::default().to_json()?);
    Ok(())
}

#[test]
fn load_creates_default_when_missing() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("pwmconv.json");

    let config = EngineConfig::load_from_path(&path)?;
    assert_eq!(config, EngineConfig::default());
    assert!(path.exists());
    Ok(())
}

#[test]
fn save_then_load_keeps_edits() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("pwmconv.json");

    let mut config = EngineConfig::default();
    config.gate.on_signal_loss = SignalLossPolicy::Stop;
    config.wizard.max_polls_per_gate = Some(200);
    config.mixer.pan_trigger = 35;
    config.save_to_path(&path)?;

    let loaded = EngineConfig::load_from_path(&path)?;
    assert_eq!(loaded, config);
    loaded.validate()?;
    Ok(())
}

#[test]
fn malformed_document_is_a_config_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("pwmconv.json");
    std::fs::write(&path, "{ \"schema_version\": \"pwmconv.config/1\" }")?;

    let err = EngineConfig::load_from_path(&path).err();
    assert_eq!(err.map(|e| e.category()), Some(ErrorCategory::Config));
    Ok(())
}

#[test]
fn legacy_document_migrates() -> Result<()> {
    let legacy = EngineConfig::default()
        .to_json()?
        .replace(SCHEMA_VERSION, "pwmconv.config/0");

    let mut config = EngineConfig::from_json(&legacy)?;
    assert!(config.migrate()?);
    assert_eq!(config.schema_version, SCHEMA_VERSION);
    config.validate()?;
    Ok(())
}

#[test]
fn validation_errors_are_classified() {
    let mut config = EngineConfig::default();
    config.output.frequency_hz = 0;
    let err = config.validate().err();
    assert_eq!(err.map(|e| e.category()), Some(ErrorCategory::Validation));
}

#[test]
fn unknown_schema_tag_is_rejected_as_invalid_format() -> Result<()> {
    let future = EngineConfig::default()
        .to_json()?
        .replace(SCHEMA_VERSION, "pwmconv.config/7");

    let mut config = EngineConfig::from_json(&future)?;
    let err = config.migrate().err();
    assert_eq!(err.as_ref().map(|e| e.category()), Some(ErrorCategory::Validation));
    assert!(err.is_some_and(|e| e.to_string().contains("schema_version")));
    Ok(())
}
