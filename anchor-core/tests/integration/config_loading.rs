use crate::fixtures::*;
use anchor_core::application::{configured_settings, ConfigSource};
use anchor_core::domain::{DigestSigner, Direction};
use anchor_core::foundation::BridgeError;
use anchor_core::infrastructure::config::{load_app_config_from, ConfigLocation, DEFAULT_CONFIG_FILE};
use std::fmt::Write as _;
use tempfile::TempDir;

fn config_file(validators: usize, t_anchor: u64) -> String {
    let mut toml = format!(
        r#"
[bridge.primary]
name = "{PRIMARY_CHAIN}"
rpc_url = "http://127.0.0.1:7845"
block_time_ms = 500

[bridge.secondary]
name = "{SECONDARY_CHAIN}"
rpc_url = "http://127.0.0.1:8845"

[bridge.primary_to_secondary]
bridge_address = "{BRIDGE_ON_SECONDARY}"
oracle_address = "{ORACLE_ON_SECONDARY}"
t_anchor = {t_anchor}
t_final = {T_FINAL}

[bridge.secondary_to_primary]
bridge_address = "{BRIDGE_ON_PRIMARY}"
oracle_address = "{ORACLE_ON_PRIMARY}"
t_anchor = {t_anchor}
t_final = {T_FINAL}

[proposer]
auto_update_enabled = true

[profiles.validator-2.rpc]
addr = "127.0.0.1:9842"
"#
    );
    for (i, signer) in signers(validators).iter().enumerate() {
        let _ = write!(toml, "\n[[validators]]\naddress = \"{}\"\nendpoint = \"http://127.0.0.1:{}\"\n", signer.address(), 9841 + i);
    }
    toml
}

#[test]
fn full_file_loads_and_validates() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join(DEFAULT_CONFIG_FILE);
    std::fs::write(&path, config_file(3, 25)).expect("write config");

    let config = load_app_config_from(&path, dir.path(), Some("validator-2")).expect("valid config");
    assert_eq!(config.validators.len(), 3);
    assert_eq!(config.rpc.addr, "127.0.0.1:9842");
    assert_eq!(config.block_time_ms(Direction::PrimaryToSecondary), 500);
    assert!(config.proposer.auto_update_enabled);

    let settings = configured_settings(&config, Direction::SecondaryToPrimary);
    assert_eq!(settings.t_anchor, 25);
    assert_eq!(settings.validators, addresses(&signers(3)));
}

#[test]
fn validation_failures_are_reported_together() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join(DEFAULT_CONFIG_FILE);
    std::fs::write(&path, config_file(0, 0)).expect("write config");

    let err = load_app_config_from(&path, dir.path(), None).unwrap_err();
    let BridgeError::ConfigError(message) = err else {
        panic!("expected a config error");
    };
    assert!(message.contains("t_anchor must be > 0"));
    assert!(message.contains("validators must not be empty"));
}

#[test]
fn location_reload_sees_file_changes() {
    let dir = TempDir::new().expect("temp dir");
    let location = ConfigLocation { path: dir.path().join(DEFAULT_CONFIG_FILE), data_dir: dir.path().to_path_buf(), profile: None };
    std::fs::write(&location.path, config_file(3, 25)).expect("write config");
    let source: &dyn ConfigSource = &location;
    assert_eq!(source.load().unwrap().bridge.primary_to_secondary.t_anchor, 25);

    std::fs::write(&location.path, config_file(3, 40)).expect("rewrite config");
    assert_eq!(source.load().unwrap().bridge.primary_to_secondary.t_anchor, 40);
}
