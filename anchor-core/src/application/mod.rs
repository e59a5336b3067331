//! Application layer: orchestration across domain logic and infrastructure I/O.

pub mod approval;
pub mod chains;
pub mod client;
pub mod events;
pub mod gather;
pub mod lifecycle;
pub mod proposer;
pub mod settings_monitor;
pub mod snapshot;
pub mod startup;
pub mod submission;

pub use approval::{configured_settings, ValidatorApprovalService};
pub use chains::BridgeChains;
pub use client::{LocalValidatorClient, SettingRequest, ValidatorClient, ValidatorClientFactory};
pub use events::watch_anchor_events;
pub use gather::ValidatorPool;
pub use lifecycle::{AnchorState, NoopObserver, ProposerObserver};
pub use proposer::{CycleOutcome, ProposerAnchorLoop};
pub use settings_monitor::{SettingsMonitor, SettingsReport};
pub use snapshot::{reload_periodically, ConfigSnapshot, ConfigSource};
pub use startup::verify_validator_membership;
