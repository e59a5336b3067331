use crate::fixtures::*;
use anchor_core::application::CycleOutcome;
use anchor_core::domain::Direction;
use anchor_core::foundation::{ContractAddress, ContractId};
use anchor_core::infrastructure::chain::memory::OracleDeployment;
use anchor_core::infrastructure::config::AppConfig;
use serde_json::json;

const DIRECTION: Direction = Direction::PrimaryToSecondary;

fn enable_updates(config: &mut AppConfig) {
    config.proposer.auto_update_enabled = true;
    config.proposer.oracle_update_enabled = true;
    config.validator.auto_update_enabled = true;
    config.validator.oracle_update_enabled = true;
}

#[tokio::test]
async fn anchor_period_change_is_pushed_on_chain() {
    let harness = BridgeHarness::with_config(3, enable_updates);
    harness.update_configs(|config| config.bridge.primary_to_secondary.t_anchor = 20);

    let mut proposer = harness.proposer(DIRECTION);
    proposer.check_settings().await;

    let oracle = harness.oracle(DIRECTION);
    assert_eq!(oracle.t_anchor, 20);
    assert_eq!(oracle.nonce, 1);
    let call = harness.secondary.calls().pop().expect("update call");
    assert_eq!(call.function, "tAnchorUpdate");
    assert_eq!(call.args[0], json!(20));
}

#[tokio::test]
async fn nothing_is_submitted_while_settings_match() {
    let harness = BridgeHarness::with_config(3, enable_updates);
    harness.proposer(DIRECTION).check_settings().await;
    assert!(harness.secondary.calls().is_empty());
}

#[tokio::test]
async fn settings_stay_put_when_auto_update_is_off() {
    let harness = BridgeHarness::new(3);
    harness.update_configs(|config| config.bridge.primary_to_secondary.t_final = 9);
    harness.proposer(DIRECTION).check_settings().await;
    assert_eq!(harness.oracle(DIRECTION).t_final, T_FINAL);
}

#[tokio::test]
async fn roster_growth_rebuilds_the_pool_before_the_next_anchor() {
    let mut harness = BridgeHarness::with_config(3, enable_updates);
    let mut proposer = harness.proposer(DIRECTION);
    assert_eq!(proposer.roster().len(), 3);

    let newcomer_config = (*harness.proposer_snapshot.load()).clone();
    harness.add_validator(signer(4), newcomer_config);
    harness.update_configs(|config| config.validators = roster_entries(&signers(4)));

    proposer.check_settings().await;
    assert_eq!(proposer.roster().len(), 4);

    let oracle = harness.oracle(DIRECTION);
    assert_eq!(oracle.validators, addresses(&signers(4)));
    assert_eq!(oracle.nonce, 1);

    // New roster of four: validators 1 and 2 alone are no longer enough.
    harness.finalize_source(DIRECTION, T_ANCHOR);
    harness.set_offline(3, true);
    harness.set_offline(4, true);
    assert!(proposer.run_cycle().await.is_err());

    harness.set_offline(4, false);
    let outcome = proposer.run_cycle().await.expect("anchor with new roster");
    assert!(matches!(outcome, CycleOutcome::Anchored { .. }));
    let call = harness.secondary.calls().pop().expect("anchor call");
    assert_eq!(call.args[2], json!([1, 2, 4]));
}

#[tokio::test]
async fn oracle_switch_redirects_later_anchors() {
    let harness = BridgeHarness::with_config(3, enable_updates);
    let replacement = ContractAddress::from("oracle.beta.v2");
    harness.secondary.deploy_oracle(OracleDeployment {
        oracle: replacement.clone(),
        contract_id: ContractId::from("oracle-44"),
        ..deployment_on_secondary(addresses(&signers(3)))
    });
    let next = replacement.clone();
    harness.update_configs(move |config| config.bridge.primary_to_secondary.oracle_address = next.clone());

    let mut proposer = harness.proposer(DIRECTION);
    proposer.check_settings().await;
    assert_eq!(harness.oracle(DIRECTION).bridge_oracle, replacement);

    harness.finalize_source(DIRECTION, T_ANCHOR);
    proposer.run_cycle().await.expect("anchor on the new oracle");
    let moved = harness.secondary.oracle_snapshot(&replacement).expect("replacement deployed");
    assert_eq!(moved.anchor_height, T_ANCHOR);
    assert_eq!(harness.oracle(DIRECTION).anchor_height, 0);
}

#[tokio::test]
async fn unreachable_new_roster_is_retried_and_other_updates_still_land() {
    let mut harness = BridgeHarness::with_config(3, enable_updates);
    let mut proposer = harness.proposer(DIRECTION);
    // Validator 4 is configured everywhere but not running yet.
    harness.update_configs(|config| {
        config.validators = roster_entries(&signers(4));
        config.bridge.primary_to_secondary.t_anchor = 20;
    });

    proposer.check_settings().await;
    let oracle = harness.oracle(DIRECTION);
    assert_eq!(oracle.t_anchor, 20);
    assert_eq!(oracle.validators, addresses(&signers(3)));
    assert_eq!(proposer.roster().len(), 3);

    let newcomer_config = (*harness.proposer_snapshot.load()).clone();
    harness.add_validator(signer(4), newcomer_config);
    proposer.check_settings().await;
    assert_eq!(harness.oracle(DIRECTION).validators, addresses(&signers(4)));
    assert_eq!(proposer.roster().len(), 4);
}
