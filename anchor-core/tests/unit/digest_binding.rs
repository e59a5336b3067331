use anchor_core::domain::digest::{anchor_proposal_digest, setting_digest};
use anchor_core::domain::{AnchorProposal, SettingChange, SettingProposal, TempoKind};
use anchor_core::foundation::{ContractAddress, ContractId, StateRoot};

fn anchor(height: u64, nonce: u64) -> AnchorProposal {
    AnchorProposal { source_is_primary: true, state_root: StateRoot::from([0x11; 32]), height, destination_nonce: nonce }
}

#[test]
fn anchor_proposal_digest_matches_the_pinned_vector() {
    let digest = anchor_proposal_digest(&anchor(1000, 7), &ContractId::from("oracle-42"));
    assert_eq!(digest.to_hex(), "f51be35ef2940a316bd0aa7d7be042d84b9d42708f2f340c07e6440d790c53e7");
}

#[test]
fn digest_binds_the_destination_oracle() {
    let proposal = anchor(1000, 7);
    assert_ne!(
        anchor_proposal_digest(&proposal, &ContractId::from("oracle-42")),
        anchor_proposal_digest(&proposal, &ContractId::from("oracle-43"))
    );
}

#[test]
fn direction_flag_is_not_part_of_the_digest() {
    let forward = anchor(1000, 7);
    let backward = AnchorProposal { source_is_primary: false, ..forward.clone() };
    let id = ContractId::from("oracle-42");
    assert_eq!(anchor_proposal_digest(&forward, &id), anchor_proposal_digest(&backward, &id));
}

#[test]
fn setting_kinds_never_share_a_digest() {
    let id = ContractId::from("oracle-42");
    let proposal = |change| SettingProposal { source_is_primary: true, destination_nonce: 3, change };
    let t_anchor = setting_digest(&proposal(SettingChange::NewTempo { kind: TempoKind::Anchor, value: 25 }), &id);
    let t_final = setting_digest(&proposal(SettingChange::NewTempo { kind: TempoKind::Final, value: 25 }), &id);
    let oracle = setting_digest(&proposal(SettingChange::NewOracle(ContractAddress::from("25"))), &id);
    assert_ne!(t_anchor, t_final);
    assert_ne!(t_anchor, oracle);
    assert_eq!(t_anchor.to_hex(), "c22a5d83c03bda48c9628fd07b10f767d8cef8baadcffe312537d04e25f55a41");
}
