//! Test helpers: in-memory state, a static owner directory, and canned registry setups.

use crate::{Deployment, Layer, OwnerQuery, State};
use anyhow::{anyhow, Result};
use commonware_cryptography::{
    ed25519::{PrivateKey, PublicKey},
    Signer,
};
use gamehub_types::registry::{GameStatus, PROPOSAL_FEE};
use gamehub_types::Address;
use std::collections::BTreeMap;

pub use crate::state::Memory;

/// Owner directory backed by a fixed map. Unknown scores fail like a contract without an owner
/// method would.
#[derive(Clone, Debug, Default)]
pub struct StaticOwners {
    owners: BTreeMap<Address, Address>,
}

impl StaticOwners {
    pub fn new(owners: BTreeMap<Address, Address>) -> Self {
        Self { owners }
    }

    pub fn with_owner(mut self, score: Address, owner: Address) -> Self {
        self.owners.insert(score, owner);
        self
    }
}

impl OwnerQuery for StaticOwners {
    async fn score_owner(&self, score: &Address) -> Result<Address> {
        self.owners
            .get(score)
            .copied()
            .ok_or_else(|| anyhow!("{score} does not expose an owner"))
    }
}

/// Wallet address with every body byte set to `n`.
pub fn wallet(n: u8) -> Address {
    Address::wallet([n; 20])
}

/// Contract address with every body byte set to `n`.
pub fn contract(n: u8) -> Address {
    Address::contract([n; 20])
}

pub fn deployment() -> Deployment {
    Deployment {
        owner: wallet(0xee),
        registry: contract(0xee),
    }
}

/// Creates an account keypair and the wallet address derived from it.
pub fn create_account_keypair(seed: u64) -> (PrivateKey, PublicKey, Address) {
    let private = PrivateKey::from_seed(seed);
    let public = private.public_key();
    let address = Address::from_public_key(&public);
    (private, public, address)
}

/// A complete, valid proposal payload for `score`.
pub fn sample_metadata(score: &Address, rev_share: &Address, max_payout: Option<u128>) -> String {
    let mut metadata = serde_json::json!({
        "name": format!("Game {}", &score.to_string()[..8]),
        "scoreAddress": score.to_string(),
        "minBet": 100_000_000_000_000_000u64,
        "maxBet": 10_000_000_000_000_000_000u64,
        "houseEdge": "2.7",
        "gameType": "Per wager settlement",
        "revShareMetadata": "",
        "revShareWalletAddress": rev_share.to_string(),
        "linkProofPage": "https://example.com/proof",
        "gameUrlMainnet": "https://example.com/game",
        "gameUrlTestnet": "https://test.example.com/game",
    });
    if let (Some(max_payout), Some(map)) = (max_payout, metadata.as_object_mut()) {
        // Amounts above u64 cannot be held by a JSON value; splice them in textually.
        map.insert("maxPayout".to_string(), serde_json::json!("MAX_PAYOUT"));
        return metadata
            .to_string()
            .replace("\"MAX_PAYOUT\"", &max_payout.to_string());
    }
    metadata.to_string()
}

/// Make `super_admin` the super admin and add `admins`.
pub async fn install_admins<S: State, O: OwnerQuery>(
    layer: &mut Layer<'_, S, O>,
    super_admin: &Address,
    admins: &[Address],
) {
    let owner = layer.deployment().owner;
    layer
        .set_super_admin(&owner, super_admin)
        .await
        .expect("set super admin");
    for admin in admins {
        layer
            .add_admin(super_admin, admin)
            .await
            .expect("add admin");
    }
}

/// Walk `score` through submission, review and deployment to `gameApproved`.
pub async fn approve_game<S: State, O: OwnerQuery>(
    layer: &mut Layer<'_, S, O>,
    admin: &Address,
    owner: &Address,
    score: &Address,
    max_payout: Option<u128>,
) {
    let metadata = sample_metadata(score, owner, max_payout);
    layer
        .submit_proposal(owner, &metadata, PROPOSAL_FEE)
        .await
        .expect("submit proposal");
    layer
        .set_game_status(admin, GameStatus::ProposalApproved, score)
        .await
        .expect("approve proposal");
    layer
        .set_game_ready(owner, score)
        .await
        .expect("mark ready");
    layer
        .set_game_status(admin, GameStatus::GameApproved, score)
        .await
        .expect("approve game");
}
