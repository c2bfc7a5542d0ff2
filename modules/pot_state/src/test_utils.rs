use std::{collections::BTreeMap, sync::Arc};

use anyhow::Result;
use sds_common::{
    peers::{NodeSummary, PeerRegistry},
    stores::InMemoryStore,
    AccAddress, Amount, Coin, Coins, Hash, SdsAddress,
};

use crate::{
    config::PotConfig,
    state::State,
    types::{EpochSettlement, Reward, VolumeReportRecord},
};

pub const DENOM: &str = "ustos";

pub fn wallet(n: u8) -> AccAddress {
    AccAddress::new([n; 20])
}

pub fn coins(amount: Amount) -> Coins {
    Coins::new(vec![Coin::new(DENOM, amount)])
}

/// Resource node `n` owned by `owner`, earning into [`wallet`]`(n)`
pub fn peer(n: u8, owner: u8) -> NodeSummary {
    NodeSummary {
        network_address: SdsAddress::new([n; 20]),
        owner_address: AccAddress::new([owner; 20]),
        reward_address: wallet(n),
    }
}

/// Epoch close rewarding each wallet `n` with `10n` mined and `n` traffic
/// tokens, a mature total of `100n` and an immature total of `n`
pub fn settlement(epoch: u64, mined: Amount, wallets: &[u8]) -> EpochSettlement {
    let mut mature_totals = BTreeMap::new();
    let mut immature_totals = BTreeMap::new();
    let mut individual_rewards = Vec::new();
    for &n in wallets {
        let n_amount = Amount::from(n);
        individual_rewards.push(Reward::new(wallet(n), coins(10 * n_amount), coins(n_amount)));
        mature_totals.insert(wallet(n), coins(100 * n_amount));
        immature_totals.insert(wallet(n), coins(n_amount));
    }
    EpochSettlement {
        epoch,
        mined_tokens: Coin::new(DENOM, mined),
        individual_rewards,
        mature_totals,
        immature_totals,
        volume_report: VolumeReportRecord {
            reporter: SdsAddress::new([0xaa; 20]),
            reporter_owner: AccAddress::new([0xbb; 20]),
            tx_hash: Hash::new([epoch as u8; 32]),
        },
    }
}

#[derive(Default)]
pub struct FixedPeers {
    pub resource: Vec<NodeSummary>,
}

impl PeerRegistry for FixedPeers {
    fn list_all_resource_nodes(&self) -> Result<Vec<NodeSummary>> {
        Ok(self.resource.clone())
    }

    fn list_all_indexing_nodes(&self) -> Result<Vec<NodeSummary>> {
        Ok(Vec::new())
    }
}

/// Pot state over an in-memory store
pub struct TestPot {
    pub state: State,
}

impl TestPot {
    pub fn new(resource: Vec<NodeSummary>) -> Self {
        Self::with_config(resource, PotConfig::default())
    }

    pub fn with_mature_epoch(resource: Vec<NodeSummary>, mature_epoch: u64) -> Self {
        Self::with_config(
            resource,
            PotConfig {
                mature_epoch,
                ..PotConfig::default()
            },
        )
    }

    fn with_config(resource: Vec<NodeSummary>, config: PotConfig) -> Self {
        let state = State::new(
            config,
            Arc::new(InMemoryStore::new()),
            Arc::new(FixedPeers { resource }),
        );
        Self { state }
    }
}
