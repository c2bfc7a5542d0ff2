use std::collections::BTreeMap;

use sds_common::{AccAddress, Coin, Coins, Hash, SdsAddress};
use serde::{Deserialize, Serialize};

/// Reward credited to one node wallet for one epoch
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    minicbor::Encode,
    minicbor::Decode,
)]
pub struct Reward {
    /// Wallet derived from the node's public key
    #[n(0)]
    pub node_address: AccAddress,
    #[n(1)]
    pub reward_from_mining_pool: Coins,
    #[n(2)]
    pub reward_from_traffic_pool: Coins,
}

impl Reward {
    pub fn new(
        node_address: AccAddress,
        reward_from_mining_pool: Coins,
        reward_from_traffic_pool: Coins,
    ) -> Self {
        Self {
            node_address,
            reward_from_mining_pool,
            reward_from_traffic_pool,
        }
    }

    /// Both pools combined
    pub fn total(&self) -> Coins {
        let mut total = self.reward_from_mining_pool.clone();
        for coin in self.reward_from_traffic_pool.iter() {
            total.add(coin);
        }
        total
    }
}

/// The usage report an epoch was closed with
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    minicbor::Encode,
    minicbor::Decode,
)]
pub struct VolumeReportRecord {
    #[n(0)]
    pub reporter: SdsAddress,
    #[n(1)]
    pub reporter_owner: AccAddress,
    #[n(2)]
    pub tx_hash: Hash<32>,
}

/// Everything an epoch close writes, applied by [`crate::State::record_epoch`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochSettlement {
    pub epoch: u64,
    /// Tokens minted for this epoch; added to the running total
    pub mined_tokens: Coin,
    pub individual_rewards: Vec<Reward>,
    /// New mature totals, replacing the stored ones
    pub mature_totals: BTreeMap<AccAddress, Coins>,
    /// New immature totals, replacing the stored ones
    pub immature_totals: BTreeMap<AccAddress, Coins>,
    pub volume_report: VolumeReportRecord,
}

/// Reward summary of one wallet, all amounts in the reward denomination
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRewardsInfo {
    pub node_address: AccAddress,
    pub epoch: u64,
    pub individual_rewards: Coin,
    pub mature_total: Coin,
    pub immature_total: Coin,
}
