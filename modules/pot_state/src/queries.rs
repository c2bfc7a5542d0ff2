//! Paginated reward views. Pages start at 1; a page past the end, a page of
//! zero or an unusable limit all yield an empty list.

use std::collections::BTreeSet;

use sds_common::{pagination::page_of, AccAddress, Coin};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::PotError,
    state::State,
    types::{NodeRewardsInfo, Reward},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodesRewardsQuery {
    pub page: usize,
    pub limit: usize,
    /// Only this reward wallet; every wallet when absent
    pub node_address: Option<AccAddress>,
    pub epoch: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochRewardsQuery {
    pub page: usize,
    pub limit: usize,
    /// Only nodes of this owner; every registered node when absent
    pub owner_address: Option<AccAddress>,
    pub epoch: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRewardsQuery {
    pub page: usize,
    pub limit: usize,
    pub owner_address: AccAddress,
}

impl State {
    /// Reward summaries of wallets holding reward records at `epoch`
    pub fn get_nodes_rewards(
        &self,
        query: &NodesRewardsQuery,
    ) -> Result<Vec<NodeRewardsInfo>, PotError> {
        let mut infos = Vec::new();
        for wallet in self.get_reward_address_pool()? {
            if query.node_address.is_some_and(|filter| filter != wallet) {
                continue;
            }
            infos.push(self.node_rewards_info(wallet, query.epoch)?);
        }
        Ok(self.page(infos, query.page, query.limit))
    }

    /// Rewards of `epoch` earned by nodes of the requested owner
    pub fn get_pot_rewards_by_epoch(
        &self,
        query: &EpochRewardsQuery,
    ) -> Result<Vec<Reward>, PotError> {
        let owned = self.owned_reward_addresses(query.owner_address.as_ref())?;
        let rewards: Vec<Reward> = self
            .get_epoch_rewards(query.epoch)?
            .into_iter()
            .filter(|reward| owned.contains(&reward.node_address))
            .collect();
        debug!(
            epoch = query.epoch,
            matched = rewards.len(),
            "filtered epoch rewards by owner"
        );
        Ok(self.page(rewards, query.page, query.limit))
    }

    /// Reward summaries of the owner's nodes at the last matured epoch
    pub fn get_nodes_rewards_by_owner(
        &self,
        query: &OwnerRewardsQuery,
    ) -> Result<Vec<NodeRewardsInfo>, PotError> {
        let owned = self.owned_reward_addresses(Some(&query.owner_address))?;
        let epoch = self.last_matured_epoch()?;
        let mut infos = Vec::new();
        for wallet in self.get_reward_address_pool()? {
            if owned.contains(&wallet) {
                infos.push(self.node_rewards_info(wallet, epoch)?);
            }
        }
        Ok(self.page(infos, query.page, query.limit))
    }

    fn node_rewards_info(&self, wallet: AccAddress, epoch: u64) -> Result<NodeRewardsInfo, PotError> {
        let denom = self.config().reward_denom.as_str();
        let individual = self
            .get_individual_reward(&wallet, epoch)?
            .map(|reward| reward.total().amount_of(denom))
            .unwrap_or(0);
        let mature = self.get_mature_total_reward(&wallet)?.amount_of(denom);
        let immature = self.get_immature_total_reward(&wallet)?.amount_of(denom);
        Ok(NodeRewardsInfo {
            node_address: wallet,
            epoch,
            individual_rewards: Coin::new(denom, individual),
            mature_total: Coin::new(denom, mature),
            immature_total: Coin::new(denom, immature),
        })
    }

    fn owned_reward_addresses(
        &self,
        owner: Option<&AccAddress>,
    ) -> Result<BTreeSet<AccAddress>, PotError> {
        self.peers.reward_addresses_owned_by(owner).map_err(PotError::Peers)
    }

    fn page<T>(&self, items: Vec<T>, page: usize, limit: usize) -> Vec<T> {
        page_of(items, page, limit, self.config().query_default_limit)
    }
}
