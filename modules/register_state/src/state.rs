//! SDS register state: stake transitions over the node registry and pools

use std::sync::Arc;

use sds_common::{
    funds::{AccountDirectory, FundsLedger},
    stores::{Store, WriteBatch},
    AccAddress, Amount, Coin, PubKey, SdsAddress,
};
use tracing::{error, info, warn};

use crate::{
    config::RegisterConfig,
    error::RegisterError,
    policy::{CapacityPolicy, LinearCapacity, NoSlashing, SlashingPolicy},
    registry::NodeRegistry,
    token_pool::{PoolBalances, TokenPool},
    types::{Description, NodeStatus, NodeType, ResourceNode, StakeTransition},
};

/// Outcome of moving a node into Unbonding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnbondingStarted {
    /// Capacity the withdrawn stake no longer backs
    pub capacity_change: Amount,
    /// When the external completion step may release the stake, in Unix seconds
    pub completion_time: u64,
}

pub struct State {
    config: RegisterConfig,
    store: Arc<dyn Store>,
    registry: NodeRegistry,
    pool: TokenPool,
    funds: Arc<dyn FundsLedger>,
    accounts: Arc<dyn AccountDirectory>,
    slashing: Box<dyn SlashingPolicy>,
    capacity: Box<dyn CapacityPolicy>,
}

impl State {
    pub fn new(
        config: RegisterConfig,
        store: Arc<dyn Store>,
        funds: Arc<dyn FundsLedger>,
        accounts: Arc<dyn AccountDirectory>,
    ) -> Self {
        Self {
            registry: NodeRegistry::new(store.clone(), config.node_cache_size),
            pool: TokenPool::new(store.clone(), config.bond_denom.as_str()),
            config,
            store,
            funds,
            accounts,
            slashing: Box::new(NoSlashing),
            capacity: Box::new(LinearCapacity::default()),
        }
    }

    pub fn with_slashing_policy(mut self, slashing: impl SlashingPolicy + 'static) -> Self {
        self.slashing = Box::new(slashing);
        self
    }

    pub fn with_capacity_policy(mut self, capacity: impl CapacityPolicy + 'static) -> Self {
        self.capacity = Box::new(capacity);
        self
    }

    pub fn config(&self) -> &RegisterConfig {
        &self.config
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn pool(&self) -> &TokenPool {
        &self.pool
    }

    pub fn get_node(&self, address: &SdsAddress) -> Result<Option<ResourceNode>, RegisterError> {
        Ok(self.registry.get(address)?)
    }

    /// Creates an unbonded node without stake and stakes `stake` on it.
    /// Returns the capacity change bought by the stake.
    pub fn register(
        &self,
        network_address: SdsAddress,
        pub_key: PubKey,
        owner: AccAddress,
        description: Description,
        node_type: NodeType,
        stake: &Coin,
        creation_time: u64,
    ) -> Result<Amount, RegisterError> {
        self.check_denom(stake)?;
        if self.registry.get(&network_address)?.is_some() {
            return Err(RegisterError::DuplicateResourceNode(network_address));
        }
        if !self.funds.has_funds(&owner, stake) {
            return Err(RegisterError::InsufficientBalance {
                account: owner,
                requested: stake.clone(),
            });
        }

        let node = ResourceNode::new(
            network_address,
            pub_key,
            owner,
            description,
            node_type,
            creation_time,
        );
        info!(node = %network_address, %owner, %node_type, "registering resource node");
        self.add_stake_to(node, stake)
    }

    /// Moves `amount` from the owner's account into the node's stake. An
    /// unbonded node is bonded on the way, taking its whole stake into the
    /// bonded pool.
    ///
    /// Only the address of `node` is used; status and stake come from the
    /// stored record.
    pub fn add_stake(&self, node: &ResourceNode, amount: &Coin) -> Result<Amount, RegisterError> {
        self.check_denom(amount)?;
        let stored = self.stored_node(&node.network_address)?;
        self.add_stake_to(stored, amount)
    }

    fn add_stake_to(&self, mut node: ResourceNode, amount: &Coin) -> Result<Amount, RegisterError> {
        Self::ensure_permitted(StakeTransition::AddStake, &node)?;
        let owner = node.owner_address;
        if !self.funds.has_funds(&owner, amount) {
            return Err(RegisterError::InsufficientBalance {
                account: owner,
                requested: amount.clone(),
            });
        }

        let mut pools = self.pool.balances()?;
        if node.status == NodeStatus::Bonded {
            pools.add_bonded(amount.amount)?;
        } else {
            pools.add_not_bonded(amount.amount)?;
        }
        node.tokens = node.tokens.checked_add(amount.amount).ok_or(RegisterError::Overflow)?;
        if node.status == NodeStatus::Unbonded {
            pools.not_bonded_to_bonded(node.tokens)?;
            node.status = NodeStatus::Bonded;
        }

        let mut batch = WriteBatch::new();
        self.registry.stage_set(&mut batch, &node)?;
        self.pool.stage(&pools, &mut batch)?;

        self.funds.debit(&owner, amount).map_err(RegisterError::Funds)?;
        self.commit_or_refund(batch, &owner, amount)?;

        info!(
            node = %node.network_address,
            %amount,
            tokens = %node.tokens,
            status = %node.status,
            "added stake"
        );
        Ok(self.capacity.capacity_change(amount.amount))
    }

    /// Returns `amount` of the node's stake, less slashing, to its owner from
    /// the not-bonded pool. A node left without stake is deleted. As with
    /// [`State::add_stake`], the stored record is authoritative.
    pub fn subtract_stake(
        &self,
        node: &ResourceNode,
        amount: &Coin,
    ) -> Result<Amount, RegisterError> {
        self.check_denom(amount)?;
        let mut node = self.stored_node(&node.network_address)?;
        Self::ensure_permitted(StakeTransition::SubtractStake, &node)?;
        let Some(remaining) = node.tokens.checked_sub(amount.amount) else {
            return Err(RegisterError::InsufficientStake {
                node: node.network_address,
                stake: node.tokens,
                requested: amount.amount,
            });
        };
        let owner = node.owner_address;
        if self.accounts.lookup(&owner).is_none() {
            return Err(RegisterError::NoOwnerAccountFound(owner));
        }

        let mut pools = self.pool.balances()?;
        pools.sub_not_bonded(amount.amount)?;
        let refund = self.slashing.deduct_slashing(&owner, amount);
        node.tokens = remaining;

        let mut batch = WriteBatch::new();
        if node.tokens == 0 {
            self.registry.stage_remove(&mut batch, &node.network_address, amount.amount)?;
        } else {
            self.registry.stage_set(&mut batch, &node)?;
        }
        self.pool.stage(&pools, &mut batch)?;

        if !refund.is_zero() {
            self.funds.credit(&owner, &refund).map_err(RegisterError::Funds)?;
        }
        if let Err(e) = self.store.commit(batch) {
            error!(node = %node.network_address, "failed to commit stake removal: {e:#}");
            if !refund.is_zero() {
                if let Err(undo) = self.funds.debit(&owner, &refund) {
                    error!(%owner, "failed to take back refund of {refund}: {undo:#}");
                }
            }
            return Err(e.into());
        }

        if node.tokens == 0 {
            info!(node = %node.network_address, %amount, %refund, "removed resource node");
        } else {
            info!(
                node = %node.network_address,
                %amount,
                %refund,
                tokens = %node.tokens,
                "subtracted stake"
            );
        }
        Ok(self.capacity.capacity_change(amount.amount))
    }

    /// Shifts `amount` from the bonded to the not-bonded pool
    pub fn move_bonded_to_not_bonded(&self, amount: &Coin) -> Result<(), RegisterError> {
        self.check_denom(amount)?;
        let mut pools = self.pool.balances()?;
        pools.bonded_to_not_bonded(amount.amount)?;
        let mut batch = WriteBatch::new();
        self.pool.stage(&pools, &mut batch)?;
        self.store.commit(batch)?;
        Ok(())
    }

    /// Starts unbonding a bonded node: its whole stake leaves the bonded pool
    /// and the node waits in Unbonding for the external completion step.
    pub fn begin_unbonding(
        &self,
        network_address: &SdsAddress,
        owner: &AccAddress,
        now: u64,
    ) -> Result<UnbondingStarted, RegisterError> {
        let mut node = self.owned_node(network_address, owner)?;
        Self::ensure_permitted(StakeTransition::BeginUnbonding, &node)?;

        let mut pools = self.pool.balances()?;
        pools.bonded_to_not_bonded(node.tokens)?;
        node.status = NodeStatus::Unbonding;

        let mut batch = WriteBatch::new();
        self.registry.stage_set(&mut batch, &node)?;
        self.pool.stage(&pools, &mut batch)?;
        self.store.commit(batch)?;

        let started = UnbondingStarted {
            capacity_change: self.capacity.capacity_change(node.tokens),
            completion_time: now.saturating_add(self.config.unbonding_period_secs),
        };
        info!(
            node = %network_address,
            tokens = %node.tokens,
            completion_time = started.completion_time,
            "began unbonding"
        );
        Ok(started)
    }

    /// Replaces the node's descriptive metadata
    pub fn update(
        &self,
        network_address: &SdsAddress,
        owner: &AccAddress,
        description: Description,
        node_type: NodeType,
    ) -> Result<(), RegisterError> {
        let mut node = self.owned_node(network_address, owner)?;
        Self::ensure_permitted(StakeTransition::Update, &node)?;
        node.description = description;
        node.node_type = node_type;
        self.registry.set(&node)?;
        info!(node = %network_address, moniker = %node.description.moniker, "updated resource node");
        Ok(())
    }

    /// Owner-checked [`State::add_stake`]
    pub fn update_stake(
        &self,
        network_address: &SdsAddress,
        owner: &AccAddress,
        amount: &Coin,
    ) -> Result<Amount, RegisterError> {
        self.check_denom(amount)?;
        let node = self.owned_node(network_address, owner)?;
        self.add_stake_to(node, amount)
    }

    /// Current pool totals
    pub fn pool_balances(&self) -> Result<PoolBalances, RegisterError> {
        self.pool.balances()
    }

    pub(crate) fn commit(&self, batch: WriteBatch) -> Result<(), RegisterError> {
        self.store.commit(batch)?;
        Ok(())
    }

    fn owned_node(
        &self,
        network_address: &SdsAddress,
        owner: &AccAddress,
    ) -> Result<ResourceNode, RegisterError> {
        let node = self.stored_node(network_address)?;
        if node.owner_address != *owner {
            warn!(node = %network_address, caller = %owner, "rejected change from non-owner");
            return Err(RegisterError::InvalidOwnerAddr {
                node: *network_address,
                caller: *owner,
            });
        }
        Ok(node)
    }

    fn stored_node(&self, network_address: &SdsAddress) -> Result<ResourceNode, RegisterError> {
        self.registry
            .get(network_address)?
            .ok_or(RegisterError::NoResourceNodeFound(*network_address))
    }

    fn ensure_permitted(
        transition: StakeTransition,
        node: &ResourceNode,
    ) -> Result<(), RegisterError> {
        if transition.permits(node.status) {
            Ok(())
        } else {
            Err(RegisterError::InvalidNodeState {
                transition,
                status: node.status,
            })
        }
    }

    fn check_denom(&self, amount: &Coin) -> Result<(), RegisterError> {
        if amount.denom != self.config.bond_denom {
            return Err(RegisterError::InvalidDenom {
                expected: self.config.bond_denom.clone(),
                got: amount.denom.clone(),
            });
        }
        Ok(())
    }

    fn commit_or_refund(
        &self,
        batch: WriteBatch,
        owner: &AccAddress,
        debited: &Coin,
    ) -> Result<(), RegisterError> {
        if let Err(e) = self.store.commit(batch) {
            error!(%owner, "failed to commit stake change: {e:#}");
            if let Err(undo) = self.funds.credit(owner, debited) {
                error!(%owner, "failed to return {debited}: {undo:#}");
            }
            return Err(e.into());
        }
        Ok(())
    }
}
