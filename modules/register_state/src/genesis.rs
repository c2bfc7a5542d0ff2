//! Loading and dumping the full register state

use std::collections::BTreeSet;

use sds_common::stores::WriteBatch;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::RegisterError,
    state::State,
    token_pool::PoolBalances,
    types::{NodeStatus, ResourceNode},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub resource_nodes: Vec<ResourceNode>,
}

impl GenesisState {
    /// Pool totals implied by the nodes: bonded stake in one, everything else
    /// in the other
    pub fn pool_balances(&self) -> Result<PoolBalances, RegisterError> {
        let mut pools = PoolBalances::default();
        for node in &self.resource_nodes {
            if node.status == NodeStatus::Bonded {
                pools.add_bonded(node.tokens)?;
            } else {
                pools.add_not_bonded(node.tokens)?;
            }
        }
        Ok(pools)
    }
}

impl State {
    /// Writes every genesis node and the matching pool totals in one batch
    pub fn init_genesis(&self, genesis: &GenesisState) -> Result<(), RegisterError> {
        let mut seen = BTreeSet::new();
        for node in &genesis.resource_nodes {
            if !seen.insert(node.network_address) {
                return Err(RegisterError::DuplicateResourceNode(node.network_address));
            }
        }
        let pools = genesis.pool_balances()?;

        let mut batch = WriteBatch::new();
        for node in &genesis.resource_nodes {
            self.registry().stage_set(&mut batch, node)?;
        }
        self.pool().stage(&pools, &mut batch)?;
        self.commit(batch)?;

        info!(
            nodes = genesis.resource_nodes.len(),
            bonded = %pools.bonded,
            not_bonded = %pools.not_bonded,
            "loaded register genesis"
        );
        Ok(())
    }

    pub fn export_genesis(&self) -> Result<GenesisState, RegisterError> {
        Ok(GenesisState {
            resource_nodes: self.registry().get_all()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{node, TestLedger};

    fn genesis() -> GenesisState {
        let mut bonded = node(1, 9);
        bonded.tokens = 100;
        bonded.status = NodeStatus::Bonded;
        let mut unbonding = node(2, 8);
        unbonding.tokens = 40;
        unbonding.status = NodeStatus::Unbonding;
        GenesisState {
            resource_nodes: vec![bonded, unbonding, node(3, 9)],
        }
    }

    #[test]
    fn init_then_export_returns_same_nodes() {
        let ledger = TestLedger::new();
        let genesis = genesis();
        ledger.state.init_genesis(&genesis).unwrap();

        assert_eq!(ledger.state.export_genesis().unwrap(), genesis);
        assert_eq!(
            ledger.state.pool_balances().unwrap(),
            PoolBalances {
                bonded: 100,
                not_bonded: 40
            }
        );
        assert_eq!(
            ledger.state.registry().nodes_by_owner(&genesis.resource_nodes[0].owner_address).unwrap().len(),
            2
        );
    }

    #[test]
    fn duplicate_nodes_write_nothing() {
        let ledger = TestLedger::new();
        let mut genesis = genesis();
        genesis.resource_nodes.push(node(1, 7));

        let err = ledger.state.init_genesis(&genesis).unwrap_err();
        assert!(matches!(err, RegisterError::DuplicateResourceNode(_)));
        assert!(ledger.store.is_empty());
    }
}
