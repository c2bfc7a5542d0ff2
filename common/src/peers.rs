//! Node listings used to resolve owners to reward addresses

use std::collections::BTreeSet;

use anyhow::Result;

use crate::address::{AccAddress, SdsAddress};

/// Summary of a registered node as seen by reward queries
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct NodeSummary {
    pub network_address: SdsAddress,
    pub owner_address: AccAddress,
    /// Wallet address derived from the node's public key; rewards are keyed by it
    pub reward_address: AccAddress,
}

pub trait PeerRegistry: Send + Sync {
    fn list_all_resource_nodes(&self) -> Result<Vec<NodeSummary>>;

    fn list_all_indexing_nodes(&self) -> Result<Vec<NodeSummary>>;

    /// Reward addresses of every node owned by `owner`, or of every node when
    /// `owner` is `None`
    fn reward_addresses_owned_by(&self, owner: Option<&AccAddress>) -> Result<BTreeSet<AccAddress>> {
        let mut addresses = BTreeSet::new();
        let nodes = self
            .list_all_resource_nodes()?
            .into_iter()
            .chain(self.list_all_indexing_nodes()?);
        for node in nodes {
            if owner.map_or(true, |owner| node.owner_address == *owner) {
                addresses.insert(node.reward_address);
            }
        }
        Ok(addresses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPeers {
        resource: Vec<NodeSummary>,
        indexing: Vec<NodeSummary>,
    }

    impl PeerRegistry for FixedPeers {
        fn list_all_resource_nodes(&self) -> Result<Vec<NodeSummary>> {
            Ok(self.resource.clone())
        }

        fn list_all_indexing_nodes(&self) -> Result<Vec<NodeSummary>> {
            Ok(self.indexing.clone())
        }
    }

    fn summary(node: u8, owner: u8) -> NodeSummary {
        NodeSummary {
            network_address: SdsAddress::new([node; 20]),
            owner_address: AccAddress::new([owner; 20]),
            reward_address: AccAddress::new([node.wrapping_add(100); 20]),
        }
    }

    #[test]
    fn owner_filter_spans_both_node_kinds() {
        let peers = FixedPeers {
            resource: vec![summary(1, 9), summary(2, 8)],
            indexing: vec![summary(3, 9)],
        };
        let owned = peers.reward_addresses_owned_by(Some(&AccAddress::new([9; 20]))).unwrap();
        assert_eq!(
            owned.into_iter().collect::<Vec<_>>(),
            vec![AccAddress::new([101; 20]), AccAddress::new([103; 20])]
        );
        assert_eq!(peers.reward_addresses_owned_by(None).unwrap().len(), 3);
    }
}
