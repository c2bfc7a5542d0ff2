//! Resource node records and their bonding status

use std::fmt;

use sds_common::{peers::NodeSummary, AccAddress, Amount, PubKey, SdsAddress};
use serde::{Deserialize, Serialize};

/// Bonding status of a resource node
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    minicbor::Encode,
    minicbor::Decode,
)]
#[cbor(index_only)]
pub enum NodeStatus {
    #[n(0)]
    Unbonded,
    #[n(1)]
    Unbonding,
    #[n(2)]
    Bonded,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeStatus::Unbonded => "Unbonded",
            NodeStatus::Unbonding => "Unbonding",
            NodeStatus::Bonded => "Bonded",
        })
    }
}

/// Kind of service a resource node offers
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    minicbor::Encode,
    minicbor::Decode,
)]
#[cbor(index_only)]
pub enum NodeType {
    #[n(1)]
    Storage,
    #[n(2)]
    Database,
    #[n(4)]
    Computation,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Storage => "storage",
            NodeType::Database => "database",
            NodeType::Computation => "computation",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive metadata supplied by the node owner
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
pub struct Description {
    #[n(0)]
    pub moniker: String,
    #[n(1)]
    pub identity: String,
    #[n(2)]
    pub website: String,
    #[n(3)]
    pub security_contact: String,
    #[n(4)]
    pub details: String,
}

impl Description {
    pub fn new(moniker: impl Into<String>) -> Self {
        Self {
            moniker: moniker.into(),
            ..Default::default()
        }
    }
}

/// A staked resource node. The encoding includes the network address, so two
/// distinct nodes never share a serialized form.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, minicbor::Encode, minicbor::Decode,
)]
pub struct ResourceNode {
    #[n(0)]
    pub network_address: SdsAddress,
    #[n(1)]
    pub pub_key: PubKey,
    #[n(2)]
    pub owner_address: AccAddress,
    #[n(3)]
    pub description: Description,
    #[n(4)]
    pub node_type: NodeType,
    #[n(5)]
    #[cbor(with = "sds_common::cbor::u128_cbor_codec")]
    pub tokens: Amount,
    #[n(6)]
    pub status: NodeStatus,
    #[n(7)]
    pub suspend: bool,
    /// Seconds since the Unix epoch
    #[n(8)]
    pub creation_time: u64,
}

impl ResourceNode {
    /// A freshly registered node: no stake, not yet bonded
    pub fn new(
        network_address: SdsAddress,
        pub_key: PubKey,
        owner_address: AccAddress,
        description: Description,
        node_type: NodeType,
        creation_time: u64,
    ) -> Self {
        Self {
            network_address,
            pub_key,
            owner_address,
            description,
            node_type,
            tokens: 0,
            status: NodeStatus::Unbonded,
            suspend: false,
            creation_time,
        }
    }

    /// Wallet address the node's rewards are recorded under
    pub fn reward_address(&self) -> AccAddress {
        self.pub_key.address()
    }

    pub fn summary(&self) -> NodeSummary {
        NodeSummary {
            network_address: self.network_address,
            owner_address: self.owner_address,
            reward_address: self.reward_address(),
        }
    }
}

/// Stake operations and the statuses each may start from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StakeTransition {
    AddStake,
    SubtractStake,
    BeginUnbonding,
    Update,
}

impl StakeTransition {
    // Bonded stake is never backed by the not-bonded pool, so withdrawals
    // start from Unbonded or Unbonding only
    pub fn allowed_from(self) -> &'static [NodeStatus] {
        match self {
            StakeTransition::AddStake => &[NodeStatus::Unbonded, NodeStatus::Bonded],
            StakeTransition::SubtractStake => &[NodeStatus::Unbonded, NodeStatus::Unbonding],
            StakeTransition::BeginUnbonding => &[NodeStatus::Bonded],
            StakeTransition::Update => {
                &[NodeStatus::Unbonded, NodeStatus::Unbonding, NodeStatus::Bonded]
            }
        }
    }

    pub fn permits(self, status: NodeStatus) -> bool {
        self.allowed_from().contains(&status)
    }
}

impl fmt::Display for StakeTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StakeTransition::AddStake => "add stake",
            StakeTransition::SubtractStake => "subtract stake",
            StakeTransition::BeginUnbonding => "begin unbonding",
            StakeTransition::Update => "update",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sds_common::cbor::{decode_length_prefixed, encode_length_prefixed};

    fn sample_node() -> ResourceNode {
        let mut node = ResourceNode::new(
            SdsAddress::new([1; 20]),
            PubKey::new(vec![9; 33]),
            AccAddress::new([2; 20]),
            Description::new("node-1"),
            NodeType::Computation,
            1_700_000_000,
        );
        node.tokens = u128::from(u64::MAX) + 5;
        node.status = NodeStatus::Bonded;
        node
    }

    #[test]
    fn node_survives_length_prefixed_encoding() {
        let node = sample_node();
        let bytes = encode_length_prefixed(&node).unwrap();
        assert_eq!(decode_length_prefixed::<ResourceNode>(&bytes).unwrap(), node);
    }

    #[test]
    fn distinct_addresses_encode_differently() {
        let a = sample_node();
        let mut b = a.clone();
        b.network_address = SdsAddress::new([3; 20]);
        assert_ne!(encode_length_prefixed(&a).unwrap(), encode_length_prefixed(&b).unwrap());
    }

    #[test]
    fn new_node_is_unbonded_without_stake() {
        let node = ResourceNode::new(
            SdsAddress::new([1; 20]),
            PubKey::new(vec![1]),
            AccAddress::new([2; 20]),
            Description::default(),
            NodeType::Storage,
            0,
        );
        assert_eq!(node.tokens, 0);
        assert_eq!(node.status, NodeStatus::Unbonded);
        assert!(!node.suspend);
    }

    #[test]
    fn transition_table() {
        assert!(StakeTransition::AddStake.permits(NodeStatus::Bonded));
        assert!(!StakeTransition::AddStake.permits(NodeStatus::Unbonding));
        assert!(StakeTransition::SubtractStake.permits(NodeStatus::Unbonding));
        assert!(!StakeTransition::SubtractStake.permits(NodeStatus::Bonded));
        assert!(StakeTransition::BeginUnbonding.permits(NodeStatus::Bonded));
        assert!(!StakeTransition::BeginUnbonding.permits(NodeStatus::Unbonded));
        assert!(StakeTransition::Update.permits(NodeStatus::Unbonding));
    }

    #[test]
    fn summary_uses_key_derived_reward_address() {
        let node = sample_node();
        let summary = node.summary();
        assert_eq!(summary.reward_address, node.pub_key.address());
        assert_eq!(summary.owner_address, node.owner_address);
    }
}
