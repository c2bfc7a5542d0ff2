use std::sync::Arc;

use sds_common::{
    funds::InMemoryBank, stores::InMemoryStore, AccAddress, Amount, Coin, PubKey, SdsAddress,
};

use crate::{
    config::RegisterConfig,
    error::RegisterError,
    policy::SlashingPolicy,
    state::State,
    types::{Description, NodeType, ResourceNode},
};

pub const DENOM: &str = "ustos";

/// Unbonded node `n` without stake, owned by the wallet filled with `owner`
pub fn node(n: u8, owner: u8) -> ResourceNode {
    ResourceNode::new(
        SdsAddress::new([n; 20]),
        PubKey::new(vec![n; 33]),
        AccAddress::new([owner; 20]),
        Description::new(format!("node-{n}")),
        NodeType::Storage,
        1_700_000_000,
    )
}

/// Like [`node`], for more than 256 distinct nodes
pub fn numbered_node(i: u32, owner: u8) -> ResourceNode {
    let mut address = [0u8; 20];
    address[16..].copy_from_slice(&i.to_be_bytes());
    ResourceNode::new(
        SdsAddress::new(address),
        PubKey::new(i.to_be_bytes().to_vec()),
        AccAddress::new([owner; 20]),
        Description::new(format!("node-{i}")),
        NodeType::Storage,
        1_700_000_000,
    )
}

/// Takes a fixed amount off every refund
pub struct FixedSlash(pub Amount);

impl SlashingPolicy for FixedSlash {
    fn deduct_slashing(&self, _owner: &AccAddress, refund: &Coin) -> Coin {
        Coin::new(refund.denom.as_str(), refund.amount.saturating_sub(self.0))
    }
}

/// Register state over an in-memory store and bank
pub struct TestLedger {
    pub store: Arc<InMemoryStore>,
    pub bank: Arc<InMemoryBank>,
    pub state: State,
}

impl TestLedger {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let bank = Arc::new(InMemoryBank::new());
        let state = State::new(
            RegisterConfig::default(),
            store.clone(),
            bank.clone(),
            bank.clone(),
        );
        Self { store, bank, state }
    }

    pub fn with_slashing(slashing: impl SlashingPolicy + 'static) -> Self {
        let ledger = Self::new();
        Self {
            state: ledger.state.with_slashing_policy(slashing),
            ..ledger
        }
    }

    pub fn fund(&self, owner: u8, amount: Amount) {
        self.bank.fund(&AccAddress::new([owner; 20]), Coin::new(DENOM, amount)).unwrap();
    }

    pub fn balance(&self, owner: u8) -> Amount {
        self.bank.balance(&AccAddress::new([owner; 20]), DENOM)
    }

    /// Registers `node` with `stake` of the bond denomination
    pub fn register(&self, node: &ResourceNode, stake: Amount) -> Result<Amount, RegisterError> {
        self.state.register(
            node.network_address,
            node.pub_key.clone(),
            node.owner_address,
            node.description.clone(),
            node.node_type,
            &Coin::new(DENOM, stake),
            node.creation_time,
        )
    }
}
