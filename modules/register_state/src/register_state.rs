//! SDS register state: resource node records, the bonded/not-bonded token
//! pools, and the stake transitions that keep the two consistent.

pub mod config;
pub mod error;
pub mod genesis;
pub mod keys;
pub mod policy;
pub mod registry;
pub mod state;
pub mod token_pool;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use crate::config::RegisterConfig;
pub use crate::error::{ErrorKind, RegisterError};
pub use crate::genesis::GenesisState;
pub use crate::registry::NodeRegistry;
pub use crate::state::{State, UnbondingStarted};
pub use crate::token_pool::{PoolBalances, TokenPool};
pub use crate::types::{Description, NodeStatus, NodeType, ResourceNode, StakeTransition};
