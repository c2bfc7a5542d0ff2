//! SDS pot state: per-epoch mining and traffic rewards, the mature/immature
//! totals of every reward wallet, and paginated reward queries.

pub mod config;
pub mod error;
pub mod keys;
pub mod queries;
pub mod state;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use crate::config::PotConfig;
pub use crate::error::{ErrorKind, PotError};
pub use crate::queries::{EpochRewardsQuery, NodesRewardsQuery, OwnerRewardsQuery};
pub use crate::state::State;
pub use crate::types::{EpochSettlement, NodeRewardsInfo, Reward, VolumeReportRecord};
