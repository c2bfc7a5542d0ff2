pub use sds_common::error::ErrorKind;
use sds_common::{AccAddress, Amount, Coin, SdsAddress};
use thiserror::Error;

use crate::types::{NodeStatus, StakeTransition};

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("insufficient balance in {account}: requested {requested}")]
    InsufficientBalance { account: AccAddress, requested: Coin },

    #[error("node {node} holds {stake}, cannot subtract {requested}")]
    InsufficientStake {
        node: SdsAddress,
        stake: Amount,
        requested: Amount,
    },

    #[error("cannot {transition} while node is {status}")]
    InvalidNodeState {
        transition: StakeTransition,
        status: NodeStatus,
    },

    #[error("insufficient balance of bonded pool: holds {available}, needs {required}")]
    InsufficientBondedPool { available: Amount, required: Amount },

    #[error("insufficient balance of not-bonded pool: holds {available}, needs {required}")]
    InsufficientNotBondedPool { available: Amount, required: Amount },

    #[error("no resource node found for {0}")]
    NoResourceNodeFound(SdsAddress),

    #[error("no owner account found for {0}")]
    NoOwnerAccountFound(AccAddress),

    #[error("{caller} is not the owner of node {node}")]
    InvalidOwnerAddr { node: SdsAddress, caller: AccAddress },

    #[error("invalid denomination: expected {expected}, got {got}")]
    InvalidDenom { expected: String, got: String },

    #[error("resource node {0} already registered")]
    DuplicateResourceNode(SdsAddress),

    #[error("stake arithmetic overflow")]
    Overflow,

    #[error("funds ledger failure: {0}")]
    Funds(#[source] anyhow::Error),

    #[error("store failure: {0}")]
    Store(#[from] anyhow::Error),
}

impl RegisterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegisterError::InsufficientBalance { .. } | RegisterError::InsufficientStake { .. } => {
                ErrorKind::InsufficientFunds
            }
            RegisterError::InvalidNodeState { .. } => ErrorKind::InvalidNodeState,
            RegisterError::InsufficientBondedPool { .. }
            | RegisterError::InsufficientNotBondedPool { .. } => ErrorKind::PoolInsufficiency,
            RegisterError::NoResourceNodeFound(_) | RegisterError::NoOwnerAccountFound(_) => {
                ErrorKind::NotFound
            }
            RegisterError::InvalidOwnerAddr { .. } => ErrorKind::Unauthorized,
            RegisterError::InvalidDenom { .. } => ErrorKind::InvalidDenom,
            RegisterError::DuplicateResourceNode(_) => ErrorKind::AlreadyExists,
            RegisterError::Overflow | RegisterError::Funds(_) | RegisterError::Store(_) => {
                ErrorKind::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        let err = RegisterError::InvalidNodeState {
            transition: StakeTransition::AddStake,
            status: NodeStatus::Unbonding,
        };
        assert_eq!(err.kind(), ErrorKind::InvalidNodeState);
        assert_eq!(err.to_string(), "cannot add stake while node is Unbonding");

        let err = RegisterError::InsufficientBondedPool {
            available: 1,
            required: 2,
        };
        assert_eq!(err.kind(), ErrorKind::PoolInsufficiency);

        let err = RegisterError::from(anyhow::anyhow!("disk full"));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
