//! Error classes shared by the state modules

/// Broad class of a module error, as reported to transaction and query handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The owner lacks the balance or stake for the requested change
    InsufficientFunds,
    /// The operation is not permitted in the node's current status
    InvalidNodeState,
    /// A pool holds less than a transfer needs; the ledger has drifted
    PoolInsufficiency,
    NotFound,
    Unauthorized,
    InvalidDenom,
    AlreadyExists,
    /// An epoch older than the last reported one
    InvalidEpoch,
    /// Storage, codec or collaborator failure
    Internal,
}
