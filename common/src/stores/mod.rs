//! Key/value storage backing the ledger state
//!
//! Every module persists its records through [`Store`]: point reads, ordered
//! prefix scans and atomic batched writes. Keys are namespaced by a one-byte
//! prefix owned by the module that writes them.

use anyhow::Result;

mod config;
mod fjall;
mod in_memory;

pub use self::config::StoreConfig;
pub use self::fjall::FjallStore;
pub use self::in_memory::InMemoryStore;

pub trait Store: Send + Sync {
    /// Value under `key`, `None` if absent
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Values of every key starting with `prefix`, in ascending key order
    fn prefix_values(&self, prefix: &[u8]) -> Result<Vec<Vec<u8>>>;

    /// Applies every operation in `batch` or none of them
    fn commit(&self, batch: WriteBatch) -> Result<()>;

    fn set(&self, key: &[u8], value: Vec<u8>) -> Result<()> {
        let mut batch = WriteBatch::new();
        batch.insert(key, value);
        self.commit(batch)
    }

    fn remove(&self, key: &[u8]) -> Result<()> {
        let mut batch = WriteBatch::new();
        batch.remove(key);
        self.commit(batch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Insert { key: Vec<u8>, value: Vec<u8> },
    Remove { key: Vec<u8> },
}

/// Ordered list of writes committed as one unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: Vec<u8>) {
        self.ops.push(WriteOp::Insert {
            key: key.into(),
            value,
        });
    }

    pub fn remove(&mut self, key: impl Into<Vec<u8>>) {
        self.ops.push(WriteOp::Remove { key: key.into() });
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}
