use std::{fs, path::Path};

use anyhow::Result;
use fjall::{Database, Keyspace, KeyspaceCreateOptions};
use tracing::{error, info};

use super::{Store, StoreConfig, WriteBatch, WriteOp};

const LEDGER_KEYSPACE: &str = "ledger";

/// On-disk store: a single fjall keyspace holding every module's prefixes
pub struct FjallStore {
    database: Database,
    ledger: Keyspace,
}

impl FjallStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let path = Path::new(&config.database_path);
        if config.clear_on_start && path.exists() {
            fs::remove_dir_all(path)?;
        }
        let database = Database::builder(path).open()?;
        let store = Self::with_database(database)?;
        info!(path = %config.database_path, "opened ledger store");
        Ok(store)
    }

    /// Store whose files are removed when it is dropped
    pub fn temporary(path: impl AsRef<Path>) -> Result<Self> {
        let database = Database::builder(path.as_ref()).temporary(true).open()?;
        Self::with_database(database)
    }

    fn with_database(database: Database) -> Result<Self> {
        let ledger = database.keyspace(LEDGER_KEYSPACE, KeyspaceCreateOptions::default)?;
        Ok(Self { database, ledger })
    }
}

impl Store for FjallStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.ledger.get(key)?.map(|value| value.to_vec()))
    }

    fn prefix_values(&self, prefix: &[u8]) -> Result<Vec<Vec<u8>>> {
        let mut values = Vec::new();
        for item in self.ledger.prefix(prefix) {
            let value = item.value()?;
            values.push(value.to_vec());
        }
        Ok(values)
    }

    fn commit(&self, batch: WriteBatch) -> Result<()> {
        let count = batch.len();
        let mut writes = self.database.batch();
        for op in batch.into_ops() {
            match op {
                WriteOp::Insert { key, value } => writes.insert(&self.ledger, key, value),
                WriteOp::Remove { key } => writes.remove(&self.ledger, key),
            }
        }
        if let Err(e) = writes.commit() {
            error!("ledger batch commit of {count} writes failed: {e}");
            return Err(e.into());
        }
        Ok(())
    }
}
