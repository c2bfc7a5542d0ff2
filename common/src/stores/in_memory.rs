use std::{collections::BTreeMap, sync::RwLock};

use anyhow::{anyhow, Result};

use super::{Store, WriteBatch, WriteOp};

/// Ordered in-memory store, used by tests and short-lived hosts
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Store for InMemoryStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().map_err(|_| anyhow!("store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn prefix_values(&self, prefix: &[u8]) -> Result<Vec<Vec<u8>>> {
        let entries = self.entries.read().map_err(|_| anyhow!("store lock poisoned"))?;
        Ok(entries
            .range(prefix.to_vec()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(_, value)| value.clone())
            .collect())
    }

    fn commit(&self, batch: WriteBatch) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| anyhow!("store lock poisoned"))?;
        for op in batch.into_ops() {
            match op {
                WriteOp::Insert { key, value } => {
                    entries.insert(key, value);
                }
                WriteOp::Remove { key } => {
                    entries.remove(&key);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_scan_is_ordered_and_bounded() {
        let store = InMemoryStore::new();
        let mut batch = WriteBatch::new();
        batch.insert(vec![1, 3], b"c".to_vec());
        batch.insert(vec![1, 1], b"a".to_vec());
        batch.insert(vec![2, 0], b"x".to_vec());
        batch.insert(vec![1, 2], b"b".to_vec());
        store.commit(batch).unwrap();

        let values = store.prefix_values(&[1]).unwrap();
        assert_eq!(values, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn batch_applies_in_order() {
        let store = InMemoryStore::new();
        let mut batch = WriteBatch::new();
        batch.insert(vec![9], b"first".to_vec());
        batch.remove(vec![9]);
        batch.insert(vec![8], b"kept".to_vec());
        store.commit(batch).unwrap();

        assert_eq!(store.get(&[9]).unwrap(), None);
        assert_eq!(store.get(&[8]).unwrap(), Some(b"kept".to_vec()));
        assert_eq!(store.len(), 1);
    }
}
