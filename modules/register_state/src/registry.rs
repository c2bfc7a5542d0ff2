//! Persisted resource nodes with a bounded decode cache and an owner index

use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex},
};

use anyhow::{anyhow, Result};
use sds_common::{
    cache::{BoundedCache, CacheStats},
    cbor::{decode_length_prefixed, encode_length_prefixed},
    peers::{NodeSummary, PeerRegistry},
    stores::{Store, WriteBatch},
    AccAddress, Amount, SdsAddress,
};
use tracing::debug;

use crate::{
    keys::{owner_index_key, owner_prefix, resource_node_key, RESOURCE_NODE_PREFIX},
    types::ResourceNode,
};

/// Node records keyed by network address.
///
/// Decoded records are cached under their exact serialized bytes, so a
/// rewritten record is a different cache key and stale entries simply age out.
/// Writes never touch the cache; it is filled lazily by [`NodeRegistry::get`].
pub struct NodeRegistry {
    store: Arc<dyn Store>,
    cache: Mutex<BoundedCache<Vec<u8>, ResourceNode>>,
}

impl NodeRegistry {
    pub fn new(store: Arc<dyn Store>, cache_size: usize) -> Self {
        Self {
            store,
            cache: Mutex::new(BoundedCache::new(cache_size)),
        }
    }

    pub fn get(&self, address: &SdsAddress) -> Result<Option<ResourceNode>> {
        let Some(bytes) = self.store.get(&resource_node_key(address))? else {
            return Ok(None);
        };
        let mut cache = self.cache.lock().map_err(|_| anyhow!("node cache lock poisoned"))?;
        let node = cache.get_or_try_insert_with(&bytes, || decode_length_prefixed(&bytes))?;
        Ok(Some(node))
    }

    pub fn set(&self, node: &ResourceNode) -> Result<()> {
        let mut batch = WriteBatch::new();
        self.stage_set(&mut batch, node)?;
        self.store.commit(batch)
    }

    /// Adds the record and its owner index entry to `batch`, dropping the index
    /// entry of a previous owner
    pub fn stage_set(&self, batch: &mut WriteBatch, node: &ResourceNode) -> Result<()> {
        let key = resource_node_key(&node.network_address);
        if let Some(bytes) = self.store.get(&key)? {
            let previous: ResourceNode = decode_length_prefixed(&bytes)?;
            if previous.owner_address != node.owner_address {
                batch.remove(owner_index_key(&previous.owner_address, &node.network_address));
            }
        }
        batch.insert(key, encode_length_prefixed(node)?);
        batch.insert(
            owner_index_key(&node.owner_address, &node.network_address),
            node.network_address.to_vec(),
        );
        Ok(())
    }

    /// Adds deletion of the stored record and its owner index entry to
    /// `batch`. `withdrawn` is the stake leaving the node in the same batch.
    ///
    /// # Panics
    ///
    /// If the stored record holds more than `withdrawn`: the pools still count
    /// the rest, so dropping the record would leave them permanently out of
    /// balance.
    pub fn stage_remove(
        &self,
        batch: &mut WriteBatch,
        address: &SdsAddress,
        withdrawn: Amount,
    ) -> Result<()> {
        let bytes = self
            .store
            .get(&resource_node_key(address))?
            .ok_or_else(|| anyhow!("no resource node {address} to remove"))?;
        let stored: ResourceNode = decode_length_prefixed(&bytes)?;
        if stored.tokens > withdrawn {
            panic!(
                "attempted to remove resource node {address} with {} tokens",
                stored.tokens - withdrawn
            );
        }
        batch.remove(resource_node_key(address));
        batch.remove(owner_index_key(&stored.owner_address, address));
        Ok(())
    }

    /// Every node in address order. Decodes each record and bypasses the cache.
    pub fn get_all(&self) -> Result<Vec<ResourceNode>> {
        self.store
            .prefix_values(&[RESOURCE_NODE_PREFIX])?
            .iter()
            .map(|bytes| decode_length_prefixed(bytes))
            .collect()
    }

    /// Nodes owned by `owner`, resolved through the owner index
    pub fn nodes_by_owner(&self, owner: &AccAddress) -> Result<Vec<ResourceNode>> {
        let mut nodes = Vec::new();
        for raw in self.store.prefix_values(&owner_prefix(owner))? {
            let address = SdsAddress::try_from(raw.as_slice())?;
            match self.get(&address)? {
                Some(node) => nodes.push(node),
                None => debug!(%address, %owner, "owner index entry without node record"),
            }
        }
        Ok(nodes)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.lock().map(|cache| cache.stats()).unwrap_or_default()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }
}

impl PeerRegistry for NodeRegistry {
    fn list_all_resource_nodes(&self) -> Result<Vec<NodeSummary>> {
        Ok(self.get_all()?.iter().map(ResourceNode::summary).collect())
    }

    // Indexing nodes are registered by a sibling module
    fn list_all_indexing_nodes(&self) -> Result<Vec<NodeSummary>> {
        Ok(Vec::new())
    }

    fn reward_addresses_owned_by(&self, owner: Option<&AccAddress>) -> Result<BTreeSet<AccAddress>> {
        let nodes = match owner {
            Some(owner) => self.nodes_by_owner(owner)?,
            None => self.get_all()?,
        };
        Ok(nodes.iter().map(ResourceNode::reward_address).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_utils::{node, numbered_node},
        types::NodeStatus,
    };
    use sds_common::stores::{FjallStore, InMemoryStore};

    fn registry(cache_size: usize) -> NodeRegistry {
        NodeRegistry::new(Arc::new(InMemoryStore::new()), cache_size)
    }

    #[test]
    fn set_then_get_returns_equal_node() {
        let registry = registry(500);
        let mut stored = node(1, 9);
        stored.tokens = 250;
        stored.status = NodeStatus::Bonded;
        registry.set(&stored).unwrap();
        assert_eq!(registry.get(&stored.network_address).unwrap(), Some(stored));
    }

    #[test]
    fn missing_node_is_not_an_error() {
        let registry = registry(500);
        assert_eq!(registry.get(&SdsAddress::new([7; 20])).unwrap(), None);
        assert_eq!(registry.cache_stats(), CacheStats::default());
    }

    #[test]
    fn repeated_reads_hit_the_cache() {
        let registry = registry(500);
        let stored = node(1, 9);
        registry.set(&stored).unwrap();
        for _ in 0..3 {
            assert_eq!(registry.get(&stored.network_address).unwrap(), Some(stored.clone()));
        }
        let stats = registry.cache_stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 2);
    }

    #[test]
    fn rewritten_record_is_decoded_afresh() {
        let registry = registry(500);
        let mut stored = node(1, 9);
        registry.set(&stored).unwrap();
        registry.get(&stored.network_address).unwrap();

        stored.tokens = 40;
        registry.set(&stored).unwrap();
        assert_eq!(registry.get(&stored.network_address).unwrap().map(|n| n.tokens), Some(40));
        assert_eq!(registry.cache_stats().misses, 2);
    }

    #[test]
    fn five_hundred_and_first_payload_evicts_the_first() {
        let registry = registry(500);
        let nodes: Vec<ResourceNode> = (0..501u32).map(|i| numbered_node(i, 1)).collect();
        for n in &nodes {
            registry.set(n).unwrap();
            registry.get(&n.network_address).unwrap();
        }
        assert_eq!(registry.cache_len(), 500);
        assert_eq!(registry.cache_stats().evictions, 1);
        assert_eq!(registry.cache_stats().misses, 501);

        // The 500 most recent payloads come straight from the cache
        for n in &nodes[1..] {
            assert_eq!(registry.get(&n.network_address).unwrap().as_ref(), Some(n));
        }
        assert_eq!(registry.cache_stats().misses, 501);
        assert_eq!(registry.cache_stats().hits, 500);

        // The first one has to be decoded again
        assert_eq!(registry.get(&nodes[0].network_address).unwrap().as_ref(), Some(&nodes[0]));
        assert_eq!(registry.cache_stats().misses, 502);
    }

    #[test]
    fn owner_index_follows_writes_and_removals() {
        let registry = registry(500);
        let owner = AccAddress::new([9; 20]);
        let a = node(1, 9);
        let b = node(2, 9);
        let c = node(3, 8);
        for n in [&a, &b, &c] {
            registry.set(n).unwrap();
        }
        assert_eq!(registry.nodes_by_owner(&owner).unwrap(), vec![a.clone(), b.clone()]);

        let mut batch = WriteBatch::new();
        registry.stage_remove(&mut batch, &a.network_address, 0).unwrap();
        registry.store.commit(batch).unwrap();
        assert_eq!(registry.nodes_by_owner(&owner).unwrap(), vec![b]);
        assert_eq!(registry.get(&a.network_address).unwrap(), None);
    }

    #[test]
    fn owner_change_moves_index_entry() {
        let registry = registry(500);
        let mut moved = node(1, 9);
        registry.set(&moved).unwrap();
        moved.owner_address = AccAddress::new([8; 20]);
        registry.set(&moved).unwrap();
        assert!(registry.nodes_by_owner(&AccAddress::new([9; 20])).unwrap().is_empty());
        assert_eq!(registry.nodes_by_owner(&AccAddress::new([8; 20])).unwrap(), vec![moved]);
    }

    #[test]
    fn indexed_owner_lookup_matches_full_scan() {
        let registry = registry(500);
        for (n, owner) in [(1, 9), (2, 8), (3, 9), (4, 7)] {
            registry.set(&node(n, owner)).unwrap();
        }
        let owner = AccAddress::new([9; 20]);
        let scanned: BTreeSet<AccAddress> = registry
            .list_all_resource_nodes()
            .unwrap()
            .into_iter()
            .filter(|summary| summary.owner_address == owner)
            .map(|summary| summary.reward_address)
            .collect();
        assert_eq!(registry.reward_addresses_owned_by(Some(&owner)).unwrap(), scanned);
        assert_eq!(registry.reward_addresses_owned_by(None).unwrap().len(), 4);
    }

    #[test]
    fn fjall_backed_registry_matches_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let registry = NodeRegistry::new(Arc::new(FjallStore::temporary(dir.path()).unwrap()), 500);
        let a = node(2, 9);
        let b = node(1, 9);
        registry.set(&a).unwrap();
        registry.set(&b).unwrap();

        assert_eq!(registry.get(&a.network_address).unwrap(), Some(a.clone()));
        assert_eq!(registry.get_all().unwrap(), vec![b.clone(), a.clone()]);
        assert_eq!(registry.nodes_by_owner(&AccAddress::new([9; 20])).unwrap(), vec![b, a]);
    }

    #[test]
    #[should_panic(expected = "with 5 tokens")]
    fn removing_node_with_stake_left_panics() {
        let registry = registry(500);
        let mut staked = node(1, 9);
        staked.tokens = 15;
        registry.set(&staked).unwrap();
        // A caller whose copy already shows zero stake still trips on the stored record
        let _ = registry.stage_remove(&mut WriteBatch::new(), &staked.network_address, 10);
    }

    #[test]
    fn removing_fully_withdrawn_node_drops_record_and_index() {
        let store = Arc::new(InMemoryStore::new());
        let registry = NodeRegistry::new(store.clone(), 500);
        let mut staked = node(1, 9);
        staked.tokens = 15;
        registry.set(&staked).unwrap();

        let mut batch = WriteBatch::new();
        registry.stage_remove(&mut batch, &staked.network_address, 15).unwrap();
        store.commit(batch).unwrap();
        assert_eq!(registry.get(&staked.network_address).unwrap(), None);
        assert!(registry.nodes_by_owner(&staked.owner_address).unwrap().is_empty());
    }

    #[test]
    fn removing_unknown_node_is_an_error() {
        let registry = registry(500);
        let address = node(1, 9).network_address;
        assert!(registry.stage_remove(&mut WriteBatch::new(), &address, 0).is_err());
    }
}
