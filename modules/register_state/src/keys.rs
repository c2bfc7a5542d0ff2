//! Store key layout of the register module

use sds_common::{AccAddress, SdsAddress};

/// Node record by network address
pub const RESOURCE_NODE_PREFIX: u8 = 0x21;
/// Owner index: owner address followed by network address
pub const RESOURCE_NODE_OWNER_PREFIX: u8 = 0x22;
pub const RESOURCE_NODE_BONDED_TOKEN_KEY: [u8; 1] = [0x31];
pub const RESOURCE_NODE_NOT_BONDED_TOKEN_KEY: [u8; 1] = [0x32];

pub fn resource_node_key(address: &SdsAddress) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + address.as_bytes().len());
    key.push(RESOURCE_NODE_PREFIX);
    key.extend_from_slice(address.as_bytes());
    key
}

pub fn owner_prefix(owner: &AccAddress) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + owner.as_bytes().len());
    key.push(RESOURCE_NODE_OWNER_PREFIX);
    key.extend_from_slice(owner.as_bytes());
    key
}

pub fn owner_index_key(owner: &AccAddress, address: &SdsAddress) -> Vec<u8> {
    let mut key = owner_prefix(owner);
    key.extend_from_slice(address.as_bytes());
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_index_key_extends_owner_prefix() {
        let owner = AccAddress::new([1; 20]);
        let node = SdsAddress::new([2; 20]);
        let key = owner_index_key(&owner, &node);
        assert!(key.starts_with(&owner_prefix(&owner)));
        assert_eq!(key.len(), 41);
    }

    #[test]
    fn prefixes_do_not_collide() {
        let node_key = resource_node_key(&SdsAddress::new([0; 20]));
        assert_ne!(node_key[0], RESOURCE_NODE_OWNER_PREFIX);
        assert_ne!(RESOURCE_NODE_BONDED_TOKEN_KEY, RESOURCE_NODE_NOT_BONDED_TOKEN_KEY);
    }
}
