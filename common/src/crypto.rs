//! Hashing helpers

use blake2::{digest::consts::U20, Blake2b, Digest};

/// Blake2b-160 digest of `key`, the width of node and wallet addresses
pub fn keyhash_160(key: &[u8]) -> [u8; 20] {
    let mut hasher = Blake2b::<U20>::new();
    hasher.update(key);
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&hasher.finalize());
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyhash_160_differs_per_input() {
        assert_eq!(keyhash_160(b"node").len(), 20);
        assert_ne!(keyhash_160(b"node-a"), keyhash_160(b"node-b"));
    }
}
