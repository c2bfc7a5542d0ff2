//! Fixed-width byte identifiers: addresses and transaction hashes

use std::{fmt, str::FromStr};

use anyhow::{bail, Result};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

/// `BYTES` raw bytes, shown and serialized as lowercase hex and written to
/// CBOR as a byte string
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash<const BYTES: usize>([u8; BYTES]);

impl<const BYTES: usize> Hash<BYTES> {
    pub const fn new(bytes: [u8; BYTES]) -> Self {
        Self(bytes)
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// All zero bytes
    pub fn is_empty(&self) -> bool {
        self.0 == [0u8; BYTES]
    }
}

impl<const BYTES: usize> Default for Hash<BYTES> {
    fn default() -> Self {
        Self([0u8; BYTES])
    }
}

impl<const BYTES: usize> AsRef<[u8]> for Hash<BYTES> {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<const BYTES: usize> TryFrom<&[u8]> for Hash<BYTES> {
    type Error = anyhow::Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != BYTES {
            bail!("expected {BYTES} bytes, got {}", bytes.len());
        }
        let mut hash = [0u8; BYTES];
        hash.copy_from_slice(bytes);
        Ok(Self(hash))
    }
}

impl<const BYTES: usize> FromStr for Hash<BYTES> {
    type Err = hex::FromHexError;

    fn from_str(text: &str) -> std::result::Result<Self, Self::Err> {
        let mut bytes = [0u8; BYTES];
        hex::decode_to_slice(text, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl<const BYTES: usize> fmt::Display for Hash<BYTES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl<const BYTES: usize> fmt::Debug for Hash<BYTES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash<{BYTES}>({self})")
    }
}

impl<const BYTES: usize> Serialize for Hash<BYTES> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, const BYTES: usize> Deserialize<'de> for Hash<BYTES> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}

impl<C, const BYTES: usize> minicbor::Encode<C> for Hash<BYTES> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _ctx: &mut C,
    ) -> std::result::Result<(), minicbor::encode::Error<W::Error>> {
        e.bytes(&self.0)?.ok()
    }
}

impl<'a, C, const BYTES: usize> minicbor::Decode<'a, C> for Hash<BYTES> {
    fn decode(
        d: &mut minicbor::Decoder<'a>,
        _ctx: &mut C,
    ) -> std::result::Result<Self, minicbor::decode::Error> {
        let bytes = d.bytes()?;
        Self::try_from(bytes)
            .map_err(|_| minicbor::decode::Error::message("byte string of unexpected width"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_text_round_trip() {
        let hash = Hash::<20>::new([0xab; 20]);
        assert_eq!(hash.to_string(), "ab".repeat(20));
        assert_eq!(hash.to_string().parse::<Hash<20>>().unwrap(), hash);
        assert!("abcd".parse::<Hash<20>>().is_err());
    }

    #[test]
    fn slice_width_is_checked() {
        assert!(Hash::<20>::try_from(&[1u8; 19][..]).is_err());
        assert_eq!(Hash::<20>::try_from(&[1u8; 20][..]).unwrap(), Hash::new([1; 20]));
    }

    #[test]
    fn cbor_rejects_other_widths() {
        let bytes = minicbor::to_vec(Hash::<4>::new([1, 2, 3, 4])).unwrap();
        assert!(minicbor::decode::<Hash<20>>(&bytes).is_err());
        assert_eq!(minicbor::decode::<Hash<4>>(&bytes).unwrap(), Hash::new([1, 2, 3, 4]));
    }

    #[test]
    fn zero_hash_is_empty() {
        assert!(Hash::<32>::default().is_empty());
        assert!(!Hash::<32>::new([1; 32]).is_empty());
    }
}
