//! Node network addresses, wallet addresses and node public keys

use crate::hash::Hash;
use anyhow::{anyhow, bail, Result};
use std::fmt;

/// Byte length of both address kinds
pub const ADDRESS_LEN: usize = 20;

/// Declares a 20-byte address newtype with a fixed bech32 human-readable part.
macro_rules! declare_address_newtype {
    ($(#[$meta:meta])* $name:ident, $hrp:expr) => {
        $(#[$meta])*
        #[derive(
            Default,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Hash<ADDRESS_LEN>);

        impl $name {
            pub const HRP: &'static str = $hrp;

            pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
                Self(Hash::new(bytes))
            }

            pub fn as_bytes(&self) -> &[u8] {
                self.0.as_ref()
            }

            pub fn to_vec(&self) -> Vec<u8> {
                self.0.to_vec()
            }

            /// True for the all-zero address, used as "no address supplied"
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn to_bech32(&self) -> Result<String> {
                let hrp = bech32::Hrp::parse(Self::HRP)?;
                Ok(bech32::encode::<bech32::Bech32>(hrp, self.0.as_ref())?)
            }

            pub fn from_bech32(text: &str) -> Result<Self> {
                let (hrp, data) = bech32::decode(text)?;
                if hrp.as_str() != Self::HRP {
                    bail!(
                        "Expected {} prefix for {}, got {}",
                        Self::HRP,
                        stringify!($name),
                        hrp.as_str()
                    );
                }
                Self::try_from(data.as_slice())
            }
        }

        impl From<[u8; ADDRESS_LEN]> for $name {
            fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
                Self::new(bytes)
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = anyhow::Error;

            fn try_from(bytes: &[u8]) -> Result<Self> {
                let hash = Hash::try_from(bytes).map_err(|_| {
                    anyhow!("Bad length {} for {}", bytes.len(), stringify!($name))
                })?;
                Ok(Self(hash))
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                self.0.as_ref()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.to_bech32() {
                    Ok(text) => f.write_str(&text),
                    Err(_) => write!(f, "{}", self.0),
                }
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl<C> minicbor::Encode<C> for $name {
            fn encode<W: minicbor::encode::Write>(
                &self,
                e: &mut minicbor::Encoder<W>,
                ctx: &mut C,
            ) -> Result<(), minicbor::encode::Error<W::Error>> {
                minicbor::Encode::encode(&self.0, e, ctx)
            }
        }

        impl<'a, C> minicbor::Decode<'a, C> for $name {
            fn decode(
                d: &mut minicbor::Decoder<'a>,
                ctx: &mut C,
            ) -> Result<Self, minicbor::decode::Error> {
                Ok(Self(<Hash<ADDRESS_LEN> as minicbor::Decode<'a, C>>::decode(d, ctx)?))
            }
        }
    };
}

declare_address_newtype!(
    /// Network address of a resource node; the primary key of node records
    SdsAddress,
    "stsds"
);

declare_address_newtype!(
    /// Wallet address: node owners and reward recipients
    AccAddress,
    "st"
);

/// Raw public key bytes of a node
#[derive(Default, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PubKey(Vec<u8>);

impl PubKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Wallet address derived from this key. Rewards for the node are
    /// recorded against this address.
    pub fn address(&self) -> AccAddress {
        AccAddress::new(crate::crypto::keyhash_160(&self.0))
    }
}

impl fmt::Debug for PubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PubKey({})", hex::encode(&self.0))
    }
}

impl<C> minicbor::Encode<C> for PubKey {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.bytes(&self.0)?.ok()
    }
}

impl<'a, C> minicbor::Decode<'a, C> for PubKey {
    fn decode(
        d: &mut minicbor::Decoder<'a>,
        _ctx: &mut C,
    ) -> Result<Self, minicbor::decode::Error> {
        Ok(Self(d.bytes()?.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bech32_round_trip_keeps_prefix() {
        let addr = SdsAddress::new([7; ADDRESS_LEN]);
        let text = addr.to_bech32().unwrap();
        assert!(text.starts_with("stsds1"));
        assert_eq!(SdsAddress::from_bech32(&text).unwrap(), addr);
    }

    #[test]
    fn bech32_rejects_other_prefix() {
        let wallet = AccAddress::new([7; ADDRESS_LEN]).to_bech32().unwrap();
        assert!(SdsAddress::from_bech32(&wallet).is_err());
    }

    #[test]
    fn pubkey_address_is_deterministic() {
        let key = PubKey::new(vec![1, 2, 3]);
        assert_eq!(key.address(), PubKey::new(vec![1, 2, 3]).address());
        assert_ne!(key.address(), PubKey::new(vec![3, 2, 1]).address());
    }

    #[test]
    fn serde_uses_hex() {
        let addr = AccAddress::new([0xff; ADDRESS_LEN]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", "ff".repeat(ADDRESS_LEN)));
    }

    #[test]
    fn empty_address() {
        assert!(AccAddress::default().is_empty());
        assert!(!AccAddress::new([1; ADDRESS_LEN]).is_empty());
    }
}
