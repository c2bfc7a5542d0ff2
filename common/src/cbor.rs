//! CBOR helpers for persisted values

use anyhow::{bail, Context, Result};

/// Width of the body length written in front of every persisted value
pub const LENGTH_PREFIX_LEN: usize = 4;

// Custom codec module for u128 (similar to minicbor::bytes pattern)
// CBOR doesn't natively support 128-bit integers, so we encode as 16 bytes
pub mod u128_cbor_codec {
    use minicbor::{Decoder, Encoder};

    /// Encode u128 as 16 bytes in big-endian format
    /// For use with `#[cbor(with = "u128_cbor_codec")]`
    pub fn encode<C, W: minicbor::encode::Write>(
        v: &u128,
        e: &mut Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.bytes(&v.to_be_bytes())?;
        Ok(())
    }

    /// Decode u128 from 16 bytes in big-endian format
    /// For use with `#[cbor(with = "u128_cbor_codec")]`
    pub fn decode<'b, C>(d: &mut Decoder<'b>, _ctx: &mut C) -> Result<u128, minicbor::decode::Error> {
        let bytes = d.bytes()?;
        if bytes.len() != 16 {
            return Err(minicbor::decode::Error::message("Expected 16 bytes for u128"));
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(bytes);
        Ok(u128::from_be_bytes(arr))
    }
}

/// Encode `value` as a big-endian u32 body length followed by its CBOR body
pub fn encode_length_prefixed<T>(value: &T) -> Result<Vec<u8>>
where
    T: minicbor::Encode<()>,
{
    let body = minicbor::to_vec(value)?;
    let len = u32::try_from(body.len()).context("value too large for length prefix")?;
    let mut bytes = Vec::with_capacity(LENGTH_PREFIX_LEN + body.len());
    bytes.extend_from_slice(&len.to_be_bytes());
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Inverse of [`encode_length_prefixed`]; the prefix must match the body exactly
pub fn decode_length_prefixed<T>(bytes: &[u8]) -> Result<T>
where
    T: for<'b> minicbor::Decode<'b, ()>,
{
    if bytes.len() < LENGTH_PREFIX_LEN {
        bail!("value of {} bytes is shorter than its length prefix", bytes.len());
    }
    let (prefix, body) = bytes.split_at(LENGTH_PREFIX_LEN);
    let mut len = [0u8; LENGTH_PREFIX_LEN];
    len.copy_from_slice(prefix);
    let len = u32::from_be_bytes(len) as usize;
    if len != body.len() {
        bail!("length prefix {len} does not match body of {} bytes", body.len());
    }
    Ok(minicbor::decode(body)?)
}
