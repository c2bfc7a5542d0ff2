//! Bonded and not-bonded stake totals

use std::sync::Arc;

use sds_common::{
    cbor::{decode_length_prefixed, encode_length_prefixed},
    stores::{Store, WriteBatch},
    Amount, Coin,
};
use tracing::error;

use crate::{
    error::RegisterError,
    keys::{RESOURCE_NODE_BONDED_TOKEN_KEY, RESOURCE_NODE_NOT_BONDED_TOKEN_KEY},
};

/// Snapshot of both pool totals. Transitions work on a copy, validating every
/// transfer before anything is staged, and write the result back through
/// [`TokenPool::stage`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PoolBalances {
    pub bonded: Amount,
    pub not_bonded: Amount,
}

impl PoolBalances {
    pub fn total(&self) -> Option<Amount> {
        self.bonded.checked_add(self.not_bonded)
    }

    pub fn add_bonded(&mut self, amount: Amount) -> Result<(), RegisterError> {
        self.bonded = self.bonded.checked_add(amount).ok_or(RegisterError::Overflow)?;
        Ok(())
    }

    pub fn add_not_bonded(&mut self, amount: Amount) -> Result<(), RegisterError> {
        self.not_bonded = self.not_bonded.checked_add(amount).ok_or(RegisterError::Overflow)?;
        Ok(())
    }

    pub fn sub_not_bonded(&mut self, amount: Amount) -> Result<(), RegisterError> {
        self.not_bonded = self.take_not_bonded(amount)?;
        Ok(())
    }

    pub fn bonded_to_not_bonded(&mut self, amount: Amount) -> Result<(), RegisterError> {
        let Some(bonded) = self.bonded.checked_sub(amount) else {
            error!(
                available = %self.bonded,
                required = %amount,
                "bonded pool below requested transfer"
            );
            return Err(RegisterError::InsufficientBondedPool {
                available: self.bonded,
                required: amount,
            });
        };
        let not_bonded = self.not_bonded.checked_add(amount).ok_or(RegisterError::Overflow)?;
        self.bonded = bonded;
        self.not_bonded = not_bonded;
        Ok(())
    }

    pub fn not_bonded_to_bonded(&mut self, amount: Amount) -> Result<(), RegisterError> {
        let not_bonded = self.take_not_bonded(amount)?;
        let bonded = self.bonded.checked_add(amount).ok_or(RegisterError::Overflow)?;
        self.bonded = bonded;
        self.not_bonded = not_bonded;
        Ok(())
    }

    fn take_not_bonded(&self, amount: Amount) -> Result<Amount, RegisterError> {
        self.not_bonded.checked_sub(amount).ok_or_else(|| {
            error!(
                available = %self.not_bonded,
                required = %amount,
                "not-bonded pool below requested transfer"
            );
            RegisterError::InsufficientNotBondedPool {
                available: self.not_bonded,
                required: amount,
            }
        })
    }
}

/// Persisted pool counters in the bond denomination. A counter never written
/// reads as zero.
pub struct TokenPool {
    store: Arc<dyn Store>,
    denom: String,
}

impl TokenPool {
    pub fn new(store: Arc<dyn Store>, denom: impl Into<String>) -> Self {
        Self {
            store,
            denom: denom.into(),
        }
    }

    pub fn denom(&self) -> &str {
        &self.denom
    }

    pub fn get_bonded(&self) -> Result<Coin, RegisterError> {
        self.read(&RESOURCE_NODE_BONDED_TOKEN_KEY)
    }

    pub fn set_bonded(&self, amount: &Coin) -> Result<(), RegisterError> {
        self.write(&RESOURCE_NODE_BONDED_TOKEN_KEY, amount)
    }

    pub fn get_not_bonded(&self) -> Result<Coin, RegisterError> {
        self.read(&RESOURCE_NODE_NOT_BONDED_TOKEN_KEY)
    }

    pub fn set_not_bonded(&self, amount: &Coin) -> Result<(), RegisterError> {
        self.write(&RESOURCE_NODE_NOT_BONDED_TOKEN_KEY, amount)
    }

    pub fn balances(&self) -> Result<PoolBalances, RegisterError> {
        Ok(PoolBalances {
            bonded: self.get_bonded()?.amount,
            not_bonded: self.get_not_bonded()?.amount,
        })
    }

    /// Adds writes for both totals to `batch`
    pub fn stage(&self, balances: &PoolBalances, batch: &mut WriteBatch) -> Result<(), RegisterError> {
        batch.insert(
            RESOURCE_NODE_BONDED_TOKEN_KEY,
            encode_length_prefixed(&Coin::new(self.denom.as_str(), balances.bonded))?,
        );
        batch.insert(
            RESOURCE_NODE_NOT_BONDED_TOKEN_KEY,
            encode_length_prefixed(&Coin::new(self.denom.as_str(), balances.not_bonded))?,
        );
        Ok(())
    }

    fn read(&self, key: &[u8]) -> Result<Coin, RegisterError> {
        match self.store.get(key)? {
            Some(bytes) => Ok(decode_length_prefixed(&bytes)?),
            None => Ok(Coin::zero(self.denom.as_str())),
        }
    }

    fn write(&self, key: &[u8], amount: &Coin) -> Result<(), RegisterError> {
        if amount.denom != self.denom {
            return Err(RegisterError::InvalidDenom {
                expected: self.denom.clone(),
                got: amount.denom.clone(),
            });
        }
        self.store.set(key, encode_length_prefixed(amount)?)?;
        Ok(())
    }
}
