//! Token amounts in a named denomination

use serde::{Deserialize, Serialize};
use std::fmt;

/// Token amount in the smallest unit of a denomination
pub type Amount = u128;

/// A single amount of one denomination
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    minicbor::Encode,
    minicbor::Decode,
)]
pub struct Coin {
    #[n(0)]
    pub denom: String,
    #[n(1)]
    #[cbor(with = "crate::cbor::u128_cbor_codec")]
    pub amount: Amount,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: Amount) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    pub fn zero(denom: impl Into<String>) -> Self {
        Self::new(denom, 0)
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Amount comparison; only meaningful within one denomination
    pub fn is_lt(&self, other: &Coin) -> bool {
        self.amount < other.amount
    }

    /// None on denomination mismatch or overflow
    pub fn checked_add(&self, other: &Coin) -> Option<Coin> {
        if self.denom != other.denom {
            return None;
        }
        let amount = self.amount.checked_add(other.amount)?;
        Some(Coin::new(self.denom.clone(), amount))
    }

    /// None on denomination mismatch or underflow
    pub fn checked_sub(&self, other: &Coin) -> Option<Coin> {
        if self.denom != other.denom {
            return None;
        }
        let amount = self.amount.checked_sub(other.amount)?;
        Some(Coin::new(self.denom.clone(), amount))
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Set of coins, at most one per denomination, sorted by denomination and
/// without zero amounts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coins(Vec<Coin>);

impl Coins {
    pub fn new(coins: impl IntoIterator<Item = Coin>) -> Self {
        let mut set = Coins::default();
        for coin in coins {
            set.add(&coin);
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coin> {
        self.0.iter()
    }

    /// Amount held in `denom`, zero if absent
    pub fn amount_of(&self, denom: &str) -> Amount {
        self.0.iter().find(|c| c.denom == denom).map(|c| c.amount).unwrap_or(0)
    }

    /// Merges `coin` into the set, saturating on overflow
    pub fn add(&mut self, coin: &Coin) {
        if coin.is_zero() {
            return;
        }
        match self.0.binary_search_by(|c| c.denom.as_str().cmp(coin.denom.as_str())) {
            Ok(index) => {
                let existing = &mut self.0[index];
                existing.amount = existing.amount.saturating_add(coin.amount);
            }
            Err(index) => self.0.insert(index, coin.clone()),
        }
    }

    /// Set with `coin` taken out, None if the set holds less than `coin`
    pub fn checked_sub(&self, coin: &Coin) -> Option<Coins> {
        let remaining = self.amount_of(&coin.denom).checked_sub(coin.amount)?;
        let mut coins: Vec<Coin> =
            self.0.iter().filter(|c| c.denom != coin.denom).cloned().collect();
        coins.push(Coin::new(coin.denom.clone(), remaining));
        Some(Coins::new(coins))
    }
}

impl<C> minicbor::Encode<C> for Coins {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        minicbor::Encode::encode(&self.0, e, ctx)
    }
}

impl<'a, C> minicbor::Decode<'a, C> for Coins {
    fn decode(d: &mut minicbor::Decoder<'a>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let coins = <Vec<Coin> as minicbor::Decode<'a, C>>::decode(d, ctx)?;
        Ok(Coins::new(coins))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_arithmetic_requires_matching_denom() {
        let a = Coin::new("ustos", 10);
        let b = Coin::new("wei", 10);
        assert!(a.checked_add(&b).is_none());
        assert!(a.checked_sub(&b).is_none());
        assert_eq!(a.checked_add(&a), Some(Coin::new("ustos", 20)));
    }

    #[test]
    fn checked_sub_detects_underflow() {
        let small = Coin::new("ustos", 5);
        let large = Coin::new("ustos", 6);
        assert!(small.checked_sub(&large).is_none());
        assert!(small.is_lt(&large));
        assert_eq!(large.checked_sub(&small), Some(Coin::new("ustos", 1)));
    }

    #[test]
    fn coins_merge_and_sort() {
        let coins = Coins::new(vec![
            Coin::new("wei", 3),
            Coin::new("ustos", 1),
            Coin::new("wei", 4),
            Coin::new("zero", 0),
        ]);
        let denoms: Vec<_> = coins.iter().map(|c| c.denom.as_str()).collect();
        assert_eq!(denoms, vec!["ustos", "wei"]);
        assert_eq!(coins.amount_of("wei"), 7);
        assert_eq!(coins.amount_of("zero"), 0);
    }

    #[test]
    fn coins_checked_sub_drops_emptied_denom() {
        let coins = Coins::new(vec![Coin::new("ustos", 5), Coin::new("wei", 2)]);
        let left = coins.checked_sub(&Coin::new("wei", 2)).unwrap();
        assert_eq!(left, Coins::new(vec![Coin::new("ustos", 5)]));
        assert!(coins.checked_sub(&Coin::new("ustos", 6)).is_none());
        assert!(coins.checked_sub(&Coin::new("other", 1)).is_none());
    }

    #[test]
    fn large_amounts_survive_cbor() {
        let coin = Coin::new("wei", u128::MAX - 1);
        let bytes = minicbor::to_vec(&coin).unwrap();
        assert_eq!(minicbor::decode::<Coin>(&bytes).unwrap(), coin);
    }
}
