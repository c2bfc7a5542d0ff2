//! Pluggable policies consulted by stake transitions

use sds_common::{AccAddress, Amount, Coin};

/// Reduces a stake refund by whatever the owner has been slashed
pub trait SlashingPolicy: Send + Sync {
    fn deduct_slashing(&self, owner: &AccAddress, refund: &Coin) -> Coin;
}

/// Refunds in full
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSlashing;

impl SlashingPolicy for NoSlashing {
    fn deduct_slashing(&self, _owner: &AccAddress, refund: &Coin) -> Coin {
        refund.clone()
    }
}

/// Maps a stake change onto the bandwidth allowance it buys
pub trait CapacityPolicy: Send + Sync {
    fn capacity_change(&self, stake_delta: Amount) -> Amount;
}

/// `stake_delta * numerator / denominator`, saturating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearCapacity {
    pub numerator: Amount,
    pub denominator: Amount,
}

impl Default for LinearCapacity {
    fn default() -> Self {
        Self {
            numerator: 1,
            denominator: 1,
        }
    }
}

impl CapacityPolicy for LinearCapacity {
    fn capacity_change(&self, stake_delta: Amount) -> Amount {
        if self.denominator == 0 {
            return 0;
        }
        stake_delta.saturating_mul(self.numerator) / self.denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_capacity_is_monotonic() {
        let policy = LinearCapacity {
            numerator: 3,
            denominator: 2,
        };
        let mut last = 0;
        for delta in [0, 1, 2, 10, 1_000, u128::MAX] {
            let capacity = policy.capacity_change(delta);
            assert!(capacity >= last);
            last = capacity;
        }
        assert_eq!(policy.capacity_change(10), 15);
    }

    #[test]
    fn no_slashing_refunds_everything() {
        let refund = Coin::new("ustos", 42);
        assert_eq!(NoSlashing.deduct_slashing(&AccAddress::default(), &refund), refund);
    }
}
