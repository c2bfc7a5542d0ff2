//! Account balances consumed by stake transitions
//!
//! The ledger that owns spendable balances lives outside this workspace;
//! stake transitions reach it through [`FundsLedger`] and [`AccountDirectory`].

use std::{collections::BTreeMap, sync::Mutex};

use anyhow::{anyhow, bail, Result};

use crate::{
    address::AccAddress,
    coin::{Amount, Coin, Coins},
};

pub trait FundsLedger: Send + Sync {
    /// True if `account` can spend at least `amount`
    fn has_funds(&self, account: &AccAddress, amount: &Coin) -> bool;

    fn debit(&self, account: &AccAddress, amount: &Coin) -> Result<()>;

    fn credit(&self, account: &AccAddress, amount: &Coin) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub address: AccAddress,
    pub account_number: u64,
}

pub trait AccountDirectory: Send + Sync {
    fn lookup(&self, address: &AccAddress) -> Option<Account>;
}

/// In-memory balances implementing both collaborator traits
#[derive(Debug, Default)]
pub struct InMemoryBank {
    accounts: Mutex<BTreeMap<AccAddress, (Account, Coins)>>,
}

impl InMemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` to `address`, creating the account on first use
    pub fn fund(&self, address: &AccAddress, amount: Coin) -> Result<()> {
        let mut accounts = self.accounts.lock().map_err(|_| anyhow!("bank lock poisoned"))?;
        let next_number = accounts.len() as u64;
        let (_, balance) = accounts.entry(*address).or_insert_with(|| {
            (
                Account {
                    address: *address,
                    account_number: next_number,
                },
                Coins::default(),
            )
        });
        balance.add(&amount);
        Ok(())
    }

    pub fn balance(&self, address: &AccAddress, denom: &str) -> Amount {
        self.accounts
            .lock()
            .ok()
            .and_then(|accounts| accounts.get(address).map(|(_, coins)| coins.amount_of(denom)))
            .unwrap_or(0)
    }
}

impl FundsLedger for InMemoryBank {
    fn has_funds(&self, account: &AccAddress, amount: &Coin) -> bool {
        self.balance(account, &amount.denom) >= amount.amount
    }

    fn debit(&self, account: &AccAddress, amount: &Coin) -> Result<()> {
        let mut accounts = self.accounts.lock().map_err(|_| anyhow!("bank lock poisoned"))?;
        let Some((_, balance)) = accounts.get_mut(account) else {
            bail!("no account {account}");
        };
        let Some(remaining) = balance.checked_sub(amount) else {
            bail!("insufficient funds in {account}: need {amount}");
        };
        *balance = remaining;
        Ok(())
    }

    fn credit(&self, account: &AccAddress, amount: &Coin) -> Result<()> {
        self.fund(account, amount.clone())
    }
}

impl AccountDirectory for InMemoryBank {
    fn lookup(&self, address: &AccAddress) -> Option<Account> {
        let accounts = self.accounts.lock().ok()?;
        accounts.get(address).map(|(account, _)| account.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DENOM: &str = "ustos";

    #[test]
    fn debit_requires_balance() {
        let bank = InMemoryBank::new();
        let owner = AccAddress::new([1; 20]);
        bank.fund(&owner, Coin::new(DENOM, 50)).unwrap();

        assert!(bank.has_funds(&owner, &Coin::new(DENOM, 50)));
        assert!(!bank.has_funds(&owner, &Coin::new(DENOM, 51)));
        assert!(bank.debit(&owner, &Coin::new(DENOM, 51)).is_err());
        assert_eq!(bank.balance(&owner, DENOM), 50);

        bank.debit(&owner, &Coin::new(DENOM, 20)).unwrap();
        assert_eq!(bank.balance(&owner, DENOM), 30);
    }

    #[test]
    fn lookup_only_knows_funded_accounts() {
        let bank = InMemoryBank::new();
        let owner = AccAddress::new([1; 20]);
        assert!(bank.lookup(&owner).is_none());
        bank.credit(&owner, &Coin::new(DENOM, 1)).unwrap();
        assert_eq!(bank.lookup(&owner).map(|a| a.address), Some(owner));
    }
}
