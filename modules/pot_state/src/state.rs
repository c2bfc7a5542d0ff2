//! SDS pot state: persisted reward records

use std::{collections::BTreeSet, sync::Arc};

use sds_common::{
    cbor::{decode_length_prefixed, encode_length_prefixed},
    peers::PeerRegistry,
    stores::{Store, WriteBatch},
    AccAddress, Coin, Coins,
};
use tracing::info;

use crate::{
    config::PotConfig,
    error::PotError,
    keys::{
        epoch_rewards_prefix, immature_total_reward_key, individual_reward_key,
        mature_total_reward_key, mined_tokens_key, reward_address_key, volume_report_key, LAST_REPORTED_EPOCH_KEY,
        REWARD_ADDRESS_POOL_PREFIX, TOTAL_MINED_TOKENS_KEY,
    },
    types::{EpochSettlement, Reward, VolumeReportRecord},
};

/// Reward ledger. Epoch closes write through [`State::record_epoch`] or the
/// individual setters; everything else only reads.
pub struct State {
    config: PotConfig,
    store: Arc<dyn Store>,
    pub(crate) peers: Arc<dyn PeerRegistry>,
}

impl State {
    pub fn new(config: PotConfig, store: Arc<dyn Store>, peers: Arc<dyn PeerRegistry>) -> Self {
        Self {
            config,
            store,
            peers,
        }
    }

    pub fn config(&self) -> &PotConfig {
        &self.config
    }

    pub fn get_total_mined_tokens(&self) -> Result<Coin, PotError> {
        Ok(self.read(&TOTAL_MINED_TOKENS_KEY)?.unwrap_or_else(|| self.zero()))
    }

    pub fn set_total_mined_tokens(&self, total: &Coin) -> Result<(), PotError> {
        self.check_denom(total)?;
        self.write(&TOTAL_MINED_TOKENS_KEY, total)
    }

    pub fn get_mined_tokens(&self, epoch: u64) -> Result<Coin, PotError> {
        Ok(self.read(&mined_tokens_key(epoch))?.unwrap_or_else(|| self.zero()))
    }

    pub fn set_mined_tokens(&self, epoch: u64, mined: &Coin) -> Result<(), PotError> {
        self.check_denom(mined)?;
        self.write(&mined_tokens_key(epoch), mined)
    }

    /// Zero until the first epoch is reported
    pub fn get_last_reported_epoch(&self) -> Result<u64, PotError> {
        Ok(self.read(&LAST_REPORTED_EPOCH_KEY)?.unwrap_or(0))
    }

    pub fn set_last_reported_epoch(&self, epoch: u64) -> Result<(), PotError> {
        self.check_epoch(epoch)?;
        self.write(&LAST_REPORTED_EPOCH_KEY, &epoch)
    }

    /// Newest epoch whose rewards have matured
    pub fn last_matured_epoch(&self) -> Result<u64, PotError> {
        Ok(self.get_last_reported_epoch()?.saturating_sub(self.config.mature_epoch))
    }

    pub fn get_individual_reward(
        &self,
        wallet: &AccAddress,
        epoch: u64,
    ) -> Result<Option<Reward>, PotError> {
        self.read(&individual_reward_key(wallet, epoch))
    }

    pub fn set_individual_reward(
        &self,
        wallet: &AccAddress,
        epoch: u64,
        reward: &Reward,
    ) -> Result<(), PotError> {
        let mut batch = WriteBatch::new();
        stage(&mut batch, individual_reward_key(wallet, epoch), reward)?;
        stage_reward_addresses(&mut batch, [*wallet]);
        self.commit(batch)
    }

    /// Every individual reward of `epoch`, ordered by wallet
    pub fn get_epoch_rewards(&self, epoch: u64) -> Result<Vec<Reward>, PotError> {
        let rewards = self
            .store
            .prefix_values(&epoch_rewards_prefix(epoch))?
            .iter()
            .map(|bytes| decode_length_prefixed(bytes))
            .collect::<anyhow::Result<Vec<Reward>>>()?;
        Ok(rewards)
    }

    pub fn get_mature_total_reward(&self, wallet: &AccAddress) -> Result<Coins, PotError> {
        Ok(self.read(&mature_total_reward_key(wallet))?.unwrap_or_default())
    }

    pub fn set_mature_total_reward(&self, wallet: &AccAddress, total: &Coins) -> Result<(), PotError> {
        let mut batch = WriteBatch::new();
        stage(&mut batch, mature_total_reward_key(wallet), total)?;
        stage_reward_addresses(&mut batch, [*wallet]);
        self.commit(batch)
    }

    pub fn get_immature_total_reward(&self, wallet: &AccAddress) -> Result<Coins, PotError> {
        Ok(self.read(&immature_total_reward_key(wallet))?.unwrap_or_default())
    }

    pub fn set_immature_total_reward(
        &self,
        wallet: &AccAddress,
        total: &Coins,
    ) -> Result<(), PotError> {
        let mut batch = WriteBatch::new();
        stage(&mut batch, immature_total_reward_key(wallet), total)?;
        stage_reward_addresses(&mut batch, [*wallet]);
        self.commit(batch)
    }

    pub fn get_volume_report(&self, epoch: u64) -> Result<Option<VolumeReportRecord>, PotError> {
        self.read(&volume_report_key(epoch))
    }

    pub fn set_volume_report(
        &self,
        epoch: u64,
        report: &VolumeReportRecord,
    ) -> Result<(), PotError> {
        self.write(&volume_report_key(epoch), report)
    }

    /// Wallets that hold any reward record, in address order
    pub fn get_reward_address_pool(&self) -> Result<BTreeSet<AccAddress>, PotError> {
        let mut wallets = BTreeSet::new();
        for raw in self.store.prefix_values(&[REWARD_ADDRESS_POOL_PREFIX])? {
            wallets.insert(AccAddress::try_from(raw.as_slice())?);
        }
        Ok(wallets)
    }

    /// Writes every record of an epoch close in one batch. Recording an epoch
    /// again replaces its mined amount in the running total rather than adding
    /// to it.
    pub fn record_epoch(&self, settlement: &EpochSettlement) -> Result<(), PotError> {
        let epoch = settlement.epoch;
        self.check_denom(&settlement.mined_tokens)?;
        self.check_epoch(epoch)?;

        let previous = self.get_mined_tokens(epoch)?;
        let total = self
            .get_total_mined_tokens()?
            .amount
            .saturating_sub(previous.amount)
            .checked_add(settlement.mined_tokens.amount)
            .ok_or(PotError::Overflow)?;

        let mut batch = WriteBatch::new();
        stage(&mut batch, TOTAL_MINED_TOKENS_KEY, &Coin::new(self.config.reward_denom.as_str(), total))?;
        stage(&mut batch, mined_tokens_key(epoch), &settlement.mined_tokens)?;
        for reward in &settlement.individual_rewards {
            stage(&mut batch, individual_reward_key(&reward.node_address, epoch), reward)?;
        }
        for (wallet, coins) in &settlement.mature_totals {
            stage(&mut batch, mature_total_reward_key(wallet), coins)?;
        }
        for (wallet, coins) in &settlement.immature_totals {
            stage(&mut batch, immature_total_reward_key(wallet), coins)?;
        }
        stage(&mut batch, volume_report_key(epoch), &settlement.volume_report)?;
        stage(&mut batch, LAST_REPORTED_EPOCH_KEY, &epoch)?;

        let wallets = settlement
            .individual_rewards
            .iter()
            .map(|reward| reward.node_address)
            .chain(settlement.mature_totals.keys().copied())
            .chain(settlement.immature_totals.keys().copied());
        stage_reward_addresses(&mut batch, wallets);
        self.commit(batch)?;

        info!(
            epoch,
            rewards = settlement.individual_rewards.len(),
            mined = %settlement.mined_tokens,
            total_mined = %total,
            "recorded epoch"
        );
        Ok(())
    }

    fn check_denom(&self, amount: &Coin) -> Result<(), PotError> {
        if amount.denom != self.config.reward_denom {
            return Err(PotError::InvalidDenom {
                expected: self.config.reward_denom.clone(),
                got: amount.denom.clone(),
            });
        }
        Ok(())
    }

    fn check_epoch(&self, epoch: u64) -> Result<(), PotError> {
        let last_reported = self.get_last_reported_epoch()?;
        if epoch < last_reported {
            return Err(PotError::EpochRegression {
                epoch,
                last_reported,
            });
        }
        Ok(())
    }

    fn zero(&self) -> Coin {
        Coin::zero(self.config.reward_denom.as_str())
    }

    fn read<T>(&self, key: &[u8]) -> Result<Option<T>, PotError>
    where
        T: for<'b> minicbor::Decode<'b, ()>,
    {
        match self.store.get(key)? {
            Some(bytes) => Ok(Some(decode_length_prefixed(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write<T>(&self, key: &[u8], value: &T) -> Result<(), PotError>
    where
        T: minicbor::Encode<()>,
    {
        self.store.set(key, encode_length_prefixed(value)?)?;
        Ok(())
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), PotError> {
        self.store.commit(batch)?;
        Ok(())
    }
}

fn stage<T>(batch: &mut WriteBatch, key: impl Into<Vec<u8>>, value: &T) -> Result<(), PotError>
where
    T: minicbor::Encode<()>,
{
    batch.insert(key, encode_length_prefixed(value)?);
    Ok(())
}

/// Pool entries are keyed by wallet, so staging a known wallet again is a
/// plain overwrite
fn stage_reward_addresses(batch: &mut WriteBatch, wallets: impl IntoIterator<Item = AccAddress>) {
    for wallet in wallets {
        batch.insert(reward_address_key(&wallet), wallet.to_vec());
    }
}
