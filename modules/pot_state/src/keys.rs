//! Store key layout of the pot module. Epochs are written big-endian so that
//! prefix scans return them in ascending order.

use sds_common::AccAddress;

pub const TOTAL_MINED_TOKENS_KEY: [u8; 1] = [0x41];
pub const MINED_TOKENS_PREFIX: u8 = 0x42;
pub const LAST_REPORTED_EPOCH_KEY: [u8; 1] = [0x43];
/// Epoch first, then wallet: one epoch's rewards form a contiguous range
pub const INDIVIDUAL_REWARD_PREFIX: u8 = 0x44;
pub const MATURE_TOTAL_REWARD_PREFIX: u8 = 0x45;
pub const IMMATURE_TOTAL_REWARD_PREFIX: u8 = 0x46;
pub const VOLUME_REPORT_PREFIX: u8 = 0x47;
/// One entry per wallet that has ever been credited a reward
pub const REWARD_ADDRESS_POOL_PREFIX: u8 = 0x48;

fn epoch_key(prefix: u8, epoch: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(9);
    key.push(prefix);
    key.extend_from_slice(&epoch.to_be_bytes());
    key
}

fn wallet_key(prefix: u8, wallet: &AccAddress) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + wallet.as_bytes().len());
    key.push(prefix);
    key.extend_from_slice(wallet.as_bytes());
    key
}

pub fn mined_tokens_key(epoch: u64) -> Vec<u8> {
    epoch_key(MINED_TOKENS_PREFIX, epoch)
}

pub fn epoch_rewards_prefix(epoch: u64) -> Vec<u8> {
    epoch_key(INDIVIDUAL_REWARD_PREFIX, epoch)
}

pub fn individual_reward_key(wallet: &AccAddress, epoch: u64) -> Vec<u8> {
    let mut key = epoch_rewards_prefix(epoch);
    key.extend_from_slice(wallet.as_bytes());
    key
}

pub fn mature_total_reward_key(wallet: &AccAddress) -> Vec<u8> {
    wallet_key(MATURE_TOTAL_REWARD_PREFIX, wallet)
}

pub fn immature_total_reward_key(wallet: &AccAddress) -> Vec<u8> {
    wallet_key(IMMATURE_TOTAL_REWARD_PREFIX, wallet)
}

pub fn volume_report_key(epoch: u64) -> Vec<u8> {
    epoch_key(VOLUME_REPORT_PREFIX, epoch)
}

pub fn reward_address_key(wallet: &AccAddress) -> Vec<u8> {
    wallet_key(REWARD_ADDRESS_POOL_PREFIX, wallet)
}
