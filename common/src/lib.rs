// SDS ledger-state common library - main library exports

pub mod address;
pub mod cache;
pub mod cbor;
pub mod coin;
pub mod crypto;
pub mod error;
pub mod funds;
pub mod hash;
pub mod pagination;
pub mod peers;
pub mod stores;

// Flattened re-exports
pub use self::address::{AccAddress, PubKey, SdsAddress};
pub use self::coin::{Amount, Coin, Coins};
pub use self::hash::Hash;
