use config::Config;
use serde::Serialize;

const DEFAULT_BOND_DENOM: (&str, &str) = ("bond-denom", "ustos");
const DEFAULT_NODE_CACHE_SIZE: (&str, u64) = ("node-cache-size", 500);
// 180 days
const DEFAULT_UNBONDING_PERIOD_SECS: (&str, u64) = ("unbonding-period-secs", 15_552_000);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterConfig {
    /// The only denomination accepted as stake
    pub bond_denom: String,
    /// Entries held by the node decode cache
    pub node_cache_size: usize,
    pub unbonding_period_secs: u64,
}

impl Default for RegisterConfig {
    fn default() -> Self {
        Self {
            bond_denom: DEFAULT_BOND_DENOM.1.to_string(),
            node_cache_size: DEFAULT_NODE_CACHE_SIZE.1 as usize,
            unbonding_period_secs: DEFAULT_UNBONDING_PERIOD_SECS.1,
        }
    }
}

impl From<&Config> for RegisterConfig {
    fn from(config: &Config) -> Self {
        Self {
            bond_denom: config
                .get_string(DEFAULT_BOND_DENOM.0)
                .unwrap_or_else(|_| DEFAULT_BOND_DENOM.1.to_string()),
            node_cache_size: config
                .get::<u64>(DEFAULT_NODE_CACHE_SIZE.0)
                .unwrap_or(DEFAULT_NODE_CACHE_SIZE.1) as usize,
            unbonding_period_secs: config
                .get::<u64>(DEFAULT_UNBONDING_PERIOD_SECS.0)
                .unwrap_or(DEFAULT_UNBONDING_PERIOD_SECS.1),
        }
    }
}
