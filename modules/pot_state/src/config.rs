use config::Config;
use serde::Serialize;

const DEFAULT_REWARD_DENOM: (&str, &str) = ("reward-denom", "ustos");
const DEFAULT_MATURE_EPOCH: (&str, u64) = ("mature-epoch", 2016);
const DEFAULT_QUERY_DEFAULT_LIMIT: (&str, u64) = ("query-default-limit", 100);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PotConfig {
    pub reward_denom: String,
    /// Epochs a reward waits before it matures
    pub mature_epoch: u64,
    /// Page size used when a query asks for a limit of zero
    pub query_default_limit: usize,
}

impl Default for PotConfig {
    fn default() -> Self {
        Self {
            reward_denom: DEFAULT_REWARD_DENOM.1.to_string(),
            mature_epoch: DEFAULT_MATURE_EPOCH.1,
            query_default_limit: DEFAULT_QUERY_DEFAULT_LIMIT.1 as usize,
        }
    }
}

impl From<&Config> for PotConfig {
    fn from(config: &Config) -> Self {
        Self {
            reward_denom: config
                .get_string(DEFAULT_REWARD_DENOM.0)
                .unwrap_or_else(|_| DEFAULT_REWARD_DENOM.1.to_string()),
            mature_epoch: config
                .get::<u64>(DEFAULT_MATURE_EPOCH.0)
                .unwrap_or(DEFAULT_MATURE_EPOCH.1),
            query_default_limit: config
                .get::<u64>(DEFAULT_QUERY_DEFAULT_LIMIT.0)
                .unwrap_or(DEFAULT_QUERY_DEFAULT_LIMIT.1) as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::builder().build().unwrap();
        assert_eq!(PotConfig::from(&config), PotConfig::default());
    }

    #[test]
    fn mature_epoch_override() {
        let config = Config::builder().set_override("mature-epoch", 3).unwrap().build().unwrap();
        let pot = PotConfig::from(&config);
        assert_eq!(pot.mature_epoch, 3);
        assert_eq!(pot.query_default_limit, 100);
    }
}
