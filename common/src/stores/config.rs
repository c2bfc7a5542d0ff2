use config::Config;
use serde::Serialize;

const DEFAULT_DATABASE_PATH: (&str, &str) = ("database-path", "fjall-sds");
const DEFAULT_CLEAR_ON_START: (&str, bool) = ("clear-on-start", false);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreConfig {
    pub database_path: String,
    pub clear_on_start: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.1.to_string(),
            clear_on_start: DEFAULT_CLEAR_ON_START.1,
        }
    }
}

impl From<&Config> for StoreConfig {
    fn from(config: &Config) -> Self {
        Self {
            database_path: config
                .get_string(DEFAULT_DATABASE_PATH.0)
                .unwrap_or_else(|_| DEFAULT_DATABASE_PATH.1.to_string()),
            clear_on_start: config
                .get_bool(DEFAULT_CLEAR_ON_START.0)
                .unwrap_or(DEFAULT_CLEAR_ON_START.1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = Config::builder().build().unwrap();
        assert_eq!(StoreConfig::from(&config), StoreConfig::default());
    }

    #[test]
    fn reads_kebab_case_keys() {
        let config = Config::builder()
            .set_override("database-path", "/tmp/sds-ledger")
            .unwrap()
            .set_override("clear-on-start", true)
            .unwrap()
            .build()
            .unwrap();
        let store_config = StoreConfig::from(&config);
        assert_eq!(store_config.database_path, "/tmp/sds-ledger");
        assert!(store_config.clear_on_start);
    }
}
