use chrono::NaiveDate;

use pennywise_core::transactions::{AssetType, HoldingsFilter};
use std::path::Path;

use pennywise_storage_sqlite::db::DB_FILE_NAME;

/// Job options read from the environment. Engine options live in
/// `EngineSettings`.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: String,
    /// Values the portfolio as of this date instead of today.
    pub as_of: Option<NaiveDate>,
    pub filter: HoldingsFilter,
    /// Skips the realized-profit sync and only prints holdings.
    pub skip_realized: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // PENNYWISE_DB_PATH, then DATABASE_URL, then the default file in the data dir.
        let db_path = match lookup("PENNYWISE_DB_PATH").or_else(|| lookup("DATABASE_URL")) {
            Some(path) => path,
            None => {
                let data_dir = lookup("PENNYWISE_DATA_DIR").unwrap_or_else(|| ".".to_string());
                Path::new(&data_dir)
                    .join(DB_FILE_NAME)
                    .to_string_lossy()
                    .into_owned()
            }
        };

        let as_of = lookup("PENNYWISE_AS_OF")
            .map(|raw| {
                NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .map_err(|e| anyhow::anyhow!("PENNYWISE_AS_OF={}: {}", raw, e))
            })
            .transpose()?;

        let asset_type = lookup("PENNYWISE_ASSET_TYPE")
            .map(|raw| {
                AssetType::from_db_str(&raw.to_ascii_uppercase())
                    .ok_or_else(|| anyhow::anyhow!("PENNYWISE_ASSET_TYPE={} is not known", raw))
            })
            .transpose()?;

        let skip_realized = lookup("PENNYWISE_SKIP_REALIZED")
            .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            db_path,
            as_of,
            filter: HoldingsFilter {
                asset_type,
                symbol: lookup("PENNYWISE_SYMBOL").filter(|s| !s.trim().is_empty()),
            },
            skip_realized,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_explicit_db_path_and_filter() {
        let config = Config::from_lookup(lookup_from(&[
            ("PENNYWISE_DB_PATH", "/data/pennywise.db"),
            ("PENNYWISE_AS_OF", "2024-03-08"),
            ("PENNYWISE_ASSET_TYPE", "etf"),
            ("PENNYWISE_SYMBOL", "0050"),
            ("PENNYWISE_SKIP_REALIZED", "true"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, "/data/pennywise.db");
        assert_eq!(config.as_of, NaiveDate::from_ymd_opt(2024, 3, 8));
        assert_eq!(config.filter.asset_type, Some(AssetType::Etf));
        assert_eq!(config.filter.symbol.as_deref(), Some("0050"));
        assert!(config.skip_realized);
    }

    #[test]
    fn test_db_path_resolution_uses_lookup_only() {
        let from_url = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "/srv/url.db"),
            ("PENNYWISE_DATA_DIR", "/srv/data"),
        ]))
        .unwrap();
        assert_eq!(from_url.db_path, "/srv/url.db");

        let explicit = Config::from_lookup(lookup_from(&[
            ("PENNYWISE_DB_PATH", "/srv/explicit.db"),
            ("DATABASE_URL", "/srv/url.db"),
        ]))
        .unwrap();
        assert_eq!(explicit.db_path, "/srv/explicit.db");

        let default =
            Config::from_lookup(lookup_from(&[("PENNYWISE_DATA_DIR", "/srv/data")])).unwrap();
        assert_eq!(
            default.db_path,
            Path::new("/srv/data").join(DB_FILE_NAME).to_string_lossy()
        );
    }

    #[test]
    fn test_bad_values_are_rejected() {
        assert!(Config::from_lookup(lookup_from(&[
            ("PENNYWISE_DB_PATH", "x.db"),
            ("PENNYWISE_AS_OF", "08/03/2024"),
        ]))
        .is_err());
        assert!(Config::from_lookup(lookup_from(&[
            ("PENNYWISE_DB_PATH", "x.db"),
            ("PENNYWISE_ASSET_TYPE", "warrant"),
        ]))
        .is_err());
    }
}
