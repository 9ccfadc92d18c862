//! Runtime configuration loaded from the environment
//!
//! `main` calls `dotenvy::dotenv()` first so a local `.env` file is honoured.

use std::env;
use std::str::FromStr;

/// Environment variable for the database connection string (required)
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";

/// Environment variable for the listen address
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";

/// Environment variable selecting inline or background template sync
pub const ENV_SYNC_MODE: &str = "TEMPLATE_SYNC_MODE";

/// Environment variable selecting the template document mirroring strategy
pub const ENV_DOCUMENT_STRATEGY: &str = "TEMPLATE_DOCUMENT_STRATEGY";

/// Environment variable to skip migrations at startup
pub const ENV_RUN_MIGRATIONS: &str = "RUN_MIGRATIONS";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// How a mutation's follow-up template sync is scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Awaited within the request; failures are still swallowed
    #[default]
    Inline,
    /// Spawned on the runtime after the primary write returns
    Background,
}

impl FromStr for SyncMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inline" => Ok(SyncMode::Inline),
            "background" => Ok(SyncMode::Background),
            _ => Err(format!("Unknown template sync mode: {}", s)),
        }
    }
}

/// How template documents are brought in line with the operation's documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentMirrorStrategy {
    /// Delete every template document, then copy the operation's set
    #[default]
    FullReplace,
    /// Add missing and remove extra documents keyed on URL, keep matching rows
    DiffByUrl,
}

impl FromStr for DocumentMirrorStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full_replace" => Ok(DocumentMirrorStrategy::FullReplace),
            "diff_by_url" => Ok(DocumentMirrorStrategy::DiffByUrl),
            _ => Err(format!("Unknown template document strategy: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncSettings {
    pub mode: SyncMode,
    pub document_strategy: DocumentMirrorStrategy,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub run_migrations: bool,
    pub sync: SyncSettings,
}

impl AppConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let database_url =
            lookup(ENV_DATABASE_URL).ok_or_else(|| format!("{} must be set", ENV_DATABASE_URL))?;

        let bind_addr = lookup(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let run_migrations = lookup(ENV_RUN_MIGRATIONS)
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        let mode = match lookup(ENV_SYNC_MODE) {
            Some(value) => value.parse()?,
            None => SyncMode::default(),
        };

        let document_strategy = match lookup(ENV_DOCUMENT_STRATEGY) {
            Some(value) => value.parse()?,
            None => DocumentMirrorStrategy::default(),
        };

        Ok(Self {
            database_url,
            bind_addr,
            run_migrations,
            sync: SyncSettings {
                mode,
                document_strategy,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            AppConfig::from_lookup(lookup_from(&[(ENV_DATABASE_URL, "postgres://localhost/wo")]))
                .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert!(config.run_migrations);
        assert_eq!(config.sync.mode, SyncMode::Inline);
        assert_eq!(config.sync.document_strategy, DocumentMirrorStrategy::FullReplace);
    }

    #[test]
    fn test_database_url_required() {
        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.contains("DATABASE_URL"));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (ENV_DATABASE_URL, "postgres://localhost/wo"),
            (ENV_SYNC_MODE, "Background"),
            (ENV_DOCUMENT_STRATEGY, "diff_by_url"),
            (ENV_RUN_MIGRATIONS, "false"),
        ]))
        .unwrap();
        assert_eq!(config.sync.mode, SyncMode::Background);
        assert_eq!(config.sync.document_strategy, DocumentMirrorStrategy::DiffByUrl);
        assert!(!config.run_migrations);
    }

    #[test]
    fn test_invalid_strategy_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[
            (ENV_DATABASE_URL, "postgres://localhost/wo"),
            (ENV_DOCUMENT_STRATEGY, "merge"),
        ]));
        assert!(result.is_err());
    }
}
