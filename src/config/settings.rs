//! Application settings loading.
//!
//! Settings come from environment variables (with `.env` support handled by the
//! binary), plus an optional `config.toml` that can replace the built-in default
//! category seed list. The defaults mirror the category set users see on first
//! contact with the assistant.

use crate::entities::TransactionKind;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default time-to-live for cached statistics.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default maximum number of cached statistics entries.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Database connection string
    pub database_url: String,
    /// How long cached statistics stay fresh
    pub cache_ttl: Duration,
    /// Maximum number of cached statistics entries
    pub cache_capacity: usize,
    /// Categories seeded at initialization
    pub default_categories: Vec<CategorySeed>,
}

/// One category to seed at initialization.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CategorySeed {
    /// Category display name
    pub name: String,
    /// Income or expense
    pub kind: TransactionKind,
}

/// Structure of the optional `config.toml` file.
#[derive(Debug, Deserialize)]
struct FileConfig {
    /// Replacement for the built-in default category list
    categories: Vec<CategorySeed>,
}

/// The built-in category set, matching what the assistant offers out of the box.
#[must_use]
pub fn builtin_default_categories() -> Vec<CategorySeed> {
    let income = ["salary", "freelance", "investments", "gifts", "other"];
    let expense = [
        "food",
        "transport",
        "housing",
        "entertainment",
        "health",
        "clothes",
        "electronics",
        "other",
    ];

    income
        .iter()
        .map(|name| CategorySeed {
            name: (*name).to_string(),
            kind: TransactionKind::Income,
        })
        .chain(expense.iter().map(|name| CategorySeed {
            name: (*name).to_string(),
            kind: TransactionKind::Expense,
        }))
        .collect()
}

/// Loads the default-category list from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_category_config<P: AsRef<Path>>(path: P) -> Result<Vec<CategorySeed>> {
    let contents = std::fs::read_to_string(path.as_ref())?;

    let parsed: FileConfig = toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    Ok(parsed.categories)
}

/// Loads the main application configuration.
///
/// Environment variables consulted: `DATABASE_URL`, `CACHE_TTL_SECONDS`,
/// `CACHE_CAPACITY`. If `./config.toml` exists it replaces the built-in
/// default category list; otherwise the built-in list is used.
pub fn load_app_configuration() -> Result<AppConfig> {
    let cache_ttl = match std::env::var("CACHE_TTL_SECONDS") {
        Ok(raw) => {
            let secs: u64 = raw.parse().map_err(|e| Error::Config {
                message: format!("CACHE_TTL_SECONDS must be a whole number of seconds: {e}"),
            })?;
            Duration::from_secs(secs)
        }
        Err(_) => DEFAULT_CACHE_TTL,
    };

    let cache_capacity = match std::env::var("CACHE_CAPACITY") {
        Ok(raw) => raw.parse().map_err(|e| Error::Config {
            message: format!("CACHE_CAPACITY must be a whole number: {e}"),
        })?,
        Err(_) => DEFAULT_CACHE_CAPACITY,
    };

    let default_categories = if Path::new("config.toml").exists() {
        load_category_config("config.toml")?
    } else {
        builtin_default_categories()
    };

    Ok(AppConfig {
        database_url: super::database::get_database_url(),
        cache_ttl,
        cache_capacity,
        default_categories,
    })
}
