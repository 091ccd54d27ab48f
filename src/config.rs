use std::{env, fmt::Display, str::FromStr};

use log::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub store_backend: StoreBackend,
    pub database_url: String,
    pub admin_secret: Option<String>,
    pub reject_duplicate_projects: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            store_backend: StoreBackend::Sqlite,
            database_url: "sqlite:hackathon_vote.db".to_string(),
            admin_secret: None,
            reject_duplicate_projects: false,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let defaults = Self::default();
        Self {
            port: try_load("PORT", defaults.port),
            store_backend: try_load("STORE_BACKEND", defaults.store_backend),
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            admin_secret: env::var("ADMIN_SECRET").ok().filter(|s| !s.trim().is_empty()),
            reject_duplicate_projects: try_load("REJECT_DUPLICATE_PROJECTS", defaults.reject_duplicate_projects),
        }
    }
}

// Parse an environment variable, falling back to the default when unset or invalid
fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => parse_or(key, &raw, default),
        Err(_) => {
            info!("{key} not set, using default: {default:?}");
            default
        }
    }
}

fn parse_or<T>(key: &str, raw: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
    T::Err: Display,
{
    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value '{raw}': {e}, using default: {default:?}");
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_parse_case_insensitively() {
        assert_eq!("SQLite".parse::<StoreBackend>(), Ok(StoreBackend::Sqlite));
        assert_eq!(" memory ".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert!("sheets".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn invalid_values_fall_back_to_default() {
        assert_eq!(parse_or("PORT", "8080", 3000u16), 8080);
        assert_eq!(parse_or("PORT", "eighty", 3000u16), 3000);
        assert!(parse_or("REJECT_DUPLICATE_PROJECTS", "true", false));
        assert!(!parse_or("REJECT_DUPLICATE_PROJECTS", "yes", false));
    }
}
