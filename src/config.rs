use std::collections::HashMap;
use std::net::IpAddr;
use thiserror::Error;

/// Longest accepted retention horizon (about a century).
pub const MAX_RETENTION_DAYS: i64 = 36_500;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub database_path: String,
    /// Run the default-appliance initializer once at startup.
    pub seed_defaults: bool,
    /// Fixed RNG seed for simulation and seeding; entropy when unset.
    pub simulation_seed: Option<u64>,
    /// Energy entries older than this many days are purged by cleanup.
    pub retention_days: i64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let host = env_map
            .get("HOST")
            .map(|s| s.as_str())
            .unwrap_or("127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|_| {
                ConfigError::InvalidValue("HOST".to_string(), "must be an IP address".to_string())
            })?;

        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let seed_defaults = match env_map
            .get("SEED_DEFAULTS")
            .map(|s| s.to_ascii_lowercase())
            .as_deref()
            .unwrap_or("true")
        {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            other => {
                return Err(ConfigError::InvalidValue(
                    "SEED_DEFAULTS".to_string(),
                    format!("must be true or false, got {}", other),
                ))
            }
        };

        let simulation_seed = env_map
            .get("SIMULATION_SEED")
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().parse::<u64>())
            .transpose()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "SIMULATION_SEED".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?;

        let retention_days = env_map
            .get("RETENTION_DAYS")
            .map(|s| s.as_str())
            .unwrap_or("7")
            .parse::<i64>()
            .ok()
            .filter(|d| (1..=MAX_RETENTION_DAYS).contains(d))
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "RETENTION_DAYS".to_string(),
                    format!("must be an integer between 1 and {}", MAX_RETENTION_DAYS),
                )
            })?;

        Ok(Config {
            host,
            port,
            database_path,
            seed_defaults,
            simulation_seed,
            retention_days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("DATABASE_PATH".to_string(), "/tmp/test.db".to_string());
        map
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host.to_string(), "127.0.0.1");
        assert!(config.seed_defaults);
        assert_eq!(config.simulation_seed, None);
        assert_eq!(config.retention_days, 7);
    }

    #[test]
    fn test_missing_database_path() {
        let mut env_map = setup_required_env();
        env_map.remove("DATABASE_PATH");
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "DATABASE_PATH"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_invalid_port() {
        let mut env_map = setup_required_env();
        env_map.insert("PORT".to_string(), "not_a_number".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PORT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_host() {
        let mut env_map = setup_required_env();
        env_map.insert("HOST".to_string(), "localhost:80".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "HOST"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_seed_defaults_disabled() {
        let mut env_map = setup_required_env();
        env_map.insert("SEED_DEFAULTS".to_string(), "FALSE".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert!(!config.seed_defaults);
    }

    #[test]
    fn test_invalid_seed_defaults() {
        let mut env_map = setup_required_env();
        env_map.insert("SEED_DEFAULTS".to_string(), "maybe".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "SEED_DEFAULTS"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_simulation_seed() {
        let mut env_map = setup_required_env();
        env_map.insert("SIMULATION_SEED".to_string(), "42".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.simulation_seed, Some(42));
    }

    #[test]
    fn test_invalid_simulation_seed() {
        let mut env_map = setup_required_env();
        env_map.insert("SIMULATION_SEED".to_string(), "-1".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "SIMULATION_SEED"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_retention_days_must_be_in_range() {
        for bad in ["0", "-3", "week", "36501", "100000000"] {
            let mut env_map = setup_required_env();
            env_map.insert("RETENTION_DAYS".to_string(), bad.to_string());
            match Config::from_env_map(env_map) {
                Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "RETENTION_DAYS"),
                _ => panic!("Expected InvalidValue error for {}", bad),
            }
        }
    }

    #[test]
    fn test_retention_days_upper_bound_accepted() {
        let mut env_map = setup_required_env();
        env_map.insert("RETENTION_DAYS".to_string(), MAX_RETENTION_DAYS.to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.retention_days, MAX_RETENTION_DAYS);
    }
}
