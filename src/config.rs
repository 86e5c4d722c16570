use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::Validate;

use crate::harness::SeedOptions;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Benchmark configuration with validation
#[derive(Clone, Debug, Validate, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BenchConfig {
    /// SQLite database path, `:memory:` for a throwaway database
    #[validate(length(min = 1, message = "Database path cannot be empty"))]
    pub database: String,

    /// Model catalog YAML; the built-in benchmark catalog when unset
    pub schema_path: Option<String>,

    #[validate(range(
        min = 1,
        max = 100000,
        message = "Catalog count must be between 1 and 100000"
    ))]
    pub catalogs: u32,

    #[validate(range(
        min = 1,
        max = 1000000,
        message = "Item count must be between 1 and 1000000"
    ))]
    pub items: u32,

    #[validate(range(
        max = 100000,
        message = "User count must be at most 100000"
    ))]
    pub users: u32,

    #[validate(range(
        max = 1000,
        message = "User group count must be at most 1000"
    ))]
    pub user_groups: u32,

    /// Rounds per strategy; round i filters on catalog type i
    #[validate(range(
        min = 1,
        max = 10000,
        message = "Iterations must be between 1 and 10000"
    ))]
    pub iterations: u32,

    /// Sub-item name every round filters on
    #[validate(length(min = 1, message = "Probe name cannot be empty"))]
    pub probe_name: String,

    #[validate(range(
        min = 0.0,
        max = 1.0,
        message = "Probe ratio must be between 0 and 1"
    ))]
    pub probe_ratio: f64,

    #[validate(range(
        min = 0.0,
        max = 1.0,
        message = "Soft delete ratio must be between 0 and 1"
    ))]
    pub soft_delete_ratio: f64,

    pub seed: u64,

    /// Skip seeding and benchmark the database as found
    pub skip_seed: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        let seed = SeedOptions::default();
        Self {
            database: ":memory:".to_string(),
            schema_path: None,
            catalogs: seed.catalogs,
            items: seed.items,
            users: seed.users,
            user_groups: seed.user_groups,
            iterations: 10,
            probe_name: seed.probe_name,
            probe_ratio: seed.probe_ratio,
            soft_delete_ratio: seed.soft_delete_ratio,
            seed: seed.seed,
            skip_seed: false,
        }
    }
}

impl BenchConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            database: env::var("RELBENCH_DATABASE").unwrap_or(defaults.database),
            schema_path: env::var("RELBENCH_SCHEMA").ok(),
            catalogs: parse_env_var("RELBENCH_CATALOGS", defaults.catalogs)?,
            items: parse_env_var("RELBENCH_ITEMS", defaults.items)?,
            users: parse_env_var("RELBENCH_USERS", defaults.users)?,
            user_groups: parse_env_var("RELBENCH_USER_GROUPS", defaults.user_groups)?,
            iterations: parse_env_var("RELBENCH_ITERATIONS", defaults.iterations)?,
            probe_name: env::var("RELBENCH_PROBE_NAME").unwrap_or(defaults.probe_name),
            probe_ratio: parse_env_var("RELBENCH_PROBE_RATIO", defaults.probe_ratio)?,
            soft_delete_ratio: parse_env_var(
                "RELBENCH_SOFT_DELETE_RATIO",
                defaults.soft_delete_ratio,
            )?,
            seed: parse_env_var("RELBENCH_SEED", defaults.seed)?,
            skip_seed: parse_env_var("RELBENCH_SKIP_SEED", defaults.skip_seed)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file; absent keys take their defaults
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of this configuration
    pub fn with_overrides(mut self, cli: CliOverrides) -> Result<Self, ConfigError> {
        if let Some(database) = cli.database {
            self.database = database;
        }
        if cli.schema_path.is_some() {
            self.schema_path = cli.schema_path;
        }
        if let Some(catalogs) = cli.catalogs {
            self.catalogs = catalogs;
        }
        if let Some(items) = cli.items {
            self.items = items;
        }
        if let Some(iterations) = cli.iterations {
            self.iterations = iterations;
        }
        if let Some(probe_name) = cli.probe_name {
            self.probe_name = probe_name;
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        self.skip_seed |= cli.skip_seed;

        self.validate()?;
        Ok(self)
    }

    pub fn seed_options(&self) -> SeedOptions {
        SeedOptions {
            catalogs: self.catalogs,
            items: self.items,
            users: self.users,
            user_groups: self.user_groups,
            probe_name: self.probe_name.clone(),
            probe_ratio: self.probe_ratio,
            soft_delete_ratio: self.soft_delete_ratio,
            seed: self.seed,
        }
    }
}

/// Values given on the command line; `None` keeps the configured value.
#[derive(Clone, Debug, Default)]
pub struct CliOverrides {
    pub database: Option<String>,
    pub schema_path: Option<String>,
    pub catalogs: Option<u32>,
    pub items: Option<u32>,
    pub iterations: Option<u32>,
    pub probe_name: Option<String>,
    pub seed: Option<u64>,
    pub skip_seed: bool,
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_env_var<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value.parse().map_err(|e| ConfigError::Parse {
            field: key.to_string(),
            value,
            source: Box::new(e),
        }),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(e) => Err(e.into()),
    }
}
