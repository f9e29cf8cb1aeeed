//! Service configuration
//!
//! Layered with figment: built-in defaults, then a TOML file, then
//! `DICECREAM_*` environment variables. The binary applies CLI flags last.

use std::net::SocketAddr;
use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::dice::{Pool, RollEngine, RollMode, DEFAULT_MAX_DICE_PER_HEAP};

/// Config file read when no path is given (ignored if absent)
pub const DEFAULT_CONFIG_FILE: &str = "dicecream.toml";

/// Prefix for environment overrides, e.g. `DICECREAM_BIND_ADDR`
pub const ENV_PREFIX: &str = "DICECREAM_";

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP API listens on
    pub bind_addr: SocketAddr,
    /// Fixed RNG seed for reproducible rolls; entropy if unset
    pub seed: Option<u64>,
    /// Descriptor of the pool the server starts with
    pub default_pool: String,
    /// Face distribution used for every roll
    pub roll_mode: RollMode,
    /// Most dice a single heap may hold
    pub max_dice_per_heap: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            seed: None,
            default_pool: "1d6".to_string(),
            roll_mode: RollMode::Uniform,
            max_dice_per_heap: DEFAULT_MAX_DICE_PER_HEAP,
        }
    }
}

impl Config {
    /// Layered provider chain; `path` replaces the default config file
    pub fn figment(path: Option<&Path>) -> Figment {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load configuration. An explicitly given file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        if let Some(path) = path {
            if !path.exists() {
                return Err(figment::Error::from(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
        }
        Self::figment(path).extract()
    }

    /// Roll engine described by this config
    pub fn roll_engine(&self) -> RollEngine {
        RollEngine::from_seed(self.seed, self.roll_mode)
    }

    /// Starting pool described by this config
    pub fn build_pool(&self) -> crate::error::Result<Pool> {
        Pool::from_descriptor_limited(&self.default_pool, self.roll_engine(), self.max_dice_per_heap)
    }
}
