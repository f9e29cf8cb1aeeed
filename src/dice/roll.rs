//! Dice rolling engine
//!
//! Draws per-die outcomes from an injectable, seedable generator and sums them.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// How a single die draw maps onto its faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollMode {
    /// Uniform over `[1, facets]`
    #[default]
    Uniform,
    /// Uniform over `[1, facets - 1]`, never showing the highest face.
    ///
    /// Matches the dice widget this service replaced, which computed
    /// `1 + floor(random * (facets - 1))`. Only for parity with old results.
    Legacy,
}

impl RollMode {
    /// Highest face a die with `facets` sides can show in this mode
    pub fn highest_face(self, facets: u32) -> u32 {
        match self {
            RollMode::Uniform => facets.max(1),
            RollMode::Legacy => facets.saturating_sub(1).max(1),
        }
    }
}

impl FromStr for RollMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "uniform" | "fair" => Ok(RollMode::Uniform),
            "legacy" | "exclude-max" => Ok(RollMode::Legacy),
            other => Err(format!("unknown roll mode: {}", other)),
        }
    }
}

impl fmt::Display for RollMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RollMode::Uniform => write!(f, "uniform"),
            RollMode::Legacy => write!(f, "legacy"),
        }
    }
}

/// Individual die results plus their sum
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RollOutcome {
    pub outcomes: Vec<u32>,
    pub total: u64,
}

/// Roll `count` dice with `facets` sides each.
///
/// `count == 0` gives an empty outcome with total 0. A `facets` of 0 is
/// treated as a one-sided die; callers validate facets before getting here.
pub fn roll<R: Rng + ?Sized>(rng: &mut R, count: u32, facets: u32, mode: RollMode) -> RollOutcome {
    let highest = mode.highest_face(facets);
    let mut outcomes = Vec::with_capacity(count as usize);

    for _ in 0..count {
        outcomes.push(rng.random_range(1..=highest));
    }

    let total = outcomes.iter().map(|&d| u64::from(d)).sum();
    RollOutcome { outcomes, total }
}

/// Generator plus roll mode, owned by a pool
#[derive(Debug, Clone)]
pub struct RollEngine {
    rng: StdRng,
    mode: RollMode,
}

impl RollEngine {
    /// Engine seeded from OS entropy
    pub fn new(mode: RollMode) -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            mode,
        }
    }

    /// Deterministic engine; the same seed replays the same rolls
    pub fn seeded(seed: u64, mode: RollMode) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            mode,
        }
    }

    /// Seeded if a seed is given, entropy otherwise
    pub fn from_seed(seed: Option<u64>, mode: RollMode) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed, mode),
            None => Self::new(mode),
        }
    }

    pub fn mode(&self) -> RollMode {
        self.mode
    }

    /// Roll `count` dice with `facets` sides
    pub fn roll(&mut self, count: u32, facets: u32) -> RollOutcome {
        roll(&mut self.rng, count, facets, self.mode)
    }
}

impl Default for RollEngine {
    fn default() -> Self {
        Self::new(RollMode::Uniform)
    }
}
