//! variables.rs: rule / strategy selections and search parameters.
//!
//! Selections parse from their canonical wire tokens; unknown tokens are an
//! explicit "invalid selection" (`CoreError::UnknownSelection`).

use core::fmt;
use core::str::FromStr;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

// ------------ Macros ------------

/// Define a selection enum with explicit wire tokens (plus accepted aliases).
macro_rules! selection_enum {
    ($name:ident, $kind:literal => { $($variant:ident = $token:literal $(| $alias:literal)*),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub enum $name {
            $(
                #[cfg_attr(feature = "serde", serde(rename = $token))]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $token,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($token $(| $alias)* => Ok($name::$variant),)+
                    other => Err(CoreError::UnknownSelection($kind, other.to_string())),
                }
            }
        }
    };
}

// ------------ Canonical selections ------------

selection_enum!(RuleKind, "voting system" => {
    Plurality = "plurality",
    Borda     = "borda",
    Irv       = "irv"
});

selection_enum!(StrategyMode, "voting strategy" => {
    Single        = "single" | "bush",
    FullCoalition = "coalition" | "nixon",
    Sampling      = "sampling" | "gandhi",
    Sincere       = "sincere"
});

impl Default for StrategyMode {
    fn default() -> Self {
        StrategyMode::Single
    }
}

// ------------ Search parameters ------------

/// Default overall time limit.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(10);
/// Seed of the IRV hill-climb RNG.
pub const DEFAULT_IRV_SEED: u64 = 12;
/// Seed of the sampling perturbation RNG.
pub const DEFAULT_SAMPLING_SEED: u64 = 13;
/// Share of the budget split among per-voter IRV searches in `FullCoalition`.
pub const DEFAULT_COALITION_SHARE: f64 = 0.66;
/// Share of the remaining budget granted to each per-sample IRV search.
pub const DEFAULT_SAMPLE_SHARE: f64 = 0.10;

/// Tuning constants of the bounded searches. The shares are empirical.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchParams {
    pub time_limit: Duration,
    pub irv_seed: u64,
    pub sampling_seed: u64,
    pub coalition_share: f64,
    pub sample_share: f64,
    /// Stop the IRV hill-climb after more than `num_candidates` consecutive
    /// already-tried ballots.
    pub detect_stagnation: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            time_limit: DEFAULT_TIME_LIMIT,
            irv_seed: DEFAULT_IRV_SEED,
            sampling_seed: DEFAULT_SAMPLING_SEED,
            coalition_share: DEFAULT_COALITION_SHARE,
            sample_share: DEFAULT_SAMPLE_SHARE,
            detect_stagnation: true,
        }
    }
}

impl SearchParams {
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }
}
