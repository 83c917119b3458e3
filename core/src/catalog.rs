//! Static tower and enemy stat tables.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Name of a tower category, such as `simple` or `sniper`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TowerCategory(String);

impl TowerCategory {
    /// Creates a category from its configured name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Configured name of the category.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TowerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of an enemy kind, such as `grunt` or `boss`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnemyKind(String);

impl EnemyKind {
    /// Creates an enemy kind from its configured name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Configured name of the kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Upgrade level of a placed tower, between one and three inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TowerLevel(u8);

impl TowerLevel {
    /// Level assigned to freshly placed towers.
    pub const FIRST: Self = Self(1);
    /// Highest reachable level.
    pub const MAX: Self = Self(3);

    /// Creates a level if the value lies within the supported range.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value >= Self::FIRST.0 && value <= Self::MAX.0 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Numeric level.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Level reached by merging two towers of this level, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        Self::new(self.0 + 1)
    }

    /// Zero-based index into a definition's level table.
    #[must_use]
    pub const fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl fmt::Display for TowerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Optional effect tag attached to a tower level. Reserved; damage resolution ignores it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecialEffect {
    /// Slows the struck enemy.
    Slow,
    /// Damages enemies around the struck enemy.
    Splash,
}

/// Combat statistics of a tower category at one level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelStats {
    /// Damage carried by each projectile.
    pub damage: u32,
    /// Targeting radius in pixels.
    pub range: f32,
    /// Attacks per second.
    pub fire_rate: f32,
    /// Projectile travel speed in pixels per second.
    pub projectile_speed: f32,
    /// Visual tag used by presentation layers.
    pub color: String,
    /// Money charged to reach this level by merging; absent on level one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_cost: Option<u32>,
    /// Optional special-effect tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<SpecialEffect>,
}

impl LevelStats {
    /// Minimum simulated time between two shots.
    ///
    /// Non-positive or non-finite fire rates, and rates so slow that the
    /// interval does not fit a `Duration`, never become ready.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        if self.fire_rate.is_finite() && self.fire_rate > 0.0 {
            Duration::try_from_secs_f32(self.fire_rate.recip()).unwrap_or(Duration::MAX)
        } else {
            Duration::MAX
        }
    }
}

/// Static description of a tower category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerDefinition {
    /// Category the definition describes.
    pub category: TowerCategory,
    /// Human-readable name.
    pub name: String,
    /// Money charged to place a level one tower.
    pub cost: u32,
    /// Statistics for levels one through three, in order.
    pub levels: Vec<LevelStats>,
}

impl TowerDefinition {
    /// Statistics for the provided level.
    #[must_use]
    pub fn stats(&self, level: TowerLevel) -> Option<&LevelStats> {
        self.levels.get(level.index())
    }

    /// Money charged to merge two towers into the provided level.
    #[must_use]
    pub fn merge_cost(&self, level: TowerLevel) -> Option<u32> {
        self.stats(level).and_then(|stats| stats.merge_cost)
    }
}

/// Static description of an enemy kind before wave scaling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyDefinition {
    /// Kind the definition describes.
    pub kind: EnemyKind,
    /// Human-readable name.
    pub name: String,
    /// Base health.
    pub health: u32,
    /// Base speed in pixels per second.
    pub speed: f32,
    /// Money and score awarded on destruction.
    pub bounty: u32,
    /// Visual radius in pixels.
    pub size: f32,
    /// Visual tag used by presentation layers.
    pub color: String,
}
