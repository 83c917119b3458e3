#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Grid Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The engine submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values describing
//! what changed. Systems consume immutable views, and respond exclusively with
//! new command batches.
//!
//! The static configuration (grid, path, placement spots, tower and enemy
//! tables, and the generated wave list) also lives here so every crate reads
//! the same read-only data.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod catalog;
mod config;
mod geometry;
mod views;
mod waves;

pub use catalog::{
    EnemyDefinition, EnemyKind, LevelStats, SpecialEffect, TowerCategory, TowerDefinition,
    TowerLevel,
};
pub use config::{ConfigError, GameConfig, GridConfig, SpotConfig};
pub use geometry::{colocated, grid_to_pixel, GridCoord};
pub use views::{
    EnemySnapshot, EnemyView, GameStateSnapshot, ProjectileSnapshot, ProjectileView,
    SpawnQueueView, SpotSnapshot, TowerCooldownSnapshot, TowerCooldownView, TowerSnapshot,
    TowerTarget, TowerView,
};
pub use waves::{MainWave, SpawnDescriptor, SubWave, WaveProgress, WaveStatus};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Grid Defence.";

/// Lowest accepted game speed multiplier.
pub const MIN_GAME_SPEED: f32 = 0.5;

/// Highest accepted game speed multiplier.
pub const MAX_GAME_SPEED: f32 = 2.0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Discards every entity and restores the starting purse, counters and status.
    ResetSession {
        /// Order in which tower categories become available during this game.
        unlock_order: Vec<TowerCategory>,
    },
    /// Advances the simulation clock by the provided, already speed-scaled, delta.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the next sub-wave begin.
    StartNextWave,
    /// Requests that the next queued enemy of the active sub-wave enter the path.
    SpawnEnemy,
    /// Moves an enemy along the path.
    MoveEnemy {
        /// Identifier of the enemy that moved.
        enemy: EnemyId,
        /// Pixel position after the move.
        position: Vec2,
        /// Index of the last path node the enemy reached.
        path_index: usize,
    },
    /// Requests that a tower fire a projectile at an enemy.
    FireProjectile {
        /// Tower that fires.
        tower: TowerId,
        /// Enemy the projectile is aimed at.
        target: EnemyId,
    },
    /// Clears the remembered target of a tower that found nothing in range.
    ReleaseTarget {
        /// Tower whose target reference is cleared.
        tower: TowerId,
    },
    /// Moves an in-flight projectile.
    AdvanceProjectile {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Pixel position after the move.
        position: Vec2,
        /// Position the projectile is steering toward.
        last_known_target: Vec2,
    },
    /// Removes a projectile that arrived at its destination.
    RetireProjectile {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Enemy struck on arrival, if the target still existed.
        struck: Option<EnemyId>,
    },
    /// Applies the damage accumulated for each enemy during one tick.
    ApplyDamage {
        /// Total damage per enemy, ordered by enemy identifier.
        hits: Vec<(EnemyId, u32)>,
    },
    /// Evaluates whether the active sub-wave finished and transitions the wave status.
    ResolveWaveProgress,
    /// Requests placement of a level one tower on a placement spot.
    PlaceTower {
        /// Spot that receives the tower.
        spot: SpotId,
        /// Category of tower to build.
        category: TowerCategory,
    },
    /// Requests that two identical towers merge into one of the next level.
    MergeTowers {
        /// Tower whose position and spot survive the merge.
        keep: TowerId,
        /// Tower that is absorbed and whose spot is freed.
        absorb: TowerId,
    },
    /// Requests that a tower relocate to another placement spot.
    MoveTower {
        /// Tower to relocate.
        tower: TowerId,
        /// Destination spot.
        spot: SpotId,
    },
    /// Selects the category that the next placement will build.
    SelectCategory {
        /// Selected category, or `None` to leave placement mode.
        category: Option<TowerCategory>,
    },
    /// Changes the game speed multiplier.
    SetGameSpeed {
        /// Requested multiplier; clamped to the supported range.
        multiplier: f32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the session returned to its initial state.
    SessionReset,
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a sub-wave started and its spawn queue was loaded.
    SubWaveStarted {
        /// Progress counters of the sub-wave that started.
        progress: WaveProgress,
        /// Number of enemies queued for the sub-wave.
        queued: usize,
    },
    /// Announces that new tower categories became available.
    TowersUnlocked {
        /// Categories that became available, in unlock order.
        categories: Vec<TowerCategory>,
    },
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Kind of the enemy.
        kind: EnemyKind,
    },
    /// Reports that an enemy reached the end of the path.
    EnemyLeaked {
        /// Identifier of the enemy that leaked.
        enemy: EnemyId,
        /// Player health after the penalty.
        health: u32,
    },
    /// Reports that an enemy was destroyed.
    EnemyKilled {
        /// Identifier of the destroyed enemy.
        enemy: EnemyId,
        /// Bounty credited to money and score.
        bounty: u32,
    },
    /// Confirms that a tower fired.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired.
        tower: TowerId,
        /// Enemy the projectile is aimed at.
        target: EnemyId,
    },
    /// Confirms that a projectile arrived and was removed.
    ProjectileRetired {
        /// Identifier of the removed projectile.
        projectile: ProjectileId,
        /// Enemy that received the projectile's damage, if any.
        struck: Option<EnemyId>,
    },
    /// Confirms that a tower was placed.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Category of the tower.
        category: TowerCategory,
        /// Spot now occupied by the tower.
        spot: SpotId,
        /// Money spent.
        cost: u32,
    },
    /// Reports that a placement request was rejected.
    TowerPlacementRejected {
        /// Requested spot.
        spot: SpotId,
        /// Requested category.
        category: TowerCategory,
        /// Specific reason the placement failed.
        reason: MutationError,
    },
    /// Confirms that two towers merged.
    TowersMerged {
        /// Identifier of the resulting tower.
        tower: TowerId,
        /// Identifier of the tower that was absorbed.
        absorbed: TowerId,
        /// Level of the resulting tower.
        level: TowerLevel,
        /// Spot freed by the absorbed tower.
        freed: SpotId,
        /// Money spent.
        cost: u32,
    },
    /// Reports that a merge request was rejected.
    TowerMergeRejected {
        /// Tower that would have survived the merge.
        keep: TowerId,
        /// Tower that would have been absorbed.
        absorb: TowerId,
        /// Specific reason the merge failed.
        reason: MutationError,
    },
    /// Confirms that a tower moved between spots.
    TowerMoved {
        /// Identifier of the tower.
        tower: TowerId,
        /// Spot the tower left.
        from: SpotId,
        /// Spot the tower now occupies.
        to: SpotId,
    },
    /// Reports that a move request was rejected.
    TowerMoveRejected {
        /// Tower targeted by the move.
        tower: TowerId,
        /// Requested destination spot.
        spot: SpotId,
        /// Specific reason the move failed.
        reason: MutationError,
    },
    /// Announces the category selected for placement.
    CategorySelected {
        /// Selected category, if any.
        category: Option<TowerCategory>,
    },
    /// Announces the effective game speed.
    GameSpeedChanged {
        /// Multiplier after clamping.
        multiplier: f32,
    },
    /// Reports that a sub-wave finished and the next one starts automatically.
    SubWaveCleared {
        /// Progress counters of the finished sub-wave.
        progress: WaveProgress,
        /// Unscaled delay before the next sub-wave starts.
        next_in: Duration,
    },
    /// Reports that the final sub-wave of a main wave finished.
    MainWaveCleared {
        /// Progress counters of the finished sub-wave.
        progress: WaveProgress,
    },
    /// Reports that every configured sub-wave was survived.
    GameWon,
    /// Reports that player health reached zero.
    GameOver,
}

/// Reasons a tower mutation may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum MutationError {
    /// The requested placement spot already holds a tower.
    #[error("that spot is already occupied")]
    SpotOccupied,
    /// No tower definition exists for the requested category.
    #[error("unknown tower category")]
    UnknownCategory,
    /// The player cannot pay for the mutation.
    #[error("not enough money: {required} needed, {available} available")]
    InsufficientFunds {
        /// Money the mutation costs.
        required: u32,
        /// Money the player holds.
        available: u32,
    },
    /// A referenced tower or spot does not exist.
    #[error("tower or spot not found")]
    NotFound,
    /// The towers differ in category or level.
    #[error("only towers of the same type and level can merge")]
    TypeOrLevelMismatch,
    /// The towers are already at the highest level.
    #[error("tower is already at maximum level")]
    MaxLevelReached,
    /// The destination spot cannot receive the tower.
    #[error("the tower cannot move there")]
    InvalidMoveTarget,
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates a new identifier with the provided numeric value.
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Retrieves the numeric representation of the identifier.
            #[must_use]
            pub const fn get(&self) -> u32 {
                self.0
            }
        }
    };
}

entity_id!(
    /// Unique identifier assigned to a placed tower.
    TowerId
);
entity_id!(
    /// Unique identifier assigned to an enemy.
    EnemyId
);
entity_id!(
    /// Unique identifier assigned to a projectile.
    ProjectileId
);
entity_id!(
    /// Identifier of a placement spot, fixed by the configuration.
    SpotId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_funds_message_names_both_amounts() {
        let error = MutationError::InsufficientFunds {
            required: 50,
            available: 49,
        };
        assert_eq!(
            error.to_string(),
            "not enough money: 50 needed, 49 available"
        );
    }

    #[test]
    fn identifiers_order_by_value() {
        assert!(TowerId::new(3) < TowerId::new(7));
        assert_eq!(EnemyId::new(9).get(), 9);
    }
}
