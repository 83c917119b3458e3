//! Immutable snapshots handed from the world to systems and adapters.

use std::time::Duration;

use glam::Vec2;

use crate::{
    EnemyId, EnemyKind, GridCoord, LevelStats, ProjectileId, SpotId, TowerCategory, TowerId,
    TowerLevel, WaveProgress, WaveStatus,
};

macro_rules! snapshot_view {
    ($(#[$meta:meta])* $view:ident, $snapshot:ident, $id:ty, $key:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default)]
        pub struct $view {
            snapshots: Vec<$snapshot>,
        }

        impl $view {
            /// Creates a new view from the provided snapshots.
            #[must_use]
            pub fn from_snapshots(mut snapshots: Vec<$snapshot>) -> Self {
                snapshots.sort_by_key(|snapshot| snapshot.$key);
                Self { snapshots }
            }

            /// Iterator over the captured snapshots in identifier order.
            pub fn iter(&self) -> impl Iterator<Item = &$snapshot> {
                self.snapshots.iter()
            }

            /// Looks up the snapshot with the provided identifier.
            #[must_use]
            pub fn get(&self, id: $id) -> Option<&$snapshot> {
                self.snapshots
                    .binary_search_by_key(&id, |snapshot| snapshot.$key)
                    .ok()
                    .map(|index| &self.snapshots[index])
            }

            /// Number of captured snapshots.
            #[must_use]
            pub fn len(&self) -> usize {
                self.snapshots.len()
            }

            /// Reports whether the view holds no snapshots.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.snapshots.is_empty()
            }

            /// Consumes the view, yielding the underlying snapshots.
            #[must_use]
            pub fn into_vec(self) -> Vec<$snapshot> {
                self.snapshots
            }
        }
    };
}

snapshot_view!(
    /// Read-only snapshot describing all placed towers.
    TowerView,
    TowerSnapshot,
    TowerId,
    id
);
snapshot_view!(
    /// Read-only snapshot describing all enemies on the path, in spawn order.
    EnemyView,
    EnemySnapshot,
    EnemyId,
    id
);
snapshot_view!(
    /// Read-only snapshot describing all in-flight projectiles.
    ProjectileView,
    ProjectileSnapshot,
    ProjectileId,
    id
);
snapshot_view!(
    /// Read-only snapshot describing how long each tower must wait before firing.
    TowerCooldownView,
    TowerCooldownSnapshot,
    TowerId,
    tower
);

/// Immutable representation of a placed tower.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower.
    pub id: TowerId,
    /// Category of the tower.
    pub category: TowerCategory,
    /// Current level.
    pub level: TowerLevel,
    /// Statistics of the current level.
    pub stats: LevelStats,
    /// Pixel position of the tower.
    pub position: Vec2,
    /// Placement spot the tower occupies.
    pub spot: SpotId,
    /// Simulation time of the last shot, if the tower fired since it was built or merged.
    pub last_shot: Option<Duration>,
    /// Enemy the tower last fired at.
    pub target: Option<EnemyId>,
    /// Facing in radians, derived from the last fire angle.
    pub rotation: Option<f32>,
}

/// Immutable representation of an enemy.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier allocated to the enemy.
    pub id: EnemyId,
    /// Kind of the enemy.
    pub kind: EnemyKind,
    /// Remaining health.
    pub health: u32,
    /// Health at spawn.
    pub max_health: u32,
    /// Speed in pixels per second.
    pub speed: f32,
    /// Index of the last path node reached.
    pub path_index: usize,
    /// Pixel position.
    pub position: Vec2,
    /// Money and score awarded on destruction.
    pub bounty: u32,
    /// Visual radius in pixels.
    pub size: f32,
}

/// Immutable representation of an in-flight projectile.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile.
    pub id: ProjectileId,
    /// Tower that fired the projectile.
    pub tower: TowerId,
    /// Enemy the projectile is aimed at.
    pub target: EnemyId,
    /// Pixel position.
    pub position: Vec2,
    /// Last observed position of the target.
    pub last_known_target: Vec2,
    /// Damage delivered on arrival.
    pub damage: u32,
    /// Travel speed in pixels per second.
    pub speed: f32,
    /// Visual tag inherited from the tower.
    pub color: String,
}

/// Immutable representation of a placement spot with live occupancy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotSnapshot {
    /// Identifier of the spot.
    pub id: SpotId,
    /// Grid cell of the spot.
    pub cell: GridCoord,
    /// Pixel centre of the spot.
    pub centre: Vec2,
    /// Reports whether a tower occupies the spot.
    pub occupied: bool,
}

/// Remaining cooldown of a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerCooldownSnapshot {
    /// Identifier of the tower.
    pub tower: TowerId,
    /// Simulated time until the tower may fire again; zero when ready.
    pub ready_in: Duration,
}

/// Target chosen for a tower during one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerTarget {
    /// Tower that acquired the target.
    pub tower: TowerId,
    /// Enemy selected as the target.
    pub enemy: EnemyId,
}

/// State of the active sub-wave's spawn queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnQueueView {
    /// Reports whether a sub-wave is in progress.
    pub in_progress: bool,
    /// Number of enemies still queued.
    pub pending: usize,
    /// Simulation time at which the next enemy may spawn.
    pub next_spawn_at: Duration,
}

/// Player-facing summary of the session.
#[derive(Clone, Debug, PartialEq)]
pub struct GameStateSnapshot {
    /// Remaining player health.
    pub health: u32,
    /// Money available for placements and merges.
    pub money: u32,
    /// Score accumulated from bounties.
    pub score: u32,
    /// Game speed multiplier.
    pub game_speed: f32,
    /// Wave progress counters.
    pub progress: WaveProgress,
    /// State of the wave state machine.
    pub status: WaveStatus,
    /// Category selected for the next placement.
    pub selected_category: Option<TowerCategory>,
    /// Categories currently available for placement, in unlock order.
    pub available_categories: Vec<TowerCategory>,
    /// Simulated time since the session started.
    pub clock: Duration,
}
