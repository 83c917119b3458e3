#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Grid Defence.
//!
//! The world owns every store (towers, enemies, projectiles, placement spot
//! occupancy, purse, wave director). It is mutated exclusively through
//! [`apply`] and observed through the [`query`] module.

mod enemies;
mod projectiles;
mod spots;
mod towers;
mod waves;

use std::time::Duration;

use glam::Vec2;
use grid_defence_core::{
    colocated, Command, EnemyId, Event, GameConfig, MutationError, ProjectileId, SpotId,
    TowerCategory, TowerId, TowerLevel, MAX_GAME_SPEED, MIN_GAME_SPEED, WELCOME_BANNER,
};

use enemies::{EnemyRoster, EnemyState};
use projectiles::{ProjectileState, ProjectileStore};
use spots::SpotGrid;
use towers::{TowerRegistry, TowerState};
use waves::WaveDirector;

/// Health lost for every enemy that reaches the end of the path.
const LEAK_PENALTY: u32 = 1;

/// Represents the authoritative Grid Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: GameConfig,
    path: Vec<Vec2>,
    spots: SpotGrid,
    towers: TowerRegistry,
    enemies: EnemyRoster,
    projectiles: ProjectileStore,
    director: WaveDirector,
    purse: Purse,
    game_speed: f32,
    selected: Option<TowerCategory>,
    ids: IdAllocator,
    clock: Duration,
}

impl World {
    /// Creates a world for a validated configuration.
    ///
    /// `unlock_order` lists the tower categories in the order they become
    /// available; its first entry is available from the start.
    #[must_use]
    pub fn new(config: GameConfig, unlock_order: Vec<TowerCategory>) -> Self {
        let path = config.path_pixels();
        let spots = SpotGrid::from_config(&config);
        let purse = Purse::starting(&config);
        Self {
            banner: WELCOME_BANNER,
            path,
            spots,
            towers: TowerRegistry::default(),
            enemies: EnemyRoster::default(),
            projectiles: ProjectileStore::default(),
            director: WaveDirector::new(unlock_order),
            purse,
            game_speed: 1.0,
            selected: None,
            ids: IdAllocator::default(),
            clock: Duration::ZERO,
            config,
        }
    }

    fn reset(&mut self, unlock_order: Vec<TowerCategory>) {
        self.towers.clear();
        self.enemies.clear();
        self.projectiles.clear();
        self.spots.vacate_all();
        self.director = WaveDirector::new(unlock_order);
        self.purse = Purse::starting(&self.config);
        self.game_speed = 1.0;
        self.selected = None;
        self.ids = IdAllocator::default();
        self.clock = Duration::ZERO;
    }

    fn place_tower(
        &mut self,
        spot: SpotId,
        category: &TowerCategory,
    ) -> Result<(TowerId, u32), MutationError> {
        let target = self.spots.get(spot).ok_or(MutationError::NotFound)?;
        if target.occupied {
            return Err(MutationError::SpotOccupied);
        }
        let centre = target.centre;

        let definition = self
            .config
            .tower_definition(category)
            .ok_or(MutationError::UnknownCategory)?;
        let stats = definition
            .stats(TowerLevel::FIRST)
            .ok_or(MutationError::UnknownCategory)?
            .clone();
        let cost = definition.cost;
        self.purse.charge(cost)?;

        let id = TowerId::new(self.ids.allocate());
        self.towers
            .insert(TowerState::new(id, category.clone(), stats, centre, spot));
        self.spots.occupy(spot);
        self.selected = None;
        Ok((id, cost))
    }

    fn merge_towers(
        &mut self,
        keep: TowerId,
        absorb: TowerId,
    ) -> Result<MergeOutcome, MutationError> {
        if keep == absorb {
            return Err(MutationError::NotFound);
        }
        let kept = self.towers.get(keep).ok_or(MutationError::NotFound)?;
        let absorbed = self.towers.get(absorb).ok_or(MutationError::NotFound)?;
        if kept.category != absorbed.category || kept.level != absorbed.level {
            return Err(MutationError::TypeOrLevelMismatch);
        }
        let freed = absorbed.spot;

        let level = kept.level.next().ok_or(MutationError::MaxLevelReached)?;
        let definition = self
            .config
            .tower_definition(&kept.category)
            .ok_or(MutationError::UnknownCategory)?;
        let stats = definition
            .stats(level)
            .ok_or(MutationError::MaxLevelReached)?
            .clone();
        let cost = definition
            .merge_cost(level)
            .ok_or(MutationError::MaxLevelReached)?;
        self.purse.charge(cost)?;

        let _ = self.towers.remove(absorb);
        self.spots.vacate(freed);
        if let Some(tower) = self.towers.get_mut(keep) {
            tower.promote(level, stats);
        }

        Ok(MergeOutcome {
            level,
            freed,
            cost,
        })
    }

    fn move_tower(&mut self, id: TowerId, destination: SpotId) -> Result<SpotId, MutationError> {
        let tower = self.towers.get(id).ok_or(MutationError::NotFound)?;
        let target = self
            .spots
            .get(destination)
            .ok_or(MutationError::InvalidMoveTarget)?;
        if target.occupied {
            return Err(MutationError::InvalidMoveTarget);
        }
        let centre = target.centre;
        let origin = self
            .current_spot(tower)
            .ok_or(MutationError::InvalidMoveTarget)?;

        self.spots.vacate(origin);
        self.spots.occupy(destination);
        if let Some(tower) = self.towers.get_mut(id) {
            tower.position = centre;
            tower.spot = destination;
        }
        Ok(origin)
    }

    /// Resolves the spot a tower stands on, preferring its back-reference.
    fn current_spot(&self, tower: &TowerState) -> Option<SpotId> {
        if let Some(spot) = self.spots.get(tower.spot) {
            if colocated(spot.centre, tower.position, self.config.grid.cell_size) {
                return Some(spot.id);
            }
        }

        let fallback = self.spots.spot_at(tower.position).map(|spot| spot.id);
        log::warn!(
            "tower {} drifted from spot {}; resolved by position to {:?}",
            tower.id.get(),
            tower.spot.get(),
            fallback.map(|spot| spot.get())
        );
        fallback
    }

    fn spawn_enemy(&mut self, out_events: &mut Vec<Event>) {
        let Some(descriptor) = self.director.dequeue_spawn(self.clock) else {
            return;
        };
        let Some(definition) = self.config.enemy_definition(&descriptor.kind) else {
            log::warn!("skipping spawn of unknown enemy kind {}", descriptor.kind);
            return;
        };
        let Some(entrance) = self.path.first().copied() else {
            return;
        };

        let id = EnemyId::new(self.ids.allocate());
        let enemy = EnemyState::spawn(id, &descriptor, definition, entrance);
        out_events.push(Event::EnemySpawned {
            enemy: id,
            kind: enemy.kind().clone(),
        });
        self.enemies.push(enemy);
    }

    fn move_enemy(
        &mut self,
        id: EnemyId,
        position: Vec2,
        path_index: usize,
        out_events: &mut Vec<Event>,
    ) {
        let exit = self.path.len().saturating_sub(1);
        let Some(enemy) = self.enemies.get_mut(id) else {
            return;
        };
        enemy.position = position;
        enemy.path_index = path_index.min(exit);
        if path_index < exit {
            return;
        }

        let _ = self.enemies.remove(id);
        self.purse.health = self.purse.health.saturating_sub(LEAK_PENALTY);
        log::debug!(
            "enemy {} leaked, health now {}",
            id.get(),
            self.purse.health
        );
        out_events.push(Event::EnemyLeaked {
            enemy: id,
            health: self.purse.health,
        });

        if self.purse.health == 0 {
            self.director.game_over();
            log::info!("player health exhausted, game over");
            out_events.push(Event::GameOver);
        }
    }

    fn fire(&mut self, tower_id: TowerId, target: EnemyId, out_events: &mut Vec<Event>) {
        let Some(enemy_position) = self.enemies.get(target).map(|enemy| enemy.position) else {
            return;
        };
        let clock = self.clock;
        let Some(tower) = self.towers.get_mut(tower_id) else {
            return;
        };
        if tower.ready_in(clock) > Duration::ZERO {
            return;
        }

        let offset = enemy_position - tower.position;
        tower.rotation = Some(offset.y.atan2(offset.x));
        tower.last_shot = Some(clock);
        tower.target = Some(target);

        let id = ProjectileId::new(self.ids.allocate());
        self.projectiles.insert(ProjectileState {
            id,
            tower: tower_id,
            target,
            position: tower.position,
            last_known_target: enemy_position,
            damage: tower.stats.damage,
            speed: tower.stats.projectile_speed,
            color: tower.stats.color.clone(),
        });
        out_events.push(Event::ProjectileFired {
            projectile: id,
            tower: tower_id,
            target,
        });
    }

    fn apply_damage(&mut self, hits: Vec<(EnemyId, u32)>, out_events: &mut Vec<Event>) {
        for (id, damage) in hits {
            let Some(enemy) = self.enemies.get_mut(id) else {
                continue;
            };
            enemy.health = enemy.health.saturating_sub(damage);
            if enemy.health > 0 {
                continue;
            }

            let bounty = enemy.bounty;
            let _ = self.enemies.remove(id);
            self.purse.earn(bounty);
            log::debug!("enemy {} destroyed for {} bounty", id.get(), bounty);
            out_events.push(Event::EnemyKilled { enemy: id, bounty });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.director.status().is_terminal() && is_simulation_step(&command) {
        return;
    }

    match command {
        Command::ResetSession { unlock_order } => {
            world.reset(unlock_order);
            log::info!("session reset");
            out_events.push(Event::SessionReset);
        }
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::StartNextWave => {
            let _ = world
                .director
                .start_next(&world.config, world.clock, out_events);
        }
        Command::SpawnEnemy => world.spawn_enemy(out_events),
        Command::MoveEnemy {
            enemy,
            position,
            path_index,
        } => world.move_enemy(enemy, position, path_index, out_events),
        Command::FireProjectile { tower, target } => world.fire(tower, target, out_events),
        Command::ReleaseTarget { tower } => {
            if let Some(tower) = world.towers.get_mut(tower) {
                tower.target = None;
            }
        }
        Command::AdvanceProjectile {
            projectile,
            position,
            last_known_target,
        } => {
            if let Some(projectile) = world.projectiles.get_mut(projectile) {
                projectile.position = position;
                projectile.last_known_target = last_known_target;
            }
        }
        Command::RetireProjectile { projectile, struck } => {
            if world.projectiles.remove(projectile).is_some() {
                out_events.push(Event::ProjectileRetired { projectile, struck });
            }
        }
        Command::ApplyDamage { hits } => world.apply_damage(hits, out_events),
        Command::ResolveWaveProgress => {
            let enemies_remaining = !world.enemies.is_empty();
            world
                .director
                .resolve(&world.config, enemies_remaining, out_events);
        }
        Command::PlaceTower { spot, category } => match world.place_tower(spot, &category) {
            Ok((tower, cost)) => {
                log::debug!("placed {} tower {} on spot {}", category, tower.get(), spot.get());
                out_events.push(Event::TowerPlaced {
                    tower,
                    category,
                    spot,
                    cost,
                });
            }
            Err(reason) => out_events.push(Event::TowerPlacementRejected {
                spot,
                category,
                reason,
            }),
        },
        Command::MergeTowers { keep, absorb } => match world.merge_towers(keep, absorb) {
            Ok(outcome) => {
                log::debug!(
                    "merged tower {} into {} at level {}",
                    absorb.get(),
                    keep.get(),
                    outcome.level
                );
                out_events.push(Event::TowersMerged {
                    tower: keep,
                    absorbed: absorb,
                    level: outcome.level,
                    freed: outcome.freed,
                    cost: outcome.cost,
                });
            }
            Err(reason) => out_events.push(Event::TowerMergeRejected {
                keep,
                absorb,
                reason,
            }),
        },
        Command::MoveTower { tower, spot } => match world.move_tower(tower, spot) {
            Ok(from) => {
                log::debug!(
                    "moved tower {} from spot {} to {}",
                    tower.get(),
                    from.get(),
                    spot.get()
                );
                out_events.push(Event::TowerMoved {
                    tower,
                    from,
                    to: spot,
                });
            }
            Err(reason) => out_events.push(Event::TowerMoveRejected {
                tower,
                spot,
                reason,
            }),
        },
        Command::SelectCategory { category } => {
            world.selected = category.clone();
            out_events.push(Event::CategorySelected { category });
        }
        Command::SetGameSpeed { multiplier } => {
            if multiplier.is_finite() {
                world.game_speed = multiplier.clamp(MIN_GAME_SPEED, MAX_GAME_SPEED);
            }
            out_events.push(Event::GameSpeedChanged {
                multiplier: world.game_speed,
            });
        }
    }
}

fn is_simulation_step(command: &Command) -> bool {
    matches!(
        command,
        Command::Tick { .. }
            | Command::StartNextWave
            | Command::SpawnEnemy
            | Command::MoveEnemy { .. }
            | Command::FireProjectile { .. }
            | Command::ReleaseTarget { .. }
            | Command::AdvanceProjectile { .. }
            | Command::RetireProjectile { .. }
            | Command::ApplyDamage { .. }
            | Command::ResolveWaveProgress
    )
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use glam::Vec2;
    use grid_defence_core::{
        EnemyView, GameConfig, GameStateSnapshot, ProjectileView, SpawnQueueView, SpotId,
        SpotSnapshot, TowerCooldownView, TowerId, TowerSnapshot, TowerView, WaveStatus,
    };

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the configuration the world was built from.
    #[must_use]
    pub fn config(world: &World) -> &GameConfig {
        &world.config
    }

    /// Simulated time since the session started.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// State of the wave state machine.
    #[must_use]
    pub fn status(world: &World) -> WaveStatus {
        world.director.status()
    }

    /// Enemy path in pixel coordinates.
    #[must_use]
    pub fn path(world: &World) -> &[Vec2] {
        &world.path
    }

    /// Captures the player-facing session summary.
    #[must_use]
    pub fn state(world: &World) -> GameStateSnapshot {
        GameStateSnapshot {
            health: world.purse.health,
            money: world.purse.money,
            score: world.purse.score,
            game_speed: world.game_speed,
            progress: world.director.progress(world.config.sub_waves_per_main),
            status: world.director.status(),
            selected_category: world.selected.clone(),
            available_categories: world.director.available_categories().to_vec(),
            clock: world.clock,
        }
    }

    /// Captures a read-only view of the placed towers.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Captures a read-only view of the enemies on the path.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Captures a read-only view of the in-flight projectiles.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .iter()
                .map(|projectile| projectile.snapshot())
                .collect(),
        )
    }

    /// Reports how long each tower must wait before it may fire again.
    #[must_use]
    pub fn tower_cooldowns(world: &World) -> TowerCooldownView {
        TowerCooldownView::from_snapshots(
            world
                .towers
                .iter()
                .map(|tower| tower.cooldown_snapshot(world.clock))
                .collect(),
        )
    }

    /// Lists every placement spot with its live occupancy.
    #[must_use]
    pub fn spots(world: &World) -> Vec<SpotSnapshot> {
        world.spots.snapshots()
    }

    /// Looks up a single placement spot.
    #[must_use]
    pub fn spot(world: &World, id: SpotId) -> Option<SpotSnapshot> {
        world
            .spots
            .snapshots()
            .into_iter()
            .find(|spot| spot.id == id)
    }

    /// Looks up a single tower.
    #[must_use]
    pub fn tower(world: &World, id: TowerId) -> Option<TowerSnapshot> {
        world.towers.get(id).map(|tower| tower.snapshot())
    }

    /// Finds the tower standing on the provided spot.
    #[must_use]
    pub fn tower_at_spot(world: &World, spot: SpotId) -> Option<TowerSnapshot> {
        world
            .towers
            .iter()
            .find(|tower| tower.spot == spot)
            .map(|tower| tower.snapshot())
    }

    /// Describes the spawn queue of the active sub-wave.
    #[must_use]
    pub fn spawn_queue(world: &World) -> SpawnQueueView {
        world.director.spawn_queue()
    }
}

#[derive(Clone, Copy, Debug)]
struct Purse {
    health: u32,
    money: u32,
    score: u32,
}

impl Purse {
    fn starting(config: &GameConfig) -> Self {
        Self {
            health: config.starting_health,
            money: config.starting_money,
            score: 0,
        }
    }

    fn charge(&mut self, cost: u32) -> Result<(), MutationError> {
        if self.money < cost {
            return Err(MutationError::InsufficientFunds {
                required: cost,
                available: self.money,
            });
        }
        self.money -= cost;
        Ok(())
    }

    fn earn(&mut self, bounty: u32) {
        self.money = self.money.saturating_add(bounty);
        self.score = self.score.saturating_add(bounty);
    }
}

/// Monotonic identifier source shared by every entity kind; restarts on reset.
#[derive(Debug)]
struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    fn allocate(&mut self) -> u32 {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id
    }
}

#[derive(Clone, Copy, Debug)]
struct MergeOutcome {
    level: TowerLevel,
    freed: SpotId,
    cost: u32,
}
