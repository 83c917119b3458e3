#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Single-threaded Grid Defence session.
//!
//! [`Engine`] owns the world, the pure systems and the scheduler. Every
//! [`Engine::advance`] call runs one tick whose phases execute strictly in
//! order, each on the settled result of the previous one: spawning, enemy
//! movement, targeting and firing, projectile flight with batched damage, and
//! the wave completion check. Player operations are translated into world
//! commands and their outcome is read back from the emitted events.

mod scheduler;

use std::{collections::VecDeque, time::Duration};

use glam::Vec2;
use grid_defence_core::{
    Command, ConfigError, EnemySnapshot, Event, GameConfig, GameStateSnapshot, GridCoord,
    MutationError, ProjectileSnapshot, SpotId, SpotSnapshot, TowerCategory, TowerDefinition,
    TowerId, TowerSnapshot, TowerTarget,
};
use grid_defence_system_movement::Movement;
use grid_defence_system_projectiles::Projectiles;
use grid_defence_system_spawning::Spawning;
use grid_defence_system_tower_combat::TowerCombat;
use grid_defence_system_tower_targeting::TowerTargeting;
use grid_defence_system_wave_generation::{unlock_order, WaveGeneration};
use grid_defence_world::{self as world, query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use scheduler::Scheduler;

/// Number of undrained events the engine retains; older ones are dropped.
pub const JOURNAL_CAPACITY: usize = 4_096;

/// Built-in board with a wave list generated from the default tuning.
pub fn standard_config<R: Rng + ?Sized>(rng: &mut R) -> GameConfig {
    let mut config = GameConfig::standard_board();
    config.waves =
        WaveGeneration::default().generate(config.main_wave_count, config.sub_waves_per_main, rng);
    config
}

/// Authoritative game session driven by an external frame clock.
#[derive(Debug)]
pub struct Engine {
    world: World,
    scheduler: Scheduler,
    rng: ChaCha8Rng,
    spawning: Spawning,
    movement: Movement,
    targeting: TowerTargeting,
    combat: TowerCombat,
    projectiles: Projectiles,
    targets: Vec<TowerTarget>,
    journal: VecDeque<Event>,
}

impl Engine {
    /// Creates a session whose unlock order is drawn from OS entropy.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, ChaCha8Rng::from_entropy())
    }

    /// Creates a session with a reproducible unlock order.
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Creates a session drawing its randomness from `rng`.
    pub fn with_rng(config: GameConfig, mut rng: ChaCha8Rng) -> Result<Self, ConfigError> {
        config.validate()?;
        let order = unlock_order(
            &config.starter_category,
            &config.unlockable_categories,
            &mut rng,
        );
        log::debug!("tower unlock order {order:?}");

        Ok(Self {
            world: World::new(config, order),
            scheduler: Scheduler::default(),
            rng,
            spawning: Spawning::new(),
            movement: Movement::new(),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            projectiles: Projectiles::new(),
            targets: Vec::new(),
            journal: VecDeque::new(),
        })
    }

    /// Runs one tick for `frame` of wall-clock time, scaled by the game speed.
    ///
    /// Does nothing until the first wave was started, after the game ended,
    /// and after a reset.
    pub fn advance(&mut self, frame: Duration) {
        if !self.scheduler.is_running() {
            return;
        }

        let dt = frame.mul_f64(f64::from(query::state(&self.world).game_speed));
        let tick = [Event::TimeAdvanced { dt }];
        let mut events = Vec::new();
        let mut commands = Vec::new();
        self.apply(Command::Tick { dt }, &mut events);

        if self.scheduler.poll_advance(dt) {
            self.apply(Command::StartNextWave, &mut events);
        }

        self.spawning.handle(
            &tick,
            query::spawn_queue(&self.world),
            query::clock(&self.world),
            &mut commands,
        );
        self.apply_all(&mut commands, &mut events);

        self.movement.handle(
            &tick,
            &query::enemy_view(&self.world),
            query::path(&self.world),
            &mut commands,
        );
        self.apply_all(&mut commands, &mut events);

        if !self.is_finished() {
            self.targeting.handle(
                &query::tower_view(&self.world),
                &query::enemy_view(&self.world),
                &mut self.targets,
            );
            self.combat.handle(
                &query::tower_cooldowns(&self.world),
                &self.targets,
                &mut commands,
            );
            self.apply_all(&mut commands, &mut events);

            self.projectiles.handle(
                &tick,
                &query::projectile_view(&self.world),
                &query::enemy_view(&self.world),
                &mut commands,
            );
            self.apply_all(&mut commands, &mut events);

            self.apply(Command::ResolveWaveProgress, &mut events);
        }

        self.observe(&events);
        self.record(&mut events);
    }

    /// Starts the next sub-wave; returns `false` when the state machine refuses.
    ///
    /// Starting early cancels a pending automatic advance.
    pub fn start_next_wave(&mut self) -> bool {
        let mut events = Vec::new();
        self.apply(Command::StartNextWave, &mut events);
        let started = events
            .iter()
            .any(|event| matches!(event, Event::SubWaveStarted { .. }));
        if started {
            if self.scheduler.pending_advance().is_some() {
                log::debug!("sub-wave started early, pending advance cancelled");
            }
            self.scheduler.cancel_advance();
            self.scheduler.start_loop();
        }
        self.record(&mut events);
        started
    }

    /// Places a level one tower of `category` on `spot`.
    pub fn place(
        &mut self,
        spot: SpotId,
        category: &TowerCategory,
    ) -> Result<TowerSnapshot, MutationError> {
        self.mutate(
            Command::PlaceTower {
                spot,
                category: category.clone(),
            },
            |event| match event {
                Event::TowerPlaced { tower, .. } => Some(Ok(*tower)),
                Event::TowerPlacementRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            },
        )
    }

    /// Merges `absorb` into `keep`, producing one tower of the next level on `keep`'s spot.
    pub fn merge(
        &mut self,
        keep: TowerId,
        absorb: TowerId,
    ) -> Result<TowerSnapshot, MutationError> {
        self.mutate(Command::MergeTowers { keep, absorb }, |event| match event {
            Event::TowersMerged { tower, .. } => Some(Ok(*tower)),
            Event::TowerMergeRejected { reason, .. } => Some(Err(*reason)),
            _ => None,
        })
    }

    /// Relocates `tower` onto the free `spot`.
    pub fn move_tower(
        &mut self,
        tower: TowerId,
        spot: SpotId,
    ) -> Result<TowerSnapshot, MutationError> {
        self.mutate(Command::MoveTower { tower, spot }, |event| match event {
            Event::TowerMoved { tower, .. } => Some(Ok(*tower)),
            Event::TowerMoveRejected { reason, .. } => Some(Err(*reason)),
            _ => None,
        })
    }

    /// Selects the category the next placement builds.
    pub fn set_selected_category(&mut self, category: Option<TowerCategory>) {
        let mut events = Vec::new();
        self.apply(Command::SelectCategory { category }, &mut events);
        self.record(&mut events);
    }

    /// Changes the game speed, returning the effective multiplier after clamping.
    pub fn set_game_speed(&mut self, multiplier: f32) -> f32 {
        let mut events = Vec::new();
        self.apply(Command::SetGameSpeed { multiplier }, &mut events);
        self.record(&mut events);
        query::state(&self.world).game_speed
    }

    /// Discards the session and starts over with a fresh unlock order.
    ///
    /// Undrained events of the discarded session are dropped with it.
    pub fn reset(&mut self) {
        self.scheduler.cancel_all();
        self.targets.clear();
        self.journal.clear();
        let config = query::config(&self.world);
        let order = unlock_order(
            &config.starter_category,
            &config.unlockable_categories,
            &mut self.rng,
        );

        let mut events = Vec::new();
        self.apply(
            Command::ResetSession {
                unlock_order: order,
            },
            &mut events,
        );
        self.record(&mut events);
    }

    /// Maps a grid cell onto the pixel coordinates of its centre.
    #[must_use]
    pub fn grid_to_pixel(&self, cell: GridCoord) -> Vec2 {
        query::config(&self.world).grid_to_pixel(cell)
    }

    /// Player-facing session summary.
    #[must_use]
    pub fn state(&self) -> GameStateSnapshot {
        query::state(&self.world)
    }

    /// Placed towers in identifier order.
    #[must_use]
    pub fn towers(&self) -> Vec<TowerSnapshot> {
        query::tower_view(&self.world).into_vec()
    }

    /// Enemies on the path in spawn order.
    #[must_use]
    pub fn enemies(&self) -> Vec<EnemySnapshot> {
        query::enemy_view(&self.world).into_vec()
    }

    /// In-flight projectiles in identifier order.
    #[must_use]
    pub fn projectiles(&self) -> Vec<ProjectileSnapshot> {
        query::projectile_view(&self.world).into_vec()
    }

    /// Placement spots with live occupancy.
    #[must_use]
    pub fn spots(&self) -> Vec<SpotSnapshot> {
        query::spots(&self.world)
    }

    /// Looks up a single placement spot.
    #[must_use]
    pub fn spot(&self, id: SpotId) -> Option<SpotSnapshot> {
        query::spot(&self.world, id)
    }

    /// Looks up a single tower.
    #[must_use]
    pub fn tower(&self, id: TowerId) -> Option<TowerSnapshot> {
        query::tower(&self.world, id)
    }

    /// Tower standing on `spot`, if any.
    #[must_use]
    pub fn tower_at_spot(&self, spot: SpotId) -> Option<TowerSnapshot> {
        query::tower_at_spot(&self.world, spot)
    }

    /// Definition of a tower category.
    #[must_use]
    pub fn definition(&self, category: &TowerCategory) -> Option<&TowerDefinition> {
        query::config(&self.world).tower_definition(category)
    }

    /// Reports whether the player can pay for a level one tower of `category`.
    #[must_use]
    pub fn can_afford(&self, category: &TowerCategory) -> bool {
        self.definition(category)
            .is_some_and(|definition| definition.cost <= query::state(&self.world).money)
    }

    /// Configuration the session was built from.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        query::config(&self.world)
    }

    /// Enemy path in pixel coordinates.
    #[must_use]
    pub fn path(&self) -> &[Vec2] {
        query::path(&self.world)
    }

    /// Banner adapters may greet the player with.
    #[must_use]
    pub fn welcome_banner(&self) -> &'static str {
        query::welcome_banner(&self.world)
    }

    /// Reports whether ticks currently advance the simulation.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Simulated time left before the next sub-wave starts automatically.
    #[must_use]
    pub fn pending_advance(&self) -> Option<Duration> {
        self.scheduler.pending_advance()
    }

    /// Events produced since the journal was last drained, oldest first.
    ///
    /// At most [`JOURNAL_CAPACITY`] events are retained.
    pub fn events(&self) -> impl ExactSizeIterator<Item = &Event> + '_ {
        self.journal.iter()
    }

    /// Takes every retained event produced since the previous call.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.journal.drain(..).collect()
    }

    fn record(&mut self, events: &mut Vec<Event>) {
        self.journal.extend(events.drain(..));
        let overflow = self.journal.len().saturating_sub(JOURNAL_CAPACITY);
        if overflow > 0 {
            log::trace!("event journal full, dropping {overflow} oldest events");
            let _ = self.journal.drain(..overflow);
        }
    }

    fn apply(&mut self, command: Command, events: &mut Vec<Event>) {
        world::apply(&mut self.world, command, events);
    }

    fn apply_all(&mut self, commands: &mut Vec<Command>, events: &mut Vec<Event>) {
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, events);
        }
    }

    fn mutate<F>(&mut self, command: Command, outcome: F) -> Result<TowerSnapshot, MutationError>
    where
        F: Fn(&Event) -> Option<Result<TowerId, MutationError>>,
    {
        let mut events = Vec::new();
        self.apply(command, &mut events);
        let result = events
            .iter()
            .find_map(outcome)
            .unwrap_or(Err(MutationError::NotFound));
        self.record(&mut events);

        let tower = result?;
        query::tower(&self.world, tower).ok_or(MutationError::NotFound)
    }

    fn is_finished(&self) -> bool {
        query::status(&self.world).is_terminal()
    }

    fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::SubWaveCleared { next_in, .. } => {
                    self.scheduler.schedule_advance(*next_in);
                }
                Event::GameWon | Event::GameOver => {
                    log::info!("game finished after {:?}", query::clock(&self.world));
                    self.scheduler.cancel_all();
                }
                _ => {}
            }
        }
    }
}
