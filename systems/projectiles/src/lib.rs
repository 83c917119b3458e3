#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that flies projectiles and batches the damage they deliver.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use grid_defence_core::{Command, EnemyId, EnemyView, Event, ProjectileSnapshot, ProjectileView};

/// Projectile system that steers every projectile and resolves arrivals.
#[derive(Debug, Default)]
pub struct Projectiles {
    damage: BTreeMap<EnemyId, u32>,
}

impl Projectiles {
    /// Creates a new projectile system with an empty damage ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits movement, retirement and damage commands for the time advanced in `events`.
    ///
    /// A projectile homes on its target while the target is alive and flies
    /// to the target's last known position otherwise. Arrival, meaning the
    /// remaining distance does not exceed this tick's travel, retires the
    /// projectile. Only arrivals at a live target deal damage; the damage of
    /// all arrivals is summed per enemy and emitted as a single
    /// `Command::ApplyDamage` after every projectile was processed.
    pub fn handle(
        &mut self,
        events: &[Event],
        projectiles: &ProjectileView,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        let elapsed = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add);
        if elapsed.is_zero() || projectiles.is_empty() {
            return;
        }

        self.damage.clear();
        let seconds = elapsed.as_secs_f32();
        for projectile in projectiles.iter() {
            let live_target = enemies.get(projectile.target).map(|enemy| enemy.position);
            out.push(self.fly(projectile, live_target, seconds));
        }

        if !self.damage.is_empty() {
            out.push(Command::ApplyDamage {
                hits: std::mem::take(&mut self.damage).into_iter().collect(),
            });
        }
    }

    fn fly(
        &mut self,
        projectile: &ProjectileSnapshot,
        live_target: Option<Vec2>,
        seconds: f32,
    ) -> Command {
        let destination = live_target.unwrap_or(projectile.last_known_target);
        let travel = (projectile.speed * seconds).max(0.0);
        let offset = destination - projectile.position;
        let distance = offset.length();

        if distance <= travel {
            let struck = live_target.map(|_| projectile.target);
            if let Some(enemy) = struck {
                let total = self.damage.entry(enemy).or_insert(0);
                *total = total.saturating_add(projectile.damage);
            }
            return Command::RetireProjectile {
                projectile: projectile.id,
                struck,
            };
        }

        Command::AdvanceProjectile {
            projectile: projectile.id,
            position: projectile.position + offset / distance * travel,
            last_known_target: destination,
        }
    }
}
