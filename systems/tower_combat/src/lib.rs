#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits projectile firing commands from targeting data.

use grid_defence_core::{Command, TowerCooldownView, TowerId, TowerTarget};

/// Tower combat system that queues firing commands for ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits commands for every tower whose cooldown elapsed.
    ///
    /// A ready tower with a target fires through `Command::FireProjectile`; a
    /// ready tower without one forgets its previous target through
    /// `Command::ReleaseTarget` and keeps its rotation. Towers still cooling
    /// down are left untouched.
    pub fn handle(
        &mut self,
        tower_cooldowns: &TowerCooldownView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        if tower_cooldowns.is_empty() {
            return;
        }

        self.scratch.clear();

        for snapshot in tower_cooldowns.iter() {
            if !snapshot.ready_in.is_zero() {
                continue;
            }

            match find_target(tower_targets, snapshot.tower) {
                Some(target) => self.scratch.push(Command::FireProjectile {
                    tower: target.tower,
                    target: target.enemy,
                }),
                None => self.scratch.push(Command::ReleaseTarget {
                    tower: snapshot.tower,
                }),
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn find_target(targets: &[TowerTarget], tower: TowerId) -> Option<&TowerTarget> {
    targets.iter().find(|target| target.tower == tower)
}
