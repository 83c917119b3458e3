//! In-flight projectiles.

use std::collections::BTreeMap;

use glam::Vec2;
use grid_defence_core::{EnemyId, ProjectileId, ProjectileSnapshot, TowerId};

#[derive(Clone, Debug)]
pub(crate) struct ProjectileState {
    pub(crate) id: ProjectileId,
    pub(crate) tower: TowerId,
    pub(crate) target: EnemyId,
    pub(crate) position: Vec2,
    pub(crate) last_known_target: Vec2,
    pub(crate) damage: u32,
    pub(crate) speed: f32,
    pub(crate) color: String,
}

impl ProjectileState {
    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            tower: self.tower,
            target: self.target,
            position: self.position,
            last_known_target: self.last_known_target,
            damage: self.damage,
            speed: self.speed,
            color: self.color.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct ProjectileStore {
    entries: BTreeMap<ProjectileId, ProjectileState>,
}

impl ProjectileStore {
    pub(crate) fn insert(&mut self, projectile: ProjectileState) {
        let _ = self.entries.insert(projectile.id, projectile);
    }

    pub(crate) fn get_mut(&mut self, id: ProjectileId) -> Option<&mut ProjectileState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: ProjectileId) -> Option<ProjectileState> {
        self.entries.remove(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &ProjectileState> {
        self.entries.values()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
