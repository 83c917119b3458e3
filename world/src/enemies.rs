//! Enemies walking the path, stored in spawn order.

use glam::Vec2;
use grid_defence_core::{EnemyDefinition, EnemyId, EnemyKind, EnemySnapshot, SpawnDescriptor};

#[derive(Clone, Debug)]
pub(crate) struct EnemyState {
    pub(crate) id: EnemyId,
    kind: EnemyKind,
    pub(crate) health: u32,
    max_health: u32,
    speed: f32,
    pub(crate) path_index: usize,
    pub(crate) position: Vec2,
    pub(crate) bounty: u32,
    size: f32,
}

impl EnemyState {
    /// Instantiates a queued spawn at the first path node.
    pub(crate) fn spawn(
        id: EnemyId,
        descriptor: &SpawnDescriptor,
        definition: &EnemyDefinition,
        entrance: Vec2,
    ) -> Self {
        let scaled_health = (definition.health as f32 * descriptor.health_multiplier).round();
        let max_health = if scaled_health.is_finite() && scaled_health >= 1.0 {
            scaled_health.min(u32::MAX as f32) as u32
        } else {
            1
        };
        let speed = (definition.speed * descriptor.speed_multiplier).max(0.0);

        Self {
            id,
            kind: definition.kind.clone(),
            health: max_health,
            max_health,
            speed,
            path_index: 0,
            position: entrance,
            bounty: definition.bounty,
            size: definition.size,
        }
    }

    pub(crate) fn kind(&self) -> &EnemyKind {
        &self.kind
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind.clone(),
            health: self.health,
            max_health: self.max_health,
            speed: self.speed,
            path_index: self.path_index,
            position: self.position,
            bounty: self.bounty,
            size: self.size,
        }
    }
}

/// Active enemies in the order they entered the path.
#[derive(Debug, Default)]
pub(crate) struct EnemyRoster {
    enemies: Vec<EnemyState>,
}

impl EnemyRoster {
    pub(crate) fn push(&mut self, enemy: EnemyState) {
        self.enemies.push(enemy);
    }

    pub(crate) fn get(&self, id: EnemyId) -> Option<&EnemyState> {
        self.enemies.iter().find(|enemy| enemy.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: EnemyId) -> Option<&mut EnemyState> {
        self.enemies.iter_mut().find(|enemy| enemy.id == id)
    }

    pub(crate) fn remove(&mut self, id: EnemyId) -> Option<EnemyState> {
        let index = self.enemies.iter().position(|enemy| enemy.id == id)?;
        Some(self.enemies.remove(index))
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &EnemyState> {
        self.enemies.iter()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.enemies.clear();
    }
}
