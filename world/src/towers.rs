//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use grid_defence_core::{
    EnemyId, LevelStats, SpotId, TowerCategory, TowerCooldownSnapshot, TowerId, TowerLevel,
    TowerSnapshot,
};

/// Tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    pub(crate) category: TowerCategory,
    pub(crate) level: TowerLevel,
    /// Copy of the definition's statistics for `level`; replaced whenever the level changes.
    pub(crate) stats: LevelStats,
    pub(crate) position: Vec2,
    /// Spot the tower occupies.
    pub(crate) spot: SpotId,
    pub(crate) last_shot: Option<Duration>,
    pub(crate) target: Option<EnemyId>,
    pub(crate) rotation: Option<f32>,
}

impl TowerState {
    /// Creates a tower that has never fired.
    pub(crate) fn new(
        id: TowerId,
        category: TowerCategory,
        stats: LevelStats,
        position: Vec2,
        spot: SpotId,
    ) -> Self {
        Self {
            id,
            category,
            level: TowerLevel::FIRST,
            stats,
            position,
            spot,
            last_shot: None,
            target: None,
            rotation: None,
        }
    }

    /// Raises the tower to `level`, replacing its statistics and forgetting its last shot.
    pub(crate) fn promote(&mut self, level: TowerLevel, stats: LevelStats) {
        self.level = level;
        self.stats = stats;
        self.last_shot = None;
        self.target = None;
    }

    /// Simulated time until the tower may fire again.
    pub(crate) fn ready_in(&self, clock: Duration) -> Duration {
        let Some(last_shot) = self.last_shot else {
            return Duration::ZERO;
        };

        last_shot
            .checked_add(self.stats.cooldown())
            .map_or(Duration::MAX, |ready_at| ready_at.saturating_sub(clock))
    }

    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            category: self.category.clone(),
            level: self.level,
            stats: self.stats.clone(),
            position: self.position,
            spot: self.spot,
            last_shot: self.last_shot,
            target: self.target,
            rotation: self.rotation,
        }
    }

    pub(crate) fn cooldown_snapshot(&self, clock: Duration) -> TowerCooldownSnapshot {
        TowerCooldownSnapshot {
            tower: self.id,
            ready_in: self.ready_in(clock),
        }
    }
}

/// Registry that stores towers keyed by identifier.
#[derive(Debug, Default)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
}

impl TowerRegistry {
    pub(crate) fn insert(&mut self, tower: TowerState) {
        let _ = self.entries.insert(tower.id, tower);
    }

    pub(crate) fn remove(&mut self, id: TowerId) -> Option<TowerState> {
        self.entries.remove(&id)
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&TowerState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(fire_rate: f32) -> LevelStats {
        LevelStats {
            damage: 10,
            range: 100.0,
            fire_rate,
            projectile_speed: 300.0,
            color: "#4caf50".to_owned(),
            merge_cost: None,
            effect: None,
        }
    }

    fn tower() -> TowerState {
        TowerState::new(
            TowerId::new(7),
            TowerCategory::new("simple"),
            stats(2.0),
            Vec2::new(20.0, 20.0),
            SpotId::new(0),
        )
    }

    #[test]
    fn fresh_tower_is_ready_immediately() {
        assert_eq!(tower().ready_in(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn cooldown_counts_down_from_last_shot() {
        let mut tower = tower();
        tower.last_shot = Some(Duration::from_secs(1));
        assert_eq!(
            tower.ready_in(Duration::from_millis(1_200)),
            Duration::from_millis(300)
        );
        assert_eq!(tower.ready_in(Duration::from_secs(2)), Duration::ZERO);
    }

    #[test]
    fn promotion_resets_fire_timer_and_target() {
        let mut tower = tower();
        tower.last_shot = Some(Duration::from_secs(1));
        tower.target = Some(EnemyId::new(3));
        tower.rotation = Some(1.0);

        let level = TowerLevel::FIRST.next().expect("level two");
        tower.promote(level, stats(3.0));

        assert_eq!(tower.level, level);
        assert_eq!(tower.stats, stats(3.0));
        assert_eq!(tower.last_shot, None);
        assert_eq!(tower.target, None);
        assert_eq!(tower.rotation, Some(1.0));
    }

    #[test]
    fn registry_iterates_in_identifier_order() {
        let mut registry = TowerRegistry::default();
        let mut late = tower();
        late.id = TowerId::new(9);
        registry.insert(late);
        registry.insert(tower());

        let ids: Vec<u32> = registry.iter().map(|tower| tower.id.get()).collect();
        assert_eq!(ids, vec![7, 9]);
        assert!(registry.remove(TowerId::new(7)).is_some());
        assert!(registry.get(TowerId::new(7)).is_none());
    }
}
