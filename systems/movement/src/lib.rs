#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that walks enemies along the fixed path.

use std::time::Duration;

use glam::Vec2;
use grid_defence_core::{Command, EnemySnapshot, EnemyView, Event};

/// Movement system that proposes the next position of every enemy.
#[derive(Debug, Default)]
pub struct Movement {
    scratch: Vec<Command>,
}

impl Movement {
    /// Creates a new movement system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits one `Command::MoveEnemy` per enemy for the time advanced in `events`.
    ///
    /// An enemy moves in a straight line toward its next path node. When the
    /// node lies within this tick's travel distance the enemy snaps onto it
    /// and its path index advances by one; leftover travel is discarded.
    /// Reaching the last node is reported with `path_index == path.len() - 1`.
    pub fn handle(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        path: &[Vec2],
        out: &mut Vec<Command>,
    ) {
        let elapsed = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add);
        if elapsed.is_zero() || path.len() < 2 {
            return;
        }

        self.scratch.clear();
        let seconds = elapsed.as_secs_f32();
        for enemy in enemies.iter() {
            if let Some(command) = step(enemy, path, seconds) {
                self.scratch.push(command);
            }
        }

        out.append(&mut self.scratch);
    }
}

fn step(enemy: &EnemySnapshot, path: &[Vec2], seconds: f32) -> Option<Command> {
    let next_index = enemy.path_index.checked_add(1)?;
    let Some(next) = path.get(next_index).copied() else {
        return Some(Command::MoveEnemy {
            enemy: enemy.id,
            position: enemy.position,
            path_index: path.len() - 1,
        });
    };

    let travel = enemy.speed * seconds;
    if travel <= 0.0 {
        return None;
    }

    let offset = next - enemy.position;
    let distance = offset.length();
    let (position, path_index) = if distance <= travel {
        (next, next_index)
    } else {
        (enemy.position + offset / distance * travel, enemy.path_index)
    };

    Some(Command::MoveEnemy {
        enemy: enemy.id,
        position,
        path_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_defence_core::{EnemyId, EnemyKind};

    fn enemy(id: u32, path_index: usize, position: Vec2, speed: f32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::new("grunt"),
            health: 10,
            max_health: 10,
            speed,
            path_index,
            position,
            bounty: 1,
            size: 8.0,
        }
    }

    fn path() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 100.0),
        ]
    }

    fn advance(enemies: Vec<EnemySnapshot>, millis: u64) -> Vec<Command> {
        let mut out = Vec::new();
        Movement::new().handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_millis(millis),
            }],
            &EnemyView::from_snapshots(enemies),
            &path(),
            &mut out,
        );
        out
    }

    #[test]
    fn enemies_move_toward_the_next_node() {
        let out = advance(vec![enemy(1, 0, Vec2::ZERO, 50.0)], 1_000);
        assert_eq!(
            out,
            vec![Command::MoveEnemy {
                enemy: EnemyId::new(1),
                position: Vec2::new(50.0, 0.0),
                path_index: 0,
            }]
        );
    }

    #[test]
    fn reaching_a_node_snaps_and_advances_by_one() {
        let out = advance(vec![enemy(1, 0, Vec2::new(90.0, 0.0), 500.0)], 1_000);
        assert_eq!(
            out,
            vec![Command::MoveEnemy {
                enemy: EnemyId::new(1),
                position: Vec2::new(100.0, 0.0),
                path_index: 1,
            }]
        );
    }

    #[test]
    fn arriving_at_the_final_node_reports_the_exit_index() {
        let out = advance(vec![enemy(4, 1, Vec2::new(100.0, 95.0), 10.0)], 1_000);
        assert_eq!(
            out,
            vec![Command::MoveEnemy {
                enemy: EnemyId::new(4),
                position: Vec2::new(100.0, 100.0),
                path_index: 2,
            }]
        );
    }

    #[test]
    fn no_time_or_no_speed_means_no_movement() {
        assert!(advance(vec![enemy(1, 0, Vec2::ZERO, 50.0)], 0).is_empty());
        assert!(advance(vec![enemy(1, 0, Vec2::ZERO, 0.0)], 1_000).is_empty());
    }
}
