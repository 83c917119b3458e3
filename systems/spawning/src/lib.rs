#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that releases queued enemies of the active sub-wave.

use std::time::Duration;

use grid_defence_core::{Command, Event, SpawnQueueView};

/// Spawning system that emits at most one spawn command per tick.
#[derive(Debug, Default)]
pub struct Spawning;

impl Spawning {
    /// Creates a new spawning system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::SpawnEnemy` when time advanced and the next spawn is due.
    ///
    /// `clock` is the simulated time after the tick was applied.
    pub fn handle(
        &mut self,
        events: &[Event],
        queue: SpawnQueueView,
        clock: Duration,
        out: &mut Vec<Command>,
    ) {
        let time_advanced = events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }));
        if !time_advanced {
            return;
        }

        if !queue.in_progress || queue.pending == 0 {
            return;
        }

        if clock >= queue.next_spawn_at {
            out.push(Command::SpawnEnemy);
        }
    }
}
