//! Wave composition and progression counters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::EnemyKind;

/// Queued enemy awaiting its turn to enter the path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnDescriptor {
    /// Kind of enemy to create.
    pub kind: EnemyKind,
    /// Factor applied to the kind's base health.
    #[serde(default = "unit_multiplier")]
    pub health_multiplier: f32,
    /// Factor applied to the kind's base speed.
    #[serde(default = "unit_multiplier")]
    pub speed_multiplier: f32,
}

impl SpawnDescriptor {
    /// Creates a descriptor that uses the kind's base statistics.
    #[must_use]
    pub fn plain(kind: EnemyKind) -> Self {
        Self {
            kind,
            health_multiplier: 1.0,
            speed_multiplier: 1.0,
        }
    }
}

fn unit_multiplier() -> f32 {
    1.0
}

/// Ordered spawn queue of one sub-wave together with its timing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubWave {
    /// Enemies in spawn order.
    pub spawns: Vec<SpawnDescriptor>,
    /// Unscaled time between two consecutive spawns, in milliseconds.
    pub spawn_interval_ms: u32,
    /// Unscaled pause after the sub-wave is cleared, in milliseconds.
    pub post_delay_ms: u32,
}

impl SubWave {
    /// Time between two consecutive spawns.
    #[must_use]
    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.spawn_interval_ms))
    }

    /// Pause after the sub-wave is cleared.
    #[must_use]
    pub fn post_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.post_delay_ms))
    }
}

/// Ordered sub-waves of one main wave.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MainWave {
    /// Sub-waves in play order.
    pub sub_waves: Vec<SubWave>,
}

/// State of the wave progression state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WaveStatus {
    /// No sub-wave has started yet.
    Initial,
    /// A sub-wave is spawning or its enemies are still alive.
    SubWaveInProgress,
    /// A sub-wave was cleared and the next one starts after its delay.
    WaitingForNextSubWave,
    /// The final sub-wave of a main wave was cleared; the player starts the next one.
    BetweenMainWaves,
    /// Every configured sub-wave was survived.
    GameWon,
    /// Player health reached zero.
    GameOver,
}

impl WaveStatus {
    /// Reports whether the game ended.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::GameWon | Self::GameOver)
    }
}

/// Progress through the ordered (main wave, sub-wave) sequence.
///
/// The overall counter is authoritative; the one-based main and sub-wave
/// numbers are derived from it and are both zero before the first start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WaveProgress {
    overall: u32,
    main: u32,
    sub: u32,
}

impl WaveProgress {
    /// Derives display counters from the overall sub-wave counter.
    #[must_use]
    pub const fn from_overall(overall: u32, sub_waves_per_main: u32) -> Self {
        if overall == 0 || sub_waves_per_main == 0 {
            return Self {
                overall,
                main: 0,
                sub: 0,
            };
        }

        let zero_based = overall - 1;
        Self {
            overall,
            main: zero_based / sub_waves_per_main + 1,
            sub: zero_based % sub_waves_per_main + 1,
        }
    }

    /// Number of sub-waves started so far.
    #[must_use]
    pub const fn overall(&self) -> u32 {
        self.overall
    }

    /// One-based main wave number.
    #[must_use]
    pub const fn main(&self) -> u32 {
        self.main
    }

    /// One-based sub-wave number within the main wave.
    #[must_use]
    pub const fn sub(&self) -> u32 {
        self.sub
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_zero_before_first_wave() {
        let progress = WaveProgress::from_overall(0, 10);
        assert_eq!((progress.main(), progress.sub()), (0, 0));
    }

    #[test]
    fn progress_rolls_over_main_wave_boundaries() {
        let last_of_first = WaveProgress::from_overall(10, 10);
        assert_eq!((last_of_first.main(), last_of_first.sub()), (1, 10));

        let first_of_second = WaveProgress::from_overall(11, 10);
        assert_eq!((first_of_second.main(), first_of_second.sub()), (2, 1));
    }

    #[test]
    fn terminal_statuses() {
        assert!(WaveStatus::GameWon.is_terminal());
        assert!(WaveStatus::GameOver.is_terminal());
        assert!(!WaveStatus::BetweenMainWaves.is_terminal());
    }
}
