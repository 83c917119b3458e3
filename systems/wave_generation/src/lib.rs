#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave list generation and tower unlock ordering.
//!
//! Difficulty grows monotonically with the main wave index: enemies gain
//! health linearly, gain speed more slowly up to a cap, come in slowly
//! growing numbers, and tougher kinds join the pool once their unlock
//! threshold is reached. Every few main waves the final sub-wave is replaced
//! by a lone boss.

use grid_defence_core::{EnemyKind, MainWave, SpawnDescriptor, SubWave, TowerCategory};
use rand::{distributions::WeightedIndex, prelude::Distribution, seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

/// Aggregated tuning knobs controlling every adjustable aspect of wave generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    /// Health multiplier gained per main wave after the first.
    pub health_growth: f32,
    /// Speed multiplier gained per main wave after the first.
    pub speed_growth: f32,
    /// Upper clamp of the speed multiplier.
    pub max_speed_multiplier: f32,
    /// Enemy count curve.
    pub count: CountTuning,
    /// Kinds that may fill regular sub-wave slots.
    pub kinds: Vec<KindThreshold>,
    /// Boss sub-wave cadence and scaling.
    pub boss: BossTuning,
    /// Spawn cadence curve.
    pub interval: IntervalTuning,
    /// Pause after a cleared sub-wave, in milliseconds.
    pub post_delay_ms: u32,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            health_growth: 0.12,
            speed_growth: 0.01,
            max_speed_multiplier: 1.5,
            count: CountTuning::default(),
            kinds: vec![
                KindThreshold::new("grunt", 1, 1, 6),
                KindThreshold::new("runner", 3, 1, 3),
                KindThreshold::new("swarm", 5, 5, 3),
                KindThreshold::new("brute", 8, 1, 2),
            ],
            boss: BossTuning::default(),
            interval: IntervalTuning::default(),
            post_delay_ms: 3_000,
        }
    }
}

/// Enemy count per sub-wave: `base + per_main * (main - 1) + per_sub * (sub - 1)`, clamped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountTuning {
    /// Count of the very first sub-wave.
    pub base: f32,
    /// Growth per main wave.
    pub per_main: f32,
    /// Growth per sub-wave within a main wave.
    pub per_sub: f32,
    /// Lower clamp.
    pub minimum: u32,
    /// Upper clamp.
    pub maximum: u32,
}

impl Default for CountTuning {
    fn default() -> Self {
        Self {
            base: 6.0,
            per_main: 0.4,
            per_sub: 0.3,
            minimum: 6,
            maximum: 30,
        }
    }
}

/// Enemy kind joining the pool from a given (main wave, sub-wave) onwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KindThreshold {
    /// Kind to spawn.
    pub kind: EnemyKind,
    /// First main wave the kind may appear in.
    pub main: u32,
    /// First sub-wave of that main wave the kind may appear in.
    pub sub: u32,
    /// Relative selection weight.
    pub weight: u32,
}

impl KindThreshold {
    /// Creates a threshold entry.
    #[must_use]
    pub fn new(kind: &str, main: u32, sub: u32, weight: u32) -> Self {
        Self {
            kind: EnemyKind::new(kind),
            main,
            sub,
            weight,
        }
    }

    fn reached(&self, main: u32, sub: u32) -> bool {
        (main, sub) >= (self.main, self.sub)
    }
}

/// Boss sub-wave configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossTuning {
    /// Kind spawned as the boss.
    pub kind: EnemyKind,
    /// Every `every`-th main wave ends with a boss; zero disables bosses.
    pub every: u32,
    /// Factor applied on top of the wave's health multiplier.
    pub health_multiplier: f32,
    /// Factor applied on top of the wave's speed multiplier.
    pub speed_multiplier: f32,
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            kind: EnemyKind::new("boss"),
            every: 5,
            health_multiplier: 2.0,
            speed_multiplier: 0.8,
        }
    }
}

/// Spawn interval per sub-wave: `base_ms - per_main_ms * (main - 1)`, floored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalTuning {
    /// Interval of the first main wave.
    pub base_ms: u32,
    /// Reduction per main wave.
    pub per_main_ms: u32,
    /// Shortest interval.
    pub floor_ms: u32,
}

impl Default for IntervalTuning {
    fn default() -> Self {
        Self {
            base_ms: 1_000,
            per_main_ms: 15,
            floor_ms: 350,
        }
    }
}

/// Wave list generator driven by a [`WaveTuning`].
#[derive(Clone, Debug, Default)]
pub struct WaveGeneration {
    tuning: WaveTuning,
}

impl WaveGeneration {
    /// Creates a generator with the provided tuning.
    #[must_use]
    pub fn new(tuning: WaveTuning) -> Self {
        Self { tuning }
    }

    /// Tuning used by the generator.
    #[must_use]
    pub fn tuning(&self) -> &WaveTuning {
        &self.tuning
    }

    /// Generates `main_waves` main waves of `sub_waves_per_main` sub-waves each.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        main_waves: u32,
        sub_waves_per_main: u32,
        rng: &mut R,
    ) -> Vec<MainWave> {
        let waves: Vec<MainWave> = (1..=main_waves)
            .map(|main| MainWave {
                sub_waves: (1..=sub_waves_per_main)
                    .map(|sub| self.sub_wave(main, sub, sub_waves_per_main, rng))
                    .collect(),
            })
            .collect();
        log::debug!(
            "generated {} main waves of {} sub-waves",
            waves.len(),
            sub_waves_per_main
        );
        waves
    }

    /// Generates a single sub-wave; `main` and `sub` are one-based.
    pub fn sub_wave<R: Rng + ?Sized>(
        &self,
        main: u32,
        sub: u32,
        sub_waves_per_main: u32,
        rng: &mut R,
    ) -> SubWave {
        let health = self.health_multiplier(main);
        let speed = self.speed_multiplier(main);
        let spawn_interval_ms = self.spawn_interval_ms(main);
        let post_delay_ms = self.tuning.post_delay_ms;

        if self.is_boss_wave(main, sub, sub_waves_per_main) {
            let boss = &self.tuning.boss;
            return SubWave {
                spawns: vec![SpawnDescriptor {
                    kind: boss.kind.clone(),
                    health_multiplier: health * boss.health_multiplier,
                    speed_multiplier: speed * boss.speed_multiplier,
                }],
                spawn_interval_ms,
                post_delay_ms,
            };
        }

        let eligible: Vec<&KindThreshold> = self
            .tuning
            .kinds
            .iter()
            .filter(|threshold| threshold.reached(main, sub))
            .collect();
        let chooser = WeightedIndex::new(eligible.iter().map(|threshold| threshold.weight)).ok();

        let spawns = (0..self.enemy_count(main, sub))
            .filter_map(|_| {
                let threshold = match &chooser {
                    Some(chooser) => eligible.get(chooser.sample(rng)).copied(),
                    None => self.tuning.kinds.first(),
                }?;
                Some(SpawnDescriptor {
                    kind: threshold.kind.clone(),
                    health_multiplier: health,
                    speed_multiplier: speed,
                })
            })
            .collect();

        SubWave {
            spawns,
            spawn_interval_ms,
            post_delay_ms,
        }
    }

    /// Health multiplier of every enemy in `main`.
    #[must_use]
    pub fn health_multiplier(&self, main: u32) -> f32 {
        1.0 + self.tuning.health_growth * main.saturating_sub(1) as f32
    }

    /// Speed multiplier of every enemy in `main`.
    #[must_use]
    pub fn speed_multiplier(&self, main: u32) -> f32 {
        (1.0 + self.tuning.speed_growth * main.saturating_sub(1) as f32)
            .min(self.tuning.max_speed_multiplier)
    }

    /// Number of enemies in a regular sub-wave.
    #[must_use]
    pub fn enemy_count(&self, main: u32, sub: u32) -> u32 {
        let count = &self.tuning.count;
        let raw = count.base
            + count.per_main * main.saturating_sub(1) as f32
            + count.per_sub * sub.saturating_sub(1) as f32;
        let rounded = if raw.is_finite() {
            raw.round().max(0.0) as u32
        } else {
            count.minimum
        };
        rounded.clamp(count.minimum, count.maximum.max(count.minimum))
    }

    /// Time between spawns in `main`, in milliseconds.
    #[must_use]
    pub fn spawn_interval_ms(&self, main: u32) -> u32 {
        let interval = &self.tuning.interval;
        interval
            .base_ms
            .saturating_sub(interval.per_main_ms.saturating_mul(main.saturating_sub(1)))
            .max(interval.floor_ms)
    }

    fn is_boss_wave(&self, main: u32, sub: u32, sub_waves_per_main: u32) -> bool {
        let every = self.tuning.boss.every;
        every > 0 && main % every == 0 && sub == sub_waves_per_main
    }
}

/// Orders tower categories for unlocking: `starter` first, the rest shuffled.
///
/// Duplicates of `starter` inside `categories` are dropped.
pub fn unlock_order<R: Rng + ?Sized>(
    starter: &TowerCategory,
    categories: &[TowerCategory],
    rng: &mut R,
) -> Vec<TowerCategory> {
    let mut rest: Vec<TowerCategory> = categories
        .iter()
        .filter(|category| *category != starter)
        .cloned()
        .collect();
    rest.shuffle(rng);

    let mut order = Vec::with_capacity(rest.len() + 1);
    order.push(starter.clone());
    order.extend(rest);
    order
}
