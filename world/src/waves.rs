//! Wave progression state machine and tower unlock schedule.

use std::{collections::VecDeque, time::Duration};

use grid_defence_core::{
    Event, GameConfig, SpawnDescriptor, SpawnQueueView, TowerCategory, WaveProgress, WaveStatus,
};

#[derive(Debug)]
pub(crate) struct WaveDirector {
    status: WaveStatus,
    overall: u32,
    queue: VecDeque<SpawnDescriptor>,
    spawn_interval: Duration,
    post_delay: Duration,
    next_spawn_at: Duration,
    unlock_order: Vec<TowerCategory>,
    available: usize,
}

impl WaveDirector {
    pub(crate) fn new(unlock_order: Vec<TowerCategory>) -> Self {
        let available = unlock_order.len().min(1);
        Self {
            status: WaveStatus::Initial,
            overall: 0,
            queue: VecDeque::new(),
            spawn_interval: Duration::ZERO,
            post_delay: Duration::ZERO,
            next_spawn_at: Duration::ZERO,
            unlock_order,
            available,
        }
    }

    pub(crate) fn status(&self) -> WaveStatus {
        self.status
    }

    pub(crate) fn progress(&self, sub_waves_per_main: u32) -> WaveProgress {
        WaveProgress::from_overall(self.overall, sub_waves_per_main)
    }

    pub(crate) fn available_categories(&self) -> &[TowerCategory] {
        &self.unlock_order[..self.available]
    }

    pub(crate) fn spawn_queue(&self) -> SpawnQueueView {
        SpawnQueueView {
            in_progress: self.status == WaveStatus::SubWaveInProgress,
            pending: self.queue.len(),
            next_spawn_at: self.next_spawn_at,
        }
    }

    /// Begins the next sub-wave when the state machine allows it.
    ///
    /// Returns `false` without side effects while a sub-wave is in progress,
    /// after the game ended, or once every configured sub-wave was started.
    pub(crate) fn start_next(
        &mut self,
        config: &GameConfig,
        clock: Duration,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let startable = matches!(
            self.status,
            WaveStatus::Initial | WaveStatus::WaitingForNextSubWave | WaveStatus::BetweenMainWaves
        );
        if !startable || self.overall >= config.total_sub_waves() {
            return false;
        }

        self.overall += 1;
        let progress = self.progress(config.sub_waves_per_main);
        match config.sub_wave(progress) {
            Some(sub_wave) => {
                self.queue = sub_wave.spawns.iter().cloned().collect();
                self.spawn_interval = sub_wave.spawn_interval();
                self.post_delay = sub_wave.post_delay();
            }
            None => {
                log::warn!(
                    "no sub-wave configured for main wave {} sub-wave {}",
                    progress.main(),
                    progress.sub()
                );
                self.queue.clear();
                self.spawn_interval = Duration::ZERO;
                self.post_delay = Duration::ZERO;
            }
        }
        self.next_spawn_at = clock;
        self.status = WaveStatus::SubWaveInProgress;

        log::info!(
            "main wave {} sub-wave {} started with {} enemies",
            progress.main(),
            progress.sub(),
            self.queue.len()
        );
        out_events.push(Event::SubWaveStarted {
            progress,
            queued: self.queue.len(),
        });

        if progress.sub() == 1 {
            self.refresh_unlocks(config, progress.main(), out_events);
        }
        true
    }

    /// Releases the next queued spawn if its scheduled time elapsed.
    pub(crate) fn dequeue_spawn(&mut self, clock: Duration) -> Option<SpawnDescriptor> {
        if self.status != WaveStatus::SubWaveInProgress || clock < self.next_spawn_at {
            return None;
        }

        let descriptor = self.queue.pop_front()?;
        self.next_spawn_at = clock.saturating_add(self.spawn_interval);
        Some(descriptor)
    }

    /// Transitions out of an in-progress sub-wave once it has been cleared.
    pub(crate) fn resolve(
        &mut self,
        config: &GameConfig,
        enemies_remaining: bool,
        out_events: &mut Vec<Event>,
    ) {
        if self.status != WaveStatus::SubWaveInProgress
            || !self.queue.is_empty()
            || enemies_remaining
        {
            return;
        }

        let progress = self.progress(config.sub_waves_per_main);
        if self.overall >= config.total_sub_waves() {
            self.status = WaveStatus::GameWon;
            log::info!("final sub-wave cleared, game won");
            out_events.push(Event::GameWon);
        } else if progress.sub() >= config.sub_waves_per_main {
            self.status = WaveStatus::BetweenMainWaves;
            log::info!("main wave {} cleared", progress.main());
            out_events.push(Event::MainWaveCleared { progress });
        } else {
            self.status = WaveStatus::WaitingForNextSubWave;
            log::info!(
                "main wave {} sub-wave {} cleared",
                progress.main(),
                progress.sub()
            );
            out_events.push(Event::SubWaveCleared {
                progress,
                next_in: self.post_delay,
            });
        }
    }

    pub(crate) fn game_over(&mut self) {
        self.status = WaveStatus::GameOver;
        self.queue.clear();
    }

    fn refresh_unlocks(&mut self, config: &GameConfig, main: u32, out_events: &mut Vec<Event>) {
        let earned = usize::try_from(main).unwrap_or(usize::MAX).saturating_add(1);
        let target = earned
            .min(config.max_unlockable_towers)
            .min(self.unlock_order.len())
            .max(self.available);
        if target == self.available {
            return;
        }

        let categories = self.unlock_order[self.available..target].to_vec();
        self.available = target;
        log::info!(
            "unlocked {}",
            categories
                .iter()
                .map(TowerCategory::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );
        out_events.push(Event::TowersUnlocked { categories });
    }
}
