use std::{collections::BTreeSet, time::Duration};

use grid_defence_core::{
    colocated, EnemyKind, Event, GameConfig, MainWave, MutationError, SpawnDescriptor, SpotId,
    SubWave, TowerCategory, TowerId, TowerLevel, WaveStatus,
};
use grid_defence_engine::Engine;

const FRAME: Duration = Duration::from_millis(50);
const MAX_FRAMES: usize = 10_000;

fn grunt_waves(main_waves: u32, subs: u32) -> GameConfig {
    let mut config = GameConfig::standard_board();
    config.main_wave_count = main_waves;
    config.sub_waves_per_main = subs;
    config.waves = (0..main_waves)
        .map(|_| MainWave {
            sub_waves: (0..subs)
                .map(|_| SubWave {
                    spawns: vec![SpawnDescriptor::plain(EnemyKind::new("grunt"))],
                    spawn_interval_ms: 500,
                    post_delay_ms: 2_000,
                })
                .collect(),
        })
        .collect();
    config
}

fn engine(config: GameConfig) -> Engine {
    Engine::with_seed(config, 11).expect("valid config")
}

fn simple() -> TowerCategory {
    TowerCategory::new("simple")
}

fn place(engine: &mut Engine, spot: u32) -> TowerId {
    engine
        .place(SpotId::new(spot), &simple())
        .expect("placement succeeds")
        .id
}

/// Advances until `done` observes an event, returning every event produced.
fn run_until(engine: &mut Engine, done: impl Fn(&Event) -> bool) -> Vec<Event> {
    let mut seen = Vec::new();
    for _ in 0..MAX_FRAMES {
        engine.advance(FRAME);
        let events = engine.drain_events();
        let finished = events.iter().any(&done);
        seen.extend(events);
        if finished {
            return seen;
        }
    }
    panic!("condition not reached within {MAX_FRAMES} frames");
}

fn assert_spot_occupancy_matches_towers(engine: &Engine) {
    let cell_size = engine.config().grid.cell_size;
    let towers = engine.towers();
    for spot in engine.spots() {
        let holders = towers
            .iter()
            .filter(|tower| colocated(spot.centre, tower.position, cell_size))
            .count();
        assert!(holders <= 1, "spot {:?} holds {holders} towers", spot.id);
        assert_eq!(
            spot.occupied,
            holders == 1,
            "occupancy of spot {:?} disagrees with tower positions",
            spot.id
        );
    }
}

#[test]
fn placing_a_simple_tower_costs_fifty() {
    let mut engine = engine(grunt_waves(1, 1));
    engine.set_selected_category(Some(simple()));

    let tower = engine
        .place(SpotId::new(0), &simple())
        .expect("placement succeeds");

    assert_eq!(engine.state().money, 150);
    assert_eq!(engine.state().selected_category, None);
    assert_eq!(tower.level, TowerLevel::FIRST);
    assert_eq!(tower.position, engine.spot(SpotId::new(0)).expect("spot").centre);
    assert_eq!(
        engine.tower_at_spot(SpotId::new(0)).map(|tower| tower.id),
        Some(tower.id)
    );
}

#[test]
fn exact_cost_is_affordable_and_one_less_is_not() {
    let mut config = grunt_waves(1, 1);
    config.starting_money = 50;
    let mut engine = engine(config);

    assert!(engine.can_afford(&simple()));
    let _ = place(&mut engine, 0);
    assert_eq!(engine.state().money, 0);

    assert!(!engine.can_afford(&simple()));
    assert_eq!(
        engine.place(SpotId::new(1), &simple()),
        Err(MutationError::InsufficientFunds {
            required: 50,
            available: 0,
        })
    );
    assert_eq!(engine.towers().len(), 1);
}

#[test]
fn rejected_placements_report_their_reason() {
    let mut engine = engine(grunt_waves(1, 1));
    let _ = place(&mut engine, 0);

    assert_eq!(
        engine.place(SpotId::new(0), &simple()),
        Err(MutationError::SpotOccupied)
    );
    assert_eq!(
        engine.place(SpotId::new(1), &TowerCategory::new("laser")),
        Err(MutationError::UnknownCategory)
    );
    assert_eq!(
        engine.place(SpotId::new(404), &simple()),
        Err(MutationError::NotFound)
    );
    assert_eq!(engine.state().money, 150);
}

#[test]
fn merging_two_level_one_towers_yields_level_two_stats() {
    let mut engine = engine(grunt_waves(1, 1));
    let keep = place(&mut engine, 0);
    let absorb = place(&mut engine, 1);

    let merged = engine.merge(keep, absorb).expect("merge succeeds");

    let level_two = TowerLevel::FIRST.next().expect("level two");
    let definition = engine.definition(&simple()).expect("simple tower").clone();
    assert_eq!(merged.id, keep);
    assert_eq!(merged.level, level_two);
    assert_eq!(Some(&merged.stats), definition.stats(level_two));
    assert_eq!(merged.position, engine.spot(SpotId::new(0)).expect("spot").centre);
    assert_eq!(engine.state().money, 200 - 50 - 50 - 75);
    assert_eq!(engine.spots().iter().filter(|spot| spot.occupied).count(), 1);
    assert!(engine.tower(absorb).is_none());
    assert_spot_occupancy_matches_towers(&engine);
}

#[test]
fn merge_rejections_leave_towers_untouched() {
    let mut config = grunt_waves(1, 1);
    config.starting_money = 2_000;
    let mut engine = engine(config);
    let simple_a = place(&mut engine, 0);
    let simple_b = place(&mut engine, 1);
    let rapid = engine
        .place(SpotId::new(2), &TowerCategory::new("rapid"))
        .expect("rapid placement")
        .id;
    let money = engine.state().money;

    assert_eq!(
        engine.merge(simple_a, rapid),
        Err(MutationError::TypeOrLevelMismatch)
    );
    assert_eq!(engine.merge(simple_a, simple_a), Err(MutationError::NotFound));
    assert_eq!(
        engine.merge(simple_a, TowerId::new(999)),
        Err(MutationError::NotFound)
    );
    let _ = engine.merge(simple_a, simple_b).expect("merge succeeds");
    let simple_c = place(&mut engine, 3);
    assert_eq!(
        engine.merge(simple_a, simple_c),
        Err(MutationError::TypeOrLevelMismatch)
    );

    assert_eq!(engine.state().money, money - 75 - 50);
    assert_eq!(engine.towers().len(), 3);
}

#[test]
fn merging_two_level_three_towers_is_rejected() {
    let mut config = grunt_waves(1, 1);
    config.starting_money = 2_000;
    let mut engine = engine(config);
    let ids: Vec<TowerId> = (0..8).map(|spot| place(&mut engine, spot)).collect();

    for pair in ids.chunks(2) {
        let _ = engine.merge(pair[0], pair[1]).expect("level two merge");
    }
    let first = engine.merge(ids[0], ids[2]).expect("level three merge");
    let second = engine.merge(ids[4], ids[6]).expect("level three merge");
    assert_eq!(first.level, TowerLevel::MAX);
    assert_eq!(second.level, TowerLevel::MAX);
    let money = engine.state().money;

    assert_eq!(
        engine.merge(ids[0], ids[4]),
        Err(MutationError::MaxLevelReached)
    );
    assert_eq!(engine.state().money, money);
    assert_eq!(engine.towers().len(), 2);
    assert_spot_occupancy_matches_towers(&engine);
}

#[test]
fn moving_a_tower_frees_its_origin_and_rejects_occupied_targets() {
    let mut engine = engine(grunt_waves(1, 1));
    let mover = place(&mut engine, 0);
    let _ = place(&mut engine, 1);

    assert_eq!(
        engine.move_tower(mover, SpotId::new(1)),
        Err(MutationError::InvalidMoveTarget)
    );
    assert_eq!(
        engine.move_tower(mover, SpotId::new(404)),
        Err(MutationError::InvalidMoveTarget)
    );
    assert_eq!(
        engine.move_tower(TowerId::new(999), SpotId::new(5)),
        Err(MutationError::NotFound)
    );

    let moved = engine
        .move_tower(mover, SpotId::new(5))
        .expect("move succeeds");

    assert_eq!(moved.position, engine.spot(SpotId::new(5)).expect("spot").centre);
    assert!(!engine.spot(SpotId::new(0)).expect("spot").occupied);
    assert!(engine.spot(SpotId::new(5)).expect("spot").occupied);
    assert_eq!(engine.state().money, 100);
    assert_spot_occupancy_matches_towers(&engine);
}

#[test]
fn mutation_sequences_keep_spot_occupancy_consistent() {
    let mut config = grunt_waves(1, 1);
    config.starting_money = 1_000;
    let mut engine = engine(config);

    let a = place(&mut engine, 0);
    let b = place(&mut engine, 4);
    let c = place(&mut engine, 7);
    assert_spot_occupancy_matches_towers(&engine);
    let _ = engine.move_tower(b, SpotId::new(9)).expect("move");
    assert_spot_occupancy_matches_towers(&engine);
    let _ = engine.merge(c, a).expect("merge");
    assert_spot_occupancy_matches_towers(&engine);
    let _ = engine.move_tower(c, SpotId::new(0)).expect("move onto freed spot");
    assert_spot_occupancy_matches_towers(&engine);
    let _ = place(&mut engine, 7);
    assert_spot_occupancy_matches_towers(&engine);
}

#[test]
fn starting_a_wave_twice_only_starts_it_once() {
    let mut engine = engine(grunt_waves(1, 2));

    assert!(engine.start_next_wave());
    assert!(!engine.start_next_wave());

    let state = engine.state();
    assert_eq!(state.progress.overall(), 1);
    assert_eq!(state.status, WaveStatus::SubWaveInProgress);
    assert!(engine.is_running());
}

#[test]
fn a_leaked_enemy_costs_exactly_one_health() {
    let mut engine = engine(grunt_waves(1, 2));
    assert!(engine.start_next_wave());

    let events = run_until(&mut engine, |event| {
        matches!(event, Event::EnemyLeaked { .. })
    });

    let leaks = events
        .iter()
        .filter(|event| matches!(event, Event::EnemyLeaked { .. }))
        .count();
    assert_eq!(leaks, 1);
    assert_eq!(engine.state().health, 19);
    assert!(engine.enemies().is_empty());
}

#[test]
fn cleared_sub_wave_starts_the_next_one_after_its_delay() {
    let mut engine = engine(grunt_waves(1, 2));
    assert!(engine.start_next_wave());

    let _ = run_until(&mut engine, |event| {
        matches!(event, Event::SubWaveCleared { .. })
    });
    assert_eq!(engine.state().status, WaveStatus::WaitingForNextSubWave);
    assert_eq!(engine.pending_advance(), Some(Duration::from_secs(2)));

    let events = run_until(&mut engine, |event| {
        matches!(event, Event::SubWaveStarted { .. })
    });
    let frames = events
        .iter()
        .filter(|event| matches!(event, Event::TimeAdvanced { .. }))
        .count();
    let elapsed = FRAME * u32::try_from(frames).expect("frame count fits");

    assert_eq!(elapsed, Duration::from_secs(2));
    assert_eq!(engine.state().progress.overall(), 2);
    assert_eq!(engine.pending_advance(), None);
}

#[test]
fn starting_early_cancels_the_pending_advance() {
    let mut engine = engine(grunt_waves(1, 3));
    assert!(engine.start_next_wave());
    let _ = run_until(&mut engine, |event| {
        matches!(event, Event::SubWaveCleared { .. })
    });
    assert!(engine.pending_advance().is_some());

    assert!(engine.start_next_wave());
    assert_eq!(engine.pending_advance(), None);

    for _ in 0..60 {
        engine.advance(FRAME);
    }
    assert_eq!(engine.state().progress.overall(), 2);
}

#[test]
fn final_main_wave_cleared_wins_the_game() {
    let mut engine = engine(grunt_waves(2, 1));
    assert!(engine.start_next_wave());
    let _ = run_until(&mut engine, |event| {
        matches!(event, Event::MainWaveCleared { .. })
    });
    assert_eq!(engine.state().status, WaveStatus::BetweenMainWaves);
    assert_eq!(engine.pending_advance(), None);

    assert!(engine.start_next_wave());
    let _ = run_until(&mut engine, |event| matches!(event, Event::GameWon));

    assert_eq!(engine.state().status, WaveStatus::GameWon);
    assert!(!engine.is_running());
    assert!(!engine.start_next_wave());
}

#[test]
fn game_over_stops_the_loop() {
    let mut config = grunt_waves(1, 2);
    config.starting_health = 1;
    let mut engine = engine(config);
    assert!(engine.start_next_wave());

    let _ = run_until(&mut engine, |event| matches!(event, Event::GameOver));
    let clock = engine.state().clock;

    assert_eq!(engine.state().status, WaveStatus::GameOver);
    assert_eq!(engine.state().health, 0);
    assert!(!engine.is_running());
    assert_eq!(engine.pending_advance(), None);

    engine.advance(Duration::from_secs(5));
    assert_eq!(engine.state().clock, clock);
    assert!(!engine.start_next_wave());
}

#[test]
fn towers_kill_enemies_and_credit_each_bounty_once() {
    let mut engine = engine(grunt_waves(1, 2));
    let _ = place(&mut engine, 0);
    let _ = place(&mut engine, 1);
    assert!(engine.start_next_wave());

    let events = run_until(&mut engine, |event| {
        matches!(event, Event::SubWaveCleared { .. })
    });

    let killed: Vec<(u32, u32)> = events
        .iter()
        .filter_map(|event| match event {
            Event::EnemyKilled { enemy, bounty } => Some((enemy.get(), *bounty)),
            _ => None,
        })
        .collect();
    let distinct: BTreeSet<u32> = killed.iter().map(|(enemy, _)| *enemy).collect();
    assert_eq!(distinct.len(), killed.len(), "an enemy was killed twice");
    assert_eq!(killed.len(), 1);

    let bounty: u32 = killed.iter().map(|(_, bounty)| bounty).sum();
    let state = engine.state();
    assert_eq!(state.score, bounty);
    assert_eq!(state.money, 100 + bounty);
    assert_eq!(state.health, 20);
}

#[test]
fn game_speed_is_clamped_and_scales_the_clock() {
    let mut engine = engine(grunt_waves(1, 1));
    assert_eq!(engine.set_game_speed(8.0), 2.0);
    assert_eq!(engine.set_game_speed(0.0), 0.5);
    assert_eq!(engine.set_game_speed(2.0), 2.0);
    assert!(engine.start_next_wave());

    engine.advance(Duration::from_millis(100));

    assert_eq!(engine.state().clock, Duration::from_millis(200));
}

fn crowded_first_sub_wave(grunts: usize) -> GameConfig {
    let mut config = grunt_waves(1, 2);
    config.waves[0].sub_waves[0].spawns =
        vec![SpawnDescriptor::plain(EnemyKind::new("grunt")); grunts];
    config
}

fn spawned(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::EnemySpawned { .. }))
        .count()
}

#[test]
fn reset_mid_wave_discards_enemies_projectiles_and_queue() {
    let mut engine = engine(crowded_first_sub_wave(5));
    let _ = place(&mut engine, 0);
    assert!(engine.start_next_wave());

    let before = run_until(&mut engine, |event| {
        matches!(event, Event::ProjectileFired { .. })
    });
    assert!(spawned(&before) < 5, "queue drained before the first shot");
    assert!(!engine.enemies().is_empty());
    assert!(!engine.projectiles().is_empty());
    assert_eq!(engine.state().status, WaveStatus::SubWaveInProgress);

    engine.reset();

    assert!(engine.enemies().is_empty());
    assert!(engine.projectiles().is_empty());
    assert!(engine.towers().is_empty());
    assert_eq!(engine.state().clock, Duration::ZERO);
    assert_eq!(engine.pending_advance(), None);
    assert_eq!(engine.drain_events(), vec![Event::SessionReset]);

    engine.advance(FRAME);
    assert!(engine.enemies().is_empty());

    assert!(engine.start_next_wave());
    let queued = engine
        .drain_events()
        .iter()
        .find_map(|event| match event {
            Event::SubWaveStarted { queued, .. } => Some(*queued),
            _ => None,
        })
        .expect("sub-wave started");
    assert_eq!(queued, 5);

    engine.advance(FRAME);
    let first_frame = engine.drain_events();
    assert_eq!(spawned(&first_frame), 1, "spawn timer kept the old clock");

    let rest = run_until(&mut engine, |event| {
        matches!(event, Event::SubWaveCleared { .. })
    });
    assert_eq!(spawned(&first_frame) + spawned(&rest), queued);
    assert_eq!(engine.state().progress.overall(), 1);
}

#[test]
fn reset_after_a_cleared_sub_wave_cancels_the_pending_advance() {
    let mut engine = engine(grunt_waves(1, 2));
    let _ = place(&mut engine, 3);
    engine.set_selected_category(Some(simple()));
    let _ = engine.set_game_speed(2.0);
    assert!(engine.start_next_wave());
    let _ = run_until(&mut engine, |event| {
        matches!(event, Event::SubWaveCleared { .. })
    });
    assert!(engine.pending_advance().is_some());

    engine.reset();

    let state = engine.state();
    assert_eq!((state.money, state.health, state.score), (200, 20, 0));
    assert_eq!(state.status, WaveStatus::Initial);
    assert_eq!(state.progress.overall(), 0);
    assert_eq!(state.game_speed, 1.0);
    assert_eq!(state.selected_category, None);
    assert_eq!(state.available_categories, vec![simple()]);
    assert!(engine.towers().is_empty());
    assert!(engine.enemies().is_empty());
    assert!(engine.projectiles().is_empty());
    assert!(engine.spots().iter().all(|spot| !spot.occupied));
    assert!(!engine.is_running());
    assert_eq!(engine.pending_advance(), None);

    engine.advance(Duration::from_secs(10));
    assert_eq!(engine.state().progress.overall(), 0);
}

#[test]
fn first_main_wave_unlocks_a_second_category() {
    let mut engine = engine(grunt_waves(2, 1));
    assert_eq!(engine.state().available_categories, vec![simple()]);

    assert!(engine.start_next_wave());

    let available = engine.state().available_categories;
    assert_eq!(available.len(), 2);
    assert_eq!(available[0], simple());
    assert_ne!(available[1], simple());
}
