#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Grid Defence headless.

mod autopilot;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{ensure, Context, Result};
use clap::{Args, Parser, Subcommand};
use grid_defence_core::{Event, GameConfig, WaveStatus};
use grid_defence_engine::{standard_config, Engine};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use autopilot::{Action, Autopilot};

#[derive(Debug, Parser)]
#[command(name = "grid-defence", version, about = "Headless Grid Defence simulation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Plays a game with the built-in autopilot and prints a summary.
    Run(RunArgs),
    /// Prints the standard configuration, including generated waves, as TOML.
    DumpConfig {
        /// Seed for the wave generator.
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Loads a TOML configuration and reports whether it is valid.
    CheckConfig {
        /// Configuration file to validate.
        path: PathBuf,
    },
}

#[derive(Debug, Args)]
struct RunArgs {
    /// TOML configuration to play instead of the standard board.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for wave generation and the tower unlock order.
    #[arg(long)]
    seed: Option<u64>,
    /// Game speed multiplier, clamped to 0.5..=2.0.
    #[arg(long, default_value_t = 1.0)]
    speed: f32,
    /// Wall-clock length of one simulated frame in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Upper bound on simulated frames.
    #[arg(long, default_value_t = 500_000)]
    max_frames: u64,
    /// Leave the board empty instead of building towers.
    #[arg(long)]
    no_autopilot: bool,
}

/// Entry point for the Grid Defence command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(&args),
        Commands::DumpConfig { seed } => dump_config(seed),
        Commands::CheckConfig { path } => check_config(&path),
    }
}

fn run(args: &RunArgs) -> Result<()> {
    ensure!(args.frame_ms > 0, "--frame-ms must be positive");

    let seed = args
        .seed
        .unwrap_or_else(|| ChaCha8Rng::from_entropy().gen());
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => standard_config(&mut ChaCha8Rng::seed_from_u64(seed)),
    };
    let mut engine = Engine::with_seed(config, seed).context("configuration is invalid")?;
    println!("{} (seed {seed})", engine.welcome_banner());

    let speed = engine.set_game_speed(args.speed);
    log::info!("running at {speed}x with {}ms frames", args.frame_ms);

    let frame = Duration::from_millis(args.frame_ms);
    let mut autopilot = Autopilot::default();
    let mut frames = 0;
    while frames < args.max_frames {
        if !args.no_autopilot {
            for action in autopilot.act(&mut engine) {
                report_action(&action);
            }
        }

        let status = engine.state().status;
        if status.is_terminal() {
            break;
        }
        if matches!(status, WaveStatus::Initial | WaveStatus::BetweenMainWaves) {
            let _ = engine.start_next_wave();
        }

        engine.advance(frame);
        for event in engine.drain_events() {
            report_event(&event);
        }
        frames += 1;
    }

    print_summary(&engine, &autopilot, frames);
    Ok(())
}

fn dump_config(seed: u64) -> Result<()> {
    let config = standard_config(&mut ChaCha8Rng::seed_from_u64(seed));
    let rendered = config
        .to_toml_string()
        .context("failed to render the standard configuration")?;
    print!("{rendered}");
    Ok(())
}

fn check_config(path: &Path) -> Result<()> {
    let config = load_config(path)?;
    println!(
        "ok: {} main waves of {} sub-waves, {} tower categories, {} placement spots",
        config.main_wave_count,
        config.sub_waves_per_main,
        config.towers.len(),
        config.spots.len()
    );
    Ok(())
}

fn load_config(path: &Path) -> Result<GameConfig> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    GameConfig::from_toml_str(&source)
        .with_context(|| format!("invalid configuration in {}", path.display()))
}

fn report_action(action: &Action) {
    match action {
        Action::Placed(tower) => log::info!(
            "autopilot placed {} on spot {}",
            tower.category,
            tower.spot.get()
        ),
        Action::Merged(tower) => log::info!(
            "autopilot merged {} into level {}",
            tower.category,
            tower.level
        ),
    }
}

fn report_event(event: &Event) {
    match event {
        Event::SubWaveStarted { progress, queued } => println!(
            "wave {}.{} started ({queued} enemies)",
            progress.main(),
            progress.sub()
        ),
        Event::TowersUnlocked { categories } => {
            let names: Vec<&str> = categories.iter().map(|category| category.as_str()).collect();
            println!("unlocked: {}", names.join(", "));
        }
        Event::MainWaveCleared { progress } => {
            println!("main wave {} cleared", progress.main());
        }
        Event::EnemyLeaked { health, .. } => log::info!("enemy leaked, health {health}"),
        Event::GameWon => println!("all waves survived"),
        Event::GameOver => println!("game over"),
        other => log::trace!("{other:?}"),
    }
}

fn print_summary(engine: &Engine, autopilot: &Autopilot, frames: u64) {
    let state = engine.state();
    println!("status: {:?}", state.status);
    println!(
        "wave: {}.{} ({} sub-waves started)",
        state.progress.main(),
        state.progress.sub(),
        state.progress.overall()
    );
    println!(
        "health: {}  money: {}  score: {}",
        state.health, state.money, state.score
    );
    println!(
        "frames: {frames}  simulated: {:.1}s  autopilot actions: {}",
        state.clock.as_secs_f64(),
        autopilot.actions()
    );
    for tower in engine.towers() {
        println!(
            "tower {}: {} level {} on spot {}",
            tower.id.get(),
            tower.category,
            tower.level,
            tower.spot.get()
        );
    }
}
