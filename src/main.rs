//! Warp Arena headless host
//!
//! Drives the simulation at a fixed 60 Hz with the autopilot at the stick,
//! then prints a run summary. The highscore is stored when the run ends in
//! a game over.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use warp_arena::consts::{MAX_SUBSTEPS, SIM_DT};
use warp_arena::sim::{GameData, GameMode, GamePhase, InputSnapshot, tick};
use warp_arena::{ArenaResult, HighScore, Tuning};

/// Rule set to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Evolved,
    Pacifism,
    Menu,
}

impl From<Mode> for GameMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Evolved => GameMode::Evolved,
            Mode::Pacifism => GameMode::Pacifism,
            Mode::Menu => GameMode::Menu,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "warp-arena", version, about = "Run the arena simulation headless")]
struct Args {
    /// PRNG seed
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Simulated seconds before stopping (a game over stops earlier)
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,

    #[arg(long, value_enum, default_value_t = Mode::Evolved)]
    mode: Mode,

    /// JSON tuning file. Without it, `tuning.json` is read if present.
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Highscore document
    #[arg(long, default_value = warp_arena::highscores::SCORES_FILE)]
    scores: PathBuf,
}

/// Totals reported at the end of a run
struct Summary {
    ticks: u64,
    elapsed: f32,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("warp-arena: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> ArenaResult<()> {
    let tuning = match &args.tuning {
        Some(path) => Tuning::load_strict(path)?,
        None => Tuning::load(Path::new(warp_arena::tuning::TUNING_FILE)),
    };

    let mut best = HighScore::load(&args.scores);
    let mut data = GameData::new(args.seed, tuning);
    data.high_score = best.score;
    data.reset_run(args.mode.into());
    data.phase = GamePhase::Playing;
    log::info!(
        "Warp Arena starting: seed={} mode={} seconds={}",
        args.seed,
        data.mode.as_str(),
        args.seconds
    );

    let summary = simulate(&mut data, args.seconds);

    println!("seed:       {}", args.seed);
    println!("mode:       {}", data.mode.as_str());
    println!("phase:      {}", data.phase.as_str());
    println!("ticks:      {}", summary.ticks);
    println!("seconds:    {:.1}", summary.elapsed);
    println!("score:      {}", data.score);
    println!("kills:      {}", data.kills);
    println!("lives:      {}", data.lives);
    println!("multiplier: {}", data.multiplier);

    store_highscore(&data, &mut best, &args.scores)?;
    Ok(())
}

/// Write the highscore file, but only for a run that reached game over.
/// Returns true if the file was written.
fn store_highscore(data: &GameData, best: &mut HighScore, path: &Path) -> ArenaResult<bool> {
    if data.phase != GamePhase::GameOver {
        log::info!("Run stopped before game over, highscore file left untouched");
        return Ok(false);
    }
    if best.record(data.score) {
        println!("new highscore!");
    }
    best.save(path)?;
    Ok(true)
}

/// Accumulate host frames into fixed simulation steps until the run ends
fn simulate(data: &mut GameData, seconds: f32) -> Summary {
    // Host frames arrive at a fixed 30 Hz; the accumulator splits them
    const FRAME_DT: f32 = 1.0 / 30.0;

    let input = InputSnapshot {
        idle_mode: true,
        ..Default::default()
    };
    let mut accumulator = 0.0;
    let mut summary = Summary {
        ticks: 0,
        elapsed: 0.0,
    };

    while summary.elapsed < seconds && data.running && data.phase == GamePhase::Playing {
        accumulator += FRAME_DT;
        summary.elapsed += FRAME_DT;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let out = tick(data, &input, SIM_DT);
            for sound in &out.sounds {
                log::trace!("sound: {}", sound.as_str());
            }
            accumulator -= SIM_DT;
            substeps += 1;
            summary.ticks += 1;
        }
    }
    summary
}
