//! Tightrope - headless runner
//!
//! Plays one level on autopilot and reports the verdict. The browser build drives
//! the same `tick()` from its frame clock instead.

#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;
#[cfg(not(target_arch = "wasm32"))]
use tightrope::{
    ProfileBook, catalog,
    consts::TICKS_PER_SECOND,
    load_levels_json,
    persistence::MemoryStore,
    platform,
    sim::{GameEvent, GameState, TickInput, tick},
};

/// Give up after this many ticks (ten minutes of play)
#[cfg(not(target_arch = "wasm32"))]
const MAX_TICKS: u64 = 10 * 60 * TICKS_PER_SECOND as u64;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug)]
#[command(about = "Play one tightrope level on autopilot and report the verdict", version)]
struct Args {
    /// Level index into the catalog (or the --levels file)
    #[arg(default_value_t = 1)]
    level: usize,
    /// Run seed
    #[arg(default_value_t = 42)]
    seed: u64,
    /// JSON file with a list of level rules
    #[arg(long)]
    levels: Option<PathBuf>,
    /// Profile to record the run under
    #[arg(long, default_value = "player")]
    player: String,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    platform::init_logging();
    let args = Args::parse();
    log::info!("Tightrope (native) starting...");

    let levels = match &args.levels {
        Some(path) => match std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|json| load_levels_json(&json).map_err(|e| e.to_string()))
        {
            Ok(levels) => levels,
            Err(e) => {
                log::error!("Could not load levels from {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => catalog(),
    };

    let Some(rule) = levels.get(args.level).cloned() else {
        log::error!("No level {} ({} available)", args.level, levels.len());
        std::process::exit(1);
    };

    let mut state = match GameState::new(args.seed, rule) {
        Ok(state) => state,
        Err(e) => {
            log::error!("Invalid level: {e}");
            std::process::exit(1);
        }
    };

    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };
    while !state.verdict().is_terminal() && state.sim.tick_count < MAX_TICKS {
        tick(&mut state, &input);
        for event in state.take_events() {
            match event {
                GameEvent::HazardSpawned { .. } | GameEvent::ProjectileFired => {
                    log::trace!("{event:?}")
                }
                _ => log::debug!("{event:?}"),
            }
        }
    }

    if !state.verdict().is_terminal() {
        log::warn!("Tick limit reached, leaving the run");
        state.exit();
    }

    let summary = state.summary();
    if summary.verdict.is_terminal() {
        let mut book = ProfileBook::new(MemoryStore::new());
        match book.record_run(&args.player, args.level, &summary) {
            Ok(profile) => log::info!(
                "{}: best {} / unlocked level {}",
                profile.name,
                profile.best_distance,
                profile.unlocked_level
            ),
            Err(e) => log::warn!("Profile not saved: {e}"),
        }
    }

    println!(
        "{} | seed {} | {:?} | distance {} | kills {} | {:.1}s",
        state.rule().name,
        args.seed,
        summary.verdict,
        state.score(),
        summary.kills,
        summary.ticks as f32 / TICKS_PER_SECOND as f32
    );
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["tightrope"]).unwrap();
        assert_eq!(args.level, 1);
        assert_eq!(args.seed, 42);
        assert_eq!(args.player, "player");
        assert!(args.levels.is_none());
    }

    #[test]
    fn test_args_reject_bad_numbers() {
        assert!(Args::try_parse_from(["tightrope", "two"]).is_err());
        assert!(Args::try_parse_from(["tightrope", "3", "-1"]).is_err());
    }

    #[test]
    fn test_args_flags() {
        let argv = ["tightrope", "4", "7", "--levels", "rules.json", "--player", "ana"];
        let args = Args::try_parse_from(argv).unwrap();
        assert_eq!(args.level, 4);
        assert_eq!(args.seed, 7);
        assert_eq!(args.levels, Some(PathBuf::from("rules.json")));
        assert_eq!(args.player, "ana");
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser shell owns the frame loop
}
