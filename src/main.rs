//! Whack-a-Mole headless runner
//!
//! Plays the game with the autoplay bot at a fixed frame step and reports how
//! far it got. Useful for balance checks against a tuning file.
//!
//! Usage: whack-a-mole [--seed N] [--levels N] [--tuning FILE] [--miss P] [--json]

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use anyhow::Context;
    use clap::Parser;
    use serde::Serialize;
    use whack_a_mole::Tuning;
    use whack_a_mole::consts::FRAME_MS;
    use whack_a_mole::sim::{
        Autoplay, Game, GameEvent, GamePhase, GameState, OverlayAction, TickInput, tick,
    };

    /// Hard stop so a bad tuning file can't spin forever (1 hour of game time)
    const MAX_FRAMES: u64 = 3_600_000 / FRAME_MS;

    /// Headless autoplay runner for balance checks
    #[derive(Parser, Debug)]
    #[command(name = "whack-a-mole", version)]
    struct Args {
        /// Run seed (defaults to the current time)
        #[arg(long)]
        seed: Option<u64>,
        /// Stop after clearing this many levels
        #[arg(long, default_value_t = 3)]
        levels: u32,
        /// JSON tuning file
        #[arg(long, value_name = "FILE")]
        tuning: Option<PathBuf>,
        /// Chance the bot lets a mole go
        #[arg(long = "miss", default_value_t = 0.15, value_parser = parse_chance)]
        miss_chance: f64,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    }

    fn parse_chance(s: &str) -> Result<f64, String> {
        let p: f64 = s.parse().map_err(|_| format!("not a number: {s}"))?;
        if (0.0..=1.0).contains(&p) {
            Ok(p)
        } else {
            Err(format!("{p} is not within 0..=1"))
        }
    }

    fn default_seed() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    #[derive(Serialize)]
    struct Summary {
        seed: u64,
        outcome: GamePhase,
        final_state: GameState,
        levels_cleared: u32,
        whacks: u32,
        attacks: u32,
        elapsed_ms: u64,
    }

    pub fn run() -> anyhow::Result<()> {
        let args = Args::parse();
        let seed = args.seed.unwrap_or_else(default_seed);
        let tuning = args
            .tuning
            .as_deref()
            .map(Tuning::load)
            .unwrap_or_default();

        log::info!("Whack-a-Mole starting (seed {seed})");
        let mut game = Game::new(seed, tuning);
        let mut bot = Autoplay::new(seed ^ 0x5eed, 450, args.miss_chance);

        let mut levels_cleared = 0;
        let mut whacks = 0;
        let mut attacks = 0;

        for _ in 0..MAX_FRAMES {
            let mut input = TickInput::default();
            match game.phase() {
                GamePhase::Playing => bot.plan(&game, &mut input),
                GamePhase::Cleared if levels_cleared < args.levels => {
                    input.button = Some(OverlayAction::NextLevel);
                }
                _ => {}
            }
            tick(&mut game, &input, FRAME_MS);

            for event in game.drain_events() {
                match event {
                    GameEvent::Whacked { .. } => whacks += 1,
                    GameEvent::Attacked { .. } => attacks += 1,
                    GameEvent::LevelCleared { .. } => levels_cleared += 1,
                    _ => {}
                }
            }

            let done = match game.phase() {
                GamePhase::GameOver => true,
                GamePhase::Cleared => levels_cleared >= args.levels,
                _ => false,
            };
            if done {
                break;
            }
        }

        let summary = Summary {
            seed: game.seed(),
            outcome: game.phase(),
            final_state: game.state().clone(),
            levels_cleared,
            whacks,
            attacks,
            elapsed_ms: game.now_ms(),
        };

        if args.json {
            let json = serde_json::to_string_pretty(&summary).context("serializing summary")?;
            println!("{json}");
        } else {
            let state = &summary.final_state;
            println!("seed {}: {:?}", summary.seed, summary.outcome);
            println!(
                "  level {}  score {}  health {}  time left {}s",
                state.level, state.score, state.health, state.time
            );
            println!(
                "  {} levels cleared, {} whacks, {} attacks, {:.1}s played",
                summary.levels_cleared,
                summary.whacks,
                summary.attacks,
                summary.elapsed_ms as f64 / 1000.0
            );
        }
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = native::run() {
        log::error!("{e:#}");
        eprintln!("error: {e:?}");
        std::process::exit(2);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No wasm frontend; the library is embedded by the host page
}
