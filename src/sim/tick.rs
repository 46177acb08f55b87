//! Frame tick
//!
//! Applies one frame of player input to the game and advances the virtual
//! clock. Frontends fill a [`TickInput`] from their touch/keyboard events;
//! the headless runner fills it from an [`Autoplay`] bot.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::game::Game;
use super::overlay::OverlayAction;
use super::state::GamePhase;
use crate::consts::GRID_SLOTS;

/// Input commands for a single frame (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Slots tapped this frame, in tap order
    pub taps: Vec<usize>,
    /// Pause toggle
    pub pause: bool,
    /// Overlay button pressed this frame
    pub button: Option<OverlayAction>,
}

/// Advance the game by one frame
pub fn tick(game: &mut Game, input: &TickInput, dt_ms: u64) {
    if input.pause {
        match game.phase() {
            GamePhase::Playing => {
                game.pause();
            }
            GamePhase::Paused => {
                game.resume();
            }
            _ => {}
        }
    }

    if let Some(action) = input.button {
        game.press(action);
    }

    for &slot in &input.taps {
        game.tap(slot);
    }

    game.advance(dt_ms);
}

/// Demo player: taps each mole once it has been up for `reaction_ms`,
/// deliberately missing a fraction of them
#[derive(Debug, Clone)]
pub struct Autoplay {
    reaction_ms: u64,
    /// Kept in [0, 1]; `random_bool` panics outside it
    miss_chance: f64,
    rng: Pcg32,
    /// Spawn time of the mole each slot already made up its mind about
    judged: [Option<u64>; GRID_SLOTS],
}

impl Autoplay {
    pub fn new(seed: u64, reaction_ms: u64, miss_chance: f64) -> Self {
        Self {
            reaction_ms,
            miss_chance: miss_chance.clamp(0.0, 1.0),
            rng: Pcg32::seed_from_u64(seed),
            judged: [None; GRID_SLOTS],
        }
    }

    pub fn reaction_ms(&self) -> u64 {
        self.reaction_ms
    }

    pub fn miss_chance(&self) -> f64 {
        self.miss_chance
    }

    pub fn set_miss_chance(&mut self, miss_chance: f64) {
        self.miss_chance = miss_chance.clamp(0.0, 1.0);
    }

    /// Add this frame's taps to `input`
    pub fn plan(&mut self, game: &Game, input: &mut TickInput) {
        let now = game.now_ms();
        for slot in 0..GRID_SLOTS {
            let Some(since) = game.up_since(slot) else {
                continue;
            };
            if now < since + self.reaction_ms || self.judged[slot] == Some(since) {
                continue;
            }
            self.judged[slot] = Some(since);
            if !self.rng.random_bool(self.miss_chance) {
                input.taps.push(slot);
            }
        }
    }
}
