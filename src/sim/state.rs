//! Game state and core simulation types
//!
//! `GameState` is the scoreboard the HUD and overlays read. It is replaced
//! wholesale on reset; everything else the controller owns (moles, timers,
//! RNG) lives in [`super::Game`].

use serde::{Deserialize, Serialize};

use super::anim::Animation;
use super::mole::Variant;
use crate::consts::MAX_HEALTH;

/// Current phase of gameplay, derived from the state flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ticks running, moles popping
    Playing,
    /// Player paused, ticks stopped
    Paused,
    /// Countdown hit zero
    Cleared,
    /// Health ran out
    GameOver,
}

/// Scoreboard for the current run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub level: u32,
    pub score: u32,
    /// Seconds left on the level countdown
    pub time: u32,
    /// Player health, always within [0, MAX_HEALTH]
    pub health: u32,
    pub cleared: bool,
    pub paused: bool,
    pub gameover: bool,
}

impl GameState {
    /// Fresh level-1 state with a full countdown
    pub fn new(level_seconds: u32) -> Self {
        Self {
            level: 1,
            score: 0,
            time: level_seconds,
            health: MAX_HEALTH,
            cleared: false,
            paused: false,
            gameover: false,
        }
    }

    pub fn phase(&self) -> GamePhase {
        if self.gameover {
            GamePhase::GameOver
        } else if self.cleared {
            GamePhase::Cleared
        } else if self.paused {
            GamePhase::Paused
        } else {
            GamePhase::Playing
        }
    }

    /// Health as a 0-1 fraction for the health bar
    pub fn health_fraction(&self) -> f32 {
        self.health as f32 / MAX_HEALTH as f32
    }
}

/// Things that happened during a tick, for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A new level began (also sent on reset)
    LevelStarted { level: u32 },
    MoleSpawned { slot: usize, variant: Variant },
    /// A sprite sequence should start playing on a slot
    AnimationStarted { slot: usize, animation: Animation, fps: u32 },
    AnimationFinished { slot: usize, animation: Animation },
    Whacked { slot: usize, score: u32 },
    /// A feisty mole hit the player
    Attacked { slot: usize },
    HealthChanged { health: u32 },
    MoleHidden { slot: usize },
    Countdown { time: u32 },
    LevelCleared { level: u32, score: u32 },
    GameOver { level: u32, score: u32 },
    Paused,
    Resumed,
}
