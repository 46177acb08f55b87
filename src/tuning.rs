//! Game balance tuning
//!
//! Every number that shapes difficulty lives here so it can be tweaked from a
//! JSON file without recompiling. Missing fields fall back to the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Balance constants for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Level flow ===
    /// Countdown length of every level (seconds)
    pub level_seconds: u32,
    /// Countdown tick period (ms)
    pub countdown_ms: u64,

    // === Spawning ===
    /// Spawn interval before the per-level speedup (ms)
    pub spawn_base_ms: u64,
    /// Interval reduction per level (ms)
    pub spawn_step_ms: u64,
    /// Fastest allowed spawn interval (ms)
    pub spawn_floor_ms: u64,
    /// Maximum number of moles up at once
    pub max_popping: u32,

    // === Moles ===
    /// Chance a spawned mole is feisty (attacks if not whacked)
    pub feisty_chance: f64,
    /// Chance a non-feisty mole is a healer
    pub healing_chance: f64,
    /// How long a mole lingers after emerging before it acts (ms)
    pub linger_ms: u64,

    // === Health ===
    /// Health lost per attack
    pub damage: u32,
    /// Health restored per healer whack
    pub heal: u32,
    /// Margin used to decide when damage/heal snaps to the bound
    pub clamp_threshold: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            level_seconds: 30,
            countdown_ms: 1000,

            spawn_base_ms: 750,
            spawn_step_ms: 50,
            spawn_floor_ms: 350,
            max_popping: 3,

            feisty_chance: 0.4,
            healing_chance: 0.05,
            linger_ms: 1000,

            damage: 16,
            heal: 16,
            clamp_threshold: 10,
        }
    }
}

impl Tuning {
    /// Spawn tick interval for a level: shrinks by `spawn_step_ms` per level
    /// down to `spawn_floor_ms`
    pub fn spawn_interval_ms(&self, level: u32) -> u64 {
        let speedup = self.spawn_step_ms.saturating_mul(u64::from(level));
        self.spawn_base_ms
            .saturating_sub(speedup)
            .max(self.spawn_floor_ms)
    }

    /// Parse tuning from JSON (missing fields defaulted)
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    /// Serialize tuning to pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Load tuning from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path.display());
                    tuning
                }
                Err(e) => {
                    log::warn!("Bad tuning file {}: {e} - using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Can't read tuning file {}: {e} - using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Clamp values that would break the simulation
    pub fn sanitized(mut self) -> Self {
        if !(0.0..=1.0).contains(&self.feisty_chance) {
            log::warn!("feisty_chance {} out of range, clamping", self.feisty_chance);
            self.feisty_chance = clamp_chance(self.feisty_chance);
        }
        if !(0.0..=1.0).contains(&self.healing_chance) {
            log::warn!("healing_chance {} out of range, clamping", self.healing_chance);
            self.healing_chance = clamp_chance(self.healing_chance);
        }
        if self.spawn_floor_ms == 0 {
            log::warn!("spawn_floor_ms must be positive, using 1");
            self.spawn_floor_ms = 1;
        }
        if self.countdown_ms == 0 {
            log::warn!("countdown_ms must be positive, using 1000");
            self.countdown_ms = 1000;
        }
        self
    }
}

// NaN counts as "never"
fn clamp_chance(p: f64) -> f64 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}
