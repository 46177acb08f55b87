//! Game loop controller
//!
//! Owns the scoreboard, the twelve moles and every timer. Two repeating ticks
//! drive the level (spawn tick, countdown tick); each mole then runs its own
//! animation sequence and reports back through [`MoleSignal`]s.
//!
//! The controller only talks to a mole through its input methods and only
//! acts on the [`MoleCommand`]s it returns. Slot occupancy is tracked here,
//! updated synchronously on spawn and on finish, so spawn selection never
//! depends on mole internals.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::anim::Animation;
use super::clock::{Scheduler, TimerId};
use super::mole::{Mole, MoleCommand, MoleSignal, Variant};
use super::overlay::{Overlay, OverlayAction};
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::{GRID_SLOTS, MAX_HEALTH};
use crate::tuning::Tuning;

/// Occupancy of a grid hole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SlotState {
    #[default]
    Idle,
    Popping,
}

/// Timer payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wake {
    SpawnTick,
    CountdownTick,
    AnimationDone { slot: usize, animation: Animation },
    DelayDone { slot: usize },
}

pub struct Game {
    tuning: Tuning,
    seed: u64,
    rng: Pcg32,
    clock: Scheduler<Wake>,
    state: GameState,
    moles: [Mole; GRID_SLOTS],
    slots: [SlotState; GRID_SLOTS],
    /// Moles currently up, capped by `tuning.max_popping`. Always equals
    /// the number of Popping entries in `slots`.
    popping: u32,
    /// Virtual time each slot last spawned
    spawned_at: [u64; GRID_SLOTS],
    /// Animation playing on each slot and its completion timer
    tracks: [Option<(Animation, TimerId)>; GRID_SLOTS],
    /// Each mole's armed linger delay
    delays: [Option<TimerId>; GRID_SLOTS],
    spawn_timer: Option<TimerId>,
    countdown_timer: Option<TimerId>,
    events: Vec<GameEvent>,
}

impl Game {
    /// Start a new game at level 1 with ticks running
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let tuning = tuning.sanitized();
        let mut game = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            clock: Scheduler::new(),
            state: GameState::new(tuning.level_seconds),
            moles: std::array::from_fn(|i| Mole::new(i, tuning.linger_ms)),
            slots: [SlotState::Idle; GRID_SLOTS],
            popping: 0,
            spawned_at: [0; GRID_SLOTS],
            tracks: [None; GRID_SLOTS],
            delays: [None; GRID_SLOTS],
            spawn_timer: None,
            countdown_timer: None,
            events: Vec::new(),
            tuning,
        };
        game.reset();
        game
    }

    // ── Queries ──

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase()
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn moles(&self) -> &[Mole; GRID_SLOTS] {
        &self.moles
    }

    pub fn mole(&self, slot: usize) -> Option<&Mole> {
        self.moles.get(slot)
    }

    pub fn slot_state(&self, slot: usize) -> Option<SlotState> {
        self.slots.get(slot).copied()
    }

    pub fn popping_count(&self) -> u32 {
        self.popping
    }

    /// Animation currently playing on a slot
    pub fn animation(&self, slot: usize) -> Option<Animation> {
        self.tracks.get(slot).copied().flatten().map(|(a, _)| a)
    }

    /// When a whackable mole came up; None if tapping it would do nothing
    pub fn up_since(&self, slot: usize) -> Option<u64> {
        let mole = self.moles.get(slot)?;
        mole.is_whackable().then_some(self.spawned_at[slot])
    }

    /// Whether the spawn and countdown ticks are armed
    pub fn ticks_running(&self) -> bool {
        self.spawn_timer.is_some() || self.countdown_timer.is_some()
    }

    pub fn overlay(&self) -> Option<Overlay> {
        Overlay::for_state(&self.state)
    }

    /// Take everything that happened since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Level flow ──

    /// Back to level 1 with a fresh scoreboard. Moles already up finish
    /// their sequences.
    pub fn reset(&mut self) {
        self.state = GameState::new(self.tuning.level_seconds);
        self.recount_popping();
        self.setup_ticks();
        log::info!("Game reset (seed {})", self.seed);
        self.events.push(GameEvent::LevelStarted { level: 1 });
    }

    /// (Re)arm the spawn and countdown ticks for the current level
    pub fn setup_ticks(&mut self) {
        self.stop_ticks();
        let interval = self.tuning.spawn_interval_ms(self.state.level);
        self.spawn_timer = Some(self.clock.set_interval(interval, Wake::SpawnTick));
        self.countdown_timer = Some(
            self.clock
                .set_interval(self.tuning.countdown_ms, Wake::CountdownTick),
        );
        log::debug!("Ticks armed: spawn every {interval}ms at level {}", self.state.level);
    }

    pub fn stop_ticks(&mut self) {
        for timer in [self.spawn_timer.take(), self.countdown_timer.take()]
            .into_iter()
            .flatten()
        {
            self.clock.cancel(timer);
        }
    }

    /// Stop the ticks. Only while playing.
    pub fn pause(&mut self) -> bool {
        if self.phase() != GamePhase::Playing {
            return false;
        }
        self.stop_ticks();
        self.state.paused = true;
        log::info!("Paused at {}s left", self.state.time);
        self.events.push(GameEvent::Paused);
        true
    }

    /// Restart the ticks, keeping time, score and level
    pub fn resume(&mut self) -> bool {
        if !self.state.paused {
            return false;
        }
        self.state.paused = false;
        self.setup_ticks();
        log::info!("Resumed");
        self.events.push(GameEvent::Resumed);
        true
    }

    /// Advance past a cleared level
    pub fn next_level(&mut self) -> bool {
        if !self.state.cleared {
            return false;
        }
        self.state.level += 1;
        self.state.cleared = false;
        self.state.gameover = false;
        self.state.time = self.tuning.level_seconds;
        self.recount_popping();
        self.setup_ticks();
        log::info!("Level {} started", self.state.level);
        self.events.push(GameEvent::LevelStarted {
            level: self.state.level,
        });
        true
    }

    pub fn game_over(&mut self) {
        self.stop_ticks();
        self.state.gameover = true;
        log::info!(
            "Game over at level {} with score {}",
            self.state.level,
            self.state.score
        );
        self.events.push(GameEvent::GameOver {
            level: self.state.level,
            score: self.state.score,
        });
    }

    /// Overlay button press; ignored unless the current panel offers it
    pub fn press(&mut self, action: OverlayAction) -> bool {
        if !self.overlay().is_some_and(|o| o.offers(action)) {
            return false;
        }
        match action {
            OverlayAction::Reset => {
                self.reset();
                true
            }
            OverlayAction::NextLevel => self.next_level(),
            OverlayAction::Resume => self.resume(),
        }
    }

    // ── Scoreboard callbacks ──

    pub fn on_score(&mut self) {
        self.state.score += 1;
    }

    /// Feisty attack. Ignored unless playing.
    pub fn on_damage(&mut self) {
        if self.state.cleared || self.state.gameover || self.state.paused {
            return;
        }

        // Snaps to 0 only once health is under the threshold; otherwise the
        // full step applies, which can overshoot below zero.
        let health = i64::from(self.state.health);
        let target = if health - i64::from(self.tuning.clamp_threshold) < 0 {
            0
        } else {
            health - i64::from(self.tuning.damage)
        };
        self.set_health(target);

        if target <= 0 {
            self.game_over();
        }
    }

    pub fn on_heal(&mut self) {
        let health = i64::from(self.state.health);
        let max = i64::from(MAX_HEALTH);
        let target = if health + i64::from(self.tuning.clamp_threshold) > max {
            max
        } else {
            health + i64::from(self.tuning.heal)
        };
        self.set_health(target);
    }

    pub fn on_finish_popping(&mut self, index: usize) {
        let Some(slot) = self.slots.get_mut(index) else {
            return;
        };
        if *slot == SlotState::Popping {
            self.popping = self.popping.saturating_sub(1);
        }
        *slot = SlotState::Idle;
        self.events.push(GameEvent::MoleHidden { slot: index });
    }

    /// Start a level's count from the moles still up. Zero unless the last
    /// level's moles are still finishing, and those keep counting against
    /// the cap until they hide.
    fn recount_popping(&mut self) {
        self.popping = self
            .slots
            .iter()
            .filter(|s| **s == SlotState::Popping)
            .count() as u32;
    }

    fn set_health(&mut self, target: i64) {
        let health = target.clamp(0, i64::from(MAX_HEALTH)) as u32;
        self.state.health = health;
        self.events.push(GameEvent::HealthChanged { health });
    }

    // ── Moles ──

    /// Pop a random variant at `slot` if it's free
    pub fn spawn(&mut self, slot: usize) -> bool {
        let variant = Variant::roll(
            &mut self.rng,
            self.tuning.feisty_chance,
            self.tuning.healing_chance,
        );
        self.spawn_variant(slot, variant)
    }

    /// Pop `variant` at `slot` if it's free. Doesn't check the concurrency
    /// cap; the spawn tick does that.
    pub fn spawn_variant(&mut self, slot: usize, variant: Variant) -> bool {
        if self.slots.get(slot) != Some(&SlotState::Idle) {
            return false;
        }
        self.slots[slot] = SlotState::Popping;
        self.popping += 1;
        self.spawned_at[slot] = self.clock.now_ms();
        log::debug!("Mole {slot} up ({variant:?})");
        self.events.push(GameEvent::MoleSpawned { slot, variant });
        self.drive(slot, |mole, out| mole.pop(variant, out));
        true
    }

    /// Player tap on a slot. Returns true if it whacked something.
    pub fn tap(&mut self, slot: usize) -> bool {
        if slot >= GRID_SLOTS {
            return false;
        }
        let mut out = Vec::new();
        if !self.moles[slot].whack(&mut out) {
            return false;
        }
        self.apply_all(slot, out);
        log::debug!("Mole {slot} whacked, score {}", self.state.score);
        self.events.push(GameEvent::Whacked {
            slot,
            score: self.state.score,
        });
        true
    }

    /// Play a cosmetic animation on an idle slot. Refused while a mole is up
    /// so its own sequence can't be cut short.
    pub fn play_animation(&mut self, slot: usize, animation: Animation, fps: u32) -> bool {
        if self.slots.get(slot) != Some(&SlotState::Idle) {
            return false;
        }
        self.start_animation(slot, animation, fps);
        true
    }

    // ── Clock ──

    /// Run every timer due in the next `dt_ms`
    pub fn advance(&mut self, dt_ms: u64) {
        let until = self.clock.now_ms() + dt_ms;
        while let Some((id, wake)) = self.clock.pop_due(until) {
            self.dispatch(id, wake);
        }
        self.clock.settle(until);
    }

    fn dispatch(&mut self, id: TimerId, wake: Wake) {
        match wake {
            Wake::SpawnTick => self.spawn_tick(),
            Wake::CountdownTick => self.countdown_tick(),
            Wake::AnimationDone { slot, animation } => {
                if !matches!(self.tracks[slot], Some((_, t)) if t == id) {
                    return;
                }
                self.tracks[slot] = None;
                self.events.push(GameEvent::AnimationFinished { slot, animation });
                self.drive(slot, |mole, out| mole.on_animation_finished(animation, out));
            }
            Wake::DelayDone { slot } => {
                if self.delays[slot] != Some(id) {
                    return;
                }
                self.delays[slot] = None;
                self.drive(slot, |mole, out| mole.on_delay_elapsed(out));
            }
        }
    }

    fn spawn_tick(&mut self) {
        if self.popping >= self.tuning.max_popping {
            return;
        }
        let slot = self.rng.random_range(0..GRID_SLOTS);
        if self.slots[slot] == SlotState::Idle {
            self.spawn(slot);
        }
    }

    fn countdown_tick(&mut self) {
        if self.state.time == 0 {
            self.stop_ticks();
            self.state.cleared = true;
            log::info!(
                "Level {} cleared with score {}",
                self.state.level,
                self.state.score
            );
            self.events.push(GameEvent::LevelCleared {
                level: self.state.level,
                score: self.state.score,
            });
        } else {
            self.state.time -= 1;
            self.events.push(GameEvent::Countdown {
                time: self.state.time,
            });
        }
    }

    // ── Mole command plumbing ──

    fn drive(&mut self, slot: usize, f: impl FnOnce(&mut Mole, &mut Vec<MoleCommand>)) {
        let mut out = Vec::new();
        f(&mut self.moles[slot], &mut out);
        self.apply_all(slot, out);
    }

    fn apply_all(&mut self, slot: usize, commands: Vec<MoleCommand>) {
        for command in commands {
            self.apply(slot, command);
        }
    }

    fn apply(&mut self, slot: usize, command: MoleCommand) {
        match command {
            MoleCommand::Play { animation, fps } => self.start_animation(slot, animation, fps),
            MoleCommand::StartDelay { ms } => {
                self.cancel_delay(slot);
                self.delays[slot] = Some(self.clock.set_timeout(ms, Wake::DelayDone { slot }));
            }
            MoleCommand::CancelDelay => self.cancel_delay(slot),
            MoleCommand::Notify(signal) => match signal {
                MoleSignal::Score => self.on_score(),
                MoleSignal::Damage => {
                    self.events.push(GameEvent::Attacked { slot });
                    self.on_damage();
                }
                MoleSignal::Heal => self.on_heal(),
                MoleSignal::FinishPopping(index) => self.on_finish_popping(index),
            },
        }
    }

    /// A new animation replaces the slot's current one; the replaced one
    /// never reports completion.
    fn start_animation(&mut self, slot: usize, animation: Animation, fps: u32) {
        if let Some((_, timer)) = self.tracks[slot].take() {
            self.clock.cancel(timer);
        }
        let timer = self.clock.set_timeout(
            animation.duration_ms(fps),
            Wake::AnimationDone { slot, animation },
        );
        self.tracks[slot] = Some((animation, timer));
        self.events.push(GameEvent::AnimationStarted {
            slot,
            animation,
            fps,
        });
    }

    fn cancel_delay(&mut self, slot: usize) {
        if let Some(timer) = self.delays[slot].take() {
            self.clock.cancel(timer);
        }
    }
}
