//! Per-slot mole state machine
//!
//! A mole never touches the clock, the sprite player or the game state
//! directly. It consumes inputs (spawn, tap, animation finished, delay
//! elapsed) and pushes [`MoleCommand`]s that the controller carries out.
//!
//! Sequences per spawn:
//! - Healing: heal -> linger -> hide -> finish
//! - Feisty:  appear -> linger -> (damage) attack -> hide -> finish
//! - Passive: appear -> linger -> hide -> finish
//! - Whacked: (score, maybe heal) dizzy -> faint -> finish

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::anim::Animation;

/// What kind of mole popped up this time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Variant {
    #[default]
    Passive,
    /// Attacks the player if not whacked in time
    Feisty,
    /// Restores health when whacked
    Healing,
}

impl Variant {
    /// Feisty with `feisty_chance`; only a non-feisty mole rolls for healing
    pub fn roll<R: Rng>(rng: &mut R, feisty_chance: f64, healing_chance: f64) -> Self {
        if rng.random_bool(feisty_chance) {
            Variant::Feisty
        } else if rng.random_bool(healing_chance) {
            Variant::Healing
        } else {
            Variant::Passive
        }
    }
}

/// Where the mole is in its sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Stage {
    /// Down in the hole
    #[default]
    Idle,
    /// Playing appear (or heal for healers)
    Emerging,
    /// Up and waiting on the linger delay
    Lingering,
    Attacking,
    Hiding,
    Dizzy,
    Fainting,
}

/// Notifications for the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoleSignal {
    Score,
    Damage,
    Heal,
    FinishPopping(usize),
}

/// Side effects a mole asks the controller to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoleCommand {
    /// Start an animation on this slot (replacing whatever is playing)
    Play { animation: Animation, fps: u32 },
    /// Arm this mole's linger delay
    StartDelay { ms: u64 },
    /// Disarm this mole's linger delay if armed
    CancelDelay,
    Notify(MoleSignal),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mole {
    pub index: usize,
    pub popping: bool,
    pub feisty: bool,
    pub healing: bool,
    pub whacked: bool,
    pub attacking: bool,
    pub stage: Stage,
    pub variant: Variant,
    /// Linger delay armed at the end of the emerge animation
    linger_ms: u64,
}

impl Mole {
    pub fn new(index: usize, linger_ms: u64) -> Self {
        Self {
            index,
            popping: false,
            feisty: false,
            healing: false,
            whacked: false,
            attacking: false,
            stage: Stage::Idle,
            variant: Variant::Passive,
            linger_ms,
        }
    }

    /// Whether a tap right now would count
    pub fn is_whackable(&self) -> bool {
        self.popping && !self.whacked && !self.attacking
    }

    /// Start a new spawn as `variant`
    pub fn pop(&mut self, variant: Variant, out: &mut Vec<MoleCommand>) {
        self.whacked = false;
        self.attacking = false;
        self.popping = true;
        self.variant = variant;
        self.feisty = variant == Variant::Feisty;
        self.healing = variant == Variant::Healing;

        self.stage = Stage::Emerging;
        let animation = if variant == Variant::Healing {
            Animation::Heal
        } else {
            Animation::Appear
        };
        play(out, animation);
    }

    /// Player tap. Returns true if it landed.
    pub fn whack(&mut self, out: &mut Vec<MoleCommand>) -> bool {
        if !self.is_whackable() {
            return false;
        }

        out.push(MoleCommand::CancelDelay);
        self.whacked = true;
        self.feisty = false;

        out.push(MoleCommand::Notify(MoleSignal::Score));
        if self.healing {
            out.push(MoleCommand::Notify(MoleSignal::Heal));
        }

        self.stage = Stage::Dizzy;
        play(out, Animation::Dizzy);
        true
    }

    /// The animation this mole last asked for has finished.
    /// Completions the current stage isn't waiting on are ignored.
    pub fn on_animation_finished(&mut self, animation: Animation, out: &mut Vec<MoleCommand>) {
        match (self.stage, animation) {
            (Stage::Emerging, Animation::Appear | Animation::Heal) => {
                self.stage = Stage::Lingering;
                out.push(MoleCommand::StartDelay { ms: self.linger_ms });
            }
            (Stage::Attacking, Animation::Attack) => {
                self.stage = Stage::Hiding;
                play(out, Animation::Hide);
            }
            (Stage::Dizzy, Animation::Dizzy) => {
                self.stage = Stage::Fainting;
                play(out, Animation::Faint);
            }
            (Stage::Hiding, Animation::Hide) | (Stage::Fainting, Animation::Faint) => {
                self.finish(out);
            }
            _ => {}
        }
    }

    /// The linger delay ran out without a whack
    pub fn on_delay_elapsed(&mut self, out: &mut Vec<MoleCommand>) {
        if self.stage != Stage::Lingering {
            return;
        }

        if self.feisty {
            self.attacking = true;
            self.stage = Stage::Attacking;
            out.push(MoleCommand::Notify(MoleSignal::Damage));
            play(out, Animation::Attack);
        } else {
            self.stage = Stage::Hiding;
            play(out, Animation::Hide);
        }
    }

    fn finish(&mut self, out: &mut Vec<MoleCommand>) {
        self.popping = false;
        self.stage = Stage::Idle;
        out.push(MoleCommand::Notify(MoleSignal::FinishPopping(self.index)));
    }
}

fn play(out: &mut Vec<MoleCommand>, animation: Animation) {
    out.push(MoleCommand::Play {
        animation,
        fps: animation.default_fps(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn signals(out: &[MoleCommand]) -> Vec<MoleSignal> {
        out.iter()
            .filter_map(|c| match c {
                MoleCommand::Notify(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    fn played(out: &[MoleCommand]) -> Vec<Animation> {
        out.iter()
            .filter_map(|c| match c {
                MoleCommand::Play { animation, .. } => Some(*animation),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_passive_sequence() {
        let mut mole = Mole::new(4, 1000);
        let mut out = Vec::new();

        mole.pop(Variant::Passive, &mut out);
        assert!(mole.popping);
        assert_eq!(played(&out), vec![Animation::Appear]);

        out.clear();
        mole.on_animation_finished(Animation::Appear, &mut out);
        assert_eq!(out, vec![MoleCommand::StartDelay { ms: 1000 }]);

        out.clear();
        mole.on_delay_elapsed(&mut out);
        assert_eq!(played(&out), vec![Animation::Hide]);
        assert!(signals(&out).is_empty());

        out.clear();
        mole.on_animation_finished(Animation::Hide, &mut out);
        assert!(!mole.popping);
        assert_eq!(mole.stage, Stage::Idle);
        assert_eq!(signals(&out), vec![MoleSignal::FinishPopping(4)]);
    }

    #[test]
    fn test_feisty_sequence_attacks_once() {
        let mut mole = Mole::new(0, 1000);
        let mut out = Vec::new();

        mole.pop(Variant::Feisty, &mut out);
        mole.on_animation_finished(Animation::Appear, &mut out);
        out.clear();
        mole.on_delay_elapsed(&mut out);
        assert!(mole.attacking);
        assert_eq!(signals(&out), vec![MoleSignal::Damage]);
        assert_eq!(played(&out), vec![Animation::Attack]);
        assert!(matches!(out[1], MoleCommand::Play { fps: 12, .. }));

        // Can't whack mid-attack
        out.clear();
        assert!(!mole.whack(&mut out));
        assert!(out.is_empty());

        mole.on_animation_finished(Animation::Attack, &mut out);
        assert_eq!(played(&out), vec![Animation::Hide]);
        out.clear();
        mole.on_animation_finished(Animation::Hide, &mut out);
        assert_eq!(signals(&out), vec![MoleSignal::FinishPopping(0)]);
    }

    #[test]
    fn test_healing_sequence_plays_heal() {
        let mut mole = Mole::new(2, 1000);
        let mut out = Vec::new();
        mole.pop(Variant::Healing, &mut out);
        assert!(mole.healing);
        assert!(!mole.feisty);
        assert_eq!(played(&out), vec![Animation::Heal]);
        mole.on_animation_finished(Animation::Heal, &mut out);
        assert_eq!(mole.stage, Stage::Lingering);
    }

    #[test]
    fn test_whack_preempts_attack() {
        let mut mole = Mole::new(7, 1000);
        let mut out = Vec::new();
        mole.pop(Variant::Feisty, &mut out);
        mole.on_animation_finished(Animation::Appear, &mut out);

        out.clear();
        assert!(mole.whack(&mut out));
        assert_eq!(out[0], MoleCommand::CancelDelay);
        assert_eq!(signals(&out), vec![MoleSignal::Score]);
        assert!(!mole.feisty);

        // A stray delay expiry no longer does anything
        out.clear();
        mole.on_delay_elapsed(&mut out);
        assert!(out.is_empty());

        mole.on_animation_finished(Animation::Dizzy, &mut out);
        assert_eq!(played(&out), vec![Animation::Faint]);
        out.clear();
        mole.on_animation_finished(Animation::Faint, &mut out);
        assert_eq!(signals(&out), vec![MoleSignal::FinishPopping(7)]);
    }

    #[test]
    fn test_whack_healer_signals_heal() {
        let mut mole = Mole::new(1, 1000);
        let mut out = Vec::new();
        mole.pop(Variant::Healing, &mut out);
        out.clear();
        assert!(mole.whack(&mut out));
        assert_eq!(signals(&out), vec![MoleSignal::Score, MoleSignal::Heal]);
    }

    #[test]
    fn test_whack_noops() {
        let mut mole = Mole::new(3, 1000);
        let mut out = Vec::new();

        // Not popping
        assert!(!mole.whack(&mut out));
        assert!(out.is_empty());

        // Already whacked
        mole.pop(Variant::Passive, &mut out);
        assert!(mole.whack(&mut out));
        out.clear();
        assert!(!mole.whack(&mut out));
        assert!(out.is_empty());
    }

    #[test]
    fn test_unexpected_finish_is_ignored() {
        let mut mole = Mole::new(5, 1000);
        let mut out = Vec::new();
        mole.on_animation_finished(Animation::Hide, &mut out);
        mole.on_animation_finished(Animation::Idle, &mut out);
        assert!(out.is_empty());
        assert_eq!(mole.stage, Stage::Idle);
    }

    #[test]
    fn test_roll_extremes() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(Variant::roll(&mut rng, 1.0, 1.0), Variant::Feisty);
        assert_eq!(Variant::roll(&mut rng, 0.0, 1.0), Variant::Healing);
        assert_eq!(Variant::roll(&mut rng, 0.0, 0.0), Variant::Passive);
    }

    #[test]
    fn test_roll_distribution() {
        let mut rng = Pcg32::seed_from_u64(42);
        let n = 20_000;
        let mut feisty = 0;
        let mut healing = 0;
        for _ in 0..n {
            match Variant::roll(&mut rng, 0.4, 0.05) {
                Variant::Feisty => feisty += 1,
                Variant::Healing => healing += 1,
                Variant::Passive => {}
            }
        }
        let feisty = feisty as f64 / n as f64;
        let healing = healing as f64 / n as f64;
        assert!((feisty - 0.4).abs() < 0.02, "feisty rate {feisty}");
        // 0.6 * 0.05
        assert!((healing - 0.03).abs() < 0.01, "healing rate {healing}");
    }
}
