//! Mole sprite animations
//!
//! The sprite player itself belongs to the presentation layer. The simulation
//! only needs to know which sequences exist and how long each one runs, so it
//! can schedule the completion callback on the virtual clock.

use serde::{Deserialize, Serialize};

/// Default playback rate for most sequences
pub const DEFAULT_FPS: u32 = 24;
/// The attack lunge plays at half speed
pub const ATTACK_FPS: u32 = 12;

/// Named sprite sequences a mole can play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Animation {
    Idle,
    Appear,
    Hide,
    Dizzy,
    Faint,
    Attack,
    Heal,
}

impl Animation {
    pub const ALL: [Animation; 7] = [
        Animation::Idle,
        Animation::Appear,
        Animation::Hide,
        Animation::Dizzy,
        Animation::Faint,
        Animation::Attack,
        Animation::Heal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Animation::Idle => "idle",
            Animation::Appear => "appear",
            Animation::Hide => "hide",
            Animation::Dizzy => "dizzy",
            Animation::Faint => "faint",
            Animation::Attack => "attack",
            Animation::Heal => "heal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == s)
    }

    /// Sprite sheet frames in this sequence (6x8 sheet, row-major)
    pub fn frames(&self) -> &'static [u16] {
        match self {
            Animation::Idle => &[0],
            Animation::Appear => &[1, 2, 3, 4],
            Animation::Hide => &[4, 3, 2, 1, 0],
            Animation::Dizzy => &[36, 37, 38],
            Animation::Faint => &[42, 43, 44, 0],
            Animation::Attack => &[11, 12, 13, 14, 15, 16],
            Animation::Heal => &[24, 25, 26, 27, 28, 29, 30, 31, 32, 33],
        }
    }

    /// Rate the mole sequence plays this animation at
    pub fn default_fps(&self) -> u32 {
        match self {
            Animation::Attack => ATTACK_FPS,
            _ => DEFAULT_FPS,
        }
    }

    /// Playback time in ms, rounded up to whole milliseconds
    pub fn duration_ms(&self, fps: u32) -> u64 {
        let fps = u64::from(fps.max(1));
        let frames = self.frames().len() as u64;
        (frames * 1000).div_ceil(fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durations() {
        assert_eq!(Animation::Appear.duration_ms(24), 167);
        assert_eq!(Animation::Hide.duration_ms(24), 209);
        assert_eq!(Animation::Attack.duration_ms(12), 500);
        assert_eq!(Animation::Heal.duration_ms(24), 417);
        assert_eq!(Animation::Idle.duration_ms(24), 42);
    }

    #[test]
    fn test_zero_fps_does_not_divide_by_zero() {
        assert_eq!(Animation::Dizzy.duration_ms(0), 3000);
    }

    #[test]
    fn test_name_lookup() {
        for anim in Animation::ALL {
            assert_eq!(Animation::from_str(anim.as_str()), Some(anim));
        }
        assert_eq!(Animation::from_str("moonwalk"), None);
    }
}
