//! End-of-level, game-over and pause panels
//!
//! Panels hold no state of their own: which one shows, and what it shows, is
//! derived from the controller's flags.

use serde::{Deserialize, Serialize};

use super::state::{GamePhase, GameState};

/// Buttons a panel can offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlayAction {
    /// Start over from level 1
    Reset,
    NextLevel,
    Resume,
}

/// Which panel is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Overlay {
    Clear { level: u32, score: u32 },
    GameOver { level: u32, score: u32 },
    Pause,
}

impl Overlay {
    pub fn for_state(state: &GameState) -> Option<Self> {
        match state.phase() {
            GamePhase::Playing => None,
            GamePhase::Paused => Some(Overlay::Pause),
            GamePhase::Cleared => Some(Overlay::Clear {
                level: state.level,
                score: state.score,
            }),
            GamePhase::GameOver => Some(Overlay::GameOver {
                level: state.level,
                score: state.score,
            }),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Overlay::Clear { .. } => "Cleared",
            Overlay::GameOver { .. } => "Game Over",
            Overlay::Pause => "Paused",
        }
    }

    pub fn actions(&self) -> &'static [OverlayAction] {
        match self {
            Overlay::Clear { .. } => &[OverlayAction::Reset, OverlayAction::NextLevel],
            Overlay::GameOver { .. } => &[OverlayAction::Reset],
            Overlay::Pause => &[OverlayAction::Reset, OverlayAction::Resume],
        }
    }

    pub fn offers(&self, action: OverlayAction) -> bool {
        self.actions().contains(&action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_overlay_while_playing() {
        assert_eq!(Overlay::for_state(&GameState::new(30)), None);
    }

    #[test]
    fn test_clear_panel() {
        let mut state = GameState::new(30);
        state.level = 3;
        state.score = 41;
        state.cleared = true;
        let overlay = Overlay::for_state(&state).unwrap();
        assert_eq!(overlay, Overlay::Clear { level: 3, score: 41 });
        assert!(overlay.offers(OverlayAction::NextLevel));
        assert!(!overlay.offers(OverlayAction::Resume));
    }

    #[test]
    fn test_game_over_only_resets() {
        let mut state = GameState::new(30);
        state.gameover = true;
        let overlay = Overlay::for_state(&state).unwrap();
        assert_eq!(overlay.actions(), &[OverlayAction::Reset]);
        assert_eq!(overlay.title(), "Game Over");
    }
}
