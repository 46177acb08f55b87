//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Virtual millisecond clock only
//! - Seeded RNG only
//! - Stable timer order (due time, then creation order)
//! - No rendering or platform dependencies

pub mod anim;
pub mod clock;
pub mod game;
pub mod mole;
pub mod overlay;
pub mod state;
pub mod tick;

pub use anim::Animation;
pub use clock::{Scheduler, TimerId};
pub use game::{Game, SlotState};
pub use mole::{Mole, MoleCommand, MoleSignal, Stage, Variant};
pub use overlay::{Overlay, OverlayAction};
pub use state::{GameEvent, GamePhase, GameState};
pub use tick::{Autoplay, TickInput, tick};
