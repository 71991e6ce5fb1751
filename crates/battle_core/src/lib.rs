//! # Battle Core
//!
//! Adapter between typed battle descriptions and an external battle
//! simulation engine.
//!
//! The engine is an opaque executable: it reads a whitespace-separated
//! request on stdin, takes a seed and a simulation count on its command
//! line, and prints per-round statistics on stdout. This crate owns
//! everything on our side of that boundary:
//!
//! - [`registry`] - Unit kinds and their combat attributes
//! - [`combatant`] - Fleets with technology levels and unit rosters
//! - [`protocol`] - Request encoder and response decoder
//! - [`runner`] - Engine backends, including the child-process runner
//! - [`outcome`] - Per-round statistics of a finished battle
//! - [`engine`] - The [`BattleEngine`] facade tying them together
//! - [`og`] - Built-in OGame unit table

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combatant;
pub mod engine;
pub mod error;
pub mod og;
pub mod outcome;
pub mod protocol;
pub mod registry;
pub mod runner;

pub use engine::BattleEngine;
pub use error::{BattleError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combatant::{Combatant, Side, MAX_COMBATANTS_PER_SIDE};
    pub use crate::engine::BattleEngine;
    pub use crate::error::{BattleError, DecodeError, Result, ValidationError};
    pub use crate::og::OgUnit;
    pub use crate::outcome::{BattleOutcome, CombatantOutcome, UnitGroupStats, Winner};
    pub use crate::registry::{UnitAttributes, UnitKind, UnitRegistry};
    pub use crate::runner::{EngineBackend, EngineRequest, ProcessEngine};
}
