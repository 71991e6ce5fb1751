//! Error types for the battle engine adapter.

use std::time::Duration;

use thiserror::Error;

use crate::combatant::Side;
use crate::registry::UnitKind;

/// Result type alias using [`BattleError`].
pub type Result<T> = std::result::Result<T, BattleError>;

/// Top-level error type for every engine invocation.
#[derive(Debug, Error)]
pub enum BattleError {
    /// Inputs were rejected before any process was spawned.
    #[error("Invalid battle input: {0}")]
    Validation(#[from] ValidationError),

    /// The engine executable could not be started.
    #[error("Failed to run engine '{path}': {source}")]
    Process {
        /// Path of the engine executable.
        path: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The engine exited with a non-zero status.
    ///
    /// Carries the engine's standard error verbatim.
    #[error("{0}")]
    Engine(String),

    /// The engine succeeded but its output does not match the request.
    #[error("Malformed engine output: {0}")]
    Decode(#[from] DecodeError),

    /// The engine was killed after exceeding its time limit.
    #[error("Engine did not finish within {0:?}")]
    Timeout(Duration),
}

/// Malformed attribute, combatant or request inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A registry needs at least one unit kind.
    #[error("unit registry cannot be empty")]
    EmptyRegistry,

    /// Registry indices must be contiguous from zero.
    #[error("no {0} found in unit registry")]
    MissingKind(UnitKind),

    /// Weapons, shield and armor must be finite and strictly positive.
    #[error("{field} must be a finite number greater than 0, got {value}")]
    NonPositiveAttribute {
        /// Attribute name.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// Rapid fire counts must fit in 32 bits.
    #[error("rapid fire against {target} must be between 0 and 2**32-1, got {count}")]
    RapidFireOutOfRange {
        /// Target kind of the rejected entry.
        target: UnitKind,
        /// Rejected count.
        count: i64,
    },

    /// A rapid fire entry targets a kind outside the registry.
    #[error("{target} in rapid fire of {kind} does not exist in unit registry")]
    UnknownRapidFireTarget {
        /// Kind owning the rapid fire table.
        kind: UnitKind,
        /// Out-of-range target.
        target: UnitKind,
    },

    /// Technology levels are limited to a single byte.
    #[error("{field} must be between 0 and 255, got {value}")]
    TechnologyOutOfRange {
        /// Technology name.
        field: &'static str,
        /// Rejected value.
        value: i64,
    },

    /// Unit counts cannot be negative.
    #[error("unit count for {kind} must be at least 0, got {count}")]
    NegativeUnitCount {
        /// Kind of the rejected group.
        kind: UnitKind,
        /// Rejected count.
        count: i64,
    },

    /// A roster references a kind the registry does not define.
    #[error("no {kind} found in unit registry for {side} at index {index}")]
    UnknownUnitKind {
        /// Side the combatant belongs to.
        side: Side,
        /// Position of the combatant on its side.
        index: usize,
        /// Unknown kind.
        kind: UnitKind,
    },

    /// The wire format stores per-side counts in a single byte.
    #[error("too many {0}")]
    TooManyCombatants(Side),

    /// At least one repetition must be requested.
    #[error("number of simulations must be at least 1")]
    NoSimulations,
}

/// Engine output that does not match the shape implied by the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A token is not a non-negative integer.
    #[error("token #{position} is not a non-negative integer: '{token}'")]
    InvalidToken {
        /// Zero-based token position in the stream.
        position: usize,
        /// Offending text.
        token: String,
    },

    /// The stream ended before the expected data.
    #[error("simulation #{simulation}: expected {expected} more tokens, only {available} left")]
    Truncated {
        /// Zero-based repetition being decoded.
        simulation: usize,
        /// Tokens needed.
        expected: usize,
        /// Tokens remaining.
        available: usize,
    },

    /// The stream has more tokens than the request accounts for.
    #[error("{0} unexpected trailing tokens after the last simulation")]
    TrailingTokens(usize),

    /// The round count implies a payload that cannot be addressed.
    #[error("simulation #{simulation}: round count {num_rounds} is too large")]
    RoundCountOverflow {
        /// Zero-based repetition being decoded.
        simulation: usize,
        /// Round count read from the stream.
        num_rounds: u64,
    },
}
