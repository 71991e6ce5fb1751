//! # Battle Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Registry and fleet fixtures
//! - Canned engine output builders
//! - Stub engine executables
//! - Request grammar parser
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod grammar;
#[cfg(unix)]
pub mod stub;
pub mod strategies;

/// Re-export proptest for convenience.
pub use proptest;
