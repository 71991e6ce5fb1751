//! Text protocol spoken with the battle engine.
//!
//! The engine reads one request from stdin and, on success, writes one flat
//! stream of integers to stdout.
//!
//! # Request (stdin)
//!
//! Newline-delimited, with blank lines separating records:
//!
//! ```text
//! <num_kinds>
//!
//! <weapons> <shield> <armor> <num_rapid_fire>    (once per kind, in index order)
//! <target_kind> <count>                          (num_rapid_fire times)
//!
//! <num_attackers> <num_defenders>
//!
//! <weapons_tech> <shielding_tech> <armor_tech> <num_groups>   (attackers, then defenders)
//! <kind> <count>                                              (num_groups times)
//!
//! ```
//!
//! # Response (stdout)
//!
//! Whitespace-separated non-negative integers with no framing. For each
//! simulation: the round count `R`, then for every combatant (attackers
//! first) `R * num_kinds * 7` statistics, round-major then kind-major, in the
//! field order of [`UnitGroupStats`](crate::outcome::UnitGroupStats).
//!
//! See [`request`] and [`response`] for the encoder and decoder.

pub mod request;
pub mod response;

pub use request::{encode_combatants, encode_request, encode_units, format_decimal};
pub use response::{decode_response, ResponseShape};
