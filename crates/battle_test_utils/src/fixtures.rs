//! Test fixtures and helpers.
//!
//! Small registries, fleets and hand-built engine output for consistent
//! testing.

use std::fmt::Write;

use battle_core::combatant::Combatant;
use battle_core::outcome::UnitGroupStats;
use battle_core::protocol::ResponseShape;
use battle_core::registry::{UnitAttributes, UnitKind, UnitRegistry};
use battle_core::runner::EngineRequest;
use battle_core::{BattleError, Result};

/// Registry with a single kind: weapons 10, shield 10, armor 100, no rapid fire.
///
/// # Panics
///
/// Never; the values are valid.
#[must_use]
pub fn single_kind_registry() -> UnitRegistry {
    let attrs = UnitAttributes::new(10.0, 10.0, 100.0, []).expect("valid attributes");
    UnitRegistry::from_attributes(vec![attrs]).expect("valid registry")
}

/// Registry of `num_kinds` identical kinds without rapid fire.
///
/// # Panics
///
/// Panics if `num_kinds` is zero.
#[must_use]
pub fn uniform_registry(num_kinds: usize) -> UnitRegistry {
    let attrs = UnitAttributes::new(10.0, 10.0, 100.0, []).expect("valid attributes");
    UnitRegistry::from_attributes(vec![attrs; num_kinds]).expect("non-empty registry")
}

/// Fleet without technologies holding `count` units of `kind`.
///
/// # Panics
///
/// Panics if `count` does not fit in an `i64`.
#[must_use]
pub fn fleet(kind: usize, count: u64) -> Combatant {
    let count = i64::try_from(count).expect("count fits in i64");
    Combatant::new(0, 0, 0, [(UnitKind::new(kind), count)]).expect("valid combatant")
}

/// Render one simulation of engine output.
///
/// `stats(combatant, round, kind)` supplies every group, combatants being
/// numbered attackers first.
#[must_use]
pub fn simulation_output(
    shape: ResponseShape,
    num_rounds: usize,
    stats: impl Fn(usize, usize, usize) -> UnitGroupStats,
) -> String {
    let mut out = num_rounds.to_string();
    out.push('\n');
    for combatant in 0..shape.num_combatants() {
        for round in 0..num_rounds {
            for kind in 0..shape.num_kinds {
                for field in stats(combatant, round, kind).to_fields() {
                    let _ = write!(out, " {field}");
                }
            }
        }
        out.push('\n');
    }
    out
}

/// One simulation where nothing fires and every group keeps `remaining` units.
#[must_use]
pub fn idle_output(shape: ResponseShape, num_rounds: usize, remaining: u64) -> String {
    simulation_output(shape, num_rounds, |_, _, _| UnitGroupStats {
        num_remaining_units: remaining,
        ..Default::default()
    })
}

/// In-process engine that ignores its request and returns `output`.
pub fn canned_backend(output: String) -> impl Fn(&EngineRequest) -> Result<String> + Sync {
    move |_: &EngineRequest| Ok(output.clone())
}

/// In-process engine that always fails like an engine exiting non-zero.
pub fn failing_backend(stderr: &str) -> impl Fn(&EngineRequest) -> Result<String> + Sync {
    let stderr = stderr.to_string();
    move |_: &EngineRequest| Err(BattleError::Engine(stderr.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_output_one_on_one() {
        let shape = ResponseShape::new(1, 1, 1);
        assert_eq!(
            idle_output(shape, 1, 10),
            "1\n 0 0 0 0 0 0 10\n 0 0 0 0 0 0 10\n"
        );
    }

    #[test]
    fn test_simulation_output_numbers_combatants_attackers_first() {
        let shape = ResponseShape::new(1, 1, 1);
        let out = simulation_output(shape, 1, |combatant, _, _| UnitGroupStats {
            times_fired: combatant as u64 + 1,
            ..Default::default()
        });
        let tokens: Vec<&str> = out.split_whitespace().collect();
        assert_eq!(tokens[1], "1");
        assert_eq!(tokens[8], "2");
    }

    #[test]
    fn test_backends() {
        use battle_core::runner::EngineBackend;

        let request = EngineRequest {
            seed: 1,
            num_simulations: 1,
            stdin: String::new(),
        };
        assert_eq!(canned_backend("0".to_string()).run(&request).unwrap(), "0");
        assert_eq!(
            failing_backend("boom").run(&request).unwrap_err().to_string(),
            "boom"
        );
    }

    #[test]
    fn test_fleet() {
        let fleet = fleet(2, 7);
        assert_eq!(fleet.unit_count(UnitKind::new(2)), 7);
        assert_eq!(uniform_registry(3).len(), 3);
    }
}
