//! Request encoder.

use std::fmt::Write;

use crate::combatant::{check_side, Combatant, Side};
use crate::error::ValidationError;
use crate::registry::UnitRegistry;

/// Validate both sides against `registry` and render the engine's stdin.
///
/// # Errors
///
/// Fails if either side is too large or references an unknown unit kind.
pub fn encode_request(
    registry: &UnitRegistry,
    attackers: &[Combatant],
    defenders: &[Combatant],
) -> Result<String, ValidationError> {
    check_side(Side::Attackers, attackers, registry)?;
    check_side(Side::Defenders, defenders, registry)?;

    let mut stdin = encode_units(registry);
    stdin.push_str(&encode_combatants(attackers, defenders));
    Ok(stdin)
}

/// Render the unit attribute block, kinds in index order.
#[must_use]
pub fn encode_units(registry: &UnitRegistry) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "{}", registry.len());
    out.push('\n');

    for (_, attrs) in registry.iter() {
        let _ = writeln!(
            out,
            "{} {} {} {}",
            format_decimal(attrs.weapons()),
            format_decimal(attrs.shield()),
            format_decimal(attrs.armor()),
            attrs.rapid_fire().len()
        );
        for (target, count) in attrs.rapid_fire() {
            let _ = writeln!(out, "{} {}", target.index(), count);
        }
        out.push('\n');
    }

    out
}

/// Render the combatant block, attackers first.
#[must_use]
pub fn encode_combatants(attackers: &[Combatant], defenders: &[Combatant]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", attackers.len(), defenders.len());
    out.push('\n');

    for combatant in attackers.iter().chain(defenders) {
        let _ = writeln!(
            out,
            "{} {} {} {}",
            combatant.weapons_technology(),
            combatant.shielding_technology(),
            combatant.armor_technology(),
            combatant.unit_groups().len()
        );
        for (kind, count) in combatant.unit_groups() {
            let _ = writeln!(out, "{} {}", kind.index(), count);
        }
        out.push('\n');
    }

    out
}

/// Format a float as plain decimal text, never in scientific notation.
///
/// Uses the shortest representation that parses back to the same value and
/// always includes a decimal point (`10` renders as `10.0`).
#[must_use]
pub fn format_decimal(value: f64) -> String {
    let mut text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        text.push_str(".0");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{UnitAttributes, UnitKind};

    fn single_kind_registry() -> UnitRegistry {
        let attrs = UnitAttributes::new(10.0, 10.0, 100.0, []).unwrap();
        UnitRegistry::from_attributes(vec![attrs]).unwrap()
    }

    fn ten_units() -> Combatant {
        Combatant::new(0, 0, 0, [(UnitKind::new(0), 10)]).unwrap()
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(10.0), "10.0");
        assert_eq!(format_decimal(0.01), "0.01");
        assert_eq!(format_decimal(9_000_000.0), "9000000.0");
        assert_eq!(format_decimal(1e20), "100000000000000000000.0");
        assert_eq!(format_decimal(1.5e-7), "0.00000015");
    }

    #[test]
    fn test_encode_single_battle() {
        let stdin =
            encode_request(&single_kind_registry(), &[ten_units()], &[ten_units()]).unwrap();
        assert_eq!(
            stdin,
            "1\n\n10.0 10.0 100.0 0\n\n1 1\n\n0 0 0 1\n0 10\n\n0 0 0 1\n0 10\n\n"
        );
    }

    #[test]
    fn test_encode_rapid_fire_in_insertion_order() {
        let first = UnitAttributes::new(
            5.0,
            10.0,
            4000.0,
            [(UnitKind::new(1), 5), (UnitKind::new(0), 3)],
        )
        .unwrap();
        let second = UnitAttributes::new(0.01, 0.01, 1000.0, []).unwrap();
        let registry = UnitRegistry::from_attributes(vec![first, second]).unwrap();

        assert_eq!(
            encode_units(&registry),
            "2\n\n5.0 10.0 4000.0 2\n1 5\n0 3\n\n0.01 0.01 1000.0 0\n\n"
        );
    }

    #[test]
    fn test_encode_combatants_attackers_first() {
        let attacker = Combatant::new(
            10,
            11,
            12,
            [(UnitKind::new(5), 25000), (UnitKind::new(2), 7)],
        )
        .unwrap();
        let defender = Combatant::new(1, 2, 3, []).unwrap();

        assert_eq!(
            encode_combatants(&[attacker], &[defender]),
            "1 1\n\n10 11 12 2\n5 25000\n2 7\n\n1 2 3 0\n\n"
        );
    }

    #[test]
    fn test_encode_empty_sides() {
        assert_eq!(encode_combatants(&[], &[]), "0 0\n\n");
    }

    #[test]
    fn test_encode_request_checks_rosters() {
        let stray = Combatant::new(0, 0, 0, [(UnitKind::new(3), 1)]).unwrap();
        let err = encode_request(&single_kind_registry(), &[ten_units()], &[stray]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownUnitKind {
                side: Side::Defenders,
                index: 0,
                kind: UnitKind::new(3),
            }
        );
    }

    #[test]
    fn test_encode_is_deterministic() {
        let registry = single_kind_registry();
        let a = encode_request(&registry, &[ten_units()], &[ten_units()]).unwrap();
        let b = encode_request(&registry, &[ten_units()], &[ten_units()]).unwrap();
        assert_eq!(a, b);
    }
}
