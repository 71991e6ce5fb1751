//! Proptest strategies for registries, combatants and whole battles.
//!
//! Everything generated here is valid by construction, so properties can
//! focus on what happens after validation.

use battle_core::combatant::Combatant;
use battle_core::registry::{UnitAttributes, UnitKind, UnitRegistry};
use proptest::prelude::*;

/// Positive finite attribute values across many magnitudes.
pub fn arb_attribute_value() -> impl Strategy<Value = f64> {
    prop_oneof![
        Just(1.0),
        0.000_000_1f64..1.0,
        1.0f64..1_000_000_000_000.0,
    ]
}

/// Attributes whose rapid fire targets lie in `0..num_kinds`.
pub fn arb_attributes(num_kinds: usize) -> impl Strategy<Value = UnitAttributes> {
    (
        arb_attribute_value(),
        arb_attribute_value(),
        arb_attribute_value(),
        proptest::collection::vec((0..num_kinds, 0i64..=2000), 0..4),
    )
        .prop_map(|(weapons, shield, armor, rapid_fire)| {
            let rapid_fire = rapid_fire
                .into_iter()
                .map(|(target, count)| (UnitKind::new(target), count));
            UnitAttributes::new(weapons, shield, armor, rapid_fire)
                .expect("generated attributes are valid")
        })
}

/// Registry of `1..=max_kinds` kinds.
pub fn arb_registry(max_kinds: usize) -> impl Strategy<Value = UnitRegistry> {
    (1..=max_kinds)
        .prop_flat_map(|n| proptest::collection::vec(arb_attributes(n), n))
        .prop_map(|attributes| {
            UnitRegistry::from_attributes(attributes).expect("generated registry is valid")
        })
}

/// Combatant whose roster only uses kinds in `0..num_kinds`.
pub fn arb_combatant(num_kinds: usize) -> impl Strategy<Value = Combatant> {
    (
        0i64..=255,
        0i64..=255,
        0i64..=255,
        proptest::collection::vec((0..num_kinds, 0i64..1_000_000), 0..5),
    )
        .prop_map(|(weapons, shielding, armor, groups)| {
            let groups = groups
                .into_iter()
                .map(|(kind, count)| (UnitKind::new(kind), count));
            Combatant::new(weapons, shielding, armor, groups).expect("generated combatant is valid")
        })
}

/// A registry plus attackers and defenders that fit it.
pub fn arb_battle(
    max_kinds: usize,
    max_combatants: usize,
) -> impl Strategy<Value = (UnitRegistry, Vec<Combatant>, Vec<Combatant>)> {
    arb_registry(max_kinds).prop_flat_map(move |registry| {
        let n = registry.len();
        (
            Just(registry),
            proptest::collection::vec(arb_combatant(n), 0..=max_combatants),
            proptest::collection::vec(arb_combatant(n), 0..=max_combatants),
        )
    })
}
