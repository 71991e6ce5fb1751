//! Property tests for the request encoder and response decoder.

use battle_core::prelude::*;
use battle_core::protocol::{decode_response, encode_request, ResponseShape};
use battle_test_utils::fixtures::simulation_output;
use battle_test_utils::grammar::{parse_request, ParsedCombatant};
use battle_test_utils::strategies::{arb_battle, arb_registry};
use proptest::prelude::*;

fn expected_combatant(combatant: &Combatant) -> ParsedCombatant {
    ParsedCombatant {
        weapons_technology: u64::from(combatant.weapons_technology()),
        shielding_technology: u64::from(combatant.shielding_technology()),
        armor_technology: u64::from(combatant.armor_technology()),
        unit_groups: combatant
            .unit_groups()
            .iter()
            .map(|(kind, count)| (kind.index(), *count))
            .collect(),
    }
}

proptest! {
    /// Parsing the encoded request recovers every registry value exactly.
    #[test]
    fn prop_request_describes_registry_and_fleets(
        (registry, attackers, defenders) in arb_battle(6, 4),
    ) {
        let stdin = encode_request(&registry, &attackers, &defenders).unwrap();
        let parsed = parse_request(&stdin).map_err(TestCaseError::fail)?;

        prop_assert_eq!(parsed.units.len(), registry.len());
        for ((_, attrs), unit) in registry.iter().zip(&parsed.units) {
            prop_assert_eq!(unit.weapons, attrs.weapons());
            prop_assert_eq!(unit.shield, attrs.shield());
            prop_assert_eq!(unit.armor, attrs.armor());
            let rapid_fire: Vec<(usize, u64)> = attrs
                .rapid_fire()
                .iter()
                .map(|(target, count)| (target.index(), u64::from(*count)))
                .collect();
            prop_assert_eq!(&unit.rapid_fire, &rapid_fire);
        }

        let expected: Vec<ParsedCombatant> = attackers.iter().map(expected_combatant).collect();
        prop_assert_eq!(parsed.attackers, expected);
        let expected: Vec<ParsedCombatant> = defenders.iter().map(expected_combatant).collect();
        prop_assert_eq!(parsed.defenders, expected);
    }

    /// Encoding the same input twice gives identical text.
    #[test]
    fn prop_encoding_is_deterministic((registry, attackers, defenders) in arb_battle(4, 3)) {
        let first = encode_request(&registry, &attackers, &defenders).unwrap();
        let second = encode_request(&registry, &attackers, &defenders).unwrap();
        prop_assert_eq!(first, second);
    }

    /// A roster kind outside the registry is rejected when the request is built.
    #[test]
    fn prop_unknown_roster_kind_rejected(registry in arb_registry(5), extra in 0usize..10) {
        let stray_kind = UnitKind::new(registry.len() + extra);
        let stray = Combatant::new(0, 0, 0, [(stray_kind, 1)]).unwrap();

        let err = encode_request(&registry, &[], &[stray]).unwrap_err();
        prop_assert_eq!(
            err,
            ValidationError::UnknownUnitKind {
                side: Side::Defenders,
                index: 0,
                kind: stray_kind,
            }
        );
    }

    /// A registry with a gap in its indices is never built.
    #[test]
    fn prop_missing_index_rejected(len in 2usize..8, hole in 0usize..7) {
        let hole = hole % len;
        let attrs = UnitAttributes::new(1.0, 1.0, 1.0, []).unwrap();
        let entries = (0..len)
            .filter(|i| *i != hole)
            .map(|i| (UnitKind::new(i), attrs.clone()));

        let result = UnitRegistry::new(entries);
        if hole == len - 1 {
            // Dropping the last index just leaves a smaller, contiguous table.
            prop_assert_eq!(result.unwrap().len(), len - 1);
        } else {
            prop_assert_eq!(result.unwrap_err(), ValidationError::MissingKind(UnitKind::new(hole)));
        }
    }

    /// Decoding splits the stream per simulation, combatant, round and kind.
    #[test]
    fn prop_decode_places_every_field(
        num_kinds in 1usize..4,
        num_attackers in 0usize..3,
        num_defenders in 0usize..3,
        rounds in proptest::collection::vec(0usize..4, 1..4),
    ) {
        let shape = ResponseShape::new(num_kinds, num_attackers, num_defenders);
        let tag = |sim: usize, combatant: usize, round: usize, kind: usize| {
            (sim * 1_000_000 + combatant * 10_000 + round * 100 + kind) as u64
        };
        let output: String = rounds
            .iter()
            .enumerate()
            .map(|(sim, &num_rounds)| {
                simulation_output(shape, num_rounds, move |combatant, round, kind| {
                    UnitGroupStats::from_fields([tag(sim, combatant, round, kind); 7])
                })
            })
            .collect();

        let outcomes = decode_response(&output, shape, rounds.len()).unwrap();
        prop_assert_eq!(outcomes.len(), rounds.len());
        for (sim, outcome) in outcomes.iter().enumerate() {
            prop_assert_eq!(outcome.num_rounds, rounds[sim]);
            prop_assert_eq!(outcome.attackers.len(), num_attackers);
            prop_assert_eq!(outcome.defenders.len(), num_defenders);
            for (combatant, side) in outcome.attackers.iter().chain(&outcome.defenders).enumerate() {
                prop_assert_eq!(side.num_rounds(), rounds[sim]);
                for (round, groups) in side.rounds().iter().enumerate() {
                    prop_assert_eq!(groups.len(), num_kinds);
                    for (kind, group) in groups.iter().enumerate() {
                        prop_assert_eq!(group.times_fired, tag(sim, combatant, round, kind));
                        prop_assert_eq!(group.num_remaining_units, tag(sim, combatant, round, kind));
                    }
                }
            }
        }
    }
}
