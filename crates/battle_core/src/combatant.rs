//! Combatant model.
//!
//! A combatant is one fleet taking part in a battle request: three
//! technology levels plus a roster of unit counts per kind. Construction only
//! validates the values themselves; whether every roster kind exists is
//! checked by [`check_side`] against the registry a request is built for.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::registry::{insert_ordered, UnitKind, UnitRegistry};

/// Maximum number of combatants per side accepted by the wire format.
pub const MAX_COMBATANTS_PER_SIDE: usize = 255;

/// Which side of a battle a combatant fights on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The attacking fleets.
    Attackers,
    /// The defending fleets.
    Defenders,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attackers => write!(f, "attackers"),
            Self::Defenders => write!(f, "defenders"),
        }
    }
}

/// One fleet: technology levels and unit roster.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "CombatantSpec")]
pub struct Combatant {
    weapons_technology: u8,
    shielding_technology: u8,
    armor_technology: u8,
    /// Unit counts per kind, in insertion order.
    unit_groups: Vec<(UnitKind, u64)>,
}

impl Combatant {
    /// Create a validated combatant.
    ///
    /// Technology levels must lie in `0..=255` and unit counts must be
    /// non-negative. A kind listed twice keeps its first position and its
    /// last count.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range technology level or negative count.
    pub fn new(
        weapons_technology: i64,
        shielding_technology: i64,
        armor_technology: i64,
        unit_groups: impl IntoIterator<Item = (UnitKind, i64)>,
    ) -> Result<Self, ValidationError> {
        let weapons_technology = technology("weapons_technology", weapons_technology)?;
        let shielding_technology = technology("shielding_technology", shielding_technology)?;
        let armor_technology = technology("armor_technology", armor_technology)?;

        let mut groups: Vec<(UnitKind, u64)> = Vec::new();
        for (kind, count) in unit_groups {
            let count =
                u64::try_from(count).map_err(|_| ValidationError::NegativeUnitCount { kind, count })?;
            insert_ordered(&mut groups, kind, count);
        }

        Ok(Self {
            weapons_technology,
            shielding_technology,
            armor_technology,
            unit_groups: groups,
        })
    }

    /// Weapons technology level.
    #[must_use]
    pub fn weapons_technology(&self) -> u8 {
        self.weapons_technology
    }

    /// Shielding technology level.
    #[must_use]
    pub fn shielding_technology(&self) -> u8 {
        self.shielding_technology
    }

    /// Armor technology level.
    #[must_use]
    pub fn armor_technology(&self) -> u8 {
        self.armor_technology
    }

    /// Unit groups in the order they were supplied.
    #[must_use]
    pub fn unit_groups(&self) -> &[(UnitKind, u64)] {
        &self.unit_groups
    }

    /// Number of units of `kind` in the roster.
    #[must_use]
    pub fn unit_count(&self, kind: UnitKind) -> u64 {
        self.unit_groups
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(0, |(_, count)| *count)
    }

    /// Total number of units across all groups.
    #[must_use]
    pub fn total_units(&self) -> u64 {
        self.unit_groups
            .iter()
            .fold(0u64, |acc, (_, count)| acc.saturating_add(*count))
    }
}

fn technology(field: &'static str, value: i64) -> Result<u8, ValidationError> {
    u8::try_from(value).map_err(|_| ValidationError::TechnologyOutOfRange { field, value })
}

/// Unvalidated mirror of [`Combatant`] as written in data files.
#[derive(Debug, Clone, Deserialize)]
struct CombatantSpec {
    #[serde(default)]
    weapons_technology: i64,
    #[serde(default)]
    shielding_technology: i64,
    #[serde(default)]
    armor_technology: i64,
    unit_groups: Vec<(UnitKind, i64)>,
}

impl TryFrom<CombatantSpec> for Combatant {
    type Error = ValidationError;

    fn try_from(spec: CombatantSpec) -> Result<Self, Self::Error> {
        Self::new(
            spec.weapons_technology,
            spec.shielding_technology,
            spec.armor_technology,
            spec.unit_groups,
        )
    }
}

/// Check one side of a request against `registry`.
///
/// # Errors
///
/// Fails with [`ValidationError::TooManyCombatants`] when the side has more
/// than [`MAX_COMBATANTS_PER_SIDE`] entries, and with
/// [`ValidationError::UnknownUnitKind`] for the first roster entry whose kind
/// the registry does not define.
pub fn check_side(
    side: Side,
    combatants: &[Combatant],
    registry: &UnitRegistry,
) -> Result<(), ValidationError> {
    if combatants.len() > MAX_COMBATANTS_PER_SIDE {
        return Err(ValidationError::TooManyCombatants(side));
    }

    for (index, combatant) in combatants.iter().enumerate() {
        if let Some((kind, _)) = combatant
            .unit_groups
            .iter()
            .find(|(kind, _)| !registry.contains(*kind))
        {
            return Err(ValidationError::UnknownUnitKind {
                side,
                index,
                kind: *kind,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::UnitAttributes;

    fn registry(num_kinds: usize) -> UnitRegistry {
        let attrs = UnitAttributes::new(10.0, 10.0, 100.0, []).unwrap();
        UnitRegistry::from_attributes(vec![attrs; num_kinds]).unwrap()
    }

    fn fleet(kind: usize, count: i64) -> Combatant {
        Combatant::new(0, 0, 0, [(UnitKind::new(kind), count)]).unwrap()
    }

    #[test]
    fn test_technology_range() {
        assert!(Combatant::new(0, 0, 0, []).is_ok());
        assert!(Combatant::new(255, 255, 255, []).is_ok());

        let err = Combatant::new(256, 0, 0, []).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TechnologyOutOfRange {
                field: "weapons_technology",
                value: 256
            }
        );

        let err = Combatant::new(0, -1, 0, []).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TechnologyOutOfRange {
                field: "shielding_technology",
                ..
            }
        ));

        assert!(Combatant::new(0, 0, 300, []).is_err());
    }

    #[test]
    fn test_negative_count_rejected() {
        let err = Combatant::new(0, 0, 0, [(UnitKind::new(0), -5)]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NegativeUnitCount {
                kind: UnitKind::new(0),
                count: -5
            }
        );
    }

    #[test]
    fn test_unknown_kind_accepted_at_construction() {
        let combatant = fleet(42, 10);
        assert_eq!(combatant.unit_count(UnitKind::new(42)), 10);
    }

    #[test]
    fn test_unit_groups_keep_insertion_order() {
        let combatant = Combatant::new(
            1,
            2,
            3,
            [(UnitKind::new(3), 1), (UnitKind::new(1), 2), (UnitKind::new(3), 4)],
        )
        .unwrap();
        assert_eq!(
            combatant.unit_groups(),
            &[(UnitKind::new(3), 4), (UnitKind::new(1), 2)]
        );
        assert_eq!(combatant.total_units(), 6);
        assert_eq!(combatant.unit_count(UnitKind::new(0)), 0);
    }

    #[test]
    fn test_check_side_rejects_unknown_kind() {
        let registry = registry(2);
        let fleets = vec![fleet(1, 5), fleet(2, 5)];
        assert_eq!(
            check_side(Side::Defenders, &fleets, &registry),
            Err(ValidationError::UnknownUnitKind {
                side: Side::Defenders,
                index: 1,
                kind: UnitKind::new(2),
            })
        );
        assert!(check_side(Side::Attackers, &fleets[..1], &registry).is_ok());
    }

    #[test]
    fn test_check_side_limits_combatant_count() {
        let registry = registry(1);
        let fleets = vec![fleet(0, 1); MAX_COMBATANTS_PER_SIDE];
        assert!(check_side(Side::Attackers, &fleets, &registry).is_ok());

        let fleets = vec![fleet(0, 1); MAX_COMBATANTS_PER_SIDE + 1];
        let err = check_side(Side::Attackers, &fleets, &registry).unwrap_err();
        assert_eq!(err.to_string(), "too many attackers");
    }
}
