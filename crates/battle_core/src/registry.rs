//! Unit attribute registry.
//!
//! The registry is the static table of per-kind combat attributes shared by
//! every battle request sent to one engine. Kinds are addressed by a dense
//! index: a registry of `N` kinds defines exactly the indices `0..N`, and
//! rapid fire tables may only target kinds inside that range.
//!
//! Both [`UnitAttributes`] and [`UnitRegistry`] are validated on construction
//! and immutable afterwards, so a registry can be shared freely between
//! concurrent engine invocations.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Index of a unit kind inside a [`UnitRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitKind(pub usize);

impl UnitKind {
    /// Create a new unit kind index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit kind #{}", self.0)
    }
}

impl From<usize> for UnitKind {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

/// Base combat attributes of one unit kind.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawUnitAttributes")]
pub struct UnitAttributes {
    weapons: f64,
    shield: f64,
    armor: f64,
    /// Rapid fire per target kind, in insertion order.
    rapid_fire: Vec<(UnitKind, u32)>,
}

impl UnitAttributes {
    /// Create validated unit attributes.
    ///
    /// Weapons, shield and armor must be strictly positive and every rapid
    /// fire count must fit in `0..=u32::MAX`. Target kinds are only checked
    /// against a registry in [`UnitRegistry::new`]. A target listed twice
    /// keeps its first position and its last count.
    ///
    /// # Errors
    ///
    /// Returns the first offending field.
    pub fn new(
        weapons: f64,
        shield: f64,
        armor: f64,
        rapid_fire: impl IntoIterator<Item = (UnitKind, i64)>,
    ) -> Result<Self, ValidationError> {
        check_positive("weapons", weapons)?;
        check_positive("shield", shield)?;
        check_positive("armor", armor)?;

        let mut table: Vec<(UnitKind, u32)> = Vec::new();
        for (target, count) in rapid_fire {
            let count = u32::try_from(count)
                .map_err(|_| ValidationError::RapidFireOutOfRange { target, count })?;
            insert_ordered(&mut table, target, count);
        }

        Ok(Self {
            weapons,
            shield,
            armor,
            rapid_fire: table,
        })
    }

    /// Build attributes from values known to be valid.
    pub(crate) fn from_trusted(
        weapons: f64,
        shield: f64,
        armor: f64,
        rapid_fire: &[(UnitKind, u32)],
    ) -> Self {
        Self {
            weapons,
            shield,
            armor,
            rapid_fire: rapid_fire.to_vec(),
        }
    }

    /// Base weapons strength.
    #[must_use]
    pub fn weapons(&self) -> f64 {
        self.weapons
    }

    /// Base shield strength.
    #[must_use]
    pub fn shield(&self) -> f64 {
        self.shield
    }

    /// Base armor (structural integrity).
    #[must_use]
    pub fn armor(&self) -> f64 {
        self.armor
    }

    /// Rapid fire entries in the order they were supplied.
    #[must_use]
    pub fn rapid_fire(&self) -> &[(UnitKind, u32)] {
        &self.rapid_fire
    }

    /// Rapid fire against a specific target, if any.
    #[must_use]
    pub fn rapid_fire_against(&self, target: UnitKind) -> Option<u32> {
        self.rapid_fire
            .iter()
            .find(|(kind, _)| *kind == target)
            .map(|(_, count)| *count)
    }
}

/// Unvalidated mirror of [`UnitAttributes`] as written in data files.
#[derive(Debug, Clone, Deserialize)]
struct RawUnitAttributes {
    weapons: f64,
    shield: f64,
    armor: f64,
    #[serde(default)]
    rapid_fire: Vec<(UnitKind, i64)>,
}

impl TryFrom<RawUnitAttributes> for UnitAttributes {
    type Error = ValidationError;

    fn try_from(raw: RawUnitAttributes) -> Result<Self, Self::Error> {
        Self::new(raw.weapons, raw.shield, raw.armor, raw.rapid_fire)
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NonPositiveAttribute { field, value })
    }
}

/// Insert or overwrite `key` while keeping first-insertion order.
pub(crate) fn insert_ordered<V>(entries: &mut Vec<(UnitKind, V)>, key: UnitKind, value: V) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(entry) => entry.1 = value,
        None => entries.push((key, value)),
    }
}

/// Validated, contiguous table of unit attributes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Vec<UnitAttributes>")]
pub struct UnitRegistry {
    attributes: Vec<UnitAttributes>,
}

impl UnitRegistry {
    /// Build a registry from attributes keyed by kind index.
    ///
    /// # Errors
    ///
    /// Fails if no entries are given, if any index in `0..N` is missing
    /// (`N` being the number of distinct keys), or if a rapid fire entry
    /// targets a kind `>= N`. Forward and self references are accepted.
    pub fn new(
        entries: impl IntoIterator<Item = (UnitKind, UnitAttributes)>,
    ) -> Result<Self, ValidationError> {
        let by_kind: BTreeMap<UnitKind, UnitAttributes> = entries.into_iter().collect();
        if by_kind.is_empty() {
            return Err(ValidationError::EmptyRegistry);
        }

        // Keys are sorted and distinct, so the first mismatch is the gap.
        if let Some(missing) = by_kind
            .keys()
            .enumerate()
            .find(|(i, kind)| kind.index() != *i)
            .map(|(i, _)| UnitKind::new(i))
        {
            return Err(ValidationError::MissingKind(missing));
        }

        Self::from_attributes(by_kind.into_values().collect())
    }

    /// Build a registry where `attributes[i]` describes kind `i`.
    ///
    /// # Errors
    ///
    /// Fails on an empty table or a rapid fire target outside it.
    pub fn from_attributes(attributes: Vec<UnitAttributes>) -> Result<Self, ValidationError> {
        if attributes.is_empty() {
            return Err(ValidationError::EmptyRegistry);
        }

        let num_kinds = attributes.len();
        for (i, attrs) in attributes.iter().enumerate() {
            if let Some((target, _)) = attrs
                .rapid_fire
                .iter()
                .find(|(target, _)| target.index() >= num_kinds)
            {
                return Err(ValidationError::UnknownRapidFireTarget {
                    kind: UnitKind::new(i),
                    target: *target,
                });
            }
        }

        Ok(Self { attributes })
    }

    /// Build a registry from a table known to be valid.
    pub(crate) fn from_trusted(attributes: Vec<UnitAttributes>) -> Self {
        Self { attributes }
    }

    /// Number of unit kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Check whether `kind` is defined.
    #[must_use]
    pub fn contains(&self, kind: UnitKind) -> bool {
        kind.index() < self.attributes.len()
    }

    /// Attributes of `kind`.
    #[must_use]
    pub fn get(&self, kind: UnitKind) -> Option<&UnitAttributes> {
        self.attributes.get(kind.index())
    }

    /// All kinds with their attributes, in index order.
    pub fn iter(&self) -> impl Iterator<Item = (UnitKind, &UnitAttributes)> {
        self.attributes
            .iter()
            .enumerate()
            .map(|(i, attrs)| (UnitKind::new(i), attrs))
    }
}

impl TryFrom<Vec<UnitAttributes>> for UnitRegistry {
    type Error = ValidationError;

    fn try_from(attributes: Vec<UnitAttributes>) -> Result<Self, Self::Error> {
        Self::from_attributes(attributes)
    }
}
