//! Built-in OGame unit table.
//!
//! The standard 22 ships and defenses with their base weapons, shield, armor
//! and rapid fire. Indices are stable: `OgUnit::SmallCargo` is kind 0 and
//! `OgUnit::LargeShieldDome` is kind 21.

use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::registry::{UnitAttributes, UnitKind, UnitRegistry};

/// Standard OGame units, in registry order.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OgUnit {
    SmallCargo,
    LargeCargo,
    LightFighter,
    HeavyFighter,
    Cruiser,
    Battleship,
    ColonyShip,
    Recycler,
    EspionageProbe,
    Bomber,
    SolarSatellite,
    Destroyer,
    DeathStar,
    Battlecruiser,
    RocketLauncher,
    LightLaser,
    HeavyLaser,
    GaussCannon,
    IonCannon,
    PlasmaTurret,
    SmallShieldDome,
    LargeShieldDome,
}

impl OgUnit {
    /// Every unit, in registry order.
    pub const ALL: [Self; 22] = [
        Self::SmallCargo,
        Self::LargeCargo,
        Self::LightFighter,
        Self::HeavyFighter,
        Self::Cruiser,
        Self::Battleship,
        Self::ColonyShip,
        Self::Recycler,
        Self::EspionageProbe,
        Self::Bomber,
        Self::SolarSatellite,
        Self::Destroyer,
        Self::DeathStar,
        Self::Battlecruiser,
        Self::RocketLauncher,
        Self::LightLaser,
        Self::HeavyLaser,
        Self::GaussCannon,
        Self::IonCannon,
        Self::PlasmaTurret,
        Self::SmallShieldDome,
        Self::LargeShieldDome,
    ];

    /// Registry index of this unit.
    #[must_use]
    pub const fn kind(self) -> UnitKind {
        UnitKind::new(self as usize)
    }

    /// Unit for a registry index.
    #[must_use]
    pub fn from_kind(kind: UnitKind) -> Option<Self> {
        Self::ALL.get(kind.index()).copied()
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SmallCargo => "Small Cargo",
            Self::LargeCargo => "Large Cargo",
            Self::LightFighter => "Light Fighter",
            Self::HeavyFighter => "Heavy Fighter",
            Self::Cruiser => "Cruiser",
            Self::Battleship => "Battleship",
            Self::ColonyShip => "Colony Ship",
            Self::Recycler => "Recycler",
            Self::EspionageProbe => "Espionage Probe",
            Self::Bomber => "Bomber",
            Self::SolarSatellite => "Solar Satellite",
            Self::Destroyer => "Destroyer",
            Self::DeathStar => "Death Star",
            Self::Battlecruiser => "Battlecruiser",
            Self::RocketLauncher => "Rocket Launcher",
            Self::LightLaser => "Light Laser",
            Self::HeavyLaser => "Heavy Laser",
            Self::GaussCannon => "Gauss Cannon",
            Self::IonCannon => "Ion Cannon",
            Self::PlasmaTurret => "Plasma Turret",
            Self::SmallShieldDome => "Small Shield Dome",
            Self::LargeShieldDome => "Large Shield Dome",
        }
    }

    /// Whether this is a stationary defense rather than a ship.
    #[must_use]
    pub const fn is_defense(self) -> bool {
        (self as usize) >= (Self::RocketLauncher as usize)
    }
}

impl fmt::Display for OgUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the built-in table.
struct OgStats {
    weapons: f64,
    shield: f64,
    armor: f64,
    rapid_fire: &'static [(OgUnit, u32)],
}

const fn stats(
    weapons: f64,
    shield: f64,
    armor: f64,
    rapid_fire: &'static [(OgUnit, u32)],
) -> OgStats {
    OgStats {
        weapons,
        shield,
        armor,
        rapid_fire,
    }
}

use self::OgUnit as U;

/// Every ship fires five times at probes and satellites.
const CIVIL_RF: &[(OgUnit, u32)] = &[(U::EspionageProbe, 5), (U::SolarSatellite, 5)];

/// Base stats, indexed like [`OgUnit::ALL`].
const OG_STATS: [OgStats; 22] = [
    stats(5.0, 10.0, 4000.0, CIVIL_RF),
    stats(5.0, 25.0, 12000.0, CIVIL_RF),
    stats(50.0, 10.0, 4000.0, CIVIL_RF),
    stats(
        150.0,
        25.0,
        10000.0,
        &[(U::SmallCargo, 3), (U::EspionageProbe, 5), (U::SolarSatellite, 5)],
    ),
    stats(
        400.0,
        50.0,
        27000.0,
        &[
            (U::LightFighter, 6),
            (U::EspionageProbe, 5),
            (U::SolarSatellite, 5),
            (U::RocketLauncher, 10),
        ],
    ),
    stats(1000.0, 200.0, 60000.0, CIVIL_RF),
    stats(50.0, 100.0, 30000.0, CIVIL_RF),
    stats(1.0, 10.0, 16000.0, CIVIL_RF),
    stats(0.01, 0.01, 1000.0, &[]),
    stats(
        1000.0,
        500.0,
        75000.0,
        &[
            (U::EspionageProbe, 5),
            (U::SolarSatellite, 5),
            (U::RocketLauncher, 20),
            (U::LightLaser, 20),
            (U::HeavyLaser, 10),
            (U::GaussCannon, 5),
            (U::IonCannon, 10),
            (U::PlasmaTurret, 5),
        ],
    ),
    stats(1.0, 1.0, 2000.0, &[]),
    stats(
        2000.0,
        500.0,
        110000.0,
        &[
            (U::EspionageProbe, 5),
            (U::SolarSatellite, 5),
            (U::Battlecruiser, 2),
            (U::LightLaser, 10),
        ],
    ),
    stats(
        200000.0,
        50000.0,
        9000000.0,
        &[
            (U::SmallCargo, 250),
            (U::LargeCargo, 250),
            (U::LightFighter, 200),
            (U::HeavyFighter, 100),
            (U::Cruiser, 33),
            (U::Battleship, 30),
            (U::ColonyShip, 250),
            (U::Recycler, 250),
            (U::EspionageProbe, 1250),
            (U::Bomber, 25),
            (U::SolarSatellite, 1250),
            (U::Destroyer, 5),
            (U::Battlecruiser, 15),
            (U::RocketLauncher, 200),
            (U::LightLaser, 200),
            (U::HeavyLaser, 100),
            (U::GaussCannon, 50),
            (U::IonCannon, 100),
        ],
    ),
    stats(
        700.0,
        400.0,
        70000.0,
        &[
            (U::SmallCargo, 3),
            (U::LargeCargo, 3),
            (U::HeavyFighter, 4),
            (U::Cruiser, 4),
            (U::Battleship, 7),
            (U::EspionageProbe, 5),
            (U::SolarSatellite, 5),
        ],
    ),
    stats(80.0, 10.0, 2000.0, &[]),
    stats(100.0, 25.0, 2000.0, &[]),
    stats(250.0, 100.0, 8000.0, &[]),
    stats(1100.0, 200.0, 35000.0, &[]),
    stats(150.0, 500.0, 8000.0, &[]),
    stats(3000.0, 300.0, 100000.0, &[]),
    stats(1.0, 2000.0, 20000.0, &[]),
    stats(1.0, 10000.0, 100000.0, &[]),
];

/// Attributes of one built-in unit.
#[must_use]
pub fn attributes(unit: OgUnit) -> UnitAttributes {
    let row = &OG_STATS[unit as usize];
    let rapid_fire: Vec<(UnitKind, u32)> = row
        .rapid_fire
        .iter()
        .map(|(target, count)| (target.kind(), *count))
        .collect();
    UnitAttributes::from_trusted(row.weapons, row.shield, row.armor, &rapid_fire)
}

/// The built-in registry, built once per process.
pub fn registry() -> &'static UnitRegistry {
    static REGISTRY: OnceLock<UnitRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| UnitRegistry::from_trusted(OgUnit::ALL.map(attributes).to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_passes_validation() {
        let checked = UnitRegistry::new(
            OgUnit::ALL
                .iter()
                .map(|unit| {
                    let attrs = attributes(*unit);
                    let rapid_fire: Vec<(UnitKind, i64)> = attrs
                        .rapid_fire()
                        .iter()
                        .map(|(kind, count)| (*kind, i64::from(*count)))
                        .collect();
                    let rebuilt = UnitAttributes::new(
                        attrs.weapons(),
                        attrs.shield(),
                        attrs.armor(),
                        rapid_fire,
                    )
                    .unwrap();
                    (unit.kind(), rebuilt)
                }),
        )
        .unwrap();
        assert_eq!(&checked, registry());
    }

    #[test]
    fn test_indices_are_stable() {
        for (i, unit) in OgUnit::ALL.iter().enumerate() {
            assert_eq!(unit.kind().index(), i);
            assert_eq!(OgUnit::from_kind(UnitKind::new(i)), Some(*unit));
        }
        assert_eq!(OgUnit::from_kind(UnitKind::new(22)), None);
        assert_eq!(registry().len(), 22);
    }

    #[test]
    fn test_death_star_stats() {
        let attrs = registry().get(OgUnit::DeathStar.kind()).unwrap();
        assert_eq!(attrs.weapons(), 200000.0);
        assert_eq!(attrs.armor(), 9000000.0);
        assert_eq!(attrs.rapid_fire_against(OgUnit::EspionageProbe.kind()), Some(1250));
        assert_eq!(attrs.rapid_fire_against(OgUnit::PlasmaTurret.kind()), None);
    }

    #[test]
    fn test_defense_split() {
        assert!(!OgUnit::Battlecruiser.is_defense());
        assert!(OgUnit::RocketLauncher.is_defense());
        assert!(OgUnit::LargeShieldDome.is_defense());
        assert_eq!(OgUnit::GaussCannon.to_string(), "Gauss Cannon");
    }
}
