//! Scenario loading and configuration.
//!
//! A scenario names the unit table, the attacking and defending fleets and
//! how to reach the engine binary. Scenarios are RON files; see
//! `scenarios/og_example.ron` for a complete one.

use std::path::{Path, PathBuf};
use std::time::Duration;

use battle_core::combatant::Combatant;
use battle_core::error::ValidationError;
use battle_core::og::{self, OgUnit};
use battle_core::registry::{UnitAttributes, UnitKind, UnitRegistry};
use battle_core::runner::ProcessEngine;
use serde::Deserialize;
use thiserror::Error;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The unit table is not a valid registry.
    #[error("Invalid unit table: {0}")]
    InvalidUnits(#[from] ValidationError),
}

/// Default location of the engine binary.
pub const DEFAULT_ENGINE_PATH: &str = "./build/BattleEngine";

/// One row of a custom unit table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UnitEntry {
    /// Display name.
    pub name: String,
    /// Base weapons.
    pub weapons: f64,
    /// Base shield.
    pub shield: f64,
    /// Base armor.
    pub armor: f64,
    /// `(target kind, shots)` pairs.
    #[serde(default)]
    pub rapid_fire: Vec<(UnitKind, i64)>,
}

/// Where the unit table comes from.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub enum UnitSource {
    /// The built-in OGame table.
    #[default]
    Og,
    /// An explicit table; entry `i` describes kind `i`.
    Custom(Vec<UnitEntry>),
}

impl UnitSource {
    /// Build the registry for this table.
    pub fn registry(&self) -> Result<UnitRegistry, ValidationError> {
        match self {
            Self::Og => Ok(og::registry().clone()),
            Self::Custom(entries) => {
                let attributes = entries
                    .iter()
                    .map(|entry| {
                        UnitAttributes::new(
                            entry.weapons,
                            entry.shield,
                            entry.armor,
                            entry.rapid_fire.iter().copied(),
                        )
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                UnitRegistry::from_attributes(attributes)
            }
        }
    }

    /// Display names, indexed by kind.
    #[must_use]
    pub fn names(&self) -> UnitNames {
        match self {
            Self::Og => UnitNames(OgUnit::ALL.iter().map(|u| u.name().to_string()).collect()),
            Self::Custom(entries) => UnitNames(entries.iter().map(|e| e.name.clone()).collect()),
        }
    }
}

/// Display names of a unit table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitNames(Vec<String>);

impl UnitNames {
    /// Names for kinds `0..names.len()`.
    #[must_use]
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    /// Name of `kind`, falling back to its index.
    #[must_use]
    pub fn name(&self, kind: UnitKind) -> String {
        self.0
            .get(kind.index())
            .cloned()
            .unwrap_or_else(|| kind.to_string())
    }
}

/// How to run the engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Engine executable.
    #[serde(default = "default_engine_path")]
    pub path: PathBuf,
    /// Kill the engine after this many seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_engine_path() -> PathBuf {
    PathBuf::from(DEFAULT_ENGINE_PATH)
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: default_engine_path(),
            timeout_secs: None,
        }
    }
}

impl EngineConfig {
    /// Build the process runner.
    #[must_use]
    pub fn process_engine(&self) -> ProcessEngine {
        let engine = ProcessEngine::new(&self.path);
        match self.timeout_secs {
            Some(secs) => engine.with_timeout(Duration::from_secs(secs)),
            None => engine,
        }
    }
}

/// A complete battle setup.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Unit table.
    #[serde(default)]
    pub units: UnitSource,
    /// Attacking fleets.
    pub attackers: Vec<Combatant>,
    /// Defending fleets.
    pub defenders: Vec<Combatant>,
    /// Engine settings.
    #[serde(default)]
    pub engine: EngineConfig,
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// Registry described by [`units`](Self::units).
    pub fn registry(&self) -> Result<UnitRegistry, ScenarioError> {
        Ok(self.units.registry()?)
    }

    /// The large OGame fleet battle: battleships and fighters against
    /// death stars, all at technology level 10.
    pub fn og_example() -> Result<Self, ScenarioError> {
        let attackers = og_fleets(
            10,
            &[
                &[(OgUnit::Battleship, 25_000)],
                &[
                    (OgUnit::LightFighter, 25_000),
                    (OgUnit::HeavyFighter, 25_000),
                    (OgUnit::Cruiser, 25_000),
                ],
            ],
        )?;
        let defenders = og_fleets(10, &[&[(OgUnit::DeathStar, 250)]])?;

        Ok(Self {
            name: "OGame example".to_string(),
            description: "Two attacking fleets against a death star wall".to_string(),
            units: UnitSource::Og,
            attackers,
            defenders,
            engine: EngineConfig::default(),
        })
    }
}

/// One combatant per entry of `fleets`, all at technology `level`.
fn og_fleets(level: i64, fleets: &[&[(OgUnit, i64)]]) -> Result<Vec<Combatant>, ValidationError> {
    fleets
        .iter()
        .map(|groups| {
            Combatant::new(level, level, level, groups.iter().map(|(u, n)| (u.kind(), *n)))
        })
        .collect()
}
