//! Battle reports.
//!
//! Plain-text reports mirror the classic simulator output: the fleets going
//! in, the survivors after every round, and for repeated simulations the
//! spread of final-round survivors per unit kind. [`Summary`] is also what
//! the `--json` flag serializes.

use std::io::{self, Write};

use battle_core::combatant::{Combatant, Side};
use battle_core::outcome::{BattleOutcome, CombatantOutcome, Winner};
use battle_core::registry::UnitKind;
use serde::{Deserialize, Serialize};

use crate::scenario::UnitNames;

/// Mean, population standard deviation and range of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation.
    pub stdev: f64,
    /// Smallest value.
    pub min: u64,
    /// Largest value.
    pub max: u64,
}

impl SampleStats {
    /// Describe `samples`, or `None` if there are none.
    #[must_use]
    pub fn from_samples(samples: &[u64]) -> Option<Self> {
        let (&first, rest) = samples.split_first()?;
        let n = samples.len() as f64;
        let mean = samples.iter().map(|&s| s as f64).sum::<f64>() / n;
        let variance = samples
            .iter()
            .map(|&s| {
                let d = s as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;
        let (min, max) = rest
            .iter()
            .fold((first, first), |(lo, hi), &s| (lo.min(s), hi.max(s)));

        Some(Self {
            mean,
            stdev: variance.sqrt(),
            min,
            max,
        })
    }
}

/// Final-round survivors of one unit kind across simulations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindSummary {
    /// Unit kind.
    pub kind: UnitKind,
    /// Remaining units after the last round.
    pub remaining: SampleStats,
}

/// Survivors of one combatant, per kind in its roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantSummary {
    /// One entry per roster kind, in roster order.
    pub kinds: Vec<KindSummary>,
}

/// How often each side won.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinCounts {
    /// Simulations won by the attackers.
    pub attackers: u32,
    /// Simulations won by the defenders.
    pub defenders: u32,
    /// Simulations without a winner.
    pub draws: u32,
}

impl WinCounts {
    fn record(&mut self, winner: Winner) {
        match winner {
            Winner::Attackers => self.attackers += 1,
            Winner::Defenders => self.defenders += 1,
            Winner::Draw => self.draws += 1,
        }
    }
}

/// Aggregate of repeated simulations of one battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Simulations aggregated.
    pub num_simulations: usize,
    /// Mean number of rounds fought.
    pub mean_rounds: f64,
    /// Winner tally.
    pub wins: WinCounts,
    /// One entry per attacker.
    pub attackers: Vec<CombatantSummary>,
    /// One entry per defender.
    pub defenders: Vec<CombatantSummary>,
}

impl Summary {
    /// Summarize `outcomes` of a battle between `attackers` and `defenders`.
    ///
    /// Returns `None` when there are no outcomes.
    #[must_use]
    pub fn from_outcomes(
        attackers: &[Combatant],
        defenders: &[Combatant],
        outcomes: &[BattleOutcome],
    ) -> Option<Self> {
        if outcomes.is_empty() {
            return None;
        }

        let mut wins = WinCounts::default();
        for outcome in outcomes {
            wins.record(outcome.winner());
        }
        let total_rounds: usize = outcomes.iter().map(|o| o.num_rounds).sum();

        Some(Self {
            num_simulations: outcomes.len(),
            mean_rounds: total_rounds as f64 / outcomes.len() as f64,
            wins,
            attackers: summarize_side(Side::Attackers, attackers, outcomes),
            defenders: summarize_side(Side::Defenders, defenders, outcomes),
        })
    }
}

fn side_outcomes(outcome: &BattleOutcome, side: Side) -> &[CombatantOutcome] {
    match side {
        Side::Attackers => &outcome.attackers,
        Side::Defenders => &outcome.defenders,
    }
}

fn summarize_side(
    side: Side,
    combatants: &[Combatant],
    outcomes: &[BattleOutcome],
) -> Vec<CombatantSummary> {
    combatants
        .iter()
        .enumerate()
        .map(|(index, combatant)| {
            let kinds = combatant
                .unit_groups()
                .iter()
                .filter_map(|&(kind, initial)| {
                    let samples: Vec<u64> = outcomes
                        .iter()
                        .map(|o| final_remaining(side_outcomes(o, side).get(index), kind, initial))
                        .collect();
                    SampleStats::from_samples(&samples)
                        .map(|remaining| KindSummary { kind, remaining })
                })
                .collect();
            CombatantSummary { kinds }
        })
        .collect()
}

/// Survivors of `kind`; a battle without rounds leaves the fleet untouched.
fn final_remaining(outcome: Option<&CombatantOutcome>, kind: UnitKind, initial: u64) -> u64 {
    match outcome.and_then(CombatantOutcome::final_round) {
        Some(round) => round.get(kind.index()).map_or(0, |s| s.num_remaining_units),
        None => initial,
    }
}

fn label(side: Side) -> &'static str {
    match side {
        Side::Attackers => "Attacker",
        Side::Defenders => "Defender",
    }
}

/// Print the fleets of one side as they enter the battle.
pub fn write_combatants(
    out: &mut impl Write,
    side: Side,
    combatants: &[Combatant],
    names: &UnitNames,
) -> io::Result<()> {
    for (i, combatant) in combatants.iter().enumerate() {
        writeln!(out, "{} #{i}", label(side))?;
        writeln!(
            out,
            "\tWeapons {}% Shield {}% Armor {}%",
            u32::from(combatant.weapons_technology()) * 10,
            u32::from(combatant.shielding_technology()) * 10,
            u32::from(combatant.armor_technology()) * 10
        )?;
        for (kind, count) in combatant.unit_groups() {
            writeln!(out, "\t{count} {}", names.name(*kind))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Print the survivors of every combatant after every round.
pub fn write_rounds(
    out: &mut impl Write,
    outcome: &BattleOutcome,
    names: &UnitNames,
) -> io::Result<()> {
    for round_no in 0..outcome.num_rounds {
        writeln!(out, "After {}. round:", round_no + 1)?;
        writeln!(out)?;
        for side in [Side::Attackers, Side::Defenders] {
            for (i, combatant) in side_outcomes(outcome, side).iter().enumerate() {
                writeln!(out, "{} #{i}", label(side))?;
                write_survivors(out, combatant, round_no, names)?;
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

fn write_survivors(
    out: &mut impl Write,
    outcome: &CombatantOutcome,
    round_no: usize,
    names: &UnitNames,
) -> io::Result<()> {
    let mut any = false;
    for (kind, stats) in outcome.round(round_no).unwrap_or_default().iter().enumerate() {
        if stats.num_remaining_units > 0 {
            any = true;
            writeln!(
                out,
                "\t{} {}",
                stats.num_remaining_units,
                names.name(UnitKind::new(kind))
            )?;
        }
    }
    if !any {
        writeln!(out, "\tDestroyed!")?;
    }
    Ok(())
}

/// Print a [`Summary`].
pub fn write_summary(out: &mut impl Write, summary: &Summary, names: &UnitNames) -> io::Result<()> {
    writeln!(out, "Num rounds: {}", summary.mean_rounds)?;
    writeln!(
        out,
        "Attackers won {}, defenders won {}, draws {} (of {})",
        summary.wins.attackers, summary.wins.defenders, summary.wins.draws, summary.num_simulations
    )?;
    writeln!(out)?;

    for (side, combatants) in [
        (Side::Attackers, &summary.attackers),
        (Side::Defenders, &summary.defenders),
    ] {
        for (i, combatant) in combatants.iter().enumerate() {
            writeln!(out, "{} #{i}", label(side))?;
            for entry in &combatant.kinds {
                writeln!(out, "\t{}:", names.name(entry.kind))?;
                writeln!(out, "\t\tMean:  {}", entry.remaining.mean)?;
                writeln!(out, "\t\tStdev: {}", entry.remaining.stdev)?;
                writeln!(out, "\t\tMin:   {}", entry.remaining.min)?;
                writeln!(out, "\t\tMax:   {}", entry.remaining.max)?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}
