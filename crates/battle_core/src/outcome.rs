//! Decoded battle results.
//!
//! Results form a tree: one [`BattleOutcome`] per simulation, holding one
//! [`CombatantOutcome`] per combatant (index-aligned with the request), each
//! holding one row of [`UnitGroupStats`] per round, indexed by unit kind.

use serde::{Deserialize, Serialize};

use crate::registry::UnitKind;

/// Number of integers the engine reports per unit group and round.
pub const STATS_FIELDS: usize = 7;

/// Statistics of all units of one kind owned by one combatant, after a round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitGroupStats {
    /// Shots fired by the group.
    pub times_fired: u64,
    /// Shots the group received.
    pub times_was_shot: u64,
    /// Damage dealt to enemy shields.
    pub shield_damage_dealt: u64,
    /// Damage dealt to enemy hulls.
    pub hull_damage_dealt: u64,
    /// Damage absorbed by the group's shields.
    pub shield_damage_taken: u64,
    /// Damage taken by the group's hulls.
    pub hull_damage_taken: u64,
    /// Units still alive at the end of the round.
    pub num_remaining_units: u64,
}

impl UnitGroupStats {
    /// Build stats from the engine's field order.
    #[must_use]
    pub const fn from_fields(fields: [u64; STATS_FIELDS]) -> Self {
        Self {
            times_fired: fields[0],
            times_was_shot: fields[1],
            shield_damage_dealt: fields[2],
            hull_damage_dealt: fields[3],
            shield_damage_taken: fields[4],
            hull_damage_taken: fields[5],
            num_remaining_units: fields[6],
        }
    }

    /// Fields in the engine's order.
    #[must_use]
    pub const fn to_fields(&self) -> [u64; STATS_FIELDS] {
        [
            self.times_fired,
            self.times_was_shot,
            self.shield_damage_dealt,
            self.hull_damage_dealt,
            self.shield_damage_taken,
            self.hull_damage_taken,
            self.num_remaining_units,
        ]
    }
}

/// Per-round statistics of one combatant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantOutcome {
    rounds: Vec<Vec<UnitGroupStats>>,
}

impl CombatantOutcome {
    /// Wrap decoded rounds; each row is indexed by unit kind.
    #[must_use]
    pub fn new(rounds: Vec<Vec<UnitGroupStats>>) -> Self {
        Self { rounds }
    }

    /// Number of rounds reported.
    #[must_use]
    pub fn num_rounds(&self) -> usize {
        self.rounds.len()
    }

    /// All rounds in order.
    #[must_use]
    pub fn rounds(&self) -> &[Vec<UnitGroupStats>] {
        &self.rounds
    }

    /// Stats of every kind after round `round_no` (zero-based).
    #[must_use]
    pub fn round(&self, round_no: usize) -> Option<&[UnitGroupStats]> {
        self.rounds.get(round_no).map(Vec::as_slice)
    }

    /// Stats after the last round, if any round was fought.
    #[must_use]
    pub fn final_round(&self) -> Option<&[UnitGroupStats]> {
        self.rounds.last().map(Vec::as_slice)
    }

    /// Units of `kind` left after the last round.
    #[must_use]
    pub fn remaining_units(&self, kind: UnitKind) -> u64 {
        self.final_round()
            .and_then(|round| round.get(kind.index()))
            .map_or(0, |stats| stats.num_remaining_units)
    }

    /// Units of every kind left after the last round.
    #[must_use]
    pub fn total_remaining_units(&self) -> u64 {
        self.final_round().map_or(0, |round| {
            round
                .iter()
                .fold(0u64, |acc, s| acc.saturating_add(s.num_remaining_units))
        })
    }
}

/// Who is left standing after a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    /// Every defender was destroyed.
    Attackers,
    /// Every attacker was destroyed.
    Defenders,
    /// Both sides survived, or both were wiped out.
    Draw,
}

/// Result of one simulation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleOutcome {
    /// Rounds fought.
    pub num_rounds: usize,
    /// Outcomes of the attackers, in request order.
    pub attackers: Vec<CombatantOutcome>,
    /// Outcomes of the defenders, in request order.
    pub defenders: Vec<CombatantOutcome>,
}

impl BattleOutcome {
    /// Decide the winner from the final round.
    #[must_use]
    pub fn winner(&self) -> Winner {
        let survivors =
            |side: &[CombatantOutcome]| side.iter().any(|c| c.total_remaining_units() > 0);

        match (survivors(&self.attackers), survivors(&self.defenders)) {
            (true, false) => Winner::Attackers,
            (false, true) => Winner::Defenders,
            _ => Winner::Draw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remaining(n: u64) -> UnitGroupStats {
        UnitGroupStats {
            num_remaining_units: n,
            ..Default::default()
        }
    }

    #[test]
    fn test_fields_order() {
        let stats = UnitGroupStats::from_fields([1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(stats.times_fired, 1);
        assert_eq!(stats.times_was_shot, 2);
        assert_eq!(stats.shield_damage_dealt, 3);
        assert_eq!(stats.hull_damage_dealt, 4);
        assert_eq!(stats.shield_damage_taken, 5);
        assert_eq!(stats.hull_damage_taken, 6);
        assert_eq!(stats.num_remaining_units, 7);
        assert_eq!(stats.to_fields(), [1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_round_accessors() {
        let outcome = CombatantOutcome::new(vec![
            vec![remaining(10), remaining(4)],
            vec![remaining(6), remaining(0)],
        ]);
        assert_eq!(outcome.num_rounds(), 2);
        assert_eq!(outcome.round(0).unwrap()[1].num_remaining_units, 4);
        assert!(outcome.round(2).is_none());
        assert_eq!(outcome.remaining_units(UnitKind::new(0)), 6);
        assert_eq!(outcome.remaining_units(UnitKind::new(5)), 0);
        assert_eq!(outcome.total_remaining_units(), 6);
    }

    #[test]
    fn test_no_rounds() {
        let outcome = CombatantOutcome::default();
        assert!(outcome.final_round().is_none());
        assert_eq!(outcome.total_remaining_units(), 0);
    }

    #[test]
    fn test_winner() {
        let alive = CombatantOutcome::new(vec![vec![remaining(3)]]);
        let dead = CombatantOutcome::new(vec![vec![remaining(0)]]);

        let outcome = BattleOutcome {
            num_rounds: 1,
            attackers: vec![alive.clone()],
            defenders: vec![dead.clone()],
        };
        assert_eq!(outcome.winner(), Winner::Attackers);

        let outcome = BattleOutcome {
            num_rounds: 1,
            attackers: vec![dead.clone(), dead.clone()],
            defenders: vec![alive.clone()],
        };
        assert_eq!(outcome.winner(), Winner::Defenders);

        let outcome = BattleOutcome {
            num_rounds: 1,
            attackers: vec![alive.clone()],
            defenders: vec![alive],
        };
        assert_eq!(outcome.winner(), Winner::Draw);
    }
}
