//! Response decoder.
//!
//! The engine's stdout has no framing: apart from the round count leading
//! each simulation, every boundary is implied by the request. Decoding is a
//! cursor over the token stream that takes exactly the number of tokens the
//! request shape predicts and fails on any mismatch, without recovery.

use crate::error::DecodeError;
use crate::outcome::{BattleOutcome, CombatantOutcome, UnitGroupStats, STATS_FIELDS};

/// Request dimensions needed to split the engine output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseShape {
    /// Number of kinds in the registry.
    pub num_kinds: usize,
    /// Number of attacking combatants.
    pub num_attackers: usize,
    /// Number of defending combatants.
    pub num_defenders: usize,
}

impl ResponseShape {
    /// Create a shape.
    #[must_use]
    pub const fn new(num_kinds: usize, num_attackers: usize, num_defenders: usize) -> Self {
        Self {
            num_kinds,
            num_attackers,
            num_defenders,
        }
    }

    /// Total combatants on both sides.
    #[must_use]
    pub const fn num_combatants(&self) -> usize {
        self.num_attackers + self.num_defenders
    }

    /// Tokens following the round count of one simulation, or `None` on overflow.
    #[must_use]
    pub fn payload_len(&self, num_rounds: usize) -> Option<usize> {
        num_rounds
            .checked_mul(self.num_kinds)?
            .checked_mul(STATS_FIELDS)?
            .checked_mul(self.num_combatants())
    }
}

/// Decode `num_simulations` consecutive simulations from `output`.
///
/// # Errors
///
/// Fails on any token that is not a non-negative integer, when the stream
/// is shorter than the shape requires, or when tokens are left over.
pub fn decode_response(
    output: &str,
    shape: ResponseShape,
    num_simulations: usize,
) -> Result<Vec<BattleOutcome>, DecodeError> {
    let tokens = tokenize(output)?;
    let mut cursor = TokenCursor::new(&tokens);

    let mut simulations = Vec::with_capacity(num_simulations);
    for simulation in 0..num_simulations {
        simulations.push(decode_simulation(&mut cursor, shape, simulation)?);
    }

    match cursor.remaining() {
        0 => Ok(simulations),
        extra => Err(DecodeError::TrailingTokens(extra)),
    }
}

fn tokenize(output: &str) -> Result<Vec<u64>, DecodeError> {
    output
        .split_whitespace()
        .enumerate()
        .map(|(position, token)| {
            token.parse::<u64>().map_err(|_| DecodeError::InvalidToken {
                position,
                token: token.to_string(),
            })
        })
        .collect()
}

fn decode_simulation(
    cursor: &mut TokenCursor<'_>,
    shape: ResponseShape,
    simulation: usize,
) -> Result<BattleOutcome, DecodeError> {
    let raw_rounds = cursor.take(1, simulation)?[0];
    let overflow = DecodeError::RoundCountOverflow {
        simulation,
        num_rounds: raw_rounds,
    };
    let num_rounds = usize::try_from(raw_rounds).map_err(|_| overflow.clone())?;
    let budget = shape.payload_len(num_rounds).ok_or(overflow)?;

    // Check the whole budget up front so a short stream fails before any
    // allocation sized by an untrusted round count.
    let payload = cursor.take(budget, simulation)?;

    let per_combatant = budget / shape.num_combatants().max(1);
    let mut outcomes: Vec<CombatantOutcome> = Vec::with_capacity(shape.num_combatants());
    if per_combatant > 0 {
        for chunk in payload.chunks_exact(per_combatant) {
            outcomes.push(decode_combatant(chunk, shape.num_kinds));
        }
    } else {
        // Zero rounds: every combatant is present with an empty history.
        outcomes.resize_with(shape.num_combatants(), CombatantOutcome::default);
    }

    let defenders = outcomes.split_off(shape.num_attackers);
    Ok(BattleOutcome {
        num_rounds,
        attackers: outcomes,
        defenders,
    })
}

fn decode_combatant(data: &[u64], num_kinds: usize) -> CombatantOutcome {
    let rounds = data
        .chunks_exact(num_kinds * STATS_FIELDS)
        .map(|round| {
            round
                .chunks_exact(STATS_FIELDS)
                .map(|fields| {
                    let mut group = [0u64; STATS_FIELDS];
                    group.copy_from_slice(fields);
                    UnitGroupStats::from_fields(group)
                })
                .collect()
        })
        .collect();
    CombatantOutcome::new(rounds)
}

/// Forward-only reader over the token stream.
struct TokenCursor<'a> {
    tokens: &'a [u64],
    position: usize,
}

impl<'a> TokenCursor<'a> {
    fn new(tokens: &'a [u64]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    fn remaining(&self) -> usize {
        self.tokens.len() - self.position
    }

    fn take(&mut self, count: usize, simulation: usize) -> Result<&'a [u64], DecodeError> {
        let available = self.remaining();
        if count > available {
            return Err(DecodeError::Truncated {
                simulation,
                expected: count,
                available,
            });
        }
        let slice = &self.tokens[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }
}
