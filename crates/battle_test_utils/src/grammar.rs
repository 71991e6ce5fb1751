//! Reader for the engine's stdin grammar.
//!
//! Parses request text the way the engine would, so tests can check what an
//! encoded request actually says instead of comparing strings.

use std::iter::Enumerate;
use std::str::SplitWhitespace;

/// One unit kind as read back from a request.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedUnit {
    /// Weapons value.
    pub weapons: f64,
    /// Shield value.
    pub shield: f64,
    /// Armor value.
    pub armor: f64,
    /// `(target kind, count)` pairs in wire order.
    pub rapid_fire: Vec<(usize, u64)>,
}

/// One combatant as read back from a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCombatant {
    /// Weapons technology level.
    pub weapons_technology: u64,
    /// Shielding technology level.
    pub shielding_technology: u64,
    /// Armor technology level.
    pub armor_technology: u64,
    /// `(kind, count)` pairs in wire order.
    pub unit_groups: Vec<(usize, u64)>,
}

/// A whole request.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRequest {
    /// Unit kinds, indexed by kind.
    pub units: Vec<ParsedUnit>,
    /// Attacking combatants.
    pub attackers: Vec<ParsedCombatant>,
    /// Defending combatants.
    pub defenders: Vec<ParsedCombatant>,
}

/// Parse request text.
///
/// # Errors
///
/// Returns a description of the first token that does not fit the grammar,
/// including floats written in scientific notation.
pub fn parse_request(text: &str) -> Result<ParsedRequest, String> {
    let mut tokens = Tokens(text.split_whitespace().enumerate());

    let num_kinds = tokens.int("number of kinds")?;
    let mut units = Vec::new();
    for _ in 0..num_kinds {
        let weapons = tokens.decimal("weapons")?;
        let shield = tokens.decimal("shield")?;
        let armor = tokens.decimal("armor")?;
        let rapid_fire = tokens.pairs("rapid fire")?;
        units.push(ParsedUnit {
            weapons,
            shield,
            armor,
            rapid_fire,
        });
    }

    let num_attackers = tokens.int("number of attackers")?;
    let num_defenders = tokens.int("number of defenders")?;
    let mut combatants = Vec::new();
    for _ in 0..num_attackers + num_defenders {
        combatants.push(ParsedCombatant {
            weapons_technology: tokens.int("weapons technology")?,
            shielding_technology: tokens.int("shielding technology")?,
            armor_technology: tokens.int("armor technology")?,
            unit_groups: tokens.pairs("unit group")?,
        });
    }

    if let Some((position, token)) = tokens.0.next() {
        return Err(format!("unexpected token {token:?} at {position}"));
    }

    let num_attackers = usize::try_from(num_attackers).map_err(|e| e.to_string())?;
    let defenders = combatants.split_off(num_attackers);
    Ok(ParsedRequest {
        units,
        attackers: combatants,
        defenders,
    })
}

struct Tokens<'a>(Enumerate<SplitWhitespace<'a>>);

impl<'a> Tokens<'a> {
    fn next(&mut self, what: &str) -> Result<(usize, &'a str), String> {
        self.0.next().ok_or_else(|| format!("missing {what}"))
    }

    fn int(&mut self, what: &str) -> Result<u64, String> {
        let (position, token) = self.next(what)?;
        token
            .parse()
            .map_err(|_| format!("{what} at {position} is not an integer: {token:?}"))
    }

    fn decimal(&mut self, what: &str) -> Result<f64, String> {
        let (position, token) = self.next(what)?;
        if token.contains(['e', 'E']) {
            return Err(format!("{what} at {position} uses an exponent: {token:?}"));
        }
        token
            .parse()
            .map_err(|_| format!("{what} at {position} is not a number: {token:?}"))
    }

    fn pairs(&mut self, what: &str) -> Result<Vec<(usize, u64)>, String> {
        let count = self.int(what)?;
        (0..count)
            .map(|_| {
                let kind = usize::try_from(self.int(what)?).map_err(|e| e.to_string())?;
                Ok((kind, self.int(what)?))
            })
            .collect()
    }
}
