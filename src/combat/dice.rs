//! Damage dice expressions
//!
//! Parses and rolls notation like "2d6", "1d8 + 2", "1d6 + 2d8".
//!
//! Grammar:
//! ```text
//! expr := term ('+' term)*
//! term := INT 'd' INT | INT
//! ```
//! Whitespace around `+` and `d` is ignored. Dice counts and die sizes must
//! be at least 1; flat modifiers are non-negative and always added.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::warn;

use super::rng::RandomSource;

/// Largest number of dice one expression may roll, across all terms
pub const MAX_DICE_COUNT: u32 = 1000;

/// Dice term: count, 'd', sides
static DICE_TERM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*[dD]\s*(\d+)$").unwrap());

/// Flat modifier term: bare digits
static FLAT_TERM_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());

/// Errors from parsing a dice expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("dice expression is empty")]
    Empty,

    #[error("empty term in dice expression (stray '+')")]
    EmptyTerm,

    #[error("invalid term '{0}' (expected XdY or a whole number)")]
    InvalidTerm(String),

    #[error("dice count must be at least 1 in '{0}'")]
    ZeroCount(String),

    #[error("die sides must be at least 1 in '{0}'")]
    ZeroSides(String),

    #[error("too many dice in '{term}' (max {max})", max = MAX_DICE_COUNT)]
    TooManyDice { term: String },
}

/// One term of a dice expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiceTerm {
    /// Roll `count` dice with `sides` faces each
    Dice { count: u32, sides: u32 },
    /// Flat amount added to the total
    Flat(u32),
}

impl DiceTerm {
    fn min(&self) -> u64 {
        match *self {
            DiceTerm::Dice { count, .. } => u64::from(count),
            DiceTerm::Flat(n) => u64::from(n),
        }
    }

    fn max(&self) -> u64 {
        match *self {
            DiceTerm::Dice { count, sides } => u64::from(count) * u64::from(sides),
            DiceTerm::Flat(n) => u64::from(n),
        }
    }
}

impl fmt::Display for DiceTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiceTerm::Dice { count, sides } => write!(f, "{}d{}", count, sides),
            DiceTerm::Flat(n) => write!(f, "{}", n),
        }
    }
}

/// A parsed damage expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceExpression {
    terms: Vec<DiceTerm>,
}

impl DiceExpression {
    /// Parse an expression like "1d8 + 2"
    pub fn parse(notation: &str) -> Result<Self, DiceError> {
        let notation = notation.trim();
        if notation.is_empty() {
            return Err(DiceError::Empty);
        }

        let terms = notation
            .split('+')
            .map(parse_term)
            .collect::<Result<Vec<_>, _>>()?;

        let dice: u64 = terms
            .iter()
            .map(|term| match *term {
                DiceTerm::Dice { count, .. } => u64::from(count),
                DiceTerm::Flat(_) => 0,
            })
            .sum();
        if dice > u64::from(MAX_DICE_COUNT) {
            return Err(DiceError::TooManyDice {
                term: notation.to_string(),
            });
        }

        Ok(Self { terms })
    }

    pub fn terms(&self) -> &[DiceTerm] {
        &self.terms
    }

    /// Roll every term and return the total
    pub fn roll(&self, rng: &mut impl RandomSource) -> u64 {
        self.roll_detailed(rng).1
    }

    /// Roll and return individual die results plus total
    pub fn roll_detailed(&self, rng: &mut impl RandomSource) -> (Vec<u32>, u64) {
        let mut results = Vec::new();
        let mut total: u64 = 0;

        for term in &self.terms {
            match *term {
                DiceTerm::Dice { count, sides } => {
                    for _ in 0..count {
                        let roll = rng.next_int(1, sides);
                        results.push(roll);
                        total += u64::from(roll);
                    }
                }
                DiceTerm::Flat(n) => total += u64::from(n),
            }
        }

        (results, total)
    }

    /// Get the minimum possible result
    pub fn min(&self) -> u64 {
        self.terms.iter().map(DiceTerm::min).sum()
    }

    /// Get the maximum possible result
    pub fn max(&self) -> u64 {
        self.terms.iter().map(DiceTerm::max).sum()
    }

    /// Get the expected average
    pub fn average(&self) -> f64 {
        self.terms
            .iter()
            .map(|term| match *term {
                DiceTerm::Dice { count, sides } => f64::from(count) * (1.0 + f64::from(sides)) / 2.0,
                DiceTerm::Flat(n) => f64::from(n),
            })
            .sum()
    }
}

impl FromStr for DiceExpression {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DiceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{}", term)?;
        }
        Ok(())
    }
}

fn parse_term(raw: &str) -> Result<DiceTerm, DiceError> {
    let term = raw.trim();
    if term.is_empty() {
        return Err(DiceError::EmptyTerm);
    }

    if let Some(caps) = DICE_TERM_REGEX.captures(term) {
        let count: u32 = caps[1]
            .parse()
            .map_err(|_| DiceError::InvalidTerm(term.to_string()))?;
        let sides: u32 = caps[2]
            .parse()
            .map_err(|_| DiceError::InvalidTerm(term.to_string()))?;

        if count == 0 {
            return Err(DiceError::ZeroCount(term.to_string()));
        }
        if sides == 0 {
            return Err(DiceError::ZeroSides(term.to_string()));
        }
        if count > MAX_DICE_COUNT {
            return Err(DiceError::TooManyDice {
                term: term.to_string(),
            });
        }
        return Ok(DiceTerm::Dice { count, sides });
    }

    if FLAT_TERM_REGEX.is_match(term) {
        let n = term
            .parse()
            .map_err(|_| DiceError::InvalidTerm(term.to_string()))?;
        return Ok(DiceTerm::Flat(n));
    }

    Err(DiceError::InvalidTerm(term.to_string()))
}

/// Roll a stored damage expression.
///
/// Stored expressions were validated when the weapon was created, but a
/// malformed one still rolls 0 instead of failing.
pub fn roll_damage(notation: &str, rng: &mut impl RandomSource) -> u64 {
    match DiceExpression::parse(notation) {
        Ok(expr) => expr.roll(rng),
        Err(e) => {
            warn!("Cannot roll damage '{}': {}", notation, e);
            0
        }
    }
}
