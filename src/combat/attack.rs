//! d20 attack rolls
//!
//! - Normal, advantage and disadvantage d20 rolls
//! - Hit/miss resolution against a threshold

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::rng::RandomSource;

/// Sides on the attack die
pub const D20_SIDES: u32 = 20;

/// How the d20 is rolled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RollMode {
    /// Single roll
    #[default]
    Normal,
    /// Two independent rolls, keep the higher
    Advantage,
    /// Two independent rolls, keep the lower
    Disadvantage,
}

impl FromStr for RollMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" | "none" => Ok(RollMode::Normal),
            "advantage" | "adv" => Ok(RollMode::Advantage),
            "disadvantage" | "dis" => Ok(RollMode::Disadvantage),
            other => Err(format!(
                "Unknown roll mode '{}' (expected normal, advantage or disadvantage)",
                other
            )),
        }
    }
}

impl fmt::Display for RollMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RollMode::Normal => "normal",
            RollMode::Advantage => "advantage",
            RollMode::Disadvantage => "disadvantage",
        };
        write!(f, "{}", s)
    }
}

/// Whether an attack landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackOutcome {
    Hit,
    Miss,
}

impl AttackOutcome {
    pub fn is_hit(&self) -> bool {
        *self == AttackOutcome::Hit
    }
}

/// Roll a d20 in the given mode
pub fn roll_d20(mode: RollMode, rng: &mut impl RandomSource) -> u32 {
    match mode {
        RollMode::Normal => rng.next_int(1, D20_SIDES),
        RollMode::Advantage => {
            let first = rng.next_int(1, D20_SIDES);
            let second = rng.next_int(1, D20_SIDES);
            first.max(second)
        }
        RollMode::Disadvantage => {
            let first = rng.next_int(1, D20_SIDES);
            let second = rng.next_int(1, D20_SIDES);
            first.min(second)
        }
    }
}

/// Hit iff `roll + modifier >= threshold`
pub fn resolve_attack(roll: u32, modifier: i32, threshold: i32) -> AttackOutcome {
    if i64::from(roll) + i64::from(modifier) >= i64::from(threshold) {
        AttackOutcome::Hit
    } else {
        AttackOutcome::Miss
    }
}

/// Check if a d20 roll is a natural 20
pub fn is_critical(roll: u32) -> bool {
    roll == D20_SIDES
}

/// Check if a d20 roll is a natural 1
pub fn is_fumble(roll: u32) -> bool {
    roll == 1
}

/// Result of an attack roll
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttackRoll {
    /// Mode the d20 was rolled in
    pub mode: RollMode,
    /// The kept d20 value
    pub roll: u32,
    /// Attack modifier
    pub modifier: i32,
    /// roll + modifier
    pub total: i64,
    /// Value the total had to meet
    pub threshold: i32,
    pub outcome: AttackOutcome,
    /// Natural 20 (informational, does not change the outcome)
    pub natural_20: bool,
    /// Natural 1 (informational, does not change the outcome)
    pub natural_1: bool,
}

impl AttackRoll {
    /// Build a result from an already-rolled d20 value
    pub fn new(mode: RollMode, roll: u32, modifier: i32, threshold: i32) -> Self {
        Self {
            mode,
            roll,
            modifier,
            total: i64::from(roll) + i64::from(modifier),
            threshold,
            outcome: resolve_attack(roll, modifier, threshold),
            natural_20: is_critical(roll),
            natural_1: is_fumble(roll),
        }
    }

    pub fn is_hit(&self) -> bool {
        self.outcome.is_hit()
    }
}

/// Roll a d20 and resolve it against the threshold
pub fn roll_attack(
    mode: RollMode,
    modifier: i32,
    threshold: i32,
    rng: &mut impl RandomSource,
) -> AttackRoll {
    let roll = roll_d20(mode, rng);
    AttackRoll::new(mode, roll, modifier, threshold)
}
