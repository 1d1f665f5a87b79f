//! Combat resolution
//!
//! Implements the tabletop combat rolls:
//! - Damage dice expressions (e.g., "1d8 + 2", "1d6 + 2d8")
//! - d20 attack rolls with advantage/disadvantage
//! - Hit/miss resolution against a threshold
//!
//! Every roll draws from a caller-supplied [`RandomSource`].

mod attack;
mod dice;
mod rng;

pub use attack::{
    is_critical, is_fumble, resolve_attack, roll_attack, roll_d20, AttackOutcome, AttackRoll,
    RollMode, D20_SIDES,
};
pub use dice::{roll_damage, DiceError, DiceExpression, DiceTerm, MAX_DICE_COUNT};
pub use rng::{FixedRolls, RandomSource};
