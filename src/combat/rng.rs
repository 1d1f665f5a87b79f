//! Random number sources for dice rolls

use rand::Rng;

/// Uniform integer source used by every roll.
///
/// Any `rand::Rng` works; tests supply [`FixedRolls`] instead.
pub trait RandomSource {
    /// Uniform integer in `low..=high`
    fn next_int(&mut self, low: u32, high: u32) -> u32;
}

impl<R: Rng> RandomSource for R {
    fn next_int(&mut self, low: u32, high: u32) -> u32 {
        if low >= high {
            return low;
        }
        self.random_range(low..=high)
    }
}

/// Scripted source that replays a fixed sequence.
///
/// The sequence repeats once exhausted, and each value is clamped into the
/// requested range. An empty sequence always yields `low`.
#[derive(Debug, Clone, Default)]
pub struct FixedRolls {
    values: Vec<u32>,
    cursor: usize,
}

impl FixedRolls {
    pub fn new(values: impl Into<Vec<u32>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// Number of values drawn so far
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for FixedRolls {
    fn next_int(&mut self, low: u32, high: u32) -> u32 {
        if self.values.is_empty() || low >= high {
            return low;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(low, high)
    }
}
