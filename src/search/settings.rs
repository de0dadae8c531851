use crate::Utility;
use serde::Deserialize;
use serde::Serialize;

/// Tunable knobs of one search invocation, all optional with crate-level
/// defaults. An iteration budget, when present, is authoritative and the
/// clock is ignored; otherwise the wall-clock budget governs, checked
/// between iterations so a single iteration can never be interrupted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub exploration: Utility,
    pub budget_ms: u64,
    pub iterations: Option<usize>,
    pub widening_constant: f64,
    pub widening_exponent: f64,
    pub capacity: usize,
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            exploration: crate::EXPLORATION,
            budget_ms: crate::SEARCH_BUDGET_MS,
            iterations: None,
            widening_constant: crate::WIDENING_CONSTANT,
            widening_exponent: crate::WIDENING_EXPONENT,
            capacity: crate::TRANSPOSITION_CAPACITY,
            seed: None,
        }
    }
}

impl Settings {
    pub fn budget_ms(mut self, ms: u64) -> Self {
        self.budget_ms = ms;
        self
    }
    pub fn iterations(mut self, n: usize) -> Self {
        self.iterations = Some(n);
        self
    }
    pub fn exploration(mut self, c: Utility) -> Self {
        self.exploration = c;
        self
    }
    pub fn widening(mut self, constant: f64, exponent: f64) -> Self {
        self.widening_constant = constant;
        self.widening_exponent = exponent;
        self
    }
    pub fn capacity(mut self, n: usize) -> Self {
        self.capacity = n;
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
