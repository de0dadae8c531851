//! Monte Carlo tree search and ICM decision engine for no-limit hold'em.
//!
//! Given a single decision point (pot, stacks, board, betting history), the
//! [`search::Optimizer`] runs a time- or iteration-bounded UCT search and
//! returns per-action chip expected values. When a tournament payout
//! structure is supplied, the [`icm`] module re-expresses those chip
//! outcomes in dollar equity and may overturn the chip-EV-optimal line
//! where ICM pressure dominates.
//!
//! This crate is a library, not a service: state extraction, transport,
//! and persistence are the caller's business.

pub mod game;
pub mod icm;
pub mod search;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Stack sizes and bet amounts in tournament chips.
pub type Chips = i32;
/// Seat index around the table.
pub type Position = usize;
/// Expected values and payoffs in chips.
pub type Utility = f32;
/// Finish probabilities and sampling weights.
pub type Probability = f64;
/// Dollar amounts: prizes, equities, premiums.
pub type Equity = f64;

// ============================================================================
// SEARCH PARAMETERS
// ============================================================================
/// UCT exploration constant (√2).
pub const EXPLORATION: Utility = std::f32::consts::SQRT_2;
/// Progressive widening coefficient: eligible children = ⌊k · visits^α⌋.
pub const WIDENING_CONSTANT: f64 = 1.5;
/// Progressive widening exponent α.
pub const WIDENING_EXPONENT: f64 = 0.5;
/// Wall-clock budget per decision when the caller does not specify one.
pub const SEARCH_BUDGET_MS: u64 = 500;
/// Bound on the transposition table before LRU eviction kicks in.
pub const TRANSPOSITION_CAPACITY: usize = 100_000;
/// Stacks are rounded to this unit when deriving transposition keys.
pub const KEY_GRAIN: Chips = 1;

// ============================================================================
// ICM PARAMETERS
// ============================================================================
/// Tolerance on probability row/column sums before renormalization.
pub const TOLERANCE: Probability = 1e-6;
/// Lower clamp on the bubble factor.
pub const BUBBLE_FACTOR_MIN: f64 = 0.5;
/// Upper clamp on the bubble factor.
pub const BUBBLE_FACTOR_MAX: f64 = 2.0;
/// Chip swing used to probe marginal equity, as a fraction of the average stack.
pub const BUBBLE_PROBE: f64 = 0.05;
/// Rank-over-rank decay when generating payout structures.
pub const PAYOUT_DECAY: f64 = 0.5;
