use crate::Chips;
use colored::Colorize;
use serde::Deserialize;
use serde::Serialize;

/// Where a seat stands in the current betting round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    Betting,
    Folding,
    Shoving,
}

/// One seat at the table.
///
/// `stake` is what the seat has committed in the current round and drives
/// call/raise arithmetic; `spent` is the whole-hand commitment and drives
/// terminal settlement. `acted` tracks whether the seat has spoken since
/// the last aggression, which is what closes a betting round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Seat {
    stack: Chips,
    stake: Chips,
    spent: Chips,
    state: State,
    acted: bool,
}

impl From<Chips> for Seat {
    fn from(stack: Chips) -> Self {
        Self {
            stack,
            stake: 0,
            spent: 0,
            state: State::Betting,
            acted: false,
        }
    }
}

impl Seat {
    pub fn stack(&self) -> Chips {
        self.stack
    }
    pub fn stake(&self) -> Chips {
        self.stake
    }
    pub fn spent(&self) -> Chips {
        self.spent
    }
    pub fn state(&self) -> State {
        self.state
    }
    pub fn has_acted(&self) -> bool {
        self.acted
    }

    /// Restore mid-round context for a seat reconstructed from caller data.
    pub fn committed(mut self, stake: Chips, spent: Chips) -> Self {
        self.stake = stake;
        self.spent = spent;
        self
    }

    pub fn bet(&mut self, chips: Chips) {
        assert!(chips <= self.stack, "seat cannot cover bet");
        self.stack -= chips;
        self.stake += chips;
        self.spent += chips;
        if self.stack == 0 {
            self.state = State::Shoving;
        }
    }
    pub fn fold(&mut self) {
        self.state = State::Folding;
    }
    pub fn speak(&mut self) {
        self.acted = true;
    }
    pub fn hush(&mut self) {
        self.acted = false;
    }
}

impl std::fmt::Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let state = match self.state {
            State::Betting => "B".normal(),
            State::Shoving => "S".magenta(),
            State::Folding => "F".red(),
        };
        write!(f, "{}{:<7}", state, self.stack)
    }
}
