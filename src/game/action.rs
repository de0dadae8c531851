use crate::Chips;
use colored::Colorize;
use serde::Deserialize;
use serde::Serialize;

/// One betting decision at a single street.
///
/// Blinds and card reveals never appear here: by the time a spot reaches
/// the optimizer, forced bets are already in the pot and the board is
/// fixed for the duration of the decision.
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Action {
    Fold,
    Check,
    Call(Chips),
    Raise(Chips),
    Shove(Chips),
}

impl Action {
    /// Chips this action moves into the pot.
    pub fn chips(&self) -> Chips {
        match self {
            Action::Fold | Action::Check => 0,
            Action::Call(x) | Action::Raise(x) | Action::Shove(x) => *x,
        }
    }
    pub fn is_aggro(&self) -> bool {
        matches!(self, Action::Raise(_) | Action::Shove(_))
    }
    pub fn is_raise(&self) -> bool {
        matches!(self, Action::Raise(_))
    }
    pub fn is_shove(&self) -> bool {
        matches!(self, Action::Shove(_))
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Action::Check => write!(f, "{}", "CHECK".cyan()),
            Action::Fold => write!(f, "{}", "FOLD".red()),
            Action::Call(amount) => write!(f, "{}", format!("CALL  {}", amount).yellow()),
            Action::Raise(amount) => write!(f, "{}", format!("RAISE {}", amount).green()),
            Action::Shove(amount) => write!(f, "{}", format!("SHOVE {}", amount).magenta()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chips_moved() {
        assert!(Action::Fold.chips() == 0);
        assert!(Action::Check.chips() == 0);
        assert!(Action::Call(40).chips() == 40);
        assert!(Action::Raise(120).chips() == 120);
        assert!(Action::Shove(1738).chips() == 1738);
    }
}
