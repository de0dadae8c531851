use super::action::Action;
use super::card::Card;
use super::seat::Seat;
use super::seat::State;
use crate::Chips;
use crate::Position;
use serde::Deserialize;
use serde::Serialize;

/// Pot fractions offered as raise sizes, numerator over denominator.
const RAISES: [(Chips, Chips); 6] = [(1, 3), (1, 2), (2, 3), (1, 1), (3, 2), (2, 1)];

/// Whose move it is, if anyone's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Choice(Position),
    Terminal,
}

/// A single decision point: the memoryless state of one betting round.
///
/// Constructed once per invocation from caller-supplied data, then only
/// ever cloned-and-advanced via [`Spot::apply`]. Its immutable methods
/// are pure functions of the rules; no spot is ever shared mutably
/// between tree nodes.
///
/// Chip conservation holds throughout: `pot + Σ stacks` is constant from
/// construction until a terminal settlement pays the pot back out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Spot {
    pot: Chips,
    seats: Vec<Seat>,
    board: Vec<Card>,
    actor: Position,
    history: Vec<(Position, Action)>,
}

impl Spot {
    pub fn new(stacks: &[Chips], pot: Chips) -> Self {
        Self {
            pot,
            seats: stacks.iter().copied().map(Seat::from).collect(),
            board: Vec::new(),
            actor: 0,
            history: Vec::new(),
        }
    }
    pub fn with_board(mut self, board: Vec<Card>) -> Self {
        self.board = board;
        self
    }
    pub fn with_actor(mut self, actor: Position) -> Self {
        self.actor = actor;
        self
    }
    /// Restore per-seat current-round commitments, e.g. blinds or earlier
    /// calls the extraction layer observed before invoking the engine.
    pub fn with_stakes(mut self, stakes: &[Chips]) -> Self {
        assert!(stakes.len() == self.seats.len());
        for (seat, stake) in self.seats.iter_mut().zip(stakes.iter()) {
            *seat = seat.committed(*stake, *stake);
        }
        self
    }

    /// Reject structurally invalid caller input before any search begins.
    pub fn validated(self) -> anyhow::Result<Self> {
        anyhow::ensure!(self.seats.len() >= 2, "fewer than two seats");
        anyhow::ensure!(self.board.len() <= 5, "more than five board cards");
        anyhow::ensure!(self.actor < self.seats.len(), "actor out of range");
        anyhow::ensure!(self.pot >= 0, "negative pot");
        anyhow::ensure!(
            self.seats.iter().all(|s| s.stack() >= 0),
            "negative stack"
        );
        anyhow::ensure!(
            self.seats.iter().map(Seat::stake).sum::<Chips>() <= self.pot,
            "stakes exceed pot"
        );
        anyhow::ensure!(
            self.seat(self.actor).state() == State::Betting,
            "actor cannot act"
        );
        Ok(self)
    }

    //
    pub fn pot(&self) -> Chips {
        self.pot
    }
    pub fn board(&self) -> &[Card] {
        &self.board
    }
    pub fn actor(&self) -> Position {
        self.actor
    }
    pub fn n(&self) -> usize {
        self.seats.len()
    }
    pub fn seat(&self, position: Position) -> &Seat {
        self.seats.get(position).expect("position in bounds")
    }
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }
    pub fn history(&self) -> &[(Position, Action)] {
        &self.history
    }
    /// Chips on the table. Constant across applications of any action.
    pub fn total(&self) -> Chips {
        self.pot + self.seats.iter().map(Seat::stack).sum::<Chips>()
    }

    //
    pub fn turn(&self) -> Turn {
        if self.is_everyone_folding() || self.is_settled() {
            Turn::Terminal
        } else {
            Turn::Choice(self.actor)
        }
    }
    pub fn is_terminal(&self) -> bool {
        self.turn() == Turn::Terminal
    }

    pub fn legal(&self) -> Vec<Action> {
        let mut options = Vec::new();
        if self.is_terminal() {
            return options;
        }
        if self.may_check() {
            options.push(Action::Check);
        }
        if self.may_call() {
            options.push(Action::Call(self.to_call()));
        }
        if self.may_fold() {
            options.push(Action::Fold);
        }
        if self.may_raise() {
            for raise in self.raises() {
                options.push(Action::Raise(raise));
            }
        }
        if self.may_shove() {
            options.push(Action::Shove(self.to_shove()));
        }
        assert!(!options.is_empty());
        options
    }

    pub fn is_allowed(&self, action: &Action) -> bool {
        if self.is_terminal() {
            return false;
        }
        match action {
            Action::Raise(raise) => {
                self.may_raise()
                    && *raise >= self.to_raise()
                    && *raise < self.to_shove()
            }
            _ => self.legal().contains(action),
        }
    }

    /// Derive the child spot reached by taking an action here.
    pub fn apply(&self, action: Action) -> Self {
        let mut child = self.clone();
        child.act(action);
        child
    }

    //
    fn act(&mut self, action: Action) {
        assert!(self.is_allowed(&action), "illegal action {:?}", action);
        self.history.push((self.actor, action));
        match action {
            Action::Check => {
                self.actor_mut().speak();
            }
            Action::Fold => {
                self.actor_mut().fold();
            }
            Action::Call(chips) => {
                self.pot += chips;
                self.actor_mut().bet(chips);
                self.actor_mut().speak();
            }
            Action::Raise(chips) | Action::Shove(chips) => {
                let reopened = self.actor_ref().stake() + chips > self.effective_stake();
                self.pot += chips;
                self.actor_mut().bet(chips);
                self.actor_mut().speak();
                if reopened {
                    self.reopen();
                }
            }
        }
        self.next_player();
    }
    /// An aggression reopens the action: everyone still betting must speak again.
    fn reopen(&mut self) {
        let actor = self.actor;
        for (position, seat) in self.seats.iter_mut().enumerate() {
            if position != actor && seat.state() == State::Betting {
                seat.hush();
            }
        }
    }
    fn next_player(&mut self) {
        if self.is_everyone_folding() || self.is_settled() {
            return;
        }
        loop {
            self.actor = (self.actor + 1) % self.seats.len();
            if self.actor_ref().state() == State::Betting {
                break;
            }
        }
    }

    /// there is exactly one player left holding cards
    fn is_everyone_folding(&self) -> bool {
        self.seats
            .iter()
            .filter(|s| s.state() != State::Folding)
            .count()
            == 1
    }
    /// everyone still betting has spoken and matched the effective stake
    fn is_settled(&self) -> bool {
        self.seats
            .iter()
            .filter(|s| s.state() == State::Betting)
            .all(|s| s.has_acted() && s.stake() == self.effective_stake())
    }
    fn effective_stake(&self) -> Chips {
        self.seats
            .iter()
            .filter(|s| s.state() != State::Folding)
            .map(Seat::stake)
            .max()
            .expect("non-empty seats")
    }

    //
    fn may_fold(&self) -> bool {
        self.to_call() > 0
    }
    fn may_check(&self) -> bool {
        self.to_call() == 0
    }
    fn may_call(&self) -> bool {
        self.to_call() > 0 && self.to_call() < self.to_shove()
    }
    fn may_raise(&self) -> bool {
        self.to_raise() < self.to_shove()
    }
    fn may_shove(&self) -> bool {
        self.to_shove() > 0
    }

    //
    pub fn to_call(&self) -> Chips {
        self.effective_stake() - self.actor_ref().stake()
    }
    pub fn to_shove(&self) -> Chips {
        self.actor_ref().stack()
    }
    /// Minimum chips to add for a legal raise: cover the call plus the
    /// largest prior raise increment, with a one-chip floor.
    pub fn to_raise(&self) -> Chips {
        let (most, next) = self
            .seats
            .iter()
            .filter(|s| s.state() != State::Folding)
            .map(Seat::stake)
            .fold((0, 0), |(most, next), stake| {
                if stake > most {
                    (stake, most)
                } else if stake > next {
                    (most, stake)
                } else {
                    (most, next)
                }
            });
        let relative = most - self.actor_ref().stake();
        let marginal = std::cmp::max(most - next, 1);
        relative + marginal
    }
    /// Discretized raise sizes as pot fractions, clamped to the legal
    /// window. High-branching by design; progressive widening decides how
    /// many of these the search actually opens.
    pub fn raises(&self) -> Vec<Chips> {
        let min = self.to_raise();
        let max = self.to_shove();
        if min >= max {
            return vec![];
        }
        let mut sizes = RAISES
            .iter()
            .map(|(num, den)| self.pot * num / den)
            .map(|bet| bet.clamp(min, max - 1))
            .collect::<Vec<Chips>>();
        sizes.dedup();
        sizes.retain(|bet| *bet >= min && *bet < max);
        sizes
    }

    //
    /// The seat that wins without showdown, if everyone else has folded.
    pub fn folded_out(&self) -> Option<Position> {
        if self.is_everyone_folding() {
            self.seats
                .iter()
                .position(|s| s.state() != State::Folding)
        } else {
            None
        }
    }
    /// Whole-hand profit-and-loss for a seat at a fold-terminal spot.
    pub fn pnl(&self, position: Position) -> Chips {
        let reward = match self.folded_out() {
            Some(winner) if winner == position => self.pot,
            _ => 0,
        };
        reward - self.seat(position).spent()
    }

    fn actor_ref(&self) -> &Seat {
        self.seats.get(self.actor).expect("actor in bounds")
    }
    fn actor_mut(&mut self) -> &mut Seat {
        self.seats.get_mut(self.actor).expect("actor in bounds")
    }
}

impl std::fmt::Display for Spot {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use colored::Colorize;
        for seat in self.seats.iter() {
            write!(f, "{}", seat)?;
        }
        let board = self
            .board
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join("");
        write!(f, "{}", format!(" @ {:>7} [{}]", self.pot, board).bright_green())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heads_up() -> Spot {
        // 100 in the middle, 30 already committed by seat 1 this round
        Spot::new(&[970, 900], 130)
            .with_stakes(&[0, 30])
            .with_actor(0)
    }

    #[test]
    fn conservation() {
        let spot = heads_up();
        let total = spot.total();
        let spot = spot.apply(Action::Call(30));
        assert!(spot.total() == total);
        let spot = spot.apply(Action::Check);
        assert!(spot.total() == total);
    }

    #[test]
    fn fold_ends_hand() {
        let spot = heads_up();
        let spot = spot.apply(Action::Fold);
        assert!(spot.is_terminal());
        assert!(spot.folded_out() == Some(1));
        assert!(spot.pnl(1) == 130 - 30);
        assert!(spot.pnl(0) == 0);
    }

    #[test]
    fn call_then_check_settles() {
        let spot = heads_up();
        assert!(!spot.is_terminal());
        let spot = spot.apply(Action::Call(30));
        assert!(!spot.is_terminal());
        let spot = spot.apply(Action::Check);
        assert!(spot.is_terminal());
        assert!(spot.folded_out().is_none());
    }

    #[test]
    fn raise_reopens_action() {
        let spot = heads_up();
        let spot = spot.apply(Action::Call(30));
        let spot = spot.apply(Action::Raise(90));
        assert!(!spot.is_terminal());
        let spot = spot.apply(Action::Call(90));
        assert!(spot.is_terminal());
    }

    #[test]
    fn raise_window() {
        let spot = heads_up();
        for raise in spot.raises() {
            assert!(spot.is_allowed(&Action::Raise(raise)));
        }
        assert!(!spot.is_allowed(&Action::Raise(spot.to_raise() - 1)));
        assert!(!spot.is_allowed(&Action::Raise(spot.to_shove())));
    }

    #[test]
    fn shove_and_call_settles() {
        let spot = heads_up();
        let spot = spot.apply(Action::Shove(970));
        assert!(!spot.is_terminal());
        // covering call would exceed the shorter stack, so calling is shoving
        let spot = spot.apply(Action::Shove(870));
        assert!(spot.is_terminal());
        assert!(spot.folded_out().is_none());
    }

    #[test]
    fn validation_rejects_malformed() {
        assert!(Spot::new(&[100], 0).validated().is_err());
        assert!(Spot::new(&[100, -5], 0).validated().is_err());
        assert!(Spot::new(&[100, 100], 0).with_actor(7).validated().is_err());
        assert!(Spot::new(&[100, 100], 10).validated().is_ok());
    }
}
