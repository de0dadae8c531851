use super::harville::Harville;
use super::tournament::Payouts;
use super::tournament::TournamentState;
use crate::Equity;
use crate::Position;
use crate::Probability;

/// Independent Chip Model calculator: converts stack distributions into
/// dollar equity through Malmuth-Harville finish probabilities, and
/// derives the bubble pressure measures that bend decisions away from
/// pure chip EV.
#[derive(Debug, Default)]
pub struct Icm {
    harville: Harville,
}

impl Icm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dollar equity per player: Σ over ranks of finish probability times
    /// prize. Prizes beyond the table never find a recipient, so total
    /// equity can never exceed the pool.
    pub fn equity(&mut self, state: &TournamentState, payouts: &Payouts) -> Vec<Equity> {
        if payouts.ranks() > state.players() {
            log::warn!(
                "{} paid ranks for {} players: excess prizes are unreachable",
                payouts.ranks(),
                state.players(),
            );
        }
        let finishes = self.harville.finishes(state.stacks());
        finishes
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(rank, p)| p * payouts.prize(rank))
                    .sum()
            })
            .collect()
    }

    /// How much more a lost chip costs than a won chip earns, probing an
    /// equal swing both ways around the player's current stack. Clamped
    /// to [[`crate::BUBBLE_FACTOR_MIN`], [`crate::BUBBLE_FACTOR_MAX`]];
    /// above 1.0 means ICM punishes gambles here.
    pub fn bubble_factor(
        &mut self,
        state: &TournamentState,
        payouts: &Payouts,
        player: Position,
    ) -> f64 {
        let average = state.total() / state.players() as i32;
        let probe = std::cmp::max(1, (average as f64 * crate::BUBBLE_PROBE) as i32);
        let base = self.equity(state, payouts)[player];
        let up = self.equity(&state.swung(player, probe), payouts)[player];
        let down = self.equity(&state.swung(player, -probe), payouts)[player];
        let gain = up - base;
        let loss = base - down;
        match gain {
            g if g <= 0.0 => crate::BUBBLE_FACTOR_MAX,
            g => (loss / g).clamp(crate::BUBBLE_FACTOR_MIN, crate::BUBBLE_FACTOR_MAX),
        }
    }

    /// Equity cost of a win/lose gamble beyond its chip EV: the naive
    /// chip-proportional value of the expected outcome, minus the
    /// probability-weighted ICM equity of the two scenarios.
    pub fn risk_premium(
        &mut self,
        win: &TournamentState,
        lose: &TournamentState,
        payouts: &Payouts,
        player: Position,
        p_win: Probability,
    ) -> Equity {
        let p = p_win.clamp(0.0, 1.0);
        let icm = p * self.equity(win, payouts)[player]
            + (1.0 - p) * self.equity(lose, payouts)[player];
        let expected = p * win.stacks()[player] as Equity
            + (1.0 - p) * lose.stacks()[player] as Equity;
        let naive = expected / win.total() as Equity * payouts.pool();
        naive - icm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payouts() -> Payouts {
        Payouts::new(vec![500.0, 300.0, 0.0]).unwrap()
    }

    #[test]
    fn equity_sums_to_distributable_pool() {
        let state = TournamentState::from(vec![5000, 3000, 2000]);
        let equities = Icm::new().equity(&state, &payouts());
        let total = equities.iter().sum::<Equity>();
        assert!((total - 800.0).abs() < 1e-6);
    }

    #[test]
    fn worked_example() {
        // 3 players, 5000/3000/2000, $500/$300/$0
        let state = TournamentState::from(vec![5000, 3000, 2000]);
        let mut icm = Icm::new();
        let equities = icm.equity(&state, &payouts());
        // chip leader's P(1st) is exactly half
        assert!(equities[0] > equities[1]);
        assert!(equities[1] > equities[2]);
        assert!((equities.iter().sum::<Equity>() - 800.0).abs() < 1e-6);
    }

    #[test]
    fn heads_up_reduces_to_chip_fraction() {
        let state = TournamentState::from(vec![7500, 2500]);
        let winner_takes_all = Payouts::new(vec![1000.0]).unwrap();
        let equities = Icm::new().equity(&state, &winner_takes_all);
        assert!((equities[0] - 750.0).abs() < 1e-6);
        assert!((equities[1] - 250.0).abs() < 1e-6);
    }

    #[test]
    fn excess_payouts_go_undistributed() {
        let state = TournamentState::from(vec![6000, 4000]);
        let overlong = Payouts::new(vec![500.0, 300.0, 200.0]).unwrap();
        let equities = Icm::new().equity(&state, &overlong);
        let total = equities.iter().sum::<Equity>();
        assert!(total <= overlong.pool());
        assert!((total - 800.0).abs() < 1e-6);
    }

    #[test]
    fn bubble_squeezes_the_middle_stack() {
        // classic pre-bubble: flat-ish payouts punish busting far more
        // than laddering rewards
        let state = TournamentState::from(vec![5000, 3000, 2000]);
        let factor = Icm::new().bubble_factor(&state, &payouts(), 1);
        assert!(factor > 1.0);
        assert!(factor <= crate::BUBBLE_FACTOR_MAX);
    }

    #[test]
    fn risk_premium_is_positive_near_the_bubble() {
        let state = TournamentState::from(vec![5000, 3000, 2000]);
        // mid stack flips for its tournament life against the leader
        let win = state.swung(1, 3000);
        let lose = state.swung(1, -3000);
        let premium = Icm::new().risk_premium(&win, &lose, &payouts(), 1, 0.5);
        assert!(premium > 0.0);
    }

    #[test]
    fn chip_leader_equity_is_sublinear() {
        // 50% of chips is worth less than 50% of a multi-payout pool
        let state = TournamentState::from(vec![5000, 3000, 2000]);
        let equities = Icm::new().equity(&state, &payouts());
        assert!(equities[0] < 0.5 * 800.0 + 1e-9);
    }
}
