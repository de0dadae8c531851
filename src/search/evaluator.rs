use crate::game::seat::State;
use crate::game::spot::Spot;
use crate::Position;
use crate::Utility;
use rand::rngs::SmallRng;

/// The leaf-scoring seam of the search.
///
/// The optimizer knows betting mechanics but deliberately knows nothing
/// about hand strength; whoever invokes it supplies the judgment. Scores
/// are the estimated whole-hand chip profit-and-loss of `hero` at `spot`
/// (what the seat will have won or lost once the hand resolves, relative
/// to its hand-start stack).
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, spot: &Spot, hero: Position, rng: &mut SmallRng) -> Utility;
}

/// Deterministic pot-share heuristic: every live seat is assumed to
/// realize an equal share of the current pot. Crude, but monotone in pot
/// odds and fully reproducible, which makes it the default for tests and
/// for callers who bring no model of their own.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProRata;

impl Evaluator for ProRata {
    fn evaluate(&self, spot: &Spot, hero: Position, _: &mut SmallRng) -> Utility {
        let seat = spot.seat(hero);
        if seat.state() == State::Folding {
            return -(seat.spent() as Utility);
        }
        let alive = spot
            .seats()
            .iter()
            .filter(|s| s.state() != State::Folding)
            .count();
        let share = spot.pot() as Utility / alive as Utility;
        share - seat.spent() as Utility
    }
}

/// Uniform random playout to the end of the betting round, with the pot
/// awarded to a random live seat where a showdown would be. Noisy but
/// unbiased across symmetric seats.
#[derive(Debug, Default, Clone, Copy)]
pub struct Rollout;

impl Evaluator for Rollout {
    fn evaluate(&self, spot: &Spot, hero: Position, rng: &mut SmallRng) -> Utility {
        use rand::seq::IndexedRandom;
        use rand::Rng;
        let mut spot = spot.clone();
        while !spot.is_terminal() {
            let action = *spot.legal().choose(rng).expect("non-terminal has actions");
            spot = spot.apply(action);
        }
        if spot.folded_out().is_some() {
            return spot.pnl(hero) as Utility;
        }
        let live = spot
            .seats()
            .iter()
            .enumerate()
            .filter(|(_, s)| s.state() != State::Folding)
            .map(|(i, _)| i)
            .collect::<Vec<_>>();
        let winner = live[rng.random_range(0..live.len())];
        let reward = if winner == hero { spot.pot() } else { 0 };
        (reward - spot.seat(hero).spent()) as Utility
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn pro_rata_is_deterministic() {
        let spot = Spot::new(&[800, 600], 200).with_stakes(&[50, 50]);
        let ref mut rng = SmallRng::seed_from_u64(0);
        let a = ProRata.evaluate(&spot, 0, rng);
        let b = ProRata.evaluate(&spot, 0, rng);
        assert!(a == b);
        assert!(a == 100.0 - 50.0);
    }

    #[test]
    fn rollout_reaches_terminal_payoffs() {
        let spot = Spot::new(&[800, 600], 200);
        let ref mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..64 {
            let value = Rollout.evaluate(&spot, 0, rng);
            // hero can never lose more than its stack nor win more than the table
            assert!(value >= -800.0);
            assert!(value <= spot.total() as Utility);
        }
    }
}
