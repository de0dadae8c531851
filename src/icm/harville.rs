use crate::Chips;
use crate::Probability;
use std::collections::HashMap;

/// Malmuth-Harville finish-probability calculator.
///
/// P(player finishes 1st) is their share of the chips; P(player finishes
/// k-th) recurses over every candidate leader, removing them and asking
/// for (k-1)-th among the rest, weighted by the leader's chance of
/// winning. Naive recursion is O(N!), so sub-tournaments are memoized on
/// the sorted stack multiset: every elimination order that reaches the
/// same residual stacks shares one computation. Recomputation on a stale
/// cache is wasted work, never a correctness bug, since the function is
/// pure.
#[derive(Debug, Default)]
pub struct Harville {
    memo: HashMap<Vec<Chips>, Vec<Vec<Probability>>>,
}

impl Harville {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish-probability matrix in the callers' player order: one row
    /// per player, one column per rank. Felted players (zero stacks) are
    /// pinned to the bottom ranks, shared uniformly among themselves.
    pub fn finishes(&mut self, stacks: &[Chips]) -> Vec<Vec<Probability>> {
        let n = stacks.len();
        let mut order = stacks
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, s)| *s > 0)
            .collect::<Vec<(usize, Chips)>>();
        order.sort_by(|a, b| b.1.cmp(&a.1));
        let alive = order.len();
        let busted = n - alive;
        let sorted = order.iter().map(|(_, s)| *s).collect::<Vec<Chips>>();
        let table = self.table(&sorted);
        let mut matrix = vec![vec![0.0; n]; n];
        for (position, (player, _)) in order.iter().enumerate() {
            for rank in 0..alive {
                matrix[*player][rank] = table[position][rank];
            }
        }
        for (player, _) in stacks.iter().enumerate().filter(|(_, s)| **s == 0) {
            for rank in alive..n {
                matrix[player][rank] = 1.0 / busted as Probability;
            }
        }
        self.audit(&mut matrix);
        matrix
    }

    /// Recursive core over strictly positive, descending-sorted stacks.
    fn table(&mut self, stacks: &Vec<Chips>) -> Vec<Vec<Probability>> {
        if stacks.is_empty() {
            return vec![];
        }
        if let Some(table) = self.memo.get(stacks) {
            return table.clone();
        }
        let n = stacks.len();
        let total = stacks.iter().map(|s| *s as Probability).sum::<Probability>();
        let first = stacks
            .iter()
            .map(|s| *s as Probability / total)
            .collect::<Vec<Probability>>();
        let mut table = vec![vec![0.0; n]; n];
        for i in 0..n {
            table[i][0] = first[i];
        }
        for leader in 0..n {
            let mut rest = stacks.clone();
            rest.remove(leader);
            let sub = self.table(&rest);
            for i in (0..n).filter(|i| *i != leader) {
                let position = if i < leader { i } else { i - 1 };
                for rank in 1..n {
                    table[i][rank] += first[leader] * sub[position][rank - 1];
                }
            }
        }
        self.memo.insert(stacks.clone(), table.clone());
        table
    }

    /// Production guardrail: per-player sums that drift beyond tolerance
    /// are renormalized and logged rather than surfaced, since a live
    /// decision must never hard-fail on float dust.
    fn audit(&self, matrix: &mut Vec<Vec<Probability>>) {
        for row in matrix.iter_mut() {
            let sum = row.iter().sum::<Probability>();
            debug_assert!((sum - 1.0).abs() < crate::TOLERANCE, "rank sum {}", sum);
            if (sum - 1.0).abs() > crate::TOLERANCE && sum > 0.0 {
                log::warn!("renormalizing drifted finish distribution ({})", sum);
                row.iter_mut().for_each(|p| *p /= sum);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows_and_columns_sum_to_one(stacks: &[Chips]) {
        let matrix = Harville::new().finishes(stacks);
        let n = stacks.len();
        for row in matrix.iter() {
            assert!((row.iter().sum::<Probability>() - 1.0).abs() < crate::TOLERANCE);
        }
        for rank in 0..n {
            let sum = matrix.iter().map(|row| row[rank]).sum::<Probability>();
            assert!((sum - 1.0).abs() < crate::TOLERANCE);
        }
    }

    #[test]
    fn doubly_stochastic() {
        rows_and_columns_sum_to_one(&[5000, 3000, 2000]);
        rows_and_columns_sum_to_one(&[1, 1, 1, 1]);
        rows_and_columns_sum_to_one(&[9000, 4500, 3300, 2100, 1100]);
        rows_and_columns_sum_to_one(&[100, 900, 250, 250, 7000, 1500]);
    }

    #[test]
    fn chip_leader_wins_proportionally() {
        let matrix = Harville::new().finishes(&[5000, 3000, 2000]);
        assert!((matrix[0][0] - 0.5).abs() < crate::TOLERANCE);
        assert!((matrix[1][0] - 0.3).abs() < crate::TOLERANCE);
        assert!((matrix[2][0] - 0.2).abs() < crate::TOLERANCE);
    }

    #[test]
    fn equal_stacks_equal_fates() {
        let matrix = Harville::new().finishes(&[2500, 4000, 2500, 1000]);
        for rank in 0..4 {
            assert!((matrix[0][rank] - matrix[2][rank]).abs() < crate::TOLERANCE);
        }
    }

    #[test]
    fn felted_players_hold_the_floor() {
        let matrix = Harville::new().finishes(&[6000, 0, 4000, 0]);
        // two live players contest ranks 1-2, two felted share ranks 3-4
        assert!((matrix[0][0] - 0.6).abs() < crate::TOLERANCE);
        assert!(matrix[1][0] == 0.0);
        assert!(matrix[1][1] == 0.0);
        assert!((matrix[1][2] - 0.5).abs() < crate::TOLERANCE);
        assert!((matrix[1][3] - 0.5).abs() < crate::TOLERANCE);
        rows_and_columns_sum_to_one(&[6000, 0, 4000, 0]);
    }

    #[test]
    fn heads_up_is_chip_fraction() {
        let matrix = Harville::new().finishes(&[7500, 2500]);
        assert!((matrix[0][0] - 0.75).abs() < crate::TOLERANCE);
        assert!((matrix[1][0] - 0.25).abs() < crate::TOLERANCE);
        assert!((matrix[0][1] - 0.25).abs() < crate::TOLERANCE);
    }

    #[test]
    fn memoization_shares_subproblems() {
        let mut harville = Harville::new();
        harville.finishes(&[4000, 3000, 2000, 1000]);
        let cached = harville.memo.len();
        harville.finishes(&[1000, 2000, 3000, 4000]);
        // permuted input hits the same canonical subproblems
        assert!(harville.memo.len() == cached);
    }
}
