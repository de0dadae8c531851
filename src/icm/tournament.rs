use crate::Chips;
use crate::Equity;
use serde::Deserialize;
use serde::Serialize;

/// Prize money by finish rank, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payouts(Vec<Equity>);

impl Payouts {
    pub fn new(prizes: Vec<Equity>) -> anyhow::Result<Self> {
        anyhow::ensure!(!prizes.is_empty(), "empty payout structure");
        anyhow::ensure!(prizes.iter().all(|p| *p >= 0.0), "negative prize");
        anyhow::ensure!(
            prizes.windows(2).all(|w| w[0] >= w[1]),
            "prizes must not increase with rank"
        );
        Ok(Self(prizes))
    }

    /// Prize for a 0-based finish rank; zero beyond the paid places.
    pub fn prize(&self, rank: usize) -> Equity {
        self.0.get(rank).copied().unwrap_or(0.0)
    }
    pub fn paid(&self) -> usize {
        self.0.iter().filter(|p| **p > 0.0).count()
    }
    pub fn ranks(&self) -> usize {
        self.0.len()
    }
    pub fn pool(&self) -> Equity {
        self.0.iter().sum()
    }

    /// Generate a structure by exponential decay from first place,
    /// normalized so the prizes sum to the pool exactly: amounts round to
    /// cents and the rounding remainder lands on first place.
    pub fn exponential(pool: Equity, paid: usize, decay: f64) -> Self {
        assert!(paid > 0, "must pay at least one place");
        assert!(decay > 0.0 && decay < 1.0, "decay outside (0, 1)");
        let weights = (0..paid).map(|k| decay.powi(k as i32)).collect::<Vec<_>>();
        let total = weights.iter().sum::<f64>();
        let mut prizes = weights
            .iter()
            .map(|w| cents(pool * w / total))
            .collect::<Vec<Equity>>();
        let distributed = prizes.iter().sum::<Equity>();
        prizes[0] = cents(prizes[0] + pool - distributed);
        Self(prizes)
    }
}

fn cents(amount: Equity) -> Equity {
    (amount * 100.0).round() / 100.0
}

/// Stack distribution at a tournament decision point. Stacks are as of
/// the start of the current hand, so whole-hand chip EVs add directly.
/// Players are identified by their index; a zero stack marks a player
/// already felted but not yet assigned a final rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentState {
    stacks: Vec<Chips>,
}

impl From<Vec<Chips>> for TournamentState {
    fn from(stacks: Vec<Chips>) -> Self {
        Self { stacks }
    }
}

impl TournamentState {
    pub fn validated(self) -> anyhow::Result<Self> {
        anyhow::ensure!(!self.stacks.is_empty(), "empty tournament");
        anyhow::ensure!(self.stacks.iter().all(|s| *s >= 0), "negative stack");
        anyhow::ensure!(self.total() > 0, "no chips in play");
        Ok(self)
    }

    pub fn stacks(&self) -> &[Chips] {
        &self.stacks
    }
    pub fn players(&self) -> usize {
        self.stacks.len()
    }
    pub fn remaining(&self) -> usize {
        self.stacks.iter().filter(|s| **s > 0).count()
    }
    pub fn total(&self) -> Chips {
        self.stacks.iter().sum()
    }

    /// Shift one player's stack by `delta`, rebalancing the difference
    /// across the other live stacks pro-rata so chips are conserved.
    pub fn swung(&self, player: usize, delta: Chips) -> Self {
        let mut stacks = self.stacks.clone();
        let delta = delta.clamp(-stacks[player], self.total() - stacks[player]);
        stacks[player] += delta;
        let mut owed = -delta;
        let others = self
            .stacks
            .iter()
            .enumerate()
            .filter(|(i, s)| *i != player && **s > 0)
            .map(|(i, _)| i)
            .collect::<Vec<_>>();
        let pool: Chips = others.iter().map(|i| self.stacks[*i]).sum();
        for i in others.iter() {
            let share = if pool > 0 {
                (owed as i64 * self.stacks[*i] as i64 / pool as i64) as Chips
            } else {
                0
            };
            let share = share.clamp(-stacks[*i], Chips::MAX);
            stacks[*i] += share;
        }
        // rounding residue lands on the deepest other stack that can absorb it
        owed = self.total() - stacks.iter().sum::<Chips>();
        if owed != 0 {
            if let Some(deepest) = others
                .into_iter()
                .max_by_key(|i| stacks[*i])
                .filter(|i| stacks[*i] + owed >= 0)
            {
                stacks[deepest] += owed;
            }
        }
        Self { stacks }
    }
}
