use super::transposition::Entry;
use crate::game::action::Action;
use crate::game::spot::Spot;
use crate::Utility;

/// Per-node search statistics and the spot they describe.
///
/// `untried` holds the legal actions not yet expanded into children, in
/// priority order; progressive widening in the optimizer decides when the
/// next one may be opened. Values accumulate from the perspective of the
/// seat that chose into this node.
#[derive(Debug)]
pub struct Data {
    spot: Spot,
    visits: u32,
    value: Utility,
    untried: Vec<Action>,
}

impl From<Spot> for Data {
    fn from(spot: Spot) -> Self {
        let mut untried = spot.legal();
        untried.reverse(); // pop() yields highest-priority first
        Self {
            spot,
            visits: 0,
            value: 0.0,
            untried,
        }
    }
}

impl Data {
    pub fn spot(&self) -> &Spot {
        &self.spot
    }
    pub fn visits(&self) -> u32 {
        self.visits
    }
    pub fn value(&self) -> Utility {
        self.value
    }
    pub fn mean(&self) -> Utility {
        match self.visits {
            0 => 0.0,
            n => self.value / n as Utility,
        }
    }
    pub fn untried(&self) -> usize {
        self.untried.len()
    }
    pub fn pop_untried(&mut self) -> Option<Action> {
        self.untried.pop()
    }
    pub fn visit(&mut self, value: Utility) {
        self.visits += 1;
        self.value += value;
    }
    /// Adopt transposed statistics instead of starting cold. Only a fresh
    /// node may be seeded; visited nodes keep their own history.
    pub fn seed(&mut self, entry: Entry) {
        if self.visits == 0 {
            self.visits = entry.visits;
            self.value = entry.value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untried_covers_legal() {
        let spot = Spot::new(&[1000, 1000], 100).with_stakes(&[0, 40]);
        let data = Data::from(spot.clone());
        assert!(data.untried() == spot.legal().len());
    }

    #[test]
    fn seeding_only_when_cold() {
        let spot = Spot::new(&[1000, 1000], 100);
        let mut data = Data::from(spot);
        data.seed(Entry {
            visits: 8,
            value: 4.0,
        });
        assert!(data.visits() == 8);
        data.visit(1.0);
        data.seed(Entry {
            visits: 99,
            value: 0.0,
        });
        assert!(data.visits() == 9);
        assert!((data.mean() - 5.0 / 9.0).abs() < 1e-6);
    }
}
