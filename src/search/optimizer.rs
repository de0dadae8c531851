use super::advice::Advice;
use super::advice::Appraisal;
use super::data::Data;
use super::evaluator::Evaluator;
use super::node::Node;
use super::settings::Settings;
use super::transposition::Key;
use super::transposition::Transpositions;
use super::tree::Tree;
use crate::game::spot::Spot;
use crate::Position;
use crate::Utility;
use petgraph::graph::NodeIndex;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::time::Instant;

/// The search driver: repeated selection → widening → expansion →
/// evaluation → backpropagation under a time or iteration budget.
///
/// Values are normalized by the chip total on the table, so scores live
/// in [-1, 1] and the exploration constant keeps its textbook meaning
/// regardless of stack depth. Each node's statistics accumulate from the
/// perspective of the seat that chose into it; opponents of the hero are
/// assumed to steer toward hero's worst outcome, which is what the
/// per-ply sign flip in backpropagation expresses.
pub struct Optimizer<E: Evaluator> {
    evaluator: E,
    settings: Settings,
}

impl<E: Evaluator> Optimizer<E> {
    pub fn new(evaluator: E) -> Self {
        Self {
            evaluator,
            settings: Settings::default(),
        }
    }
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Search one decision point and recommend an action.
    ///
    /// Fails fast on structurally invalid input; never fails on budget
    /// exhaustion, which simply bounds how much evidence backs the answer.
    pub fn search(&self, spot: &Spot) -> anyhow::Result<Advice> {
        self.run(&self.settings, spot)
    }

    /// Root-parallel search: independent trees over disjoint
    /// transposition tables, merged by summing per-action statistics.
    pub fn search_parallel(&self, spot: &Spot, trees: usize) -> anyhow::Result<Advice> {
        use rayon::iter::IntoParallelIterator;
        use rayon::iter::ParallelIterator;
        anyhow::ensure!(trees > 0, "zero search trees requested");
        let base = self.settings.seed.unwrap_or_else(rand::random);
        let advices = (0..trees)
            .into_par_iter()
            .map(|i| {
                let settings = self.settings.clone().seed(base.wrapping_add(i as u64));
                self.run(&settings, spot)
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Advice::merge(advices)
    }

    fn run(&self, settings: &Settings, spot: &Spot) -> anyhow::Result<Advice> {
        let start = Instant::now();
        let root = spot.clone().validated()?;
        anyhow::ensure!(!root.is_terminal(), "terminal spot: nothing to decide");
        let legal = root.legal();
        anyhow::ensure!(!legal.is_empty(), "no legal actions at a non-terminal spot");
        let hero = root.actor();
        let scale = root.total() as Utility;
        anyhow::ensure!(scale > 0.0, "no chips on the table");
        let mut rng = match settings.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let mut table = Transpositions::new(settings.capacity);
        let mut tree = Tree::from(Data::from(root));
        let mut iterations = 0;
        loop {
            self.iterate(settings, &mut tree, &mut table, hero, scale, &mut rng);
            iterations += 1;
            if self.finished(settings, &start, iterations) {
                break;
            }
        }
        log::debug!(
            "searched {} nodes over {} iterations in {:?}",
            tree.n(),
            iterations,
            start.elapsed()
        );
        let appraisals = legal
            .iter()
            .map(|action| match tree.root().follow(action) {
                Some(child) => Appraisal {
                    action: *action,
                    visits: child.visits(),
                    chip_ev: child.mean() * scale,
                    dollar_ev: None,
                },
                None => Appraisal {
                    action: *action,
                    visits: 0,
                    chip_ev: 0.0,
                    dollar_ev: None,
                },
            })
            .collect();
        Advice::conclude(appraisals, iterations, start.elapsed().as_millis() as u64)
    }

    /// One full pass. The wall clock is only consulted back in [`Self::run`],
    /// between passes, so a slow evaluator can overrun the budget by at
    /// most one iteration's cost.
    fn iterate(
        &self,
        settings: &Settings,
        tree: &mut Tree,
        table: &mut Transpositions,
        hero: Position,
        scale: Utility,
        rng: &mut SmallRng,
    ) {
        // selection, until a terminal node or a node allowed to widen
        let mut path = vec![NodeIndex::new(0)];
        loop {
            let index = *path.last().expect("non-empty path");
            if tree.at(index).spot().is_terminal() {
                break;
            }
            if self.may_widen(settings, tree, index) {
                let action = tree
                    .at_mut(index)
                    .pop_untried()
                    .expect("widening implies untried actions");
                let spot = tree.at(index).spot().apply(action);
                let mut data = Data::from(spot);
                if let Some(entry) = table.get(&Key::from(data.spot())) {
                    data.seed(entry);
                }
                path.push(tree.extend(index, action, data));
                break;
            }
            path.push(self.select(settings, tree, index));
        }
        // evaluation: exact where the hand is decided, heuristic elsewhere
        let leaf = *path.last().expect("non-empty path");
        let value = self.appraise(tree.at(leaf).spot(), hero, rng) / scale;
        // backpropagation, sign-flipped at villain choices
        for depth in 0..path.len() {
            let index = path[depth];
            let sign = match depth {
                0 => 1.0,
                d => match tree.at(path[d - 1]).spot().actor() == hero {
                    true => 1.0,
                    false => -1.0,
                },
            };
            tree.at_mut(index).visit(sign * value);
            table.absorb(&Key::from(tree.at(index).spot()), 1, sign * value);
        }
    }

    fn appraise(&self, spot: &Spot, hero: Position, rng: &mut SmallRng) -> Utility {
        match spot.folded_out() {
            Some(_) => spot.pnl(hero) as Utility,
            None => self.evaluator.evaluate(spot, hero, rng),
        }
    }

    /// Progressive widening: a node may open its next untried action only
    /// while its child count is below ⌊k · visits^α⌋ (never below one).
    fn may_widen(&self, settings: &Settings, tree: &Tree, index: NodeIndex) -> bool {
        let node = tree.at(index);
        node.data().untried() > 0 && node.children().len() < self.allowance(settings, node.visits())
    }
    fn allowance(&self, settings: &Settings, visits: u32) -> usize {
        let eligible = settings.widening_constant * (visits as f64).powf(settings.widening_exponent);
        std::cmp::max(1, eligible.floor() as usize)
    }

    /// UCT over the children; an unvisited child is infinitely urgent so
    /// every opened action is sampled at least once.
    fn select(&self, settings: &Settings, tree: &Tree, index: NodeIndex) -> NodeIndex {
        let parent = tree.at(index);
        let lnn = (parent.visits().max(1) as Utility).ln();
        parent
            .children()
            .into_iter()
            .max_by(|a, b| {
                self.uct(settings, lnn, a)
                    .partial_cmp(&self.uct(settings, lnn, b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|child| child.index())
            .expect("selectable node has children")
    }
    fn uct(&self, settings: &Settings, lnn: Utility, child: &Node) -> Utility {
        match child.visits() {
            0 => Utility::INFINITY,
            n => child.mean() + settings.exploration * (lnn / n as Utility).sqrt(),
        }
    }

    fn finished(&self, settings: &Settings, start: &Instant, iterations: usize) -> bool {
        match settings.iterations {
            Some(budget) => iterations >= budget.max(1),
            None => start.elapsed().as_millis() as u64 >= settings.budget_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::action::Action;
    use crate::search::evaluator::ProRata;
    use crate::search::evaluator::Rollout;

    fn spot() -> Spot {
        // facing a 40 into 100 with plenty behind
        Spot::new(&[960, 900], 140)
            .with_stakes(&[0, 40])
            .with_actor(0)
    }

    #[test]
    fn one_iteration_covers_every_action() {
        let optimizer = Optimizer::new(ProRata).with_settings(Settings::default().iterations(1).seed(1));
        let advice = optimizer.search(&spot()).unwrap();
        assert!(advice.iterations == 1);
        assert!(advice.appraisals.len() == spot().legal().len());
        let visits: u32 = advice.appraisals.iter().map(|a| a.visits).sum();
        assert!(visits >= 1);
    }

    #[test]
    fn zero_time_budget_still_answers() {
        let optimizer = Optimizer::new(ProRata).with_settings(Settings::default().budget_ms(0).seed(1));
        let advice = optimizer.search(&spot()).unwrap();
        assert!(advice.iterations == 1);
    }

    #[test]
    fn terminal_root_is_an_error() {
        let folded = spot().apply(Action::Fold);
        let optimizer = Optimizer::new(ProRata);
        assert!(optimizer.search(&folded).is_err());
    }

    #[test]
    fn malformed_root_is_an_error() {
        let optimizer = Optimizer::new(ProRata);
        assert!(optimizer.search(&Spot::new(&[100, -1], 10)).is_err());
    }

    #[test]
    fn visits_concentrate_with_budget() {
        let optimizer =
            Optimizer::new(ProRata).with_settings(Settings::default().iterations(512).seed(7));
        let advice = optimizer.search(&spot()).unwrap();
        assert!(advice.iterations == 512);
        let best = advice
            .appraisals
            .iter()
            .find(|a| a.action == advice.action)
            .unwrap();
        let rest = advice
            .appraisals
            .iter()
            .filter(|a| a.action != advice.action)
            .map(|a| a.visits)
            .max()
            .unwrap();
        assert!(best.visits >= rest);
    }

    #[test]
    fn deterministic_under_seed() {
        let settings = Settings::default().iterations(256).seed(11);
        let a = Optimizer::new(Rollout)
            .with_settings(settings.clone())
            .search(&spot())
            .unwrap();
        let b = Optimizer::new(Rollout)
            .with_settings(settings)
            .search(&spot())
            .unwrap();
        for (x, y) in a.appraisals.iter().zip(b.appraisals.iter()) {
            assert!(x.visits == y.visits);
            assert!((x.chip_ev - y.chip_ev).abs() < 1e-4);
        }
    }

    #[test]
    fn estimates_tighten_with_iterations() {
        // variance of the chosen action's estimate across reruns shrinks
        // as the budget grows
        let spread = |iterations: usize| {
            let evs = (0..8)
                .map(|seed| {
                    Optimizer::new(Rollout)
                        .with_settings(Settings::default().iterations(iterations).seed(seed))
                        .search(&spot())
                        .unwrap()
                })
                .map(|advice| {
                    advice
                        .appraisals
                        .iter()
                        .map(|a| a.chip_ev * a.visits as Utility)
                        .sum::<Utility>()
                        / advice
                            .appraisals
                            .iter()
                            .map(|a| a.visits as Utility)
                            .sum::<Utility>()
                })
                .collect::<Vec<_>>();
            let mean = evs.iter().sum::<Utility>() / evs.len() as Utility;
            evs.iter().map(|ev| (ev - mean).powi(2)).sum::<Utility>() / evs.len() as Utility
        };
        assert!(spread(1024) <= spread(16));
    }

    #[test]
    fn parallel_merges_consistently() {
        let optimizer =
            Optimizer::new(ProRata).with_settings(Settings::default().iterations(128).seed(3));
        let advice = optimizer.search_parallel(&spot(), 4).unwrap();
        assert!(advice.iterations == 4 * 128);
        assert!(advice.appraisals.len() == spot().legal().len());
    }
}
