use super::equity::Icm;
use super::tournament::Payouts;
use super::tournament::TournamentState;
use crate::game::action::Action;
use crate::game::spot::Spot;
use crate::search::advice::Advice;
use crate::search::advice::Appraisal;
use crate::Chips;
use crate::Equity;
use crate::Probability;

/// The tournament overlay on a chip-EV search result.
///
/// Chip EV treats every chip alike; ICM does not. Each candidate action's
/// chip outcome is decomposed into its win/lose stack scenarios and mapped
/// through dollar equity, and the recommendation goes to the dollar-EV
/// argmax — which near a bubble can and should disagree with the chip-EV
/// argmax. That disagreement is the whole point of this type.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IcmDecision {
    pub action: Action,
    pub appraisals: Vec<Appraisal>,
    pub bubble_factor: f64,
    pub risk_premium: Equity,
    pub divergent: bool,
}

impl IcmDecision {
    /// Blend the search's chip EVs with tournament equity.
    ///
    /// `state` carries hand-start stacks, so the search's whole-hand chip
    /// EVs add onto them directly. The spot supplies the pot and the
    /// hero's sunk commitment, which shape each gamble's win/lose legs.
    pub fn decide(
        spot: &Spot,
        advice: &Advice,
        state: &TournamentState,
        payouts: &Payouts,
    ) -> anyhow::Result<Self> {
        let state = state.clone().validated()?;
        let hero = spot.actor();
        anyhow::ensure!(hero < state.players(), "hero seat outside tournament");
        anyhow::ensure!(!advice.appraisals.is_empty(), "no appraisals to adjust");
        let mut icm = Icm::new();
        let appraisals = advice
            .appraisals
            .iter()
            .map(|appraisal| Appraisal {
                dollar_ev: Some(Self::dollars(&mut icm, spot, appraisal, &state, payouts)),
                ..appraisal.clone()
            })
            .collect::<Vec<Appraisal>>();
        let best = appraisals
            .iter()
            .max_by(|a, b| {
                a.dollar_ev
                    .partial_cmp(&b.dollar_ev)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .expect("non-empty appraisals");
        let greedy = appraisals
            .iter()
            .max_by(|a, b| {
                a.chip_ev
                    .partial_cmp(&b.chip_ev)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .expect("non-empty appraisals");
        let divergent = best.action != greedy.action;
        if divergent {
            log::info!(
                "ICM overturns {}: {} keeps more equity",
                greedy.action,
                best.action,
            );
        }
        Ok(Self {
            action: best.action,
            bubble_factor: icm.bubble_factor(&state, payouts, hero),
            risk_premium: Self::premium(&mut icm, spot, &appraisals, &state, payouts),
            appraisals,
            divergent,
        })
    }

    /// Dollar EV of one candidate action.
    ///
    /// Passive actions move the hero's stack by their chip EV and reprice.
    /// Committal actions are gambles: the win and lose stack scenarios are
    /// priced separately and mixed with the win probability implied by the
    /// action's chip EV, which is where ICM's concavity gets to object.
    fn dollars(
        icm: &mut Icm,
        spot: &Spot,
        appraisal: &Appraisal,
        state: &TournamentState,
        payouts: &Payouts,
    ) -> Equity {
        let hero = spot.actor();
        let ev = appraisal.chip_ev.round() as Chips;
        match Self::gamble(spot, appraisal) {
            None => icm.equity(&state.swung(hero, ev), payouts)[hero],
            Some((win, lose, p)) => {
                let won = icm.equity(&state.swung(hero, win), payouts)[hero];
                let lost = icm.equity(&state.swung(hero, lose), payouts)[hero];
                p * won + (1.0 - p) * lost
            }
        }
    }

    /// Win/lose whole-hand pnl legs of a committal action, plus the win
    /// probability consistent with its chip EV. Heads-up pot arithmetic:
    /// winning claims the pot and a matching call, losing burns the sunk
    /// commitment plus the new chips.
    fn gamble(spot: &Spot, appraisal: &Appraisal) -> Option<(Chips, Chips, Probability)> {
        let commit = match appraisal.action {
            Action::Call(x) | Action::Raise(x) | Action::Shove(x) => x,
            Action::Fold | Action::Check => return None,
        };
        let sunk = spot.seat(spot.actor()).spent();
        let pot = spot.pot();
        let win = pot + commit - sunk;
        let lose = -(sunk + commit);
        let spread = (pot + 2 * commit) as Probability;
        let p = ((appraisal.chip_ev as Probability - lose as Probability) / spread).clamp(0.0, 1.0);
        Some((win, lose, p))
    }

    /// Risk premium of the largest gamble on the table, or zero when every
    /// candidate is passive.
    fn premium(
        icm: &mut Icm,
        spot: &Spot,
        appraisals: &[Appraisal],
        state: &TournamentState,
        payouts: &Payouts,
    ) -> Equity {
        let hero = spot.actor();
        appraisals
            .iter()
            .filter_map(|a| Self::gamble(spot, a).map(|g| (a.action.chips(), g)))
            .max_by_key(|(commit, _)| *commit)
            .map(|(_, (win, lose, p))| {
                icm.risk_premium(
                    &state.swung(hero, win),
                    &state.swung(hero, lose),
                    payouts,
                    hero,
                    p,
                )
            })
            .unwrap_or(0.0)
    }

    /// Fold this overlay back into the outgoing advice bundle.
    pub fn enrich(self, advice: Advice) -> Advice {
        let amount = match self.action {
            Action::Fold | Action::Check => None,
            a => Some(a.chips()),
        };
        Advice {
            action: self.action,
            amount,
            appraisals: self.appraisals,
            bubble_factor: Some(self.bubble_factor),
            risk_premium: Some(self.risk_premium),
            ..advice
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Utility;

    fn appraisal(action: Action, visits: u32, chip_ev: Utility) -> Appraisal {
        Appraisal {
            action,
            visits,
            chip_ev,
            dollar_ev: None,
        }
    }

    /// Pre-bubble squeeze: the mid stack is offered a marginally
    /// chip-positive shove that ICM should refuse.
    #[test]
    fn icm_overturns_marginal_shove() {
        let spot = Spot::new(&[5000, 2950, 2000], 250)
            .with_stakes(&[0, 50, 200])
            .with_actor(1);
        let advice = Advice::conclude(
            vec![
                appraisal(Action::Fold, 40, -50.0),
                appraisal(Action::Shove(2950), 60, 100.0),
            ],
            100,
            10,
        )
        .unwrap();
        assert!(advice.action == Action::Shove(2950));
        let state = TournamentState::from(vec![5000, 3000, 2000]);
        let payouts = Payouts::new(vec![500.0, 300.0, 0.0]).unwrap();
        let decision = IcmDecision::decide(&spot, &advice, &state, &payouts).unwrap();
        assert!(decision.action == Action::Fold);
        assert!(decision.divergent);
        assert!(decision.bubble_factor > 1.0);
        assert!(decision.risk_premium > 0.0);
        let fold = decision
            .appraisals
            .iter()
            .find(|a| a.action == Action::Fold)
            .unwrap();
        let shove = decision
            .appraisals
            .iter()
            .find(|a| a.action.is_shove())
            .unwrap();
        assert!(fold.dollar_ev.unwrap() > shove.dollar_ev.unwrap());
    }

    #[test]
    fn chip_and_dollar_agree_away_from_the_bubble() {
        // everyone is paid the same: ICM has nothing to object to
        let spot = Spot::new(&[5000, 2950, 2000], 250)
            .with_stakes(&[0, 50, 200])
            .with_actor(1);
        let advice = Advice::conclude(
            vec![
                appraisal(Action::Fold, 40, -50.0),
                appraisal(Action::Call(200), 60, 80.0),
            ],
            100,
            10,
        )
        .unwrap();
        let state = TournamentState::from(vec![5000, 3000, 2000]);
        let flat = Payouts::new(vec![300.0, 300.0, 300.0]).unwrap();
        let decision = IcmDecision::decide(&spot, &advice, &state, &flat).unwrap();
        assert!(decision.action == Action::Call(200));
        assert!(!decision.divergent);
    }

    #[test]
    fn enrichment_carries_the_overlay() {
        let spot = Spot::new(&[5000, 2950, 2000], 250)
            .with_stakes(&[0, 50, 200])
            .with_actor(1);
        let advice = Advice::conclude(
            vec![
                appraisal(Action::Fold, 40, -50.0),
                appraisal(Action::Shove(2950), 60, 100.0),
            ],
            100,
            10,
        )
        .unwrap();
        let state = TournamentState::from(vec![5000, 3000, 2000]);
        let payouts = Payouts::new(vec![500.0, 300.0, 0.0]).unwrap();
        let decision = IcmDecision::decide(&spot, &advice, &state, &payouts).unwrap();
        let advice = decision.enrich(advice);
        assert!(advice.action == Action::Fold);
        assert!(advice.amount.is_none());
        assert!(advice.bubble_factor.is_some());
        assert!(advice.appraisals.iter().all(|a| a.dollar_ev.is_some()));
    }
}
