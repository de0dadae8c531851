use crate::game::action::Action;
use crate::Chips;
use crate::Equity;
use crate::Utility;
use serde::Serialize;

/// Search verdict on one candidate action.
#[derive(Debug, Clone, Serialize)]
pub struct Appraisal {
    pub action: Action,
    pub visits: u32,
    pub chip_ev: Utility,
    /// Populated only in ICM mode, by [`crate::icm::decision`].
    pub dollar_ev: Option<Equity>,
}

/// The outgoing bundle: a recommendation plus everything a caller needs
/// to explain it. Plain data, serializable by whatever transport sits on
/// top of this library.
#[derive(Debug, Clone, Serialize)]
pub struct Advice {
    pub action: Action,
    pub amount: Option<Chips>,
    pub appraisals: Vec<Appraisal>,
    pub iterations: usize,
    pub elapsed_ms: u64,
    pub bubble_factor: Option<f64>,
    pub risk_premium: Option<Equity>,
}

impl Advice {
    /// Robust-child rule: most visits wins, ties broken by higher mean.
    pub fn conclude(
        appraisals: Vec<Appraisal>,
        iterations: usize,
        elapsed_ms: u64,
    ) -> anyhow::Result<Self> {
        let best = appraisals
            .iter()
            .max_by(|a, b| {
                a.visits.cmp(&b.visits).then(
                    a.chip_ev
                        .partial_cmp(&b.chip_ev)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
            })
            .ok_or_else(|| anyhow::anyhow!("no appraisals to conclude from"))?;
        Ok(Self {
            action: best.action,
            amount: sizing(&best.action),
            appraisals: appraisals.clone(),
            iterations,
            elapsed_ms,
            bubble_factor: None,
            risk_premium: None,
        })
    }

    /// Merge root-parallel results by summing per-action visit counts and
    /// visit-weighting the value estimates, then re-electing the robust child.
    pub fn merge(advices: Vec<Advice>) -> anyhow::Result<Self> {
        anyhow::ensure!(!advices.is_empty(), "nothing to merge");
        let iterations = advices.iter().map(|a| a.iterations).sum();
        let elapsed_ms = advices.iter().map(|a| a.elapsed_ms).max().unwrap_or(0);
        let mut merged: Vec<Appraisal> = Vec::new();
        for appraisal in advices.iter().flat_map(|a| a.appraisals.iter()) {
            match merged.iter_mut().find(|m| m.action == appraisal.action) {
                Some(m) => {
                    let visits = m.visits + appraisal.visits;
                    if visits > 0 {
                        m.chip_ev = (m.chip_ev * m.visits as Utility
                            + appraisal.chip_ev * appraisal.visits as Utility)
                            / visits as Utility;
                    }
                    m.visits = visits;
                }
                None => merged.push(appraisal.clone()),
            }
        }
        Self::conclude(merged, iterations, elapsed_ms)
    }
}

fn sizing(action: &Action) -> Option<Chips> {
    match action {
        Action::Fold | Action::Check => None,
        a => Some(a.chips()),
    }
}

impl std::fmt::Display for Advice {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use colored::Colorize;
        writeln!(
            f,
            "{}",
            format!(
                "{} iterations in {}ms",
                self.iterations, self.elapsed_ms
            )
            .dimmed()
        )?;
        if let Some(bubble) = self.bubble_factor {
            writeln!(f, "{}", format!("bubble factor {:.2}", bubble).dimmed())?;
        }
        if let Some(premium) = self.risk_premium {
            writeln!(f, "{}", format!("risk premium ${:.2}", premium).dimmed())?;
        }
        let mut rows = self.appraisals.clone();
        rows.sort_by(|a, b| b.visits.cmp(&a.visits));
        for row in rows.iter() {
            let chosen = row.action == self.action;
            let marker = if chosen { ">" } else { " " };
            let dollars = row
                .dollar_ev
                .map(|ev| format!(" ${:>8.2}", ev))
                .unwrap_or_default();
            let line = format!(
                "{} {:<16} {:>7}x {:>+10.1}{}",
                marker, row.action, row.visits, row.chip_ev, dollars
            );
            match chosen {
                true => writeln!(f, "{}", line.bold())?,
                false => writeln!(f, "{}", line)?,
            }
        }
        Ok(())
    }
}
