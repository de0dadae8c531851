//! Advisor binary
//!
//! Loads a decision point from JSON (or a bundled pre-bubble demo), runs
//! the search, applies the ICM overlay when a tournament is supplied, and
//! prints the per-action table.

use clap::Parser;
use oddsmith::game::spot::Spot;
use oddsmith::icm::IcmDecision;
use oddsmith::icm::Payouts;
use oddsmith::icm::TournamentState;
use oddsmith::search::evaluator::Rollout;
use oddsmith::search::Optimizer;
use oddsmith::search::Settings;

#[derive(Parser, Debug)]
#[command(about = "recommend an action for a no-limit hold'em spot")]
struct Args {
    /// JSON file describing the spot; omit for the bundled demo
    #[arg(long)]
    spot: Option<std::path::PathBuf>,
    /// JSON file with tournament stacks, for ICM-aware mode
    #[arg(long)]
    tournament: Option<std::path::PathBuf>,
    /// JSON file with payouts by rank; defaults to an exponential
    /// structure over the tournament's prize pool
    #[arg(long)]
    payouts: Option<std::path::PathBuf>,
    /// Wall-clock budget in milliseconds
    #[arg(long, default_value_t = oddsmith::SEARCH_BUDGET_MS)]
    budget: u64,
    /// Iteration budget; overrides the clock when set
    #[arg(long)]
    iterations: Option<usize>,
    /// Root-parallel trees
    #[arg(long, default_value_t = 1)]
    trees: usize,
    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    logs();
    let args = Args::parse();
    let (spot, tournament) = load(&args)?;
    let mut settings = Settings::default().budget_ms(args.budget);
    if let Some(iterations) = args.iterations {
        settings = settings.iterations(iterations);
    }
    if let Some(seed) = args.seed {
        settings = settings.seed(seed);
    }
    let optimizer = Optimizer::new(Rollout).with_settings(settings);
    let advice = match args.trees {
        0 | 1 => optimizer.search(&spot)?,
        trees => optimizer.search_parallel(&spot, trees)?,
    };
    let advice = match tournament {
        Some((state, payouts)) => {
            IcmDecision::decide(&spot, &advice, &state, &payouts)?.enrich(advice)
        }
        None => advice,
    };
    println!("{}", spot);
    println!("{}", advice);
    Ok(())
}

fn load(args: &Args) -> anyhow::Result<(Spot, Option<(TournamentState, Payouts)>)> {
    let spot = match &args.spot {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => demo(),
    };
    let tournament = match &args.tournament {
        Some(path) => {
            let state: TournamentState =
                serde_json::from_str(&std::fs::read_to_string(path)?)?;
            let state = state.validated()?;
            let payouts = match &args.payouts {
                Some(path) => serde_json::from_str::<Payouts>(&std::fs::read_to_string(path)?)?,
                None => Payouts::exponential(
                    state.total() as f64 / 10.0,
                    (state.remaining() / 3).max(1),
                    oddsmith::PAYOUT_DECAY,
                ),
            };
            Some((state, payouts))
        }
        None => match &args.spot {
            // the bundled demo is a tournament spot
            None => Some((
                TournamentState::from(vec![5000, 3000, 2000]),
                Payouts::new(vec![500.0, 300.0, 0.0]).expect("descending prizes"),
            )),
            Some(_) => None,
        },
    };
    Ok((spot, tournament))
}

/// Three-handed pre-bubble squeeze: the mid stack faces a shove having
/// already posted, with the short stack all but committed behind.
fn demo() -> Spot {
    Spot::new(&[5000, 2950, 2000], 250)
        .with_stakes(&[0, 50, 200])
        .with_actor(1)
}

fn logs() {
    simplelog::TermLogger::init(
        log::LevelFilter::Info,
        simplelog::ConfigBuilder::new()
            .set_location_level(log::LevelFilter::Off)
            .set_target_level(log::LevelFilter::Off)
            .set_thread_level(log::LevelFilter::Off)
            .build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )
    .expect("initialize logger");
}
