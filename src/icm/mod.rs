pub mod decision;
pub mod equity;
pub mod harville;
pub mod tournament;

pub use decision::IcmDecision;
pub use equity::Icm;
pub use harville::Harville;
pub use tournament::Payouts;
pub use tournament::TournamentState;
