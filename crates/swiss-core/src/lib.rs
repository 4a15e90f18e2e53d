//! Swiss-system pairing engine.
//!
//! Each round the engine enumerates every perfect matching of the active
//! players, drops those that touch the bye player or repeat an earlier
//! meeting, scores the rest by squared rank difference and keeps the best,
//! listed in rank order. The first round is drawn at random instead.

pub mod model;
pub mod pairing;
pub mod round;

pub use model::{Pair, PlayerId, PlayerRef, Standings};
pub use pairing::{Combination, FilterStats, PairingError, PlayedPairSet, TieBreak};
pub use round::{EngineConfig, PairingEngine, RoundPairing, RoundPhase, TournamentRoundContext};

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "swiss-core"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::AppInfo;

    #[test]
    fn exposes_static_metadata() {
        assert_eq!(AppInfo::name(), "swiss-core");
        assert!(!AppInfo::version().is_empty());
    }
}
