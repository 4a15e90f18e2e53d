//! Candidate pipeline for one round: enumerate every perfect matching,
//! drop the ones that touch the bye player or repeat a played pair, score
//! the survivors and put the winner into rank order.

pub mod combination;
pub mod filter;
pub mod matching;
pub mod normalize;
pub mod scoring;

use core::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::player::PlayerId;

pub use combination::Combination;
pub use filter::{PlayedPairSet, filter_bye, filter_repeats};
pub use matching::{PaddedMatchings, PerfectMatchings, double_factorial, matching_count, padded_matchings};
pub use normalize::normalize;
pub use scoring::{ScoredCombination, TieBreak, score, select_best};

/// Candidate counts at each stage of the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStats {
    pub generated: u64,
    pub after_bye: u64,
    pub after_repeat: u64,
}

impl fmt::Display for FilterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "generated {}, after bye filter {}, after repeat filter {}",
            self.generated, self.after_bye, self.after_repeat
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairingError {
    #[error("invalid pairing input: {message}")]
    InvalidInput { message: String },
    #[error(
        "no valid pairing for round {round} (players {players:?}, bye {bye:?}): {stats}"
    )]
    PairingExhausted {
        round: u32,
        players: Vec<PlayerId>,
        bye: Option<PlayerId>,
        stats: FilterStats,
    },
    #[error("{players} players exceeds the pairing limit of {limit}")]
    FieldTooLarge { players: usize, limit: usize },
}

impl PairingError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        PairingError::InvalidInput {
            message: message.into(),
        }
    }
}
