use core::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use swiss_core::{Pair, PlayerId};

use crate::config::OutcomeConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    Player1Win,
    Player2Win,
    Tie,
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MatchOutcome::Player1Win => "player1_win",
            MatchOutcome::Player2Win => "player2_win",
            MatchOutcome::Tie => "tie",
        };
        f.write_str(label)
    }
}

/// Maps a uniform sample in `[0, 1)` onto an outcome. Player 1 wins below
/// `player1_win`, player 2 below `player1_win + player2_win`, tie otherwise.
pub fn classify(sample: f64, model: &OutcomeConfig) -> MatchOutcome {
    if sample < model.player1_win {
        MatchOutcome::Player1Win
    } else if sample < model.player1_win + model.player2_win {
        MatchOutcome::Player2Win
    } else {
        MatchOutcome::Tie
    }
}

pub fn draw_outcome<R: Rng>(rng: &mut R, model: &OutcomeConfig) -> MatchOutcome {
    classify(rng.gen_range(0.0..1.0), model)
}

/// One played match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub round: u32,
    pub number: u32,
    pub player1: PlayerId,
    pub player2: PlayerId,
    pub outcome: MatchOutcome,
}

impl MatchRecord {
    pub fn play<R: Rng>(
        round: u32,
        number: u32,
        pair: Pair,
        rng: &mut R,
        model: &OutcomeConfig,
    ) -> Self {
        Self {
            round,
            number,
            player1: pair.first,
            player2: pair.second,
            outcome: draw_outcome(rng, model),
        }
    }

    pub fn winner(&self) -> Option<PlayerId> {
        match self.outcome {
            MatchOutcome::Player1Win => Some(self.player1),
            MatchOutcome::Player2Win => Some(self.player2),
            MatchOutcome::Tie => None,
        }
    }

    pub fn loser(&self) -> Option<PlayerId> {
        match self.outcome {
            MatchOutcome::Player1Win => Some(self.player2),
            MatchOutcome::Player2Win => Some(self.player1),
            MatchOutcome::Tie => None,
        }
    }
}
