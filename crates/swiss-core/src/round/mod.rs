pub mod engine;
pub mod snapshot;

use serde::{Deserialize, Serialize};

use crate::model::player::{Pair, PlayerId};
use crate::model::standings::Standings;
use crate::pairing::{FilterStats, PairingError, PlayedPairSet};

pub use engine::{EngineConfig, PairingEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    NotStarted,
    FirstRound,
    SubsequentRound(u32),
    Done,
}

impl RoundPhase {
    /// Round number to pair next, if a round is due.
    pub const fn round_number(self) -> Option<u32> {
        match self {
            RoundPhase::FirstRound => Some(1),
            RoundPhase::SubsequentRound(round) => Some(round),
            RoundPhase::NotStarted | RoundPhase::Done => None,
        }
    }

    fn after(round: u32, total_rounds: u32) -> Self {
        if round >= total_rounds {
            RoundPhase::Done
        } else {
            RoundPhase::SubsequentRound(round + 1)
        }
    }
}

/// Pairing produced for one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundPairing {
    pub round: u32,
    pub pairs: Vec<Pair>,
    pub bye: Option<PlayerId>,
    /// Quality of the selected combination; first rounds are not scored.
    pub score: Option<u64>,
    pub stats: FilterStats,
}

/// Everything the engine needs to pair a round, carried from one round to
/// the next by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentRoundContext {
    phase: RoundPhase,
    total_rounds: u32,
    players: Vec<PlayerId>,
    standings: Standings,
    played: PlayedPairSet,
    bye_history: Vec<PlayerId>,
}

impl TournamentRoundContext {
    pub fn new(players: Vec<PlayerId>, total_rounds: u32) -> Self {
        Self {
            phase: RoundPhase::NotStarted,
            total_rounds,
            players,
            standings: Standings::default(),
            played: PlayedPairSet::new(),
            bye_history: Vec::new(),
        }
    }

    /// Moves a fresh context to its first round.
    pub fn begin(mut self) -> Result<Self, PairingError> {
        if self.phase != RoundPhase::NotStarted {
            return Err(PairingError::invalid(format!(
                "tournament already started (phase {:?})",
                self.phase
            )));
        }
        self.phase = if self.total_rounds == 0 {
            RoundPhase::Done
        } else {
            RoundPhase::FirstRound
        };
        Ok(self)
    }

    pub fn with_standings(mut self, standings: Standings) -> Self {
        self.standings = standings;
        self
    }

    /// Folds a confirmed round into the context and advances the phase.
    pub fn record_round(mut self, pairing: &RoundPairing) -> Result<Self, PairingError> {
        let expected = self.phase.round_number().ok_or_else(|| {
            PairingError::invalid(format!("no round is due in phase {:?}", self.phase))
        })?;
        if pairing.round != expected {
            return Err(PairingError::invalid(format!(
                "expected results for round {expected}, got round {}",
                pairing.round
            )));
        }

        self.played.extend(pairing.pairs.iter().copied());
        if let Some(bye) = pairing.bye {
            self.bye_history.push(bye);
        }
        self.phase = RoundPhase::after(expected, self.total_rounds);
        Ok(self)
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == RoundPhase::Done
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    pub fn standings(&self) -> &Standings {
        &self.standings
    }

    pub fn played_pairs(&self) -> &PlayedPairSet {
        &self.played
    }

    pub fn bye_history(&self) -> &[PlayerId] {
        &self.bye_history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> PlayerId {
        PlayerId::new(raw)
    }

    fn pairing(round: u32, pairs: &[(u32, u32)], bye: Option<u32>) -> RoundPairing {
        RoundPairing {
            round,
            pairs: pairs.iter().map(|&(a, b)| Pair::new(id(a), id(b))).collect(),
            bye: bye.map(id),
            score: None,
            stats: FilterStats::default(),
        }
    }

    #[test]
    fn phases_advance_through_rounds() {
        let ctx = TournamentRoundContext::new(vec![id(1), id(2), id(3)], 2);
        assert_eq!(ctx.phase(), RoundPhase::NotStarted);
        assert_eq!(ctx.phase().round_number(), None);

        let ctx = ctx.begin().unwrap();
        assert_eq!(ctx.phase(), RoundPhase::FirstRound);

        let ctx = ctx.record_round(&pairing(1, &[(1, 2)], Some(3))).unwrap();
        assert_eq!(ctx.phase(), RoundPhase::SubsequentRound(2));
        assert!(ctx.played_pairs().contains(id(2), id(1)));
        assert_eq!(ctx.bye_history(), &[id(3)]);

        let ctx = ctx.record_round(&pairing(2, &[(1, 3)], Some(2))).unwrap();
        assert!(ctx.is_done());
        assert_eq!(ctx.played_pairs().len(), 2);
    }

    #[test]
    fn zero_rounds_is_done_immediately() {
        let ctx = TournamentRoundContext::new(vec![id(1), id(2)], 0).begin().unwrap();
        assert!(ctx.is_done());
    }

    #[test]
    fn begin_twice_is_rejected() {
        let ctx = TournamentRoundContext::new(vec![id(1), id(2)], 1).begin().unwrap();
        assert!(matches!(ctx.begin(), Err(PairingError::InvalidInput { .. })));
    }

    #[test]
    fn recording_wrong_round_is_rejected() {
        let ctx = TournamentRoundContext::new(vec![id(1), id(2)], 3).begin().unwrap();
        let err = ctx.record_round(&pairing(2, &[(1, 2)], None)).unwrap_err();
        assert!(matches!(err, PairingError::InvalidInput { .. }));
    }

    #[test]
    fn recording_before_start_is_rejected() {
        let ctx = TournamentRoundContext::new(vec![id(1), id(2)], 3);
        assert!(ctx.record_round(&pairing(1, &[(1, 2)], None)).is_err());
    }

    #[test]
    fn phase_serializes_with_round_number() {
        let json = serde_json::to_string(&RoundPhase::SubsequentRound(4)).unwrap();
        assert_eq!(json, r#"{"subsequent_round":4}"#);
        let json = serde_json::to_string(&RoundPhase::FirstRound).unwrap();
        assert_eq!(json, r#""first_round""#);
    }
}
