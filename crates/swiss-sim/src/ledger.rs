//! In-memory record of one tournament: registered players, played
//! matches, byes and the standings table after every round.

use std::collections::HashMap;

use serde::Serialize;
use swiss_core::PlayerId;
use thiserror::Error;

use crate::match_play::MatchRecord;
use crate::standings::StandingRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ByeRecord {
    pub round: u32,
    pub player: PlayerId,
    /// Rank the player held when the bye was assigned; unset in round 1.
    pub rank: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingsSnapshot {
    pub round: u32,
    pub rows: Vec<StandingRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("player {id} is not registered")]
    UnknownPlayer { id: PlayerId },
    #[error("player '{name}' is already registered")]
    DuplicatePlayer { name: String },
    #[error("registration is closed once the tournament has started")]
    AlreadyStarted,
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    name: String,
    players: Vec<PlayerRecord>,
    index: HashMap<PlayerId, usize>,
    matches: Vec<MatchRecord>,
    byes: Vec<ByeRecord>,
    history: Vec<StandingsSnapshot>,
    started: bool,
}

impl Ledger {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Registers every name in order, assigning ids from 1.
    pub fn with_players<I, S>(name: impl Into<String>, players: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ledger = Self::new(name);
        for player in players {
            ledger.register_player(player)?;
        }
        Ok(ledger)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn register_player(&mut self, name: impl Into<String>) -> Result<PlayerId, LedgerError> {
        if self.started {
            return Err(LedgerError::AlreadyStarted);
        }
        let name = name.into();
        if self.players.iter().any(|player| player.name == name) {
            return Err(LedgerError::DuplicatePlayer { name });
        }

        let id = PlayerId::new(self.players.len() as u32 + 1);
        self.index.insert(id, self.players.len());
        self.players.push(PlayerRecord { id, name });
        Ok(id)
    }

    /// Closes registration.
    pub fn start(&mut self) {
        self.started = true;
    }

    pub fn players(&self) -> &[PlayerRecord] {
        &self.players
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|player| player.id).collect()
    }

    pub fn player_name(&self, id: PlayerId) -> Result<&str, LedgerError> {
        self.index
            .get(&id)
            .map(|&slot| self.players[slot].name.as_str())
            .ok_or(LedgerError::UnknownPlayer { id })
    }

    fn ensure_registered(&self, id: PlayerId) -> Result<(), LedgerError> {
        if self.index.contains_key(&id) {
            Ok(())
        } else {
            Err(LedgerError::UnknownPlayer { id })
        }
    }

    pub fn record_match(&mut self, record: MatchRecord) -> Result<(), LedgerError> {
        self.ensure_registered(record.player1)?;
        self.ensure_registered(record.player2)?;
        self.matches.push(record);
        Ok(())
    }

    pub fn record_bye(
        &mut self,
        round: u32,
        player: PlayerId,
        rank: Option<u32>,
    ) -> Result<(), LedgerError> {
        self.ensure_registered(player)?;
        self.byes.push(ByeRecord {
            round,
            player,
            rank,
        });
        Ok(())
    }

    pub fn record_standings(&mut self, round: u32, rows: Vec<StandingRow>) {
        self.history.push(StandingsSnapshot { round, rows });
    }

    pub fn matches(&self) -> &[MatchRecord] {
        &self.matches
    }

    pub fn round_matches(&self, round: u32) -> impl Iterator<Item = &MatchRecord> + '_ {
        self.matches.iter().filter(move |record| record.round == round)
    }

    pub fn byes(&self) -> &[ByeRecord] {
        &self.byes
    }

    pub fn round_bye(&self, round: u32) -> Option<&ByeRecord> {
        self.byes.iter().find(|bye| bye.round == round)
    }

    pub fn history(&self) -> &[StandingsSnapshot] {
        &self.history
    }

    pub fn latest_standings(&self) -> Option<&StandingsSnapshot> {
        self.history.last()
    }

    /// Drops every match, bye and snapshot recorded for `round` or later.
    pub fn rewind_to(&mut self, round: u32) {
        self.matches.retain(|record| record.round < round);
        self.byes.retain(|bye| bye.round < round);
        self.history.retain(|snapshot| snapshot.round < round);
    }
}
