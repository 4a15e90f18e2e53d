use std::cmp::{Ordering, Reverse};
use std::collections::HashMap;

use serde::Serialize;
use swiss_core::{PlayerId, PlayerRef, Standings};

use crate::config::ScoringConfig;
use crate::ledger::Ledger;

/// One line of the standings table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingRow {
    /// Unique position, 1-based.
    pub rank: u32,
    /// Shared by every player level on points and opponent points.
    pub actual_rank: u32,
    pub id: PlayerId,
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points: u32,
    pub opponent_points: u32,
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    wins: u32,
    losses: u32,
    ties: u32,
}

impl Tally {
    fn points(&self, scoring: &ScoringConfig) -> u32 {
        self.wins
            .saturating_mul(scoring.win)
            .saturating_add(self.ties.saturating_mul(scoring.tie))
            .saturating_add(self.losses.saturating_mul(scoring.loss))
    }
}

/// Aggregates every recorded match into a ranked table. Byes add nothing.
///
/// Order: points, then opponent points (the sum of current points of every
/// opponent faced), then wins, all descending; player id breaks what is left.
pub fn compute(ledger: &Ledger, scoring: &ScoringConfig) -> Vec<StandingRow> {
    let mut tallies: HashMap<PlayerId, Tally> = ledger
        .players()
        .iter()
        .map(|player| (player.id, Tally::default()))
        .collect();

    for record in ledger.matches() {
        match (record.winner(), record.loser()) {
            (Some(winner), Some(loser)) => {
                tallies.entry(winner).or_default().wins += 1;
                tallies.entry(loser).or_default().losses += 1;
            }
            _ => {
                tallies.entry(record.player1).or_default().ties += 1;
                tallies.entry(record.player2).or_default().ties += 1;
            }
        }
    }

    let points: HashMap<PlayerId, u32> = tallies
        .iter()
        .map(|(id, tally)| (*id, tally.points(scoring)))
        .collect();

    let mut opponent_points: HashMap<PlayerId, u32> = HashMap::new();
    for record in ledger.matches() {
        for (player, opponent) in [
            (record.player1, record.player2),
            (record.player2, record.player1),
        ] {
            let total = opponent_points.entry(player).or_default();
            *total = total.saturating_add(points.get(&opponent).copied().unwrap_or(0));
        }
    }

    let mut rows: Vec<StandingRow> = ledger
        .players()
        .iter()
        .map(|player| {
            let tally = tallies.get(&player.id).copied().unwrap_or_default();
            StandingRow {
                rank: 0,
                actual_rank: 0,
                id: player.id,
                name: player.name.clone(),
                wins: tally.wins,
                losses: tally.losses,
                ties: tally.ties,
                points: tally.points(scoring),
                opponent_points: opponent_points.get(&player.id).copied().unwrap_or(0),
            }
        })
        .collect();

    rows.sort_by(compare_rows);

    let mut previous: Option<(u32, u32, u32)> = None;
    for (position, row) in rows.iter_mut().enumerate() {
        row.rank = position as u32 + 1;
        row.actual_rank = match previous {
            Some((points, opp, shared)) if points == row.points && opp == row.opponent_points => {
                shared
            }
            _ => row.rank,
        };
        previous = Some((row.points, row.opponent_points, row.actual_rank));
    }

    rows
}

fn compare_rows(a: &StandingRow, b: &StandingRow) -> Ordering {
    let key = |row: &StandingRow| {
        (
            Reverse(row.points),
            Reverse(row.opponent_points),
            Reverse(row.wins),
            row.id,
        )
    };
    key(a).cmp(&key(b))
}

/// Engine view of the table: unique rank per player in table order.
pub fn to_engine_standings(rows: &[StandingRow]) -> Standings {
    Standings::new(rows.iter().map(|row| PlayerRef::new(row.id, row.rank)))
}
