use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::player::{PlayerId, PlayerRef};

/// Current rank order as consumed by the pairing engine.
///
/// Entries are kept sorted by rank (1 = best). Entries sharing a rank keep
/// the order they were supplied in, so callers control tie order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PlayerRef>", into = "Vec<PlayerRef>")]
pub struct Standings {
    entries: Vec<PlayerRef>,
    positions: HashMap<PlayerId, usize>,
}

impl Standings {
    pub fn new(entries: impl IntoIterator<Item = PlayerRef>) -> Self {
        let mut entries: Vec<PlayerRef> = entries.into_iter().collect();
        entries.sort_by_key(|entry| entry.rank);
        let positions = entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.id, position))
            .collect();
        Self { entries, positions }
    }

    /// Standings where players are ranked in the given order.
    pub fn from_order(order: &[PlayerId]) -> Self {
        Self::new(
            order
                .iter()
                .enumerate()
                .map(|(idx, id)| PlayerRef::new(*id, idx as u32 + 1)),
        )
    }

    pub fn entries(&self) -> &[PlayerRef] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn rank(&self, player: PlayerId) -> Option<u32> {
        self.positions
            .get(&player)
            .map(|&position| self.entries[position].rank)
    }

    /// Index of the player in rank order.
    pub fn position(&self, player: PlayerId) -> Option<usize> {
        self.positions.get(&player).copied()
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.positions.contains_key(&player)
    }

    /// Highest-ranked player without a prior bye.
    ///
    /// Once every ranked player has had a bye, falls back to the
    /// highest-ranked player among those with the fewest byes.
    pub fn bye_candidate(&self, bye_history: &[PlayerId]) -> Option<PlayerId> {
        let mut counts: HashMap<PlayerId, usize> = HashMap::new();
        for player in bye_history {
            *counts.entry(*player).or_insert(0) += 1;
        }

        self.entries
            .iter()
            .enumerate()
            .min_by_key(|(position, entry)| {
                (counts.get(&entry.id).copied().unwrap_or(0), *position)
            })
            .map(|(_, entry)| entry.id)
    }
}

impl From<Vec<PlayerRef>> for Standings {
    fn from(entries: Vec<PlayerRef>) -> Self {
        Self::new(entries)
    }
}

impl From<Standings> for Vec<PlayerRef> {
    fn from(standings: Standings) -> Self {
        standings.entries
    }
}
