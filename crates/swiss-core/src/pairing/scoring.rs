use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::player::PlayerId;
use crate::model::standings::Standings;
use crate::pairing::combination::Combination;

/// How to choose between combinations with the same score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Keep the first minimum in enumeration order. That order follows the
    /// roster order handed to the generator and carries no ranking meaning.
    #[default]
    FirstFound,
    /// Keep the combination whose sorted pair keys compare lowest.
    Lexicographic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredCombination {
    pub combination: Combination,
    pub score: u64,
    /// Players the standings had no rank for; they were scored as rank 0.
    pub missing: Vec<PlayerId>,
}

/// Sum of squared rank differences over every pair.
pub fn score(combination: Combination, standings: &Standings) -> ScoredCombination {
    let mut total = 0u64;
    let mut missing = Vec::new();
    let mut rank_of = |player: PlayerId| -> i64 {
        match standings.rank(player) {
            Some(rank) => i64::from(rank),
            None => {
                missing.push(player);
                0
            }
        }
    };

    for pair in combination.pairs() {
        let diff = rank_of(pair.first) - rank_of(pair.second);
        total = total.saturating_add(diff.unsigned_abs().saturating_mul(diff.unsigned_abs()));
    }

    ScoredCombination {
        combination,
        score: total,
        missing,
    }
}

/// Lowest-scoring candidate, or `None` when there are no candidates.
pub fn select_best<I>(
    candidates: I,
    standings: &Standings,
    tie_break: TieBreak,
) -> Option<ScoredCombination>
where
    I: IntoIterator<Item = Combination>,
{
    let mut best: Option<ScoredCombination> = None;
    let mut missing: BTreeSet<PlayerId> = BTreeSet::new();

    for candidate in candidates {
        let scored = score(candidate, standings);
        missing.extend(scored.missing.iter().copied());

        let replace = match best.as_ref() {
            None => true,
            Some(current) if scored.score < current.score => true,
            Some(current) if scored.score == current.score => {
                tie_break == TieBreak::Lexicographic
                    && scored.combination.canonical_keys() < current.combination.canonical_keys()
            }
            Some(_) => false,
        };

        if replace {
            best = Some(scored);
        }
    }

    if !missing.is_empty() {
        let players = missing
            .iter()
            .map(|player| player.to_string())
            .collect::<Vec<_>>()
            .join(",");
        warn!(
            target: "swiss_core::scoring",
            players = %players,
            "players missing from standings were scored with rank 0"
        );
    }

    best
}
