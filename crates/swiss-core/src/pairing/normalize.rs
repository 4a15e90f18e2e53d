use tracing::warn;

use crate::model::player::{Pair, PlayerId};
use crate::model::standings::Standings;
use crate::pairing::combination::Combination;

/// Puts a combination into rank order: pairs sorted by their better-ranked
/// member, better-ranked member first. Membership is unchanged.
///
/// Players the standings do not know sort after all ranked players and
/// keep their relative order.
pub fn normalize(combination: &Combination, standings: &Standings) -> Combination {
    let position = |player: PlayerId| standings.position(player).unwrap_or(usize::MAX);

    let mut pairs: Vec<Pair> = combination
        .pairs()
        .iter()
        .map(|&pair| {
            if position(pair.second) < position(pair.first) {
                pair.swapped()
            } else {
                pair
            }
        })
        .collect();
    pairs.sort_by_key(|pair| position(pair.first));

    let unranked: Vec<String> = combination
        .players()
        .filter(|player| !standings.contains(*player))
        .map(|player| player.to_string())
        .collect();
    if !unranked.is_empty() {
        warn!(
            target: "swiss_core::normalize",
            players = %unranked.join(","),
            "players missing from standings were ordered last"
        );
    }

    Combination::new(pairs)
}
