use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::player::{Pair, PlayerId};
use crate::pairing::combination::Combination;

/// Every pair of players that has already met, regardless of seating order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayedPairSet {
    keys: BTreeSet<(PlayerId, PlayerId)>,
}

impl PlayedPairSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the pair had already been recorded.
    pub fn insert(&mut self, pair: Pair) -> bool {
        self.keys.insert(pair.key())
    }

    pub fn contains(&self, a: PlayerId, b: PlayerId) -> bool {
        self.keys.contains(&Pair::new(a, b).key())
    }

    pub fn contains_pair(&self, pair: Pair) -> bool {
        self.keys.contains(&pair.key())
    }

    /// True when no pair of the combination has been played before.
    pub fn admits(&self, combination: &Combination) -> bool {
        !combination
            .pairs()
            .iter()
            .any(|pair| self.contains_pair(*pair))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Pair> + '_ {
        self.keys.iter().map(|&(first, second)| Pair::new(first, second))
    }

    pub fn is_subset(&self, other: &PlayedPairSet) -> bool {
        self.keys.is_subset(&other.keys)
    }
}

impl Extend<Pair> for PlayedPairSet {
    fn extend<I: IntoIterator<Item = Pair>>(&mut self, iter: I) {
        for pair in iter {
            self.insert(pair);
        }
    }
}

impl FromIterator<Pair> for PlayedPairSet {
    fn from_iter<I: IntoIterator<Item = Pair>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

/// Drops combinations that pair the bye player. `None` passes everything.
pub fn filter_bye<I>(candidates: I, bye: Option<PlayerId>) -> impl Iterator<Item = Combination>
where
    I: IntoIterator<Item = Combination>,
{
    candidates
        .into_iter()
        .filter(move |combination| bye.is_none_or(|player| !combination.involves(player)))
}

/// Drops combinations that repeat a played pair.
pub fn filter_repeats<'a, I>(
    candidates: I,
    played: &'a PlayedPairSet,
) -> impl Iterator<Item = Combination> + 'a
where
    I: IntoIterator<Item = Combination>,
    I::IntoIter: 'a,
{
    candidates
        .into_iter()
        .filter(move |combination| played.admits(combination))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairing::matching::{PerfectMatchings, padded_matchings};

    fn id(raw: u32) -> PlayerId {
        PlayerId::new(raw)
    }

    fn pair(a: u32, b: u32) -> Pair {
        Pair::new(id(a), id(b))
    }

    fn all_of(count: u32) -> Vec<Combination> {
        PerfectMatchings::new((1..=count).map(PlayerId::new).collect())
            .unwrap()
            .collect()
    }

    #[test]
    fn played_pairs_are_unordered() {
        let mut played = PlayedPairSet::new();
        assert!(played.insert(pair(2, 1)));
        assert!(!played.insert(pair(1, 2)));
        assert!(played.contains(id(1), id(2)));
        assert!(played.contains(id(2), id(1)));
        assert_eq!(played.len(), 1);
    }

    #[test]
    fn repeat_filter_removes_played_pairs() {
        let played: PlayedPairSet = [pair(1, 2), pair(4, 3)].into_iter().collect();
        let remaining: Vec<Combination> = filter_repeats(all_of(4), &played).collect();
        assert_eq!(
            remaining,
            vec![
                Combination::new(vec![pair(1, 3), pair(2, 4)]),
                Combination::new(vec![pair(1, 4), pair(2, 3)]),
            ]
        );
    }

    #[test]
    fn repeat_filter_is_idempotent() {
        let played: PlayedPairSet = [pair(1, 2), pair(3, 5)].into_iter().collect();
        let once: Vec<Combination> = filter_repeats(all_of(6), &played).collect();
        let twice: Vec<Combination> = filter_repeats(once.clone(), &played).collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn repeat_filter_is_monotone() {
        let smaller: PlayedPairSet = [pair(1, 2)].into_iter().collect();
        let mut larger = smaller.clone();
        larger.extend([pair(3, 4), pair(5, 6)]);
        assert!(smaller.is_subset(&larger));

        let with_smaller = filter_repeats(all_of(6), &smaller).count();
        let with_larger = filter_repeats(all_of(6), &larger).count();
        let unfiltered = all_of(6).len();
        assert!(with_larger <= with_smaller);
        assert!(with_smaller <= unfiltered);
    }

    #[test]
    fn bye_filter_keeps_matchings_without_bye_player() {
        let players: Vec<PlayerId> = (1..=5).map(PlayerId::new).collect();
        let survivors: Vec<Combination> =
            filter_bye(padded_matchings(&players).unwrap(), Some(id(1))).collect();
        assert_eq!(survivors.len(), 3);
        for combo in &survivors {
            assert!(!combo.involves(id(1)));
            assert_eq!(combo.len(), 2);
        }
    }

    #[test]
    fn bye_filter_without_bye_passes_everything() {
        assert_eq!(filter_bye(all_of(4), None).count(), 3);
    }

    #[test]
    fn filtering_preserves_relative_order() {
        let all = all_of(6);
        let played: PlayedPairSet = [pair(2, 3)].into_iter().collect();
        let kept: Vec<Combination> = filter_repeats(all.clone(), &played).collect();
        let mut cursor = all.iter();
        for combo in &kept {
            assert!(cursor.any(|candidate| candidate == combo));
        }
    }

    #[test]
    fn serializes_as_sorted_key_list() {
        let played: PlayedPairSet = [pair(3, 1), pair(2, 1)].into_iter().collect();
        let json = serde_json::to_string(&played).unwrap();
        assert_eq!(json, "[[1,2],[1,3]]");
        let restored: PlayedPairSet = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, played);
    }
}
