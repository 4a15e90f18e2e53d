use std::collections::HashSet;

use crate::model::player::{Pair, PlayerId};
use crate::pairing::PairingError;
use crate::pairing::combination::Combination;

/// `k!!`, saturating at `u64::MAX`. `0!!` and `1!!` are 1.
pub fn double_factorial(k: usize) -> u64 {
    let mut product = 1u64;
    let mut factor = k as u64;
    while factor > 1 {
        product = product.saturating_mul(factor);
        factor -= 2;
    }
    product
}

/// Number of combinations [`padded_matchings`] yields for `players` ids.
pub fn matching_count(players: usize) -> u64 {
    match players {
        0 => 1,
        n if n % 2 == 0 => double_factorial(n - 1),
        n => double_factorial(n),
    }
}

/// Enumerates partitions of a slice into pairs.
///
/// Each combination is addressed by one digit per level: level `k` pairs the
/// first still-unpaired element with the `digits[k]`-th of the remaining
/// ones. Counting through the digits like an odometer (last level fastest)
/// visits partitions in the same order as the recursive "fix the first
/// element, try every partner" enumeration.
#[derive(Debug, Clone)]
struct PairingOdometer<T> {
    elements: Vec<T>,
    digits: Vec<usize>,
    remaining: u64,
}

impl<T: Copy> PairingOdometer<T> {
    fn new(elements: Vec<T>) -> Self {
        let levels = elements.len() / 2;
        let remaining = matching_count(elements.len());
        Self {
            elements,
            digits: vec![0; levels],
            remaining,
        }
    }

    fn next_pairs(&mut self) -> Option<Vec<(T, T)>> {
        if self.remaining == 0 {
            return None;
        }

        let mut pool = self.elements.clone();
        let mut pairs = Vec::with_capacity(self.digits.len());
        for &digit in &self.digits {
            let first = pool.remove(0);
            let second = pool.remove(digit);
            pairs.push((first, second));
        }

        self.remaining -= 1;
        if self.remaining > 0 {
            self.advance();
        }
        Some(pairs)
    }

    fn advance(&mut self) {
        let n = self.elements.len();
        for level in (0..self.digits.len()).rev() {
            let radix = n - 1 - 2 * level;
            if self.digits[level] + 1 < radix {
                self.digits[level] += 1;
                return;
            }
            self.digits[level] = 0;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining) {
            Ok(remaining) => (remaining, Some(remaining)),
            Err(_) => (usize::MAX, None),
        }
    }
}

fn ensure_distinct(ids: &[PlayerId]) -> Result<(), PairingError> {
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(*id) {
            return Err(PairingError::invalid(format!(
                "player {id} appears more than once"
            )));
        }
    }
    Ok(())
}

/// Every perfect matching of an even-sized id set, each exactly once.
///
/// Restartable: clone the iterator before consuming it to enumerate again.
#[derive(Debug, Clone)]
pub struct PerfectMatchings {
    inner: PairingOdometer<PlayerId>,
}

impl PerfectMatchings {
    pub fn new(ids: Vec<PlayerId>) -> Result<Self, PairingError> {
        if ids.len() % 2 != 0 {
            return Err(PairingError::invalid(format!(
                "cannot pair an odd number of players ({}) without a placeholder",
                ids.len()
            )));
        }
        ensure_distinct(&ids)?;
        Ok(Self {
            inner: PairingOdometer::new(ids),
        })
    }

    pub fn remaining(&self) -> u64 {
        self.inner.remaining
    }
}

impl Iterator for PerfectMatchings {
    type Item = Combination;

    fn next(&mut self) -> Option<Self::Item> {
        let pairs = self.inner.next_pairs()?;
        Some(Combination::new(
            pairs
                .into_iter()
                .map(|(first, second)| Pair::new(first, second))
                .collect(),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Matchings of a set of any size. For odd sizes a placeholder stands in
/// for the missing opponent and its pair is removed from every combination,
/// leaving the one real player it was matched with unpaired.
#[derive(Debug, Clone)]
pub struct PaddedMatchings {
    inner: PairingOdometer<Option<PlayerId>>,
}

impl PaddedMatchings {
    pub fn remaining(&self) -> u64 {
        self.inner.remaining
    }
}

impl Iterator for PaddedMatchings {
    type Item = Combination;

    fn next(&mut self) -> Option<Self::Item> {
        let pairs = self.inner.next_pairs()?;
        Some(Combination::new(
            pairs
                .into_iter()
                .filter_map(|(first, second)| Some(Pair::new(first?, second?)))
                .collect(),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

pub fn padded_matchings(ids: &[PlayerId]) -> Result<PaddedMatchings, PairingError> {
    ensure_distinct(ids)?;
    let mut elements: Vec<Option<PlayerId>> = ids.iter().copied().map(Some).collect();
    if elements.len() % 2 != 0 {
        elements.push(None);
    }
    Ok(PaddedMatchings {
        inner: PairingOdometer::new(elements),
    })
}
