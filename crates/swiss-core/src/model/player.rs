use core::fmt;
use serde::{Deserialize, Serialize};

/// Opaque tournament player identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(u32);

impl PlayerId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for PlayerId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// A player as seen by the pairing engine for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerRef {
    pub id: PlayerId,
    pub rank: u32,
}

impl PlayerRef {
    pub const fn new(id: PlayerId, rank: u32) -> Self {
        Self { id, rank }
    }
}

/// Two distinct players meeting in one match.
///
/// Equality is positional; use [`Pair::key`] when the pair must be treated
/// as unordered (played-pair bookkeeping). After normalization `first` is
/// the higher-ranked player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair {
    pub first: PlayerId,
    pub second: PlayerId,
}

impl Pair {
    pub const fn new(first: PlayerId, second: PlayerId) -> Self {
        Self { first, second }
    }

    /// Order-independent identity of the pair.
    pub fn key(self) -> (PlayerId, PlayerId) {
        if self.first <= self.second {
            (self.first, self.second)
        } else {
            (self.second, self.first)
        }
    }

    pub fn involves(self, player: PlayerId) -> bool {
        self.first == player || self.second == player
    }

    pub const fn swapped(self) -> Self {
        Self {
            first: self.second,
            second: self.first,
        }
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {}", self.first, self.second)
    }
}

#[cfg(test)]
mod tests {
    use super::{Pair, PlayerId};

    fn id(raw: u32) -> PlayerId {
        PlayerId::new(raw)
    }

    #[test]
    fn key_is_order_independent() {
        let forward = Pair::new(id(3), id(7));
        let backward = Pair::new(id(7), id(3));
        assert_eq!(forward.key(), backward.key());
        assert_ne!(forward, backward);
    }

    #[test]
    fn involves_checks_both_members() {
        let pair = Pair::new(id(1), id(2));
        assert!(pair.involves(id(1)));
        assert!(pair.involves(id(2)));
        assert!(!pair.involves(id(3)));
    }

    #[test]
    fn swapped_reverses_order() {
        let pair = Pair::new(id(1), id(2));
        assert_eq!(pair.swapped(), Pair::new(id(2), id(1)));
        assert_eq!(pair.swapped().swapped(), pair);
    }

    #[test]
    fn player_id_serializes_transparently() {
        let json = serde_json::to_string(&id(42)).unwrap();
        assert_eq!(json, "42");
        let pair: Pair = serde_json::from_str(r#"{"first":1,"second":2}"#).unwrap();
        assert_eq!(pair, Pair::new(id(1), id(2)));
    }
}
