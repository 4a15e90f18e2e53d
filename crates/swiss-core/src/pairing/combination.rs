use core::fmt;
use serde::{Deserialize, Serialize};

use crate::model::player::{Pair, PlayerId};

/// One complete way to pair the active players of a round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Combination {
    pairs: Vec<Pair>,
}

impl Combination {
    pub fn new(pairs: Vec<Pair>) -> Self {
        Self { pairs }
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn into_pairs(self) -> Vec<Pair> {
        self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn involves(&self, player: PlayerId) -> bool {
        self.pairs.iter().any(|pair| pair.involves(player))
    }

    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.pairs
            .iter()
            .flat_map(|pair| [pair.first, pair.second])
    }

    /// Pair keys in ascending order; identical for every ordering of the
    /// same partition.
    pub fn canonical_keys(&self) -> Vec<(PlayerId, PlayerId)> {
        let mut keys: Vec<_> = self.pairs.iter().map(|pair| pair.key()).collect();
        keys.sort_unstable();
        keys
    }
}

impl From<Vec<Pair>> for Combination {
    fn from(pairs: Vec<Pair>) -> Self {
        Self::new(pairs)
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for pair in &self.pairs {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "({}, {})", pair.first, pair.second)?;
            first = false;
        }
        Ok(())
    }
}
