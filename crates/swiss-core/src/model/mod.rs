pub mod player;
pub mod standings;

pub use player::{Pair, PlayerId, PlayerRef};
pub use standings::Standings;
