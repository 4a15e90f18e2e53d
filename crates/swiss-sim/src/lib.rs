//! Swiss tournament simulator built on `swiss-core`: YAML configuration,
//! in-memory ledger, standings, random match outcomes and reports.

pub mod config;
pub mod ledger;
pub mod logging;
pub mod match_play;
pub mod report;
pub mod standings;
pub mod tournament;
