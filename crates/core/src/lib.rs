pub mod errors;
pub mod intake;
pub mod leaderboard;
pub mod ledger;
pub mod memory;
pub mod models;
pub mod tracking;

pub mod mock;
