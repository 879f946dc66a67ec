pub mod kv;
pub mod leaderboard;
pub mod profile;
