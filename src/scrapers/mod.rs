pub mod metaculus; // Metaculus question API (community forecast snapshots)

pub use metaculus::MetaculusClient;
