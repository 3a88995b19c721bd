pub mod config;
pub mod error;
pub mod matching;
pub mod tables;
pub mod telemetry;
