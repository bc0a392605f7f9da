pub mod config;
pub mod error;
pub mod players;
pub mod telemetry;
pub mod text;
