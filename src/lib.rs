pub mod cache;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod runner;
pub mod sources;
pub mod state;
pub mod types;
