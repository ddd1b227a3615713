pub mod config;
pub mod error;
pub mod media_models;
pub mod snapshot;
pub mod state;
