pub mod config;
pub mod constants;
pub mod error;
pub mod pipeline;
pub mod types;

// Layered boundaries for application and infrastructure
pub mod app;
pub mod infra;

pub mod observability;

pub use config::Config;
pub use error::{Result, RiskError};
pub use pipeline::{MapView, Pipeline, RunContext};
