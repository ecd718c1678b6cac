pub mod apis;
pub mod config;
pub mod constants;
pub mod error;
pub mod infra;
pub mod logging;
pub mod payload;
pub mod pipeline;
pub mod types;
