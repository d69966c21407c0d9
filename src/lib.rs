pub mod args;
pub mod clean;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod util;
