pub mod analytics;
pub mod call_control;
pub mod commands;
pub mod config;
pub mod error;
pub mod insights;
pub mod messaging;
pub mod relay;
pub mod server;
pub mod token;
pub mod workflow;

pub use error::{AgentError, Result};
