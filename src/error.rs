use thiserror::Error;

pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Token exchange error: {0}")]
    Token(#[from] crate::token::TokenError),

    #[error("Analytics connection error: {0}")]
    Analytics(#[from] crate::analytics::AnalyticsError),

    #[error("Call control error: {0}")]
    CallControl(#[from] crate::call_control::ControlError),

    #[error("Messaging error: {0}")]
    Messaging(#[from] crate::messaging::MessagingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
