use crate::config::AgentConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
}

/// Outbound text-message delivery, behind a trait for the same reason as
/// [`crate::call_control::CallActions`].
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_sms(&self, to: &str, text: &str) -> Result<(), MessagingError>;
}

/// jambonz REST implementation of [`Notifier`].
pub struct JambonzMessenger {
    client: Client,
    base_url: String,
    account_sid: String,
    api_token: String,
    from_number: String,
    provider: String,
}

impl JambonzMessenger {
    pub fn new(config: &AgentConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.base_url().to_string(),
            account_sid: config.account_sid().to_string(),
            api_token: config.api_token().to_string(),
            from_number: config.calling_number().to_string(),
            provider: config.messaging_partner().to_string(),
        }
    }
}

#[async_trait]
impl Notifier for JambonzMessenger {
    async fn send_sms(&self, to: &str, text: &str) -> Result<(), MessagingError> {
        let url = format!("{}v1/Accounts/{}/Messages", self.base_url, self.account_sid);

        let payload = json!({
            "from": self.from_number,
            "to": to,
            "text": text,
            "provider": self.provider,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MessagingError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        log::info!("response to send message {}", status.as_u16());
        Ok(())
    }
}
