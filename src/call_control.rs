use crate::config::AgentConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ControlError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
}

/// Live call control operations against the telephony platform. A trait so
/// the workflow can be exercised with a recorder in tests.
#[async_trait]
pub trait CallActions: Send + Sync {
    /// Place an outbound call into the conference bridge. `boss` selects the
    /// boss-specific application and is carried in the call tag. Returns the
    /// call sid assigned by the platform.
    async fn place_call(&self, boss: bool) -> Result<String, ControlError>;

    /// Whisper synthesized speech into an active call without disconnecting it.
    async fn whisper(&self, call_sid: &str, text: &str) -> Result<(), ControlError>;
}

#[derive(Debug, Deserialize)]
struct CallCreated {
    sid: String,
}

/// jambonz REST implementation of [`CallActions`].
pub struct JambonzCallControl {
    client: Client,
    base_url: String,
    account_sid: String,
    api_token: String,
    application_sid: String,
    boss_application_sid: String,
    calling_number: String,
    called_number: String,
    meeting_pin: String,
}

impl JambonzCallControl {
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
            application_sid: config.application_sid().to_string(),
            boss_application_sid: config.boss_application_sid().to_string(),
            calling_number: config.calling_number().to_string(),
            called_number: config.called_number().to_string(),
            meeting_pin: config.meeting_pin().to_string(),
        }
    }
}

#[async_trait]
impl CallActions for JambonzCallControl {
    async fn place_call(&self, boss: bool) -> Result<String, ControlError> {
        let url = format!("{}v1/Accounts/{}/Calls", self.base_url, self.account_sid);
        let application_sid = if boss {
            &self.boss_application_sid
        } else {
            &self.application_sid
        };

        let payload = json!({
            "application_sid": application_sid,
            "from": self.calling_number,
            "to": {
                "type": "phone",
                "number": self.called_number,
            },
            "tag": {
                "meetingPin": self.meeting_pin,
                "boss": boss,
            }
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
            return Err(ControlError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body: CallCreated = response.json().await?;
        Ok(body.sid)
    }

    async fn whisper(&self, call_sid: &str, text: &str) -> Result<(), ControlError> {
        let url = format!(
            "{}v1/Accounts/{}/Calls/{}",
            self.base_url, self.account_sid, call_sid
        );

        let payload = json!({
            "whisper": [
                {
                    "verb": "say",
                    "text": text,
                }
            ]
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
            return Err(ControlError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        log::info!("response to live call control whisper {}", status.as_u16());
        Ok(())
    }
}
