use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

const TOKEN_URL: &str = "https://api.symbl.ai/oauth2/token:generate";

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(rename = "accessToken")]
    access_token: String,
}

/// Exchange Symbl application credentials for a bearer token.
///
/// One shot, no retry: the process cannot do anything useful without a token,
/// so failure here is fatal to startup.
pub async fn fetch_access_token(app_id: &str, app_secret: &str) -> Result<String, TokenError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to create HTTP client");

    let payload = json!({
        "type": "application",
        "appId": app_id,
        "appSecret": app_secret,
    });

    let response = client.post(TOKEN_URL).json(&payload).send().await?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(TokenError::ApiError {
            status: status.as_u16(),
            message: error_text,
        });
    }

    let body: TokenResponse = response.json().await?;
    log::info!("obtained Symbl access token");
    Ok(body.access_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[cfg_attr(
        not(feature = "test-api"),
        ignore = "requires Symbl credentials - run with --features test-api"
    )]
    async fn test_token_exchange_live() {
        let app_id = std::env::var("APP_ID").expect("APP_ID not set");
        let app_secret = std::env::var("APP_SECRET").expect("APP_SECRET not set");

        let token = fetch_access_token(&app_id, &app_secret).await.unwrap();
        assert!(!token.is_empty());
    }
}
