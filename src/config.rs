use secrecy::{ExposeSecret, SecretBox};
use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Environment variable {0} is set but empty")]
    EmptyValue(String),
    #[error("Environment error: {0}")]
    EnvError(#[from] env::VarError),
}

/// Everything the agent needs to talk to Symbl and jambonz, loaded once at
/// startup. Values are not validated beyond presence; a bad account sid or
/// phone number surfaces as a request failure downstream.
#[derive(Debug)]
pub struct AgentConfig {
    app_id: String,
    app_secret: SecretBox<String>,
    base_url: String,
    account_sid: String,
    api_token: SecretBox<String>,
    application_sid: String,
    boss_application_sid: String,
    calling_number: String,
    called_number: String,
    messaging_partner: String,
    meeting_pin: String,
    boss_name: String,
    boss_phone_number: String,
}

impl AgentConfig {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (for development)
        dotenvy::dotenv().ok(); // Don't error if .env doesn't exist

        Ok(Self {
            app_id: required("APP_ID")?,
            app_secret: required_secret("APP_SECRET")?,
            base_url: required("JAMBONZ_BASE_URL")?,
            account_sid: required("JAMBONZ_ACCOUNT_SID")?,
            api_token: required_secret("JAMBONZ_API_TOKEN")?,
            application_sid: required("JAMBONZ_APPLICATION_SID")?,
            boss_application_sid: required("JAMBONZ_BOSS_APPLICATION_SID")?,
            calling_number: required("JAMBONZ_CALLING_NUMBER")?,
            called_number: required("JAMBONZ_CALLED_NUMBER")?,
            messaging_partner: required("JAMBONZ_MESSAGING_PARTNER")?,
            meeting_pin: required("JAMBONZ_MEETING_PIN")?,
            boss_name: required("BOSS_NAME")?,
            boss_phone_number: required("BOSS_PHONE_NUMBER")?,
        })
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Get the Symbl app secret (use only when requesting a token)
    pub fn app_secret(&self) -> &str {
        self.app_secret.expose_secret()
    }

    /// jambonz REST base URL, trailing slash included
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn account_sid(&self) -> &str {
        &self.account_sid
    }

    /// Get the jambonz bearer token (use only when making API calls)
    pub fn api_token(&self) -> &str {
        self.api_token.expose_secret()
    }

    pub fn application_sid(&self) -> &str {
        &self.application_sid
    }

    pub fn boss_application_sid(&self) -> &str {
        &self.boss_application_sid
    }

    pub fn calling_number(&self) -> &str {
        &self.calling_number
    }

    pub fn called_number(&self) -> &str {
        &self.called_number
    }

    pub fn messaging_partner(&self) -> &str {
        &self.messaging_partner
    }

    pub fn meeting_pin(&self) -> &str {
        &self.meeting_pin
    }

    pub fn boss_name(&self) -> &str {
        &self.boss_name
    }

    pub fn boss_phone_number(&self) -> &str {
        &self.boss_phone_number
    }
}

fn required(var: &str) -> Result<String, ConfigError> {
    let value = env::var(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))?;
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyValue(var.to_string()));
    }
    Ok(value)
}

fn required_secret(var: &str) -> Result<SecretBox<String>, ConfigError> {
    Ok(SecretBox::new(Box::new(required(var)?)))
}

/// Load configuration with helpful error messages for development
pub fn load_config() -> Result<AgentConfig, ConfigError> {
    match AgentConfig::load() {
        Ok(config) => {
            log::info!("Successfully loaded agent configuration");
            Ok(config)
        }
        Err(ConfigError::MissingEnvVar(var)) => {
            log::error!("Missing required environment variable: {}", var);
            log::error!("Create a .env file in the project root with:");
            log::error!("{}=your_value_here", var);
            Err(ConfigError::MissingEnvVar(var))
        }
        Err(e) => {
            log::error!("Configuration error: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_var_is_reported_by_name() {
        let err = required("CALL_AGENT_DEFINITELY_UNSET_VAR").unwrap_err();
        match err {
            ConfigError::MissingEnvVar(var) => {
                assert_eq!(var, "CALL_AGENT_DEFINITELY_UNSET_VAR")
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
