use crate::commands;
use crate::insights::{self, Insight};
use crate::workflow::Workflow;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{client::IntoClientRequest, protocol::Message},
};
use url::Url;

const REALTIME_URL: &str = "wss://api.symbl.ai/v1/realtime/insights";

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("WebSocket connection failed: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("Invalid access token: {0}")]
    InvalidToken(#[from] http::header::InvalidHeaderValue),
}

/// Parameters for the start_request directive that configures the realtime
/// transcription session.
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    pub insight_types: Vec<String>,
    pub confidence_threshold: f64,
    /// Offset from UTC in minutes.
    pub timezone_offset: i32,
    pub language_code: String,
    pub encoding: String,
    pub sample_rate_hertz: u32,
    pub meeting_title: String,
    pub speaker_user_id: String,
    pub speaker_name: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            insight_types: vec!["question".to_string(), "action_item".to_string()],
            confidence_threshold: 0.5,
            timezone_offset: 240,
            language_code: "en-US".to_string(),
            encoding: "LINEAR16".to_string(),
            sample_rate_hertz: 8000,
            meeting_title: "Team meeting".to_string(),
            speaker_user_id: "daveh@drachtio.org".to_string(),
            speaker_name: "daveh".to_string(),
        }
    }
}

/// Directives the relay can issue toward the analytics connection.
#[derive(Debug)]
pub enum ClientCommand {
    /// Send the start_request directive. Must precede any audio.
    Start,
    /// Raw audio bytes, forwarded verbatim.
    Audio(Vec<u8>),
    /// Send the stop_request directive.
    Stop,
}

/// Cloneable sender half of the analytics connection. Once the connection is
/// gone, sends fail and the payload is dropped; nothing is ever buffered for
/// a dead or not-yet-open connection.
#[derive(Clone)]
pub struct AnalyticsHandle {
    tx: mpsc::UnboundedSender<ClientCommand>,
}

impl AnalyticsHandle {
    pub fn new(tx: mpsc::UnboundedSender<ClientCommand>) -> Self {
        Self { tx }
    }

    pub fn send_start(&self) -> bool {
        let ok = self.tx.send(ClientCommand::Start).is_ok();
        if !ok {
            log::warn!("analytics connection gone, start_request not sent");
        }
        ok
    }

    /// Forward one binary audio frame. Returns false when the frame was
    /// dropped because the connection is no longer open.
    pub fn send_audio(&self, bytes: Vec<u8>) -> bool {
        let ok = self.tx.send(ClientCommand::Audio(bytes)).is_ok();
        if !ok {
            log::debug!("analytics connection gone, dropping audio frame");
        }
        ok
    }

    pub fn send_stop(&self) -> bool {
        let ok = self.tx.send(ClientCommand::Stop).is_ok();
        if !ok {
            log::warn!("analytics connection gone, stop_request not sent");
        }
        ok
    }
}

/// A live analytics connection: the handle for outbound directives plus a
/// signal that resolves when the provider closes the socket (terminal for
/// the whole process).
pub struct AnalyticsConnection {
    pub handle: AnalyticsHandle,
    pub closed: oneshot::Receiver<()>,
}

/// Connect to the realtime insights endpoint and spawn the writer and reader
/// tasks. Final transcripts coming back are matched against the command
/// grammar and dispatched into the workflow.
pub async fn connect(
    access_token: &str,
    config: AnalyticsConfig,
    workflow: Arc<Workflow>,
) -> Result<AnalyticsConnection, AnalyticsError> {
    let url = Url::parse(&format!("{}/{}", REALTIME_URL, workflow.meeting_id()))?;

    let mut request = url.as_str().into_client_request()?;
    request
        .headers_mut()
        .insert("X-API-KEY", http::HeaderValue::from_str(access_token)?);

    let (ws_stream, _) = connect_async(request).await?;
    log::info!("successfully connected to symbl");
    let (mut write, mut read) = ws_stream.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<ClientCommand>();
    let start_payload = start_request_json(&config).to_string();

    // Writer: single consumer of the command channel, preserves ordering.
    tokio::spawn(async move {
        while let Some(command) = rx.recv().await {
            let message = match command {
                ClientCommand::Start => {
                    log::info!("sending start_request to analytics stream");
                    Message::Text(start_payload.clone().into())
                }
                ClientCommand::Audio(bytes) => Message::Binary(bytes.into()),
                ClientCommand::Stop => {
                    log::info!("sending stop_request to analytics stream");
                    Message::Text(json!({"type": "stop_request"}).to_string().into())
                }
            };
            if let Err(e) = write.send(message).await {
                log::warn!("failed to send to analytics stream: {}", e);
                break;
            }
        }
        let _ = write.close().await;
    });

    let (closed_tx, closed_rx) = oneshot::channel();

    // Reader: decode each text frame and drive the workflow.
    tokio::spawn(async move {
        while let Some(msg) = read.next().await {
            match msg {
                Ok(Message::Text(text)) => handle_payload(text.as_str(), &workflow),
                Ok(Message::Binary(data)) => {
                    log::debug!("ignoring {} binary bytes from analytics stream", data.len());
                }
                Ok(Message::Close(frame)) => {
                    log::info!("analytics stream closed by server: {:?}", frame);
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    log::error!("analytics stream error: {}", e);
                    break;
                }
            }
        }
        let _ = closed_tx.send(());
    });

    Ok(AnalyticsConnection {
        handle: AnalyticsHandle::new(tx),
        closed: closed_rx,
    })
}

fn handle_payload(payload: &str, workflow: &Workflow) {
    match insights::decode(payload) {
        Some(Insight::Summary(text)) => log::info!("got message: {}", text),
        Some(Insight::FinalTranscript(transcript)) => {
            log::info!("got final transcript: {}", transcript);
            if let Some(command) = commands::recognize(&transcript, workflow.boss_name()) {
                log::info!("recognized command: {:?}", command);
                workflow.dispatch(command);
            }
        }
        None => {}
    }
}

fn start_request_json(config: &AnalyticsConfig) -> serde_json::Value {
    json!({
        "type": "start_request",
        "insightTypes": config.insight_types,
        "config": {
            "confidenceThreshold": config.confidence_threshold,
            "timezoneOffset": config.timezone_offset,
            "languageCode": config.language_code,
            "speechRecognition": {
                "encoding": config.encoding,
                "sampleRateHertz": config.sample_rate_hertz,
            },
            "meetingTitle": config.meeting_title,
        },
        "speaker": {
            "userId": config.speaker_user_id,
            "name": config.speaker_name,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.confidence_threshold, 0.5);
        assert_eq!(config.language_code, "en-US");
        assert_eq!(config.encoding, "LINEAR16");
        assert_eq!(config.sample_rate_hertz, 8000);
        assert_eq!(config.insight_types, vec!["question", "action_item"]);
    }

    #[test]
    fn test_start_request_shape() {
        let value = start_request_json(&AnalyticsConfig::default());
        assert_eq!(value["type"], "start_request");
        assert_eq!(value["config"]["confidenceThreshold"], 0.5);
        assert_eq!(value["config"]["speechRecognition"]["encoding"], "LINEAR16");
        assert_eq!(value["config"]["speechRecognition"]["sampleRateHertz"], 8000);
        assert_eq!(value["speaker"]["name"], "daveh");
    }

    #[test]
    fn test_send_audio_reports_drop_after_close() {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = AnalyticsHandle::new(tx);
        assert!(handle.send_audio(vec![0u8; 160]));

        drop(rx);
        assert!(!handle.send_audio(vec![0u8; 160]));
        assert!(!handle.send_start());
        assert!(!handle.send_stop());
    }

    #[test]
    fn test_commands_are_ordered_on_the_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = AnalyticsHandle::new(tx);
        handle.send_start();
        handle.send_audio(vec![1, 2, 3]);
        handle.send_stop();

        assert!(matches!(rx.try_recv(), Ok(ClientCommand::Start)));
        match rx.try_recv() {
            Ok(ClientCommand::Audio(bytes)) => assert_eq!(bytes, vec![1, 2, 3]),
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(matches!(rx.try_recv(), Ok(ClientCommand::Stop)));
    }
}
