use crate::analytics::AnalyticsHandle;
use crate::relay;
use crate::workflow::Workflow;
use axum::{
    extract::{State, WebSocketUpgrade},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared state for the inbound HTTP/WS listener.
#[derive(Clone)]
pub struct AppState {
    pub analytics: AnalyticsHandle,
    pub workflow: Arc<Workflow>,
    pub relay_busy: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(analytics: AnalyticsHandle, workflow: Arc<Workflow>) -> Self {
        Self {
            analytics,
            workflow,
            relay_busy: Arc::new(AtomicBool::new(false)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/audio-stream", get(audio_stream))
        .route("/sms", post(inbound_sms))
        .with_state(state)
}

/// Inbound audio/control endpoint: one live connection at a time.
async fn audio_stream(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    if state.relay_busy.swap(true, Ordering::SeqCst) {
        log::warn!("rejecting audio stream connection: already connected");
        return StatusCode::CONFLICT.into_response();
    }

    ws.on_upgrade(move |socket| {
        relay::run(socket, state.analytics.clone(), state.relay_busy.clone())
    })
    .into_response()
}

#[derive(Debug, Deserialize)]
pub struct InboundSms {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub from: Option<String>,
}

/// Webhook for replies to outbound notifications. Acknowledges with 200
/// before any processing; decode or workflow failures never change the
/// response.
pub async fn inbound_sms(State(state): State<AppState>, body: String) -> StatusCode {
    log::info!("got incoming sms: {}", body);

    tokio::spawn(async move {
        match serde_json::from_str::<InboundSms>(&body) {
            Ok(sms) => state.workflow.handle_reply(&sms.text),
            Err(e) => log::warn!("discarding unparseable sms webhook body: {}", e),
        }
    });

    StatusCode::OK
}
