use crate::analytics::AnalyticsHandle;
use axum::extract::ws::{Message, WebSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One inbound frame from the telephony side, reduced to what the relay
/// cares about.
#[derive(Debug)]
pub enum InboundFrame {
    /// Diagnostic text from the platform; logged, never forwarded.
    Text(String),
    /// Raw audio, forwarded verbatim.
    Audio(Vec<u8>),
}

/// Dispatch a single inbound frame. Text frames mutate nothing and forward
/// nothing; audio is handed to the analytics side, which drops it when the
/// outbound connection is not open.
pub fn handle_frame(frame: InboundFrame, analytics: &AnalyticsHandle) {
    match frame {
        InboundFrame::Text(text) => {
            log::info!("received message: {}", text);
        }
        InboundFrame::Audio(bytes) => {
            analytics.send_audio(bytes);
        }
    }
}

/// Drive one inbound audio connection to completion.
///
/// The start_request goes out before any frame is read; exactly one
/// stop_request goes out once the connection is over, whether it ended with
/// a close frame, a transport error, or a plain drop.
pub async fn run(mut socket: WebSocket, analytics: AnalyticsHandle, busy: Arc<AtomicBool>) {
    log::info!("caller connected to audio stream");
    analytics.send_start();

    while let Some(msg) = socket.recv().await {
        match msg {
            Ok(Message::Text(text)) => {
                handle_frame(InboundFrame::Text(text.as_str().to_string()), &analytics)
            }
            Ok(Message::Binary(bytes)) => {
                handle_frame(InboundFrame::Audio(bytes.to_vec()), &analytics)
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {} // ping/pong handled by axum
            Err(e) => {
                log::warn!("audio stream error: {}", e);
                break;
            }
        }
    }

    log::info!("We were dropped from conference bridge");
    analytics.send_stop();
    busy.store(false, Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::ClientCommand;
    use tokio::sync::mpsc;

    #[test]
    fn test_audio_frames_are_forwarded_verbatim() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = AnalyticsHandle::new(tx);

        let payload = vec![0x7f, 0x00, 0x12, 0x34];
        handle_frame(InboundFrame::Audio(payload.clone()), &handle);

        match rx.try_recv() {
            Ok(ClientCommand::Audio(bytes)) => assert_eq!(bytes, payload),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_text_frames_are_not_forwarded() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = AnalyticsHandle::new(tx);

        handle_frame(InboundFrame::Text("call status update".to_string()), &handle);

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_audio_before_outbound_ready_is_dropped_not_queued() {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = AnalyticsHandle::new(tx);
        drop(rx); // outbound side never came up

        // Must not panic, must not buffer anywhere.
        handle_frame(InboundFrame::Audio(vec![0u8; 320]), &handle);
        handle_frame(InboundFrame::Audio(vec![1u8; 320]), &handle);
    }
}
