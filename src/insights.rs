use serde::Deserialize;

/// A decoded unit from the Symbl realtime stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insight {
    /// Running conversation summary, assembled from plain-text message parts.
    Summary(String),
    /// A recognition result the provider has marked final.
    FinalTranscript(String),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum RawEvent {
    #[serde(rename = "message_response")]
    MessageResponse {
        #[serde(default)]
        messages: Vec<RawMessage>,
    },
    #[serde(rename = "message")]
    Message { message: RecognitionMessage },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    payload: MessagePayload,
}

#[derive(Debug, Deserialize)]
struct MessagePayload {
    #[serde(rename = "contentType", default)]
    content_type: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct RecognitionMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "isFinal", default)]
    is_final: bool,
    payload: Option<RecognitionPayload>,
}

#[derive(Debug, Deserialize)]
struct RecognitionPayload {
    raw: RawRecognition,
}

#[derive(Debug, Deserialize)]
struct RawRecognition {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
}

/// Decode a raw textual payload from the analytics stream.
///
/// Undecodable payloads, unknown discriminants and non-final recognition
/// results all yield `None`; decode problems are never fatal to the session.
pub fn decode(payload: &str) -> Option<Insight> {
    let event = match serde_json::from_str::<RawEvent>(payload) {
        Ok(event) => event,
        Err(e) => {
            log::debug!("discarding undecodable analytics payload: {} ({})", e, payload);
            return None;
        }
    };

    match event {
        RawEvent::MessageResponse { messages } => {
            let text = messages
                .iter()
                .filter(|m| m.payload.content_type == "text/plain")
                .map(|m| m.payload.content.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            Some(Insight::Summary(text))
        }
        RawEvent::Message { message } => {
            if message.kind != "recognition_result" || !message.is_final {
                return None;
            }
            let transcript = message
                .payload?
                .raw
                .alternatives
                .first()
                .map(|a| a.transcript.clone())?;
            Some(Insight::FinalTranscript(transcript))
        }
        RawEvent::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recognition(is_final: bool, transcript: &str) -> String {
        json!({
            "type": "message",
            "message": {
                "type": "recognition_result",
                "isFinal": is_final,
                "payload": {
                    "raw": {
                        "alternatives": [{"transcript": transcript, "confidence": 0.92}]
                    }
                }
            }
        })
        .to_string()
    }

    #[test]
    fn test_summary_joins_plain_text_in_order() {
        let payload = json!({
            "type": "message_response",
            "messages": [
                {"payload": {"contentType": "text/plain", "content": "we should"}},
                {"payload": {"contentType": "text/html", "content": "<b>nope</b>"}},
                {"payload": {"contentType": "text/plain", "content": "ship friday"}},
            ]
        })
        .to_string();

        assert_eq!(
            decode(&payload),
            Some(Insight::Summary("we should ship friday".to_string()))
        );
    }

    #[test]
    fn test_final_transcript_uses_first_alternative() {
        let decoded = decode(&recognition(true, "hey bones repeat that"));
        assert_eq!(
            decoded,
            Some(Insight::FinalTranscript("hey bones repeat that".to_string()))
        );
    }

    #[test]
    fn test_interim_results_are_ignored() {
        assert_eq!(decode(&recognition(false, "hey bo")), None);
    }

    #[test]
    fn test_other_inner_types_are_ignored() {
        let payload = json!({
            "type": "message",
            "message": {"type": "insight_response", "isFinal": true}
        })
        .to_string();
        assert_eq!(decode(&payload), None);
    }

    #[test]
    fn test_unknown_discriminant_is_ignored() {
        let payload = json!({"type": "topic_response", "topics": []}).to_string();
        assert_eq!(decode(&payload), None);
    }

    #[test]
    fn test_garbage_is_discarded_without_panicking() {
        assert_eq!(decode("not json at all"), None);
        assert_eq!(decode("{\"halfway\":"), None);
        assert_eq!(decode("{}"), None);
    }
}
