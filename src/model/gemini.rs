//! Gemini `generateContent` client.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ModelError, VisionModel};
use crate::constants::X_GOOG_API_KEY;
use crate::session::{Credential, UploadedGraph};

/// Talks to one Gemini model through the generative language REST API.
#[derive(Clone, Debug)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_base: String,
    model: String,
}

impl GeminiClient {
    /// Builds a client for `model` under `api_base` (eg `https://generativelanguage.googleapis.com`).
    pub fn new(api_base: &str, model: &str) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }
}

#[async_trait]
impl VisionModel for GeminiClient {
    async fn generate(
        &self,
        credential: &Credential,
        instruction: &str,
        graph: &UploadedGraph,
    ) -> Result<String, ModelError> {
        let body = GenerateContentRequest::new(instruction, graph);

        let response = self
            .client
            .post(self.endpoint())
            .header(X_GOOG_API_KEY, credential.expose())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        debug!(
            "generateContent returned {status} ({} bytes) from {}",
            bytes.len(),
            self.model
        );
        if !status.is_success() {
            return Err(ModelError::Api {
                status: status.as_u16(),
                message: error_message(&bytes),
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_slice(&bytes)?;
        parsed.into_text()
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

impl GenerateContentRequest {
    fn new(instruction: &str, graph: &UploadedGraph) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![
                    RequestPart::Text {
                        text: instruction.to_string(),
                    },
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: graph.mime_type.clone(),
                            data: general_purpose::STANDARD.encode(&graph.bytes),
                        },
                    },
                ],
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Joins the text parts of the first candidate.
    fn into_text(self) -> Result<String, ModelError> {
        if let Some(reason) = self.prompt_feedback.and_then(|feedback| feedback.block_reason) {
            return Err(ModelError::Blocked(reason));
        }
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or(ModelError::EmptyResponse)?;
        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        if text.is_empty() {
            return match candidate.finish_reason {
                Some(reason) if reason != "STOP" => Err(ModelError::Blocked(reason)),
                _ => Err(ModelError::EmptyResponse),
            };
        }
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Pulls `error.message` out of an error body, falling back to the raw text.
fn error_message(bytes: &[u8]) -> String {
    match serde_json::from_slice::<ErrorEnvelope>(bytes) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
        _ => String::from_utf8_lossy(bytes).trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::Json;
    use axum::Router;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    fn graph() -> UploadedGraph {
        UploadedGraph {
            filename: "graph.png".to_string(),
            mime_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    #[derive(Clone, Default)]
    struct Seen {
        requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    }

    /// Serves `reply` on the generateContent path of a local listener and
    /// returns its base URL.
    async fn fake_api(status: StatusCode, reply: Value, seen: Seen) -> String {
        let app = Router::new()
            .route(
                "/v1beta/models/{call}",
                axum::routing::post(
                    move |State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>| {
                        let reply = reply.clone();
                        async move {
                            let key = headers
                                .get(X_GOOG_API_KEY)
                                .and_then(|value| value.to_str().ok())
                                .map(str::to_owned);
                            seen.requests.lock().expect("lock").push((key, body));
                            (status, Json(reply))
                        }
                    },
                ),
            )
            .with_state(seen);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake api");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}/")
    }

    #[test]
    fn request_carries_instruction_then_image() {
        let body = serde_json::to_value(GenerateContentRequest::new("נתח", &graph()))
            .expect("serialize request");
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "parts": [
                        {"text": "נתח"},
                        {"inline_data": {"mime_type": "image/png", "data": "AQID"}}
                    ]
                }]
            })
        );
    }

    #[test]
    fn text_parts_are_joined() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"parts": [{"text": "- כותרת"}, {"text": "\n- צירים"}], "role": "model"},
                "finishReason": "STOP"
            }]
        }))
        .expect("parse response");
        assert_eq!(response.into_text().expect("text"), "- כותרת\n- צירים");
    }

    #[test]
    fn blocked_prompts_are_errors() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .expect("parse response");
        assert!(matches!(response.into_text(), Err(ModelError::Blocked(reason)) if reason == "SAFETY"));

        let response: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": []})).expect("parse response");
        assert!(matches!(response.into_text(), Err(ModelError::EmptyResponse)));
    }

    #[test]
    fn error_message_prefers_provider_text() {
        let body = br#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(error_message(body), "API key not valid.");
        assert_eq!(error_message(b" upstream down \n"), "upstream down");
    }

    #[tokio::test]
    async fn generate_posts_to_the_model_endpoint() {
        let seen = Seen::default();
        let base = fake_api(
            StatusCode::OK,
            json!({"candidates": [{"content": {"parts": [{"text": "ניתוח"}]}}]}),
            seen.clone(),
        )
        .await;
        let client = GeminiClient::new(&base, "gemini-1.5-flash").expect("client");
        let credential = Credential::new("test-key").expect("credential");

        let text = client
            .generate(&credential, "נתח את הגרף", &graph())
            .await
            .expect("generate");

        assert_eq!(text, "ניתוח");
        assert_eq!(client.name(), "gemini-1.5-flash");
        let requests = seen.requests.lock().expect("lock").clone();
        assert_eq!(requests.len(), 1);
        let (key, body) = &requests[0];
        assert_eq!(key.as_deref(), Some("test-key"));
        assert_eq!(body["contents"][0]["parts"][0]["text"], "נתח את הגרף");
        assert_eq!(
            body["contents"][0]["parts"][1]["inline_data"]["data"],
            "AQID"
        );
    }

    #[tokio::test]
    async fn api_errors_surface_status_and_message() {
        let base = fake_api(
            StatusCode::BAD_REQUEST,
            json!({"error": {"code": 400, "message": "API key not valid."}}),
            Seen::default(),
        )
        .await;
        let client = GeminiClient::new(&base, "gemini-1.5-flash").expect("client");
        let credential = Credential::new("bad-key").expect("credential");

        let err = client
            .generate(&credential, "נתח", &graph())
            .await
            .expect_err("api error");
        assert_eq!(err.to_string(), "API error 400: API key not valid.");
    }
}
