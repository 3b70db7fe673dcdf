//! The hosted multimodal model both stages talk to.

use async_trait::async_trait;

use crate::session::{Credential, UploadedGraph};

mod gemini;

pub use gemini::GeminiClient;

/// Errors from a model call.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Provider message, or the raw body when it isn't JSON.
        message: String,
    },

    /// The prompt was refused by the provider's safety filters.
    #[error("prompt blocked: {0}")]
    Blocked(String),

    /// The reply carried no text at all.
    #[error("the model returned no text")]
    EmptyResponse,

    /// The reply body wasn't the JSON we expected.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// `(instruction, image) -> text`, or an error.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Sends one instruction together with the graph image and returns the reply text.
    async fn generate(
        &self,
        credential: &Credential,
        instruction: &str,
        graph: &UploadedGraph,
    ) -> Result<String, ModelError>;

    /// Model identifier, for logging.
    fn name(&self) -> &str;
}
