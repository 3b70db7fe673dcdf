//! Per-browser-session data: the credential, the uploaded graph and the stage results.
//!
//! Everything here lives in the in-memory session store and is gone when the
//! session expires or the server restarts.

use base64::Engine;
use base64::engine::general_purpose;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tower_sessions::Session;

use crate::error::GraphLessonError;

const CREDENTIAL_KEY: &str = "credential";
const GRAPH_KEY: &str = "graph";
const STATE_KEY: &str = "lesson_state";

/// The API key the teacher typed in. Only emptiness is checked.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Returns `None` for an empty (or all-whitespace) key; the key is otherwise kept as typed.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    /// The key exactly as entered.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// An uploaded graph image. The filename is the analysis cache key.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedGraph {
    /// Name of the file as the browser sent it.
    pub filename: String,
    /// `image/png` or `image/jpeg`, from the decoded bytes.
    pub mime_type: String,
    /// The raw upload.
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
}

/// Results of the two stages for one session.
///
/// `analysis` is only ever returned for the graph named by `analyzed_filename`,
/// and `lesson` only exists after a successful generate request. The lesson is
/// not tied to a filename, so it survives a new upload until regenerated.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionState {
    analyzed_filename: Option<String>,
    analysis: Option<String>,
    lesson: Option<String>,
}

impl SessionState {
    /// True when `graph` has no cached analysis.
    pub fn needs_analysis(&self, graph: &UploadedGraph) -> bool {
        self.analysis_for(graph).is_none()
    }

    /// The cached analysis, if it belongs to `graph`.
    pub fn analysis_for(&self, graph: &UploadedGraph) -> Option<&str> {
        match self.analyzed_filename.as_deref() {
            Some(filename) if filename == graph.filename => self.analysis.as_deref(),
            _ => None,
        }
    }

    /// Drops an analysis that belongs to a different file than `graph`.
    pub fn observe_upload(&mut self, graph: &UploadedGraph) {
        if self.analyzed_filename.as_deref() != Some(graph.filename.as_str()) {
            self.analyzed_filename = None;
            self.analysis = None;
        }
    }

    /// Stores the analysis text for `graph`.
    pub fn record_analysis(&mut self, graph: &UploadedGraph, analysis: String) {
        self.analyzed_filename = Some(graph.filename.clone());
        self.analysis = Some(analysis);
    }

    /// Stores the generated lesson text.
    pub fn record_lesson(&mut self, lesson: String) {
        self.lesson = Some(lesson);
    }

    /// The last generated lesson text.
    pub fn lesson(&self) -> Option<&str> {
        self.lesson.as_deref()
    }
}

/// Stores the credential, or forgets it when `None`.
pub async fn store_credential(
    session: &Session,
    credential: Option<Credential>,
) -> Result<(), GraphLessonError> {
    match credential {
        Some(credential) => session.insert(CREDENTIAL_KEY, credential).await?,
        None => {
            session.remove::<Credential>(CREDENTIAL_KEY).await?;
        }
    }
    Ok(())
}

/// Loads the session's credential.
pub async fn load_credential(session: &Session) -> Result<Option<Credential>, GraphLessonError> {
    Ok(session.get::<Credential>(CREDENTIAL_KEY).await?)
}

/// Replaces the session's graph.
pub async fn store_graph(session: &Session, graph: &UploadedGraph) -> Result<(), GraphLessonError> {
    session.insert(GRAPH_KEY, graph).await?;
    Ok(())
}

/// Loads the session's graph.
pub async fn load_graph(session: &Session) -> Result<Option<UploadedGraph>, GraphLessonError> {
    Ok(session.get::<UploadedGraph>(GRAPH_KEY).await?)
}

/// Saves the stage results.
pub async fn store_state(session: &Session, state: &SessionState) -> Result<(), GraphLessonError> {
    session.insert(STATE_KEY, state).await?;
    Ok(())
}

/// Loads the stage results, empty for a fresh session.
pub async fn load_state(session: &Session) -> Result<SessionState, GraphLessonError> {
    Ok(session
        .get::<SessionState>(STATE_KEY)
        .await?
        .unwrap_or_default())
}

mod base64_bytes {
    use super::*;

    pub(super) fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&general_purpose::STANDARD.encode(bytes))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        general_purpose::STANDARD
            .decode(encoded)
            .map_err(serde::de::Error::custom)
    }
}
