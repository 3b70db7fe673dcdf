//! Shared constants/setters for things
//!

/// Gemini model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Base URL of Google's generative language API.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Default request body limit, large enough for a phone photo of a graph.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// File extensions the upload form accepts.
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Filename offered for the lesson download.
pub const LESSON_FILENAME: &str = "lesson.md";

/// Content type of the lesson download.
pub const LESSON_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";

/// Header carrying the API key on generative language requests.
pub const X_GOOG_API_KEY: &str = "x-goog-api-key";

/// Minutes without a request before a session (and its uploaded graph) expires.
pub const SESSION_IDLE_MINUTES: i64 = 60;

/// How often expired sessions are dropped from the store.
pub const SESSION_PURGE_SECONDS: u64 = 5 * 60;
