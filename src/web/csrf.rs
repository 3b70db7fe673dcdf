use rand::distr::{Alphanumeric, SampleString};
use tower_sessions::Session;

use crate::error::GraphLessonError;

const CSRF_TOKEN_KEY: &str = "csrf_token";

fn generate_token() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), 32)
}

/// Returns the session's form token, minting one on first use.
pub(crate) async fn csrf_token(session: &Session) -> Result<String, GraphLessonError> {
    if let Some(token) = session.get::<String>(CSRF_TOKEN_KEY).await? {
        return Ok(token);
    }
    let token = generate_token();
    session.insert(CSRF_TOKEN_KEY, token.clone()).await?;
    Ok(token)
}

pub(crate) async fn validate_csrf(session: &Session, token: &str) -> Result<(), GraphLessonError> {
    match session.get::<String>(CSRF_TOKEN_KEY).await? {
        Some(expected) if !token.is_empty() && expected == token => Ok(()),
        _ => Err(GraphLessonError::Unauthorized),
    }
}
