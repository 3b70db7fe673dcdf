//! Error handling

use axum::response::IntoResponse;
use tracing::info;

/// definitions for the graphlesson web application.
#[derive(Debug)]
pub enum GraphLessonError {
    /// When you didn't do the right thing
    BadRequest(String),
    /// Missing or invalid CSRF token
    Unauthorized,
    /// When a requested resource is not found
    NotFound(String),
    /// When an internal server error occurs
    InternalServerError(String),
}

impl From<tower_sessions::session::Error> for GraphLessonError {
    fn from(err: tower_sessions::session::Error) -> Self {
        GraphLessonError::InternalServerError(format!("session error: {err}"))
    }
}

impl From<crate::lesson::UnknownChoice> for GraphLessonError {
    fn from(err: crate::lesson::UnknownChoice) -> Self {
        GraphLessonError::BadRequest(err.to_string())
    }
}

impl From<axum::http::Error> for GraphLessonError {
    fn from(err: axum::http::Error) -> Self {
        GraphLessonError::InternalServerError(err.to_string())
    }
}

impl From<axum::extract::multipart::MultipartError> for GraphLessonError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        GraphLessonError::BadRequest(err.body_text())
    }
}

impl IntoResponse for GraphLessonError {
    fn into_response(self) -> axum::response::Response {
        match self {
            GraphLessonError::BadRequest(reason) => {
                info!("Bad request received: {reason}");
                let mut response =
                    axum::response::Response::new(axum::body::Body::from("Bad Request"));
                *response.status_mut() = axum::http::StatusCode::BAD_REQUEST;
                response
            }
            GraphLessonError::Unauthorized => {
                info!("Unauthorized request received");
                let mut response = axum::response::Response::new(axum::body::Body::from(
                    "Unauthorized: invalid or missing session.",
                ));
                *response.status_mut() = axum::http::StatusCode::UNAUTHORIZED;
                response
            }
            GraphLessonError::NotFound(what) => {
                tracing::debug!("404 {what}");
                let mut response =
                    axum::response::Response::new(axum::body::Body::from("Not Found"));
                *response.status_mut() = axum::http::StatusCode::NOT_FOUND;
                response
            }
            GraphLessonError::InternalServerError(message) => {
                tracing::error!("Internal server error: {}", message);
                let mut response =
                    axum::response::Response::new(axum::body::Body::from("Internal server error"));
                *response.status_mut() = axum::http::StatusCode::INTERNAL_SERVER_ERROR;
                response
            }
        }
    }
}
