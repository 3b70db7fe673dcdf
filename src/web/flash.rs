use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::error::GraphLessonError;

const FLASH_KEY: &str = "flash";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum FlashClass {
    Success,
    Warning,
    Error,
}

/// A one-line notice shown above the page content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct FlashMessage {
    pub(crate) text: String,
    pub(crate) class: FlashClass,
}

impl FlashMessage {
    pub(crate) fn new(class: FlashClass, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            class,
        }
    }

    pub(crate) fn css_class(&self) -> &'static str {
        match self.class {
            FlashClass::Success => "success",
            FlashClass::Warning => "warning",
            FlashClass::Error => "error",
        }
    }
}

/// Queues a message for the next page render.
pub(crate) async fn push_flash(
    session: &Session,
    message: FlashMessage,
) -> Result<(), GraphLessonError> {
    let mut queued = session
        .get::<Vec<FlashMessage>>(FLASH_KEY)
        .await?
        .unwrap_or_default();
    queued.push(message);
    session.insert(FLASH_KEY, queued).await?;
    Ok(())
}

/// Removes and returns the queued messages.
pub(crate) async fn take_flash_messages(
    session: &Session,
) -> Result<Vec<FlashMessage>, GraphLessonError> {
    Ok(session
        .remove::<Vec<FlashMessage>>(FLASH_KEY)
        .await?
        .unwrap_or_default())
}
