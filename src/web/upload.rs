use std::io::Cursor;
use std::path::Path as StdPath;

use tracing::debug;

use crate::constants::ACCEPTED_EXTENSIONS;
use crate::session::UploadedGraph;

/// Reasons an uploaded file isn't accepted as a graph.
#[derive(Debug, thiserror::Error)]
pub(crate) enum UploadError {
    #[error("no file was selected")]
    Empty,
    #[error("unsupported file type {0:?}, expected png, jpg or jpeg")]
    Extension(String),
    #[error("the file is not a readable PNG or JPEG image: {0}")]
    Undecodable(String),
    #[error("the file is larger than the {0} byte upload limit")]
    TooLarge(usize),
}

fn has_accepted_extension(filename: &str) -> bool {
    StdPath::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
        .unwrap_or(false)
}

/// Checks the name and decodes the bytes, keeping the upload as sent.
pub(crate) fn inspect_upload(filename: &str, bytes: Vec<u8>) -> Result<UploadedGraph, UploadError> {
    if filename.is_empty() || bytes.is_empty() {
        return Err(UploadError::Empty);
    }
    if !has_accepted_extension(filename) {
        return Err(UploadError::Extension(filename.to_string()));
    }

    let reader = image::ImageReader::new(Cursor::new(bytes.as_slice()))
        .with_guessed_format()
        .map_err(|err| {
            debug!("Failed to guess image format: {}", err);
            UploadError::Undecodable(err.to_string())
        })?;
    let mime_type = match reader.format() {
        Some(image::ImageFormat::Png) => "image/png",
        Some(image::ImageFormat::Jpeg) => "image/jpeg",
        other => {
            debug!("Rejecting image format {:?}", other);
            return Err(UploadError::Undecodable("unknown image format".to_string()));
        }
    };
    let decoded = reader.decode().map_err(|err| {
        debug!("Failed to decode image: {}", err);
        UploadError::Undecodable(err.to_string())
    })?;
    debug!(
        "Accepted {} ({}x{}, {} bytes)",
        filename,
        decoded.width(),
        decoded.height(),
        bytes.len()
    );

    Ok(UploadedGraph {
        filename: filename.to_string(),
        mime_type: mime_type.to_string(),
        bytes,
    })
}
