// src/infrastructure/media.rs
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{debug, info};

use crate::constants::MEDIA_EXTENSION;
use crate::domain::ConnectError;
use crate::infrastructure::connect::AnkiConnectClient;
use crate::infrastructure::transport::Transport;

/// Name an image gets in Anki's media store: the basename of the local
/// path with its extension replaced by the fixed media extension.
pub fn media_filename(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    Some(format!("{}.{}", stem, MEDIA_EXTENSION))
}

/// Upload a local image to the media store and return the stored filename
/// for embedding.
///
/// An unreadable file and a failed upload both surface as transport errors.
/// The store is not read back afterwards; the embedded tag trusts the
/// derived name.
pub fn attach_image<T: Transport>(
    client: &AnkiConnectClient<T>,
    image_path: &Path,
) -> Result<String, ConnectError> {
    let filename = media_filename(image_path).ok_or_else(|| {
        ConnectError::Transport(format!(
            "image path has no usable filename: {}",
            image_path.display()
        ))
    })?;

    let bytes = std::fs::read(image_path).map_err(|e| {
        ConnectError::Transport(format!(
            "failed to read image {}: {}",
            image_path.display(),
            e
        ))
    })?;

    debug!(
        file = %image_path.display(),
        stored = %filename,
        size = bytes.len(),
        "Uploading media file"
    );
    client.store_media_file(&filename, &STANDARD.encode(&bytes))?;
    info!(stored = %filename, "Media file uploaded");

    Ok(filename)
}
