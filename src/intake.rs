use std::{io, path::Path};

use mmsrx_common::incoming;

use crate::error::IntakeError;

/// Read the downloaded bytes and remove the transient file
///
/// The file is removed whether or not the read succeeded.
///
/// # Errors
/// If the file cannot be read
pub async fn read_payload(path: &Path) -> Result<Vec<u8>, IntakeError> {
    let result = tokio::fs::read(path).await;
    remove_transient(path).await;

    let payload = result.map_err(|source| IntakeError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    incoming!("Read {} bytes from {}", payload.len(), path.display());
    Ok(payload)
}

async fn remove_transient(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::trace!(path = %path.display(), "Removed transient download"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove transient download");
        }
    }
}
