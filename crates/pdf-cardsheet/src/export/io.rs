//! Document output

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use lopdf::Document;

use crate::types::*;

/// Serialize a document to PDF bytes
pub async fn encode_pdf(mut doc: Document) -> Result<Vec<u8>> {
    let bytes = tokio::task::spawn_blocking(move || {
        let mut writer = Vec::new();
        doc.save_to(&mut writer)?;
        Ok::<_, SheetError>(writer)
    })
    .await??;
    Ok(bytes)
}

/// Save a document.
///
/// Bytes go to a `.part` file next to `path` which is renamed into place once
/// complete, so a failed save never leaves a truncated PDF behind.
pub async fn save_pdf(doc: Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref().to_owned();
    let bytes = encode_pdf(doc).await?;
    write_atomically(&path, &bytes).await
}

pub(crate) async fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let part = part_path(path);

    let written = match tokio::fs::write(&part, bytes).await {
        Ok(()) => tokio::fs::rename(&part, path).await,
        Err(e) => Err(e),
    };

    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&part).await;
        return Err(e.into());
    }

    log::info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

pub(crate) fn part_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".part");
    path.with_file_name(name)
}
