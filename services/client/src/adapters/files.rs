//! services/client/src/adapters/files.rs
//!
//! Reads local files into `StagedFile`s, declaring a media type from the extension the
//! way a browser would for a dropped file.

use bytes::Bytes;
use docchat_core::StagedFile;
use std::path::Path;

/// Guesses the declared media type from the file extension.
pub fn media_type_for(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let media_type = match ext.as_str() {
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => return None,
    };
    Some(media_type.to_string())
}

pub async fn read_staged_file(path: &Path) -> std::io::Result<StagedFile> {
    let contents = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(StagedFile::new(name, media_type_for(path), Bytes::from(contents)))
}
