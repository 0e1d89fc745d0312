//! Local image files for post and avatar uploads.

#[cfg(test)]
#[path = "upload_test.rs"]
mod upload_test;

use std::path::Path;

use api::types::Upload;

use crate::error::CliError;

/// Image content type from the file extension.
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Read `path` into an upload.
///
/// # Errors
///
/// Rejects non-image extensions and unreadable files.
pub fn load_upload(path: &Path) -> Result<Upload, CliError> {
    let content_type = content_type_for(path)
        .ok_or_else(|| CliError::InvalidArgument(format!("{} is not a supported image", path.display())))?;
    let bytes = std::fs::read(path).map_err(|source| CliError::ReadFile { path: path.to_owned(), source })?;
    let file_name = path.file_name().map_or_else(|| "upload".to_owned(), |n| n.to_string_lossy().into_owned());
    Ok(Upload { file_name, content_type: content_type.to_owned(), bytes })
}
