//! Filename validation
//!
//! Declared filenames come straight from the client and end up as path components
//! under the uploads directory. Two policies exist: the strict allowlist (default)
//! and the legacy blacklist kept for deployments that depend on original names.

use uuid::Uuid;

use crate::constants::MAX_FILENAME_LENGTH;
use crate::error::AppError;
use crate::models::FilenamePolicy;

/// Final path component of a declared name, treating both `/` and `\` as separators.
fn final_component(filename: &str) -> &str {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
}

/// Legacy sanitization: keep the final path component and strip `..`, `//`, `\` and `:`.
///
/// This is a blacklist. It does not guarantee a traversal-safe result on its own and
/// two uploads with the same declared name map to the same stored file.
pub fn sanitize_filename_legacy(filename: &str) -> String {
    let name = std::path::Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    name.replace("..", "")
        .replace("//", "")
        .replace('\\', "")
        .replace(':', "")
}

/// Strict sanitization: keep the final path component, reject traversal, and replace
/// anything outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_filename_strict(filename: &str) -> Result<String, AppError> {
    let name = final_component(filename.trim());

    if name.contains("..") {
        return Err(AppError::InvalidInput(
            "Filename contains invalid path traversal".to_string(),
        ));
    }

    let sanitized: String = name
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches(['.', '_']).is_empty() {
        return Ok("file".to_string());
    }

    Ok(sanitized)
}

/// Name the worker writes to disk for an upload.
///
/// Under the strict policy the upload id is prefixed, so two uploads can never share a
/// destination file.
pub fn stored_filename(
    policy: FilenamePolicy,
    upload_id: Uuid,
    declared: &str,
) -> Result<String, AppError> {
    match policy {
        FilenamePolicy::Strict => {
            let sanitized = sanitize_filename_strict(declared)?;
            Ok(format!("{}_{}", upload_id, sanitized))
        }
        FilenamePolicy::Legacy => {
            let sanitized = sanitize_filename_legacy(declared);
            if sanitized.is_empty() {
                return Err(AppError::InvalidInput(
                    "Filename is empty after sanitization".to_string(),
                ));
            }
            Ok(sanitized)
        }
    }
}
