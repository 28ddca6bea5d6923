use std::path::PathBuf;

use bytes::Bytes;
use tokio::fs;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::utils::time::now;

const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt", "rtf"];

/// Stores uploaded resumes on local disk; `/uploads` serves the same directory.
#[derive(Clone)]
pub struct StorageService {
    uploads_dir: PathBuf,
    public_base_url: String,
}

impl StorageService {
    pub fn new(uploads_dir: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Writes the body to `resumes/{account}/{millis}-{name}` and returns its public URL.
    pub async fn store_resume(&self, owner: Uuid, filename: &str, body: Bytes) -> Result<String> {
        let name = sanitize_filename(filename);
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(Error::BadRequest(format!(
                "Unsupported file type. Allowed: {}",
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }
        if body.is_empty() {
            return Err(Error::BadRequest("Uploaded file is empty".to_string()));
        }
        if extension == "pdf" && !body.starts_with(b"%PDF") {
            return Err(Error::BadRequest("File is not a valid PDF".to_string()));
        }

        let relative = format!(
            "resumes/{}/{}-{}",
            owner,
            now().timestamp_millis(),
            name
        );
        let path = self.uploads_dir.join(&relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, &body).await?;

        tracing::info!(account_id = %owner, path = %path.display(), bytes = body.len(), "resume stored");
        Ok(format!("{}/uploads/{}", self.public_base_url, relative))
    }
}

/// Keeps the final path segment and replaces anything outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "resume".to_string()
    } else {
        cleaned.to_string()
    }
}
