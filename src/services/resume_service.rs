use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tokio::fs;
use tokio::process::Command;

use crate::error::{Error, Result};

const WORD_MIME_TYPES: &[&str] = &[
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResumeSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes>;
}

/// Fetches resumes over HTTP. URLs under this server's own `/uploads` path are read straight
/// from the uploads directory.
pub struct HttpResumeSource {
    client: Client,
    public_uploads_prefix: String,
    uploads_dir: PathBuf,
}

impl HttpResumeSource {
    pub fn new(client: Client, public_base_url: &str, uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            public_uploads_prefix: format!("{}/uploads/", public_base_url.trim_end_matches('/')),
            uploads_dir: uploads_dir.into(),
        }
    }

    fn local_path(&self, url: &str) -> Option<PathBuf> {
        let relative = Path::new(url.strip_prefix(&self.public_uploads_prefix)?);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.uploads_dir.join(relative))
    }
}

#[async_trait]
impl ResumeSource for HttpResumeSource {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        if let Some(path) = self.local_path(url) {
            return fs::read(&path).await.map(Bytes::from).map_err(|e| {
                tracing::warn!(error = %e, path = %path.display(), "stored resume unreadable");
                Error::upstream_input("Failed to fetch resume")
            });
        }

        let res = self.client.get(url).send().await.map_err(|e| {
            tracing::warn!(error = %e, url, "resume fetch failed");
            Error::upstream_input("Failed to fetch resume")
        })?;
        if !res.status().is_success() {
            return Err(Error::upstream_input(format!(
                "Failed to fetch resume: {}",
                res.status()
            )));
        }
        res.bytes()
            .await
            .map_err(|_| Error::upstream_input("Failed to read resume body"))
    }
}

/// Plain text of a resume. PDF and Word are converted, `text/*` is taken as-is.
pub async fn extract_text(bytes: Bytes, mime_type: &str) -> Result<String> {
    let mime = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if mime == "application/pdf" {
        return tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| Error::Internal(format!("PDF extraction task failed: {}", e)))?
            .map_err(|e| Error::BadRequest(format!("Could not read PDF: {}", e)));
    }
    if WORD_MIME_TYPES.contains(&mime.as_str()) {
        let extension = if mime == "application/msword" { "doc" } else { "docx" };
        return word_to_text(&bytes, extension).await;
    }
    if mime.starts_with("text/") {
        return Ok(String::from_utf8_lossy(&bytes).into_owned());
    }
    Err(Error::BadRequest(format!("Unsupported file type: {}", mime_type)))
}

/// Runs a headless LibreOffice text conversion inside a scratch directory.
async fn word_to_text(bytes: &[u8], extension: &str) -> Result<String> {
    let workdir = tempfile::tempdir()?;
    let input = workdir.path().join(format!("resume.{}", extension));
    fs::write(&input, bytes).await?;

    let output = Command::new("libreoffice")
        .arg("--headless")
        .arg("--norestore")
        .arg("--convert-to")
        .arg("txt:Text")
        .arg("--outdir")
        .arg(workdir.path())
        .arg(&input)
        .output()
        .await
        .map_err(|e| Error::Internal(format!("Failed to run libreoffice: {}", e)))?;

    if !output.status.success() {
        return Err(Error::BadRequest(format!(
            "Word conversion failed: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    let text = fs::read(workdir.path().join("resume.txt"))
        .await
        .map_err(|_| Error::BadRequest("Word conversion produced no text".to_string()))?;
    Ok(String::from_utf8_lossy(&text).into_owned())
}
