//! Upload storage
//!
//! Uploaded images are written to a directory served under a public prefix.
//! The database only ever stores the public path (`/uploads/<name>`), never
//! file contents.

use crate::config::UploadConfig;
use crate::errors::Result;
use chrono::Utc;
use regex_lite::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid regex"));

/// A file written to the upload directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// Name on disk
    pub file_name: String,
    /// Path clients fetch it from
    pub public_path: String,
    pub size: usize,
}

/// Writes uploads to disk and hands back their public paths
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
    public_prefix: String,
}

impl UploadStore {
    /// Open the store, creating the directory if needed
    pub async fn new(config: &UploadConfig) -> Result<Self> {
        fs::create_dir_all(&config.directory).await?;
        info!(directory = %config.directory.display(), "Upload directory ready");

        Ok(Self {
            root: config.directory.clone(),
            public_prefix: config.public_prefix.trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    /// Persist one uploaded file under a generated unique name
    pub async fn save(&self, original_name: Option<&str>, data: &[u8]) -> Result<StoredUpload> {
        let file_name = unique_file_name(original_name);
        let path = self.root.join(&file_name);

        fs::write(&path, data).await?;
        debug!(file = %file_name, bytes = data.len(), "Upload stored");

        Ok(StoredUpload {
            public_path: format!("{}/{}", self.public_prefix, file_name),
            file_name,
            size: data.len(),
        })
    }
}

/// `<unix millis>-<8 hex>-<sanitized name>`
fn unique_file_name(original_name: Option<&str>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        &suffix[..8],
        sanitize_file_name(original_name.unwrap_or_default())
    )
}

/// Reduce a client-supplied file name to a safe basename
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default();
    let cleaned = UNSAFE_CHARS.replace_all(base, "_");
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
