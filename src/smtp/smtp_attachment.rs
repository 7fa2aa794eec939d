use std::{collections::HashMap, path::{Path, PathBuf}};

use bytes::Bytes;
use lettre::message::header::ContentType;

use crate::smtp::smtp_error::SmtpError;

/// Attachment descriptor. Queueing one never touches the filesystem,
/// the source is only read when the message is dispatched.
#[derive(Debug, Clone)]
pub struct SmtpAttachment {
    pub path: PathBuf,
    pub filename: String,
}

/// Inline image descriptor, referenced from the html body as `cid:<content_id>`.
#[derive(Debug, Clone)]
pub struct SmtpInlineImage {
    pub path: PathBuf,
    pub content_id: String,
    pub filename: String,
}

pub(crate) struct ResolvedAttachment {
    pub filename: String,
    pub content_type: ContentType,
    pub content: Bytes,
}

pub(crate) struct ResolvedInlineImage {
    pub content_id: String,
    pub content_type: ContentType,
    pub content: Bytes,
}

/// Caches attachment bytes by source path so a file is read at most once,
/// no matter how many recipients or send cycles reuse it.
pub struct AttachmentStore {
    cache: HashMap<PathBuf, Bytes>,
}

impl AttachmentStore {
    pub fn new() -> Self {
        AttachmentStore { cache: HashMap::new() }
    }

    /// Reads the file fully into an immutable buffer, serving repeat lookups from the cache.
    pub async fn resolve(&mut self, path: &Path) -> Result<Bytes, SmtpError> {
        if let Some(buffer) = self.cache.get(path) {
            return Ok(buffer.clone());
        }

        let content = tokio::fs::read(path).await.map_err(|err| SmtpError::AttachmentIo {
            path: path.to_path_buf(),
            source: err,
        })?;
        let buffer = Bytes::from(content);
        self.cache.insert(path.to_path_buf(), buffer.clone());
        tracing::debug!("resolved attachment {:?} ({} bytes)", path, buffer.len());
        Ok(buffer)
    }
}

/// Content type from the source extension, `application/octet-stream` when unknown.
pub(crate) fn image_content_type(path: &Path) -> ContentType {
    let mime = match path.extension().and_then(|extension| extension.to_str()) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    };
    ContentType::parse(mime).unwrap()
}

pub(crate) fn octet_stream() -> ContentType {
    ContentType::parse("application/octet-stream").unwrap()
}
