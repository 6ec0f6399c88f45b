use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::ScanError;
use crate::models::{Side, Submission};

const DEFAULT_EXTENSION: &str = "jpg";

/// Holds the RFC 3339 creation time. Not matched by any side prefix.
const CREATED_MARKER: &str = ".created";

/// Bytes of one side plus the extension suggested by its upload filename.
pub struct SideImage<'a> {
    pub bytes: &'a [u8],
    pub extension: Option<&'a str>,
}

/// Upload storage laid out as `{root}/{submission_id}/{side}.{ext}`.
pub struct SubmissionStore {
    root: PathBuf,
}

impl SubmissionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn init(&self) -> Result<(), ScanError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Allocate a new submission directory and return its id.
    pub async fn create(&self) -> Result<Uuid, ScanError> {
        let id = Uuid::new_v4();
        let dir = self.dir(id);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(CREATED_MARKER), Utc::now().to_rfc3339()).await?;
        Ok(id)
    }

    /// Write one side. A side that already exists is never overwritten.
    pub async fn store_side(
        &self,
        id: Uuid,
        side: Side,
        bytes: &[u8],
        suggested_extension: Option<&str>,
    ) -> Result<PathBuf, ScanError> {
        let dir = self.dir(id);
        if !tokio::fs::try_exists(&dir).await? {
            return Err(ScanError::NotFound(format!("Upload {id} not found")));
        }
        if self.find_side(&dir, side).await?.is_some() {
            return Err(ScanError::Storage(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} image already stored for upload {id}", side.as_str()),
            )));
        }

        let ext = sanitize_extension(suggested_extension);
        let path = dir.join(format!("{}.{ext}", side.as_str()));

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        tracing::debug!("Stored {} image for upload {id} at {}", side.as_str(), path.display());
        Ok(path)
    }

    /// Write both sides of a freshly created submission.
    ///
    /// If either write fails the submission directory is removed.
    pub async fn store_pair(
        &self,
        id: Uuid,
        face: SideImage<'_>,
        back: SideImage<'_>,
    ) -> Result<Submission, ScanError> {
        let stored = async {
            self.store_side(id, Side::Face, face.bytes, face.extension).await?;
            self.store_side(id, Side::Back, back.bytes, back.extension).await?;
            self.resolve(id).await
        }
        .await;

        if let Err(e) = &stored {
            tracing::warn!("Storing upload {id} failed, discarding it: {e}");
            if let Err(cleanup) = self.discard(id).await {
                tracing::error!("Could not remove partial upload {id}: {cleanup}");
            }
        }
        stored
    }

    /// Remove a submission and everything stored for it. Unknown ids are a no-op.
    pub async fn discard(&self, id: Uuid) -> Result<(), ScanError> {
        match tokio::fs::remove_dir_all(self.dir(id)).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    /// Look up both image paths of a submission.
    pub async fn resolve(&self, id: Uuid) -> Result<Submission, ScanError> {
        let dir = self.dir(id);
        if !tokio::fs::try_exists(&dir).await? {
            return Err(ScanError::NotFound("Upload not found".to_string()));
        }

        let face = self.find_side(&dir, Side::Face).await?;
        let back = self.find_side(&dir, Side::Back).await?;

        let (Some(face_path), Some(back_path)) = (face, back) else {
            return Err(ScanError::IncompleteSubmission(
                "Missing face or back image".to_string(),
            ));
        };

        Ok(Submission {
            id,
            face_path,
            back_path,
            created_at: read_created_at(&dir).await?,
        })
    }

    fn dir(&self, id: Uuid) -> PathBuf {
        self.root.join(id.to_string())
    }

    async fn find_side(&self, dir: &Path, side: Side) -> Result<Option<PathBuf>, ScanError> {
        let prefix = format!("{}.", side.as_str());
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            if name.to_string_lossy().starts_with(&prefix) {
                return Ok(Some(entry.path()));
            }
        }
        Ok(None)
    }
}

async fn read_created_at(dir: &Path) -> Result<DateTime<Utc>, ScanError> {
    let stamp = tokio::fs::read_to_string(dir.join(CREATED_MARKER)).await?;
    DateTime::parse_from_rfc3339(stamp.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            ScanError::Storage(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Bad creation time in {}: {e}", dir.display()),
            ))
        })
}

/// Extension taken from an uploaded filename. Anything odd falls back to `jpg`.
pub fn sanitize_extension(suggested: Option<&str>) -> String {
    suggested
        .map(|s| s.trim().trim_start_matches('.'))
        .filter(|s| !s.is_empty() && s.len() <= 5 && s.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// Extension of a client-supplied filename, if any.
pub fn extension_of(filename: &str) -> Option<&str> {
    Path::new(filename).extension().and_then(|e| e.to_str())
}
