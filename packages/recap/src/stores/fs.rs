//! Filesystem artifact storage.
//!
//! Layout under the storage root:
//!
//! ```text
//! content/<slug>.md     raw extracted text
//! summaries/<slug>.md   summary
//! meta/<slug>.json      ArtifactMeta
//! html/<slug>.html      rendered output (written by the viewer, not here)
//! ```
//!
//! Files are written one after another with no recovery of partial writes.
//! Metadata goes last, so a bundle is only listed once its text files exist.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{PersistenceError, PersistenceResult};
use crate::traits::store::ArtifactStore;
use crate::types::artifact::{ArtifactBundle, ArtifactMeta};

const CONTENT_DIR: &str = "content";
const SUMMARY_DIR: &str = "summaries";
const META_DIR: &str = "meta";

pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn content_path(&self, slug: &str) -> PathBuf {
        self.root.join(CONTENT_DIR).join(format!("{slug}.md"))
    }

    pub fn summary_path(&self, slug: &str) -> PathBuf {
        self.root.join(SUMMARY_DIR).join(format!("{slug}.md"))
    }

    pub fn meta_path(&self, slug: &str) -> PathBuf {
        self.root.join(META_DIR).join(format!("{slug}.json"))
    }

    async fn write(&self, path: &Path, data: &str) -> PersistenceResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| io_error(parent, e))?;
        }
        fs::write(path, data).await.map_err(|e| io_error(path, e))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> PersistenceError {
    PersistenceError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Read a file, treating absence as `None`.
async fn read_optional(path: &Path) -> PersistenceResult<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_error(path, e)),
    }
}

#[async_trait]
impl ArtifactStore for FsStore {
    async fn list(&self) -> PersistenceResult<Vec<ArtifactMeta>> {
        let dir = self.root.join(META_DIR);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(io_error(&dir, e)),
        };

        let mut metas = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(&dir, e))? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(data) = read_optional(&path).await? else {
                continue;
            };
            match serde_json::from_str::<ArtifactMeta>(&data) {
                Ok(meta) => metas.push(meta),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable metadata"),
            }
        }
        Ok(metas)
    }

    async fn get_meta(&self, slug: &str) -> PersistenceResult<Option<ArtifactMeta>> {
        match read_optional(&self.meta_path(slug)).await? {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    async fn get_summary(&self, slug: &str) -> PersistenceResult<Option<String>> {
        read_optional(&self.summary_path(slug)).await
    }

    async fn get_content(&self, slug: &str) -> PersistenceResult<Option<String>> {
        read_optional(&self.content_path(slug)).await
    }

    async fn save(&self, bundle: &ArtifactBundle) -> PersistenceResult<()> {
        let slug = &bundle.meta.slug;
        self.write(&self.content_path(slug), &bundle.content).await?;
        self.write(&self.summary_path(slug), &bundle.summary).await?;
        let meta = serde_json::to_string_pretty(&bundle.meta)?;
        self.write(&self.meta_path(slug), &meta).await?;

        debug!(slug = %slug, root = %self.root.display(), "Artifact written");
        Ok(())
    }
}
