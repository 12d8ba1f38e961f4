//! Discussion session that runs an external command.
//!
//! The command gets the path of the artifact's stored content as its last
//! argument, and `RECAP_SLUG`, `RECAP_TITLE`, `RECAP_SOURCE_URL` in its
//! environment. It inherits the terminal, so interactive tools work.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::SessionError;
use crate::traits::session::DiscussionSession;
use crate::types::artifact::ArtifactMeta;

pub struct CommandSession {
    program: Option<String>,
    args: Vec<String>,
    content_dir: PathBuf,
    inherit_io: bool,
}

impl CommandSession {
    /// Parse a whitespace-separated command line; `None` or blank means unconfigured.
    pub fn new(command_line: Option<&str>, content_dir: impl Into<PathBuf>) -> Self {
        let mut parts = command_line
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string);
        Self {
            program: parts.next(),
            args: parts.collect(),
            content_dir: content_dir.into(),
            inherit_io: true,
        }
    }

    /// Detach the command from the terminal.
    pub fn quiet(mut self) -> Self {
        self.inherit_io = false;
        self
    }

    /// Path handed to the command, writing the content out if no stored file exists.
    async fn content_file(&self, meta: &ArtifactMeta, content: &str) -> Result<PathBuf, SessionError> {
        let stored = self.content_dir.join(format!("{}.md", meta.slug));
        if tokio::fs::try_exists(&stored).await.unwrap_or(false) {
            return Ok(stored);
        }

        let scratch = std::env::temp_dir().join(format!("recap-{}.md", meta.slug));
        tokio::fs::write(&scratch, content)
            .await
            .map_err(|e| SessionError::Failed(format!("writing {}: {e}", scratch.display())))?;
        debug!(path = %scratch.display(), "Wrote content to scratch file");
        Ok(scratch)
    }
}

#[async_trait]
impl DiscussionSession for CommandSession {
    async fn start(&self, meta: &ArtifactMeta, content: &str) -> Result<(), SessionError> {
        let program = self.program.as_deref().ok_or(SessionError::NotConfigured)?;
        let path = self.content_file(meta, content).await?;

        let mut cmd = Command::new(program);
        cmd.args(&self.args)
            .arg(&path)
            .env("RECAP_SLUG", &meta.slug)
            .env("RECAP_TITLE", &meta.title)
            .env("RECAP_SOURCE_URL", &meta.source_url);
        if self.inherit_io {
            cmd.stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit());
        } else {
            cmd.stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null());
        }

        info!(program = %program, slug = %meta.slug, "Launching discussion command");
        let status = cmd
            .status()
            .await
            .map_err(|e| SessionError::Failed(format!("failed to start {program}: {e}")))?;

        if status.success() {
            Ok(())
        } else {
            Err(SessionError::Failed(format!(
                "{program} exited with code {:?}",
                status.code()
            )))
        }
    }
}
