use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::model::annotation::OverlaySegment;
use crate::model::batch::AnnotationBatchDef;
use crate::model::session::SessionDescriptor;

/// External video/session storage service.
///
/// Both fetches happen once per session open. Failures are retried by
/// [`crate::load::retry::load_session`].
pub trait SessionSource {
    /// Fetch the descriptor for `session_id`.
    fn fetch_descriptor(&self, session_id: &str) -> anyhow::Result<SessionDescriptor>;
    /// Fetch the raw annotation batch for `session_id`.
    fn fetch_annotations(&self, session_id: &str) -> anyhow::Result<AnnotationBatchDef>;
}

/// Outbound persistence for newly authored overlays; an opaque success/failure call.
pub trait AnnotationStore {
    /// Persist one committed overlay of `session_id`.
    fn commit(&mut self, session_id: &str, overlay: &OverlaySegment) -> anyhow::Result<()>;
}

/// Reads sessions from `<root>/<id>/session.json` and `<root>/<id>/annotations.json`.
///
/// A missing `annotations.json` is an empty batch.
#[derive(Clone, Debug)]
pub struct JsonDirSource {
    root: PathBuf,
}

impl JsonDirSource {
    /// Source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding one subdirectory per session.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// `<root>/<session_id>`, refusing ids that would escape `root`.
fn session_dir(root: &Path, session_id: &str) -> anyhow::Result<PathBuf> {
    if session_id.is_empty()
        || session_id.contains(['/', '\\'])
        || session_id == "."
        || session_id == ".."
    {
        anyhow::bail!("invalid session id '{session_id}'");
    }
    Ok(root.join(session_id))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let f = File::open(path).with_context(|| format!("open '{}'", path.display()))?;
    serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse '{}'", path.display()))
}

impl SessionSource for JsonDirSource {
    fn fetch_descriptor(&self, session_id: &str) -> anyhow::Result<SessionDescriptor> {
        read_json(&session_dir(&self.root, session_id)?.join("session.json"))
    }

    fn fetch_annotations(&self, session_id: &str) -> anyhow::Result<AnnotationBatchDef> {
        let path = session_dir(&self.root, session_id)?.join("annotations.json");
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no annotations file; empty batch");
            return Ok(AnnotationBatchDef::default());
        }
        read_json(&path)
    }
}

/// Appends committed overlays as JSON lines to `<root>/<id>/authored.jsonl`.
#[derive(Clone, Debug)]
pub struct JsonLinesStore {
    root: PathBuf,
}

impl JsonLinesStore {
    /// Store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AnnotationStore for JsonLinesStore {
    fn commit(&mut self, session_id: &str, overlay: &OverlaySegment) -> anyhow::Result<()> {
        use std::io::Write as _;

        let dir = session_dir(&self.root, session_id)?;
        std::fs::create_dir_all(&dir).with_context(|| format!("create dir '{}'", dir.display()))?;
        let path = dir.join("authored.jsonl");
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open '{}'", path.display()))?;
        let line = serde_json::to_string(overlay)?;
        writeln!(f, "{line}").with_context(|| format!("write '{}'", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/load/source.rs"]
mod tests;
