//! Destinations for rendered artifacts.

use super::request::{Artifact, RenderError};
use crate::config::Category;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Receives artifacts as subgroups complete.
pub trait ArtifactSink {
    fn collect(&mut self, artifact: Artifact) -> Result<(), RenderError>;
}

impl ArtifactSink for Vec<Artifact> {
    fn collect(&mut self, artifact: Artifact) -> Result<(), RenderError> {
        self.push(artifact);
        Ok(())
    }
}

/// The on-disk artifact collection: one file per comparison run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactArchive {
    pub category: Category,
    pub sources: Vec<String>,
    pub artifacts: Vec<Artifact>,
}

impl ArtifactArchive {
    pub fn read(path: &Path) -> Result<Self, RenderError> {
        let file = File::open(path).map_err(|err| RenderError::Io { path: path.to_path_buf(), err })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn get(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.name == name)
    }
}

/// Buffers artifacts in memory and writes the collection file on `finish`.
/// Nothing touches the destination before then.
#[derive(Debug)]
pub struct ArchiveCollector {
    destination: PathBuf,
    archive: ArtifactArchive,
}

impl ArchiveCollector {
    pub fn new(destination: impl Into<PathBuf>, category: Category, sources: Vec<String>) -> Self {
        Self {
            destination: destination.into(),
            archive: ArtifactArchive { category, sources, artifacts: Vec::new() },
        }
    }

    pub fn len(&self) -> usize { self.archive.artifacts.len() }
    pub fn is_empty(&self) -> bool { self.archive.artifacts.is_empty() }

    /// Writes the collection, creating parent directories as needed.
    pub fn finish(self) -> Result<PathBuf, RenderError> {
        let path = self.destination;
        let io_err = |err| RenderError::Io { path: path.clone(), err };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut writer = BufWriter::new(File::create(&path).map_err(io_err)?);
        serde_json::to_writer_pretty(&mut writer, &self.archive)?;
        writer.flush().map_err(io_err)?;
        info!(path = %path.display(), artifacts = self.archive.artifacts.len(), "Wrote artifact collection");
        Ok(path)
    }
}

impl ArtifactSink for ArchiveCollector {
    fn collect(&mut self, artifact: Artifact) -> Result<(), RenderError> {
        self.archive.artifacts.push(artifact);
        Ok(())
    }
}
