//! Checkpoint layout.
//!
//! Checkpoints of an experiment live in one directory, `{root}/{experiment}`.
//! Each file is named by the frame count at which it was taken, e.g.,
//! `models/snake/20000.safetensors`. The frame count is recovered from the
//! file name when training resumes.
use crate::error::DeepqError;
use anyhow::Result;
use log::info;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Checkpoint directory of an experiment.
#[derive(Debug, Clone)]
pub struct Checkpoints {
    dir: PathBuf,
    extension: String,
}

impl Checkpoints {
    /// Constructs the layout of `{root}/{experiment}`, files having the given extension.
    pub fn new(root: impl AsRef<Path>, experiment: &str, extension: &str) -> Self {
        Self {
            dir: root.as_ref().join(experiment),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// Returns the directory of the experiment.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file extension.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Creates the directory if it does not exist.
    pub fn create_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
            info!("Created checkpoint directory {:?}", self.dir);
        }
        Ok(())
    }

    /// Returns the path of the checkpoint taken at `frame_count`.
    pub fn path(&self, frame_count: usize) -> PathBuf {
        self.dir
            .join(format!("{}.{}", frame_count, self.extension))
    }

    /// Parses the frame count from a checkpoint identifier.
    ///
    /// The identifier is a frame count, optionally followed by the extension,
    /// and may be given as a path: `20000`, `20000.safetensors` and
    /// `models/snake/20000.safetensors` all denote frame 20000.
    pub fn parse_frame_count(&self, id: &str) -> Result<usize> {
        let invalid = || DeepqError::InvalidCheckpointId(id.to_string());
        let name = Path::new(id)
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(invalid)?;
        let suffix = format!(".{}", self.extension);
        let stem = name.strip_suffix(suffix.as_str()).unwrap_or(name);

        Ok(stem.parse::<usize>().map_err(|_| invalid())?)
    }

    /// Returns the frame count and the checkpoint path denoted by `id`.
    ///
    /// A bare file name is looked up in the directory of this experiment,
    /// while an id with a directory component is taken as the path itself.
    pub fn resolve(&self, id: &str) -> Result<(usize, PathBuf)> {
        let frame_count = self.parse_frame_count(id)?;
        let has_dir = Path::new(id)
            .parent()
            .map_or(false, |p| !p.as_os_str().is_empty());
        let path = if has_dir {
            PathBuf::from(id)
        } else {
            self.path(frame_count)
        };

        Ok((frame_count, path))
    }
}
