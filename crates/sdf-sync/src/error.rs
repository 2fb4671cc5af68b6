//! Error types for the synchronization core.

use crate::shader::ShaderStage;
use std::path::PathBuf;

/// Configuration errors raised while building the scene.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("requested {requested} balls but capacity is {max}")]
    CapacityExceeded { requested: usize, max: usize },
    #[error("scene needs at least one ball")]
    Empty,
}

/// A shader source fetch that did not produce usable text.
#[derive(Debug, thiserror::Error)]
pub enum ShaderLoadError {
    #[error("failed to read {stage} program from {}: {source}", .path.display())]
    Io {
        stage: ShaderStage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{stage} program at {} is empty", .path.display())]
    Empty { stage: ShaderStage, path: PathBuf },
}

impl ShaderLoadError {
    /// The stage whose fetch failed.
    pub fn stage(&self) -> ShaderStage {
        match self {
            Self::Io { stage, .. } | Self::Empty { stage, .. } => *stage,
        }
    }
}
