use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;

use crate::Result;

/// The source of a handler, and the directory its relative imports resolve against.
#[derive(Debug, Clone)]
pub struct Script {
    content: Arc<str>,
    base_path: Option<PathBuf>,
}

impl Script {
    /// A script without a base path. Relative imports resolve against the working directory.
    pub fn from_content(content: impl Into<String>) -> Self {
        Self {
            content: Arc::from(content.into()),
            base_path: None,
        }
    }

    /// Read a script from disk. Its imports resolve against the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script from '{}'", path.display()))?;

        Ok(Self {
            content: content.into(),
            base_path: path.parent().map(Path::to_path_buf),
        })
    }

    /// Set a virtual base path for module resolution, e.g. `/` for modules loaded
    /// from a [`FileSystemEmbedded`](crate::FileSystemEmbedded).
    pub fn with_virtual_base(mut self, path: impl AsRef<str>) -> Self {
        self.base_path = Some(PathBuf::from(path.as_ref()));
        self
    }

    /// The script source.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The directory relative imports resolve against, if any.
    pub fn base_path(&self) -> Option<&Path> {
        self.base_path.as_deref()
    }
}

impl From<String> for Script {
    fn from(content: String) -> Self {
        Self::from_content(content)
    }
}

impl From<&str> for Script {
    fn from(content: &str) -> Self {
        Self::from_content(content)
    }
}

impl TryFrom<&Path> for Script {
    type Error = anyhow::Error;
    fn try_from(path: &Path) -> Result<Self> {
        Self::from_file(path)
    }
}
