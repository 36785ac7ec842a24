use crate::ImageFormat;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// File stem shared by every generated artifact.
pub const STEM: &str = "latexpreview";

/// SHA-256 content hash, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub String);

impl Fingerprint {
    /// Hashes the concatenation of `parts`, each prefixed by its length so
    /// that `["ab", "c"]` and `["a", "bc"]` differ.
    pub fn of(parts: &[&[u8]]) -> Self {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update((part.len() as u64).to_le_bytes());
            hasher.update(part);
        }
        Self(hex::encode(hasher.finalize()))
    }

    /// First twelve hex digits, for logs and cache keys.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

/// Directory in which `latex` and the rasterizer run.
///
/// The directory and everything in it are removed when the `WorkDir` is
/// dropped.
#[derive(Debug)]
pub struct WorkDir {
    root: PathBuf,
    _temp: TempDir,
}

impl WorkDir {
    /// Creates a fresh private directory under the system temp location.
    pub fn temporary() -> io::Result<Self> {
        let temp = tempfile::Builder::new().prefix("latexpreview-").tempdir()?;
        log::debug!("Using working directory {:?}", temp.path());
        Ok(Self {
            root: temp.path().to_path_buf(),
            _temp: temp,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Bare file name of an artifact, as passed to the tools running in
    /// [`WorkDir::root`].
    pub fn file_name(extension: &str) -> String {
        format!("{STEM}.{extension}")
    }

    pub fn artifact(&self, extension: &str) -> PathBuf {
        self.root.join(Self::file_name(extension))
    }

    pub fn tex_path(&self) -> PathBuf {
        self.artifact("tex")
    }

    pub fn dvi_path(&self) -> PathBuf {
        self.artifact("dvi")
    }

    pub fn log_path(&self) -> PathBuf {
        self.artifact("log")
    }

    pub fn image_path(&self, format: ImageFormat) -> PathBuf {
        self.artifact(format.extension())
    }
}
