//! Editor state and its JSON configuration file.
//!
//! The file is read once at startup and written once at shutdown. Missing or
//! malformed files fall back to [`EditorState::default`].

use crate::clipboard::ClipboardMode;
use crate::packages::PackageList;
use latexpreview_build::{Document, ImageFormat, RESOLUTION_RANGE, RenderOptions, Rgb};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_DIR: &str = "latexpreview";
const CONFIG_FILENAME: &str = "state.json";

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize editor state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Which external programs to use and how to export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Program compiling `.tex` to `.dvi`.
    pub latex: String,
    pub format: ImageFormat,
    pub clipboard: ClipboardMode,
}

impl Default for ToolchainSettings {
    fn default() -> Self {
        Self {
            latex: "latex".to_string(),
            format: ImageFormat::Png,
            clipboard: ClipboardMode::Image,
        }
    }
}

/// Everything the user can change in the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorState {
    pub source: String,
    /// Rasterization resolution in dpi.
    pub resolution: u32,
    pub color: Rgb,
    pub packages: PackageList,
    pub toolchain: ToolchainSettings,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            source: r"e^{i\pi} + 1 = 0".to_string(),
            resolution: RenderOptions::default().resolution,
            color: Rgb::BLACK,
            packages: ["amsmath", "amssymb"].into_iter().collect(),
            toolchain: ToolchainSettings::default(),
        }
    }
}

/// `<config dir>/latexpreview/state.json`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILENAME))
}

impl EditorState {
    pub fn set_resolution(&mut self, dpi: u32) {
        self.resolution = dpi.clamp(*RESOLUTION_RANGE.start(), *RESOLUTION_RANGE.end());
    }

    /// Brings values read from disk back into their valid ranges.
    pub fn normalize(&mut self) {
        self.set_resolution(self.resolution);
        self.packages.normalize();
        if self.toolchain.latex.trim().is_empty() {
            self.toolchain.latex = ToolchainSettings::default().latex;
        }
    }

    pub fn document(&self) -> Document {
        Document::new(self.packages.names(), self.source.as_str())
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            resolution: self
                .resolution
                .clamp(*RESOLUTION_RANGE.start(), *RESOLUTION_RANGE.end()),
            color: self.color,
            format: self.toolchain.format,
        }
    }

    pub fn load(path: &Path) -> Result<Self, StateError> {
        let content = fs::read_to_string(path).map_err(|source| StateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut state: Self = serde_json::from_str(&content).map_err(|source| StateError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        state.normalize();
        Ok(state)
    }

    /// Loads `path`, falling back to defaults when it is absent or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(state) => {
                log::info!("Loaded editor state from {:?}", path);
                state
            }
            Err(StateError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No editor state at {:?}, using defaults", path);
                Self::default()
            }
            Err(e) => {
                log::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Writes the state as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StateError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| StateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Saved editor state to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut state = EditorState::default();
        state.source = r"\int_0^1 x\,dx".to_string();
        state.set_resolution(600);
        state.color = Rgb::new(10, 20, 30);
        state.packages.push("mathtools");
        state.toolchain.format = ImageFormat::Gif;
        state.toolchain.clipboard = ClipboardMode::FileUri;

        state.save(&path).unwrap();
        assert_eq!(EditorState::load(&path).unwrap(), state);
    }

    #[test]
    fn test_file_layout() {
        let state = EditorState::default();
        let json: serde_json::Value = serde_json::to_value(&state).unwrap();
        assert_eq!(json["resolution"], 300);
        assert_eq!(json["color"], "#000000");
        assert_eq!(json["packages"], serde_json::json!(["amsmath", "amssymb"]));
        assert_eq!(json["toolchain"]["format"], "png");
        assert_eq!(json["toolchain"]["clipboard"], "image");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let state = EditorState::load_or_default(&dir.path().join("absent.json"));
        assert_eq!(state, EditorState::default());
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(EditorState::load(&path), Err(StateError::Parse { .. })));
        assert_eq!(EditorState::load_or_default(&path), EditorState::default());
    }

    #[test]
    fn test_partial_file_fills_defaults_and_clamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(
            &path,
            r#"{"source": "x", "resolution": 99999, "packages": ["bm", "", "bm"], "extra": 1}"#,
        )
        .unwrap();

        let state = EditorState::load(&path).unwrap();
        assert_eq!(state.source, "x");
        assert_eq!(state.resolution, 2400);
        assert_eq!(state.packages.names(), ["bm"]);
        assert_eq!(state.color, Rgb::BLACK);
        assert_eq!(state.toolchain, ToolchainSettings::default());
    }

    #[test]
    fn test_document_and_options() {
        let mut state = EditorState::default();
        state.source = "a+b".into();
        state.resolution = 10;

        let document = state.document();
        assert_eq!(document.packages(), ["amsmath", "amssymb"]);
        assert_eq!(document.body(), "a+b");
        assert_eq!(state.render_options().resolution, 50);
    }
}
