//! Clipboard integration through `xclip`.
//!
//! X11 has no clipboard daemon: whoever owns the selection must stay alive to
//! serve it. Each copy therefore spawns an `xclip -quiet` process that keeps
//! running until another application takes the selection. The
//! [`ClipboardKeeper`] owns those processes and kills them on shutdown.

use latexpreview_build::ImageFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use thiserror::Error;

/// What ends up on the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClipboardMode {
    /// The image bytes, offered with their MIME type.
    #[default]
    Image,
    /// A reference to the image file, as file managers copy files.
    FileUri,
}

impl ClipboardMode {
    pub const fn all() -> &'static [ClipboardMode] {
        &[Self::Image, Self::FileUri]
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Image => "Image data",
            Self::FileUri => "File reference",
        }
    }
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("Failed to run {program}:\n{source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to pass the image to {program}: {source}")]
    Write {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{program} terminated with exit status {}:\n{output}", status_label(.status))]
    Exited {
        program: String,
        status: Option<i32>,
        output: String,
    },
}

fn status_label(status: &Option<i32>) -> String {
    status.map_or_else(|| "unknown".to_string(), |code| code.to_string())
}

/// Arguments for one `xclip` invocation.
pub fn xclip_args(mode: ClipboardMode, format: ImageFormat) -> Vec<String> {
    let mut args: Vec<String> = ["-quiet", "-selection", "clipboard"]
        .into_iter()
        .map(String::from)
        .collect();
    if mode == ClipboardMode::Image {
        args.push("-t".to_string());
        args.push(format.mime_type().to_string());
    }
    args
}

/// Text that Nautilus-compatible file managers read as "a file was copied".
pub fn file_uri_payload(path: &Path) -> String {
    let uri = url::Url::from_file_path(path)
        .map(String::from)
        .unwrap_or_else(|()| format!("file://{}", path.display()));
    format!("x-special/nautilus-clipboard\ncopy\n{uri}\n")
}

/// Owns the `xclip` processes currently serving the clipboard.
#[derive(Debug)]
pub struct ClipboardKeeper {
    program: PathBuf,
    owners: Vec<Child>,
    copies: u32,
}

impl ClipboardKeeper {
    /// Looks up `xclip` on `PATH`.
    pub fn detect() -> Option<Self> {
        match which::which("xclip") {
            Ok(path) => {
                log::debug!("Found xclip at {:?}", path);
                Some(Self::with_program(path))
            }
            Err(e) => {
                log::warn!("xclip not found, copying is disabled: {}", e);
                None
            }
        }
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            owners: Vec::new(),
            copies: 0,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Number of `xclip` processes still alive.
    pub fn active(&self) -> usize {
        self.owners.len()
    }

    /// Puts `image` on the clipboard.
    pub fn copy(
        &mut self,
        image: &Path,
        format: ImageFormat,
        mode: ClipboardMode,
    ) -> Result<(), ClipboardError> {
        let payload = match mode {
            ClipboardMode::Image => fs::read(image).map_err(|source| ClipboardError::Io {
                path: image.to_path_buf(),
                source,
            })?,
            ClipboardMode::FileUri => {
                let kept = self.keep_copy(image, format)?;
                file_uri_payload(&kept).into_bytes()
            }
        };

        let program = self.program.display().to_string();
        let mut child = Command::new(&self.program)
            .args(xclip_args(mode, format))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ClipboardError::Launch {
                program: program.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(&payload) {
                Ok(()) => {}
                // xclip died early; its exit status is reported by poll().
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                    log::warn!("{} closed its input early", program);
                }
                Err(source) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ClipboardError::Write { program, source });
                }
            }
        }

        log::info!("Copied {} to the clipboard via pid {}", image.display(), child.id());
        self.owners.push(child);
        Ok(())
    }

    /// Reaps `xclip` processes that have exited and returns the failures.
    ///
    /// A zero exit means another application took over the selection.
    pub fn poll(&mut self) -> Vec<ClipboardError> {
        let program = self.program.display().to_string();
        let mut errors = Vec::new();

        self.owners.retain_mut(|child| match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) if status.success() => {
                log::debug!("xclip pid {} released the selection", child.id());
                false
            }
            Ok(Some(status)) => {
                let mut output = String::new();
                if let Some(mut stderr) = child.stderr.take() {
                    let _ = stderr.read_to_string(&mut output);
                }
                errors.push(ClipboardError::Exited {
                    program: program.clone(),
                    status: status.code(),
                    output,
                });
                false
            }
            Err(e) => {
                log::warn!("Failed to query xclip pid {}: {}", child.id(), e);
                false
            }
        });

        errors
    }

    /// Kills every `xclip` process still holding the selection.
    pub fn shutdown(&mut self) {
        for mut child in self.owners.drain(..) {
            log::debug!("Stopping xclip pid {}", child.id());
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    /// Copies the image next to itself under a per-copy name so that later
    /// renders do not change what the clipboard refers to.
    fn keep_copy(&mut self, image: &Path, format: ImageFormat) -> Result<PathBuf, ClipboardError> {
        self.copies += 1;
        let name = format!("latexpreview-copy-{}.{}", self.copies, format.extension());
        let kept = image.with_file_name(name);
        fs::copy(image, &kept).map_err(|source| ClipboardError::Io {
            path: kept.clone(),
            source,
        })?;
        Ok(kept)
    }
}

impl Drop for ClipboardKeeper {
    fn drop(&mut self) {
        self.shutdown();
    }
}
