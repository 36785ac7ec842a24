//! The editing session: current state, renderer and what the preview shows.

use crate::state::EditorState;
use anyhow::{Context, Result};
use latexpreview_build::{
    Fingerprint, ImageFormat, RenderError, RenderOutput, Renderer, WorkDir,
};
use latexpreview_log::LogSummary;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Content of the preview widget.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Preview {
    /// Nothing rendered yet.
    #[default]
    Empty,
    Image {
        path: PathBuf,
        format: ImageFormat,
        fingerprint: Fingerprint,
    },
    /// `latex` rejected the source.
    Unreadable(LogSummary),
}

#[derive(Debug)]
pub struct Session {
    state: EditorState,
    renderer: Renderer,
    preview: Preview,
}

impl Session {
    /// Starts a session rendering into a fresh temporary directory.
    pub fn new(state: EditorState) -> io::Result<Self> {
        let workdir = WorkDir::temporary()?;
        log::debug!("Rendering in {:?}", workdir.root());
        Ok(Self::with_renderer(state, Renderer::new(workdir)))
    }

    pub fn with_renderer(state: EditorState, renderer: Renderer) -> Self {
        Self {
            state,
            renderer,
            preview: Preview::Empty,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut EditorState {
        &mut self.state
    }

    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Renders the current state and updates the preview.
    ///
    /// A compile failure switches the preview to [`Preview::Unreadable`].
    /// Any other failure leaves the previous preview in place.
    pub fn render(&mut self) -> Result<RenderOutput, RenderError> {
        self.renderer.set_latex_program(&self.state.toolchain.latex);
        let document = self.state.document();
        let options = self.state.render_options();

        match self.renderer.render(&document, &options) {
            Ok(output) => {
                self.preview = Preview::Image {
                    path: output.image.clone(),
                    format: output.format,
                    fingerprint: output.fingerprint.clone(),
                };
                Ok(output)
            }
            Err(RenderError::Compile { summary, output }) => {
                self.preview = Preview::Unreadable(summary.clone());
                Err(RenderError::Compile { summary, output })
            }
            Err(e) => {
                log::warn!("Render failed: {}", e);
                Err(e)
            }
        }
    }

    /// Renders and copies the image to `dest`.
    ///
    /// `dest` gets the image extension appended when it has none.
    pub fn export(&mut self, dest: &Path) -> Result<RenderOutput> {
        let output = self.render()?;
        let dest = with_image_extension(dest, output.format);
        fs::copy(&output.image, &dest).with_context(|| {
            format!("Failed to save {} to {}", output.image.display(), dest.display())
        })?;
        log::info!("Saved image to {}", dest.display());
        Ok(output)
    }

    /// Text of the latest `latexpreview.log`.
    pub fn log_text(&self) -> Option<String> {
        self.renderer.log_text()
    }
}

fn with_image_extension(dest: &Path, format: ImageFormat) -> PathBuf {
    if dest.extension().is_some() {
        dest.to_path_buf()
    } else {
        dest.with_extension(format.extension())
    }
}
