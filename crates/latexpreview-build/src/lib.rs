//! # latexpreview build
//!
//! Turns a math expression into an image by way of external TeX tools.
//!
//! The pipeline is fixed:
//!
//! ```text
//! Document ──render()──► latexpreview.tex ──latex──► latexpreview.dvi ──dvipng/dvigif──► image
//! ```
//!
//! - [`Document`] wraps the user's source in a minimal `article` preamble.
//! - [`Step`] describes one external program call and maps its exit status
//!   to a [`RenderError`].
//! - [`Renderer`] runs the steps inside a [`WorkDir`] and skips whichever of
//!   them would produce the same output as last time.
//!
//! Programs are executed through the [`CommandExecutor`] trait so the
//! pipeline can be exercised without a TeX installation.

pub mod artifacts;
pub mod color;
pub mod document;
pub mod error;
pub mod render;
pub mod toolchain;

pub use artifacts::{Fingerprint, WorkDir};
pub use color::{ColorParseError, Rgb};
pub use document::{Document, PACKAGE_SENTINEL};
pub use error::RenderError;
pub use render::{RenderOutput, Renderer};
pub use toolchain::{CommandExecutor, ImageFormat, Step, SystemExecutor};

/// Lowest and highest resolution handed to the rasterizer, in dpi.
pub const RESOLUTION_RANGE: std::ops::RangeInclusive<u32> = 50..=2400;

/// How the compiled DVI is turned into pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderOptions {
    pub resolution: u32,
    pub color: Rgb,
    pub format: ImageFormat,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            resolution: 300,
            color: Rgb::BLACK,
            format: ImageFormat::Png,
        }
    }
}

impl RenderOptions {
    /// Stable textual key of everything that affects the raster output.
    pub fn cache_key(&self) -> String {
        format!("{}|{}|{}", self.resolution, self.color, self.format)
    }
}
