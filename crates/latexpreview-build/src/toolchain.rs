use crate::{RenderError, RenderOptions};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::str::FromStr;

/// Runs external programs. Abstracted so tests can stand in for `latex` and
/// `dvipng` without a TeX installation.
pub trait CommandExecutor: Send + Sync + fmt::Debug {
    /// Runs `program` with `args` inside `cwd` and waits for it to exit.
    fn execute(&self, program: &str, args: &[String], cwd: &Path) -> io::Result<Output>;
}

/// [`CommandExecutor`] backed by `std::process::Command`.
#[derive(Debug, Default)]
pub struct SystemExecutor;

impl CommandExecutor for SystemExecutor {
    fn execute(&self, program: &str, args: &[String], cwd: &Path) -> io::Result<Output> {
        Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output()
    }
}

/// Raster format of the rendered formula, which also picks the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Gif,
}

impl ImageFormat {
    pub const fn all() -> &'static [ImageFormat] {
        &[Self::Png, Self::Gif]
    }

    /// The DVI converter producing this format.
    pub const fn program(self) -> &'static str {
        match self {
            Self::Png => "dvipng",
            Self::Gif => "dvigif",
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }

    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Gif => "image/gif",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "gif" => Ok(Self::Gif),
            other => Err(format!("unsupported image format {other:?}, expected png or gif")),
        }
    }
}

/// One invocation of an external program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    description: String,
    program: String,
    args: Vec<String>,
}

impl Step {
    pub fn new(description: &str, program: &str, args: Vec<String>) -> Self {
        Self {
            description: description.to_string(),
            program: program.to_string(),
            args,
        }
    }

    /// `latex -interaction=nonstopmode <tex_file>`
    pub fn latex(program: &str, tex_file: &str) -> Self {
        Self::new(
            "latex compilation",
            program,
            vec!["-interaction=nonstopmode".to_string(), tex_file.to_string()],
        )
    }

    /// `dvipng <dvi> -D <dpi> -T tight -bg Transparent -fg <color> -o <output>`
    /// (or `dvigif`, depending on the format).
    pub fn rasterize(options: &RenderOptions, dvi_file: &str, output_file: &str) -> Self {
        let args = vec![
            dvi_file.to_string(),
            "-D".to_string(),
            options.resolution.to_string(),
            "-T".to_string(),
            "tight".to_string(),
            "-bg".to_string(),
            "Transparent".to_string(),
            "-fg".to_string(),
            options.color.dvi_color(),
            "-o".to_string(),
            output_file.to_string(),
        ];
        Self::new("DVI rasterization", options.format.program(), args)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Runs the step in `cwd`. A non-zero exit becomes [`RenderError::Tool`]
    /// carrying the program's combined output.
    pub fn run(&self, executor: &dyn CommandExecutor, cwd: &Path) -> Result<Output, RenderError> {
        log::debug!(
            "{}: {} {}",
            self.description,
            self.program,
            self.args.join(" ")
        );

        let output = executor
            .execute(&self.program, &self.args, cwd)
            .map_err(|source| RenderError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(output)
        } else {
            log::info!(
                "{} exited with {:?}",
                self.program,
                output.status.code()
            );
            Err(RenderError::Tool {
                program: self.program.clone(),
                status: output.status.code(),
                output: combined_output(&output),
            })
        }
    }
}

/// stdout followed by stderr, decoded lossily. TeX output is not always UTF-8.
pub fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&stderr);
    }
    text
}
