use crate::artifacts::{Fingerprint, WorkDir};
use crate::document::Document;
use crate::toolchain::{CommandExecutor, Step, SystemExecutor};
use crate::{ImageFormat, RenderError, RenderOptions};
use latexpreview_log::LogSummary;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of a successful render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    pub image: PathBuf,
    pub format: ImageFormat,
    /// Identifies the image content: document plus raster options.
    pub fingerprint: Fingerprint,
    /// True when neither `latex` nor the rasterizer had to run.
    pub reused: bool,
}

/// Drives `latex` and the DVI converter inside a [`WorkDir`].
///
/// The renderer remembers the last document it compiled and the last
/// document/options pair it rasterized, so a color or resolution change only
/// reruns the converter and an unchanged request runs nothing.
#[derive(Debug)]
pub struct Renderer {
    workdir: WorkDir,
    executor: Box<dyn CommandExecutor>,
    latex_program: String,
    compiled: Option<Fingerprint>,
    rasterized: Option<Fingerprint>,
}

impl Renderer {
    pub fn new(workdir: WorkDir) -> Self {
        Self::with_executor(workdir, Box::new(SystemExecutor))
    }

    pub fn with_executor(workdir: WorkDir, executor: Box<dyn CommandExecutor>) -> Self {
        Self {
            workdir,
            executor,
            latex_program: "latex".to_string(),
            compiled: None,
            rasterized: None,
        }
    }

    pub fn with_latex_program(mut self, program: &str) -> Self {
        self.set_latex_program(program);
        self
    }

    pub fn set_latex_program(&mut self, program: &str) {
        if self.latex_program != program {
            self.latex_program = program.to_string();
            self.invalidate();
        }
    }

    pub fn latex_program(&self) -> &str {
        &self.latex_program
    }

    pub fn workdir(&self) -> &WorkDir {
        &self.workdir
    }

    /// Forgets cached results so the next render runs the full toolchain.
    pub fn invalidate(&mut self) {
        self.compiled = None;
        self.rasterized = None;
    }

    pub fn render(
        &mut self,
        document: &Document,
        options: &RenderOptions,
    ) -> Result<RenderOutput, RenderError> {
        let source = document.render();
        let document_fp = Fingerprint::of(&[source.as_bytes()]);

        let tex_path = self.workdir.tex_path();
        fs::write(&tex_path, &source).map_err(|e| RenderError::io(&tex_path, e))?;

        let mut reused = true;

        if self.compiled.as_ref() == Some(&document_fp) && self.workdir.dvi_path().exists() {
            log::debug!("Document {} unchanged, reusing DVI", document_fp.short());
        } else {
            self.invalidate();
            self.compile(document)?;
            self.compiled = Some(document_fp.clone());
            reused = false;
        }

        let raster_fp = Fingerprint::of(&[document_fp.0.as_bytes(), options.cache_key().as_bytes()]);
        let image = self.workdir.image_path(options.format);

        if self.rasterized.as_ref() == Some(&raster_fp) && image.exists() {
            log::debug!("Image {} unchanged, reusing {:?}", raster_fp.short(), image);
        } else {
            self.rasterized = None;
            self.rasterize(options, &image)?;
            self.rasterized = Some(raster_fp.clone());
            reused = false;
        }

        log::info!(
            "Rendered {} at {} dpi{}",
            image.display(),
            options.resolution,
            if reused { " (cached)" } else { "" }
        );

        Ok(RenderOutput {
            image,
            format: options.format,
            fingerprint: raster_fp,
            reused,
        })
    }

    /// Reads the current `latex` log, if any.
    pub fn log_text(&self) -> Option<String> {
        fs::read(self.workdir.log_path())
            .ok()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }

    fn compile(&self, document: &Document) -> Result<(), RenderError> {
        let dvi = self.workdir.dvi_path();
        remove_stale(&dvi)?;

        let step = Step::latex(&self.latex_program, &WorkDir::file_name("tex"));

        match step.run(self.executor.as_ref(), self.workdir.root()) {
            Ok(_) => {}
            Err(RenderError::Tool { output, .. }) => {
                let mut summary = self
                    .log_text()
                    .map(|log| LogSummary::parse(&log))
                    .unwrap_or_default();
                summary.shift_lines(document.body_line_offset(), document.body_line_count());
                log::info!("Compilation failed with {} error(s)", summary.errors.len());
                return Err(RenderError::Compile { summary, output });
            }
            Err(other) => return Err(other),
        }

        expect_artifact(step.program(), &dvi)
    }

    fn rasterize(&self, options: &RenderOptions, image: &Path) -> Result<(), RenderError> {
        remove_stale(image)?;

        let step = Step::rasterize(
            options,
            &WorkDir::file_name("dvi"),
            &WorkDir::file_name(options.format.extension()),
        );
        step.run(self.executor.as_ref(), self.workdir.root())?;

        expect_artifact(step.program(), image)
    }
}

/// Deletes the output of an earlier run so it cannot pass for fresh output.
fn remove_stale(path: &Path) -> Result<(), RenderError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(RenderError::io(path, e)),
    }
}

fn expect_artifact(program: &str, path: &Path) -> Result<(), RenderError> {
    if path.exists() {
        Ok(())
    } else {
        Err(RenderError::MissingArtifact {
            program: program.to_string(),
            path: path.to_path_buf(),
        })
    }
}
