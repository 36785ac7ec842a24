use latexpreview_build::{CommandExecutor, ImageFormat, RenderError, Renderer, WorkDir};
use latexpreview_core::{EditorState, Preview, Session};
use std::fs;
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Output};
use std::sync::{Arc, Mutex};

#[cfg(unix)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

/// Fails `latex` whenever the source contains `\bad`.
#[derive(Debug, Clone, Default)]
struct FakeToolchain {
    calls: Arc<Mutex<Vec<String>>>,
    gif_missing: bool,
}

impl FakeToolchain {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandExecutor for FakeToolchain {
    fn execute(&self, program: &str, args: &[String], cwd: &Path) -> io::Result<Output> {
        self.calls.lock().unwrap().push(program.to_string());
        let exited = |code| Output {
            status: exit_status(code),
            stdout: Vec::new(),
            stderr: Vec::new(),
        };

        match program {
            "latex" | "pdflatex" => {
                let tex = fs::read_to_string(cwd.join("latexpreview.tex"))?;
                if tex.contains("\\bad") {
                    let line = tex.lines().position(|l| l.contains("\\bad")).unwrap() + 1;
                    fs::write(
                        cwd.join("latexpreview.log"),
                        format!("(./latexpreview.tex\n! Undefined control sequence.\nl.{line} \\bad\n)\n"),
                    )?;
                    return Ok(exited(1));
                }
                fs::write(cwd.join("latexpreview.log"), "(./latexpreview.tex)\n")?;
                fs::write(cwd.join("latexpreview.dvi"), b"dvi")?;
                Ok(exited(0))
            }
            "dvipng" | "dvigif" if !(self.gif_missing && program == "dvigif") => {
                let out = &args[args.iter().position(|a| a == "-o").unwrap() + 1];
                fs::write(cwd.join(out), args.join(" "))?;
                Ok(exited(0))
            }
            _ => Err(io::Error::new(io::ErrorKind::NotFound, "No such file or directory")),
        }
    }
}

fn session(fake: &FakeToolchain, source: &str) -> Session {
    let renderer = Renderer::with_executor(WorkDir::temporary().unwrap(), Box::new(fake.clone()));
    let mut state = EditorState::default();
    state.source = source.to_string();
    Session::with_renderer(state, renderer)
}

#[test]
fn test_render_shows_image() {
    let fake = FakeToolchain::default();
    let mut session = session(&fake, "x^2");

    let output = session.render().unwrap();

    match session.preview() {
        Preview::Image { path, format, fingerprint } => {
            assert_eq!(path, &output.image);
            assert_eq!(*format, ImageFormat::Png);
            assert_eq!(fingerprint, &output.fingerprint);
        }
        other => panic!("expected image preview, got {other:?}"),
    }
}

#[test]
fn test_compile_failure_makes_preview_unreadable() {
    let fake = FakeToolchain::default();
    let mut session = session(&fake, "a\n\\bad");

    let err = session.render().unwrap_err();
    assert!(err.is_compile_failure());

    let Preview::Unreadable(summary) = session.preview() else {
        panic!("expected unreadable preview, got {:?}", session.preview());
    };
    let error = summary.first_error().unwrap();
    assert_eq!(error.message, "Undefined control sequence.");
    assert_eq!(error.line, Some(2));
    assert!(session.log_text().unwrap().contains("Undefined control sequence."));
}

#[test]
fn test_tool_failure_keeps_previous_preview() {
    let fake = FakeToolchain {
        gif_missing: true,
        ..FakeToolchain::default()
    };
    let mut session = session(&fake, "x");
    session.render().unwrap();
    let before = session.preview().clone();

    session.state_mut().toolchain.format = ImageFormat::Gif;
    let err = session.render().unwrap_err();

    assert!(matches!(err, RenderError::Launch { ref program, .. } if program == "dvigif"));
    assert_eq!(session.preview(), &before);
}

#[test]
fn test_latex_program_follows_state() {
    let fake = FakeToolchain::default();
    let mut session = session(&fake, "x");
    session.state_mut().toolchain.latex = "pdflatex".to_string();

    session.render().unwrap();

    assert_eq!(fake.calls(), ["pdflatex", "dvipng"]);
    assert_eq!(session.renderer().latex_program(), "pdflatex");
}

#[test]
fn test_resolution_change_only_rasterizes() {
    let fake = FakeToolchain::default();
    let mut session = session(&fake, "x");
    session.render().unwrap();

    session.state_mut().set_resolution(600);
    let output = session.render().unwrap();

    assert_eq!(fake.calls(), ["latex", "dvipng", "dvipng"]);
    assert!(fs::read_to_string(output.image).unwrap().contains("-D 600"));
}

#[test]
fn test_export_copies_image() {
    let fake = FakeToolchain::default();
    let mut session = session(&fake, "x");
    let dest_dir = tempfile::tempdir().unwrap();

    let output = session.export(&dest_dir.path().join("euler")).unwrap();

    let saved = dest_dir.path().join("euler.png");
    assert_eq!(fs::read(&saved).unwrap(), fs::read(&output.image).unwrap());
    // the working copy stays for the preview
    assert!(output.image.exists());
}

#[test]
fn test_export_reports_unwritable_destination() {
    let fake = FakeToolchain::default();
    let mut session = session(&fake, "x");
    let dest_dir = tempfile::tempdir().unwrap();

    let err = session
        .export(&dest_dir.path().join("missing-dir").join("euler.png"))
        .unwrap_err();
    assert!(err.to_string().starts_with("Failed to save"), "got {err}");
}

#[test]
fn test_export_propagates_compile_failure() {
    let fake = FakeToolchain::default();
    let mut session = session(&fake, "\\bad");
    let dest_dir = tempfile::tempdir().unwrap();

    let err = session.export(&dest_dir.path().join("out.png")).unwrap_err();
    let render_err = err.downcast_ref::<RenderError>().unwrap();
    assert!(render_err.is_compile_failure());
    assert!(!dest_dir.path().join("out.png").exists());
}
