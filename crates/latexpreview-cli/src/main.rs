use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use latexpreview_build::{ImageFormat, RenderError, Rgb};
use latexpreview_core::{EditorState, Session, ToolReport, default_config_path};
use latexpreview_log::{LogParser, LogSummary};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "latexpreview")]
#[command(about = "Render LaTeX math expressions to images", long_about = None)]
struct Cli {
    /// Editor state file to read defaults from
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an expression to an image file
    Render {
        /// Math source, or `-` to read it from stdin
        #[arg(value_name = "SOURCE")]
        source: Option<String>,

        /// Where to write the image
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Resolution in dots per inch
        #[arg(long, value_name = "N")]
        dpi: Option<u32>,

        /// Foreground color as #rrggbb
        #[arg(long, value_name = "COLOR")]
        color: Option<Rgb>,

        /// Package to load; repeat for several. Replaces the saved list.
        #[arg(short, long = "package", value_name = "NAME")]
        packages: Vec<String>,

        #[arg(long, value_name = "png|gif")]
        format: Option<ImageFormat>,

        /// LaTeX program compiling the document
        #[arg(long, value_name = "PROGRAM")]
        latex: Option<String>,
    },
    /// Parse a latex log file and print its diagnostics
    Log {
        /// Path to the .log file
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Print the raw event list as JSON
        #[arg(long)]
        json: bool,
    },
    /// Report which external programs were found
    Doctor,
    /// Print the config path and the state loaded from it
    Config,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            source,
            output,
            dpi,
            color,
            packages,
            format,
            latex,
        } => {
            let mut state = EditorState::load_or_default(&config_path(cli.config)?);
            state.source = match source.as_deref() {
                None | Some("-") => read_stdin()?,
                Some(text) => text.to_string(),
            };
            apply_overrides(&mut state, dpi, color, packages, format, latex);
            render(state, &output)?;
        }
        Commands::Log { path, json } => {
            let content = fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
            let content = String::from_utf8_lossy(&content);
            if json {
                let events = LogParser::new().parse(&content);
                println!("{}", serde_json::to_string_pretty(&events)?);
            } else {
                print!("{}", describe_summary(&LogSummary::parse(&content)));
            }
        }
        Commands::Doctor => {
            let state = EditorState::load_or_default(&config_path(cli.config)?);
            let report = ToolReport::detect(&state.toolchain);
            for tool in &report.tools {
                let location = tool
                    .path
                    .as_ref()
                    .map_or_else(|| "not found".to_string(), |p| p.display().to_string());
                println!("{:<10} {:<40} {}", tool.name, tool.purpose, location);
            }
            if !report.can_copy() {
                log::warn!("Copying images to the clipboard is unavailable");
            }
            if !report.can_render() {
                bail!("latexpreview cannot render without the missing programs above");
            }
        }
        Commands::Config => {
            let path = config_path(cli.config)?;
            let state = EditorState::load_or_default(&path);
            println!("{}", path.display());
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
    }
    Ok(())
}

/// The `--config` path, or the platform default when none was given.
fn config_path(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => default_config_path().context("No configuration directory on this platform"),
    }
}

fn read_stdin() -> anyhow::Result<String> {
    let mut source = String::new();
    io::stdin()
        .read_to_string(&mut source)
        .context("Failed to read the expression from stdin")?;
    Ok(source)
}

fn apply_overrides(
    state: &mut EditorState,
    dpi: Option<u32>,
    color: Option<Rgb>,
    packages: Vec<String>,
    format: Option<ImageFormat>,
    latex: Option<String>,
) {
    if let Some(dpi) = dpi {
        state.set_resolution(dpi);
    }
    if let Some(color) = color {
        state.color = color;
    }
    if !packages.is_empty() {
        state.packages = packages.iter().collect();
    }
    if let Some(format) = format {
        state.toolchain.format = format;
    }
    if let Some(latex) = latex {
        state.toolchain.latex = latex;
    }
}

fn render(state: EditorState, output: &Path) -> anyhow::Result<()> {
    let mut session = Session::new(state).context("Failed to create a working directory")?;
    match session.export(output) {
        Ok(rendered) => {
            log::debug!("Rendered image fingerprint {}", rendered.fingerprint.short());
            Ok(())
        }
        Err(e) => {
            if let Some(RenderError::Compile { summary, .. }) = e.downcast_ref::<RenderError>() {
                eprint!("{}", describe_summary(summary));
            }
            Err(e)
        }
    }
}

fn describe_summary(summary: &LogSummary) -> String {
    let mut out = String::new();
    for error in &summary.errors {
        out.push_str(&format!("error: {error}\n"));
    }
    for warning in &summary.warnings {
        out.push_str(&format!("warning: {warning}\n"));
    }
    for name in &summary.missing_files {
        out.push_str(&format!("missing: {name}\n"));
    }
    if summary.is_clean() {
        out.push_str("no errors\n");
    }
    out
}
