//! latexpreview - type a LaTeX formula, see it rendered, save or copy the image.

mod app;
mod views;

use anyhow::Context;
use clap::Parser;
use eframe::egui;
use latexpreview_core::{EditorState, Session, default_config_path};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "latexpreview-gui")]
#[command(about = "Preview LaTeX math expressions", long_about = None)]
struct Cli {
    /// Editor state file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config_path = cli.config.or_else(default_config_path);
    let state = match &config_path {
        Some(path) => EditorState::load_or_default(path),
        None => {
            log::warn!("No configuration directory, settings will not be kept");
            EditorState::default()
        }
    };
    let session = Session::new(state).context("Failed to create a working directory")?;
    let launch_dir = std::env::current_dir().context("Failed to read the current directory")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("LaTeX Preview")
            .with_inner_size([720.0, 560.0])
            .with_min_inner_size([420.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        "latexpreview",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::PreviewApp::new(
                cc,
                session,
                config_path,
                launch_dir,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Failed to open the window: {e}"))
}
