use eframe::egui;
use latexpreview_core::Preview;
use std::path::Path;

/// URI under which egui's file loader caches an image.
pub fn image_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

pub struct PreviewPanel;

impl PreviewPanel {
    pub fn show(ui: &mut egui::Ui, preview: &Preview) {
        match preview {
            Preview::Empty => {
                ui.centered_and_justified(|ui| {
                    ui.label(egui::RichText::new("Press Preview to render the formula").weak());
                });
            }
            Preview::Image { path, .. } => {
                egui::ScrollArea::both()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        ui.vertical_centered(|ui| {
                            ui.add(
                                egui::Image::from_uri(image_uri(path))
                                    .fit_to_original_size(1.0),
                            );
                        });
                    });
            }
            Preview::Unreadable(summary) => {
                ui.vertical_centered(|ui| {
                    ui.add_space(12.0);
                    ui.label(
                        egui::RichText::new("⚠")
                            .size(48.0)
                            .color(ui.visuals().error_fg_color),
                    );
                    match summary.first_error() {
                        Some(error) => ui.label(error.to_string()),
                        None => ui.label("LaTeX could not compile the formula"),
                    };
                    if summary.errors.len() > 1 {
                        ui.label(
                            egui::RichText::new(format!(
                                "and {} more, see the log",
                                summary.errors.len() - 1
                            ))
                            .weak(),
                        );
                    }
                });
            }
        }
    }
}
