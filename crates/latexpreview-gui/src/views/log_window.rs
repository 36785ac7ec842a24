use eframe::egui;
use latexpreview_log::LogSummary;

/// Shows the diagnostics of the last `latex` run and the raw log.
#[derive(Debug, Default)]
pub struct LogWindow {
    open: bool,
    text: String,
    summary: LogSummary,
}

impl LogWindow {
    pub fn open(&mut self, log: Option<String>) {
        self.refresh(log);
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn refresh(&mut self, log: Option<String>) {
        self.text = log.unwrap_or_default();
        self.summary = LogSummary::parse(&self.text);
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        let text = &self.text;
        let summary = &self.summary;

        egui::Window::new("LaTeX log")
            .open(&mut self.open)
            .default_size([640.0, 420.0])
            .show(ctx, |ui| {
                if text.is_empty() {
                    ui.label(egui::RichText::new("Nothing has been compiled yet.").weak());
                    return;
                }

                for error in &summary.errors {
                    ui.colored_label(ui.visuals().error_fg_color, format!("error: {error}"));
                }
                for warning in &summary.warnings {
                    ui.colored_label(ui.visuals().warn_fg_color, format!("warning: {warning}"));
                }
                for name in &summary.missing_files {
                    ui.colored_label(ui.visuals().warn_fg_color, format!("missing: {name}"));
                }
                ui.separator();

                egui::ScrollArea::both()
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new(text).monospace());
                    });
            });
    }
}
