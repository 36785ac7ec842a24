use eframe::egui;

/// The "Error!" dialog. While it is open the rest of the window is disabled.
#[derive(Debug, Default)]
pub struct ErrorDialog {
    message: Option<String>,
}

impl ErrorDialog {
    /// Shows `message`, appending it if another error is still on screen.
    pub fn report(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::error!("{}", message);
        match &mut self.message {
            Some(existing) => {
                existing.push_str("\n\n");
                existing.push_str(&message);
            }
            None => self.message = Some(message),
        }
    }

    pub fn is_open(&self) -> bool {
        self.message.is_some()
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        let Some(message) = &self.message else {
            return;
        };

        let mut dismissed = false;
        egui::Window::new("Error!")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.set_max_width(480.0);
                egui::ScrollArea::vertical()
                    .max_height(300.0)
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new(message).monospace());
                    });
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
            });

        if dismissed || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.message = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_accumulate() {
        let mut dialog = ErrorDialog::default();
        assert!(!dialog.is_open());

        dialog.report("Failed to run dvipng:\nNo such file or directory");
        dialog.report("xclip terminated with exit status 1:\n");

        assert!(dialog.is_open());
        assert_eq!(
            dialog.message.as_deref(),
            Some("Failed to run dvipng:\nNo such file or directory\n\nxclip terminated with exit status 1:\n")
        );
    }
}
