//! Main application struct and eframe::App implementation

use crate::views::{ErrorDialog, LogWindow, PackagesWindow, PreviewPanel, image_uri};
use eframe::egui;
use egui::{Key, KeyboardShortcut, Modifiers};
use latexpreview_build::{ImageFormat, RESOLUTION_RANGE, RenderOutput, Rgb};
use latexpreview_core::{ClipboardKeeper, ClipboardMode, Session};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Preview,
    Save,
    Copy,
    Log,
    Packages,
    Quit,
}

impl Action {
    fn label(self) -> &'static str {
        match self {
            Self::Preview => "Preview",
            Self::Save => "Save…",
            Self::Copy => "Copy",
            Self::Log => "Log",
            Self::Packages => "Packages",
            Self::Quit => "Quit",
        }
    }

    fn shortcut(self) -> Option<KeyboardShortcut> {
        SHORTCUTS
            .iter()
            .find(|(_, action)| *action == self)
            .map(|(shortcut, _)| *shortcut)
    }
}

// Ctrl+Shift+C must come before any plain Ctrl shortcut on C.
const SHORTCUTS: [(KeyboardShortcut, Action); 5] = [
    (
        KeyboardShortcut::new(Modifiers::COMMAND.plus(Modifiers::SHIFT), Key::C),
        Action::Copy,
    ),
    (KeyboardShortcut::new(Modifiers::COMMAND, Key::Enter), Action::Preview),
    (KeyboardShortcut::new(Modifiers::COMMAND, Key::S), Action::Save),
    (KeyboardShortcut::new(Modifiers::COMMAND, Key::L), Action::Log),
    (KeyboardShortcut::new(Modifiers::COMMAND, Key::Q), Action::Quit),
];

pub struct PreviewApp {
    session: Session,
    config_path: Option<PathBuf>,
    /// Save dialogs start here.
    launch_dir: PathBuf,
    /// `None` when `xclip` is not installed.
    clipboard: Option<ClipboardKeeper>,
    error: ErrorDialog,
    log_window: LogWindow,
    packages: PackagesWindow,
}

impl PreviewApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        session: Session,
        config_path: Option<PathBuf>,
        launch_dir: PathBuf,
    ) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let mut app = Self {
            session,
            config_path,
            launch_dir,
            clipboard: ClipboardKeeper::detect(),
            error: ErrorDialog::default(),
            log_window: LogWindow::default(),
            packages: PackagesWindow::default(),
        };
        app.render(&cc.egui_ctx);
        app
    }

    /// Renders the current state. Compile failures only change the preview;
    /// every other failure opens the error dialog.
    fn render(&mut self, ctx: &egui::Context) -> Option<RenderOutput> {
        let result = self.session.render();
        if self.log_window.is_open() {
            self.log_window.refresh(self.session.log_text());
        }

        match result {
            Ok(output) => {
                if !output.reused {
                    ctx.forget_image(&image_uri(&output.image));
                }
                Some(output)
            }
            Err(e) if e.is_compile_failure() => {
                log::info!("{}", e);
                None
            }
            Err(e) => {
                self.error.report(e.to_string());
                None
            }
        }
    }

    fn save(&mut self, ctx: &egui::Context) {
        let Some(output) = self.render(ctx) else {
            return;
        };
        let extension = output.format.extension();
        let Some(dest) = rfd::FileDialog::new()
            .set_directory(&self.launch_dir)
            .set_file_name(format!("latexpreview.{extension}"))
            .add_filter(format!("{} image", extension.to_uppercase()), &[extension])
            .save_file()
        else {
            log::debug!("Save cancelled");
            return;
        };

        if let Err(e) = self.session.export(&dest) {
            self.error.report(format!("{e:#}"));
        }
    }

    fn copy(&mut self, ctx: &egui::Context) {
        let Some(output) = self.render(ctx) else {
            return;
        };
        let mode = self.session.state().toolchain.clipboard;
        let Some(keeper) = self.clipboard.as_mut() else {
            return;
        };
        if let Err(e) = keeper.copy(&output.image, output.format, mode) {
            self.error.report(e.to_string());
        }
    }

    fn run(&mut self, action: Action, ctx: &egui::Context) {
        log::debug!("Action: {:?}", action);
        match action {
            Action::Preview => {
                self.render(ctx);
            }
            Action::Save => self.save(ctx),
            Action::Copy => self.copy(ctx),
            Action::Log => self.log_window.open(self.session.log_text()),
            Action::Packages => self.packages.toggle(&self.session.state().packages),
            Action::Quit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) -> Option<Action> {
        if self.error.is_open() {
            return None;
        }
        ctx.input_mut(|i| {
            SHORTCUTS
                .iter()
                .find(|(shortcut, _)| i.consume_shortcut(shortcut))
                .map(|(_, action)| *action)
        })
    }

    fn poll_clipboard(&mut self, ctx: &egui::Context) {
        let Some(keeper) = self.clipboard.as_mut() else {
            return;
        };
        for e in keeper.poll() {
            self.error.report(e.to_string());
        }
        if keeper.active() > 0 {
            ctx.request_repaint_after(Duration::from_secs(1));
        }
    }

    /// Draws the toolbar and returns the clicked action. Sets `rerender` when
    /// an option affecting the image changed.
    fn toolbar(&mut self, ui: &mut egui::Ui, rerender: &mut bool) -> Option<Action> {
        let mut clicked = None;
        let can_copy = self.clipboard.is_some();

        ui.horizontal_wrapped(|ui| {
            for action in [Action::Preview, Action::Save, Action::Copy, Action::Log, Action::Packages] {
                let enabled = action != Action::Copy || can_copy;
                let mut response = ui.add_enabled(enabled, egui::Button::new(action.label()));
                if let Some(shortcut) = action.shortcut() {
                    response = response.on_hover_text(ui.ctx().format_shortcut(&shortcut));
                }
                if action == Action::Copy && !can_copy {
                    response = response.on_disabled_hover_text("xclip is not installed");
                }
                if response.clicked() {
                    clicked = Some(action);
                }
            }

            ui.separator();

            let state = self.session.state_mut();
            let mut dpi = state.resolution;
            let response = ui.add(
                egui::DragValue::new(&mut dpi)
                    .range(RESOLUTION_RANGE)
                    .suffix(" dpi"),
            );
            if dpi != state.resolution {
                state.set_resolution(dpi);
            }
            if response.drag_stopped() || (response.changed() && !response.dragged()) {
                *rerender = true;
            }

            let mut color = state.color.to_array();
            if egui::color_picker::color_edit_button_srgb(ui, &mut color).changed() {
                state.color = Rgb::from_array(color);
                *rerender = true;
            }

            let format = state.toolchain.format;
            egui::ComboBox::from_id_salt("format")
                .selected_text(format.to_string())
                .width(60.0)
                .show_ui(ui, |ui| {
                    for &choice in ImageFormat::all() {
                        ui.selectable_value(&mut state.toolchain.format, choice, choice.to_string());
                    }
                });
            if state.toolchain.format != format {
                *rerender = true;
            }

            egui::ComboBox::from_id_salt("clipboard")
                .selected_text(state.toolchain.clipboard.display_name())
                .show_ui(ui, |ui| {
                    for &mode in ClipboardMode::all() {
                        ui.selectable_value(&mut state.toolchain.clipboard, mode, mode.display_name());
                    }
                });

            ui.separator();
            let mut quit = ui.button(Action::Quit.label());
            if let Some(shortcut) = Action::Quit.shortcut() {
                quit = quit.on_hover_text(ui.ctx().format_shortcut(&shortcut));
            }
            if quit.clicked() {
                clicked = Some(Action::Quit);
            }
        });

        clicked
    }
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_clipboard(ctx);

        let modal = self.error.is_open();
        let mut action = self.handle_shortcuts(ctx);
        let mut rerender = false;

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.add_enabled_ui(!modal, |ui| {
                if let Some(clicked) = self.toolbar(ui, &mut rerender) {
                    action = Some(clicked);
                }
            });
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("preview")
            .resizable(true)
            .default_height(220.0)
            .min_height(80.0)
            .show(ctx, |ui| {
                PreviewPanel::show(ui, self.session.preview());
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!modal, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut self.session.state_mut().source)
                            .code_editor()
                            .desired_width(f32::INFINITY)
                            .desired_rows(8)
                            .hint_text(r"e^{i\pi} + 1 = 0"),
                    );
                });
            });
        });

        if !modal && self.packages.show(ctx, &mut self.session.state_mut().packages) {
            rerender = true;
        }
        self.log_window.show(ctx);
        self.error.show(ctx);

        if let Some(action) = action {
            self.run(action, ctx);
        } else if rerender {
            self.render(ctx);
        }
    }
}

impl Drop for PreviewApp {
    fn drop(&mut self) {
        if let Some(keeper) = self.clipboard.as_mut() {
            keeper.shutdown();
        }
        let Some(path) = &self.config_path else {
            return;
        };
        if let Err(e) = self.session.state().save(path) {
            log::error!("{}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_shortcut_is_distinct() {
        for (i, (a, _)) in SHORTCUTS.iter().enumerate() {
            for (b, _) in &SHORTCUTS[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_toolbar_actions_have_shortcuts() {
        for action in [Action::Preview, Action::Save, Action::Copy, Action::Log, Action::Quit] {
            assert!(action.shortcut().is_some(), "{action:?}");
        }
        assert_eq!(Action::Packages.shortcut(), None);
        assert_eq!(
            Action::Copy.shortcut(),
            Some(KeyboardShortcut::new(Modifiers::COMMAND | Modifiers::SHIFT, Key::C))
        );
    }
}
