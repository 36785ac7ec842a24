use eframe::egui;
use latexpreview_build::PACKAGE_SENTINEL;
use latexpreview_core::{PackageList, PackageLookup, RowEdit};

/// Pop-over editing the package list, one text field per row.
///
/// The last row is the `<add a LaTeX package>` row. A row's text is applied
/// when its field loses focus.
#[derive(Debug, Default)]
pub struct PackagesWindow {
    open: bool,
    drafts: Vec<String>,
    lookup: PackageLookup,
}

impl PackagesWindow {
    pub fn toggle(&mut self, packages: &PackageList) {
        self.open = !self.open;
        if self.open {
            self.sync(packages);
        }
    }

    /// Returns true when the package list changed.
    pub fn show(&mut self, ctx: &egui::Context, packages: &mut PackageList) -> bool {
        if self.drafts.len() != packages.row_count() {
            self.sync(packages);
        }

        let drafts = &mut self.drafts;
        let lookup = &mut self.lookup;
        let mut committed = None;

        egui::Window::new("Packages")
            .open(&mut self.open)
            .resizable(false)
            .default_width(280.0)
            .show(ctx, |ui| {
                for (index, draft) in drafts.iter_mut().enumerate() {
                    let sentinel = packages.is_sentinel_row(index);
                    ui.horizontal(|ui| {
                        let field = egui::TextEdit::singleline(draft)
                            .desired_width(180.0)
                            .hint_text(if sentinel { PACKAGE_SENTINEL } else { "" });
                        if ui.add(field).lost_focus() {
                            committed = Some((index, None));
                        }
                        if sentinel {
                            return;
                        }
                        if ui.small_button("✖").on_hover_text("Remove").clicked() {
                            committed = Some((index, Some(String::new())));
                        }
                        let name = packages.row(index).unwrap_or_default();
                        if lookup.is_installed(name) == Some(false) {
                            ui.colored_label(ui.visuals().warn_fg_color, "not installed");
                        }
                    });
                }
            });

        let Some((index, text)) = committed else {
            return false;
        };
        let edit = match text {
            Some(text) => self.commit(packages, index, &text),
            None => {
                let text = self.drafts.get(index).cloned().unwrap_or_default();
                self.commit(packages, index, &text)
            }
        };
        edit != RowEdit::Unchanged
    }

    fn commit(&mut self, packages: &mut PackageList, index: usize, text: &str) -> RowEdit {
        let edit = packages.edit_row(index, text);
        if edit != RowEdit::Unchanged {
            log::info!("Packages: {:?}", packages.names());
        }
        // Rejected edits snap back to the stored name.
        self.sync(packages);
        edit
    }

    fn sync(&mut self, packages: &PackageList) {
        self.drafts = packages.names().to_vec();
        self.drafts.push(String::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_adds_and_resyncs() {
        let mut window = PackagesWindow::default();
        let mut packages: PackageList = ["amsmath"].into_iter().collect();
        window.sync(&packages);
        assert_eq!(window.drafts, ["amsmath", ""]);

        assert_eq!(window.commit(&mut packages, 1, "bm"), RowEdit::Added);
        assert_eq!(window.drafts, ["amsmath", "bm", ""]);
    }

    #[test]
    fn test_rejected_edit_restores_draft() {
        let mut window = PackagesWindow::default();
        let mut packages: PackageList = ["amsmath", "bm"].into_iter().collect();
        window.sync(&packages);
        window.drafts[1] = "amsmath".to_string();

        assert_eq!(window.commit(&mut packages, 1, "amsmath"), RowEdit::Unchanged);
        assert_eq!(window.drafts, ["amsmath", "bm", ""]);
    }

    #[test]
    fn test_blank_row_removes() {
        let mut window = PackagesWindow::default();
        let mut packages: PackageList = ["amsmath", "bm"].into_iter().collect();
        window.sync(&packages);

        assert_eq!(window.commit(&mut packages, 0, "  "), RowEdit::Removed);
        assert_eq!(packages.names(), ["bm"]);
        assert_eq!(window.drafts, ["bm", ""]);
    }
}
