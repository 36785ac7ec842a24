//! Locates the external programs the editor depends on.

use crate::state::ToolchainSettings;
use serde::Serialize;
use std::path::PathBuf;

/// One external program and where it was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolStatus {
    pub name: String,
    pub purpose: &'static str,
    pub path: Option<PathBuf>,
}

impl ToolStatus {
    pub fn found(&self) -> bool {
        self.path.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolReport {
    pub tools: Vec<ToolStatus>,
}

impl ToolReport {
    /// Searches `PATH` for every program `settings` needs.
    pub fn detect(settings: &ToolchainSettings) -> Self {
        Self::detect_with(settings, |name| which::which(name).ok())
    }

    pub fn detect_with(
        settings: &ToolchainSettings,
        lookup: impl Fn(&str) -> Option<PathBuf>,
    ) -> Self {
        let wanted = [
            (settings.latex.as_str(), "compiles the document to DVI"),
            (settings.format.program(), "converts DVI to an image"),
            ("xclip", "copies images to the clipboard"),
            ("kpsewhich", "checks whether packages are installed"),
        ];

        let tools = wanted
            .into_iter()
            .map(|(name, purpose)| {
                let path = lookup(name);
                match &path {
                    Some(p) => log::debug!("Found {} at {:?}", name, p),
                    None => log::debug!("{} not found", name),
                }
                ToolStatus {
                    name: name.to_string(),
                    purpose,
                    path,
                }
            })
            .collect();

        Self { tools }
    }

    pub fn get(&self, name: &str) -> Option<&ToolStatus> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn missing(&self) -> impl Iterator<Item = &ToolStatus> {
        self.tools.iter().filter(|t| !t.found())
    }

    /// Both the compiler and the rasterizer are present.
    pub fn can_render(&self) -> bool {
        self.tools.iter().take(2).all(ToolStatus::found)
    }

    pub fn can_copy(&self) -> bool {
        self.get("xclip").is_some_and(ToolStatus::found)
    }
}
