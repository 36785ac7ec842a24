//! The user's package list and the `kpsewhich` lookup used to flag packages
//! that are not installed.

use latexpreview_build::{CommandExecutor, PACKAGE_SENTINEL, SystemExecutor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Ordered list of LaTeX package names.
///
/// When shown as rows, the list is followed by the [`PACKAGE_SENTINEL`] row;
/// typing into that row appends a package. The sentinel itself is never
/// stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageList(Vec<String>);

/// What [`PackageList::edit_row`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowEdit {
    Added,
    Replaced,
    Removed,
    Unchanged,
}

impl PackageList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|p| p == name.trim())
    }

    /// Number of rows including the sentinel.
    pub fn row_count(&self) -> usize {
        self.0.len() + 1
    }

    pub fn row(&self, index: usize) -> Option<&str> {
        match index.cmp(&self.0.len()) {
            std::cmp::Ordering::Less => Some(self.0[index].as_str()),
            std::cmp::Ordering::Equal => Some(PACKAGE_SENTINEL),
            std::cmp::Ordering::Greater => None,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(PACKAGE_SENTINEL))
    }

    pub fn is_sentinel_row(&self, index: usize) -> bool {
        index == self.0.len()
    }

    /// Appends `name` unless it is blank, the sentinel, or already present.
    pub fn push(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || name == PACKAGE_SENTINEL || self.contains(name) {
            return false;
        }
        self.0.push(name.to_string());
        true
    }

    /// Applies the text typed into row `index`.
    ///
    /// - sentinel row: a non-blank name is appended;
    /// - package row: blank removes the package, a new name replaces it.
    ///
    /// Duplicates and the sentinel text are ignored.
    pub fn edit_row(&mut self, index: usize, text: &str) -> RowEdit {
        if self.is_sentinel_row(index) {
            return if self.push(text) {
                RowEdit::Added
            } else {
                RowEdit::Unchanged
            };
        }
        let Some(current) = self.0.get(index) else {
            return RowEdit::Unchanged;
        };

        let text = text.trim();
        if text.is_empty() {
            self.0.remove(index);
            RowEdit::Removed
        } else if text == current || text == PACKAGE_SENTINEL || self.contains(text) {
            RowEdit::Unchanged
        } else {
            self.0[index] = text.to_string();
            RowEdit::Replaced
        }
    }

    /// Drops blank, sentinel and duplicate entries, e.g. after loading a
    /// hand-edited config file.
    pub fn normalize(&mut self) {
        let names = std::mem::take(&mut self.0);
        for name in &names {
            self.push(name);
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for PackageList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = Self::new();
        for name in iter {
            list.push(name.as_ref());
        }
        list
    }
}

/// Answers "is `<name>.sty` installed?" with `kpsewhich`, caching answers.
#[derive(Debug)]
pub struct PackageLookup {
    executor: Box<dyn CommandExecutor>,
    cwd: PathBuf,
    known: HashMap<String, Option<bool>>,
}

impl Default for PackageLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageLookup {
    pub fn new() -> Self {
        Self::with_executor(Box::new(SystemExecutor))
    }

    pub fn with_executor(executor: Box<dyn CommandExecutor>) -> Self {
        Self {
            executor,
            cwd: std::env::temp_dir(),
            known: HashMap::new(),
        }
    }

    /// `Some(true)` if found, `Some(false)` if not, `None` when `kpsewhich`
    /// itself could not be run.
    pub fn is_installed(&mut self, name: &str) -> Option<bool> {
        if let Some(answer) = self.known.get(name) {
            return *answer;
        }

        let args = [format!("{name}.sty")];
        let answer = match self.executor.execute("kpsewhich", &args, &self.cwd) {
            Ok(output) => Some(output.status.success() && !output.stdout.is_empty()),
            Err(e) => {
                log::warn!("kpsewhich unavailable: {}", e);
                None
            }
        };
        log::debug!("Package {} installed: {:?}", name, answer);
        self.known.insert(name.to_string(), answer);
        answer
    }
}
