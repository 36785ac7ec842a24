use crate::artifacts::Fingerprint;

/// Placeholder row of the package editor. Never emitted as a package.
pub const PACKAGE_SENTINEL: &str = "<add a LaTeX package>";

const DOCUMENT_CLASS: &str = "\\documentclass[12pt]{article}\n";
const BODY_OPEN: &str = "\\pagestyle{empty}\n\\begin{document}\n\\begin{displaymath}\n";
const FOOTER: &str = "\n\\end{displaymath}\n\\end{document}\n";

/// A standalone LaTeX document holding one displayed formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    packages: Vec<String>,
    body: String,
}

impl Document {
    /// Builds a document from package names and the math source.
    ///
    /// Package names are trimmed. Blank names and [`PACKAGE_SENTINEL`] are
    /// dropped.
    pub fn new<I, S>(packages: I, body: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let packages = packages
            .into_iter()
            .map(|p| p.as_ref().trim().to_string())
            .filter(|p| !p.is_empty() && p != PACKAGE_SENTINEL)
            .collect();
        Self {
            packages,
            body: body.into(),
        }
    }

    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Everything up to and including `\begin{displaymath}`.
    pub fn preamble(&self) -> String {
        let mut out = String::from(DOCUMENT_CLASS);
        for package in &self.packages {
            out.push_str("\\usepackage{");
            out.push_str(package);
            out.push_str("}\n");
        }
        out.push_str(BODY_OPEN);
        out
    }

    pub fn render(&self) -> String {
        // Trailing blank lines would end the paragraph inside displaymath.
        let body = self.body.trim_end();
        let mut out = self.preamble();
        out.reserve(body.len() + FOOTER.len());
        out.push_str(body);
        out.push_str(FOOTER);
        out
    }

    /// Number of document lines before the first line of the body.
    pub fn body_line_offset(&self) -> u32 {
        // documentclass + packages + pagestyle/begin{document}/begin{displaymath}
        (self.packages.len() + 4) as u32
    }

    /// Number of body lines as written to the document, at least 1.
    pub fn body_line_count(&self) -> u32 {
        self.body.trim_end().lines().count().max(1) as u32
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&[self.render().as_bytes()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    #[test]
    fn test_render_with_packages() {
        let doc = Document::new(["amsmath", "amssymb"], r"\frac{a}{b} \leqslant c");
        expect![[r#"
            \documentclass[12pt]{article}
            \usepackage{amsmath}
            \usepackage{amssymb}
            \pagestyle{empty}
            \begin{document}
            \begin{displaymath}
            \frac{a}{b} \leqslant c
            \end{displaymath}
            \end{document}
        "#]]
        .assert_eq(&doc.render());
    }

    #[test]
    fn test_render_without_packages() {
        let doc = Document::new(Vec::<String>::new(), "x^2");
        expect![[r#"
            \documentclass[12pt]{article}
            \pagestyle{empty}
            \begin{document}
            \begin{displaymath}
            x^2
            \end{displaymath}
            \end{document}
        "#]]
        .assert_eq(&doc.render());
    }

    #[test]
    fn test_sentinel_and_blank_packages_are_skipped() {
        let doc = Document::new(["  amsmath ", "", "   ", PACKAGE_SENTINEL], "x");
        assert_eq!(doc.packages(), ["amsmath".to_string()]);
        assert!(!doc.render().contains(PACKAGE_SENTINEL));
    }

    #[test]
    fn test_trailing_blank_lines_are_trimmed() {
        let doc = Document::new(["amsmath"], "a + b\n\n");
        assert!(doc.render().contains("a + b\n\\end{displaymath}"));
    }

    #[test]
    fn test_body_line_offset_matches_render() {
        let doc = Document::new(["amsmath", "bm"], "first\nsecond");
        let rendered = doc.render();
        let lines: Vec<&str> = rendered.lines().collect();
        let offset = doc.body_line_offset() as usize;
        assert_eq!(lines[offset], "first");
        assert_eq!(lines[offset + 1], "second");
    }

    #[test]
    fn test_body_line_count() {
        assert_eq!(Document::new(["amsmath"], "a\nb\n\n").body_line_count(), 2);
        assert_eq!(Document::new(["amsmath"], "").body_line_count(), 1);
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = Document::new(["amsmath"], "x");
        let b = Document::new(["amsmath"], "y");
        assert_eq!(a.fingerprint(), a.clone().fingerprint());
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
