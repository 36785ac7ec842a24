use latexpreview_log::LogSummary;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong between writing the `.tex` file and reading
/// back the rendered image.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The program could not be started at all, typically because it is not
    /// installed.
    #[error("Failed to run {program}:\n{source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} terminated with exit status {}:\n{output}", status_label(.status))]
    Tool {
        program: String,
        status: Option<i32>,
        output: String,
    },

    /// `latex` rejected the document. `summary` is parsed from its log.
    #[error("LaTeX could not compile the formula{}", first_error_suffix(.summary))]
    Compile { summary: LogSummary, output: String },

    #[error("{program} finished but did not produce {}", .path.display())]
    MissingArtifact { program: String, path: PathBuf },

    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    /// True when the user's formula is at fault rather than the toolchain.
    pub fn is_compile_failure(&self) -> bool {
        matches!(self, Self::Compile { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn status_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "unknown (terminated by signal)".to_string(),
    }
}

fn first_error_suffix(summary: &LogSummary) -> String {
    summary
        .first_error()
        .map(|e| format!(": {e}"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use latexpreview_log::LogError;

    #[test]
    fn test_tool_error_message() {
        let err = RenderError::Tool {
            program: "dvipng".into(),
            status: Some(1),
            output: "dvipng: Fatal error".into(),
        };
        assert_eq!(
            err.to_string(),
            "dvipng terminated with exit status 1:\ndvipng: Fatal error"
        );
    }

    #[test]
    fn test_launch_error_message() {
        let err = RenderError::Launch {
            program: "latex".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
        };
        assert_eq!(err.to_string(), "Failed to run latex:\nNo such file or directory");
        assert!(!err.is_compile_failure());
    }

    #[test]
    fn test_compile_error_message_includes_first_error() {
        let summary = LogSummary {
            errors: vec![LogError {
                message: "Undefined control sequence.".into(),
                file: None,
                line: Some(1),
                excerpt: Some("\\fro".into()),
            }],
            ..LogSummary::default()
        };
        let err = RenderError::Compile {
            summary,
            output: String::new(),
        };
        assert!(err.is_compile_failure());
        assert_eq!(
            err.to_string(),
            "LaTeX could not compile the formula: Undefined control sequence. (line 1: \\fro)"
        );

        let bare = RenderError::Compile {
            summary: LogSummary::default(),
            output: String::new(),
        };
        assert_eq!(bare.to_string(), "LaTeX could not compile the formula");
    }
}
