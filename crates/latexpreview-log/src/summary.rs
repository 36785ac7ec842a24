use crate::LogParser;
use crate::ir::{EventPayload, LogEvent};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single `latex` error with the source line it points at, when known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        match (self.line, &self.excerpt) {
            (Some(line), Some(excerpt)) => write!(f, " (line {line}: {excerpt})"),
            (Some(line), None) => write!(f, " (line {line})"),
            _ => Ok(()),
        }
    }
}

/// What a user needs to know about a compile: errors, warnings and the files
/// TeX could not find.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSummary {
    pub errors: Vec<LogError>,
    pub warnings: Vec<String>,
    pub missing_files: Vec<String>,
}

impl LogSummary {
    /// Parses raw log text and summarizes it.
    pub fn parse(log: &str) -> Self {
        Self::from_events(&LogParser::new().parse(log))
    }

    pub fn from_events(events: &[LogEvent]) -> Self {
        let mut summary = Self::default();

        for event in events {
            match &event.payload {
                EventPayload::Error { message, file } => summary.errors.push(LogError {
                    message: message.clone(),
                    file: file.clone(),
                    line: None,
                    excerpt: None,
                }),
                EventPayload::LineRef { line, excerpt } => {
                    // A line reference belongs to the error printed just before it.
                    if let Some(last) = summary.errors.last_mut() {
                        if last.line.is_none() {
                            last.line = Some(*line);
                            last.excerpt = excerpt.clone();
                        }
                    }
                }
                EventPayload::Warning { message } => summary.warnings.push(message.clone()),
                EventPayload::MissingFile { name } => {
                    if !summary.missing_files.contains(name) {
                        summary.missing_files.push(name.clone());
                    }
                }
                EventPayload::FileEnter { .. } | EventPayload::FileExit => {}
            }
        }

        summary
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn first_error(&self) -> Option<&LogError> {
        self.errors.first()
    }

    /// Re-bases error lines so that line 1 is the first line after `offset`.
    ///
    /// Errors that point at or before `offset` lose their line number, since
    /// they refer to generated text rather than to the user's source. Errors
    /// reported after the last of `body_lines` (an unclosed group detected at
    /// `\end{displaymath}`) are pinned to that last line.
    pub fn shift_lines(&mut self, offset: u32, body_lines: u32) {
        let last = body_lines.max(1);
        for error in &mut self.errors {
            error.line = match error.line {
                Some(line) if line > offset => Some((line - offset).min(last)),
                _ => None,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_line_ref_attaches_to_preceding_error() {
        let summary = LogSummary::parse("! Undefined control sequence.\nl.7 \\foo\n");
        assert_eq!(
            summary.errors,
            vec![LogError {
                message: "Undefined control sequence.".into(),
                file: None,
                line: Some(7),
                excerpt: Some("\\foo".into()),
            }]
        );
    }

    #[test]
    fn test_second_line_ref_is_ignored() {
        let summary = LogSummary::parse("! Missing $ inserted.\nl.7 a\nl.8 b\n");
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].line, Some(7));
    }

    #[test]
    fn test_shift_lines() {
        let mut summary = LogSummary::parse("! A.\nl.8 x\n! B.\nl.3 \\usepackage{x}\n");
        summary.shift_lines(6, 3);
        assert_eq!(summary.errors[0].line, Some(2));
        assert_eq!(summary.errors[1].line, None);
    }

    #[test]
    fn test_shift_lines_pins_trailing_errors_to_last_line() {
        let mut summary = LogSummary::parse("! Missing \\right. inserted.\nl.9 \\end{displaymath}\n");
        summary.shift_lines(6, 2);
        assert_eq!(summary.errors[0].line, Some(2));
    }

    #[test]
    fn test_display() {
        let error = LogError {
            message: "Undefined control sequence.".into(),
            file: None,
            line: Some(1),
            excerpt: Some("\\fro".into()),
        };
        assert_eq!(error.to_string(), "Undefined control sequence. (line 1: \\fro)");

        let bare = LogError {
            line: None,
            excerpt: None,
            ..error
        };
        assert_eq!(bare.to_string(), "Undefined control sequence.");
    }

    #[test]
    fn test_missing_files_are_deduplicated() {
        let log = "! LaTeX Error: File `nope.sty' not found.\n\
                   ! LaTeX Error: File `nope.sty' not found.\n";
        let summary = LogSummary::parse(log);
        assert_eq!(summary.missing_files, vec!["nope.sty".to_string()]);
        assert_eq!(summary.errors.len(), 2);
    }
}
