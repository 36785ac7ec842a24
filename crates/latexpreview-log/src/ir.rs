use serde::{Deserialize, Serialize};

/// Byte range of an event inside the log text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub span: Span,
    #[serde(flatten)]
    pub payload: EventPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum EventPayload {
    FileEnter {
        path: String,
    },
    FileExit,
    /// A line starting with `!`. `file` is the innermost open file, if any.
    Error {
        message: String,
        file: Option<String>,
    },
    /// The `l.<n> <excerpt>` line following an error.
    LineRef {
        line: u32,
        excerpt: Option<String>,
    },
    Warning {
        message: String,
    },
    /// `! LaTeX Error: File `foo.sty' not found.`
    MissingFile {
        name: String,
    },
}
