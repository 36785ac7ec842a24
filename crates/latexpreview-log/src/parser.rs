use crate::ir::{EventPayload, LogEvent, Span};
use once_cell::sync::Lazy;
use regex::Regex;

/// Column at which TeX hard-wraps log lines (`max_print_line`).
pub const WRAP_COLUMN: usize = 79;

static MISSING_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^! LaTeX Error: File `([^']+)' not found").expect("static regex is valid")
});

static LINE_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^l\.(\d+)(?:\s+(.*))?$").expect("static regex is valid"));

/// Parser for the `.log` file written by `latex`.
///
/// The parser walks the log line by line. Errors (`!`), line references
/// (`l.<n>`) and warnings occupy whole lines. Everything else is scanned for
/// `(path` and `)` pairs, which TeX prints when it opens and closes a file.
pub struct LogParser {
    events: Vec<LogEvent>,
    file_stack: Vec<String>,
    /// Opening parentheses that turned out not to be file paths.
    text_parens: usize,
}

impl Default for LogParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LogParser {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            file_stack: Vec::new(),
            text_parens: 0,
        }
    }

    /// Parses a complete log and returns its events in order of appearance.
    pub fn parse(mut self, input: &str) -> Vec<LogEvent> {
        let lines = split_lines(input);
        let mut idx = 0;

        while idx < lines.len() {
            let (start, line) = lines[idx];
            let span = Span::new(start, start + line.len());

            if let Some(rest) = line.strip_prefix('!') {
                if let Some(caps) = MISSING_FILE.captures(line) {
                    self.push(
                        span,
                        EventPayload::MissingFile {
                            name: caps[1].to_string(),
                        },
                    );
                }
                let file = self.file_stack.last().cloned();
                self.push(
                    span,
                    EventPayload::Error {
                        message: rest.trim().to_string(),
                        file,
                    },
                );
                idx += 1;
                continue;
            }

            if let Some(caps) = LINE_REF.captures(line) {
                if let Ok(number) = caps[1].parse::<u32>() {
                    let excerpt = caps
                        .get(2)
                        .map(|m| m.as_str().trim().to_string())
                        .filter(|s| !s.is_empty());
                    self.push(
                        span,
                        EventPayload::LineRef {
                            line: number,
                            excerpt,
                        },
                    );
                    idx += 1;
                    // TeX prints the rest of the offending source line below,
                    // indented. Its parentheses belong to the user's source.
                    if lines.get(idx).is_some_and(|(_, next)| is_context_line(next)) {
                        idx += 1;
                    }
                    continue;
                }
            }

            if is_warning(line) {
                self.push(
                    span,
                    EventPayload::Warning {
                        message: line.trim().to_string(),
                    },
                );
                idx += 1;
                continue;
            }

            idx = self.scan_files(&lines, idx);
        }

        log::debug!(
            "Parsed {} log events, {} file(s) left open",
            self.events.len(),
            self.file_stack.len()
        );
        self.events
    }

    fn push(&mut self, span: Span, payload: EventPayload) {
        self.events.push(LogEvent { span, payload });
    }

    /// Scans one line for file open/close markers. Returns the index of the
    /// next line to look at, which is past any continuation lines consumed by
    /// a wrapped path.
    fn scan_files(&mut self, lines: &[(usize, &str)], mut idx: usize) -> usize {
        let (mut line_start, mut line) = lines[idx];
        let mut pos = 0;

        while pos < line.len() {
            let Some(ch) = line[pos..].chars().next() else {
                break;
            };

            match ch {
                '(' => {
                    let (path, end_idx, end_pos) = read_path(lines, idx, pos + 1);
                    if looks_like_path(&path) {
                        let end = lines[end_idx].0 + end_pos;
                        self.file_stack.push(path.clone());
                        self.push(Span::new(line_start + pos, end), EventPayload::FileEnter { path });
                        if end_idx != idx {
                            idx = end_idx;
                            (line_start, line) = lines[idx];
                        }
                        pos = end_pos;
                        continue;
                    }
                    self.text_parens += 1;
                }
                ')' => {
                    if self.text_parens > 0 {
                        self.text_parens -= 1;
                    } else if self.file_stack.pop().is_some() {
                        let at = line_start + pos;
                        self.push(Span::new(at, at + 1), EventPayload::FileExit);
                    }
                }
                _ => {}
            }

            pos += ch.len_utf8();
        }

        idx + 1
    }
}

/// Splits the input into `(byte offset, line)` pairs without line terminators.
fn split_lines(input: &str) -> Vec<(usize, &str)> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for raw in input.split_inclusive('\n') {
        let line = raw.trim_end_matches(['\n', '\r']);
        lines.push((offset, line));
        offset += raw.len();
    }
    lines
}

/// Reads a path token starting at `pos` on line `idx`. A token that runs up
/// to the wrap column continues on the next line unless that line starts a
/// new log entry.
fn read_path(lines: &[(usize, &str)], mut idx: usize, mut pos: usize) -> (String, usize, usize) {
    let mut path = String::new();

    loop {
        let line = lines[idx].1;
        let rest = &line[pos..];

        if let Some(stop) = rest.find(|c: char| c.is_whitespace() || c == '(' || c == ')') {
            path.push_str(&rest[..stop]);
            return (path, idx, pos + stop);
        }

        path.push_str(rest);
        let wrapped = line.chars().count() == WRAP_COLUMN;
        if wrapped && idx + 1 < lines.len() && !starts_entry(lines[idx + 1].1) {
            idx += 1;
            pos = 0;
        } else {
            return (path, idx, line.len());
        }
    }
}

fn starts_entry(line: &str) -> bool {
    const PREFIXES: [&str; 9] = [
        "!",
        "(",
        ")",
        "LaTeX",
        "Package",
        "Class",
        "Overfull",
        "Underfull",
        "Document Class",
    ];
    line.is_empty() || PREFIXES.iter().any(|p| line.starts_with(p))
}

fn looks_like_path(token: &str) -> bool {
    let Some(first) = token.chars().next() else {
        return false;
    };
    if first.is_ascii_digit() {
        return false;
    }
    token.starts_with('/')
        || token.starts_with('.')
        || token.starts_with('\\')
        || token.contains('/')
        || (token.contains('.') && !token.ends_with('.'))
}

fn is_context_line(line: &str) -> bool {
    line.starts_with(' ') && !line.trim().is_empty()
}

fn is_warning(line: &str) -> bool {
    if line.starts_with("Overfull \\") || line.starts_with("Underfull \\") {
        return true;
    }
    (line.starts_with("LaTeX") || line.starts_with("Package") || line.starts_with("Class"))
        && line.contains("Warning:")
}
