//! # latexpreview log parser
//!
//! Turns the `.log` file written by `latex` into typed events and a short
//! summary a user can act on.
//!
//! ## Overview
//!
//! When a formula fails to compile, `latex` exits non-zero and the useful
//! information is buried in its log: the `!` error line, the `l.<n>` line
//! pointing back into the source, and `LaTeX Error: File ... not found` when a
//! package is missing. This crate extracts exactly that.
//!
//! - [`LogParser`] walks the log and emits [`LogEvent`](ir::LogEvent)s, tracking
//!   the stack of files TeX opened with `(path` and closed with `)`.
//! - [`LogSummary`] folds events into errors (with line and excerpt), warnings
//!   and missing files.
//!
//! ## Example
//!
//! ```
//! use latexpreview_log::LogSummary;
//!
//! let log = "(./latexpreview.tex\n! Undefined control sequence.\nl.6 \\fro\n)\n";
//! let summary = LogSummary::parse(log);
//!
//! let error = summary.first_error().unwrap();
//! assert_eq!(error.message, "Undefined control sequence.");
//! assert_eq!(error.line, Some(6));
//! assert_eq!(error.file.as_deref(), Some("./latexpreview.tex"));
//! ```

/// Typed log events.
pub mod ir;
/// Line-oriented parser.
pub mod parser;
/// Event folding into user-facing diagnostics.
pub mod summary;

pub use parser::LogParser;
pub use summary::{LogError, LogSummary};
