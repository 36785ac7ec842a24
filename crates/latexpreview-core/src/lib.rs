//! # latexpreview core
//!
//! Everything behind the editor window that is not drawing pixels.
//!
//! ## Modules
//!
//! - [`state`] - Editor state and its JSON config file
//! - [`packages`] - Package list with the trailing "add" row, `kpsewhich` lookup
//! - [`session`] - Renders the current state and tracks what the preview shows
//! - [`clipboard`] - Hands images to `xclip` and keeps its processes alive
//! - [`tools`] - Finds the external programs on `PATH`
//!
//! ## Example
//!
//! ```no_run
//! use latexpreview_core::{EditorState, Session};
//!
//! let mut state = EditorState::default();
//! state.source = r"\sum_{k=1}^n k".to_string();
//!
//! let mut session = Session::new(state).unwrap();
//! match session.render() {
//!     Ok(output) => println!("image at {}", output.image.display()),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```

pub mod clipboard;
pub mod packages;
pub mod session;
pub mod state;
pub mod tools;

pub use clipboard::{ClipboardError, ClipboardKeeper, ClipboardMode};
pub use packages::{PackageList, PackageLookup, RowEdit};
pub use session::{Preview, Session};
pub use state::{EditorState, StateError, ToolchainSettings, default_config_path};
pub use tools::{ToolReport, ToolStatus};
