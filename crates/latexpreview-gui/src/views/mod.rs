//! Windows and panels drawn by the application.

mod dialog;
mod log_window;
mod packages;
mod preview;

pub use dialog::ErrorDialog;
pub use log_window::LogWindow;
pub use packages::PackagesWindow;
pub use preview::{PreviewPanel, image_uri};
