//! Utility modules for kadmin

pub mod dryrun;
pub mod errors;
pub mod logger;
pub mod progress;
pub mod prompt;

// Re-export commonly used items
pub use errors::{AdminError, enhance_error};
pub use logger::{log_error, log_info, log_warn};
pub use prompt::confirm_delete;
