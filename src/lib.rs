//! hms_divide: divide an hours/minutes/seconds duration
//!
//! The display options (theme, unit suffixes, rounding precision) live in a
//! durable key-value store shared by every running context. Each context
//! keeps its own copy of the options and converges on the stored values
//! through the store's change notifications.
pub mod context;
pub mod conversion;
pub mod core;
pub mod inputs;
pub mod options;
pub mod storage;
pub mod theme;
pub mod toasts;
pub mod util;

// Re-export commonly used items
pub use crate::context::AppContext;
pub use crate::core::{Config, Error, Result, Theme};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
