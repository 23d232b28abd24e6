//! Core types shared across hms_divide
//!
//! This module contains the error type, the theme enum and the context configuration.

pub mod error;
pub mod types;
pub mod serde;

use std::time::Duration;

pub use self::error::{Error, Result};
pub use self::types::{Config, Theme};

/// Default file backing the durable options store
pub const DEFAULT_STORAGE_PATH: &str = "./options.json";

/// Default lifetime of a toast
pub const DEFAULT_TOAST_TIMEOUT: Duration = Duration::from_millis(3000);

/// Default capacity of the storage change broadcast channel
pub const DEFAULT_CHANGE_BUFFER: usize = 64;
