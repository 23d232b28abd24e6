//! User options synchronized across contexts
//!
//! Each context owns one [`OptionsStore`]. Writes go to the shared
//! [`DurableStore`](crate::storage::DurableStore) only; every context,
//! including the writer, picks them up from the store's change notifications.
//!
//! ```no_run
//! use std::sync::Arc;
//! use hms_divide::options::{OptionsStore, PartialOptions};
//! use hms_divide::storage::MemoryStore;
//! use hms_divide::Theme;
//!
//! #[tokio::main]
//! async fn main() -> hms_divide::Result<()> {
//!     let options = OptionsStore::start(Arc::new(MemoryStore::new()));
//!     options.initialized().await?;
//!
//!     options.set_options(PartialOptions::new().with_theme(Theme::Dark)).await?;
//!     let mut rx = options.subscribe();
//!     rx.wait_for(|state| state.theme == Theme::Dark).await.ok();
//!     Ok(())
//! }
//! ```

mod listener;
mod store;

pub use self::store::OptionsStore;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::Theme;
use crate::storage::StorageMap;
use crate::util::DEFAULT_ROUNDING_DECIMALS;

pub const THEME: &str = "theme";
pub const HOURS_SUFFIX: &str = "hoursSuffix";
pub const MINUTES_SUFFIX: &str = "minutesSuffix";
pub const SECONDS_SUFFIX: &str = "secondsSuffix";
pub const ROUNDING_DECIMALS: &str = "roundingDecimals";

/// Storage keys owned by the options store, in validation order
pub const OPTION_KEYS: [&str; 5] = [
    THEME,
    HOURS_SUFFIX,
    MINUTES_SUFFIX,
    SECONDS_SUFFIX,
    ROUNDING_DECIMALS,
];

/// The resolved options of one context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsState {
    /// The app theme
    pub theme: Theme,
    /// A suffix appended to hours results
    pub hours_suffix: String,
    /// A suffix appended to minutes results
    pub minutes_suffix: String,
    /// A suffix appended to seconds results
    pub seconds_suffix: String,
    /// The number of decimals to round results to
    pub rounding_decimals: f64,
}

impl Default for OptionsState {
    fn default() -> Self {
        OptionsState {
            theme: Theme::Auto,
            hours_suffix: "hrs".to_string(),
            minutes_suffix: "min".to_string(),
            seconds_suffix: "sec".to_string(),
            rounding_decimals: DEFAULT_ROUNDING_DECIMALS,
        }
    }
}

impl OptionsState {
    /// Returns every option keyed by its storage key
    pub fn to_storage_map(&self) -> StorageMap {
        StorageMap::from([
            (THEME.to_string(), Value::from(self.theme.as_str())),
            (HOURS_SUFFIX.to_string(), Value::from(self.hours_suffix.as_str())),
            (MINUTES_SUFFIX.to_string(), Value::from(self.minutes_suffix.as_str())),
            (SECONDS_SUFFIX.to_string(), Value::from(self.seconds_suffix.as_str())),
            (ROUNDING_DECIMALS.to_string(), Value::from(self.rounding_decimals)),
        ])
    }
}

/// Default value of a recognized option key
pub fn default_value(key: &str) -> Option<Value> {
    OptionsState::default().to_storage_map().remove(key)
}

/// An options update; absent fields are left alone.
///
/// Fields hold untyped values because updates also arrive from storage,
/// where anything may have been written. An explicit `null` is present and
/// fails validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialOptions {
    pub theme: Option<Value>,
    pub hours_suffix: Option<Value>,
    pub minutes_suffix: Option<Value>,
    pub seconds_suffix: Option<Value>,
    pub rounding_decimals: Option<Value>,
}

impl PartialOptions {
    /// Creates an empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an update from storage entries; unrecognized keys are ignored
    pub fn from_map(mut map: StorageMap) -> Self {
        PartialOptions {
            theme: map.remove(THEME),
            hours_suffix: map.remove(HOURS_SUFFIX),
            minutes_suffix: map.remove(MINUTES_SUFFIX),
            seconds_suffix: map.remove(SECONDS_SUFFIX),
            rounding_decimals: map.remove(ROUNDING_DECIMALS),
        }
    }

    /// Returns the present fields keyed by storage key
    pub fn into_storage_map(self) -> StorageMap {
        [
            (THEME, self.theme),
            (HOURS_SUFFIX, self.hours_suffix),
            (MINUTES_SUFFIX, self.minutes_suffix),
            (SECONDS_SUFFIX, self.seconds_suffix),
            (ROUNDING_DECIMALS, self.rounding_decimals),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key.to_string(), value)))
        .collect()
    }

    /// Whether no field is present
    pub fn is_empty(&self) -> bool {
        self.theme.is_none()
            && self.hours_suffix.is_none()
            && self.minutes_suffix.is_none()
            && self.seconds_suffix.is_none()
            && self.rounding_decimals.is_none()
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = Some(Value::from(theme.as_str()));
        self
    }

    pub fn with_hours_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.hours_suffix = Some(Value::String(suffix.into()));
        self
    }

    pub fn with_minutes_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.minutes_suffix = Some(Value::String(suffix.into()));
        self
    }

    pub fn with_seconds_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.seconds_suffix = Some(Value::String(suffix.into()));
        self
    }

    /// Sets the rounding precision; a non-finite value becomes `null`
    pub fn with_rounding_decimals(mut self, decimals: f64) -> Self {
        self.rounding_decimals = Some(Value::from(decimals));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_cover_every_key() {
        let defaults = OptionsState::default().to_storage_map();
        assert_eq!(defaults.len(), OPTION_KEYS.len());
        assert_eq!(defaults[THEME], json!("auto"));
        assert_eq!(defaults[HOURS_SUFFIX], json!("hrs"));
        assert_eq!(defaults[MINUTES_SUFFIX], json!("min"));
        assert_eq!(defaults[SECONDS_SUFFIX], json!("sec"));
        assert_eq!(default_value(ROUNDING_DECIMALS).and_then(|v| v.as_f64()), Some(4.0));
        assert_eq!(default_value("unknown"), None);
    }

    #[test]
    fn test_storage_map_drops_absent_fields() {
        let update = PartialOptions::new()
            .with_theme(Theme::Light)
            .with_rounding_decimals(2.0);
        let map = update.into_storage_map();

        assert_eq!(map.len(), 2);
        assert_eq!(map[THEME], json!("light"));
        assert_eq!(map[ROUNDING_DECIMALS], json!(2.0));
    }

    #[test]
    fn test_from_map_keeps_null() {
        let map = StorageMap::from([
            (THEME.to_string(), Value::Null),
            ("unrelated".to_string(), json!(1)),
        ]);
        let update = PartialOptions::from_map(map);

        assert_eq!(update.theme, Some(Value::Null));
        assert!(update.hours_suffix.is_none());
        assert!(!update.is_empty());
        assert!(PartialOptions::new().is_empty());
    }

    #[test]
    fn test_state_serializes_camel_case() {
        let value = serde_json::to_value(OptionsState::default()).unwrap();
        assert_eq!(value["hoursSuffix"], json!("hrs"));
        assert_eq!(value["theme"], json!("auto"));
    }
}
