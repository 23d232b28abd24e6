//! Per-context application state
//!
//! Each running surface builds one [`AppContext`] at its entry point and
//! hands it to its consumers. Contexts only share the durable store.

use std::sync::Arc;

use crate::conversion::{Conversion, FormattedConversion};
use crate::core::{Config, Result};
use crate::inputs::InputsStore;
use crate::options::OptionsStore;
use crate::storage::{DurableStore, JsonFileStore};
use crate::toasts::{NewToast, ToastQueue};

/// Variant attached to toasts reporting a failure
pub const ERROR_VARIANT: &str = "error";

/// The stores owned by one running context
pub struct AppContext {
    config: Config,
    options: OptionsStore,
    inputs: InputsStore,
    toasts: ToastQueue,
}

impl AppContext {
    /// Builds a context attached to `store`; options start loading at once
    pub fn start(config: Config, store: Arc<dyn DurableStore>) -> Self {
        AppContext {
            config,
            options: OptionsStore::start(store),
            inputs: InputsStore::new(),
            toasts: ToastQueue::new(),
        }
    }

    /// Opens the configured file store, builds a context on it and waits for
    /// the options to load.
    ///
    /// A failed load is reported as an error toast rather than returned, so
    /// the context stays usable for resetting bad stored values.
    pub async fn open(config: Config) -> Result<Self> {
        config.validate()?;
        let store = JsonFileStore::from_config(&config).await?;
        let context = Self::start(config, Arc::new(store));
        let loaded = context.options.initialized().await;
        let _ = context.report(loaded);
        Ok(context)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn options(&self) -> &OptionsStore {
        &self.options
    }

    pub fn inputs(&self) -> &InputsStore {
        &self.inputs
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    /// Converts the current inputs with the current options
    pub fn conversion(&self) -> FormattedConversion {
        Conversion::from_inputs(&self.inputs.snapshot()).format_with(&self.options.snapshot())
    }

    /// Shows a failed result as an error toast, passing the result through
    pub fn report<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            tracing::warn!("{}", e);
            self.toasts.add_toast(
                NewToast::new(e.to_string()).with_variant(ERROR_VARIANT),
                self.config.toast_timeout,
            );
        }
        result
    }
}
