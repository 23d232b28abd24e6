use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::listener::{self, InitState};
use super::{
    OptionsState, PartialOptions, HOURS_SUFFIX, MINUTES_SUFFIX, OPTION_KEYS, ROUNDING_DECIMALS,
    SECONDS_SUFFIX, THEME,
};
use crate::core::{Error, Result, Theme};
use crate::storage::DurableStore;
use crate::util::{describe, is_number, is_string, is_undefined};

/// The options of one context, kept in step with the durable store.
///
/// Local state only changes through [`update_options`](Self::update_options)
/// or the background listener. [`set_options`](Self::set_options) and
/// [`reset_options`](Self::reset_options) write to storage and return once
/// the store confirms; the listener applies the result later, so the new
/// values may not be visible yet when they return.
pub struct OptionsStore {
    store: Arc<dyn DurableStore>,
    state: Arc<watch::Sender<OptionsState>>,
    init: watch::Receiver<InitState>,
    listener: JoinHandle<()>,
}

impl OptionsStore {
    /// Subscribes to `store` and starts loading the options from it.
    ///
    /// Must be called inside a tokio runtime. Await
    /// [`initialized`](Self::initialized) before relying on the values.
    pub fn start(store: Arc<dyn DurableStore>) -> Self {
        let changes = store.subscribe();
        let (state, _) = watch::channel(OptionsState::default());
        let state = Arc::new(state);
        let (init_tx, init) = watch::channel(InitState::Pending);

        let listener = tokio::spawn(listener::run(
            Arc::clone(&store),
            Arc::clone(&state),
            changes,
            init_tx,
        ));

        OptionsStore {
            store,
            state,
            init,
            listener,
        }
    }

    /// Resolves once the first load from storage has completed
    pub async fn initialized(&self) -> Result<()> {
        let mut init = self.init.clone();
        let outcome = init
            .wait_for(|state| !matches!(state, InitState::Pending))
            .await
            .map_err(|_| Error::invalid_state("options listener stopped before loading"))?
            .clone();

        match outcome {
            InitState::Failed(e) => match e.as_ref() {
                Error::Validation { field, value } => Err(Error::Validation {
                    field: *field,
                    value: value.clone(),
                }),
                other => Err(Error::storage(format!("Failed to load options: {}", other))),
            },
            _ => Ok(()),
        }
    }

    /// Validates and applies an update to local state only.
    ///
    /// Fields are applied one at a time in [`OPTION_KEYS`] order. The first
    /// invalid field fails the call; fields before it stay applied and
    /// fields after it are skipped.
    pub fn update_options(&self, options: &PartialOptions) -> Result<()> {
        apply_options(&self.state, options)
    }

    /// Writes the present fields of `options` to storage
    pub async fn set_options(&self, options: PartialOptions) -> Result<()> {
        let items = options.into_storage_map();
        tracing::debug!(keys = ?items.keys().collect::<Vec<_>>(), "Writing options to storage");
        self.store.set(items).await
    }

    /// Removes every option from storage, reverting all contexts to defaults
    pub async fn reset_options(&self) -> Result<()> {
        tracing::debug!("Removing options from storage");
        let keys = OPTION_KEYS.iter().map(|key| key.to_string()).collect();
        self.store.remove(keys).await
    }

    /// Returns a copy of the current options
    pub fn snapshot(&self) -> OptionsState {
        self.state.borrow().clone()
    }

    /// Returns a read-only view notified on every change
    pub fn subscribe(&self) -> watch::Receiver<OptionsState> {
        self.state.subscribe()
    }

    pub fn theme(&self) -> Theme {
        self.state.borrow().theme
    }

    pub fn hours_suffix(&self) -> String {
        self.state.borrow().hours_suffix.clone()
    }

    pub fn minutes_suffix(&self) -> String {
        self.state.borrow().minutes_suffix.clone()
    }

    pub fn seconds_suffix(&self) -> String {
        self.state.borrow().seconds_suffix.clone()
    }

    pub fn rounding_decimals(&self) -> f64 {
        self.state.borrow().rounding_decimals
    }
}

impl Drop for OptionsStore {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

/// Loads every option, falling back to defaults, and applies the result
pub(super) async fn load_options(
    store: &dyn DurableStore,
    state: &watch::Sender<OptionsState>,
) -> Result<()> {
    let defaults = OptionsState::default().to_storage_map();
    let values = store.get(defaults).await?;
    apply_options(state, &PartialOptions::from_map(values))
}

pub(super) fn apply_options(
    state: &watch::Sender<OptionsState>,
    options: &PartialOptions,
) -> Result<()> {
    if let Some(theme) = check(THEME, options.theme.as_ref(), is_string, |v| {
        v.as_str()?.parse::<Theme>().ok()
    })? {
        state.send_modify(|s| s.theme = theme);
    }

    let hours = options.hours_suffix.as_ref();
    if let Some(suffix) = check(HOURS_SUFFIX, hours, is_string, owned_str)? {
        state.send_modify(|s| s.hours_suffix = suffix);
    }

    let minutes = options.minutes_suffix.as_ref();
    if let Some(suffix) = check(MINUTES_SUFFIX, minutes, is_string, owned_str)? {
        state.send_modify(|s| s.minutes_suffix = suffix);
    }

    let seconds = options.seconds_suffix.as_ref();
    if let Some(suffix) = check(SECONDS_SUFFIX, seconds, is_string, owned_str)? {
        state.send_modify(|s| s.seconds_suffix = suffix);
    }

    if let Some(decimals) = check(
        ROUNDING_DECIMALS,
        options.rounding_decimals.as_ref(),
        is_number,
        Value::as_f64,
    )? {
        state.send_modify(|s| s.rounding_decimals = decimals);
    }

    Ok(())
}

/// Validates one field. `Ok(None)` when the field is absent.
fn check<T>(
    field: &'static str,
    value: Option<&Value>,
    shape: fn(Option<&Value>) -> bool,
    extract: impl FnOnce(&Value) -> Option<T>,
) -> Result<Option<T>> {
    if is_undefined(value) {
        return Ok(None);
    }

    value
        .filter(|v| shape(Some(*v)))
        .and_then(extract)
        .map(Some)
        .ok_or_else(|| Error::validation(field, describe(value)))
}

fn owned_str(value: &Value) -> Option<String> {
    value.as_str().map(str::to_owned)
}
