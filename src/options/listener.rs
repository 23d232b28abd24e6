use std::sync::Arc;

use tokio::sync::{broadcast, watch};

use super::store::{apply_options, load_options};
use super::{default_value, OptionsState, PartialOptions, OPTION_KEYS};
use crate::core::Error;
use crate::storage::{DurableStore, StorageChanges, StorageMap};

/// Outcome of the first load from storage
#[derive(Debug, Clone)]
pub(super) enum InitState {
    Pending,
    Ready,
    Failed(Arc<Error>),
}

/// Turns a notification into an options update.
///
/// Keys other than the option keys are dropped. A removed key maps to its
/// default, so removals and changes are applied the same way. Returns `None`
/// when nothing recognized changed.
pub(super) fn changes_to_options(changes: &StorageChanges) -> Option<PartialOptions> {
    let values: StorageMap = changes
        .iter()
        .filter(|(key, _)| OPTION_KEYS.contains(&key.as_str()))
        .filter_map(|(key, change)| {
            change
                .new_value
                .clone()
                .or_else(|| default_value(key))
                .map(|value| (key.clone(), value))
        })
        .collect();

    (!values.is_empty()).then(|| PartialOptions::from_map(values))
}

/// Loads the options once, then applies every storage change until the
/// store goes away
pub(super) async fn run(
    store: Arc<dyn DurableStore>,
    state: Arc<watch::Sender<OptionsState>>,
    mut changes: broadcast::Receiver<StorageChanges>,
    init: watch::Sender<InitState>,
) {
    match load_options(store.as_ref(), &state).await {
        Ok(()) => {
            tracing::info!(options = ?*state.borrow(), "Options initialized from storage");
            init.send_replace(InitState::Ready);
        }
        Err(e) => {
            tracing::warn!("Failed to initialize options: {}", e);
            init.send_replace(InitState::Failed(Arc::new(e)));
        }
    }

    loop {
        match changes.recv().await {
            Ok(changes) => {
                let Some(options) = changes_to_options(&changes) else {
                    continue;
                };
                tracing::debug!(?options, "Applying options from storage");
                if let Err(e) = apply_options(&state, &options) {
                    tracing::warn!("Rejected options from storage: {}", e);
                }
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                tracing::warn!(missed, "Missed storage changes, reloading options");
                if let Err(e) = load_options(store.as_ref(), &state).await {
                    tracing::warn!("Failed to reload options: {}", e);
                }
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::debug!("Storage change stream closed");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{HOURS_SUFFIX, ROUNDING_DECIMALS, THEME};
    use crate::storage::StorageChange;
    use serde_json::json;

    fn changed(value: serde_json::Value) -> StorageChange {
        StorageChange {
            old_value: None,
            new_value: Some(value),
        }
    }

    #[test]
    fn test_removed_keys_map_to_defaults() {
        let changes = StorageChanges::from([
            (
                THEME.to_string(),
                StorageChange {
                    old_value: Some(json!("dark")),
                    new_value: None,
                },
            ),
            (ROUNDING_DECIMALS.to_string(), changed(json!(2))),
        ]);

        let options = changes_to_options(&changes).unwrap();
        assert_eq!(options.theme, Some(json!("auto")));
        assert_eq!(options.rounding_decimals, Some(json!(2)));
        assert!(options.hours_suffix.is_none());
    }

    #[test]
    fn test_unrecognized_keys_are_ignored() {
        let changes = StorageChanges::from([("somethingElse".to_string(), changed(json!(true)))]);
        assert!(changes_to_options(&changes).is_none());

        let changes = StorageChanges::from([
            ("somethingElse".to_string(), changed(json!(true))),
            (HOURS_SUFFIX.to_string(), changed(json!("h"))),
        ]);
        let options = changes_to_options(&changes).unwrap();
        assert_eq!(options.hours_suffix, Some(json!("h")));
    }
}
