//! Short-lived notifications
//!
//! Toasts are shown in insertion order and may clear themselves after a
//! timeout. Clearing is idempotent, so expiry timers are never cancelled.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

pub use crate::core::DEFAULT_TOAST_TIMEOUT;

/// A notification being shown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    /// Unique within the queue that created it
    pub id: u64,
    pub message: String,
    /// A presentation variant, such as `"error"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

/// The data for a toast about to be added
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewToast {
    pub message: String,
    pub variant: Option<String>,
}

impl NewToast {
    pub fn new(message: impl Into<String>) -> Self {
        NewToast {
            message: message.into(),
            variant: None,
        }
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }
}

struct Inner {
    next_id: AtomicU64,
    toasts: watch::Sender<Vec<Toast>>,
}

/// An ordered list of toasts.
///
/// Cloning yields another handle onto the same queue.
#[derive(Clone)]
pub struct ToastQueue {
    inner: Arc<Inner>,
}

impl ToastQueue {
    pub fn new() -> Self {
        let (toasts, _) = watch::channel(Vec::new());
        ToastQueue {
            inner: Arc::new(Inner {
                next_id: AtomicU64::new(0),
                toasts,
            }),
        }
    }

    /// Adds a toast and returns its id.
    ///
    /// A non-zero `timeout` spawns a timer on the current tokio runtime that
    /// clears the toast once it elapses; a zero timeout keeps it until
    /// [`clear_toast`](Self::clear_toast).
    pub fn add_toast(&self, toast: NewToast, timeout: Duration) -> u64 {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(id, message = %toast.message, "Adding toast");
        self.inner.toasts.send_modify(|toasts| {
            toasts.push(Toast {
                id,
                message: toast.message,
                variant: toast.variant,
            })
        });

        if !timeout.is_zero() {
            let queue = self.clone();
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                queue.clear_toast(id);
            });
        }

        id
    }

    /// Removes the toast with `id`. Returns whether one was removed.
    pub fn clear_toast(&self, id: u64) -> bool {
        self.inner.toasts.send_if_modified(|toasts| {
            match toasts.iter().position(|toast| toast.id == id) {
                Some(index) => {
                    toasts.remove(index);
                    true
                }
                None => false,
            }
        })
    }

    /// Returns a copy of the toasts, oldest first
    pub fn toasts(&self) -> Vec<Toast> {
        self.inner.toasts.borrow().clone()
    }

    /// Returns a read-only view notified on every change
    pub fn subscribe(&self) -> watch::Receiver<Vec<Toast>> {
        self.inner.toasts.subscribe()
    }
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new()
    }
}
