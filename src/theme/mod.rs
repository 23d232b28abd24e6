//! Applies the configured theme to a document
//!
//! The document only carries a `data-theme` attribute for explicit themes;
//! [`Theme::Auto`] removes it so the platform preference applies.

use tokio::sync::watch;

use crate::core::Theme;
use crate::options::OptionsState;

/// The `data-theme` attribute value for a theme
pub fn theme_attribute(theme: Theme) -> Option<&'static str> {
    match theme {
        Theme::Dark => Some("dark"),
        Theme::Light => Some("light"),
        Theme::Auto => None,
    }
}

/// Calls `apply` with the current attribute, then again whenever the theme
/// changes. Returns once the options store is dropped.
pub async fn watch_theme<F>(mut options: watch::Receiver<OptionsState>, mut apply: F)
where
    F: FnMut(Option<&'static str>),
{
    let mut current = options.borrow_and_update().theme;
    apply(theme_attribute(current));

    while options.changed().await.is_ok() {
        let theme = options.borrow_and_update().theme;
        if theme != current {
            tracing::debug!(%theme, "Theme changed");
            current = theme;
            apply(theme_attribute(theme));
        }
    }
}
