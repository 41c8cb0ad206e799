//! Navigation hooks the host application provides to a search session.

use url::Url;

use crate::data::Item;

/// Callbacks into the host UI.
///
/// Every method defaults to doing nothing so hosts only implement the
/// navigation they support.
#[cfg_attr(test, mockall::automock)]
pub trait SearchActions: Send + Sync {
    /// Show the detail screen for a matched item.
    fn show_details(&self, _item: Item) {}

    /// Open a web page.
    fn show_web_view(&self, _url: Url) {}

    /// Dismiss the search screen.
    fn dismiss(&self) {}

    /// Send the user to the OS permission settings.
    fn open_device_settings(&self) {}
}

/// Actions that ignore every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopActions;

impl SearchActions for NoopActions {}
