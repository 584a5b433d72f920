//! UI collaborators the core calls into but does not implement.

use std::sync::Arc;

use crate::view::ViewNode;

/// Scoped "loading" indicator.
pub trait BusyIndicator: Send + Sync {
    fn show(&self);
    fn hide(&self);
}

/// Non-blocking error notifications.
pub trait Notifier: Send + Sync {
    fn error(&self, title: &str, detail: &str);
}

/// A modal dialog registered with the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Dialog {
    pub id: String,
    pub title: String,
    pub body: ViewNode,
    pub footer: ViewNode,
}

/// Hosts modal dialogs opened by trigger buttons in the view tree.
pub trait ModalHost: Send + Sync {
    fn has_dialog(&self, id: &str) -> bool;
    fn create_dialog(&self, dialog: Dialog);
}

/// Shows the busy indicator for as long as the guard lives.
#[must_use = "the indicator is hidden as soon as the guard is dropped"]
pub struct BusyGuard {
    indicator: Arc<dyn BusyIndicator>,
}

impl BusyGuard {
    pub fn acquire(indicator: Arc<dyn BusyIndicator>) -> Self {
        indicator.show();
        Self { indicator }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.indicator.hide();
    }
}

/// Bundle of the collaborators a dashboard needs.
#[derive(Clone)]
pub struct Ui {
    pub busy: Arc<dyn BusyIndicator>,
    pub notifier: Arc<dyn Notifier>,
    pub modals: Arc<dyn ModalHost>,
}

impl std::fmt::Debug for Ui {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ui").finish_non_exhaustive()
    }
}
