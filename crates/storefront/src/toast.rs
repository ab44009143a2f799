//! Transient toast notifications.
//!
//! Each toast walks a fixed lifecycle driven by its own timers:
//!
//! ```text
//! show ─▶ Entering ─(16ms)─▶ Visible ─(3000ms after show, or dismiss)─▶ Leaving ─(200ms)─▶ removed
//! ```
//!
//! The container is mounted with the first toast and unmounted when the last
//! one is removed. Board changes are published on a `watch` channel, which the
//! SSE stream forwards to the browser.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::watch;

/// Delay before an entering toast becomes visible (one animation frame).
pub const ENTER_DELAY: Duration = Duration::from_millis(16);
/// Time after `show` at which a toast dismisses itself.
pub const AUTO_DISMISS_DELAY: Duration = Duration::from_millis(3000);
/// Length of the leave transition before the toast is removed.
pub const LEAVE_DURATION: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(u64);

impl ToastId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ToastId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToastKind {
    #[default]
    Success,
    Info,
    Error,
}

impl ToastKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    Entering,
    Visible,
    Leaving,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub message: String,
    pub kind: ToastKind,
    pub phase: ToastPhase,
}

/// Everything currently on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToastBoard {
    /// Whether the container element exists.
    pub mounted: bool,
    pub toasts: Vec<Toast>,
}

impl ToastBoard {
    #[must_use]
    pub fn get(&self, id: ToastId) -> Option<&Toast> {
        self.toasts.iter().find(|toast| toast.id == id)
    }
}

/// Per-shopper toast notifier. Cheap to clone.
#[derive(Clone)]
pub struct Toaster {
    inner: Arc<ToasterInner>,
}

struct ToasterInner {
    board: watch::Sender<ToastBoard>,
    next_id: AtomicU64,
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Toaster {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ToasterInner {
                board: watch::Sender::new(ToastBoard::default()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Show a toast and start its timers.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn show(&self, message: impl Into<String>, kind: ToastKind) -> ToastId {
        let id = ToastId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let message = message.into();
        tracing::debug!(toast_id = %id, kind = kind.as_str(), %message, "Showing toast");

        self.inner.board.send_modify(|board| {
            board.mounted = true;
            board.toasts.push(Toast {
                id,
                message,
                kind,
                phase: ToastPhase::Entering,
            });
        });

        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(ENTER_DELAY).await;
            let Some(inner) = weak.upgrade() else { return };
            inner.board.send_if_modified(|board| {
                match board.toasts.iter_mut().find(|toast| toast.id == id) {
                    Some(toast) if toast.phase == ToastPhase::Entering => {
                        toast.phase = ToastPhase::Visible;
                        true
                    }
                    _ => false,
                }
            });
            drop(inner);

            tokio::time::sleep(AUTO_DISMISS_DELAY.saturating_sub(ENTER_DELAY)).await;
            if let Some(inner) = weak.upgrade() {
                begin_leave(&inner, id);
            }
        });

        id
    }

    /// Dismiss a toast early.
    ///
    /// Returns `false` when the toast is already leaving or gone, so repeated
    /// dismissals and a late auto-dismiss are no-ops.
    pub fn dismiss(&self, id: ToastId) -> bool {
        begin_leave(&self.inner, id)
    }

    /// Current board.
    #[must_use]
    pub fn board(&self) -> ToastBoard {
        self.inner.board.borrow().clone()
    }

    /// Receive every board change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ToastBoard> {
        self.inner.board.subscribe()
    }
}

fn begin_leave(inner: &Arc<ToasterInner>, id: ToastId) -> bool {
    let started = inner.board.send_if_modified(|board| {
        match board.toasts.iter_mut().find(|toast| toast.id == id) {
            Some(toast) if toast.phase != ToastPhase::Leaving => {
                toast.phase = ToastPhase::Leaving;
                true
            }
            _ => false,
        }
    });
    if !started {
        return false;
    }

    let weak: Weak<ToasterInner> = Arc::downgrade(inner);
    tokio::spawn(async move {
        tokio::time::sleep(LEAVE_DURATION).await;
        let Some(inner) = weak.upgrade() else { return };
        inner.board.send_if_modified(|board| {
            let before = board.toasts.len();
            board.toasts.retain(|toast| toast.id != id);
            let removed = board.toasts.len() != before;
            if board.toasts.is_empty() {
                board.mounted = false;
            }
            removed
        });
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phase(toaster: &Toaster, id: ToastId) -> Option<ToastPhase> {
        toaster.board().get(id).map(|toast| toast.phase)
    }

    async fn advance(duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_lifecycle() {
        let toaster = Toaster::new();
        assert!(!toaster.board().mounted);

        let id = toaster.show("Added to cart", ToastKind::default());
        assert!(toaster.board().mounted);
        assert_eq!(phase(&toaster, id), Some(ToastPhase::Entering));
        assert_eq!(toaster.board().get(id).map(|t| t.kind), Some(ToastKind::Success));

        advance(Duration::from_millis(20)).await;
        assert_eq!(phase(&toaster, id), Some(ToastPhase::Visible));

        advance(Duration::from_millis(2990)).await;
        assert_eq!(phase(&toaster, id), Some(ToastPhase::Leaving));

        advance(Duration::from_millis(210)).await;
        assert_eq!(phase(&toaster, id), None);
        assert!(!toaster.board().mounted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_is_idempotent() {
        let toaster = Toaster::new();
        let id = toaster.show("Removed", ToastKind::Info);

        assert!(toaster.dismiss(id));
        assert!(!toaster.dismiss(id));
        assert_eq!(phase(&toaster, id), Some(ToastPhase::Leaving));

        advance(Duration::from_millis(250)).await;
        assert_eq!(phase(&toaster, id), None);
        assert!(!toaster.dismiss(id));

        // The auto-dismiss timer still fires later and must not disturb anything.
        advance(Duration::from_secs(4)).await;
        assert!(toaster.board().toasts.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_container_stays_mounted_until_last_toast_leaves() {
        let toaster = Toaster::new();
        let first = toaster.show("one", ToastKind::Success);
        advance(Duration::from_millis(1000)).await;
        let second = toaster.show("two", ToastKind::Error);

        advance(Duration::from_millis(2250)).await;
        assert_eq!(phase(&toaster, first), None);
        assert!(phase(&toaster, second).is_some());
        assert!(toaster.board().mounted);

        advance(Duration::from_millis(1000)).await;
        assert!(toaster.board().toasts.is_empty());
        assert!(!toaster.board().mounted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_changes() {
        let toaster = Toaster::new();
        let mut rx = toaster.subscribe();
        let id = toaster.show("hello", ToastKind::Info);

        assert!(rx.has_changed().unwrap_or(false));
        let board = rx.borrow_and_update().clone();
        assert_eq!(board.toasts.len(), 1);
        assert_eq!(board.toasts[0].id, id);
    }
}
