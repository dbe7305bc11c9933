//! Single-slot notifications.
//!
//! At most one toast is active. Showing a new one dismisses the old one
//! first; toasts close themselves once their display duration has passed
//! (checked on [`Notifier::tick`]). Drawing is delegated to a
//! [`ToastSurface`], so the same service drives a terminal or a test double.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

pub type ToastId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub kind: ToastKind,
    pub message: String,
    pub shown_at: Instant,
}

/// Where toasts are drawn.
pub trait ToastSurface {
    fn show(&mut self, toast: &Toast);

    fn dismiss(&mut self, id: ToastId);

    /// Redraw an active toast whose message changed.
    fn update(&mut self, toast: &Toast) {
        self.dismiss(toast.id);
        self.show(toast);
    }
}

/// Notification service with at most one active toast.
#[derive(Debug)]
pub struct Notifier<S: ToastSurface> {
    surface: S,
    duration: Duration,
    current: Option<Toast>,
    next_id: ToastId,
}

impl<S: ToastSurface> Notifier<S> {
    pub fn new(surface: S, duration: Duration) -> Self {
        Notifier {
            surface,
            duration,
            current: None,
            next_id: 1,
        }
    }

    /// Show a toast, replacing whatever is active.
    pub fn show(&mut self, kind: ToastKind, message: impl Into<String>) -> ToastId {
        self.close();

        let toast = Toast {
            id: self.next_id,
            kind,
            message: message.into(),
            shown_at: Instant::now(),
        };
        self.next_id += 1;

        debug!(id = toast.id, kind = ?toast.kind, message = %toast.message, "toast");
        self.surface.show(&toast);
        let id = toast.id;
        self.current = Some(toast);
        id
    }

    pub fn success(&mut self, message: impl Into<String>) -> ToastId {
        self.show(ToastKind::Success, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> ToastId {
        self.show(ToastKind::Error, message)
    }

    /// Change the message of toast `id` if it is still the active one.
    pub fn update(&mut self, id: ToastId, message: impl Into<String>) -> bool {
        match self.current.as_mut() {
            Some(toast) if toast.id == id => {
                toast.message = message.into();
                self.surface.update(toast);
                true
            }
            _ => false,
        }
    }

    /// Dismiss the active toast, if any.
    pub fn close(&mut self) -> Option<Toast> {
        let toast = self.current.take()?;
        self.surface.dismiss(toast.id);
        Some(toast)
    }

    /// Close the active toast once it has been up for the display duration.
    /// Returns true when something was closed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let expired = self
            .current
            .as_ref()
            .is_some_and(|t| now.saturating_duration_since(t.shown_at) >= self.duration);
        if expired {
            self.close();
        }
        expired
    }

    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::RecordingSurface;
    use super::*;

    fn notifier() -> Notifier<RecordingSurface> {
        Notifier::new(RecordingSurface::default(), Duration::from_secs(3))
    }

    #[test]
    fn new_toast_replaces_the_active_one() {
        let mut n = notifier();
        let first = n.success("Appointment created");
        let second = n.error("Network error");

        assert_ne!(first, second);
        assert_eq!(n.current().map(|t| t.id), Some(second));
        assert_eq!(
            n.surface().calls,
            vec![
                "show 1 Success Appointment created",
                "dismiss 1",
                "show 2 Error Network error",
            ]
        );
    }

    #[test]
    fn update_only_touches_the_active_toast() {
        let mut n = notifier();
        let stale = n.success("one");
        let active = n.success("two");

        assert!(!n.update(stale, "ignored"));
        assert!(n.update(active, "two, edited"));
        assert_eq!(n.current().unwrap().message, "two, edited");
        assert_eq!(n.surface().calls.last().unwrap(), "show 2 Success two, edited");
    }

    #[test]
    fn tick_closes_after_duration() {
        let mut n = notifier();
        n.success("saved");
        let shown = n.current().unwrap().shown_at;

        assert!(!n.tick(shown + Duration::from_secs(1)));
        assert!(n.current().is_some());
        assert!(n.tick(shown + Duration::from_secs(3)));
        assert!(n.current().is_none());
        assert!(!n.tick(shown + Duration::from_secs(10)));
    }

    #[test]
    fn close_is_a_no_op_without_a_toast() {
        let mut n = notifier();
        assert!(n.close().is_none());
        assert!(n.surface().calls.is_empty());
    }
}
