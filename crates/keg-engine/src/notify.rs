//! # Notifier and Timer Slots
//!
//! Transient operator-facing messages that dismiss themselves, plus the
//! scheduled-task primitive shared with the terminal's auto-reset.
//!
//! ## Timer Classes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Each timer class holds AT MOST ONE pending task                        │
//! │                                                                         │
//! │  message timer   (owned here)          dismisses the active message     │
//! │  auto-reset timer (owned by Terminal)  resets the session after commit  │
//! │                                                                         │
//! │  Arming a class cancels and replaces whatever was pending in it, so     │
//! │  rapid successive notifications never stack or race.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Staleness
//! Cancellation is a generation counter, not call-order luck. Every arm
//! bumps the generation and hands the spawned task a token pinned to the
//! new value; cancel (or a newer arm) bumps it again. A task that fires
//! late re-checks its token under the caller's state lock and becomes a
//! no-op when stale. Canceling an already-fired or never-armed slot is a
//! no-op as well; callers may double-cancel freely.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

// =============================================================================
// Timer Slot
// =============================================================================

/// Proof of which arming a fired task belongs to.
///
/// Check it after taking whatever lock guards the state the task is about
/// to mutate; the bump in [`TimerSlot::cancel`] happens while the caller
/// holds that same lock, which closes the fire/cancel race.
#[derive(Debug)]
pub struct ArmToken {
    generation: Arc<AtomicU64>,
    armed_at: u64,
}

impl ArmToken {
    /// True while no newer arm or cancel has superseded this task.
    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.armed_at
    }
}

/// One timer class: at most one pending task.
#[derive(Debug, Default)]
pub struct TimerSlot {
    generation: Arc<AtomicU64>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl TimerSlot {
    pub fn new() -> Self {
        TimerSlot::default()
    }

    /// Schedules `f` to run after `delay`, replacing any pending task.
    ///
    /// Must be called from within a Tokio runtime. The closure receives an
    /// [`ArmToken`] and must verify it before mutating anything.
    pub fn arm<F>(&self, delay: Duration, f: F)
    where
        F: FnOnce(ArmToken) + Send + 'static,
    {
        let armed_at = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = ArmToken {
            generation: Arc::clone(&self.generation),
            armed_at,
        };

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            f(token);
        });

        let mut handle = self.handle.lock().expect("timer slot mutex poisoned");
        if let Some(previous) = handle.replace(task) {
            previous.abort();
        }
    }

    /// Invalidates and aborts any pending task. Idempotent.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut handle = self.handle.lock().expect("timer slot mutex poisoned");
        if let Some(previous) = handle.take() {
            previous.abort();
        }
    }
}

// =============================================================================
// Notifications
// =============================================================================

/// How a notification should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Neutral status message.
    Info,

    /// A completed transaction or top-up.
    Success,

    /// A rejected action; rendered flagged so the operator cannot miss it.
    Error,
}

#[derive(Debug, Clone)]
struct ActiveNotification {
    text: String,
    severity: Severity,
    deadline: Instant,
}

/// Read-only snapshot for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationView {
    pub text: String,
    pub severity: Severity,
    /// Time until auto-dismiss, for the "closing in N seconds" hint.
    pub remaining: Duration,
}

/// Manages the single active message and its dismiss timer.
#[derive(Debug)]
pub struct Notifier {
    active: Arc<Mutex<Option<ActiveNotification>>>,
    timer: TimerSlot,
    default_duration: Duration,
}

impl Notifier {
    pub fn new(default_duration: Duration) -> Self {
        Notifier {
            active: Arc::new(Mutex::new(None)),
            timer: TimerSlot::new(),
            default_duration,
        }
    }

    /// Shows a message for the default duration.
    pub fn notify(&self, severity: Severity, text: impl Into<String>) {
        self.notify_for(severity, text, self.default_duration);
    }

    /// Shows a message for a caller-chosen duration, preempting any message
    /// already up.
    pub fn notify_for(&self, severity: Severity, text: impl Into<String>, duration: Duration) {
        let text = text.into();
        debug!(?severity, %text, "notification");

        let mut active = self.lock_active();
        *active = Some(ActiveNotification {
            text,
            severity,
            deadline: Instant::now() + duration,
        });

        // The bump inside arm() happens while we hold the active lock, so a
        // previously fired dismiss task cannot clear the new message.
        let slot = Arc::clone(&self.active);
        self.timer.arm(duration, move |token| {
            let mut active = slot.lock().expect("notifier mutex poisoned");
            if !token.is_current() {
                debug!("stale dismiss ignored");
                return;
            }
            *active = None;
        });
    }

    /// Dismisses the active message early. No-op when nothing is up.
    pub fn dismiss(&self) {
        let mut active = self.lock_active();
        self.timer.cancel();
        *active = None;
    }

    /// The active message, if any, with its remaining display time.
    pub fn active(&self) -> Option<NotificationView> {
        self.lock_active().as_ref().map(|n| NotificationView {
            text: n.text.clone(),
            severity: n.severity,
            remaining: n.deadline.saturating_duration_since(Instant::now()),
        })
    }

    fn lock_active(&self) -> std::sync::MutexGuard<'_, Option<ActiveNotification>> {
        self.active.lock().expect("notifier mutex poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    async fn run_pending_timers() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slot_fires_once_with_current_token() {
        let slot = TimerSlot::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fired);
        slot.arm(Duration::from_secs(1), move |token| {
            if token.is_current() {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::advance(Duration::from_secs(2)).await;
        run_pending_timers().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_firing() {
        let slot = TimerSlot::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fired);
        slot.arm(Duration::from_secs(1), move |token| {
            if token.is_current() {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        slot.cancel();
        // Double-cancel must be harmless.
        slot.cancel();

        tokio::time::advance(Duration::from_secs(2)).await;
        run_pending_timers().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_invalidates_previous_task() {
        let slot = TimerSlot::new();
        let fired = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let counter = Arc::clone(&fired);
            slot.arm(Duration::from_secs(1), move |token| {
                if token.is_current() {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            });
        }

        tokio::time::advance(Duration::from_secs(5)).await;
        run_pending_timers().await;
        // Only the second arming may fire.
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_dismisses_after_duration() {
        let notifier = Notifier::new(Duration::from_secs(3));
        notifier.notify(Severity::Info, "pint poured");

        tokio::time::advance(Duration::from_millis(2900)).await;
        run_pending_timers().await;
        assert!(notifier.active().is_some());

        tokio::time::advance(Duration::from_millis(200)).await;
        run_pending_timers().await;
        assert!(notifier.active().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_message_preempts_pending_timer() {
        let notifier = Notifier::new(Duration::from_secs(3));
        notifier.notify(Severity::Error, "first");

        tokio::time::advance(Duration::from_secs(2)).await;
        notifier.notify(Severity::Info, "second");

        // The first message's deadline passes; the second must survive it.
        tokio::time::advance(Duration::from_secs(2)).await;
        run_pending_timers().await;
        let active = notifier.active().expect("second message still up");
        assert_eq!(active.text, "second");

        tokio::time::advance(Duration::from_millis(1100)).await;
        run_pending_timers().await;
        assert!(notifier.active().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_dismiss_is_idempotent() {
        let notifier = Notifier::new(Duration::from_secs(3));
        notifier.notify(Severity::Info, "round done");

        notifier.dismiss();
        assert!(notifier.active().is_none());

        // Dismissing with nothing up stays a no-op.
        notifier.dismiss();

        tokio::time::advance(Duration::from_secs(5)).await;
        run_pending_timers().await;
        assert!(notifier.active().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_time_counts_down() {
        let notifier = Notifier::new(Duration::from_secs(3));
        notifier.notify_for(Severity::Success, "charged", Duration::from_secs(6));

        let before = notifier.active().unwrap().remaining;
        assert_eq!(before, Duration::from_secs(6));

        tokio::time::advance(Duration::from_secs(2)).await;
        let after = notifier.active().unwrap().remaining;
        assert_eq!(after, Duration::from_secs(4));
    }
}
