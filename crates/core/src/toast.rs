use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

/// How long a toast stays visible before auto-clearing.
pub const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastSeverity {
    Success,
    Error,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub text: String,
    pub severity: ToastSeverity,
}

/// Latest-value notification slot with broadcast fan-out.
///
/// At most one toast is visible at a time; a new `show` replaces the current
/// value, cancels the previous expiry timer, and restarts the TTL. The
/// generation counter guards the window between a timer firing and being
/// aborted, so a stale timer can never clear a newer toast.
#[derive(Clone)]
pub struct ToastBus {
    slot: Arc<Mutex<Slot>>,
    updates: broadcast::Sender<Option<Toast>>,
    ttl: Duration,
}

#[derive(Default)]
struct Slot {
    current: Option<Toast>,
    generation: u64,
    expiry: Option<JoinHandle<()>>,
}

impl Default for ToastBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastBus {
    pub fn new() -> Self {
        Self::with_ttl(TOAST_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        let (updates, _) = broadcast::channel(16);
        Self { slot: Arc::new(Mutex::new(Slot::default())), updates, ttl }
    }

    pub async fn show(&self, text: impl Into<String>, severity: ToastSeverity) {
        let toast = Toast { text: text.into(), severity };
        let mut slot = self.slot.lock().await;

        if let Some(expiry) = slot.expiry.take() {
            expiry.abort();
        }
        slot.generation += 1;
        slot.current = Some(toast.clone());
        let _ = self.updates.send(Some(toast));

        let generation = slot.generation;
        let bus = self.clone();
        slot.expiry = Some(tokio::spawn(async move {
            tokio::time::sleep(bus.ttl).await;
            bus.expire(generation).await;
        }));
    }

    pub async fn clear(&self) {
        let mut slot = self.slot.lock().await;
        if let Some(expiry) = slot.expiry.take() {
            expiry.abort();
        }
        slot.generation += 1;
        if slot.current.take().is_some() {
            let _ = self.updates.send(None);
        }
    }

    pub async fn current(&self) -> Option<Toast> {
        self.slot.lock().await.current.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Option<Toast>> {
        self.updates.subscribe()
    }

    async fn expire(&self, generation: u64) {
        let mut slot = self.slot.lock().await;
        if slot.generation != generation {
            return;
        }
        slot.expiry = None;
        if slot.current.take().is_some() {
            let _ = self.updates.send(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{Toast, ToastBus, ToastSeverity};

    #[tokio::test]
    async fn show_publishes_the_current_toast() {
        let bus = ToastBus::new();
        bus.show("Quote request sent successfully!", ToastSeverity::Success).await;

        assert_eq!(
            bus.current().await,
            Some(Toast {
                text: "Quote request sent successfully!".to_string(),
                severity: ToastSeverity::Success,
            })
        );
    }

    #[tokio::test]
    async fn last_write_wins_within_the_ttl_window() {
        let bus = ToastBus::new();
        let mut updates = bus.subscribe();

        bus.show("A", ToastSeverity::Success).await;
        bus.show("B", ToastSeverity::Error).await;

        let first = updates.recv().await.expect("first update");
        let second = updates.recv().await.expect("second update");
        assert_eq!(first.map(|t| t.text), Some("A".to_string()));
        assert_eq!(second.as_ref().map(|t| t.severity), Some(ToastSeverity::Error));

        let current = bus.current().await.expect("a toast should be visible");
        assert_eq!(current.text, "B");
        assert_eq!(current.severity, ToastSeverity::Error);
    }

    #[tokio::test]
    async fn toast_auto_clears_after_the_ttl() {
        let bus = ToastBus::with_ttl(Duration::from_millis(20));
        bus.show("A", ToastSeverity::Info).await;

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(bus.current().await, None);
    }

    #[tokio::test]
    async fn overwriting_restarts_the_expiry_timer() {
        let bus = ToastBus::with_ttl(Duration::from_millis(60));
        bus.show("A", ToastSeverity::Success).await;

        // Let most of A's window elapse, then overwrite. A's timer must not
        // clear B at the 60ms mark.
        tokio::time::sleep(Duration::from_millis(40)).await;
        bus.show("B", ToastSeverity::Success).await;

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(bus.current().await.map(|t| t.text), Some("B".to_string()));

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(bus.current().await, None);
    }

    #[tokio::test]
    async fn clear_empties_the_slot_immediately() {
        let bus = ToastBus::new();
        bus.show("A", ToastSeverity::Info).await;
        bus.clear().await;

        assert_eq!(bus.current().await, None);
    }
}
