//! Change Notification
//!
//! Revision counter shared by the cache and the overlay layer. Every state
//! change bumps it; UI bindings subscribe and recompute their view.

use std::sync::Arc;

use tokio::sync::watch;

/// Shared revision trigger
#[derive(Clone, Debug)]
pub struct ChangeNotifier {
    revision: Arc<watch::Sender<u64>>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            revision: Arc::new(revision),
        }
    }

    /// Trigger a recompute in every subscriber
    pub fn bump(&self) {
        self.revision.send_modify(|v| *v += 1);
    }

    /// Current revision
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Receiver that wakes on every bump
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_wakes_on_bump() {
        let notifier = ChangeNotifier::new();
        let mut rx = notifier.subscribe();

        notifier.bump();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 1);
        assert_eq!(notifier.revision(), 1);
    }

    #[test]
    fn test_bump_without_subscribers() {
        let notifier = ChangeNotifier::new();
        notifier.bump();
        notifier.clone().bump();
        assert_eq!(notifier.revision(), 2);
    }
}
