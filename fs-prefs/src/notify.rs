use std::sync::mpsc::{channel, Receiver, Sender};

/// Fan-out of fire-and-forget change events to subscribers.
///
/// Stores own one of these and emit after a persisted write completes.
/// Delivery is best-effort: subscribers whose receiver has been dropped
/// are pruned on the next emit, and no ordering is guaranteed across
/// subscribers.
pub struct ChangeNotifier<E: Clone> {
    senders: Vec<Sender<E>>,
}

impl<E: Clone> Default for ChangeNotifier<E> {
    fn default() -> Self {
        Self {
            senders: Vec::new(),
        }
    }
}

impl<E: Clone> ChangeNotifier<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber; events emitted from now on are delivered
    /// to the returned receiver.
    pub fn subscribe(&mut self) -> Receiver<E> {
        let (tx, rx) = channel();
        self.senders.push(tx);
        rx
    }

    /// Deliver `event` to all live subscribers.
    pub fn emit(&mut self, event: E) {
        self.senders
            .retain(|sender| sender.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribers_receive_events() {
        let mut notifier: ChangeNotifier<&str> = ChangeNotifier::new();
        let first = notifier.subscribe();
        let second = notifier.subscribe();

        notifier.emit("changed");

        assert_eq!(first.try_recv(), Ok("changed"));
        assert_eq!(second.try_recv(), Ok("changed"));
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let mut notifier: ChangeNotifier<u32> = ChangeNotifier::new();
        let keep = notifier.subscribe();
        drop(notifier.subscribe());

        notifier.emit(1);
        notifier.emit(2);

        assert_eq!(keep.try_recv(), Ok(1));
        assert_eq!(keep.try_recv(), Ok(2));
    }
}
