//! Observer bus: synchronous fan-out of hub events.

use smarthub_domain::event::Event;

use crate::ports::Observer;

/// Ordered list of observers.
///
/// Every event reaches every observer in registration order. A failing
/// observer is logged and skipped; later observers still run.
#[derive(Default)]
pub struct ObserverBus {
    observers: Vec<Box<dyn Observer>>,
}

impl ObserverBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an observer. There is no removal.
    pub fn subscribe(&mut self, observer: Box<dyn Observer>) {
        tracing::debug!(observer = observer.name(), "observer registered");
        self.observers.push(observer);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Names of the registered observers, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.observers.iter().map(|o| o.name())
    }

    /// Deliver `event` to every observer and return how many failed.
    pub fn notify(&self, event: &Event) -> usize {
        let mut failures = 0;
        for observer in &self.observers {
            if let Err(err) = observer.notify(event) {
                failures += 1;
                tracing::warn!(
                    observer = observer.name(),
                    event_id = %event.id,
                    error = %err,
                    "observer failed to handle event"
                );
            }
        }
        failures
    }
}

impl std::fmt::Debug for ObserverBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
