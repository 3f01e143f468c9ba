//! Lifecycle notifications a component sends to its host.

use crate::failure::FailureReason;

#[derive(Debug, Clone, PartialEq)]
pub enum ComponentEvent {
    Activated,
    Deactivated,
    Failed(FailureReason),
}

impl ComponentEvent {
    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            ComponentEvent::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Receiver for component notifications. Delivery is fire-and-forget.
pub trait NotificationSink {
    fn notify(&mut self, event: ComponentEvent);
}

impl<S: NotificationSink + ?Sized> NotificationSink for &mut S {
    fn notify(&mut self, event: ComponentEvent) {
        (**self).notify(event)
    }
}

/// Records every notification in arrival order.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<ComponentEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[ComponentEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FailureReason> {
        self.events.iter().filter_map(ComponentEvent::failure)
    }

    pub fn drain(&mut self) -> Vec<ComponentEvent> {
        std::mem::take(&mut self.events)
    }
}

impl NotificationSink for EventLog {
    fn notify(&mut self, event: ComponentEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceType;

    #[test]
    fn test_event_log_keeps_order() {
        let mut log = EventLog::new();
        log.notify(ComponentEvent::Activated);
        log.notify(ComponentEvent::Failed(FailureReason::low_resource(
            "Pump",
            ResourceType::Power,
        )));
        log.notify(ComponentEvent::Deactivated);

        assert_eq!(log.len(), 3);
        assert_eq!(log.events()[0], ComponentEvent::Activated);
        assert_eq!(log.failures().count(), 1);

        let drained = log.drain();
        assert_eq!(drained.len(), 3);
        assert!(log.is_empty());
    }
}
