//! Synchronous observer registry.

use super::{EventKind, OrganEvent};

/// Callback invoked with each delivered event.
pub type Listener = Box<dyn FnMut(&OrganEvent)>;

/// Handle returned on registration, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registration {
    id: ListenerId,
    /// `None` receives every event.
    filter: Option<EventKind>,
    callback: Listener,
}

/// Per-organ list of listeners.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    registrations: Vec<Registration>,
    emitted: u64,
}

impl EventBus {
    /// Create a bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for one kind of event.
    pub fn on(&mut self, kind: EventKind, callback: impl FnMut(&OrganEvent) + 'static) -> ListenerId {
        self.register(Some(kind), Box::new(callback))
    }

    /// Listen for every event.
    pub fn on_any(&mut self, callback: impl FnMut(&OrganEvent) + 'static) -> ListenerId {
        self.register(None, Box::new(callback))
    }

    /// Remove a listener. Returns false if it was not registered here.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.id != id);
        self.registrations.len() != before
    }

    /// Deliver an event to every matching listener, in registration order.
    pub fn emit(&mut self, event: OrganEvent) {
        if event.is_structural() {
            log::info!("organ event: {:?}", event);
        } else {
            log::debug!("organ event: {:?}", event);
        }

        self.emitted += 1;
        let kind = event.kind();
        for registration in &mut self.registrations {
            if registration.filter.map_or(true, |filter| filter == kind) {
                (registration.callback)(&event);
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registrations.len()
    }

    /// Number of events emitted over the bus lifetime.
    pub fn emitted_count(&self) -> u64 {
        self.emitted
    }

    fn register(&mut self, filter: Option<EventKind>, callback: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.registrations.push(Registration {
            id,
            filter,
            callback,
        });
        id
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.registrations.len())
            .field("emitted", &self.emitted)
            .finish()
    }
}
