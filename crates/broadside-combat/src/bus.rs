//! Observer bus for combat notifications.
//!
//! External collaborators (UI, VFX, AI, scoring) subscribe per event kind;
//! emission is fire-and-forget and synchronous. Events are also collected
//! into a per-tick log the host can drain, for integrations that prefer
//! polling over callbacks.

use broadside_core::events::{CombatEvent, CombatEventKind};

/// A registered observer callback.
pub type Handler = Box<dyn FnMut(&CombatEvent)>;

/// Event bus owned by a single ship. Not shared across ships.
#[derive(Default)]
pub struct CombatBus {
    handlers: Vec<(Option<CombatEventKind>, Handler)>,
    log: Vec<CombatEvent>,
}

impl CombatBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a handler to one event kind.
    pub fn subscribe(&mut self, kind: CombatEventKind, handler: Handler) {
        self.handlers.push((Some(kind), handler));
    }

    /// Subscribe a handler to every event.
    pub fn subscribe_all(&mut self, handler: Handler) {
        self.handlers.push((None, handler));
    }

    /// Emit an event to matching subscribers and append it to the log.
    /// No handler response is awaited or inspected.
    pub fn emit(&mut self, event: CombatEvent) {
        for (filter, handler) in &mut self.handlers {
            if filter.map_or(true, |k| k == event.kind()) {
                handler(&event);
            }
        }
        self.log.push(event);
    }

    /// Take all events logged since the last drain.
    pub fn drain(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.log)
    }

    /// Events logged since the last drain, without consuming them.
    pub fn pending(&self) -> &[CombatEvent] {
        &self.log
    }
}
