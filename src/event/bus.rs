use std::cell::RefCell;

use crate::event::EventHandler;
use crate::id_generator::{ListenerId, generate_listener_id};

/// A simple event bus for broadcasting events to registered handlers, in
/// registration order
pub struct EventBus<E> {
    handlers: RefCell<Vec<(ListenerId, Box<dyn EventHandler<E>>)>>,
}

impl<E> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &format!("<{} handlers>", self.handlers.borrow().len()))
            .finish()
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventBus<E> {
    /// Creates a new event bus
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
        }
    }

    /// Subscribe a handler to receive events
    pub fn subscribe(&self, handler: Box<dyn EventHandler<E>>) -> ListenerId {
        let id = generate_listener_id();
        self.handlers.borrow_mut().push((id, handler));
        id
    }

    /// Remove a previously subscribed handler. Returns false if it was not found.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id);
        handlers.len() != before
    }

    pub fn len(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.borrow().is_empty()
    }

    /// Emit an event to all registered handlers
    pub fn emit(&self, event: &E) {
        for (_, handler) in self.handlers.borrow_mut().iter_mut() {
            handler.handle_event(event);
        }
    }
}
