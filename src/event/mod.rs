mod bus;
mod events;

pub use bus::EventBus;
pub use events::*;

/// Receives events from an [`EventBus`].
///
/// Delivery is synchronous and happens on the thread that mutated the tree.
pub trait EventHandler<E> {
    fn handle_event(&mut self, event: &E);
}

impl<E, F> EventHandler<E> for F
where
    F: FnMut(&E),
{
    fn handle_event(&mut self, event: &E) {
        self(event)
    }
}
