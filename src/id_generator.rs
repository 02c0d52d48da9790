use std::sync::atomic::{AtomicUsize, Ordering};

// Single static counter for all listener registrations
static NEXT_LISTENER_ID: AtomicUsize = AtomicUsize::new(1);

/// Handle returned when a listener is registered, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

pub fn generate_listener_id() -> ListenerId {
    ListenerId(NEXT_LISTENER_ID.fetch_add(1, Ordering::SeqCst))
}
