use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Per-part table of optional services, keyed by type.
///
/// Filled once by the part's behaviour when the part is created and queried
/// by tools and applications, e.g. to find out whether a part supports
/// in-place editing.
#[derive(Default)]
pub struct Capabilities {
    entries: HashMap<TypeId, Box<dyn Any>>,
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `value`, replacing any earlier value of the same type.
    pub fn register<T: Any>(&mut self, value: T) {
        self.entries.insert(TypeId::of::<T>(), Box::new(value));
    }

    pub fn get<T: Any>(&self) -> Option<&T> {
        self.entries.get(&TypeId::of::<T>()).and_then(|value| value.downcast_ref())
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
