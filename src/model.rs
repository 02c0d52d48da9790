//! The contract between the edit-part tree and the application's model.
//!
//! Model objects are never owned by the edit-part tree. They are named by a
//! [`ModelId`] and the tree asks the behaviour of each part to read whatever it
//! needs out of the application model `M`. Structural or visual changes are
//! reported back through [`Model::take_changes`].

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a model object.
///
/// Two model references are "the same object" exactly when their ids are equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelId(Uuid);

impl ModelId {
    /// A fresh, unique id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The nil id. Used for the root part, which has no model of its own.
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn uuid(&self) -> Uuid {
        self.0
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for ModelId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The short form is enough to tell objects apart in logs.
        let simple = self.0.simple().to_string();
        write!(f, "ModelId({})", &simple[..8])
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What about a model object changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    /// The ordered list of children changed
    Children,
    /// Something that only affects how the object looks
    Visuals,
    /// Connections leaving this object changed
    SourceConnections,
    /// Connections arriving at this object changed
    TargetConnections,
    /// Anything; triggers a full refresh
    Structure,
}

/// A single change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelChange {
    pub model: ModelId,
    pub kind: ChangeKind,
}

impl ModelChange {
    pub fn new(model: ModelId, kind: ChangeKind) -> Self {
        Self { model, kind }
    }
}

/// An application model that reports its own changes.
///
/// Commands mutate the model; the edit domain drains the changes afterwards and
/// hands each one to the viewer so the owning edit part can refresh.
pub trait Model {
    fn take_changes(&mut self) -> Vec<ModelChange>;
}

/// A change recorder a model can embed to implement [`Model`].
///
/// Consecutive duplicates are collapsed so a command that touches the same
/// object twice produces one notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeLog {
    #[serde(skip)]
    pending: Vec<ModelChange>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, model: ModelId, kind: ChangeKind) {
        let change = ModelChange::new(model, kind);
        if self.pending.last() != Some(&change) {
            self.pending.push(change);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn drain(&mut self) -> Vec<ModelChange> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_log_collapses_repeats() {
        let id = ModelId::new();
        let mut log = ChangeLog::new();
        log.record(id, ChangeKind::Children);
        log.record(id, ChangeKind::Children);
        log.record(id, ChangeKind::Visuals);

        let changes = log.drain();
        assert_eq!(changes.len(), 2);
        assert!(log.is_empty());
    }

    #[test]
    fn test_nil_id_is_distinct() {
        assert!(ModelId::nil().is_nil());
        assert_ne!(ModelId::new(), ModelId::nil());
    }
}
