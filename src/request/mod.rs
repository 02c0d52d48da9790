//! Requests: typed descriptions of what the user (or code) wants to happen.
//!
//! A request is built by a tool or action, optionally accumulates the parts it
//! applies to, and is then dispatched by shared reference. Nothing in the
//! dispatch chain mutates it.

mod factory;

use egui::{Pos2, Rect, Vec2};
use serde_json::{Map, Value};

use crate::editpart::PartId;
use crate::token::define_token;

pub use factory::{CreatedObject, CreationFactory, SimpleFactory};

define_token! {
    /// The type tag of a [`Request`]. Applications may add their own with
    /// [`RequestType::custom`].
    RequestType {
        SELECTION = "selection",
        OPEN = "open",
        DELETE = "delete",
        /// Sent to a part that is leaving its parent
        ORPHAN = "orphan",
        /// Sent to the parent losing the children named in the request
        ORPHAN_CHILDREN = "orphan children",
        MOVE = "move",
        RESIZE = "resize",
        MOVE_CHILDREN = "move children",
        RESIZE_CHILDREN = "resize children",
        ADD = "add children",
        CLONE = "clone",
        CREATE = "create child",
        DIRECT_EDIT = "direct edit",
        CONNECTION_START = "connection start",
        CONNECTION_END = "connection end",
        RECONNECT_SOURCE = "Reconnection source",
        RECONNECT_TARGET = "Reconnection target",
        CREATE_BENDPOINT = "create bendpoint",
        MOVE_BENDPOINT = "move bendpoint",
        DELETE_BENDPOINT = "delete bendpoint",
    }
}

/// Extended-data key for the position of the horizontal guide a move snapped to.
pub const HORIZONTAL_GUIDE: &str = "SnapToGuides.HorizontalGuide";
/// Extended-data key for the position of the vertical guide a move snapped to.
pub const VERTICAL_GUIDE: &str = "SnapToGuides.VerticalGuide";

/// Request-specific parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestPayload {
    Plain,
    Location(Pos2),
    Group {
        parts: Vec<PartId>,
    },
    ChangeBounds {
        parts: Vec<PartId>,
        move_delta: Vec2,
        size_delta: Vec2,
        location: Option<Pos2>,
    },
    Create {
        object: CreatedObject,
        location: Option<Pos2>,
        size: Option<Vec2>,
    },
    Connection {
        source: Option<PartId>,
        target: Option<PartId>,
        /// The existing connection, for reconnect requests
        connection: Option<PartId>,
        object: Option<CreatedObject>,
        location: Option<Pos2>,
    },
    DirectEdit {
        value: String,
        location: Option<Pos2>,
    },
    Bendpoint {
        connection: PartId,
        index: usize,
        location: Pos2,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    kind: RequestType,
    payload: RequestPayload,
    extended_data: Map<String, Value>,
}

impl Request {
    pub fn new(kind: RequestType) -> Self {
        Self::with_payload(kind, RequestPayload::Plain)
    }

    pub fn with_payload(kind: RequestType, payload: RequestPayload) -> Self {
        Self {
            kind,
            payload,
            extended_data: Map::new(),
        }
    }

    pub fn selection(location: Pos2) -> Self {
        Self::with_payload(RequestType::SELECTION, RequestPayload::Location(location))
    }

    pub fn open(location: Pos2) -> Self {
        Self::with_payload(RequestType::OPEN, RequestPayload::Location(location))
    }

    pub fn group(kind: RequestType, parts: Vec<PartId>) -> Self {
        Self::with_payload(kind, RequestPayload::Group { parts })
    }

    pub fn delete(parts: Vec<PartId>) -> Self {
        Self::group(RequestType::DELETE, parts)
    }

    pub fn orphan(parts: Vec<PartId>) -> Self {
        Self::group(RequestType::ORPHAN, parts)
    }

    pub fn orphan_children(parts: Vec<PartId>) -> Self {
        Self::group(RequestType::ORPHAN_CHILDREN, parts)
    }

    pub fn change_bounds(kind: RequestType, parts: Vec<PartId>, move_delta: Vec2, size_delta: Vec2) -> Self {
        Self::with_payload(
            kind,
            RequestPayload::ChangeBounds {
                parts,
                move_delta,
                size_delta,
                location: None,
            },
        )
    }

    pub fn move_parts(parts: Vec<PartId>, move_delta: Vec2) -> Self {
        Self::change_bounds(RequestType::MOVE, parts, move_delta, Vec2::ZERO)
    }

    pub fn resize_parts(parts: Vec<PartId>, size_delta: Vec2) -> Self {
        Self::change_bounds(RequestType::RESIZE, parts, Vec2::ZERO, size_delta)
    }

    pub fn add(parts: Vec<PartId>, move_delta: Vec2, location: Pos2) -> Self {
        let mut request = Self::change_bounds(RequestType::ADD, parts, move_delta, Vec2::ZERO);
        request.set_location(location);
        request
    }

    pub fn create(object: CreatedObject, location: Pos2, size: Option<Vec2>) -> Self {
        Self::with_payload(
            RequestType::CREATE,
            RequestPayload::Create {
                object,
                location: Some(location),
                size,
            },
        )
    }

    /// The first click of a connection creation. The source is filled in once
    /// the part under the pointer is known.
    pub fn connection_start(object: CreatedObject, location: Pos2) -> Self {
        Self::with_payload(
            RequestType::CONNECTION_START,
            RequestPayload::Connection {
                source: None,
                target: None,
                connection: None,
                object: Some(object),
                location: Some(location),
            },
        )
    }

    pub fn connection_end(source: PartId, object: CreatedObject, location: Pos2) -> Self {
        Self::with_payload(
            RequestType::CONNECTION_END,
            RequestPayload::Connection {
                source: Some(source),
                target: None,
                connection: None,
                object: Some(object),
                location: Some(location),
            },
        )
    }

    pub fn reconnect_source(connection: PartId, new_source: PartId) -> Self {
        Self::with_payload(
            RequestType::RECONNECT_SOURCE,
            RequestPayload::Connection {
                source: Some(new_source),
                target: None,
                connection: Some(connection),
                object: None,
                location: None,
            },
        )
    }

    pub fn reconnect_target(connection: PartId, new_target: PartId) -> Self {
        Self::with_payload(
            RequestType::RECONNECT_TARGET,
            RequestPayload::Connection {
                source: None,
                target: Some(new_target),
                connection: Some(connection),
                object: None,
                location: None,
            },
        )
    }

    pub fn direct_edit(value: impl Into<String>) -> Self {
        Self::with_payload(
            RequestType::DIRECT_EDIT,
            RequestPayload::DirectEdit {
                value: value.into(),
                location: None,
            },
        )
    }

    pub fn bendpoint(kind: RequestType, connection: PartId, index: usize, location: Pos2) -> Self {
        Self::with_payload(
            kind,
            RequestPayload::Bendpoint {
                connection,
                index,
                location,
            },
        )
    }

    /// Builder form of [`Request::extended_data_mut`].
    pub fn with_extended_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extended_data.insert(key.into(), value.into());
        self
    }

    pub fn kind(&self) -> &RequestType {
        &self.kind
    }

    pub fn is(&self, kind: &RequestType) -> bool {
        &self.kind == kind
    }

    pub fn payload(&self) -> &RequestPayload {
        &self.payload
    }

    pub fn extended_data(&self) -> &Map<String, Value> {
        &self.extended_data
    }

    pub fn extended_data_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.extended_data
    }

    pub fn extended_f32(&self, key: &str) -> Option<f32> {
        self.extended_data.get(key).and_then(Value::as_f64).map(|v| v as f32)
    }

    /// The parts a group or change-bounds request applies to.
    pub fn parts(&self) -> &[PartId] {
        match &self.payload {
            RequestPayload::Group { parts } | RequestPayload::ChangeBounds { parts, .. } => parts,
            _ => &[],
        }
    }

    /// Accumulate a target part before dispatch. Ignored for payloads
    /// without a part list.
    pub fn push_part(&mut self, part: PartId) {
        match &mut self.payload {
            RequestPayload::Group { parts } | RequestPayload::ChangeBounds { parts, .. } => {
                parts.push(part);
            }
            _ => {}
        }
    }

    pub fn location(&self) -> Option<Pos2> {
        match &self.payload {
            RequestPayload::Location(location) => Some(*location),
            RequestPayload::ChangeBounds { location, .. }
            | RequestPayload::Create { location, .. }
            | RequestPayload::Connection { location, .. }
            | RequestPayload::DirectEdit { location, .. } => *location,
            RequestPayload::Bendpoint { location, .. } => Some(*location),
            RequestPayload::Plain | RequestPayload::Group { .. } => None,
        }
    }

    pub fn set_location(&mut self, new_location: Pos2) {
        match &mut self.payload {
            RequestPayload::Location(location) | RequestPayload::Bendpoint { location, .. } => {
                *location = new_location;
            }
            RequestPayload::ChangeBounds { location, .. }
            | RequestPayload::Create { location, .. }
            | RequestPayload::Connection { location, .. }
            | RequestPayload::DirectEdit { location, .. } => *location = Some(new_location),
            RequestPayload::Plain | RequestPayload::Group { .. } => {
                self.payload = RequestPayload::Location(new_location);
            }
        }
    }

    pub fn move_delta(&self) -> Vec2 {
        match &self.payload {
            RequestPayload::ChangeBounds { move_delta, .. } => *move_delta,
            _ => Vec2::ZERO,
        }
    }

    pub fn size_delta(&self) -> Vec2 {
        match &self.payload {
            RequestPayload::ChangeBounds { size_delta, .. } => *size_delta,
            _ => Vec2::ZERO,
        }
    }

    /// `rect` moved by the move delta and grown by the size delta.
    pub fn transformed_rect(&self, rect: Rect) -> Rect {
        Rect::from_min_size(rect.min + self.move_delta(), rect.size() + self.size_delta())
    }

    pub fn created_object(&self) -> Option<&CreatedObject> {
        match &self.payload {
            RequestPayload::Create { object, .. } => Some(object),
            RequestPayload::Connection { object, .. } => object.as_ref(),
            _ => None,
        }
    }

    pub fn size(&self) -> Option<Vec2> {
        match &self.payload {
            RequestPayload::Create { size, .. } => *size,
            _ => None,
        }
    }

    pub fn source(&self) -> Option<PartId> {
        match &self.payload {
            RequestPayload::Connection { source, .. } => *source,
            _ => None,
        }
    }

    pub fn target(&self) -> Option<PartId> {
        match &self.payload {
            RequestPayload::Connection { target, .. } => *target,
            _ => None,
        }
    }

    pub fn set_source(&mut self, part: PartId) {
        if let RequestPayload::Connection { source, .. } = &mut self.payload {
            *source = Some(part);
        }
    }

    pub fn set_target(&mut self, part: PartId) {
        if let RequestPayload::Connection { target, .. } = &mut self.payload {
            *target = Some(part);
        }
    }

    pub fn connection(&self) -> Option<PartId> {
        match &self.payload {
            RequestPayload::Connection { connection, .. } => *connection,
            RequestPayload::Bendpoint { connection, .. } => Some(*connection),
            _ => None,
        }
    }

    pub fn bendpoint_index(&self) -> Option<usize> {
        match &self.payload {
            RequestPayload::Bendpoint { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub fn direct_edit_value(&self) -> Option<&str> {
        match &self.payload {
            RequestPayload::DirectEdit { value, .. } => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    #[test]
    fn test_custom_type_matches_constant() {
        assert_eq!(RequestType::custom("delete"), RequestType::DELETE);
        assert!(Request::new(RequestType::custom("open")).is(&RequestType::OPEN));
    }

    #[test]
    fn test_transformed_rect() {
        let request = Request::change_bounds(RequestType::RESIZE, Vec::new(), vec2(5.0, -5.0), vec2(10.0, 20.0));
        let rect = Rect::from_min_size(pos2(10.0, 10.0), vec2(30.0, 30.0));

        let moved = request.transformed_rect(rect);

        assert_eq!(moved.min, pos2(15.0, 5.0));
        assert_eq!(moved.size(), vec2(40.0, 50.0));
    }

    #[test]
    fn test_extended_data() {
        let request = Request::move_parts(Vec::new(), Vec2::ZERO).with_extended_data(HORIZONTAL_GUIDE, 120);
        assert_eq!(request.extended_f32(HORIZONTAL_GUIDE), Some(120.0));
        assert_eq!(request.extended_f32(VERTICAL_GUIDE), None);
    }
}
