use std::collections::HashMap;

use super::EditPartViewer;
use crate::editpart::{PartId, PartKind};
use crate::event::NodeEvent;
use crate::model::ModelId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    Source,
    Target,
}

impl<M: 'static> EditPartViewer<M> {
    /// Reconciles the connections leaving `id` with its model, the same way
    /// [`Self::refresh_children`] reconciles children.
    pub fn refresh_source_connections(&mut self, id: PartId, doc: &M) {
        self.refresh_connections(id, End::Source, doc);
    }

    /// Reconciles the connections arriving at `id` with its model.
    pub fn refresh_target_connections(&mut self, id: PartId, doc: &M) {
        self.refresh_connections(id, End::Target, doc);
    }

    fn refresh_connections(&mut self, id: PartId, end: End, doc: &M) {
        let Some(node) = self.parts.get(id) else {
            return;
        };
        if node.kind == PartKind::Connection {
            return;
        }
        let model_connections = match end {
            End::Source => node.behavior.model_source_connections(node.model, doc),
            End::Target => node.behavior.model_target_connections(node.model, doc),
        };
        let existing = match end {
            End::Source => &node.source_connections,
            End::Target => &node.target_connections,
        };
        if model_connections.is_empty() && existing.is_empty() {
            return;
        }

        let model_to_part: HashMap<ModelId, PartId> = existing
            .iter()
            .filter_map(|&connection| self.parts.get(connection).map(|c| (c.model, connection)))
            .collect();

        let mut index = 0;
        for model in model_connections {
            if self.connection_model_at(id, end, index) == Some(model) {
                index += 1;
                continue;
            }

            match model_to_part.get(&model) {
                Some(&connection) => self.reorder_connection(id, end, connection, index),
                None => {
                    let connection = self.create_or_find_connection(id, model, doc);
                    match end {
                        End::Source => self.add_source_connection(id, connection, index, doc),
                        End::Target => self.add_target_connection(id, connection, index, doc),
                    }
                }
            }
            index += 1;
        }

        let trailing: Vec<PartId> = self
            .connections(id, end)
            .map(|connections| connections.iter().skip(index).copied().collect())
            .unwrap_or_default();
        for connection in trailing {
            match end {
                End::Source => self.remove_source_connection(id, connection, doc),
                End::Target => self.remove_target_connection(id, connection, doc),
            }
        }
    }

    fn connections(&self, id: PartId, end: End) -> Option<&Vec<PartId>> {
        let node = self.parts.get(id)?;
        Some(match end {
            End::Source => &node.source_connections,
            End::Target => &node.target_connections,
        })
    }

    fn connections_mut(&mut self, id: PartId, end: End) -> Option<&mut Vec<PartId>> {
        let node = self.parts.get_mut(id)?;
        Some(match end {
            End::Source => &mut node.source_connections,
            End::Target => &mut node.target_connections,
        })
    }

    fn connection_model_at(&self, id: PartId, end: End, index: usize) -> Option<ModelId> {
        let connection = *self.connections(id, end)?.get(index)?;
        self.parts.get(connection).map(|c| c.model)
    }

    /// A connection's part may already exist because the node at its other
    /// end created it first.
    fn create_or_find_connection(&mut self, node: PartId, model: ModelId, doc: &M) -> PartId {
        match self.edit_part_for_model(model) {
            Some(existing) => existing,
            None => self.create_child(node, model, doc),
        }
    }

    fn prim_add_connection(&mut self, id: PartId, end: End, connection: PartId, index: usize) -> usize {
        let Some(connections) = self.connections_mut(id, end) else {
            return index;
        };
        let index = index.min(connections.len());
        connections.insert(index, connection);
        index
    }

    fn prim_remove_connection(&mut self, id: PartId, end: End, connection: PartId) {
        if let Some(connections) = self.connections_mut(id, end) {
            connections.retain(|&c| c != connection);
        }
    }

    fn reorder_connection(&mut self, id: PartId, end: End, connection: PartId, index: usize) {
        log::trace!("Reordering connection {:?} to {}", connection, index);
        self.prim_remove_connection(id, end, connection);
        self.prim_add_connection(id, end, connection, index);
    }

    fn add_source_connection(&mut self, id: PartId, connection: PartId, index: usize, doc: &M) {
        let index = self.prim_add_connection(id, End::Source, connection, index);
        if let Some(old) = self.parts.get(connection).and_then(|c| c.source) {
            if old != id {
                self.prim_remove_connection(old, End::Source, connection);
            }
        }
        self.set_connection_source(connection, Some(id), doc);
        if self.parts.get(id).is_some_and(|node| node.active) {
            self.activate_part(connection);
        }
        self.fire_node_event(id, NodeEvent::SourceConnectionAdded { node: id, connection, index });
    }

    fn add_target_connection(&mut self, id: PartId, connection: PartId, index: usize, doc: &M) {
        let index = self.prim_add_connection(id, End::Target, connection, index);
        if let Some(old) = self.parts.get(connection).and_then(|c| c.target) {
            if old != id {
                self.prim_remove_connection(old, End::Target, connection);
            }
        }
        self.set_connection_target(connection, Some(id), doc);
        self.fire_node_event(id, NodeEvent::TargetConnectionAdded { node: id, connection, index });
    }

    fn remove_source_connection(&mut self, id: PartId, connection: PartId, doc: &M) {
        let index = self.connection_index(id, End::Source, connection);
        self.fire_node_event(id, NodeEvent::RemovingSourceConnection { node: id, connection, index });
        if self.parts.get(connection).is_some_and(|c| c.source == Some(id)) {
            self.deactivate_part(connection);
            self.set_connection_source(connection, None, doc);
        }
        self.prim_remove_connection(id, End::Source, connection);
    }

    fn remove_target_connection(&mut self, id: PartId, connection: PartId, doc: &M) {
        let index = self.connection_index(id, End::Target, connection);
        self.fire_node_event(id, NodeEvent::RemovingTargetConnection { node: id, connection, index });
        if self.parts.get(connection).is_some_and(|c| c.target == Some(id)) {
            self.set_connection_target(connection, None, doc);
        }
        self.prim_remove_connection(id, End::Target, connection);
    }

    fn connection_index(&self, id: PartId, end: End, connection: PartId) -> usize {
        self.connections(id, end)
            .and_then(|connections| connections.iter().position(|&c| c == connection))
            .unwrap_or_default()
    }

    fn fire_node_event(&self, id: PartId, event: NodeEvent) {
        if let Some(node) = self.parts.get(id) {
            node.node_listeners.emit(&event);
        }
    }

    pub(crate) fn set_connection_source(&mut self, connection: PartId, source: Option<PartId>, doc: &M) {
        self.set_connection_end(connection, End::Source, source, doc);
    }

    pub(crate) fn set_connection_target(&mut self, connection: PartId, target: Option<PartId>, doc: &M) {
        self.set_connection_end(connection, End::Target, target, doc);
    }

    /// A connection belongs to the root while it has at least one end. It
    /// joins the viewer when it gets its first end and is freed when it loses
    /// its last one.
    fn set_connection_end(&mut self, connection: PartId, end: End, node: Option<PartId>, doc: &M) {
        let Some(part) = self.parts.get_mut(connection) else {
            return;
        };
        let slot = match end {
            End::Source => &mut part.source,
            End::Target => &mut part.target,
        };
        if *slot == node {
            return;
        }
        *slot = node;
        let attached = part.source.is_some() && part.target.is_some();
        let detached = part.source.is_none() && part.target.is_none();

        if node.is_some() {
            self.set_connection_parent(connection, Some(self.root), doc);
        } else if detached {
            self.set_connection_parent(connection, None, doc);
            return;
        }
        if attached {
            self.refresh(connection, doc);
        }
    }

    fn set_connection_parent(&mut self, connection: PartId, parent: Option<PartId>, doc: &M) {
        let Some(part) = self.parts.get(connection) else {
            return;
        };
        let was_none = part.parent.is_none();
        let becoming_none = parent.is_none();
        if was_none && becoming_none {
            self.dispose_part(connection);
            return;
        }

        if becoming_none {
            self.remove_notify(connection, doc);
        }
        if let Some(part) = self.parts.get_mut(connection) {
            part.parent = parent;
        }
        if was_none {
            self.add_notify(connection, doc);
        }
        if becoming_none {
            log::debug!("Disposing detached connection {:?}", connection);
            self.dispose_part(connection);
        }
    }
}
