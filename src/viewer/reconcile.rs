use std::collections::HashMap;

use super::EditPartViewer;
use crate::editpart::{EditPart, EditPartBehavior, PartId, PartKind, RefreshContext};
use crate::event::EditPartEvent;
use crate::model::{ChangeKind, ModelChange, ModelId};

impl<M: 'static> EditPartViewer<M> {
    /// Brings the part's visuals, children and connections up to date with the model.
    pub fn refresh(&mut self, id: PartId, doc: &M) {
        self.refresh_visuals(id, doc);
        self.refresh_children(id, doc);
        self.refresh_source_connections(id, doc);
        self.refresh_target_connections(id, doc);
    }

    pub fn refresh_visuals(&mut self, id: PartId, doc: &M) {
        let Self { parts, visuals, .. } = self;
        let Some(part) = parts.get(id) else {
            return;
        };
        let source_visual = part.source.and_then(|source| parts.get(source)).map(|source| source.visual);
        let target_visual = part.target.and_then(|target| parts.get(target)).map(|target| target.visual);
        part.behavior.refresh_visuals(RefreshContext {
            part: id,
            model: part.model,
            doc,
            visual: part.visual,
            source_visual,
            target_visual,
            visuals: visuals.as_mut(),
        });
    }

    /// Reconciles the part's children with its model children.
    ///
    /// Children are matched by model id. A child already in the right slot is
    /// left alone, one found elsewhere is moved, and a model without a part gets
    /// a new one from the factory. Whatever is left over at the end is removed.
    /// Model children must be unique; duplicates give unspecified results.
    pub fn refresh_children(&mut self, id: PartId, doc: &M) {
        let Some(part) = self.parts.get(id) else {
            return;
        };
        let model_children = self.model_children_of(part, doc);

        let model_to_part: HashMap<ModelId, PartId> = part
            .children
            .iter()
            .filter_map(|&child| self.parts.get(child).map(|c| (c.model, child)))
            .collect();

        let mut index = 0;
        for model in model_children {
            if self.child_model_at(id, index) == Some(model) {
                index += 1;
                continue;
            }

            match model_to_part.get(&model) {
                Some(&child) => self.reorder_child(id, child, index),
                None => {
                    let child = self.create_child(id, model, doc);
                    self.add_child(id, child, index, doc);
                }
            }
            index += 1;
        }

        let trailing: Vec<PartId> = self
            .parts
            .get(id)
            .map(|part| part.children.iter().skip(index).copied().collect())
            .unwrap_or_default();
        for child in trailing {
            self.remove_child(id, child, doc);
        }
    }

    /// Refreshes whatever a model change affects.
    pub fn handle_model_change(&mut self, change: ModelChange, doc: &M) {
        let Some(id) = self.edit_part_for_model(change.model) else {
            log::trace!("No edit part for {:?}", change.model);
            return;
        };
        match change.kind {
            ChangeKind::Children => self.refresh_children(id, doc),
            ChangeKind::Visuals => self.refresh_visuals(id, doc),
            ChangeKind::SourceConnections => self.refresh_source_connections(id, doc),
            ChangeKind::TargetConnections => self.refresh_target_connections(id, doc),
            ChangeKind::Structure => self.refresh(id, doc),
        }
    }

    fn model_children_of(&self, part: &EditPart<M>, doc: &M) -> Vec<ModelId> {
        if part.kind == PartKind::Root {
            return self.contents.into_iter().collect();
        }
        part.behavior.model_children(part.model, doc)
    }

    fn child_model_at(&self, id: PartId, index: usize) -> Option<ModelId> {
        let child = *self.parts.get(id)?.children.get(index)?;
        self.parts.get(child).map(|child| child.model)
    }

    /// Builds a part for `model` through the factory. The part is not yet in the tree.
    pub(crate) fn create_child(&mut self, context: PartId, model: ModelId, doc: &M) -> PartId {
        let behavior = self.factory.create_behavior(context, model, doc);
        let id = self.insert_part(model, behavior);
        log::debug!("Created edit part {:?} for {:?}", id, model);
        id
    }

    pub(crate) fn insert_part(&mut self, model: ModelId, behavior: Box<dyn EditPartBehavior<M>>) -> PartId {
        let visual = behavior.create_visual(self.visuals.as_mut());
        let content_pane = behavior.content_pane(visual, self.visuals.as_ref());
        self.parts
            .insert_with_key(|id| EditPart::new(id, model, behavior, visual, content_pane))
    }

    /// Inserts `child` at `index`, attaches its visual, runs `add_notify` and
    /// activates it when the parent is active.
    pub fn add_child(&mut self, parent: PartId, child: PartId, index: usize, doc: &M) {
        let Some(parent_part) = self.parts.get_mut(parent) else {
            return;
        };
        let index = index.min(parent_part.children.len());
        parent_part.children.insert(index, child);
        let parent_active = parent_part.active;
        if let Some(child_part) = self.parts.get_mut(child) {
            child_part.parent = Some(parent);
        }

        self.add_child_visual(parent, child, index);
        self.add_notify(child, doc);
        if parent_active {
            self.activate_part(child);
        }

        if let Some(parent_part) = self.parts.get(parent) {
            parent_part
                .listeners
                .emit(&EditPartEvent::ChildAdded { parent, child, index });
        }
    }

    /// Detaches `child` from `parent` and frees it with its whole subtree.
    /// Does nothing if `child` is not a child of `parent`.
    ///
    /// Listeners hear about the removal first, while the graph is still intact.
    pub fn remove_child(&mut self, parent: PartId, child: PartId, doc: &M) {
        let Some(parent_part) = self.parts.get(parent) else {
            return;
        };
        let Some(index) = parent_part.children.iter().position(|&c| c == child) else {
            return;
        };
        parent_part
            .listeners
            .emit(&EditPartEvent::RemovingChild { parent, child, index });
        let parent_active = parent_part.active;

        if parent_active {
            self.deactivate_part(child);
        }
        self.remove_notify(child, doc);
        self.remove_child_visual(parent, child);
        if let Some(child_part) = self.parts.get_mut(child) {
            child_part.parent = None;
        }
        if let Some(parent_part) = self.parts.get_mut(parent) {
            parent_part.children.retain(|&c| c != child);
        }
        log::debug!("Removed edit part {:?} from {:?}", child, parent);
        self.dispose_part(child);
    }

    /// Moves an existing child to `index`, keeping its layout constraint.
    ///
    /// # Panics
    /// If `child` is not a child of `parent`.
    pub fn reorder_child(&mut self, parent: PartId, child: PartId, index: usize) {
        let Some(parent_part) = self.parts.get(parent) else {
            return;
        };
        let position = parent_part.children.iter().position(|&c| c == child);
        assert!(position.is_some(), "Only children can be reordered");
        let Some(child_visual) = self.parts.get(child).map(|c| c.visual) else {
            return;
        };
        log::trace!("Reordering {:?} to {}", child, index);

        let constraint = self.visuals.constraint(child_visual);
        self.remove_child_visual(parent, child);
        if let Some(parent_part) = self.parts.get_mut(parent) {
            parent_part.children.retain(|&c| c != child);
            let index = index.min(parent_part.children.len());
            parent_part.children.insert(index, child);
        }
        self.add_child_visual(parent, child, index);
        self.visuals.set_constraint(child_visual, constraint);
    }

    fn add_child_visual(&mut self, parent: PartId, child: PartId, index: usize) {
        let (Some(parent_part), Some(child_part)) = (self.parts.get(parent), self.parts.get(child)) else {
            return;
        };
        self.visuals
            .add_child_visual(parent_part.content_pane, child_part.visual, index);
    }

    fn remove_child_visual(&mut self, parent: PartId, child: PartId) {
        let (Some(parent_part), Some(child_part)) = (self.parts.get(parent), self.parts.get(child)) else {
            return;
        };
        self.visuals
            .remove_child_visual(parent_part.content_pane, child_part.visual);
    }

    /// The part joined the viewer: register it, create its policies, then let
    /// its children join and refresh.
    pub(crate) fn add_notify(&mut self, id: PartId, doc: &M) {
        let Some(part) = self.parts.get_mut(id) else {
            return;
        };
        part.behavior.create_edit_policies(&mut part.policies);
        let (model, visual, kind) = (part.model, part.visual, part.kind);
        let children = part.children.clone();

        self.model_registry.insert(model, id);
        self.visual_registry.insert(visual, id);
        if kind == PartKind::Connection {
            self.visuals
                .add_child_visual(self.connection_layer, visual, usize::MAX);
        }

        for child in children {
            self.add_notify(child, doc);
        }
        self.refresh(id, doc);
    }

    /// The part is leaving the viewer: detach connection ends, drop selection
    /// and focus, let the children leave, then unregister.
    pub(crate) fn remove_notify(&mut self, id: PartId, doc: &M) {
        let Some(part) = self.parts.get(id) else {
            return;
        };
        let kind = part.kind;
        let visual = part.visual;
        let sources = part.source_connections.clone();
        let targets = part.target_connections.clone();

        if kind == PartKind::Connection {
            self.visuals.remove_child_visual(self.connection_layer, visual);
        } else {
            for connection in sources {
                if self.parts.get(connection).is_some_and(|c| c.source == Some(id)) {
                    self.set_connection_source(connection, None, doc);
                }
            }
            for connection in targets {
                if self.parts.get(connection).is_some_and(|c| c.target == Some(id)) {
                    self.set_connection_target(connection, None, doc);
                }
            }
        }

        let Some(part) = self.parts.get(id) else {
            return;
        };
        let selected = part.selected.is_selected();
        let focus = part.focus;
        let children = part.children.clone();
        if selected {
            self.deselect(id);
        }
        if focus {
            self.set_focus(None);
        }

        for child in children {
            self.remove_notify(child, doc);
        }
        self.clear_feedback(id);
        self.unregister(id);
    }

    fn unregister(&mut self, id: PartId) {
        let Some(part) = self.parts.get(id) else {
            return;
        };
        if self.model_registry.get(&part.model) == Some(&id) {
            self.model_registry.remove(&part.model);
        }
        if self.visual_registry.get(&part.visual) == Some(&id) {
            self.visual_registry.remove(&part.visual);
        }
    }

    /// Frees the part and its descendants from the arena.
    pub(crate) fn dispose_part(&mut self, id: PartId) {
        let Some(mut part) = self.parts.remove(id) else {
            return;
        };
        for child in part.children.drain(..) {
            self.dispose_part(child);
        }
        part.policies.release();
        self.visuals.dispose_visual(part.visual);
    }
}
