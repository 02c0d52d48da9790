//! The viewer: arena of edit parts, model and visual registries, and the
//! entry point for every operation on the part tree.

mod connections;
mod dispatch;
mod reconcile;
mod selection;
mod targeting;

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use slotmap::SlotMap;

use crate::editpart::{EditPart, EditPartBehavior, EditPartFactory, PartId, RootBehavior};
use crate::event::{EditPartEvent, EventBus, EventHandler, NodeEvent, ViewerEvent};
use crate::id_generator::ListenerId;
use crate::model::ModelId;
use crate::policy::{EditPolicy, Role};
use crate::visual::{VisualAdapter, VisualId};

pub struct EditPartViewer<M> {
    parts: SlotMap<PartId, EditPart<M>>,
    model_registry: HashMap<ModelId, PartId>,
    visual_registry: HashMap<VisualId, PartId>,
    root: PartId,
    primary_layer: VisualId,
    connection_layer: VisualId,
    feedback_layer: VisualId,
    contents: Option<ModelId>,
    factory: Box<dyn EditPartFactory<M>>,
    visuals: Box<dyn VisualAdapter>,
    /// Selected parts; the last one is the primary selection
    selection: Vec<PartId>,
    focus: Option<PartId>,
    listeners: EventBus<ViewerEvent>,
}

impl<M> fmt::Debug for EditPartViewer<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditPartViewer")
            .field("parts", &self.parts.len())
            .field("root", &self.root)
            .field("contents", &self.contents)
            .field("selection", &self.selection)
            .field("focus", &self.focus)
            .field("visuals", &self.visuals)
            .finish_non_exhaustive()
    }
}

impl<M: 'static> EditPartViewer<M> {
    /// Creates a viewer with an empty root part. The root visual holds three
    /// layers: contents, connections and feedback, bottom to top.
    pub fn new(factory: impl EditPartFactory<M> + 'static, visuals: impl VisualAdapter + 'static) -> Self {
        let mut visuals: Box<dyn VisualAdapter> = Box::new(visuals);
        let root_visual = visuals.create_layer();
        let primary_layer = visuals.create_layer();
        let connection_layer = visuals.create_layer();
        let feedback_layer = visuals.create_layer();
        visuals.add_child_visual(root_visual, primary_layer, 0);
        visuals.add_child_visual(root_visual, connection_layer, 1);
        visuals.add_child_visual(root_visual, feedback_layer, 2);

        let mut parts = SlotMap::with_key();
        let root = parts.insert_with_key(|id| {
            EditPart::new(id, ModelId::nil(), Box::new(RootBehavior), root_visual, primary_layer)
        });

        let mut viewer = Self {
            parts,
            model_registry: HashMap::new(),
            visual_registry: HashMap::new(),
            root,
            primary_layer,
            connection_layer,
            feedback_layer,
            contents: None,
            factory: Box::new(factory),
            visuals,
            selection: Vec::new(),
            focus: None,
            listeners: EventBus::new(),
        };
        viewer.visual_registry.insert(root_visual, root);
        if let Some(root_part) = viewer.parts.get_mut(root) {
            root_part.behavior.create_edit_policies(&mut root_part.policies);
        }
        viewer
    }

    /// Replaces the model shown by the viewer.
    pub fn set_contents(&mut self, contents: Option<ModelId>, doc: &M) {
        if self.contents == contents {
            return;
        }
        log::debug!("Setting viewer contents to {:?}", contents);
        self.contents = contents;
        self.refresh_children(self.root, doc);
    }

    pub fn contents(&self) -> Option<ModelId> {
        self.contents
    }

    /// The part showing the contents.
    pub fn contents_part(&self) -> Option<PartId> {
        self.parts.get(self.root)?.children.first().copied()
    }

    pub fn root(&self) -> PartId {
        self.root
    }

    pub fn part(&self, id: PartId) -> Option<&EditPart<M>> {
        self.parts.get(id)
    }

    pub fn contains_part(&self, id: PartId) -> bool {
        self.parts.contains_key(id)
    }

    /// Number of live parts, the root included.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn children(&self, id: PartId) -> &[PartId] {
        self.parts.get(id).map(|part| part.children.as_slice()).unwrap_or(&[])
    }

    pub fn edit_part_for_model(&self, model: ModelId) -> Option<PartId> {
        self.model_registry.get(&model).copied()
    }

    pub fn edit_part_for_visual(&self, visual: VisualId) -> Option<PartId> {
        self.visual_registry.get(&visual).copied()
    }

    pub fn model_registry(&self) -> &HashMap<ModelId, PartId> {
        &self.model_registry
    }

    pub fn visual_registry(&self) -> &HashMap<VisualId, PartId> {
        &self.visual_registry
    }

    pub fn visuals(&self) -> &dyn VisualAdapter {
        self.visuals.as_ref()
    }

    pub fn visuals_mut(&mut self) -> &mut dyn VisualAdapter {
        self.visuals.as_mut()
    }

    pub fn primary_layer(&self) -> VisualId {
        self.primary_layer
    }

    pub fn connection_layer(&self) -> VisualId {
        self.connection_layer
    }

    pub fn feedback_layer(&self) -> VisualId {
        self.feedback_layer
    }

    /// Performs the deferred visual update. Call before anything that reads
    /// bounds, such as starting a drag.
    pub fn flush(&mut self) -> usize {
        self.visuals.flush()
    }

    pub fn is_active(&self) -> bool {
        self.parts.get(self.root).is_some_and(|root| root.active)
    }

    pub fn activate(&mut self) {
        self.activate_part(self.root);
    }

    pub fn deactivate(&mut self) {
        self.deactivate_part(self.root);
    }

    /// Activation runs top down: the part, its policies, its children, then
    /// the connections it is the source of.
    pub(crate) fn activate_part(&mut self, id: PartId) {
        let Some(part) = self.parts.get_mut(id) else {
            return;
        };
        if part.active {
            return;
        }
        part.active = true;
        part.policies.activate();
        let children = part.children.clone();

        for child in children {
            self.activate_part(child);
        }

        let Some(part) = self.parts.get(id) else {
            return;
        };
        part.listeners.emit(&EditPartEvent::Activated(id));
        let connections = part.source_connections.clone();
        for connection in connections {
            self.activate_part(connection);
        }
    }

    /// Deactivation runs bottom up, mirroring [`Self::activate_part`].
    pub(crate) fn deactivate_part(&mut self, id: PartId) {
        let Some(part) = self.parts.get(id) else {
            return;
        };
        if !part.active {
            return;
        }
        let connections = part.source_connections.clone();
        let children = part.children.clone();

        for connection in connections {
            self.deactivate_part(connection);
        }
        for child in children {
            self.deactivate_part(child);
        }

        let Some(part) = self.parts.get_mut(id) else {
            return;
        };
        part.policies.deactivate();
        part.active = false;
        part.listeners.emit(&EditPartEvent::Deactivated(id));
    }

    pub fn install_edit_policy(&mut self, id: PartId, role: Role, policy: Option<Box<dyn EditPolicy<M>>>) {
        if let Some(part) = self.parts.get_mut(id) {
            log::trace!("Installing {} on {:?}", role, id);
            part.policies.install(role, policy);
        }
    }

    pub fn remove_edit_policy(&mut self, id: PartId, role: &Role) -> Option<Box<dyn EditPolicy<M>>> {
        self.parts.get_mut(id)?.policies.remove(role)
    }

    pub fn edit_policy(&self, id: PartId, role: &Role) -> Option<&dyn EditPolicy<M>> {
        self.parts.get(id)?.policies.get(role)
    }

    pub fn behavior(&self, id: PartId) -> Option<&dyn EditPartBehavior<M>> {
        self.parts.get(id).map(|part| part.behavior.as_ref())
    }

    pub fn capability<T: Any>(&self, id: PartId) -> Option<&T> {
        self.parts.get(id)?.capabilities.get::<T>()
    }

    pub fn add_edit_part_listener(
        &self,
        id: PartId,
        handler: impl EventHandler<EditPartEvent> + 'static,
    ) -> Option<ListenerId> {
        Some(self.parts.get(id)?.listeners.subscribe(Box::new(handler)))
    }

    pub fn remove_edit_part_listener(&self, id: PartId, listener: ListenerId) -> bool {
        self.parts.get(id).is_some_and(|part| part.listeners.unsubscribe(listener))
    }

    pub fn add_node_listener(&self, id: PartId, handler: impl EventHandler<NodeEvent> + 'static) -> Option<ListenerId> {
        Some(self.parts.get(id)?.node_listeners.subscribe(Box::new(handler)))
    }

    pub fn remove_node_listener(&self, id: PartId, listener: ListenerId) -> bool {
        self.parts.get(id).is_some_and(|part| part.node_listeners.unsubscribe(listener))
    }

    pub fn add_listener(&self, handler: impl EventHandler<ViewerEvent> + 'static) -> ListenerId {
        self.listeners.subscribe(Box::new(handler))
    }

    pub fn remove_listener(&self, listener: ListenerId) -> bool {
        self.listeners.unsubscribe(listener)
    }

    /// Whether `ancestor` is `part` or one of its parents.
    pub fn is_ancestor(&self, ancestor: PartId, part: PartId) -> bool {
        crate::policy::is_ancestor(self, ancestor, part)
    }
}
