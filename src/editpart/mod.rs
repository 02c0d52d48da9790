//! Edit parts: the nodes of the tree that mirrors the model.
//!
//! Parts live in the arena of their [`crate::viewer::EditPartViewer`] and are
//! addressed by [`PartId`]. The viewer runs every lifecycle operation; a part
//! holds the state and delegates everything kind specific to its
//! [`EditPartBehavior`].

mod behavior;

use std::fmt;

use crate::capability::Capabilities;
use crate::event::{EditPartEvent, EventBus, NodeEvent};
use crate::model::ModelId;
use crate::policy::PolicyChain;
use crate::selection::SelectionState;
use crate::visual::VisualId;

pub use behavior::{EditPartBehavior, EditPartFactory, RefreshContext, RootBehavior};

slotmap::new_key_type! {
    /// Handle of an edit part inside its viewer.
    pub struct PartId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    /// The single part at the top of a viewer; owns the layers
    Root,
    /// A part for a model object with children and connections
    Node,
    /// A directed edge between two nodes
    Connection,
}

pub struct EditPart<M> {
    pub(crate) id: PartId,
    pub(crate) model: ModelId,
    pub(crate) kind: PartKind,
    pub(crate) parent: Option<PartId>,
    pub(crate) children: Vec<PartId>,
    pub(crate) selected: SelectionState,
    pub(crate) focus: bool,
    pub(crate) active: bool,
    pub(crate) policies: PolicyChain<M>,
    pub(crate) behavior: Box<dyn EditPartBehavior<M>>,
    pub(crate) visual: VisualId,
    pub(crate) content_pane: VisualId,
    pub(crate) source_connections: Vec<PartId>,
    pub(crate) target_connections: Vec<PartId>,
    /// Connection ends; only set on connections
    pub(crate) source: Option<PartId>,
    pub(crate) target: Option<PartId>,
    pub(crate) capabilities: Capabilities,
    pub(crate) listeners: EventBus<EditPartEvent>,
    pub(crate) node_listeners: EventBus<NodeEvent>,
}

impl<M> fmt::Debug for EditPart<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditPart")
            .field("id", &self.id)
            .field("model", &self.model)
            .field("kind", &self.kind)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("selected", &self.selected)
            .field("focus", &self.focus)
            .field("active", &self.active)
            .field("behavior", &self.behavior)
            .finish_non_exhaustive()
    }
}

impl<M> EditPart<M> {
    pub(crate) fn new(
        id: PartId,
        model: ModelId,
        behavior: Box<dyn EditPartBehavior<M>>,
        visual: VisualId,
        content_pane: VisualId,
    ) -> Self {
        let mut capabilities = Capabilities::new();
        behavior.register_capabilities(&mut capabilities);
        Self {
            id,
            model,
            kind: behavior.kind(),
            parent: None,
            children: Vec::new(),
            selected: SelectionState::None,
            focus: false,
            active: false,
            policies: PolicyChain::new(Some(id)),
            behavior,
            visual,
            content_pane,
            source_connections: Vec::new(),
            target_connections: Vec::new(),
            source: None,
            target: None,
            capabilities,
            listeners: EventBus::new(),
            node_listeners: EventBus::new(),
        }
    }

    pub fn id(&self) -> PartId {
        self.id
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    pub fn kind(&self) -> PartKind {
        self.kind
    }

    pub fn parent(&self) -> Option<PartId> {
        self.parent
    }

    pub fn children(&self) -> &[PartId] {
        &self.children
    }

    pub fn selected(&self) -> SelectionState {
        self.selected
    }

    pub fn has_focus(&self) -> bool {
        self.focus
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_selectable(&self) -> bool {
        self.behavior.is_selectable()
    }

    pub fn policies(&self) -> &PolicyChain<M> {
        &self.policies
    }

    pub fn behavior(&self) -> &dyn EditPartBehavior<M> {
        self.behavior.as_ref()
    }

    pub fn visual(&self) -> VisualId {
        self.visual
    }

    /// The visual children's visuals are added to.
    pub fn content_pane(&self) -> VisualId {
        self.content_pane
    }

    pub fn source_connections(&self) -> &[PartId] {
        &self.source_connections
    }

    pub fn target_connections(&self) -> &[PartId] {
        &self.target_connections
    }

    pub fn source(&self) -> Option<PartId> {
        self.source
    }

    pub fn target(&self) -> Option<PartId> {
        self.target
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }
}
