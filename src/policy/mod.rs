//! Edit policies: pluggable strategies installed on an edit part under a role.
//!
//! A part delegates everything request related to its [`PolicyChain`]. Each
//! policy may contribute a command, claim to be the target of a request or
//! show feedback; the chain merges the answers in installation order.

mod chain;
mod component;
mod direct_edit;
mod layout;
mod node;
mod selection;

use std::fmt;

use crate::command::Command;
use crate::editpart::{EditPart, PartId};
use crate::model::ModelId;
use crate::request::Request;
use crate::selection::SelectionState;
use crate::token::define_token;
use crate::viewer::EditPartViewer;
use crate::visual::{VisualAdapter, VisualId};

pub use chain::PolicyChain;
pub use component::{ComponentEditPolicy, RootComponentEditPolicy};
pub use direct_edit::DirectEditPolicy;
pub use layout::{OrderedLayoutCommands, OrderedLayoutEditPolicy, XyLayoutCommands, XyLayoutEditPolicy};
pub use node::{BendpointCommands, BendpointEditPolicy, ConnectionCommands, GraphicalNodeEditPolicy};
pub use selection::{DragEditPolicy, SelectionFeedbackPolicy};

define_token! {
    /// The key an edit policy is installed under.
    Role {
        COMPONENT = "ComponentEditPolicy",
        CONTAINER = "ContainerEditPolicy",
        LAYOUT = "LayoutEditPolicy",
        GRAPHICAL_NODE = "GraphicalNodeEditPolicy",
        CONNECTION = "ConnectionEditPolicy",
        CONNECTION_BENDPOINTS = "Connection Bendpoint Policy",
        DIRECT_EDIT = "DirectEditPolicy",
        SELECTION_FEEDBACK = "Selection Feedback",
        TREE_CONTAINER = "TreeContainerEditPolicy",
        PRIMARY_DRAG = "PrimaryDrag Policy",
    }
}

/// Produces an application command for a request, or declines with `None`.
pub type CommandProvider<M> = Box<dyn Fn(&Request, &PolicyContext<'_, M>) -> Option<Box<dyn Command<M>>>>;

/// Read-only view of the world a policy answers requests in.
pub struct PolicyContext<'a, M> {
    pub host: PartId,
    pub viewer: &'a EditPartViewer<M>,
    pub model: &'a M,
}

impl<'a, M: 'static> PolicyContext<'a, M> {
    pub fn new(host: PartId, viewer: &'a EditPartViewer<M>, model: &'a M) -> Self {
        Self { host, viewer, model }
    }

    pub fn host_part(&self) -> Option<&'a EditPart<M>> {
        self.viewer.part(self.host)
    }

    pub fn host_model(&self) -> Option<ModelId> {
        self.host_part().map(|part| part.model())
    }

    pub fn parent(&self) -> Option<PartId> {
        self.host_part().and_then(|part| part.parent())
    }

    pub fn model_of(&self, part: PartId) -> Option<ModelId> {
        self.viewer.part(part).map(|part| part.model())
    }

    /// Ask another part for a command, in the same model state.
    pub fn command_from(&self, part: PartId, request: &Request) -> Option<Box<dyn Command<M>>> {
        self.viewer.command(part, request, self.model)
    }

    /// Re-targets this context at another part.
    pub fn for_host(&self, host: PartId) -> Self {
        Self {
            host,
            viewer: self.viewer,
            model: self.model,
        }
    }
}

impl<M> fmt::Debug for PolicyContext<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyContext").field("host", &self.host).finish()
    }
}

/// Visual access for feedback. Feedback never touches the model.
#[derive(Debug)]
pub struct FeedbackContext<'a> {
    pub host: PartId,
    pub host_visual: VisualId,
    /// Layer for temporary visuals; excluded from hit testing
    pub feedback_layer: VisualId,
    pub visuals: &'a mut dyn VisualAdapter,
}

/// A strategy installed on an edit part.
///
/// Every method has a do-nothing default so a policy only implements the
/// requests it cares about.
pub trait EditPolicy<M>: fmt::Debug {
    /// Bind to (or, with `None`, release from) a host part.
    fn set_host(&mut self, _host: Option<PartId>) {}

    fn activate(&mut self) {}

    fn deactivate(&mut self) {}

    fn command(&self, _request: &Request, _ctx: &PolicyContext<'_, M>) -> Option<Box<dyn Command<M>>> {
        None
    }

    fn target_edit_part(&self, _request: &Request, _ctx: &PolicyContext<'_, M>) -> Option<PartId> {
        None
    }

    fn understands_request(&self, _request: &Request, _ctx: &PolicyContext<'_, M>) -> bool {
        false
    }

    fn show_source_feedback(&mut self, _request: &Request, _feedback: &mut FeedbackContext<'_>) {}

    fn erase_source_feedback(&mut self, _request: &Request, _feedback: &mut FeedbackContext<'_>) {}

    fn show_target_feedback(&mut self, _request: &Request, _feedback: &mut FeedbackContext<'_>) {}

    fn erase_target_feedback(&mut self, _request: &Request, _feedback: &mut FeedbackContext<'_>) {}

    /// Called after the host's selection or focus changed.
    fn host_selection_changed(&mut self, _selected: SelectionState, _focus: bool, _feedback: &mut FeedbackContext<'_>) {
    }

    /// Drop every temporary visual the policy still shows. Called before the
    /// host leaves the viewer, when no erase request can reach it any more.
    fn clear_feedback(&mut self, _feedback: &mut FeedbackContext<'_>) {}
}

pub(crate) fn is_ancestor<M: 'static>(viewer: &EditPartViewer<M>, ancestor: PartId, mut part: PartId) -> bool {
    loop {
        if part == ancestor {
            return true;
        }
        match viewer.part(part).and_then(|p| p.parent()) {
            Some(parent) => part = parent,
            None => return false,
        }
    }
}
