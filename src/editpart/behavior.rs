use std::fmt;

use super::{PartId, PartKind};
use crate::capability::Capabilities;
use crate::model::ModelId;
use crate::policy::{PolicyChain, Role, RootComponentEditPolicy};
use crate::request::Request;
use crate::visual::{VisualAdapter, VisualId};

/// Everything a [`EditPartBehavior::refresh_visuals`] implementation may look at.
pub struct RefreshContext<'a, M> {
    pub part: PartId,
    pub model: ModelId,
    pub doc: &'a M,
    pub visual: VisualId,
    /// Visuals of the connection ends, for connections
    pub source_visual: Option<VisualId>,
    pub target_visual: Option<VisualId>,
    pub visuals: &'a mut dyn VisualAdapter,
}

/// The kind-specific half of an edit part.
///
/// The viewer owns the generic state and the reconciliation algorithm; a
/// behaviour says how to read the model and how the part looks.
pub trait EditPartBehavior<M>: fmt::Debug {
    fn kind(&self) -> PartKind {
        PartKind::Node
    }

    fn create_visual(&self, visuals: &mut dyn VisualAdapter) -> VisualId {
        visuals.create_visual()
    }

    /// The visual children are added to. Defaults to the part's own visual.
    fn content_pane(&self, visual: VisualId, _visuals: &dyn VisualAdapter) -> VisualId {
        visual
    }

    /// Install the part's policies. Called every time the part is added to a viewer.
    fn create_edit_policies(&self, _policies: &mut PolicyChain<M>) {}

    /// Ids of the model children, in display order. Must not contain duplicates.
    fn model_children(&self, _model: ModelId, _doc: &M) -> Vec<ModelId> {
        Vec::new()
    }

    fn model_source_connections(&self, _model: ModelId, _doc: &M) -> Vec<ModelId> {
        Vec::new()
    }

    fn model_target_connections(&self, _model: ModelId, _doc: &M) -> Vec<ModelId> {
        Vec::new()
    }

    fn refresh_visuals(&self, _ctx: RefreshContext<'_, M>) {}

    fn is_selectable(&self) -> bool {
        true
    }

    fn register_capabilities(&self, _capabilities: &mut Capabilities) {}

    /// Perform a request that does not go through the command stack, such as
    /// `OPEN`. May hand back a follow-up request for the caller to dispatch.
    fn perform_request(&mut self, _request: &Request, _model: ModelId, _doc: &M) -> Option<Request> {
        None
    }
}

/// Creates the behaviour of the part for a newly discovered model object.
pub trait EditPartFactory<M> {
    fn create_behavior(&self, context: PartId, model: ModelId, doc: &M) -> Box<dyn EditPartBehavior<M>>;
}

impl<M, F> EditPartFactory<M> for F
where
    F: Fn(PartId, ModelId, &M) -> Box<dyn EditPartBehavior<M>>,
{
    fn create_behavior(&self, context: PartId, model: ModelId, doc: &M) -> Box<dyn EditPartBehavior<M>> {
        self(context, model, doc)
    }
}

/// Behaviour of the root part. Its children are the viewer's contents.
#[derive(Debug, Clone, Copy, Default)]
pub struct RootBehavior;

impl<M> EditPartBehavior<M> for RootBehavior {
    fn kind(&self) -> PartKind {
        PartKind::Root
    }

    fn create_edit_policies(&self, policies: &mut PolicyChain<M>) {
        policies.install(Role::COMPONENT, Some(Box::new(RootComponentEditPolicy)));
    }

    fn is_selectable(&self) -> bool {
        false
    }
}
