use std::fmt;

use super::{CommandProvider, EditPolicy, PolicyContext};
use crate::command::{Command, UnexecutableCommand};
use crate::request::{Request, RequestType};

/// Answers requests about the host as a whole: deleting it and taking it
/// out of its parent.
///
/// Deletion is application specific and comes from the provider. Orphaning
/// is the parent's business, so the request is forwarded there as
/// `ORPHAN_CHILDREN` naming the host.
pub struct ComponentEditPolicy<M> {
    delete: CommandProvider<M>,
}

impl<M> fmt::Debug for ComponentEditPolicy<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentEditPolicy").finish_non_exhaustive()
    }
}

impl<M> ComponentEditPolicy<M> {
    pub fn new(
        delete: impl Fn(&Request, &PolicyContext<'_, M>) -> Option<Box<dyn Command<M>>> + 'static,
    ) -> Self {
        Self {
            delete: Box::new(delete),
        }
    }
}

impl<M: 'static> EditPolicy<M> for ComponentEditPolicy<M> {
    fn command(&self, request: &Request, ctx: &PolicyContext<'_, M>) -> Option<Box<dyn Command<M>>> {
        if request.is(&RequestType::DELETE) {
            return (self.delete)(request, ctx);
        }
        if request.is(&RequestType::ORPHAN) {
            let parent = ctx.parent()?;
            let mut forwarded = Request::orphan_children(vec![ctx.host]);
            *forwarded.extended_data_mut() = request.extended_data().clone();
            return ctx.command_from(parent, &forwarded);
        }
        None
    }
}

/// Installed on the root part: the contents can never be deleted.
#[derive(Debug, Clone, Copy, Default)]
pub struct RootComponentEditPolicy;

impl<M> EditPolicy<M> for RootComponentEditPolicy {
    fn command(&self, request: &Request, _ctx: &PolicyContext<'_, M>) -> Option<Box<dyn Command<M>>> {
        if request.is(&RequestType::DELETE) {
            return Some(Box::new(UnexecutableCommand::new("Delete")));
        }
        None
    }
}
