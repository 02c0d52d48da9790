use std::fmt;

use egui::Pos2;

use super::{EditPolicy, FeedbackContext, PolicyContext};
use crate::command::{Command, UnexecutableCommand};
use crate::editpart::PartId;
use crate::request::{CreatedObject, Request, RequestType};

/// Application hooks of a [`GraphicalNodeEditPolicy`].
pub trait ConnectionCommands<M> {
    /// Whether a connection of this type may start at `source`.
    fn can_start(&self, _source: PartId, _object: &CreatedObject, _ctx: &PolicyContext<'_, M>) -> bool {
        true
    }

    fn create_connection(
        &self,
        source: PartId,
        target: PartId,
        object: &CreatedObject,
        ctx: &PolicyContext<'_, M>,
    ) -> Option<Box<dyn Command<M>>>;

    fn reconnect_source(
        &self,
        _connection: PartId,
        _new_source: PartId,
        _ctx: &PolicyContext<'_, M>,
    ) -> Option<Box<dyn Command<M>>> {
        None
    }

    fn reconnect_target(
        &self,
        _connection: PartId,
        _new_target: PartId,
        _ctx: &PolicyContext<'_, M>,
    ) -> Option<Box<dyn Command<M>>> {
        None
    }
}

/// Lets a node be the source or target of connections.
pub struct GraphicalNodeEditPolicy<M> {
    commands: Box<dyn ConnectionCommands<M>>,
}

impl<M> fmt::Debug for GraphicalNodeEditPolicy<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphicalNodeEditPolicy").finish_non_exhaustive()
    }
}

impl<M> GraphicalNodeEditPolicy<M> {
    pub fn new(commands: impl ConnectionCommands<M> + 'static) -> Self {
        Self {
            commands: Box::new(commands),
        }
    }
}

fn is_connection_request(request: &Request) -> bool {
    [
        RequestType::CONNECTION_START,
        RequestType::CONNECTION_END,
        RequestType::RECONNECT_SOURCE,
        RequestType::RECONNECT_TARGET,
    ]
    .contains(request.kind())
}

impl<M: 'static> EditPolicy<M> for GraphicalNodeEditPolicy<M> {
    fn command(&self, request: &Request, ctx: &PolicyContext<'_, M>) -> Option<Box<dyn Command<M>>> {
        let kind = request.kind();
        if *kind == RequestType::CONNECTION_START {
            // The start command only marks the source as valid; the real
            // command is produced at the other end.
            let object = request.created_object()?;
            self.commands
                .can_start(ctx.host, object, ctx)
                .then(|| Box::new(UnexecutableCommand::new("Connection start")) as Box<dyn Command<M>>)
        } else if *kind == RequestType::CONNECTION_END {
            let source = request.source()?;
            let object = request.created_object()?;
            self.commands.create_connection(source, ctx.host, object, ctx)
        } else if *kind == RequestType::RECONNECT_SOURCE {
            self.commands.reconnect_source(request.connection()?, ctx.host, ctx)
        } else if *kind == RequestType::RECONNECT_TARGET {
            self.commands.reconnect_target(request.connection()?, ctx.host, ctx)
        } else {
            None
        }
    }

    fn target_edit_part(&self, request: &Request, ctx: &PolicyContext<'_, M>) -> Option<PartId> {
        is_connection_request(request).then_some(ctx.host)
    }

    fn show_target_feedback(&mut self, request: &Request, feedback: &mut FeedbackContext<'_>) {
        if is_connection_request(request) {
            feedback.visuals.set_highlighted(feedback.host_visual, true);
        }
    }

    fn erase_target_feedback(&mut self, request: &Request, feedback: &mut FeedbackContext<'_>) {
        if is_connection_request(request) {
            feedback.visuals.set_highlighted(feedback.host_visual, false);
        }
    }
}

/// Application hooks of a [`BendpointEditPolicy`].
pub trait BendpointCommands<M> {
    fn create_bendpoint(
        &self,
        connection: PartId,
        index: usize,
        location: Pos2,
        ctx: &PolicyContext<'_, M>,
    ) -> Option<Box<dyn Command<M>>>;

    fn move_bendpoint(
        &self,
        connection: PartId,
        index: usize,
        location: Pos2,
        ctx: &PolicyContext<'_, M>,
    ) -> Option<Box<dyn Command<M>>>;

    fn delete_bendpoint(&self, connection: PartId, index: usize, ctx: &PolicyContext<'_, M>)
    -> Option<Box<dyn Command<M>>>;
}

/// Installed on connections to edit their bendpoints.
pub struct BendpointEditPolicy<M> {
    commands: Box<dyn BendpointCommands<M>>,
}

impl<M> fmt::Debug for BendpointEditPolicy<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BendpointEditPolicy").finish_non_exhaustive()
    }
}

impl<M> BendpointEditPolicy<M> {
    pub fn new(commands: impl BendpointCommands<M> + 'static) -> Self {
        Self {
            commands: Box::new(commands),
        }
    }
}

impl<M: 'static> EditPolicy<M> for BendpointEditPolicy<M> {
    fn command(&self, request: &Request, ctx: &PolicyContext<'_, M>) -> Option<Box<dyn Command<M>>> {
        let index = request.bendpoint_index()?;
        let location = request.location()?;
        let kind = request.kind();
        if *kind == RequestType::CREATE_BENDPOINT {
            self.commands.create_bendpoint(ctx.host, index, location, ctx)
        } else if *kind == RequestType::MOVE_BENDPOINT {
            self.commands.move_bendpoint(ctx.host, index, location, ctx)
        } else if *kind == RequestType::DELETE_BENDPOINT {
            self.commands.delete_bendpoint(ctx.host, index, ctx)
        } else {
            None
        }
    }

    fn understands_request(&self, request: &Request, _ctx: &PolicyContext<'_, M>) -> bool {
        [
            RequestType::CREATE_BENDPOINT,
            RequestType::MOVE_BENDPOINT,
            RequestType::DELETE_BENDPOINT,
        ]
        .contains(request.kind())
    }
}
