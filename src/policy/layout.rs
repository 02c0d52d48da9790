use std::fmt;

use egui::{Pos2, Rect, Vec2, vec2};

use super::{EditPolicy, FeedbackContext, PolicyContext, is_ancestor};
use crate::command::{Command, CompoundCommand, UnexecutableCommand};
use crate::editpart::PartId;
use crate::request::{CreatedObject, HORIZONTAL_GUIDE, Request, RequestType, VERTICAL_GUIDE};

/// Application hooks of an [`XyLayoutEditPolicy`]. Every rectangle is a
/// constraint relative to the host's content pane.
pub trait XyLayoutCommands<M> {
    fn change_constraint(
        &self,
        child: PartId,
        constraint: Rect,
        request: &Request,
        ctx: &PolicyContext<'_, M>,
    ) -> Option<Box<dyn Command<M>>>;

    /// Reparent `child` into the host.
    fn add(&self, _child: PartId, _constraint: Rect, _ctx: &PolicyContext<'_, M>) -> Option<Box<dyn Command<M>>> {
        None
    }

    fn create(
        &self,
        object: &CreatedObject,
        constraint: Rect,
        ctx: &PolicyContext<'_, M>,
    ) -> Option<Box<dyn Command<M>>>;

    fn clone_children(
        &self,
        _children: &[(PartId, Rect)],
        _ctx: &PolicyContext<'_, M>,
    ) -> Option<Box<dyn Command<M>>> {
        None
    }

    /// The children are leaving the host for another container.
    fn orphan(&self, _children: &[PartId], _ctx: &PolicyContext<'_, M>) -> Option<Box<dyn Command<M>>> {
        None
    }
}

/// Container policy for children placed at explicit rectangles.
pub struct XyLayoutEditPolicy<M> {
    commands: Box<dyn XyLayoutCommands<M>>,
    default_size: Vec2,
}

impl<M> fmt::Debug for XyLayoutEditPolicy<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XyLayoutEditPolicy")
            .field("default_size", &self.default_size)
            .finish_non_exhaustive()
    }
}

impl<M> XyLayoutEditPolicy<M> {
    pub fn new(commands: impl XyLayoutCommands<M> + 'static) -> Self {
        Self {
            commands: Box::new(commands),
            default_size: vec2(64.0, 36.0),
        }
    }

    /// Size used for created objects when the request carries none.
    pub fn with_default_size(mut self, size: Vec2) -> Self {
        self.default_size = size;
        self
    }
}

impl<M: 'static> XyLayoutEditPolicy<M> {
    /// Origin of the coordinate space children are constrained in.
    fn content_origin(ctx: &PolicyContext<'_, M>) -> Pos2 {
        ctx.host_part()
            .map(|host| ctx.viewer.visuals().bounds(host.content_pane()).min)
            .filter(|origin| origin.is_finite())
            .unwrap_or(Pos2::ZERO)
    }

    /// The child's current constraint, falling back to its laid out bounds.
    fn current_constraint(child: PartId, origin: Pos2, ctx: &PolicyContext<'_, M>) -> Option<Rect> {
        let visual = ctx.viewer.part(child)?.visual();
        let visuals = ctx.viewer.visuals();
        visuals
            .constraint(visual)
            .or_else(|| Some(visuals.bounds(visual).translate(-origin.to_vec2())))
    }

    fn snap_to_guides(request: &Request, mut rect: Rect) -> Rect {
        if let Some(y) = request.extended_f32(HORIZONTAL_GUIDE) {
            rect = rect.translate(vec2(0.0, y - rect.min.y));
        }
        if let Some(x) = request.extended_f32(VERTICAL_GUIDE) {
            rect = rect.translate(vec2(x - rect.min.x, 0.0));
        }
        rect
    }

    fn change_constraints_command(&self, request: &Request, ctx: &PolicyContext<'_, M>) -> Option<Box<dyn Command<M>>> {
        let origin = Self::content_origin(ctx);
        let mut compound = CompoundCommand::new("Move");
        for &child in request.parts() {
            let Some(current) = Self::current_constraint(child, origin, ctx) else {
                continue;
            };
            let constraint = Self::snap_to_guides(request, request.transformed_rect(current));
            if let Some(command) = self.commands.change_constraint(child, constraint, request, ctx) {
                compound.add(command);
            }
        }
        (!compound.is_empty()).then(|| compound.unwrap_single())
    }

    fn add_command(&self, request: &Request, ctx: &PolicyContext<'_, M>) -> Option<Box<dyn Command<M>>> {
        let origin = Self::content_origin(ctx);
        let mut compound = CompoundCommand::new("Add");
        for &child in request.parts() {
            if is_ancestor(ctx.viewer, child, ctx.host) {
                return Some(Box::new(UnexecutableCommand::new("Add")));
            }
            let Some(visual) = ctx.viewer.part(child).map(|part| part.visual()) else {
                continue;
            };
            let absolute = request.transformed_rect(ctx.viewer.visuals().bounds(visual));
            let constraint = Self::snap_to_guides(request, absolute.translate(-origin.to_vec2()));
            if let Some(command) = self.commands.add(child, constraint, ctx) {
                compound.add(command);
            }
        }
        (!compound.is_empty()).then(|| compound.unwrap_single())
    }

    fn create_command(&self, request: &Request, ctx: &PolicyContext<'_, M>) -> Option<Box<dyn Command<M>>> {
        let object = request.created_object()?;
        let location = request.location().unwrap_or(Pos2::ZERO);
        let size = request.size().unwrap_or(self.default_size);
        let origin = Self::content_origin(ctx);
        let constraint = Rect::from_min_size(location - origin.to_vec2(), size);
        self.commands.create(object, Self::snap_to_guides(request, constraint), ctx)
    }

    fn clone_command(&self, request: &Request, ctx: &PolicyContext<'_, M>) -> Option<Box<dyn Command<M>>> {
        let origin = Self::content_origin(ctx);
        let children: Vec<(PartId, Rect)> = request
            .parts()
            .iter()
            .filter_map(|&child| {
                let visual = ctx.viewer.part(child)?.visual();
                let absolute = request.transformed_rect(ctx.viewer.visuals().bounds(visual));
                Some((child, absolute.translate(-origin.to_vec2())))
            })
            .collect();
        self.commands.clone_children(&children, ctx)
    }
}

impl<M: 'static> EditPolicy<M> for XyLayoutEditPolicy<M> {
    fn command(&self, request: &Request, ctx: &PolicyContext<'_, M>) -> Option<Box<dyn Command<M>>> {
        let kind = request.kind();
        if *kind == RequestType::MOVE_CHILDREN || *kind == RequestType::RESIZE_CHILDREN {
            self.change_constraints_command(request, ctx)
        } else if *kind == RequestType::ADD {
            self.add_command(request, ctx)
        } else if *kind == RequestType::CREATE {
            self.create_command(request, ctx)
        } else if *kind == RequestType::CLONE {
            self.clone_command(request, ctx)
        } else if *kind == RequestType::ORPHAN_CHILDREN {
            self.commands.orphan(request.parts(), ctx)
        } else {
            None
        }
    }

    fn target_edit_part(&self, request: &Request, ctx: &PolicyContext<'_, M>) -> Option<PartId> {
        let kind = request.kind();
        let targets = [
            RequestType::ADD,
            RequestType::CLONE,
            RequestType::CREATE,
            RequestType::MOVE,
            RequestType::RESIZE,
        ];
        targets.contains(kind).then_some(ctx.host)
    }

    fn show_target_feedback(&mut self, request: &Request, feedback: &mut FeedbackContext<'_>) {
        if shows_container_feedback(request) {
            feedback.visuals.set_highlighted(feedback.host_visual, true);
        }
    }

    fn erase_target_feedback(&mut self, request: &Request, feedback: &mut FeedbackContext<'_>) {
        if shows_container_feedback(request) {
            feedback.visuals.set_highlighted(feedback.host_visual, false);
        }
    }
}

fn shows_container_feedback(request: &Request) -> bool {
    request.is(&RequestType::ADD) || request.is(&RequestType::CREATE) || request.is(&RequestType::CLONE)
}

/// Application hooks of an [`OrderedLayoutEditPolicy`]. `None` as an index
/// means "append".
pub trait OrderedLayoutCommands<M> {
    fn create(
        &self,
        object: &CreatedObject,
        index: Option<usize>,
        ctx: &PolicyContext<'_, M>,
    ) -> Option<Box<dyn Command<M>>>;

    fn add(&self, child: PartId, index: Option<usize>, ctx: &PolicyContext<'_, M>) -> Option<Box<dyn Command<M>>>;

    /// Move `child` from `old_index` to `new_index` among the host's children.
    fn reorder(
        &self,
        child: PartId,
        old_index: usize,
        new_index: usize,
        ctx: &PolicyContext<'_, M>,
    ) -> Option<Box<dyn Command<M>>>;

    fn orphan(&self, _children: &[PartId], _ctx: &PolicyContext<'_, M>) -> Option<Box<dyn Command<M>>> {
        None
    }
}

/// Container policy for children kept in a list, such as outline rows.
/// The insertion index is the index of the child under the request location.
pub struct OrderedLayoutEditPolicy<M> {
    commands: Box<dyn OrderedLayoutCommands<M>>,
}

impl<M> fmt::Debug for OrderedLayoutEditPolicy<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedLayoutEditPolicy").finish_non_exhaustive()
    }
}

impl<M> OrderedLayoutEditPolicy<M> {
    pub fn new(commands: impl OrderedLayoutCommands<M> + 'static) -> Self {
        Self {
            commands: Box::new(commands),
        }
    }
}

impl<M: 'static> OrderedLayoutEditPolicy<M> {
    fn index_at(request: &Request, ctx: &PolicyContext<'_, M>) -> Option<usize> {
        let location = request.location()?;
        let hit = ctx.viewer.find_object_at(location)?;
        ctx.host_part()?.children().iter().position(|&child| child == hit)
    }

    fn move_children_command(&self, request: &Request, ctx: &PolicyContext<'_, M>) -> Option<Box<dyn Command<M>>> {
        let children = ctx.host_part()?.children();
        let new_index = Self::index_at(request, ctx).unwrap_or(children.len());

        let mut compound = CompoundCommand::new("Reorder");
        for &child in request.parts() {
            let Some(old_index) = children.iter().position(|&c| c == child) else {
                continue;
            };
            let mut index = new_index;
            // Dropping onto the slot before or after itself is not a move
            if old_index == index || old_index + 1 == index {
                return Some(Box::new(UnexecutableCommand::new("Reorder")));
            } else if old_index < index {
                index -= 1;
            }
            if let Some(command) = self.commands.reorder(child, old_index, index, ctx) {
                compound.add(command);
            }
        }
        (!compound.is_empty()).then(|| compound.unwrap_single())
    }

    fn add_command(&self, request: &Request, ctx: &PolicyContext<'_, M>) -> Option<Box<dyn Command<M>>> {
        let index = Self::index_at(request, ctx);
        let mut compound = CompoundCommand::new("Add");
        for &child in request.parts() {
            if is_ancestor(ctx.viewer, child, ctx.host) {
                return Some(Box::new(UnexecutableCommand::new("Add")));
            }
            if let Some(command) = self.commands.add(child, index, ctx) {
                compound.add(command);
            }
        }
        (!compound.is_empty()).then(|| compound.unwrap_single())
    }
}

impl<M: 'static> EditPolicy<M> for OrderedLayoutEditPolicy<M> {
    fn command(&self, request: &Request, ctx: &PolicyContext<'_, M>) -> Option<Box<dyn Command<M>>> {
        let kind = request.kind();
        if *kind == RequestType::MOVE_CHILDREN {
            self.move_children_command(request, ctx)
        } else if *kind == RequestType::ADD {
            self.add_command(request, ctx)
        } else if *kind == RequestType::CREATE {
            let object = request.created_object()?;
            self.commands.create(object, Self::index_at(request, ctx), ctx)
        } else if *kind == RequestType::ORPHAN_CHILDREN {
            self.commands.orphan(request.parts(), ctx)
        } else {
            None
        }
    }

    fn target_edit_part(&self, request: &Request, ctx: &PolicyContext<'_, M>) -> Option<PartId> {
        let targets = [RequestType::ADD, RequestType::CREATE, RequestType::MOVE];
        targets.contains(request.kind()).then_some(ctx.host)
    }

    fn show_target_feedback(&mut self, request: &Request, feedback: &mut FeedbackContext<'_>) {
        if shows_container_feedback(request) {
            feedback.visuals.set_highlighted(feedback.host_visual, true);
        }
    }

    fn erase_target_feedback(&mut self, request: &Request, feedback: &mut FeedbackContext<'_>) {
        if shows_container_feedback(request) {
            feedback.visuals.set_highlighted(feedback.host_visual, false);
        }
    }
}
