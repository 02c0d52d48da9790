use super::{EditPolicy, FeedbackContext, PolicyContext};
use crate::command::Command;
use crate::request::{Request, RequestType};
use crate::selection::SelectionState;
use crate::visual::VisualId;

/// Highlights the host while it is selected.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionFeedbackPolicy;

impl<M> EditPolicy<M> for SelectionFeedbackPolicy {
    fn host_selection_changed(&mut self, selected: SelectionState, _focus: bool, feedback: &mut FeedbackContext<'_>) {
        feedback.visuals.set_highlighted(feedback.host_visual, selected.is_selected());
    }
}

/// Makes the host draggable.
///
/// Moves and resizes of the host are the parent's layout's business and are
/// forwarded there as `MOVE_CHILDREN` / `RESIZE_CHILDREN`. While dragging, a
/// ghost of the host's new bounds is shown on the feedback layer.
#[derive(Debug, Default)]
pub struct DragEditPolicy {
    resizable: bool,
    ghost: Option<VisualId>,
}

impl DragEditPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resizable() -> Self {
        Self {
            resizable: true,
            ghost: None,
        }
    }

    fn remove_ghost(&mut self, feedback: &mut FeedbackContext<'_>) {
        if let Some(ghost) = self.ghost.take() {
            feedback.visuals.remove_child_visual(feedback.feedback_layer, ghost);
            feedback.visuals.dispose_visual(ghost);
        }
    }

    fn handles(&self, request: &Request) -> bool {
        request.is(&RequestType::MOVE)
            || request.is(&RequestType::ADD)
            || request.is(&RequestType::CLONE)
            || (self.resizable && request.is(&RequestType::RESIZE))
    }
}

impl<M: 'static> EditPolicy<M> for DragEditPolicy {
    fn command(&self, request: &Request, ctx: &PolicyContext<'_, M>) -> Option<Box<dyn Command<M>>> {
        let forwarded_kind = if request.is(&RequestType::MOVE) {
            RequestType::MOVE_CHILDREN
        } else if self.resizable && request.is(&RequestType::RESIZE) {
            RequestType::RESIZE_CHILDREN
        } else {
            return None;
        };

        let parent = ctx.parent()?;
        let mut forwarded = Request::change_bounds(
            forwarded_kind,
            vec![ctx.host],
            request.move_delta(),
            request.size_delta(),
        );
        if let Some(location) = request.location() {
            forwarded.set_location(location);
        }
        *forwarded.extended_data_mut() = request.extended_data().clone();
        ctx.command_from(parent, &forwarded)
    }

    fn understands_request(&self, request: &Request, _ctx: &PolicyContext<'_, M>) -> bool {
        self.handles(request) || request.is(&RequestType::ORPHAN)
    }

    fn show_source_feedback(&mut self, request: &Request, feedback: &mut FeedbackContext<'_>) {
        if !self.handles(request) {
            return;
        }
        let ghost = match self.ghost {
            Some(ghost) => ghost,
            None => {
                let ghost = feedback.visuals.create_visual();
                feedback.visuals.add_child_visual(feedback.feedback_layer, ghost, usize::MAX);
                self.ghost = Some(ghost);
                ghost
            }
        };
        let origin = feedback.visuals.bounds(feedback.feedback_layer).min;
        let bounds = request.transformed_rect(feedback.visuals.bounds(feedback.host_visual));
        let relative = if origin.is_finite() {
            bounds.translate(-origin.to_vec2())
        } else {
            bounds
        };
        feedback.visuals.set_constraint(ghost, Some(relative));
    }

    fn erase_source_feedback(&mut self, request: &Request, feedback: &mut FeedbackContext<'_>) {
        if self.handles(request) {
            self.remove_ghost(feedback);
        }
    }

    fn clear_feedback(&mut self, feedback: &mut FeedbackContext<'_>) {
        self.remove_ghost(feedback);
    }
}
