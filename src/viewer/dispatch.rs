use super::EditPartViewer;
use crate::command::Command;
use crate::editpart::PartId;
use crate::policy::{FeedbackContext, PolicyContext};
use crate::request::{Request, RequestType};

#[derive(Debug, Clone, Copy)]
enum Feedback {
    ShowSource,
    EraseSource,
    ShowTarget,
    EraseTarget,
}

impl<M: 'static> EditPartViewer<M> {
    /// The command the part's policies produce for `request`, chained in
    /// installation order. `None` when every policy declined.
    pub fn command(&self, id: PartId, request: &Request, doc: &M) -> Option<Box<dyn Command<M>>> {
        let part = self.parts.get(id)?;
        let ctx = PolicyContext::new(id, self, doc);
        let command = part.policies.command(request, &ctx);
        log::debug!(
            "{:?} {} for {}",
            id,
            if command.is_some() { "produced a command" } else { "declined" },
            request.kind()
        );
        command
    }

    /// The part that should handle `request` on behalf of `id`. A selectable
    /// part is its own target for selection requests no policy claimed.
    pub fn target_edit_part(&self, id: PartId, request: &Request, doc: &M) -> Option<PartId> {
        let part = self.parts.get(id)?;
        let ctx = PolicyContext::new(id, self, doc);
        part.policies.target_edit_part(request, &ctx).or_else(|| {
            (request.is(&RequestType::SELECTION) && part.behavior.is_selectable()).then_some(id)
        })
    }

    pub fn understands_request(&self, id: PartId, request: &Request, doc: &M) -> bool {
        let Some(part) = self.parts.get(id) else {
            return false;
        };
        let ctx = PolicyContext::new(id, self, doc);
        part.policies.understands_request(request, &ctx)
    }

    /// Hands a non-command request such as `OPEN` to the part's behaviour.
    pub fn perform_request(&mut self, id: PartId, request: &Request, doc: &M) -> Option<Request> {
        let part = self.parts.get_mut(id)?;
        let model = part.model;
        part.behavior.perform_request(request, model, doc)
    }

    pub fn show_source_feedback(&mut self, id: PartId, request: &Request) {
        self.feedback(id, request, Feedback::ShowSource);
    }

    pub fn erase_source_feedback(&mut self, id: PartId, request: &Request) {
        self.feedback(id, request, Feedback::EraseSource);
    }

    pub fn show_target_feedback(&mut self, id: PartId, request: &Request) {
        self.feedback(id, request, Feedback::ShowTarget);
    }

    pub fn erase_target_feedback(&mut self, id: PartId, request: &Request) {
        self.feedback(id, request, Feedback::EraseTarget);
    }

    /// Removes whatever feedback the part's policies still show.
    pub(crate) fn clear_feedback(&mut self, id: PartId) {
        let Self {
            parts,
            visuals,
            feedback_layer,
            ..
        } = self;
        let Some(part) = parts.get_mut(id) else {
            return;
        };
        let mut feedback = FeedbackContext {
            host: id,
            host_visual: part.visual,
            feedback_layer: *feedback_layer,
            visuals: visuals.as_mut(),
        };
        part.policies.clear_feedback(&mut feedback);
    }

    /// Feedback is only shown by active parts.
    fn feedback(&mut self, id: PartId, request: &Request, which: Feedback) {
        let Self {
            parts,
            visuals,
            feedback_layer,
            ..
        } = self;
        let Some(part) = parts.get_mut(id) else {
            return;
        };
        if !part.active {
            return;
        }
        let mut feedback = FeedbackContext {
            host: id,
            host_visual: part.visual,
            feedback_layer: *feedback_layer,
            visuals: visuals.as_mut(),
        };
        match which {
            Feedback::ShowSource => part.policies.show_source_feedback(request, &mut feedback),
            Feedback::EraseSource => part.policies.erase_source_feedback(request, &mut feedback),
            Feedback::ShowTarget => part.policies.show_target_feedback(request, &mut feedback),
            Feedback::EraseTarget => part.policies.erase_target_feedback(request, &mut feedback),
        }
    }
}
