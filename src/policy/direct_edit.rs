use std::fmt;

use super::{EditPolicy, FeedbackContext, PolicyContext};
use crate::command::Command;
use crate::request::{Request, RequestType};

type EditValueProvider<M> = Box<dyn Fn(&str, &PolicyContext<'_, M>) -> Option<Box<dyn Command<M>>>>;

/// Turns a finished in-place edit into a command.
///
/// While the edit is in progress, source feedback shows the current value on
/// the host's label; erasing the feedback restores the label it had before.
pub struct DirectEditPolicy<M> {
    provider: EditValueProvider<M>,
    original_label: Option<String>,
}

impl<M> fmt::Debug for DirectEditPolicy<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectEditPolicy")
            .field("original_label", &self.original_label)
            .finish_non_exhaustive()
    }
}

impl<M> DirectEditPolicy<M> {
    pub fn new(provider: impl Fn(&str, &PolicyContext<'_, M>) -> Option<Box<dyn Command<M>>> + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            original_label: None,
        }
    }
}

impl<M: 'static> EditPolicy<M> for DirectEditPolicy<M> {
    fn command(&self, request: &Request, ctx: &PolicyContext<'_, M>) -> Option<Box<dyn Command<M>>> {
        if !request.is(&RequestType::DIRECT_EDIT) {
            return None;
        }
        (self.provider)(request.direct_edit_value()?, ctx)
    }

    fn understands_request(&self, request: &Request, _ctx: &PolicyContext<'_, M>) -> bool {
        request.is(&RequestType::DIRECT_EDIT)
    }

    fn show_source_feedback(&mut self, request: &Request, feedback: &mut FeedbackContext<'_>) {
        let Some(value) = request.direct_edit_value() else {
            return;
        };
        if self.original_label.is_none() {
            self.original_label = feedback.visuals.label(feedback.host_visual).map(str::to_owned);
        }
        feedback.visuals.set_label(feedback.host_visual, value);
    }

    fn erase_source_feedback(&mut self, request: &Request, feedback: &mut FeedbackContext<'_>) {
        if !request.is(&RequestType::DIRECT_EDIT) {
            return;
        }
        if let Some(original) = self.original_label.take() {
            feedback.visuals.set_label(feedback.host_visual, &original);
        }
    }

    fn deactivate(&mut self) {
        self.original_label = None;
    }
}
