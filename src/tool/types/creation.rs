use egui::{Key, Pos2, Rect};

use super::{outcome_of, retarget};
use crate::domain::EditSession;
use crate::editpart::PartId;
use crate::model::Model;
use crate::request::{CreatedObject, CreationFactory, Request};
use crate::tool::{Gesture, Tool, ToolOutcome};

/// Creates one object from `factory`: click to create at the default size,
/// or drag out the bounds. The new part is selected afterwards.
#[derive(Debug)]
pub struct CreationTool {
    factory: Box<dyn CreationFactory>,
    object: Option<CreatedObject>,
    start: Option<Pos2>,
    target: Option<PartId>,
    request: Option<Request>,
}

impl CreationTool {
    pub fn new(factory: impl CreationFactory + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            object: None,
            start: None,
            target: None,
            request: None,
        }
    }

    /// The object the next create request proposes.
    pub fn pending_object(&self) -> Option<&CreatedObject> {
        self.object.as_ref()
    }

    fn pending(&mut self) -> CreatedObject {
        self.object.get_or_insert_with(|| self.factory.new_object()).clone()
    }

    /// Builds the request for the current gesture. A drag shorter than the
    /// threshold counts as a click and leaves the size to the layout.
    fn request_at(&mut self, pos: Pos2, threshold: f32) -> Request {
        let object = self.pending();
        match self.start {
            Some(start) if (pos - start).length() > threshold => {
                let bounds = Rect::from_two_pos(start, pos);
                Request::create(object, bounds.min, Some(bounds.size()))
            }
            Some(start) => Request::create(object, start, None),
            None => Request::create(object, pos, None),
        }
    }

    fn update_target<M: Model + 'static>(&mut self, pos: Pos2, session: &mut EditSession<'_, M>) {
        let request = self.request_at(pos, session.config.drag_threshold);
        let anchor = self.start.unwrap_or(pos);
        let target = session.viewer.find_target_at(anchor, &[], &request, session.model);
        retarget(session, self.target, target, &request);
        self.target = target;
        self.request = Some(request);
    }

    fn clear_feedback<M: Model + 'static>(&mut self, session: &mut EditSession<'_, M>) {
        if let (Some(target), Some(request)) = (self.target.take(), self.request.take()) {
            session.viewer.erase_target_feedback(target, &request);
        }
    }

    fn create<M: Model + 'static>(&mut self, pos: Pos2, session: &mut EditSession<'_, M>) -> ToolOutcome {
        self.update_target(pos, session);
        let target = self.target;
        let request = self.request.clone();
        self.clear_feedback(session);
        self.start = None;

        let (Some(target), Some(request)) = (target, request) else {
            log::debug!("Nothing accepts a new {}", self.factory.object_type());
            return ToolOutcome::Finished;
        };
        let Some(object) = self.object.take() else {
            return ToolOutcome::Finished;
        };

        if outcome_of(session.execute_request(target, &request), ToolOutcome::Executed) == ToolOutcome::Executed {
            if let Some(part) = session.viewer.edit_part_for_model(object.id) {
                if session.viewer.part(part).is_some_and(|p| p.is_selectable()) {
                    session.viewer.select(part);
                }
            }
        }
        ToolOutcome::Finished
    }
}

impl<M: Model + 'static> Tool<M> for CreationTool {
    fn name(&self) -> &str {
        "Creation"
    }

    fn on_activate(&mut self, _session: &mut EditSession<'_, M>) {
        self.pending();
    }

    fn on_deactivate(&mut self, session: &mut EditSession<'_, M>) {
        self.clear_feedback(session);
        self.start = None;
    }

    fn handle_gesture(&mut self, gesture: &Gesture, session: &mut EditSession<'_, M>) -> ToolOutcome {
        match gesture {
            Gesture::PointerDown { pos, .. } => {
                self.start = Some(*pos);
                self.update_target(*pos, session);
                ToolOutcome::Handled
            }
            Gesture::PointerMove { pos } => {
                self.update_target(*pos, session);
                ToolOutcome::Handled
            }
            Gesture::PointerUp { pos } => self.create(*pos, session),
            Gesture::Key(Key::Escape) | Gesture::Cancel => {
                self.clear_feedback(session);
                ToolOutcome::Finished
            }
            Gesture::DoubleClick { .. } | Gesture::Key(_) => ToolOutcome::Ignored,
        }
    }
}
