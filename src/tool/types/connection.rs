use egui::{Key, Pos2};

use super::{outcome_of, retarget};
use crate::domain::EditSession;
use crate::editpart::PartId;
use crate::model::Model;
use crate::request::{CreatedObject, CreationFactory, Request};
use crate::tool::{Gesture, Tool, ToolOutcome};

/// Two-click connection creation. The first click picks a source that
/// accepts `CONNECTION_START`, the second a target that answers
/// `CONNECTION_END` with a command.
#[derive(Debug)]
pub struct ConnectionCreationTool {
    factory: Box<dyn CreationFactory>,
    object: Option<CreatedObject>,
    source: Option<PartId>,
    target: Option<PartId>,
    request: Option<Request>,
}

impl ConnectionCreationTool {
    pub fn new(factory: impl CreationFactory + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            object: None,
            source: None,
            target: None,
            request: None,
        }
    }

    pub fn source(&self) -> Option<PartId> {
        self.source
    }

    fn pending(&mut self) -> CreatedObject {
        self.object.get_or_insert_with(|| self.factory.new_object()).clone()
    }

    fn request_at(&mut self, pos: Pos2) -> Request {
        let object = self.pending();
        match self.source {
            Some(source) => Request::connection_end(source, object, pos),
            None => Request::connection_start(object, pos),
        }
    }

    fn update_target<M: Model + 'static>(&mut self, pos: Pos2, session: &mut EditSession<'_, M>) {
        let mut request = self.request_at(pos);
        let target = session.viewer.find_target_at(pos, &[], &request, session.model);
        if let Some(target) = target {
            if self.source.is_some() {
                request.set_target(target);
            }
        }
        retarget(session, self.target, target, &request);
        self.target = target;
        self.request = Some(request);
    }

    fn clear_feedback<M: Model + 'static>(&mut self, session: &mut EditSession<'_, M>) {
        if let (Some(target), Some(request)) = (self.target.take(), self.request.take()) {
            session.viewer.erase_target_feedback(target, &request);
        }
    }

    fn start<M: Model + 'static>(&mut self, pos: Pos2, session: &mut EditSession<'_, M>) -> ToolOutcome {
        self.update_target(pos, session);
        let (Some(target), Some(request)) = (self.target, self.request.as_mut()) else {
            return ToolOutcome::Handled;
        };
        request.set_source(target);
        if session.command_for(target, request).is_none() {
            log::debug!("{:?} cannot start a connection", target);
            return ToolOutcome::Handled;
        }
        log::debug!("Connection started at {:?}", target);
        self.source = Some(target);
        self.clear_feedback(session);
        ToolOutcome::Handled
    }

    fn complete<M: Model + 'static>(&mut self, pos: Pos2, session: &mut EditSession<'_, M>) -> ToolOutcome {
        self.update_target(pos, session);
        let target = self.target;
        let request = self.request.clone();
        self.clear_feedback(session);

        let (Some(target), Some(request)) = (target, request) else {
            return ToolOutcome::Handled;
        };
        match session.command_for(target, &request) {
            Some(command) => {
                self.object = None;
                self.source = None;
                outcome_of(session.execute(command), ToolOutcome::Executed);
                ToolOutcome::Finished
            }
            None => ToolOutcome::Handled,
        }
    }
}

impl<M: Model + 'static> Tool<M> for ConnectionCreationTool {
    fn name(&self) -> &str {
        "Connection"
    }

    fn on_activate(&mut self, _session: &mut EditSession<'_, M>) {
        self.pending();
    }

    fn on_deactivate(&mut self, session: &mut EditSession<'_, M>) {
        self.clear_feedback(session);
        self.source = None;
    }

    fn handle_gesture(&mut self, gesture: &Gesture, session: &mut EditSession<'_, M>) -> ToolOutcome {
        match gesture {
            Gesture::PointerDown { pos, .. } => match self.source {
                None => self.start(*pos, session),
                Some(_) => self.complete(*pos, session),
            },
            Gesture::PointerMove { pos } => {
                self.update_target(*pos, session);
                ToolOutcome::Handled
            }
            Gesture::Key(Key::Escape) | Gesture::Cancel => {
                self.clear_feedback(session);
                self.source = None;
                ToolOutcome::Finished
            }
            Gesture::PointerUp { .. } | Gesture::DoubleClick { .. } | Gesture::Key(_) => ToolOutcome::Ignored,
        }
    }
}
