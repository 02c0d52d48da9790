use egui::{Key, Modifiers, Pos2, Vec2};

use super::{outcome_of, retarget};
use crate::command::{Command, CompoundCommand};
use crate::domain::EditSession;
use crate::editpart::PartId;
use crate::model::Model;
use crate::request::{Request, RequestType};
use crate::tool::{Gesture, Tool, ToolOutcome};

#[derive(Debug, Clone, Default)]
enum DragState {
    #[default]
    Idle,
    /// Pointer is down on a part but has not moved far enough to drag
    Pressed { origin: Pos2 },
    Dragging {
        origin: Pos2,
        parts: Vec<PartId>,
        target: Option<PartId>,
        request: Request,
    },
}

/// The default tool: selects parts, drags them and performs `OPEN` on
/// double click.
///
/// A drag onto the parts' own container is a move; a drag onto another
/// container orphans the parts from their parent and adds them to the new one.
#[derive(Debug, Clone)]
pub struct SelectionTool {
    drag_threshold: f32,
    state: DragState,
}

impl Default for SelectionTool {
    fn default() -> Self {
        Self::new(3.0)
    }
}

impl SelectionTool {
    pub fn new(drag_threshold: f32) -> Self {
        Self {
            drag_threshold,
            state: DragState::Idle,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    fn pointer_down<M: Model + 'static>(
        &mut self,
        pos: Pos2,
        modifiers: Modifiers,
        session: &mut EditSession<'_, M>,
    ) -> ToolOutcome {
        let selection = Request::selection(pos);
        let Some(part) = session.viewer.find_target_at(pos, &[], &selection, session.model) else {
            session.viewer.deselect_all();
            self.state = DragState::Idle;
            return ToolOutcome::Handled;
        };

        let selected = session.viewer.part(part).is_some_and(|p| p.selected().is_selected());
        if modifiers.command || modifiers.ctrl {
            if selected {
                session.viewer.deselect(part);
            } else {
                session.viewer.append_selection(part);
            }
            self.state = DragState::Idle;
            return ToolOutcome::Handled;
        }

        if modifiers.shift {
            session.viewer.append_selection(part);
        } else if !selected {
            session.viewer.select(part);
        }
        self.state = DragState::Pressed { origin: pos };
        ToolOutcome::Handled
    }

    fn begin_drag<M: Model + 'static>(&mut self, origin: Pos2, session: &mut EditSession<'_, M>) -> bool {
        // Bounds must be current before anything reads them.
        session.viewer.flush();

        let targeting = Request::move_parts(Vec::new(), Vec2::ZERO);
        let parts = drag_operation_set(session, &targeting);
        if parts.is_empty() {
            return false;
        }
        log::debug!("Dragging {} parts", parts.len());
        let request = Request::move_parts(parts.clone(), Vec2::ZERO);
        self.state = DragState::Dragging {
            origin,
            parts,
            target: None,
            request,
        };
        true
    }

    fn update_drag<M: Model + 'static>(&mut self, pos: Pos2, session: &mut EditSession<'_, M>) {
        let DragState::Dragging {
            origin,
            parts,
            target,
            request,
        } = &mut self.state
        else {
            return;
        };

        let delta = pos - *origin;
        let targeting = Request::move_parts(parts.clone(), delta);
        let new_target = session.viewer.find_target_at(pos, parts, &targeting, session.model);

        let is_move = new_target.is_some_and(|t| all_children_of(session, parts, t));
        let mut next = if is_move {
            targeting
        } else {
            Request::add(parts.clone(), delta, pos)
        };
        *next.extended_data_mut() = request.extended_data().clone();

        if next.kind() != request.kind() {
            for &part in parts.iter() {
                session.viewer.erase_source_feedback(part, request);
            }
        }
        if let Some(old) = *target {
            if new_target != Some(old) || next.kind() != request.kind() {
                session.viewer.erase_target_feedback(old, request);
            }
        }
        for &part in parts.iter() {
            session.viewer.show_source_feedback(part, &next);
        }
        retarget(session, None, new_target, &next);

        *target = new_target;
        *request = next;
    }

    fn end_drag<M: Model + 'static>(&mut self, session: &mut EditSession<'_, M>) -> ToolOutcome {
        let DragState::Dragging {
            parts, target, request, ..
        } = std::mem::take(&mut self.state)
        else {
            return ToolOutcome::Handled;
        };
        erase_drag_feedback(session, &parts, target, &request);

        let Some(target) = target else {
            return ToolOutcome::Handled;
        };
        match drag_command(session, &parts, target, &request) {
            Some(command) => outcome_of(session.execute(command), ToolOutcome::Executed),
            None => ToolOutcome::Handled,
        }
    }

    fn cancel<M: Model + 'static>(&mut self, session: &mut EditSession<'_, M>) -> bool {
        if let DragState::Dragging {
            parts, target, request, ..
        } = std::mem::take(&mut self.state)
        {
            erase_drag_feedback(session, &parts, target, &request);
            return true;
        }
        false
    }

    fn open<M: Model + 'static>(&mut self, pos: Pos2, session: &mut EditSession<'_, M>) -> ToolOutcome {
        let selection = Request::selection(pos);
        let Some(part) = session.viewer.find_target_at(pos, &[], &selection, session.model) else {
            return ToolOutcome::Ignored;
        };
        let Some(follow_up) = session.viewer.perform_request(part, &Request::open(pos), session.model) else {
            return ToolOutcome::Handled;
        };
        log::debug!("{:?} answered open with {}", part, follow_up.kind());
        outcome_of(session.execute_request(part, &follow_up), ToolOutcome::Executed)
    }
}

/// The selected parts that understand `request`, minus those whose ancestor
/// is also selected.
fn drag_operation_set<M: Model + 'static>(session: &EditSession<'_, M>, request: &Request) -> Vec<PartId> {
    let viewer = &*session.viewer;
    let selection = viewer.selected_parts();
    selection
        .iter()
        .copied()
        .filter(|&part| viewer.understands_request(part, request, session.model))
        .filter(|&part| {
            !selection
                .iter()
                .any(|&other| other != part && viewer.is_ancestor(other, part))
        })
        .collect()
}

fn all_children_of<M: Model + 'static>(session: &EditSession<'_, M>, parts: &[PartId], parent: PartId) -> bool {
    parts
        .iter()
        .all(|&part| session.viewer.part(part).and_then(|p| p.parent()) == Some(parent))
}

fn erase_drag_feedback<M: Model + 'static>(
    session: &mut EditSession<'_, M>,
    parts: &[PartId],
    target: Option<PartId>,
    request: &Request,
) {
    for &part in parts {
        session.viewer.erase_source_feedback(part, request);
    }
    if let Some(target) = target {
        session.viewer.erase_target_feedback(target, request);
    }
}

/// A move asks every dragged part; a reparent orphans every part from its
/// parent and then asks the new container to add them.
fn drag_command<M: Model + 'static>(
    session: &EditSession<'_, M>,
    parts: &[PartId],
    target: PartId,
    request: &Request,
) -> Option<Box<dyn Command<M>>> {
    let mut compound = CompoundCommand::new(if request.is(&RequestType::MOVE) { "Move" } else { "Add" });
    if request.is(&RequestType::MOVE) {
        for &part in parts {
            if let Some(command) = session.command_for(part, request) {
                compound.add(command);
            }
        }
    } else {
        let orphan = Request::orphan(parts.to_vec());
        for &part in parts {
            if let Some(command) = session.command_for(part, &orphan) {
                compound.add(command);
            }
        }
        if let Some(command) = session.command_for(target, request) {
            compound.add(command);
        }
    }
    (!compound.is_empty()).then(|| compound.unwrap_single())
}

impl<M: Model + 'static> Tool<M> for SelectionTool {
    fn name(&self) -> &str {
        "Selection"
    }

    fn on_deactivate(&mut self, session: &mut EditSession<'_, M>) {
        self.cancel(session);
    }

    fn handle_gesture(&mut self, gesture: &Gesture, session: &mut EditSession<'_, M>) -> ToolOutcome {
        match gesture {
            Gesture::PointerDown { pos, modifiers } => self.pointer_down(*pos, *modifiers, session),
            Gesture::PointerMove { pos } => match self.state {
                DragState::Idle => ToolOutcome::Ignored,
                DragState::Pressed { origin } => {
                    if (*pos - origin).length() <= self.drag_threshold {
                        return ToolOutcome::Ignored;
                    }
                    if !self.begin_drag(origin, session) {
                        self.state = DragState::Idle;
                        return ToolOutcome::Ignored;
                    }
                    self.update_drag(*pos, session);
                    ToolOutcome::Handled
                }
                DragState::Dragging { .. } => {
                    self.update_drag(*pos, session);
                    ToolOutcome::Handled
                }
            },
            Gesture::PointerUp { pos } => {
                if self.is_dragging() {
                    self.update_drag(*pos, session);
                    return self.end_drag(session);
                }
                self.state = DragState::Idle;
                ToolOutcome::Ignored
            }
            Gesture::DoubleClick { pos } => self.open(*pos, session),
            Gesture::Key(Key::Delete) | Gesture::Key(Key::Backspace) => {
                // A drag in progress is abandoned, not carried over the deletion
                self.cancel(session);
                outcome_of(session.delete_selection(), ToolOutcome::Executed)
            }
            Gesture::Key(Key::Escape) => {
                if !self.cancel(session) {
                    session.viewer.deselect_all();
                }
                ToolOutcome::Handled
            }
            Gesture::Key(_) => ToolOutcome::Ignored,
            Gesture::Cancel => {
                self.cancel(session);
                ToolOutcome::Handled
            }
        }
    }
}
