use super::EditPartViewer;
use crate::editpart::{EditPart, PartId};
use crate::event::{EditPartEvent, ViewerEvent};
use crate::policy::FeedbackContext;
use crate::selection::SelectionState;

impl<M: 'static> EditPartViewer<M> {
    /// Sets the selection state of a single part.
    ///
    /// This does not keep the viewer's selection in sync; use [`Self::select`]
    /// and friends for that.
    ///
    /// # Panics
    /// If the part is not selectable and `state` is not `None`.
    pub fn set_selected(&mut self, id: PartId, state: SelectionState) {
        let Some(part) = self.parts.get(id) else {
            return;
        };
        assert!(
            state == SelectionState::None || part.behavior.is_selectable(),
            "An EditPart has to be selectable in order to be selected"
        );
        if part.selected == state {
            return;
        }
        self.update_selection_state(id, |part| part.selected = state);
    }

    /// Sets the focus flag of a single part.
    ///
    /// # Panics
    /// If the part is not selectable and `focus` is true.
    pub fn set_part_focus(&mut self, id: PartId, focus: bool) {
        let Some(part) = self.parts.get(id) else {
            return;
        };
        assert!(
            !focus || part.behavior.is_selectable(),
            "An EditPart has to be selectable in order to receive focus"
        );
        if part.focus == focus {
            return;
        }
        self.update_selection_state(id, |part| part.focus = focus);
    }

    fn update_selection_state(&mut self, id: PartId, update: impl FnOnce(&mut EditPart<M>)) {
        let Self {
            parts,
            visuals,
            feedback_layer,
            ..
        } = self;
        let Some(part) = parts.get_mut(id) else {
            return;
        };
        update(part);
        let (selected, focus) = (part.selected, part.focus);

        part.listeners.emit(&EditPartEvent::SelectedStateChanged {
            part: id,
            selected,
            focus,
        });
        let mut feedback = FeedbackContext {
            host: id,
            host_visual: part.visual,
            feedback_layer: *feedback_layer,
            visuals: visuals.as_mut(),
        };
        part.policies.host_selection_changed(selected, focus, &mut feedback);
    }

    /// Selected parts, primary last.
    pub fn selected_parts(&self) -> &[PartId] {
        &self.selection
    }

    pub fn primary_selection(&self) -> Option<PartId> {
        self.selection.last().copied()
    }

    pub fn focus(&self) -> Option<PartId> {
        self.focus
    }

    /// Replaces the selection with `id`.
    pub fn select(&mut self, id: PartId) {
        if self.selection.len() == 1 && self.selection[0] == id {
            return;
        }
        self.prim_deselect_all();
        self.append_selection(id);
    }

    /// Adds `id` to the selection as the new primary selection.
    pub fn append_selection(&mut self, id: PartId) {
        if Some(id) != self.focus {
            self.set_focus(None);
        }
        if let Some(&primary) = self.selection.last() {
            self.set_selected(primary, SelectionState::Selected);
        }
        self.selection.retain(|&part| part != id);
        self.selection.push(id);
        self.set_selected(id, SelectionState::Primary);
        self.fire_selection_changed();
    }

    pub fn deselect(&mut self, id: PartId) {
        self.set_selected(id, SelectionState::None);
        self.selection.retain(|&part| part != id);
        if let Some(&primary) = self.selection.last() {
            self.set_selected(primary, SelectionState::Primary);
        }
        self.fire_selection_changed();
    }

    pub fn deselect_all(&mut self) {
        self.set_focus(None);
        self.prim_deselect_all();
        self.fire_selection_changed();
    }

    fn prim_deselect_all(&mut self) {
        let selection = std::mem::take(&mut self.selection);
        for part in selection {
            self.set_selected(part, SelectionState::None);
        }
    }

    /// Moves the focus to `id`, or clears it.
    pub fn set_focus(&mut self, id: Option<PartId>) {
        if self.focus == id {
            return;
        }
        let old = self.focus;
        if let Some(old) = old {
            self.set_part_focus(old, false);
        }
        self.focus = id;
        if let Some(new) = id {
            self.set_part_focus(new, true);
        }
        self.listeners.emit(&ViewerEvent::FocusChanged { old, new: id });
    }

    fn fire_selection_changed(&self) {
        self.listeners.emit(&ViewerEvent::SelectionChanged {
            selection: self.selection.clone(),
        });
    }
}
