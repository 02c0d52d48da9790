use std::fmt;

use egui::{Key, Modifiers, Pos2};

use crate::domain::EditSession;

/// Input delivered to the active tool. Coordinates are viewer coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    PointerDown { pos: Pos2, modifiers: Modifiers },
    PointerMove { pos: Pos2 },
    PointerUp { pos: Pos2 },
    DoubleClick { pos: Pos2 },
    Key(Key),
    /// The gesture source lost the pointer, e.g. the window lost focus
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolOutcome {
    /// The tool had nothing to do with the gesture
    Ignored,
    Handled,
    /// A command was executed
    Executed,
    /// The tool is done and should be unloaded
    Finished,
}

/// Turns gestures into requests, feedback and commands.
pub trait Tool<M>: fmt::Debug {
    fn name(&self) -> &str;

    fn on_activate(&mut self, _session: &mut EditSession<'_, M>) {}

    fn on_deactivate(&mut self, _session: &mut EditSession<'_, M>) {}

    fn handle_gesture(&mut self, gesture: &Gesture, session: &mut EditSession<'_, M>) -> ToolOutcome;
}
