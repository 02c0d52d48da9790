use std::fmt;

use super::{Command, CommandError, CommandResult};
use crate::event::{CommandStackEvent, CommandStackEventKind, EventBus, EventHandler};
use crate::id_generator::ListenerId;

/// Linear undo/redo history of executed commands.
pub struct CommandStack<M> {
    /// Commands that can be undone, oldest first
    undoable: Vec<Box<dyn Command<M>>>,
    /// Commands that can be redone, most recently undone last
    redoable: Vec<Box<dyn Command<M>>>,
    undo_limit: Option<usize>,
    /// Depth of the undo stack when the model was last saved. `None` once
    /// that state can no longer be reached.
    save_location: Option<usize>,
    listeners: EventBus<CommandStackEvent>,
}

impl<M> fmt::Debug for CommandStack<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandStack")
            .field("undoable", &self.undoable.len())
            .field("redoable", &self.redoable.len())
            .field("undo_limit", &self.undo_limit)
            .field("save_location", &self.save_location)
            .finish()
    }
}

impl<M> Default for CommandStack<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> CommandStack<M> {
    /// Creates a new empty, unbounded command stack
    pub fn new() -> Self {
        Self {
            undoable: Vec::new(),
            redoable: Vec::new(),
            undo_limit: None,
            save_location: Some(0),
            listeners: EventBus::new(),
        }
    }

    pub fn with_undo_limit(limit: Option<usize>) -> Self {
        let mut stack = Self::new();
        stack.set_undo_limit(limit);
        stack
    }

    pub fn undo_limit(&self) -> Option<usize> {
        self.undo_limit
    }

    /// Caps the number of undoable commands. Older commands are dropped first.
    pub fn set_undo_limit(&mut self, limit: Option<usize>) {
        self.undo_limit = limit;
        self.trim_to_limit();
    }

    /// Execute a command and push it onto the undo stack.
    ///
    /// Returns `Ok(false)` without touching the history when the command
    /// declines to execute. A command that fails leaves the history as it
    /// was, redo stack included. `PostExecute` follows `PreExecute` either way.
    pub fn execute(&mut self, mut command: Box<dyn Command<M>>, model: &mut M) -> CommandResult<bool> {
        if !command.can_execute(model) {
            log::debug!("Command declined: {:?}", command.label());
            return Ok(false);
        }

        let label = command.label().to_string();
        self.fire(CommandStackEventKind::PreExecute, &label);
        if let Err(err) = command.execute(model) {
            log::warn!("Command {:?} failed: {}", label, err);
            self.fire(CommandStackEventKind::PostExecute, &label);
            return Err(err);
        }
        log::debug!("Executed {:?}", label);

        self.flush_redo();
        self.undoable.push(command);
        self.trim_to_limit();
        self.fire(CommandStackEventKind::PostExecute, &label);
        Ok(true)
    }

    /// Undo the most recent command
    pub fn undo(&mut self, model: &mut M) -> CommandResult {
        let Some(top) = self.undoable.last() else {
            return Err(CommandError::NothingToUndo);
        };
        if !top.can_undo(model) {
            return Err(CommandError::CannotUndo {
                label: top.label().to_string(),
            });
        }

        let Some(mut command) = self.undoable.pop() else {
            return Err(CommandError::NothingToUndo);
        };
        let label = command.label().to_string();
        self.fire(CommandStackEventKind::PreUndo, &label);
        if let Err(err) = command.undo(model) {
            self.undoable.push(command);
            self.fire(CommandStackEventKind::PostUndo, &label);
            return Err(err);
        }
        log::debug!("Undid {:?}", label);

        self.redoable.push(command);
        self.fire(CommandStackEventKind::PostUndo, &label);
        Ok(())
    }

    /// Redo the most recently undone command
    pub fn redo(&mut self, model: &mut M) -> CommandResult {
        let Some(mut command) = self.redoable.pop() else {
            return Err(CommandError::NothingToRedo);
        };

        let label = command.label().to_string();
        self.fire(CommandStackEventKind::PreRedo, &label);
        if let Err(err) = command.redo(model) {
            self.redoable.push(command);
            self.fire(CommandStackEventKind::PostRedo, &label);
            return Err(err);
        }
        log::debug!("Redid {:?}", label);

        self.undoable.push(command);
        self.fire(CommandStackEventKind::PostRedo, &label);
        Ok(())
    }

    pub fn can_undo(&self, model: &M) -> bool {
        self.undoable.last().is_some_and(|c| c.can_undo(model))
    }

    pub fn can_redo(&self) -> bool {
        !self.redoable.is_empty()
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.undoable.last().map(|c| c.label())
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.redoable.last().map(|c| c.label())
    }

    pub fn undo_depth(&self) -> usize {
        self.undoable.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redoable.len()
    }

    /// Remember the current position as the saved state.
    pub fn mark_save_location(&mut self) {
        self.save_location = Some(self.undoable.len());
    }

    /// True when the model differs from the last saved state.
    pub fn is_dirty(&self) -> bool {
        self.save_location != Some(self.undoable.len())
    }

    /// Clear the command history
    pub fn flush(&mut self) {
        self.undoable.clear();
        self.redoable.clear();
        self.save_location = Some(0);
        self.fire(CommandStackEventKind::Flushed, "");
    }

    pub fn add_listener(&self, handler: impl EventHandler<CommandStackEvent> + 'static) -> ListenerId {
        self.listeners.subscribe(Box::new(handler))
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn flush_redo(&mut self) {
        self.redoable.clear();
        // The saved state was in the redo stack and is gone now
        if self.save_location.is_some_and(|saved| saved > self.undoable.len()) {
            self.save_location = None;
        }
    }

    fn trim_to_limit(&mut self) {
        let Some(limit) = self.undo_limit else {
            return;
        };
        if self.undoable.len() <= limit {
            return;
        }

        let excess = self.undoable.len() - limit;
        self.undoable.drain(..excess);
        self.save_location = self.save_location.and_then(|saved| saved.checked_sub(excess));
    }

    fn fire(&self, kind: CommandStackEventKind, label: &str) {
        self.listeners.emit(&CommandStackEvent {
            kind,
            label: label.to_string(),
        });
    }
}
