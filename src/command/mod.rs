mod compound;
mod stack;

use std::fmt;

pub use compound::{CompoundCommand, UnexecutableCommand};
pub use stack::CommandStack;

pub use crate::error::{CommandError, CommandResult};

/// A single reversible change to the application model `M`.
///
/// Commands are produced by edit policies and executed by the
/// [`CommandStack`]. They hold whatever ids and values they need; the model is
/// passed in on every call.
pub trait Command<M>: fmt::Debug {
    /// Human readable name, shown in undo/redo menus
    fn label(&self) -> &str {
        ""
    }

    /// Checked before the command is put on the stack. A `false` here is a
    /// decline, not an error.
    fn can_execute(&self, _model: &M) -> bool {
        true
    }

    fn can_undo(&self, _model: &M) -> bool {
        true
    }

    fn execute(&mut self, model: &mut M) -> CommandResult;

    fn undo(&mut self, model: &mut M) -> CommandResult;

    fn redo(&mut self, model: &mut M) -> CommandResult {
        self.execute(model)
    }

    /// Returns the compound this command appends to when chained, if any.
    fn as_chain_mut(&mut self) -> Option<&mut CompoundCommand<M>> {
        None
    }
}

/// Chains `next` after `first`.
///
/// The result executes `first` then `next` and undoes them in reverse. A
/// missing `next` leaves `first` untouched, and chaining onto an existing
/// chain appends to it instead of nesting.
pub fn chain<M: 'static>(
    mut first: Box<dyn Command<M>>,
    next: Option<Box<dyn Command<M>>>,
) -> Box<dyn Command<M>> {
    let Some(next) = next else {
        return first;
    };

    if let Some(compound) = first.as_chain_mut() {
        compound.add(next);
        return first;
    }

    let mut compound = CompoundCommand::chained();
    compound.add(first);
    compound.add(next);
    Box::new(compound)
}
