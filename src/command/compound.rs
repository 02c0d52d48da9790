use std::fmt;

use super::{Command, CommandError, CommandResult};

/// An ordered group of commands that acts as one.
///
/// Executes front to back and undoes back to front. If a sub-command fails
/// part way through `execute`, the ones that already ran are undone before the
/// error is returned. The error returned is always the one that stopped the
/// execution, even when the rollback fails too.
pub struct CompoundCommand<M> {
    label: String,
    commands: Vec<Box<dyn Command<M>>>,
    chained: bool,
}

impl<M> fmt::Debug for CompoundCommand<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompoundCommand")
            .field("label", &self.label)
            .field("commands", &self.commands)
            .field("chained", &self.chained)
            .finish()
    }
}

impl<M> Default for CompoundCommand<M> {
    fn default() -> Self {
        Self::new("")
    }
}

impl<M> CompoundCommand<M> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            commands: Vec::new(),
            chained: false,
        }
    }

    /// A compound produced by [`super::chain`]; further chaining appends to it.
    pub(crate) fn chained() -> Self {
        Self {
            chained: true,
            ..Self::new("")
        }
    }

    pub fn add(&mut self, command: Box<dyn Command<M>>) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[Box<dyn Command<M>>] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Collapses a compound of one into that one command.
    pub fn unwrap_single(mut self) -> Box<dyn Command<M>>
    where
        M: 'static,
    {
        if self.commands.len() == 1 {
            if let Some(only) = self.commands.pop() {
                return only;
            }
        }
        Box::new(self)
    }
}

impl<M> Command<M> for CompoundCommand<M> {
    fn label(&self) -> &str {
        if !self.label.is_empty() {
            return &self.label;
        }
        self.commands.first().map(|c| c.label()).unwrap_or("")
    }

    fn can_execute(&self, model: &M) -> bool {
        !self.commands.is_empty() && self.commands.iter().all(|c| c.can_execute(model))
    }

    fn can_undo(&self, model: &M) -> bool {
        self.commands.iter().all(|c| c.can_undo(model))
    }

    fn execute(&mut self, model: &mut M) -> CommandResult {
        for index in 0..self.commands.len() {
            if let Err(err) = self.commands[index].execute(model) {
                log::debug!("Rolling back {} of {} commands after: {}", index, self.commands.len(), err);
                for done in self.commands[..index].iter_mut().rev() {
                    // The model may be left partly applied; the first error is still the one reported
                    if let Err(rollback) = done.undo(model) {
                        log::warn!("Rollback of {:?} failed: {}", done.label(), rollback);
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }

    fn undo(&mut self, model: &mut M) -> CommandResult {
        for command in self.commands.iter_mut().rev() {
            command.undo(model)?;
        }
        Ok(())
    }

    fn redo(&mut self, model: &mut M) -> CommandResult {
        for command in self.commands.iter_mut() {
            command.redo(model)?;
        }
        Ok(())
    }

    fn as_chain_mut(&mut self) -> Option<&mut CompoundCommand<M>> {
        if self.chained { Some(self) } else { None }
    }
}

/// A command that can never run. Returned when a request is understood but
/// the operation makes no sense, e.g. moving a child onto its own slot.
#[derive(Debug, Clone, Default)]
pub struct UnexecutableCommand {
    label: String,
}

impl UnexecutableCommand {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

impl<M> Command<M> for UnexecutableCommand {
    fn label(&self) -> &str {
        &self.label
    }

    fn can_execute(&self, _model: &M) -> bool {
        false
    }

    fn can_undo(&self, _model: &M) -> bool {
        false
    }

    fn execute(&mut self, _model: &mut M) -> CommandResult {
        Err(CommandError::ExecutionFailed(format!("{} is not executable", self.label)))
    }

    fn undo(&mut self, _model: &mut M) -> CommandResult {
        Err(CommandError::CannotUndo {
            label: self.label.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Append(&'static str, bool);

    impl Command<Vec<&'static str>> for Append {
        fn execute(&mut self, model: &mut Vec<&'static str>) -> CommandResult {
            if self.1 {
                return Err(CommandError::ExecutionFailed(self.0.to_string()));
            }
            model.push(self.0);
            Ok(())
        }

        fn undo(&mut self, model: &mut Vec<&'static str>) -> CommandResult {
            model.pop();
            Ok(())
        }
    }

    #[test]
    fn test_empty_compound_cannot_execute() {
        let compound = CompoundCommand::<Vec<&'static str>>::new("empty");
        assert!(!compound.can_execute(&Vec::new()));
    }

    #[test]
    fn test_failure_rolls_back_prefix() {
        let mut compound = CompoundCommand::new("batch");
        compound.add(Box::new(Append("a", false)));
        compound.add(Box::new(Append("b", false)));
        compound.add(Box::new(Append("c", true)));

        let mut model = Vec::new();
        let result = compound.execute(&mut model);

        assert!(matches!(result, Err(CommandError::ExecutionFailed(_))));
        assert!(model.is_empty());
    }

    /// Runs fine but refuses to be taken back.
    #[derive(Debug)]
    struct Stuck;

    impl Command<Vec<&'static str>> for Stuck {
        fn execute(&mut self, model: &mut Vec<&'static str>) -> CommandResult {
            model.push("stuck");
            Ok(())
        }

        fn undo(&mut self, _model: &mut Vec<&'static str>) -> CommandResult {
            Err(CommandError::CannotUndo {
                label: "stuck".to_owned(),
            })
        }
    }

    #[test]
    fn test_failed_rollback_reports_the_original_error() {
        let mut compound = CompoundCommand::new("batch");
        compound.add(Box::new(Append("a", false)));
        compound.add(Box::new(Stuck));
        compound.add(Box::new(Append("c", true)));

        let mut model = Vec::new();
        let result = compound.execute(&mut model);

        assert!(matches!(result, Err(CommandError::ExecutionFailed(ref label)) if label == "c"));
        // The rollback carried on past the stuck command and popped once more
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn test_unwrap_single() {
        let mut compound = CompoundCommand::new("one");
        compound.add(Box::new(Append("a", false)));
        let mut single = compound.unwrap_single();
        // A plain command never reports itself as a chain
        assert!(single.as_chain_mut().is_none());
    }
}
