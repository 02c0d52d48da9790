use crate::command::{Command, CommandResult, CommandStack, CompoundCommand};
use crate::config::EditorConfig;
use crate::editpart::PartId;
use crate::model::Model;
use crate::request::Request;
use crate::viewer::EditPartViewer;

/// Borrowed view of an edit domain: what tools and actions work through.
///
/// Every operation that changes the model drains the model's changes into
/// the viewer before returning, so the part tree is always in sync afterwards.
pub struct EditSession<'a, M> {
    pub viewer: &'a mut EditPartViewer<M>,
    pub model: &'a mut M,
    pub stack: &'a mut CommandStack<M>,
    pub config: &'a EditorConfig,
}

impl<M: Model + 'static> EditSession<'_, M> {
    /// Executes `command` on the stack. `Ok(false)` when it declined.
    pub fn execute(&mut self, command: Box<dyn Command<M>>) -> CommandResult<bool> {
        let executed = self.stack.execute(command, self.model)?;
        self.sync();
        Ok(executed)
    }

    /// Asks `part` for a command and executes it.
    pub fn execute_request(&mut self, part: PartId, request: &Request) -> CommandResult<bool> {
        match self.command_for(part, request) {
            Some(command) => self.execute(command),
            None => Ok(false),
        }
    }

    pub fn command_for(&self, part: PartId, request: &Request) -> Option<Box<dyn Command<M>>> {
        self.viewer.command(part, request, self.model)
    }

    pub fn undo(&mut self) -> CommandResult {
        self.stack.undo(self.model)?;
        self.sync();
        Ok(())
    }

    pub fn redo(&mut self) -> CommandResult {
        self.stack.redo(self.model)?;
        self.sync();
        Ok(())
    }

    /// Hands every pending model change to the viewer.
    pub fn sync(&mut self) {
        for change in self.model.take_changes() {
            self.viewer.handle_model_change(change, self.model);
        }
    }

    /// The delete action: one `DELETE` request naming the whole selection,
    /// sent to every selected part, all resulting commands executed as one.
    pub fn delete_command(&self) -> Option<Box<dyn Command<M>>> {
        let selection = self.viewer.selected_parts().to_vec();
        if selection.is_empty() {
            return None;
        }
        let request = Request::delete(selection.clone());
        let mut compound = CompoundCommand::new("Delete");
        for part in selection {
            if let Some(command) = self.command_for(part, &request) {
                compound.add(command);
            }
        }
        (!compound.is_empty()).then(|| compound.unwrap_single())
    }

    pub fn delete_selection(&mut self) -> CommandResult<bool> {
        match self.delete_command() {
            Some(command) => self.execute(command),
            None => Ok(false),
        }
    }
}
