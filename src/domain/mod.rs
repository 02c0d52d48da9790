//! The edit domain ties a model, a viewer, the command stack and the active
//! tool together for one editing session.

mod session;

use std::fmt;

use crate::command::{Command, CommandResult, CommandStack};
use crate::config::EditorConfig;
use crate::editpart::{EditPartFactory, PartId};
use crate::model::{Model, ModelId};
use crate::request::Request;
use crate::tool::{Gesture, SelectionTool, Tool, ToolOutcome};
use crate::viewer::EditPartViewer;
use crate::visual::VisualAdapter;

pub use session::EditSession;

pub struct EditDomain<M> {
    model: M,
    viewer: EditPartViewer<M>,
    command_stack: CommandStack<M>,
    config: EditorConfig,
    active_tool: Option<Box<dyn Tool<M>>>,
}

impl<M: fmt::Debug> fmt::Debug for EditDomain<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditDomain")
            .field("model", &self.model)
            .field("viewer", &self.viewer)
            .field("command_stack", &self.command_stack)
            .field("config", &self.config)
            .field("active_tool", &self.active_tool)
            .finish()
    }
}

impl<M: Model + 'static> EditDomain<M> {
    /// Creates a domain with an active viewer and the selection tool loaded.
    pub fn new(
        model: M,
        factory: impl EditPartFactory<M> + 'static,
        visuals: impl VisualAdapter + 'static,
        config: EditorConfig,
    ) -> Self {
        Self::with_viewer(model, EditPartViewer::new(factory, visuals), config)
    }

    pub fn with_viewer(model: M, mut viewer: EditPartViewer<M>, config: EditorConfig) -> Self {
        viewer.activate();
        let mut domain = Self {
            model,
            viewer,
            command_stack: CommandStack::with_undo_limit(config.undo_limit),
            config,
            active_tool: None,
        };
        domain.load_default_tool();
        domain
    }

    pub fn session(&mut self) -> EditSession<'_, M> {
        EditSession {
            viewer: &mut self.viewer,
            model: &mut self.model,
            stack: &mut self.command_stack,
            config: &self.config,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn viewer(&self) -> &EditPartViewer<M> {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut EditPartViewer<M> {
        &mut self.viewer
    }

    pub fn command_stack(&self) -> &CommandStack<M> {
        &self.command_stack
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Shows `contents` in the viewer. Pending model changes are dropped
    /// first; the new tree is built from the current model state.
    pub fn set_contents(&mut self, contents: ModelId) {
        self.model.take_changes();
        self.viewer.set_contents(Some(contents), &self.model);
    }

    pub fn execute(&mut self, command: Box<dyn Command<M>>) -> CommandResult<bool> {
        self.session().execute(command)
    }

    pub fn execute_request(&mut self, part: PartId, request: &Request) -> CommandResult<bool> {
        self.session().execute_request(part, request)
    }

    pub fn undo(&mut self) -> CommandResult {
        self.session().undo()
    }

    pub fn redo(&mut self) -> CommandResult {
        self.session().redo()
    }

    pub fn sync(&mut self) {
        self.session().sync();
    }

    pub fn delete_selection(&mut self) -> CommandResult<bool> {
        self.session().delete_selection()
    }

    /// The save action: remember the current state as saved.
    pub fn mark_save_location(&mut self) {
        self.command_stack.mark_save_location();
    }

    pub fn is_dirty(&self) -> bool {
        self.command_stack.is_dirty()
    }

    pub fn active_tool(&self) -> Option<&dyn Tool<M>> {
        self.active_tool.as_deref()
    }

    /// Swaps the active tool, deactivating the old one first.
    pub fn set_active_tool(&mut self, tool: Box<dyn Tool<M>>) {
        if let Some(mut old) = self.active_tool.take() {
            log::debug!("Deactivating tool {}", old.name());
            old.on_deactivate(&mut self.session());
        }
        let mut tool = tool;
        log::debug!("Activating tool {}", tool.name());
        tool.on_activate(&mut self.session());
        self.active_tool = Some(tool);
    }

    pub fn load_default_tool(&mut self) {
        self.set_active_tool(Box::new(SelectionTool::new(self.config.drag_threshold)));
    }

    /// Routes a gesture to the active tool. A tool that reports it is finished
    /// is replaced by the default tool.
    pub fn handle_gesture(&mut self, gesture: &Gesture) -> ToolOutcome {
        let Some(mut tool) = self.active_tool.take() else {
            return ToolOutcome::Ignored;
        };
        let outcome = tool.handle_gesture(gesture, &mut self.session());
        self.active_tool = Some(tool);

        if outcome == ToolOutcome::Finished {
            self.load_default_tool();
        }
        outcome
    }
}
