pub mod connection;
pub mod creation;
pub mod selection;

use crate::command::CommandResult;
use crate::domain::EditSession;
use crate::editpart::PartId;
use crate::model::Model;
use crate::request::Request;

use super::ToolOutcome;

/// Maps the result of executing a tool's command onto a tool outcome.
/// Failures are logged; a tool has nobody to report them to.
fn outcome_of(result: CommandResult<bool>, done: ToolOutcome) -> ToolOutcome {
    match result {
        Ok(true) => done,
        Ok(false) => ToolOutcome::Handled,
        Err(err) => {
            log::warn!("Tool command failed: {}", err);
            ToolOutcome::Handled
        }
    }
}

/// Moves the target feedback from `old` to `new`.
fn retarget<M: Model + 'static>(
    session: &mut EditSession<'_, M>,
    old: Option<PartId>,
    new: Option<PartId>,
    request: &Request,
) {
    if old != new {
        if let Some(old) = old {
            session.viewer.erase_target_feedback(old, request);
        }
    }
    if let Some(new) = new {
        session.viewer.show_target_feedback(new, request);
    }
}
