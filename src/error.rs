use thiserror::Error;

use crate::model::ModelId;

/// Errors that can occur while executing, undoing or redoing commands
#[derive(Debug, Error)]
pub enum CommandError {
    /// The undo stack is empty
    #[error("Nothing to undo")]
    NothingToUndo,

    /// The redo stack is empty
    #[error("Nothing to redo")]
    NothingToRedo,

    /// The top of the undo stack refuses to be undone
    #[error("Command cannot be undone: {label}")]
    CannotUndo { label: String },

    /// The command failed while mutating the model
    #[error("Command failed: {0}")]
    ExecutionFailed(String),

    /// The command refers to a model object that no longer exists
    #[error("Model object {0} not found")]
    MissingModel(ModelId),
}

/// Result type for command operations
pub type CommandResult<T = ()> = Result<T, CommandError>;

/// Errors that can occur while loading editor configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
