mod trait_def;
pub mod types;

pub use trait_def::{Gesture, Tool, ToolOutcome};

// Re-export specific tool implementations
pub use types::connection::ConnectionCreationTool;
pub use types::creation::CreationTool;
pub use types::selection::SelectionTool;
