#![warn(clippy::all, rust_2018_idioms)]

pub mod capability;
pub mod command;
pub mod config;
pub mod domain;
pub mod editpart;
pub mod error;
pub mod event;
pub mod id_generator;
pub mod model;
pub mod policy;
pub mod request;
pub mod selection;
mod token;
pub mod tool;
pub mod viewer;
pub mod visual;

pub use command::{Command, CommandStack, CompoundCommand};
pub use config::EditorConfig;
pub use domain::{EditDomain, EditSession};
pub use editpart::{EditPart, EditPartBehavior, EditPartFactory, PartId, PartKind};
pub use error::{CommandError, CommandResult, ConfigError};
pub use model::{ChangeKind, ChangeLog, Model, ModelChange, ModelId};
pub use policy::{EditPolicy, PolicyChain, Role};
pub use request::{Request, RequestType};
pub use selection::SelectionState;
pub use tool::{Gesture, Tool, ToolOutcome};
pub use viewer::EditPartViewer;
pub use visual::{VisualAdapter, VisualId, VisualStore};
