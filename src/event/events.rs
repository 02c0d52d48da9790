use crate::editpart::PartId;
use crate::selection::SelectionState;

/// Lifecycle and structure events of a single edit part.
///
/// `ChildAdded` and `RemovingChild` are delivered to the listeners of the
/// parent; the others to the listeners of the part itself.
#[derive(Debug, Clone, PartialEq)]
pub enum EditPartEvent {
    Activated(PartId),
    Deactivated(PartId),
    ChildAdded {
        parent: PartId,
        child: PartId,
        index: usize,
    },
    /// Fired before anything else happens to the child, so listeners still
    /// see a fully attached object graph.
    RemovingChild {
        parent: PartId,
        child: PartId,
        index: usize,
    },
    SelectedStateChanged {
        part: PartId,
        selected: SelectionState,
        focus: bool,
    },
}

/// Connection events of a graph node, delivered to its node listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEvent {
    SourceConnectionAdded {
        node: PartId,
        connection: PartId,
        index: usize,
    },
    RemovingSourceConnection {
        node: PartId,
        connection: PartId,
        index: usize,
    },
    TargetConnectionAdded {
        node: PartId,
        connection: PartId,
        index: usize,
    },
    RemovingTargetConnection {
        node: PartId,
        connection: PartId,
        index: usize,
    },
}

/// Viewer-wide selection and focus events.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    SelectionChanged { selection: Vec<PartId> },
    FocusChanged { old: Option<PartId>, new: Option<PartId> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStackEventKind {
    PreExecute,
    PostExecute,
    PreUndo,
    PostUndo,
    PreRedo,
    PostRedo,
    Flushed,
}

/// Emitted by the command stack around every change to its history.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandStackEvent {
    pub kind: CommandStackEventKind,
    /// Label of the command involved; empty for `Flushed`
    pub label: String,
}
