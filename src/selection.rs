use serde::{Deserialize, Serialize};

/// Selection state of a single edit part.
///
/// The viewer keeps at most one part in [`SelectionState::Primary`]; the part
/// itself does not know about its siblings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SelectionState {
    #[default]
    None,
    Selected,
    Primary,
}

impl SelectionState {
    pub fn is_selected(self) -> bool {
        self != Self::None
    }
}
