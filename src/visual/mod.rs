//! The visual side of an edit part: a tree of visuals with bounds.
//!
//! Painting is not done here. A [`VisualAdapter`] only needs to support the
//! containment operations the edit-part tree mirrors, layout constraints,
//! a couple of feedback flags and hit testing. Bounds are recomputed lazily:
//! every mutation marks the tree dirty and [`VisualAdapter::flush`] performs
//! the deferred update.

mod figure;
mod store;
mod tree;

use std::fmt;

use egui::{Pos2, Rect};

pub use figure::FigureCanvas;
pub use store::{VisualNode, VisualStore};
pub use tree::TreeItems;

slotmap::new_key_type! {
    /// Handle of a visual inside a [`VisualAdapter`].
    pub struct VisualId;
}

/// The operations the edit-part tree needs from a visual toolkit.
///
/// Implementors provide storage, layout and hit testing; everything else has a
/// default in terms of the shared [`VisualStore`].
pub trait VisualAdapter: fmt::Debug {
    fn store(&self) -> &VisualStore;

    fn store_mut(&mut self) -> &mut VisualStore;

    /// Recompute the bounds of every visual. Returns the number of visuals laid out.
    fn layout(&mut self) -> usize;

    /// The deepest visual under `pos`, skipping the subtrees rooted at `exclude`.
    fn visual_at(&self, pos: Pos2, exclude: &[VisualId]) -> Option<VisualId>;

    fn create_visual(&mut self) -> VisualId {
        self.store_mut().insert(false)
    }

    /// A visual that is never hit itself, only through its children.
    fn create_layer(&mut self) -> VisualId {
        self.store_mut().insert(true)
    }

    fn dispose_visual(&mut self, visual: VisualId) {
        self.store_mut().dispose(visual);
    }

    fn add_child_visual(&mut self, parent: VisualId, child: VisualId, index: usize) {
        self.store_mut().add_child(parent, child, index);
    }

    fn remove_child_visual(&mut self, parent: VisualId, child: VisualId) {
        self.store_mut().remove_child(parent, child);
    }

    fn child_visuals(&self, visual: VisualId) -> &[VisualId] {
        self.store().children(visual)
    }

    fn parent_visual(&self, visual: VisualId) -> Option<VisualId> {
        self.store().get(visual).and_then(|node| node.parent)
    }

    fn constraint(&self, visual: VisualId) -> Option<Rect> {
        self.store().get(visual).and_then(|node| node.constraint)
    }

    fn set_constraint(&mut self, visual: VisualId, constraint: Option<Rect>) {
        let store = self.store_mut();
        if let Some(node) = store.get_mut(visual) {
            node.constraint = constraint;
            store.invalidate();
        }
    }

    fn label(&self, visual: VisualId) -> Option<&str> {
        self.store().get(visual).map(|node| node.label.as_str())
    }

    fn set_label(&mut self, visual: VisualId, label: &str) {
        if let Some(node) = self.store_mut().get_mut(visual) {
            node.label = label.to_owned();
        }
    }

    fn is_highlighted(&self, visual: VisualId) -> bool {
        self.store().get(visual).is_some_and(|node| node.highlighted)
    }

    fn set_highlighted(&mut self, visual: VisualId, highlighted: bool) {
        if let Some(node) = self.store_mut().get_mut(visual) {
            node.highlighted = highlighted;
        }
    }

    /// Absolute bounds as of the last flush.
    fn bounds(&self, visual: VisualId) -> Rect {
        self.store().get(visual).map_or(Rect::NOTHING, |node| node.bounds)
    }

    fn invalidate(&mut self, _visual: VisualId) {
        self.store_mut().invalidate();
    }

    fn needs_update(&self) -> bool {
        self.store().is_dirty()
    }

    /// Perform the deferred update. Returns the number of visuals laid out,
    /// zero when nothing was pending.
    fn flush(&mut self) -> usize {
        if !self.store().is_dirty() {
            return 0;
        }
        let count = self.layout();
        self.store_mut().mark_clean();
        count
    }
}
