use egui::{Pos2, Rect, pos2, vec2};

use super::{VisualAdapter, VisualId, VisualStore};
use crate::config::EditorConfig;

/// An outline of rows, one per non-layer visual, in pre-order.
///
/// Constraints are stored but play no part in layout. Layers take no row and
/// add no indentation.
#[derive(Debug)]
pub struct TreeItems {
    store: VisualStore,
    width: f32,
    row_height: f32,
    indent: f32,
}

impl TreeItems {
    pub fn new(width: f32, row_height: f32, indent: f32) -> Self {
        Self {
            store: VisualStore::new(),
            width,
            row_height,
            indent,
        }
    }

    /// Rows as wide as the configured canvas, with the configured height and indent.
    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.canvas_size[0], config.tree_row_height, config.tree_indent)
    }

    /// Row labels in display order with their depth; handy for assertions.
    pub fn rows(&self) -> Vec<(usize, String)> {
        let mut rows: Vec<(f32, usize, String)> = self
            .store
            .iter()
            .filter(|(_, node)| !node.transparent && node.bounds.is_positive())
            .map(|(_, node)| {
                let depth = if self.indent > 0.0 {
                    (node.bounds.min.x / self.indent).round() as usize
                } else {
                    0
                };
                (node.bounds.min.y, depth, node.label.clone())
            })
            .collect();
        rows.sort_by(|a, b| a.0.total_cmp(&b.0));
        rows.into_iter().map(|(_, depth, label)| (depth, label)).collect()
    }
}

impl Default for TreeItems {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl VisualAdapter for TreeItems {
    fn store(&self) -> &VisualStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut VisualStore {
        &mut self.store
    }

    fn layout(&mut self) -> usize {
        let mut pending: Vec<(VisualId, usize)> =
            self.store.roots().into_iter().rev().map(|id| (id, 0)).collect();
        let mut row = 0usize;
        let mut count = 0;
        while let Some((id, depth)) = pending.pop() {
            let Some(node) = self.store.get_mut(id) else {
                continue;
            };
            let child_depth = if node.transparent {
                node.bounds = Rect::NOTHING;
                depth
            } else {
                let x = depth as f32 * self.indent;
                node.bounds = Rect::from_min_size(
                    pos2(x, row as f32 * self.row_height),
                    vec2((self.width - x).max(0.0), self.row_height),
                );
                row += 1;
                depth + 1
            };
            count += 1;
            // Reverse so the first child is popped first.
            pending.extend(node.children.iter().rev().map(|&child| (child, child_depth)));
        }
        count
    }

    fn visual_at(&self, pos: Pos2, exclude: &[VisualId]) -> Option<VisualId> {
        self.store
            .iter()
            .filter(|(_, node)| !node.transparent && node.bounds.contains(pos))
            .map(|(id, _)| id)
            .find(|&id| !exclude.iter().any(|&excluded| self.store.is_within(id, excluded)))
    }
}
