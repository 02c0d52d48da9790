use egui::{Pos2, Rect, Vec2};

use super::{VisualAdapter, VisualId, VisualStore};
use crate::config::EditorConfig;

/// A figure tree laid out with absolute XY constraints.
///
/// A figure's constraint is relative to its parent's top-left corner; a figure
/// without a constraint fills its parent. Top-level figures fill the canvas.
#[derive(Debug)]
pub struct FigureCanvas {
    store: VisualStore,
    size: Vec2,
}

impl FigureCanvas {
    pub fn new(size: Vec2) -> Self {
        Self {
            store: VisualStore::new(),
            size,
        }
    }

    /// A canvas of the configured size.
    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.canvas_size())
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
        self.store.invalidate();
    }

    fn hit(&self, id: VisualId, pos: Pos2, exclude: &[VisualId]) -> Option<VisualId> {
        if exclude.contains(&id) {
            return None;
        }
        let node = self.store.get(id)?;
        if !node.transparent && !node.bounds.contains(pos) {
            return None;
        }
        // Later children paint on top, so they are hit first.
        for &child in node.children.iter().rev() {
            if let Some(hit) = self.hit(child, pos, exclude) {
                return Some(hit);
            }
        }
        if node.transparent { None } else { Some(id) }
    }
}

impl Default for FigureCanvas {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl VisualAdapter for FigureCanvas {
    fn store(&self) -> &VisualStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut VisualStore {
        &mut self.store
    }

    fn layout(&mut self) -> usize {
        let canvas = Rect::from_min_size(Pos2::ZERO, self.size);
        let mut pending: Vec<(VisualId, Rect)> = self
            .store
            .roots()
            .into_iter()
            .map(|id| (id, canvas))
            .collect();
        let mut count = 0;
        while let Some((id, parent_bounds)) = pending.pop() {
            let Some(node) = self.store.get_mut(id) else {
                continue;
            };
            node.bounds = match node.constraint {
                Some(constraint) => constraint.translate(parent_bounds.min.to_vec2()),
                None => parent_bounds,
            };
            count += 1;
            let bounds = node.bounds;
            pending.extend(node.children.iter().map(|&child| (child, bounds)));
        }
        count
    }

    fn visual_at(&self, pos: Pos2, exclude: &[VisualId]) -> Option<VisualId> {
        self.store
            .roots()
            .into_iter()
            .rev()
            .find_map(|root| self.hit(root, pos, exclude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn test_bounds_follow_constraints_after_flush() {
        let mut canvas = FigureCanvas::new(Vec2::new(200.0, 200.0));
        let root = canvas.create_visual();
        let child = canvas.create_visual();
        canvas.add_child_visual(root, child, 0);
        canvas.set_constraint(child, Some(Rect::from_min_size(pos2(10.0, 20.0), Vec2::splat(30.0))));

        // Nothing is laid out until the deferred update runs
        assert_eq!(canvas.bounds(child), Rect::NOTHING);
        assert!(canvas.flush() > 0);
        assert_eq!(canvas.bounds(child).min, pos2(10.0, 20.0));
        assert_eq!(canvas.flush(), 0);
    }

    #[test]
    fn test_hit_prefers_topmost_and_skips_layers() {
        let mut canvas = FigureCanvas::new(Vec2::new(100.0, 100.0));
        let root = canvas.create_visual();
        let layer = canvas.create_layer();
        let a = canvas.create_visual();
        let b = canvas.create_visual();
        canvas.add_child_visual(root, layer, 0);
        canvas.add_child_visual(layer, a, 0);
        canvas.add_child_visual(layer, b, 1);
        let square = Rect::from_min_size(pos2(0.0, 0.0), Vec2::splat(50.0));
        canvas.set_constraint(a, Some(square));
        canvas.set_constraint(b, Some(square));
        canvas.flush();

        assert_eq!(canvas.visual_at(pos2(10.0, 10.0), &[]), Some(b));
        assert_eq!(canvas.visual_at(pos2(10.0, 10.0), &[b]), Some(a));
        // Outside every figure the layer is transparent, so the root is hit
        assert_eq!(canvas.visual_at(pos2(80.0, 80.0), &[]), Some(root));
    }

    #[test]
    fn test_top_level_figures_fill_the_configured_canvas() {
        let config = EditorConfig {
            canvas_size: [320.0, 240.0],
            ..EditorConfig::default()
        };
        let mut canvas = FigureCanvas::from_config(&config);
        let root = canvas.create_layer();
        canvas.flush();

        assert_eq!(canvas.size(), Vec2::new(320.0, 240.0));
        assert_eq!(canvas.bounds(root), Rect::from_min_size(Pos2::ZERO, Vec2::new(320.0, 240.0)));
    }

    #[test]
    fn test_remove_child_drops_constraint() {
        let mut canvas = FigureCanvas::default();
        let root = canvas.create_visual();
        let child = canvas.create_visual();
        canvas.add_child_visual(root, child, 0);
        canvas.set_constraint(child, Some(Rect::from_min_size(pos2(1.0, 1.0), Vec2::splat(5.0))));

        canvas.remove_child_visual(root, child);

        assert_eq!(canvas.constraint(child), None);
        assert_eq!(canvas.parent_visual(child), None);
    }
}
