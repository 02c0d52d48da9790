use egui::Rect;
use slotmap::SlotMap;

use super::VisualId;

/// One visual: containment, constraint relative to the parent, last computed
/// absolute bounds, and the little bit of state feedback needs.
#[derive(Debug, Clone)]
pub struct VisualNode {
    pub parent: Option<VisualId>,
    pub children: Vec<VisualId>,
    pub constraint: Option<Rect>,
    pub bounds: Rect,
    pub label: String,
    pub highlighted: bool,
    /// Transparent visuals (layers) are only hit through their children
    pub transparent: bool,
}

impl VisualNode {
    fn new(transparent: bool) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            constraint: None,
            bounds: Rect::NOTHING,
            label: String::new(),
            highlighted: false,
            transparent,
        }
    }
}

/// Arena of visuals shared by the stock adapters.
#[derive(Debug, Default)]
pub struct VisualStore {
    nodes: SlotMap<VisualId, VisualNode>,
    dirty: bool,
}

impl VisualStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, transparent: bool) -> VisualId {
        self.dirty = true;
        self.nodes.insert(VisualNode::new(transparent))
    }

    pub fn get(&self, id: VisualId) -> Option<&VisualNode> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: VisualId) -> Option<&mut VisualNode> {
        self.nodes.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: VisualId) -> &[VisualId] {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Visuals without a parent, in arena order.
    pub fn roots(&self) -> Vec<VisualId> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    /// True if `id` is `ancestor` or lies below it.
    pub fn is_within(&self, mut id: VisualId, ancestor: VisualId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.nodes.get(id).and_then(|node| node.parent) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    /// Insert `child` under `parent` at `index` (clamped to the child count).
    pub fn add_child(&mut self, parent: VisualId, child: VisualId, index: usize) {
        if !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            return;
        }
        if let Some(old_parent) = self.nodes[child].parent {
            self.remove_child(old_parent, child);
        }
        let children = &mut self.nodes[parent].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child].parent = Some(parent);
        self.dirty = true;
    }

    /// Detach `child` from `parent`. The child's constraint goes with its old slot.
    pub fn remove_child(&mut self, parent: VisualId, child: VisualId) {
        let Some(parent_node) = self.nodes.get_mut(parent) else {
            return;
        };
        let Some(index) = parent_node.children.iter().position(|&c| c == child) else {
            return;
        };
        parent_node.children.remove(index);
        if let Some(child_node) = self.nodes.get_mut(child) {
            child_node.parent = None;
            child_node.constraint = None;
        }
        self.dirty = true;
    }

    /// Remove a visual and everything below it.
    pub fn dispose(&mut self, id: VisualId) {
        if let Some(parent) = self.nodes.get(id).and_then(|node| node.parent) {
            self.remove_child(parent, id);
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(next) {
                stack.extend(node.children);
            }
        }
        self.dirty = true;
    }

    pub fn iter(&self) -> impl Iterator<Item = (VisualId, &VisualNode)> {
        self.nodes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (VisualId, &mut VisualNode)> {
        self.nodes.iter_mut()
    }

    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}
