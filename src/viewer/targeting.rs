use egui::Pos2;

use super::EditPartViewer;
use crate::editpart::PartId;
use crate::request::Request;
use crate::visual::VisualId;

impl<M: 'static> EditPartViewer<M> {
    /// The part whose visual is under `pos`, as of the last flush.
    pub fn find_object_at(&self, pos: Pos2) -> Option<PartId> {
        self.find_object_at_excluding(pos, &[], |_| true)
    }

    /// The part under `pos`, ignoring the subtrees of `exclude` and walking
    /// up from the hit visual until a part satisfies `condition`. Falls back to
    /// the contents part when nothing is hit.
    pub fn find_object_at_excluding(
        &self,
        pos: Pos2,
        exclude: &[PartId],
        condition: impl Fn(PartId) -> bool,
    ) -> Option<PartId> {
        let mut excluded: Vec<VisualId> = exclude
            .iter()
            .filter_map(|&part| self.parts.get(part).map(|part| part.visual))
            .collect();
        excluded.push(self.feedback_layer);

        let mut visual = self.visuals.visual_at(pos, &excluded);
        while let Some(current) = visual {
            if let Some(&part) = self.visual_registry.get(&current) {
                if condition(part) {
                    return Some(part);
                }
            }
            visual = self.visuals.parent_visual(current);
        }
        self.contents_part().filter(|&contents| condition(contents))
    }

    /// The part that would handle `request` at `pos`: the first part under the
    /// point, walking up, whose policies name a target.
    pub fn find_target_at(&self, pos: Pos2, exclude: &[PartId], request: &Request, doc: &M) -> Option<PartId> {
        let found = self.find_object_at_excluding(pos, exclude, |part| {
            self.target_edit_part(part, request, doc).is_some()
        })?;
        self.target_edit_part(found, request, doc)
    }
}
