//! A small diagram editor used by the integration tests: shapes that may
//! contain other shapes, and wires between shapes.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use editpart_engine::command::{Command, CommandError, CommandResult, CompoundCommand, chain};
use editpart_engine::editpart::{EditPartBehavior, EditPartFactory, PartId, PartKind, RefreshContext};
use editpart_engine::model::{ChangeKind, ChangeLog, Model, ModelChange, ModelId};
use editpart_engine::policy::{
    BendpointCommands, BendpointEditPolicy, ComponentEditPolicy, ConnectionCommands, DirectEditPolicy, DragEditPolicy,
    GraphicalNodeEditPolicy, OrderedLayoutCommands, PolicyChain, PolicyContext, Role, SelectionFeedbackPolicy,
    XyLayoutCommands, XyLayoutEditPolicy,
};
use editpart_engine::request::{CreatedObject, Request};
use editpart_engine::visual::FigureCanvas;
use editpart_engine::{EditDomain, EditPartViewer, EditorConfig};
use egui::{Pos2, Rect, pos2, vec2};
use serde::{Deserialize, Serialize};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub name: String,
    /// Bounds relative to the parent shape
    pub bounds: [f32; 4],
    pub container: bool,
    pub children: Vec<ModelId>,
}

impl Shape {
    pub fn rect(&self) -> Rect {
        let [x, y, w, h] = self.bounds;
        Rect::from_min_size(pos2(x, y), vec2(w, h))
    }
}

fn to_bounds(rect: Rect) -> [f32; 4] {
    [rect.min.x, rect.min.y, rect.width(), rect.height()]
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wire {
    pub id: ModelId,
    pub source: ModelId,
    pub target: ModelId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagram {
    pub root: ModelId,
    pub shapes: BTreeMap<ModelId, Shape>,
    pub wires: Vec<Wire>,
    /// Bendpoints of each wire, in absolute coordinates
    #[serde(default)]
    pub bendpoints: BTreeMap<ModelId, Vec<[f32; 2]>>,
    #[serde(skip)]
    changes: ChangeLog,
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagram {
    pub fn new() -> Self {
        let root = ModelId::new();
        let mut shapes = BTreeMap::new();
        shapes.insert(
            root,
            Shape {
                name: "diagram".to_owned(),
                bounds: [0.0, 0.0, 0.0, 0.0],
                container: true,
                children: Vec::new(),
            },
        );
        Self {
            root,
            shapes,
            wires: Vec::new(),
            bendpoints: BTreeMap::new(),
            changes: ChangeLog::new(),
        }
    }

    pub fn shape(&self, id: ModelId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    pub fn children(&self, id: ModelId) -> &[ModelId] {
        self.shapes.get(&id).map_or(&[], |shape| shape.children.as_slice())
    }

    pub fn parent_of(&self, id: ModelId) -> Option<ModelId> {
        self.shapes
            .iter()
            .find(|(_, shape)| shape.children.contains(&id))
            .map(|(&parent, _)| parent)
    }

    pub fn wire(&self, id: ModelId) -> Option<&Wire> {
        self.wires.iter().find(|wire| wire.id == id)
    }

    /// Adds a shape directly, outside the command stack.
    pub fn add_shape(&mut self, parent: ModelId, name: &str, rect: Rect) -> ModelId {
        self.insert_shape(parent, name, rect, false)
    }

    pub fn add_container(&mut self, parent: ModelId, name: &str, rect: Rect) -> ModelId {
        self.insert_shape(parent, name, rect, true)
    }

    fn insert_shape(&mut self, parent: ModelId, name: &str, rect: Rect, container: bool) -> ModelId {
        let id = ModelId::new();
        self.shapes.insert(
            id,
            Shape {
                name: name.to_owned(),
                bounds: to_bounds(rect),
                container,
                children: Vec::new(),
            },
        );
        if let Some(parent_shape) = self.shapes.get_mut(&parent) {
            parent_shape.children.push(id);
        }
        self.changes.record(parent, ChangeKind::Children);
        id
    }

    pub fn connect(&mut self, source: ModelId, target: ModelId) -> ModelId {
        let id = ModelId::new();
        self.wires.push(Wire { id, source, target });
        self.changes.record(source, ChangeKind::SourceConnections);
        self.changes.record(target, ChangeKind::TargetConnections);
        id
    }

    pub fn disconnect(&mut self, id: ModelId) -> Option<Wire> {
        let index = self.wires.iter().position(|wire| wire.id == id)?;
        let wire = self.wires.remove(index);
        self.changes.record(wire.source, ChangeKind::SourceConnections);
        self.changes.record(wire.target, ChangeKind::TargetConnections);
        Some(wire)
    }

    /// Replaces the children of `parent`, as an external edit would.
    pub fn set_children(&mut self, parent: ModelId, children: Vec<ModelId>) {
        if let Some(shape) = self.shapes.get_mut(&parent) {
            shape.children = children;
        }
        self.changes.record(parent, ChangeKind::Children);
    }

    /// Creates a detached shape that `set_children` can put somewhere.
    pub fn detached_shape(&mut self, name: &str) -> ModelId {
        let id = ModelId::new();
        self.shapes.insert(
            id,
            Shape {
                name: name.to_owned(),
                bounds: [0.0, 0.0, 20.0, 20.0],
                container: false,
                children: Vec::new(),
            },
        );
        id
    }

    pub fn bendpoints(&self, wire: ModelId) -> &[[f32; 2]] {
        self.bendpoints.get(&wire).map_or(&[], Vec::as_slice)
    }

    pub fn snapshot(&self) -> String {
        serde_json::to_string(self).unwrap()
    }
}

impl Model for Diagram {
    fn take_changes(&mut self) -> Vec<ModelChange> {
        self.changes.drain()
    }
}

fn shape_mut(diagram: &mut Diagram, id: ModelId) -> CommandResult<&mut Shape> {
    diagram.shapes.get_mut(&id).ok_or(CommandError::MissingModel(id))
}

#[derive(Debug)]
pub struct CreateShape {
    pub parent: ModelId,
    pub id: ModelId,
    pub shape: Shape,
}

impl Command<Diagram> for CreateShape {
    fn label(&self) -> &str {
        "Create shape"
    }

    fn execute(&mut self, diagram: &mut Diagram) -> CommandResult {
        shape_mut(diagram, self.parent)?.children.push(self.id);
        diagram.shapes.insert(self.id, self.shape.clone());
        diagram.changes.record(self.parent, ChangeKind::Children);
        Ok(())
    }

    fn undo(&mut self, diagram: &mut Diagram) -> CommandResult {
        shape_mut(diagram, self.parent)?.children.retain(|&c| c != self.id);
        diagram.shapes.remove(&self.id);
        diagram.changes.record(self.parent, ChangeKind::Children);
        Ok(())
    }
}

#[derive(Debug)]
pub struct SetBounds {
    pub id: ModelId,
    pub bounds: Rect,
    pub old: Option<[f32; 4]>,
}

impl Command<Diagram> for SetBounds {
    fn label(&self) -> &str {
        "Set bounds"
    }

    fn execute(&mut self, diagram: &mut Diagram) -> CommandResult {
        let shape = shape_mut(diagram, self.id)?;
        self.old = Some(shape.bounds);
        shape.bounds = to_bounds(self.bounds);
        diagram.changes.record(self.id, ChangeKind::Visuals);
        Ok(())
    }

    fn undo(&mut self, diagram: &mut Diagram) -> CommandResult {
        let old = self.old.ok_or_else(|| CommandError::ExecutionFailed("not executed".to_owned()))?;
        shape_mut(diagram, self.id)?.bounds = old;
        diagram.changes.record(self.id, ChangeKind::Visuals);
        Ok(())
    }
}

#[derive(Debug)]
pub struct Reparent {
    pub id: ModelId,
    pub new_parent: ModelId,
    pub bounds: Rect,
    pub undo_state: Option<(ModelId, usize, [f32; 4])>,
}

impl Command<Diagram> for Reparent {
    fn label(&self) -> &str {
        "Reparent"
    }

    fn execute(&mut self, diagram: &mut Diagram) -> CommandResult {
        let old_parent = diagram.parent_of(self.id).ok_or(CommandError::MissingModel(self.id))?;
        let old_index = diagram.children(old_parent).iter().position(|&c| c == self.id).unwrap_or(0);
        let old_bounds = shape_mut(diagram, self.id)?.bounds;
        shape_mut(diagram, old_parent)?.children.retain(|&c| c != self.id);
        shape_mut(diagram, self.new_parent)?.children.push(self.id);
        shape_mut(diagram, self.id)?.bounds = to_bounds(self.bounds);
        self.undo_state = Some((old_parent, old_index, old_bounds));
        diagram.changes.record(old_parent, ChangeKind::Children);
        diagram.changes.record(self.new_parent, ChangeKind::Children);
        Ok(())
    }

    fn undo(&mut self, diagram: &mut Diagram) -> CommandResult {
        let (old_parent, old_index, old_bounds) = self
            .undo_state
            .take()
            .ok_or_else(|| CommandError::ExecutionFailed("not executed".to_owned()))?;
        shape_mut(diagram, self.new_parent)?.children.retain(|&c| c != self.id);
        let children = &mut shape_mut(diagram, old_parent)?.children;
        let index = old_index.min(children.len());
        children.insert(index, self.id);
        shape_mut(diagram, self.id)?.bounds = old_bounds;
        diagram.changes.record(self.new_parent, ChangeKind::Children);
        diagram.changes.record(old_parent, ChangeKind::Children);
        Ok(())
    }
}

#[derive(Debug)]
pub struct DeleteShape {
    pub id: ModelId,
    pub undo_state: Option<(ModelId, usize, Shape, Vec<Wire>)>,
}

impl Command<Diagram> for DeleteShape {
    fn label(&self) -> &str {
        "Delete shape"
    }

    fn can_execute(&self, diagram: &Diagram) -> bool {
        diagram.parent_of(self.id).is_some()
    }

    fn execute(&mut self, diagram: &mut Diagram) -> CommandResult {
        let parent = diagram.parent_of(self.id).ok_or(CommandError::MissingModel(self.id))?;
        let index = diagram.children(parent).iter().position(|&c| c == self.id).unwrap_or(0);
        shape_mut(diagram, parent)?.children.retain(|&c| c != self.id);
        let shape = diagram.shapes.remove(&self.id).ok_or(CommandError::MissingModel(self.id))?;
        let attached: Vec<ModelId> = diagram
            .wires
            .iter()
            .filter(|wire| wire.source == self.id || wire.target == self.id)
            .map(|wire| wire.id)
            .collect();
        let wires: Vec<Wire> = attached.into_iter().filter_map(|wire| diagram.disconnect(wire)).collect();
        diagram.changes.record(parent, ChangeKind::Children);
        self.undo_state = Some((parent, index, shape, wires));
        Ok(())
    }

    fn undo(&mut self, diagram: &mut Diagram) -> CommandResult {
        let (parent, index, shape, wires) = self
            .undo_state
            .take()
            .ok_or_else(|| CommandError::ExecutionFailed("not executed".to_owned()))?;
        diagram.shapes.insert(self.id, shape);
        let children = &mut shape_mut(diagram, parent)?.children;
        let index = index.min(children.len());
        children.insert(index, self.id);
        diagram.changes.record(parent, ChangeKind::Children);
        for wire in wires {
            diagram.wires.push(wire);
            diagram.changes.record(wire.source, ChangeKind::SourceConnections);
            diagram.changes.record(wire.target, ChangeKind::TargetConnections);
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct Connect {
    pub wire: Wire,
}

impl Command<Diagram> for Connect {
    fn label(&self) -> &str {
        "Connect"
    }

    fn can_execute(&self, diagram: &Diagram) -> bool {
        self.wire.source != self.wire.target
            && diagram.shapes.contains_key(&self.wire.source)
            && diagram.shapes.contains_key(&self.wire.target)
    }

    fn execute(&mut self, diagram: &mut Diagram) -> CommandResult {
        diagram.wires.push(self.wire);
        diagram.changes.record(self.wire.source, ChangeKind::SourceConnections);
        diagram.changes.record(self.wire.target, ChangeKind::TargetConnections);
        Ok(())
    }

    fn undo(&mut self, diagram: &mut Diagram) -> CommandResult {
        diagram
            .disconnect(self.wire.id)
            .map(|_| ())
            .ok_or(CommandError::MissingModel(self.wire.id))
    }
}

#[derive(Debug)]
pub struct Disconnect {
    pub id: ModelId,
    pub removed: Option<Wire>,
}

impl Command<Diagram> for Disconnect {
    fn label(&self) -> &str {
        "Disconnect"
    }

    fn execute(&mut self, diagram: &mut Diagram) -> CommandResult {
        self.removed = Some(diagram.disconnect(self.id).ok_or(CommandError::MissingModel(self.id))?);
        Ok(())
    }

    fn undo(&mut self, diagram: &mut Diagram) -> CommandResult {
        let wire = self.removed.take().ok_or(CommandError::MissingModel(self.id))?;
        diagram.wires.push(wire);
        diagram.changes.record(wire.source, ChangeKind::SourceConnections);
        diagram.changes.record(wire.target, ChangeKind::TargetConnections);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireEnd {
    Source,
    Target,
}

/// Moves one end of a wire to another shape.
#[derive(Debug)]
pub struct Reconnect {
    pub wire: ModelId,
    pub end: WireEnd,
    pub to: ModelId,
    pub from: Option<ModelId>,
}

impl Reconnect {
    fn attach(&self, diagram: &mut Diagram, node: ModelId) -> CommandResult<ModelId> {
        let end = self.end;
        let wire = diagram
            .wires
            .iter_mut()
            .find(|wire| wire.id == self.wire)
            .ok_or(CommandError::MissingModel(self.wire))?;
        let (slot, kind) = match end {
            WireEnd::Source => (&mut wire.source, ChangeKind::SourceConnections),
            WireEnd::Target => (&mut wire.target, ChangeKind::TargetConnections),
        };
        let old = std::mem::replace(slot, node);
        diagram.changes.record(old, kind);
        diagram.changes.record(node, kind);
        Ok(old)
    }
}

impl Command<Diagram> for Reconnect {
    fn label(&self) -> &str {
        "Reconnect"
    }

    fn can_execute(&self, diagram: &Diagram) -> bool {
        // No self loops
        diagram.wires.iter().find(|wire| wire.id == self.wire).is_some_and(|wire| match self.end {
            WireEnd::Source => wire.target != self.to,
            WireEnd::Target => wire.source != self.to,
        })
    }

    fn execute(&mut self, diagram: &mut Diagram) -> CommandResult {
        self.from = Some(self.attach(diagram, self.to)?);
        Ok(())
    }

    fn undo(&mut self, diagram: &mut Diagram) -> CommandResult {
        let from = self.from.take().ok_or(CommandError::MissingModel(self.wire))?;
        self.attach(diagram, from)?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct Rename {
    pub id: ModelId,
    pub name: String,
}

impl Command<Diagram> for Rename {
    fn label(&self) -> &str {
        "Rename"
    }

    fn execute(&mut self, diagram: &mut Diagram) -> CommandResult {
        let shape = shape_mut(diagram, self.id)?;
        std::mem::swap(&mut shape.name, &mut self.name);
        diagram.changes.record(self.id, ChangeKind::Visuals);
        Ok(())
    }

    fn undo(&mut self, diagram: &mut Diagram) -> CommandResult {
        self.execute(diagram)
    }
}

/// Moves a shape to `index` among its siblings.
#[derive(Debug)]
pub struct MoveChild {
    pub parent: ModelId,
    pub id: ModelId,
    pub index: usize,
    pub old_index: Option<usize>,
}

impl Command<Diagram> for MoveChild {
    fn label(&self) -> &str {
        "Move child"
    }

    fn execute(&mut self, diagram: &mut Diagram) -> CommandResult {
        let children = &mut shape_mut(diagram, self.parent)?.children;
        let old_index = children
            .iter()
            .position(|&c| c == self.id)
            .ok_or(CommandError::MissingModel(self.id))?;
        children.remove(old_index);
        children.insert(self.index.min(children.len()), self.id);
        self.old_index = Some(old_index);
        diagram.changes.record(self.parent, ChangeKind::Children);
        Ok(())
    }

    fn undo(&mut self, diagram: &mut Diagram) -> CommandResult {
        let old_index = self
            .old_index
            .take()
            .ok_or_else(|| CommandError::ExecutionFailed("not executed".to_owned()))?;
        let children = &mut shape_mut(diagram, self.parent)?.children;
        children.retain(|&c| c != self.id);
        children.insert(old_index.min(children.len()), self.id);
        diagram.changes.record(self.parent, ChangeKind::Children);
        Ok(())
    }
}

/// Inserts, moves or removes one bendpoint of a wire.
#[derive(Debug)]
pub struct EditBendpoint {
    pub wire: ModelId,
    pub index: usize,
    pub edit: BendpointEdit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BendpointEdit {
    Insert([f32; 2]),
    Move { to: [f32; 2], from: Option<[f32; 2]> },
    Remove(Option<[f32; 2]>),
}

impl EditBendpoint {
    fn points(diagram: &mut Diagram, wire: ModelId) -> CommandResult<&mut Vec<[f32; 2]>> {
        if diagram.wire(wire).is_none() {
            return Err(CommandError::MissingModel(wire));
        }
        Ok(diagram.bendpoints.entry(wire).or_default())
    }

    fn out_of_range(&self) -> CommandError {
        CommandError::ExecutionFailed(format!("no bendpoint {}", self.index))
    }
}

impl Command<Diagram> for EditBendpoint {
    fn label(&self) -> &str {
        match self.edit {
            BendpointEdit::Insert(_) => "Create bendpoint",
            BendpointEdit::Move { .. } => "Move bendpoint",
            BendpointEdit::Remove(_) => "Delete bendpoint",
        }
    }

    fn can_execute(&self, diagram: &Diagram) -> bool {
        let count = diagram.bendpoints(self.wire).len();
        match self.edit {
            BendpointEdit::Insert(_) => self.index <= count,
            _ => self.index < count,
        }
    }

    fn execute(&mut self, diagram: &mut Diagram) -> CommandResult {
        let error = self.out_of_range();
        let index = self.index;
        let points = Self::points(diagram, self.wire)?;
        match &mut self.edit {
            BendpointEdit::Insert(point) => {
                if index > points.len() {
                    return Err(error);
                }
                points.insert(index, *point);
            }
            BendpointEdit::Move { to, from } => {
                let slot = points.get_mut(index).ok_or(error)?;
                *from = Some(*slot);
                *slot = *to;
            }
            BendpointEdit::Remove(removed) => {
                if index >= points.len() {
                    return Err(error);
                }
                *removed = Some(points.remove(index));
            }
        }
        diagram.changes.record(self.wire, ChangeKind::Visuals);
        Ok(())
    }

    fn undo(&mut self, diagram: &mut Diagram) -> CommandResult {
        let error = self.out_of_range();
        let index = self.index;
        let points = Self::points(diagram, self.wire)?;
        match self.edit {
            BendpointEdit::Insert(_) => {
                if index >= points.len() {
                    return Err(error);
                }
                points.remove(index);
            }
            BendpointEdit::Move { from, .. } => {
                let from = from.ok_or_else(|| CommandError::ExecutionFailed("not executed".to_owned()))?;
                *points.get_mut(index).ok_or(error)? = from;
            }
            BendpointEdit::Remove(removed) => {
                let removed = removed.ok_or_else(|| CommandError::ExecutionFailed("not executed".to_owned()))?;
                points.insert(index.min(points.len()), removed);
            }
        }
        diagram.changes.record(self.wire, ChangeKind::Visuals);
        Ok(())
    }
}

/// Layout hooks shared by the diagram and container shapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeLayout;

impl XyLayoutCommands<Diagram> for ShapeLayout {
    fn change_constraint(
        &self,
        child: PartId,
        constraint: Rect,
        _request: &Request,
        ctx: &PolicyContext<'_, Diagram>,
    ) -> Option<Box<dyn Command<Diagram>>> {
        Some(Box::new(SetBounds {
            id: ctx.model_of(child)?,
            bounds: constraint,
            old: None,
        }))
    }

    fn add(&self, child: PartId, constraint: Rect, ctx: &PolicyContext<'_, Diagram>) -> Option<Box<dyn Command<Diagram>>> {
        Some(Box::new(Reparent {
            id: ctx.model_of(child)?,
            new_parent: ctx.host_model()?,
            bounds: constraint,
            undo_state: None,
        }))
    }

    fn create(
        &self,
        object: &CreatedObject,
        constraint: Rect,
        ctx: &PolicyContext<'_, Diagram>,
    ) -> Option<Box<dyn Command<Diagram>>> {
        Some(Box::new(CreateShape {
            parent: ctx.host_model()?,
            id: object.id,
            shape: Shape {
                name: object.object_type.clone(),
                bounds: to_bounds(constraint),
                container: object.object_type == "container",
                children: Vec::new(),
            },
        }))
    }

    /// Shallow copies: name and kind carry over, children do not.
    fn clone_children(
        &self,
        children: &[(PartId, Rect)],
        ctx: &PolicyContext<'_, Diagram>,
    ) -> Option<Box<dyn Command<Diagram>>> {
        let parent = ctx.host_model()?;
        let mut copies = CompoundCommand::new("Clone");
        for &(child, constraint) in children {
            let original = ctx.model.shape(ctx.model_of(child)?)?;
            copies.add(Box::new(CreateShape {
                parent,
                id: ModelId::new(),
                shape: Shape {
                    name: original.name.clone(),
                    bounds: to_bounds(constraint),
                    container: original.container,
                    children: Vec::new(),
                },
            }));
        }
        Some(Box::new(copies))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WireCommands;

impl ConnectionCommands<Diagram> for WireCommands {
    fn create_connection(
        &self,
        source: PartId,
        target: PartId,
        object: &CreatedObject,
        ctx: &PolicyContext<'_, Diagram>,
    ) -> Option<Box<dyn Command<Diagram>>> {
        Some(Box::new(Connect {
            wire: Wire {
                id: object.id,
                source: ctx.model_of(source)?,
                target: ctx.model_of(target)?,
            },
        }))
    }

    fn reconnect_source(
        &self,
        connection: PartId,
        new_source: PartId,
        ctx: &PolicyContext<'_, Diagram>,
    ) -> Option<Box<dyn Command<Diagram>>> {
        Some(Box::new(Reconnect {
            wire: ctx.model_of(connection)?,
            end: WireEnd::Source,
            to: ctx.model_of(new_source)?,
            from: None,
        }))
    }

    fn reconnect_target(
        &self,
        connection: PartId,
        new_target: PartId,
        ctx: &PolicyContext<'_, Diagram>,
    ) -> Option<Box<dyn Command<Diagram>>> {
        Some(Box::new(Reconnect {
            wire: ctx.model_of(connection)?,
            end: WireEnd::Target,
            to: ctx.model_of(new_target)?,
            from: None,
        }))
    }
}

/// List layout for outlines: children keep their bounds, only their order changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineOrder;

impl OrderedLayoutCommands<Diagram> for OutlineOrder {
    fn create(
        &self,
        object: &CreatedObject,
        index: Option<usize>,
        ctx: &PolicyContext<'_, Diagram>,
    ) -> Option<Box<dyn Command<Diagram>>> {
        let parent = ctx.host_model()?;
        let create: Box<dyn Command<Diagram>> = Box::new(CreateShape {
            parent,
            id: object.id,
            shape: Shape {
                name: object.object_type.clone(),
                bounds: [0.0, 0.0, 64.0, 36.0],
                container: false,
                children: Vec::new(),
            },
        });
        let position = index.map(|index| {
            Box::new(MoveChild {
                parent,
                id: object.id,
                index,
                old_index: None,
            }) as Box<dyn Command<Diagram>>
        });
        Some(chain(create, position))
    }

    fn add(&self, child: PartId, _index: Option<usize>, ctx: &PolicyContext<'_, Diagram>) -> Option<Box<dyn Command<Diagram>>> {
        let id = ctx.model_of(child)?;
        Some(Box::new(Reparent {
            id,
            new_parent: ctx.host_model()?,
            bounds: ctx.model.shape(id)?.rect(),
            undo_state: None,
        }))
    }

    fn reorder(
        &self,
        child: PartId,
        _old_index: usize,
        new_index: usize,
        ctx: &PolicyContext<'_, Diagram>,
    ) -> Option<Box<dyn Command<Diagram>>> {
        Some(Box::new(MoveChild {
            parent: ctx.host_model()?,
            id: ctx.model_of(child)?,
            index: new_index,
            old_index: None,
        }))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WireBends;

impl WireBends {
    fn edit(
        connection: PartId,
        index: usize,
        edit: BendpointEdit,
        ctx: &PolicyContext<'_, Diagram>,
    ) -> Option<Box<dyn Command<Diagram>>> {
        Some(Box::new(EditBendpoint {
            wire: ctx.model_of(connection)?,
            index,
            edit,
        }))
    }
}

impl BendpointCommands<Diagram> for WireBends {
    fn create_bendpoint(
        &self,
        connection: PartId,
        index: usize,
        location: Pos2,
        ctx: &PolicyContext<'_, Diagram>,
    ) -> Option<Box<dyn Command<Diagram>>> {
        Self::edit(connection, index, BendpointEdit::Insert([location.x, location.y]), ctx)
    }

    fn move_bendpoint(
        &self,
        connection: PartId,
        index: usize,
        location: Pos2,
        ctx: &PolicyContext<'_, Diagram>,
    ) -> Option<Box<dyn Command<Diagram>>> {
        let to = [location.x, location.y];
        Self::edit(connection, index, BendpointEdit::Move { to, from: None }, ctx)
    }

    fn delete_bendpoint(
        &self,
        connection: PartId,
        index: usize,
        ctx: &PolicyContext<'_, Diagram>,
    ) -> Option<Box<dyn Command<Diagram>>> {
        Self::edit(connection, index, BendpointEdit::Remove(None), ctx)
    }
}

/// The contents part: the diagram itself.
#[derive(Debug, Default)]
pub struct DiagramBehavior;

impl EditPartBehavior<Diagram> for DiagramBehavior {
    fn create_edit_policies(&self, policies: &mut PolicyChain<Diagram>) {
        policies.install(Role::LAYOUT, Some(Box::new(XyLayoutEditPolicy::new(ShapeLayout))));
    }

    fn model_children(&self, model: ModelId, doc: &Diagram) -> Vec<ModelId> {
        doc.children(model).to_vec()
    }

    fn is_selectable(&self) -> bool {
        false
    }
}

/// Log of the OPEN requests a shape performed.
pub type OpenLog = Rc<RefCell<Vec<ModelId>>>;

#[derive(Debug)]
pub struct ShapeBehavior {
    pub container: bool,
    pub opened: OpenLog,
}

impl EditPartBehavior<Diagram> for ShapeBehavior {
    fn create_edit_policies(&self, policies: &mut PolicyChain<Diagram>) {
        policies.install(
            Role::COMPONENT,
            Some(Box::new(ComponentEditPolicy::new(|_request: &Request, ctx: &PolicyContext<'_, Diagram>| {
                let id = ctx.host_model()?;
                Some(Box::new(DeleteShape { id, undo_state: None }) as Box<dyn Command<Diagram>>)
            }))),
        );
        policies.install(Role::PRIMARY_DRAG, Some(Box::new(DragEditPolicy::resizable())));
        policies.install(Role::SELECTION_FEEDBACK, Some(Box::new(SelectionFeedbackPolicy)));
        policies.install(
            Role::GRAPHICAL_NODE,
            Some(Box::new(GraphicalNodeEditPolicy::new(WireCommands))),
        );
        policies.install(
            Role::DIRECT_EDIT,
            Some(Box::new(DirectEditPolicy::new(|value: &str, ctx: &PolicyContext<'_, Diagram>| {
                let id = ctx.host_model()?;
                Some(Box::new(Rename {
                    id,
                    name: value.to_owned(),
                }) as Box<dyn Command<Diagram>>)
            }))),
        );
        if self.container {
            policies.install(Role::LAYOUT, Some(Box::new(XyLayoutEditPolicy::new(ShapeLayout))));
        }
    }

    fn model_children(&self, model: ModelId, doc: &Diagram) -> Vec<ModelId> {
        doc.children(model).to_vec()
    }

    fn model_source_connections(&self, model: ModelId, doc: &Diagram) -> Vec<ModelId> {
        doc.wires.iter().filter(|w| w.source == model).map(|w| w.id).collect()
    }

    fn model_target_connections(&self, model: ModelId, doc: &Diagram) -> Vec<ModelId> {
        doc.wires.iter().filter(|w| w.target == model).map(|w| w.id).collect()
    }

    fn refresh_visuals(&self, ctx: RefreshContext<'_, Diagram>) {
        let Some(shape) = ctx.doc.shape(ctx.model) else {
            return;
        };
        ctx.visuals.set_constraint(ctx.visual, Some(shape.rect()));
        ctx.visuals.set_label(ctx.visual, &shape.name);
    }

    fn perform_request(&mut self, request: &Request, model: ModelId, doc: &Diagram) -> Option<Request> {
        self.opened.borrow_mut().push(model);
        let name = doc.shape(model)?.name.clone();
        request
            .is(&editpart_engine::RequestType::OPEN)
            .then(|| Request::direct_edit(format!("{name} (opened)")))
    }
}

#[derive(Debug, Default)]
pub struct WireBehavior;

impl EditPartBehavior<Diagram> for WireBehavior {
    fn kind(&self) -> PartKind {
        PartKind::Connection
    }

    fn create_edit_policies(&self, policies: &mut PolicyChain<Diagram>) {
        policies.install(
            Role::COMPONENT,
            Some(Box::new(ComponentEditPolicy::new(|_request: &Request, ctx: &PolicyContext<'_, Diagram>| {
                let id = ctx.host_model()?;
                Some(Box::new(Disconnect { id, removed: None }) as Box<dyn Command<Diagram>>)
            }))),
        );
        policies.install(
            Role::CONNECTION_BENDPOINTS,
            Some(Box::new(BendpointEditPolicy::new(WireBends))),
        );
        policies.install(Role::SELECTION_FEEDBACK, Some(Box::new(SelectionFeedbackPolicy)));
    }

    fn refresh_visuals(&self, ctx: RefreshContext<'_, Diagram>) {
        let (Some(source), Some(target)) = (ctx.source_visual, ctx.target_visual) else {
            return;
        };
        let span = ctx.visuals.bounds(source).union(ctx.visuals.bounds(target));
        if span.is_finite() {
            ctx.visuals.set_constraint(ctx.visual, Some(span));
        }
    }
}

/// Builds the behaviour of every part from what the model id names.
#[derive(Debug, Default, Clone)]
pub struct DiagramFactory {
    pub opened: OpenLog,
}

impl EditPartFactory<Diagram> for DiagramFactory {
    fn create_behavior(&self, _context: PartId, model: ModelId, doc: &Diagram) -> Box<dyn EditPartBehavior<Diagram>> {
        if model == doc.root {
            return Box::new(DiagramBehavior);
        }
        if doc.wire(model).is_some() {
            return Box::new(WireBehavior);
        }
        Box::new(ShapeBehavior {
            container: doc.shape(model).is_some_and(|shape| shape.container),
            opened: self.opened.clone(),
        })
    }
}

pub fn viewer_for(diagram: &Diagram) -> EditPartViewer<Diagram> {
    let mut viewer = EditPartViewer::new(
        DiagramFactory::default(),
        FigureCanvas::from_config(&EditorConfig::default()),
    );
    viewer.activate();
    viewer.set_contents(Some(diagram.root), diagram);
    viewer.flush();
    viewer
}

pub fn domain_for(mut diagram: Diagram) -> EditDomain<Diagram> {
    diagram.take_changes();
    let root = diagram.root;
    let config = EditorConfig::default();
    let canvas = FigureCanvas::from_config(&config);
    let mut domain = EditDomain::new(diagram, DiagramFactory::default(), canvas, config);
    domain.set_contents(root);
    domain.viewer_mut().flush();
    domain
}

/// The part showing `model`, panicking when there is none.
pub fn part_of(viewer: &EditPartViewer<Diagram>, model: ModelId) -> PartId {
    viewer
        .edit_part_for_model(model)
        .unwrap_or_else(|| panic!("no edit part for {model:?}"))
}

/// Model ids of the children of `part`, in order.
pub fn child_models(viewer: &EditPartViewer<Diagram>, part: PartId) -> Vec<ModelId> {
    viewer
        .children(part)
        .iter()
        .filter_map(|&child| viewer.part(child).map(|p| p.model()))
        .collect()
}
