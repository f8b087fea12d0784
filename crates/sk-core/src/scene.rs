//! Scene store: the single owner of shapes, texts, groups and selection.
//!
//! Every change goes through [`Scene::apply`] with a [`SceneMutation`], the
//! same mutation-enum pattern the editor uses to talk to the store. The store
//! enforces the geometric invariants (size floor, canvas containment) and the
//! z-order policy; callers never touch the collections directly.

use crate::id::{self, EntityId, GroupId, ShapeId, TextId};
use crate::model::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeSet;

// ─── Selection ───────────────────────────────────────────────────────────

/// Ephemeral selection state. Never written into any dialect.
///
/// `shapes`/`texts` always hold everything selected; `shape`/`text` name the
/// most recently picked entity, which drives handles and the style panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub shape: Option<ShapeId>,
    pub text: Option<TextId>,
    pub shapes: BTreeSet<ShapeId>,
    pub texts: BTreeSet<TextId>,
    pub group: Option<GroupId>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.texts.is_empty() && self.group.is_none()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        match id {
            EntityId::Shape(s) => self.shapes.contains(&s),
            EntityId::Text(t) => self.texts.contains(&t),
        }
    }

    /// All selected leaves, shapes first.
    pub fn entities(&self) -> Vec<EntityId> {
        self.shapes
            .iter()
            .map(|s| EntityId::Shape(*s))
            .chain(self.texts.iter().map(|t| EntityId::Text(*t)))
            .collect()
    }

    /// The selected entity when exactly one leaf (and no group) is selected.
    pub fn single(&self) -> Option<EntityId> {
        if self.group.is_some() || self.shapes.len() + self.texts.len() != 1 {
            return None;
        }
        self.entities().into_iter().next()
    }

    fn clear(&mut self) {
        *self = Selection::default();
    }

    fn set_primary(&mut self, id: Option<EntityId>) {
        self.shape = None;
        self.text = None;
        match id {
            Some(EntityId::Shape(s)) => self.shape = Some(s),
            Some(EntityId::Text(t)) => self.text = Some(t),
            None => {}
        }
    }

    fn select_only(&mut self, id: EntityId) {
        self.clear();
        self.insert(id);
        self.set_primary(Some(id));
    }

    fn insert(&mut self, id: EntityId) {
        match id {
            EntityId::Shape(s) => {
                self.shapes.insert(s);
            }
            EntityId::Text(t) => {
                self.texts.insert(t);
            }
        }
    }

    fn toggle(&mut self, id: EntityId) {
        self.group = None;
        if self.contains(id) {
            self.forget(id);
        } else {
            self.insert(id);
            self.set_primary(Some(id));
        }
    }

    fn forget(&mut self, id: EntityId) {
        match id {
            EntityId::Shape(s) => {
                self.shapes.remove(&s);
                if self.shape == Some(s) {
                    self.shape = None;
                }
            }
            EntityId::Text(t) => {
                self.texts.remove(&t);
                if self.text == Some(t) {
                    self.text = None;
                }
            }
        }
    }
}

// ─── Mutations ───────────────────────────────────────────────────────────

/// Stacking operations on the combined shape/text stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZOrder {
    BringForward,
    SendBackward,
    BringToFront,
    SendToBack,
}

/// Partial update of a shape's style. Outer `None` leaves a field untouched;
/// `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeStyleUpdate {
    pub color: Option<String>,
    pub border_radius: Option<Option<u32>>,
    pub opacity: Option<Option<f32>>,
    pub shadow: Option<Option<Shadow>>,
    pub glow: Option<Option<Glow>>,
    pub stroke: Option<Option<Stroke>>,
    pub image_data: Option<Option<String>>,
}

impl ShapeStyleUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ShapeStyleUpdate::default()
    }

    /// Write the update into `shape`, normalizing as the store does.
    pub fn apply_to(&self, shape: &mut Shape) {
        if let Some(color) = &self.color {
            shape.color = color.clone();
        }
        if let Some(radius) = self.border_radius {
            shape.set_border_radius(radius);
        }
        if let Some(opacity) = self.opacity {
            shape.opacity = opacity;
        }
        if let Some(shadow) = &self.shadow {
            shape.shadow = shadow.clone();
        }
        if let Some(glow) = &self.glow {
            shape.glow = glow.clone();
        }
        if let Some(stroke) = &self.stroke {
            shape.stroke = stroke.clone();
        }
        if let Some(image) = &self.image_data {
            shape.image_data = image.clone();
        }
        normalize_shape(shape);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextStyleUpdate {
    pub font_size: Option<u32>,
    pub color: Option<String>,
    pub font_family: Option<String>,
    pub font_weight: Option<FontWeight>,
    pub font_style: Option<FontStyle>,
    pub text_align: Option<TextAlign>,
}

impl TextStyleUpdate {
    pub fn apply_to(&self, text: &mut Text) {
        if let Some(size) = self.font_size {
            text.font_size = size.max(1);
        }
        if let Some(color) = &self.color {
            text.color = color.clone();
        }
        if let Some(family) = &self.font_family {
            text.font_family = family.clone();
        }
        if let Some(weight) = self.font_weight {
            text.font_weight = weight;
        }
        if let Some(style) = self.font_style {
            text.font_style = style;
        }
        if let Some(align) = self.text_align {
            text.text_align = align;
        }
    }
}

/// A requested change to the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneMutation {
    /// Insert a shape. The store floors its size, clamps it into the canvas
    /// and assigns it the top z-index.
    AddShape(Shape),
    AddText(Text),
    MoveEntity {
        id: EntityId,
        x: i32,
        y: i32,
    },
    MoveEntityBy {
        id: EntityId,
        dx: i32,
        dy: i32,
    },
    ResizeEntity {
        id: EntityId,
        rect: Rect,
    },
    TranslateGroup {
        id: GroupId,
        dx: i32,
        dy: i32,
    },
    SetShapeStyle {
        id: ShapeId,
        update: ShapeStyleUpdate,
    },
    SetShapeKind {
        id: ShapeId,
        kind: ShapeKind,
    },
    SetTextStyle {
        id: TextId,
        update: TextStyleUpdate,
    },
    SetTextContent {
        id: TextId,
        text: String,
    },
    /// Delete entities. Locked entities are skipped.
    Remove(Vec<EntityId>),
    /// Dissolve a group without touching its members.
    RemoveGroup(GroupId),
    GroupEntities(Vec<EntityId>),
    Ungroup(GroupId),
    Reorder {
        id: EntityId,
        op: ZOrder,
    },
    SetLocked {
        id: EntityId,
        locked: bool,
    },
    Select {
        id: EntityId,
        additive: bool,
    },
    SelectMany {
        ids: Vec<EntityId>,
        additive: bool,
    },
    SelectGroup(GroupId),
    ClearSelection,
    Clear,
}

/// Outcome of applying a mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Applied {
    /// Something a dialect encodes changed, so generated code may differ.
    pub content_changed: bool,
}

impl Applied {
    const CONTENT: Applied = Applied {
        content_changed: true,
    };
    const NOTHING: Applied = Applied {
        content_changed: false,
    };

    fn content_if(changed: bool) -> Applied {
        if changed {
            Applied::CONTENT
        } else {
            Applied::NOTHING
        }
    }
}

// ─── Store ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Scene {
    shapes: Vec<Shape>,
    texts: Vec<Text>,
    groups: Vec<Group>,
    selection: Selection,
    locked: BTreeSet<EntityId>,
    canvas: CanvasSize,
}

impl Scene {
    pub fn new(canvas: CanvasSize) -> Self {
        Self {
            canvas,
            ..Self::default()
        }
    }

    /// Build a scene straight from parsed code.
    pub fn from_parsed(parsed: ParsedScene, canvas: CanvasSize) -> Self {
        let mut scene = Scene::new(canvas);
        scene.replace_entities(parsed);
        scene
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn texts(&self) -> &[Text] {
        &self.texts
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.texts.is_empty()
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn text(&self, id: TextId) -> Option<&Text> {
        self.texts.iter().find(|t| t.id == id)
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// The group an entity belongs to, if any.
    pub fn group_of(&self, id: EntityId) -> Option<&Group> {
        self.groups.iter().find(|g| g.contains(id))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.bounds(id).is_some()
    }

    pub fn bounds(&self, id: EntityId) -> Option<Rect> {
        match id {
            EntityId::Shape(s) => self.shape(s).map(Shape::bounds),
            EntityId::Text(t) => self.text(t).map(Text::bounds),
        }
    }

    pub fn z_index(&self, id: EntityId) -> Option<i32> {
        match id {
            EntityId::Shape(s) => self.shape(s).map(|s| s.z_index),
            EntityId::Text(t) => self.text(t).map(|t| t.z_index),
        }
    }

    pub fn is_locked(&self, id: EntityId) -> bool {
        self.locked.contains(&id)
    }

    /// All shapes and texts in paint order, bottom first.
    ///
    /// Ordered by z-index, then shapes before texts, then array position.
    pub fn stack(&self) -> Vec<EntityId> {
        let mut keyed: Vec<(i32, u8, usize, EntityId)> = self
            .shapes
            .iter()
            .enumerate()
            .map(|(i, s)| (s.z_index, 0, i, EntityId::Shape(s.id)))
            .chain(
                self.texts
                    .iter()
                    .enumerate()
                    .map(|(i, t)| (t.z_index, 1, i, EntityId::Text(t.id))),
            )
            .collect();
        keyed.sort_by_key(|&(z, rank, i, _)| (z, rank, i));
        keyed.into_iter().map(|(_, _, _, id)| id).collect()
    }

    /// z-index a newly added entity receives.
    pub fn next_z(&self) -> i32 {
        self.shapes
            .iter()
            .map(|s| s.z_index)
            .chain(self.texts.iter().map(|t| t.z_index))
            .max()
            .map_or(0, |z| z + 1)
    }

    // ─── Mutation entry point ────────────────────────────────────────────

    pub fn apply(&mut self, mutation: SceneMutation) -> Applied {
        log::trace!("apply {mutation:?}");
        match mutation {
            SceneMutation::AddShape(shape) => Applied::content_if(self.add_shape(shape)),
            SceneMutation::AddText(text) => Applied::content_if(self.add_text(text)),
            SceneMutation::MoveEntity { id, x, y } => {
                Applied::content_if(self.move_entity(id, x, y))
            }
            SceneMutation::MoveEntityBy { id, dx, dy } => match self.bounds(id) {
                Some(b) => Applied::content_if(self.move_entity(id, b.x + dx, b.y + dy)),
                None => Applied::NOTHING,
            },
            SceneMutation::ResizeEntity { id, rect } => {
                Applied::content_if(self.resize_entity(id, rect))
            }
            SceneMutation::TranslateGroup { id, dx, dy } => {
                Applied::content_if(self.translate_group(id, dx, dy))
            }
            SceneMutation::SetShapeStyle { id, update } => {
                let Some(shape) = self.shape_mut(id) else {
                    return Applied::NOTHING;
                };
                let before = shape.clone();
                update.apply_to(shape);
                Applied::content_if(*shape != before)
            }
            SceneMutation::SetShapeKind { id, kind } => {
                let Some(shape) = self.shape_mut(id) else {
                    return Applied::NOTHING;
                };
                if shape.kind == kind {
                    return Applied::NOTHING;
                }
                shape.kind = kind;
                normalize_shape(shape);
                Applied::CONTENT
            }
            SceneMutation::SetTextStyle { id, update } => {
                let Some(text) = self.text_mut(id) else {
                    return Applied::NOTHING;
                };
                let before = text.clone();
                update.apply_to(text);
                Applied::content_if(*text != before)
            }
            SceneMutation::SetTextContent { id, text: content } => {
                let Some(text) = self.text_mut(id) else {
                    return Applied::NOTHING;
                };
                if text.text == content {
                    return Applied::NOTHING;
                }
                text.text = content;
                Applied::CONTENT
            }
            SceneMutation::Remove(ids) => Applied::content_if(self.remove(&ids)),
            SceneMutation::RemoveGroup(id) | SceneMutation::Ungroup(id) => {
                self.dissolve_group(id);
                Applied::NOTHING
            }
            SceneMutation::GroupEntities(ids) => {
                self.group_entities(&ids);
                Applied::NOTHING
            }
            SceneMutation::Reorder { id, op } => Applied::content_if(self.reorder(id, op)),
            SceneMutation::SetLocked { id, locked } => {
                if self.contains(id) {
                    if locked {
                        self.locked.insert(id);
                    } else {
                        self.locked.remove(&id);
                    }
                }
                Applied::NOTHING
            }
            SceneMutation::Select { id, additive } => {
                if self.contains(id) {
                    if additive {
                        self.selection.toggle(id);
                    } else {
                        self.selection.select_only(id);
                    }
                }
                Applied::NOTHING
            }
            SceneMutation::SelectMany { ids, additive } => {
                if !additive {
                    self.selection.clear();
                }
                self.selection.group = None;
                let present: Vec<EntityId> =
                    ids.into_iter().filter(|id| self.contains(*id)).collect();
                for id in present {
                    self.selection.insert(id);
                    self.selection.set_primary(Some(id));
                }
                Applied::NOTHING
            }
            SceneMutation::SelectGroup(id) => {
                if self.group(id).is_some() {
                    self.selection.clear();
                    self.selection.group = Some(id);
                }
                Applied::NOTHING
            }
            SceneMutation::ClearSelection => {
                self.selection.clear();
                Applied::NOTHING
            }
            SceneMutation::Clear => {
                let had_content = !self.is_empty();
                self.shapes.clear();
                self.texts.clear();
                self.groups.clear();
                self.locked.clear();
                self.selection.clear();
                Applied::content_if(had_content)
            }
        }
    }

    /// Swap in the entities recovered from code.
    ///
    /// Groups, selection and locks survive for ids still present; everything
    /// else referring to vanished entities is pruned.
    pub fn replace_entities(&mut self, parsed: ParsedScene) {
        let ParsedScene { shapes, texts } = parsed;
        let mut seen = BTreeSet::new();
        self.shapes = shapes
            .into_iter()
            .filter(|s| dedupe(&mut seen, EntityId::Shape(s.id)))
            .map(|mut s| {
                id::observe(s.id.raw());
                normalize_shape(&mut s);
                s
            })
            .collect();
        self.texts = texts
            .into_iter()
            .filter(|t| dedupe(&mut seen, EntityId::Text(t.id)))
            .inspect(|t| id::observe(t.id.raw()))
            .collect();

        let gone: Vec<EntityId> = self
            .selection
            .entities()
            .into_iter()
            .filter(|id| !self.contains(*id))
            .collect();
        for id in gone {
            self.selection.forget(id);
        }
        let shapes = &self.shapes;
        let texts = &self.texts;
        self.locked.retain(|id| match id {
            EntityId::Shape(s) => shapes.iter().any(|x| x.id == *s),
            EntityId::Text(t) => texts.iter().any(|x| x.id == *t),
        });
        for group in &mut self.groups {
            group.shape_ids.retain(|id| shapes.iter().any(|s| s.id == *id));
            group.text_ids.retain(|id| texts.iter().any(|t| t.id == *id));
        }
        self.prune_groups();
        self.refresh_group_bounds();
        log::debug!(
            "scene replaced: {} shapes, {} texts, {} groups",
            self.shapes.len(),
            self.texts.len(),
            self.groups.len()
        );
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id == id)
    }

    fn text_mut(&mut self, id: TextId) -> Option<&mut Text> {
        self.texts.iter_mut().find(|t| t.id == id)
    }

    fn set_bounds(&mut self, id: EntityId, r: Rect) {
        match id {
            EntityId::Shape(s) => {
                if let Some(shape) = self.shape_mut(s) {
                    shape.set_bounds(r);
                }
            }
            EntityId::Text(t) => {
                if let Some(text) = self.text_mut(t) {
                    text.set_bounds(r);
                }
            }
        }
    }

    fn add_shape(&mut self, mut shape: Shape) -> bool {
        if self.shape(shape.id).is_some() {
            log::warn!("shape {:?} already exists, ignoring add", shape.id);
            return false;
        }
        normalize_shape(&mut shape);
        let r = self.clamp_origin(floor_size(shape.bounds()));
        shape.set_bounds(r);
        shape.z_index = self.next_z();
        self.shapes.push(shape);
        true
    }

    fn add_text(&mut self, mut text: Text) -> bool {
        if self.text(text.id).is_some() {
            log::warn!("text {:?} already exists, ignoring add", text.id);
            return false;
        }
        let r = self.clamp_origin(floor_size(text.bounds()));
        text.set_bounds(r);
        text.z_index = self.next_z();
        self.texts.push(text);
        true
    }

    fn move_entity(&mut self, id: EntityId, x: i32, y: i32) -> bool {
        if self.is_locked(id) {
            return false;
        }
        let Some(current) = self.bounds(id) else {
            return false;
        };
        let target = self.clamp_origin(Rect { x, y, ..current });
        if target == current {
            return false;
        }
        self.set_bounds(id, target);
        self.refresh_group_bounds();
        true
    }

    fn resize_entity(&mut self, id: EntityId, rect: Rect) -> bool {
        if self.is_locked(id) {
            return false;
        }
        let Some(current) = self.bounds(id) else {
            return false;
        };
        let target = self.clamp_resize(floor_size(rect));
        if target == current {
            return false;
        }
        self.set_bounds(id, target);
        self.refresh_group_bounds();
        true
    }

    fn translate_group(&mut self, id: GroupId, dx: i32, dy: i32) -> bool {
        let Some(group) = self.group(id) else {
            return false;
        };
        let members: Vec<EntityId> = group.members().collect();
        if members.iter().any(|m| self.is_locked(*m)) {
            log::trace!("group {id:?} has a locked member, not moving");
            return false;
        }
        let Some(extent) = members
            .iter()
            .filter_map(|m| self.bounds(*m))
            .reduce(|a, b| a.union(&b))
        else {
            return false;
        };
        // Keep the whole group inside the canvas, never pushing it further out.
        let dx = dx.clamp(
            (-extent.x).min(0),
            (self.canvas.width - extent.right()).max(0),
        );
        let dy = dy.clamp(
            (-extent.y).min(0),
            (self.canvas.height - extent.bottom()).max(0),
        );
        if dx == 0 && dy == 0 {
            return false;
        }
        for member in members {
            if let Some(b) = self.bounds(member) {
                self.set_bounds(
                    member,
                    Rect {
                        x: b.x + dx,
                        y: b.y + dy,
                        ..b
                    },
                );
            }
        }
        self.refresh_group_bounds();
        true
    }

    fn remove(&mut self, ids: &[EntityId]) -> bool {
        let doomed: BTreeSet<EntityId> = ids
            .iter()
            .copied()
            .filter(|id| !self.is_locked(*id))
            .collect();
        if doomed.is_empty() {
            return false;
        }
        let before = self.shapes.len() + self.texts.len();
        self.shapes
            .retain(|s| !doomed.contains(&EntityId::Shape(s.id)));
        self.texts.retain(|t| !doomed.contains(&EntityId::Text(t.id)));
        for id in &doomed {
            self.selection.forget(*id);
        }
        for group in &mut self.groups {
            group
                .shape_ids
                .retain(|s| !doomed.contains(&EntityId::Shape(*s)));
            group
                .text_ids
                .retain(|t| !doomed.contains(&EntityId::Text(*t)));
        }
        self.prune_groups();
        self.refresh_group_bounds();
        self.shapes.len() + self.texts.len() != before
    }

    fn dissolve_group(&mut self, id: GroupId) {
        let Some(pos) = self.groups.iter().position(|g| g.id == id) else {
            return;
        };
        let group = self.groups.remove(pos);
        if self.selection.group == Some(id) {
            self.selection.clear();
            for member in group.members() {
                self.selection.insert(member);
            }
        }
    }

    fn group_entities(&mut self, ids: &[EntityId]) {
        let mut members: Vec<EntityId> = Vec::new();
        for id in ids {
            if self.contains(*id) && !members.contains(id) {
                members.push(*id);
            }
        }
        if members.len() < 2 {
            return;
        }
        // An entity belongs to at most one group.
        for group in &mut self.groups {
            group.shape_ids.retain(|s| !members.contains(&EntityId::Shape(*s)));
            group.text_ids.retain(|t| !members.contains(&EntityId::Text(*t)));
        }
        self.prune_groups();

        let mut shape_ids: SmallVec<[ShapeId; 4]> = SmallVec::new();
        let mut text_ids: SmallVec<[TextId; 4]> = SmallVec::new();
        for member in &members {
            match member {
                EntityId::Shape(s) => shape_ids.push(*s),
                EntityId::Text(t) => text_ids.push(*t),
            }
        }
        let z_index = members
            .iter()
            .filter_map(|m| self.z_index(*m))
            .max()
            .unwrap_or(0);
        let group = Group {
            id: GroupId::next(),
            shape_ids,
            text_ids,
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            z_index,
        };
        let gid = group.id;
        self.groups.push(group);
        self.refresh_group_bounds();
        self.selection.clear();
        self.selection.group = Some(gid);
    }

    fn reorder(&mut self, id: EntityId, op: ZOrder) -> bool {
        let mut stack = self.stack();
        let Some(pos) = stack.iter().position(|e| *e == id) else {
            return false;
        };
        let top = stack.len() - 1;
        let target = match op {
            ZOrder::BringForward if pos < top => pos + 1,
            ZOrder::SendBackward if pos > 0 => pos - 1,
            ZOrder::BringToFront if pos < top => top,
            ZOrder::SendToBack if pos > 0 => 0,
            _ => return false,
        };
        let entity = stack.remove(pos);
        stack.insert(target, entity);
        for (z, entity) in stack.into_iter().enumerate() {
            let z = z as i32;
            match entity {
                EntityId::Shape(s) => {
                    if let Some(shape) = self.shape_mut(s) {
                        shape.z_index = z;
                    }
                }
                EntityId::Text(t) => {
                    if let Some(text) = self.text_mut(t) {
                        text.z_index = z;
                    }
                }
            }
        }
        true
    }

    fn prune_groups(&mut self) {
        let selected_group = self.selection.group;
        self.groups.retain(|g| !g.is_empty());
        if let Some(gid) = selected_group
            && self.group(gid).is_none()
        {
            self.selection.group = None;
        }
    }

    fn refresh_group_bounds(&mut self) {
        let extents: Vec<Option<Rect>> = self
            .groups
            .iter()
            .map(|g| {
                g.members()
                    .filter_map(|m| self.bounds(m))
                    .reduce(|a, b| a.union(&b))
            })
            .collect();
        for (group, extent) in self.groups.iter_mut().zip(extents) {
            if let Some(r) = extent {
                group.x = r.x;
                group.y = r.y;
                group.width = r.width;
                group.height = r.height;
            }
        }
    }

    /// Keep the origin inside `[0, canvas - size]` on both axes.
    fn clamp_origin(&self, r: Rect) -> Rect {
        Rect {
            x: r.x.min(self.canvas.width - r.width).max(0),
            y: r.y.min(self.canvas.height - r.height).max(0),
            ..r
        }
    }

    /// Trim a resized box to the canvas, never below the size floor.
    fn clamp_resize(&self, r: Rect) -> Rect {
        let (x, width) = clamp_span(r.x, r.width, self.canvas.width);
        let (y, height) = clamp_span(r.y, r.height, self.canvas.height);
        Rect::new(x, y, width, height)
    }
}

fn clamp_span(start: i32, len: i32, limit: i32) -> (i32, i32) {
    let mut lo = start.max(0);
    let hi = (start + len).min(limit);
    let len = (hi - lo).max(MIN_SIZE);
    if lo + len > limit {
        lo = (limit - len).max(0);
    }
    (lo, len)
}

fn floor_size(r: Rect) -> Rect {
    Rect {
        width: r.width.max(MIN_SIZE),
        height: r.height.max(MIN_SIZE),
        ..r
    }
}

fn dedupe(seen: &mut BTreeSet<EntityId>, id: EntityId) -> bool {
    if seen.insert(id) {
        true
    } else {
        log::warn!("duplicate {id:?} in parsed code, keeping the first");
        false
    }
}

/// Canonical form of a shape's optional style fields, so that equivalent
/// shapes compare equal and generate identical code.
pub fn normalize_shape(shape: &mut Shape) {
    shape.set_border_radius(shape.border_radius);
    shape.opacity = shape.opacity.map(normalize_opacity);
    if shape.shadow.as_ref().is_some_and(|s| s.kind == ShadowKind::None) {
        shape.shadow = None;
    }
    if shape.glow.as_ref().is_some_and(|g| !g.enabled) {
        shape.glow = None;
    }
}
