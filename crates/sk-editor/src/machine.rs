//! Interaction state machine.
//!
//! Translates normalized input into `SceneMutation`s. The machine only reads
//! the scene; the caller applies whatever `handle` returns. Each state
//! carries exactly the data its gesture needs.
//!
//! ## Modifier behaviors
//!
//! | Modifier | Click | Create drag | Marquee |
//! |----------|-------|-------------|---------|
//! | **Shift / ⌘ / Ctrl** | Toggle in selection | Shift: square | Shift: add to selection |

use crate::config::EditorConfig;
use crate::input::{InputEvent, Modifiers};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use sk_core::{
    CREATE_THRESHOLD, EntityId, GroupId, Handle, Hit, MIN_SIZE, Rect, Scene, SceneMutation, Shape,
    ShapeKind, Text, TextId, hit_rect, hit_test,
};

/// Marquees smaller than this on both axes count as a plain click.
const MARQUEE_CLICK: i32 = 2;

/// The gesture in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionState {
    Idle,
    /// Drawing a new shape of an armed kind.
    Creating {
        kind: ShapeKind,
        start: (i32, i32),
        current: (i32, i32),
    },
    /// Moving an entity; other selected entities follow.
    Dragging {
        target: EntityId,
        /// Pointer minus the target's origin at grab time.
        offset: (i32, i32),
    },
    Resizing {
        target: EntityId,
        handle: Handle,
        /// Bounds when the handle was grabbed.
        start: Rect,
        origin: (i32, i32),
    },
    MarqueeSelecting {
        start: (i32, i32),
        current: (i32, i32),
        additive: bool,
    },
    DraggingGroup {
        group: GroupId,
        last: (i32, i32),
    },
    EditingText {
        id: TextId,
    },
}

#[derive(Debug, Clone)]
pub struct InteractionMachine {
    state: InteractionState,
    /// Kind the next empty-canvas drag creates.
    armed: Option<ShapeKind>,
    arrow_step: i32,
    handle_size: i32,
}

impl Default for InteractionMachine {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl InteractionMachine {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            state: InteractionState::Idle,
            armed: None,
            arrow_step: config.arrow_step,
            handle_size: config.handle_size,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn armed(&self) -> Option<ShapeKind> {
        self.armed
    }

    pub fn arm(&mut self, kind: ShapeKind) {
        log::trace!("armed {kind:?}");
        self.armed = Some(kind);
    }

    pub fn disarm(&mut self) {
        self.armed = None;
    }

    pub fn editing_text(&self) -> Option<TextId> {
        match self.state {
            InteractionState::EditingText { id } => Some(id),
            _ => None,
        }
    }

    pub fn handle_size(&self) -> i32 {
        self.handle_size
    }

    /// The box to draw while creating, floored to the minimum size.
    pub fn preview(&self) -> Option<Rect> {
        match self.state {
            InteractionState::Creating { start, current, .. } => {
                let mut r = Rect::from_corners(start.0, start.1, current.0, current.1);
                r.width = r.width.max(MIN_SIZE);
                r.height = r.height.max(MIN_SIZE);
                Some(r)
            }
            _ => None,
        }
    }

    pub fn marquee(&self) -> Option<Rect> {
        match self.state {
            InteractionState::MarqueeSelecting { start, current, .. } => Some(Rect::from_corners(
                start.0, start.1, current.0, current.1,
            )),
            _ => None,
        }
    }

    /// Drop a gesture whose target no longer exists, e.g. after the scene
    /// was replaced from code.
    pub fn reconcile(&mut self, scene: &Scene) {
        let alive = match &self.state {
            InteractionState::Dragging { target, .. }
            | InteractionState::Resizing { target, .. } => scene.contains(*target),
            InteractionState::DraggingGroup { group, .. } => scene.group(*group).is_some(),
            InteractionState::EditingText { id } => scene.text(*id).is_some(),
            _ => true,
        };
        if !alive {
            self.transition(InteractionState::Idle);
        }
    }

    /// Feed one event through the machine.
    pub fn handle(&mut self, scene: &Scene, event: &InputEvent) -> Vec<SceneMutation> {
        match event {
            InputEvent::PointerDown { modifiers, .. } => {
                let Some((x, y)) = event.position() else {
                    return Vec::new();
                };
                self.pointer_down(scene, x, y, *modifiers)
            }
            InputEvent::PointerMove { modifiers, .. } => {
                let Some((x, y)) = event.position() else {
                    return Vec::new();
                };
                self.pointer_move(scene, x, y, *modifiers)
            }
            InputEvent::PointerUp { modifiers, .. } => {
                if let Some((x, y)) = event.position() {
                    self.track(x, y, *modifiers);
                }
                self.finish_gesture(scene)
            }
            InputEvent::PointerLeave => self.finish_gesture(scene),
            InputEvent::DoubleClick { .. } => {
                let Some((x, y)) = event.position() else {
                    return Vec::new();
                };
                self.double_click(scene, x, y)
            }
            InputEvent::Key { key, modifiers } => self.key(scene, key, *modifiers),
            InputEvent::Blur => {
                if self.editing_text().is_some() {
                    self.transition(InteractionState::Idle);
                }
                Vec::new()
            }
        }
    }

    fn transition(&mut self, next: InteractionState) {
        if self.state != next {
            log::trace!("{:?} -> {:?}", self.state, next);
        }
        self.state = next;
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    fn pointer_down(&mut self, scene: &Scene, x: i32, y: i32, modifiers: Modifiers) -> Vec<SceneMutation> {
        // Pointer-down anywhere commits a text edit; a stale gesture whose
        // release was missed is dropped.
        if self.state != InteractionState::Idle {
            self.transition(InteractionState::Idle);
        }

        match hit_test(scene, x, y, self.handle_size) {
            Hit::Handle(target, handle) => {
                let Some(start) = scene.bounds(target) else {
                    return Vec::new();
                };
                self.transition(InteractionState::Resizing {
                    target,
                    handle,
                    start,
                    origin: (x, y),
                });
                Vec::new()
            }
            Hit::Entity(target) => {
                let Some(bounds) = scene.bounds(target) else {
                    return Vec::new();
                };
                let selected = scene.selection().contains(target);
                let mutations = if modifiers.multi_select() {
                    let toggle = vec![SceneMutation::Select {
                        id: target,
                        additive: true,
                    }];
                    if selected {
                        // Toggled off: nothing to drag.
                        return toggle;
                    }
                    toggle
                } else if selected && scene.selection().group.is_none() {
                    Vec::new()
                } else {
                    vec![SceneMutation::Select {
                        id: target,
                        additive: false,
                    }]
                };
                self.transition(InteractionState::Dragging {
                    target,
                    offset: (x - bounds.x, y - bounds.y),
                });
                mutations
            }
            Hit::Group(group) => {
                self.transition(InteractionState::DraggingGroup {
                    group,
                    last: (x, y),
                });
                vec![SceneMutation::SelectGroup(group)]
            }
            Hit::Canvas => {
                if let Some(kind) = self.armed {
                    self.transition(InteractionState::Creating {
                        kind,
                        start: (x, y),
                        current: (x, y),
                    });
                } else {
                    self.transition(InteractionState::MarqueeSelecting {
                        start: (x, y),
                        current: (x, y),
                        additive: modifiers.shift,
                    });
                }
                Vec::new()
            }
        }
    }

    /// Update the pointer position of a rubber-band gesture.
    fn track(&mut self, x: i32, y: i32, modifiers: Modifiers) {
        match &mut self.state {
            InteractionState::Creating { start, current, .. } => {
                *current = if modifiers.shift {
                    square_corner(*start, (x, y))
                } else {
                    (x, y)
                };
            }
            InteractionState::MarqueeSelecting { current, .. } => *current = (x, y),
            _ => {}
        }
    }

    fn pointer_move(&mut self, scene: &Scene, x: i32, y: i32, modifiers: Modifiers) -> Vec<SceneMutation> {
        self.track(x, y, modifiers);
        match &mut self.state {
            InteractionState::Dragging { target, offset } => {
                let target = *target;
                let Some(grabbed) = scene.bounds(target) else {
                    return Vec::new();
                };
                let mut moving = vec![target];
                moving.extend(
                    scene
                        .selection()
                        .entities()
                        .into_iter()
                        .filter(|id| *id != target),
                );
                let Some(extent) = moving
                    .iter()
                    .filter_map(|id| scene.bounds(*id))
                    .reduce(|a, b| a.union(&b))
                else {
                    return Vec::new();
                };
                // One delta for the whole selection, clamped by its union.
                let canvas = scene.canvas();
                let dx = (x - offset.0 - grabbed.x)
                    .clamp((-extent.x).min(0), (canvas.width - extent.right()).max(0));
                let dy = (y - offset.1 - grabbed.y)
                    .clamp((-extent.y).min(0), (canvas.height - extent.bottom()).max(0));
                if dx == 0 && dy == 0 {
                    return Vec::new();
                }
                moving
                    .into_iter()
                    .map(|id| SceneMutation::MoveEntityBy { id, dx, dy })
                    .collect()
            }
            InteractionState::Resizing {
                target,
                handle,
                start,
                origin,
            } => vec![SceneMutation::ResizeEntity {
                id: *target,
                rect: handle.resize(*start, x - origin.0, y - origin.1),
            }],
            InteractionState::DraggingGroup { group, last } => {
                let (dx, dy) = (x - last.0, y - last.1);
                *last = (x, y);
                if dx == 0 && dy == 0 {
                    return Vec::new();
                }
                vec![SceneMutation::TranslateGroup { id: *group, dx, dy }]
            }
            _ => Vec::new(),
        }
    }

    /// Pointer released or left the canvas.
    fn finish_gesture(&mut self, scene: &Scene) -> Vec<SceneMutation> {
        let mutations = match self.state {
            InteractionState::Creating {
                kind,
                start,
                current,
            } => {
                self.armed = None;
                let r = Rect::from_corners(start.0, start.1, current.0, current.1);
                if r.width < CREATE_THRESHOLD || r.height < CREATE_THRESHOLD {
                    log::trace!("discarding {}x{} {kind:?}", r.width, r.height);
                    Vec::new()
                } else {
                    let shape = Shape::new(
                        kind,
                        Rect::new(r.x, r.y, r.width.max(MIN_SIZE), r.height.max(MIN_SIZE)),
                    );
                    let id = EntityId::Shape(shape.id);
                    vec![
                        SceneMutation::AddShape(shape),
                        SceneMutation::Select {
                            id,
                            additive: false,
                        },
                    ]
                }
            }
            InteractionState::MarqueeSelecting {
                start,
                current,
                additive,
            } => {
                let r = Rect::from_corners(start.0, start.1, current.0, current.1);
                if r.width < MARQUEE_CLICK && r.height < MARQUEE_CLICK {
                    if additive {
                        Vec::new()
                    } else {
                        vec![SceneMutation::ClearSelection]
                    }
                } else {
                    vec![SceneMutation::SelectMany {
                        ids: hit_rect(scene, r),
                        additive,
                    }]
                }
            }
            InteractionState::EditingText { .. } => return Vec::new(),
            _ => Vec::new(),
        };
        self.transition(InteractionState::Idle);
        mutations
    }

    fn double_click(&mut self, scene: &Scene, x: i32, y: i32) -> Vec<SceneMutation> {
        self.transition(InteractionState::Idle);
        match topmost_at(scene, x, y) {
            Some(EntityId::Text(id)) => {
                self.transition(InteractionState::EditingText { id });
                vec![SceneMutation::Select {
                    id: id.into(),
                    additive: false,
                }]
            }
            Some(EntityId::Shape(_)) => Vec::new(),
            None => {
                let text = Text::new(x, y);
                let id = text.id;
                self.transition(InteractionState::EditingText { id });
                vec![
                    SceneMutation::AddText(text),
                    SceneMutation::Select {
                        id: id.into(),
                        additive: false,
                    },
                ]
            }
        }
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    fn key(&mut self, scene: &Scene, key: &str, modifiers: Modifiers) -> Vec<SceneMutation> {
        match self.state {
            InteractionState::EditingText { id } => self.edit_text(scene, id, key, modifiers),
            InteractionState::Idle => match ShortcutMap::resolve(key, modifiers) {
                Some(action) => self.shortcut(scene, action),
                None => Vec::new(),
            },
            InteractionState::Creating { .. } if key == "Escape" => {
                self.armed = None;
                self.transition(InteractionState::Idle);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn edit_text(&mut self, scene: &Scene, id: TextId, key: &str, modifiers: Modifiers) -> Vec<SceneMutation> {
        let Some(text) = scene.text(id) else {
            self.transition(InteractionState::Idle);
            return Vec::new();
        };
        let mut content = text.text.clone();
        match key {
            "Escape" => {
                self.transition(InteractionState::Idle);
                return Vec::new();
            }
            "Backspace" => {
                if content.pop().is_none() {
                    return Vec::new();
                }
            }
            "Enter" => content.push('\n'),
            _ if modifiers.command() => return Vec::new(),
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => content.push(c),
                    // Named keys ("Shift", "ArrowLeft") carry no character.
                    _ => return Vec::new(),
                }
            }
        }
        vec![SceneMutation::SetTextContent { id, text: content }]
    }

    fn shortcut(&mut self, scene: &Scene, action: ShortcutAction) -> Vec<SceneMutation> {
        let selection = scene.selection();
        match action {
            ShortcutAction::Arm(kind) => {
                self.arm(kind);
                Vec::new()
            }
            ShortcutAction::Disarm => {
                self.disarm();
                Vec::new()
            }
            ShortcutAction::Deselect => {
                self.disarm();
                vec![SceneMutation::ClearSelection]
            }
            ShortcutAction::Delete => {
                let ids = selected_leaves(scene);
                if ids.is_empty() {
                    return Vec::new();
                }
                vec![SceneMutation::Remove(ids), SceneMutation::ClearSelection]
            }
            ShortcutAction::SelectAll => vec![SceneMutation::SelectMany {
                ids: scene.stack(),
                additive: false,
            }],
            ShortcutAction::ClearCanvas => vec![SceneMutation::Clear],
            ShortcutAction::Group => {
                let ids = selection.entities();
                if ids.len() < 2 {
                    return Vec::new();
                }
                vec![SceneMutation::GroupEntities(ids)]
            }
            ShortcutAction::Ungroup => selection
                .group
                .map(|g| vec![SceneMutation::Ungroup(g)])
                .unwrap_or_default(),
            ShortcutAction::ToggleLock => selected_leaves(scene)
                .into_iter()
                .map(|id| SceneMutation::SetLocked {
                    id,
                    locked: !scene.is_locked(id),
                })
                .collect(),
            ShortcutAction::Nudge { dx, dy } => match selection.single() {
                Some(id @ EntityId::Shape(_)) => vec![SceneMutation::MoveEntityBy {
                    id,
                    dx: dx * self.arrow_step,
                    dy: dy * self.arrow_step,
                }],
                _ => Vec::new(),
            },
            ShortcutAction::Reorder(op) => selection
                .single()
                .map(|id| vec![SceneMutation::Reorder { id, op }])
                .unwrap_or_default(),
        }
    }
}

/// The selected leaves, or the members of the selected group.
fn selected_leaves(scene: &Scene) -> Vec<EntityId> {
    match scene.selection().group.and_then(|g| scene.group(g)) {
        Some(group) => group.members().collect(),
        None => scene.selection().entities(),
    }
}

/// Topmost shape or text under the point, ignoring groups and handles.
fn topmost_at(scene: &Scene, x: i32, y: i32) -> Option<EntityId> {
    scene
        .stack()
        .into_iter()
        .rev()
        .find(|id| scene.bounds(*id).is_some_and(|b| b.contains(x, y)))
}

/// Corner that turns the drag from `start` into a square.
fn square_corner(start: (i32, i32), to: (i32, i32)) -> (i32, i32) {
    let (dx, dy) = (to.0 - start.0, to.1 - start.1);
    let side = dx.abs().max(dy.abs());
    let sx = if dx < 0 { -side } else { side };
    let sy = if dy < 0 { -side } else { side };
    (start.0 + sx, start.1 + sy)
}
