//! The editor facade: one scene, one interaction machine, one sync
//! controller. Hosts forward input, code-editor callbacks and timer ticks
//! here and read back the scene and the code.

use crate::config::EditorConfig;
use crate::input::InputEvent;
use crate::machine::InteractionMachine;
use crate::sync::{SyncController, SyncEvent, SyncEvents};
use sk_core::{
    DEFAULT_SHAPE_SIZE, Dialect, ElementPatch, EntityId, Rect, Scene, SceneMutation, Shape,
    ShapeId, ShapeKind, ShapeStyleUpdate, TextId, TextStyleUpdate,
};
use std::time::Instant;

pub struct Editor {
    config: EditorConfig,
    scene: Scene,
    machine: InteractionMachine,
    sync: SyncController,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let scene = Scene::new(config.canvas());
        Self::with_scene(config, scene)
    }

    /// Start from an existing scene and generate its code.
    pub fn with_scene(config: EditorConfig, scene: Scene) -> Self {
        let machine = InteractionMachine::new(&config);
        let mut sync = SyncController::from_config(&config);
        sync.regenerate(&scene);
        Self {
            config,
            scene,
            machine,
            sync,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn machine(&self) -> &InteractionMachine {
        &self.machine
    }

    pub fn sync(&self) -> &SyncController {
        &self.sync
    }

    pub fn code(&self) -> &str {
        self.sync.code()
    }

    pub fn dialect(&self) -> Dialect {
        self.sync.active()
    }

    // ─── Canvas side ─────────────────────────────────────────────────────

    /// Apply mutations and let the sync controller react once.
    pub fn apply(&mut self, mutations: Vec<SceneMutation>, now: Instant) -> Option<SyncEvent> {
        let mut changed = false;
        for mutation in mutations {
            changed |= self.scene.apply(mutation).content_changed;
        }
        if changed {
            self.sync.on_scene_changed(&self.scene, now)
        } else {
            None
        }
    }

    pub fn handle_input(&mut self, event: &InputEvent, now: Instant) -> Option<SyncEvent> {
        let mutations = self.machine.handle(&self.scene, event);
        self.apply(mutations, now)
    }

    /// The "add shape" action: a default-sized shape near the canvas
    /// center, selected.
    pub fn add_shape(
        &mut self,
        kind: Option<ShapeKind>,
        now: Instant,
    ) -> (ShapeId, Option<SyncEvent>) {
        let canvas = self.scene.canvas();
        let kind = kind.unwrap_or(self.config.default_shape);
        let offset = 10 * (self.scene.shapes().len() as i32 % 10);
        let shape = Shape::new(
            kind,
            Rect::new(
                (canvas.width - DEFAULT_SHAPE_SIZE) / 2 + offset,
                (canvas.height - DEFAULT_SHAPE_SIZE) / 2 + offset,
                DEFAULT_SHAPE_SIZE,
                DEFAULT_SHAPE_SIZE,
            ),
        );
        let id = shape.id;
        let event = self.apply(
            vec![
                SceneMutation::AddShape(shape),
                SceneMutation::Select {
                    id: id.into(),
                    additive: false,
                },
            ],
            now,
        );
        (id, event)
    }

    /// Restyle one shape, patching its element in place when possible.
    pub fn set_shape_style(
        &mut self,
        id: ShapeId,
        update: ShapeStyleUpdate,
        now: Instant,
    ) -> Option<SyncEvent> {
        let applied = self.scene.apply(SceneMutation::SetShapeStyle {
            id,
            update: update.clone(),
        });
        if !applied.content_changed {
            return None;
        }
        let patch = ElementPatch {
            shape_style: Some(update),
            ..ElementPatch::default()
        };
        self.sync
            .on_entity_patched(&self.scene, EntityId::Shape(id), &patch, now)
    }

    pub fn set_text_style(
        &mut self,
        id: TextId,
        update: TextStyleUpdate,
        now: Instant,
    ) -> Option<SyncEvent> {
        let applied = self.scene.apply(SceneMutation::SetTextStyle {
            id,
            update: update.clone(),
        });
        if !applied.content_changed {
            return None;
        }
        let patch = ElementPatch {
            text_style: Some(update),
            ..ElementPatch::default()
        };
        self.sync
            .on_entity_patched(&self.scene, EntityId::Text(id), &patch, now)
    }

    // ─── Code side ───────────────────────────────────────────────────────

    pub fn code_edited(&mut self, text: &str, now: Instant) -> Option<SyncEvent> {
        let event = self.sync.on_code_edited(&mut self.scene, text, now);
        self.machine.reconcile(&self.scene);
        event
    }

    pub fn code_blurred(&mut self) -> SyncEvents {
        let events = self.sync.on_code_blur(&mut self.scene);
        self.machine.reconcile(&self.scene);
        events
    }

    pub fn switch_dialect(&mut self, dialect: Dialect) -> SyncEvents {
        let events = self.sync.switch_dialect(dialect, &mut self.scene);
        self.machine.reconcile(&self.scene);
        events
    }

    /// Drive debounced work; call at or after `sync().next_deadline()`.
    pub fn tick(&mut self, now: Instant) -> SyncEvents {
        let events = self.sync.tick(&mut self.scene, now);
        if !events.is_empty() {
            self.machine.reconcile(&self.scene);
        }
        events
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_editor_has_placeholder_code() {
        let editor = Editor::default();
        assert_eq!(
            editor.code(),
            "<!-- Empty canvas: draw a shape or add text to generate markup -->\n"
        );
    }

    #[test]
    fn add_shape_uses_configured_kind() {
        let config = EditorConfig {
            default_shape: ShapeKind::Hexagon,
            ..EditorConfig::default()
        };
        let mut editor = Editor::new(config);
        let (id, event) = editor.add_shape(None, Instant::now());
        let shape = editor.scene().shape(id).unwrap();
        assert_eq!(shape.kind, ShapeKind::Hexagon);
        assert_eq!(shape.bounds(), Rect::new(350, 250, 100, 100));
        assert_eq!(editor.scene().selection().shape, Some(id));
        assert!(matches!(event, Some(SyncEvent::Regenerated { .. })));
        assert!(editor.code().contains("type=\"hexagon\""));
    }

    #[test]
    fn unchanged_style_does_not_sync() {
        let mut editor = Editor::default();
        let (id, _) = editor.add_shape(Some(ShapeKind::Rectangle), Instant::now());
        let event = editor.set_shape_style(id, ShapeStyleUpdate::default(), Instant::now());
        assert_eq!(event, None);
    }
}
