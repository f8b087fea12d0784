//! Integration tests: pointer gestures and code edits flowing through the
//! editor facade (sk-editor ↔ sk-core).

use pretty_assertions::assert_eq;
use sk_core::{
    Dialect, EntityId, MIN_SIZE, Rect, ShapeId, ShapeKind, ShapeStyleUpdate, TextId,
};
use sk_editor::{Editor, EditorConfig, InputEvent, InteractionState, Modifiers, SyncEvent};
use std::time::{Duration, Instant};

fn drag(editor: &mut Editor, from: (f32, f32), to: (f32, f32)) {
    let now = Instant::now();
    editor.handle_input(&InputEvent::pointer_down(from.0, from.1), now);
    editor.handle_input(&InputEvent::pointer_move(to.0, to.1), now);
    editor.handle_input(&InputEvent::pointer_up(to.0, to.1), now);
}

fn press(editor: &mut Editor, key: &str) {
    editor.handle_input(&InputEvent::key(key), Instant::now());
}

fn board() -> Editor {
    let mut editor = Editor::default();
    let event = editor.code_edited(include_str!("fixtures/board.xml"), Instant::now());
    assert_eq!(
        event,
        Some(SyncEvent::SceneReplaced {
            dialect: Dialect::Markup
        })
    );
    editor.code_blurred();
    editor
}

// ─── Canvas → Code ──────────────────────────────────────────────────────

#[test]
fn draw_then_resize_rectangle() {
    let mut editor = Editor::default();
    press(&mut editor, "r");
    assert_eq!(editor.machine().armed(), Some(ShapeKind::Rectangle));

    drag(&mut editor, (10.0, 10.0), (110.0, 90.0));
    assert_eq!(editor.scene().shapes().len(), 1);
    let shape = editor.scene().shapes()[0].clone();
    assert_eq!(shape.kind, ShapeKind::Rectangle);
    assert_eq!(shape.bounds(), Rect::new(10, 10, 100, 80));
    assert_eq!(shape.color, "#FF69B4");
    assert_eq!(editor.machine().armed(), None);

    // The generated markup reads back as the same shape.
    let parsed = Dialect::Markup.parse(editor.code()).unwrap();
    assert_eq!(parsed.shapes.len(), 1);
    assert_eq!(parsed.shapes[0].id, shape.id);
    assert_eq!(parsed.shapes[0].bounds(), shape.bounds());

    // South-east handle, +20/+20.
    drag(&mut editor, (110.0, 90.0), (130.0, 110.0));
    let resized = editor.scene().shape(shape.id).unwrap();
    assert_eq!(resized.bounds(), Rect::new(10, 10, 120, 100));
    assert!(editor.code().contains("<size width=\"120\" height=\"100\" />"));
}

#[test]
fn resize_never_goes_below_minimum() {
    let mut editor = Editor::default();
    press(&mut editor, "o");
    drag(&mut editor, (100.0, 100.0), (200.0, 200.0));
    let id = editor.scene().shapes()[0].id;

    drag(&mut editor, (200.0, 200.0), (0.0, 0.0));
    let r = editor.scene().shape(id).unwrap().bounds();
    assert_eq!((r.x, r.y), (100, 100));
    assert_eq!((r.width, r.height), (MIN_SIZE, MIN_SIZE));
}

#[test]
fn tiny_create_drag_is_discarded() {
    let mut editor = Editor::default();
    press(&mut editor, "e");
    drag(&mut editor, (50.0, 50.0), (55.0, 80.0));
    assert!(editor.scene().is_empty());
    assert_eq!(editor.machine().armed(), None);
    assert_eq!(editor.machine().state(), &InteractionState::Idle);
}

#[test]
fn small_create_drag_is_floored() {
    let mut editor = Editor::default();
    press(&mut editor, "h");
    drag(&mut editor, (50.0, 50.0), (62.0, 65.0));
    let r = editor.scene().shapes()[0].bounds();
    assert_eq!(r, Rect::new(50, 50, MIN_SIZE, MIN_SIZE));
}

#[test]
fn dragged_entities_stay_on_canvas() {
    let mut editor = board();
    // Grab the star near its middle and throw it past the bottom right.
    drag(&mut editor, (345.0, 105.0), (2000.0, 2000.0));
    let star = editor.scene().shape(ShapeId(41)).unwrap().bounds();
    let canvas = editor.scene().canvas();
    assert_eq!(star.x, canvas.width - star.width);
    assert_eq!(star.y, canvas.height - star.height);

    let grab = (star.x as f32 + 5.0, star.y as f32 + 5.0);
    drag(&mut editor, grab, (-900.0, -900.0));
    let star = editor.scene().shape(ShapeId(41)).unwrap();
    assert_eq!((star.x, star.y), (0, 0));
}

#[test]
fn style_change_patches_only_that_element() {
    let mut editor = board();
    let before = editor.code().to_string();
    let update = ShapeStyleUpdate {
        color: Some("#00FF00".into()),
        ..ShapeStyleUpdate::default()
    };
    let event = editor.set_shape_style(ShapeId(41), update, Instant::now());
    assert_eq!(
        event,
        Some(SyncEvent::Patched {
            dialect: Dialect::Markup,
            id: EntityId::Shape(ShapeId(41)),
        })
    );

    let after = editor.code();
    assert!(after.contains("color=\"#00FF00\""));
    // Everything before the star's element is untouched.
    let star_at = before.find("<shape id=\"41\"").unwrap();
    assert_eq!(&after[..star_at], &before[..star_at]);
    assert_eq!(editor.scene().shape(ShapeId(41)).unwrap().color, "#00FF00");
}

#[test]
fn double_click_creates_and_edits_text() {
    let mut editor = Editor::default();
    let now = Instant::now();
    editor.handle_input(&InputEvent::DoubleClick { x: 300.0, y: 200.0 }, now);
    let id = editor.scene().texts()[0].id;
    assert_eq!(editor.machine().editing_text(), Some(id));

    editor.handle_input(&InputEvent::key("Backspace"), now);
    let shifted = InputEvent::Key {
        key: "H".into(),
        modifiers: Modifiers::SHIFT,
    };
    editor.handle_input(&shifted, now);
    editor.handle_input(&InputEvent::key("i"), now);
    assert!(editor.scene().text(id).unwrap().text.ends_with("Hi"));
    assert!(editor.code().contains("Hi</content>"));
}

// ─── Code → Canvas ──────────────────────────────────────────────────────

#[test]
fn loading_code_builds_the_scene() {
    let editor = board();
    let scene = editor.scene();
    assert_eq!(scene.shapes().len(), 2);
    assert_eq!(scene.texts().len(), 1);
    assert_eq!(scene.shape(ShapeId(40)).unwrap().kind, ShapeKind::RoundedRectangle);
    assert_eq!(scene.text(TextId(42)).unwrap().text, "Sprint board");
}

#[test]
fn broken_code_keeps_last_good_scene() {
    let mut editor = board();
    let shapes = editor.scene().shapes().to_vec();

    let truncated = &include_str!("fixtures/board.xml")[..200];
    let event = editor.code_edited(truncated, Instant::now());
    assert!(matches!(event, Some(SyncEvent::ParseFailed { .. })));
    assert_eq!(editor.scene().shapes(), shapes.as_slice());
    // The user's text is not overwritten while they type.
    assert_eq!(editor.code(), truncated);
    assert!(editor.sync().last_error().is_some());
}

#[test]
fn removing_an_element_drops_its_entity() {
    let mut editor = board();
    let code = editor.code().to_string();
    let start = code.find("  <shape id=\"41\"").unwrap();
    let end = code[start..].find("</shape>\n").unwrap() + start + "</shape>\n".len();
    let edited = format!("{}{}", &code[..start], &code[end..]);

    editor.code_edited(&edited, Instant::now());
    assert_eq!(editor.scene().shape(ShapeId(41)), None);
    assert!(editor.scene().shape(ShapeId(40)).is_some());
}

#[test]
fn canvas_change_while_typing_waits_for_blur() {
    let mut editor = board();
    let typed = editor.code().replace("Sprint board", "Sprint board 2");
    editor.code_edited(&typed, Instant::now());
    assert_eq!(editor.scene().text(TextId(42)).unwrap().text, "Sprint board 2");

    press(&mut editor, "Escape");
    drag(&mut editor, (100.0, 100.0), (120.0, 110.0));
    assert_eq!(editor.code(), typed);
    assert!(editor.sync().is_stale());

    let events = editor.code_blurred();
    assert_eq!(
        events.as_slice(),
        [SyncEvent::Regenerated {
            dialect: Dialect::Markup
        }]
    );
    assert!(editor.code().contains("<position x=\"60\" y=\"50\" />"));
}

#[test]
fn debounced_edit_applies_on_tick() {
    let config = EditorConfig::default().with_debounce(0, 300);
    let mut editor = Editor::new(config);
    let t0 = Instant::now();
    assert_eq!(editor.code_edited(include_str!("fixtures/board.xml"), t0), None);
    assert!(editor.scene().is_empty());

    assert!(editor.tick(t0 + Duration::from_millis(100)).is_empty());
    let events = editor.tick(t0 + Duration::from_millis(300));
    assert_eq!(
        events.as_slice(),
        [SyncEvent::SceneReplaced {
            dialect: Dialect::Markup
        }]
    );
    assert_eq!(editor.scene().shapes().len(), 2);
}

#[test]
fn blur_applies_debounced_edit() {
    let mut editor = Editor::new(EditorConfig::default().with_debounce(0, 300));
    editor.code_edited(include_str!("fixtures/board.xml"), Instant::now());
    assert!(editor.scene().is_empty());

    let events = editor.code_blurred();
    assert_eq!(
        events.as_slice(),
        [SyncEvent::SceneReplaced {
            dialect: Dialect::Markup
        }]
    );
    assert_eq!(editor.scene().shapes().len(), 2);
    assert_eq!(editor.sync().next_deadline(), None);
}

// ─── Dialects ───────────────────────────────────────────────────────────

#[test]
fn one_dialect_is_active_at_a_time() {
    let mut editor = board();
    let events = editor.switch_dialect(Dialect::Stylesheet);
    assert_eq!(
        events.as_slice(),
        [SyncEvent::Regenerated {
            dialect: Dialect::Stylesheet
        }]
    );
    assert_eq!(editor.dialect(), Dialect::Stylesheet);
    assert!(!editor.code().contains("<scene>"));

    // Edits are read in the active dialect only.
    let markup = include_str!("fixtures/board.xml");
    let event = editor.code_edited(markup, Instant::now());
    assert!(matches!(event, Some(SyncEvent::ParseFailed { .. })));
    assert_eq!(editor.scene().shapes().len(), 2);

    let css = Dialect::Stylesheet.generate(editor.scene());
    editor.code_edited(&css.replace("#FFD700", "#123456"), Instant::now());
    assert_eq!(editor.scene().shape(ShapeId(41)).unwrap().color, "#123456");

    editor.code_blurred();
    editor.switch_dialect(Dialect::Component);
    let parsed = Dialect::Component.parse(editor.code()).unwrap();
    assert_eq!(parsed.shapes.len(), 2);
    assert_eq!(parsed.texts.len(), 1);
}

#[test]
fn switching_dialect_keeps_debounced_edit() {
    let mut editor = Editor::new(EditorConfig::default().with_debounce(0, 300));
    editor.code_edited(include_str!("fixtures/board.xml"), Instant::now());
    assert!(editor.scene().is_empty());

    let events = editor.switch_dialect(Dialect::Stylesheet);
    assert_eq!(
        events.as_slice(),
        [
            SyncEvent::SceneReplaced {
                dialect: Dialect::Markup
            },
            SyncEvent::Regenerated {
                dialect: Dialect::Stylesheet
            },
        ]
    );
    assert_eq!(editor.scene().shapes().len(), 2);
    assert!(editor.code().contains(".shape-41 {"));
    assert_eq!(editor.sync().next_deadline(), None);
}
