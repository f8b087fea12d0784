//! Integration tests for store policies that span several modules: z-order
//! renumbering and parser behavior on damaged input.

use pretty_assertions::assert_eq;
use sk_core::*;

const GALLERY: &str = include_str!("fixtures/gallery.xml");

fn shape_at(id: u64, x: i32, z: i32) -> Shape {
    let mut shape = Shape::with_id(ShapeId(id), ShapeKind::Rectangle, Rect::new(x, 0, 40, 40));
    shape.z_index = z;
    shape
}

fn scene_with(shapes: Vec<Shape>, texts: Vec<Text>) -> Scene {
    Scene::from_parsed(ParsedScene { shapes, texts }, CanvasSize::default())
}

fn z_values(scene: &Scene) -> Vec<i32> {
    scene
        .stack()
        .into_iter()
        .filter_map(|id| scene.z_index(id))
        .collect()
}

// ─── Z-order ────────────────────────────────────────────────────────────

#[test]
fn bring_forward_over_a_tie() {
    // Both shapes read from code with z 0: array order breaks the tie.
    let mut scene = scene_with(vec![shape_at(1, 0, 0), shape_at(2, 50, 0)], vec![]);
    assert_eq!(
        scene.stack(),
        vec![EntityId::from(ShapeId(1)), EntityId::from(ShapeId(2))]
    );

    let applied = scene.apply(SceneMutation::Reorder {
        id: ShapeId(1).into(),
        op: ZOrder::BringForward,
    });
    assert!(applied.content_changed);
    assert_eq!(
        scene.stack(),
        vec![EntityId::from(ShapeId(2)), EntityId::from(ShapeId(1))]
    );
    assert_eq!(scene.z_index(ShapeId(1).into()), Some(1));
    assert_eq!(scene.z_index(ShapeId(2).into()), Some(0));
}

#[test]
fn forward_from_the_top_is_a_no_op() {
    let mut scene = scene_with(vec![shape_at(1, 0, 0), shape_at(2, 50, 7)], vec![]);
    let applied = scene.apply(SceneMutation::Reorder {
        id: ShapeId(2).into(),
        op: ZOrder::BringForward,
    });
    assert!(!applied.content_changed);
    assert_eq!(z_values(&scene), vec![0, 7]);
}

#[test]
fn reorder_sequences_keep_a_dense_unique_stack() {
    let mut text = Text::with_id(TextId(9), Rect::new(0, 100, 150, 40));
    text.z_index = 2;
    let mut scene = scene_with(
        vec![
            shape_at(1, 0, 0),
            shape_at(2, 50, 2),
            shape_at(3, 100, 2),
            shape_at(4, 150, 5),
        ],
        vec![text],
    );
    let ids = scene.stack();
    let ops = [
        ZOrder::BringForward,
        ZOrder::SendBackward,
        ZOrder::BringToFront,
        ZOrder::SendToBack,
    ];

    // A fixed linear congruential walk covers every (entity, op) pairing
    // many times over without a random source.
    let mut seed: u32 = 17;
    for _ in 0..200 {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let id = ids[(seed >> 8) as usize % ids.len()];
        let op = ops[(seed >> 20) as usize % ops.len()];
        let before = scene.stack();
        let applied = scene.apply(SceneMutation::Reorder { id, op });
        let after = scene.stack();

        let pos = after.iter().position(|e| *e == id).unwrap();
        match op {
            ZOrder::BringToFront => assert_eq!(pos, after.len() - 1),
            ZOrder::SendToBack => assert_eq!(pos, 0),
            ZOrder::BringForward | ZOrder::SendBackward => {
                let old = before.iter().position(|e| *e == id).unwrap();
                assert!(pos.abs_diff(old) <= 1);
            }
        }
        if applied.content_changed {
            let expected: Vec<i32> = (0..after.len() as i32).collect();
            assert_eq!(z_values(&scene), expected);
        } else {
            assert_eq!(before, after);
        }
    }
}

#[test]
fn new_entities_go_on_top() {
    let mut scene = scene_with(vec![shape_at(1, 0, 4)], vec![]);
    let shape = Shape::with_id(ShapeId(2), ShapeKind::Circle, Rect::new(0, 0, 30, 30));
    scene.apply(SceneMutation::AddShape(shape));
    assert_eq!(scene.z_index(ShapeId(2).into()), Some(5));
    assert_eq!(Scene::new(CanvasSize::default()).next_z(), 0);
}

// ─── Damaged input ──────────────────────────────────────────────────────

#[test]
fn truncated_documents_never_yield_extra_entities() {
    let scene = scene_with(
        Dialect::Markup.parse(GALLERY).unwrap().shapes,
        Dialect::Markup.parse(GALLERY).unwrap().texts,
    );
    let total = scene.shapes().len() + scene.texts().len();

    for dialect in Dialect::ALL {
        let code = dialect.generate(&scene);
        for (cut, _) in code.char_indices().step_by(7) {
            if let Ok(parsed) = dialect.parse(&code[..cut]) {
                assert!(
                    parsed.shapes.len() + parsed.texts.len() <= total,
                    "{dialect} invented entities at byte {cut}"
                );
            }
        }
    }
}

#[test]
fn unterminated_constructs_fail_whole_parse() {
    let cases = [
        (Dialect::Markup, "<scene>\n  <shape id=\"1\" type=\"circle\">\n"),
        (Dialect::Markup, "<scene><shape id=\"1\"></text></scene>"),
        (Dialect::Stylesheet, ".shape-1 { left: 10px; top: 10px;"),
        (
            Dialect::Component,
            "export default function Canvas() { return ( <div><div data-shape-id=\"1\" style={{ left: 1 }} </div> ); }",
        ),
    ];
    for (dialect, code) in cases {
        match dialect.parse(code) {
            Err(err) => assert_eq!(err.dialect(), dialect),
            Ok(parsed) => panic!("{dialect} accepted {code:?}: {parsed:?}"),
        }
    }
}

#[test]
fn failed_parse_leaves_the_scene_alone() {
    let mut scene = scene_with(vec![shape_at(1, 0, 0)], vec![]);
    let before = Dialect::Markup.generate(&scene);

    if let Ok(parsed) = Dialect::Markup.parse("<scene><shape id=\"2\">") {
        scene.replace_entities(parsed);
    }
    assert_eq!(Dialect::Markup.generate(&scene), before);
}
