//! Stylesheet dialect emitter: one rule block per entity.
//!
//! Triangles are drawn with the zero-size border trick, so their block
//! carries `width: 0; height: 0;` and the real size lives in the borders.

use super::css_quote;
use crate::model::*;
use crate::scene::Scene;
use crate::style::{self, Declaration};
use std::fmt::Write;

pub const EMPTY_STYLESHEET: &str = "/* Empty canvas: no shapes or text yet */";

pub fn emit_stylesheet(scene: &Scene) -> String {
    if scene.is_empty() {
        return format!("{EMPTY_STYLESHEET}\n");
    }
    let mut blocks: Vec<String> = Vec::with_capacity(scene.shapes().len() + scene.texts().len());
    for shape in scene.shapes() {
        blocks.push(rule(&format!(".shape-{}", shape.id), &shape_declarations(shape)));
    }
    for text in scene.texts() {
        blocks.push(rule(&format!(".text-{}", text.id), &text_declarations(text)));
    }
    blocks.join("\n")
}

fn rule(selector: &str, decls: &[Declaration]) -> String {
    let mut out = String::with_capacity(32 * decls.len());
    let _ = writeln!(out, "{selector} {{");
    for (prop, value) in decls {
        let _ = writeln!(out, "  {prop}: {value};");
    }
    out.push_str("}\n");
    out
}

fn placement(r: Rect, z_index: i32, sized: bool) -> Vec<Declaration> {
    let (width, height) = if sized {
        (format!("{}px", r.width), format!("{}px", r.height))
    } else {
        ("0".into(), "0".into())
    };
    vec![
        ("position", "absolute".into()),
        ("left", format!("{}px", r.x)),
        ("top", format!("{}px", r.y)),
        ("width", width),
        ("height", height),
        ("z-index", z_index.to_string()),
    ]
}

pub(crate) fn shape_declarations(shape: &Shape) -> Vec<Declaration> {
    let triangle = matches!(shape.kind, ShapeKind::Triangle(_));
    let mut decls = placement(shape.bounds(), shape.z_index, !triangle);
    if triangle {
        decls.extend(style::triangle_declarations(shape));
    } else {
        decls.extend(style::declarations(shape));
    }
    decls
}

pub(crate) fn text_declarations(text: &Text) -> Vec<Declaration> {
    let mut decls = placement(text.bounds(), text.z_index, true);
    decls.extend(style::resolve_text(text).declarations());
    decls.push(("content", css_quote(&text.text)));
    decls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{ShapeId, TextId};
    use crate::scene::SceneMutation;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_scene_emits_placeholder() {
        let scene = Scene::new(CanvasSize::default());
        assert_eq!(emit_stylesheet(&scene), format!("{EMPTY_STYLESHEET}\n"));
    }

    #[test]
    fn rectangle_and_text_blocks() {
        let mut scene = Scene::new(CanvasSize::default());
        let shape = Shape::with_id(ShapeId(1), ShapeKind::Rectangle, Rect::new(10, 10, 100, 80));
        scene.apply(SceneMutation::AddShape(shape));
        let mut text = Text::with_id(TextId(2), Rect::new(20, 200, 150, 40));
        text.text = "Hi \"there\"".into();
        scene.apply(SceneMutation::AddText(text));

        let expected = r#".shape-1 {
  position: absolute;
  left: 10px;
  top: 10px;
  width: 100px;
  height: 80px;
  z-index: 0;
  background-color: #FF69B4;
  border-radius: 0;
}

.text-2 {
  position: absolute;
  left: 20px;
  top: 200px;
  width: 150px;
  height: 40px;
  z-index: 1;
  font-size: 16px;
  color: #333333;
  font-family: Arial;
  font-weight: normal;
  font-style: normal;
  text-align: left;
  content: "Hi \"there\"";
}
"#;
        assert_eq!(emit_stylesheet(&scene), expected);
    }

    #[test]
    fn triangle_uses_border_trick() {
        let mut shape = Shape::with_id(
            ShapeId(4),
            ShapeKind::Triangle(TriangleDirection::Down),
            Rect::new(0, 0, 60, 40),
        );
        shape.stroke = Some(Stroke {
            color: "#222".into(),
            width: 1,
        });
        let decls = shape_declarations(&shape);
        let props: Vec<&str> = decls.iter().map(|(p, _)| *p).collect();
        assert_eq!(
            props,
            vec![
                "position",
                "left",
                "top",
                "width",
                "height",
                "z-index",
                "border-left",
                "border-right",
                "border-top",
                "outline",
            ]
        );
        assert_eq!(decls[3].1, "0");
        assert_eq!(decls[8].1, "40px solid #FF69B4");
    }
}
