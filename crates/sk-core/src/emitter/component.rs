//! Component-source dialect emitter.
//!
//! A single default-exported function returning a relative wrapper `<div>`
//! with one absolutely positioned leaf per entity. Style objects use the
//! camelCased names of the resolver's declarations.

use super::{indent, js_quote, xml_escape};
use crate::model::*;
use crate::scene::Scene;
use crate::style::{self, Declaration};
use std::fmt::Write;

/// Properties written as bare JS numbers (pixel units implied).
const NUMERIC_PROPS: &[&str] = &[
    "left",
    "top",
    "width",
    "height",
    "z-index",
    "opacity",
    "font-size",
];

pub const EMPTY_COMPONENT_NOTE: &str = "{/* Empty canvas: no shapes or text yet */}";

pub fn emit_component(scene: &Scene) -> String {
    let canvas = scene.canvas();
    let mut out = String::with_capacity(256 * (scene.shapes().len() + scene.texts().len() + 1));
    out.push_str("export default function Canvas() {\n");
    out.push_str("  return (\n");
    indent(&mut out, 2);
    let _ = writeln!(
        out,
        "<div style={{{{ position: 'relative', width: {}, height: {} }}}}>",
        canvas.width, canvas.height
    );

    if scene.is_empty() {
        indent(&mut out, 3);
        out.push_str(EMPTY_COMPONENT_NOTE);
        out.push('\n');
    }
    for shape in scene.shapes() {
        emit_shape(&mut out, shape, 3);
    }
    for text in scene.texts() {
        emit_text(&mut out, text, 3);
    }

    indent(&mut out, 2);
    out.push_str("</div>\n");
    out.push_str("  );\n");
    out.push_str("}\n");
    out
}

/// `background-color` → `backgroundColor`.
pub fn camel_case(prop: &str) -> String {
    let mut out = String::with_capacity(prop.len());
    let mut upper = false;
    for c in prop.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn js_value(prop: &str, value: &str) -> String {
    if NUMERIC_PROPS.contains(&prop) {
        value.strip_suffix("px").unwrap_or(value).to_string()
    } else {
        js_quote(value)
    }
}

/// `{{ a: 1, b: 'x' }}` for a `style=` attribute.
fn style_attr(decls: &[Declaration]) -> String {
    let fields: Vec<String> = decls
        .iter()
        .map(|(prop, value)| format!("{}: {}", camel_case(prop), js_value(prop, value)))
        .collect();
    format!("{{{{ {} }}}}", fields.join(", "))
}

fn placement(r: Rect, z_index: i32) -> Vec<Declaration> {
    vec![
        ("position", "absolute".into()),
        ("left", r.x.to_string()),
        ("top", r.y.to_string()),
        ("width", r.width.to_string()),
        ("height", r.height.to_string()),
        ("z-index", z_index.to_string()),
    ]
}

fn emit_shape(out: &mut String, shape: &Shape, depth: usize) {
    indent(out, depth);
    match shape.kind {
        ShapeKind::Triangle(direction) => {
            let mut decls: Vec<Declaration> = vec![
                ("position", "absolute".into()),
                ("left", shape.x.to_string()),
                ("top", shape.y.to_string()),
                ("z-index", shape.z_index.to_string()),
            ];
            style::push_finish(&mut decls, &style::resolve(shape), None);
            let _ = writeln!(
                out,
                "<svg data-shape-id=\"{}\" width=\"{}\" height=\"{}\" style={}>",
                shape.id,
                shape.width,
                shape.height,
                style_attr(&decls)
            );

            let points: Vec<String> = style::triangle_points(direction, shape.width, shape.height)
                .iter()
                .map(|(x, y)| format!("{x},{y}"))
                .collect();
            indent(out, depth + 1);
            let _ = write!(
                out,
                "<polygon points=\"{}\" fill=\"{}\"",
                points.join(" "),
                xml_escape(&shape.color)
            );
            if let Some(stroke) = &shape.stroke {
                let _ = write!(
                    out,
                    " stroke=\"{}\" strokeWidth=\"{}\"",
                    xml_escape(&stroke.color),
                    stroke.width
                );
            }
            out.push_str(" />\n");
            indent(out, depth);
            out.push_str("</svg>\n");
        }
        ShapeKind::Image => {
            let mut decls = placement(shape.bounds(), shape.z_index);
            decls.extend(
                style::declarations(shape)
                    .into_iter()
                    .filter(|(p, _)| !matches!(*p, "background-image" | "background-size")),
            );
            let _ = writeln!(
                out,
                "<img data-shape-id=\"{}\" src=\"{}\" style={} />",
                shape.id,
                xml_escape(shape.image_data.as_deref().unwrap_or("")),
                style_attr(&decls)
            );
        }
        _ => {
            let mut decls = placement(shape.bounds(), shape.z_index);
            decls.extend(style::declarations(shape));
            let _ = writeln!(
                out,
                "<div data-shape-id=\"{}\" style={} />",
                shape.id,
                style_attr(&decls)
            );
        }
    }
}

fn emit_text(out: &mut String, text: &Text, depth: usize) {
    let mut decls = placement(text.bounds(), text.z_index);
    decls.extend(style::resolve_text(text).declarations());
    indent(out, depth);
    let _ = writeln!(
        out,
        "<div data-text-id=\"{}\" style={}>{{{}}}</div>",
        text.id,
        style_attr(&decls),
        serde_json::Value::String(text.text.clone())
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{ShapeId, TextId};
    use crate::scene::SceneMutation;
    use pretty_assertions::assert_eq;

    #[test]
    fn camel_casing() {
        assert_eq!(camel_case("z-index"), "zIndex");
        assert_eq!(camel_case("background-color"), "backgroundColor");
        assert_eq!(camel_case("filter"), "filter");
    }

    #[test]
    fn emits_leaves_in_array_order() {
        let mut scene = Scene::new(CanvasSize::default());
        scene.apply(SceneMutation::AddShape(Shape::with_id(
            ShapeId(1),
            ShapeKind::Ellipse,
            Rect::new(5, 5, 80, 40),
        )));
        scene.apply(SceneMutation::AddShape(Shape::with_id(
            ShapeId(2),
            ShapeKind::Triangle(TriangleDirection::Up),
            Rect::new(100, 100, 60, 40),
        )));
        let mut text = Text::with_id(TextId(3), Rect::new(0, 300, 150, 40));
        text.text = "say \"hi\"".into();
        scene.apply(SceneMutation::AddText(text));

        let expected = r##"export default function Canvas() {
  return (
    <div style={{ position: 'relative', width: 800, height: 600 }}>
      <div data-shape-id="1" style={{ position: 'absolute', left: 5, top: 5, width: 80, height: 40, zIndex: 0, backgroundColor: '#FF69B4', borderRadius: '50%' }} />
      <svg data-shape-id="2" width="60" height="40" style={{ position: 'absolute', left: 100, top: 100, zIndex: 1 }}>
        <polygon points="30,0 60,40 0,40" fill="#FF69B4" />
      </svg>
      <div data-text-id="3" style={{ position: 'absolute', left: 0, top: 300, width: 150, height: 40, zIndex: 2, fontSize: 16, color: '#333333', fontFamily: 'Arial', fontWeight: 'normal', fontStyle: 'normal', textAlign: 'left' }}>{"say \"hi\""}</div>
    </div>
  );
}
"##;
        assert_eq!(emit_component(&scene), expected);
    }

    #[test]
    fn empty_scene_keeps_wrapper() {
        let scene = Scene::new(CanvasSize::default());
        let out = emit_component(&scene);
        assert!(out.contains(EMPTY_COMPONENT_NOTE));
        assert!(out.starts_with("export default function Canvas() {"));
    }
}
