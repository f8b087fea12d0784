//! Markup dialect emitter.
//!
//! ```text
//! <scene>
//!   <shape id="1" type="rectangle">
//!     <position x="10" y="10" />
//!     <size width="100" height="80" />
//!     <style color="#FF69B4" zIndex="0" borderRadius="0" />
//!   </shape>
//! </scene>
//! ```

use super::{format_num, indent, xml_escape};
use crate::model::*;
use crate::scene::Scene;
use std::fmt::Write;

/// Emitted instead of an empty `<scene>` root.
pub const EMPTY_MARKUP: &str =
    "<!-- Empty canvas: draw a shape or add text to generate markup -->";

pub fn emit_markup(scene: &Scene) -> String {
    if scene.is_empty() {
        return format!("{EMPTY_MARKUP}\n");
    }
    let mut out = String::with_capacity(256 * (scene.shapes().len() + scene.texts().len()));
    out.push_str("<scene>\n");
    for shape in scene.shapes() {
        emit_shape(&mut out, shape, 1);
    }
    for text in scene.texts() {
        emit_text(&mut out, text, 1);
    }
    out.push_str("</scene>\n");
    out
}

/// The `borderRadius` attribute: a pixel count for the rectangle family,
/// `50%` for round kinds, `0` otherwise.
fn radius_attr(shape: &Shape) -> String {
    match shape.kind {
        ShapeKind::Circle | ShapeKind::Ellipse => "50%".into(),
        _ => shape.effective_border_radius().unwrap_or(0).to_string(),
    }
}

fn write_attrs(out: &mut String, attrs: &[(&str, String)]) {
    for (name, value) in attrs {
        let _ = write!(out, " {name}=\"{}\"", xml_escape(value));
    }
}

fn emit_geometry(out: &mut String, r: Rect, depth: usize) {
    indent(out, depth);
    let _ = writeln!(out, "<position x=\"{}\" y=\"{}\" />", r.x, r.y);
    indent(out, depth);
    let _ = writeln!(out, "<size width=\"{}\" height=\"{}\" />", r.width, r.height);
}

pub(crate) fn emit_shape(out: &mut String, shape: &Shape, depth: usize) {
    indent(out, depth);
    let _ = writeln!(
        out,
        "<shape id=\"{}\" type=\"{}\">",
        shape.id,
        shape.kind.tag()
    );
    emit_geometry(out, shape.bounds(), depth + 1);

    let mut attrs = vec![
        ("color", shape.color.clone()),
        ("zIndex", shape.z_index.to_string()),
        ("borderRadius", radius_attr(shape)),
    ];
    if let Some(shadow) = shape.shadow.as_ref().filter(|s| s.kind != ShadowKind::None) {
        attrs.push(("shadowType", shadow.kind.tag().into()));
        attrs.push(("shadowColor", shadow.color.clone()));
        attrs.push(("shadowBlur", shadow.blur_radius.to_string()));
        attrs.push(("shadowOffsetX", shadow.offset_x.to_string()));
        attrs.push(("shadowOffsetY", shadow.offset_y.to_string()));
    }
    if let Some(opacity) = shape.opacity {
        attrs.push(("opacity", format_num(opacity)));
    }
    if let Some(glow) = shape.glow.as_ref().filter(|g| g.enabled) {
        attrs.push(("glowEnabled", "true".into()));
        attrs.push(("glowColor", glow.color.clone()));
        attrs.push(("glowBlur", glow.blur_radius.to_string()));
    }
    if let Some(stroke) = &shape.stroke {
        attrs.push(("strokeColor", stroke.color.clone()));
        attrs.push(("strokeWidth", stroke.width.to_string()));
    }
    if let Some(image) = &shape.image_data {
        attrs.push(("imageData", image.clone()));
    }
    indent(out, depth + 1);
    out.push_str("<style");
    write_attrs(out, &attrs);
    out.push_str(" />\n");

    indent(out, depth);
    out.push_str("</shape>\n");
}

pub(crate) fn emit_text(out: &mut String, text: &Text, depth: usize) {
    indent(out, depth);
    let _ = writeln!(out, "<text id=\"{}\">", text.id);
    emit_geometry(out, text.bounds(), depth + 1);

    indent(out, depth + 1);
    let _ = writeln!(out, "<content>{}</content>", xml_escape(&text.text));

    let attrs = [
        ("fontSize", text.font_size.to_string()),
        ("color", text.color.clone()),
        ("fontFamily", text.font_family.clone()),
        ("fontWeight", text.font_weight.tag().into()),
        ("fontStyle", text.font_style.tag().into()),
        ("textAlign", text.text_align.tag().into()),
        ("zIndex", text.z_index.to_string()),
    ];
    indent(out, depth + 1);
    out.push_str("<style");
    write_attrs(out, &attrs);
    out.push_str(" />\n");

    indent(out, depth);
    out.push_str("</text>\n");
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
        assert_eq!(emit_markup(&scene), format!("{EMPTY_MARKUP}\n"));
    }

    #[test]
    fn emits_shape_and_text() {
        let mut scene = Scene::new(CanvasSize::default());
        let shape = Shape::with_id(ShapeId(7), ShapeKind::Circle, Rect::new(10, 20, 50, 50));
        scene.apply(SceneMutation::AddShape(shape));
        let mut text = Text::with_id(TextId(8), Rect::new(0, 100, 150, 40));
        text.text = "a < b".into();
        scene.apply(SceneMutation::AddText(text));

        let expected = r##"<scene>
  <shape id="7" type="circle">
    <position x="10" y="20" />
    <size width="50" height="50" />
    <style color="#FF69B4" zIndex="0" borderRadius="50%" />
  </shape>
  <text id="8">
    <position x="0" y="100" />
    <size width="150" height="40" />
    <content>a &lt; b</content>
    <style fontSize="16" color="#333333" fontFamily="Arial" fontWeight="normal" fontStyle="normal" textAlign="left" zIndex="1" />
  </text>
</scene>
"##;
        assert_eq!(emit_markup(&scene), expected);
    }

    #[test]
    fn optional_style_attributes_in_order() {
        let mut shape = Shape::with_id(ShapeId(3), ShapeKind::Star, Rect::new(0, 0, 40, 40));
        shape.opacity = Some(0.75);
        shape.stroke = Some(Stroke {
            color: "#000".into(),
            width: 2,
        });
        shape.shadow = Some(Shadow::default());
        let mut out = String::new();
        emit_shape(&mut out, &shape, 0);
        assert!(out.contains(
            r##"<style color="#FF69B4" zIndex="0" borderRadius="0" shadowType="outer" shadowColor="rgba(0,0,0,0.3)" shadowBlur="10" shadowOffsetX="5" shadowOffsetY="5" opacity="0.75" strokeColor="#000" strokeWidth="2" />"##
        ));
    }
}
