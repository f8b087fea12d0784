//! Declaration codec shared by the stylesheet and component parsers.
//!
//! Both dialects flatten a shape into CSS declarations through
//! [`crate::style`]; this module is the inverse, so shape-type inference is
//! identical for the two.

use super::{css_unquote, parse_field, parse_length, split_top_level};
use crate::dialect::Dialect;
use crate::error::{ParseError, ParseResult};
use crate::id::{ShapeId, TextId};
use crate::model::*;
use crate::scene::normalize_shape;
use crate::style::{self, Side};

/// Declarations of one rule block or style object, kebab-case names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Declarations {
    entries: Vec<(String, String)>,
}

impl Declarations {
    pub fn push(&mut self, prop: impl Into<String>, value: impl Into<String>) {
        self.entries.push((prop.into(), value.into()));
    }

    /// Last declaration of `prop` wins, as in CSS.
    pub fn get(&self, prop: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(p, _)| p == prop)
            .map(|(_, v)| v.as_str())
    }
}

// ─── Shapes ─────────────────────────────────────────────────────────────

/// Rebuild a shape from its declarations.
pub(crate) fn shape_from_declarations(
    dialect: Dialect,
    id: ShapeId,
    decls: &Declarations,
) -> ParseResult<Shape> {
    let length = |prop: &str, default: i32| match decls.get(prop) {
        Some(v) => parse_length(dialect, prop, v),
        None => Ok(default),
    };
    let x = length("left", 0)?;
    let y = length("top", 0)?;

    let mut shape = match triangle_from_borders(dialect, decls)? {
        Some((direction, color, width, height)) => {
            let mut shape = Shape::with_id(
                id,
                ShapeKind::Triangle(direction),
                Rect::new(x, y, width, height),
            );
            shape.color = color;
            shape.stroke = decls
                .get("outline")
                .map(|v| parse_stroke(dialect, "outline", v))
                .transpose()?;
            shape
        }
        None => {
            let width = length("width", DEFAULT_SHAPE_SIZE)?;
            let height = length("height", DEFAULT_SHAPE_SIZE)?;
            let kind = infer_box_or_polygon(dialect, decls, width == height)?;
            let mut shape = Shape::with_id(id, kind, Rect::new(x, y, width, height));
            if let Some(color) = decls.get("background-color") {
                shape.color = color.to_string();
            }
            if kind.accepts_border_radius()
                && let Some(px) = decls.get("border-radius").filter(|r| !r.ends_with('%'))
            {
                let radius = parse_length(dialect, "border-radius", px)?;
                shape.set_border_radius(Some(radius.max(0) as u32));
            }
            if kind == ShapeKind::Image {
                shape.image_data = decls
                    .get("background-image")
                    .and_then(|v| parse_url(dialect, v).transpose())
                    .transpose()?;
            }
            shape.stroke = decls
                .get("border")
                .map(|v| parse_stroke(dialect, "border", v))
                .transpose()?;
            shape
        }
    };

    shape.z_index = match decls.get("z-index") {
        Some(v) => parse_field(dialect, "z-index", v)?,
        None => 0,
    };
    apply_effects(dialect, &mut shape, decls)?;
    normalize_shape(&mut shape);
    Ok(shape)
}

/// Shape type for a non-triangle: polygon clip, skew, background image,
/// then border radius, in that order.
fn infer_box_or_polygon(dialect: Dialect, decls: &Declarations, square: bool) -> ParseResult<ShapeKind> {
    if let Some(clip) = decls.get("clip-path") {
        let points = parse_clip_path(clip)
            .ok_or_else(|| ParseError::invalid(dialect, "clip-path", clip))?;
        return style::kind_for_polygon(&points)
            .ok_or_else(|| ParseError::invalid(dialect, "clip-path", clip));
    }
    if decls.get("transform").is_some_and(|t| t.contains("skewX")) {
        return Ok(ShapeKind::Parallelogram);
    }
    if decls.get("background-image").is_some() {
        return Ok(ShapeKind::Image);
    }
    match decls.get("border-radius").map(str::trim) {
        Some("50%") if square => Ok(ShapeKind::Circle),
        Some("50%") => Ok(ShapeKind::Ellipse),
        Some(r) if !r.ends_with('%') && parse_length(dialect, "border-radius", r)? > 0 => {
            Ok(ShapeKind::RoundedRectangle)
        }
        _ => Ok(ShapeKind::Rectangle),
    }
}

fn parse_clip_path(value: &str) -> Option<Vec<(u8, u8)>> {
    let inner = value.trim().strip_prefix("polygon(")?.strip_suffix(')')?;
    inner
        .split(',')
        .map(|pair| {
            let mut coords = pair.split_whitespace().map(|c| c.strip_suffix('%')?.parse::<u8>().ok());
            let x = coords.next()??;
            let y = coords.next()??;
            coords.next().is_none().then_some((x, y))
        })
        .collect()
}

/// `url("...")` → `Some(src)`, `none` → `None`.
fn parse_url(dialect: Dialect, value: &str) -> ParseResult<Option<String>> {
    let v = value.trim();
    if v == "none" {
        return Ok(None);
    }
    let inner = v
        .strip_prefix("url(")
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| ParseError::invalid(dialect, "background-image", value))?;
    Ok(Some(css_unquote(inner)))
}

/// `2px solid #000` → stroke.
fn parse_stroke(dialect: Dialect, field: &str, value: &str) -> ParseResult<Stroke> {
    let (width, color) = parse_border(dialect, field, value)?;
    Ok(Stroke {
        color,
        width: width.max(0) as u32,
    })
}

fn parse_border(dialect: Dialect, field: &str, value: &str) -> ParseResult<(i32, String)> {
    let parts = split_top_level(value, char::is_whitespace);
    match parts.as_slice() {
        [width, "solid", color @ ..] if !color.is_empty() => {
            Ok((parse_length(dialect, field, width)?, color.join(" ")))
        }
        _ => Err(ParseError::invalid(dialect, field, value)),
    }
}

/// Detect the border trick on a zero-sized box: two opposite sides frame
/// the tip and the one side without an opposite carries the fill. Returns
/// the direction, fill and recovered size.
fn triangle_from_borders(
    dialect: Dialect,
    decls: &Declarations,
) -> ParseResult<Option<(TriangleDirection, String, i32, i32)>> {
    let zero_sized = ["width", "height"]
        .iter()
        .all(|prop| decls.get(prop).is_some_and(|v| v.trim_end_matches("px") == "0"));
    if !zero_sized {
        return Ok(None);
    }
    let mut sides: Vec<(Side, i32, String)> = Vec::new();
    for side in [Side::Top, Side::Right, Side::Bottom, Side::Left] {
        if let Some(value) = decls.get(side.property()) {
            let (width, color) = parse_border(dialect, side.property(), value)?;
            sides.push((side, width, color));
        }
    }
    let has = |wanted: Side| sides.iter().any(|(s, _, _)| *s == wanted);
    let width_of = |wanted: Side| {
        sides
            .iter()
            .find(|(s, _, _)| *s == wanted)
            .map_or(0, |(_, w, _)| *w)
    };
    let mut lone = sides.iter().filter(|(s, _, _)| !has(opposite(*s)));
    let (Some((base, extent, color)), None) = (lone.next().cloned(), lone.next()) else {
        return Ok(None);
    };
    if sides.len() != 3 {
        return Ok(None);
    }
    let across_x = width_of(Side::Left) + width_of(Side::Right);
    let across_y = width_of(Side::Top) + width_of(Side::Bottom);
    Ok(Some(match base {
        Side::Bottom => (TriangleDirection::Up, color, across_x, extent),
        Side::Top => (TriangleDirection::Down, color, across_x, extent),
        Side::Right => (TriangleDirection::Left, color, extent, across_y),
        Side::Left => (TriangleDirection::Right, color, extent, across_y),
    }))
}

fn opposite(side: Side) -> Side {
    match side {
        Side::Top => Side::Bottom,
        Side::Bottom => Side::Top,
        Side::Left => Side::Right,
        Side::Right => Side::Left,
    }
}

// ─── Effects ────────────────────────────────────────────────────────────

/// Read opacity and the shadow/glow layers. Polygons carry them in a
/// `drop-shadow` filter chain, boxes in `box-shadow`. A trailing
/// zero-offset outer layer is the glow.
pub(crate) fn apply_effects(dialect: Dialect, shape: &mut Shape, decls: &Declarations) -> ParseResult<()> {
    if let Some(v) = decls.get("opacity") {
        shape.opacity = Some(parse_field(dialect, "opacity", v)?);
    }

    let mut layers = if shape.kind.is_polygon() {
        match decls.get("filter") {
            Some(v) => parse_drop_shadows(dialect, v)?,
            None => Vec::new(),
        }
    } else {
        match decls.get("box-shadow") {
            Some(v) => split_top_level(v, |c| c == ',')
                .into_iter()
                .map(|layer| parse_layer(dialect, "box-shadow", layer))
                .collect::<ParseResult<Vec<_>>>()?,
            None => Vec::new(),
        }
    };

    if layers
        .last()
        .is_some_and(|l| !l.inset && l.offset_x == 0 && l.offset_y == 0)
    {
        if let Some(glow) = layers.pop() {
            shape.glow = Some(Glow {
                enabled: true,
                color: glow.color,
                blur_radius: glow.blur,
            });
        }
    }
    if let Some(layer) = layers.into_iter().next() {
        shape.shadow = Some(Shadow {
            kind: if layer.inset {
                ShadowKind::Inner
            } else {
                ShadowKind::Outer
            },
            color: layer.color,
            blur_radius: layer.blur,
            offset_x: layer.offset_x,
            offset_y: layer.offset_y,
        });
    }
    Ok(())
}

fn parse_layer(dialect: Dialect, field: &str, layer: &str) -> ParseResult<style::ShadowLayer> {
    let mut tokens = split_top_level(layer.trim(), char::is_whitespace);
    let inset = tokens.first() == Some(&"inset");
    if inset {
        tokens.remove(0);
    }
    match tokens.as_slice() {
        [x, y, blur, color @ ..] if !color.is_empty() => Ok(style::ShadowLayer {
            inset,
            offset_x: parse_length(dialect, field, x)?,
            offset_y: parse_length(dialect, field, y)?,
            blur: parse_length(dialect, field, blur)?.max(0) as u32,
            color: color.join(" "),
        }),
        _ => Err(ParseError::invalid(dialect, field, layer)),
    }
}

fn parse_drop_shadows(dialect: Dialect, value: &str) -> ParseResult<Vec<style::ShadowLayer>> {
    split_top_level(value, char::is_whitespace)
        .into_iter()
        .filter_map(|f| f.strip_prefix("drop-shadow("))
        .map(|f| {
            let args = f
                .strip_suffix(')')
                .ok_or_else(|| ParseError::invalid(dialect, "filter", value))?;
            parse_layer(dialect, "filter", args)
        })
        .collect()
}

// ─── Texts ──────────────────────────────────────────────────────────────

pub(crate) fn text_from_declarations(
    dialect: Dialect,
    id: TextId,
    decls: &Declarations,
    content: String,
) -> ParseResult<Text> {
    let length = |prop: &str, default: i32| match decls.get(prop) {
        Some(v) => parse_length(dialect, prop, v),
        None => Ok(default),
    };
    let bounds = Rect::new(
        length("left", 0)?,
        length("top", 0)?,
        length("width", 150)?,
        length("height", 40)?,
    );
    let mut text = Text::with_id(id, bounds);
    text.text = content;
    text.z_index = match decls.get("z-index") {
        Some(v) => parse_field(dialect, "z-index", v)?,
        None => 0,
    };
    if let Some(size) = decls.get("font-size") {
        text.font_size = parse_length(dialect, "font-size", size)?.max(1) as u32;
    }
    if let Some(color) = decls.get("color") {
        text.color = color.to_string();
    }
    if let Some(family) = decls.get("font-family") {
        text.font_family = family.to_string();
    }
    if let Some(v) = decls.get("font-weight") {
        text.font_weight =
            FontWeight::from_tag(v).ok_or_else(|| ParseError::invalid(dialect, "font-weight", v))?;
    }
    if let Some(v) = decls.get("font-style") {
        text.font_style =
            FontStyle::from_tag(v).ok_or_else(|| ParseError::invalid(dialect, "font-style", v))?;
    }
    if let Some(v) = decls.get("text-align") {
        text.text_align =
            TextAlign::from_tag(v).ok_or_else(|| ParseError::invalid(dialect, "text-align", v))?;
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const D: Dialect = Dialect::Stylesheet;

    fn decls(pairs: &[(&str, &str)]) -> Declarations {
        let mut d = Declarations::default();
        for (p, v) in pairs {
            d.push(*p, *v);
        }
        d
    }

    fn kind_of(pairs: &[(&str, &str)]) -> ShapeKind {
        shape_from_declarations(D, ShapeId(1), &decls(pairs)).unwrap().kind
    }

    #[test]
    fn box_inference() {
        assert_eq!(kind_of(&[("width", "40px"), ("height", "40px"), ("border-radius", "50%")]), ShapeKind::Circle);
        assert_eq!(kind_of(&[("width", "60px"), ("height", "40px"), ("border-radius", "50%")]), ShapeKind::Ellipse);
        assert_eq!(kind_of(&[("border-radius", "10px")]), ShapeKind::RoundedRectangle);
        assert_eq!(kind_of(&[("border-radius", "0")]), ShapeKind::Rectangle);
        assert_eq!(kind_of(&[]), ShapeKind::Rectangle);
        assert_eq!(kind_of(&[("transform", "skewX(-20deg)")]), ShapeKind::Parallelogram);
        assert_eq!(kind_of(&[("background-image", "none")]), ShapeKind::Image);
        assert_eq!(
            kind_of(&[("clip-path", "polygon(50% 0%, 100% 50%, 50% 100%, 0% 50%)")]),
            ShapeKind::Diamond
        );
    }

    #[test]
    fn unknown_polygon_is_rejected() {
        let d = decls(&[("clip-path", "polygon(1% 2%, 3% 4%, 5% 6%)")]);
        assert!(shape_from_declarations(D, ShapeId(1), &d).is_err());
    }

    #[test]
    fn triangle_from_border_trick() {
        let d = decls(&[
            ("left", "10px"),
            ("top", "20px"),
            ("width", "0"),
            ("height", "0"),
            ("border-top", "15px solid transparent"),
            ("border-bottom", "16px solid transparent"),
            ("border-left", "40px solid #abc"),
            ("outline", "2px solid #000"),
        ]);
        let shape = shape_from_declarations(D, ShapeId(1), &d).unwrap();
        assert_eq!(shape.kind, ShapeKind::Triangle(TriangleDirection::Right));
        assert_eq!(shape.bounds(), Rect::new(10, 20, 40, 31));
        assert_eq!(shape.color, "#abc");
        assert_eq!(shape.stroke.map(|s| s.width), Some(2));
    }

    #[test]
    fn glow_is_trailing_zero_offset_layer() {
        let d = decls(&[(
            "box-shadow",
            "inset 1px 2px 3px rgba(0, 0, 0, 0.5), 0px 0px 9px #0ff",
        )]);
        let shape = shape_from_declarations(D, ShapeId(1), &d).unwrap();
        assert_eq!(shape.shadow.as_ref().map(|s| s.kind), Some(ShadowKind::Inner));
        assert_eq!(shape.shadow.as_ref().map(|s| s.color.as_str()), Some("rgba(0, 0, 0, 0.5)"));
        assert_eq!(
            shape.glow,
            Some(Glow {
                enabled: true,
                color: "#0ff".into(),
                blur_radius: 9,
            })
        );
    }

    #[test]
    fn polygon_effects_come_from_filter() {
        let d = decls(&[
            ("clip-path", "polygon(50% 0%, 100% 50%, 50% 100%, 0% 50%)"),
            ("filter", "drop-shadow(4px 4px 2px #333) drop-shadow(0px 0px 6px gold)"),
            ("opacity", "0.8"),
        ]);
        let shape = shape_from_declarations(D, ShapeId(1), &d).unwrap();
        assert_eq!(shape.shadow.map(|s| (s.kind, s.offset_x)), Some((ShadowKind::Outer, 4)));
        assert_eq!(shape.glow.map(|g| g.color), Some("gold".to_string()));
        assert_eq!(shape.opacity, Some(0.8));
    }

    #[test]
    fn bad_values_fail() {
        assert!(shape_from_declarations(D, ShapeId(1), &decls(&[("left", "abc")])).is_err());
        assert!(shape_from_declarations(D, ShapeId(1), &decls(&[("border", "thick")])).is_err());
        let t = text_from_declarations(D, TextId(2), &decls(&[("font-weight", "heavy")]), String::new());
        assert!(t.is_err());
    }
}
