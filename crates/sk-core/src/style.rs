//! Style resolver: `Shape`/`Text` → renderable style descriptor.
//!
//! This is the single source of truth for how style fields turn into visual
//! properties. Renderers and both CSS-flavoured generators consume it, and
//! the shared declaration codec in `parser::declarations` inverts it.

use crate::emitter::{css_quote, format_num};
use crate::model::*;
use std::fmt;

/// A CSS `(property, value)` pair in kebab-case.
pub type Declaration = (&'static str, String);

/// Horizontal skew applied to parallelograms.
pub const PARALLELOGRAM_SKEW_DEG: i32 = -20;

// ─── Descriptor types ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fill {
    Solid(String),
    /// Image painted over the base color. `src` is unset until an image is
    /// attached.
    Image { src: Option<String>, color: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outline {
    pub color: String,
    pub width: u32,
}

impl fmt::Display for Outline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px solid {}", self.width, self.color)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderRadius {
    Zero,
    Px(u32),
    Percent(u32),
}

impl fmt::Display for BorderRadius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BorderRadius::Zero => f.write_str("0"),
            BorderRadius::Px(n) => write!(f, "{n}px"),
            BorderRadius::Percent(n) => write!(f, "{n}%"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Geometry {
    /// Styled box with optional rounding and horizontal skew (degrees).
    Box {
        radius: Option<BorderRadius>,
        skew_x: Option<i32>,
    },
    /// Fixed-point polygon in percent of the bounding box.
    Polygon(&'static [(u8, u8)]),
}

/// One layer of a shadow list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowLayer {
    pub inset: bool,
    pub offset_x: i32,
    pub offset_y: i32,
    pub blur: u32,
    pub color: String,
}

impl ShadowLayer {
    fn glow(glow: &Glow) -> Self {
        Self {
            inset: false,
            offset_x: 0,
            offset_y: 0,
            blur: glow.blur_radius,
            color: glow.color.clone(),
        }
    }

    /// `drop-shadow(...)` filter function form. Never inset.
    pub fn to_drop_shadow(&self) -> String {
        format!(
            "drop-shadow({}px {}px {}px {})",
            self.offset_x, self.offset_y, self.blur, self.color
        )
    }
}

impl fmt::Display for ShadowLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inset {
            f.write_str("inset ")?;
        }
        write!(
            f,
            "{}px {}px {}px {}",
            self.offset_x, self.offset_y, self.blur, self.color
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effects {
    None,
    /// Box shapes: layered `box-shadow`, glow last.
    BoxShadow(Vec<ShadowLayer>),
    /// Polygon shapes: `drop-shadow` filter chain, glow last.
    DropShadow(Vec<ShadowLayer>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub fill: Fill,
    pub outline: Option<Outline>,
    pub geometry: Geometry,
    pub effects: Effects,
    pub opacity: Option<f32>,
}

// ─── Polygon tables ──────────────────────────────────────────────────────

const TRIANGLE_UP: &[(u8, u8)] = &[(50, 0), (100, 100), (0, 100)];
const TRIANGLE_DOWN: &[(u8, u8)] = &[(0, 0), (100, 0), (50, 100)];
const TRIANGLE_LEFT: &[(u8, u8)] = &[(100, 0), (100, 100), (0, 50)];
const TRIANGLE_RIGHT: &[(u8, u8)] = &[(0, 0), (100, 50), (0, 100)];
const DIAMOND: &[(u8, u8)] = &[(50, 0), (100, 50), (50, 100), (0, 50)];
const HEXAGON: &[(u8, u8)] = &[(25, 0), (75, 0), (100, 50), (75, 100), (25, 100), (0, 50)];
const PENTAGON: &[(u8, u8)] = &[(50, 0), (100, 38), (82, 100), (18, 100), (0, 38)];
const STAR: &[(u8, u8)] = &[
    (50, 0),
    (61, 35),
    (98, 35),
    (68, 57),
    (79, 91),
    (50, 70),
    (21, 91),
    (32, 57),
    (2, 35),
    (39, 35),
];

/// Percent polygon for a polygon kind; `None` for box-model kinds.
pub fn polygon_points(kind: ShapeKind) -> Option<&'static [(u8, u8)]> {
    match kind {
        ShapeKind::Triangle(TriangleDirection::Up) => Some(TRIANGLE_UP),
        ShapeKind::Triangle(TriangleDirection::Down) => Some(TRIANGLE_DOWN),
        ShapeKind::Triangle(TriangleDirection::Left) => Some(TRIANGLE_LEFT),
        ShapeKind::Triangle(TriangleDirection::Right) => Some(TRIANGLE_RIGHT),
        ShapeKind::Diamond => Some(DIAMOND),
        ShapeKind::Hexagon => Some(HEXAGON),
        ShapeKind::Pentagon => Some(PENTAGON),
        ShapeKind::Star => Some(STAR),
        _ => None,
    }
}

/// Inverse of [`polygon_points`].
pub fn kind_for_polygon(points: &[(u8, u8)]) -> Option<ShapeKind> {
    ShapeKind::ALL
        .iter()
        .copied()
        .find(|k| polygon_points(*k) == Some(points))
}

/// `polygon(50% 0%, ...)` as used by `clip-path`.
pub fn clip_path(points: &[(u8, u8)]) -> String {
    let pts: Vec<String> = points.iter().map(|(x, y)| format!("{x}% {y}%")).collect();
    format!("polygon({})", pts.join(", "))
}

// ─── Resolution ──────────────────────────────────────────────────────────

pub fn resolve(shape: &Shape) -> ResolvedStyle {
    let fill = match shape.kind {
        ShapeKind::Image => Fill::Image {
            src: shape.image_data.clone(),
            color: shape.color.clone(),
        },
        _ => Fill::Solid(shape.color.clone()),
    };

    let geometry = match polygon_points(shape.kind) {
        Some(points) => Geometry::Polygon(points),
        None => box_geometry(shape),
    };

    ResolvedStyle {
        fill,
        outline: shape.stroke.as_ref().map(|s| Outline {
            color: s.color.clone(),
            width: s.width,
        }),
        geometry,
        effects: effects(shape),
        opacity: shape.opacity,
    }
}

fn box_geometry(shape: &Shape) -> Geometry {
    let radius = match shape.kind {
        ShapeKind::Rectangle | ShapeKind::RoundedRectangle => {
            match shape.effective_border_radius().unwrap_or(0) {
                0 => Some(BorderRadius::Zero),
                n => Some(BorderRadius::Px(n)),
            }
        }
        ShapeKind::Circle | ShapeKind::Ellipse => Some(BorderRadius::Percent(50)),
        ShapeKind::Image => Some(BorderRadius::Zero),
        _ => None,
    };
    let skew_x = (shape.kind == ShapeKind::Parallelogram).then_some(PARALLELOGRAM_SKEW_DEG);
    Geometry::Box { radius, skew_x }
}

/// Compose shadow and glow for the shape's rendering family. Polygons cannot
/// show an inner shadow, so it is dropped there.
fn effects(shape: &Shape) -> Effects {
    let polygon = shape.kind.is_polygon();
    let mut layers = Vec::new();
    if let Some(shadow) = &shape.shadow {
        let inset = match shadow.kind {
            ShadowKind::None => None,
            ShadowKind::Outer => Some(false),
            ShadowKind::Inner if polygon => {
                log::trace!("inner shadow ignored on polygon {:?}", shape.id);
                None
            }
            ShadowKind::Inner => Some(true),
        };
        if let Some(inset) = inset {
            layers.push(ShadowLayer {
                inset,
                offset_x: shadow.offset_x,
                offset_y: shadow.offset_y,
                blur: shadow.blur_radius,
                color: shadow.color.clone(),
            });
        }
    }
    if let Some(glow) = shape.glow.as_ref().filter(|g| g.enabled) {
        layers.push(ShadowLayer::glow(glow));
    }
    match (layers.is_empty(), polygon) {
        (true, _) => Effects::None,
        (false, true) => Effects::DropShadow(layers),
        (false, false) => Effects::BoxShadow(layers),
    }
}

// ─── Declarations ────────────────────────────────────────────────────────

/// The resolved style of a shape as ordered CSS declarations, excluding
/// position and size.
pub fn declarations(shape: &Shape) -> Vec<Declaration> {
    let style = resolve(shape);
    let mut out = Vec::new();

    match &style.fill {
        Fill::Solid(color) => out.push(("background-color", color.clone())),
        Fill::Image { src, color } => {
            out.push(("background-color", color.clone()));
            let image = match src {
                Some(src) => format!("url({})", css_quote(src)),
                None => "none".into(),
            };
            out.push(("background-image", image));
            out.push(("background-size", "cover".into()));
        }
    }

    match &style.geometry {
        Geometry::Box { radius, skew_x } => {
            if let Some(radius) = radius {
                out.push(("border-radius", radius.to_string()));
            }
            if let Some(deg) = skew_x {
                out.push(("transform", format!("skewX({deg}deg)")));
            }
        }
        Geometry::Polygon(points) => out.push(("clip-path", clip_path(points))),
    }

    push_finish(&mut out, &style, Some("border"));
    out
}

/// Effects, opacity and outline, shared by every rendering of a shape.
/// `stroke_property` is `border` for boxes and `outline` for border-trick
/// triangles whose borders are already spoken for; `None` leaves the stroke
/// to the caller.
pub fn push_finish(
    out: &mut Vec<Declaration>,
    style: &ResolvedStyle,
    stroke_property: Option<&'static str>,
) {
    match &style.effects {
        Effects::None => {}
        Effects::BoxShadow(layers) => {
            let list: Vec<String> = layers.iter().map(ToString::to_string).collect();
            out.push(("box-shadow", list.join(", ")));
        }
        Effects::DropShadow(layers) => {
            let list: Vec<String> = layers.iter().map(ShadowLayer::to_drop_shadow).collect();
            out.push(("filter", list.join(" ")));
        }
    }
    if let Some(opacity) = style.opacity {
        out.push(("opacity", format_num(opacity)));
    }
    if let (Some(outline), Some(prop)) = (&style.outline, stroke_property) {
        out.push((prop, outline.to_string()));
    }
}

// ─── Triangle border trick ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub fn property(self) -> &'static str {
        match self {
            Side::Top => "border-top",
            Side::Right => "border-right",
            Side::Bottom => "border-bottom",
            Side::Left => "border-left",
        }
    }

    pub fn from_property(prop: &str) -> Option<Self> {
        match prop {
            "border-top" => Some(Side::Top),
            "border-right" => Some(Side::Right),
            "border-bottom" => Some(Side::Bottom),
            "border-left" => Some(Side::Left),
            _ => None,
        }
    }
}

/// One border of a zero-sized box. `color: None` is transparent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorderSide {
    pub side: Side,
    pub width: i32,
    pub color: Option<String>,
}

impl BorderSide {
    pub fn value(&self) -> String {
        format!(
            "{}px solid {}",
            self.width,
            self.color.as_deref().unwrap_or("transparent")
        )
    }
}

/// The three borders that draw a triangle on a zero-sized box: two
/// transparent halves and the colored side opposite the tip.
pub fn triangle_borders(shape: &Shape) -> Option<[BorderSide; 3]> {
    let ShapeKind::Triangle(direction) = shape.kind else {
        return None;
    };
    let (w, h) = (shape.width, shape.height);
    let clear = |side, width| BorderSide {
        side,
        width,
        color: None,
    };
    let solid = |side, width| BorderSide {
        side,
        width,
        color: Some(shape.color.clone()),
    };
    Some(match direction {
        TriangleDirection::Up => [
            clear(Side::Left, w / 2),
            clear(Side::Right, w - w / 2),
            solid(Side::Bottom, h),
        ],
        TriangleDirection::Down => [
            clear(Side::Left, w / 2),
            clear(Side::Right, w - w / 2),
            solid(Side::Top, h),
        ],
        TriangleDirection::Left => [
            clear(Side::Top, h / 2),
            clear(Side::Bottom, h - h / 2),
            solid(Side::Right, w),
        ],
        TriangleDirection::Right => [
            clear(Side::Top, h / 2),
            clear(Side::Bottom, h - h / 2),
            solid(Side::Left, w),
        ],
    })
}

/// Stylesheet declarations for a triangle drawn with the border trick,
/// excluding position and size.
pub fn triangle_declarations(shape: &Shape) -> Vec<Declaration> {
    let mut out = Vec::new();
    if let Some(borders) = triangle_borders(shape) {
        for border in &borders {
            out.push((border.side.property(), border.value()));
        }
    }
    push_finish(&mut out, &resolve(shape), Some("outline"));
    out
}

/// Three vertices of a triangle scaled to `w × h`, for vector output.
pub fn triangle_points(direction: TriangleDirection, w: i32, h: i32) -> [(i32, i32); 3] {
    match direction {
        TriangleDirection::Up => [(w / 2, 0), (w, h), (0, h)],
        TriangleDirection::Down => [(0, 0), (w, 0), (w / 2, h)],
        TriangleDirection::Left => [(w, 0), (w, h), (0, h / 2)],
        TriangleDirection::Right => [(0, 0), (w, h / 2), (0, h)],
    }
}

// ─── Text ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTextStyle {
    pub font_size: u32,
    pub color: String,
    pub font_family: String,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub text_align: TextAlign,
}

impl ResolvedTextStyle {
    pub fn declarations(&self) -> Vec<Declaration> {
        vec![
            ("font-size", format!("{}px", self.font_size)),
            ("color", self.color.clone()),
            ("font-family", self.font_family.clone()),
            ("font-weight", self.font_weight.tag().into()),
            ("font-style", self.font_style.tag().into()),
            ("text-align", self.text_align.tag().into()),
        ]
    }
}

pub fn resolve_text(text: &Text) -> ResolvedTextStyle {
    ResolvedTextStyle {
        font_size: text.font_size,
        color: text.color.clone(),
        font_family: text.font_family.clone(),
        font_weight: text.font_weight,
        font_style: text.font_style,
        text_align: text.text_align,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ShapeId;
    use pretty_assertions::assert_eq;

    fn shape(kind: ShapeKind) -> Shape {
        Shape::with_id(ShapeId(1), kind, Rect::new(0, 0, 100, 80))
    }

    fn decl<'a>(decls: &'a [Declaration], prop: &str) -> Option<&'a str> {
        decls
            .iter()
            .find(|(p, _)| *p == prop)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn box_radii_per_kind() {
        let radius = |kind| match resolve(&shape(kind)).geometry {
            Geometry::Box { radius, .. } => radius.map(|r| r.to_string()),
            Geometry::Polygon(_) => None,
        };
        assert_eq!(radius(ShapeKind::Rectangle).as_deref(), Some("0"));
        assert_eq!(radius(ShapeKind::RoundedRectangle).as_deref(), Some("10px"));
        assert_eq!(radius(ShapeKind::Circle).as_deref(), Some("50%"));
        assert_eq!(radius(ShapeKind::Ellipse).as_deref(), Some("50%"));
        assert_eq!(radius(ShapeKind::Parallelogram), None);
        assert_eq!(radius(ShapeKind::Image).as_deref(), Some("0"));
    }

    #[test]
    fn explicit_radius_overrides_default() {
        let mut s = shape(ShapeKind::Rectangle);
        s.set_border_radius(Some(6));
        assert_eq!(decl(&declarations(&s), "border-radius"), Some("6px"));

        let mut r = shape(ShapeKind::RoundedRectangle);
        r.set_border_radius(Some(0));
        assert_eq!(decl(&declarations(&r), "border-radius"), Some("0"));
    }

    #[test]
    fn parallelogram_skews() {
        let d = declarations(&shape(ShapeKind::Parallelogram));
        assert_eq!(decl(&d, "transform"), Some("skewX(-20deg)"));
        assert_eq!(decl(&d, "border-radius"), None);
    }

    #[test]
    fn polygon_shadow_drops_inner_and_keeps_glow() {
        let mut s = shape(ShapeKind::Star);
        s.shadow = Some(Shadow {
            kind: ShadowKind::Inner,
            ..Shadow::default()
        });
        s.glow = Some(Glow::default());
        let d = declarations(&s);
        assert_eq!(decl(&d, "filter"), Some("drop-shadow(0px 0px 15px #00FFFF)"));
        assert_eq!(decl(&d, "box-shadow"), None);
    }

    #[test]
    fn box_shadow_layers_inner_then_glow() {
        let mut s = shape(ShapeKind::Rectangle);
        s.shadow = Some(Shadow {
            kind: ShadowKind::Inner,
            color: "#000".into(),
            blur_radius: 4,
            offset_x: 2,
            offset_y: -3,
        });
        s.glow = Some(Glow::default());
        assert_eq!(
            decl(&declarations(&s), "box-shadow"),
            Some("inset 2px -3px 4px #000, 0px 0px 15px #00FFFF")
        );
    }

    #[test]
    fn opacity_and_stroke_apply_to_both_families() {
        for kind in [ShapeKind::Rectangle, ShapeKind::Hexagon] {
            let mut s = shape(kind);
            s.opacity = Some(0.5);
            s.stroke = Some(Stroke {
                color: "#112233".into(),
                width: 3,
            });
            let d = declarations(&s);
            assert_eq!(decl(&d, "opacity"), Some("0.5"));
            assert_eq!(decl(&d, "border"), Some("3px solid #112233"));
        }
    }

    #[test]
    fn triangle_border_trick() {
        let s = shape(ShapeKind::Triangle(TriangleDirection::Up));
        let d = triangle_declarations(&s);
        assert_eq!(
            d,
            vec![
                ("border-left", "50px solid transparent".to_string()),
                ("border-right", "50px solid transparent".to_string()),
                ("border-bottom", "80px solid #FF69B4".to_string()),
            ]
        );
    }

    #[test]
    fn triangle_points_scale() {
        assert_eq!(
            triangle_points(TriangleDirection::Left, 100, 80),
            [(100, 0), (100, 80), (0, 40)]
        );
    }

    #[test]
    fn polygon_lookup_is_invertible() {
        for kind in ShapeKind::ALL {
            if let Some(points) = polygon_points(kind) {
                assert_eq!(kind_for_polygon(points), Some(kind));
            }
        }
        assert_eq!(clip_path(DIAMOND), "polygon(50% 0%, 100% 50%, 50% 100%, 0% 50%)");
    }
}
