//! Value types for the canvas scene: shapes, text boxes and groups.
//!
//! Everything here is plain data. Invariant enforcement (size floor,
//! clamping, z-order) lives in the scene store; styling lives in the
//! resolver. Geometry is integer canvas-local pixels.

use crate::id::{EntityId, GroupId, ShapeId, TextId};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ─── Constants ───────────────────────────────────────────────────────────

/// Minimum width/height of any entity at rest.
pub const MIN_SIZE: i32 = 20;

/// A draw gesture smaller than this on either axis is discarded.
pub const CREATE_THRESHOLD: i32 = 10;

/// Fill used for freshly drawn shapes.
pub const DEFAULT_SHAPE_COLOR: &str = "#FF69B4";

/// Ink used for freshly added text boxes.
pub const DEFAULT_TEXT_COLOR: &str = "#333333";

pub const DEFAULT_FONT_FAMILY: &str = "Arial";
pub const DEFAULT_FONT_SIZE: u32 = 16;
pub const DEFAULT_TEXT_CONTENT: &str = "Text";

/// Side of a shape placed without a drag gesture or read without a size.
pub const DEFAULT_SHAPE_SIZE: i32 = 100;

/// Corner radius a rounded rectangle gets when the user never set one.
pub const ROUNDED_RADIUS: u32 = 10;

// ─── Geometry ────────────────────────────────────────────────────────────

/// Canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: i32,
    pub height: i32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Axis-aligned box in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalize a drag from `(x0, y0)` to `(x1, y1)` into a positive box.
    pub fn from_corners(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            x: x0.min(x1),
            y: y0.min(y1),
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    /// AABB overlap test. Touching edges count as intersecting so a marquee
    /// dragged exactly to an edge still picks the entity up.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}

// ─── Shape kinds ─────────────────────────────────────────────────────────

/// Which way a triangle points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TriangleDirection {
    #[default]
    Up,
    Down,
    Left,
    Right,
}

impl TriangleDirection {
    pub const ALL: [TriangleDirection; 4] = [
        TriangleDirection::Up,
        TriangleDirection::Down,
        TriangleDirection::Left,
        TriangleDirection::Right,
    ];
}

/// The geometric type of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Rectangle,
    RoundedRectangle,
    Circle,
    Ellipse,
    Parallelogram,
    Triangle(TriangleDirection),
    Diamond,
    Hexagon,
    Pentagon,
    Star,
    Image,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 14] = [
        ShapeKind::Rectangle,
        ShapeKind::RoundedRectangle,
        ShapeKind::Circle,
        ShapeKind::Ellipse,
        ShapeKind::Parallelogram,
        ShapeKind::Triangle(TriangleDirection::Up),
        ShapeKind::Triangle(TriangleDirection::Down),
        ShapeKind::Triangle(TriangleDirection::Left),
        ShapeKind::Triangle(TriangleDirection::Right),
        ShapeKind::Diamond,
        ShapeKind::Hexagon,
        ShapeKind::Pentagon,
        ShapeKind::Star,
        ShapeKind::Image,
    ];

    /// The `type` tag written into code.
    pub fn tag(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::RoundedRectangle => "rounded-rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Parallelogram => "parallelogram",
            ShapeKind::Triangle(TriangleDirection::Up) => "triangle",
            ShapeKind::Triangle(TriangleDirection::Down) => "triangle-down",
            ShapeKind::Triangle(TriangleDirection::Left) => "triangle-left",
            ShapeKind::Triangle(TriangleDirection::Right) => "triangle-right",
            ShapeKind::Diamond => "diamond",
            ShapeKind::Hexagon => "hexagon",
            ShapeKind::Pentagon => "pentagon",
            ShapeKind::Star => "star",
            ShapeKind::Image => "image",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        ShapeKind::ALL.iter().copied().find(|k| k.tag() == tag)
    }

    /// Rendered through a fixed-point polygon instead of a styled box.
    pub fn is_polygon(self) -> bool {
        matches!(
            self,
            ShapeKind::Triangle(_)
                | ShapeKind::Diamond
                | ShapeKind::Hexagon
                | ShapeKind::Pentagon
                | ShapeKind::Star
        )
    }

    pub fn is_box_model(self) -> bool {
        !self.is_polygon()
    }

    /// Rectangle family: the only kinds that honor a user-set radius.
    pub fn accepts_border_radius(self) -> bool {
        matches!(self, ShapeKind::Rectangle | ShapeKind::RoundedRectangle)
    }

    /// Radius used when the user has not set one, for kinds that accept one.
    pub fn default_border_radius(self) -> Option<u32> {
        match self {
            ShapeKind::Rectangle => Some(0),
            ShapeKind::RoundedRectangle => Some(ROUNDED_RADIUS),
            _ => None,
        }
    }
}

// ─── Effects ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShadowKind {
    #[default]
    None,
    Outer,
    Inner,
}

impl ShadowKind {
    pub fn tag(self) -> &'static str {
        match self {
            ShadowKind::None => "none",
            ShadowKind::Outer => "outer",
            ShadowKind::Inner => "inner",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "none" => Some(ShadowKind::None),
            "outer" => Some(ShadowKind::Outer),
            "inner" => Some(ShadowKind::Inner),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shadow {
    pub kind: ShadowKind,
    pub color: String,
    pub blur_radius: u32,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            kind: ShadowKind::Outer,
            color: "rgba(0,0,0,0.3)".into(),
            blur_radius: 10,
            offset_x: 5,
            offset_y: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Glow {
    pub enabled: bool,
    pub color: String,
    pub blur_radius: u32,
}

impl Default for Glow {
    fn default() -> Self {
        Self {
            enabled: true,
            color: "#00FFFF".into(),
            blur_radius: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: String,
    pub width: u32,
}

// ─── Shape ───────────────────────────────────────────────────────────────

/// A geometric shape on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Fill color. For triangles this is still the fill, even where a dialect
    /// encodes it as a border color.
    pub color: String,
    pub z_index: i32,
    /// User-set corner radius (rectangle family only). `None` means the
    /// kind's default.
    pub border_radius: Option<u32>,
    pub opacity: Option<f32>,
    pub shadow: Option<Shadow>,
    pub glow: Option<Glow>,
    pub stroke: Option<Stroke>,
    /// Embedded image reference (data URL or path) for `Image` shapes.
    pub image_data: Option<String>,
}

impl Shape {
    /// A new shape with a fresh id and default styling.
    pub fn new(kind: ShapeKind, bounds: Rect) -> Self {
        Self::with_id(ShapeId::next(), kind, bounds)
    }

    pub fn with_id(id: ShapeId, kind: ShapeKind, bounds: Rect) -> Self {
        Self {
            id,
            kind,
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            color: DEFAULT_SHAPE_COLOR.into(),
            z_index: 0,
            border_radius: None,
            opacity: None,
            shadow: None,
            glow: None,
            stroke: None,
            image_data: None,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn set_bounds(&mut self, r: Rect) {
        self.x = r.x;
        self.y = r.y;
        self.width = r.width;
        self.height = r.height;
    }

    /// Set a user radius. Ignored for kinds without a radius; a value equal to
    /// the kind's default is stored as `None` so equal scenes compare equal.
    pub fn set_border_radius(&mut self, radius: Option<u32>) {
        self.border_radius = match (radius, self.kind.default_border_radius()) {
            (Some(r), Some(default)) if r != default => Some(r),
            _ => None,
        };
    }

    /// The radius actually rendered for rectangle-family kinds.
    pub fn effective_border_radius(&self) -> Option<u32> {
        self.kind
            .default_border_radius()
            .map(|default| self.border_radius.unwrap_or(default))
    }
}

/// Keep opacity in `[0, 1]` with two decimals so it prints and re-reads exactly.
pub fn normalize_opacity(opacity: f32) -> f32 {
    (opacity.clamp(0.0, 1.0) * 100.0).round() / 100.0
}

// ─── Text ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    pub fn tag(self) -> &'static str {
        match self {
            FontWeight::Normal => "normal",
            FontWeight::Bold => "bold",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "normal" | "400" => Some(FontWeight::Normal),
            "bold" | "700" => Some(FontWeight::Bold),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl FontStyle {
    pub fn tag(self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "normal" => Some(FontStyle::Normal),
            "italic" => Some(FontStyle::Italic),
            _ => None,
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn tag(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "left" => Some(TextAlign::Left),
            "center" => Some(TextAlign::Center),
            "right" => Some(TextAlign::Right),
            _ => None,
        }
    }
}

/// A free-floating text box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    pub id: TextId,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub text: String,
    pub font_size: u32,
    pub color: String,
    pub font_family: String,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub text_align: TextAlign,
    pub z_index: i32,
}

impl Text {
    /// A new text box at `(x, y)` with default content and styling.
    pub fn new(x: i32, y: i32) -> Self {
        Self::with_id(TextId::next(), Rect::new(x, y, 150, 40))
    }

    pub fn with_id(id: TextId, bounds: Rect) -> Self {
        Self {
            id,
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            text: DEFAULT_TEXT_CONTENT.into(),
            font_size: DEFAULT_FONT_SIZE,
            color: DEFAULT_TEXT_COLOR.into(),
            font_family: DEFAULT_FONT_FAMILY.into(),
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            text_align: TextAlign::Left,
            z_index: 0,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn set_bounds(&mut self, r: Rect) {
        self.x = r.x;
        self.y = r.y;
        self.width = r.width;
        self.height = r.height;
    }
}

// ─── Group ───────────────────────────────────────────────────────────────

/// A weak aggregation of shapes and texts. Members are referenced, not owned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub shape_ids: SmallVec<[ShapeId; 4]>,
    pub text_ids: SmallVec<[TextId; 4]>,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub z_index: i32,
}

impl Group {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn contains(&self, member: EntityId) -> bool {
        match member {
            EntityId::Shape(id) => self.shape_ids.contains(&id),
            EntityId::Text(id) => self.text_ids.contains(&id),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shape_ids.is_empty() && self.text_ids.is_empty()
    }

    pub fn members(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.shape_ids
            .iter()
            .map(|id| EntityId::Shape(*id))
            .chain(self.text_ids.iter().map(|id| EntityId::Text(*id)))
    }
}

// ─── Parsed scene ────────────────────────────────────────────────────────

/// The entities a dialect parser recovers from code. Groups and selection
/// are not encoded by any dialect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedScene {
    pub shapes: Vec<Shape>,
    pub texts: Vec<Text>,
}

impl ParsedScene {
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.texts.is_empty()
    }
}
