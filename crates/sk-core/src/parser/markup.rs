//! Markup dialect parser.
//!
//! Reads the generic element tree first, then maps `<shape>` and `<text>`
//! children of the `<scene>` root onto entities.

use super::{backtrack, parse_field, parse_name, skip_block_comment, skip_ws, syntax_at, xml_unescape};
use crate::dialect::Dialect;
use crate::error::{ParseError, ParseResult};
use crate::id::{ShapeId, TextId};
use crate::model::*;
use crate::scene::normalize_shape;
use winnow::prelude::*;
use winnow::token::{take_till, take_until};

const DIALECT: Dialect = Dialect::Markup;

/// A parsed XML element with decoded attribute values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Element<'a> {
    pub name: &'a str,
    pub attrs: Vec<(&'a str, String)>,
    pub children: Vec<Element<'a>>,
    /// Concatenated, decoded character data directly inside this element.
    pub text: String,
}

impl<'a> Element<'a> {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&Element<'a>> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Parse a markup document into shapes and texts.
pub fn parse_markup(input: &str) -> ParseResult<ParsedScene> {
    let mut rest = input;
    skip_misc(&mut rest).map_err(|_| syntax_at(DIALECT, input, rest))?;
    if rest.is_empty() {
        return Ok(ParsedScene::default());
    }

    let root = parse_element
        .parse_next(&mut rest)
        .map_err(|_| syntax_at(DIALECT, input, rest))?;
    skip_misc(&mut rest).map_err(|_| syntax_at(DIALECT, input, rest))?;
    if !rest.is_empty() {
        return Err(ParseError::syntax(
            DIALECT,
            "unexpected content after the root element",
        ));
    }
    if root.name != "scene" {
        return Err(ParseError::syntax(
            DIALECT,
            format!("expected a <scene> root, found <{}>", root.name),
        ));
    }

    let mut parsed = ParsedScene::default();
    for child in &root.children {
        match child.name {
            "shape" => {
                if let Some(shape) = shape_from_element(child)? {
                    parsed.shapes.push(shape);
                }
            }
            "text" => parsed.texts.push(text_from_element(child)?),
            other => log::debug!("ignoring <{other}> in markup"),
        }
    }
    Ok(parsed)
}

// ─── Element tree ───────────────────────────────────────────────────────

/// Skip whitespace, comments, the XML prolog and doctype.
fn skip_misc(input: &mut &str) -> ModalResult<()> {
    loop {
        skip_ws(input);
        if input.starts_with("<!--") {
            if !skip_block_comment(input, "<!--", "-->") {
                return backtrack();
            }
        } else if input.starts_with("<?") {
            if !skip_block_comment(input, "<?", "?>") {
                return backtrack();
            }
        } else if input.starts_with("<!") {
            if !skip_block_comment(input, "<!", ">") {
                return backtrack();
            }
        } else {
            return Ok(());
        }
    }
}

fn parse_attr_value(input: &mut &str) -> ModalResult<String> {
    let mut quote = winnow::combinator::alt(('"', '\'')).parse_next(input)?;
    let raw: &str = take_till(0.., quote).parse_next(input)?;
    let _ = quote.parse_next(input)?;
    match xml_unescape(raw) {
        Some(v) => Ok(v),
        None => backtrack(),
    }
}

pub(crate) fn parse_element<'a>(input: &mut &'a str) -> ModalResult<Element<'a>> {
    let _ = '<'.parse_next(input)?;
    let name = parse_name.parse_next(input)?;
    let mut element = Element {
        name,
        attrs: Vec::new(),
        children: Vec::new(),
        text: String::new(),
    };

    loop {
        skip_ws(input);
        if let Some(after) = input.strip_prefix("/>") {
            *input = after;
            return Ok(element);
        }
        if let Some(after) = input.strip_prefix('>') {
            *input = after;
            break;
        }
        let key = parse_name.parse_next(input)?;
        skip_ws(input);
        let _ = '='.parse_next(input)?;
        skip_ws(input);
        let value = parse_attr_value(input)?;
        element.attrs.push((key, value));
    }

    loop {
        if input.is_empty() {
            return backtrack();
        }
        if input.starts_with("<!--") {
            if !skip_block_comment(input, "<!--", "-->") {
                return backtrack();
            }
        } else if let Some(after) = input.strip_prefix("</") {
            *input = after;
            let close = parse_name.parse_next(input)?;
            if close != name {
                return backtrack();
            }
            skip_ws(input);
            let _ = '>'.parse_next(input)?;
            return Ok(element);
        } else if input.starts_with("<![CDATA[") {
            let _ = "<![CDATA[".parse_next(input)?;
            let data: &str = take_until(0.., "]]>").parse_next(input)?;
            let _ = "]]>".parse_next(input)?;
            element.text.push_str(data);
        } else if input.starts_with('<') {
            element.children.push(parse_element(input)?);
        } else {
            let raw: &str = take_till(1.., '<').parse_next(input)?;
            match xml_unescape(raw) {
                Some(text) => element.text.push_str(&text),
                None => return backtrack(),
            }
        }
    }
}

// ─── Entity mapping ─────────────────────────────────────────────────────

fn required_id(el: &Element<'_>) -> ParseResult<u64> {
    let raw = el.attr("id").ok_or_else(|| {
        ParseError::syntax(DIALECT, format!("<{}> is missing its id attribute", el.name))
    })?;
    parse_field(DIALECT, "id", raw)
}

fn style_attr<'e>(style: Option<&'e Element<'_>>, name: &str) -> Option<&'e str> {
    style.and_then(|s| s.attr(name))
}

fn int_attr(el: Option<&Element<'_>>, name: &str, default: i32) -> ParseResult<i32> {
    match el.and_then(|e| e.attr(name)) {
        Some(v) => parse_field(DIALECT, name, v),
        None => Ok(default),
    }
}

fn uint_attr(el: Option<&Element<'_>>, name: &str, default: u32) -> ParseResult<u32> {
    match el.and_then(|e| e.attr(name)) {
        Some(v) => parse_field(DIALECT, name, v.trim().trim_end_matches("px")),
        None => Ok(default),
    }
}

fn read_bounds(el: &Element<'_>, default_w: i32, default_h: i32) -> ParseResult<Rect> {
    let position = el.child("position");
    let size = el.child("size");
    Ok(Rect::new(
        int_attr(position, "x", 0)?,
        int_attr(position, "y", 0)?,
        int_attr(size, "width", default_w)?,
        int_attr(size, "height", default_h)?,
    ))
}

/// Map a `<shape>` element. Unknown `type`s yield `Ok(None)`.
pub(crate) fn shape_from_element(el: &Element<'_>) -> ParseResult<Option<Shape>> {
    let id = required_id(el)?;
    let tag = el.attr("type").unwrap_or("rectangle");
    let Some(kind) = ShapeKind::from_tag(tag) else {
        log::debug!("ignoring shape {id} of unknown type {tag:?}");
        return Ok(None);
    };
    let bounds = read_bounds(el, DEFAULT_SHAPE_SIZE, DEFAULT_SHAPE_SIZE)?;
    let mut shape = Shape::with_id(ShapeId::adopt(id), kind, bounds);

    let style = el.child("style");
    let attr = |name| style_attr(style, name);

    if let Some(color) = attr("color") {
        shape.color = color.to_string();
    }
    shape.z_index = int_attr(style, "zIndex", 0)?;
    if kind.accepts_border_radius()
        && let Some(radius) = attr("borderRadius").filter(|r| !r.ends_with('%'))
    {
        let radius: u32 = parse_field(DIALECT, "borderRadius", radius.trim_end_matches("px"))?;
        shape.set_border_radius(Some(radius));
    }

    if let Some(tag) = attr("shadowType") {
        let kind = ShadowKind::from_tag(tag)
            .ok_or_else(|| ParseError::invalid(DIALECT, "shadowType", tag))?;
        let defaults = Shadow::default();
        shape.shadow = Some(Shadow {
            kind,
            color: attr("shadowColor").map_or(defaults.color, str::to_string),
            blur_radius: uint_attr(style, "shadowBlur", defaults.blur_radius)?,
            offset_x: int_attr(style, "shadowOffsetX", defaults.offset_x)?,
            offset_y: int_attr(style, "shadowOffsetY", defaults.offset_y)?,
        });
    }
    if let Some(opacity) = attr("opacity") {
        shape.opacity = Some(parse_field(DIALECT, "opacity", opacity)?);
    }
    if let Some(enabled) = attr("glowEnabled") {
        let enabled: bool = parse_field(DIALECT, "glowEnabled", enabled)?;
        let defaults = Glow::default();
        shape.glow = Some(Glow {
            enabled,
            color: attr("glowColor").map_or(defaults.color, str::to_string),
            blur_radius: uint_attr(style, "glowBlur", defaults.blur_radius)?,
        });
    }
    if let Some(color) = attr("strokeColor") {
        shape.stroke = Some(Stroke {
            color: color.to_string(),
            width: uint_attr(style, "strokeWidth", 1)?,
        });
    }
    if let Some(image) = attr("imageData") {
        shape.image_data = Some(image.to_string());
    }

    normalize_shape(&mut shape);
    Ok(Some(shape))
}

fn enum_attr<T>(
    style: Option<&Element<'_>>,
    name: &str,
    from_tag: fn(&str) -> Option<T>,
) -> ParseResult<Option<T>> {
    match style.and_then(|s| s.attr(name)) {
        Some(v) => from_tag(v.trim())
            .map(Some)
            .ok_or_else(|| ParseError::invalid(DIALECT, name, v)),
        None => Ok(None),
    }
}

pub(crate) fn text_from_element(el: &Element<'_>) -> ParseResult<Text> {
    let id = required_id(el)?;
    let bounds = read_bounds(el, 150, 40)?;
    let mut text = Text::with_id(TextId::adopt(id), bounds);
    if let Some(content) = el.child("content") {
        text.text = content.text.clone();
    }

    let style = el.child("style");
    text.font_size = uint_attr(style, "fontSize", DEFAULT_FONT_SIZE)?;
    if let Some(color) = style.and_then(|s| s.attr("color")) {
        text.color = color.to_string();
    }
    if let Some(family) = style.and_then(|s| s.attr("fontFamily")) {
        text.font_family = family.to_string();
    }
    if let Some(weight) = enum_attr(style, "fontWeight", FontWeight::from_tag)? {
        text.font_weight = weight;
    }
    if let Some(font_style) = enum_attr(style, "fontStyle", FontStyle::from_tag)? {
        text.font_style = font_style;
    }
    if let Some(align) = enum_attr(style, "textAlign", TextAlign::from_tag)? {
        text.text_align = align;
    }
    text.z_index = int_attr(style, "zIndex", 0)?;
    Ok(text)
}
