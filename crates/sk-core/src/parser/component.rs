//! Component-source dialect parser.
//!
//! Accepts the single default-exported function the emitter writes, parses
//! the returned JSX tree, and maps leaves carrying `data-shape-id` or
//! `data-text-id` onto entities. Style objects go through the same
//! declaration codec as the stylesheet dialect.

use super::declarations::{Declarations, apply_effects, shape_from_declarations, text_from_declarations};
use super::{backtrack, parse_field, parse_length, skip_block_comment, skip_ws, syntax_at, xml_unescape};
use crate::dialect::Dialect;
use crate::error::{ParseError, ParseResult};
use crate::id::{ShapeId, TextId};
use crate::model::*;
use crate::scene::normalize_shape;
use crate::style::triangle_points;
use winnow::ascii::multispace1;
use winnow::combinator::alt;
use winnow::prelude::*;
use winnow::token::{literal, take_till, take_while};

const DIALECT: Dialect = Dialect::Component;

// ─── Syntax tree ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum JsValue {
    Str(String),
    Num(String),
    Ident(String),
    Object(Vec<(String, JsValue)>),
}

impl JsValue {
    /// The value as it would appear in a CSS declaration.
    fn as_css(&self) -> Option<String> {
        match self {
            JsValue::Str(s) | JsValue::Num(s) | JsValue::Ident(s) => Some(s.clone()),
            JsValue::Object(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Attr {
    Str(String),
    Expr(JsValue),
    Flag,
}

#[derive(Debug, Clone, PartialEq)]
enum Child<'a> {
    Element(Node<'a>),
    Expr(JsValue),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
struct Node<'a> {
    name: &'a str,
    attrs: Vec<(&'a str, Attr)>,
    children: Vec<Child<'a>>,
}

impl<'a> Node<'a> {
    fn attr(&self, name: &str) -> Option<&Attr> {
        self.attrs.iter().find(|(k, _)| *k == name).map(|(_, v)| v)
    }

    /// A string-valued or numeric attribute as text.
    fn attr_text(&self, name: &str) -> Option<String> {
        match self.attr(name)? {
            Attr::Str(s) => Some(s.clone()),
            Attr::Expr(v) => v.as_css(),
            Attr::Flag => None,
        }
    }

    fn elements(&self) -> impl Iterator<Item = &Node<'a>> {
        self.children.iter().filter_map(|c| match c {
            Child::Element(n) => Some(n),
            _ => None,
        })
    }
}

// ─── Entry point ────────────────────────────────────────────────────────

pub fn parse_component(input: &str) -> ParseResult<ParsedScene> {
    let mut rest = input;
    skip_preamble(&mut rest).map_err(|_| syntax_at(DIALECT, input, rest))?;
    if rest.is_empty() {
        return Ok(ParsedScene::default());
    }
    let root = parse_function
        .parse_next(&mut rest)
        .map_err(|_| syntax_at(DIALECT, input, rest))?;
    skip_trivia(&mut rest).map_err(|_| syntax_at(DIALECT, input, rest))?;
    if !rest.is_empty() {
        return Err(ParseError::syntax(
            DIALECT,
            "unexpected content after the component function",
        ));
    }

    let mut parsed = ParsedScene::default();
    for node in root.elements() {
        if let Some(raw) = node.attr_text("data-shape-id") {
            let id = ShapeId::adopt(parse_field(DIALECT, "data-shape-id", &raw)?);
            parsed.shapes.push(shape_from_node(id, node)?);
        } else if let Some(raw) = node.attr_text("data-text-id") {
            let id = TextId::adopt(parse_field(DIALECT, "data-text-id", &raw)?);
            parsed.texts.push(text_from_node(id, node)?);
        } else {
            log::debug!("ignoring <{}> without an entity id", node.name);
        }
    }
    Ok(parsed)
}

// ─── Entity mapping ─────────────────────────────────────────────────────

fn kebab_case(prop: &str) -> String {
    let mut out = String::with_capacity(prop.len() + 4);
    for c in prop.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn style_declarations(node: &Node<'_>) -> ParseResult<Declarations> {
    let mut decls = Declarations::default();
    match node.attr("style") {
        None => {}
        Some(Attr::Expr(JsValue::Object(fields))) => {
            for (key, value) in fields {
                let value = value
                    .as_css()
                    .ok_or_else(|| ParseError::invalid(DIALECT, key.as_str(), "{...}"))?;
                decls.push(kebab_case(key), value);
            }
        }
        Some(_) => {
            return Err(ParseError::syntax(
                DIALECT,
                format!("style of <{}> must be an object literal", node.name),
            ));
        }
    }
    Ok(decls)
}

fn shape_from_node(id: ShapeId, node: &Node<'_>) -> ParseResult<Shape> {
    let decls = style_declarations(node)?;
    match node.name {
        "svg" => triangle_from_svg(id, node, &decls),
        "img" => {
            let mut shape = shape_from_declarations(DIALECT, id, &decls)?;
            shape.kind = ShapeKind::Image;
            shape.image_data = node.attr_text("src").filter(|s| !s.is_empty());
            normalize_shape(&mut shape);
            Ok(shape)
        }
        _ => shape_from_declarations(DIALECT, id, &decls),
    }
}

fn triangle_from_svg(id: ShapeId, node: &Node<'_>, decls: &Declarations) -> ParseResult<Shape> {
    let length = |name: &str, value: Option<String>, default: i32| match value {
        Some(v) => parse_length(DIALECT, name, &v),
        None => Ok(default),
    };
    let width = length("width", node.attr_text("width"), DEFAULT_SHAPE_SIZE)?;
    let height = length("height", node.attr_text("height"), DEFAULT_SHAPE_SIZE)?;
    let x = length("left", decls.get("left").map(str::to_string), 0)?;
    let y = length("top", decls.get("top").map(str::to_string), 0)?;

    let polygon = node
        .elements()
        .find(|n| n.name == "polygon")
        .ok_or_else(|| ParseError::syntax(DIALECT, "<svg> shape without a <polygon>"))?;
    let raw_points = polygon.attr_text("points").unwrap_or_default();
    let points = parse_points(&raw_points)
        .ok_or_else(|| ParseError::invalid(DIALECT, "points", raw_points.as_str()))?;
    let direction = TriangleDirection::ALL
        .into_iter()
        .find(|d| triangle_points(*d, width, height) == points)
        .ok_or_else(|| ParseError::invalid(DIALECT, "points", raw_points.as_str()))?;

    let mut shape = Shape::with_id(
        id,
        ShapeKind::Triangle(direction),
        Rect::new(x, y, width, height),
    );
    if let Some(fill) = polygon.attr_text("fill") {
        shape.color = fill;
    }
    if let Some(color) = polygon.attr_text("stroke") {
        let width = match polygon.attr_text("strokeWidth") {
            Some(w) => parse_field(DIALECT, "strokeWidth", &w)?,
            None => 1,
        };
        shape.stroke = Some(Stroke { color, width });
    }
    shape.z_index = match decls.get("z-index") {
        Some(v) => parse_field(DIALECT, "zIndex", v)?,
        None => 0,
    };
    apply_effects(DIALECT, &mut shape, decls)?;
    normalize_shape(&mut shape);
    Ok(shape)
}

fn parse_points(raw: &str) -> Option<[(i32, i32); 3]> {
    let mut pairs = raw.split_whitespace().map(|pair| -> Option<(i32, i32)> {
        let (x, y) = pair.split_once(',')?;
        Some((x.parse().ok()?, y.parse().ok()?))
    });
    let points = [pairs.next()??, pairs.next()??, pairs.next()??];
    pairs.next().is_none().then_some(points)
}

fn text_from_node(id: TextId, node: &Node<'_>) -> ParseResult<Text> {
    let decls = style_declarations(node)?;
    let mut content = String::new();
    for child in &node.children {
        match child {
            Child::Expr(JsValue::Str(s)) | Child::Text(s) => content.push_str(s),
            Child::Expr(other) => {
                return Err(ParseError::invalid(
                    DIALECT,
                    "text content",
                    format!("{other:?}"),
                ));
            }
            Child::Element(_) => {}
        }
    }
    text_from_declarations(DIALECT, id, &decls, content)
}

// ─── Low-level parsers ──────────────────────────────────────────────────

/// Whitespace plus `//` and `/* */` comments.
fn skip_trivia(input: &mut &str) -> ModalResult<()> {
    loop {
        skip_ws(input);
        if input.starts_with("//") {
            let _ = take_till::<_, _, winnow::error::ContextError>(0.., '\n').parse_next(input);
        } else if input.starts_with("/*") {
            if !skip_block_comment(input, "/*", "*/") {
                return backtrack();
            }
        } else {
            return Ok(());
        }
    }
}

/// Trivia and any leading `import ...;` statements.
fn skip_preamble(input: &mut &str) -> ModalResult<()> {
    loop {
        skip_trivia(input)?;
        if !input.starts_with("import ") {
            return Ok(());
        }
        let _ = take_till::<_, _, winnow::error::ContextError>(0.., |c: char| c == ';' || c == '\n')
            .parse_next(input);
        if let Some(after) = input.strip_prefix(';') {
            *input = after;
        }
    }
}

fn keyword(input: &mut &str, word: &'static str) -> ModalResult<()> {
    skip_trivia(input)?;
    let _ = literal(word).parse_next(input)?;
    Ok(())
}

fn parse_ident<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_' || c == '$').parse_next(input)
}

/// `export default function Name() { return ( <jsx/> ); }`
fn parse_function<'a>(input: &mut &'a str) -> ModalResult<Node<'a>> {
    keyword(input, "export")?;
    let _ = multispace1.parse_next(input)?;
    let _ = "default".parse_next(input)?;
    let _ = multispace1.parse_next(input)?;
    let _ = "function".parse_next(input)?;
    let _ = multispace1.parse_next(input)?;
    let _ = parse_ident.parse_next(input)?;
    keyword(input, "(")?;
    keyword(input, ")")?;
    keyword(input, "{")?;
    keyword(input, "return")?;
    skip_trivia(input)?;
    let parenthesized = input.starts_with('(');
    if parenthesized {
        keyword(input, "(")?;
    }
    skip_trivia(input)?;
    let root = parse_node(input)?;
    if parenthesized {
        keyword(input, ")")?;
    }
    skip_trivia(input)?;
    if let Some(after) = input.strip_prefix(';') {
        *input = after;
    }
    keyword(input, "}")?;
    Ok(root)
}

fn parse_node<'a>(input: &mut &'a str) -> ModalResult<Node<'a>> {
    let _ = '<'.parse_next(input)?;
    let name: &str = take_while(1.., |c: char| c.is_alphanumeric() || c == '.' || c == '_')
        .parse_next(input)?;
    let mut node = Node {
        name,
        attrs: Vec::new(),
        children: Vec::new(),
    };

    loop {
        skip_trivia(input)?;
        if let Some(after) = input.strip_prefix("/>") {
            *input = after;
            return Ok(node);
        }
        if let Some(after) = input.strip_prefix('>') {
            *input = after;
            break;
        }
        let key: &str = take_while(1.., |c: char| c.is_alphanumeric() || c == '-' || c == '_')
            .parse_next(input)?;
        skip_ws(input);
        let value = if let Some(after) = input.strip_prefix('=') {
            *input = after;
            skip_ws(input);
            if input.starts_with('{') {
                let _ = '{'.parse_next(input)?;
                let value = parse_js_value(input)?;
                keyword(input, "}")?;
                Attr::Expr(value)
            } else {
                let mut quote = alt(('"', '\'')).parse_next(input)?;
                let raw: &str = take_till(0.., quote).parse_next(input)?;
                let _ = quote.parse_next(input)?;
                match xml_unescape(raw) {
                    Some(v) => Attr::Str(v),
                    None => return backtrack(),
                }
            }
        } else {
            Attr::Flag
        };
        node.attrs.push((key, value));
    }

    loop {
        if input.is_empty() {
            return backtrack();
        }
        if let Some(after) = input.strip_prefix("</") {
            *input = after;
            skip_ws(input);
            let close: &str =
                take_while(0.., |c: char| c.is_alphanumeric() || c == '.' || c == '_')
                    .parse_next(input)?;
            if close != name {
                return backtrack();
            }
            keyword(input, ">")?;
            return Ok(node);
        }
        if input.starts_with('<') {
            node.children.push(Child::Element(parse_node(input)?));
        } else if input.starts_with('{') {
            let _ = '{'.parse_next(input)?;
            skip_trivia(input)?;
            // `{/* comment */}` leaves nothing behind.
            if let Some(after) = input.strip_prefix('}') {
                *input = after;
                continue;
            }
            let value = parse_js_value(input)?;
            keyword(input, "}")?;
            node.children.push(Child::Expr(value));
        } else {
            let raw: &str = take_till(1.., |c: char| c == '<' || c == '{').parse_next(input)?;
            let text = raw.trim();
            if !text.is_empty() {
                match xml_unescape(text) {
                    Some(t) => node.children.push(Child::Text(t)),
                    None => return backtrack(),
                }
            }
        }
    }
}

fn parse_js_value(input: &mut &str) -> ModalResult<JsValue> {
    skip_trivia(input)?;
    match input.chars().next() {
        Some('{') => parse_object(input),
        Some('"') => parse_double_quoted(input).map(JsValue::Str),
        Some('\'') => parse_single_quoted(input).map(JsValue::Str),
        Some(c) if c == '-' || c.is_ascii_digit() => parse_number(input).map(JsValue::Num),
        Some(c) if c.is_alphabetic() || c == '_' => {
            parse_ident(input).map(|s| JsValue::Ident(s.to_string()))
        }
        _ => backtrack(),
    }
}

fn parse_object(input: &mut &str) -> ModalResult<JsValue> {
    let _ = '{'.parse_next(input)?;
    let mut fields = Vec::new();
    loop {
        skip_trivia(input)?;
        if let Some(after) = input.strip_prefix('}') {
            *input = after;
            return Ok(JsValue::Object(fields));
        }
        let key = match input.chars().next() {
            Some('"') => parse_double_quoted(input)?,
            Some('\'') => parse_single_quoted(input)?,
            _ => parse_ident(input)?.to_string(),
        };
        keyword(input, ":")?;
        let value = parse_js_value(input)?;
        fields.push((key, value));
        skip_trivia(input)?;
        if let Some(after) = input.strip_prefix(',') {
            *input = after;
        } else if !input.starts_with('}') {
            return backtrack();
        }
    }
}

fn parse_number(input: &mut &str) -> ModalResult<String> {
    let start = *input;
    if input.starts_with('-') {
        *input = &input[1..];
    }
    let _ = take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    if let Some(after) = input.strip_prefix('.') {
        *input = after;
        let _ = take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    }
    Ok(start[..start.len() - input.len()].to_string())
}

/// End of a quoted literal starting at byte 0, honoring backslash escapes.
fn literal_end(input: &str, quote: char) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in input.char_indices().skip(1) {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Some(i + c.len_utf8());
        } else if c == '\n' {
            return None;
        }
    }
    None
}

/// Double-quoted literals share JSON's escape set.
fn parse_double_quoted(input: &mut &str) -> ModalResult<String> {
    let Some(end) = literal_end(input, '"') else {
        return backtrack();
    };
    match serde_json::from_str::<String>(&input[..end]) {
        Ok(s) => {
            *input = &input[end..];
            Ok(s)
        }
        Err(_) => backtrack(),
    }
}

fn parse_single_quoted(input: &mut &str) -> ModalResult<String> {
    let Some(end) = literal_end(input, '\'') else {
        return backtrack();
    };
    let body = &input[1..end - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => return backtrack(),
        }
    }
    *input = &input[end..];
    Ok(out)
}
