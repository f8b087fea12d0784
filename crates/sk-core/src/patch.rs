//! Single-element rewrites of generated code.
//!
//! The sync layer normally regenerates a whole document. An
//! [`ElementPatcher`] instead rewrites the one element that describes an
//! entity and leaves every other byte of the user's text alone.

use crate::dialect::Dialect;
use crate::emitter::markup::{emit_shape, emit_text};
use crate::error::{ParseError, ParseResult};
use crate::id::EntityId;
use crate::parser::markup::{Element, parse_element, shape_from_element, text_from_element};
use crate::scene::{ShapeStyleUpdate, TextStyleUpdate};
use winnow::prelude::*;

/// What to change on one element. `None` fields are left as written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub position: Option<(i32, i32)>,
    pub size: Option<(i32, i32)>,
    pub shape_style: Option<ShapeStyleUpdate>,
    pub text_style: Option<TextStyleUpdate>,
}

impl ElementPatch {
    pub fn is_empty(&self) -> bool {
        *self == ElementPatch::default()
    }
}

/// Rewrite the element describing `id` inside `code`.
pub trait ElementPatcher {
    fn dialect(&self) -> Dialect;

    fn patch(&self, code: &str, id: EntityId, patch: &ElementPatch) -> ParseResult<String>;
}

/// Patches `<shape>` and `<text>` elements of a markup document.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupPatcher;

impl ElementPatcher for MarkupPatcher {
    fn dialect(&self) -> Dialect {
        Dialect::Markup
    }

    fn patch(&self, code: &str, id: EntityId, patch: &ElementPatch) -> ParseResult<String> {
        let (tag, raw_id) = match id {
            EntityId::Shape(id) => ("shape", id.raw()),
            EntityId::Text(id) => ("text", id.raw()),
        };
        let (start, end, element) = locate(code, tag, raw_id).ok_or_else(|| {
            ParseError::syntax(Dialect::Markup, format!("no <{tag}> element for {id:?}"))
        })?;
        if patch.is_empty() {
            return Ok(code.to_string());
        }

        let depth = indent_depth(code, start);
        let mut emitted = String::new();
        match id {
            EntityId::Shape(_) => {
                let mut shape = shape_from_element(&element)?.ok_or_else(|| {
                    ParseError::invalid(
                        Dialect::Markup,
                        "type",
                        element.attr("type").unwrap_or_default(),
                    )
                })?;
                let mut bounds = shape.bounds();
                apply_geometry(patch, &mut bounds.x, &mut bounds.y, &mut bounds.width, &mut bounds.height);
                shape.set_bounds(bounds);
                if let Some(update) = &patch.shape_style {
                    update.apply_to(&mut shape);
                }
                emit_shape(&mut emitted, &shape, depth);
            }
            EntityId::Text(_) => {
                let mut text = text_from_element(&element)?;
                let mut bounds = text.bounds();
                apply_geometry(patch, &mut bounds.x, &mut bounds.y, &mut bounds.width, &mut bounds.height);
                text.set_bounds(bounds);
                if let Some(update) = &patch.text_style {
                    update.apply_to(&mut text);
                }
                emit_text(&mut emitted, &text, depth);
            }
        }

        let replacement = emitted.trim_start().trim_end_matches('\n');
        log::debug!("patched {id:?} in place ({} bytes)", replacement.len());
        let mut out = String::with_capacity(code.len() + replacement.len());
        out.push_str(&code[..start]);
        out.push_str(replacement);
        out.push_str(&code[end..]);
        Ok(out)
    }
}

fn apply_geometry(patch: &ElementPatch, x: &mut i32, y: &mut i32, w: &mut i32, h: &mut i32) {
    if let Some((px, py)) = patch.position {
        *x = px;
        *y = py;
    }
    if let Some((pw, ph)) = patch.size {
        *w = pw;
        *h = ph;
    }
}

/// Byte span and parsed form of the element `<tag id="raw_id">`.
fn locate<'a>(code: &'a str, tag: &str, raw_id: u64) -> Option<(usize, usize, Element<'a>)> {
    let open = format!("<{tag}");
    let wanted = raw_id.to_string();
    let mut from = 0;
    while let Some(found) = code[from..].find(&open) {
        let start = from + found;
        from = start + open.len();
        let mut rest = &code[start..];
        let Ok(element) = parse_element.parse_next(&mut rest) else {
            continue;
        };
        if element.name == tag && element.attr("id").map(str::trim) == Some(wanted.as_str()) {
            let end = code.len() - rest.len();
            return Some((start, end, element));
        }
    }
    None
}

/// Nesting depth implied by the whitespace before `offset` on its line.
fn indent_depth(code: &str, offset: usize) -> usize {
    let line_start = code[..offset].rfind('\n').map_or(0, |i| i + 1);
    let lead = &code[line_start..offset];
    if lead.chars().all(|c| c == ' ') {
        lead.len() / 2
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{ShapeId, TextId};
    use pretty_assertions::assert_eq;

    const DOC: &str = r##"<scene>
  <!-- keep me -->
  <shape id="4" type="rectangle">
    <position x="10" y="10" />
    <size width="100" height="80" />
    <style color="#FF69B4" zIndex="0" borderRadius="0" />
  </shape>
  <text id="5">
    <position x="0" y="0" />
    <size width="150" height="40" />
    <content>hi</content>
    <style fontSize="16" color="#333333" fontFamily="Arial" fontWeight="normal" fontStyle="normal" textAlign="left" zIndex="1" />
  </text>
</scene>
"##;

    #[test]
    fn moves_one_shape_and_keeps_the_rest() {
        let patch = ElementPatch {
            position: Some((30, 40)),
            ..ElementPatch::default()
        };
        let out = MarkupPatcher
            .patch(DOC, ShapeId(4).into(), &patch)
            .unwrap();
        assert!(out.contains("<!-- keep me -->"));
        assert!(out.contains("    <position x=\"30\" y=\"40\" />\n    <size width=\"100\" height=\"80\" />"));
        assert!(out.contains("<content>hi</content>"));
        assert_eq!(out.lines().count(), DOC.lines().count());
    }

    #[test]
    fn restyles_a_shape() {
        let patch = ElementPatch {
            shape_style: Some(ShapeStyleUpdate {
                color: Some("#000".into()),
                opacity: Some(Some(0.5)),
                ..ShapeStyleUpdate::default()
            }),
            ..ElementPatch::default()
        };
        let out = MarkupPatcher
            .patch(DOC, ShapeId(4).into(), &patch)
            .unwrap();
        assert!(out.contains(r##"<style color="#000" zIndex="0" borderRadius="0" opacity="0.5" />"##));
    }

    #[test]
    fn resizes_text() {
        let patch = ElementPatch {
            size: Some((200, 50)),
            ..ElementPatch::default()
        };
        let out = MarkupPatcher
            .patch(DOC, TextId(5).into(), &patch)
            .unwrap();
        assert!(out.contains("<size width=\"200\" height=\"50\" />\n    <content>hi</content>"));
        assert!(out.contains("<size width=\"100\" height=\"80\" />"));
    }

    #[test]
    fn missing_element_is_an_error() {
        let err = MarkupPatcher
            .patch(DOC, ShapeId(99).into(), &ElementPatch::default())
            .unwrap_err();
        assert_eq!(err.dialect(), Dialect::Markup);
    }

    #[test]
    fn empty_patch_is_identity() {
        let out = MarkupPatcher
            .patch(DOC, TextId(5).into(), &ElementPatch::default())
            .unwrap();
        assert_eq!(out, DOC);
    }
}
