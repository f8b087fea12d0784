//! Stylesheet dialect parser.
//!
//! Reads every rule block; `.shape-{id}` and `.text-{id}` blocks become
//! entities, any other selector is skipped.

use super::declarations::{Declarations, shape_from_declarations, text_from_declarations};
use super::{backtrack, css_unquote, parse_field, skip_block_comment, skip_ws, syntax_at};
use crate::dialect::Dialect;
use crate::error::ParseResult;
use crate::id::{ShapeId, TextId};
use crate::model::{DEFAULT_TEXT_CONTENT, ParsedScene};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

const DIALECT: Dialect = Dialect::Stylesheet;

pub fn parse_stylesheet(input: &str) -> ParseResult<ParsedScene> {
    let mut rest = input;
    let mut parsed = ParsedScene::default();

    loop {
        skip_trivia(&mut rest).map_err(|_| syntax_at(DIALECT, input, rest))?;
        if rest.is_empty() {
            break;
        }
        let (selector, decls) = parse_rule
            .parse_next(&mut rest)
            .map_err(|_| syntax_at(DIALECT, input, rest))?;

        if let Some(raw) = entity_id(selector, ".shape-") {
            let id = ShapeId::adopt(parse_field(DIALECT, "selector", raw)?);
            parsed
                .shapes
                .push(shape_from_declarations(DIALECT, id, &decls)?);
        } else if let Some(raw) = entity_id(selector, ".text-") {
            let id = TextId::adopt(parse_field(DIALECT, "selector", raw)?);
            let content = decls
                .get("content")
                .map_or_else(|| DEFAULT_TEXT_CONTENT.to_string(), css_unquote);
            parsed
                .texts
                .push(text_from_declarations(DIALECT, id, &decls, content)?);
        } else {
            log::debug!("ignoring stylesheet rule {selector:?}");
        }
    }
    Ok(parsed)
}

/// The numeric tail of `.shape-12` style selectors.
fn entity_id<'a>(selector: &'a str, prefix: &str) -> Option<&'a str> {
    selector
        .strip_prefix(prefix)
        .filter(|tail| !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()))
}

/// Whitespace and `/* */` comments.
fn skip_trivia(input: &mut &str) -> ModalResult<()> {
    loop {
        skip_ws(input);
        if !input.starts_with("/*") {
            return Ok(());
        }
        if !skip_block_comment(input, "/*", "*/") {
            return backtrack();
        }
    }
}

fn parse_rule<'a>(input: &mut &'a str) -> ModalResult<(&'a str, Declarations)> {
    let selector: &str =
        take_till(1.., |c: char| c == '{' || c == '}' || c == ';').parse_next(input)?;
    let _ = '{'.parse_next(input)?;

    let mut decls = Declarations::default();
    loop {
        skip_trivia(input)?;
        if let Some(after) = input.strip_prefix('}') {
            *input = after;
            return Ok((selector.trim(), decls));
        }
        let prop: &str =
            take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '-').parse_next(input)?;
        skip_ws(input);
        let _ = ':'.parse_next(input)?;
        let value = parse_value(input)?;
        if let Some(after) = input.strip_prefix(';') {
            *input = after;
        }
        decls.push(prop.to_ascii_lowercase(), value.trim());
    }
}

/// A declaration value up to `;` or `}` outside quotes and parentheses.
fn parse_value<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ';' | '}' if depth == 0 => {
                let value = &input[..i];
                *input = &input[i..];
                return Ok(value);
            }
            _ => {}
        }
    }
    backtrack()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Rect, ShapeKind, TriangleDirection};
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_blocks_and_skips_foreign_rules() {
        let input = r#"/* header */
body { margin: 0 }

.shape-3 {
  left: 10px; top: 12px;
  width: 30px; height: 30px;
  z-index: 4;
  background-color: rgb(1, 2, 3);
  border-radius: 50%
}
.text-5 { content: "two\a lines"; font-weight: bold }
"#;
        let parsed = parse_stylesheet(input).unwrap();
        assert_eq!(parsed.shapes.len(), 1);
        let shape = &parsed.shapes[0];
        assert_eq!(shape.id, ShapeId(3));
        assert_eq!(shape.kind, ShapeKind::Circle);
        assert_eq!(shape.color, "rgb(1, 2, 3)");
        assert_eq!(shape.z_index, 4);

        let text = &parsed.texts[0];
        assert_eq!(text.id, TextId(5));
        assert_eq!(text.text, "two\nlines");
    }

    #[test]
    fn image_url_with_semicolons() {
        let input = r#".shape-8 {
  background-color: #FFF;
  background-image: url("data:image/png;base64,AAAA");
  background-size: cover;
  border-radius: 0;
}"#;
        let shape = parse_stylesheet(input).unwrap().shapes.remove(0);
        assert_eq!(shape.kind, ShapeKind::Image);
        assert_eq!(shape.image_data.as_deref(), Some("data:image/png;base64,AAAA"));
    }

    #[test]
    fn triangle_block() {
        let input = ".shape-2 { left: 0px; top: 0px; width: 0; height: 0; border-left: 25px solid transparent; border-right: 25px solid transparent; border-top: 40px solid #123456; }";
        let shape = parse_stylesheet(input).unwrap().shapes.remove(0);
        assert_eq!(shape.kind, ShapeKind::Triangle(TriangleDirection::Down));
        assert_eq!((shape.width, shape.height), (50, 40));
        assert_eq!(shape.color, "#123456");
    }

    #[test]
    fn transparent_triangle_keeps_its_direction() {
        let input = ".shape-3 { left: 5px; top: 6px; width: 0; height: 0; border-left: 30px solid transparent; border-right: 31px solid transparent; border-top: 44px solid transparent; }";
        let shape = parse_stylesheet(input).unwrap().shapes.remove(0);
        assert_eq!(shape.kind, ShapeKind::Triangle(TriangleDirection::Down));
        assert_eq!(shape.bounds(), Rect::new(5, 6, 61, 44));
        assert_eq!(shape.color, "transparent");
    }

    #[test]
    fn sized_box_with_borders_is_not_a_triangle() {
        let input = ".shape-4 { width: 80px; height: 40px; border-left: 4px solid transparent; border-right: 4px solid transparent; border-top: 4px solid red; }";
        let shape = parse_stylesheet(input).unwrap().shapes.remove(0);
        assert_eq!(shape.kind, ShapeKind::Rectangle);
    }

    #[test]
    fn malformed_fails() {
        for input in [
            ".shape-1 { left: 10px;",
            ".shape-1 { left 10px; }",
            ".shape-1 { left: 10px; } /* open",
            ".shape-1 { width: wide; }",
            ".shape-99999999999999999999999 { }",
            "}",
        ] {
            assert!(parse_stylesheet(input).is_err(), "should reject {input:?}");
        }
    }

    #[test]
    fn placeholder_is_empty() {
        assert_eq!(
            parse_stylesheet("/* Empty canvas: no shapes or text yet */\n"),
            Ok(ParsedScene::default())
        );
    }
}
