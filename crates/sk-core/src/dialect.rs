use crate::emitter;
use crate::error::ParseResult;
use crate::model::ParsedScene;
use crate::parser;
use crate::scene::Scene;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// One of the three textual renderings of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// XML-like `<scene>` document.
    #[default]
    Markup,
    /// CSS-like rule blocks.
    Stylesheet,
    /// JSX-like component source.
    Component,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::Markup, Dialect::Stylesheet, Dialect::Component];

    pub fn generate(self, scene: &Scene) -> String {
        match self {
            Dialect::Markup => emitter::emit_markup(scene),
            Dialect::Stylesheet => emitter::emit_stylesheet(scene),
            Dialect::Component => emitter::emit_component(scene),
        }
    }

    pub fn parse(self, text: &str) -> ParseResult<ParsedScene> {
        match self {
            Dialect::Markup => parser::parse_markup(text),
            Dialect::Stylesheet => parser::parse_stylesheet(text),
            Dialect::Component => parser::parse_component(text),
        }
    }

    /// Pick a dialect from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xml" | "html" | "htm" => Some(Dialect::Markup),
            "css" => Some(Dialect::Stylesheet),
            "jsx" | "tsx" | "js" => Some(Dialect::Component),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Dialect::Markup => "markup",
            Dialect::Stylesheet => "stylesheet",
            Dialect::Component => "component",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
