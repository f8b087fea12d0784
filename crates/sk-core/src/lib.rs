pub mod dialect;
pub mod emitter;
pub mod error;
pub mod hit;
pub mod id;
pub mod model;
pub mod parser;
pub mod patch;
pub mod scene;
pub mod style;

pub use dialect::Dialect;
pub use error::{ParseError, ParseResult};
pub use hit::{Handle, Hit, hit_rect, hit_test};
pub use id::{EntityId, GroupId, ShapeId, TextId};
pub use model::*;
pub use patch::{ElementPatch, ElementPatcher, MarkupPatcher};
pub use scene::{
    Applied, Scene, SceneMutation, Selection, ShapeStyleUpdate, TextStyleUpdate, ZOrder,
};
pub use style::{ResolvedStyle, ResolvedTextStyle, resolve, resolve_text};
