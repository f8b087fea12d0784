use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide id counter shared by shapes, texts and groups.
/// Starts at 1 so `0` never names a live entity.
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Allocate the next raw id. Monotonic and unique within the process.
pub fn next_raw() -> u64 {
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Record an id that entered the scene from outside (e.g. parsed code) so
/// later allocations never hand it out again.
pub fn observe(raw: u64) {
    COUNTER.fetch_max(raw.saturating_add(1), Ordering::Relaxed);
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Allocate a fresh id from the shared counter.
            pub fn next() -> Self {
                Self(next_raw())
            }

            /// Adopt an id read from code, bumping the counter past it.
            pub fn adopt(raw: u64) -> Self {
                observe(raw);
                Self(raw)
            }

            pub fn raw(self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`Shape`](crate::model::Shape).
    ShapeId,
    "shape"
);
entity_id!(
    /// Identifier of a [`Text`](crate::model::Text) box.
    TextId,
    "text"
);
entity_id!(
    /// Identifier of a [`Group`](crate::model::Group).
    GroupId,
    "group"
);

/// Either kind of leaf entity on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityId {
    Shape(ShapeId),
    Text(TextId),
}

impl From<ShapeId> for EntityId {
    fn from(id: ShapeId) -> Self {
        EntityId::Shape(id)
    }
}

impl From<TextId> for EntityId {
    fn from(id: TextId) -> Self {
        EntityId::Text(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_unique() {
        let a = ShapeId::next();
        let b = TextId::next();
        let c = ShapeId::next();
        assert_ne!(a.raw(), b.raw());
        assert!(c.raw() > a.raw());
    }

    #[test]
    fn adopted_ids_push_counter_forward() {
        let far = next_raw() + 10_000;
        let adopted = ShapeId::adopt(far);
        assert_eq!(adopted.raw(), far);
        assert!(ShapeId::next().raw() > far);
    }

    #[test]
    fn adopting_a_small_id_never_rewinds() {
        let before = next_raw();
        let _ = TextId::adopt(1);
        assert!(next_raw() > before);
    }
}
