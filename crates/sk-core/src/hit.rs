//! Hit testing: canvas point → what the pointer landed on.
//!
//! Walks the paint stack front-to-back so the topmost entity wins. Resize
//! handles of the single selected entity take priority over everything.

use crate::id::{EntityId, GroupId};
use crate::model::{MIN_SIZE, Rect};
use crate::scene::Scene;

/// One of the eight resize handles around a selected entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    Nw,
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::Nw,
        Handle::N,
        Handle::Ne,
        Handle::E,
        Handle::Se,
        Handle::S,
        Handle::Sw,
        Handle::W,
    ];

    /// Center of the handle on the entity's bounds.
    pub fn anchor(self, r: Rect) -> (i32, i32) {
        let cx = r.x + r.width / 2;
        let cy = r.y + r.height / 2;
        match self {
            Handle::Nw => (r.x, r.y),
            Handle::N => (cx, r.y),
            Handle::Ne => (r.right(), r.y),
            Handle::E => (r.right(), cy),
            Handle::Se => (r.right(), r.bottom()),
            Handle::S => (cx, r.bottom()),
            Handle::Sw => (r.x, r.bottom()),
            Handle::W => (r.x, cy),
        }
    }

    /// Square hit region of the handle.
    pub fn region(self, r: Rect, size: i32) -> Rect {
        let (ax, ay) = self.anchor(r);
        Rect::new(ax - size / 2, ay - size / 2, size, size)
    }

    fn moves_left(self) -> bool {
        matches!(self, Handle::Nw | Handle::W | Handle::Sw)
    }

    fn moves_right(self) -> bool {
        matches!(self, Handle::Ne | Handle::E | Handle::Se)
    }

    fn moves_top(self) -> bool {
        matches!(self, Handle::Nw | Handle::N | Handle::Ne)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, Handle::Sw | Handle::S | Handle::Se)
    }

    /// Apply a pointer delta to the box captured at gesture start.
    ///
    /// Sizes are floored at [`MIN_SIZE`]; the edge opposite a dragged one
    /// stays put, and edge handles leave the other axis alone.
    pub fn resize(self, start: Rect, dx: i32, dy: i32) -> Rect {
        let mut r = start;
        if self.moves_right() {
            r.width = (start.width + dx).max(MIN_SIZE);
        } else if self.moves_left() {
            r.width = (start.width - dx).max(MIN_SIZE);
            r.x = start.right() - r.width;
        }
        if self.moves_bottom() {
            r.height = (start.height + dy).max(MIN_SIZE);
        } else if self.moves_top() {
            r.height = (start.height - dy).max(MIN_SIZE);
            r.y = start.bottom() - r.height;
        }
        r
    }
}

/// What a pointer position resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Handle(EntityId, Handle),
    Entity(EntityId),
    /// A group member or empty area inside a group's bounds.
    Group(GroupId),
    Canvas,
}

/// Resolve `(px, py)` against the scene.
pub fn hit_test(scene: &Scene, px: i32, py: i32, handle_size: i32) -> Hit {
    if let Some(selected) = scene.selection().single()
        && let Some(bounds) = scene.bounds(selected)
    {
        for handle in Handle::ALL {
            if handle.region(bounds, handle_size).contains(px, py) {
                return Hit::Handle(selected, handle);
            }
        }
    }

    for id in scene.stack().into_iter().rev() {
        let Some(bounds) = scene.bounds(id) else {
            continue;
        };
        if bounds.contains(px, py) {
            return match scene.group_of(id) {
                Some(group) => Hit::Group(group.id),
                None => Hit::Entity(id),
            };
        }
    }

    scene
        .groups()
        .iter()
        .rev()
        .find(|g| g.bounds().contains(px, py))
        .map_or(Hit::Canvas, |g| Hit::Group(g.id))
}

/// Every shape and text whose bounds intersect `marquee`, in paint order.
pub fn hit_rect(scene: &Scene, marquee: Rect) -> Vec<EntityId> {
    scene
        .stack()
        .into_iter()
        .filter(|id| scene.bounds(*id).is_some_and(|b| b.intersects(&marquee)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CanvasSize, Shape, ShapeKind, Text};
    use crate::scene::SceneMutation;

    fn add(scene: &mut Scene, r: Rect) -> EntityId {
        let shape = Shape::new(ShapeKind::Rectangle, r);
        let id = EntityId::Shape(shape.id);
        scene.apply(SceneMutation::AddShape(shape));
        id
    }

    #[test]
    fn topmost_entity_wins() {
        let mut scene = Scene::new(CanvasSize::default());
        let bottom = add(&mut scene, Rect::new(0, 0, 100, 100));
        let top = add(&mut scene, Rect::new(50, 50, 100, 100));
        assert_eq!(hit_test(&scene, 75, 75, 8), Hit::Entity(top));
        assert_eq!(hit_test(&scene, 10, 10, 8), Hit::Entity(bottom));
        assert_eq!(hit_test(&scene, 400, 400, 8), Hit::Canvas);
    }

    #[test]
    fn handles_only_on_single_selection() {
        let mut scene = Scene::new(CanvasSize::default());
        let a = add(&mut scene, Rect::new(100, 100, 100, 80));
        let b = add(&mut scene, Rect::new(300, 300, 50, 50));
        assert_eq!(hit_test(&scene, 200, 180, 8), Hit::Entity(a));

        scene.apply(SceneMutation::Select { id: a, additive: false });
        assert_eq!(hit_test(&scene, 202, 182, 8), Hit::Handle(a, Handle::Se));
        assert_eq!(hit_test(&scene, 150, 97, 8), Hit::Handle(a, Handle::N));

        scene.apply(SceneMutation::Select { id: b, additive: true });
        assert_eq!(hit_test(&scene, 202, 182, 8), Hit::Canvas);
    }

    #[test]
    fn group_members_resolve_to_group() {
        let mut scene = Scene::new(CanvasSize::default());
        let a = add(&mut scene, Rect::new(0, 0, 40, 40));
        let b = add(&mut scene, Rect::new(100, 100, 40, 40));
        scene.apply(SceneMutation::GroupEntities(vec![a, b]));
        let gid = scene.groups()[0].id;
        assert_eq!(hit_test(&scene, 10, 10, 8), Hit::Group(gid));
        // Empty space between members still belongs to the group.
        assert_eq!(hit_test(&scene, 70, 70, 8), Hit::Group(gid));
    }

    #[test]
    fn marquee_collects_intersections() {
        let mut scene = Scene::new(CanvasSize::default());
        let a = add(&mut scene, Rect::new(0, 0, 40, 40));
        let _far = add(&mut scene, Rect::new(500, 500, 40, 40));
        let text = Text::new(30, 30);
        let t = EntityId::Text(text.id);
        scene.apply(SceneMutation::AddText(text));
        assert_eq!(hit_rect(&scene, Rect::new(20, 20, 30, 30)), vec![a, t]);
    }

    #[test]
    fn corner_resize_keeps_opposite_corner() {
        let start = Rect::new(100, 100, 100, 80);
        assert_eq!(Handle::Nw.resize(start, 30, 20), Rect::new(130, 120, 70, 60));
        assert_eq!(Handle::Nw.resize(start, 200, 200), Rect::new(180, 160, 20, 20));
        assert_eq!(Handle::Se.resize(start, 20, 20), Rect::new(100, 100, 120, 100));
        assert_eq!(Handle::E.resize(start, -500, 40), Rect::new(100, 100, 20, 80));
        assert_eq!(Handle::N.resize(start, 15, -10), Rect::new(100, 90, 100, 90));
    }
}
