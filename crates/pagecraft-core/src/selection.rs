//! Hit regions, resize handles and the corner resize policy.

use crate::element::{ElementId, ElementInstance};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Handle hit tolerance in screen pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 8.0;
/// Height of the label bar drawn above a selected element, in canvas units.
pub const LABEL_BAR_HEIGHT: f64 = 24.0;
/// Smallest width or height a resize can produce.
pub const MIN_ELEMENT_SIZE: f64 = 50.0;

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::TopLeft, Corner::TopRight, Corner::BottomLeft, Corner::BottomRight];

    /// Whether dragging this corner moves the left edge.
    pub fn moves_left(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::BottomLeft)
    }

    /// Whether dragging this corner moves the top edge.
    pub fn moves_top(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::TopRight)
    }

    /// Position of this corner on a rectangle.
    pub fn point_on(self, bounds: Rect) -> Point {
        match self {
            Corner::TopLeft => Point::new(bounds.x0, bounds.y0),
            Corner::TopRight => Point::new(bounds.x1, bounds.y0),
            Corner::BottomLeft => Point::new(bounds.x0, bounds.y1),
            Corner::BottomRight => Point::new(bounds.x1, bounds.y1),
        }
    }
}

/// A resize handle with its position in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub position: Point,
    pub corner: Corner,
}

impl Handle {
    /// Check if a canvas point hits this handle.
    /// `tolerance` is in canvas units (screen tolerance divided by scale).
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= tolerance * tolerance
    }
}

/// What the pointer is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// Element body; starts a drag.
    Body(ElementId),
    /// Resize handle; starts a resize.
    Handle(ElementId, Corner),
    /// Delete control in the label bar of a selected element.
    Delete(ElementId),
    /// Empty canvas; starts a pan.
    Background,
}

/// Corner handles of an element.
pub fn handles(element: &ElementInstance) -> [Handle; 4] {
    let bounds = element.bounds();
    Corner::ALL.map(|corner| Handle {
        position: corner.point_on(bounds),
        corner,
    })
}

/// Rectangle of the delete control, at the right end of the label bar.
pub fn delete_control(element: &ElementInstance) -> Rect {
    let bounds = element.bounds();
    Rect::new(bounds.x1 - LABEL_BAR_HEIGHT, bounds.y0 - LABEL_BAR_HEIGHT, bounds.x1, bounds.y0)
}

/// Find what a canvas point hits.
///
/// Handles and the delete control only exist on the selected element and
/// take priority. Bodies are tested front to back (last element first).
/// Nested content is laid out by the renderer and reported by it directly.
pub fn hit_test(
    elements: &[ElementInstance],
    selected: Option<ElementId>,
    point: Point,
    tolerance: f64,
) -> HitTarget {
    if let Some(element) = selected.and_then(|id| elements.iter().find(|e| e.id == id)) {
        if let Some(handle) = handles(element).iter().find(|h| h.hit_test(point, tolerance)) {
            return HitTarget::Handle(element.id, handle.corner);
        }
        if delete_control(element).contains(point) {
            return HitTarget::Delete(element.id);
        }
    }

    elements
        .iter()
        .rev()
        .find(|e| e.bounds().contains(point))
        .map_or(HitTarget::Background, |e| HitTarget::Body(e.id))
}

/// Topmost element under a point that accepts dropped components.
pub fn drop_target(elements: &[ElementInstance], point: Point) -> Option<ElementId> {
    elements
        .iter()
        .rev()
        .find(|e| e.bounds().contains(point))
        .filter(|e| e.can_contain_content())
        .map(|e| e.id)
}

/// Resize from a corner, keeping the diagonally opposite corner fixed.
///
/// Sizes are floored at `min_size`. The moved edges are recomputed from the
/// clamped size, so once the minimum engages the opposite edge stays put
/// and the dragged corner stops following the pointer.
pub fn resize_from_corner(
    corner: Corner,
    start_position: Point,
    start_size: Size,
    delta: Vec2,
    min_size: f64,
) -> (Point, Size) {
    let width = if corner.moves_left() {
        (start_size.width - delta.x).max(min_size)
    } else {
        (start_size.width + delta.x).max(min_size)
    };
    let height = if corner.moves_top() {
        (start_size.height - delta.y).max(min_size)
    } else {
        (start_size.height + delta.y).max(min_size)
    };

    let x = if corner.moves_left() {
        start_position.x + (start_size.width - width)
    } else {
        start_position.x
    };
    let y = if corner.moves_top() {
        start_position.y + (start_size.height - height)
    } else {
        start_position.y
    };

    (Point::new(x, y), Size::new(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ComponentRegistry;

    fn element_at(x: f64, y: f64, name: &str) -> ElementInstance {
        let registry = ComponentRegistry::with_builtins();
        let prototype = registry.find_by_name(name).unwrap();
        registry.instantiate(prototype, Point::new(x, y), None)
    }

    const START: Point = Point::new(100.0, 100.0);
    const SIZE: Size = Size::new(200.0, 100.0);

    #[test]
    fn test_bottom_right_resize() {
        let (pos, size) = resize_from_corner(Corner::BottomRight, START, SIZE, Vec2::new(30.0, 10.0), MIN_ELEMENT_SIZE);
        assert_eq!(size, Size::new(230.0, 110.0));
        assert_eq!(pos, START);
    }

    #[test]
    fn test_top_left_resize_clamped() {
        let (pos, size) = resize_from_corner(Corner::TopLeft, START, SIZE, Vec2::new(250.0, 10.0), MIN_ELEMENT_SIZE);
        assert_eq!(size, Size::new(50.0, 90.0));
        assert_eq!(pos, Point::new(250.0, 110.0));
    }

    #[test]
    fn test_top_right_resize() {
        let (pos, size) = resize_from_corner(Corner::TopRight, START, SIZE, Vec2::new(20.0, -30.0), MIN_ELEMENT_SIZE);
        assert_eq!(size, Size::new(220.0, 130.0));
        assert_eq!(pos, Point::new(100.0, 70.0));
    }

    #[test]
    fn test_bottom_left_resize() {
        let (pos, size) = resize_from_corner(Corner::BottomLeft, START, SIZE, Vec2::new(-40.0, 25.0), MIN_ELEMENT_SIZE);
        assert_eq!(size, Size::new(240.0, 125.0));
        assert_eq!(pos, Point::new(60.0, 100.0));
    }

    #[test]
    fn test_min_clamp_every_corner() {
        let deltas = [
            Vec2::new(-1e6, -1e6),
            Vec2::new(1e6, 1e6),
            Vec2::new(-1e6, 1e6),
            Vec2::new(1e6, -1e6),
        ];
        for corner in Corner::ALL {
            for delta in deltas {
                let (pos, size) = resize_from_corner(corner, START, SIZE, delta, MIN_ELEMENT_SIZE);
                assert!(size.width >= MIN_ELEMENT_SIZE, "{corner:?} {delta:?}");
                assert!(size.height >= MIN_ELEMENT_SIZE, "{corner:?} {delta:?}");

                // The opposite corner stays fixed
                let opposite = match corner {
                    Corner::TopLeft => Corner::BottomRight,
                    Corner::TopRight => Corner::BottomLeft,
                    Corner::BottomLeft => Corner::TopRight,
                    Corner::BottomRight => Corner::TopLeft,
                };
                let before = opposite.point_on(Rect::from_origin_size(START, SIZE));
                let after = opposite.point_on(Rect::from_origin_size(pos, size));
                assert!((before - after).hypot() < 1e-9, "{corner:?} {delta:?}");
            }
        }
    }

    #[test]
    fn test_handles_at_corners() {
        let element = element_at(10.0, 20.0, "Button");
        let hs = handles(&element);
        assert_eq!(hs[0].position, Point::new(10.0, 20.0));
        assert_eq!(hs[3].position, Point::new(210.0, 120.0));
        assert!(hs[3].hit_test(Point::new(213.0, 118.0), HANDLE_HIT_TOLERANCE));
        assert!(!hs[3].hit_test(Point::new(230.0, 118.0), HANDLE_HIT_TOLERANCE));
    }

    #[test]
    fn test_hit_test_priority() {
        let back = element_at(0.0, 0.0, "Container");
        let front = element_at(100.0, 50.0, "Button");
        let elements = vec![back.clone(), front.clone()];

        assert_eq!(hit_test(&elements, None, Point::new(150.0, 80.0), 8.0), HitTarget::Body(front.id));
        assert_eq!(hit_test(&elements, None, Point::new(20.0, 20.0), 8.0), HitTarget::Body(back.id));
        assert_eq!(hit_test(&elements, None, Point::new(900.0, 900.0), 8.0), HitTarget::Background);

        // Handles only on the selected element
        assert_eq!(hit_test(&elements, None, Point::new(0.0, 0.0), 8.0), HitTarget::Body(back.id));
        assert_eq!(
            hit_test(&elements, Some(back.id), Point::new(0.0, 0.0), 8.0),
            HitTarget::Handle(back.id, Corner::TopLeft)
        );
        assert_eq!(
            hit_test(&elements, Some(front.id), Point::new(290.0, 40.0), 8.0),
            HitTarget::Delete(front.id)
        );
    }

    #[test]
    fn test_drop_target_requires_container() {
        let container = element_at(0.0, 0.0, "Container");
        let button = element_at(300.0, 0.0, "Button");
        let elements = vec![container.clone(), button];
        assert_eq!(drop_target(&elements, Point::new(10.0, 10.0)), Some(container.id));
        assert_eq!(drop_target(&elements, Point::new(310.0, 10.0)), None);
    }

    #[test]
    fn test_corner_serde_names() {
        assert_eq!(serde_json::to_string(&Corner::TopLeft).unwrap(), "\"top-left\"");
        assert_eq!(serde_json::to_string(&Corner::BottomRight).unwrap(), "\"bottom-right\"");
    }
}
