//! Drag-and-drop core
//!
//! Axis-aligned boxes, hit tests, and drop-zone resolution shared by the
//! boards that move pieces around (balance weights, counting sprites).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Box from a center point and full size
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Strict overlap test. Degenerate boxes never overlap anything.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.overlap_area(other) > 0.0
    }

    /// Area of the intersection, 0.0 when disjoint
    pub fn overlap_area(&self, other: &Aabb) -> f32 {
        let w = self.max.x.min(other.max.x) - self.min.x.max(other.min.x);
        let h = self.max.y.min(other.max.y) - self.min.y.max(other.min.y);
        if w > 0.0 && h > 0.0 { w * h } else { 0.0 }
    }

    /// Translate by an offset
    pub fn offset(&self, by: Vec2) -> Aabb {
        Aabb {
            min: self.min + by,
            max: self.max + by,
        }
    }
}

/// A live drag of one item
#[derive(Debug, Clone, Copy)]
pub struct DragSession {
    /// Id of the dragged item (game-specific meaning)
    pub item: u32,
    /// Pointer offset from the item's center at grab time
    pub grab_offset: Vec2,
    /// Current pointer position
    pub pos: Vec2,
    /// Item size, for bounds
    pub size: Vec2,
}

impl DragSession {
    /// Start dragging `item` grabbed at `pointer`, where the item is a box
    /// of `size` centered at `center`.
    pub fn begin(item: u32, pointer: Vec2, center: Vec2, size: Vec2) -> Self {
        Self {
            item,
            grab_offset: pointer - center,
            pos: pointer,
            size,
        }
    }

    pub fn move_to(&mut self, pointer: Vec2) {
        self.pos = pointer;
    }

    /// Item center implied by the current pointer position
    pub fn item_center(&self) -> Vec2 {
        self.pos - self.grab_offset
    }

    /// Item bounds at the current pointer position
    pub fn bounds(&self) -> Aabb {
        Aabb::centered(self.item_center(), self.size)
    }
}

/// A region items can be dropped into
#[derive(Debug, Clone, Copy)]
pub struct DropZone {
    pub id: u32,
    pub bounds: Aabb,
}

/// Resolve which zone a dropped item lands in.
///
/// The zone containing the item's center wins; otherwise the zone with the
/// largest overlap area. Ties resolve to the lowest zone id so resolution
/// is deterministic regardless of zone order.
pub fn resolve_drop(zones: &[DropZone], item: Aabb) -> Option<u32> {
    let center = item.center();
    let mut containing: Option<u32> = None;
    for zone in zones {
        if zone.bounds.contains(center) {
            containing = Some(containing.map_or(zone.id, |id| id.min(zone.id)));
        }
    }
    if containing.is_some() {
        return containing;
    }

    let mut best: Option<(f32, u32)> = None;
    for zone in zones {
        let area = zone.bounds.overlap_area(&item);
        if area <= 0.0 {
            continue;
        }
        best = Some(match best {
            None => (area, zone.id),
            Some((a, id)) if area > a || (area == a && zone.id < id) => (area, zone.id),
            Some(prev) => prev,
        });
    }
    best.map(|(_, id)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn zone(id: u32, x: f32, y: f32, w: f32, h: f32) -> DropZone {
        DropZone {
            id,
            bounds: Aabb::new(Vec2::new(x, y), Vec2::new(x + w, y + h)),
        }
    }

    #[test]
    fn test_overlap_area() {
        let a = Aabb::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = Aabb::new(Vec2::new(5.0, 5.0), Vec2::new(15.0, 15.0));
        assert_eq!(a.overlap_area(&b), 25.0);
        assert!(a.overlaps(&b));

        let c = Aabb::new(Vec2::new(10.0, 0.0), Vec2::new(20.0, 10.0));
        // Edge contact is not overlap
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_degenerate_box_never_overlaps() {
        let point = Aabb::new(Vec2::new(5.0, 5.0), Vec2::new(5.0, 5.0));
        let big = Aabb::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        assert!(!point.overlaps(&big));
        assert!(!big.overlaps(&point));
    }

    #[test]
    fn test_resolve_drop_center_wins() {
        let zones = [zone(1, 0.0, 0.0, 100.0, 100.0), zone(2, 90.0, 0.0, 100.0, 100.0)];
        // Item mostly inside zone 2 but centered in zone 1
        let item = Aabb::centered(Vec2::new(95.0, 50.0), Vec2::new(30.0, 30.0));
        // Center at 95 is inside both; tie resolves low id
        assert_eq!(resolve_drop(&zones, item), Some(1));

        let item = Aabb::centered(Vec2::new(130.0, 50.0), Vec2::new(30.0, 30.0));
        assert_eq!(resolve_drop(&zones, item), Some(2));
    }

    #[test]
    fn test_resolve_drop_overlap_fallback() {
        let zones = [zone(1, 0.0, 0.0, 50.0, 50.0), zone(2, 200.0, 0.0, 50.0, 50.0)];
        // Center in neither zone, but the box clips zone 1
        let item = Aabb::new(Vec2::new(40.0, 40.0), Vec2::new(80.0, 80.0));
        assert_eq!(resolve_drop(&zones, item), Some(1));
        // Completely outside everything
        let item = Aabb::new(Vec2::new(100.0, 100.0), Vec2::new(120.0, 120.0));
        assert_eq!(resolve_drop(&zones, item), None);
    }

    #[test]
    fn test_drag_session_tracks_grab_offset() {
        let mut drag = DragSession::begin(
            7,
            Vec2::new(12.0, 8.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(20.0, 20.0),
        );
        drag.move_to(Vec2::new(52.0, 48.0));
        // Item center keeps the same offset from the pointer
        assert_eq!(drag.item_center(), Vec2::new(50.0, 50.0));
        assert_eq!(drag.bounds().min, Vec2::new(40.0, 40.0));
    }

    proptest! {
        /// Wherever the item lands, a zone that contains its center is
        /// always preferred over any zone that merely overlaps it.
        #[test]
        fn prop_center_containment_beats_overlap(
            cx in -50.0f32..250.0,
            cy in -50.0f32..150.0,
        ) {
            let zones = [
                zone(1, 0.0, 0.0, 100.0, 100.0),
                zone(2, 120.0, 0.0, 100.0, 100.0),
            ];
            let item = Aabb::centered(Vec2::new(cx, cy), Vec2::new(40.0, 40.0));
            if let Some(id) = resolve_drop(&zones, item) {
                let center = item.center();
                let chosen = &zones[(id - 1) as usize];
                let any_contains = zones.iter().any(|z| z.bounds.contains(center));
                if any_contains {
                    prop_assert!(chosen.bounds.contains(center));
                } else {
                    prop_assert!(chosen.bounds.overlap_area(&item) > 0.0);
                }
            }
        }
    }
}
