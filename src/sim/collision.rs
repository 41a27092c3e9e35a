//! Oriented rectangle collision for hazards against the tilting balance rod
//!
//! The rod rotates with the walker, so hazard boxes are tested in the rod's local
//! frame with a separating-axis test. `obb_intersects` is pure and allocation-free.

use glam::Vec2;

use crate::consts::{PIVOT_X, PIVOT_Y};
use crate::rotate_deg;

/// Rod rotation anchor relative to the balance pivot
pub const ROD_ANCHOR_OFFSET: Vec2 = Vec2::new(7.0, 2.0);
/// Rod centre above the anchor (along the walker's body)
pub const ROD_RAISE: f32 = 265.0;
/// Rod art thickness
pub const ROD_WIDTH: f32 = 30.0;
/// Padding added to both rod half-extents
pub const COLLISION_MARGIN: f32 = 3.0;
/// Coarse-rejection slack around the rod
const COARSE_SLACK: f32 = 50.0;

/// A rectangle with a centre, half-extents and a rotation (degrees, screen clockwise)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedRect {
    pub center: Vec2,
    pub half_extents: Vec2,
    pub angle_deg: f32,
}

impl OrientedRect {
    pub fn new(center: Vec2, half_extents: Vec2, angle_deg: f32) -> Self {
        Self {
            center,
            half_extents,
            angle_deg,
        }
    }

    /// Unit axes (local x, local y) in world space
    #[inline]
    pub fn axes(&self) -> [Vec2; 2] {
        let x = rotate_deg(Vec2::X, self.angle_deg);
        [x, x.perp()]
    }

    /// Half the projected width onto `axis`
    #[inline]
    fn projected_radius(&self, axis: Vec2) -> f32 {
        let [ax, ay] = self.axes();
        self.half_extents.x * ax.dot(axis).abs() + self.half_extents.y * ay.dot(axis).abs()
    }

    pub fn corners(&self) -> [Vec2; 4] {
        let [ax, ay] = self.axes();
        let ex = ax * self.half_extents.x;
        let ey = ay * self.half_extents.y;
        [
            self.center - ex - ey,
            self.center + ex - ey,
            self.center + ex + ey,
            self.center - ex + ey,
        ]
    }
}

/// Separating-axis test between two oriented rectangles.
///
/// Touching edges count as overlap.
pub fn obb_intersects(a: &OrientedRect, b: &OrientedRect) -> bool {
    let offset = b.center - a.center;
    let [a0, a1] = a.axes();
    let [b0, b1] = b.axes();
    for axis in [a0, a1, b0, b1] {
        let distance = offset.dot(axis).abs();
        if distance > a.projected_radius(axis) + b.projected_radius(axis) {
            return false;
        }
    }
    true
}

/// World-space rotation anchor of the rod
pub fn rod_anchor() -> Vec2 {
    Vec2::new(PIVOT_X, PIVOT_Y) + ROD_ANCHOR_OFFSET
}

/// The rod's collision rectangle at a given half-length and tilt
pub fn rod_rect(rod_length: f32, sway_deg: f32) -> OrientedRect {
    let center = rod_anchor() + rotate_deg(Vec2::new(0.0, -ROD_RAISE), sway_deg);
    OrientedRect::new(
        center,
        Vec2::new(rod_length + COLLISION_MARGIN, ROD_WIDTH / 2.0 + COLLISION_MARGIN),
        sway_deg,
    )
}

/// Does an axis-aligned hazard box touch the tilted rod?
///
/// The hazard is moved into the rod's frame first; far-away hazards are rejected
/// before the full SAT test.
pub fn hazard_hits_rod(
    hazard_pos: Vec2,
    hazard_size: Vec2,
    rod_length: f32,
    sway_deg: f32,
) -> bool {
    let rod = rod_rect(rod_length, sway_deg);
    let local = rotate_deg(hazard_pos - rod.center, -sway_deg);
    let hazard_half = hazard_size / 2.0;

    // Coarse reject on the bounding circle, then per local axis
    if local.length() > rod.half_extents.x + hazard_half.length() + COARSE_SLACK {
        return false;
    }
    if local.x.abs() > rod.half_extents.x + hazard_half.max_element() + COARSE_SLACK {
        return false;
    }
    if local.y.abs() > rod.half_extents.y + hazard_half.max_element() + COARSE_SLACK {
        return false;
    }

    // In the rod frame the rod is axis-aligned and the hazard is counter-rotated
    let rod_local = OrientedRect::new(Vec2::ZERO, rod.half_extents, 0.0);
    let hazard_local = OrientedRect::new(local, hazard_half, -sway_deg);
    obb_intersects(&rod_local, &hazard_local)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(center: Vec2, half: f32, angle: f32) -> OrientedRect {
        OrientedRect::new(center, Vec2::splat(half), angle)
    }

    #[test]
    fn test_axis_aligned_overlap_and_gap() {
        let a = square(Vec2::ZERO, 10.0, 0.0);
        assert!(obb_intersects(&a, &square(Vec2::new(15.0, 0.0), 10.0, 0.0)));
        assert!(!obb_intersects(&a, &square(Vec2::new(25.0, 0.0), 4.0, 0.0)));
    }

    #[test]
    fn test_touching_counts_as_overlap() {
        let a = square(Vec2::ZERO, 10.0, 0.0);
        let b = square(Vec2::new(20.0, 0.0), 10.0, 0.0);
        assert!(obb_intersects(&a, &b));
    }

    #[test]
    fn test_rotated_diamond_corner_gap() {
        // A 45° square near the corner of an axis-aligned one: AABBs overlap, shapes don't
        let a = square(Vec2::ZERO, 10.0, 0.0);
        let b = square(Vec2::new(22.0, 22.0), 10.0, 45.0);
        assert!(!obb_intersects(&a, &b));
        // Slide it closer and it touches
        let c = square(Vec2::new(16.0, 16.0), 10.0, 45.0);
        assert!(obb_intersects(&a, &c));
    }

    #[test]
    fn test_symmetric() {
        let a = OrientedRect::new(Vec2::new(3.0, -4.0), Vec2::new(40.0, 5.0), 30.0);
        let b = OrientedRect::new(Vec2::new(20.0, 10.0), Vec2::new(8.0, 8.0), -10.0);
        assert_eq!(obb_intersects(&a, &b), obb_intersects(&b, &a));
    }

    #[test]
    fn test_corners_of_rotated_rect() {
        let r = OrientedRect::new(Vec2::ZERO, Vec2::new(10.0, 5.0), 90.0);
        let corners = r.corners();
        // Rotated 90°, the long side runs along screen y
        for c in corners {
            assert!((c.x.abs() - 5.0).abs() < 1e-4);
            assert!((c.y.abs() - 10.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_hazard_on_level_rod_end() {
        let rod_length = 120.0;
        let center = rod_rect(rod_length, 0.0).center;
        let at_tip = center + Vec2::new(rod_length, 0.0);
        assert!(hazard_hits_rod(at_tip, Vec2::splat(40.0), rod_length, 0.0));
        // Above the rod, clear of its thickness
        let above = center + Vec2::new(60.0, -60.0);
        assert!(!hazard_hits_rod(above, Vec2::splat(40.0), rod_length, 0.0));
    }

    #[test]
    fn test_hazard_follows_rod_tilt() {
        let rod_length = 120.0;
        let level_tip = rod_rect(rod_length, 0.0).center + Vec2::new(-(rod_length - 10.0), 0.0);
        // At a 40° right tilt the whole rod swings right, away from the old left tip
        assert!(hazard_hits_rod(level_tip, Vec2::splat(30.0), rod_length, 0.0));
        assert!(!hazard_hits_rod(level_tip, Vec2::splat(30.0), rod_length, 40.0));

        let tilted = rod_rect(rod_length, 40.0);
        let tilted_tip = tilted.center + rotate_deg(Vec2::new(rod_length - 10.0, 0.0), 40.0);
        assert!(hazard_hits_rod(tilted_tip, Vec2::splat(30.0), rod_length, 40.0));
    }

    #[test]
    fn test_far_hazard_rejected() {
        assert!(!hazard_hits_rod(Vec2::new(-500.0, -500.0), Vec2::splat(60.0), 195.0, 0.0));
    }
}
