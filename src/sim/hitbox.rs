//! Hitbox geometry for the player and obstacles
//!
//! Every entity is drawn in a rectangular frame anchored at its bottom-centre
//! (the "feet"). A hitbox profile is a rectangle placed inside that frame,
//! offset from the frame's top-left corner.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Collision rectangle relative to an entity's frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitboxProfile {
    pub width: f32,
    pub height: f32,
    /// Horizontal offset from the frame's left edge
    pub offset_x: f32,
    /// Vertical offset from the frame's top edge
    pub offset_y: f32,
}

impl HitboxProfile {
    pub const fn new(width: f32, height: f32, offset_x: f32, offset_y: f32) -> Self {
        Self {
            width,
            height,
            offset_x,
            offset_y,
        }
    }

    /// A profile covering the whole frame
    pub const fn full(width: f32, height: f32) -> Self {
        Self::new(width, height, 0.0, 0.0)
    }

    /// Place the profile in world space
    ///
    /// `anchor` is the frame's bottom-centre; `frame` and the profile are
    /// both multiplied by `scale`.
    pub fn world_rect(&self, anchor: Vec2, frame: Vec2, scale: f32) -> Aabb {
        let frame = frame * scale;
        let frame_top_left = Vec2::new(anchor.x - frame.x / 2.0, anchor.y - frame.y);
        let min = frame_top_left + Vec2::new(self.offset_x, self.offset_y) * scale;
        Aabb {
            min,
            max: min + Vec2::new(self.width, self.height) * scale,
        }
    }
}

/// Axis-aligned bounding box in world space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Strict overlap: rectangles that only share an edge do not touch
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_rect_running_profile() {
        // 152x140 frame with feet at (250, 370)
        let profile = HitboxProfile::new(50.0, 120.0, 50.0, 20.0);
        let rect = profile.world_rect(Vec2::new(250.0, 370.0), Vec2::new(152.0, 140.0), 1.0);

        assert_eq!(rect.min, Vec2::new(224.0, 250.0));
        assert_eq!(rect.max, Vec2::new(274.0, 370.0));
    }

    #[test]
    fn test_world_rect_scaled() {
        let profile = HitboxProfile::full(40.0, 20.0);
        let rect = profile.world_rect(Vec2::new(0.0, 100.0), Vec2::new(40.0, 20.0), 2.0);

        assert_eq!(rect.width(), 80.0);
        assert_eq!(rect.height(), 40.0);
        assert_eq!(rect.max.y, 100.0);
    }

    #[test]
    fn test_overlap() {
        let a = Aabb {
            min: Vec2::new(0.0, 0.0),
            max: Vec2::new(10.0, 10.0),
        };
        let b = Aabb {
            min: Vec2::new(5.0, 5.0),
            max: Vec2::new(15.0, 15.0),
        };
        let touching = Aabb {
            min: Vec2::new(10.0, 0.0),
            max: Vec2::new(20.0, 10.0),
        };

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&touching));
    }
}
