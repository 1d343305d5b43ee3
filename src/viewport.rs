//! Viewport transform between world and screen space
//!
//! `screen = world * scale + translation`. The viewport is purely a view
//! concern: nothing here feeds back into the physics.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Default surface width in pixels
pub const DEFAULT_WIDTH: f32 = 800.0;

/// Default surface height in pixels
pub const DEFAULT_HEIGHT: f32 = 600.0;

/// Screen transform state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Zoom level (1.0 = 100%)
    pub scale: f32,
    /// Screen position of the world origin
    pub translation: Vec2,
    /// Drawing surface size in pixels
    pub size: Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl Viewport {
    /// Viewport of the given size with the world origin at the center
    pub fn new(width: f32, height: f32) -> Self {
        let size = Vec2::new(width, height);
        Self {
            scale: 1.0,
            translation: size / 2.0,
            size,
        }
    }

    /// Convert world coordinates to screen coordinates
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world * self.scale + self.translation
    }

    /// Convert screen coordinates to world coordinates
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.translation) / self.scale
    }

    /// Convert a screen-space displacement to a world-space displacement
    pub fn screen_delta_to_world(&self, delta: Vec2) -> Vec2 {
        delta / self.scale
    }

    /// Pan the view by a screen-space delta
    pub fn pan(&mut self, delta: Vec2) {
        if delta.is_finite() {
            self.translation += delta;
        }
    }

    /// Multiply the scale by `factor`, keeping the world point under `anchor` fixed
    ///
    /// The resulting scale is clamped to `[min_scale, max_scale]`. Non-positive
    /// or non-finite factors are ignored.
    pub fn zoom_at(&mut self, factor: f32, anchor: Vec2, min_scale: f32, max_scale: f32) {
        if !factor.is_finite() || factor <= 0.0 || !anchor.is_finite() {
            return;
        }

        let world_anchor = self.screen_to_world(anchor);
        self.scale = (self.scale * factor).clamp(min_scale, max_scale);
        self.translation = anchor - world_anchor * self.scale;
    }

    /// Resize the drawing surface, keeping the view centered on the same world point
    pub fn resize(&mut self, width: f32, height: f32) {
        let size = Vec2::new(width, height);
        if !size.is_finite() || size.min_element() <= 0.0 {
            return;
        }
        let center = self.screen_to_world(self.size / 2.0);
        self.size = size;
        self.translation = size / 2.0 - center * self.scale;
    }

    /// Scale and center so `bounds` fills the surface minus `padding` on each side
    pub fn fit_to_bounds(
        &mut self,
        bounds: &BoundingBox,
        padding: f32,
        min_scale: f32,
        max_scale: f32,
    ) {
        if bounds.is_empty() {
            return;
        }

        let available = (self.size - Vec2::splat(2.0 * padding)).max(Vec2::ONE);
        let scale_x = available.x / bounds.width();
        let scale_y = available.y / bounds.height();
        self.scale = scale_x.min(scale_y).clamp(min_scale, max_scale);
        self.translation = self.size / 2.0 - bounds.center() * self.scale;
    }

    /// Screen-space rectangle of the surface grown by `margin` on every side
    pub fn visible_rect(&self, margin: f32) -> BoundingBox {
        BoundingBox {
            min_x: -margin,
            max_x: self.size.x + margin,
            min_y: -margin,
            max_y: self.size.y + margin,
        }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl BoundingBox {
    /// Create an empty bounding box
    pub fn empty() -> Self {
        Self {
            min_x: f32::INFINITY,
            max_x: f32::NEG_INFINITY,
            min_y: f32::INFINITY,
            max_y: f32::NEG_INFINITY,
        }
    }

    /// Check if the bounding box is empty
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Expand the bounding box to include a point
    pub fn include_point(&mut self, point: Vec2) {
        self.min_x = self.min_x.min(point.x);
        self.max_x = self.max_x.max(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_y = self.max_y.max(point.y);
    }

    /// Expand the bounding box to include a circle
    pub fn include_circle(&mut self, center: Vec2, radius: f32) {
        self.include_point(center - Vec2::splat(radius));
        self.include_point(center + Vec2::splat(radius));
    }

    /// Width of the bounding box
    pub fn width(&self) -> f32 {
        (self.max_x - self.min_x).max(1.0)
    }

    /// Height of the bounding box
    pub fn height(&self) -> f32 {
        (self.max_y - self.min_y).max(1.0)
    }

    /// Center point
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Whether a circle overlaps the box
    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        center.x + radius >= self.min_x
            && center.x - radius <= self.max_x
            && center.y + radius >= self.min_y
            && center.y - radius <= self.max_y
    }

    /// Whether the segment's bounding box overlaps the box
    ///
    /// Conservative: a segment passing diagonally near a corner may report an
    /// overlap it does not have.
    pub fn intersects_segment(&self, from: Vec2, to: Vec2) -> bool {
        from.x.max(to.x) >= self.min_x
            && from.x.min(to.x) <= self.max_x
            && from.y.max(to.y) >= self.min_y
            && from.y.min(to.y) <= self.max_y
    }
}
