//! Viewport module for pan/zoom transforms between screen and canvas space.

use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest allowed zoom level.
pub const MIN_SCALE: f64 = 0.1;
/// Largest allowed zoom level.
pub const MAX_SCALE: f64 = 2.0;

/// Viewport holds the view transform for the canvas.
///
/// Canvas coordinates are the space element positions and sizes live in.
/// Screen coordinates are pixels relative to the canvas container. The
/// mapping is `screen = canvas * scale + pan`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Canvas-origin offset in screen pixels.
    pub pan: Vec2,
    /// Current zoom level (1.0 = 100%).
    scale: f64,
    /// Minimum allowed zoom level.
    pub min_scale: f64,
    /// Maximum allowed zoom level.
    pub max_scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            scale: 1.0,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
        }
    }
}

impl Viewport {
    /// Create a viewport at 100% with no pan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a viewport with custom scale bounds.
    ///
    /// Inverted bounds are swapped. The initial scale is clamped into them.
    pub fn with_limits(min_scale: f64, max_scale: f64) -> Self {
        let mut viewport = Self {
            min_scale: min_scale.min(max_scale),
            max_scale: max_scale.max(min_scale),
            ..Self::default()
        };
        viewport.scale = viewport.clamp_scale(viewport.scale);
        viewport
    }

    /// Current zoom level.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Zoom level as a rounded percentage, for the zoom indicator.
    pub fn zoom_percent(&self) -> u32 {
        (self.scale * 100.0).round() as u32
    }

    /// Set the zoom level without moving the pan. The value is clamped.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = self.clamp_scale(scale);
    }

    fn clamp_scale(&self, scale: f64) -> f64 {
        if scale.is_nan() {
            return self.scale;
        }
        // The bounds are public; never trust their order
        let low = self.min_scale.min(self.max_scale);
        let high = self.min_scale.max(self.max_scale);
        scale.max(low).min(high)
    }

    /// Affine transform from canvas to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.scale)
    }

    /// Affine transform from screen to canvas coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.pan)
    }

    /// Convert a screen point to canvas coordinates.
    pub fn screen_to_canvas(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a canvas point to screen coordinates.
    pub fn canvas_to_screen(&self, canvas_point: Point) -> Point {
        self.transform() * canvas_point
    }

    /// Convert a pointer delta measured in screen pixels to canvas units.
    pub fn screen_delta_to_canvas(&self, delta: Vec2) -> Vec2 {
        delta / self.scale
    }

    /// Pan the viewport by a delta in screen coordinates.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Change the zoom level while keeping the canvas point under
    /// `screen_anchor` at the same screen position.
    pub fn zoom_around_point(&mut self, screen_anchor: Point, new_scale: f64) {
        let anchor_canvas = self.screen_to_canvas(screen_anchor);
        self.scale = self.clamp_scale(new_scale);
        self.pan = screen_anchor.to_vec2() - anchor_canvas.to_vec2() * self.scale;
    }

    /// Zoom by an additive step around a screen anchor.
    pub fn zoom_by(&mut self, screen_anchor: Point, step: f64) {
        self.zoom_around_point(screen_anchor, self.scale + step);
    }

    /// Reset to 100% with no pan.
    pub fn reset(&mut self) {
        self.pan = Vec2::ZERO;
        self.scale = 1.0;
    }

    /// Fit a page of `page` size into a container and center it.
    ///
    /// Never zooms in past 100%.
    pub fn fit_to_page(&mut self, page: Size, container: Size) {
        if page.width <= 0.0 || page.height <= 0.0 {
            self.reset();
            return;
        }

        let scale_x = container.width / page.width;
        let scale_y = container.height / page.height;
        self.scale = self.clamp_scale(scale_x.min(scale_y).min(1.0));

        let scaled = Size::new(page.width * self.scale, page.height * self.scale);
        self.pan = Vec2::new(
            (container.width - scaled.width) / 2.0,
            (container.height - scaled.height) / 2.0,
        );
    }
}
