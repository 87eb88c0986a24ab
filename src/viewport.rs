//! Zoom level and pan offset, and conversions between logical and screen space.
//!
//! `screen = logical * zoom + pan`. Logical coordinates are what the model
//! stores; screen coordinates are host pixels relative to the canvas origin.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::{Point, Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Added to or subtracted from the zoom level per step.
    pub zoom_step: f64,
    /// Multiplier applied to pointer deltas while panning.
    pub pan_damping: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.25,
            max_zoom: 3.0,
            zoom_step: 0.1,
            pan_damping: 1.0,
        }
    }
}

impl ViewportConfig {
    /// Clamp `zoom` into `[min_zoom, max_zoom]`. Never panics, even on
    /// bounds that [`validate`](Self::validate) would reject.
    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.max(self.min_zoom).min(self.max_zoom)
    }

    /// Zoom bounds must be finite with `0 < min_zoom <= max_zoom`; the step
    /// must be finite and positive, the damping finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_zoom.is_finite() || !self.max_zoom.is_finite() {
            return Err(ConfigError::Viewport("min_zoom and max_zoom must be finite"));
        }
        if self.min_zoom <= 0.0 {
            return Err(ConfigError::Viewport("min_zoom must be greater than 0"));
        }
        if self.min_zoom > self.max_zoom {
            return Err(ConfigError::Viewport("min_zoom must not exceed max_zoom"));
        }
        if !self.zoom_step.is_finite() || self.zoom_step <= 0.0 {
            return Err(ConfigError::Viewport("zoom_step must be a positive number"));
        }
        if !self.pan_damping.is_finite() {
            return Err(ConfigError::Viewport("pan_damping must be finite"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    zoom: f64,
    pan: Point,
    size: Size,
    config: ViewportConfig,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}

impl Viewport {
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            zoom: config.clamp(1.0),
            pan: Point::default(),
            size: Size::default(),
            config,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Non-finite offsets are ignored.
    pub fn set_pan(&mut self, pan: Point) {
        if pan.x.is_finite() && pan.y.is_finite() {
            self.pan = pan;
        }
    }

    /// Centre of the visible area in screen space.
    pub fn center(&self) -> Point {
        Point::new(self.size.width / 2.0, self.size.height / 2.0)
    }

    pub fn logical_to_screen(&self, p: Point) -> Point {
        p * self.zoom + self.pan
    }

    pub fn screen_to_logical(&self, p: Point) -> Point {
        (p - self.pan) / self.zoom
    }

    pub fn rect_to_screen(&self, r: Rect) -> Rect {
        let origin = self.logical_to_screen(r.origin());
        Rect::new(origin.x, origin.y, r.width * self.zoom, r.height * self.zoom)
    }

    /// A pixel size that tracks zoom but never drops below `min`.
    pub fn scaled_px(&self, base: f64, min: f64) -> f64 {
        (base * self.zoom).round().max(min)
    }

    /// Shift the view by a screen-space pointer delta.
    pub fn pan_by(&mut self, delta: Point) {
        self.pan = self.pan + delta * self.config.pan_damping;
    }

    /// Set the zoom level keeping the logical point under `focus` fixed on
    /// screen. `focus` defaults to the viewport centre.
    ///
    /// Returns `false` when the clamped target equals the current zoom, or
    /// when `target` is not a finite number.
    pub fn zoom_to(&mut self, target: f64, focus: Option<Point>) -> bool {
        if !target.is_finite() {
            return false;
        }
        let z0 = self.zoom;
        let z1 = self.config.clamp(target);
        if z1 == z0 || z1 <= 0.0 {
            return false;
        }

        let focus = focus.unwrap_or_else(|| self.center());
        // Canvas space is screen space before the pan is applied.
        let focus_canvas = focus - self.pan;
        let focus_logical = focus_canvas / z0;
        self.zoom = z1;
        let new_focus_canvas = focus_logical * z1;
        self.pan = self.pan - (new_focus_canvas - focus_canvas);
        true
    }

    pub fn zoom_in(&mut self, focus: Option<Point>) -> bool {
        self.zoom_to(self.zoom + self.config.zoom_step, focus)
    }

    pub fn zoom_out(&mut self, focus: Option<Point>) -> bool {
        self.zoom_to(self.zoom - self.config.zoom_step, focus)
    }

    pub fn reset_zoom(&mut self, focus: Option<Point>) -> bool {
        self.zoom_to(1.0, focus)
    }

    /// Back to zoom 1.0 with no pan.
    pub fn reset(&mut self) {
        self.zoom = self.config.clamp(1.0);
        self.pan = Point::default();
    }
}
