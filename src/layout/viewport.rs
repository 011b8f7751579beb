//! Scroll position and size of the scrollable grid area.

use serde::Serialize;

/// The visible part of the grid, excluding the header strips.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// Horizontal scroll position in sheet coordinates
    pub scroll_x: f64,
    /// Vertical scroll position in sheet coordinates
    pub scroll_y: f64,
    /// Grid area width in pixels
    pub width: f64,
    /// Grid area height in pixels
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// Largest valid scroll offset for `content` shown in `area`.
pub fn max_scroll(content: f64, area: f64) -> f64 {
    (content - area).max(0.0)
}

fn clamp_axis(offset: f64, content: f64, area: f64) -> f64 {
    if offset.is_nan() {
        return 0.0;
    }
    offset.clamp(0.0, max_scroll(content, area))
}

impl Viewport {
    /// Viewport of the given area, scrolled to the origin.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Clamp the scroll position so the area never runs past the content.
    pub fn clamp_scroll(&mut self, content_width: f64, content_height: f64) {
        self.scroll_x = clamp_axis(self.scroll_x, content_width, self.width);
        self.scroll_y = clamp_axis(self.scroll_y, content_height, self.height);
    }

    /// Scroll by a wheel/drag delta.
    ///
    /// Returns the applied `(dx, dy)` after clamping, or `None` if the
    /// position did not change.
    pub fn scroll_by(
        &mut self,
        delta_x: f64,
        delta_y: f64,
        content_width: f64,
        content_height: f64,
    ) -> Option<(f64, f64)> {
        self.set_scroll(
            self.scroll_x + delta_x,
            self.scroll_y + delta_y,
            content_width,
            content_height,
        )
    }

    /// Set the absolute scroll position, clamped. Same return as [`Viewport::scroll_by`].
    pub fn set_scroll(
        &mut self,
        x: f64,
        y: f64,
        content_width: f64,
        content_height: f64,
    ) -> Option<(f64, f64)> {
        let new_x = clamp_axis(x, content_width, self.width);
        let new_y = clamp_axis(y, content_height, self.height);
        let dx = new_x - self.scroll_x;
        let dy = new_y - self.scroll_y;
        if dx.abs() > f64::EPSILON || dy.abs() > f64::EPSILON {
            self.scroll_x = new_x;
            self.scroll_y = new_y;
            return Some((dx, dy));
        }
        None
    }

    /// Resize the grid area. Negative sizes collapse to zero.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    /// Convert sheet coordinates to grid-area coordinates
    pub fn to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.scroll_x, y - self.scroll_y)
    }

    /// Convert grid-area coordinates to sheet coordinates
    pub fn to_sheet(&self, screen_x: f64, screen_y: f64) -> (f64, f64) {
        (screen_x + self.scroll_x, screen_y + self.scroll_y)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_by_clamps_and_reports_delta() {
        let mut viewport = Viewport::new(500.0, 300.0);
        assert_eq!(
            viewport.scroll_by(120.0, -50.0, 2000.0, 1000.0),
            Some((120.0, 0.0))
        );
        assert_eq!(viewport.scroll_by(0.0, -10.0, 2000.0, 1000.0), None);
        assert_eq!(
            viewport.scroll_by(9999.0, 9999.0, 2000.0, 1000.0),
            Some((1380.0, 700.0))
        );
        assert_eq!(viewport.scroll_x, 1500.0);
        assert_eq!(viewport.scroll_y, 700.0);
    }

    #[test]
    fn test_content_smaller_than_area_pins_to_origin() {
        let mut viewport = Viewport::new(500.0, 300.0);
        assert_eq!(viewport.set_scroll(40.0, 40.0, 100.0, 100.0), None);
        assert_eq!((viewport.scroll_x, viewport.scroll_y), (0.0, 0.0));
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut viewport = Viewport::new(500.0, 300.0);
        viewport.set_scroll(1500.0, 0.0, 2000.0, 300.0);
        viewport.clamp_scroll(800.0, 300.0);
        assert_eq!(viewport.scroll_x, 300.0);
    }

    #[test]
    fn test_coordinate_round_trip() {
        let mut viewport = Viewport::new(500.0, 300.0);
        viewport.set_scroll(100.0, 40.0, 2000.0, 1000.0);
        assert_eq!(viewport.to_sheet(10.0, 10.0), (110.0, 50.0));
        assert_eq!(viewport.to_screen(110.0, 50.0), (10.0, 10.0));
    }

    #[test]
    fn test_nan_scroll_resets() {
        let mut viewport = Viewport::new(500.0, 300.0);
        viewport.set_scroll(f64::NAN, 10.0, 2000.0, 1000.0);
        assert_eq!(viewport.scroll_x, 0.0);
        assert_eq!(viewport.scroll_y, 10.0);
    }
}
