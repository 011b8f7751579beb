//! Mapping between content scroll offsets and scrollbar thumb positions.

use serde::Serialize;

/// Smallest thumb the mapper will produce, in track pixels.
pub const DEFAULT_MIN_THUMB_EXTENT: f64 = 12.0;

/// What the renderer needs to draw one scrollbar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollbarGeometry {
    /// False when the content fits and no scrollbar is shown.
    pub visible: bool,
    /// Thumb length along the track.
    pub thumb_extent: f64,
    /// Thumb start along the track.
    pub thumb_position: f64,
}

impl ScrollbarGeometry {
    /// Geometry of a scrollbar that is not shown.
    pub const HIDDEN: ScrollbarGeometry = ScrollbarGeometry {
        visible: false,
        thumb_extent: 0.0,
        thumb_position: 0.0,
    };
}

/// Scroll/thumb conversion for one axis at one content and viewport extent.
///
/// The track is as long as the viewport. The ratio between thumb travel and
/// content travel is derived from the travel distances themselves, so it stays
/// correct when the minimum thumb size kicks in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollbarMapper {
    thumb_extent: f64,
    thumb_max_travel: f64,
    content_max_travel: f64,
    ratio: f64,
}

impl ScrollbarMapper {
    /// Build a mapper, or `None` if the content fits in the viewport.
    pub fn new(content_extent: f64, viewport_extent: f64, min_thumb_extent: f64) -> Option<Self> {
        if !content_extent.is_finite()
            || !viewport_extent.is_finite()
            || viewport_extent <= 0.0
            || content_extent <= viewport_extent
        {
            return None;
        }
        let proportional = viewport_extent * viewport_extent / content_extent;
        let thumb_extent = proportional
            .max(min_thumb_extent.max(0.0))
            .min(viewport_extent);
        let thumb_max_travel = viewport_extent - thumb_extent;
        let content_max_travel = content_extent - viewport_extent;
        // A viewport shorter than the minimum thumb leaves no room to travel.
        let ratio = if thumb_max_travel > 0.0 {
            thumb_max_travel / content_max_travel
        } else {
            0.0
        };
        Some(Self {
            thumb_extent,
            thumb_max_travel,
            content_max_travel,
            ratio,
        })
    }

    /// Thumb length along the track.
    pub fn thumb_extent(&self) -> f64 {
        self.thumb_extent
    }

    /// Furthest the thumb can travel from the track start.
    pub fn thumb_max_travel(&self) -> f64 {
        self.thumb_max_travel
    }

    /// Furthest the content can scroll.
    pub fn content_max_travel(&self) -> f64 {
        self.content_max_travel
    }

    /// Thumb travel per content pixel.
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Clamp a proposed thumb position to the track.
    pub fn clamp_thumb(&self, thumb_position: f64) -> f64 {
        if thumb_position.is_nan() {
            return 0.0;
        }
        thumb_position.clamp(0.0, self.thumb_max_travel)
    }

    /// Thumb position for a content scroll offset.
    pub fn thumb_position(&self, scroll_offset: f64) -> f64 {
        self.clamp_thumb(scroll_offset * self.ratio)
    }

    /// Content scroll offset for a (possibly out-of-track) thumb position.
    pub fn scroll_offset_for_thumb(&self, thumb_position: f64) -> f64 {
        if self.ratio <= 0.0 {
            return 0.0;
        }
        let thumb = self.clamp_thumb(thumb_position);
        if thumb >= self.thumb_max_travel {
            return self.content_max_travel;
        }
        (thumb / self.ratio).clamp(0.0, self.content_max_travel)
    }

    /// Drawable geometry at `scroll_offset`.
    pub fn geometry(&self, scroll_offset: f64) -> ScrollbarGeometry {
        ScrollbarGeometry {
            visible: true,
            thumb_extent: self.thumb_extent,
            thumb_position: self.thumb_position(scroll_offset),
        }
    }
}

/// Geometry for `content_extent` in `viewport_extent`, hidden when it fits.
pub fn scrollbar_geometry(
    content_extent: f64,
    viewport_extent: f64,
    min_thumb_extent: f64,
    scroll_offset: f64,
) -> ScrollbarGeometry {
    ScrollbarMapper::new(content_extent, viewport_extent, min_thumb_extent)
        .map_or(ScrollbarGeometry::HIDDEN, |mapper| {
            mapper.geometry(scroll_offset)
        })
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_when_content_fits() {
        assert!(ScrollbarMapper::new(500.0, 500.0, 12.0).is_none());
        assert!(ScrollbarMapper::new(100.0, 500.0, 12.0).is_none());
        assert!(ScrollbarMapper::new(f64::NAN, 500.0, 12.0).is_none());
        assert_eq!(
            scrollbar_geometry(100.0, 500.0, 12.0, 0.0),
            ScrollbarGeometry::HIDDEN
        );
    }

    #[test]
    fn test_proportional_thumb() {
        let mapper = ScrollbarMapper::new(2000.0, 500.0, 12.0).unwrap();
        assert_eq!(mapper.thumb_extent(), 125.0);
        assert_eq!(mapper.thumb_max_travel(), 375.0);
        assert_eq!(mapper.content_max_travel(), 1500.0);
        assert_eq!(mapper.ratio(), 0.25);
        assert_eq!(mapper.thumb_position(1500.0), 375.0);
        assert_eq!(mapper.scroll_offset_for_thumb(375.0), 1500.0);
    }

    #[test]
    fn test_minimum_thumb_uses_travel_ratio() {
        // 10M px of content in a 500 px viewport: proportional thumb is 0.025 px.
        let mapper = ScrollbarMapper::new(10_000_000.0, 500.0, 12.0).unwrap();
        assert_eq!(mapper.thumb_extent(), 12.0);
        assert_eq!(mapper.thumb_max_travel(), 488.0);
        // Dragging to the end must reach the end of the content exactly.
        assert_eq!(mapper.scroll_offset_for_thumb(488.0), 9_999_500.0);
        assert!((mapper.thumb_position(9_999_500.0) - 488.0).abs() < 1e-9);
        // The naive viewport/content ratio would stop far short.
        assert!(488.0 / (500.0 / 10_000_000.0) < 9_999_000.0);
    }

    #[test]
    fn test_drag_past_track_clamps() {
        let mapper = ScrollbarMapper::new(2000.0, 500.0, 12.0).unwrap();
        assert_eq!(mapper.scroll_offset_for_thumb(-40.0), 0.0);
        assert_eq!(mapper.scroll_offset_for_thumb(9_000.0), 1500.0);
        assert_eq!(mapper.thumb_position(-10.0), 0.0);
        assert_eq!(mapper.thumb_position(1e9), 375.0);
    }

    #[test]
    fn test_viewport_smaller_than_min_thumb() {
        let mapper = ScrollbarMapper::new(1000.0, 8.0, 12.0).unwrap();
        assert_eq!(mapper.thumb_extent(), 8.0);
        assert_eq!(mapper.ratio(), 0.0);
        assert_eq!(mapper.scroll_offset_for_thumb(4.0), 0.0);
        assert_eq!(mapper.thumb_position(500.0), 0.0);
    }

    #[test]
    fn test_geometry_serializes_camel_case() {
        let geometry = scrollbar_geometry(2000.0, 500.0, 12.0, 400.0);
        let json = serde_json::to_value(geometry).unwrap();
        assert_eq!(json["visible"], true);
        assert_eq!(json["thumbExtent"], 125.0);
        assert_eq!(json["thumbPosition"], 100.0);
    }
}
