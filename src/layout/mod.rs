//! Axis offset index and viewport layout.
//!
//! This module handles:
//! - Sparse per-axis size models and analytic offset resolution
//! - Background prefix-sum indexing into generation-gated caches
//! - Scroll offset → index lookup and visible windows
//! - Scrollbar thumb math and viewport scroll state

mod axis;
mod axis_model;
mod grid_layout;
mod indexer;
mod locator;
mod offset_cache;
pub mod resolver;
mod scrollbar;
mod viewport;
mod window;

pub use axis::Axis;
pub use axis_model::AxisModel;
pub use grid_layout::{CellRect, GridLayout, VisibleCell};
pub use indexer::{
    BackgroundIndexer, DeferredSpawner, IndexJob, IndexWorker, JobQueue, JobStatus, Spawner,
    ThreadSpawner, DEFAULT_CHUNK_SIZE,
};
pub use locator::{index_at, search_cached};
pub use offset_cache::{Generation, OffsetCache};
pub use scrollbar::{
    scrollbar_geometry, ScrollbarGeometry, ScrollbarMapper, DEFAULT_MIN_THUMB_EXTENT,
};
pub use viewport::{max_scroll, Viewport};
pub use window::{viewport_window, ViewportWindow};
