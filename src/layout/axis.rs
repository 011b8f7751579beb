//! One grid axis: its current model, offset cache and background indexer.

use std::sync::Arc;
use std::time::Duration;

use super::indexer::{BackgroundIndexer, Spawner};
use super::offset_cache::{Generation, OffsetCache};
use super::window::{self, ViewportWindow};
use super::{locator, resolver, AxisModel};
use crate::types::AxisKind;

/// Rows or columns of a grid, indexed in the background.
///
/// Every query completes synchronously against whatever prefix the indexer
/// has cached so far, falling back to the analytic resolver beyond it.
#[derive(Debug)]
pub struct Axis {
    kind: AxisKind,
    model: Arc<AxisModel>,
    cache: Arc<OffsetCache>,
    indexer: BackgroundIndexer,
    generation: Generation,
}

impl Axis {
    /// Create the axis and start indexing `model` on `spawner`.
    pub fn new(
        kind: AxisKind,
        model: AxisModel,
        spawner: Arc<dyn Spawner>,
        chunk_size: u32,
    ) -> Self {
        let cache = Arc::new(OffsetCache::new());
        let indexer = BackgroundIndexer::new(Arc::clone(&cache), spawner, chunk_size, kind.label());
        let model = Arc::new(model);
        let generation = indexer.start(Arc::clone(&model));
        Self {
            kind,
            model,
            cache,
            indexer,
            generation,
        }
    }

    /// Which axis this is.
    pub fn kind(&self) -> AxisKind {
        self.kind
    }

    /// The current model revision.
    pub fn model(&self) -> &AxisModel {
        &self.model
    }

    /// Number of indices.
    pub fn len(&self) -> u32 {
        self.model.length()
    }

    /// True if the axis has no indices.
    pub fn is_empty(&self) -> bool {
        self.model.is_empty()
    }

    /// Replace the model and re-index from scratch, superseding any running job.
    pub fn set_model(&mut self, model: AxisModel) -> Generation {
        self.model = Arc::new(model);
        self.generation = self.indexer.start(Arc::clone(&self.model));
        self.generation
    }

    /// Generation of the current indexing run.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Pixel offset of the start of `index`.
    ///
    /// `offset_of(len())` is the total extent.
    pub fn offset_of(&self, index: u32) -> f64 {
        self.cache
            .get(index)
            .unwrap_or_else(|| resolver::offset_of(&self.model, index))
    }

    /// Size of `index` in pixels.
    pub fn size_of(&self, index: u32) -> f64 {
        resolver::size_of(&self.model, index)
    }

    /// Index occupying `scroll_offset`.
    pub fn index_at(&self, scroll_offset: f64) -> u32 {
        locator::index_at(&self.model, &self.cache, scroll_offset)
    }

    /// Indices covering `[scroll_offset, scroll_offset + viewport_extent)`.
    pub fn window(&self, scroll_offset: f64, viewport_extent: f64) -> ViewportWindow {
        window::viewport_window(&self.model, &self.cache, scroll_offset, viewport_extent)
    }

    /// Total pixel extent.
    pub fn total_extent(&self) -> f64 {
        self.model.total_extent()
    }

    /// Number of offsets cached so far.
    pub fn indexed_len(&self) -> usize {
        self.cache.len()
    }

    /// True once every offset of the current model is cached.
    pub fn is_indexed(&self) -> bool {
        self.cache.is_current(self.generation)
            && u32::try_from(self.cache.len()).is_ok_and(|len| len >= self.model.length())
    }

    /// Block until the current model is fully cached or `timeout` elapses.
    ///
    /// Only for native callers with a thread-backed spawner.
    pub fn wait_until_indexed(&self, timeout: Duration) -> bool {
        let Ok(len) = usize::try_from(self.model.length()) else {
            return false;
        };
        self.cache.wait_for_len(len, timeout) && self.is_indexed()
    }

    /// The cache backing this axis.
    pub fn cache(&self) -> &Arc<OffsetCache> {
        &self.cache
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
    use crate::layout::{DeferredSpawner, ThreadSpawner};
    use std::collections::HashMap;

    fn columns(spawner: Arc<dyn Spawner>) -> Axis {
        let model = AxisModel::new(100_000, 100, HashMap::from([(2, 300)])).unwrap();
        Axis::new(AxisKind::Column, model, spawner, 1000)
    }

    #[test]
    fn test_queries_before_indexing() {
        let spawner = Arc::new(DeferredSpawner::new());
        let axis = columns(Arc::clone(&spawner) as Arc<dyn Spawner>);
        assert_eq!(axis.indexed_len(), 0);
        assert!(!axis.is_indexed());
        assert_eq!(axis.offset_of(3), 500.0);
        assert_eq!(axis.index_at(250.0), 2);
        assert_eq!(axis.window(0.0, 1000.0).count, 9);
    }

    #[test]
    fn test_queries_stable_while_indexing() {
        let spawner = Arc::new(DeferredSpawner::new());
        let axis = columns(Arc::clone(&spawner) as Arc<dyn Spawner>);
        let probes = [0, 1, 2, 3, 999, 1000, 1001, 54_321, 99_999, 100_000];
        let before: Vec<f64> = probes.iter().map(|&i| axis.offset_of(i)).collect();

        while spawner.pump(7) > 0 {
            let during: Vec<f64> = probes.iter().map(|&i| axis.offset_of(i)).collect();
            assert_eq!(during, before);
            assert_eq!(axis.index_at(5_000_000.0), 49_998);
        }
        assert!(axis.is_indexed());
        assert_eq!(axis.indexed_len(), 100_000);
    }

    #[test]
    fn test_set_model_reindexes() {
        let spawner = Arc::new(DeferredSpawner::new());
        let mut axis = columns(Arc::clone(&spawner) as Arc<dyn Spawner>);
        spawner.drain();
        assert!(axis.is_indexed());

        let first = axis.generation();
        let resized = axis.model().with_size(0, 50).unwrap();
        let second = axis.set_model(resized);
        assert_ne!(first, second);
        assert!(!axis.is_indexed());
        assert_eq!(axis.offset_of(3), 450.0);
        spawner.drain();
        assert!(axis.is_indexed());
        assert_eq!(axis.offset_of(3), 450.0);
        assert_eq!(axis.total_extent(), 10_000_150.0);
    }

    #[test]
    fn test_thread_backed_axis() {
        let axis = columns(Arc::new(ThreadSpawner));
        assert!(axis.wait_until_indexed(Duration::from_secs(30)));
        assert_eq!(axis.offset_of(100_000), axis.total_extent());
        assert_eq!(axis.kind(), AxisKind::Column);
    }
}
