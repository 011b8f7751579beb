//! Background materialization of an axis's offsets into its [`OffsetCache`].
//!
//! Starting a run mints a new [`Generation`], clears the cache and hands an
//! [`IndexJob`] to the axis's [`JobQueue`]. The job streams offsets into the cache in
//! fixed-size chunks and stops as soon as a newer run supersedes it. Queries
//! never wait for a job; they read whatever prefix has landed so far.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use super::offset_cache::{Generation, OffsetCache};
use super::{resolver, AxisModel};

/// Entries flushed to the cache per chunk.
pub const DEFAULT_CHUNK_SIZE: u32 = 1000;

/// Outcome of advancing an [`IndexJob`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// More chunks remain.
    Pending,
    /// Every offset of the model is cached.
    Complete,
    /// A newer generation took over; nothing further will be written.
    Superseded,
}

/// One resumable indexing run for one axis revision.
#[derive(Debug)]
pub struct IndexJob {
    model: Arc<AxisModel>,
    cache: Arc<OffsetCache>,
    generation: Generation,
    chunk_size: u32,
    label: &'static str,
    next_index: u32,
    next_offset: f64,
}

impl IndexJob {
    /// Create a job that fills `cache` for `model` under `generation`.
    pub fn new(
        model: Arc<AxisModel>,
        cache: Arc<OffsetCache>,
        generation: Generation,
        chunk_size: u32,
        label: &'static str,
    ) -> Self {
        Self {
            model,
            cache,
            generation,
            chunk_size: chunk_size.max(1),
            label,
            next_index: 0,
            next_offset: 0.0,
        }
    }

    /// Generation this job writes under.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Axis label used in thread names and log events.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// True once a newer run owns the cache.
    pub fn is_superseded(&self) -> bool {
        !self.cache.is_current(self.generation)
    }

    /// Log that the job is dropped without running.
    fn skip(&self) {
        tracing::trace!(
            axis = self.label,
            generation = self.generation.get(),
            "skipping superseded offset index"
        );
    }

    /// Compute and flush one chunk.
    ///
    /// Offsets are accumulated progressively: the offset of `i` is the offset
    /// of `i - 1` plus the size of `i - 1`. The generation is checked before
    /// any work and again atomically with the flush.
    pub fn step(&mut self) -> JobStatus {
        if self.is_superseded() {
            return self.superseded();
        }
        let length = self.model.length();
        if self.next_index >= length {
            return self.complete();
        }

        let end = length.min(self.next_index.saturating_add(self.chunk_size));
        let mut chunk = Vec::with_capacity(usize::try_from(end - self.next_index).unwrap_or(0));
        let mut offset = self.next_offset;
        for index in self.next_index..end {
            chunk.push(offset);
            offset += resolver::size_of(&self.model, index);
        }

        if !self.cache.append_chunk(self.generation, &chunk) {
            return self.superseded();
        }
        tracing::trace!(
            axis = self.label,
            generation = self.generation.get(),
            from = self.next_index,
            to = end,
            "flushed offset chunk"
        );
        self.next_index = end;
        self.next_offset = offset;

        if end >= length {
            self.complete()
        } else {
            JobStatus::Pending
        }
    }

    /// Step until the job completes or is superseded.
    pub fn run(mut self) -> JobStatus {
        loop {
            match self.step() {
                JobStatus::Pending => continue,
                status => return status,
            }
        }
    }

    fn complete(&self) -> JobStatus {
        tracing::debug!(
            axis = self.label,
            generation = self.generation.get(),
            length = self.model.length(),
            "offset index complete"
        );
        JobStatus::Complete
    }

    fn superseded(&self) -> JobStatus {
        tracing::debug!(
            axis = self.label,
            generation = self.generation.get(),
            reached = self.next_index,
            "offset index superseded"
        );
        JobStatus::Superseded
    }
}

/// Decides where [`IndexJob`]s run.
pub trait Spawner: Send + Sync + fmt::Debug {
    /// Open the job queue of one axis.
    ///
    /// Jobs submitted to one queue run one at a time, in submission order.
    fn queue(&self, label: &'static str) -> Box<dyn JobQueue>;
}

/// Per-axis sink for [`IndexJob`]s, handed out by a [`Spawner`].
pub trait JobQueue: Send + Sync + fmt::Debug {
    /// Hand `job` over without blocking the caller for its whole duration.
    fn submit(&self, job: IndexJob);
}

/// Jobs buffered per worker before `submit` blocks.
const CHANNEL_CAPACITY: usize = 64;

/// Runs each axis's jobs on one long-lived named OS thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSpawner;

impl Spawner for ThreadSpawner {
    fn queue(&self, label: &'static str) -> Box<dyn JobQueue> {
        Box::new(IndexWorker::start(label))
    }
}

/// Background thread that runs the jobs of one axis.
///
/// Dropping the worker closes its channel and joins the thread. Jobs still
/// queued at that point are superseded and skipped.
#[derive(Debug)]
pub struct IndexWorker {
    label: &'static str,
    sender: Option<mpsc::SyncSender<IndexJob>>,
    handle: Option<JoinHandle<()>>,
}

impl IndexWorker {
    /// Spawn the worker thread `xlgrid-index-<label>`.
    ///
    /// If the thread cannot be spawned, submitted jobs run inline.
    pub fn start(label: &'static str) -> Self {
        let (sender, receiver) = mpsc::sync_channel::<IndexJob>(CHANNEL_CAPACITY);
        let spawned = thread::Builder::new()
            .name(format!("xlgrid-index-{label}"))
            .spawn(move || worker_loop(&receiver));
        match spawned {
            Ok(handle) => Self {
                label,
                sender: Some(sender),
                handle: Some(handle),
            },
            Err(err) => {
                tracing::warn!(
                    axis = label,
                    error = %err,
                    "could not spawn indexer thread, indexing inline"
                );
                Self {
                    label,
                    sender: None,
                    handle: None,
                }
            }
        }
    }
}

impl JobQueue for IndexWorker {
    fn submit(&self, job: IndexJob) {
        let Some(sender) = &self.sender else {
            job.run();
            return;
        };
        if let Err(mpsc::SendError(job)) = sender.send(job) {
            tracing::warn!(axis = self.label, "indexer thread gone, indexing inline");
            job.run();
        }
    }
}

impl Drop for IndexWorker {
    fn drop(&mut self) {
        drop(self.sender.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!(axis = self.label, "indexer thread panicked");
            }
        }
    }
}

fn worker_loop(receiver: &mpsc::Receiver<IndexJob>) {
    while let Ok(first) = receiver.recv() {
        // Every later submission supersedes the earlier ones; keep the newest.
        let mut job = first;
        while let Ok(next) = receiver.try_recv() {
            job.skip();
            job = next;
        }
        if job.is_superseded() {
            job.skip();
            continue;
        }
        job.run();
    }
}

/// Queues jobs until the host calls [`DeferredSpawner::pump`].
///
/// Used where threads are unavailable (wasm32, driven from idle callbacks)
/// and in tests that need deterministic interleavings. All queues opened on
/// one spawner share its round-robin schedule.
#[derive(Debug, Default)]
pub struct DeferredSpawner {
    jobs: Arc<Mutex<VecDeque<IndexJob>>>,
}

impl DeferredSpawner {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance queued jobs by at most `max_chunks` chunks in total.
    ///
    /// Jobs are serviced round-robin so one long axis cannot starve the
    /// other. Finished and superseded jobs leave the queue. Returns the
    /// number of steps taken.
    pub fn pump(&self, max_chunks: usize) -> usize {
        let mut steps = 0;
        while steps < max_chunks {
            let next = self
                .jobs
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();
            let Some(mut job) = next else {
                break;
            };
            steps += 1;
            if job.step() == JobStatus::Pending {
                self.jobs
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push_back(job);
            }
        }
        steps
    }

    /// Run every queued job to completion (or supersession).
    pub fn drain(&self) -> usize {
        self.pump(usize::MAX)
    }

    /// Number of jobs still queued, including superseded ones not yet dropped.
    pub fn pending(&self) -> usize {
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True if no job is queued.
    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }
}

impl Spawner for DeferredSpawner {
    fn queue(&self, _label: &'static str) -> Box<dyn JobQueue> {
        Box::new(DeferredQueue {
            jobs: Arc::clone(&self.jobs),
        })
    }
}

#[derive(Debug)]
struct DeferredQueue {
    jobs: Arc<Mutex<VecDeque<IndexJob>>>,
}

impl JobQueue for DeferredQueue {
    fn submit(&self, job: IndexJob) {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        // Superseded jobs of any axis are dead weight.
        jobs.retain(|queued| !queued.is_superseded());
        jobs.push_back(job);
    }
}

/// Starts generation-tagged indexing runs for one axis.
#[derive(Debug)]
pub struct BackgroundIndexer {
    cache: Arc<OffsetCache>,
    queue: Box<dyn JobQueue>,
    chunk_size: u32,
    label: &'static str,
}

impl BackgroundIndexer {
    /// Create an indexer that writes into `cache`, opening its job queue on
    /// `spawner`.
    pub fn new(
        cache: Arc<OffsetCache>,
        spawner: Arc<dyn Spawner>,
        chunk_size: u32,
        label: &'static str,
    ) -> Self {
        Self {
            cache,
            queue: spawner.queue(label),
            chunk_size,
            label,
        }
    }

    /// Supersede any running job, clear the cache and index `model` anew.
    pub fn start(&self, model: Arc<AxisModel>) -> Generation {
        let generation = Generation::mint();
        self.cache.reset(generation);
        tracing::debug!(
            axis = self.label,
            generation = generation.get(),
            length = model.length(),
            overrides = model.override_indices().len(),
            "starting offset index"
        );
        self.queue.submit(IndexJob::new(
            model,
            Arc::clone(&self.cache),
            generation,
            self.chunk_size,
            self.label,
        ));
        generation
    }

    /// Supersede any running job without starting a new one.
    pub fn cancel(&self) {
        self.cache.reset(Generation::mint());
    }

    /// The cache this indexer fills.
    pub fn cache(&self) -> &Arc<OffsetCache> {
        &self.cache
    }
}

impl Drop for BackgroundIndexer {
    fn drop(&mut self) {
        // A running job stops at its next chunk; the queue drops after this.
        self.cancel();
    }
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
    use std::collections::HashMap;
    use std::time::Duration;

    fn model() -> Arc<AxisModel> {
        Arc::new(AxisModel::new(2500, 100, HashMap::from([(2, 300), (1999, 7)])).unwrap())
    }

    #[test]
    fn test_job_streams_chunks() {
        let cache = Arc::new(OffsetCache::new());
        let generation = Generation::mint();
        cache.reset(generation);
        let mut job = IndexJob::new(model(), Arc::clone(&cache), generation, 1000, "columns");

        assert_eq!(job.step(), JobStatus::Pending);
        assert_eq!(cache.len(), 1000);
        assert_eq!(job.step(), JobStatus::Pending);
        assert_eq!(cache.len(), 2000);
        // Tail chunk is smaller than the chunk size.
        assert_eq!(job.step(), JobStatus::Complete);
        assert_eq!(cache.len(), 2500);

        let entries = cache.snapshot();
        assert_eq!(entries[0], 0.0);
        assert_eq!(entries[3], 500.0);
        assert_eq!(entries[2000], 2000.0 * 100.0 + 200.0 - 93.0);
        assert_eq!(job.step(), JobStatus::Complete);
        assert_eq!(cache.len(), 2500);
    }

    #[test]
    fn test_job_stops_when_superseded() {
        let cache = Arc::new(OffsetCache::new());
        let g1 = Generation::mint();
        cache.reset(g1);
        let mut job = IndexJob::new(model(), Arc::clone(&cache), g1, 1000, "rows");
        assert_eq!(job.step(), JobStatus::Pending);

        let g2 = Generation::mint();
        cache.reset(g2);
        assert_eq!(job.step(), JobStatus::Superseded);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_empty_axis_completes_immediately() {
        let cache = Arc::new(OffsetCache::new());
        let generation = Generation::mint();
        cache.reset(generation);
        let empty = Arc::new(AxisModel::uniform(0, 10).unwrap());
        let job = IndexJob::new(empty, Arc::clone(&cache), generation, 1000, "rows");
        assert_eq!(job.run(), JobStatus::Complete);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_offsets_exact_at_largest_extent() {
        let shrunk = HashMap::from([(1, 3), (2_097_153, 7)]);
        let model = Arc::new(AxisModel::new(1 << 22, 1 << 31, shrunk).unwrap());
        let cache = Arc::new(OffsetCache::new());
        let generation = Generation::mint();
        cache.reset(generation);
        let job = IndexJob::new(
            Arc::clone(&model),
            Arc::clone(&cache),
            generation,
            1 << 16,
            "rows",
        );
        assert_eq!(job.run(), JobStatus::Complete);

        let probes = (0..model.length())
            .step_by(4093)
            .chain([1, 2, 2_097_153, 2_097_154, model.length() - 1]);
        for index in probes {
            assert_eq!(
                cache.get(index),
                Some(resolver::offset_of(&model, index)),
                "offset of {index}"
            );
        }
    }

    #[test]
    fn test_deferred_spawner_round_robin() {
        let spawner = Arc::new(DeferredSpawner::new());
        let rows = BackgroundIndexer::new(
            Arc::new(OffsetCache::new()),
            Arc::clone(&spawner) as Arc<dyn Spawner>,
            1000,
            "rows",
        );
        let cols = BackgroundIndexer::new(
            Arc::new(OffsetCache::new()),
            Arc::clone(&spawner) as Arc<dyn Spawner>,
            1000,
            "columns",
        );
        rows.start(model());
        cols.start(model());
        assert_eq!(spawner.pending(), 2);

        assert_eq!(spawner.pump(2), 2);
        assert_eq!(rows.cache().len(), 1000);
        assert_eq!(cols.cache().len(), 1000);

        spawner.drain();
        assert!(spawner.is_idle());
        assert_eq!(rows.cache().len(), 2500);
        assert_eq!(cols.cache().len(), 2500);
    }

    #[test]
    fn test_restart_discards_previous_run() {
        let spawner = Arc::new(DeferredSpawner::new());
        let indexer = BackgroundIndexer::new(
            Arc::new(OffsetCache::new()),
            Arc::clone(&spawner) as Arc<dyn Spawner>,
            1000,
            "columns",
        );
        indexer.start(model());
        spawner.pump(1);
        assert_eq!(indexer.cache().len(), 1000);

        let smaller = Arc::new(AxisModel::uniform(10, 5).unwrap());
        let generation = indexer.start(smaller);
        // The stale job was pruned when the new one was queued.
        assert_eq!(spawner.pending(), 1);
        assert!(indexer.cache().is_empty());
        spawner.drain();
        assert_eq!(indexer.cache().active_generation(), generation);
        assert_eq!(
            indexer.cache().snapshot(),
            vec![0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 35.0, 40.0, 45.0]
        );
    }

    #[test]
    fn test_thread_spawner_fills_cache() {
        let indexer = BackgroundIndexer::new(
            Arc::new(OffsetCache::new()),
            Arc::new(ThreadSpawner),
            128,
            "rows",
        );
        indexer.start(model());
        assert!(indexer.cache().wait_for_len(2500, Duration::from_secs(10)));
        let entries = indexer.cache().snapshot();
        assert!(entries.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_worker_runs_only_the_newest_job() {
        let cache = Arc::new(OffsetCache::new());
        let indexer = BackgroundIndexer::new(
            Arc::clone(&cache),
            Arc::new(ThreadSpawner),
            1000,
            "columns",
        );
        for length in 1..=50 {
            indexer.start(Arc::new(AxisModel::uniform(length * 1000, 3).unwrap()));
        }
        assert!(cache.wait_for_len(50_000, Duration::from_secs(10)));
        assert_eq!(cache.len(), 50_000);
        assert_eq!(cache.get(49_999), Some(149_997.0));

        drop(indexer);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_inline_when_worker_has_no_thread() {
        let worker = IndexWorker {
            label: "rows",
            sender: None,
            handle: None,
        };
        let cache = Arc::new(OffsetCache::new());
        let generation = Generation::mint();
        cache.reset(generation);
        worker.submit(IndexJob::new(model(), Arc::clone(&cache), generation, 1000, "rows"));
        assert_eq!(cache.len(), 2500);
    }

    #[test]
    fn test_drop_supersedes() {
        let cache = Arc::new(OffsetCache::new());
        let indexer = BackgroundIndexer::new(
            Arc::clone(&cache),
            Arc::new(DeferredSpawner::new()),
            1000,
            "rows",
        );
        let generation = indexer.start(model());
        drop(indexer);
        assert!(!cache.is_current(generation));
    }
}
