//! Repository statistics engine
//!
//! One run walks four phases in order: collect every object in parallel,
//! extend tree statistics to full checkouts, resolve tag chain depths, and
//! compute the history depth. Only the first phase is parallel; the later
//! ones own the collected maps outright.

mod collector;
mod commit_graph;
mod error;
mod pool;
mod progress;
mod shared_map;
mod state;
mod tag_depth;
mod tree_stats;

pub use collector::{
    BlobTotals, Collected, CollectionContext, CommitTotals, ObjectCollector, TagTotals,
    TreeTotals, partial_stats,
};
pub use commit_graph::CommitGraph;
pub use error::{AnalysisError, Result};
pub use pool::{Worker, WorkerPool};
pub use progress::{
    IndicatifProgress, NoopProgress, ProgressHandle, ProgressReporter, VerboseProgress,
};
pub use shared_map::SharedMap;
pub use state::{AnalysisState, PhaseTimings};
pub use tag_depth::TagChainResolver;
pub use tree_stats::TreeAggregator;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::model::{
    BiggestBlobs, BiggestCommits, BiggestObjects, BiggestTrees, Count, CountAndSize,
    HistoryStructure, RepositorySize, StatisticsReport, TreeSize,
};
use crate::repository::{GixStore, ObjectStore};
use crate::util::format_duration;

/// Worker count used when none is configured
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .max(4)
}

/// Knobs for one analysis run
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub threads: Option<usize>,
    pub verbose: bool,
    pub profile: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisOptions {
    pub fn new() -> Self {
        Self {
            threads: None,
            verbose: true,
            profile: false,
        }
    }

    /// No logging output or progress bars (tests, benchmarks)
    pub fn quiet() -> Self {
        Self {
            threads: None,
            verbose: false,
            profile: false,
        }
    }

    /// Detailed per-phase timing output
    pub fn profiling() -> Self {
        Self {
            threads: None,
            verbose: true,
            profile: true,
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn worker_count(&self) -> usize {
        self.threads.unwrap_or_else(default_worker_count).max(1)
    }
}

/// A single-use analysis run over one object store
pub struct RepoAnalysis<S: ObjectStore> {
    store: Arc<S>,
    options: AnalysisOptions,
    state: AnalysisState,
    timings: PhaseTimings,
}

impl<S: ObjectStore> RepoAnalysis<S> {
    pub fn new(store: Arc<S>, options: AnalysisOptions) -> Self {
        Self {
            store,
            options,
            state: AnalysisState::Idle,
            timings: PhaseTimings::default(),
        }
    }

    pub fn state(&self) -> AnalysisState {
        self.state
    }

    pub fn timings(&self) -> &PhaseTimings {
        &self.timings
    }

    /// Run every phase and assemble the report.
    ///
    /// May be called once; later calls fail with `InvalidState`.
    pub fn run(&mut self) -> Result<StatisticsReport> {
        if self.state != AnalysisState::Idle {
            return Err(AnalysisError::InvalidState {
                expected: AnalysisState::Idle,
                found: self.state,
            });
        }

        match self.run_phases() {
            Ok(report) => {
                if self.options.profile {
                    tracing::info!("[PROFILE] Total: {}", format_duration(self.timings.total()));
                }
                Ok(report)
            }
            Err(err) => {
                tracing::warn!(
                    phase = self.state.label(),
                    code = err.code(),
                    error = %err,
                    "analysis failed"
                );
                self.state = AnalysisState::Failed;
                Err(err)
            }
        }
    }

    fn log(&self, msg: &str) {
        if self.options.verbose {
            tracing::info!("{msg}");
        }
    }

    fn profile_phase(&self, name: &str, start: Instant) {
        if self.options.profile {
            tracing::info!("[PROFILE] {name}: {}", format_duration(start.elapsed()));
        }
    }

    /// Move to the phase that follows the current one
    fn advance(&mut self) -> Result<()> {
        let next = self.state.next().ok_or_else(|| {
            AnalysisError::InternalConsistency(format!(
                "no phase follows {}",
                self.state.label()
            ))
        })?;
        self.state = next;
        tracing::debug!(phase = next.label(), "entering phase");
        Ok(())
    }

    fn finish_phase(&mut self, start: Instant) {
        self.timings.record(self.state, start);
        self.profile_phase(self.state.label(), start);
    }

    fn run_phases(&mut self) -> Result<StatisticsReport> {
        let progress: Box<dyn ProgressReporter> = if self.options.profile {
            Box::new(NoopProgress)
        } else {
            Box::new(VerboseProgress::new(self.options.verbose))
        };

        self.advance()?;
        let phase_start = Instant::now();
        let Collected {
            commits,
            commit_totals,
            mut trees,
            tree_totals,
            blobs,
            blob_totals,
            mut tags,
            tag_totals,
        } = self.collect_objects(progress.as_ref())?;
        self.finish_phase(phase_start);
        self.log(&format!(
            "Collected {} commits, {} trees, {} blobs, {} tags",
            commit_totals.count, tree_totals.count, blob_totals.count, tag_totals.count
        ));

        self.advance()?;
        let phase_start = Instant::now();
        let pb = progress.start("Aggregating checkouts", commits.len() as u64);
        let mut aggregator = TreeAggregator::new(&mut trees, &blobs);
        let biggest_checkouts =
            aggregator.biggest_checkouts(commits.values().map(|facts| {
                pb.inc(1);
                &facts.tree
            }))?;
        pb.finish();
        let resolved_trees = aggregator.resolved_count();
        self.finish_phase(phase_start);
        self.log(&format!("Resolved {resolved_trees} distinct checkout trees"));

        self.advance()?;
        let phase_start = Instant::now();
        let max_tag_depth = TagChainResolver::new(&mut tags).max_depth()?;
        self.finish_phase(phase_start);

        self.advance()?;
        let phase_start = Instant::now();
        let max_depth = commit_totals.graph.calculate_max_depth();
        let references = self.store.reference_count()?;
        self.finish_phase(phase_start);
        self.advance()?;

        Ok(StatisticsReport {
            repository_size: RepositorySize {
                commits: CountAndSize {
                    count: commit_totals.count,
                    size: commit_totals.size,
                },
                trees: TreeSize {
                    count: tree_totals.count,
                    size: tree_totals.size,
                    entries: tree_totals.entries,
                },
                blobs: CountAndSize {
                    count: blob_totals.count,
                    size: blob_totals.size,
                },
                annotated_tags: Count {
                    count: tag_totals.count,
                },
                references: Count { count: references },
            },
            biggest_objects: BiggestObjects {
                commits: BiggestCommits {
                    max_size: commit_totals.max_size,
                    max_parents: commit_totals.max_parents,
                },
                trees: BiggestTrees {
                    max_entries: tree_totals.max_entries,
                },
                blobs: BiggestBlobs {
                    max_size: blob_totals.max_size,
                },
            },
            history_structure: HistoryStructure {
                max_depth,
                max_tag_depth,
            },
            biggest_checkouts,
        })
    }

    /// Enumerate on this thread, read and merge on the pool
    fn collect_objects(&self, progress: &dyn ProgressReporter) -> Result<Collected> {
        let ctx = Arc::new(CollectionContext::new());
        let threads = self.options.worker_count();
        let workers: Vec<_> = (0..threads)
            .map(|_| {
                Arc::new(ObjectCollector::new(
                    Arc::clone(&self.store),
                    Arc::clone(&ctx),
                ))
            })
            .collect();

        let mut pool = WorkerPool::new();
        pool.initialize(workers)?;
        self.log(&format!("Collecting objects with {threads} workers..."));

        let pb = progress.spinner("Enumerating objects");
        let mut enumerated = 0u64;
        let enumeration = self.store.for_each_object_id(&mut |id| {
            if ctx.has_failed() {
                return Err(AnalysisError::WorkerPool(
                    "collection stopped after a worker failure".into(),
                ));
            }
            if !pool.insert_work(id) {
                return Err(AnalysisError::WorkerPool(
                    "worker pool rejected work".into(),
                ));
            }
            enumerated += 1;
            pb.inc(1);
            Ok(())
        });
        let shutdown = pool.shutdown();
        pb.finish();

        // A worker's error is the root cause of any enumeration stop
        if let Some(err) = ctx.take_error() {
            return Err(err);
        }
        enumeration?;
        shutdown?;

        tracing::debug!(enumerated, processed = ctx.processed(), "collection finished");
        let ctx = Arc::try_unwrap(ctx).map_err(|_| {
            AnalysisError::InternalConsistency(
                "collection context still shared after pool shutdown".into(),
            )
        })?;
        Ok(ctx.into_collected())
    }
}

/// Analyze `store` without blocking the async executor
pub async fn analyze<S: ObjectStore>(
    store: Arc<S>,
    options: AnalysisOptions,
) -> Result<StatisticsReport> {
    tokio::task::spawn_blocking(move || RepoAnalysis::new(store, options).run()).await?
}

/// Open the repository at `path` and analyze it
pub async fn analyze_path(path: impl AsRef<Path>, options: AnalysisOptions) -> Result<StatisticsReport> {
    let store = Arc::new(GixStore::open(path)?);
    analyze(store, options).await
}
