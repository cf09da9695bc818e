//! Lazy SMP (Symmetric `MultiProcessing`) parallel search.
//!
//! Every worker runs its own iterative deepening on its own copy of the
//! position, with private killer and history tables. The only thing they
//! share is the transposition table, which is what lets a fast worker profit
//! from a slow one. Odd helpers start one ply deeper so the threads spread out.
//!
//! The first worker to finish publishes its result and raises the stop flag;
//! the rest unwind and are joined.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::board::{Evaluator, Position};
use crate::tt::TranspositionTable;

use super::negamax::SearchContext;
use super::{SearchInfoCallback, SearchLimits, SearchResult, SearchTables};

/// Search thread stack size (32 MB to handle deep recursion)
const SEARCH_STACK_SIZE: usize = 32 * 1024 * 1024;

/// Configuration for SMP search
#[derive(Clone, Default)]
pub struct SmpConfig {
    /// Number of worker threads
    pub num_threads: usize,
    pub limits: SearchLimits,
    /// Optional callback for iteration info (reported by worker 0 only)
    pub info_callback: Option<SearchInfoCallback>,
}

impl SmpConfig {
    /// Create config with specified thread count
    #[must_use]
    pub fn with_threads(num_threads: usize) -> Self {
        SmpConfig {
            num_threads: num_threads.max(1),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Set info callback
    #[must_use]
    pub fn with_callback(mut self, callback: SearchInfoCallback) -> Self {
        self.info_callback = Some(callback);
        self
    }
}

/// State shared by all workers of one search
struct SharedSearchState {
    tt: Arc<TranspositionTable>,
    stop: Arc<AtomicBool>,
    /// Sum of all workers' nodes
    total_nodes: AtomicU64,
    /// First finished worker's answer
    result: Mutex<Option<SearchResult>>,
}

impl SharedSearchState {
    /// Keep the first result, unless it was a bare fallback move and this
    /// one comes from a completed iteration.
    fn publish(&self, result: SearchResult) {
        let mut slot = self.result.lock();
        let replace = match slot.as_ref() {
            None => true,
            Some(previous) => previous.depth == 0 && result.depth > 0,
        };
        if replace {
            *slot = Some(result);
        }
    }
}

/// First iteration depth for a worker: the main thread starts at 1, helpers
/// alternate between 1 and 2.
fn worker_start_depth(worker_id: usize) -> u32 {
    if worker_id == 0 {
        1
    } else {
        1 + (worker_id % 2) as u32
    }
}

/// Run parallel search using Lazy SMP.
///
/// With one thread the search runs on the calling thread. Otherwise one named
/// thread is spawned per worker; a worker that fails to spawn is skipped, and
/// if none spawns the main worker runs inline.
#[allow(clippy::needless_pass_by_value)] // Arc is cloned for thread sharing
pub fn smp_search<E>(
    pos: &Position,
    evaluator: &E,
    tt: &Arc<TranspositionTable>,
    config: SmpConfig,
    stop: Arc<AtomicBool>,
) -> SearchResult
where
    E: Evaluator + Clone + 'static,
{
    let num_threads = config.num_threads.max(1);

    if num_threads == 1 {
        let mut pos = pos.clone();
        let mut evaluator = evaluator.clone();
        let mut tables = SearchTables::new(Arc::clone(tt));
        return super::search(
            &mut pos,
            &mut evaluator,
            &mut tables,
            &config.limits,
            &stop,
            config.info_callback,
        );
    }

    let shared = Arc::new(SharedSearchState {
        tt: Arc::clone(tt),
        stop,
        total_nodes: AtomicU64::new(0),
        result: Mutex::new(None),
    });

    let mut handles = Vec::with_capacity(num_threads);
    for worker_id in 0..num_threads {
        let worker_pos = pos.clone();
        let worker_eval = evaluator.clone();
        let worker_shared = Arc::clone(&shared);
        let limits = config.limits;
        let info_cb = if worker_id == 0 {
            config.info_callback.clone()
        } else {
            None
        };

        let spawned = thread::Builder::new()
            .name(format!("search-{worker_id}"))
            .stack_size(SEARCH_STACK_SIZE)
            .spawn(move || {
                run_worker(
                    worker_id,
                    worker_pos,
                    worker_eval,
                    &worker_shared,
                    &limits,
                    info_cb,
                );
            });
        match spawned {
            Ok(handle) => handles.push(handle),
            Err(err) => log::warn!("failed to spawn search worker {worker_id}: {err}"),
        }
    }

    if handles.is_empty() {
        run_worker(
            0,
            pos.clone(),
            evaluator.clone(),
            &shared,
            &config.limits,
            config.info_callback.clone(),
        );
    }

    for handle in handles {
        if handle.join().is_err() {
            log::warn!("search worker panicked");
        }
    }

    let nodes = shared.total_nodes.load(Ordering::Relaxed);
    let published = shared.result.lock().take();
    match published {
        Some(result) => SearchResult { nodes, ..result },
        None => SearchResult {
            best_move: pos.legal_moves().first(),
            score: 0,
            depth: 0,
            nodes,
        },
    }
}

/// Run a single worker to completion and publish its answer.
fn run_worker<E: Evaluator>(
    worker_id: usize,
    mut pos: Position,
    mut evaluator: E,
    shared: &SharedSearchState,
    limits: &SearchLimits,
    info_callback: Option<SearchInfoCallback>,
) {
    let mut tables = SearchTables::new(Arc::clone(&shared.tt));
    let result = SearchContext::new(
        &mut pos,
        &mut evaluator,
        &mut tables,
        limits,
        &shared.stop,
        &shared.total_nodes,
    )
    .with_start_depth(worker_start_depth(worker_id))
    .with_info_callback(info_callback)
    .iterative_deepening();

    log::debug!(
        "worker {worker_id} finished: depth {} score {} best {:?}",
        result.depth,
        result.score,
        result.best_move
    );

    shared.publish(result);
    shared.stop.store(true, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helper_depths_alternate() {
        assert_eq!(worker_start_depth(0), 1);
        assert_eq!(worker_start_depth(1), 2);
        assert_eq!(worker_start_depth(2), 1);
        assert_eq!(worker_start_depth(3), 2);
    }

    #[test]
    fn fallback_result_yields_to_completed_one() {
        let shared = SharedSearchState {
            tt: Arc::new(TranspositionTable::new(1)),
            stop: Arc::new(AtomicBool::new(false)),
            total_nodes: AtomicU64::new(0),
            result: Mutex::new(None),
        };
        let pos = Position::startpos();
        let first = pos.legal_moves().first();
        let fallback = SearchResult { best_move: first, score: 0, depth: 0, nodes: 10 };
        let completed = SearchResult { best_move: first, score: 25, depth: 4, nodes: 900 };
        let later = SearchResult { best_move: first, score: -5, depth: 7, nodes: 5000 };

        shared.publish(fallback);
        shared.publish(completed);
        shared.publish(later);
        assert_eq!(*shared.result.lock(), Some(completed));
    }
}
