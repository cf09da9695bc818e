//! Engine controller implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;

use super::time::{compute_deadlines, TimeControl};
use crate::board::{
    smp_search, Color, FenError, MoveParseError, PestoEvaluator, Position, SearchInfoCallback,
    SearchLimits, SearchResult, SmpConfig, DEFAULT_TT_MB,
};
use crate::tt::TranspositionTable;

/// Search thread stack size (32 MB)
const SEARCH_STACK_SIZE: usize = 32 * 1024 * 1024;

/// Maximum sleep duration when polling time limits (avoids excessive CPU wake-ups)
const MAX_POLL_SLEEP_MS: u64 = 5;

/// Errors reported by the controller to the front-end.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid FEN: {0}")]
    Fen(#[from] FenError),
    #[error("invalid move: {0}")]
    Move(#[from] MoveParseError),
    #[error("a search is already running")]
    SearchInProgress,
    #[error("failed to spawn search thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Engine knobs set by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Transposition table size in MB, rounded down to a power of two
    pub hash_mb: usize,
    pub threads: usize,
    /// Time reserved per move for communication latency
    pub move_overhead_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            hash_mb: DEFAULT_TT_MB,
            threads: 1,
            move_overhead_ms: 30,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn hash_mb(mut self, mb: usize) -> Self {
        self.hash_mb = round_hash_mb(mb);
        self
    }

    #[must_use]
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    #[must_use]
    pub fn move_overhead_ms(mut self, ms: u64) -> Self {
        self.move_overhead_ms = ms;
        self
    }
}

/// Largest power of two not above `mb` (at least 1)
fn round_hash_mb(mb: usize) -> usize {
    let mb = mb.max(1);
    if mb.is_power_of_two() {
        mb
    } else {
        mb.next_power_of_two() / 2
    }
}

/// Where a `position` request starts from, plus the moves played since.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionRequest {
    /// `None` means the standard starting position
    pub fen: Option<String>,
    pub moves: Vec<String>,
}

impl PositionRequest {
    #[must_use]
    pub fn startpos() -> Self {
        PositionRequest::default()
    }

    #[must_use]
    pub fn fen(fen: impl Into<String>) -> Self {
        PositionRequest {
            fen: Some(fen.into()),
            moves: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_moves<I, S>(mut self, moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.moves = moves.into_iter().map(Into::into).collect();
        self
    }

    /// Build the position, failing on a bad FEN or the first illegal move.
    pub fn resolve(&self) -> Result<Position, EngineError> {
        let mut pos = match &self.fen {
            Some(fen) => Position::from_fen(fen)?,
            None => Position::startpos(),
        };
        for text in &self.moves {
            pos.make_move_text(text)?;
        }
        Ok(pos)
    }
}

/// Budget of a `go` request, as sent by the front-end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoRequest {
    pub wtime_ms: Option<u64>,
    pub btime_ms: Option<u64>,
    pub winc_ms: Option<u64>,
    pub binc_ms: Option<u64>,
    pub movestogo: Option<u64>,
    pub movetime_ms: Option<u64>,
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
    pub infinite: bool,
}

impl GoRequest {
    /// Time control for `side`: movetime wins over the clock, infinite over both.
    #[must_use]
    pub fn time_control(&self, side: Color) -> TimeControl {
        if self.infinite {
            return TimeControl::Infinite;
        }
        if let Some(time_ms) = self.movetime_ms {
            return TimeControl::MoveTime { time_ms };
        }
        let (time_left, inc) = match side {
            Color::White => (self.wtime_ms, self.winc_ms),
            Color::Black => (self.btime_ms, self.binc_ms),
        };
        match time_left {
            Some(time_left_ms) => TimeControl::Incremental {
                time_left_ms,
                inc_ms: inc.unwrap_or(0),
                movestogo: self.movestogo,
            },
            None => TimeControl::Infinite,
        }
    }

    /// Resolve into search limits for `side`, measuring deadlines from `now`.
    #[must_use]
    pub fn limits(&self, side: Color, now: Instant, move_overhead_ms: u64) -> SearchLimits {
        let (soft, hard) = compute_deadlines(&self.time_control(side), now, move_overhead_ms);
        let mut limits = SearchLimits::infinite().deadlines(soft, hard);
        if let Some(depth) = self.depth {
            limits = limits.depth(depth);
        }
        if let Some(nodes) = self.nodes {
            limits = limits.nodes(nodes);
        }
        limits
    }
}

/// Active search job state
pub struct SearchJob {
    /// Stop flag for the search
    pub stop: Arc<AtomicBool>,
    /// Handle to the search thread
    handle: JoinHandle<()>,
    /// Optional handle to the timer thread enforcing hard stops
    timer_handle: Option<JoinHandle<()>>,
}

impl SearchJob {
    /// Stop the search and wait for the thread to finish
    pub fn stop_and_wait(self) {
        self.stop.store(true, Ordering::Relaxed);
        self.wait();
    }

    /// Wait for the search to finish on its own
    pub fn wait(self) {
        if self.handle.join().is_err() {
            log::warn!("search thread panicked");
        }
        // The timer exits once the stop flag is up
        self.stop.store(true, Ordering::Relaxed);
        if let Some(timer) = self.timer_handle {
            if timer.join().is_err() {
                log::warn!("hard-stop timer thread panicked");
            }
        }
    }

    /// Signal stop without waiting
    pub fn signal_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Engine controller managing search and game state
pub struct EngineController {
    /// Current position
    position: Position,
    /// Transposition table shared by every search thread
    tt: Arc<TranspositionTable>,
    config: EngineConfig,
    /// Active search job (if any)
    current_job: Option<SearchJob>,
    /// Optional callback for per-iteration search info
    info_callback: Option<SearchInfoCallback>,
}

impl Default for EngineController {
    fn default() -> Self {
        EngineController::new(EngineConfig::default())
    }
}

impl EngineController {
    /// Create a new engine controller
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let config = config.hash_mb(config.hash_mb).threads(config.threads);
        EngineController {
            position: Position::startpos(),
            tt: Arc::new(TranspositionTable::new(config.hash_mb)),
            config,
            current_job: None,
            info_callback: None,
        }
    }

    #[must_use]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn tt(&self) -> &Arc<TranspositionTable> {
        &self.tt
    }

    /// Check if there's an active search
    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.current_job
            .as_ref()
            .is_some_and(|job| !job.is_finished())
    }

    /// Join a job whose thread has already finished
    fn reap_finished_job(&mut self) {
        if self.current_job.as_ref().is_some_and(SearchJob::is_finished) {
            if let Some(job) = self.current_job.take() {
                job.wait();
            }
        }
    }

    fn ensure_idle(&mut self) -> Result<(), EngineError> {
        self.reap_finished_job();
        if self.current_job.is_some() {
            return Err(EngineError::SearchInProgress);
        }
        Ok(())
    }

    /// Replace the position. On any error the previous position is kept.
    pub fn set_position(&mut self, request: &PositionRequest) -> Result<(), EngineError> {
        self.ensure_idle()?;
        self.position = request.resolve()?;
        Ok(())
    }

    /// Start a search on the current position and return immediately.
    ///
    /// `on_complete` runs on the search thread with the final result.
    pub fn go<F>(&mut self, request: &GoRequest, on_complete: F) -> Result<(), EngineError>
    where
        F: FnOnce(SearchResult) + Send + 'static,
    {
        self.ensure_idle()?;

        let start = Instant::now();
        let limits = request.limits(
            self.position.side_to_move(),
            start,
            self.config.move_overhead_ms,
        );
        let stop = Arc::new(AtomicBool::new(false));

        let mut smp_config = SmpConfig::with_threads(self.config.threads).limits(limits);
        if let Some(cb) = &self.info_callback {
            smp_config = smp_config.with_callback(Arc::clone(cb));
        }

        let search_position = self.position.clone();
        let tt = Arc::clone(&self.tt);
        let stop_clone = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("search".to_string())
            .stack_size(SEARCH_STACK_SIZE)
            .spawn(move || {
                let evaluator = PestoEvaluator::new();
                let result = smp_search(&search_position, &evaluator, &tt, smp_config, stop_clone);
                on_complete(result);
            })?;

        let timer_handle = Self::spawn_hard_stop_timer(limits.hard_deadline, Arc::clone(&stop));

        self.current_job = Some(SearchJob {
            stop,
            handle,
            timer_handle,
        });
        Ok(())
    }

    fn spawn_hard_stop_timer(
        hard_deadline: Option<Instant>,
        stop: Arc<AtomicBool>,
    ) -> Option<JoinHandle<()>> {
        let deadline = hard_deadline?;
        let spawned = thread::Builder::new()
            .name("search-timer".to_string())
            .spawn(move || loop {
                if stop.load(Ordering::Relaxed) {
                    break;
                }
                let now = Instant::now();
                if now >= deadline {
                    stop.store(true, Ordering::Relaxed);
                    break;
                }
                let sleep_for = (deadline - now).min(Duration::from_millis(MAX_POLL_SLEEP_MS));
                thread::sleep(sleep_for);
            });
        match spawned {
            Ok(handle) => Some(handle),
            Err(err) => {
                // The search polls the deadline itself, so it still stops
                log::warn!("failed to spawn timer thread: {err}");
                None
            }
        }
    }

    /// Stop any active search and wait for it
    pub fn stop(&mut self) {
        if let Some(job) = self.current_job.take() {
            job.stop_and_wait();
        }
    }

    /// Signal stop to active search (non-blocking)
    pub fn signal_stop(&self) {
        if let Some(job) = &self.current_job {
            job.signal_stop();
        }
    }

    /// Wait for the active search to finish on its own
    pub fn wait(&mut self) {
        if let Some(job) = self.current_job.take() {
            job.wait();
        }
    }

    /// Back to the initial position with an empty transposition table
    pub fn new_game(&mut self) {
        self.stop();
        self.position = Position::startpos();
        self.tt.clear();
    }

    /// Set the number of search threads for SMP
    pub fn set_threads(&mut self, threads: usize) -> Result<(), EngineError> {
        self.ensure_idle()?;
        self.config = self.config.threads(threads);
        log::info!("search threads set to {}", self.config.threads);
        Ok(())
    }

    /// Resize the transposition table (its contents are lost)
    pub fn set_hash_mb(&mut self, mb: usize) -> Result<(), EngineError> {
        self.ensure_idle()?;
        self.config = self.config.hash_mb(mb);
        self.tt = Arc::new(TranspositionTable::new(self.config.hash_mb));
        log::info!("hash size set to {} MB", self.config.hash_mb);
        Ok(())
    }

    pub fn set_move_overhead_ms(&mut self, ms: u64) {
        self.config = self.config.move_overhead_ms(ms);
        log::info!("move overhead set to {ms} ms");
    }

    /// Set callback for iteration info reporting.
    pub fn set_info_callback(&mut self, cb: Option<SearchInfoCallback>) {
        self.info_callback = cb;
    }
}

impl Drop for EngineController {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn wait_survives_panicking_timer_thread() {
        let stop = Arc::new(AtomicBool::new(false));
        let job = SearchJob {
            stop: Arc::clone(&stop),
            handle: thread::spawn(|| {}),
            timer_handle: Some(thread::spawn(|| panic!("timer failure"))),
        };
        job.wait();
        assert!(stop.load(Ordering::Relaxed));
    }

    #[test]
    fn hash_rounds_down_to_power_of_two() {
        assert_eq!(EngineConfig::default().hash_mb(24).hash_mb, 16);
        assert_eq!(EngineConfig::default().hash_mb(64).hash_mb, 64);
        assert_eq!(EngineConfig::default().hash_mb(0).hash_mb, 1);
        assert_eq!(EngineConfig::default().threads(0).threads, 1);
    }

    #[test]
    fn position_request_with_moves() {
        let pos = PositionRequest::startpos()
            .with_moves(["e2e4", "e7e5", "g1f3"])
            .resolve()
            .unwrap();
        assert_eq!(
            pos.to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
        );
    }

    #[test]
    fn bad_position_keeps_previous() {
        let mut engine = EngineController::new(EngineConfig::default().hash_mb(1));
        engine
            .set_position(&PositionRequest::startpos().with_moves(["e2e4"]))
            .unwrap();
        let before = engine.position().clone();

        let illegal = PositionRequest::startpos().with_moves(["e2e4", "e7e4"]);
        assert!(matches!(
            engine.set_position(&illegal),
            Err(EngineError::Move(MoveParseError::IllegalMove { .. }))
        ));
        assert_eq!(engine.position(), &before);

        let bad_fen = PositionRequest::fen("not a fen");
        assert!(matches!(engine.set_position(&bad_fen), Err(EngineError::Fen(_))));
        assert_eq!(engine.position(), &before);
    }

    #[test]
    fn go_time_control_by_side() {
        let request = GoRequest {
            wtime_ms: Some(60_000),
            btime_ms: Some(30_000),
            winc_ms: Some(1000),
            ..GoRequest::default()
        };
        assert_eq!(
            request.time_control(Color::Black),
            TimeControl::Incremental {
                time_left_ms: 30_000,
                inc_ms: 0,
                movestogo: None
            }
        );
        let fixed = GoRequest {
            movetime_ms: Some(100),
            ..request
        };
        assert_eq!(fixed.time_control(Color::White), TimeControl::MoveTime { time_ms: 100 });
        assert_eq!(GoRequest::default().time_control(Color::White), TimeControl::Infinite);
    }

    #[test]
    fn go_reports_a_legal_move() {
        let mut engine = EngineController::new(EngineConfig::default().hash_mb(1));
        let (tx, rx) = mpsc::channel();
        let request = GoRequest {
            depth: Some(3),
            ..GoRequest::default()
        };
        engine
            .go(&request, move |result| {
                let _ = tx.send(result);
            })
            .unwrap();
        engine.wait();

        let result = rx.recv().unwrap();
        let best = result.best_move.unwrap();
        assert!(Position::startpos().legal_moves().contains(best));
        assert_eq!(result.depth, 3);
    }

    #[test]
    fn busy_engine_rejects_changes() {
        let mut engine = EngineController::new(EngineConfig::default().hash_mb(1));
        let request = GoRequest {
            infinite: true,
            ..GoRequest::default()
        };
        engine.go(&request, |_| {}).unwrap();
        assert!(engine.is_searching());
        assert!(matches!(
            engine.set_position(&PositionRequest::startpos()),
            Err(EngineError::SearchInProgress)
        ));
        assert!(matches!(engine.go(&request, |_| {}), Err(EngineError::SearchInProgress)));
        engine.stop();
        assert!(!engine.is_searching());
        engine.set_position(&PositionRequest::startpos()).unwrap();
    }
}
