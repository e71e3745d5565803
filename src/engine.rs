//! Search facade: owns one worker thread plus the state that should
//! persist across a game's searches (transposition table, move-ordering
//! heuristics, repetition tracker), and reports progress back to the
//! caller without blocking it.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Condvar, Mutex as StdMutex};
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::Mutex;

use crate::ordering::Heuristics;
use crate::position::Position;
use crate::repetition::RepetitionTracker;
use crate::search::{self, IterationInfo, SearchResult, TimeManager};
use crate::sync::StopFlag;
use crate::tt::TranspositionTable;
use crate::types::{Color, Move};

const TT_SIZE_MB: usize = 64;
const MAX_PLY: usize = 128;
const DEFAULT_MAX_DEPTH: u32 = 64;

/// Time-control fields from a UCI `go` command, reduced to what
/// `TimeManager::budget_from_go` needs once the side to move is known.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GoLimits {
    pub depth: Option<u32>,
    pub movetime: Option<Duration>,
    pub wtime: Option<Duration>,
    pub btime: Option<Duration>,
    pub winc: Option<Duration>,
    pub binc: Option<Duration>,
}

impl GoLimits {
    fn budget(&self, side_to_move: Color) -> Option<Duration> {
        let (my_time, my_increment) = match side_to_move {
            Color::White => (self.wtime, self.winc),
            Color::Black => (self.btime, self.binc),
        };
        TimeManager::budget_from_go(self.movetime, my_time, my_increment)
    }
}

/// A `Condvar`-guarded completion flag, the idiomatic stand-in for the
/// `done.wait`/`done.notify_all()` pair a worker-thread-owning facade
/// needs (`AtomicBool` has no blocking wait in stable `std`).
struct Done {
    finished: StdMutex<bool>,
    cv: Condvar,
}

/// Owns one worker thread and the engine state that should outlive any
/// single search: the transposition table, killer/history heuristics, and
/// the repetition tracker. `new_game` resets all three; a search started
/// with `go` keeps running until it finishes on its own or `stop` cuts it
/// short.
pub struct Engine {
    tt: Arc<Mutex<TranspositionTable>>,
    heuristics: Arc<Mutex<Heuristics>>,
    repetition: Arc<Mutex<RepetitionTracker>>,
    stop_flag: StopFlag,
    done: Arc<Done>,
    handle: Option<JoinHandle<()>>,
    best_move: Arc<Mutex<Option<Move>>>,
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Engine {
            tt: Arc::new(Mutex::new(TranspositionTable::new(TT_SIZE_MB))),
            heuristics: Arc::new(Mutex::new(Heuristics::new(MAX_PLY))),
            repetition: Arc::new(Mutex::new(RepetitionTracker::new())),
            stop_flag: StopFlag::new(),
            done: Arc::new(Done { finished: StdMutex::new(true), cv: Condvar::new() }),
            handle: None,
            best_move: Arc::new(Mutex::new(None)),
        }
    }

    /// Clears all persistent state, per the UCI `ucinewgame` command.
    /// Stops any search in progress first.
    pub fn new_game(&mut self) {
        self.stop();
        self.tt.lock().clear();
        self.heuristics.lock().clear();
        *self.repetition.lock() = RepetitionTracker::new();
    }

    /// Starts a search on a background thread. Any search already running
    /// is stopped and joined first. `on_complete`, if given, fires from
    /// inside the worker thread itself once the best move is known, so a
    /// UCI loop can print `bestmove` without a separate watcher thread.
    pub fn go(
        &mut self,
        pos: Position,
        limits: GoLimits,
        info_tx: Option<Sender<IterationInfo>>,
        on_complete: Option<Box<dyn FnOnce(Option<Move>) + Send>>,
    ) {
        self.stop();

        let budget = limits.budget(pos.side_to_move);
        let max_depth = limits.depth.unwrap_or(DEFAULT_MAX_DEPTH);

        self.stop_flag.reset();
        *self.done.finished.lock().unwrap() = false;

        let tt = Arc::clone(&self.tt);
        let heuristics = Arc::clone(&self.heuristics);
        let repetition = Arc::clone(&self.repetition);
        let stop_flag = self.stop_flag.clone();
        let done = Arc::clone(&self.done);
        let best_move_sink = Arc::clone(&self.best_move);

        self.handle = Some(std::thread::spawn(move || {
            let time = TimeManager::new(budget);
            let result: SearchResult = {
                let mut tt = tt.lock();
                let mut heuristics = heuristics.lock();
                let mut repetition = repetition.lock();
                search::iterative_deepening(
                    &pos,
                    &mut tt,
                    &mut heuristics,
                    &mut repetition,
                    stop_flag,
                    time,
                    max_depth,
                    |iteration| {
                        if let Some(tx) = &info_tx {
                            let _ = tx.send(iteration);
                        }
                    },
                )
            };

            *best_move_sink.lock() = result.best_move;
            *done.finished.lock().unwrap() = true;
            done.cv.notify_all();

            if let Some(on_complete) = on_complete {
                on_complete(result.best_move);
            }
        }));
    }

    /// Signals the running search to stop, if any, and blocks until its
    /// worker thread has exited.
    pub fn stop(&mut self) {
        self.stop_flag.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Blocks until the current (or most recently started) search has
    /// finished, without taking ownership of the worker's `JoinHandle`.
    pub fn wait_for_done(&self) {
        let finished = self.done.finished.lock().unwrap();
        let _guard = self.done.cv.wait_while(finished, |done| !*done);
    }

    #[must_use]
    pub fn best_move(&self) -> Option<Move> {
        *self.best_move.lock()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
    }
}
