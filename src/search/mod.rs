//! Iterative-deepening negamax search: alpha-beta with a transposition
//! table, null-move and futility pruning, and a quiescence search at the
//! horizon.

pub mod time;

use std::time::Duration;

use crate::eval::{self, MAX_SCORE, MIN_SCORE};
use crate::movegen::{self, Variant};
use crate::ordering::{self, Heuristics};
use crate::position::Position;
use crate::repetition::RepetitionTracker;
use crate::sync::StopFlag;
use crate::tt::{Bound, TranspositionTable};
use crate::types::{Move, Piece, ScoredMoveList};

pub use time::TimeManager;

/// Null-move reduction: the child is searched `R + 1` plies shallower.
const NULL_MOVE_R: i32 = 2;
/// Margin (centipawns) under which a frontier-node move is skipped if its
/// best-case gain still can't reach alpha.
const FUTILITY_MARGIN: i32 = 500;
/// Delta-pruning safety margin used on top of a queen's value in quiescence.
const DELTA_SAFETY: i32 = 500;
/// Quiescence stops descending (outside of check) once depth-left, which
/// starts at 0 and decrements, reaches this floor.
const QUIESCENCE_FLOOR: i32 = -8;

const HALFMOVE_DRAW_LIMIT: u16 = 100;

/// Per-iteration progress, handed to the caller's sink after each completed
/// depth (for UCI `info` lines and the like).
#[derive(Clone, Copy, Debug)]
pub struct IterationInfo {
    pub depth: u32,
    pub score: i32,
    pub best_move: Option<Move>,
    pub nodes: u64,
    pub time: Duration,
}

#[derive(Clone, Copy, Debug)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub score: i32,
    pub depth_completed: u32,
    pub nodes: u64,
    pub timed_out: bool,
}

/// Mutable search state threaded through one iterative-deepening run: the
/// shared transposition table and move-ordering heuristics, the tracker
/// used to detect repetitions along the line currently being searched, and
/// the cancellation machinery (an external flag plus a time budget).
struct Search<'a> {
    tt: &'a mut TranspositionTable,
    heuristics: &'a mut Heuristics,
    repetition: &'a mut RepetitionTracker,
    stop_flag: StopFlag,
    time: TimeManager,
    nodes: u64,
    stopped: bool,
}

impl<'a> Search<'a> {
    fn should_stop(&mut self) -> bool {
        if self.stopped {
            return true;
        }
        self.nodes += 1;
        let interval = self.time.check_interval();
        if (self.nodes - 1) & (interval - 1) != 0 {
            return false;
        }
        if self.stop_flag.is_stopped() || self.time.has_timed_out() {
            self.stopped = true;
        }
        self.stopped
    }

    fn is_draw(&self, pos: &Position) -> bool {
        pos.halfmove_clock >= HALFMOVE_DRAW_LIMIT || self.repetition.is_repetition_draw()
    }

    /// Negamax with alpha-beta pruning. `ply` is the number of moves played
    /// since the root (used for killer-table indexing and TT mate-score
    /// rebasing); the root node is the only one that skips the TT probe and
    /// is exempt from null-move/futility pruning.
    fn negamax(
        &mut self,
        pos: &Position,
        depth_left: i32,
        mut alpha: i32,
        beta: i32,
        ply: u32,
    ) -> (i32, Option<Move>) {
        if depth_left <= 0 {
            return (self.quiescence(pos, alpha, beta, 0, ply), None);
        }
        if self.should_stop() {
            return (0, None);
        }
        if self.is_draw(pos) {
            return (0, None);
        }

        let is_root = ply == 0;
        let hash = pos.hash;
        let mut hash_move = None;

        if !is_root {
            if let Some(entry) = self.tt.probe(hash, ply) {
                hash_move = entry.best_move;
                if entry.depth >= depth_left as u32 {
                    match entry.bound {
                        Bound::Exact => return (entry.score.clamp(alpha, beta), hash_move),
                        Bound::LowerBound if entry.score >= beta => return (beta, hash_move),
                        Bound::UpperBound if entry.score <= alpha => return (alpha, hash_move),
                        Bound::LowerBound => alpha = alpha.max(entry.score),
                        Bound::UpperBound => {}
                    }
                }
            }
        }

        let is_in_check = pos.is_in_check(pos.side_to_move);

        if !is_root
            && !is_in_check
            && depth_left >= NULL_MOVE_R + 1
            && !eval::is_winning(beta)
            && eval::evaluate(pos) >= beta
        {
            let null_pos = pos.skip_turn();
            self.repetition.push(null_pos.hash, Move::NULL);
            let (child_score, _) =
                self.negamax(&null_pos, depth_left - 1 - NULL_MOVE_R, -beta, -beta + 1, ply + 1);
            self.repetition.pop();
            if !self.stopped && -child_score >= beta {
                return (beta, None);
            }
        }

        let moves = movegen::generate_moves(pos, Variant::All);
        if moves.is_empty() {
            let score = if is_in_check { eval::losing(depth_left) } else { 0 };
            return (score, None);
        }

        let color = pos.side_to_move;
        let mut scored =
            ordering::score_moves(moves.as_slice(), self.heuristics, color, ply as usize, hash_move);

        let futility_eval = if depth_left == 1
            && !is_in_check
            && !eval::is_winning(beta)
            && !eval::is_losing(alpha)
        {
            Some(eval::evaluate(pos))
        } else {
            None
        };

        let original_alpha = alpha;
        let mut best_score = MIN_SCORE - 1;
        let mut best_move = None;

        for i in 0..scored.len() {
            let mv = scored.pick_best(i);

            if let Some(static_eval) = futility_eval {
                let mut gain = mv.captured.map_or(0, |p| p.value());
                if let Some(promo) = mv.promotion {
                    gain += promo.value();
                }
                if static_eval + gain + FUTILITY_MARGIN <= alpha {
                    continue;
                }
            }

            let child = pos.apply_move(mv);
            self.repetition.push(child.hash, mv);
            let (child_score, _) = self.negamax(&child, depth_left - 1, -beta, -alpha, ply + 1);
            self.repetition.pop();
            if self.stopped {
                return (0, None);
            }
            let score = -child_score;

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                if mv.is_quiet() {
                    self.heuristics.record_killer(ply as usize, mv);
                    self.heuristics.record_history(color, mv, true);
                }
                break;
            } else if mv.is_quiet() {
                self.heuristics.record_history(color, mv, false);
            }
        }

        let bound = if best_score <= original_alpha {
            Bound::UpperBound
        } else if best_score >= beta {
            Bound::LowerBound
        } else {
            Bound::Exact
        };
        self.tt.store(hash, depth_left as u32, best_score, bound, best_move, ply);

        (best_score, best_move)
    }

    /// Quiescence search: resolves captures (all evasions, if in check)
    /// until the position is "quiet", using stand-pat and delta pruning to
    /// avoid wasting time on moves that can't possibly raise alpha.
    fn quiescence(&mut self, pos: &Position, mut alpha: i32, beta: i32, depth_left: i32, ply: u32) -> i32 {
        if self.should_stop() {
            return 0;
        }
        if self.is_draw(pos) {
            return 0;
        }

        let is_in_check = pos.is_in_check(pos.side_to_move);
        if !is_in_check && depth_left <= QUIESCENCE_FLOOR {
            return eval::evaluate(pos);
        }

        let stand_pat = eval::evaluate(pos);
        if !is_in_check {
            if stand_pat >= beta {
                return beta;
            }
            if stand_pat + Piece::Queen.value() + DELTA_SAFETY < alpha {
                return alpha;
            }
            alpha = alpha.max(stand_pat);
        }

        let variant = if is_in_check { Variant::All } else { Variant::CapturesAndPromotions };
        let moves = movegen::generate_moves(pos, variant);
        if moves.is_empty() {
            return if is_in_check { eval::losing(depth_left) } else { alpha };
        }

        let mut scored = ScoredMoveList::new();
        for &mv in moves.iter() {
            scored.push(mv, ordering::quiescence_priority(mv));
        }

        for i in 0..scored.len() {
            let mv = scored.pick_best(i);

            if !is_in_check {
                let mut gain = mv.captured.map_or(0, |p| p.value());
                if let Some(promo) = mv.promotion {
                    gain += promo.value();
                }
                if stand_pat + gain + DELTA_SAFETY < alpha {
                    continue;
                }
            }

            let child = pos.apply_move(mv);
            self.repetition.push(child.hash, mv);
            let score = -self.quiescence(&child, -beta, -alpha, depth_left - 1, ply + 1);
            self.repetition.pop();
            if self.stopped {
                return 0;
            }
            if score >= beta {
                return beta;
            }
            alpha = alpha.max(score);
        }

        alpha
    }
}

/// Runs iterative deepening from depth 1 up to `max_depth`, calling
/// `on_iteration` after every depth that completes without being cancelled.
/// The root's first legal move seeds `best_move` before any iteration
/// completes, so a search cancelled mid-depth-1 still has something to play.
pub fn iterative_deepening(
    pos: &Position,
    tt: &mut TranspositionTable,
    heuristics: &mut Heuristics,
    repetition: &mut RepetitionTracker,
    stop_flag: StopFlag,
    time: TimeManager,
    max_depth: u32,
    mut on_iteration: impl FnMut(IterationInfo),
) -> SearchResult {
    let root_moves = movegen::generate_moves(pos, Variant::All);
    let mut best_move = root_moves.first();
    if root_moves.is_empty() {
        return SearchResult { best_move: None, score: 0, depth_completed: 0, nodes: 0, timed_out: false };
    }

    let mut search = Search { tt, heuristics, repetition, stop_flag, time, nodes: 0, stopped: false };

    let mut best_score = 0;
    let mut depth_completed = 0;
    let mut depth = 1u32;

    while depth <= max_depth {
        search.heuristics.clear_killers();
        search.time.start_iteration();

        let (score, mv) = search.negamax(pos, depth as i32, MIN_SCORE, MAX_SCORE, 0);
        if search.stopped {
            break;
        }

        best_score = score;
        if let Some(mv) = mv {
            best_move = Some(mv);
        }
        depth_completed = depth;
        on_iteration(IterationInfo {
            depth,
            score,
            best_move,
            nodes: search.nodes,
            time: search.time.time_spent(),
        });

        if eval::is_winning(score) || eval::is_losing(score) {
            break;
        }
        if !search.time.can_continue_iteration() {
            break;
        }
        depth += 1;
    }

    SearchResult {
        best_move,
        score: best_score,
        depth_completed,
        nodes: search.nodes,
        timed_out: search.stopped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen;

    fn search_to_depth(pos: &Position, depth: u32) -> SearchResult {
        let mut tt = TranspositionTable::new(1);
        let mut heuristics = Heuristics::new(64);
        let mut repetition = RepetitionTracker::new();
        iterative_deepening(
            pos,
            &mut tt,
            &mut heuristics,
            &mut repetition,
            StopFlag::new(),
            TimeManager::unbounded(),
            depth,
            |_| {},
        )
    }

    #[test]
    fn finds_mate_in_one() {
        // Black king boxed in by its own pawns; Ra1-a8 is back-rank mate.
        let pos = fen::parse("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let result = search_to_depth(&pos, 3);
        let mv = result.best_move.unwrap();
        assert_eq!(mv.to_uci(), "a1a8");
        assert!(eval::is_winning(result.score));
    }

    #[test]
    fn avoids_hanging_a_queen() {
        let pos = fen::parse("4k3/8/8/3q4/8/8/3Q4/4K3 w - - 0 1").unwrap();
        let result = search_to_depth(&pos, 4);
        let mv = result.best_move.unwrap();
        // Qxd5 is the only move that doesn't lose material for free.
        assert_eq!(mv.to_uci(), "d2d5");
    }

    #[test]
    fn stalemate_is_scored_as_a_draw() {
        let pos = fen::parse("7k/8/6Q1/8/8/8/8/K7 b - - 0 1").unwrap();
        let result = search_to_depth(&pos, 1);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn already_stopped_flag_returns_immediately_with_seeded_move() {
        let pos = Position::starting_position();
        let mut tt = TranspositionTable::new(1);
        let mut heuristics = Heuristics::new(64);
        let mut repetition = RepetitionTracker::new();
        let result = iterative_deepening(
            &pos,
            &mut tt,
            &mut heuristics,
            &mut repetition,
            StopFlag::stopped(),
            TimeManager::unbounded(),
            10,
            |_| {},
        );
        assert!(result.best_move.is_some());
        assert_eq!(result.depth_completed, 0);
    }

    #[test]
    fn deeper_iterations_do_not_regress_mate_detection() {
        let pos = fen::parse("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let result = search_to_depth(&pos, 5);
        assert!(eval::is_winning(result.score));
    }
}
