//! `info` line formatting for the UCI protocol, built from one completed
//! iterative-deepening depth.

use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;

use crate::eval;
use crate::search::IterationInfo;
use crate::types::Move;

#[derive(Clone, Debug, Default)]
pub struct Info {
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
    pub nps: Option<u64>,
    pub time_ms: Option<u128>,
    pub score_cp: Option<i32>,
    pub score_mate: Option<i32>,
    pub pv: Option<String>,
}

impl Info {
    /// Converts a completed depth's raw centipawn score into a mate count
    /// whenever the search found (or is fleeing) a forced mate.
    #[must_use]
    pub fn from_iteration(iteration: IterationInfo) -> Self {
        let (score_cp, score_mate) = if eval::is_winning(iteration.score) {
            (None, Some(moves_to_mate(iteration.score)))
        } else if eval::is_losing(iteration.score) {
            (None, Some(-moves_to_mate(-iteration.score)))
        } else {
            (Some(iteration.score), None)
        };
        Info {
            depth: Some(iteration.depth),
            nodes: Some(iteration.nodes),
            nps: Some(nodes_per_second(iteration.nodes, iteration.time)),
            time_ms: Some(iteration.time.as_millis()),
            score_cp,
            score_mate,
            pv: iteration.best_move.map(|mv| mv.to_uci()),
        }
    }

    #[must_use]
    pub fn to_uci_line(&self) -> String {
        let mut parts = Vec::new();
        if let Some(d) = self.depth {
            parts.push(format!("depth {d}"));
        }
        if let Some(n) = self.nodes {
            parts.push(format!("nodes {n}"));
        }
        if let Some(nps) = self.nps {
            parts.push(format!("nps {nps}"));
        }
        if let Some(t) = self.time_ms {
            parts.push(format!("time {t}"));
        }
        if let Some(mate) = self.score_mate {
            parts.push(format!("score mate {mate}"));
        } else if let Some(cp) = self.score_cp {
            parts.push(format!("score cp {cp}"));
        }
        if let Some(ref pv) = self.pv {
            parts.push(format!("pv {pv}"));
        }
        if parts.is_empty() {
            "info".to_string()
        } else {
            format!("info {}", parts.join(" "))
        }
    }
}

/// A winning score is `20_000 + plies_to_mate`; UCI wants moves, not plies.
fn moves_to_mate(score: i32) -> i32 {
    let plies_to_mate = (score - 20_000).max(0);
    (plies_to_mate + 1) / 2
}

fn nodes_per_second(nodes: u64, time: Duration) -> u64 {
    let secs = time.as_secs_f64();
    if secs <= 0.0 {
        nodes.saturating_mul(1000)
    } else {
        (nodes as f64 / secs) as u64
    }
}

/// Formats the terminal `bestmove` response line.
#[must_use]
pub fn bestmove_line(mv: Option<Move>) -> String {
    match mv {
        Some(mv) => format!("bestmove {}", mv.to_uci()),
        None => "bestmove (none)".to_string(),
    }
}

pub fn channel() -> (Sender<Info>, Receiver<Info>) {
    std::sync::mpsc::channel()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_score_reports_centipawns() {
        let iteration = IterationInfo {
            depth: 4,
            score: 37,
            best_move: None,
            nodes: 1000,
            time: Duration::from_millis(500),
        };
        let info = Info::from_iteration(iteration);
        assert_eq!(info.score_cp, Some(37));
        assert_eq!(info.score_mate, None);
        assert_eq!(info.nps, Some(2000));
    }

    #[test]
    fn winning_score_reports_positive_mate_in_moves() {
        let iteration = IterationInfo {
            depth: 3,
            score: eval::winning(1),
            best_move: None,
            nodes: 10,
            time: Duration::from_millis(10),
        };
        let info = Info::from_iteration(iteration);
        assert_eq!(info.score_cp, None);
        assert_eq!(info.score_mate, Some(1));
    }

    #[test]
    fn losing_score_reports_negative_mate_in_moves() {
        let iteration = IterationInfo {
            depth: 3,
            score: eval::losing(1),
            best_move: None,
            nodes: 10,
            time: Duration::from_millis(10),
        };
        let info = Info::from_iteration(iteration);
        assert_eq!(info.score_mate, Some(-1));
    }

    #[test]
    fn bestmove_line_formats_none_as_literal() {
        assert_eq!(bestmove_line(None), "bestmove (none)");
    }

    #[test]
    fn to_uci_line_includes_every_present_field() {
        let info = Info {
            depth: Some(5),
            nodes: Some(100),
            nps: Some(1000),
            time_ms: Some(100),
            score_cp: Some(25),
            score_mate: None,
            pv: Some("e2e4".to_string()),
        };
        let line = info.to_uci_line();
        assert!(line.contains("depth 5"));
        assert!(line.contains("score cp 25"));
        assert!(line.contains("pv e2e4"));
    }
}