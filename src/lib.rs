//! A UCI chess engine: bitboard move generation, tapered-PST evaluation,
//! and an iterative-deepening alpha-beta search, wired up to the UCI line
//! protocol.

pub mod attack_tables;
pub mod engine;
pub mod error;
pub mod eval;
pub mod fen;
pub mod movegen;
pub mod ordering;
pub mod position;
pub mod repetition;
pub mod search;
pub mod sync;
pub mod tt;
pub mod types;
pub mod uci;
pub mod uci_info;
pub mod zobrist;
