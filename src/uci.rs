//! UCI line protocol: parses commands read from stdin, drives the search
//! facade, and writes `id`/`uciok`/`readyok`/`info`/`bestmove` responses to
//! stdout.

use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::time::Duration;

use crate::engine::{Engine, GoLimits};
use crate::error::UciError;
use crate::fen;
use crate::movegen::{self, Variant};
use crate::position::Position;
use crate::types::Move;
use crate::uci_info::{bestmove_line, Info};

const NAME: &str = "uci_engine";
const AUTHOR: &str = "uci_engine contributors";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UciCommand {
    Uci,
    IsReady,
    UciNewGame,
    Debug(bool),
    Position { fen: Option<String>, moves: Vec<String> },
    Go(GoLimits),
    Stop,
    Quit,
}

/// Parses one line of UCI input into a command, or a structured error
/// naming which argument was missing or malformed.
pub fn parse_command(line: &str) -> Result<UciCommand, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.first() {
        None => Err(UciError::UnknownCommand { line: line.to_string() }),
        Some(&"uci") => Ok(UciCommand::Uci),
        Some(&"isready") => Ok(UciCommand::IsReady),
        Some(&"ucinewgame") => Ok(UciCommand::UciNewGame),
        Some(&"stop") => Ok(UciCommand::Stop),
        Some(&"quit") => Ok(UciCommand::Quit),
        Some(&"debug") => parse_debug(&tokens[1..]),
        Some(&"position") => parse_position(&tokens[1..]),
        Some(&"go") => parse_go(&tokens[1..]),
        Some(_) => Err(UciError::UnknownCommand { line: line.to_string() }),
    }
}

fn parse_debug(args: &[&str]) -> Result<UciCommand, UciError> {
    match args.first() {
        Some(&"on") => Ok(UciCommand::Debug(true)),
        Some(&"off") => Ok(UciCommand::Debug(false)),
        Some(found) => {
            Err(UciError::InvalidArgument { command: "debug", argument: "on|off", found: (*found).to_string() })
        }
        None => Err(UciError::MissingArgument { command: "debug", argument: "on|off" }),
    }
}

fn parse_position(args: &[&str]) -> Result<UciCommand, UciError> {
    let mut idx = 0;
    let fen_string = match args.first() {
        Some(&"startpos") => {
            idx += 1;
            None
        }
        Some(&"fen") => {
            idx += 1;
            let start = idx;
            while idx < args.len() && args[idx] != "moves" {
                idx += 1;
            }
            if idx == start {
                return Err(UciError::MissingArgument { command: "position", argument: "fen" });
            }
            Some(args[start..idx].join(" "))
        }
        Some(found) => {
            return Err(UciError::InvalidArgument {
                command: "position",
                argument: "startpos|fen",
                found: (*found).to_string(),
            })
        }
        None => return Err(UciError::MissingArgument { command: "position", argument: "startpos|fen" }),
    };

    let moves = if args.get(idx) == Some(&"moves") {
        args[idx + 1..].iter().map(|s| (*s).to_string()).collect()
    } else {
        Vec::new()
    };
    Ok(UciCommand::Position { fen: fen_string, moves })
}

fn parse_go(args: &[&str]) -> Result<UciCommand, UciError> {
    let mut limits = GoLimits::default();
    let mut i = 0;
    while i < args.len() {
        match args[i] {
            "depth" => limits.depth = Some(next_value(args, &mut i, "depth")?),
            "movetime" => limits.movetime = Some(Duration::from_millis(next_value(args, &mut i, "movetime")?)),
            "wtime" => limits.wtime = Some(Duration::from_millis(next_value(args, &mut i, "wtime")?)),
            "btime" => limits.btime = Some(Duration::from_millis(next_value(args, &mut i, "btime")?)),
            "winc" => limits.winc = Some(Duration::from_millis(next_value(args, &mut i, "winc")?)),
            "binc" => limits.binc = Some(Duration::from_millis(next_value(args, &mut i, "binc")?)),
            // nodes/mate/movestogo/infinite/ponder are accepted but not
            // modeled by GoLimits; skip their value (if any) and move on.
            _ => i += 1,
        }
    }
    Ok(UciCommand::Go(limits))
}

fn next_value<T: std::str::FromStr>(args: &[&str], i: &mut usize, argument: &'static str) -> Result<T, UciError> {
    let token = args
        .get(*i + 1)
        .ok_or(UciError::MissingArgument { command: "go", argument })?;
    let value = token
        .parse::<T>()
        .map_err(|_| UciError::InvalidArgument { command: "go", argument, found: (*token).to_string() })?;
    *i += 2;
    Ok(value)
}

/// Owns the position under consideration and the search facade across a
/// sequence of UCI commands.
pub struct UciSession {
    engine: Engine,
    position: Position,
    debug: bool,
}

impl UciSession {
    #[must_use]
    pub fn new() -> Self {
        UciSession { engine: Engine::new(), position: Position::starting_position(), debug: false }
    }

    fn set_position(&mut self, fen_string: Option<String>, moves: &[String]) -> Result<(), UciError> {
        let mut pos = match fen_string {
            Some(text) => fen::parse(&text)?,
            None => Position::starting_position(),
        };
        for token in moves {
            let legal = movegen::generate_moves(&pos, Variant::All);
            let mv = Move::from_uci(token, &legal)?;
            pos = pos.apply_move(mv);
        }
        self.position = pos;
        Ok(())
    }

    /// Handles one input line, returning the synchronous response lines
    /// (`id ...`/`uciok`/`readyok`) to print immediately. `go` prints its
    /// `info`/`bestmove` lines itself, asynchronously, via `stdout`.
    /// Returns whether the session should keep reading further lines.
    fn handle_line(&mut self, line: &str) -> (Vec<String>, bool) {
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(err) => {
                log::warn!("ignoring malformed UCI command: {err}");
                return (Vec::new(), true);
            }
        };
        match command {
            UciCommand::Uci => {
                (vec![format!("id name {NAME}"), format!("id author {AUTHOR}"), "uciok".to_string()], true)
            }
            UciCommand::IsReady => (vec!["readyok".to_string()], true),
            UciCommand::UciNewGame => {
                self.engine.new_game();
                self.position = Position::starting_position();
                (Vec::new(), true)
            }
            UciCommand::Debug(on) => {
                self.debug = on;
                (Vec::new(), true)
            }
            UciCommand::Position { fen, moves } => {
                if let Err(err) = self.set_position(fen, &moves) {
                    log::warn!("rejecting position command: {err}");
                }
                (Vec::new(), true)
            }
            UciCommand::Go(limits) => {
                self.start_search(limits);
                (Vec::new(), true)
            }
            UciCommand::Stop => {
                self.engine.stop();
                (Vec::new(), true)
            }
            UciCommand::Quit => {
                self.engine.stop();
                (Vec::new(), false)
            }
        }
    }

    /// Spawns the printer thread that drains `info_rx` and starts the
    /// search itself; `bestmove` is printed from inside the search's own
    /// completion callback once the worker thread finishes.
    fn start_search(&mut self, limits: GoLimits) {
        log::info!("go depth={:?} movetime={:?}", limits.depth, limits.movetime);
        let (info_tx, info_rx) = mpsc::channel();
        std::thread::spawn(move || {
            let stdout = io::stdout();
            for iteration in info_rx {
                let mut handle = stdout.lock();
                let _ = writeln!(handle, "{}", Info::from_iteration(iteration).to_uci_line());
            }
        });
        self.engine.go(
            self.position,
            limits,
            Some(info_tx),
            Some(Box::new(|best_move| {
                println!("{}", bestmove_line(best_move));
            })),
        );
    }
}

impl Default for UciSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the UCI loop to completion, reading commands from `input` and
/// printing synchronous responses through `println!`.
pub fn run(input: impl BufRead) {
    let mut session = UciSession::new();
    for line in input.lines() {
        let Ok(line) = line else { break };
        let (responses, keep_going) = session.handle_line(&line);
        for response in responses {
            println!("{response}");
        }
        if !keep_going {
            break;
        }
    }
}
