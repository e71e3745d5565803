//! Structured errors for every boundary that can see malformed external
//! input (FEN/EPD text, UCI move tokens, UCI command lines). Nothing in
//! this crate panics on attacker-controlled input; these types are how
//! failures are reported instead.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FenError {
    TooFewParts { found: usize },
    InvalidPiece { char: char },
    InvalidCastling { char: char },
    InvalidSideToMove { found: String },
    InvalidEnPassant { found: String },
    InvalidRank { rank: String },
    TooManyFiles { rank: usize, files: usize },
    TooFewFiles { rank: usize, files: usize },
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::TooFewParts { found } => {
                write!(f, "FEN must have at least 4 space-separated fields, found {found}")
            }
            FenError::InvalidPiece { char } => write!(f, "invalid piece character '{char}'"),
            FenError::InvalidCastling { char } => write!(f, "invalid castling character '{char}'"),
            FenError::InvalidSideToMove { found } => {
                write!(f, "side to move must be 'w' or 'b', found '{found}'")
            }
            FenError::InvalidEnPassant { found } => {
                write!(f, "invalid en-passant target square '{found}'")
            }
            FenError::InvalidRank { rank } => write!(f, "invalid rank field '{rank}'"),
            FenError::TooManyFiles { rank, files } => {
                write!(f, "rank {rank} describes {files} files, expected at most 8")
            }
            FenError::TooFewFiles { rank, files } => {
                write!(f, "rank {rank} describes {files} files, expected exactly 8")
            }
        }
    }
}

impl std::error::Error for FenError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SquareError {
    RankOutOfBounds { rank: i32 },
    FileOutOfBounds { file: i32 },
    InvalidNotation { notation: String },
}

impl fmt::Display for SquareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SquareError::RankOutOfBounds { rank } => write!(f, "rank {rank} is out of bounds"),
            SquareError::FileOutOfBounds { file } => write!(f, "file {file} is out of bounds"),
            SquareError::InvalidNotation { notation } => {
                write!(f, "'{notation}' is not valid algebraic square notation")
            }
        }
    }
}

impl std::error::Error for SquareError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveParseError {
    InvalidLength { len: usize },
    InvalidSquare { notation: String },
    InvalidPromotion { char: char },
    IllegalMove { notation: String },
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveParseError::InvalidLength { len } => {
                write!(f, "UCI move must be 4 or 5 characters, found {len}")
            }
            MoveParseError::InvalidSquare { notation } => {
                write!(f, "'{notation}' is not a valid square")
            }
            MoveParseError::InvalidPromotion { char } => {
                write!(f, "'{char}' is not a valid promotion piece")
            }
            MoveParseError::IllegalMove { notation } => {
                write!(f, "'{notation}' is not a legal move in this position")
            }
        }
    }
}

impl std::error::Error for MoveParseError {}

/// Errors from the UCI line-protocol front-end: malformed commands, not
/// protocol violations the GUI itself is responsible for avoiding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UciError {
    UnknownCommand { line: String },
    MissingArgument { command: &'static str, argument: &'static str },
    InvalidArgument { command: &'static str, argument: &'static str, found: String },
    Fen(FenError),
    Move(MoveParseError),
}

impl fmt::Display for UciError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UciError::UnknownCommand { line } => write!(f, "unknown UCI command: '{line}'"),
            UciError::MissingArgument { command, argument } => {
                write!(f, "'{command}' is missing required argument '{argument}'")
            }
            UciError::InvalidArgument { command, argument, found } => {
                write!(f, "'{command}' argument '{argument}' has invalid value '{found}'")
            }
            UciError::Fen(e) => write!(f, "{e}"),
            UciError::Move(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for UciError {}

impl From<FenError> for UciError {
    fn from(e: FenError) -> Self {
        UciError::Fen(e)
    }
}

impl From<MoveParseError> for UciError {
    fn from(e: MoveParseError) -> Self {
        UciError::Move(e)
    }
}
