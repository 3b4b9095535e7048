//! Error types for the settlement engine.

use crate::model::PlayerId;
use crate::money::Money;
use thiserror::Error;

/// Result type alias for crate-level operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Input records the engine refuses to settle.
///
/// Each variant names the offending record. The engine never guesses a
/// correction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Duplicate player id {player}")]
    DuplicatePlayer { player: PlayerId },

    /// The id would print the same as the bank in a settlement
    #[error("Player id {player} is reserved for the bank")]
    ReservedPlayerId { player: PlayerId },

    #[error("Duplicate buy-in id {buy_in}")]
    DuplicateBuyIn { buy_in: String },

    #[error("Buy-in {buy_in} references unknown player {player}")]
    BuyInForUnknownPlayer { buy_in: String, player: PlayerId },

    #[error("Cash-out references unknown player {player}")]
    CashOutForUnknownPlayer { player: PlayerId },

    /// A player may cash out at most once per session
    #[error("Player {player} has more than one cash-out")]
    DuplicateCashOut { player: PlayerId },

    #[error("Buy-in {buy_in} has negative amount {amount}")]
    NegativeBuyIn { buy_in: String, amount: Money },

    #[error("Cash-out for player {player} has negative amount {amount}")]
    NegativeCashOut { player: PlayerId, amount: Money },

    #[error("Cash-out for player {player} has negative stack value {stack}")]
    NegativeStack { player: PlayerId, stack: Money },

    /// Session amounts add up to more than the minor-unit range can hold
    #[error("Session amounts overflow at {record}")]
    AmountOverflow { record: String },
}

/// Errors that can occur while loading a session or running the CLI.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to open or read the input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Session row that could not be turned into a record
    #[error("Invalid record at row {row}: {message}")]
    InvalidRecord { row: usize, message: String },

    /// Session rejected by the ledger
    #[error("Invalid session: {0}")]
    Validation(#[from] ValidationError),

    /// Missing input file argument
    #[error("Missing input file argument. Usage: settle <session.csv> [--shortfall clamp|overpay]")]
    MissingArgument,

    /// Unrecognised or malformed command-line argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
