//! # Poker Settlement
//!
//! Turns the buy-ins and cash-outs of a finished poker session into the
//! transfers that square every player, accounting for chips that were
//! advanced by the bank (PayBox) instead of paid for in cash.
//!
//! ## Pipeline
//!
//! 1. [`ledger`]: validate the snapshot and compute each player's net
//!    balance, keeping bank advances out of it
//! 2. [`netting`]: greedy largest-debtor-pays-largest-creditor matching
//! 3. [`bank`]: pay leftover winnings out of the bank pool
//! 4. [`report`]: assemble the ordered transfer list and summary
//!
//! ## Design Principles
//!
//! - **Integer minor units**: all money is counted in cents
//! - **Pure stages**: no I/O or shared state in the engine itself
//! - **Deterministic output**: ties broken by roster order
//!
//! ## Example
//!
//! ```no_run
//! use poker_settlement::{write_settlement, Session, SettlementEngine};
//! use std::io::Cursor;
//!
//! let csv = "type,player,id,amount,source,stack,timestamp,name\n\
//!            player,1,,,,,,Alice\n\
//!            buyin,1,b1,100,cash,,,\n\
//!            cashout,1,,100,,,,\n";
//! let session = Session::from_csv(Cursor::new(csv)).unwrap();
//! let result = SettlementEngine::new().compute_session(&session).unwrap();
//! write_settlement(&result, std::io::stdout()).unwrap();
//! ```

pub mod bank;
pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod model;
pub mod money;
pub mod netting;
pub mod report;
pub mod session;

pub use bank::{BankOutcome, BankReconciler};
pub use config::{SettlementConfig, ShortfallPolicy};
pub use engine::{compute_settlement, SettlementEngine};
pub use error::{EngineError, Result, ValidationError};
pub use ledger::{Ledger, LedgerBuilder, NetPosition, PlayerState, SessionTotals};
pub use model::{BuyIn, CashOut, FundingSource, Party, Player, PlayerId, Transaction};
pub use money::{Money, MoneyError};
pub use netting::{Balance, DebtBook, DebtNetter, NettingOutcome};
pub use report::{ReportSummary, SettlementReport, SettlementResult, SettlementStatus};
pub use session::{write_settlement, Session, SessionEntry, SessionRecord};
