//! Per-player aggregation of buy-ins and cash-outs.
//!
//! The ledger is the first stage of settlement. It validates the raw
//! session records, then folds them into one [`NetPosition`] per
//! participating player.
//!
//! # Cash vs. bank contributions
//!
//! Only the chips a player paid for in cash count against them when peers
//! settle up: `net = cash_out - cash_contribution`. Chips advanced by the
//! bank are pooled into `bank_pool_total` and reconciled separately, so a
//! player who lost a bank-funded stack owes nothing to the table.

use crate::error::ValidationError;
use crate::model::{BuyIn, CashOut, FundingSource, Party, Player, PlayerId};
use crate::money::Money;
use log::{debug, warn};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Whether a player has left the table yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// Still playing; no cash-out recorded.
    Open,

    /// Cashed out for `amount` with a counted stack of `stack_value`.
    CashedOut { amount: Money, stack_value: Money },
}

/// Running totals for one roster slot while records are folded in.
#[derive(Debug)]
struct PlayerLedger<'a> {
    player_id: &'a str,
    cash: Money,
    bank: Money,
    has_buy_in: bool,
    state: PlayerState,
}

impl<'a> PlayerLedger<'a> {
    fn new(player_id: &'a str) -> Self {
        PlayerLedger {
            player_id,
            cash: Money::ZERO,
            bank: Money::ZERO,
            has_buy_in: false,
            state: PlayerState::Open,
        }
    }

    fn record_buy_in(&mut self, buy_in: &BuyIn) {
        match buy_in.source {
            FundingSource::Cash => self.cash += buy_in.amount,
            FundingSource::Bank => self.bank += buy_in.amount,
        }
        self.has_buy_in = true;
    }

    fn record_cash_out(&mut self, cash_out: &CashOut) {
        self.state = PlayerState::CashedOut {
            amount: cash_out.amount,
            stack_value: cash_out.stack_value(),
        };
    }

    fn is_waiting(&self) -> bool {
        self.has_buy_in && self.state == PlayerState::Open
    }

    fn position(&self) -> Option<NetPosition> {
        match self.state {
            PlayerState::CashedOut {
                amount,
                stack_value,
            } => Some(NetPosition {
                player_id: self.player_id.to_string(),
                cash_contribution: self.cash,
                bank_contribution: self.bank,
                cash_out: amount,
                stack_value,
                net: amount - self.cash,
            }),
            PlayerState::Open => None,
        }
    }
}

/// A cashed-out player's balance at settlement time.
///
/// # Invariants
///
/// - `net == cash_out - cash_contribution`
/// - `bank_contribution` never enters `net`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetPosition {
    pub player_id: PlayerId,
    pub cash_contribution: Money,
    pub bank_contribution: Money,
    pub cash_out: Money,
    pub stack_value: Money,
    pub net: Money,
}

impl NetPosition {
    /// Difference between what was paid out and what was counted at the table.
    pub fn adjustment(&self) -> Money {
        self.cash_out - self.stack_value
    }
}

/// Session-wide sums, exposed so callers can surface a money mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SessionTotals {
    pub cash_buy_ins: Money,
    pub bank_buy_ins: Money,
    pub cash_outs: Money,
    pub stack_values: Money,
}

impl SessionTotals {
    pub fn buy_ins(&self) -> Money {
        self.cash_buy_ins + self.bank_buy_ins
    }

    /// `cash_outs - buy_ins`. Positive means more was paid out than came in.
    pub fn discrepancy(&self) -> Money {
        self.cash_outs - self.buy_ins()
    }

    pub fn is_balanced(&self) -> bool {
        self.discrepancy().is_zero()
    }
}

/// Output of the ledger stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ledger {
    /// Some players with buy-ins have not cashed out, in roster order.
    Incomplete { open_players: Vec<PlayerId> },

    /// Every participating player has cashed out.
    Ready {
        positions: Vec<NetPosition>,
        bank_pool_total: Money,
        totals: SessionTotals,
    },
}

/// Builds a [`Ledger`] from one session snapshot.
///
/// Positions come out in roster order, which later stages rely on to
/// break ties deterministically.
#[derive(Debug, Clone, Copy)]
pub struct LedgerBuilder<'a> {
    players: &'a [Player],
    buy_ins: &'a [BuyIn],
    cash_outs: &'a [CashOut],
}

impl<'a> LedgerBuilder<'a> {
    pub fn new(players: &'a [Player], buy_ins: &'a [BuyIn], cash_outs: &'a [CashOut]) -> Self {
        LedgerBuilder {
            players,
            buy_ins,
            cash_outs,
        }
    }

    /// Checks the snapshot for records the engine refuses to settle.
    ///
    /// Amounts are also summed with overflow checks, so once this passes no
    /// total derived from the snapshot can overflow.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut roster = HashSet::new();
        for player in self.players {
            if Party::is_reserved_id(&player.id) {
                return Err(ValidationError::ReservedPlayerId {
                    player: player.id.clone(),
                });
            }
            if !roster.insert(player.id.as_str()) {
                return Err(ValidationError::DuplicatePlayer {
                    player: player.id.clone(),
                });
            }
        }

        let mut grand_total = Money::ZERO;
        let mut buy_in_ids = HashSet::new();
        for buy_in in self.buy_ins {
            if !buy_in_ids.insert(buy_in.id.as_str()) {
                return Err(ValidationError::DuplicateBuyIn {
                    buy_in: buy_in.id.clone(),
                });
            }
            if !roster.contains(buy_in.player_id.as_str()) {
                return Err(ValidationError::BuyInForUnknownPlayer {
                    buy_in: buy_in.id.clone(),
                    player: buy_in.player_id.clone(),
                });
            }
            if buy_in.amount.is_negative() {
                return Err(ValidationError::NegativeBuyIn {
                    buy_in: buy_in.id.clone(),
                    amount: buy_in.amount,
                });
            }
            grand_total = grand_total.checked_add(buy_in.amount).ok_or_else(|| {
                ValidationError::AmountOverflow {
                    record: format!("buy-in {}", buy_in.id),
                }
            })?;
        }

        let mut cashed_out = HashSet::new();
        for cash_out in self.cash_outs {
            if !roster.contains(cash_out.player_id.as_str()) {
                return Err(ValidationError::CashOutForUnknownPlayer {
                    player: cash_out.player_id.clone(),
                });
            }
            if !cashed_out.insert(cash_out.player_id.as_str()) {
                return Err(ValidationError::DuplicateCashOut {
                    player: cash_out.player_id.clone(),
                });
            }
            if cash_out.amount.is_negative() {
                return Err(ValidationError::NegativeCashOut {
                    player: cash_out.player_id.clone(),
                    amount: cash_out.amount,
                });
            }
            if let Some(stack) = cash_out.stack_value.filter(|s| s.is_negative()) {
                return Err(ValidationError::NegativeStack {
                    player: cash_out.player_id.clone(),
                    stack,
                });
            }
            grand_total = grand_total
                .checked_add(cash_out.amount.max(cash_out.stack_value()))
                .ok_or_else(|| ValidationError::AmountOverflow {
                    record: format!("cash-out for player {}", cash_out.player_id),
                })?;
        }

        Ok(())
    }

    /// Validates, then aggregates the snapshot.
    ///
    /// Returns [`Ledger::Incomplete`] rather than an error when players are
    /// still at the table.
    pub fn build(&self) -> Result<Ledger, ValidationError> {
        self.validate()?;

        let mut slots: Vec<PlayerLedger<'a>> = self
            .players
            .iter()
            .map(|p| PlayerLedger::new(p.id.as_str()))
            .collect();
        let index: HashMap<&str, usize> = self
            .players
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.as_str(), i))
            .collect();

        let mut totals = SessionTotals::default();

        // Validation guarantees every record resolves to a roster slot.
        for buy_in in self.buy_ins {
            if let Some(&i) = index.get(buy_in.player_id.as_str()) {
                slots[i].record_buy_in(buy_in);
            }
            match buy_in.source {
                FundingSource::Cash => totals.cash_buy_ins += buy_in.amount,
                FundingSource::Bank => totals.bank_buy_ins += buy_in.amount,
            }
        }
        for cash_out in self.cash_outs {
            if let Some(&i) = index.get(cash_out.player_id.as_str()) {
                slots[i].record_cash_out(cash_out);
            }
            totals.cash_outs += cash_out.amount;
            totals.stack_values += cash_out.stack_value();
        }

        let open_players: Vec<PlayerId> = slots
            .iter()
            .filter(|slot| slot.is_waiting())
            .map(|slot| slot.player_id.to_string())
            .collect();
        if !open_players.is_empty() {
            debug!(
                "Ledger incomplete: {} player(s) still open",
                open_players.len()
            );
            return Ok(Ledger::Incomplete { open_players });
        }

        if !totals.is_balanced() {
            warn!(
                "Session totals do not balance: buy-ins {}, cash-outs {}, discrepancy {}",
                totals.buy_ins(),
                totals.cash_outs,
                totals.discrepancy()
            );
        }

        let positions: Vec<NetPosition> = slots.iter().filter_map(PlayerLedger::position).collect();
        for position in &positions {
            debug!(
                "Player {}: cash {} bank {} out {} net {}",
                position.player_id,
                position.cash_contribution,
                position.bank_contribution,
                position.cash_out,
                position.net
            );
        }

        Ok(Ledger::Ready {
            positions,
            bank_pool_total: totals.bank_buy_ins,
            totals,
        })
    }
}
