//! Final assembly of a settlement.

use crate::bank::BankOutcome;
use crate::ledger::{NetPosition, SessionTotals};
use crate::model::{Party, PlayerId, Transaction};
use crate::money::Money;
use crate::netting::{Balance, NettingOutcome};
use serde::Serialize;
use std::fmt;

/// Whether the session could be settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SettlementStatus {
    /// At least one player with buy-ins has not cashed out.
    Incomplete,
    /// Everyone cashed out and transfers were computed.
    Settled,
}

/// Everything a caller needs to show or act on a settlement.
///
/// `transactions` holds the peer transfers first, then the bank transfers.
/// It is always empty when `status` is [`SettlementStatus::Incomplete`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementResult {
    pub status: SettlementStatus,
    pub transactions: Vec<Transaction>,
    /// Players still at the table, in roster order.
    pub open_players: Vec<PlayerId>,
    pub positions: Vec<NetPosition>,
    pub totals: SessionTotals,
    pub bank_pool_total: Money,
    pub bank_pool_remaining: Money,
    pub unpaid_creditors: Vec<Balance>,
    pub unmatched_debtors: Vec<Balance>,
}

impl SettlementResult {
    pub fn incomplete(open_players: Vec<PlayerId>) -> Self {
        SettlementResult {
            status: SettlementStatus::Incomplete,
            transactions: Vec::new(),
            open_players,
            positions: Vec::new(),
            totals: SessionTotals::default(),
            bank_pool_total: Money::ZERO,
            bank_pool_remaining: Money::ZERO,
            unpaid_creditors: Vec::new(),
            unmatched_debtors: Vec::new(),
        }
    }

    pub fn is_settled(&self) -> bool {
        self.status == SettlementStatus::Settled
    }

    /// Settled, and every balance was already zero.
    pub fn no_transactions_needed(&self) -> bool {
        self.is_settled() && self.transactions.is_empty() && !self.has_residuals()
    }

    /// Whether some creditor or debtor could not be squared.
    pub fn has_residuals(&self) -> bool {
        !self.unpaid_creditors.is_empty() || !self.unmatched_debtors.is_empty()
    }

    pub fn received_by(&self, party: &Party) -> Money {
        self.transactions
            .iter()
            .filter(|tx| &tx.to == party)
            .map(|tx| tx.amount)
            .sum()
    }

    pub fn paid_by(&self, party: &Party) -> Money {
        self.transactions
            .iter()
            .filter(|tx| &tx.from == party)
            .map(|tx| tx.amount)
            .sum()
    }

    pub fn summary(&self) -> ReportSummary {
        if !self.is_settled() {
            return ReportSummary::WaitingForCashOuts {
                open_players: self.open_players.clone(),
            };
        }
        if self.has_residuals() {
            return ReportSummary::Unresolved {
                unpaid: self.unpaid_creditors.iter().map(|b| b.amount).sum(),
                unmatched: self.unmatched_debtors.iter().map(|b| b.amount).sum(),
            };
        }
        if self.transactions.is_empty() {
            return ReportSummary::NoTransactionsNeeded;
        }
        ReportSummary::Transfers {
            count: self.transactions.len(),
            total: self.transactions.iter().map(|tx| tx.amount).sum(),
        }
    }
}

/// The caller-facing outcome of a settlement run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportSummary {
    WaitingForCashOuts { open_players: Vec<PlayerId> },
    NoTransactionsNeeded,
    Transfers { count: usize, total: Money },
    /// Some money could not be routed; the session totals do not add up.
    Unresolved { unpaid: Money, unmatched: Money },
}

impl fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportSummary::WaitingForCashOuts { open_players } => write!(
                f,
                "Waiting for all players to cash out (still open: {})",
                open_players.join(", ")
            ),
            ReportSummary::NoTransactionsNeeded => write!(f, "No transactions needed"),
            ReportSummary::Transfers { count, total } => {
                write!(f, "{} transaction(s) totalling {}", count, total)
            }
            ReportSummary::Unresolved { unpaid, unmatched } => write!(
                f,
                "Settlement unresolved: {} owed to creditors unpaid, {} owed by debtors unmatched",
                unpaid, unmatched
            ),
        }
    }
}

/// Joins the netting and bank stages into a [`SettlementResult`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SettlementReport;

impl SettlementReport {
    pub fn assemble(
        &self,
        positions: Vec<NetPosition>,
        totals: SessionTotals,
        bank_pool_total: Money,
        netting: NettingOutcome,
        bank: BankOutcome,
    ) -> SettlementResult {
        let mut transactions = netting.transactions;
        transactions.extend(bank.transactions);

        SettlementResult {
            status: SettlementStatus::Settled,
            transactions,
            open_players: Vec::new(),
            positions,
            totals,
            bank_pool_total,
            bank_pool_remaining: bank.pool_remaining,
            unpaid_creditors: bank.unpaid,
            unmatched_debtors: netting.debtors,
        }
    }
}
