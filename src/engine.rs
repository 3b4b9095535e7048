//! Settlement orchestration.
//!
//! Runs the four stages in order: ledger, peer netting, bank reconciliation,
//! report. Every stage consumes plain data and returns new data, so the
//! engine holds nothing but its configuration and is safe to share between
//! threads.

use crate::bank::BankReconciler;
use crate::config::SettlementConfig;
use crate::error::ValidationError;
use crate::ledger::{Ledger, LedgerBuilder};
use crate::model::{BuyIn, CashOut, Player};
use crate::netting::DebtNetter;
use crate::report::{SettlementReport, SettlementResult};
use crate::session::Session;
use log::debug;

/// The settlement engine.
///
/// # Determinism
///
/// Identical input, including record order, always yields an identical
/// result, including transaction order. Ties between equal balances are
/// broken by roster order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettlementEngine {
    config: SettlementConfig,
}

impl SettlementEngine {
    /// Creates an engine with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SettlementConfig) -> Self {
        SettlementEngine { config }
    }

    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    /// Computes the transfers that settle one session snapshot.
    ///
    /// An unfinished session is not an error: the result carries
    /// [`SettlementStatus::Incomplete`](crate::SettlementStatus::Incomplete)
    /// and no transactions.
    pub fn compute(
        &self,
        players: &[Player],
        buy_ins: &[BuyIn],
        cash_outs: &[CashOut],
    ) -> Result<SettlementResult, ValidationError> {
        let (positions, bank_pool_total, totals) =
            match LedgerBuilder::new(players, buy_ins, cash_outs).build()? {
                Ledger::Incomplete { open_players } => {
                    return Ok(SettlementResult::incomplete(open_players));
                }
                Ledger::Ready {
                    positions,
                    bank_pool_total,
                    totals,
                } => (positions, bank_pool_total, totals),
            };

        let netting = DebtNetter.net(&positions);
        debug!(
            "Peer netting produced {} transfer(s), {} creditor(s) left",
            netting.transactions.len(),
            netting.creditors.len()
        );

        let bank = BankReconciler::new(self.config.shortfall_policy)
            .reconcile(netting.creditors.clone(), bank_pool_total);
        debug!(
            "Bank reconciliation produced {} transfer(s) from a pool of {}",
            bank.transactions.len(),
            bank_pool_total
        );

        Ok(SettlementReport.assemble(positions, totals, bank_pool_total, netting, bank))
    }

    /// Computes the settlement for a loaded [`Session`].
    pub fn compute_session(&self, session: &Session) -> Result<SettlementResult, ValidationError> {
        self.compute(&session.players, &session.buy_ins, &session.cash_outs)
    }
}

/// Computes a settlement with the default configuration.
///
/// # Example
///
/// ```
/// use poker_settlement::{compute_settlement, BuyIn, CashOut, Money, Party, Player};
///
/// let players = vec![Player::new("x", "Xavier"), Player::new("y", "Yara")];
/// let buy_ins = vec![
///     BuyIn::cash("1", "x", Money::from_major(100)),
///     BuyIn::cash("2", "y", Money::from_major(100)),
/// ];
/// let cash_outs = vec![
///     CashOut::new("x", Money::from_major(150)),
///     CashOut::new("y", Money::from_major(50)),
/// ];
///
/// let result = compute_settlement(&players, &buy_ins, &cash_outs).unwrap();
/// assert_eq!(result.transactions.len(), 1);
/// assert_eq!(result.transactions[0].from, Party::player("y"));
/// assert_eq!(result.transactions[0].amount, Money::from_major(50));
/// ```
pub fn compute_settlement(
    players: &[Player],
    buy_ins: &[BuyIn],
    cash_outs: &[CashOut],
) -> Result<SettlementResult, ValidationError> {
    SettlementEngine::new().compute(players, buy_ins, cash_outs)
}
