//! Paying leftover winnings out of the pooled bank advances.
//!
//! Chips fronted by the bank end up in somebody's stack. After peer netting,
//! whatever creditors are still owed is exactly the part of their winnings
//! that came from bank-funded chips, so the bank pays it.

use crate::config::ShortfallPolicy;
use crate::model::{Party, Transaction};
use crate::money::Money;
use crate::netting::{largest, reduce, Balance};
use log::{debug, warn};

/// Bank transfers and what is left on either side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankOutcome {
    pub transactions: Vec<Transaction>,
    /// Creditors the pool could not cover, in roster order.
    pub unpaid: Vec<Balance>,
    /// Pool after reconciliation. Negative under [`ShortfallPolicy::Overpay`]
    /// when the bank paid out more than it advanced.
    pub pool_remaining: Money,
}

/// Reconciliation state between two payouts.
#[derive(Debug)]
struct Pool {
    creditors: Vec<Balance>,
    remaining: Money,
}

impl Pool {
    fn payout(mut self, policy: ShortfallPolicy) -> Result<(Transaction, Pool), Pool> {
        if !self.remaining.is_positive() {
            return Err(self);
        }
        let c = match largest(&self.creditors) {
            Some(c) => c,
            None => return Err(self),
        };

        let owed = self.creditors[c].amount;
        let paid = match policy {
            ShortfallPolicy::Clamp => owed.min(self.remaining),
            ShortfallPolicy::Overpay => owed,
        };
        let tx = Transaction::new(
            Party::Bank,
            Party::Player(self.creditors[c].player_id.clone()),
            paid,
        );

        reduce(&mut self.creditors, c, paid);
        self.remaining -= paid;

        Ok((tx, self))
    }
}

/// Pays creditors left after peer netting out of the bank pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct BankReconciler {
    policy: ShortfallPolicy,
}

impl BankReconciler {
    pub fn new(policy: ShortfallPolicy) -> Self {
        BankReconciler { policy }
    }

    pub fn policy(&self) -> ShortfallPolicy {
        self.policy
    }

    /// Pays the largest remaining creditor until nobody is owed or the pool
    /// is no longer positive.
    pub fn reconcile(&self, creditors: Vec<Balance>, bank_pool_total: Money) -> BankOutcome {
        let mut transactions = Vec::new();
        let mut pool = Pool {
            creditors,
            remaining: bank_pool_total,
        };

        let rest = loop {
            match pool.payout(self.policy) {
                Ok((tx, next)) => {
                    debug!("Bank transfer {}", tx);
                    transactions.push(tx);
                    pool = next;
                }
                Err(done) => break done,
            }
        };

        if !rest.creditors.is_empty() {
            let unpaid: Money = rest.creditors.iter().map(|b| b.amount).sum();
            warn!(
                "Bank pool exhausted with {} creditor(s) still owed {} ({} policy)",
                rest.creditors.len(),
                unpaid,
                self.policy
            );
        }
        if rest.remaining.is_negative() {
            warn!("Bank pool overdrawn by {}", rest.remaining.abs());
        }

        BankOutcome {
            transactions,
            unpaid: rest.creditors,
            pool_remaining: rest.remaining,
        }
    }
}
