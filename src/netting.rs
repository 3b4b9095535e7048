//! Greedy peer-to-peer debt netting.
//!
//! Debtors pay creditors directly. At every step the largest outstanding
//! debtor pays the largest outstanding creditor `min(debt, credit)`, and the
//! largest of each side is found again before the next step. Ties go to the
//! player seen first in the roster.
//!
//! This is a simplicity-over-optimality policy: it never needs more than
//! `n - 1` transfers for `n` non-zero balances, but a min-cash-flow solver can
//! sometimes use fewer. Callers and tests depend on the exact order produced
//! here, so it must not be swapped for an optimal solver.

use crate::ledger::NetPosition;
use crate::model::{Party, PlayerId, Transaction};
use crate::money::Money;
use log::{debug, warn};
use serde::Serialize;
use std::cmp::Reverse;

/// An outstanding amount owed to or by one player, as a positive magnitude.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Balance {
    pub player_id: PlayerId,
    pub amount: Money,
}

impl Balance {
    pub fn new(player_id: impl Into<PlayerId>, amount: Money) -> Self {
        Balance {
            player_id: player_id.into(),
            amount,
        }
    }
}

/// Index of the largest balance, first-seen on ties.
pub(crate) fn largest(balances: &[Balance]) -> Option<usize> {
    balances
        .iter()
        .enumerate()
        .min_by_key(|(_, b)| Reverse(b.amount))
        .map(|(i, _)| i)
}

/// Takes `amount` off one balance, dropping it once it is fully paid.
pub(crate) fn reduce(balances: &mut Vec<Balance>, index: usize, amount: Money) {
    balances[index].amount -= amount;
    if !balances[index].amount.is_positive() {
        balances.remove(index);
    }
}

/// Outstanding creditors and debtors, each in roster order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DebtBook {
    creditors: Vec<Balance>,
    debtors: Vec<Balance>,
}

impl DebtBook {
    /// Splits positions into creditors (`net > 0`) and debtors (`net < 0`).
    pub fn from_positions(positions: &[NetPosition]) -> Self {
        let mut book = DebtBook::default();
        for position in positions {
            if position.net.is_positive() {
                book.creditors
                    .push(Balance::new(position.player_id.clone(), position.net));
            } else if position.net.is_negative() {
                book.debtors
                    .push(Balance::new(position.player_id.clone(), position.net.abs()));
            }
        }
        book
    }

    pub fn creditors(&self) -> &[Balance] {
        &self.creditors
    }

    pub fn debtors(&self) -> &[Balance] {
        &self.debtors
    }

    /// Performs one greedy transfer.
    ///
    /// Returns the transfer and the book that remains, or hands the book back
    /// unchanged once either side is empty.
    pub fn next_transfer(mut self) -> Result<(Transaction, DebtBook), DebtBook> {
        let (d, c) = match (largest(&self.debtors), largest(&self.creditors)) {
            (Some(d), Some(c)) => (d, c),
            _ => return Err(self),
        };

        let amount = self.debtors[d].amount.min(self.creditors[c].amount);
        let tx = Transaction::new(
            Party::Player(self.debtors[d].player_id.clone()),
            Party::Player(self.creditors[c].player_id.clone()),
            amount,
        );

        reduce(&mut self.debtors, d, amount);
        reduce(&mut self.creditors, c, amount);

        Ok((tx, self))
    }
}

/// Peer transfers plus whatever neither side could absorb.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NettingOutcome {
    pub transactions: Vec<Transaction>,
    /// Still owed money; normally paid out of the bank pool next.
    pub creditors: Vec<Balance>,
    /// Still owing money with nobody left to pay. Only happens when the
    /// session's money does not add up.
    pub debtors: Vec<Balance>,
}

/// Matches debtors against creditors.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebtNetter;

impl DebtNetter {
    pub fn net(&self, positions: &[NetPosition]) -> NettingOutcome {
        let mut transactions = Vec::new();
        let mut book = DebtBook::from_positions(positions);

        let rest = loop {
            match book.next_transfer() {
                Ok((tx, next)) => {
                    debug!("Peer transfer {}", tx);
                    transactions.push(tx);
                    book = next;
                }
                Err(done) => break done,
            }
        };

        if !rest.debtors.is_empty() {
            let unmatched: Money = rest.debtors.iter().map(|b| b.amount).sum();
            warn!(
                "{} debtor(s) left with no creditor to pay, {} unmatched",
                rest.debtors.len(),
                unmatched
            );
        }

        NettingOutcome {
            transactions,
            creditors: rest.creditors,
            debtors: rest.debtors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(units: i64) -> Money {
        Money::from_major(units)
    }

    fn position(id: &str, net: i64) -> NetPosition {
        NetPosition {
            player_id: id.to_string(),
            cash_contribution: Money::ZERO,
            bank_contribution: Money::ZERO,
            cash_out: Money::ZERO,
            stack_value: Money::ZERO,
            net: m(net),
        }
    }

    fn transfers(outcome: &NettingOutcome) -> Vec<(String, String, i64)> {
        outcome
            .transactions
            .iter()
            .map(|tx| {
                (
                    tx.from.to_string(),
                    tx.to.to_string(),
                    tx.amount.minor_units() / 100,
                )
            })
            .collect()
    }

    fn t(from: &str, to: &str, amount: i64) -> (String, String, i64) {
        (from.to_string(), to.to_string(), amount)
    }

    #[test]
    fn test_single_pair() {
        let outcome = DebtNetter.net(&[position("x", 50), position("y", -50)]);
        assert_eq!(transfers(&outcome), vec![t("y", "x", 50)]);
        assert!(outcome.creditors.is_empty());
        assert!(outcome.debtors.is_empty());
    }

    #[test]
    fn test_largest_is_reevaluated_after_each_transfer() {
        let positions = [
            position("a", 60),
            position("b", 40),
            position("c", -70),
            position("d", -30),
        ];
        let outcome = DebtNetter.net(&positions);

        // A single pre-sorted pass would pay c -> b before d -> b.
        assert_eq!(
            transfers(&outcome),
            vec![t("c", "a", 60), t("d", "b", 30), t("c", "b", 10)]
        );
    }

    #[test]
    fn test_ties_go_to_roster_order() {
        let positions = [position("a", 50), position("b", 50), position("c", -100)];
        let outcome = DebtNetter.net(&positions);
        assert_eq!(transfers(&outcome), vec![t("c", "a", 50), t("c", "b", 50)]);

        let positions = [position("b", 50), position("a", 50), position("c", -100)];
        let outcome = DebtNetter.net(&positions);
        assert_eq!(transfers(&outcome), vec![t("c", "b", 50), t("c", "a", 50)]);
    }

    #[test]
    fn test_greedy_is_not_minimal() {
        // d -> a and c -> {b, e} would settle in three transfers.
        let positions = [
            position("a", 4),
            position("b", 3),
            position("c", -6),
            position("d", -4),
            position("e", 3),
        ];
        let outcome = DebtNetter.net(&positions);
        assert_eq!(
            transfers(&outcome),
            vec![
                t("c", "a", 4),
                t("d", "b", 3),
                t("c", "e", 2),
                t("d", "e", 1)
            ]
        );
    }

    #[test]
    fn test_leftover_creditors_are_returned() {
        let positions = [position("b", -100), position("c", 200)];
        let outcome = DebtNetter.net(&positions);
        assert_eq!(transfers(&outcome), vec![t("b", "c", 100)]);
        assert_eq!(outcome.creditors, vec![Balance::new("c", m(100))]);
        assert!(outcome.debtors.is_empty());
    }

    #[test]
    fn test_leftover_debtors_are_flagged() {
        let positions = [position("a", -100), position("b", -50), position("c", 30)];
        let outcome = DebtNetter.net(&positions);
        assert_eq!(transfers(&outcome), vec![t("a", "c", 30)]);
        assert_eq!(
            outcome.debtors,
            vec![Balance::new("a", m(70)), Balance::new("b", m(50))]
        );
    }

    #[test]
    fn test_zero_balances_produce_nothing() {
        let outcome = DebtNetter.net(&[position("a", 0), position("b", 0)]);
        assert!(outcome.transactions.is_empty());
        assert!(outcome.creditors.is_empty());
        assert!(outcome.debtors.is_empty());
    }

    #[test]
    fn test_next_transfer_hands_back_one_sided_book() {
        let book = DebtBook::from_positions(&[position("a", 10)]);
        let rest = book.clone().next_transfer().unwrap_err();
        assert_eq!(rest, book);
        assert_eq!(rest.creditors().len(), 1);
        assert!(rest.debtors().is_empty());
    }
}
