//! CSV boundary: loading a session snapshot and writing a settlement.
//!
//! A session file lists roster entries, buy-ins and cash-outs as rows of one
//! table:
//!
//! ```text
//! type,player,id,amount,source,stack,timestamp,name
//! player,1,,,,,,Alice
//! buyin,1,b1,100.00,cash,,1700000000000,
//! cashout,1,,150.00,,150.00,,
//! ```
//!
//! Unlike a streaming processor, a row that cannot be parsed aborts loading:
//! settling with a dropped buy-in would silently move money.

use crate::error::{EngineError, Result};
use crate::model::{BuyIn, CashOut, FundingSource, Player};
use crate::money::Money;
use crate::report::SettlementResult;
use csv::{ReaderBuilder, Trim};
use log::debug;
use serde::Deserialize;
use std::io::{Read, Write};
use std::str::FromStr;

/// Raw session row as read from CSV.
///
/// Every column but `type` and `player` is optional; which ones are required
/// depends on the row type.
#[derive(Debug, Deserialize)]
pub struct SessionRecord {
    /// Row type: player, buyin, cashout
    #[serde(rename = "type")]
    pub kind: String,

    /// Player id the row belongs to
    pub player: String,

    /// Buy-in id (buyin rows)
    pub id: Option<String>,

    /// Amount (buyin and cashout rows)
    pub amount: Option<String>,

    /// Funding source: cash, bank or paybox (buyin rows)
    pub source: Option<String>,

    /// Counted stack, if different from the amount (cashout rows)
    pub stack: Option<String>,

    /// Unix epoch milliseconds (buyin rows)
    pub timestamp: Option<String>,

    /// Display name (player rows)
    pub name: Option<String>,
}

/// A typed session row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEntry {
    Player(Player),
    BuyIn(BuyIn),
    CashOut(CashOut),
}

/// Returns the trimmed field, treating blanks as absent.
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl SessionRecord {
    /// Parses the raw CSV row into a typed entry.
    pub fn parse(&self) -> std::result::Result<SessionEntry, String> {
        let player = self.player.trim();
        if player.is_empty() {
            return Err("missing player id".to_string());
        }

        match self.kind.trim().to_lowercase().as_str() {
            "player" => {
                let name = present(&self.name).unwrap_or(player);
                Ok(SessionEntry::Player(Player::new(player, name)))
            }
            "buyin" => {
                let id = present(&self.id).ok_or("buy-in without id")?;
                let amount = self.parse_money(&self.amount)?.ok_or("buy-in without amount")?;
                let source = present(&self.source)
                    .ok_or("buy-in without funding source")?
                    .parse::<FundingSource>()?;
                let timestamp = match present(&self.timestamp) {
                    Some(ts) => ts
                        .parse::<u64>()
                        .map_err(|e| format!("invalid timestamp {:?}: {}", ts, e))?,
                    None => 0,
                };
                Ok(SessionEntry::BuyIn(
                    BuyIn::new(id, player, amount, source).at(timestamp),
                ))
            }
            "cashout" => {
                let amount = self.parse_money(&self.amount)?.ok_or("cash-out without amount")?;
                let mut cash_out = CashOut::new(player, amount);
                if let Some(stack) = self.parse_money(&self.stack)? {
                    cash_out = cash_out.with_stack(stack);
                }
                Ok(SessionEntry::CashOut(cash_out))
            }
            other => Err(format!("unknown record type {:?}", other)),
        }
    }

    fn parse_money(&self, field: &Option<String>) -> std::result::Result<Option<Money>, String> {
        present(field)
            .map(|s| Money::from_str(s).map_err(|e| e.to_string()))
            .transpose()
    }
}

/// All records for one session at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub players: Vec<Player>,
    pub buy_ins: Vec<BuyIn>,
    pub cash_outs: Vec<CashOut>,
}

impl Session {
    /// Reads a session snapshot from CSV, keeping record order.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut session = Session::default();
        for (row_idx, result) in csv_reader.deserialize::<SessionRecord>().enumerate() {
            let row = row_idx + 2; // 1-indexed, accounting for header row

            let record = result?;
            let entry = record
                .parse()
                .map_err(|message| EngineError::InvalidRecord { row, message })?;
            match entry {
                SessionEntry::Player(player) => session.players.push(player),
                SessionEntry::BuyIn(buy_in) => session.buy_ins.push(buy_in),
                SessionEntry::CashOut(cash_out) => session.cash_outs.push(cash_out),
            }
        }

        debug!(
            "Loaded session: {} player(s), {} buy-in(s), {} cash-out(s)",
            session.players.len(),
            session.buy_ins.len(),
            session.cash_outs.len()
        );
        Ok(session)
    }
}

/// Writes the settlement's transfers to CSV in settlement order.
///
/// Amounts are formatted with exactly two decimals; the bank is written as
/// `Bank`. An incomplete or no-op settlement writes only the header.
pub fn write_settlement<W: Write>(result: &SettlementResult, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(["from", "to", "amount"])?;
    for tx in &result.transactions {
        csv_writer.write_record([
            tx.from.to_string(),
            tx.to.to_string(),
            tx.amount.to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compute_settlement;
    use std::io::Cursor;

    const HEADER: &str = "type,player,id,amount,source,stack,timestamp,name";

    fn load(rows: &str) -> Result<Session> {
        Session::from_csv(Cursor::new(format!("{}\n{}", HEADER, rows)))
    }

    fn record(kind: &str, player: &str) -> SessionRecord {
        SessionRecord {
            kind: kind.to_string(),
            player: player.to_string(),
            id: None,
            amount: None,
            source: None,
            stack: None,
            timestamp: None,
            name: None,
        }
    }

    #[test]
    fn test_parse_buy_in() {
        let mut raw = record("buyin", "1");
        raw.id = Some("b1".to_string());
        raw.amount = Some("100.5".to_string());
        raw.source = Some("PayBox".to_string());
        raw.timestamp = Some("1700000000000".to_string());

        match raw.parse().unwrap() {
            SessionEntry::BuyIn(buy_in) => {
                assert_eq!(buy_in.amount, Money::from_minor(10050));
                assert_eq!(buy_in.source, FundingSource::Bank);
                assert_eq!(buy_in.timestamp, 1_700_000_000_000);
            }
            other => panic!("Expected BuyIn, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_cash_out_with_stack() {
        let mut raw = record("  CashOut ", "1");
        raw.amount = Some("  95 ".to_string());
        raw.stack = Some("100".to_string());

        match raw.parse().unwrap() {
            SessionEntry::CashOut(cash_out) => {
                assert_eq!(cash_out.amount, Money::from_major(95));
                assert_eq!(cash_out.stack_value, Some(Money::from_major(100)));
            }
            other => panic!("Expected CashOut, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_player_defaults_name_to_id() {
        assert_eq!(
            record("player", "7").parse(),
            Ok(SessionEntry::Player(Player::new("7", "7")))
        );
    }

    #[test]
    fn test_parse_rejects_incomplete_rows() {
        assert!(record("buyin", "1").parse().is_err());
        assert!(record("cashout", "1").parse().is_err());
        assert!(record("rebuy", "1").parse().is_err());
        assert!(record("player", " ").parse().is_err());

        let mut raw = record("buyin", "1");
        raw.id = Some("b1".to_string());
        raw.amount = Some("10".to_string());
        raw.source = Some("card".to_string());
        assert!(raw.parse().unwrap_err().contains("card"));
    }

    #[test]
    fn test_from_csv_keeps_record_order() {
        let session = load(
            "player,2,,,,,,Bob\n\
             player,1,,,,,,Alice\n\
             buyin,1,b1,100,cash,,,\n\
             buyin,2,b2,50,bank,,,\n\
             cashout,2,,20,,,,",
        )
        .unwrap();

        let ids: Vec<_> = session.players.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(session.buy_ins.len(), 2);
        assert_eq!(session.cash_outs, vec![CashOut::new("2", Money::from_major(20))]);
    }

    #[test]
    fn test_from_csv_reports_bad_row() {
        let err = load(
            "player,1,,,,,,Alice\n\
             buyin,1,b1,1.005,cash,,,",
        )
        .unwrap_err();

        match err {
            EngineError::InvalidRecord { row, message } => {
                assert_eq!(row, 3);
                assert!(message.contains("decimal places"));
            }
            other => panic!("Expected InvalidRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_write_settlement() {
        let session = load(
            "player,x,,,,,,\n\
             player,y,,,,,,\n\
             buyin,x,1,100,cash,,,\n\
             buyin,y,2,100,cash,,,\n\
             cashout,x,,150,,,,\n\
             cashout,y,,50,,,,",
        )
        .unwrap();
        let result =
            compute_settlement(&session.players, &session.buy_ins, &session.cash_outs).unwrap();

        let mut output = Vec::new();
        write_settlement(&result, &mut output).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "from,to,amount\ny,x,50.00\n");
    }
}
