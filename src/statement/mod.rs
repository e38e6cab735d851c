//! Bank statements settling processed payments.
//!
//! A statement line carries the bank amount. Its move lines split that
//! amount between payments (bank advances and recoveries) and invoices
//! (direct settlement by the party). Posting a line books one move in the
//! statement journal and applies each move line to its payment or invoice.

pub mod post;
pub mod resolve;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::book::PaymentBook;
use crate::config::Extension;
use crate::decimal::Money;
use crate::errors::{ProcessingError, Result};
use crate::ledger::Ledger;
use crate::types::{
    AccountId, InvoiceId, JournalId, MoveId, PartyId, PaymentId, StatementId, StatementJournalId,
    StatementLineId,
};

pub use resolve::{match_payment_amount, PaymentMatch};

/// bank statement journal, ties a cash account to an accounting journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementJournal {
    pub id: StatementJournalId,
    pub name: String,
    pub journal: JournalId,
    pub account: AccountId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementState {
    Draft,
    Confirmed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub id: StatementId,
    pub journal: StatementJournalId,
    pub date: NaiveDate,
    pub state: StatementState,
    pub lines: Vec<StatementLineId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementLineState {
    Draft,
    Confirmed,
    Posted,
}

/// what a statement move line settles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineSource {
    /// bank advance or recovery of a processed payment
    Payment(PaymentId),
    /// direct payment of an invoice, optionally tied to its processing payment
    Invoice {
        invoice: InvoiceId,
        payment: Option<PaymentId>,
    },
}

/// counterpart of part of a statement line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementMoveLine {
    /// signed like the statement line, positive is money received
    pub amount: Money,
    pub account: AccountId,
    pub party: Option<PartyId>,
    pub description: String,
    pub source: LineSource,
}

impl StatementMoveLine {
    pub fn payment(&self) -> Option<PaymentId> {
        match self.source {
            LineSource::Payment(id) => Some(id),
            LineSource::Invoice { payment, .. } => payment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementLine {
    pub id: StatementLineId,
    pub statement: StatementId,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    pub state: StatementLineState,
    pub lines: Vec<StatementMoveLine>,
    pub move_id: Option<MoveId>,
}

impl StatementLine {
    /// amount already split into move lines
    pub fn allocated(&self) -> Money {
        self.lines.iter().map(|line| line.amount).sum()
    }

    /// amount still to split
    pub fn pending(&self) -> Money {
        self.amount - self.allocated()
    }
}

impl<L: Ledger> PaymentBook<L> {
    pub fn add_statement_journal(
        &mut self,
        name: impl Into<String>,
        journal: JournalId,
        account: AccountId,
    ) -> Result<StatementJournalId> {
        self.ledger.journal(journal)?;
        self.ledger.account(account)?;
        let id = Uuid::new_v4();
        self.statement_journals.insert(
            id,
            StatementJournal {
                id,
                name: name.into(),
                journal,
                account,
            },
        );
        Ok(id)
    }

    pub fn statement_journal(&self, id: StatementJournalId) -> Result<&StatementJournal> {
        self.statement_journals
            .get(&id)
            .ok_or(ProcessingError::StatementJournalNotFound { id })
    }

    pub fn create_statement(
        &mut self,
        journal: StatementJournalId,
        date: NaiveDate,
    ) -> Result<StatementId> {
        self.statement_journal(journal)?;
        let id = Uuid::new_v4();
        self.statements.insert(
            id,
            Statement {
                id,
                journal,
                date,
                state: StatementState::Draft,
                lines: Vec::new(),
            },
        );
        Ok(id)
    }

    pub fn statement(&self, id: StatementId) -> Result<&Statement> {
        self.statements
            .get(&id)
            .ok_or(ProcessingError::StatementNotFound { id })
    }

    /// add a bank line to a draft statement
    pub fn add_statement_line(
        &mut self,
        statement: StatementId,
        amount: Money,
        description: impl Into<String>,
    ) -> Result<StatementLineId> {
        let date = {
            let st = self.statement(statement)?;
            if st.state != StatementState::Draft {
                return Err(ProcessingError::InvalidState {
                    current: "confirmed".to_string(),
                    expected: "draft".to_string(),
                });
            }
            st.date
        };
        if amount.is_zero() {
            return Err(ProcessingError::InvalidLine {
                message: "statement line amount cannot be zero".to_string(),
            });
        }

        let id = Uuid::new_v4();
        self.statement_lines.insert(
            id,
            StatementLine {
                id,
                statement,
                date,
                description: description.into(),
                amount: amount.round_currency(self.config.currency_digits),
                state: StatementLineState::Draft,
                lines: Vec::new(),
                move_id: None,
            },
        );
        if let Some(st) = self.statements.get_mut(&statement) {
            st.lines.push(id);
        }
        Ok(id)
    }

    pub fn statement_line(&self, id: StatementLineId) -> Result<&StatementLine> {
        self.statement_lines
            .get(&id)
            .ok_or(ProcessingError::StatementLineNotFound { id })
    }

    /// confirm the statement, its lines become postable
    pub fn confirm_statement(&mut self, id: StatementId) -> Result<()> {
        let st = self
            .statements
            .get_mut(&id)
            .ok_or(ProcessingError::StatementNotFound { id })?;
        if st.state != StatementState::Draft {
            return Err(ProcessingError::InvalidState {
                current: "confirmed".to_string(),
                expected: "draft".to_string(),
            });
        }
        st.state = StatementState::Confirmed;
        for line in &st.lines {
            if let Some(line) = self.statement_lines.get_mut(line) {
                line.state = StatementLineState::Confirmed;
            }
        }
        debug!(statement = %id, "statement confirmed");
        Ok(())
    }

    /// attach a move line to a statement line that is not posted yet
    pub fn add_move_line(&mut self, line: StatementLineId, move_line: StatementMoveLine) -> Result<()> {
        if matches!(move_line.source, LineSource::Payment(_)) {
            self.config.require(Extension::StatementMoveLine)?;
        }
        if move_line.amount.is_zero() {
            return Err(ProcessingError::InvalidLine {
                message: "statement move line amount cannot be zero".to_string(),
            });
        }
        self.ledger.account(move_line.account)?;

        let st_line = self
            .statement_lines
            .get_mut(&line)
            .ok_or(ProcessingError::StatementLineNotFound { id: line })?;
        if st_line.state == StatementLineState::Posted {
            return Err(ProcessingError::InvalidState {
                current: "posted".to_string(),
                expected: "draft or confirmed".to_string(),
            });
        }
        st_line.lines.push(move_line);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModuleConfig;
    use crate::ledger::MemoryLedger;
    use crate::types::AccountKind;
    use chrono::{TimeZone, Utc};
    use hourglass_rs::{SafeTimeProvider, TimeSource};

    fn book() -> (PaymentBook<MemoryLedger>, StatementJournalId, AccountId) {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 4, 2, 0, 0, 0).unwrap(),
        ));
        let mut book = PaymentBook::new(MemoryLedger::new(), ModuleConfig::default(), time).unwrap();
        let journal = book.ledger.add_journal("Bank", "BANK");
        let cash = book.ledger.add_account("Cash", AccountKind::Cash, false, false);
        let other = book.ledger.add_account("Other", AccountKind::Other, false, false);
        let sj = book.add_statement_journal("Test", journal, cash).unwrap();
        (book, sj, other)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 2).unwrap()
    }

    #[test]
    fn test_pending_amount() {
        let (mut book, sj, other) = book();
        let st = book.create_statement(sj, date()).unwrap();
        let line = book.add_statement_line(st, Money::from_major(100), "reception").unwrap();
        book.add_move_line(
            line,
            StatementMoveLine {
                amount: Money::from_major(30),
                account: other,
                party: None,
                description: String::new(),
                source: LineSource::Invoice {
                    invoice: Uuid::new_v4(),
                    payment: None,
                },
            },
        )
        .unwrap();

        let line = book.statement_line(line).unwrap();
        assert_eq!(line.allocated(), Money::from_major(30));
        assert_eq!(line.pending(), Money::from_major(70));
        assert_eq!(line.date, date());
    }

    #[test]
    fn test_confirm_locks_lines() {
        let (mut book, sj, _) = book();
        let st = book.create_statement(sj, date()).unwrap();
        let line = book.add_statement_line(st, Money::from_major(-20), "fee").unwrap();
        book.confirm_statement(st).unwrap();

        assert_eq!(book.statement(st).unwrap().state, StatementState::Confirmed);
        assert_eq!(book.statement_line(line).unwrap().state, StatementLineState::Confirmed);
        assert!(book.add_statement_line(st, Money::from_major(5), "late").is_err());
        assert!(book.confirm_statement(st).is_err());
    }

    #[test]
    fn test_zero_line_rejected() {
        let (mut book, sj, _) = book();
        let st = book.create_statement(sj, date()).unwrap();
        assert!(matches!(
            book.add_statement_line(st, Money::ZERO, "nothing"),
            Err(ProcessingError::InvalidLine { .. })
        ));
    }

    #[test]
    fn test_payment_lines_need_statement_extension() {
        let (mut book, sj, other) = book();
        book.config.statement_payment = false;
        let st = book.create_statement(sj, date()).unwrap();
        let line = book.add_statement_line(st, Money::from_major(10), "advance").unwrap();

        let err = book
            .add_move_line(
                line,
                StatementMoveLine {
                    amount: Money::from_major(10),
                    account: other,
                    party: None,
                    description: String::new(),
                    source: LineSource::Payment(Uuid::new_v4()),
                },
            )
            .unwrap_err();
        assert!(matches!(err, ProcessingError::ExtensionInactive { .. }));
    }
}
