pub mod memory;
pub mod reversal;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::Result;
use crate::types::{
    AccountId, AccountKind, InvoiceId, JournalId, MoveId, MoveLineId, MoveState, PartyId,
    PaymentId, ReconciliationId, StatementLineId,
};

pub use memory::MemoryLedger;
pub use reversal::{cancel_move, reversing_lines};

/// general ledger account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub kind: AccountKind,
    pub reconcile: bool,
    pub party_required: bool,
}

/// accounting journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journal {
    pub id: JournalId,
    pub name: String,
    pub code: String,
}

/// what produced a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOrigin {
    None,
    Payment(PaymentId),
    StatementLine(StatementLineId),
    Invoice(InvoiceId),
    Reversal(MoveId),
}

/// accounting move
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub id: MoveId,
    pub journal: JournalId,
    pub date: NaiveDate,
    pub description: String,
    pub origin: MoveOrigin,
    pub state: MoveState,
    /// line ids in creation order
    pub lines: Vec<MoveLineId>,
}

/// accounting move line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveLine {
    pub id: MoveLineId,
    pub move_id: MoveId,
    pub account: AccountId,
    pub party: Option<PartyId>,
    pub debit: Money,
    pub credit: Money,
    pub description: String,
    pub reconciliation: Option<ReconciliationId>,
}

impl MoveLine {
    /// signed amount, debit positive
    pub fn amount(&self) -> Money {
        self.debit - self.credit
    }

    pub fn is_reconciled(&self) -> bool {
        self.reconciliation.is_some()
    }
}

/// line to create in a new move
#[derive(Debug, Clone, PartialEq)]
pub struct LineInput {
    pub account: AccountId,
    pub party: Option<PartyId>,
    pub debit: Money,
    pub credit: Money,
    pub description: String,
}

impl LineInput {
    pub fn debit(account: AccountId, amount: Money) -> Self {
        Self {
            account,
            party: None,
            debit: amount,
            credit: Money::ZERO,
            description: String::new(),
        }
    }

    pub fn credit(account: AccountId, amount: Money) -> Self {
        Self {
            account,
            party: None,
            debit: Money::ZERO,
            credit: amount,
            description: String::new(),
        }
    }

    /// debit when positive, credit when negative
    pub fn signed(account: AccountId, amount: Money) -> Self {
        let (debit, credit) = amount.as_debit_credit();
        Self {
            account,
            party: None,
            debit,
            credit,
            description: String::new(),
        }
    }

    pub fn with_party(mut self, party: Option<PartyId>) -> Self {
        self.party = party;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn amount(&self) -> Money {
        self.debit - self.credit
    }
}

/// new move request
#[derive(Debug, Clone, PartialEq)]
pub struct MoveInput {
    pub journal: JournalId,
    pub date: NaiveDate,
    pub description: String,
    pub origin: MoveOrigin,
    pub lines: Vec<LineInput>,
}

/// host accounting engine
///
/// Moves, lines and reconciliations belong to the host. This crate only
/// creates, posts, cancels and reconciles them through this trait.
pub trait Ledger {
    fn account(&self, id: AccountId) -> Result<&Account>;

    fn journal(&self, id: JournalId) -> Result<&Journal>;

    /// validate and store a draft move
    fn create_move(&mut self, input: MoveInput) -> Result<MoveId>;

    fn post_move(&mut self, id: MoveId) -> Result<()>;

    /// remove a draft move whose lines are not reconciled
    fn delete_move(&mut self, id: MoveId) -> Result<()>;

    fn get_move(&self, id: MoveId) -> Result<&Move>;

    fn line(&self, id: MoveLineId) -> Result<&MoveLine>;

    /// reconcile lines of one account that sum to zero
    fn reconcile(&mut self, lines: &[MoveLineId]) -> Result<ReconciliationId>;

    /// undo a reconciliation, returning the released lines
    fn unreconcile(&mut self, id: ReconciliationId) -> Result<Vec<MoveLineId>>;

    /// debit minus credit over every line of the account
    fn balance(&self, account: AccountId) -> Money;

    /// lines of a move, in creation order
    fn move_lines(&self, id: MoveId) -> Result<Vec<&MoveLine>> {
        let mv = self.get_move(id)?;
        mv.lines.iter().map(|line_id| self.line(*line_id)).collect()
    }

    /// create then post
    fn create_posted_move(&mut self, input: MoveInput) -> Result<MoveId> {
        let id = self.create_move(input)?;
        self.post_move(id)?;
        Ok(id)
    }
}
