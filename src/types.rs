use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub type AccountId = Uuid;
pub type JournalId = Uuid;
pub type MoveId = Uuid;
pub type MoveLineId = Uuid;
pub type ReconciliationId = Uuid;
pub type PartyId = Uuid;
pub type PaymentId = Uuid;
pub type PaymentJournalId = Uuid;
pub type InvoiceId = Uuid;
pub type StatementId = Uuid;
pub type StatementLineId = Uuid;
pub type StatementJournalId = Uuid;

/// direction of a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentKind {
    /// money received from a customer
    Receivable,
    /// money paid to a supplier
    Payable,
}

impl PaymentKind {
    /// sign applied to amounts so that a receivable advance is positive
    pub fn direction(&self) -> i64 {
        match self {
            PaymentKind::Receivable => 1,
            PaymentKind::Payable => -1,
        }
    }
}

/// payment workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    /// editable, not yet submitted
    Draft,
    /// waiting for approval or processing
    Submitted,
    /// approved, ready for processing
    Approved,
    /// sent through the journal's process method, awaiting confirmation
    Processing,
    /// confirmed
    Succeeded,
    /// rejected or reverted by the bank
    Failed,
}

impl PaymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::Draft => "draft",
            PaymentState::Submitted => "submitted",
            PaymentState::Approved => "approved",
            PaymentState::Processing => "processing",
            PaymentState::Succeeded => "succeeded",
            PaymentState::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(PaymentState::Draft),
            "submitted" => Some(PaymentState::Submitted),
            "approved" => Some(PaymentState::Approved),
            "processing" => Some(PaymentState::Processing),
            "succeeded" => Some(PaymentState::Succeeded),
            "failed" => Some(PaymentState::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// how a payment journal processes its payments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProcessMethod {
    /// processed by hand, processing and clearing are optional
    #[default]
    Manual,
    /// routed through a bank discount, processing and clearing are required
    BankDiscount,
}

/// account nature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Receivable,
    Payable,
    Cash,
    Revenue,
    Expense,
    Other,
}

/// accounting move state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveState {
    Draft,
    Posted,
}

/// a third party (customer or supplier)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: PartyId,
    pub name: String,
}

impl Party {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}
