use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{AccountId, InvoiceId, JournalId, MoveId, MoveLineId, PartyId, PaymentKind};

/// posted invoice, reduced to what payments need from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub kind: PaymentKind,
    pub party: PartyId,
    /// receivable or payable account
    pub account: AccountId,
    pub move_id: MoveId,
    /// the receivable or payable line
    pub line: MoveLineId,
    pub total: Money,
    pub description: String,
}

/// invoice state as derived from its line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceState {
    Posted,
    Paid,
}

/// data needed to post an invoice
#[derive(Debug, Clone)]
pub struct InvoiceInput {
    pub kind: PaymentKind,
    pub party: PartyId,
    pub account: AccountId,
    /// revenue or expense account
    pub counterpart: AccountId,
    pub journal: JournalId,
    pub total: Money,
    pub date: NaiveDate,
    pub description: String,
}

impl InvoiceInput {
    /// customer invoice
    pub fn customer(
        party: PartyId,
        receivable: AccountId,
        revenue: AccountId,
        journal: JournalId,
        total: Money,
        date: NaiveDate,
    ) -> Self {
        Self {
            kind: PaymentKind::Receivable,
            party,
            account: receivable,
            counterpart: revenue,
            journal,
            total,
            date,
            description: String::new(),
        }
    }

    /// supplier invoice
    pub fn supplier(
        party: PartyId,
        payable: AccountId,
        expense: AccountId,
        journal: JournalId,
        total: Money,
        date: NaiveDate,
    ) -> Self {
        Self {
            kind: PaymentKind::Payable,
            ..Self::customer(party, payable, expense, journal, total, date)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
