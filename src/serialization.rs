/// serialization support for payments
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::book::PaymentBook;
use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::ledger::Ledger;
use crate::payment::Payment;
use crate::types::{
    AccountId, MoveId, PaymentId, PaymentKind, PaymentState, ProcessMethod,
};

/// serializable view of a payment and its processing moves
#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentView {
    pub id: PaymentId,
    pub kind: PaymentKind,
    pub state: PaymentState,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    pub journal: JournalView,
    pub processing: ProcessingView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JournalView {
    pub name: String,
    pub process_method: ProcessMethod,
    pub clearing_account: Option<AccountId>,
    pub clearing_percent: Rate,
    pub processing_account: Option<AccountId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessingView {
    pub processing_move: Option<MoveId>,
    pub clearing_move: Option<MoveId>,
    pub clearing_amount: Money,
    pub advanced: Money,
    pub outstanding_advance: Money,
}

impl PaymentView {
    pub fn from_payment<L: Ledger>(book: &PaymentBook<L>, payment: &Payment) -> Result<Self> {
        let journal = book.payment_journal(payment.journal)?;
        let clearing_amount = if journal.uses_clearing() {
            journal.clearing_amount(payment.amount, book.config.currency_digits)
        } else {
            Money::ZERO
        };
        let outstanding_advance = if payment.state == PaymentState::Processing {
            (clearing_amount - payment.advanced).max(Money::ZERO)
        } else {
            Money::ZERO
        };

        Ok(PaymentView {
            id: payment.id,
            kind: payment.kind,
            state: payment.state,
            date: payment.date,
            description: payment.description.clone(),
            amount: payment.amount,
            journal: JournalView {
                name: journal.name.clone(),
                process_method: journal.process_method,
                clearing_account: journal.clearing_account,
                clearing_percent: journal.clearing_percent,
                processing_account: journal.processing_account,
            },
            processing: ProcessingView {
                processing_move: payment.processing_move,
                clearing_move: payment.clearing_move,
                clearing_amount,
                advanced: payment.advanced,
                outstanding_advance,
            },
        })
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModuleConfig;
    use crate::journal::PaymentJournalBuilder;
    use crate::ledger::MemoryLedger;
    use crate::types::AccountKind;
    use chrono::{TimeZone, Utc};
    use hourglass_rs::{SafeTimeProvider, TimeSource};
    use rust_decimal_macros::dec;

    #[test]
    fn test_payment_view_json() {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap(),
        ));
        let mut book = PaymentBook::new(MemoryLedger::new(), ModuleConfig::default(), time).unwrap();
        let journal = book.ledger.add_journal("Revenue", "REV");
        let clearing = book.ledger.add_account("Bank Discount", AccountKind::Other, true, false);
        let pj = PaymentJournalBuilder::new("Manual receivable 80% discount")
            .clearing(clearing, journal)
            .clearing_percent(Rate::from_decimal(dec!(0.8)))
            .build()
            .unwrap();
        let pj = book.add_payment_journal(pj).unwrap();
        let payment = Payment::new(
            pj,
            PaymentKind::Receivable,
            uuid::Uuid::new_v4(),
            Money::from_major(200),
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        )
        .unwrap();

        let view = PaymentView::from_payment(&book, &payment).unwrap();
        assert_eq!(view.processing.clearing_amount, Money::from_major(160));
        assert_eq!(view.processing.outstanding_advance, Money::ZERO);

        let json = view.to_json_pretty().unwrap();
        assert!(json.contains("\"state\": \"draft\""));
        assert!(json.contains("Manual receivable 80% discount"));
        let back: PaymentView = serde_json::from_str(&json).unwrap();
        assert_eq!(back.amount, Money::from_major(200));
    }
}
