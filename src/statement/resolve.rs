//! Filling statement move lines from a payment or an invoice.
//!
//! Amounts against a payment are matched exactly. After normalising by the
//! payment direction, a positive amount is the bank advance and must equal
//! the clearing amount not yet advanced. A negative amount is the bank
//! taking the advance back and must equal what was cleared.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::book::PaymentBook;
use crate::config::Extension;
use crate::decimal::Money;
use crate::errors::{ProcessingError, Result};
use crate::ledger::Ledger;
use crate::payment::{Payment, PaymentAction};
use crate::statement::{LineSource, StatementMoveLine};
use crate::types::{InvoiceId, PaymentId, PaymentState, StatementLineId};

/// effect of a statement amount on a payment, amounts in payment direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMatch {
    /// the bank advanced part of the payment
    Advance(Money),
    /// the bank took back what it advanced, the payment fails
    Recovery(Money),
}

/// classify `amount` against a payment whose full clearing amount is
/// `clearing_amount`
pub fn match_payment_amount(
    payment: &Payment,
    clearing_amount: Money,
    amount: Money,
) -> Result<PaymentMatch> {
    let normalized = payment.signed(amount);

    if normalized.is_positive() {
        let outstanding = if payment.state == PaymentState::Processing {
            clearing_amount - payment.advanced
        } else {
            Money::ZERO
        };
        if outstanding.is_positive() && normalized == outstanding {
            return Ok(PaymentMatch::Advance(normalized));
        }
        return Err(ProcessingError::AmountMismatch {
            payment: payment.id,
            amount,
            expected: payment.signed(outstanding),
        });
    }

    let cleared = if !payment.advanced.is_zero() {
        payment.advanced
    } else if payment.clearing_move.is_some() {
        clearing_amount
    } else {
        Money::ZERO
    };
    let can_fail = payment.transition(PaymentAction::Fail).is_ok();
    if can_fail && cleared.is_positive() && -normalized == cleared {
        return Ok(PaymentMatch::Recovery(cleared));
    }
    Err(ProcessingError::AmountMismatch {
        payment: payment.id,
        amount,
        expected: payment.signed(-cleared),
    })
}

impl<L: Ledger> PaymentBook<L> {
    /// match a statement amount against a payment
    pub fn match_payment(&self, id: PaymentId, amount: Money) -> Result<PaymentMatch> {
        let payment = self.payment(id)?;
        let journal = self.payment_journal(payment.journal)?;
        let clearing_amount = journal.clearing_amount(payment.amount, self.config.currency_digits);
        let matched = match_payment_amount(payment, clearing_amount, amount);
        debug!(payment = %id, %amount, %clearing_amount, advanced = %payment.advanced, ?matched, "statement amount matched");
        matched
    }

    /// move line booking a bank advance or recovery of `payment` on the
    /// clearing account, for `amount` or the pending amount of the line
    pub fn resolve_payment_line(
        &self,
        line: StatementLineId,
        payment: PaymentId,
        amount: Option<Money>,
    ) -> Result<StatementMoveLine> {
        self.config.require(Extension::StatementMoveLine)?;
        let st_line = self.statement_line(line)?;
        let amount = amount.unwrap_or_else(|| st_line.pending());
        let record = self.payment(payment)?;
        let (account, _) = self.payment_journal(record.journal)?.clearing()?;
        self.match_payment(payment, amount)?;

        Ok(StatementMoveLine {
            amount,
            account,
            party: Some(record.party),
            description: st_line.description.clone(),
            source: LineSource::Payment(payment),
        })
    }

    /// move line settling `invoice` directly, tied to its processing payment
    /// when there is one
    pub fn resolve_invoice_line(
        &self,
        line: StatementLineId,
        invoice: InvoiceId,
        amount: Option<Money>,
    ) -> Result<StatementMoveLine> {
        let st_line = self.statement_line(line)?;
        let amount = amount.unwrap_or_else(|| st_line.pending());
        let record = self.invoice(invoice)?;
        let payment = self.processing_payment_for(invoice)?;

        Ok(StatementMoveLine {
            amount,
            account: record.account,
            party: Some(record.party),
            description: st_line.description.clone(),
            source: LineSource::Invoice { invoice, payment },
        })
    }

    /// the processing payment of an invoice line, none when there is none
    pub fn processing_payment_for(&self, invoice: InvoiceId) -> Result<Option<PaymentId>> {
        let line = self.invoice(invoice)?.line;
        let payments = self.payments_for_line(line, PaymentState::Processing);
        match payments.as_slice() {
            [] => Ok(None),
            [payment] => Ok(Some(*payment)),
            _ => Err(ProcessingError::AmbiguousPayment {
                invoice,
                count: payments.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentKind;
    use chrono::NaiveDate;
    use rstest::rstest;
    use uuid::Uuid;

    fn payment(kind: PaymentKind, state: PaymentState, advanced: i64) -> Payment {
        let mut payment = Payment::new(
            Uuid::new_v4(),
            kind,
            Uuid::new_v4(),
            Money::from_major(200),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .unwrap();
        payment.state = state;
        payment.advanced = Money::from_major(advanced);
        payment
    }

    #[rstest]
    #[case(PaymentKind::Receivable, 160, PaymentMatch::Advance(Money::from_major(160)))]
    #[case(PaymentKind::Payable, -160, PaymentMatch::Advance(Money::from_major(160)))]
    fn test_advance(#[case] kind: PaymentKind, #[case] amount: i64, #[case] expected: PaymentMatch) {
        let p = payment(kind, PaymentState::Processing, 0);
        let result = match_payment_amount(&p, Money::from_major(160), Money::from_major(amount));
        assert_eq!(result.unwrap(), expected);
    }

    #[test]
    fn test_advance_must_match_outstanding() {
        let p = payment(PaymentKind::Receivable, PaymentState::Processing, 0);
        let err = match_payment_amount(&p, Money::from_major(160), Money::from_major(80)).unwrap_err();
        match err {
            ProcessingError::AmountMismatch { expected, .. } => {
                assert_eq!(expected, Money::from_major(160))
            }
            other => panic!("unexpected error {other}"),
        }

        // already advanced in full
        let p = payment(PaymentKind::Receivable, PaymentState::Processing, 160);
        assert!(match_payment_amount(&p, Money::from_major(160), Money::from_major(160)).is_err());
    }

    #[test]
    fn test_advance_requires_processing() {
        let p = payment(PaymentKind::Receivable, PaymentState::Succeeded, 0);
        let err = match_payment_amount(&p, Money::from_major(200), Money::from_major(200)).unwrap_err();
        assert!(err.is_reconciliation_error());
    }

    #[test]
    fn test_recovery_of_advance() {
        let p = payment(PaymentKind::Receivable, PaymentState::Processing, 80);
        let result = match_payment_amount(&p, Money::from_major(80), Money::from_major(-80));
        assert_eq!(result.unwrap(), PaymentMatch::Recovery(Money::from_major(80)));
    }

    #[test]
    fn test_recovery_of_clearing_move() {
        let mut p = payment(PaymentKind::Receivable, PaymentState::Succeeded, 0);
        p.clearing_move = Some(Uuid::new_v4());
        let result = match_payment_amount(&p, Money::from_major(200), Money::from_major(-200));
        assert_eq!(result.unwrap(), PaymentMatch::Recovery(Money::from_major(200)));
    }

    #[test]
    fn test_recovery_without_anything_cleared() {
        let p = payment(PaymentKind::Receivable, PaymentState::Processing, 0);
        let err = match_payment_amount(&p, Money::from_major(200), Money::from_major(-200)).unwrap_err();
        assert!(matches!(err, ProcessingError::AmountMismatch { .. }));

        let p = payment(PaymentKind::Receivable, PaymentState::Failed, 200);
        assert!(match_payment_amount(&p, Money::from_major(200), Money::from_major(-200)).is_err());
    }
}
