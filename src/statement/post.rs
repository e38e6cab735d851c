use std::collections::HashSet;

use tracing::{info, warn};

use crate::book::PaymentBook;
use crate::config::Extension;
use crate::decimal::Money;
use crate::errors::{ProcessingError, Result};
use crate::events::Event;
use crate::ledger::{Ledger, LineInput, MoveInput, MoveOrigin};
use crate::payment::PaymentAction;
use crate::statement::{LineSource, PaymentMatch, StatementLineState};
use crate::types::{InvoiceId, MoveId, MoveLineId, PaymentId, PaymentState, StatementLineId};

/// what posting does for one move line, decided before any write
enum Plan {
    Advance(PaymentId, Money),
    Recovery(PaymentId, Money),
    Invoice {
        invoice: InvoiceId,
        payments: Vec<PaymentId>,
    },
}

impl Plan {
    fn payments(&self) -> Vec<PaymentId> {
        match self {
            Plan::Advance(payment, _) | Plan::Recovery(payment, _) => vec![*payment],
            Plan::Invoice { payments, .. } => payments.clone(),
        }
    }
}

impl<L: Ledger> PaymentBook<L> {
    /// post a confirmed statement line
    ///
    /// Every move line is checked first, then a single move is booked in
    /// the statement journal and each move line is applied to its payment
    /// or invoice.
    pub fn post_statement_line(&mut self, id: StatementLineId) -> Result<MoveId> {
        let line = self.statement_line(id)?;
        match line.state {
            StatementLineState::Confirmed => {}
            StatementLineState::Draft => {
                return Err(ProcessingError::InvalidState {
                    current: "draft".to_string(),
                    expected: "confirmed".to_string(),
                })
            }
            StatementLineState::Posted => {
                return Err(ProcessingError::InvalidState {
                    current: "posted".to_string(),
                    expected: "confirmed".to_string(),
                })
            }
        }
        if line.lines.is_empty() {
            return Err(ProcessingError::InvalidLine {
                message: format!("statement line {} has no move lines", id),
            });
        }
        if line.allocated() != line.amount {
            return Err(ProcessingError::UnbalancedStatementLine {
                line: id,
                amount: line.amount,
                allocated: line.allocated(),
            });
        }

        let plans = line
            .lines
            .iter()
            .map(|ml| self.plan(ml.source, ml.amount))
            .collect::<Result<Vec<_>>>()?;

        // a payment moves at most once per statement line
        let mut seen = HashSet::new();
        for payment in plans.iter().flat_map(Plan::payments) {
            if !seen.insert(payment) {
                return Err(ProcessingError::InvalidLine {
                    message: format!("payment {} appears twice on statement line {}", payment, id),
                });
            }
        }

        let statement = self.statement(line.statement)?;
        let journal = self.statement_journal(statement.journal)?;
        let mut lines = vec![LineInput::signed(journal.account, line.amount)];
        lines.extend(line.lines.iter().map(|ml| {
            LineInput::signed(ml.account, -ml.amount)
                .with_party(ml.party)
                .with_description(ml.description.clone())
        }));
        let input = MoveInput {
            journal: journal.journal,
            date: line.date,
            description: line.description.clone(),
            origin: MoveOrigin::StatementLine(id),
            lines,
        };
        let amount = line.amount;

        let move_id = self.ledger.create_posted_move(input)?;
        let counterparts: Vec<MoveLineId> =
            self.ledger.get_move(move_id)?.lines.iter().skip(1).copied().collect();

        for (plan, counterpart) in plans.into_iter().zip(counterparts) {
            match plan {
                Plan::Advance(payment, advance) => {
                    self.payment_mut(payment)?.advanced += advance;
                    self.events.emit(Event::BankAdvanceReceived {
                        payment_id: payment,
                        line_id: id,
                        amount: advance,
                    });
                }
                Plan::Recovery(payment, recovered) => {
                    self.fail(payment)?;
                    self.payment_mut(payment)?.advanced = Money::ZERO;
                    self.events.emit(Event::BankAdvanceRecovered {
                        payment_id: payment,
                        line_id: id,
                        amount: recovered,
                    });
                }
                Plan::Invoice { invoice, payments } => {
                    self.settle_invoice(invoice, &payments, counterpart)?;
                }
            }
        }

        if let Some(line) = self.statement_lines.get_mut(&id) {
            line.state = StatementLineState::Posted;
            line.move_id = Some(move_id);
        }
        info!(line = %id, move_id = %move_id, %amount, "statement line posted");
        self.events.emit(Event::StatementLinePosted {
            line_id: id,
            move_id,
            amount,
        });
        Ok(move_id)
    }

    fn plan(&self, source: LineSource, amount: Money) -> Result<Plan> {
        match source {
            LineSource::Payment(payment) => {
                self.config.require(Extension::StatementMoveLine)?;
                match self.match_payment(payment, amount)? {
                    PaymentMatch::Advance(advance) => Ok(Plan::Advance(payment, advance)),
                    PaymentMatch::Recovery(recovered) => Ok(Plan::Recovery(payment, recovered)),
                }
            }
            LineSource::Invoice { invoice, payment } => {
                let line = self.invoice(invoice)?.line;
                let candidates = match payment {
                    Some(payment) => vec![payment],
                    None => self.payments_for_line(line, PaymentState::Processing),
                };
                let mut payments = Vec::new();
                for id in candidates {
                    let record = self.payment(id)?;
                    if record.line != Some(line) {
                        return Err(ProcessingError::InvalidLine {
                            message: format!("payment {} does not pay invoice {}", id, invoice),
                        });
                    }
                    if record.state != PaymentState::Processing {
                        continue;
                    }
                    let journal = self.payment_journal(record.journal)?;
                    if !record.advanced.is_zero()
                        && record.clearing_move.is_none()
                        && !journal.uses_clearing()
                    {
                        return Err(ProcessingError::MissingClearingAccount {
                            journal: journal.id,
                        });
                    }
                    payments.push(id);
                }
                Ok(Plan::Invoice { invoice, payments })
            }
        }
    }

    /// settle the processing payments of an invoice paid on the statement,
    /// then reconcile the statement counterpart
    fn settle_invoice(
        &mut self,
        invoice: InvoiceId,
        payments: &[PaymentId],
        counterpart: MoveLineId,
    ) -> Result<()> {
        let mut remainders = Vec::new();
        for &payment in payments {
            if self.payment(payment)?.advanced.is_zero() {
                // paid directly, nothing was advanced
                let processing = self.payment(payment)?.processing_move;
                if let Some(move_id) = processing {
                    self.cancel_payment_move(payment, move_id)?;
                    self.payment_mut(payment)?.processing_move = None;
                }
                let next = self.payment(payment)?.transition(PaymentAction::Succeed)?;
                self.set_state(payment, next, PaymentAction::Succeed)?;
            } else if let Some(remainder) = self.succeed_payment(payment)? {
                remainders.push(remainder);
            }
        }

        let invoice_line = self.invoice(invoice)?.line;
        if self.try_reconcile(&[counterpart, invoice_line])? {
            return Ok(());
        }
        for remainder in remainders {
            if self.try_reconcile(&[counterpart, remainder])? {
                return Ok(());
            }
        }
        warn!(%invoice, line = %counterpart, "statement counterpart left unreconciled");
        Ok(())
    }
}
