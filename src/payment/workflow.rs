//! Payment actions on the book.
//!
//! Every action checks its transition before touching the ledger, so a
//! rejected action leaves moves and reconciliations as they were.

use tracing::{debug, info};

use crate::book::PaymentBook;
use crate::errors::{ProcessingError, Result};
use crate::events::Event;
use crate::ledger::{cancel_move, Ledger};
use crate::payment::moves::{clearing_move, processing_move, ClearingSplit};
use crate::payment::{Payment, PaymentAction};
use crate::types::{AccountId, MoveId, MoveLineId, PaymentId, PaymentState};

impl<L: Ledger> PaymentBook<L> {
    pub fn submit(&mut self, id: PaymentId) -> Result<()> {
        let next = self.payment(id)?.transition(PaymentAction::Submit)?;
        self.set_state(id, next, PaymentAction::Submit)
    }

    pub fn approve(&mut self, id: PaymentId) -> Result<()> {
        let next = self.payment(id)?.transition(PaymentAction::Approve)?;
        self.ensure_unsettled(id)?;
        self.set_state(id, next, PaymentAction::Approve)
    }

    /// move the payment into processing, booking the processing move when
    /// the journal has a processing account
    pub fn process(&mut self, id: PaymentId) -> Result<()> {
        let payment = self.payment(id)?;
        let next = payment.transition(PaymentAction::Process)?;
        if self.config.approval_required && payment.state != PaymentState::Approved {
            return Err(ProcessingError::ApprovalRequired { payment: id });
        }

        let journal = self.payment_journal(payment.journal)?;
        if journal.uses_processing() && payment.processing_move.is_none() {
            let (processing_account, processing_journal) = journal.processing()?;
            let paid_account = self.paid_account(payment)?;
            let input = processing_move(
                payment,
                paid_account,
                processing_account,
                processing_journal,
                self.today(),
            );
            let paid_line = payment.line;
            let amount = payment.amount;

            let move_id = self.ledger.create_posted_move(input)?;
            if let Some(paid_line) = paid_line {
                let credit_line = self.ledger.get_move(move_id)?.lines[0];
                if !self.try_reconcile(&[paid_line, credit_line])? {
                    debug!(payment = %id, "processing move left open against the paid line");
                }
            }
            self.payment_mut(id)?.processing_move = Some(move_id);
            self.events.emit(Event::ProcessingMoveCreated {
                payment_id: id,
                move_id,
                amount,
            });
        }

        self.set_state(id, next, PaymentAction::Process)
    }

    /// settle a processing payment, booking the clearing move when the
    /// journal has a clearing account
    pub fn succeed(&mut self, id: PaymentId) -> Result<()> {
        self.succeed_payment(id).map(|_| ())
    }

    /// returns the remainder line of the clearing move, if any
    pub(crate) fn succeed_payment(&mut self, id: PaymentId) -> Result<Option<MoveLineId>> {
        let payment = self.payment(id)?;
        let next = payment.transition(PaymentAction::Succeed)?;
        let mut remainder_line = None;

        if payment.clearing_move.is_none() {
            let journal = self.payment_journal(payment.journal)?;
            if journal.uses_clearing() {
                let (clearing_account, clearing_journal) = journal.clearing()?;
                let paid_account = self.paid_account(payment)?;
                let processing_line = self.processing_line(payment)?;
                let counterpart = match processing_line {
                    Some(line) => self.ledger.line(line)?.account,
                    None => paid_account,
                };
                let split = ClearingSplit::new(
                    payment.amount,
                    journal.clearing_amount(payment.amount, self.config.currency_digits),
                );
                let input = clearing_move(
                    payment,
                    counterpart,
                    clearing_account,
                    paid_account,
                    split,
                    clearing_journal,
                    self.today(),
                );

                let move_id = self.ledger.create_posted_move(input)?;
                let lines = self.ledger.get_move(move_id)?.lines.clone();
                if let Some(processing_line) = processing_line {
                    self.try_reconcile(&[processing_line, lines[0]])?;
                }
                if !split.remainder.is_zero() {
                    remainder_line = lines.last().copied();
                }

                self.payment_mut(id)?.clearing_move = Some(move_id);
                self.events.emit(Event::ClearingMoveCreated {
                    payment_id: id,
                    move_id,
                    clearing_amount: split.clearing,
                    remainder: split.remainder,
                });
            } else if payment.processing_move.is_some() {
                return Err(ProcessingError::MissingClearingAccount {
                    journal: journal.id,
                });
            }
        }

        self.set_state(id, next, PaymentAction::Succeed)?;
        Ok(remainder_line)
    }

    /// undo the clearing and processing moves of the payment
    pub fn fail(&mut self, id: PaymentId) -> Result<()> {
        let payment = self.payment(id)?;
        let next = payment.transition(PaymentAction::Fail)?;
        let clearing = payment.clearing_move;
        let processing = payment.processing_move;

        if let Some(move_id) = clearing {
            self.cancel_payment_move(id, move_id)?;
            self.payment_mut(id)?.clearing_move = None;
        }
        if let Some(move_id) = processing {
            self.cancel_payment_move(id, move_id)?;
            self.payment_mut(id)?.processing_move = None;
        }

        self.set_state(id, next, PaymentAction::Fail)
    }

    /// return the payment to draft
    pub fn cancel(&mut self, id: PaymentId) -> Result<()> {
        let next = self.payment(id)?.transition(PaymentAction::Cancel)?;
        self.ensure_unsettled(id)?;

        let processing = self.payment(id)?.processing_move;
        if let Some(move_id) = processing {
            self.cancel_payment_move(id, move_id)?;
            self.payment_mut(id)?.processing_move = None;
        }

        self.set_state(id, next, PaymentAction::Cancel)
    }

    /// reject when the clearing side has started
    pub(crate) fn ensure_unsettled(&self, id: PaymentId) -> Result<()> {
        let payment = self.payment(id)?;
        let mut settled = payment.clearing_move.is_some() || !payment.advanced.is_zero();
        if let Some(line) = self.processing_line(payment)? {
            settled |= self.ledger.line(line)?.is_reconciled();
        }
        if settled {
            return Err(ProcessingError::MovesSettled { payment: id });
        }
        Ok(())
    }

    pub(crate) fn set_state(
        &mut self,
        id: PaymentId,
        next: PaymentState,
        action: PaymentAction,
    ) -> Result<()> {
        let date = self.today();
        let payment = self.payment_mut(id)?;
        let old = payment.state;
        payment.state = next;

        info!(payment = %id, from = %old, to = %next, %action, "payment state changed");
        self.events.emit(Event::PaymentStateChanged {
            payment_id: id,
            old_state: old,
            new_state: next,
            action: action.to_string(),
            date,
        });
        Ok(())
    }

    /// cancel one move of the payment and record it
    pub(crate) fn cancel_payment_move(&mut self, id: PaymentId, move_id: MoveId) -> Result<()> {
        let date = self.today();
        let reversal = cancel_move(&mut self.ledger, move_id, date)?;
        self.events.emit(Event::MoveCancelled {
            payment_id: id,
            move_id,
            reversal,
        });
        Ok(())
    }

    /// account of the move line being paid
    pub(crate) fn paid_account(&self, payment: &Payment) -> Result<AccountId> {
        let line = payment.line.ok_or_else(|| ProcessingError::InvalidLine {
            message: format!("payment {} has no move line", payment.id),
        })?;
        Ok(self.ledger.line(line)?.account)
    }

    /// line of the processing move booked on the processing account
    pub(crate) fn processing_line(&self, payment: &Payment) -> Result<Option<MoveLineId>> {
        let Some(move_id) = payment.processing_move else {
            return Ok(None);
        };
        let account = self.payment_journal(payment.journal)?.processing_account;
        let line = self
            .ledger
            .move_lines(move_id)?
            .into_iter()
            .find(|line| Some(line.account) == account)
            .map(|line| line.id);
        Ok(line)
    }
}
