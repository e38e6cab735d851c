use std::collections::HashMap;

use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::ModuleConfig;
use crate::decimal::Money;
use crate::errors::{ProcessingError, Result};
use crate::events::EventStore;
use crate::invoice::{Invoice, InvoiceInput, InvoiceState};
use crate::journal::PaymentJournal;
use crate::ledger::{Ledger, LineInput, MoveInput, MoveOrigin};
use crate::payment::Payment;
use crate::statement::{Statement, StatementJournal, StatementLine};
use crate::types::{
    AccountId, InvoiceId, MoveLineId, PaymentId, PaymentJournalId, PaymentKind, PaymentState,
    StatementId, StatementJournalId, StatementLineId,
};

/// payments, their journals and the statements settling them, on top of a
/// host ledger
pub struct PaymentBook<L: Ledger> {
    pub config: ModuleConfig,
    pub ledger: L,
    pub events: EventStore,
    time: SafeTimeProvider,
    pub(crate) journals: HashMap<PaymentJournalId, PaymentJournal>,
    pub(crate) payments: HashMap<PaymentId, Payment>,
    pub(crate) invoices: HashMap<InvoiceId, Invoice>,
    pub(crate) statement_journals: HashMap<StatementJournalId, StatementJournal>,
    pub(crate) statements: HashMap<StatementId, Statement>,
    pub(crate) statement_lines: HashMap<StatementLineId, StatementLine>,
}

impl<L: Ledger> PaymentBook<L> {
    /// create a book over `ledger`
    pub fn new(ledger: L, config: ModuleConfig, time: SafeTimeProvider) -> Result<Self> {
        config.validate()?;
        info!(
            extensions = ?config.extensions(),
            currency_digits = config.currency_digits,
            "payment processing book initialised"
        );
        Ok(Self {
            config,
            ledger,
            events: EventStore::new(),
            time,
            journals: HashMap::new(),
            payments: HashMap::new(),
            invoices: HashMap::new(),
            statement_journals: HashMap::new(),
            statements: HashMap::new(),
            statement_lines: HashMap::new(),
        })
    }

    pub fn time(&self) -> &SafeTimeProvider {
        &self.time
    }

    /// current date of the book clock
    pub fn today(&self) -> NaiveDate {
        self.time.now().date_naive()
    }

    /// register a payment journal after checking its accounts and journals
    pub fn add_payment_journal(&mut self, journal: PaymentJournal) -> Result<PaymentJournalId> {
        journal.validate()?;
        for account in [journal.clearing_account, journal.processing_account]
            .into_iter()
            .flatten()
        {
            let account = self.ledger.account(account)?;
            if !account.reconcile {
                return Err(ProcessingError::NotReconcilable { account: account.id });
            }
        }
        for id in [journal.clearing_journal, journal.processing_journal]
            .into_iter()
            .flatten()
        {
            self.ledger.journal(id)?;
        }

        let id = journal.id;
        debug!(journal = %journal.name, method = ?journal.process_method, "payment journal added");
        self.journals.insert(id, journal);
        Ok(id)
    }

    pub fn payment_journal(&self, id: PaymentJournalId) -> Result<&PaymentJournal> {
        self.journals
            .get(&id)
            .ok_or(ProcessingError::PaymentJournalNotFound { id })
    }

    pub fn payment(&self, id: PaymentId) -> Result<&Payment> {
        self.payments
            .get(&id)
            .ok_or(ProcessingError::PaymentNotFound { id })
    }

    pub(crate) fn payment_mut(&mut self, id: PaymentId) -> Result<&mut Payment> {
        self.payments
            .get_mut(&id)
            .ok_or(ProcessingError::PaymentNotFound { id })
    }

    pub fn payments(&self) -> impl Iterator<Item = &Payment> {
        self.payments.values()
    }

    /// payments of a move line in a given state
    pub fn payments_for_line(&self, line: MoveLineId, state: PaymentState) -> Vec<PaymentId> {
        let mut ids: Vec<PaymentId> = self
            .payments
            .values()
            .filter(|p| p.line == Some(line) && p.state == state)
            .map(|p| p.id)
            .collect();
        ids.sort();
        ids
    }

    /// post an invoice move and register the invoice
    pub fn post_invoice(&mut self, input: InvoiceInput) -> Result<InvoiceId> {
        if !input.total.is_positive() {
            return Err(ProcessingError::InvalidLine {
                message: format!("invoice total must be positive, got {}", input.total),
            });
        }
        let id = Uuid::new_v4();
        let signed = match input.kind {
            PaymentKind::Receivable => input.total,
            PaymentKind::Payable => -input.total,
        };
        let move_id = self.ledger.create_posted_move(MoveInput {
            journal: input.journal,
            date: input.date,
            description: input.description.clone(),
            origin: MoveOrigin::Invoice(id),
            lines: vec![
                LineInput::signed(input.account, signed).with_party(Some(input.party)),
                LineInput::signed(input.counterpart, -signed),
            ],
        })?;
        let line = self.ledger.get_move(move_id)?.lines[0];

        self.invoices.insert(
            id,
            Invoice {
                id,
                kind: input.kind,
                party: input.party,
                account: input.account,
                move_id,
                line,
                total: input.total,
                description: input.description,
            },
        );
        info!(invoice = %id, total = %input.total, "invoice posted");
        Ok(id)
    }

    pub fn invoice(&self, id: InvoiceId) -> Result<&Invoice> {
        self.invoices
            .get(&id)
            .ok_or(ProcessingError::InvoiceNotFound { id })
    }

    /// paid once its line is reconciled
    pub fn invoice_state(&self, id: InvoiceId) -> Result<InvoiceState> {
        let invoice = self.invoice(id)?;
        if self.ledger.line(invoice.line)?.is_reconciled() {
            Ok(InvoiceState::Paid)
        } else {
            Ok(InvoiceState::Posted)
        }
    }

    /// create a draft payment for the open amount of a move line
    pub fn pay_line(&mut self, line_id: MoveLineId, journal: PaymentJournalId) -> Result<PaymentId> {
        self.payment_journal(journal)?;
        let line = self.ledger.line(line_id)?;
        if line.is_reconciled() {
            return Err(ProcessingError::AlreadyReconciled { line: line_id });
        }
        let party = line.party.ok_or(ProcessingError::PartyRequired {
            account: line.account,
        })?;
        let amount = line.amount();
        let kind = if amount.is_positive() {
            PaymentKind::Receivable
        } else {
            PaymentKind::Payable
        };
        let description = line.description.clone();

        let active = self
            .payments
            .values()
            .any(|p| p.line == Some(line_id) && p.state != PaymentState::Failed);
        if active {
            return Err(ProcessingError::InvalidState {
                current: "line has an active payment".to_string(),
                expected: "no active payment".to_string(),
            });
        }

        let payment = Payment::new(journal, kind, party, amount.abs(), self.today())?
            .with_line(line_id)
            .with_description(description);
        let id = payment.id;
        debug!(payment = %id, amount = %payment.amount, kind = ?kind, "payment created");
        self.payments.insert(id, payment);
        Ok(id)
    }

    pub fn balance(&self, account: AccountId) -> Money {
        self.ledger.balance(account)
    }

    /// reconcile lines when they are open, share a reconcilable account and
    /// sum to zero; returns whether they were reconciled
    pub(crate) fn try_reconcile(&mut self, lines: &[MoveLineId]) -> Result<bool> {
        let mut account = None;
        let mut total = Money::ZERO;
        for id in lines {
            let line = self.ledger.line(*id)?;
            if line.is_reconciled() {
                return Ok(false);
            }
            match account {
                None => account = Some(line.account),
                Some(existing) if existing != line.account => return Ok(false),
                Some(_) => {}
            }
            total += line.amount();
        }
        let Some(account) = account else {
            return Ok(false);
        };
        if !total.is_zero() || !self.ledger.account(account)?.reconcile {
            return Ok(false);
        }
        self.ledger.reconcile(lines)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::PaymentJournalBuilder;
    use crate::ledger::MemoryLedger;
    use crate::types::AccountKind;
    use chrono::{TimeZone, Utc};
    use hourglass_rs::TimeSource;

    fn book() -> PaymentBook<MemoryLedger> {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
        ));
        PaymentBook::new(MemoryLedger::new(), ModuleConfig::default(), time).unwrap()
    }

    #[test]
    fn test_pay_line_creates_draft_payment() {
        let mut book = book();
        let journal = book.ledger.add_journal("Revenue", "REV");
        let receivable = book.ledger.add_account("Receivable", AccountKind::Receivable, true, true);
        let revenue = book.ledger.add_account("Revenue", AccountKind::Revenue, false, false);
        let party = Uuid::new_v4();
        let date = book.today();
        let invoice = book
            .post_invoice(InvoiceInput::customer(
                party,
                receivable,
                revenue,
                journal,
                Money::from_major(100),
                date,
            ))
            .unwrap();
        let pay_journal = book.add_payment_journal(PaymentJournal::manual("Manual")).unwrap();

        let line = book.invoice(invoice).unwrap().line;
        let id = book.pay_line(line, pay_journal).unwrap();
        let payment = book.payment(id).unwrap();
        assert_eq!(payment.amount, Money::from_major(100));
        assert_eq!(payment.kind, PaymentKind::Receivable);
        assert_eq!(payment.state, PaymentState::Draft);
        assert_eq!(payment.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(book.invoice_state(invoice).unwrap(), InvoiceState::Posted);

        // a second payment for the same line is refused
        assert!(book.pay_line(line, pay_journal).is_err());
    }

    #[test]
    fn test_journal_accounts_must_reconcile() {
        let mut book = book();
        let journal = book.ledger.add_journal("Misc", "MISC");
        let plain = book.ledger.add_account("Plain", AccountKind::Other, false, false);
        let reconcilable = book.ledger.add_account("Processing", AccountKind::Receivable, true, true);

        let bad = PaymentJournalBuilder::new("bad")
            .processing(plain, journal)
            .build()
            .unwrap();
        assert!(matches!(
            book.add_payment_journal(bad),
            Err(ProcessingError::NotReconcilable { .. })
        ));

        let unknown_journal = PaymentJournalBuilder::new("unknown")
            .processing(reconcilable, Uuid::new_v4())
            .build()
            .unwrap();
        assert!(matches!(
            book.add_payment_journal(unknown_journal),
            Err(ProcessingError::JournalNotFound { .. })
        ));
    }

    #[test]
    fn test_supplier_invoice_is_credit() {
        let mut book = book();
        let journal = book.ledger.add_journal("Expense", "EXP");
        let payable = book.ledger.add_account("Payable", AccountKind::Payable, true, true);
        let expense = book.ledger.add_account("Expense", AccountKind::Expense, false, false);
        let date = book.today();

        book.post_invoice(InvoiceInput::supplier(
            Uuid::new_v4(),
            payable,
            expense,
            journal,
            Money::from_major(75),
            date,
        ))
        .unwrap();
        assert_eq!(book.balance(payable), Money::from_major(-75));
        assert_eq!(book.balance(expense), Money::from_major(75));
    }
}
