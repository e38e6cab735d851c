use thiserror::Error;
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::types::PaymentState;

#[derive(Error, Debug)]
pub enum ProcessingError {
    // configuration
    #[error("payment journal {journal} has no clearing account")]
    MissingClearingAccount {
        journal: Uuid,
    },

    #[error("payment journal {journal} has no processing account")]
    MissingProcessingAccount {
        journal: Uuid,
    },

    #[error("invalid clearing percent: {percent} is not between 0% and 100%")]
    InvalidClearingPercent {
        percent: Rate,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("extension not active: {extension}")]
    ExtensionInactive {
        extension: String,
    },

    // transitions
    #[error("cannot {action} payment {payment} in state {state}")]
    InvalidTransition {
        payment: Uuid,
        action: String,
        state: PaymentState,
    },

    #[error("payment {payment} has reconciled processing or clearing moves")]
    MovesSettled {
        payment: Uuid,
    },

    #[error("payment {payment} must be approved before processing")]
    ApprovalRequired {
        payment: Uuid,
    },

    // reconciliation
    #[error("statement amount {amount} does not match outstanding clearing amount {expected} of payment {payment}")]
    AmountMismatch {
        payment: Uuid,
        amount: Money,
        expected: Money,
    },

    #[error("{count} processing payments match invoice {invoice}")]
    AmbiguousPayment {
        invoice: Uuid,
        count: usize,
    },

    #[error("statement line {line} amount {amount} does not equal its move lines total {allocated}")]
    UnbalancedStatementLine {
        line: Uuid,
        amount: Money,
        allocated: Money,
    },

    #[error("reconciliation lines do not balance: {difference}")]
    UnbalancedReconciliation {
        difference: Money,
    },

    // lookup
    #[error("account not found: {id}")]
    AccountNotFound {
        id: Uuid,
    },

    #[error("journal not found: {id}")]
    JournalNotFound {
        id: Uuid,
    },

    #[error("move not found: {id}")]
    MoveNotFound {
        id: Uuid,
    },

    #[error("move line not found: {id}")]
    MoveLineNotFound {
        id: Uuid,
    },

    #[error("reconciliation not found: {id}")]
    ReconciliationNotFound {
        id: Uuid,
    },

    #[error("payment not found: {id}")]
    PaymentNotFound {
        id: Uuid,
    },

    #[error("payment journal not found: {id}")]
    PaymentJournalNotFound {
        id: Uuid,
    },

    #[error("invoice not found: {id}")]
    InvoiceNotFound {
        id: Uuid,
    },

    #[error("statement not found: {id}")]
    StatementNotFound {
        id: Uuid,
    },

    #[error("statement line not found: {id}")]
    StatementLineNotFound {
        id: Uuid,
    },

    #[error("statement journal not found: {id}")]
    StatementJournalNotFound {
        id: Uuid,
    },

    // ledger
    #[error("move is not balanced: debit {debit}, credit {credit}")]
    UnbalancedMove {
        debit: Money,
        credit: Money,
    },

    #[error("account {account} requires a party")]
    PartyRequired {
        account: Uuid,
    },

    #[error("account {account} does not allow reconciliation")]
    NotReconcilable {
        account: Uuid,
    },

    #[error("move line {line} is already reconciled")]
    AlreadyReconciled {
        line: Uuid,
    },

    #[error("move {id} is posted")]
    MovePosted {
        id: Uuid,
    },

    #[error("invalid move line: {message}")]
    InvalidLine {
        message: String,
    },

    #[error("invalid state: current {current}, expected {expected}")]
    InvalidState {
        current: String,
        expected: String,
    },
}

pub type Result<T> = std::result::Result<T, ProcessingError>;

impl ProcessingError {
    /// true for errors raised by the payment workflow guards
    pub fn is_transition_error(&self) -> bool {
        matches!(
            self,
            ProcessingError::InvalidTransition { .. }
                | ProcessingError::MovesSettled { .. }
                | ProcessingError::ApprovalRequired { .. }
        )
    }

    /// true for errors caused by journal or module configuration
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            ProcessingError::MissingClearingAccount { .. }
                | ProcessingError::MissingProcessingAccount { .. }
                | ProcessingError::InvalidClearingPercent { .. }
                | ProcessingError::InvalidConfiguration { .. }
                | ProcessingError::ExtensionInactive { .. }
        )
    }

    /// true for statement amounts that could not be matched
    pub fn is_reconciliation_error(&self) -> bool {
        matches!(
            self,
            ProcessingError::AmountMismatch { .. }
                | ProcessingError::AmbiguousPayment { .. }
                | ProcessingError::UnbalancedStatementLine { .. }
                | ProcessingError::UnbalancedReconciliation { .. }
        )
    }
}
