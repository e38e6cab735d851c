pub mod book;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod invoice;
pub mod journal;
pub mod ledger;
pub mod payment;
pub mod serialization;
pub mod statement;
pub mod types;

// re-export key types
pub use book::PaymentBook;
pub use config::{Extension, ModuleConfig};
pub use decimal::{Money, Rate};
pub use errors::{ProcessingError, Result};
pub use events::{Event, EventStore};
pub use invoice::{Invoice, InvoiceInput, InvoiceState};
pub use journal::{PaymentJournal, PaymentJournalBuilder};
pub use ledger::{
    cancel_move, Account, Journal, Ledger, LineInput, MemoryLedger, Move, MoveInput, MoveLine,
    MoveOrigin,
};
pub use payment::moves::ClearingSplit;
pub use payment::{next_state, Payment, PaymentAction};
pub use serialization::PaymentView;
pub use statement::{
    match_payment_amount, LineSource, PaymentMatch, Statement, StatementJournal, StatementLine,
    StatementLineState, StatementMoveLine, StatementState,
};
pub use types::{
    AccountId, AccountKind, InvoiceId, JournalId, MoveId, MoveLineId, MoveState, Party, PartyId,
    PaymentId, PaymentJournalId, PaymentKind, PaymentState, ProcessMethod, StatementId,
    StatementJournalId, StatementLineId,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
