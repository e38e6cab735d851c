//! Line layout of processing and clearing moves.
//!
//! Amounts are written for a receivable payment and mirrored for payables
//! through `Payment::signed`.
//!
//! Processing move, amount `A`:
//!   paid line account      credit A
//!   processing account     debit  A
//!
//! Clearing move, clearing percent `p`:
//!   processing account     credit A      (paid line account without processing)
//!   clearing account       debit  p × A
//!   paid line account      debit  (1 − p) × A

use chrono::NaiveDate;

use crate::decimal::Money;
use crate::ledger::{LineInput, MoveInput, MoveOrigin};
use crate::payment::Payment;
use crate::types::{AccountId, JournalId};

/// amounts of a clearing move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearingSplit {
    /// advanced by the bank, booked on the clearing account
    pub clearing: Money,
    /// still settled by the party, booked back on the paid line account
    pub remainder: Money,
}

impl ClearingSplit {
    pub fn new(amount: Money, clearing: Money) -> Self {
        Self {
            clearing,
            remainder: amount - clearing,
        }
    }
}

/// processing move moving the paid amount into the processing account
pub fn processing_move(
    payment: &Payment,
    paid_account: AccountId,
    processing_account: AccountId,
    journal: JournalId,
    date: NaiveDate,
) -> MoveInput {
    let party = Some(payment.party);
    MoveInput {
        journal,
        date,
        description: processing_description(payment),
        origin: MoveOrigin::Payment(payment.id),
        lines: vec![
            LineInput::signed(paid_account, -payment.signed(payment.amount)).with_party(party),
            LineInput::signed(processing_account, payment.signed(payment.amount))
                .with_party(party),
        ],
    }
}

/// clearing move settling the counterpart account against the bank discount
///
/// The counterpart line always comes first, the remainder line last.
pub fn clearing_move(
    payment: &Payment,
    counterpart_account: AccountId,
    clearing_account: AccountId,
    paid_account: AccountId,
    split: ClearingSplit,
    journal: JournalId,
    date: NaiveDate,
) -> MoveInput {
    let party = Some(payment.party);
    let mut lines = vec![
        LineInput::signed(counterpart_account, -payment.signed(payment.amount)).with_party(party),
    ];
    if !split.clearing.is_zero() {
        lines.push(
            LineInput::signed(clearing_account, payment.signed(split.clearing)).with_party(party),
        );
    }
    if !split.remainder.is_zero() {
        lines.push(
            LineInput::signed(paid_account, payment.signed(split.remainder))
                .with_party(party)
                .with_description("remainder"),
        );
    }

    MoveInput {
        journal,
        date,
        description: clearing_description(payment),
        origin: MoveOrigin::Payment(payment.id),
        lines,
    }
}

fn processing_description(payment: &Payment) -> String {
    if payment.description.is_empty() {
        format!("Processing payment {}", payment.id)
    } else {
        format!("Processing: {}", payment.description)
    }
}

fn clearing_description(payment: &Payment) -> String {
    if payment.description.is_empty() {
        format!("Clearing payment {}", payment.id)
    } else {
        format!("Clearing: {}", payment.description)
    }
}
