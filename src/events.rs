use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{MoveId, PaymentId, PaymentState, StatementLineId};

/// all events emitted while processing payments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // workflow events
    PaymentStateChanged {
        payment_id: PaymentId,
        old_state: PaymentState,
        new_state: PaymentState,
        action: String,
        date: NaiveDate,
    },

    // ledger events
    ProcessingMoveCreated {
        payment_id: PaymentId,
        move_id: MoveId,
        amount: Money,
    },
    ClearingMoveCreated {
        payment_id: PaymentId,
        move_id: MoveId,
        clearing_amount: Money,
        remainder: Money,
    },
    MoveCancelled {
        payment_id: PaymentId,
        move_id: MoveId,
        reversal: Option<MoveId>,
    },

    // bank statement events
    BankAdvanceReceived {
        payment_id: PaymentId,
        line_id: StatementLineId,
        amount: Money,
    },
    BankAdvanceRecovered {
        payment_id: PaymentId,
        line_id: StatementLineId,
        amount: Money,
    },
    StatementLinePosted {
        line_id: StatementLineId,
        move_id: MoveId,
        amount: Money,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// state changes of one payment, oldest first
    pub fn transitions(&self, payment_id: PaymentId) -> Vec<(PaymentState, PaymentState)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::PaymentStateChanged {
                    payment_id: id,
                    old_state,
                    new_state,
                    ..
                } if *id == payment_id => Some((*old_state, *new_state)),
                _ => None,
            })
            .collect()
    }
}
