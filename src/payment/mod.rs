//! Payments and their workflow.
//!
//! Valid transitions:
//! - Draft → Submitted (submit)
//! - Submitted → Approved (approve)
//! - Submitted / Approved → Processing (process)
//! - Processing → Succeeded (succeed)
//! - Processing / Succeeded → Failed (fail)
//! - Submitted / Approved / Processing → Draft (cancel)

pub mod moves;
pub mod workflow;

#[cfg(test)]
mod props;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{ProcessingError, Result};
use crate::types::{
    MoveId, MoveLineId, PartyId, PaymentId, PaymentJournalId, PaymentKind, PaymentState,
};

/// user action on a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentAction {
    Submit,
    Approve,
    Process,
    Succeed,
    Fail,
    Cancel,
}

impl PaymentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentAction::Submit => "submit",
            PaymentAction::Approve => "approve",
            PaymentAction::Process => "process",
            PaymentAction::Succeed => "succeed",
            PaymentAction::Fail => "fail",
            PaymentAction::Cancel => "cancel",
        }
    }
}

impl fmt::Display for PaymentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// target state of `action` from `current`, none when not allowed
pub fn next_state(current: PaymentState, action: PaymentAction) -> Option<PaymentState> {
    use PaymentAction as A;
    use PaymentState as S;

    match (action, current) {
        (A::Submit, S::Draft) => Some(S::Submitted),
        (A::Approve, S::Submitted) => Some(S::Approved),
        (A::Process, S::Submitted | S::Approved) => Some(S::Processing),
        (A::Succeed, S::Processing) => Some(S::Succeeded),
        (A::Fail, S::Processing | S::Succeeded) => Some(S::Failed),
        (A::Cancel, S::Submitted | S::Approved | S::Processing) => Some(S::Draft),
        _ => None,
    }
}

/// payment of one move line through a payment journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub journal: PaymentJournalId,
    pub kind: PaymentKind,
    pub party: PartyId,
    /// always positive, direction comes from `kind`
    pub amount: Money,
    /// the move line being paid
    pub line: Option<MoveLineId>,
    pub date: NaiveDate,
    pub description: String,
    pub state: PaymentState,
    pub processing_move: Option<MoveId>,
    pub clearing_move: Option<MoveId>,
    /// amount advanced by the bank and not yet recovered
    pub advanced: Money,
}

impl Payment {
    /// create a draft payment
    pub fn new(
        journal: PaymentJournalId,
        kind: PaymentKind,
        party: PartyId,
        amount: Money,
        date: NaiveDate,
    ) -> Result<Self> {
        if !amount.is_positive() {
            return Err(ProcessingError::InvalidLine {
                message: format!("payment amount must be positive, got {}", amount),
            });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            journal,
            kind,
            party,
            amount,
            line: None,
            date,
            description: String::new(),
            state: PaymentState::Draft,
            processing_move: None,
            clearing_move: None,
            advanced: Money::ZERO,
        })
    }

    pub fn with_line(mut self, line: MoveLineId) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// apply the payment direction, positive amounts become debits on receivables
    pub fn signed(&self, amount: Money) -> Money {
        amount * Decimal::from(self.kind.direction())
    }

    /// validate `action` against the current state
    pub fn transition(&self, action: PaymentAction) -> Result<PaymentState> {
        next_state(self.state, action).ok_or_else(|| ProcessingError::InvalidTransition {
            payment: self.id,
            action: action.to_string(),
            state: self.state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn payment(state: PaymentState) -> Payment {
        let mut payment = Payment::new(
            Uuid::new_v4(),
            PaymentKind::Receivable,
            Uuid::new_v4(),
            Money::from_major(100),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .unwrap();
        payment.state = state;
        payment
    }

    #[rstest]
    #[case(PaymentState::Draft, PaymentAction::Submit, PaymentState::Submitted)]
    #[case(PaymentState::Submitted, PaymentAction::Approve, PaymentState::Approved)]
    #[case(PaymentState::Submitted, PaymentAction::Process, PaymentState::Processing)]
    #[case(PaymentState::Approved, PaymentAction::Process, PaymentState::Processing)]
    #[case(PaymentState::Processing, PaymentAction::Succeed, PaymentState::Succeeded)]
    #[case(PaymentState::Processing, PaymentAction::Fail, PaymentState::Failed)]
    #[case(PaymentState::Succeeded, PaymentAction::Fail, PaymentState::Failed)]
    #[case(PaymentState::Processing, PaymentAction::Cancel, PaymentState::Draft)]
    #[case(PaymentState::Approved, PaymentAction::Cancel, PaymentState::Draft)]
    fn test_allowed_transitions(
        #[case] from: PaymentState,
        #[case] action: PaymentAction,
        #[case] to: PaymentState,
    ) {
        assert_eq!(payment(from).transition(action).unwrap(), to);
    }

    #[rstest]
    #[case(PaymentState::Draft, PaymentAction::Succeed)]
    #[case(PaymentState::Submitted, PaymentAction::Fail)]
    #[case(PaymentState::Succeeded, PaymentAction::Succeed)]
    #[case(PaymentState::Failed, PaymentAction::Fail)]
    #[case(PaymentState::Failed, PaymentAction::Succeed)]
    #[case(PaymentState::Processing, PaymentAction::Approve)]
    #[case(PaymentState::Succeeded, PaymentAction::Cancel)]
    #[case(PaymentState::Draft, PaymentAction::Process)]
    fn test_rejected_transitions(#[case] from: PaymentState, #[case] action: PaymentAction) {
        let err = payment(from).transition(action).unwrap_err();
        assert!(err.is_transition_error());
        assert!(err.to_string().contains(action.as_str()));
    }

    #[test]
    fn test_signed_amounts() {
        let mut p = payment(PaymentState::Draft);
        assert_eq!(p.signed(Money::from_major(10)), Money::from_major(10));
        p.kind = PaymentKind::Payable;
        assert_eq!(p.signed(Money::from_major(10)), Money::from_major(-10));
    }

    #[test]
    fn test_amount_must_be_positive() {
        let result = Payment::new(
            Uuid::new_v4(),
            PaymentKind::Receivable,
            Uuid::new_v4(),
            Money::ZERO,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        assert!(result.is_err());
    }
}
