//! Property-based tests for payment moves and transitions.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use super::moves::{clearing_move, processing_move, ClearingSplit};
use super::{next_state, Payment, PaymentAction};
use crate::decimal::{Money, Rate};
use crate::journal::PaymentJournalBuilder;
use crate::types::{PaymentKind, PaymentState};

/// Strategy to generate payment amounts (0.01 to 1,000,000.00).
fn amount() -> impl Strategy<Value = Money> {
    (1i64..100_000_000i64).prop_map(|cents| Money::from_minor(cents, 2))
}

/// Strategy to generate clearing percents (0 to 1, four decimals).
fn percent() -> impl Strategy<Value = Rate> {
    (0i64..=10_000i64).prop_map(|v| Rate::from_decimal(Decimal::new(v, 4)))
}

fn kind() -> impl Strategy<Value = PaymentKind> {
    prop_oneof![Just(PaymentKind::Receivable), Just(PaymentKind::Payable)]
}

fn state() -> impl Strategy<Value = PaymentState> {
    prop_oneof![
        Just(PaymentState::Draft),
        Just(PaymentState::Submitted),
        Just(PaymentState::Approved),
        Just(PaymentState::Processing),
        Just(PaymentState::Succeeded),
        Just(PaymentState::Failed),
    ]
}

fn action() -> impl Strategy<Value = PaymentAction> {
    prop_oneof![
        Just(PaymentAction::Submit),
        Just(PaymentAction::Approve),
        Just(PaymentAction::Process),
        Just(PaymentAction::Succeed),
        Just(PaymentAction::Fail),
        Just(PaymentAction::Cancel),
    ]
}

fn payment(kind: PaymentKind, amount: Money) -> Payment {
    Payment::new(
        Uuid::new_v4(),
        kind,
        Uuid::new_v4(),
        amount,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    )
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// the clearing amount is the percent of the payment rounded to the
    /// currency, half away from zero
    #[test]
    fn prop_clearing_amount_is_rounded_fraction(amount in amount(), percent in percent()) {
        let journal = PaymentJournalBuilder::new("bank")
            .clearing(Uuid::new_v4(), Uuid::new_v4())
            .clearing_percent(percent)
            .build()
            .unwrap();
        let expected = (amount.as_decimal() * percent.as_decimal())
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        let clearing = journal.clearing_amount(amount, 2);
        prop_assert_eq!(clearing.as_decimal(), expected);
        prop_assert!(clearing <= amount);
        prop_assert!(!clearing.is_negative());
    }

    /// processing and clearing moves always balance
    #[test]
    fn prop_moves_balance(kind in kind(), amount in amount(), percent in percent()) {
        let p = payment(kind, amount);
        let clearing = amount.fraction(percent, 2);
        let split = ClearingSplit::new(amount, clearing);
        prop_assert_eq!(split.clearing + split.remainder, amount);

        let processing = processing_move(&p, Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), p.date);
        let total: Money = processing.lines.iter().map(|l| l.amount()).sum();
        prop_assert!(total.is_zero());

        let clearing = clearing_move(
            &p,
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            split,
            Uuid::new_v4(),
            p.date,
        );
        let total: Money = clearing.lines.iter().map(|l| l.amount()).sum();
        prop_assert!(total.is_zero());
        prop_assert!(clearing.lines.iter().all(|l| l.debit.is_zero() || l.credit.is_zero()));
    }

    /// failed payments accept no action, succeeded ones only fail
    #[test]
    fn prop_terminal_states(action in action()) {
        prop_assert_eq!(next_state(PaymentState::Failed, action), None);
        let from_succeeded = next_state(PaymentState::Succeeded, action);
        if action == PaymentAction::Fail {
            prop_assert_eq!(from_succeeded, Some(PaymentState::Failed));
        } else {
            prop_assert_eq!(from_succeeded, None);
        }
    }

    /// only processing payments reach succeeded
    #[test]
    fn prop_succeeded_comes_from_processing(from in state(), action in action()) {
        if next_state(from, action) == Some(PaymentState::Succeeded) {
            prop_assert_eq!(from, PaymentState::Processing);
            prop_assert_eq!(action, PaymentAction::Succeed);
        }
    }
}
