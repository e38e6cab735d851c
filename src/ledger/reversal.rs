//! Cancelling moves.
//!
//! A draft move is simply deleted. A posted move is never touched: a
//! reversing move with debits and credits swapped is posted instead, and
//! every original line on a reconcilable account is reconciled with its
//! reversal so neither stays open.

use chrono::NaiveDate;
use tracing::debug;

use crate::errors::Result;
use crate::ledger::{Ledger, LineInput, MoveInput, MoveLine, MoveOrigin};
use crate::types::{MoveId, MoveState};

/// swap debit and credit of every line
pub fn reversing_lines(lines: &[&MoveLine]) -> Vec<LineInput> {
    lines
        .iter()
        .map(|line| LineInput {
            account: line.account,
            party: line.party,
            debit: line.credit,
            credit: line.debit,
            description: line.description.clone(),
        })
        .collect()
}

/// delete a draft move or post its reversal
///
/// Existing reconciliations touching the move are undone first. Returns the
/// reversing move id when one was posted.
pub fn cancel_move<L: Ledger + ?Sized>(
    ledger: &mut L,
    move_id: MoveId,
    date: NaiveDate,
) -> Result<Option<MoveId>> {
    let (state, journal, description, original_ids) = {
        let mv = ledger.get_move(move_id)?;
        (mv.state, mv.journal, mv.description.clone(), mv.lines.clone())
    };

    let mut reconciliations: Vec<_> = original_ids
        .iter()
        .map(|id| ledger.line(*id).map(|line| line.reconciliation))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect();
    // two lines of the move may share a reconciliation
    reconciliations.sort();
    reconciliations.dedup();
    for reconciliation in reconciliations {
        ledger.unreconcile(reconciliation)?;
    }

    if state == MoveState::Draft {
        ledger.delete_move(move_id)?;
        debug!(%move_id, "draft move deleted on cancel");
        return Ok(None);
    }

    let lines = {
        let originals = ledger.move_lines(move_id)?;
        reversing_lines(&originals)
    };
    let reversal = ledger.create_posted_move(MoveInput {
        journal,
        date,
        description: format!("Cancel: {}", description),
        origin: MoveOrigin::Reversal(move_id),
        lines,
    })?;

    let reversal_ids = ledger.get_move(reversal)?.lines.clone();
    for (original, reversed) in original_ids.iter().zip(reversal_ids.iter()) {
        let account = ledger.line(*original)?.account;
        let amount_is_zero = ledger.line(*original)?.amount().is_zero();
        if ledger.account(account)?.reconcile && !amount_is_zero {
            ledger.reconcile(&[*original, *reversed])?;
        }
    }

    debug!(%move_id, %reversal, "posted move reversed");
    Ok(Some(reversal))
}
