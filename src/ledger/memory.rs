use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{ProcessingError, Result};
use crate::ledger::{Account, Journal, Ledger, Move, MoveInput, MoveLine};
use crate::types::{
    AccountId, AccountKind, JournalId, MoveId, MoveLineId, MoveState, ReconciliationId,
};

/// in-memory ledger
#[derive(Debug, Default)]
pub struct MemoryLedger {
    accounts: HashMap<AccountId, Account>,
    journals: HashMap<JournalId, Journal>,
    moves: HashMap<MoveId, Move>,
    lines: HashMap<MoveLineId, MoveLine>,
    reconciliations: HashMap<ReconciliationId, Vec<MoveLineId>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// add an account
    pub fn add_account(
        &mut self,
        name: impl Into<String>,
        kind: AccountKind,
        reconcile: bool,
        party_required: bool,
    ) -> AccountId {
        let id = Uuid::new_v4();
        self.accounts.insert(
            id,
            Account {
                id,
                name: name.into(),
                kind,
                reconcile,
                party_required,
            },
        );
        id
    }

    /// add a journal
    pub fn add_journal(&mut self, name: impl Into<String>, code: impl Into<String>) -> JournalId {
        let id = Uuid::new_v4();
        self.journals.insert(
            id,
            Journal {
                id,
                name: name.into(),
                code: code.into(),
            },
        );
        id
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    pub fn moves(&self) -> impl Iterator<Item = &Move> {
        self.moves.values()
    }

    fn line_mut(&mut self, id: MoveLineId) -> Result<&mut MoveLine> {
        self.lines
            .get_mut(&id)
            .ok_or(ProcessingError::MoveLineNotFound { id })
    }
}

impl Ledger for MemoryLedger {
    fn account(&self, id: AccountId) -> Result<&Account> {
        self.accounts
            .get(&id)
            .ok_or(ProcessingError::AccountNotFound { id })
    }

    fn journal(&self, id: JournalId) -> Result<&Journal> {
        self.journals
            .get(&id)
            .ok_or(ProcessingError::JournalNotFound { id })
    }

    fn create_move(&mut self, input: MoveInput) -> Result<MoveId> {
        self.journal(input.journal)?;

        if input.lines.is_empty() {
            return Err(ProcessingError::InvalidLine {
                message: "move has no lines".to_string(),
            });
        }

        let mut debit = Money::ZERO;
        let mut credit = Money::ZERO;
        for line in &input.lines {
            let account = self.account(line.account)?;
            if account.party_required && line.party.is_none() {
                return Err(ProcessingError::PartyRequired { account: account.id });
            }
            if line.debit.is_negative() || line.credit.is_negative() {
                return Err(ProcessingError::InvalidLine {
                    message: format!("negative amount on account {}", account.name),
                });
            }
            if !line.debit.is_zero() && !line.credit.is_zero() {
                return Err(ProcessingError::InvalidLine {
                    message: format!("both debit and credit on account {}", account.name),
                });
            }
            debit += line.debit;
            credit += line.credit;
        }
        if debit != credit {
            return Err(ProcessingError::UnbalancedMove { debit, credit });
        }

        let move_id = Uuid::new_v4();
        let mut line_ids = Vec::with_capacity(input.lines.len());
        for line in input.lines {
            let line_id = Uuid::new_v4();
            self.lines.insert(
                line_id,
                MoveLine {
                    id: line_id,
                    move_id,
                    account: line.account,
                    party: line.party,
                    debit: line.debit,
                    credit: line.credit,
                    description: line.description,
                    reconciliation: None,
                },
            );
            line_ids.push(line_id);
        }

        debug!(%move_id, journal = %input.journal, total = %debit, "move created");

        self.moves.insert(
            move_id,
            Move {
                id: move_id,
                journal: input.journal,
                date: input.date,
                description: input.description,
                origin: input.origin,
                state: MoveState::Draft,
                lines: line_ids,
            },
        );
        Ok(move_id)
    }

    fn post_move(&mut self, id: MoveId) -> Result<()> {
        let mv = self
            .moves
            .get_mut(&id)
            .ok_or(ProcessingError::MoveNotFound { id })?;
        if mv.state == MoveState::Posted {
            return Err(ProcessingError::MovePosted { id });
        }
        mv.state = MoveState::Posted;
        debug!(move_id = %id, "move posted");
        Ok(())
    }

    fn delete_move(&mut self, id: MoveId) -> Result<()> {
        let mv = self.get_move(id)?;
        if mv.state == MoveState::Posted {
            return Err(ProcessingError::MovePosted { id });
        }
        for line_id in &mv.lines {
            if self.line(*line_id)?.is_reconciled() {
                return Err(ProcessingError::AlreadyReconciled { line: *line_id });
            }
        }
        if let Some(mv) = self.moves.remove(&id) {
            for line_id in mv.lines {
                self.lines.remove(&line_id);
            }
        }
        debug!(move_id = %id, "move deleted");
        Ok(())
    }

    fn get_move(&self, id: MoveId) -> Result<&Move> {
        self.moves.get(&id).ok_or(ProcessingError::MoveNotFound { id })
    }

    fn line(&self, id: MoveLineId) -> Result<&MoveLine> {
        self.lines
            .get(&id)
            .ok_or(ProcessingError::MoveLineNotFound { id })
    }

    fn reconcile(&mut self, lines: &[MoveLineId]) -> Result<ReconciliationId> {
        if lines.len() < 2 {
            return Err(ProcessingError::InvalidLine {
                message: "reconciliation needs at least two lines".to_string(),
            });
        }

        let first = self.line(lines[0])?;
        let account_id = first.account;
        let account = self.account(account_id)?;
        if !account.reconcile {
            return Err(ProcessingError::NotReconcilable { account: account_id });
        }

        let mut difference = Money::ZERO;
        for line_id in lines {
            let line = self.line(*line_id)?;
            if line.account != account_id {
                return Err(ProcessingError::InvalidLine {
                    message: "reconciled lines must share one account".to_string(),
                });
            }
            if line.is_reconciled() {
                return Err(ProcessingError::AlreadyReconciled { line: *line_id });
            }
            difference += line.amount();
        }
        if !difference.is_zero() {
            return Err(ProcessingError::UnbalancedReconciliation { difference });
        }

        let id = Uuid::new_v4();
        for line_id in lines {
            self.line_mut(*line_id)?.reconciliation = Some(id);
        }
        self.reconciliations.insert(id, lines.to_vec());
        debug!(reconciliation = %id, account = %account_id, lines = lines.len(), "lines reconciled");
        Ok(id)
    }

    fn unreconcile(&mut self, id: ReconciliationId) -> Result<Vec<MoveLineId>> {
        let lines = self
            .reconciliations
            .remove(&id)
            .ok_or(ProcessingError::ReconciliationNotFound { id })?;
        for line_id in &lines {
            self.line_mut(*line_id)?.reconciliation = None;
        }
        debug!(reconciliation = %id, "lines unreconciled");
        Ok(lines)
    }

    fn balance(&self, account: AccountId) -> Money {
        self.lines
            .values()
            .filter(|line| line.account == account)
            .map(|line| line.amount())
            .sum()
    }
}
