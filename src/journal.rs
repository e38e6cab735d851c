use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::errors::{ProcessingError, Result};
use crate::types::{AccountId, JournalId, PaymentJournalId, ProcessMethod};

/// payment journal with processing and clearing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentJournal {
    pub id: PaymentJournalId,
    pub name: String,
    pub process_method: ProcessMethod,
    pub clearing_journal: Option<JournalId>,
    pub clearing_account: Option<AccountId>,
    /// share of the payment advanced by the bank, 1 is a full discount
    pub clearing_percent: Rate,
    pub processing_journal: Option<JournalId>,
    pub processing_account: Option<AccountId>,
}

impl PaymentJournal {
    /// manual journal without processing or clearing
    pub fn manual(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            process_method: ProcessMethod::Manual,
            clearing_journal: None,
            clearing_account: None,
            clearing_percent: Rate::ONE,
            processing_journal: None,
            processing_account: None,
        }
    }

    /// check percent bounds and that accounts come with their journals
    pub fn validate(&self) -> Result<()> {
        if !self.clearing_percent.is_fraction() {
            return Err(ProcessingError::InvalidClearingPercent {
                percent: self.clearing_percent,
            });
        }

        if self.process_method == ProcessMethod::BankDiscount {
            if self.clearing_account.is_none() || self.clearing_journal.is_none() {
                return Err(ProcessingError::MissingClearingAccount { journal: self.id });
            }
            if self.processing_account.is_none() || self.processing_journal.is_none() {
                return Err(ProcessingError::MissingProcessingAccount { journal: self.id });
            }
        }

        if self.clearing_account.is_some() != self.clearing_journal.is_some() {
            return Err(ProcessingError::InvalidConfiguration {
                message: format!(
                    "payment journal {} needs both a clearing account and a clearing journal",
                    self.name
                ),
            });
        }
        if self.processing_account.is_some() != self.processing_journal.is_some() {
            return Err(ProcessingError::InvalidConfiguration {
                message: format!(
                    "payment journal {} needs both a processing account and a processing journal",
                    self.name
                ),
            });
        }

        Ok(())
    }

    /// true when processed payments go through the processing account
    pub fn uses_processing(&self) -> bool {
        self.processing_account.is_some()
    }

    /// true when succeeded payments get a clearing move
    pub fn uses_clearing(&self) -> bool {
        self.clearing_account.is_some()
    }

    /// amount advanced by the bank for a payment of `amount`
    pub fn clearing_amount(&self, amount: Money, digits: u32) -> Money {
        amount.fraction(self.clearing_percent, digits)
    }

    /// (account, journal) used for the clearing move
    pub fn clearing(&self) -> Result<(AccountId, JournalId)> {
        match (self.clearing_account, self.clearing_journal) {
            (Some(account), Some(journal)) => Ok((account, journal)),
            _ => Err(ProcessingError::MissingClearingAccount { journal: self.id }),
        }
    }

    /// (account, journal) used for the processing move
    pub fn processing(&self) -> Result<(AccountId, JournalId)> {
        match (self.processing_account, self.processing_journal) {
            (Some(account), Some(journal)) => Ok((account, journal)),
            _ => Err(ProcessingError::MissingProcessingAccount { journal: self.id }),
        }
    }
}

/// builder for payment journals
pub struct PaymentJournalBuilder {
    name: String,
    process_method: ProcessMethod,
    clearing: Option<(AccountId, JournalId)>,
    clearing_percent: Rate,
    processing: Option<(AccountId, JournalId)>,
}

impl PaymentJournalBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            process_method: ProcessMethod::Manual,
            clearing: None,
            clearing_percent: Rate::ONE,
            processing: None,
        }
    }

    pub fn process_method(mut self, method: ProcessMethod) -> Self {
        self.process_method = method;
        self
    }

    pub fn clearing(mut self, account: AccountId, journal: JournalId) -> Self {
        self.clearing = Some((account, journal));
        self
    }

    pub fn clearing_percent(mut self, percent: Rate) -> Self {
        self.clearing_percent = percent;
        self
    }

    pub fn processing(mut self, account: AccountId, journal: JournalId) -> Self {
        self.processing = Some((account, journal));
        self
    }

    pub fn build(self) -> Result<PaymentJournal> {
        let journal = PaymentJournal {
            id: Uuid::new_v4(),
            name: self.name,
            process_method: self.process_method,
            clearing_journal: self.clearing.map(|(_, journal)| journal),
            clearing_account: self.clearing.map(|(account, _)| account),
            clearing_percent: self.clearing_percent,
            processing_journal: self.processing.map(|(_, journal)| journal),
            processing_account: self.processing.map(|(account, _)| account),
        };
        journal.validate()?;
        Ok(journal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ids() -> (AccountId, JournalId, AccountId, JournalId) {
        (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn test_default_clearing_percent_is_full() {
        let (clearing, clearing_journal, processing, processing_journal) = ids();
        let journal = PaymentJournalBuilder::new("Manual receivable 100% discount")
            .clearing(clearing, clearing_journal)
            .processing(processing, processing_journal)
            .build()
            .unwrap();

        assert_eq!(journal.clearing_percent, Rate::ONE);
        assert_eq!(journal.process_method, ProcessMethod::Manual);
        assert!(journal.uses_processing());
        assert!(journal.uses_clearing());
    }

    #[test]
    fn test_clearing_amount() {
        let (clearing, clearing_journal, _, _) = ids();
        let journal = PaymentJournalBuilder::new("80%")
            .clearing(clearing, clearing_journal)
            .clearing_percent(Rate::from_decimal(dec!(0.8)))
            .build()
            .unwrap();

        assert_eq!(journal.clearing_amount(Money::from_major(200), 2), Money::from_major(160));
        assert_eq!(
            journal.clearing_amount(Money::from_str_exact("33.33").unwrap(), 2),
            Money::from_str_exact("26.66").unwrap()
        );
    }

    #[test]
    fn test_percent_out_of_bounds() {
        let result = PaymentJournalBuilder::new("bad")
            .clearing_percent(Rate::from_percentage(150))
            .build();
        assert!(matches!(result, Err(ProcessingError::InvalidClearingPercent { .. })));

        let result = PaymentJournalBuilder::new("negative")
            .clearing_percent(Rate::from_decimal(dec!(-0.5)))
            .build();
        assert!(result.unwrap_err().is_configuration_error());
    }

    #[test]
    fn test_bank_discount_requires_accounts() {
        let (clearing, clearing_journal, processing, processing_journal) = ids();

        let result = PaymentJournalBuilder::new("bank")
            .process_method(ProcessMethod::BankDiscount)
            .processing(processing, processing_journal)
            .build();
        assert!(matches!(result, Err(ProcessingError::MissingClearingAccount { .. })));

        let result = PaymentJournalBuilder::new("bank")
            .process_method(ProcessMethod::BankDiscount)
            .clearing(clearing, clearing_journal)
            .build();
        assert!(matches!(result, Err(ProcessingError::MissingProcessingAccount { .. })));

        let journal = PaymentJournalBuilder::new("bank")
            .process_method(ProcessMethod::BankDiscount)
            .clearing(clearing, clearing_journal)
            .processing(processing, processing_journal)
            .build()
            .unwrap();
        assert!(journal.clearing().is_ok());
        assert!(journal.processing().is_ok());
    }

    #[test]
    fn test_manual_needs_nothing() {
        let journal = PaymentJournal::manual("cash");
        assert!(journal.validate().is_ok());
        assert!(!journal.uses_processing());
        assert!(matches!(
            journal.clearing(),
            Err(ProcessingError::MissingClearingAccount { .. })
        ));
    }

    #[test]
    fn test_account_without_journal() {
        let mut journal = PaymentJournal::manual("half configured");
        journal.processing_account = Some(Uuid::new_v4());
        assert!(matches!(
            journal.validate(),
            Err(ProcessingError::InvalidConfiguration { .. })
        ));
    }
}
