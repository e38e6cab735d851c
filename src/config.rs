use serde::{Deserialize, Serialize};

use crate::errors::{ProcessingError, Result};

/// record extensions this crate adds to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extension {
    /// processing and clearing fields on payment journals
    PaymentJournal,
    /// processing state and moves on payments
    Payment,
    /// payment-sourced bank statement move lines
    StatementMoveLine,
}

impl Extension {
    /// host model name the extension applies to
    pub fn model(&self) -> &'static str {
        match self {
            Extension::PaymentJournal => "account.payment.journal",
            Extension::Payment => "account.payment",
            Extension::StatementMoveLine => "account.bank.statement.move.line",
        }
    }
}

/// module configuration handed to the book at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    /// decimals of the company currency
    pub currency_digits: u32,
    /// payments must be approved before processing
    pub approval_required: bool,
    /// companion bank statement payment module is installed
    pub statement_payment: bool,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            currency_digits: 2,
            approval_required: false,
            statement_payment: true,
        }
    }
}

impl ModuleConfig {
    /// parse from json, missing keys take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ModuleConfig =
            serde_json::from_str(json).map_err(|e| ProcessingError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.currency_digits > 8 {
            return Err(ProcessingError::InvalidConfiguration {
                message: format!("currency digits {} exceed 8", self.currency_digits),
            });
        }
        Ok(())
    }

    /// active record extensions
    pub fn extensions(&self) -> Vec<Extension> {
        let mut extensions = vec![Extension::PaymentJournal, Extension::Payment];
        if self.statement_payment {
            extensions.push(Extension::StatementMoveLine);
        }
        extensions
    }

    pub fn is_active(&self, extension: Extension) -> bool {
        self.extensions().contains(&extension)
    }

    /// fail unless the extension is active
    pub fn require(&self, extension: Extension) -> Result<()> {
        if self.is_active(extension) {
            Ok(())
        } else {
            Err(ProcessingError::ExtensionInactive {
                extension: extension.model().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ModuleConfig::default();
        assert_eq!(config.currency_digits, 2);
        assert!(!config.approval_required);
        assert_eq!(config.extensions().len(), 3);
    }

    #[test]
    fn test_from_json_partial() {
        let config = ModuleConfig::from_json(r#"{"approval_required": true}"#).unwrap();
        assert!(config.approval_required);
        assert_eq!(config.currency_digits, 2);
        assert!(config.statement_payment);
    }

    #[test]
    fn test_statement_extension_depends_on_companion() {
        let config = ModuleConfig::from_json(r#"{"statement_payment": false}"#).unwrap();
        assert_eq!(
            config.extensions(),
            vec![Extension::PaymentJournal, Extension::Payment]
        );
        assert!(matches!(
            config.require(Extension::StatementMoveLine),
            Err(ProcessingError::ExtensionInactive { .. })
        ));
        assert!(config.require(Extension::Payment).is_ok());
    }

    #[test]
    fn test_invalid_json() {
        assert!(ModuleConfig::from_json("{not json").is_err());
        assert!(ModuleConfig::from_json(r#"{"currency_digits": 12}"#).is_err());
    }
}
