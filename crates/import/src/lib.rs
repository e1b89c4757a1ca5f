pub mod groups;
pub mod pairs;
pub mod resolved;
pub mod rules;
pub mod transactions;

use thiserror::Error;

/// Wire format for every date column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid date '{value}' on row {row}")]
    InvalidDate { row: usize, value: String },
    #[error("invalid amount '{value}' on row {row}")]
    InvalidAmount { row: usize, value: String },
    #[error("invalid source '{value}' on row {row}")]
    InvalidSource { row: usize, value: String },
    #[error("rule {rule_id}: invalid direction '{value}'")]
    InvalidDirection { rule_id: String, value: String },
    #[error("rule {rule_id}: invalid txn_kind '{value}'")]
    InvalidRuleKind { rule_id: String, value: String },
    #[error("rule {rule_id}: invalid source '{value}'")]
    InvalidRuleSource { rule_id: String, value: String },
    #[error("rule {rule_id}: invalid is_active '{value}'")]
    InvalidIsActive { rule_id: String, value: String },
    #[error("rule {rule_id}: invalid priority '{value}'")]
    InvalidPriority { rule_id: String, value: String },
    #[error("rule table has an empty rule_id on row {row}")]
    EmptyRuleId { row: usize },
    #[error("rule table has duplicate rule_id '{0}'")]
    DuplicateRuleId(String),
}

pub use groups::{write_groups, write_groups_file};
pub use pairs::{read_pairs, read_pairs_file, write_pairs, write_pairs_file};
pub use resolved::{write_resolved, write_resolved_file};
pub use rules::{read_rules, read_rules_file};
pub use transactions::{
    read_ledger, read_ledger_file, read_transactions, read_transactions_file,
};

pub(crate) mod field {
    use chrono::NaiveDate;
    use ledgermatch_core::Amount;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    use crate::{ImportError, DATE_FORMAT};

    pub fn blank_to_none(value: String) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    pub fn parse_date(value: &str, row: usize) -> Result<Option<NaiveDate>, ImportError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map(Some)
            .map_err(|_| ImportError::InvalidDate {
                row,
                value: value.to_string(),
            })
    }

    pub fn parse_amount(value: &str, row: usize) -> Result<Option<Amount>, ImportError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }
        Decimal::from_str(value)
            .map(|d| Some(Amount::new(d)))
            .map_err(|_| ImportError::InvalidAmount {
                row,
                value: value.to_string(),
            })
    }
}
