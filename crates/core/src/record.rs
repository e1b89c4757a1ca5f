use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::money::Amount;

/// Currency assumed when a source leaves the column blank.
pub const HOME_CURRENCY: &str = "ILS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Bank,
    Card,
    Ledger,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Bank => "bank",
            Source::Card => "card",
            Source::Ledger => "ledger",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bank" => Ok(Source::Bank),
            "card" => Ok(Source::Card),
            "ledger" => Ok(Source::Ledger),
            other => Err(format!("Unknown source: '{other}'")),
        }
    }
}

/// Transaction kind as classified by the source adapters. Unknown strings
/// collapse to `Other` rather than failing the batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxnKind {
    CardPurchase,
    DebitCard,
    Bit,
    Transfer,
    Loan,
    Expense,
    Income,
    #[default]
    Other,
}

impl TxnKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TxnKind::CardPurchase => "card_purchase",
            TxnKind::DebitCard => "debit_card",
            TxnKind::Bit => "bit",
            TxnKind::Transfer => "transfer",
            TxnKind::Loan => "loan",
            TxnKind::Expense => "expense",
            TxnKind::Income => "income",
            TxnKind::Other => "other",
        }
    }

    /// Total parse for transaction rows: kinds are lowercased and anything
    /// unrecognized is `Other`. Curated tables should use `FromStr` instead,
    /// which rejects unknown kinds.
    pub fn parse(s: &str) -> TxnKind {
        s.parse().unwrap_or_default()
    }
}

impl FromStr for TxnKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "card_purchase" => Ok(TxnKind::CardPurchase),
            "debit_card" => Ok(TxnKind::DebitCard),
            "bit" => Ok(TxnKind::Bit),
            "transfer" => Ok(TxnKind::Transfer),
            "loan" => Ok(TxnKind::Loan),
            "expense" => Ok(TxnKind::Expense),
            "income" => Ok(TxnKind::Income),
            "other" => Ok(TxnKind::Other),
            other => Err(format!("Unknown txn_kind: '{other}'")),
        }
    }
}

impl fmt::Display for TxnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flow direction derived from the amount columns, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inflow,
    Outflow,
    Zero,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Inflow => "inflow",
            Direction::Outflow => "outflow",
            Direction::Zero => "zero",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inflow" => Ok(Direction::Inflow),
            "outflow" => Ok(Direction::Outflow),
            "zero" => Ok(Direction::Zero),
            other => Err(format!("Unknown direction: '{other}'")),
        }
    }
}

/// One row of a normalized source export. Immutable once parsed; the
/// `description_clean_norm`, `fingerprint` and `fingerprint_hash` columns are
/// derived and recomputable, everything else comes from the adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub source: Source,
    pub source_file: String,
    pub account_name: String,
    pub date: Option<NaiveDate>,
    pub outflow: Option<Amount>,
    pub inflow: Option<Amount>,
    pub currency: String,
    pub txn_kind: TxnKind,
    pub description_raw: Option<String>,
    pub merchant_raw: Option<String>,
    pub description_clean: Option<String>,
    pub description_clean_norm: String,
    pub fingerprint: String,
    pub fingerprint_hash: String,
}

impl TransactionRecord {
    pub fn direction(&self) -> Direction {
        if self.inflow.is_some_and(Amount::is_positive) {
            Direction::Inflow
        } else if self.outflow.is_some_and(Amount::is_positive) {
            Direction::Outflow
        } else {
            Direction::Zero
        }
    }

    /// Best available free text for pairing and review. Bank descriptions
    /// tend to bury the merchant, so bank rows prefer the extracted merchant
    /// over the raw description; card rows are the other way around.
    pub fn raw_text(&self) -> &str {
        let preference: [&Option<String>; 3] = match self.source {
            Source::Card => [
                &self.description_clean,
                &self.description_raw,
                &self.merchant_raw,
            ],
            _ => [
                &self.description_clean,
                &self.merchant_raw,
                &self.description_raw,
            ],
        };
        preference
            .into_iter()
            .filter_map(|field| field.as_deref())
            .map(str::trim)
            .find(|text| !text.is_empty())
            .unwrap_or("")
    }
}

/// One row of the pre-existing ledger register, carrying the payee and
/// category hints harvested during pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub source_file: String,
    pub account_name: String,
    pub date: Option<NaiveDate>,
    pub outflow: Option<Amount>,
    pub inflow: Option<Amount>,
    pub payee_raw: String,
    pub category_raw: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> TransactionRecord {
        TransactionRecord {
            source: Source::Bank,
            source_file: "bank.csv".to_string(),
            account_name: "Checking".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 1, 15),
            outflow: Some(Amount::from_cents(2000)),
            inflow: Some(Amount::zero()),
            currency: HOME_CURRENCY.to_string(),
            txn_kind: TxnKind::DebitCard,
            description_raw: Some("raw".to_string()),
            merchant_raw: Some("merchant".to_string()),
            description_clean: None,
            description_clean_norm: String::new(),
            fingerprint: String::new(),
            fingerprint_hash: String::new(),
        }
    }

    #[test]
    fn direction_from_amounts() {
        let mut tx = record();
        assert_eq!(tx.direction(), Direction::Outflow);

        tx.outflow = Some(Amount::zero());
        tx.inflow = Some(Amount::from_cents(100));
        assert_eq!(tx.direction(), Direction::Inflow);

        tx.inflow = Some(Amount::zero());
        assert_eq!(tx.direction(), Direction::Zero);

        tx.outflow = None;
        tx.inflow = None;
        assert_eq!(tx.direction(), Direction::Zero);
    }

    #[test]
    fn bank_raw_text_prefers_merchant_over_description() {
        let tx = record();
        assert_eq!(tx.raw_text(), "merchant");
    }

    #[test]
    fn card_raw_text_prefers_description_over_merchant() {
        let mut tx = record();
        tx.source = Source::Card;
        assert_eq!(tx.raw_text(), "raw");
    }

    #[test]
    fn raw_text_skips_blank_fields() {
        let mut tx = record();
        tx.merchant_raw = Some("   ".to_string());
        assert_eq!(tx.raw_text(), "raw");
        tx.description_raw = None;
        assert_eq!(tx.raw_text(), "");
    }

    #[test]
    fn txn_kind_parse_is_total() {
        assert_eq!(TxnKind::parse("TRANSFER"), TxnKind::Transfer);
        assert_eq!(TxnKind::parse("  loan "), TxnKind::Loan);
        assert_eq!(TxnKind::parse("mystery"), TxnKind::Other);
        assert_eq!(TxnKind::parse(""), TxnKind::Other);
    }

    #[test]
    fn txn_kind_from_str_is_strict() {
        assert_eq!("TRANSFER".parse::<TxnKind>().unwrap(), TxnKind::Transfer);
        assert_eq!("other".parse::<TxnKind>().unwrap(), TxnKind::Other);
        assert!("cardpurchase".parse::<TxnKind>().is_err());
        assert!("".parse::<TxnKind>().is_err());
    }

    #[test]
    fn source_round_trip() {
        for source in [Source::Bank, Source::Card, Source::Ledger] {
            assert_eq!(source.as_str().parse::<Source>().unwrap(), source);
        }
        assert!("ynab".parse::<Source>().is_err());
    }
}
