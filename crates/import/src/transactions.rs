use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use ledgermatch_core::{LedgerRecord, Source, TransactionRecord, TxnKind};
use serde::Deserialize;

use crate::field::{blank_to_none, parse_amount, parse_date};
use crate::ImportError;

/// Normalized transaction table as written by the source adapters.
#[derive(Debug, Deserialize)]
struct TransactionRow {
    source: String,
    #[serde(default)]
    account_name: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    outflow_amount: String,
    #[serde(default)]
    inflow_amount: String,
    #[serde(default)]
    currency: String,
    #[serde(default)]
    txn_kind: String,
    #[serde(default)]
    description_raw: String,
    #[serde(default)]
    merchant_raw: String,
    #[serde(default)]
    description_clean: String,
}

pub fn read_transactions<R: Read>(
    reader: R,
    source_file: &str,
) -> Result<Vec<TransactionRecord>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();
    for (idx, row) in rdr.deserialize::<TransactionRow>().enumerate() {
        let row = row?;
        let line = idx + 2; // row 1 is the header
        records.push(TransactionRecord {
            source: Source::from_str(&row.source)
                .map_err(|_| ImportError::InvalidSource {
                    row: line,
                    value: row.source.clone(),
                })?,
            source_file: source_file.to_string(),
            account_name: row.account_name,
            date: parse_date(&row.date, line)?,
            outflow: parse_amount(&row.outflow_amount, line)?,
            inflow: parse_amount(&row.inflow_amount, line)?,
            currency: row.currency,
            txn_kind: TxnKind::parse(&row.txn_kind),
            description_raw: blank_to_none(row.description_raw),
            merchant_raw: blank_to_none(row.merchant_raw),
            description_clean: blank_to_none(row.description_clean),
            description_clean_norm: String::new(),
            fingerprint: String::new(),
            fingerprint_hash: String::new(),
        });
    }
    Ok(records)
}

pub fn read_transactions_file(path: &Path) -> Result<Vec<TransactionRecord>, ImportError> {
    let file = File::open(path)?;
    read_transactions(file, &file_name(path))
}

/// Ledger register rows, the right-hand side of the pairing join.
#[derive(Debug, Deserialize)]
struct LedgerRow {
    #[serde(default)]
    account_name: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    outflow_amount: String,
    #[serde(default)]
    inflow_amount: String,
    #[serde(default)]
    payee_raw: String,
    #[serde(default)]
    category_raw: String,
}

pub fn read_ledger<R: Read>(
    reader: R,
    source_file: &str,
) -> Result<Vec<LedgerRecord>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();
    for (idx, row) in rdr.deserialize::<LedgerRow>().enumerate() {
        let row = row?;
        let line = idx + 2;
        records.push(LedgerRecord {
            source_file: source_file.to_string(),
            account_name: row.account_name,
            date: parse_date(&row.date, line)?,
            outflow: parse_amount(&row.outflow_amount, line)?,
            inflow: parse_amount(&row.inflow_amount, line)?,
            payee_raw: row.payee_raw,
            category_raw: row.category_raw,
        });
    }
    Ok(records)
}

pub fn read_ledger_file(path: &Path) -> Result<Vec<LedgerRecord>, ImportError> {
    let file = File::open(path)?;
    read_ledger(file, &file_name(path))
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ledgermatch_core::Amount;

    const HEADER: &str = "source,account_name,date,outflow_amount,inflow_amount,currency,txn_kind,description_raw,merchant_raw,description_clean\n";

    #[test]
    fn reads_a_full_row() {
        let data = format!(
            "{HEADER}bank,Checking,2026-01-15,20.50,0.00,ILS,debit_card,RAW TEXT,Merchant,Clean\n"
        );
        let records = read_transactions(data.as_bytes(), "bank.csv").unwrap();
        assert_eq!(records.len(), 1);
        let tx = &records[0];
        assert_eq!(tx.source, Source::Bank);
        assert_eq!(tx.source_file, "bank.csv");
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2026, 1, 15));
        assert_eq!(tx.outflow, Some(Amount::from_cents(2050)));
        assert_eq!(tx.inflow, Some(Amount::zero()));
        assert_eq!(tx.txn_kind, TxnKind::DebitCard);
        assert_eq!(tx.merchant_raw.as_deref(), Some("Merchant"));
        // Derived columns are left for enrichment.
        assert!(tx.fingerprint_hash.is_empty());
    }

    #[test]
    fn blank_cells_become_absent_values() {
        let data = format!("{HEADER}card,,,,,,,,,\n");
        let records = read_transactions(data.as_bytes(), "card.csv").unwrap();
        let tx = &records[0];
        assert_eq!(tx.date, None);
        assert_eq!(tx.outflow, None);
        assert_eq!(tx.inflow, None);
        assert_eq!(tx.txn_kind, TxnKind::Other);
        assert_eq!(tx.description_raw, None);
    }

    #[test]
    fn bad_date_is_a_batch_diagnostic() {
        let data = format!("{HEADER}bank,A,15/01/2026,1.00,0.00,,,,,\n");
        let err = read_transactions(data.as_bytes(), "bank.csv").unwrap_err();
        assert!(matches!(err, ImportError::InvalidDate { row: 2, .. }));
    }

    #[test]
    fn bad_amount_is_a_batch_diagnostic() {
        let data = format!("{HEADER}bank,A,2026-01-15,abc,0.00,,,,,\n");
        let err = read_transactions(data.as_bytes(), "bank.csv").unwrap_err();
        assert!(matches!(err, ImportError::InvalidAmount { row: 2, .. }));
    }

    #[test]
    fn unknown_source_is_rejected() {
        let data = format!("{HEADER}paypal,A,2026-01-15,1.00,0.00,,,,,\n");
        let err = read_transactions(data.as_bytes(), "x.csv").unwrap_err();
        assert!(matches!(err, ImportError::InvalidSource { row: 2, .. }));
    }

    #[test]
    fn reads_ledger_register() {
        let data = "account_name,date,outflow_amount,inflow_amount,payee_raw,category_raw\n\
                    Checking,2026-01-15,20.50,0.00,Supermarket,Groceries\n";
        let records = read_ledger(data.as_bytes(), "register.csv").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].payee_raw, "Supermarket");
        assert_eq!(records[0].category_raw, "Groceries");
        assert_eq!(records[0].outflow, Some(Amount::from_cents(2050)));
    }
}
