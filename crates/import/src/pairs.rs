use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

use ledgermatch_core::Source;
use ledgermatch_engine::pairing::MatchedPair;
use serde::{Deserialize, Serialize};

use crate::{ImportError, DATE_FORMAT};

/// Column names are a contract with downstream review tooling; written
/// explicitly so a zero-row table still carries its header.
const COLUMNS: [&str; 14] = [
    "source_type",
    "source_file",
    "source_account",
    "ledger_file",
    "ledger_account",
    "date",
    "outflow_amount",
    "inflow_amount",
    "raw_text",
    "raw_norm",
    "fingerprint",
    "payee_raw",
    "category_raw",
    "ambiguous_key",
];

/// Wire row for the matched-pairs table; field order follows [`COLUMNS`].
#[derive(Debug, Serialize, Deserialize)]
struct PairRow {
    source_type: String,
    source_file: String,
    source_account: String,
    ledger_file: String,
    ledger_account: String,
    date: String,
    outflow_amount: String,
    inflow_amount: String,
    raw_text: String,
    raw_norm: String,
    fingerprint: String,
    payee_raw: String,
    category_raw: String,
    ambiguous_key: bool,
}

impl PairRow {
    fn from_pair(pair: &MatchedPair) -> Self {
        PairRow {
            source_type: pair.source_type.to_string(),
            source_file: pair.source_file.clone(),
            source_account: pair.source_account.clone(),
            ledger_file: pair.ledger_file.clone(),
            ledger_account: pair.ledger_account.clone(),
            date: pair.date.format(DATE_FORMAT).to_string(),
            outflow_amount: pair.outflow.to_string(),
            inflow_amount: pair.inflow.to_string(),
            raw_text: pair.raw_text.clone(),
            raw_norm: pair.raw_norm.clone(),
            fingerprint: pair.fingerprint.clone(),
            payee_raw: pair.payee_raw.clone(),
            category_raw: pair.category_raw.clone(),
            ambiguous_key: pair.ambiguous_key,
        }
    }
}

pub fn write_pairs<W: Write>(writer: W, pairs: &[MatchedPair]) -> Result<(), ImportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(COLUMNS)?;
    for pair in pairs {
        wtr.serialize(PairRow::from_pair(pair))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_pairs_file(path: &Path, pairs: &[MatchedPair]) -> Result<(), ImportError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    write_pairs(File::create(path)?, pairs)
}

pub fn read_pairs<R: Read>(reader: R) -> Result<Vec<MatchedPair>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut pairs = Vec::new();
    for (idx, row) in rdr.deserialize::<PairRow>().enumerate() {
        let row = row?;
        let line = idx + 2;
        let date =
            crate::field::parse_date(&row.date, line)?.ok_or(ImportError::InvalidDate {
                row: line,
                value: row.date.clone(),
            })?;
        let outflow = crate::field::parse_amount(&row.outflow_amount, line)?.ok_or(
            ImportError::InvalidAmount {
                row: line,
                value: row.outflow_amount.clone(),
            },
        )?;
        let inflow = crate::field::parse_amount(&row.inflow_amount, line)?.ok_or(
            ImportError::InvalidAmount {
                row: line,
                value: row.inflow_amount.clone(),
            },
        )?;
        pairs.push(MatchedPair {
            source_type: Source::from_str(&row.source_type).map_err(|_| {
                ImportError::InvalidSource {
                    row: line,
                    value: row.source_type.clone(),
                }
            })?,
            source_file: row.source_file,
            source_account: row.source_account,
            ledger_file: row.ledger_file,
            ledger_account: row.ledger_account,
            date,
            outflow,
            inflow,
            raw_text: row.raw_text,
            raw_norm: row.raw_norm,
            fingerprint: row.fingerprint,
            payee_raw: row.payee_raw,
            category_raw: row.category_raw,
            ambiguous_key: row.ambiguous_key,
        });
    }
    Ok(pairs)
}

pub fn read_pairs_file(path: &Path) -> Result<Vec<MatchedPair>, ImportError> {
    read_pairs(File::open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ledgermatch_core::Amount;

    fn pair() -> MatchedPair {
        MatchedPair {
            source_type: Source::Bank,
            source_file: "bank.csv".to_string(),
            source_account: "Checking".to_string(),
            ledger_file: "register.csv".to_string(),
            ledger_account: "Checking".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            outflow: Amount::from_cents(2050),
            inflow: Amount::zero(),
            raw_text: "SUPERMARKET 12".to_string(),
            raw_norm: "supermarket 12".to_string(),
            fingerprint: "supermarket".to_string(),
            payee_raw: "Supermarket".to_string(),
            category_raw: "Groceries".to_string(),
            ambiguous_key: false,
        }
    }

    #[test]
    fn header_columns_are_the_downstream_contract() {
        let mut buf = Vec::new();
        write_pairs(&mut buf, &[pair()]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "source_type,source_file,source_account,ledger_file,ledger_account,date,\
             outflow_amount,inflow_amount,raw_text,raw_norm,fingerprint,payee_raw,\
             category_raw,ambiguous_key"
        );
    }

    #[test]
    fn empty_table_still_carries_the_header() {
        let mut buf = Vec::new();
        write_pairs(&mut buf, &[]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("source_type,"), "{text}");
    }

    #[test]
    fn amounts_serialize_with_two_decimals() {
        let mut buf = Vec::new();
        write_pairs(&mut buf, &[pair()]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("2026-01-15,20.50,0.00"), "{text}");
    }

    #[test]
    fn round_trips_through_the_wire_format() {
        let original = vec![pair()];
        let mut buf = Vec::new();
        write_pairs(&mut buf, &original).unwrap();
        let reread = read_pairs(buf.as_slice()).unwrap();
        assert_eq!(reread, original);
    }

    #[test]
    fn write_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("derived/matched_pairs.csv");
        write_pairs_file(&path, &[pair()]).unwrap();
        let reread = read_pairs_file(&path).unwrap();
        assert_eq!(reread.len(), 1);
    }
}
