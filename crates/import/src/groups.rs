use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::Path;

use ledgermatch_engine::groups::GroupRow;
use serde::Serialize;

use crate::ImportError;

/// Written explicitly so a zero-row table still carries its header.
const COLUMNS: [&str; 6] = [
    "fingerprint",
    "count",
    "example_raw_text",
    "top_ynab_payees",
    "top_ynab_categories",
    "canonical_payee",
];

/// Wire row for the fingerprint-groups review table.
#[derive(Debug, Serialize)]
struct GroupRowOut<'a> {
    fingerprint: &'a str,
    count: usize,
    example_raw_text: &'a str,
    top_ynab_payees: &'a str,
    top_ynab_categories: &'a str,
    canonical_payee: &'a str,
}

pub fn write_groups<W: Write>(writer: W, rows: &[GroupRow]) -> Result<(), ImportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(COLUMNS)?;
    for row in rows {
        wtr.serialize(GroupRowOut {
            fingerprint: &row.key,
            count: row.count,
            example_raw_text: &row.example_raw_text,
            top_ynab_payees: &row.top_ynab_payees,
            top_ynab_categories: &row.top_ynab_categories,
            canonical_payee: &row.canonical_payee,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_groups_file(path: &Path, rows: &[GroupRow]) -> Result<(), ImportError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    write_groups(File::create(path)?, rows)
}
