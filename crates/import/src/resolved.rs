use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::Path;

use ledgermatch_core::TransactionRecord;
use ledgermatch_engine::resolve::{MappingRule, Resolution};
use serde::Serialize;

use crate::{ImportError, DATE_FORMAT};

/// Written explicitly so a zero-row table still carries its header.
const COLUMNS: [&str; 17] = [
    "source",
    "account_name",
    "date",
    "outflow_amount",
    "inflow_amount",
    "currency",
    "txn_kind",
    "description_clean_norm",
    "fingerprint",
    "fingerprint_hash",
    "payee_canonical_suggested",
    "category_target_suggested",
    "match_rule_id",
    "match_specificity_score",
    "match_status",
    "match_candidate_rule_ids",
    "match_rule_count",
];

/// Wire row for the resolved-transactions table: the transaction's matching
/// attributes plus the resolution verdict, one row per input transaction.
#[derive(Debug, Serialize)]
struct ResolvedRow {
    source: String,
    account_name: String,
    date: String,
    outflow_amount: String,
    inflow_amount: String,
    currency: String,
    txn_kind: String,
    description_clean_norm: String,
    fingerprint: String,
    fingerprint_hash: String,
    payee_canonical_suggested: String,
    category_target_suggested: String,
    match_rule_id: String,
    match_specificity_score: u32,
    match_status: String,
    match_candidate_rule_ids: String,
    match_rule_count: usize,
}

fn join_ids(rules: &[&MappingRule]) -> String {
    rules
        .iter()
        .map(|rule| rule.rule_id.as_str())
        .collect::<Vec<_>>()
        .join(";")
}

fn to_row(tx: &TransactionRecord, resolution: &Resolution<'_>) -> ResolvedRow {
    let (payee, category, rule_id, score, candidate_ids, rule_count) = match resolution {
        Resolution::Unique { winner, candidates } => (
            winner.payee_canonical.clone().unwrap_or_default(),
            winner.category_target.clone().unwrap_or_default(),
            winner.rule_id.clone(),
            winner.specificity(),
            join_ids(candidates),
            candidates.len(),
        ),
        Resolution::Ambiguous { tied, candidates } => (
            String::new(),
            String::new(),
            join_ids(tied),
            tied[0].specificity(),
            join_ids(candidates),
            candidates.len(),
        ),
        Resolution::Unmatched => (String::new(), String::new(), String::new(), 0, String::new(), 0),
    };

    ResolvedRow {
        source: tx.source.to_string(),
        account_name: tx.account_name.clone(),
        date: tx
            .date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
        outflow_amount: tx.outflow.map(|a| a.to_string()).unwrap_or_default(),
        inflow_amount: tx.inflow.map(|a| a.to_string()).unwrap_or_default(),
        currency: tx.currency.clone(),
        txn_kind: tx.txn_kind.to_string(),
        description_clean_norm: tx.description_clean_norm.clone(),
        fingerprint: tx.fingerprint.clone(),
        fingerprint_hash: tx.fingerprint_hash.clone(),
        payee_canonical_suggested: payee,
        category_target_suggested: category,
        match_rule_id: rule_id,
        match_specificity_score: score,
        match_status: resolution.status().to_string(),
        match_candidate_rule_ids: candidate_ids,
        match_rule_count: rule_count,
    }
}

pub fn write_resolved<W: Write>(
    writer: W,
    rows: &[(TransactionRecord, Resolution<'_>)],
) -> Result<(), ImportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(COLUMNS)?;
    for (tx, resolution) in rows {
        wtr.serialize(to_row(tx, resolution))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_resolved_file(
    path: &Path,
    rows: &[(TransactionRecord, Resolution<'_>)],
) -> Result<(), ImportError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    write_resolved(File::create(path)?, rows)
}
