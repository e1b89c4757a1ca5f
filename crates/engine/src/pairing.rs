use std::collections::HashMap;

use chrono::NaiveDate;
use ledgermatch_core::{Amount, LedgerRecord, Source, TransactionRecord};
use tracing::debug;

use crate::fingerprint::fingerprint_v0;
use crate::normalize::normalize_text;

/// Exact composite join key. A record missing any component produces no key
/// and simply cannot pair; that is a skip, not an error.
type PairKey = (NaiveDate, Amount, Amount);

/// One bank/card record linked to one ledger record of the same economic
/// event, with full provenance for review.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedPair {
    pub source_type: Source,
    pub source_file: String,
    pub source_account: String,
    pub ledger_file: String,
    pub ledger_account: String,
    pub date: NaiveDate,
    pub outflow: Amount,
    pub inflow: Amount,
    pub raw_text: String,
    pub raw_norm: String,
    pub fingerprint: String,
    pub payee_raw: String,
    pub category_raw: String,
    pub ambiguous_key: bool,
}

/// Inner-joins bank and card records against the ledger register on
/// `(date, outflow, inflow)`, keeping every cross-product row. Keys that
/// yield more than one pair are flagged ambiguous rather than thinned out:
/// a missed link poisons the import, a flagged duplicate only costs a human
/// a second look.
pub fn match_pairs(
    bank: &[TransactionRecord],
    card: &[TransactionRecord],
    ledger: &[LedgerRecord],
) -> Vec<MatchedPair> {
    let mut ledger_index: HashMap<PairKey, Vec<&LedgerRecord>> = HashMap::new();
    let mut skipped_ledger = 0usize;
    for rec in ledger {
        match ledger_key(rec) {
            Some(key) => ledger_index.entry(key).or_default().push(rec),
            None => skipped_ledger += 1,
        }
    }

    let mut pairs = Vec::new();
    let mut unmatched = 0usize;
    let mut skipped_source = 0usize;
    for tx in bank.iter().chain(card.iter()) {
        let Some(key) = record_key(tx) else {
            skipped_source += 1;
            continue;
        };
        let Some(hits) = ledger_index.get(&key) else {
            unmatched += 1;
            continue;
        };
        for ledger_rec in hits {
            pairs.push(make_pair(tx, ledger_rec, key));
        }
    }

    let mut key_counts: HashMap<PairKey, usize> = HashMap::new();
    for pair in &pairs {
        *key_counts
            .entry((pair.date, pair.outflow, pair.inflow))
            .or_insert(0) += 1;
    }
    for pair in &mut pairs {
        pair.ambiguous_key = key_counts[&(pair.date, pair.outflow, pair.inflow)] > 1;
    }

    debug!(
        pairs = pairs.len(),
        unmatched, skipped_source, skipped_ledger, "pair join complete"
    );
    pairs
}

fn record_key(tx: &TransactionRecord) -> Option<PairKey> {
    Some((tx.date?, tx.outflow?, tx.inflow?))
}

fn ledger_key(rec: &LedgerRecord) -> Option<PairKey> {
    Some((rec.date?, rec.outflow?, rec.inflow?))
}

fn make_pair(tx: &TransactionRecord, ledger: &LedgerRecord, key: PairKey) -> MatchedPair {
    let raw_text = tx.raw_text().to_string();
    let raw_norm = normalize_text(&raw_text);
    let fingerprint = fingerprint_v0(&raw_text);
    let (date, outflow, inflow) = key;
    MatchedPair {
        source_type: tx.source,
        source_file: tx.source_file.clone(),
        source_account: tx.account_name.clone(),
        ledger_file: ledger.source_file.clone(),
        ledger_account: ledger.account_name.clone(),
        date,
        outflow,
        inflow,
        raw_text,
        raw_norm,
        fingerprint,
        payee_raw: ledger.payee_raw.clone(),
        category_raw: ledger.category_raw.clone(),
        ambiguous_key: false,
    }
}
