use ledgermatch_core::{TransactionRecord, HOME_CURRENCY};

use crate::fingerprint::{fingerprint_hash_v1, fingerprint_v0};
use crate::normalize::normalize_text;

/// Fills the derived columns on a parsed record: default currency, the
/// canonical normalized description, the short fingerprint and the versioned
/// hash key. Idempotent, and the hash is always recomputed from the current
/// kind and normalized text so a stale value can never leak through.
pub fn enrich(mut tx: TransactionRecord) -> TransactionRecord {
    let currency = tx.currency.trim();
    tx.currency = if currency.is_empty() {
        HOME_CURRENCY.to_string()
    } else {
        currency.to_uppercase()
    };

    let basis = matching_text(&tx).to_string();
    tx.description_clean_norm = normalize_text(&basis);
    if tx.fingerprint.trim().is_empty() {
        tx.fingerprint = fingerprint_v0(&basis);
    }
    tx.fingerprint_hash = fingerprint_hash_v1(tx.txn_kind, &tx.description_clean_norm);
    tx
}

/// First non-blank text field, most-curated first.
fn matching_text(tx: &TransactionRecord) -> &str {
    [
        Some(tx.description_clean_norm.as_str()),
        tx.description_clean.as_deref(),
        tx.merchant_raw.as_deref(),
        tx.description_raw.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .find(|text| !text.is_empty())
    .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ledgermatch_core::{Amount, Source, TxnKind};

    fn record(clean: Option<&str>, merchant: Option<&str>, raw: Option<&str>) -> TransactionRecord {
        TransactionRecord {
            source: Source::Bank,
            source_file: "bank.csv".to_string(),
            account_name: "Checking".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 2, 1),
            outflow: Some(Amount::from_cents(1500)),
            inflow: Some(Amount::zero()),
            currency: String::new(),
            txn_kind: TxnKind::DebitCard,
            description_raw: raw.map(str::to_string),
            merchant_raw: merchant.map(str::to_string),
            description_clean: clean.map(str::to_string),
            description_clean_norm: String::new(),
            fingerprint: String::new(),
            fingerprint_hash: String::new(),
        }
    }

    #[test]
    fn defaults_blank_currency_to_home_currency() {
        let tx = enrich(record(Some("Cafe"), None, None));
        assert_eq!(tx.currency, HOME_CURRENCY);
    }

    #[test]
    fn uppercases_explicit_currency() {
        let mut tx = record(Some("Cafe"), None, None);
        tx.currency = "usd ".to_string();
        assert_eq!(enrich(tx).currency, "USD");
    }

    #[test]
    fn derives_normalized_text_from_most_curated_field() {
        let tx = enrich(record(Some("Super Deal #4411"), Some("ignored"), None));
        assert_eq!(tx.description_clean_norm, "super deal");
    }

    #[test]
    fn falls_back_through_text_fields() {
        let tx = enrich(record(None, None, Some("Some RAW text")));
        assert_eq!(tx.description_clean_norm, "some raw text");
    }

    #[test]
    fn fills_fingerprint_and_hash() {
        let tx = enrich(record(Some("Coffee #12"), None, None));
        assert_eq!(tx.description_clean_norm, "coffee 12");
        assert_eq!(tx.fingerprint, "coffee");
        assert_eq!(
            tx.fingerprint_hash,
            crate::fingerprint::fingerprint_hash_v1(TxnKind::DebitCard, "coffee 12")
        );
    }

    #[test]
    fn keeps_pre_existing_fingerprint() {
        let mut tx = record(Some("Coffee"), None, None);
        tx.fingerprint = "already set".to_string();
        assert_eq!(enrich(tx).fingerprint, "already set");
    }

    #[test]
    fn enrich_is_idempotent() {
        let once = enrich(record(Some("Coffee #12"), None, Some("x")));
        let twice = enrich(once.clone());
        assert_eq!(once, twice);
    }
}
