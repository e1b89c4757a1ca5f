use ledgermatch_core::TxnKind;
use sha2::{Digest, Sha256};

use crate::normalize::normalize_text;

/// Token count kept by `fingerprint_v0`.
pub const FINGERPRINT_V0_TOKENS: usize = 6;

/// Hex characters kept by `fingerprint_hash_v1`.
pub const FINGERPRINT_HASH_V1_LEN: usize = 12;

/// Short review key: normalized text with standalone numeric tokens dropped,
/// truncated to the first few tokens so trailing order numbers and suffixes
/// collapse repeated merchants onto one key.
pub fn fingerprint_v0(text: &str) -> String {
    normalize_text(text)
        .split_whitespace()
        .filter(|token| !token.chars().all(char::is_numeric))
        .take(FINGERPRINT_V0_TOKENS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Primary rule-matching key: a stable digest over the transaction kind and
/// the normalized description, so identical text in a purchase and a transfer
/// never collapses onto one rule. The `v1` suffix is load-bearing: a future
/// algorithm must ship as `fingerprint_hash_v2` and coexist, never reinterpret
/// keys already persisted in the rule table.
pub fn fingerprint_hash_v1(txn_kind: TxnKind, text: &str) -> String {
    let payload = format!("{}\n{}", txn_kind.as_str(), normalize_text(text));
    let mut digest = hex::encode(Sha256::digest(payload.as_bytes()));
    digest.truncate(FINGERPRINT_HASH_V1_LEN);
    digest
}
