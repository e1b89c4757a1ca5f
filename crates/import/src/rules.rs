use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use ledgermatch_core::{Direction, Source, TxnKind};
use ledgermatch_engine::normalize::normalize_text;
use ledgermatch_engine::resolve::MappingRule;
use serde::Deserialize;

use crate::field::blank_to_none;
use crate::ImportError;

const TRUE_VALUES: [&str; 5] = ["1", "true", "t", "yes", "y"];
const FALSE_VALUES: [&str; 5] = ["0", "false", "f", "no", "n"];

/// Raw rule-table row; everything is text until normalization.
#[derive(Debug, Deserialize)]
struct RuleRow {
    #[serde(default)]
    rule_id: String,
    #[serde(default)]
    is_active: String,
    #[serde(default)]
    priority: String,
    #[serde(default)]
    txn_kind: String,
    #[serde(default)]
    fingerprint_hash: String,
    #[serde(default)]
    description_clean_norm: String,
    #[serde(default)]
    account_name: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    direction: String,
    #[serde(default)]
    currency: String,
    #[serde(default)]
    payee_canonical: String,
    #[serde(default)]
    category_target: String,
    #[serde(default)]
    notes: String,
}

/// Loads and normalizes the payee map. Structural defects (empty or duplicate
/// rule_ids, unparseable flags) abort the load; semantic defects like a
/// missing payee are left for the resolver to exclude and warn about.
pub fn read_rules<R: Read>(reader: R) -> Result<Vec<MappingRule>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rules = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();
    for (idx, row) in rdr.deserialize::<RuleRow>().enumerate() {
        let row = row?;
        let line = idx + 2;

        let rule_id = row.rule_id.trim().to_string();
        if rule_id.is_empty() {
            return Err(ImportError::EmptyRuleId { row: line });
        }
        if !seen_ids.insert(rule_id.clone()) {
            return Err(ImportError::DuplicateRuleId(rule_id));
        }

        let source = match blank_to_none(row.source) {
            Some(value) => {
                Some(
                    Source::from_str(&value).map_err(|_| ImportError::InvalidRuleSource {
                        rule_id: rule_id.clone(),
                        value,
                    })?,
                )
            }
            None => None,
        };
        // Unlike transaction rows, a typo'd kind in the curated table must
        // not degrade to a wildcard-ish `other`; fail the load instead.
        let txn_kind = match blank_to_none(row.txn_kind) {
            Some(value) => Some(TxnKind::from_str(&value).map_err(|_| {
                ImportError::InvalidRuleKind {
                    rule_id: rule_id.clone(),
                    value,
                }
            })?),
            None => None,
        };
        let direction = match blank_to_none(row.direction) {
            Some(value) => Some(Direction::from_str(&value).map_err(|_| {
                ImportError::InvalidDirection {
                    rule_id: rule_id.clone(),
                    value,
                }
            })?),
            None => None,
        };

        rules.push(MappingRule {
            is_active: parse_is_active(&row.is_active, &rule_id)?,
            priority: parse_priority(&row.priority, &rule_id)?,
            txn_kind,
            fingerprint_hash: blank_to_none(row.fingerprint_hash).map(|v| v.to_lowercase()),
            description_clean_norm: blank_to_none(row.description_clean_norm)
                .map(|v| normalize_text(&v)),
            account_name: blank_to_none(row.account_name),
            source,
            direction,
            currency: blank_to_none(row.currency).map(|v| v.to_uppercase()),
            payee_canonical: blank_to_none(row.payee_canonical),
            category_target: blank_to_none(row.category_target),
            notes: blank_to_none(row.notes),
            rule_id,
        });
    }
    Ok(rules)
}

pub fn read_rules_file(path: &Path) -> Result<Vec<MappingRule>, ImportError> {
    let file = File::open(path)?;
    read_rules(file)
}

/// Blank means active; anything outside the accepted token sets is a
/// curation typo worth failing loudly on.
fn parse_is_active(value: &str, rule_id: &str) -> Result<bool, ImportError> {
    let lowered = value.trim().to_lowercase();
    if lowered.is_empty() || TRUE_VALUES.contains(&lowered.as_str()) {
        return Ok(true);
    }
    if FALSE_VALUES.contains(&lowered.as_str()) {
        return Ok(false);
    }
    Err(ImportError::InvalidIsActive {
        rule_id: rule_id.to_string(),
        value: value.to_string(),
    })
}

fn parse_priority(value: &str, rule_id: &str) -> Result<i32, ImportError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse::<i32>()
        .map_err(|_| ImportError::InvalidPriority {
            rule_id: rule_id.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "rule_id,is_active,priority,txn_kind,fingerprint_hash,description_clean_norm,account_name,source,direction,currency,payee_canonical,category_target,notes\n";

    #[test]
    fn blank_key_cells_become_wildcards() {
        let data = format!("{HEADER}r1,,,,,,,,,,Cafe,,\n");
        let rules = read_rules(data.as_bytes()).unwrap();
        let rule = &rules[0];
        assert!(rule.is_active);
        assert_eq!(rule.priority, 0);
        assert_eq!(rule.specificity(), 0);
        assert_eq!(rule.payee_canonical.as_deref(), Some("Cafe"));
        assert_eq!(rule.category_target, None);
    }

    #[test]
    fn key_cells_are_normalized_on_load() {
        let data =
            format!("{HEADER}r1,TRUE,5,TRANSFER,ABC123DEF456,Coffee SHOP!,Acct,BANK,Outflow,ils,Cafe,Eating Out,note\n");
        let rules = read_rules(data.as_bytes()).unwrap();
        let rule = &rules[0];
        assert_eq!(rule.txn_kind, Some(TxnKind::Transfer));
        assert_eq!(rule.fingerprint_hash.as_deref(), Some("abc123def456"));
        assert_eq!(rule.description_clean_norm.as_deref(), Some("coffee shop"));
        assert_eq!(rule.source, Some(Source::Bank));
        assert_eq!(rule.direction, Some(Direction::Outflow));
        assert_eq!(rule.currency.as_deref(), Some("ILS"));
        assert_eq!(rule.priority, 5);
        assert_eq!(rule.notes.as_deref(), Some("note"));
    }

    #[test]
    fn is_active_token_sets() {
        for (token, expected) in [("y", true), ("1", true), ("no", false), ("F", false), ("", true)] {
            let data = format!("{HEADER}r1,{token},,,,,,,,,Cafe,,\n");
            let rules = read_rules(data.as_bytes()).unwrap();
            assert_eq!(rules[0].is_active, expected, "token {token:?}");
        }
        let data = format!("{HEADER}r1,maybe,,,,,,,,,Cafe,,\n");
        assert!(matches!(
            read_rules(data.as_bytes()).unwrap_err(),
            ImportError::InvalidIsActive { .. }
        ));
    }

    #[test]
    fn empty_rule_id_is_rejected() {
        let data = format!("{HEADER},,,,,,,,,,Cafe,,\n");
        assert!(matches!(
            read_rules(data.as_bytes()).unwrap_err(),
            ImportError::EmptyRuleId { row: 2 }
        ));
    }

    #[test]
    fn duplicate_rule_id_is_rejected() {
        let data = format!("{HEADER}r1,,,,,,,,,,Cafe,,\nr1,,,,,,,,,,Bar,,\n");
        match read_rules(data.as_bytes()).unwrap_err() {
            ImportError::DuplicateRuleId(id) => assert_eq!(id, "r1"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_priority_and_direction_are_rejected() {
        let data = format!("{HEADER}r1,,high,,,,,,,,Cafe,,\n");
        assert!(matches!(
            read_rules(data.as_bytes()).unwrap_err(),
            ImportError::InvalidPriority { .. }
        ));

        let data = format!("{HEADER}r1,,,,,,,,sideways,,Cafe,,\n");
        assert!(matches!(
            read_rules(data.as_bytes()).unwrap_err(),
            ImportError::InvalidDirection { .. }
        ));
    }

    #[test]
    fn unknown_rule_kind_is_rejected_not_coerced() {
        let data = format!("{HEADER}r1,,,cardpurchase,,,,,,,Cafe,,\n");
        match read_rules(data.as_bytes()).unwrap_err() {
            ImportError::InvalidRuleKind { rule_id, value } => {
                assert_eq!(rule_id, "r1");
                assert_eq!(value, "cardpurchase");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_payee_loads_but_stays_none() {
        // Not a load error; the resolver excludes it later.
        let data = format!("{HEADER}r1,,,transfer,,,,,,,,,\n");
        let rules = read_rules(data.as_bytes()).unwrap();
        assert_eq!(rules[0].payee_canonical, None);
    }
}
