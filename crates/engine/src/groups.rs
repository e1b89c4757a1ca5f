use std::collections::HashMap;

use ledgermatch_core::TransactionRecord;

use crate::pairing::MatchedPair;
use crate::resolve::Resolution;

/// Distinct hinted values rendered per group.
pub const TOP_HINTS: usize = 3;

/// One unit of aggregation input: a matching key plus the review text and
/// payee/category hints attached to it.
#[derive(Debug, Clone)]
pub struct GroupItem {
    pub key: String,
    pub raw_text: String,
    pub payee_hint: String,
    pub category_hint: String,
}

impl GroupItem {
    /// Pairs group on the short fingerprint and carry ledger-side hints.
    pub fn from_pair(pair: &MatchedPair) -> Self {
        GroupItem {
            key: pair.fingerprint.clone(),
            raw_text: pair.raw_text.clone(),
            payee_hint: pair.payee_raw.clone(),
            category_hint: pair.category_raw.clone(),
        }
    }

    /// Resolved transactions group on the hash key; only uniquely resolved
    /// rows contribute hints.
    pub fn from_resolved(tx: &TransactionRecord, resolution: &Resolution<'_>) -> Self {
        let (payee_hint, category_hint) = match resolution {
            Resolution::Unique { winner, .. } => (
                winner.payee_canonical.clone().unwrap_or_default(),
                winner.category_target.clone().unwrap_or_default(),
            ),
            _ => (String::new(), String::new()),
        };
        GroupItem {
            key: tx.fingerprint_hash.clone(),
            raw_text: tx.raw_text().to_string(),
            payee_hint,
            category_hint,
        }
    }
}

/// One review row per distinct key. `canonical_payee` stays blank for the
/// human curating the rule table.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    pub key: String,
    pub count: usize,
    pub example_raw_text: String,
    pub top_ynab_payees: String,
    pub top_ynab_categories: String,
    pub canonical_payee: String,
}

/// Aggregates items into review groups. Output is sorted by key, and all
/// tie-breaking inside a group is first-seen, so the same input always yields
/// byte-identical output.
pub fn build_groups(items: impl IntoIterator<Item = GroupItem>) -> Vec<GroupRow> {
    let mut groups: HashMap<String, GroupAccum> = HashMap::new();
    for item in items {
        let acc = groups.entry(item.key).or_default();
        acc.count += 1;
        acc.texts.add(&item.raw_text);
        acc.payees.add(&item.payee_hint);
        acc.categories.add(&item.category_hint);
    }

    let mut rows: Vec<GroupRow> = groups
        .into_iter()
        .map(|(key, acc)| GroupRow {
            key,
            count: acc.count,
            example_raw_text: acc.texts.most_common().unwrap_or_default(),
            top_ynab_payees: acc.payees.render_top(TOP_HINTS),
            top_ynab_categories: acc.categories.render_top(TOP_HINTS),
            canonical_payee: String::new(),
        })
        .collect();
    rows.sort_by(|a, b| a.key.cmp(&b.key));
    rows
}

#[derive(Default)]
struct GroupAccum {
    count: usize,
    texts: FrequencyTable,
    payees: FrequencyTable,
    categories: FrequencyTable,
}

/// Frequency counter that remembers first-seen order, so ties break
/// reproducibly instead of by hash-map iteration order. Blank values are
/// not counted at all.
#[derive(Default)]
struct FrequencyTable {
    index: HashMap<String, usize>,
    entries: Vec<(String, usize)>,
}

impl FrequencyTable {
    fn add(&mut self, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        if let Some(&slot) = self.index.get(value) {
            self.entries[slot].1 += 1;
        } else {
            self.index.insert(value.to_string(), self.entries.len());
            self.entries.push((value.to_string(), 1));
        }
    }

    fn most_common(&self) -> Option<String> {
        let mut best: Option<&(String, usize)> = None;
        for entry in &self.entries {
            // Strictly greater keeps the earlier entry on ties.
            match best {
                Some(b) if entry.1 <= b.1 => {}
                _ => best = Some(entry),
            }
        }
        best.map(|(text, _)| text.clone())
    }

    fn render_top(&self, limit: usize) -> String {
        let mut ranked = self.entries.clone();
        // Stable sort: equal counts stay in first-seen order.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
            .iter()
            .take(limit)
            .map(|(name, count)| format!("{name} ({count})"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
