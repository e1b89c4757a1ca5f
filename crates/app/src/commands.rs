use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ledgermatch_engine::groups::GroupItem;
use ledgermatch_engine::resolve::Resolver;
use ledgermatch_engine::{build_groups as group, enrich, match_pairs as pair};
use tracing::info;

pub fn match_pairs(bank: &Path, card: &Path, ledger: &Path, out: &Path) -> Result<()> {
    let bank_records: Vec<_> = ledgermatch_import::read_transactions_file(bank)
        .with_context(|| format!("reading bank table {}", bank.display()))?
        .into_iter()
        .map(enrich)
        .collect();
    let card_records: Vec<_> = ledgermatch_import::read_transactions_file(card)
        .with_context(|| format!("reading card table {}", card.display()))?
        .into_iter()
        .map(enrich)
        .collect();
    let ledger_records = ledgermatch_import::read_ledger_file(ledger)
        .with_context(|| format!("reading ledger register {}", ledger.display()))?;

    let pairs = pair(&bank_records, &card_records, &ledger_records);
    ledgermatch_import::write_pairs_file(out, &pairs)?;
    info!(
        rows = pairs.len(),
        ambiguous = pairs.iter().filter(|p| p.ambiguous_key).count(),
        path = %out.display(),
        "wrote matched pairs"
    );
    Ok(())
}

pub fn resolve(
    transactions: &[PathBuf],
    rules: &Path,
    out: &Path,
    groups_out: Option<&Path>,
) -> Result<()> {
    let rule_table = ledgermatch_import::read_rules_file(rules)
        .with_context(|| format!("loading rule table {}", rules.display()))?;
    let resolver = Resolver::new(rule_table);
    info!(rules = resolver.rules().len(), "loaded active rules");

    let mut rows = Vec::new();
    for path in transactions {
        let records = ledgermatch_import::read_transactions_file(path)
            .with_context(|| format!("reading transaction table {}", path.display()))?;
        for record in records {
            let record = enrich(record);
            let resolution = resolver.resolve(&record);
            rows.push((record, resolution));
        }
    }

    ledgermatch_import::write_resolved_file(out, &rows)?;
    if let Some(path) = groups_out {
        let groups = group(
            rows.iter()
                .map(|(record, resolution)| GroupItem::from_resolved(record, resolution)),
        );
        ledgermatch_import::write_groups_file(path, &groups)?;
        info!(groups = groups.len(), path = %path.display(), "wrote hash groups");
    }
    let count = |status: &str| {
        rows.iter()
            .filter(|(_, r)| r.status() == status)
            .count()
    };
    info!(
        rows = rows.len(),
        unique = count("unique"),
        ambiguous = count("ambiguous"),
        unmatched = count("unmatched"),
        path = %out.display(),
        "wrote resolved transactions"
    );
    Ok(())
}

pub fn build_groups(pairs: &Path, out: &Path) -> Result<()> {
    let matched = ledgermatch_import::read_pairs_file(pairs)
        .with_context(|| format!("reading matched pairs {}", pairs.display()))?;
    let rows = group(matched.iter().map(GroupItem::from_pair));
    ledgermatch_import::write_groups_file(out, &rows)?;
    info!(groups = rows.len(), path = %out.display(), "wrote fingerprint groups");
    Ok(())
}
