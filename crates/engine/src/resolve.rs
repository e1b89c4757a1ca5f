use ledgermatch_core::{Direction, Source, TransactionRecord, TxnKind};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One row of the curated payee map. Every key column is independently
/// optional; a blank (None) cell is a wildcard that imposes no constraint.
/// A rule with all key columns blank matches everything — curation keeps
/// such rules at low priority, the engine does not police that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRule {
    pub rule_id: String,
    pub is_active: bool,
    pub priority: i32,
    pub txn_kind: Option<TxnKind>,
    pub fingerprint_hash: Option<String>,
    pub description_clean_norm: Option<String>,
    pub account_name: Option<String>,
    pub source: Option<Source>,
    pub direction: Option<Direction>,
    pub currency: Option<String>,
    pub payee_canonical: Option<String>,
    pub category_target: Option<String>,
    pub notes: Option<String>,
}

impl MappingRule {
    /// Number of non-wildcard key columns. When `fingerprint_hash` is set the
    /// textual `description_clean_norm` column is ignored: the hash is the
    /// authoritative discriminator and the text is an auditing convenience.
    pub fn specificity(&self) -> u32 {
        let mut score = u32::from(self.txn_kind.is_some())
            + u32::from(self.account_name.is_some())
            + u32::from(self.source.is_some())
            + u32::from(self.direction.is_some())
            + u32::from(self.currency.is_some());
        if self.fingerprint_hash.is_some() {
            score += 1;
        } else if self.description_clean_norm.is_some() {
            score += 1;
        }
        score
    }

    /// A candidate match: every non-blank key column equals the corresponding
    /// transaction attribute. Direction is derived from the amounts on the
    /// fly, it is never stored on the transaction.
    pub fn matches(&self, tx: &TransactionRecord) -> bool {
        if let Some(kind) = self.txn_kind {
            if kind != tx.txn_kind {
                return false;
            }
        }
        if let Some(hash) = &self.fingerprint_hash {
            if *hash != tx.fingerprint_hash {
                return false;
            }
        } else if let Some(text) = &self.description_clean_norm {
            if *text != tx.description_clean_norm {
                return false;
            }
        }
        if let Some(account) = &self.account_name {
            if *account != tx.account_name {
                return false;
            }
        }
        if let Some(source) = self.source {
            if source != tx.source {
                return false;
            }
        }
        if let Some(direction) = self.direction {
            if direction != tx.direction() {
                return false;
            }
        }
        if let Some(currency) = &self.currency {
            if *currency != tx.currency {
                return false;
            }
        }
        true
    }

    fn has_usable_payee(&self) -> bool {
        self.payee_canonical
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty())
    }
}

/// Outcome of resolving one transaction against the rule table. Callers must
/// handle all three variants; the engine never guesses among tied rules.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    /// A strict (priority, specificity) maximum exists.
    Unique {
        winner: &'a MappingRule,
        candidates: Vec<&'a MappingRule>,
    },
    /// Two or more top-ranked rules tie; `tied` is the full tied set in
    /// rule_id order so a reviewer sees every option.
    Ambiguous {
        tied: Vec<&'a MappingRule>,
        candidates: Vec<&'a MappingRule>,
    },
    Unmatched,
}

impl Resolution<'_> {
    pub fn status(&self) -> &'static str {
        match self {
            Resolution::Unique { .. } => "unique",
            Resolution::Ambiguous { .. } => "ambiguous",
            Resolution::Unmatched => "unmatched",
        }
    }
}

/// Deterministic inference engine over a snapshot of the rule table.
pub struct Resolver {
    rules: Vec<MappingRule>,
}

impl Resolver {
    /// Inactive rules are dropped before any matching. Rules without a usable
    /// canonical payee are a curation defect: excluded, warned about, never
    /// fatal to the batch.
    pub fn new(rules: Vec<MappingRule>) -> Self {
        let mut kept = Vec::with_capacity(rules.len());
        for rule in rules {
            if !rule.is_active {
                continue;
            }
            if !rule.has_usable_payee() {
                warn!(rule_id = %rule.rule_id, "rule has no payee_canonical; excluded from matching");
                continue;
            }
            kept.push(rule);
        }
        Resolver { rules: kept }
    }

    pub fn rules(&self) -> &[MappingRule] {
        &self.rules
    }

    /// Ranks candidates by priority desc, then specificity desc; rule_id
    /// ascending orders the output for reproducible presentation but never
    /// breaks a (priority, specificity) tie into a decision.
    pub fn resolve<'a>(&'a self, tx: &TransactionRecord) -> Resolution<'a> {
        let mut candidates: Vec<&MappingRule> =
            self.rules.iter().filter(|rule| rule.matches(tx)).collect();
        if candidates.is_empty() {
            return Resolution::Unmatched;
        }

        candidates.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.specificity().cmp(&a.specificity()))
                .then_with(|| a.rule_id.cmp(&b.rule_id))
        });

        let top = candidates[0];
        let tied: Vec<&MappingRule> = candidates
            .iter()
            .copied()
            .filter(|rule| {
                rule.priority == top.priority && rule.specificity() == top.specificity()
            })
            .collect();

        if tied.len() > 1 {
            Resolution::Ambiguous { tied, candidates }
        } else {
            Resolution::Unique {
                winner: top,
                candidates,
            }
        }
    }
}
