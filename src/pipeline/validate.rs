//! Pre-flight validation: duplicate codes and document completeness.
//!
//! Both checks run before any label is composed, so a strict run either
//! produces a complete bundle or produces nothing. Each check reports
//! every offender in aggregate rather than failing on the first one.

use crate::config::DuplicatePolicy;
use crate::error::StamperError;
use crate::record::Record;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Enforce the configured duplicate-code policy.
///
/// `Reject` treats the code as a declared unique key and aborts with
/// every duplicated code listed (sorted). `LastWins` only logs: later
/// rows overwrite earlier rows' outputs during stamping.
pub fn check_duplicates(
    records: &[Record],
    policy: DuplicatePolicy,
) -> Result<(), StamperError> {
    let mut seen = BTreeSet::new();
    let mut duplicated = BTreeSet::new();
    for r in records {
        if !seen.insert(r.code.as_str()) {
            duplicated.insert(r.code.clone());
        }
    }

    if duplicated.is_empty() {
        return Ok(());
    }

    match policy {
        DuplicatePolicy::Reject => Err(StamperError::DuplicateCodes {
            codes: duplicated.into_iter().collect(),
        }),
        DuplicatePolicy::LastWins => {
            debug!(
                "Duplicate code(s) {:?}: last occurrence wins",
                duplicated
            );
            Ok(())
        }
    }
}

/// Expected layout names with no supplied document, sorted, deduplicated.
///
/// `expected = {{ code ++ " Layout.pdf" }}` compared against the
/// supplied name set; exact, case-sensitive string match.
pub fn missing_documents(
    records: &[Record],
    documents: &BTreeMap<String, Vec<u8>>,
) -> Vec<String> {
    let missing: BTreeSet<String> = records
        .iter()
        .map(Record::layout_name)
        .filter(|name| !documents.contains_key(name))
        .collect();
    missing.into_iter().collect()
}
