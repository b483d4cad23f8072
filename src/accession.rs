use std::collections::{BTreeSet, HashSet};

use crate::domain::AccessionTuple;
use crate::patterns::{accession_patterns, database_name};

pub const UNKNOWN_DATABASE: &str = "Unknown archive code";

// Deduplicated on the full tuple; pattern order first, then text position.
pub fn extract_accession_tuples(text: &str) -> Vec<AccessionTuple> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for pattern in accession_patterns() {
        for caps in pattern.regex.captures_iter(text) {
            let (Some(accession), Some(code)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let Some(code) = code.as_str().chars().next() else {
                continue;
            };
            let tuple = AccessionTuple::new(accession.as_str(), code);
            if seen.insert(tuple.clone()) {
                out.push(tuple);
            }
        }
    }
    out
}

pub fn accession_numbers(tuples: &[AccessionTuple]) -> Vec<String> {
    let mut seen = HashSet::new();
    tuples
        .iter()
        .filter(|tuple| seen.insert(tuple.accession.as_str()))
        .map(|tuple| tuple.accession.clone())
        .collect()
}

pub fn database_names(tuples: &[AccessionTuple]) -> Vec<String> {
    let codes: BTreeSet<char> = tuples.iter().map(|tuple| tuple.code).collect();
    let names: BTreeSet<String> = codes
        .into_iter()
        .map(|code| match database_name(code) {
            Some(name) => name.to_string(),
            None => format!("{UNKNOWN_DATABASE} ({code})"),
        })
        .collect();
    names.into_iter().collect()
}
