use mishmash::domain::Badge;
use mishmash::score::{MissingStep, score};
use mishmash::signals::SignalReport;
use mishmash::signals::code_links::{CodeLinkConfidence, PossibleReason};
use mishmash::signals::methods::{MethodHistogram, MethodWeights};

fn report() -> SignalReport {
    SignalReport {
        methods: MethodHistogram::default(),
        method_weights: None,
        primers: Vec::new(),
        non_insdc_database: None,
        code_link: CodeLinkConfidence::Absent,
    }
}

fn amplicon() -> Option<MethodWeights> {
    Some(MethodWeights {
        amplicon: 0.9,
        shotgun: 0.1,
    })
}

#[test]
fn nothing_found_is_none() {
    let verdict = score(0, &report());
    assert_eq!(verdict.badge, Badge::None);
    assert_eq!(verdict.missing_steps, vec![MissingStep::NoAccessions]);
    assert!(verdict.to_string().starts_with("None: No accessions or known-database references found"));
}

#[test]
fn undetermined_methodology_caps_at_bronze() {
    let mut signals = report();
    signals.primers = vec!["GTGCCAGCMGCCGCGGTAA".to_string()];
    signals.code_link = CodeLinkConfidence::Definite {
        urls: vec!["https://github.com/lab/code".to_string()],
    };
    let verdict = score(3, &signals);
    assert_eq!(verdict.badge, Badge::Bronze);
    assert_eq!(verdict.missing_steps, vec![MissingStep::MethodologyUndetermined]);
}

#[test]
fn amplicon_without_primers_stays_bronze() {
    let mut signals = report();
    signals.method_weights = amplicon();
    let verdict = score(3, &signals);
    assert_eq!(verdict.badge, Badge::Bronze);
    assert_eq!(verdict.missing_steps, vec![MissingStep::PrimersNotFound]);
}

#[test]
fn possible_link_is_not_enough_for_gold() {
    let mut signals = report();
    signals.method_weights = amplicon();
    signals.primers = vec!["GTGCCAGCMGCCGCGGTAA".to_string()];
    signals.code_link = CodeLinkConfidence::Possible {
        reason: PossibleReason::UrlFound,
    };
    let verdict = score(3, &signals);
    assert_eq!(verdict.badge, Badge::Silver);
    assert_eq!(verdict.missing_steps, vec![MissingStep::CodeLinkNotFound]);
}

#[test]
fn complete_amplicon_study_is_gold() {
    let mut signals = report();
    signals.method_weights = amplicon();
    signals.primers = vec!["GTGCCAGCMGCCGCGGTAA".to_string()];
    signals.code_link = CodeLinkConfidence::Definite {
        urls: vec!["https://github.com/lab/code".to_string()],
    };
    let verdict = score(3, &signals);
    assert_eq!(verdict.badge, Badge::Gold);
    assert!(verdict.missing_steps.is_empty());
    assert_eq!(verdict.to_string(), "Gold");
}

#[test]
fn non_insdc_hit_enters_bronze_without_records() {
    let mut signals = report();
    signals.non_insdc_database = Some("MG-RAST");
    let verdict = score(0, &signals);
    assert_eq!(verdict.badge, Badge::Bronze);
}
