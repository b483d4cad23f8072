use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessionFamily {
    BioProject,
    Study,
    BioSample,
    Sample,
    Experiment,
    Run,
    Analysis,
    Submission,
}

impl AccessionFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessionFamily::BioProject => "bioproject",
            AccessionFamily::Study => "study",
            AccessionFamily::BioSample => "biosample",
            AccessionFamily::Sample => "sample",
            AccessionFamily::Experiment => "experiment",
            AccessionFamily::Run => "run",
            AccessionFamily::Analysis => "analysis",
            AccessionFamily::Submission => "submission",
        }
    }
}

pub struct AccessionPattern {
    pub family: AccessionFamily,
    pub regex: Regex,
}

const PATTERN_SOURCES: [(AccessionFamily, &str); 8] = [
    (AccessionFamily::BioProject, r"(PRJ(E|D|N)[A-Z][0-9]{4,6})"),
    (AccessionFamily::Study, r"((E|D|S)RP[0-9]{6,})"),
    (AccessionFamily::BioSample, r"(SAM(E|D|N)[0-9]{8,})"),
    (AccessionFamily::Sample, r"((E|D|S)RS[0-9]{6,})"),
    (AccessionFamily::Experiment, r"((E|D|S)RX[0-9]{6,})"),
    (AccessionFamily::Run, r"((E|D|S)RR[0-9]{6,})"),
    (AccessionFamily::Analysis, r"((E|D|S)RZ[0-9]{6,})"),
    (AccessionFamily::Submission, r"((S|D)RA[0-9]{6,}(?:\.[0-9]+)?)"),
];

// Every pattern captures the full accession and the one-letter archive code.
static PATTERNS: LazyLock<Vec<AccessionPattern>> = LazyLock::new(|| {
    PATTERN_SOURCES
        .iter()
        .map(|(family, source)| AccessionPattern {
            family: *family,
            regex: Regex::new(source).unwrap(),
        })
        .collect()
});

pub fn accession_patterns() -> &'static [AccessionPattern] {
    &PATTERNS
}

pub fn database_name(code: char) -> Option<&'static str> {
    match code {
        'E' => Some("EMBL-EBI European Nucleotide Archive"),
        'D' => Some("NIG DNA Data Bank of Japan"),
        'S' | 'N' => Some("NCBI Sequence Read Archive"),
        _ => None,
    }
}
