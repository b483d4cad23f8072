use std::fmt;

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::domain::Badge;
use crate::signals::SignalReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingStep {
    NoAccessions,
    MethodologyUndetermined,
    PrimersNotFound,
    CodeLinkNotFound,
}

impl MissingStep {
    pub fn message(&self) -> &'static str {
        match self {
            MissingStep::NoAccessions => {
                "No accessions or known-database references found: INSDC accession numbers \
                 with corresponding Run IDs could not be found! May require manual review."
            }
            MissingStep::MethodologyUndetermined => {
                "Methodology undetermined: text does not clearly denote whether an amplicon \
                 or shotgun sequencing paper! May require manual review."
            }
            MissingStep::PrimersNotFound => {
                "Primer sequences not found! May require manual review."
            }
            MissingStep::CodeLinkNotFound => {
                "Link to code repository could not be found! May require manual review."
            }
        }
    }
}

impl fmt::Display for MissingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceVerdict {
    pub badge: Badge,
    pub missing_steps: Vec<MissingStep>,
}

impl fmt::Display for ComplianceVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.badge)?;
        if self.missing_steps.is_empty() {
            return Ok(());
        }
        f.write_str(":")?;
        for step in &self.missing_steps {
            write!(f, " {step}")?;
        }
        Ok(())
    }
}

impl Serialize for ComplianceVerdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub fn score(record_count: u64, signals: &SignalReport) -> ComplianceVerdict {
    let mut missing_steps = Vec::new();

    if record_count == 0 && signals.non_insdc_database.is_none() {
        missing_steps.push(MissingStep::NoAccessions);
        return verdict(Badge::None, missing_steps);
    }

    let Some(weights) = signals.method_weights else {
        missing_steps.push(MissingStep::MethodologyUndetermined);
        return verdict(Badge::Bronze, missing_steps);
    };

    if weights.favors_amplicon() && signals.primers.is_empty() {
        missing_steps.push(MissingStep::PrimersNotFound);
        return verdict(Badge::Bronze, missing_steps);
    }

    if !signals.code_link.is_definite() {
        missing_steps.push(MissingStep::CodeLinkNotFound);
        return verdict(Badge::Silver, missing_steps);
    }

    verdict(Badge::Gold, missing_steps)
}

fn verdict(badge: Badge, missing_steps: Vec<MissingStep>) -> ComplianceVerdict {
    debug!(%badge, missing = missing_steps.len(), "scored article");
    ComplianceVerdict {
        badge,
        missing_steps,
    }
}
