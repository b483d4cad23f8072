use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MishmashError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PmcId(u64);

impl PmcId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PmcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PmcId {
    type Err = MishmashError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let digits = trimmed
            .strip_prefix("PMC")
            .or_else(|| trimmed.strip_prefix("pmc"))
            .unwrap_or(trimmed);
        // spreadsheet exports often render integer ids as floats
        let digits = digits.strip_suffix(".0").unwrap_or(digits);
        if digits.is_empty() || !digits.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(MishmashError::InvalidPmcId(value.to_string()));
        }
        digits
            .parse::<u64>()
            .map(Self)
            .map_err(|_| MishmashError::InvalidPmcId(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccessionTuple {
    pub accession: String,
    pub code: char,
}

impl AccessionTuple {
    pub fn new(accession: impl Into<String>, code: char) -> Self {
        Self {
            accession: accession.into(),
            code,
        }
    }
}

impl fmt::Display for AccessionTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.accession, self.code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Badge {
    None,
    Bronze,
    Silver,
    Gold,
}

impl Badge {
    pub fn as_str(&self) -> &'static str {
        match self {
            Badge::None => "None",
            Badge::Bronze => "Bronze",
            Badge::Silver => "Silver",
            Badge::Gold => "Gold",
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
