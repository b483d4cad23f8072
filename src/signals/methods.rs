use std::fmt;

use serde::Serialize;

const AMPLICON_WORDS: [&str; 6] = ["amplicon", "amplicons", "16s", "marker-gene", "its1", "its2"];
const AMPLICON_PHRASES: [[&str; 2]; 1] = [["marker", "gene"]];
const SHOTGUN_WORDS: [&str; 4] = ["metagenomic", "metagenomics", "shotgun", "whole-genome"];
const SHOTGUN_PHRASES: [[&str; 2]; 1] = [["whole", "genome"]];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MethodCategory {
    #[serde(rename = "amplicon_method")]
    Amplicon,
    #[serde(rename = "shotgun_method")]
    Shotgun,
    #[serde(rename = "both_methods")]
    Both,
    #[serde(rename = "no_method")]
    None,
}

impl MethodCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodCategory::Amplicon => "amplicon_method",
            MethodCategory::Shotgun => "shotgun_method",
            MethodCategory::Both => "both_methods",
            MethodCategory::None => "no_method",
        }
    }
}

fn mentions(words: &[String], singles: &[&str], phrases: &[[&str; 2]]) -> bool {
    words.iter().any(|word| singles.contains(&word.as_str()))
        || words.windows(2).any(|pair| {
            phrases
                .iter()
                .any(|phrase| pair[0] == phrase[0] && pair[1] == phrase[1])
        })
}

pub fn categorize_sentence(words: &[String]) -> MethodCategory {
    let amplicon = mentions(words, &AMPLICON_WORDS, &AMPLICON_PHRASES);
    let shotgun = mentions(words, &SHOTGUN_WORDS, &SHOTGUN_PHRASES);
    match (amplicon, shotgun) {
        (true, false) => MethodCategory::Amplicon,
        (false, true) => MethodCategory::Shotgun,
        (true, true) => MethodCategory::Both,
        (false, false) => MethodCategory::None,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MethodHistogram {
    pub amplicon: usize,
    pub shotgun: usize,
    pub both: usize,
    pub none: usize,
}

impl MethodHistogram {
    pub fn from_sentences(sentences: &[Vec<String>]) -> Self {
        let mut histogram = Self::default();
        for sentence in sentences {
            histogram.record(categorize_sentence(sentence));
        }
        histogram
    }

    pub fn record(&mut self, category: MethodCategory) {
        match category {
            MethodCategory::Amplicon => self.amplicon += 1,
            MethodCategory::Shotgun => self.shotgun += 1,
            MethodCategory::Both => self.both += 1,
            MethodCategory::None => self.none += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.amplicon + self.shotgun + self.both + self.none
    }

    // Sentences mentioning both approaches count half for each.
    pub fn weights(&self) -> Option<MethodWeights> {
        let informative = self.total() - self.none;
        if informative == 0 {
            return None;
        }
        let informative = informative as f64;
        let half_both = self.both as f64 / 2.0;
        Some(MethodWeights {
            amplicon: round2((self.amplicon as f64 + half_both) / informative),
            shotgun: round2((self.shotgun as f64 + half_both) / informative),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MethodWeights {
    pub amplicon: f64,
    pub shotgun: f64,
}

impl MethodWeights {
    pub fn favors_amplicon(&self) -> bool {
        self.amplicon > self.shotgun
    }
}

impl fmt::Display for MethodWeights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "amplicon: {}, shotgun: {}", self.amplicon, self.shotgun)
    }
}

// Ties go to the even hundredth: 0.125 is 0.12, 0.875 is 0.88.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
