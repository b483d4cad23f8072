use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

const FIGSHARE: &str = "Figshare";
const EGA: &str = "European Genome-phenome Archive";
const NGDC: &str = "China National Center for Bioinformation: National Genomics Data Center";
const GSA: &str = "China National Center for Bioinformation: Genome Sequence Archive";
const CNCB: &str = "China National Center for Bioinformation";
const MG_RAST: &str = "MG-RAST";
const CNSA: &str = "China National GeneBank Database Sequence Archive";

const DATABASE_NAMES: [(&str, &str); 17] = [
    ("figshare", FIGSHARE),
    ("ega", EGA),
    ("european genome-phenome archive", EGA),
    ("european phenome-genome archive", EGA),
    ("national genomics data center", NGDC),
    ("ngdc", NGDC),
    ("gsa", GSA),
    ("genome sequence archive", GSA),
    ("china national center for bioinformation", CNCB),
    ("cncb", CNCB),
    ("mg-rast", MG_RAST),
    ("metagenomic rapid annotations using subsystems technology", MG_RAST),
    ("metagenomics rast", MG_RAST),
    ("cnsa", CNSA),
    ("cngb sequence archive", CNSA),
    ("cngbdb", CNSA),
    ("china national genebank database", CNSA),
];

const URL_CUES: [&str; 6] = [
    "figshare.com",
    "ega-archive.org",
    "ngdc.cncb.ac.cn/gsa",
    "mg-rast.org",
    "metagenomics.anl.gov",
    "db.cngb.org/cnsa",
];

const PREPOSITION_CUES: [&str; 10] = [
    "found in",
    "found at",
    "deposited in",
    "deposited into",
    "deposited on",
    "accessible at",
    "available in",
    "available from",
    "available on",
    "available at",
];

// already regex fragments
const ACCESSION_CUES: [&str; 9] = [
    r"accession numbers?(?:\(s\))?",
    r"accession ids?",
    r"project ids?",
    r"project access numbers?",
    r"id numbers",
    r"cra[0-9]{6}",
    r"cnp[0-9]{6}",
    r"[0-9]{7}\.[0-9]",
    r"mgp[0-9]{5}",
];

fn bounded(fragment: &str) -> Regex {
    Regex::new(&format!(r"(?i)(?:\A|\W)(?:{fragment})(?:\W|\z)")).unwrap()
}

static DATABASE_RES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    DATABASE_NAMES
        .iter()
        .map(|(name, canonical)| (bounded(&regex::escape(name)), *canonical))
        .collect()
});

static CUE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    URL_CUES
        .iter()
        .chain(PREPOSITION_CUES.iter())
        .map(|cue| bounded(&regex::escape(cue)))
        .chain(ACCESSION_CUES.iter().map(|cue| bounded(cue)))
        .collect()
});

pub fn database_mentions(sentences: &[&str]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for (re, canonical) in DATABASE_RES.iter() {
        let hits = sentences.iter().filter(|s| re.is_match(s)).count();
        if hits > 0 {
            *counts.entry(*canonical).or_insert(0) += hits;
        }
    }
    counts
}

pub fn cue_mentions(sentences: &[&str]) -> usize {
    CUE_RES
        .iter()
        .map(|re| sentences.iter().filter(|s| re.is_match(s)).count())
        .sum()
}

// A name only counts when the article also shows a deposition cue. Ties go to
// the alphabetically first display name.
pub fn detect_non_insdc_database(sentences: &[&str]) -> Option<&'static str> {
    let mentions = database_mentions(sentences);
    if mentions.is_empty() || cue_mentions(sentences) == 0 {
        return None;
    }
    mentions
        .into_iter()
        .max_by(|(name_a, count_a), (name_b, count_b)| {
            count_a.cmp(count_b).then_with(|| name_b.cmp(name_a))
        })
        .map(|(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_mention_is_not_a_hit() {
        let sentences = ["Figures were prepared and shared on figshare by a colleague"];
        assert_eq!(detect_non_insdc_database(&sentences), None);
    }

    #[test]
    fn mention_with_cue_is_a_hit() {
        let sentences = [
            "Raw reads were deposited in the Genome Sequence Archive.",
            "See GSA for details.",
            "Figshare hosts the figures.",
        ];
        assert_eq!(detect_non_insdc_database(&sentences), Some(GSA));
    }

    #[test]
    fn names_match_whole_words_only() {
        let sentences = ["The omega subunit was deposited in a freezer."];
        assert_eq!(detect_non_insdc_database(&sentences), None);
    }

    #[test]
    fn ties_break_alphabetically() {
        let sentences = ["Data are available at MG-RAST and figshare."];
        assert_eq!(detect_non_insdc_database(&sentences), Some(FIGSHARE));
    }
}
