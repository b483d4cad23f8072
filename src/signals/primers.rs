use std::sync::LazyLock;

use regex::Regex;

// Ten or more nucleotide / IUPAC ambiguity letters. Any long upper-case run
// over this alphabet is reported.
static PRIMER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[AGCTNWVMH]{10,}").unwrap());

pub fn find_primers(text: &str) -> Vec<String> {
    PRIMER_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

pub fn join_primers(primers: &[String]) -> String {
    primers.join(", ")
}
