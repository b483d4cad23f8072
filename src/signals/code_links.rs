use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use url::Url;

pub const REPOSITORY_HOSTS: [&str; 6] = [
    "github", "gitlab", "zenodo", "bitbucket", "figshare", "codeocean",
];

const REPOSITORY_WORDS: [&str; 6] = [
    "github", "gitlab", "zenodo", "bitbucket", "figshare", "codeocean",
];

// Tools, licences and reference sites cited in methods sections.
pub const DEFAULT_EXCLUDED_URLS: [&str; 20] = [
    "creativecommons.org",
    "ncbi.nlm.nih.gov",
    "ebi.ac.uk",
    "ddbj.nig.ac.jp",
    "doi.org",
    "qiime2.org",
    "qiime.org",
    "github.com/qiime2",
    "github.com/biocore",
    "github.com/benjjneb/dada2",
    "benjjneb.github.io/dada2",
    "github.com/torognes/vsearch",
    "github.com/lh3",
    "bioconductor.org",
    "r-project.org",
    "mothur.org",
    "arb-silva.de",
    "drive5.com",
    "usadellab.org",
    "bioinformatics.babraham.ac.uk",
];

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PossibleReason {
    UrlFound,
    RepositoryKeyword,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "confidence", rename_all = "snake_case")]
pub enum CodeLinkConfidence {
    Definite { urls: Vec<String> },
    Possible { reason: PossibleReason },
    Absent,
}

impl CodeLinkConfidence {
    pub fn is_definite(&self) -> bool {
        matches!(self, CodeLinkConfidence::Definite { .. })
    }

    pub fn urls(&self) -> &[String] {
        match self {
            CodeLinkConfidence::Definite { urls } => urls,
            _ => &[],
        }
    }
}

impl fmt::Display for CodeLinkConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeLinkConfidence::Definite { .. } => f.write_str("True"),
            CodeLinkConfidence::Possible {
                reason: PossibleReason::UrlFound,
            } => f.write_str("Possible: URL found in paper."),
            CodeLinkConfidence::Possible {
                reason: PossibleReason::RepositoryKeyword,
            } => f.write_str("Possible: Repository keywords found in paper."),
            CodeLinkConfidence::Absent => f.write_str("False"),
        }
    }
}

pub fn extract_urls(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    URL_RE
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches([',', '.', ';', ':', ')', ']']))
        .filter(|url| seen.insert(*url))
        .map(str::to_string)
        .collect()
}

fn is_repository_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.to_lowercase();
    REPOSITORY_HOSTS.iter().any(|repo| host.contains(repo))
}

fn mentions_repository(sentences: &[Vec<String>]) -> bool {
    sentences.iter().any(|words| {
        words
            .iter()
            .any(|word| REPOSITORY_WORDS.contains(&word.as_str()))
            || words
                .windows(2)
                .any(|pair| pair[0] == "code" && pair[1] == "ocean")
    })
}

#[derive(Debug, Clone)]
pub struct CodeLinkDetector {
    excluded: Vec<String>,
}

impl Default for CodeLinkDetector {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_URLS.iter().map(|s| s.to_string()))
    }
}

impl CodeLinkDetector {
    pub fn new<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            excluded: excluded
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn is_excluded(&self, url: &str) -> bool {
        let lower = url.to_lowercase();
        self.excluded.iter().any(|excl| lower.contains(excl.as_str()))
    }

    pub fn detect(&self, text: &str, sentences: &[Vec<String>]) -> CodeLinkConfidence {
        let candidates: Vec<String> = extract_urls(text)
            .into_iter()
            .filter(|url| !self.is_excluded(url))
            .collect();

        let repository: Vec<String> = candidates
            .iter()
            .filter(|url| is_repository_url(url))
            .cloned()
            .collect();
        if !repository.is_empty() {
            return CodeLinkConfidence::Definite { urls: repository };
        }
        if !candidates.is_empty() {
            return CodeLinkConfidence::Possible {
                reason: PossibleReason::UrlFound,
            };
        }
        if mentions_repository(sentences) {
            return CodeLinkConfidence::Possible {
                reason: PossibleReason::RepositoryKeyword,
            };
        }
        CodeLinkConfidence::Absent
    }
}
