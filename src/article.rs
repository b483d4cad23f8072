use serde::Serialize;
use tracing::{debug, warn};

use crate::accession::extract_accession_tuples;
use crate::domain::{AccessionTuple, PmcId};
use crate::error::MishmashError;
use crate::markup::{Document, Element, scan_comments};

/// Comment PMC inserts into the efetch payload instead of the article body
/// when the publisher forbids XML redistribution.
pub const BLOCKING_NOTICE: &str =
    "The publisher of this article does not allow downloading of the full text in XML form.";

const PUBLICATION_DATE_TYPES: [&str; 3] = ["pmc-release", "epub", "accepted"];

pub fn contains_blocking_comment(markup: &str) -> bool {
    scan_comments(markup)
        .iter()
        .any(|comment| comment.trim() == BLOCKING_NOTICE)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JournalMetadata {
    pub publish_year: Option<String>,
    pub journal_name: Option<String>,
    pub publisher_name: Option<String>,
    pub institution: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ArticleRecord {
    id: PmcId,
    markup: String,
}

impl ArticleRecord {
    pub fn new(id: PmcId, markup: impl Into<String>) -> Self {
        Self {
            id,
            markup: markup.into(),
        }
    }

    pub fn id(&self) -> PmcId {
        self.id
    }

    pub fn is_blocked(&self) -> bool {
        contains_blocking_comment(&self.markup)
    }

    pub fn normalize(self) -> Result<NormalizedArticle, MishmashError> {
        let (core_text, metadata) = normalize_markup(self.id, &self.markup)?;
        Ok(NormalizedArticle::new(self.id, core_text, metadata))
    }
}

#[derive(Debug, Clone)]
pub struct NormalizedArticle {
    id: PmcId,
    core_text: String,
    metadata: JournalMetadata,
    accessions: Vec<AccessionTuple>,
}

impl NormalizedArticle {
    pub fn new(id: PmcId, core_text: String, metadata: JournalMetadata) -> Self {
        let accessions = extract_accession_tuples(&core_text);
        debug!(pmc_id = %id, accessions = accessions.len(), "normalized article");
        Self {
            id,
            core_text,
            metadata,
            accessions,
        }
    }

    pub fn from_text(id: PmcId, core_text: impl Into<String>) -> Self {
        Self::new(id, core_text.into(), JournalMetadata::default())
    }

    pub fn id(&self) -> PmcId {
        self.id
    }

    pub fn core_text(&self) -> &str {
        &self.core_text
    }

    pub fn metadata(&self) -> &JournalMetadata {
        &self.metadata
    }

    pub fn accession_tuples(&self) -> &[AccessionTuple] {
        &self.accessions
    }
}

// Unparseable or body-less documents yield empty text, not an error.
pub fn normalize_markup(
    id: PmcId,
    markup: &str,
) -> Result<(String, JournalMetadata), MishmashError> {
    if contains_blocking_comment(markup) {
        return Err(MishmashError::BlockedContent(id));
    }

    let document = match parse_document(id, markup) {
        Ok(document) => document,
        Err(err) => {
            warn!("{err}; treating article as empty");
            return Ok((String::new(), JournalMetadata::default()));
        }
    };
    let root = &document.root;
    let metadata = extract_metadata(root);

    let Some(body) = root.find("body") else {
        let err = MishmashError::MalformedDocument {
            id,
            reason: "no <body> element".to_string(),
        };
        warn!("{err}; treating article as empty");
        return Ok((String::new(), metadata));
    };

    let mut core_text = body.text();
    if let Some(back) = root.find("back") {
        // citations would otherwise dominate the accession and URL matches
        core_text.push('\n');
        core_text.push_str(&back.text_before("ref-list"));
    }
    if let Some(front) = root.find("front") {
        core_text.push('\n');
        core_text.push_str(&front.text());
    }
    Ok((core_text, metadata))
}

fn parse_document(id: PmcId, markup: &str) -> Result<Document, MishmashError> {
    Document::parse(markup).map_err(|err| MishmashError::MalformedDocument {
        id,
        reason: err.to_string(),
    })
}

pub fn extract_metadata(root: &Element) -> JournalMetadata {
    JournalMetadata {
        publish_year: publish_year(root),
        journal_name: non_empty_text(root.find("journal-title")),
        publisher_name: non_empty_text(root.find("publisher-name")),
        institution: first_author_institution(root),
    }
}

fn non_empty_text(element: Option<&Element>) -> Option<String> {
    let text = element?.text();
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn publish_year(root: &Element) -> Option<String> {
    let dates = root.find_all("pub-date");
    PUBLICATION_DATE_TYPES.iter().find_map(|date_type| {
        dates
            .iter()
            .find(|date| {
                date.attr("pub-type")
                    .or_else(|| date.attr("date-type"))
                    .is_some_and(|value| value.contains(date_type))
            })
            .and_then(|date| non_empty_text(date.find("year")))
    })
}

fn first_author_institution(root: &Element) -> Option<String> {
    let author = root.find_where("contrib", |el| el.attr("contrib-type") == Some("author"))?;
    let rid = author
        .find_where("xref", |el| el.attr("ref-type") == Some("aff"))?
        .attr("rid")?;
    // rid may list several affiliations; the first one is the primary
    let rid = rid.split_whitespace().next()?;
    let aff = root.find_where("aff", |el| el.attr("id") == Some(rid))?;
    let joined: String = aff
        .find_all("institution")
        .iter()
        .map(|inst| inst.text())
        .collect();
    let trimmed = joined.trim().trim_end_matches([' ', ',', '.', ';', ':']);
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
