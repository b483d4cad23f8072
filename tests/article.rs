use assert_matches::assert_matches;

use mishmash::article::{ArticleRecord, BLOCKING_NOTICE, normalize_markup};
use mishmash::domain::{AccessionTuple, PmcId};
use mishmash::error::MishmashError;

fn id() -> PmcId {
    PmcId::new(7000001)
}

const ARTICLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<pmc-articleset><article>
<front>
  <journal-meta>
    <journal-title-group><journal-title>Microbiome</journal-title></journal-title-group>
    <publisher><publisher-name>BioMed Central</publisher-name></publisher>
  </journal-meta>
  <article-meta>
    <contrib-group>
      <contrib contrib-type="author"><name>Doe</name><xref ref-type="aff" rid="Aff1 Aff2"/></contrib>
    </contrib-group>
    <aff id="Aff1"><institution>Institute of Soil Ecology</institution>,</aff>
    <pub-date pub-type="ppub"><year>2019</year></pub-date>
    <pub-date pub-type="epub"><year>2020</year></pub-date>
    <pub-date pub-type="pmc-release"><year>2021</year></pub-date>
  </article-meta>
</front>
<body>
  <sec><p>Reads were deposited in the SRA under PRJNA605207.</p></sec>
</body>
<back>
  <ack><p>Run data: SRR1234567.</p></ack>
  <ref-list>
    <ref><mixed-citation>Earlier study PRJNA604899.</mixed-citation></ref>
  </ref-list>
  <notes><p>Supplementary project PRJNA604957.</p></notes>
</back>
</article></pmc-articleset>"#;

#[test]
fn blocked_article_is_rejected() {
    let markup = format!(
        "<pmc-articleset><article><front/><!--{BLOCKING_NOTICE}--></article></pmc-articleset>"
    );
    let record = ArticleRecord::new(id(), markup);
    assert!(record.is_blocked());
    assert_matches!(record.normalize(), Err(MishmashError::BlockedContent(blocked)) if blocked == id());
}

#[test]
fn similar_comment_is_not_a_block() {
    let markup = "<article><!--The publisher of this article does not allow downloading of the full text.--><body><p>text</p></body></article>";
    let record = ArticleRecord::new(id(), markup);
    assert!(!record.is_blocked());
    let article = record.normalize().unwrap();
    assert!(article.core_text().contains("text"));
}

#[test]
fn reference_list_and_what_follows_are_dropped() {
    let article = ArticleRecord::new(id(), ARTICLE).normalize().unwrap();
    assert_eq!(
        article.accession_tuples(),
        &[
            AccessionTuple::new("PRJNA605207", 'N'),
            AccessionTuple::new("SRR1234567", 'S'),
        ]
    );
    assert!(!article.core_text().contains("Earlier study"));
    assert!(!article.core_text().contains("Supplementary project"));
}

#[test]
fn body_comes_before_back_and_front() {
    let (text, _) = normalize_markup(id(), ARTICLE).unwrap();
    let body = text.find("Reads were deposited").unwrap();
    let back = text.find("Run data").unwrap();
    let front = text.find("Microbiome").unwrap();
    assert!(body < back && back < front);
}

#[test]
fn journal_metadata_follows_date_priority() {
    let article = ArticleRecord::new(id(), ARTICLE).normalize().unwrap();
    let metadata = article.metadata();
    assert_eq!(metadata.publish_year.as_deref(), Some("2021"));
    assert_eq!(metadata.journal_name.as_deref(), Some("Microbiome"));
    assert_eq!(metadata.publisher_name.as_deref(), Some("BioMed Central"));
    assert_eq!(
        metadata.institution.as_deref(),
        Some("Institute of Soil Ecology")
    );
}

#[test]
fn missing_metadata_does_not_fail() {
    let article = ArticleRecord::new(id(), "<article><body><p>Only text.</p></body></article>")
        .normalize()
        .unwrap();
    assert_eq!(article.metadata().publish_year, None);
    assert_eq!(article.metadata().institution, None);
    assert!(article.accession_tuples().is_empty());
}
