use std::collections::HashMap;
use std::sync::Mutex;

use assert_matches::assert_matches;

use mishmash::app::App;
use mishmash::article::BLOCKING_NOTICE;
use mishmash::config::{FailurePolicy, Settings};
use mishmash::domain::{Badge, PmcId};
use mishmash::error::MishmashError;
use mishmash::ncbi::{ArticleFetcher, RecordCounter};
use mishmash::output::JsonOutput;
use mishmash::tokenize::Tokenizer;

#[derive(Default)]
struct MockFetcher {
    documents: HashMap<PmcId, String>,
    calls: Mutex<Vec<PmcId>>,
}

impl MockFetcher {
    fn with(mut self, id: u64, markup: impl Into<String>) -> Self {
        self.documents.insert(PmcId::new(id), markup.into());
        self
    }
}

impl ArticleFetcher for MockFetcher {
    fn fetch_article(&self, id: PmcId) -> Result<String, MishmashError> {
        self.calls.lock().unwrap().push(id);
        self.documents
            .get(&id)
            .cloned()
            .ok_or_else(|| MishmashError::EutilsStatus {
                status: 500,
                message: format!("no document for PMC{id}"),
            })
    }
}

#[derive(Default)]
struct MockCounter {
    counts: HashMap<String, u64>,
    calls: Mutex<Vec<String>>,
}

impl MockCounter {
    fn with(mut self, accession: &str, count: u64) -> Self {
        self.counts.insert(accession.to_string(), count);
        self
    }
}

impl RecordCounter for MockCounter {
    fn count_records(&self, accession: &str) -> Result<u64, MishmashError> {
        self.calls.lock().unwrap().push(accession.to_string());
        Ok(self.counts.get(accession).copied().unwrap_or(0))
    }
}

fn article(body: &str) -> String {
    format!(
        "<article><front><journal-title>Microbiome</journal-title></front>\
         <body><p>{body}</p></body></article>"
    )
}

fn blocked() -> String {
    format!("<article><!-- {BLOCKING_NOTICE} --></article>")
}

const GOLD_BODY: &str = "Amplicon sequencing targeted the 16S V4 region. \
    Primers GTGCCAGCMGCCGCGGTAA and GGACTACHVGGGTWTCTAAT were used. \
    Reads are in PRJNA605207 and runs SRR1234567 and SRR1234568. \
    Code: https://github.com/example-lab/pipeline.";

#[test]
fn blocked_articles_are_reported_separately() {
    let fetcher = MockFetcher::default()
        .with(1, article(GOLD_BODY))
        .with(2, blocked());
    let counter = MockCounter::default().with("PRJNA605207", 4);
    let app = App::new(fetcher, counter, Settings::default());

    let result = app
        .scan(&[PmcId::new(1), PmcId::new(2)], &JsonOutput)
        .unwrap();

    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0].pmc_id, PmcId::new(1));
    assert_eq!(result.blocked, vec![PmcId::new(2)]);
    assert!(result.failed.is_empty());
}

#[test]
fn complete_article_scores_gold_with_summed_counts() {
    let fetcher = MockFetcher::default().with(1, article(GOLD_BODY));
    let counter = MockCounter::default()
        .with("PRJNA605207", 4)
        .with("SRR1234567", 1)
        .with("SRR1234568", 1);
    let app = App::new(fetcher, counter, Settings::default());

    let result = app.scan(&[PmcId::new(1)], &JsonOutput).unwrap();
    let row = &result.rows[0];

    assert_eq!(row.badge, Badge::Gold);
    assert_eq!(row.record_count, 6);
    assert_eq!(
        row.accessions,
        vec!["PRJNA605207", "SRR1234567", "SRR1234568"]
    );
    assert_eq!(row.databases, vec!["NCBI Sequence Read Archive"]);
    assert_eq!(
        row.code_link.urls(),
        &["https://github.com/example-lab/pipeline".to_string()]
    );
    assert!(row.metadata.is_none());
}

#[test]
fn unresolved_accessions_give_no_badge() {
    let fetcher = MockFetcher::default().with(1, article("Reads are in PRJNA605207."));
    let app = App::new(fetcher, MockCounter::default(), Settings::default());

    let row = app.scan(&[PmcId::new(1)], &JsonOutput).unwrap().rows.remove(0);
    assert_eq!(row.badge, Badge::None);
    assert_eq!(row.record_count, 0);
}

#[test]
fn fail_fast_aborts_on_first_error() {
    let fetcher = MockFetcher::default().with(3, article(GOLD_BODY));
    let app = App::new(fetcher, MockCounter::default(), Settings::default());

    let result = app.scan(&[PmcId::new(1), PmcId::new(3)], &JsonOutput);

    assert_matches!(result, Err(MishmashError::EutilsStatus { status: 500, .. }));
}

#[test]
fn continue_policy_records_failures() {
    let fetcher = MockFetcher::default().with(3, article(GOLD_BODY));
    let settings = Settings {
        failure_policy: FailurePolicy::Continue,
        ..Settings::default()
    };
    let app = App::new(fetcher, MockCounter::default(), settings);

    let result = app
        .scan(&[PmcId::new(1), PmcId::new(3)], &JsonOutput)
        .unwrap();

    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].pmc_id, PmcId::new(1));
    assert!(result.failed[0].error.contains("PMC1"));
    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0].pmc_id, PmcId::new(3));
}

#[test]
fn journal_data_is_attached_when_enabled() {
    let fetcher = MockFetcher::default().with(1, article("Nothing to see."));
    let settings = Settings {
        include_journal_data: true,
        ..Settings::default()
    };
    let app = App::new(fetcher, MockCounter::default(), settings);

    let row = app.scan(&[PmcId::new(1)], &JsonOutput).unwrap().rows.remove(0);
    let metadata = row.metadata.unwrap();
    assert_eq!(metadata.journal_name.as_deref(), Some("Microbiome"));
}

#[test]
fn non_insdc_repository_fills_database_column() {
    let fetcher = MockFetcher::default().with(
        1,
        article("Sequences were deposited in MG-RAST under project mgp12345."),
    );
    let app = App::new(fetcher, MockCounter::default(), Settings::default());

    let row = app.scan(&[PmcId::new(1)], &JsonOutput).unwrap().rows.remove(0);
    assert_eq!(row.databases, vec!["MG-RAST"]);
    assert_eq!(row.badge, Badge::Bronze);
}

struct LineTokenizer;

impl Tokenizer for LineTokenizer {
    fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.lines().filter(|line| !line.trim().is_empty()).collect()
    }

    fn words(&self, sentence: &str) -> Vec<String> {
        sentence.split_whitespace().map(str::to_string).collect()
    }
}

#[test]
fn custom_tokenizer_drives_method_detection() {
    let fetcher = MockFetcher::default().with(
        1,
        "<article><body><p>amplicon libraries were pooled</p>\n\
         <p>shotgun metagenomic reads were discarded</p>\n\
         <p>amplicon reads were kept</p></body></article>",
    );
    let app = App::new(fetcher, MockCounter::default(), Settings::default())
        .with_tokenizer(LineTokenizer);

    let row = app.scan(&[PmcId::new(1)], &JsonOutput).unwrap().rows.remove(0);
    let weights = row.method_weights.unwrap();
    assert_eq!(weights.amplicon, 0.67);
    assert_eq!(weights.shotgun, 0.33);
}
