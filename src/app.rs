use std::collections::HashSet;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::accession::{accession_numbers, database_names};
use crate::article::{ArticleRecord, JournalMetadata, NormalizedArticle};
use crate::config::{FailurePolicy, Settings};
use crate::domain::{Badge, PmcId};
use crate::error::MishmashError;
use crate::ncbi::{ArticleFetcher, RecordCounter};
use crate::score::{ComplianceVerdict, score};
use crate::signals::code_links::{CodeLinkConfidence, CodeLinkDetector};
use crate::signals::methods::MethodWeights;
use crate::signals::{SignalReport, detect_signals};
use crate::tokenize::{PunctuationTokenizer, Tokenizer};

#[derive(Debug, Clone, Serialize)]
pub struct ArticleRow {
    pub pmc_id: PmcId,
    pub badge: Badge,
    pub verdict: ComplianceVerdict,
    pub accessions: Vec<String>,
    pub databases: Vec<String>,
    pub record_count: u64,
    pub primers: Vec<String>,
    pub method_weights: Option<MethodWeights>,
    pub code_link: CodeLinkConfidence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JournalMetadata>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedArticle {
    pub pmc_id: PmcId,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanResult {
    pub rows: Vec<ArticleRow>,
    pub blocked: Vec<PmcId>,
    pub failed: Vec<FailedArticle>,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

enum ArticleOutcome {
    Scored(Box<ArticleRow>),
    Blocked,
}

pub struct App<F: ArticleFetcher, C: RecordCounter> {
    fetcher: F,
    counter: C,
    settings: Settings,
    tokenizer: Box<dyn Tokenizer>,
    code_links: CodeLinkDetector,
}

impl<F: ArticleFetcher, C: RecordCounter> App<F, C> {
    pub fn new(fetcher: F, counter: C, settings: Settings) -> Self {
        let code_links = CodeLinkDetector::new(&settings.excluded_urls);
        Self {
            fetcher,
            counter,
            settings,
            tokenizer: Box::new(PunctuationTokenizer::new()),
            code_links,
        }
    }

    pub fn with_tokenizer(mut self, tokenizer: impl Tokenizer + 'static) -> Self {
        self.tokenizer = Box::new(tokenizer);
        self
    }

    pub fn scan(&self, ids: &[PmcId], sink: &dyn ProgressSink) -> Result<ScanResult, MishmashError> {
        if ids.is_empty() {
            return Err(MishmashError::MissingInput);
        }

        let mut result = ScanResult::default();
        let total = ids.len();
        for (index, id) in ids.iter().copied().enumerate() {
            let started = Instant::now();
            sink.event(ProgressEvent {
                message: format!("phase=Fetch; PMC{id} ({}/{total})", index + 1),
                elapsed: None,
            });

            match self.scan_article(id) {
                Ok(ArticleOutcome::Scored(row)) => {
                    sink.event(ProgressEvent {
                        message: format!("phase=Score; PMC{id}: {}", row.badge),
                        elapsed: Some(started.elapsed()),
                    });
                    result.rows.push(*row);
                }
                Ok(ArticleOutcome::Blocked) => {
                    warn!(pmc_id = %id, "publisher blocks full-text XML; skipping");
                    sink.event(ProgressEvent {
                        message: format!("phase=Skip; PMC{id} is blocked by its publisher"),
                        elapsed: Some(started.elapsed()),
                    });
                    result.blocked.push(id);
                }
                Err(err) => match self.settings.failure_policy {
                    FailurePolicy::FailFast => return Err(err),
                    FailurePolicy::Continue => {
                        warn!(pmc_id = %id, "article failed: {err}");
                        sink.event(ProgressEvent {
                            message: format!("phase=Skip; PMC{id} failed: {err}"),
                            elapsed: Some(started.elapsed()),
                        });
                        result.failed.push(FailedArticle {
                            pmc_id: id,
                            error: err.to_string(),
                        });
                    }
                },
            }
        }

        info!(
            scored = result.rows.len(),
            blocked = result.blocked.len(),
            failed = result.failed.len(),
            "batch finished"
        );
        Ok(result)
    }

    fn scan_article(&self, id: PmcId) -> Result<ArticleOutcome, MishmashError> {
        let record = ArticleRecord::new(id, self.fetcher.fetch_article(id)?);
        let article = match record.normalize() {
            Ok(article) => article,
            Err(MishmashError::BlockedContent(_)) => return Ok(ArticleOutcome::Blocked),
            Err(err) => return Err(err),
        };
        self.evaluate(&article)
            .map(|row| ArticleOutcome::Scored(Box::new(row)))
    }

    pub fn evaluate(&self, article: &NormalizedArticle) -> Result<ArticleRow, MishmashError> {
        let tuples = article.accession_tuples();
        let accessions = accession_numbers(tuples);
        debug!(pmc_id = %article.id(), accessions = accessions.len(), "extracted accessions");

        let signals = detect_signals(article, &*self.tokenizer, &self.code_links);
        let record_count = self.count_records(&accessions)?;
        let verdict = score(record_count, &signals);

        Ok(ArticleRow {
            pmc_id: article.id(),
            badge: verdict.badge,
            databases: resolve_databases(&database_names(tuples), record_count, &signals),
            verdict,
            accessions,
            record_count,
            primers: signals.primers,
            method_weights: signals.method_weights,
            code_link: signals.code_link,
            metadata: self
                .settings
                .include_journal_data
                .then(|| article.metadata().clone()),
        })
    }

    fn count_records(&self, accessions: &[String]) -> Result<u64, MishmashError> {
        let mut seen = HashSet::new();
        let mut total = 0u64;
        for accession in accessions {
            if !seen.insert(accession.as_str()) {
                continue;
            }
            let count = self.counter.count_records(accession)?;
            debug!(accession = %accession, count, "resolved record count");
            total += count;
        }
        Ok(total)
    }
}

fn resolve_databases(insdc: &[String], record_count: u64, signals: &SignalReport) -> Vec<String> {
    match signals.non_insdc_database {
        Some(name) if record_count == 0 => vec![name.to_string()],
        _ => insdc.to_vec(),
    }
}
