use std::fs;
use std::io::{self, Write};

use camino::Utf8Path;
use serde::Serialize;
use tracing::info;

use crate::app::{ArticleRow, FailedArticle, ProgressEvent, ProgressSink, ScanResult};
use crate::domain::PmcId;
use crate::error::MishmashError;
use crate::signals::primers::join_primers;
use crate::sra::{MetadataResult, RunMetadata};

pub const CSV_COLUMNS: [&str; 9] = [
    "PMC ID",
    "Sequence Accessibility Badge",
    "INSDC Accession Numbers",
    "Sequence Database",
    "Number of Sequence Records",
    "Primer Sequences",
    "Sequencing Method Probability",
    "Includes Code Repository",
    "Code URL",
];

pub const JOURNAL_COLUMNS: [&str; 4] = [
    "Publication Year",
    "Journal Name",
    "Publisher Name",
    "First Author Affiliation",
];

pub const METADATA_COLUMNS: [&str; 16] = [
    "Run ID",
    "Experiment ID",
    "Experiment Title",
    "Study ID",
    "BioProject ID",
    "Sample ID",
    "BioSample ID",
    "Organism",
    "Platform",
    "Instrument",
    "Library Strategy",
    "Library Source",
    "Library Selection",
    "Library Layout",
    "Spots",
    "Bases",
];

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
pub struct ScanReport<'a> {
    pub generated_at: String,
    pub tool: String,
    pub rows: &'a [ArticleRow],
    pub blocked: &'a [PmcId],
    pub failed: &'a [FailedArticle],
}

impl<'a> ScanReport<'a> {
    pub fn new(result: &'a ScanResult) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            tool: format!("mishmash {}", env!("CARGO_PKG_VERSION")),
            rows: &result.rows,
            blocked: &result.blocked,
            failed: &result.failed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetadataReport<'a> {
    pub generated_at: String,
    pub tool: String,
    pub runs: &'a [RunMetadata],
    pub unresolved: &'a [String],
}

impl<'a> MetadataReport<'a> {
    pub fn new(result: &'a MetadataResult) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            tool: format!("mishmash {}", env!("CARGO_PKG_VERSION")),
            runs: &result.runs,
            unresolved: &result.unresolved,
        }
    }
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_report(result: &ScanResult) -> io::Result<()> {
        Self::print_json(&ScanReport::new(result))
    }

    pub fn print_metadata(result: &MetadataResult) -> io::Result<()> {
        Self::print_json(&MetadataReport::new(result))
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

pub struct StderrProgress;

impl ProgressSink for StderrProgress {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => eprintln!("{} [{:.1}s]", event.message, elapsed.as_secs_f64()),
            None => eprintln!("{}", event.message),
        }
    }
}

pub struct CsvOutput;

impl CsvOutput {
    pub fn write(
        path: &Utf8Path,
        rows: &[ArticleRow],
        include_journal_data: bool,
        force: bool,
    ) -> Result<(), MishmashError> {
        Self::write_table(path, &Self::render(rows, include_journal_data), force)?;
        info!(path = %path, rows = rows.len(), "wrote report");
        Ok(())
    }

    pub fn write_runs(path: &Utf8Path, runs: &[RunMetadata], force: bool) -> Result<(), MishmashError> {
        Self::write_table(path, &Self::render_runs(runs), force)?;
        info!(path = %path, runs = runs.len(), "wrote run metadata");
        Ok(())
    }

    // Written next to `path`, then moved into place.
    fn write_table(path: &Utf8Path, content: &str, force: bool) -> Result<(), MishmashError> {
        if path.exists() && !force {
            return Err(MishmashError::OutputExists(path.as_std_path().to_path_buf()));
        }
        let parent = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| MishmashError::Filesystem(err.to_string()))?;

        let mut temp = tempfile::Builder::new()
            .prefix("mishmash-")
            .suffix(".csv")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| MishmashError::Filesystem(err.to_string()))?;
        temp.write_all(content.as_bytes())
            .map_err(|err| MishmashError::Filesystem(err.to_string()))?;
        temp.persist(path.as_std_path())
            .map_err(|err| MishmashError::Filesystem(err.to_string()))?;
        Ok(())
    }

    pub fn render(rows: &[ArticleRow], include_journal_data: bool) -> String {
        let mut header: Vec<&str> = CSV_COLUMNS.to_vec();
        if include_journal_data {
            header.extend(JOURNAL_COLUMNS);
        }

        let mut out = String::new();
        push_record(&mut out, header.iter().map(|s| s.to_string()));
        for row in rows {
            push_record(&mut out, Self::cells(row, include_journal_data));
        }
        out
    }

    fn cells(row: &ArticleRow, include_journal_data: bool) -> Vec<String> {
        let mut cells = vec![
            row.pmc_id.to_string(),
            row.verdict.to_string(),
            row.accessions.join(", "),
            row.databases.join(", "),
            row.record_count.to_string(),
            join_primers(&row.primers),
            row.method_weights
                .map(|weights| weights.to_string())
                .unwrap_or_default(),
            row.code_link.to_string(),
            row.code_link.urls().join(", "),
        ];
        if include_journal_data {
            let metadata = row.metadata.clone().unwrap_or_default();
            cells.extend([
                metadata.publish_year.unwrap_or_default(),
                metadata.journal_name.unwrap_or_default(),
                metadata.publisher_name.unwrap_or_default(),
                metadata.institution.unwrap_or_default(),
            ]);
        }
        cells
    }

    pub fn render_runs(runs: &[RunMetadata]) -> String {
        let mut out = String::new();
        push_record(&mut out, METADATA_COLUMNS.iter().map(|s| s.to_string()));
        for run in runs {
            let optional = |value: &Option<String>| value.clone().unwrap_or_default();
            let number = |value: Option<u64>| value.map(|n| n.to_string()).unwrap_or_default();
            push_record(
                &mut out,
                [
                    run.run_id.clone(),
                    optional(&run.experiment_id),
                    optional(&run.experiment_title),
                    optional(&run.study_id),
                    optional(&run.bioproject_id),
                    optional(&run.sample_id),
                    optional(&run.biosample_id),
                    optional(&run.organism),
                    optional(&run.platform),
                    optional(&run.instrument),
                    optional(&run.library_strategy),
                    optional(&run.library_source),
                    optional(&run.library_selection),
                    optional(&run.library_layout),
                    number(run.spots),
                    number(run.bases),
                ],
            );
        }
        out
    }
}

fn push_record(out: &mut String, cells: impl IntoIterator<Item = String>) {
    let line: Vec<String> = cells.into_iter().map(|cell| escape_csv(&cell)).collect();
    out.push_str(&line.join(","));
    out.push_str("\r\n");
}

fn escape_csv(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
