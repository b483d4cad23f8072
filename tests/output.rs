use std::fs;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use mishmash::app::{App, ArticleRow};
use mishmash::article::NormalizedArticle;
use mishmash::config::Settings;
use mishmash::domain::PmcId;
use mishmash::error::MishmashError;
use mishmash::ncbi::{ArticleFetcher, RecordCounter};
use mishmash::output::CsvOutput;
use mishmash::sra::RunMetadata;

struct NoFetch;

impl ArticleFetcher for NoFetch {
    fn fetch_article(&self, id: PmcId) -> Result<String, MishmashError> {
        Err(MishmashError::EutilsHttp(format!("unexpected fetch of PMC{id}")))
    }
}

struct FixedCount(u64);

impl RecordCounter for FixedCount {
    fn count_records(&self, _accession: &str) -> Result<u64, MishmashError> {
        Ok(self.0)
    }
}

fn row(text: &str, include_journal_data: bool) -> ArticleRow {
    let settings = Settings {
        include_journal_data,
        ..Settings::default()
    };
    let app = App::new(NoFetch, FixedCount(2), settings);
    app.evaluate(&NormalizedArticle::from_text(PmcId::new(8751733), text))
        .unwrap()
}

fn temp_path(dir: &tempfile::TempDir, name: &str) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().join(name)).unwrap()
}

#[test]
fn csv_row_joins_lists_and_quotes() {
    let rows = vec![row(
        "Shotgun metagenomic reads are in PRJEB12345 and ERR1234567.",
        false,
    )];
    let csv = CsvOutput::render(&rows, false);
    let mut lines = csv.split("\r\n");
    assert_eq!(
        lines.next().unwrap(),
        "PMC ID,Sequence Accessibility Badge,INSDC Accession Numbers,Sequence Database,\
         Number of Sequence Records,Primer Sequences,Sequencing Method Probability,\
         Includes Code Repository,Code URL"
    );
    let record = lines.next().unwrap();
    assert!(record.starts_with("8751733,Silver: Link to code repository"));
    assert!(record.contains(",\"PRJEB12345, ERR1234567\",EMBL-EBI European Nucleotide Archive,4,,"));
    assert!(record.ends_with(",\"amplicon: 0, shotgun: 1\",False,"));
}

#[test]
fn journal_columns_are_blank_when_unknown() {
    let rows = vec![row("No identifiers here.", true)];
    let csv = CsvOutput::render(&rows, true);
    let record = csv.split("\r\n").nth(1).unwrap();
    assert!(record.ends_with("False,,,,,"));
}

#[test]
fn existing_file_needs_force() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp_path(&temp, "report.csv");
    fs::write(&path, "old").unwrap();
    let rows = vec![row("No identifiers here.", false)];

    assert_matches!(
        CsvOutput::write(&path, &rows, false, false),
        Err(MishmashError::OutputExists(_))
    );
    assert_eq!(fs::read_to_string(&path).unwrap(), "old");

    CsvOutput::write(&path, &rows, false, true).unwrap();
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("PMC ID,"));
    assert!(written.contains("8751733,None: No accessions"));
}

#[test]
fn run_metadata_table_leaves_unknown_fields_blank() {
    let runs = vec![RunMetadata {
        run_id: "SRR1234567".to_string(),
        experiment_title: Some("Soil, core 1".to_string()),
        library_layout: Some("PAIRED".to_string()),
        spots: Some(51234),
        ..RunMetadata::default()
    }];
    let temp = tempfile::tempdir().unwrap();
    let path = temp_path(&temp, "nested/runs.csv");

    CsvOutput::write_runs(&path, &runs, false).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    let mut lines = written.split("\r\n");
    assert_eq!(
        lines.next().unwrap(),
        "Run ID,Experiment ID,Experiment Title,Study ID,BioProject ID,Sample ID,\
         BioSample ID,Organism,Platform,Instrument,Library Strategy,Library Source,\
         Library Selection,Library Layout,Spots,Bases"
    );
    assert_eq!(
        lines.next().unwrap(),
        "SRR1234567,,\"Soil, core 1\",,,,,,,,,,,PAIRED,51234,"
    );
}
