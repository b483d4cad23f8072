use std::collections::HashSet;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::app::{ProgressEvent, ProgressSink};
use crate::error::MishmashError;
use crate::markup::{Document, Element};
use crate::ncbi::SraMetadataFetcher;

pub const EFETCH_BATCH_SIZE: usize = 150;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunMetadata {
    pub run_id: String,
    pub experiment_id: Option<String>,
    pub experiment_title: Option<String>,
    pub study_id: Option<String>,
    pub bioproject_id: Option<String>,
    pub sample_id: Option<String>,
    pub biosample_id: Option<String>,
    pub organism: Option<String>,
    pub platform: Option<String>,
    pub instrument: Option<String>,
    pub library_strategy: Option<String>,
    pub library_source: Option<String>,
    pub library_selection: Option<String>,
    pub library_layout: Option<String>,
    pub spots: Option<u64>,
    pub bases: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MetadataResult {
    pub runs: Vec<RunMetadata>,
    pub unresolved: Vec<String>,
}

pub fn parse_experiment_packages(xml: &str) -> Result<Vec<RunMetadata>, MishmashError> {
    let document = Document::parse(xml)
        .map_err(|err| MishmashError::EutilsResponse(format!("SRA metadata: {err}")))?;
    let packages = document.root.find_all("EXPERIMENT_PACKAGE");
    if packages.is_empty() {
        if let Some(error) = document.root.find("ERROR") {
            return Err(MishmashError::EutilsResponse(error.text().trim().to_string()));
        }
    }

    let mut runs = Vec::new();
    for package in packages {
        let template = package_fields(package);
        for run in package.find_all("RUN") {
            let Some(run_id) = run.attr("accession") else {
                continue;
            };
            runs.push(RunMetadata {
                run_id: run_id.to_string(),
                spots: run.attr("total_spots").and_then(|value| value.parse().ok()),
                bases: run.attr("total_bases").and_then(|value| value.parse().ok()),
                ..template.clone()
            });
        }
    }
    Ok(runs)
}

fn package_fields(package: &Element) -> RunMetadata {
    let experiment = package.find("EXPERIMENT");
    let study = package.find("STUDY");
    let sample = package.find("SAMPLE");
    let platform = experiment.and_then(|experiment| experiment.find("PLATFORM"));
    let library = experiment.and_then(|experiment| experiment.find("LIBRARY_DESCRIPTOR"));

    RunMetadata {
        experiment_id: experiment.and_then(|e| owned_attr(e, "accession")),
        experiment_title: experiment.and_then(|e| child_text(e, "TITLE")),
        study_id: study.and_then(|e| owned_attr(e, "accession")),
        bioproject_id: study.and_then(|e| external_id(e, "BioProject")),
        sample_id: sample.and_then(|e| owned_attr(e, "accession")),
        biosample_id: sample.and_then(|e| external_id(e, "BioSample")),
        organism: sample.and_then(|e| child_text(e, "SCIENTIFIC_NAME")),
        // PLATFORM wraps one vendor element, e.g. <ILLUMINA>
        platform: platform
            .and_then(|e| e.child_elements().next())
            .map(|vendor| vendor.name.clone()),
        instrument: platform.and_then(|e| child_text(e, "INSTRUMENT_MODEL")),
        library_strategy: library.and_then(|e| child_text(e, "LIBRARY_STRATEGY")),
        library_source: library.and_then(|e| child_text(e, "LIBRARY_SOURCE")),
        library_selection: library.and_then(|e| child_text(e, "LIBRARY_SELECTION")),
        library_layout: library
            .and_then(|e| e.find("LIBRARY_LAYOUT"))
            .and_then(|layout| layout.child_elements().next())
            .map(|layout| layout.name.clone()),
        ..RunMetadata::default()
    }
}

fn owned_attr(element: &Element, key: &str) -> Option<String> {
    element.attr(key).map(str::to_string)
}

fn child_text(element: &Element, name: &str) -> Option<String> {
    element
        .find(name)
        .map(|child| child.text().trim().to_string())
        .filter(|text| !text.is_empty())
}

fn external_id(element: &Element, namespace: &str) -> Option<String> {
    element
        .find_where("EXTERNAL_ID", |id| id.attr("namespace") == Some(namespace))
        .map(|id| id.text().trim().to_string())
        .filter(|text| !text.is_empty())
}

pub struct MetadataCollector<S: SraMetadataFetcher> {
    fetcher: S,
}

impl<S: SraMetadataFetcher> MetadataCollector<S> {
    pub fn new(fetcher: S) -> Self {
        Self { fetcher }
    }

    pub fn collect(
        &self,
        accessions: &[String],
        sink: &dyn ProgressSink,
    ) -> Result<MetadataResult, MishmashError> {
        if accessions.is_empty() {
            return Err(MishmashError::MissingInput);
        }

        let mut result = MetadataResult::default();
        let mut seen = HashSet::new();
        let mut uids = Vec::new();
        let total = accessions.len();
        for (index, accession) in accessions.iter().enumerate() {
            let started = Instant::now();
            let found = self.fetcher.search_sra(accession)?;
            sink.event(ProgressEvent {
                message: format!(
                    "phase=Search; {accession} ({}/{total}): {} uids",
                    index + 1,
                    found.len()
                ),
                elapsed: Some(started.elapsed()),
            });
            if found.is_empty() {
                warn!(accession = %accession, "accession has no SRA records");
                result.unresolved.push(accession.clone());
                continue;
            }
            uids.extend(found.into_iter().filter(|uid| seen.insert(uid.clone())));
        }

        let batches = uids.len().div_ceil(EFETCH_BATCH_SIZE);
        for (index, batch) in uids.chunks(EFETCH_BATCH_SIZE).enumerate() {
            let started = Instant::now();
            let xml = self.fetcher.fetch_sra_packages(batch)?;
            let runs = parse_experiment_packages(&xml)?;
            debug!(uids = batch.len(), runs = runs.len(), "parsed SRA metadata batch");
            sink.event(ProgressEvent {
                message: format!(
                    "phase=Fetch; batch {}/{batches}: {} runs",
                    index + 1,
                    runs.len()
                ),
                elapsed: Some(started.elapsed()),
            });
            result.runs.extend(runs);
        }

        info!(
            runs = result.runs.len(),
            unresolved = result.unresolved.len(),
            "metadata collection finished"
        );
        Ok(result)
    }
}
