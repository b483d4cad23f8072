use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::domain::PmcId;

#[derive(Debug, Error, Diagnostic)]
pub enum MishmashError {
    #[error("invalid PMC id: {0}")]
    InvalidPmcId(String),

    #[error("publisher of PMC{0} does not allow downloading of the full text in XML form")]
    #[diagnostic(help("evaluate this article manually"))]
    BlockedContent(PmcId),

    #[error("malformed document for PMC{id}: {reason}")]
    MalformedDocument { id: PmcId, reason: String },

    #[error("E-utilities request failed: {0}")]
    EutilsHttp(String),

    #[error("E-utilities returned status {status}: {message}")]
    EutilsStatus { status: u16, message: String },

    #[error("unexpected E-utilities response: {0}")]
    EutilsResponse(String),

    #[error("no input identifiers were provided")]
    #[diagnostic(help("pass ids as arguments or use --input-file"))]
    MissingInput,

    #[error("{0}")]
    Configuration(String),

    #[error("failed to read input file at {0}")]
    InputRead(PathBuf),

    #[error("input file contains no identifiers: {0}")]
    EmptyInput(PathBuf),

    #[error("column not found in input file: {0}")]
    InputColumn(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("output file already exists: {0}")]
    #[diagnostic(help("pass --force to overwrite it"))]
    OutputExists(PathBuf),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
