use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use crate::domain::PmcId;
use crate::error::MishmashError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSelector {
    Index(usize),
    // matched case-insensitively
    Name(String),
}

impl Default for ColumnSelector {
    fn default() -> Self {
        ColumnSelector::Index(0)
    }
}

impl FromStr for ColumnSelector {
    type Err = MishmashError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(MishmashError::InputColumn(value.to_string()));
        }
        match trimmed.parse::<usize>() {
            Ok(index) => Ok(ColumnSelector::Index(index)),
            Err(_) => Ok(ColumnSelector::Name(trimmed.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputFile {
    pub path: PathBuf,
    pub column: ColumnSelector,
    pub has_header: bool,
}

pub fn read_identifiers(input: &InputFile) -> Result<Vec<PmcId>, MishmashError> {
    read_column(input)?
        .iter()
        .map(|cell| cell.parse::<PmcId>())
        .collect()
}

pub fn read_column(input: &InputFile) -> Result<Vec<String>, MishmashError> {
    let content =
        fs::read_to_string(&input.path).map_err(|_| MishmashError::InputRead(input.path.clone()))?;
    parse_column(&content, &input.column, input.has_header, &input.path)
}

fn parse_column(
    content: &str,
    column: &ColumnSelector,
    has_header: bool,
    path: &Path,
) -> Result<Vec<String>, MishmashError> {
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());

    let header = if has_header || matches!(column, ColumnSelector::Name(_)) {
        lines.next()
    } else {
        None
    };
    let index = match column {
        ColumnSelector::Index(index) => *index,
        ColumnSelector::Name(name) => header
            .and_then(|header| {
                split_row(header)
                    .iter()
                    .position(|cell| cell.eq_ignore_ascii_case(name))
            })
            .ok_or_else(|| MishmashError::InputColumn(name.clone()))?,
    };

    let values: Vec<String> = lines
        .filter_map(|line| split_row(line).into_iter().nth(index))
        .filter(|cell| !cell.is_empty())
        .collect();

    if values.is_empty() {
        return Err(MishmashError::EmptyInput(path.to_path_buf()));
    }
    debug!(path = %path.display(), count = values.len(), "read input column");
    Ok(values)
}

// RFC 4180 quoting: commas inside quotes stay in the cell, `""` is a literal quote.
fn split_row(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    cell.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if cell.trim().is_empty() && !quoted => {
                cell.clear();
                quoted = true;
                in_quotes = true;
            }
            ',' if !in_quotes => {
                cells.push(std::mem::take(&mut cell).trim().to_string());
                quoted = false;
            }
            _ => cell.push(ch),
        }
    }
    cells.push(cell.trim().to_string());
    cells
}

pub fn collect_identifiers(
    args: &[String],
    file: Option<&InputFile>,
) -> Result<Vec<PmcId>, MishmashError> {
    let mut ids = args
        .iter()
        .filter(|arg| !arg.trim().is_empty())
        .map(|arg| arg.parse::<PmcId>())
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(file) = file {
        ids.extend(read_identifiers(file)?);
    }

    let mut seen = HashSet::new();
    ids.retain(|id| seen.insert(*id));
    if ids.is_empty() {
        return Err(MishmashError::MissingInput);
    }
    Ok(ids)
}

pub fn collect_accessions(
    args: &[String],
    file: Option<&InputFile>,
) -> Result<Vec<String>, MishmashError> {
    let mut accessions: Vec<String> = args
        .iter()
        .map(|arg| arg.trim())
        .filter(|arg| !arg.is_empty())
        .map(str::to_string)
        .collect();
    if let Some(file) = file {
        accessions.extend(read_column(file)?);
    }

    let mut seen = HashSet::new();
    accessions.retain(|accession| seen.insert(accession.clone()));
    if accessions.is_empty() {
        return Err(MishmashError::MissingInput);
    }
    Ok(accessions)
}
