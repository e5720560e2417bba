//! Roster seeding from spreadsheet exports.
//!
//! Rows come from a CSV file with a header line, a JSON array of objects, or
//! the first worksheet of a spreadsheet whose first row holds the headers.
//! Column names are matched loosely: `Team ID`, `team_id` and `TEAMID` all
//! normalize to the same key.

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use calamine::{Data, Range, Reader};
use serde_json::Value;
use thiserror::Error;

use crate::database::{
    RosterStore, StoreError,
    models::{DEFAULT_COLLEGE, MAX_MEMBERS, TeamInput, normalize_team_id},
};

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to read roster file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Unsupported roster format '{0}', expected .csv, .json or .xlsx")]
    UnsupportedFormat(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// One input row keyed by normalized column name.
pub type RawRow = HashMap<String, String>;

const TEAM_ID_KEYS: &[&str] = &["Team ID", "TeamID", "team_id", "id", "Team No"];
const TEAM_NAME_KEYS: &[&str] = &["Team Name", "TeamName", "team_name", "name"];
const COLLEGE_KEYS: &[&str] = &["College", "Institution", "College Name"];
const CONTACT_KEYS: &[&str] = &["Contact", "Phone", "Mobile", "Contact Number"];
const EMAIL_KEYS: &[&str] = &["Email", "E-mail"];

/// Lower-case and drop everything that is not a letter or digit.
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

pub fn read_rows(path: &Path) -> Result<Vec<RawRow>, ImportError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => parse_csv(std::fs::File::open(path)?),
        "json" => parse_json(&std::fs::read_to_string(path)?),
        "xlsx" | "xlsm" | "xls" | "ods" => parse_spreadsheet(path),
        other => Err(ImportError::UnsupportedFormat(other.to_string())),
    }
}

pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<RawRow>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(normalize_key).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = headers
            .iter()
            .zip(record.iter())
            .map(|(key, value)| (key.clone(), value.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

pub fn parse_json(input: &str) -> Result<Vec<RawRow>, ImportError> {
    let objects: Vec<serde_json::Map<String, Value>> = serde_json::from_str(input)?;

    Ok(objects
        .into_iter()
        .map(|object| {
            object
                .into_iter()
                .filter_map(|(key, value)| {
                    let value = match value {
                        Value::String(s) => s,
                        Value::Number(n) => n.to_string(),
                        Value::Bool(b) => b.to_string(),
                        _ => return None,
                    };
                    Some((normalize_key(&key), value))
                })
                .collect()
        })
        .collect())
}

/// Rows of the first worksheet, keyed by the first row. Blank rows are skipped.
pub fn parse_spreadsheet(path: &Path) -> Result<Vec<RawRow>, ImportError> {
    let mut workbook = calamine::open_workbook_auto(path)?;
    match workbook.worksheet_range_at(0) {
        Some(range) => Ok(rows_from_range(&range?)),
        None => Ok(Vec::new()),
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn rows_from_range(range: &Range<Data>) -> Vec<RawRow> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = header
        .iter()
        .map(|cell| normalize_key(&cell_text(cell)))
        .collect();

    rows.map(|cells| cells.iter().map(cell_text).collect::<Vec<_>>())
        .filter(|values| values.iter().any(|value| !value.trim().is_empty()))
        .map(|values| headers.iter().cloned().zip(values).collect())
        .collect()
}

/// First alias that carries a non-blank value.
fn field<'a>(row: &'a RawRow, aliases: &[&str]) -> Option<&'a str> {
    aliases
        .iter()
        .filter_map(|alias| row.get(&normalize_key(alias)))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
}

fn members(row: &RawRow) -> Vec<String> {
    (1..=MAX_MEMBERS)
        .filter_map(|n| {
            let aliases = [format!("member{n} name"), format!("Member {n}")];
            let aliases: Vec<&str> = aliases.iter().map(String::as_str).collect();
            field(row, &aliases).map(str::to_string)
        })
        .collect()
}

/// Why a row was not imported. `row` is 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub row: usize,
    pub team_id: Option<String>,
    pub error: String,
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.team_id {
            Some(team_id) => write!(f, "row {} ({}): {}", self.row, team_id, self.error),
            None => write!(f, "row {}: {}", self.row, self.error),
        }
    }
}

/// Build a roster input from a row. `index` is 0-based; rows without an id get
/// `HACK001`, `HACK002`, ... from their position.
pub fn team_from_row(index: usize, row: &RawRow) -> Result<TeamInput, RowError> {
    let row_number = index + 1;
    let team_id = field(row, TEAM_ID_KEYS)
        .and_then(normalize_team_id)
        .unwrap_or_else(|| format!("HACK{:03}", row_number));

    let Some(team_name) = field(row, TEAM_NAME_KEYS) else {
        return Err(RowError {
            row: row_number,
            team_id: Some(team_id),
            error: "Missing Team Name".to_string(),
        });
    };

    Ok(TeamInput {
        team_id,
        team_name: team_name.to_string(),
        college: field(row, COLLEGE_KEYS)
            .unwrap_or(DEFAULT_COLLEGE)
            .to_string(),
        members: members(row),
        contact_number: field(row, CONTACT_KEYS).unwrap_or_default().to_string(),
        email: field(row, EMAIL_KEYS).unwrap_or_default().to_string(),
    })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportSummary {
    pub cleared: u64,
    pub imported: usize,
    pub failed: usize,
    pub errors: Vec<RowError>,
}

/// Seed the roster from parsed rows.
///
/// Invalid rows and duplicate ids are collected into the summary; any other
/// store failure aborts the import.
pub async fn import_rows(
    roster: &dyn RosterStore,
    rows: &[RawRow],
    replace: bool,
) -> Result<ImportSummary, ImportError> {
    let mut summary = ImportSummary::default();

    if replace {
        summary.cleared = roster.clear().await?;
        log::info!("Cleared {} existing teams", summary.cleared);
    }

    for (index, row) in rows.iter().enumerate() {
        let input = match team_from_row(index, row) {
            Ok(input) => input,
            Err(error) => {
                log::warn!("Skipping {}", error);
                summary.failed += 1;
                summary.errors.push(error);
                continue;
            }
        };

        let team_id = input.team_id.clone();
        match roster.insert_team(input).await {
            Ok(team) => {
                log::debug!("Row {}: {} - {}", index + 1, team.team_id, team.team_name);
                summary.imported += 1;
            }
            Err(StoreError::Duplicate(_)) => {
                let error = RowError {
                    row: index + 1,
                    team_id: Some(team_id),
                    error: "Duplicate Team ID".to_string(),
                };
                log::warn!("Skipping {}", error);
                summary.failed += 1;
                summary.errors.push(error);
            }
            Err(e) => return Err(e.into()),
        }
    }

    log::info!(
        "Import finished: {} imported, {} failed",
        summary.imported,
        summary.failed
    );
    Ok(summary)
}

/// What `import_rows` would do, without writing. Ids repeated within the file
/// and, unless `replace` is set, ids already in the roster are reported as
/// duplicates.
pub async fn check_rows(
    roster: &dyn RosterStore,
    rows: &[RawRow],
    replace: bool,
) -> Result<ImportSummary, ImportError> {
    let mut summary = ImportSummary::default();
    let mut seen = HashSet::new();

    for (index, row) in rows.iter().enumerate() {
        let input = match team_from_row(index, row) {
            Ok(input) => input,
            Err(error) => {
                summary.failed += 1;
                summary.errors.push(error);
                continue;
            }
        };

        let exists = !replace && roster.find_by_team_id(&input.team_id).await?.is_some();
        if !seen.insert(input.team_id.clone()) || exists {
            summary.failed += 1;
            summary.errors.push(RowError {
                row: index + 1,
                team_id: Some(input.team_id),
                error: "Duplicate Team ID".to_string(),
            });
            continue;
        }
        summary.imported += 1;
    }

    Ok(summary)
}
