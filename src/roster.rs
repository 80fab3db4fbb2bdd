use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::models::{DroppedRow, Roster, RosterError, StudentRecord};

const NAME_HEADERS: &[&str] = &["اسم التلميذ", "اسم التلميذة", "name"];
const EVALUATION_HEADERS: &[&str] = &["التقويم", "continuous_assessment"];
const ASSIGNMENT_HEADERS: &[&str] = &["الفرض", "assignment"];
const EXAM_HEADERS: &[&str] = &["الإختبار", "exam"];
const AVERAGE_HEADERS: &[&str] = &["المعدل", "average"];

#[derive(Deserialize)]
struct CsvRow {
    #[serde(rename = "اسم التلميذ", alias = "اسم التلميذة", alias = "name")]
    name: Option<String>,
    #[serde(rename = "التقويم", alias = "continuous_assessment")]
    continuous_assessment: Option<String>,
    #[serde(rename = "الفرض", alias = "assignment")]
    assignment: Option<String>,
    #[serde(rename = "الإختبار", alias = "exam")]
    exam: Option<String>,
    #[serde(rename = "المعدل", alias = "average")]
    average: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SectionLoad {
    pub roster: Roster,
    pub dropped: Vec<DroppedRow>,
}

/// Every section that loaded with at least one valid record.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub sections: BTreeMap<String, Roster>,
    pub dropped: Vec<DroppedRow>,
}

impl Workbook {
    pub fn section(&self, name: &str) -> Option<&Roster> {
        self.sections.get(name)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}

/// Loads a directory of section CSVs, or a single CSV as a one-section
/// workbook.
pub fn load_workbook(path: &Path) -> Result<Workbook, RosterError> {
    let files = if path.is_dir() {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let file = entry?.path();
            let is_csv = file
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if file.is_file() && is_csv {
                files.push(file);
            }
        }
        files.sort();
        files
    } else {
        vec![path.to_path_buf()]
    };

    let mut workbook = Workbook::default();
    for file in files {
        let loaded = match load_section(&file) {
            Ok(loaded) => loaded,
            Err(RosterError::InvalidInput(reason)) => {
                tracing::error!(file = %file.display(), %reason, "section skipped");
                continue;
            }
            Err(err) => return Err(err),
        };

        workbook.dropped.extend(loaded.dropped);
        if loaded.roster.is_empty() {
            tracing::warn!(
                section = loaded.roster.section(),
                "section has no valid records after processing"
            );
            continue;
        }
        tracing::info!(
            section = loaded.roster.section(),
            records = loaded.roster.len(),
            "section loaded"
        );
        workbook
            .sections
            .insert(loaded.roster.section().to_string(), loaded.roster);
    }

    if workbook.sections.is_empty() {
        return Err(RosterError::InvalidInput(format!(
            "no valid sections could be loaded from {}",
            path.display()
        )));
    }
    Ok(workbook)
}

/// Loads one section; the section takes the file stem as its name.
pub fn load_section(path: &Path) -> Result<SectionLoad, RosterError> {
    let section = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| {
            RosterError::InvalidInput(format!("{} has no file name", path.display()))
        })?;
    let file = std::fs::File::open(path)?;
    parse_section(&section, file)
}

pub fn parse_section<R: Read>(section: &str, source: R) -> Result<SectionLoad, RosterError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    for (column, accepted) in [
        ("name", NAME_HEADERS),
        ("continuous_assessment", EVALUATION_HEADERS),
        ("assignment", ASSIGNMENT_HEADERS),
        ("exam", EXAM_HEADERS),
        ("average", AVERAGE_HEADERS),
    ] {
        let present: Vec<&str> = headers
            .iter()
            .filter(|header| accepted.contains(header))
            .collect();
        match present.len() {
            0 => {
                return Err(RosterError::InvalidInput(format!(
                    "section '{section}' is missing the {column} column (expected one of {accepted:?}, found {:?})",
                    headers.iter().collect::<Vec<_>>()
                )))
            }
            1 => {}
            _ => {
                return Err(RosterError::InvalidInput(format!(
                    "section '{section}' has the {column} column more than once ({present:?})"
                )))
            }
        }
    }

    let mut records = Vec::new();
    let mut dropped = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = index + 1;
        let outcome = result
            .map_err(|err| err.to_string())
            .and_then(into_record)
            .and_then(|record| record.check().map(|()| record));

        match outcome {
            Ok(record) => records.push(record),
            Err(reason) => {
                tracing::warn!(section, row, %reason, "row dropped");
                dropped.push(DroppedRow {
                    section: section.to_string(),
                    row,
                    reason,
                });
            }
        }
    }

    Ok(SectionLoad {
        roster: Roster::new(section, records)?,
        dropped,
    })
}

fn into_record(row: CsvRow) -> Result<StudentRecord, String> {
    let name = row
        .name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| "missing student name".to_string())?;
    Ok(StudentRecord {
        name: name.trim().to_string(),
        continuous_assessment: score("continuous_assessment", row.continuous_assessment)?,
        assignment: score("assignment", row.assignment)?,
        exam: score("exam", row.exam)?,
        average: score("average", row.average)?,
    })
}

fn score(column: &str, raw: Option<String>) -> Result<f64, String> {
    let raw = raw.ok_or_else(|| format!("{column} is empty"))?;
    raw.trim()
        .parse::<f64>()
        .map_err(|_| format!("{column} value '{raw}' is not numeric"))
}
