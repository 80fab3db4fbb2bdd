use serde::Serialize;
use thiserror::Error;

/// Highest score any assessment can carry.
pub const MAX_SCORE: f64 = 20.0;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRecord {
    pub name: String,
    pub continuous_assessment: f64,
    pub assignment: f64,
    pub exam: f64,
    pub average: f64,
}

impl StudentRecord {
    /// Signed change from assignment to exam, in percent. A zero assignment
    /// counts as no change.
    pub fn progress_percent(&self) -> f64 {
        if self.assignment > 0.0 {
            (self.exam - self.assignment) / self.assignment * 100.0
        } else {
            0.0
        }
    }

    pub fn check(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("empty student name".to_string());
        }
        for (label, value) in [
            ("continuous_assessment", self.continuous_assessment),
            ("assignment", self.assignment),
            ("exam", self.exam),
            ("average", self.average),
        ] {
            if !value.is_finite() {
                return Err(format!("{label} is not a finite number"));
            }
            if !(0.0..=MAX_SCORE).contains(&value) {
                return Err(format!("{label} {value} is outside 0-{MAX_SCORE}"));
            }
        }
        Ok(())
    }
}

/// Students of one class section, in sheet order.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    section: String,
    records: Vec<StudentRecord>,
}

impl Roster {
    pub fn new(
        section: impl Into<String>,
        records: Vec<StudentRecord>,
    ) -> Result<Self, RosterError> {
        let section = section.into();
        for (index, record) in records.iter().enumerate() {
            record.check().map_err(|reason| {
                RosterError::InvalidInput(format!(
                    "section '{section}' record {}: {reason}",
                    index + 1
                ))
            })?;
        }
        Ok(Self { section, records })
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A source row excluded from a roster at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedRow {
    pub section: String,
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct MatchResult<'a> {
    pub record: &'a StudentRecord,
    pub confidence: u8,
}

#[cfg(test)]
pub(crate) fn sample_record(
    name: &str,
    continuous_assessment: f64,
    assignment: f64,
    exam: f64,
    average: f64,
) -> StudentRecord {
    StudentRecord {
        name: name.to_string(),
        continuous_assessment,
        assignment,
        exam,
        average,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_treats_zero_assignment_as_no_change() {
        let record = sample_record("Test", 10.0, 0.0, 5.0, 8.0);
        assert_eq!(record.progress_percent(), 0.0);
    }

    #[test]
    fn progress_is_signed() {
        let up = sample_record("Up", 10.0, 10.0, 15.0, 12.0);
        let down = sample_record("Down", 10.0, 16.0, 12.0, 12.0);
        assert!((up.progress_percent() - 50.0).abs() < 1e-9);
        assert!((down.progress_percent() + 25.0).abs() < 1e-9);
    }

    #[test]
    fn roster_rejects_out_of_range_scores() {
        let records = vec![
            sample_record("Ok", 10.0, 10.0, 10.0, 10.0),
            sample_record("Bad", 10.0, 21.0, 10.0, 10.0),
        ];
        let err = Roster::new("1AS1", records).unwrap_err();
        assert!(matches!(err, RosterError::InvalidInput(msg) if msg.contains("record 2")));
    }

    #[test]
    fn roster_rejects_non_finite_and_blank_names() {
        let nan = vec![sample_record("Nan", f64::NAN, 10.0, 10.0, 10.0)];
        assert!(Roster::new("s", nan).is_err());

        let blank = vec![sample_record("   ", 10.0, 10.0, 10.0, 10.0)];
        assert!(Roster::new("s", blank).is_err());
    }

    #[test]
    fn roster_keeps_order() {
        let roster = Roster::new(
            "2AS",
            vec![
                sample_record("B", 1.0, 1.0, 1.0, 1.0),
                sample_record("A", 2.0, 2.0, 2.0, 2.0),
            ],
        )
        .unwrap();
        assert_eq!(roster.section(), "2AS");
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.records()[0].name, "B");
    }
}
