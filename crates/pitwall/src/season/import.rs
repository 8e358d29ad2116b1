//! CSV loaders for custom rosters and calendars.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::calendar::{EventDefinition, SeasonCalendar};
use super::domain::{CircuitAffinity, CircuitType, SkillAttributes};
use super::error::flag_value;
use super::registry::{BaselineCompetitor, CompetitorRegistry, RegistryError};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to open `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("line {line}: invalid date `{value}`, expected YYYY-MM-DD")]
    InvalidDate { line: usize, value: String },
    #[error("line {line}: unknown circuit type `{value}`")]
    InvalidCircuitType { line: usize, value: String },
    #[error("line {line}: `{value}` is not a boolean")]
    InvalidFlag { line: usize, value: String },
}

/// Read a roster file; the registry version is the file stem.
pub fn load_roster(path: impl AsRef<Path>) -> Result<CompetitorRegistry, ImportError> {
    let path = path.as_ref();
    let version = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("custom")
        .to_string();
    read_roster(open(path)?, version)
}

pub fn load_calendar(path: impl AsRef<Path>) -> Result<SeasonCalendar, ImportError> {
    read_calendar(open(path.as_ref())?)
}

pub fn read_roster<R: Read>(
    reader: R,
    version: impl Into<String>,
) -> Result<CompetitorRegistry, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut entries = Vec::new();

    for record in csv_reader.deserialize::<RosterRow>() {
        entries.push(record?.into_baseline());
    }

    Ok(CompetitorRegistry::new(version, entries)?)
}

pub fn read_calendar<R: Read>(reader: R) -> Result<SeasonCalendar, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut events = Vec::new();

    for (row_number, record) in csv_reader.deserialize::<CalendarRow>().enumerate() {
        // header is line 1
        let line = row_number + 2;
        events.push(record?.into_event(line)?);
    }

    Ok(SeasonCalendar::new(events)?)
}

fn open(path: &Path) -> Result<File, ImportError> {
    File::open(path).map_err(|source| ImportError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    surname: String,
    name: String,
    team: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    country: Option<String>,
    number: u32,
    speed: i32,
    racing: i32,
    reaction: i32,
    experience: i32,
    consistency: i32,
    error_rate: i32,
    #[serde(default)]
    street_affinity: i32,
    #[serde(default)]
    high_speed_affinity: i32,
    #[serde(default)]
    wet_affinity: i32,
}

impl RosterRow {
    fn into_baseline(self) -> BaselineCompetitor {
        BaselineCompetitor {
            surname: self.surname,
            name: self.name,
            team: self.team,
            country: self.country.unwrap_or_default(),
            number: self.number,
            attributes: SkillAttributes {
                speed: self.speed,
                racing: self.racing,
                reaction: self.reaction,
                experience: self.experience,
                consistency: self.consistency,
                error_rate: self.error_rate,
                affinity: CircuitAffinity {
                    street: self.street_affinity,
                    high_speed: self.high_speed_affinity,
                    wet: self.wet_affinity,
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct CalendarRow {
    name: String,
    circuit: String,
    date: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    has_sprint: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    circuit_type: Option<String>,
}

impl CalendarRow {
    fn into_event(self, line: usize) -> Result<EventDefinition, ImportError> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").map_err(|_| {
            ImportError::InvalidDate {
                line,
                value: self.date.clone(),
            }
        })?;

        let has_sprint = match self.has_sprint.as_deref() {
            None => false,
            Some(raw) => flag_value(raw).ok_or_else(|| ImportError::InvalidFlag {
                line,
                value: raw.to_string(),
            })?,
        };

        let circuit_type = match self.circuit_type.as_deref() {
            None => CircuitType::default(),
            Some(raw) => {
                CircuitType::parse(raw).ok_or_else(|| ImportError::InvalidCircuitType {
                    line,
                    value: raw.to_string(),
                })?
            }
        };

        Ok(EventDefinition {
            name: self.name,
            circuit: self.circuit,
            date,
            has_sprint,
            circuit_type,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
