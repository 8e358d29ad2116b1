use super::domain::{CircuitAffinity, NaturalKey, SkillAttributes, SKILL_CEILING, SKILL_FLOOR};
use std::collections::HashSet;

/// Baseline definition of one roster slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineCompetitor {
    pub surname: String,
    pub name: String,
    pub team: String,
    pub country: String,
    pub number: u32,
    pub attributes: SkillAttributes,
}

impl BaselineCompetitor {
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey {
            surname: self.surname.clone(),
            name: self.name.clone(),
            number: self.number,
        }
    }
}

/// Immutable, versioned roster used to seed and restore competitors.
#[derive(Debug, Clone)]
pub struct CompetitorRegistry {
    version: String,
    entries: Vec<BaselineCompetitor>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("competitor registry is empty")]
    Empty,
    #[error("duplicate registry entry for {0}")]
    DuplicateKey(NaturalKey),
    #[error("registry entry #{number} is missing its {field}")]
    MissingField { number: u32, field: &'static str },
    #[error("registry entry #{number} has {field} {value}, outside 0..=100")]
    OutOfRange {
        number: u32,
        field: &'static str,
        value: i32,
    },
    #[error("season calendar has no events")]
    EmptyCalendar,
    #[error("calendar event `{0}` is missing a name or circuit")]
    IncompleteEvent(String),
}

impl CompetitorRegistry {
    /// Build a registry, rejecting rosters that break the natural key contract.
    pub fn new(
        version: impl Into<String>,
        entries: Vec<BaselineCompetitor>,
    ) -> Result<Self, RegistryError> {
        if entries.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.surname.trim().is_empty() {
                return Err(RegistryError::MissingField {
                    number: entry.number,
                    field: "surname",
                });
            }
            if entry.name.trim().is_empty() {
                return Err(RegistryError::MissingField {
                    number: entry.number,
                    field: "name",
                });
            }
            if entry.team.trim().is_empty() {
                return Err(RegistryError::MissingField {
                    number: entry.number,
                    field: "team",
                });
            }
            check_ranges(entry)?;
            if !seen.insert(entry.natural_key()) {
                return Err(RegistryError::DuplicateKey(entry.natural_key()));
            }
        }

        Ok(Self {
            version: version.into(),
            entries,
        })
    }

    /// The 2026 grid: 22 drivers across 11 teams.
    pub fn standard() -> Self {
        Self {
            version: "2026".to_string(),
            entries: standard_roster(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn entries(&self) -> &[BaselineCompetitor] {
        &self.entries
    }

    pub fn find(&self, key: &NaturalKey) -> Option<&BaselineCompetitor> {
        self.entries.iter().find(|entry| &entry.natural_key() == key)
    }
}

fn check_ranges(entry: &BaselineCompetitor) -> Result<(), RegistryError> {
    let attributes = &entry.attributes;
    let fields = [
        ("speed", attributes.speed),
        ("racing", attributes.racing),
        ("reaction", attributes.reaction),
        ("experience", attributes.experience),
        ("consistency", attributes.consistency),
        ("error_rate", attributes.error_rate),
    ];
    match fields
        .into_iter()
        .find(|(_, value)| !(SKILL_FLOOR..=SKILL_CEILING).contains(value))
    {
        Some((field, value)) => Err(RegistryError::OutOfRange {
            number: entry.number,
            field,
            value,
        }),
        None => Ok(()),
    }
}

#[allow(clippy::too_many_arguments)]
fn baseline(
    surname: &str,
    name: &str,
    team: &str,
    country: &str,
    number: u32,
    [speed, racing, reaction, experience]: [i32; 4],
    [consistency, error_rate]: [i32; 2],
    [street, high_speed, wet]: [i32; 3],
) -> BaselineCompetitor {
    BaselineCompetitor {
        surname: surname.to_string(),
        name: name.to_string(),
        team: team.to_string(),
        country: country.to_string(),
        number,
        attributes: SkillAttributes {
            speed,
            racing,
            reaction,
            experience,
            consistency,
            error_rate,
            affinity: CircuitAffinity {
                street,
                high_speed,
                wet,
            },
        },
    }
}

const FERRARI: &str = "Scuderia Ferrari HP";
const RED_BULL: &str = "Oracle Red Bull Racing";
const MERCEDES: &str = "Mercedes-AMG Petronas Formula One Team";
const MCLAREN: &str = "McLaren Mastercard Formula 1 Team";
const ASTON_MARTIN: &str = "Aston Martin Aramco Formula One Team";
const ALPINE: &str = "BWT Alpine F1 Team";
const AUDI: &str = "Audi F1 Team (Revolut)";
const CADILLAC: &str = "Cadillac Formula One Team";
const HAAS: &str = "TGR Haas F1 Team";
const WILLIAMS: &str = "Atlassian Williams Racing";
const RACING_BULLS: &str = "Visa Cash App Racing Bulls F1 Team";

fn standard_roster() -> Vec<BaselineCompetitor> {
    vec![
        baseline("Leclerc", "Charles", FERRARI, "Monaco", 16, [9, 9, 9, 8], [90, 5], [8, 9, 7]),
        baseline("Hamilton", "Lewis", FERRARI, "UK", 44, [9, 10, 8, 10], [88, 6], [7, 9, 8]),
        baseline("Verstappen", "Max", RED_BULL, "NED", 3, [10, 10, 9, 9], [92, 5], [6, 10, 7]),
        baseline("Hadjar", "Isack", RED_BULL, "FRA", 6, [7, 8, 8, 7], [85, 8], [5, 8, 6]),
        baseline("Russell", "George", MERCEDES, "UK", 63, [8, 8, 9, 8], [88, 6], [6, 9, 7]),
        baseline("Antonelli", "Andrea Kimi", MERCEDES, "ITA", 12, [7, 7, 8, 7], [84, 7], [5, 8, 6]),
        baseline("Norris", "Lando", MCLAREN, "UK", 1, [8, 8, 9, 7], [87, 6], [6, 8, 7]),
        baseline("Piastri", "Oscar", MCLAREN, "AUS", 81, [7, 7, 8, 6], [85, 7], [5, 7, 6]),
        baseline("Stroll", "Lance", ASTON_MARTIN, "CAN", 18, [7, 7, 7, 7], [83, 8], [5, 7, 6]),
        baseline("Alonso", "Fernando", ASTON_MARTIN, "ESP", 14, [9, 9, 8, 10], [88, 6], [6, 8, 7]),
        baseline("Gasly", "Pierre", ALPINE, "FRA", 10, [8, 8, 8, 8], [86, 6], [6, 8, 7]),
        baseline("Colapinto", "Franco", ALPINE, "ARG", 43, [6, 7, 7, 6], [82, 8], [5, 7, 6]),
        baseline("Hulkenberg", "Nico", AUDI, "GER", 27, [8, 7, 8, 9], [85, 6], [5, 8, 7]),
        baseline("Bortoleto", "Gabriel", AUDI, "BRA", 5, [6, 7, 7, 6], [82, 8], [5, 7, 6]),
        baseline("Pérez", "Sergio", CADILLAC, "MEX", 11, [8, 8, 8, 9], [85, 6], [6, 8, 7]),
        baseline("Bottas", "Valtteri", CADILLAC, "FIN", 77, [8, 8, 7, 9], [85, 6], [5, 8, 6]),
        baseline("Ocon", "Esteban", HAAS, "FRA", 31, [7, 7, 8, 8], [83, 7], [5, 7, 6]),
        baseline("Bearman", "Oliver", HAAS, "UK", 87, [5, 6, 7, 5], [80, 9], [4, 6, 5]),
        baseline("Sainz", "Carlos", WILLIAMS, "ESP", 55, [8, 8, 8, 8], [85, 6], [6, 8, 7]),
        baseline("Albon", "Alexander", WILLIAMS, "THA", 23, [7, 7, 8, 7], [83, 7], [5, 7, 6]),
        baseline("Lawson", "Liam", RACING_BULLS, "AUS", 30, [6, 7, 7, 6], [82, 8], [5, 7, 6]),
        baseline("Lindblad", "Arvid", RACING_BULLS, "SWE", 41, [5, 6, 7, 5], [80, 9], [4, 6, 5]),
    ]
}
