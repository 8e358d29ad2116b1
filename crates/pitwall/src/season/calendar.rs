use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{CircuitType, Session, SessionType};
use super::error::SeasonError;
use super::registry::RegistryError;
use super::store::SeasonTables;

/// A Grand Prix weekend before it is expanded into sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDefinition {
    pub name: String,
    pub circuit: String,
    pub date: NaiveDate,
    pub has_sprint: bool,
    pub circuit_type: CircuitType,
}

impl EventDefinition {
    /// Session order of the weekend.
    pub fn session_types(&self) -> &'static [SessionType] {
        if self.has_sprint {
            &[
                SessionType::Practice,
                SessionType::SprintQualifying,
                SessionType::Sprint,
                SessionType::Qualifying,
                SessionType::Race,
            ]
        } else {
            &[
                SessionType::Practice,
                SessionType::Qualifying,
                SessionType::Race,
            ]
        }
    }
}

/// A session as the calendar defines it, before persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionDefinition {
    pub index: u32,
    pub gp_name: String,
    pub circuit_name: String,
    pub date: NaiveDate,
    pub session_type: SessionType,
    pub circuit_type: CircuitType,
}

#[derive(Debug, Clone)]
pub struct SeasonCalendar {
    events: Vec<EventDefinition>,
}

impl SeasonCalendar {
    pub fn new(events: Vec<EventDefinition>) -> Result<Self, RegistryError> {
        if events.is_empty() {
            return Err(RegistryError::EmptyCalendar);
        }
        if let Some(event) = events
            .iter()
            .find(|event| event.name.trim().is_empty() || event.circuit.trim().is_empty())
        {
            return Err(RegistryError::IncompleteEvent(event.name.clone()));
        }
        Ok(Self { events })
    }

    /// The 2026 calendar: 24 rounds, six of them sprint weekends.
    pub fn standard() -> Self {
        Self {
            events: standard_events(),
        }
    }

    pub fn events(&self) -> &[EventDefinition] {
        &self.events
    }

    /// Flatten events into sessions; the flattened position becomes the index.
    pub fn sessions(&self) -> Vec<SessionDefinition> {
        self.events
            .iter()
            .flat_map(|event| {
                event
                    .session_types()
                    .iter()
                    .map(move |session_type| (event, *session_type))
            })
            .enumerate()
            .map(|(index, (event, session_type))| SessionDefinition {
                index: index as u32,
                gp_name: event.name.clone(),
                circuit_name: event.circuit.clone(),
                date: event.date,
                session_type,
                circuit_type: event.circuit_type,
            })
            .collect()
    }

    /// Write the calendar into the tables, matching existing rows by index.
    ///
    /// Metadata of an existing session is refreshed in place and its simulated
    /// flag kept. Session and circuit types are fixed once a row exists.
    pub(crate) fn apply(&self, tables: &mut SeasonTables) -> Result<usize, SeasonError> {
        let definitions = self.sessions();

        for definition in &definitions {
            match tables.session_mut(definition.index) {
                Some(existing) => {
                    if existing.session_type != definition.session_type
                        || existing.circuit_type != definition.circuit_type
                    {
                        return Err(SeasonError::CalendarConflict {
                            index: definition.index,
                            stored: format!(
                                "{} on a {} circuit",
                                existing.session_type.code(),
                                existing.circuit_type.label()
                            ),
                            requested: format!(
                                "{} on a {} circuit",
                                definition.session_type.code(),
                                definition.circuit_type.label()
                            ),
                        });
                    }
                    existing.gp_name = definition.gp_name.clone();
                    existing.circuit_name = definition.circuit_name.clone();
                    existing.date = definition.date;
                }
                None => tables.put_session(Session {
                    index: definition.index,
                    gp_name: definition.gp_name.clone(),
                    circuit_name: definition.circuit_name.clone(),
                    date: definition.date,
                    session_type: definition.session_type,
                    circuit_type: definition.circuit_type,
                    is_simulated: false,
                }),
            }
        }

        Ok(definitions.len())
    }
}

fn event(
    name: &str,
    circuit: &str,
    (year, month, day): (i32, u32, u32),
    has_sprint: bool,
    circuit_type: CircuitType,
) -> EventDefinition {
    EventDefinition {
        name: name.to_string(),
        circuit: circuit.to_string(),
        date: NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default(),
        has_sprint,
        circuit_type,
    }
}

fn standard_events() -> Vec<EventDefinition> {
    use CircuitType::{HighSpeed, Street};

    vec![
        event("Australian GP", "Albert Park", (2026, 3, 8), false, Street),
        event("Chinese GP", "Shanghai International Circuit", (2026, 3, 15), true, HighSpeed),
        event("Japanese GP", "Suzuka Circuit", (2026, 3, 29), false, HighSpeed),
        event("Bahrain GP", "Bahrain International Circuit", (2026, 4, 12), false, HighSpeed),
        event("Jeddah GP", "Jeddah Corniche Circuit", (2026, 4, 19), false, Street),
        event("Miami GP", "Miami International Autodrome", (2026, 5, 3), true, Street),
        event("Canadian GP", "Circuit Gilles Villeneuve", (2026, 5, 24), true, HighSpeed),
        event("Monaco GP", "Circuit de Monaco", (2026, 6, 7), false, Street),
        event("Barcelona GP", "Circuit de Barcelona-Catalunya", (2026, 6, 14), false, HighSpeed),
        event("Austrian GP", "Red Bull Ring", (2026, 6, 28), false, HighSpeed),
        event("British GP", "Silverstone Circuit", (2026, 7, 5), true, HighSpeed),
        event("Belgian GP", "Circuit de Spa-Francorchamps", (2026, 7, 19), false, HighSpeed),
        event("Hungarian GP", "Hungaroring", (2026, 7, 26), false, HighSpeed),
        event("Dutch GP", "Circuit Zandvoort", (2026, 8, 23), true, HighSpeed),
        event("Italian GP", "Monza Circuit", (2026, 9, 6), false, HighSpeed),
        event("Spanish GP", "Madring Circuit", (2026, 9, 13), false, HighSpeed),
        event("Azerbaijan GP", "Baku City Circuit", (2026, 9, 26), false, Street),
        event("Singapore GP", "Marina Bay Street Circuit", (2026, 10, 11), true, Street),
        event("United States GP", "Circuit of the Americas", (2026, 10, 25), false, HighSpeed),
        event("Mexico GP", "Autódromo Hermanos Rodríguez", (2026, 11, 1), false, HighSpeed),
        event("Brazilian GP", "Interlagos Circuit", (2026, 11, 8), false, HighSpeed),
        event("Las Vegas GP", "Las Vegas Street Circuit", (2026, 11, 21), false, Street),
        event("Qatar GP", "Losail International Circuit", (2026, 11, 29), false, HighSpeed),
        event("Abu Dhabi GP", "Yas Marina Circuit", (2026, 12, 6), false, HighSpeed),
    ]
}
