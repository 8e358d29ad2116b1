//! Season simulation: baseline roster and calendar, the session scoring
//! engine, a transactional store and the controller tying them together.

pub mod calendar;
pub mod domain;
pub mod error;
pub mod import;
pub mod registry;
pub mod router;
pub mod scoring;
pub mod service;
pub mod simulator;
pub mod store;
pub mod views;

#[cfg(test)]
mod tests;

pub use calendar::{EventDefinition, SeasonCalendar, SessionDefinition};
pub use domain::{
    CareerTotals, CircuitAffinity, CircuitType, Competitor, CompetitorId, NaturalKey, Session,
    SessionResult, SessionType, SkillAttributes, Team, TeamId, SKILL_CEILING, SKILL_FLOOR,
};
pub use error::{parse_flag, SeasonError};
pub use import::{load_calendar, load_roster, read_calendar, read_roster, ImportError};
pub use registry::{BaselineCompetitor, CompetitorRegistry, RegistryError};
pub use router::season_router;
pub use service::SeasonService;
pub use simulator::{SessionRun, SessionSimulator};
pub use store::{InMemorySeasonRepository, RepositoryError, SeasonRepository, SeasonTables};
pub use views::{
    CompetitorView, OutcomeView, ResetReport, SeedReport, SessionResultsResponse, SessionView,
    SimulateNextReport, TeamStandingView, TeamView,
};
