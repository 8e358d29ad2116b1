use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::season::calendar::{EventDefinition, SeasonCalendar};
use crate::season::domain::{CircuitAffinity, CircuitType, SkillAttributes};
use crate::season::registry::{BaselineCompetitor, CompetitorRegistry};
use crate::season::service::SeasonService;
use crate::season::store::{
    InMemorySeasonRepository, RepositoryError, SeasonRepository, SeasonTables,
};

pub(super) const SEED: u64 = 2026;

pub(super) fn baseline(
    surname: &str,
    team: &str,
    number: u32,
    speed: i32,
    wet: i32,
) -> BaselineCompetitor {
    BaselineCompetitor {
        surname: surname.to_string(),
        name: format!("{surname} Jr"),
        team: team.to_string(),
        country: "GBR".to_string(),
        number,
        attributes: SkillAttributes {
            speed,
            racing: 8,
            reaction: 7,
            experience: 6,
            consistency: 90,
            error_rate: 5,
            affinity: CircuitAffinity {
                street: 4,
                high_speed: 5,
                wet,
            },
        },
    }
}

/// Four competitors over two teams.
pub(super) fn registry() -> CompetitorRegistry {
    CompetitorRegistry::new(
        "test",
        vec![
            baseline("Hart", "Comet", 3, 10, 9),
            baseline("Lowe", "Comet", 7, 9, 2),
            baseline("Marsh", "Nimbus", 11, 8, 6),
            baseline("Quill", "Nimbus", 21, 7, 1),
        ],
    )
    .expect("valid registry")
}

/// Two competitors sharing one team.
pub(super) fn duo_registry() -> CompetitorRegistry {
    CompetitorRegistry::new(
        "duo",
        vec![
            baseline("Hart", "Comet", 3, 10, 9),
            baseline("Lowe", "Comet", 7, 9, 2),
        ],
    )
    .expect("valid registry")
}

fn event(name: &str, day: u32, has_sprint: bool, circuit_type: CircuitType) -> EventDefinition {
    EventDefinition {
        name: name.to_string(),
        circuit: format!("{name} Circuit"),
        date: NaiveDate::from_ymd_opt(2026, 4, day).expect("valid date"),
        has_sprint,
        circuit_type,
    }
}

/// Sessions 0..=2 are FP/QC/GP, sessions 3..=7 a sprint weekend.
pub(super) fn calendar() -> SeasonCalendar {
    SeasonCalendar::new(vec![
        event("Harbour GP", 5, false, CircuitType::Street),
        event("Storm GP", 12, true, CircuitType::Wet),
    ])
    .expect("valid calendar")
}

/// One weekend: FP at 0, QC at 1, GP at 2.
pub(super) fn short_calendar() -> SeasonCalendar {
    SeasonCalendar::new(vec![event("Harbour GP", 5, false, CircuitType::Street)])
        .expect("valid calendar")
}

pub(super) type MemoryService = SeasonService<InMemorySeasonRepository>;

pub(super) fn seeded_service_with(
    registry: CompetitorRegistry,
    calendar: &SeasonCalendar,
) -> (MemoryService, Arc<InMemorySeasonRepository>) {
    let repository = Arc::new(InMemorySeasonRepository::default());
    let service = SeasonService::with_seed(Arc::clone(&repository), registry, SEED);
    service.seed(calendar, false).expect("seed succeeds");
    (service, repository)
}

pub(super) fn seeded_service() -> (MemoryService, Arc<InMemorySeasonRepository>) {
    seeded_service_with(registry(), &calendar())
}

pub(super) fn snapshot(repository: &InMemorySeasonRepository) -> Arc<SeasonTables> {
    repository.snapshot().expect("snapshot")
}

/// Store whose every call fails, for the 500 path.
pub(super) struct UnavailableRepository;

impl SeasonRepository for UnavailableRepository {
    fn snapshot(&self) -> Result<Arc<SeasonTables>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn transaction<T, E, F>(&self, _work: F) -> Result<T, E>
    where
        F: FnOnce(&mut SeasonTables) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        Err(RepositoryError::Unavailable("database offline".to_string()).into())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}
