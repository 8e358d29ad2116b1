use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use pitwall::config::SeasonConfig;
use pitwall::error::AppError;
use pitwall::season::{
    load_calendar, load_roster, CompetitorRegistry, InMemorySeasonRepository, SeasonCalendar,
    SeasonService,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type MemorySeasonService = SeasonService<InMemorySeasonRepository>;

/// Season inputs resolved from CLI flags first, then configuration.
#[derive(Debug, Clone, Default)]
pub(crate) struct SeasonSources {
    pub(crate) roster_csv: Option<PathBuf>,
    pub(crate) calendar_csv: Option<PathBuf>,
    pub(crate) rng_seed: Option<u64>,
    pub(crate) reset_skills: bool,
}

impl SeasonSources {
    pub(crate) fn from_config(config: &SeasonConfig) -> Self {
        Self {
            roster_csv: config.roster_csv.clone(),
            calendar_csv: config.calendar_csv.clone(),
            rng_seed: config.rng_seed,
            reset_skills: config.reset_skills,
        }
    }

    pub(crate) fn registry(&self) -> Result<CompetitorRegistry, AppError> {
        match &self.roster_csv {
            Some(path) => {
                let registry = load_roster(path)?;
                info!(path = %path.display(), competitors = registry.entries().len(), "roster imported");
                Ok(registry)
            }
            None => Ok(CompetitorRegistry::standard()),
        }
    }

    pub(crate) fn calendar(&self) -> Result<SeasonCalendar, AppError> {
        calendar_from(self.calendar_csv.as_deref())
    }

    /// Build an in-memory season and seed it.
    pub(crate) fn seeded_service(&self) -> Result<MemorySeasonService, AppError> {
        let repository = Arc::new(InMemorySeasonRepository::default());
        let registry = self.registry()?;
        let service = match self.rng_seed {
            Some(seed) => SeasonService::with_seed(repository, registry, seed),
            None => SeasonService::new(repository, registry),
        }
        .reset_skills_by_default(self.reset_skills);

        service.seed(&self.calendar()?, false)?;
        Ok(service)
    }
}

pub(crate) fn calendar_from(path: Option<&Path>) -> Result<SeasonCalendar, AppError> {
    match path {
        Some(path) => {
            let calendar = load_calendar(path)?;
            info!(path = %path.display(), events = calendar.events().len(), "calendar imported");
            Ok(calendar)
        }
        None => Ok(SeasonCalendar::standard()),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_reports_bad_input() {
        assert_eq!(
            parse_date(" 2026-05-24 "),
            Ok(NaiveDate::from_ymd_opt(2026, 5, 24).expect("valid"))
        );
        let err = parse_date("24/05/2026").expect_err("rejected");
        assert!(err.contains("YYYY-MM-DD"));
    }

    #[test]
    fn default_sources_seed_the_standard_season() {
        let sources = SeasonSources {
            rng_seed: Some(1),
            reset_skills: true,
            ..SeasonSources::default()
        };

        let service = sources.seeded_service().expect("service builds");

        assert_eq!(service.standings().expect("standings").len(), 22);
        assert_eq!(service.calendar().expect("calendar").len(), 24 * 3 + 6 * 2);
    }

    #[test]
    fn missing_roster_file_surfaces_import_error() {
        let sources = SeasonSources {
            roster_csv: Some(PathBuf::from("/nonexistent/roster.csv")),
            ..SeasonSources::default()
        };

        assert!(matches!(sources.registry(), Err(AppError::Import(_))));
    }
}
