use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

use super::calendar::SeasonCalendar;
use super::domain::{media_key, CareerTotals, Competitor, CompetitorId, TeamId};
use super::error::SeasonError;
use super::registry::CompetitorRegistry;
use super::simulator::{lookup_session, order_results, SessionRun, SessionSimulator};
use super::store::{SeasonRepository, SeasonTables};
use super::views::{
    self, CompetitorView, OutcomeView, ResetReport, SeedReport, SessionView, SimulateNextReport,
    TeamStandingView, TeamView,
};

/// Season controller composing the store, the registry and the simulator.
///
/// Every mutating call runs inside a single repository transaction, so two
/// callers racing on the same session serialise and the later one sees the
/// committed result.
pub struct SeasonService<R> {
    repository: Arc<R>,
    registry: Arc<CompetitorRegistry>,
    rng: Mutex<StdRng>,
    reset_skills_default: bool,
}

impl<R> SeasonService<R>
where
    R: SeasonRepository + 'static,
{
    /// Service drawing randomness from OS entropy.
    pub fn new(repository: Arc<R>, registry: CompetitorRegistry) -> Self {
        Self::with_rng(repository, registry, StdRng::from_os_rng())
    }

    /// Service with a fixed seed, for reproducible seasons.
    pub fn with_seed(repository: Arc<R>, registry: CompetitorRegistry, seed: u64) -> Self {
        Self::with_rng(repository, registry, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(repository: Arc<R>, registry: CompetitorRegistry, rng: StdRng) -> Self {
        Self {
            repository,
            registry: Arc::new(registry),
            rng: Mutex::new(rng),
            reset_skills_default: true,
        }
    }

    /// Choose what a reset does when the caller does not say.
    pub fn reset_skills_by_default(mut self, reset_skills: bool) -> Self {
        self.reset_skills_default = reset_skills;
        self
    }

    pub fn registry(&self) -> &CompetitorRegistry {
        &self.registry
    }

    /// Load teams, competitors and the calendar from baseline data.
    pub fn seed(&self, calendar: &SeasonCalendar, wipe: bool) -> Result<SeedReport, SeasonError> {
        let registry = Arc::clone(&self.registry);

        let report = self.repository.transaction(|tables| {
            if wipe {
                tables.clear();
            }

            for baseline in registry.entries() {
                let team_id = tables.ensure_team(&baseline.team);
                match tables.competitor_by_key(&baseline.natural_key()) {
                    Some(id) => {
                        let competitor = existing(tables, id)?;
                        competitor.team_id = team_id;
                        competitor.country = baseline.country.clone();
                        competitor.attributes = baseline.attributes;
                    }
                    None => {
                        tables.insert_competitor(Competitor {
                            id: CompetitorId(0),
                            surname: baseline.surname.clone(),
                            name: baseline.name.clone(),
                            country: baseline.country.clone(),
                            number: baseline.number,
                            team_id,
                            media_key: media_key(&baseline.surname, baseline.number),
                            attributes: baseline.attributes,
                            totals: CareerTotals::default(),
                        })?;
                    }
                }
            }

            let sessions = calendar.apply(tables)?;

            Ok::<_, SeasonError>(SeedReport {
                teams: tables.teams().count(),
                competitors: tables.competitors().count(),
                sessions,
            })
        })?;

        info!(
            registry = registry.version(),
            teams = report.teams,
            competitors = report.competitors,
            sessions = report.sessions,
            wipe,
            "season seeded"
        );
        Ok(report)
    }

    /// Simulate one session, or return its stored outcome unless `force` is set.
    pub fn simulate_session(
        &self,
        index: i64,
        force: bool,
    ) -> Result<Vec<OutcomeView>, SeasonError> {
        self.repository.transaction(|tables| {
            let run = self.run_simulator(tables, index, force)?;
            views::outcome_views(tables, &run.results)
        })
    }

    /// Simulate the lowest-index session that has not run yet.
    pub fn simulate_next(&self, force: bool) -> Result<SimulateNextReport, SeasonError> {
        self.repository.transaction(|tables| {
            let Some(index) = tables.next_pending_session().map(|s| i64::from(s.index)) else {
                debug!("simulate-next requested on a completed season");
                return Ok(SimulateNextReport::season_complete());
            };

            let run = self.run_simulator(tables, index, force)?;
            let results = views::outcome_views(tables, &run.results)?;
            Ok(SimulateNextReport {
                done: false,
                message: None,
                session: Some(SessionView::from(&run.session)),
                results,
            })
        })
    }

    /// Clear results and totals; optionally restore skills to the registry baseline.
    pub fn reset_season(&self, reset_skills: Option<bool>) -> Result<ResetReport, SeasonError> {
        let reset_skills = reset_skills.unwrap_or(self.reset_skills_default);
        let registry = Arc::clone(&self.registry);

        let restored = self.repository.transaction(|tables| {
            tables.clear_all_results();
            for index in tables.sessions().map(|s| s.index).collect::<Vec<_>>() {
                if let Some(session) = tables.session_mut(index) {
                    session.is_simulated = false;
                }
            }
            for id in tables.competitor_ids() {
                existing(tables, id)?.totals = CareerTotals::default();
            }

            let mut restored = 0usize;
            if reset_skills {
                for id in tables.competitor_ids() {
                    let key = existing(tables, id)?.natural_key();
                    let Some(baseline) = registry.find(&key) else {
                        return Err(SeasonError::Invariant(format!(
                            "registry {} has no baseline for {key}",
                            registry.version()
                        )));
                    };
                    let team_id = tables.ensure_team(&baseline.team);
                    let competitor = existing(tables, id)?;
                    competitor.team_id = team_id;
                    competitor.country = baseline.country.clone();
                    competitor.attributes = baseline.attributes;
                    restored += 1;
                }
            }
            Ok::<_, SeasonError>(restored)
        })?;

        info!(reset_skills, restored, "season reset");
        Ok(ResetReport {
            ok: true,
            reset_skills,
        })
    }

    /// Drivers' standings: points desc, then wins desc.
    pub fn standings(&self) -> Result<Vec<CompetitorView>, SeasonError> {
        Ok(views::standings(&*self.repository.snapshot()?))
    }

    pub fn team_standings(&self) -> Result<Vec<TeamStandingView>, SeasonError> {
        Ok(views::team_standings(&*self.repository.snapshot()?))
    }

    pub fn teams(&self) -> Result<Vec<TeamView>, SeasonError> {
        Ok(views::teams(&*self.repository.snapshot()?))
    }

    pub fn calendar(&self) -> Result<Vec<SessionView>, SeasonError> {
        Ok(views::calendar(&*self.repository.snapshot()?))
    }

    /// Stored outcome of one session, without simulating anything.
    pub fn session_results(&self, index: i64) -> Result<Vec<OutcomeView>, SeasonError> {
        let tables = self.repository.snapshot()?;
        let session = lookup_session(&tables, index)?;
        let mut results = tables.results_for(session.index);
        order_results(&mut results);
        views::outcome_views(&tables, &results)
    }

    pub fn delete_team(&self, id: TeamId) -> Result<TeamView, SeasonError> {
        self.repository.transaction(|tables| {
            let competitors = tables
                .competitors()
                .filter(|competitor| competitor.team_id == id)
                .count();
            let Some(team) = tables.team(id) else {
                return Err(SeasonError::TeamNotFound(id));
            };
            if competitors > 0 {
                return Err(SeasonError::TeamInUse {
                    name: team.name.clone(),
                    competitors,
                });
            }
            Ok(TeamView::from(&tables.delete_team(id)?))
        })
    }

    fn run_simulator(
        &self,
        tables: &mut SeasonTables,
        index: i64,
        force: bool,
    ) -> Result<SessionRun, SeasonError> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let run = SessionSimulator::simulate(tables, index, force, &mut *rng)?;

        if run.replayed {
            debug!(index, "session already simulated, returning stored results");
        } else {
            let winner = run
                .winner()
                .and_then(|result| tables.competitor(result.competitor_id))
                .map(Competitor::display_name);
            info!(
                index,
                session_type = run.session.session_type.code(),
                gp = %run.session.gp_name,
                competitors = run.results.len(),
                winner = winner.as_deref().unwrap_or("-"),
                forced = force,
                "session simulated"
            );
        }
        Ok(run)
    }
}

fn existing(tables: &mut SeasonTables, id: CompetitorId) -> Result<&mut Competitor, SeasonError> {
    tables
        .competitor_mut(id)
        .ok_or_else(|| SeasonError::Invariant(format!("competitor {id} vanished")))
}
