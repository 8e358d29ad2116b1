use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::domain::{Competitor, CompetitorId, NaturalKey, Session, SessionResult, Team, TeamId};

/// Every persisted row of a season: teams, competitors, sessions and results.
///
/// Results are keyed by (session index, competitor) so a pair can hold at most
/// one row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeasonTables {
    teams: BTreeMap<TeamId, Team>,
    competitors: BTreeMap<CompetitorId, Competitor>,
    sessions: BTreeMap<u32, Session>,
    results: BTreeMap<(u32, CompetitorId), SessionResult>,
    next_team_id: u32,
    next_competitor_id: u32,
}

impl SeasonTables {
    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.values()
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.get(&id)
    }

    pub fn team_by_name(&self, name: &str) -> Option<&Team> {
        self.teams.values().find(|team| team.name == name)
    }

    /// Get-or-create a team by name.
    pub fn ensure_team(&mut self, name: &str) -> TeamId {
        if let Some(team) = self.team_by_name(name) {
            return team.id;
        }

        self.next_team_id += 1;
        let id = TeamId(self.next_team_id);
        self.teams.insert(
            id,
            Team {
                id,
                name: name.to_string(),
                logo_url: None,
            },
        );
        id
    }

    /// Remove a team nobody races for.
    pub fn delete_team(&mut self, id: TeamId) -> Result<Team, RepositoryError> {
        let team = self
            .teams
            .get(&id)
            .ok_or_else(|| RepositoryError::NotFound(format!("team {id}")))?;

        let referenced = self
            .competitors
            .values()
            .filter(|competitor| competitor.team_id == id)
            .count();
        if referenced > 0 {
            return Err(RepositoryError::Conflict(format!(
                "team `{}` is still referenced by {referenced} competitor(s)",
                team.name
            )));
        }

        self.teams
            .remove(&id)
            .ok_or_else(|| RepositoryError::NotFound(format!("team {id}")))
    }

    pub fn competitors(&self) -> impl Iterator<Item = &Competitor> {
        self.competitors.values()
    }

    pub fn competitor_ids(&self) -> Vec<CompetitorId> {
        self.competitors.keys().copied().collect()
    }

    pub fn competitor(&self, id: CompetitorId) -> Option<&Competitor> {
        self.competitors.get(&id)
    }

    pub fn competitor_mut(&mut self, id: CompetitorId) -> Option<&mut Competitor> {
        self.competitors.get_mut(&id)
    }

    pub fn competitor_by_key(&self, key: &NaturalKey) -> Option<CompetitorId> {
        self.competitors
            .values()
            .find(|competitor| {
                competitor.surname == key.surname
                    && competitor.name == key.name
                    && competitor.number == key.number
            })
            .map(|competitor| competitor.id)
    }

    /// Insert a new competitor, assigning its id. Rejects a taken natural key.
    pub fn insert_competitor(
        &mut self,
        mut competitor: Competitor,
    ) -> Result<CompetitorId, RepositoryError> {
        let key = competitor.natural_key();
        if self.competitor_by_key(&key).is_some() {
            return Err(RepositoryError::Conflict(format!(
                "competitor {key} already exists"
            )));
        }
        if !self.teams.contains_key(&competitor.team_id) {
            return Err(RepositoryError::NotFound(format!(
                "team {}",
                competitor.team_id
            )));
        }

        self.next_competitor_id += 1;
        let id = CompetitorId(self.next_competitor_id);
        competitor.id = id;
        self.competitors.insert(id, competitor);
        Ok(id)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    pub fn session(&self, index: u32) -> Option<&Session> {
        self.sessions.get(&index)
    }

    pub fn session_mut(&mut self, index: u32) -> Option<&mut Session> {
        self.sessions.get_mut(&index)
    }

    /// Lowest-index session still waiting to be simulated.
    pub fn next_pending_session(&self) -> Option<&Session> {
        self.sessions.values().find(|session| !session.is_simulated)
    }

    pub(crate) fn put_session(&mut self, session: Session) {
        self.sessions.insert(session.index, session);
    }

    pub fn results_for(&self, index: u32) -> Vec<SessionResult> {
        self.results
            .range((index, CompetitorId(u32::MIN))..=(index, CompetitorId(u32::MAX)))
            .map(|(_, result)| *result)
            .collect()
    }

    pub fn result_count(&self) -> usize {
        self.results.len()
    }

    pub fn insert_result(&mut self, result: SessionResult) -> Result<(), RepositoryError> {
        let key = (result.session_index, result.competitor_id);
        if self.results.contains_key(&key) {
            return Err(RepositoryError::Conflict(format!(
                "result for competitor {} in session {} already exists",
                result.competitor_id, result.session_index
            )));
        }
        self.results.insert(key, result);
        Ok(())
    }

    /// Drop every result row of one session, returning how many were removed.
    pub fn clear_results(&mut self, index: u32) -> usize {
        let before = self.results.len();
        self.results.retain(|(session_index, _), _| *session_index != index);
        before - self.results.len()
    }

    pub fn clear_all_results(&mut self) -> usize {
        let removed = self.results.len();
        self.results.clear();
        removed
    }

    /// Wipe the whole season, identifiers included.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Storage abstraction so the controller can be exercised against any backend.
///
/// `transaction` hands `work` exclusive access to the tables and commits its
/// changes only when it returns `Ok`; an `Err` leaves the stored season as it was.
pub trait SeasonRepository: Send + Sync {
    fn snapshot(&self) -> Result<Arc<SeasonTables>, RepositoryError>;

    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut SeasonTables) -> Result<T, E>,
        E: From<RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// In-process store. Writers are serialised; readers get the last committed
/// tables and are never blocked behind a running transaction.
#[derive(Debug, Default)]
pub struct InMemorySeasonRepository {
    committed: RwLock<Arc<SeasonTables>>,
    writer: Mutex<()>,
}

impl InMemorySeasonRepository {
    pub fn with_tables(tables: SeasonTables) -> Self {
        Self {
            committed: RwLock::new(Arc::new(tables)),
            writer: Mutex::new(()),
        }
    }
}

impl SeasonRepository for InMemorySeasonRepository {
    fn snapshot(&self) -> Result<Arc<SeasonTables>, RepositoryError> {
        let guard = self
            .committed
            .read()
            .map_err(|_| RepositoryError::Unavailable("season tables lock poisoned".to_string()))?;
        Ok(Arc::clone(&guard))
    }

    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut SeasonTables) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        // Work runs on a private copy, so a panic inside it leaves nothing half-written.
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let mut working = SeasonTables::clone(&*self.snapshot()?);
        let outcome = work(&mut working)?;

        let mut committed = self
            .committed
            .write()
            .map_err(|_| RepositoryError::Unavailable("season tables lock poisoned".to_string()))?;
        *committed = Arc::new(working);
        Ok(outcome)
    }
}
