use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeMap;

use super::domain::{
    CircuitType, Competitor, CompetitorId, Session, SessionResult, SessionType, Team, TeamId,
};
use super::error::SeasonError;
use super::store::SeasonTables;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompetitorView {
    pub id: CompetitorId,
    pub name: String,
    pub surname: String,
    pub country: String,
    pub number: u32,
    pub team: String,
    pub team_id: TeamId,
    pub team_logo_url: Option<String>,
    pub media_key: String,
    pub points: u32,
    pub wins: u32,
    pub podiums: u32,
    pub pole_positions: u32,
    pub fastest_laps: u32,
    pub speed: i32,
    pub racing: i32,
    pub reaction: i32,
    pub experience: i32,
    pub consistency: i32,
    pub error_rate: i32,
    pub street_affinity: i32,
    pub high_speed_affinity: i32,
    pub wet_affinity: i32,
}

impl CompetitorView {
    pub fn new(competitor: &Competitor, team: Option<&Team>) -> Self {
        let attributes = &competitor.attributes;
        let totals = &competitor.totals;
        Self {
            id: competitor.id,
            name: competitor.name.clone(),
            surname: competitor.surname.clone(),
            country: competitor.country.clone(),
            number: competitor.number,
            team: team.map(|team| team.name.clone()).unwrap_or_default(),
            team_id: competitor.team_id,
            team_logo_url: team.and_then(|team| team.logo_url.clone()),
            media_key: competitor.media_key.clone(),
            points: totals.points,
            wins: totals.wins,
            podiums: totals.podiums,
            pole_positions: totals.pole_positions,
            fastest_laps: totals.fastest_laps,
            speed: attributes.speed,
            racing: attributes.racing,
            reaction: attributes.reaction,
            experience: attributes.experience,
            consistency: attributes.consistency,
            error_rate: attributes.error_rate,
            street_affinity: attributes.affinity.street,
            high_speed_affinity: attributes.affinity.high_speed,
            wet_affinity: attributes.affinity.wet,
        }
    }
}

/// One competitor's line in a session outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeView {
    #[serde(flatten)]
    pub competitor: CompetitorView,
    pub points_gained: u32,
    pub stats_gained: i32,
    pub position: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub index: u32,
    pub gp_name: String,
    pub circuit_name: String,
    pub date: NaiveDate,
    pub session_type: SessionType,
    pub session_label: &'static str,
    pub circuit_type: CircuitType,
    pub is_simulated: bool,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            index: session.index,
            gp_name: session.gp_name.clone(),
            circuit_name: session.circuit_name.clone(),
            date: session.date,
            session_type: session.session_type,
            session_label: session.session_type.label(),
            circuit_type: session.circuit_type,
            is_simulated: session.is_simulated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamView {
    pub id: TeamId,
    pub name: String,
    pub logo_url: Option<String>,
}

impl From<&Team> for TeamView {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id,
            name: team.name.clone(),
            logo_url: team.logo_url.clone(),
        }
    }
}

/// Constructors' championship line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamStandingView {
    pub team_id: TeamId,
    pub team: String,
    pub points: u32,
    pub wins: u32,
    pub podiums: u32,
    pub competitors: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionResultsResponse {
    pub results: Vec<OutcomeView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulateNextReport {
    pub done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub session: Option<SessionView>,
    pub results: Vec<OutcomeView>,
}

impl SimulateNextReport {
    pub fn season_complete() -> Self {
        Self {
            done: true,
            message: Some("Season complete"),
            session: None,
            results: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResetReport {
    pub ok: bool,
    pub reset_skills: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub teams: usize,
    pub competitors: usize,
    pub sessions: usize,
}

/// Join result rows with the current competitor and team rows.
pub(crate) fn outcome_views(
    tables: &SeasonTables,
    results: &[SessionResult],
) -> Result<Vec<OutcomeView>, SeasonError> {
    results
        .iter()
        .map(|result| {
            let competitor = tables.competitor(result.competitor_id).ok_or_else(|| {
                SeasonError::Invariant(format!(
                    "result in session {} references missing competitor {}",
                    result.session_index, result.competitor_id
                ))
            })?;
            Ok(OutcomeView {
                competitor: CompetitorView::new(competitor, tables.team(competitor.team_id)),
                points_gained: result.points_gained,
                stats_gained: result.stats_gained,
                position: result.position,
            })
        })
        .collect()
}

/// Drivers' standings: points, then wins, then id.
pub(crate) fn standings(tables: &SeasonTables) -> Vec<CompetitorView> {
    let mut competitors: Vec<&Competitor> = tables.competitors().collect();
    competitors.sort_by_key(|competitor| {
        (
            Reverse(competitor.totals.points),
            Reverse(competitor.totals.wins),
            competitor.id,
        )
    });
    competitors
        .into_iter()
        .map(|competitor| CompetitorView::new(competitor, tables.team(competitor.team_id)))
        .collect()
}

pub(crate) fn team_standings(tables: &SeasonTables) -> Vec<TeamStandingView> {
    let mut by_team: BTreeMap<TeamId, TeamStandingView> = tables
        .teams()
        .map(|team| {
            (
                team.id,
                TeamStandingView {
                    team_id: team.id,
                    team: team.name.clone(),
                    points: 0,
                    wins: 0,
                    podiums: 0,
                    competitors: 0,
                },
            )
        })
        .collect();

    for competitor in tables.competitors() {
        if let Some(entry) = by_team.get_mut(&competitor.team_id) {
            entry.points += competitor.totals.points;
            entry.wins += competitor.totals.wins;
            entry.podiums += competitor.totals.podiums;
            entry.competitors += 1;
        }
    }

    let mut table: Vec<TeamStandingView> = by_team.into_values().collect();
    table.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.team.cmp(&b.team)));
    table
}

pub(crate) fn teams(tables: &SeasonTables) -> Vec<TeamView> {
    let mut teams: Vec<TeamView> = tables.teams().map(TeamView::from).collect();
    teams.sort_by(|a, b| a.name.cmp(&b.name));
    teams
}

pub(crate) fn calendar(tables: &SeasonTables) -> Vec<SessionView> {
    tables.sessions().map(SessionView::from).collect()
}
