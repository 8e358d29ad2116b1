use rand::Rng;

use super::domain::{Session, SessionResult};
use super::error::SeasonError;
use super::scoring::{
    base_score, credit_totals, points_for, practice_boost, rank, ranked_score, stats_gain,
};
use super::store::SeasonTables;

/// Outcome of one simulate call against the tables.
#[derive(Debug, Clone)]
pub struct SessionRun {
    pub session: Session,
    /// Ranked rows by position, then unranked rows by competitor id.
    pub results: Vec<SessionResult>,
    /// True when the stored results were returned without simulating.
    pub replayed: bool,
}

impl SessionRun {
    pub fn winner(&self) -> Option<&SessionResult> {
        self.results
            .first()
            .filter(|result| result.position == Some(1))
    }
}

/// Stateless scoring engine; all state lives in the tables handed to it.
pub struct SessionSimulator;

impl SessionSimulator {
    /// Simulate the session at `index`, or replay it when it already ran and
    /// `force` is off. The caller owns atomicity: on `Err` the tables must be
    /// discarded.
    pub fn simulate<R: Rng>(
        tables: &mut SeasonTables,
        index: i64,
        force: bool,
        rng: &mut R,
    ) -> Result<SessionRun, SeasonError> {
        let session = lookup_session(tables, index)?.clone();

        if session.is_simulated && !force {
            let mut results = tables.results_for(session.index);
            order_results(&mut results);
            return Ok(SessionRun {
                session,
                results,
                replayed: true,
            });
        }

        tables.clear_results(session.index);

        let mut results = if session.session_type.is_ranked() {
            run_ranked(tables, &session, rng)?
        } else {
            run_practice(tables, &session, rng)?
        };

        for result in &results {
            tables.insert_result(*result)?;
        }

        let stored = tables
            .session_mut(session.index)
            .ok_or(SeasonError::SessionNotFound(index))?;
        stored.is_simulated = true;
        let session = stored.clone();

        order_results(&mut results);
        Ok(SessionRun {
            session,
            results,
            replayed: false,
        })
    }
}

pub(crate) fn lookup_session(tables: &SeasonTables, index: i64) -> Result<&Session, SeasonError> {
    u32::try_from(index)
        .ok()
        .and_then(|index| tables.session(index))
        .ok_or(SeasonError::SessionNotFound(index))
}

/// Positions ascending, unranked entries last in competitor order.
pub(crate) fn order_results(results: &mut [SessionResult]) {
    results.sort_by_key(|result| {
        (
            result.position.is_none(),
            result.position.unwrap_or(u32::MAX),
            result.competitor_id,
        )
    });
}

fn run_practice<R: Rng>(
    tables: &mut SeasonTables,
    session: &Session,
    rng: &mut R,
) -> Result<Vec<SessionResult>, SeasonError> {
    let mut results = Vec::new();

    for id in tables.competitor_ids() {
        let competitor = tables
            .competitor_mut(id)
            .ok_or_else(|| SeasonError::Invariant(format!("competitor {id} vanished")))?;

        let base = base_score(&competitor.attributes, session.circuit_type);
        let boost = practice_boost(base, rng);
        competitor.attributes.boost(boost);

        results.push(SessionResult {
            session_index: session.index,
            competitor_id: id,
            position: None,
            points_gained: 0,
            stats_gained: boost,
        });
    }

    Ok(results)
}

fn run_ranked<R: Rng>(
    tables: &mut SeasonTables,
    session: &Session,
    rng: &mut R,
) -> Result<Vec<SessionResult>, SeasonError> {
    let scores = tables
        .competitors()
        .map(|competitor| {
            let base = base_score(&competitor.attributes, session.circuit_type);
            (competitor.id, ranked_score(base, rng))
        })
        .collect();

    let mut results = Vec::new();
    for entry in rank(scores) {
        let competitor = tables.competitor_mut(entry.competitor_id).ok_or_else(|| {
            SeasonError::Invariant(format!("competitor {} vanished", entry.competitor_id))
        })?;

        let points = points_for(session.session_type, entry.position);
        let gain = stats_gain(entry.score);
        competitor.attributes.boost(gain);
        credit_totals(
            &mut competitor.totals,
            session.session_type,
            entry.position,
            points,
        );

        results.push(SessionResult {
            session_index: session.index,
            competitor_id: entry.competitor_id,
            position: Some(entry.position),
            points_gained: points,
            stats_gained: gain,
        });
    }

    Ok(results)
}
