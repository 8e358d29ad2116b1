use rand::Rng;
use std::cmp::Reverse;
use std::ops::RangeInclusive;

use super::domain::{CareerTotals, CircuitType, CompetitorId, SessionType, SkillAttributes};

pub const RACE_POINTS: [u32; 10] = [25, 18, 15, 12, 10, 8, 6, 4, 2, 1];
pub const SPRINT_POINTS: [u32; 10] = [10, 9, 8, 7, 6, 5, 4, 3, 2, 1];

pub const PRACTICE_BOOST: RangeInclusive<i32> = 1..=4;
pub const SCORE_JITTER: RangeInclusive<i32> = -5..=5;

/// Base score divisor applied to the practice boost.
const PRACTICE_BASE_DIVISOR: i32 = 50;
/// Score divisor giving the attribute gain of a ranked session.
const STATS_GAIN_DIVISOR: i32 = 20;

/// `2*speed + 2*racing + reaction + experience` plus the affinity of the circuit.
pub fn base_score(attributes: &SkillAttributes, circuit: CircuitType) -> i32 {
    attributes
        .speed
        .saturating_mul(2)
        .saturating_add(attributes.racing.saturating_mul(2))
        .saturating_add(attributes.reaction)
        .saturating_add(attributes.experience)
        .saturating_add(attributes.affinity.for_circuit(circuit))
}

pub fn points_table(session_type: SessionType) -> &'static [u32] {
    match session_type {
        SessionType::Race => &RACE_POINTS,
        SessionType::Sprint => &SPRINT_POINTS,
        SessionType::Practice | SessionType::SprintQualifying | SessionType::Qualifying => &[],
    }
}

/// Points for a 1-based finishing position; anything past the table scores zero.
pub fn points_for(session_type: SessionType, position: u32) -> u32 {
    let table = points_table(session_type);
    position
        .checked_sub(1)
        .and_then(|slot| table.get(slot as usize))
        .copied()
        .unwrap_or(0)
}

pub fn practice_boost<R: Rng>(base: i32, rng: &mut R) -> i32 {
    rng.random_range(PRACTICE_BOOST)
        .saturating_add(base.div_euclid(PRACTICE_BASE_DIVISOR))
}

pub fn ranked_score<R: Rng>(base: i32, rng: &mut R) -> i32 {
    base.saturating_add(rng.random_range(SCORE_JITTER))
}

pub fn stats_gain(score: i32) -> i32 {
    score.div_euclid(STATS_GAIN_DIVISOR).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedEntry {
    pub competitor_id: CompetitorId,
    pub score: i32,
    pub position: u32,
}

/// Order by score descending; equal scores go to the lower competitor id.
pub fn rank(mut scores: Vec<(CompetitorId, i32)>) -> Vec<RankedEntry> {
    scores.sort_by_key(|(competitor_id, score)| (Reverse(*score), *competitor_id));
    scores
        .into_iter()
        .enumerate()
        .map(|(slot, (competitor_id, score))| RankedEntry {
            competitor_id,
            score,
            position: slot as u32 + 1,
        })
        .collect()
}

/// Credit poles, wins, podiums and fastest laps for a ranked finish.
pub fn credit_totals(
    totals: &mut CareerTotals,
    session_type: SessionType,
    position: u32,
    points: u32,
) {
    totals.points += points;

    if session_type.is_qualifying() && position == 1 {
        totals.pole_positions += 1;
    }

    if session_type.is_race() {
        // fastest lap is credited to the winner
        if position == 1 {
            totals.fastest_laps += 1;
            if session_type == SessionType::Race {
                totals.wins += 1;
            }
        }
        if position <= 3 {
            totals.podiums += 1;
        }
    }
}
