use super::common::*;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use crate::season::domain::{SKILL_CEILING, SKILL_FLOOR};
use crate::season::error::SeasonError;
use crate::season::registry::CompetitorRegistry;
use crate::season::scoring::RACE_POINTS;
use crate::season::service::SeasonService;
use crate::season::store::InMemorySeasonRepository;

#[test]
fn ranked_session_assigns_each_position_once() {
    let (service, _) = seeded_service();

    for index in [1, 2, 4, 5, 6, 7] {
        let results = service
            .simulate_session(index, false)
            .expect("simulation succeeds");
        let positions: Vec<u32> = results.iter().filter_map(|r| r.position).collect();

        assert_eq!(positions, [1, 2, 3, 4], "session {index}");
        let competitors: BTreeSet<_> = results.iter().map(|r| r.competitor.id).collect();
        assert_eq!(competitors.len(), 4);
    }
}

#[test]
fn race_points_sum_matches_truncated_table() {
    let (service, repository) = seeded_service();

    let results = service.simulate_session(2, false).expect("race runs");

    let awarded: u32 = results.iter().map(|r| r.points_gained).sum();
    let expected: u32 = RACE_POINTS.iter().take(4).sum();
    assert_eq!(awarded, expected);

    let tables = snapshot(&repository);
    let credited: u32 = tables.competitors().map(|c| c.totals.points).sum();
    assert_eq!(credited, expected);
    assert_eq!(tables.competitors().map(|c| c.totals.wins).sum::<u32>(), 1);
    assert_eq!(tables.competitors().map(|c| c.totals.podiums).sum::<u32>(), 3);
}

#[test]
fn race_points_pad_with_zero_beyond_the_table() {
    let entries = (0..12)
        .map(|slot| baseline(&format!("Driver{slot}"), "Grid", slot + 1, 8, 3))
        .collect();
    let registry = CompetitorRegistry::new("grid", entries).expect("valid registry");
    let (service, _) = seeded_service_with(registry, &short_calendar());

    let results = service.simulate_session(2, false).expect("race runs");

    assert_eq!(results.len(), 12);
    let awarded: u32 = results.iter().map(|r| r.points_gained).sum();
    assert_eq!(awarded, RACE_POINTS.iter().sum::<u32>());
    assert!(results[10..].iter().all(|r| r.points_gained == 0));
}

#[test]
fn replaying_a_session_is_byte_identical() {
    let (service, repository) = seeded_service();

    for index in [0, 1, 2] {
        let first = service.simulate_session(index, false).expect("first run");
        let tables_after_first = snapshot(&repository);
        let second = service.simulate_session(index, false).expect("replay");

        assert_eq!(
            serde_json::to_vec(&first).expect("serialize"),
            serde_json::to_vec(&second).expect("serialize"),
            "session {index}"
        );
        assert_eq!(*snapshot(&repository), *tables_after_first);
    }
}

#[test]
fn forced_rerun_replaces_every_row() {
    let (service, repository) = seeded_service();
    service.simulate_session(1, false).expect("first run");
    let poles_before: u32 = snapshot(&repository)
        .competitors()
        .map(|c| c.totals.pole_positions)
        .sum();

    let rerun = service.simulate_session(1, true).expect("forced rerun");

    let tables = snapshot(&repository);
    let stored = tables.results_for(1);
    assert_eq!(stored.len(), 4);
    let positions: BTreeSet<u32> = stored.iter().filter_map(|r| r.position).collect();
    assert_eq!(positions, BTreeSet::from([1, 2, 3, 4]));
    assert_eq!(tables.result_count(), 4);
    assert_eq!(rerun.len(), 4);
    // totals accumulate across forced reruns
    let poles: u32 = tables.competitors().map(|c| c.totals.pole_positions).sum();
    assert_eq!(poles, poles_before + 1);
}

#[test]
fn practice_for_two_competitors_raises_speed_without_points() {
    let (service, repository) = seeded_service_with(duo_registry(), &short_calendar());
    let before: Vec<i32> = snapshot(&repository)
        .competitors()
        .map(|c| c.attributes.speed)
        .collect();

    let results = service.simulate_session(0, false).expect("practice runs");

    assert_eq!(results.len(), 2);
    for result in &results {
        assert_eq!(result.points_gained, 0);
        assert_eq!(result.position, None);
        assert!(result.stats_gained >= 1);
    }
    let after: Vec<i32> = snapshot(&repository)
        .competitors()
        .map(|c| c.attributes.speed)
        .collect();
    assert!(after.iter().zip(&before).all(|(after, before)| after > before));
}

#[test]
fn skills_stay_within_bounds_over_a_full_season() {
    let registry = CompetitorRegistry::new(
        "ceiling",
        vec![
            baseline("Hart", "Comet", 3, 99, 9),
            baseline("Lowe", "Comet", 7, 97, 2),
        ],
    )
    .expect("valid registry");
    let (service, repository) = seeded_service_with(registry, &calendar());

    while !service.simulate_next(false).expect("next runs").done {}

    let tables = snapshot(&repository);
    assert!(tables.sessions().all(|s| s.is_simulated));
    for competitor in tables.competitors() {
        let a = competitor.attributes;
        for value in [a.speed, a.racing, a.reaction, a.experience] {
            assert!((SKILL_FLOOR..=SKILL_CEILING).contains(&value));
        }
        assert_eq!(a.speed, SKILL_CEILING);
    }
}

#[test]
fn unknown_session_indices_are_rejected_without_mutation() {
    let (service, repository) = seeded_service();
    let before = snapshot(&repository);

    for index in [-1, 9999] {
        match service.simulate_session(index, false) {
            Err(SeasonError::SessionNotFound(missing)) => assert_eq!(missing, index),
            other => panic!("expected not found for {index}, got {other:?}"),
        }
    }

    assert_eq!(*snapshot(&repository), *before);
}

#[test]
fn simulate_next_walks_the_calendar_in_order() {
    let (service, _) = seeded_service_with(registry(), &short_calendar());

    let mut visited = Vec::new();
    loop {
        let report = service.simulate_next(false).expect("next runs");
        if report.done {
            assert_eq!(report.message, Some("Season complete"));
            break;
        }
        let session = report.session.expect("session present");
        assert!(session.is_simulated);
        assert_eq!(report.results.len(), 4);
        visited.push(session.index);
    }

    assert_eq!(visited, [0, 1, 2]);
}

#[test]
fn simulate_next_on_completed_season_changes_nothing() {
    let (service, repository) = seeded_service_with(registry(), &short_calendar());
    for index in 0..3 {
        service.simulate_session(index, false).expect("session runs");
    }
    let before = snapshot(&repository);

    let report = service.simulate_next(true).expect("next runs");

    assert!(report.done);
    assert!(report.session.is_none());
    assert!(report.results.is_empty());
    let payload = serde_json::to_value(&report).expect("serialize");
    assert_eq!(payload["session"], serde_json::Value::Null);
    assert_eq!(*snapshot(&repository), *before);
}

#[test]
fn concurrent_requests_for_one_session_simulate_it_once() {
    let repository = Arc::new(InMemorySeasonRepository::default());
    let service = Arc::new(SeasonService::with_seed(
        Arc::clone(&repository),
        registry(),
        SEED,
    ));
    service.seed(&calendar(), false).expect("seed succeeds");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || service.simulate_session(2, false).expect("simulation"))
        })
        .collect();
    let outcomes: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread completes"))
        .collect();

    assert!(outcomes.windows(2).all(|pair| pair[0] == pair[1]));
    let tables = snapshot(&repository);
    assert_eq!(tables.result_count(), 4);
    let points: u32 = tables.competitors().map(|c| c.totals.points).sum();
    assert_eq!(points, RACE_POINTS.iter().take(4).sum::<u32>());
}

#[test]
fn concurrent_simulate_next_calls_each_claim_a_distinct_session() {
    let repository = Arc::new(InMemorySeasonRepository::default());
    let service = Arc::new(SeasonService::with_seed(
        Arc::clone(&repository),
        registry(),
        SEED,
    ));
    service.seed(&calendar(), false).expect("seed succeeds");

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || service.simulate_next(false).expect("simulate next"))
        })
        .collect();
    let claimed: BTreeSet<u32> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread completes"))
        .map(|report| {
            assert!(!report.done);
            assert_eq!(report.results.len(), 4);
            report.session.expect("session metadata").index
        })
        .collect();

    assert_eq!(claimed, (0..6).collect::<BTreeSet<u32>>());
    let tables = snapshot(&repository);
    for session in tables.sessions() {
        let expected = if session.index < 6 { 4 } else { 0 };
        assert_eq!(tables.results_for(session.index).len(), expected);
        assert_eq!(session.is_simulated, session.index < 6);
    }
    assert_eq!(tables.result_count(), 6 * 4);
}

#[test]
fn same_seed_gives_same_season() {
    let (first, _) = seeded_service();
    let (second, _) = seeded_service();

    for index in 0..8 {
        assert_eq!(
            first.simulate_session(index, false).expect("first"),
            second.simulate_session(index, false).expect("second"),
        );
    }
    assert_eq!(
        first.standings().expect("standings"),
        second.standings().expect("standings")
    );
}
