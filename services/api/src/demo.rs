use crate::infra::{calendar_from, parse_date, SeasonSources};
use chrono::NaiveDate;
use clap::Args;
use pitwall::config::AppConfig;
use pitwall::error::AppError;
use pitwall::season::{CompetitorView, OutcomeView, SessionDefinition, TeamStandingView};
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// RNG seed for a reproducible season (defaults to SEASON_RNG_SEED, then OS entropy)
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Stop after this many sessions instead of running the whole calendar
    #[arg(long)]
    pub(crate) sessions: Option<usize>,
    /// CSV roster replacing the built-in grid
    #[arg(long)]
    pub(crate) roster_csv: Option<PathBuf>,
    /// CSV event list replacing the built-in calendar
    #[arg(long)]
    pub(crate) calendar_csv: Option<PathBuf>,
    /// Print the full classification of every session, not just the podium
    #[arg(long)]
    pub(crate) show_results: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CalendarArgs {
    /// CSV event list replacing the built-in calendar
    #[arg(long)]
    pub(crate) calendar_csv: Option<PathBuf>,
    /// Only list sessions on or after this date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) from: Option<NaiveDate>,
}

pub(crate) fn run_calendar(args: CalendarArgs) -> Result<(), AppError> {
    let calendar = calendar_from(args.calendar_csv.as_deref())?;
    let sessions = sessions_from(calendar.sessions(), args.from);

    println!("Season calendar ({} sessions)", sessions.len());
    let mut current_event = None;
    for session in &sessions {
        if current_event != Some(session.gp_name.as_str()) {
            println!(
                "\n{} | {} | {} ({})",
                session.date,
                session.gp_name,
                session.circuit_name,
                session.circuit_type.label()
            );
            current_event = Some(session.gp_name.as_str());
        }
        println!(
            "  [{:>3}] {:<3} {}",
            session.index,
            session.session_type.code(),
            session.session_type.label()
        );
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        seed,
        sessions,
        roster_csv,
        calendar_csv,
        show_results,
    } = args;

    let config = AppConfig::load()?;
    let mut sources = SeasonSources::from_config(&config.season);
    if seed.is_some() {
        sources.rng_seed = seed;
    }
    if roster_csv.is_some() {
        sources.roster_csv = roster_csv;
    }
    if calendar_csv.is_some() {
        sources.calendar_csv = calendar_csv;
    }

    let service = sources.seeded_service()?;
    let limit = sessions.unwrap_or(usize::MAX);

    println!("Season simulation demo");
    match sources.rng_seed {
        Some(seed) => println!("- RNG seed {seed}"),
        None => println!("- RNG seeded from OS entropy"),
    }
    println!("- Registry {}", service.registry().version());

    let mut simulated = 0;
    while simulated < limit {
        let report = service.simulate_next(false)?;
        let Some(session) = report.session else {
            println!("\nSeason complete after {simulated} sessions");
            break;
        };
        simulated += 1;

        println!(
            "\n[{:>3}] {} {} at {} ({})",
            session.index,
            session.gp_name,
            session.session_label,
            session.circuit_name,
            session.circuit_type.label()
        );
        if show_results {
            for line in classification_lines(&report.results) {
                println!("  {line}");
            }
        } else {
            println!("  {}", podium_line(&report.results));
        }
    }

    println!("\nDrivers' standings");
    for (rank, row) in service.standings()?.iter().enumerate() {
        println!("  {}", standing_line(rank + 1, row));
    }

    println!("\nConstructors' standings");
    for (rank, row) in service.team_standings()?.iter().enumerate() {
        println!("  {}", team_line(rank + 1, row));
    }

    Ok(())
}

fn sessions_from(
    sessions: Vec<SessionDefinition>,
    from: Option<NaiveDate>,
) -> Vec<SessionDefinition> {
    match from {
        Some(from) => sessions
            .into_iter()
            .filter(|session| session.date >= from)
            .collect(),
        None => sessions,
    }
}

fn podium_line(results: &[OutcomeView]) -> String {
    let podium: Vec<String> = results
        .iter()
        .filter(|result| matches!(result.position, Some(1..=3)))
        .map(|result| {
            format!(
                "P{} {} ({})",
                result.position.unwrap_or_default(),
                result.competitor.surname,
                result.competitor.team
            )
        })
        .collect();

    if podium.is_empty() {
        let best = results.iter().max_by_key(|result| result.stats_gained);
        match best {
            Some(result) => format!(
                "Practice: {} competitors improved, best gain +{} for {}",
                results.len(),
                result.stats_gained,
                result.competitor.surname
            ),
            None => "No competitors on track".to_string(),
        }
    } else {
        podium.join(" | ")
    }
}

fn classification_lines(results: &[OutcomeView]) -> Vec<String> {
    results
        .iter()
        .map(|result| {
            let position = result
                .position
                .map(|position| format!("P{position:<2}"))
                .unwrap_or_else(|| "-  ".to_string());
            format!(
                "{} #{:<2} {:<12} {:>2} pts  +{} skill",
                position,
                result.competitor.number,
                result.competitor.surname,
                result.points_gained,
                result.stats_gained
            )
        })
        .collect()
}

fn standing_line(rank: usize, row: &CompetitorView) -> String {
    format!(
        "{:>2}. {:<12} {:<40} {:>4} pts  {} wins  {} podiums",
        rank, row.surname, row.team, row.points, row.wins, row.podiums
    )
}

fn team_line(rank: usize, row: &TeamStandingView) -> String {
    format!(
        "{:>2}. {:<40} {:>4} pts  {} wins",
        rank, row.team, row.points, row.wins
    )
}
