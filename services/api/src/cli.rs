use crate::demo::{run_calendar, run_demo, CalendarArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use pitwall::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Pitwall",
    about = "Simulate a racing season and serve its standings over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the expanded session calendar
    Calendar(CalendarArgs),
    /// Run a season offline and print podiums and standings
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Calendar(args) => run_calendar(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve_without_subcommand() {
        let cli = Cli::try_parse_from(["pitwall"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn demo_flags_parse() {
        let cli = Cli::try_parse_from([
            "pitwall",
            "demo",
            "--seed",
            "9",
            "--sessions",
            "12",
            "--show-results",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Demo(args)) => {
                assert_eq!(args.seed, Some(9));
                assert_eq!(args.sessions, Some(12));
                assert!(args.show_results);
            }
            other => panic!("expected demo command, got {other:?}"),
        }
    }

    #[test]
    fn calendar_rejects_malformed_from_date() {
        assert!(Cli::try_parse_from(["pitwall", "calendar", "--from", "tomorrow"]).is_err());
    }
}
