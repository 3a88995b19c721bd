use crate::batch::{compile_ranking, run_batch, CompileRankingArgs, RunArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use posting_match::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "posting-match",
    about = "Assign officers to postings with two rounds of deferred acceptance",
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
    /// Match officer and posting tables and write the result CSVs
    Run(RunArgs),
    /// Turn a department ranking sheet into a posting-table row
    CompileRanking(CompileRankingArgs),
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
        Command::Run(args) => run_batch(args),
        Command::CompileRanking(args) => compile_ranking(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["posting-match"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn run_accepts_optional_tables_and_overrides() {
        let cli = Cli::try_parse_from([
            "posting-match",
            "run",
            "--posts",
            "posts.csv",
            "--officers",
            "data/officers.csv",
            "--first-cohort",
            "gdfm1.csv",
            "--run-date",
            "2025-01-06",
            "--priority-posts",
            "GM,ED",
        ])
        .expect("parses");

        let Some(Command::Run(args)) = cli.command else {
            panic!("expected run command");
        };
        assert!(args.license_requirements.is_none());
        assert_eq!(args.first_cohort.as_deref(), Some(std::path::Path::new("gdfm1.csv")));
        assert_eq!(args.priority_posts, Some(vec!["GM".to_string(), "ED".to_string()]));
        assert_eq!(
            args.output_dir(),
            std::path::PathBuf::from("data").join("output")
        );
    }

    #[test]
    fn run_rejects_malformed_date() {
        let result = Cli::try_parse_from([
            "posting-match",
            "run",
            "--posts",
            "posts.csv",
            "--officers",
            "officers.csv",
            "--run-date",
            "06/01/2025",
        ]);
        assert!(result.is_err());
    }
}
