use chrono::{Local, NaiveDate};
use clap::Args;
use posting_match::config::{AppConfig, MatchConfig};
use posting_match::error::AppError;
use posting_match::matching::{compile_acceptance_list, MatchEngine, MatchReport, PostCode};
use posting_match::tables::writer::{write_acceptance_row, write_report_files};
use posting_match::tables::{MatchTableImporter, MatchTablePaths};
use posting_match::telemetry;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct RunArgs {
    /// Posting table CSV (PMS Code, Postings, Vacancies, Match 1..N)
    #[arg(long)]
    pub(crate) posts: PathBuf,
    /// Officer table CSV (Employee ID, Employee Name, 1st choice..Kth choice)
    #[arg(long)]
    pub(crate) officers: PathBuf,
    /// Minimum registration tier per posting
    #[arg(long)]
    pub(crate) license_requirements: Option<PathBuf>,
    /// First prioritisation cohort
    #[arg(long)]
    pub(crate) first_cohort: Option<PathBuf>,
    /// Second prioritisation cohort
    #[arg(long)]
    pub(crate) second_cohort: Option<PathBuf>,
    /// Where result CSVs are written. Defaults to `output/` beside the officer table.
    #[arg(long)]
    pub(crate) output_dir: Option<PathBuf>,
    /// Date stamped on the report (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) run_date: Option<NaiveDate>,
    /// Number of choice columns on the officer table
    #[arg(long)]
    pub(crate) max_choices: Option<usize>,
    /// Number of Match columns on the posting table
    #[arg(long)]
    pub(crate) max_ranked: Option<usize>,
    /// Postings eligible for prioritisation, comma separated
    #[arg(long, value_delimiter = ',')]
    pub(crate) priority_posts: Option<Vec<String>>,
}

impl RunArgs {
    pub(crate) fn output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => self
                .officers
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join("output"),
        }
    }

    fn apply_overrides(&self, config: &mut MatchConfig) {
        if let Some(count) = self.max_choices {
            config.max_choices = count;
        }
        if let Some(count) = self.max_ranked {
            config.max_ranked = count;
        }
        if let Some(posts) = &self.priority_posts {
            config.priority_posts = posts
                .iter()
                .map(|code| code.trim())
                .filter(|code| !code.is_empty())
                .map(PostCode::new)
                .collect();
        }
    }

    fn table_paths(&self) -> MatchTablePaths {
        MatchTablePaths {
            posts: self.posts.clone(),
            officers: self.officers.clone(),
            license_requirements: self.license_requirements.clone(),
            first_cohort: self.first_cohort.clone(),
            second_cohort: self.second_cohort.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct CompileRankingArgs {
    /// Ranking sheet CSV (Employee ID, HOD Ranking, MO Ranking)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Posting code for the output row. Defaults to the input file stem.
    #[arg(long)]
    pub(crate) post_code: Option<String>,
}

pub(crate) fn run_batch(args: RunArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    args.apply_overrides(&mut config.matching);
    telemetry::init(&config.telemetry)?;

    let importer = MatchTableImporter::new(config.matching.layout());
    let input = importer.load_paths(&args.table_paths())?;
    let outcome = MatchEngine::new(config.matching.settings()).run(&input)?;

    let run_date = args.run_date.unwrap_or_else(|| Local::now().date_naive());
    let report = MatchReport::build(&outcome, run_date);
    let output_dir = args.output_dir();
    let written = write_report_files(&report, &output_dir)?;
    info!(dir = %output_dir.display(), files = written.len(), "wrote match results");

    render_summary(&report, &output_dir);
    Ok(())
}

pub(crate) fn compile_ranking(args: CompileRankingArgs) -> Result<(), AppError> {
    let submissions = MatchTableImporter::default().ranking_sheet_from_path(&args.input)?;
    let ranking = compile_acceptance_list(&submissions);

    let post_code = args.post_code.unwrap_or_else(|| {
        args.input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    write_acceptance_row(std::io::stdout().lock(), &PostCode::new(post_code), &ranking)?;
    Ok(())
}

fn render_summary(report: &MatchReport, output_dir: &Path) {
    let summary = &report.summary;

    println!("Posting match run ({})", report.run_date);
    println!("Officers considered: {}", summary.officers);
    println!("- matched in round 1: {}", summary.matched_round_one);
    println!("- matched in round 2: {}", summary.matched_round_two);
    println!("- unmatched: {}", summary.unmatched);
    println!("- without choices: {}", summary.no_choice);

    if report.promotions.is_empty() {
        println!("\nPrioritised officers: none");
    } else {
        println!("\nPrioritised officers");
        for promotion in &report.promotions {
            println!(
                "- {} ({}) -> {}, {}, previously ranked {}",
                promotion.employee_id,
                promotion.employee_name,
                promotion.pms_code,
                promotion.cohort_label,
                promotion.original_rank
            );
        }
    }

    if report.exceptions.is_empty() {
        println!("\nExceptions: none");
    } else {
        println!("\nExceptions");
        for exception in &report.exceptions {
            println!(
                "- {} listed {} ({})",
                exception.employee_id, exception.pms_code, exception.reason
            );
        }
    }

    println!(
        "\nResidual vacancies: {} across {} postings",
        summary.residual_vacancies,
        report.residual_vacancies.len()
    );
    println!("Postings without vacancies: {}", summary.zero_vacancy_posts);
    println!("\nResults written to {}", output_dir.display());
}
