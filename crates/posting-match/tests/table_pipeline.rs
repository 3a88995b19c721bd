use chrono::NaiveDate;
use posting_match::matching::{compile_acceptance_list, MatchEngine, MatchReport, MatchSettings};
use posting_match::tables::writer::{self, write_report_files};
use posting_match::tables::{MatchTableImporter, MatchTableSources, TableImportError, TableLayout};
use std::fs;
use std::path::PathBuf;

const POSTS: &str = "PMS Code,Postings,Vacancies,Match 1,Match 2,Match 3\n\
NUPNUP,NUP Polyclinics,1,M2,M1,\n\
GM,General Medicine,2,M3,,\n\
ED,Emergency,1.0,M1,M3,\n\
CLOSED,Closed Service,0,,,\n";

const OFFICERS: &str = "\u{feff}Employee ID,Employee Name,1st choice,2nd choice,3rd choice,Registration Type,Comment\n\
M1,Tan,NUPNUP,ED,GM,Conditional-L1,\n\
M2,Lee,NUPNUP,GM,,Full,Part-time\n\
M3,Goh,ED,GM,,Provisional,\n\
M4,Ong,CLOSED,ORTH,GM,,\n\
M5,Sim,,,,,\n";

const REQUIREMENTS: &str = "PMS Code,Requirement\nED,Full\n";
const FIRST_COHORT: &str = "Employee ID,Eligible for Prioritisation\nM1,Y\nM9,Y\n";

fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 6).expect("valid run date")
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("posting-match-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn import() -> posting_match::matching::MatchInput {
    MatchTableImporter::new(TableLayout::new(3, 3))
        .load(MatchTableSources {
            posts: POSTS.as_bytes(),
            officers: OFFICERS.as_bytes(),
            license_requirements: Some(REQUIREMENTS.as_bytes()),
            first_cohort: Some(FIRST_COHORT.as_bytes()),
            second_cohort: None,
        })
        .expect("tables import")
}

#[test]
fn csv_tables_run_through_engine_and_report() {
    let input = import();
    let outcome = MatchEngine::new(MatchSettings::default())
        .run(&input)
        .expect("matching succeeds");
    let report = MatchReport::build(&outcome, run_date());

    let placed: Vec<(&str, &str)> = report
        .final_matches
        .iter()
        .map(|row| (row.employee_id.as_str(), row.pms_code.as_str()))
        .collect();
    // M1 is prioritised onto NUPNUP; M3 holds ED since M1 is gated out of it.
    assert_eq!(
        placed,
        [("M3", "ED"), ("M2", "GM"), ("M4", "GM"), ("M1", "NUPNUP")]
    );

    let tan = report
        .final_matches
        .iter()
        .find(|row| row.employee_id == "M1")
        .expect("M1 placed");
    assert_eq!(tan.comment, "Priority Intake 1");

    assert_eq!(report.exceptions.len(), 1);
    assert_eq!(report.exceptions[0].employee_id, "M4");
    assert_eq!(report.exceptions[0].pms_code, "ORTH");
    assert_eq!(report.exceptions[0].reason, "unknown posting");
    assert_eq!(report.no_choice_officers[0].employee_id, "M5");
    assert_eq!(report.zero_vacancy_posts[0].pms_code, "CLOSED");
    assert!(report.unmatched_officers.is_empty());
}

#[test]
fn report_files_are_written_with_headers() {
    let input = import();
    let outcome = MatchEngine::new(MatchSettings::default())
        .run(&input)
        .expect("matching succeeds");
    let report = MatchReport::build(&outcome, run_date());
    let dir = scratch_dir("report");

    let written = write_report_files(&report, &dir).expect("report written");
    assert_eq!(written.len(), 8);

    let finals = fs::read_to_string(dir.join(writer::FINAL_MATCHES_FILE)).expect("final matches");
    let mut lines = finals.lines();
    assert_eq!(
        lines.next(),
        Some("Employee ID,Employee Name,PMS Code,Posting,Comment,Round")
    );
    assert_eq!(lines.next(), Some("M3,Goh,ED,Emergency,,Round 1"));

    let residual =
        fs::read_to_string(dir.join(writer::RESIDUAL_VACANCIES_FILE)).expect("residual vacancies");
    assert_eq!(residual, "PMS Code,Posting,Remaining Vacancies\n");

    let exceptions = fs::read_to_string(dir.join(writer::EXCEPTIONS_FILE)).expect("exceptions");
    assert_eq!(exceptions, "Employee ID,PMS Code,Reason\nM4,ORTH,unknown posting\n");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_declared_column_is_reported() {
    let error = MatchTableImporter::new(TableLayout::new(3, 4))
        .load(MatchTableSources {
            posts: POSTS.as_bytes(),
            officers: OFFICERS.as_bytes(),
            license_requirements: None,
            first_cohort: None,
            second_cohort: None,
        })
        .expect_err("Match 4 is not present");

    assert!(matches!(
        error,
        TableImportError::MissingColumn { table: "posts", ref column } if column == "Match 4"
    ));
    assert_eq!(error.to_string(), "posts table is missing column 'Match 4'");
}

#[test]
fn ranking_sheet_compiles_to_acceptance_list() {
    let sheet = "Employee ID,HOD Ranking,MO Ranking\n\
M7,2,1\n\
M3,1,\n\
M9,not ranked,1\n\
M4,2,3\n";
    let submissions = MatchTableImporter::default()
        .ranking_sheet(sheet.as_bytes())
        .expect("ranking sheet parses");

    let ranking: Vec<String> = compile_acceptance_list(&submissions)
        .into_iter()
        .map(|officer| officer.to_string())
        .collect();
    assert_eq!(ranking, ["M3", "M7", "M4"]);
}

#[test]
fn officer_with_blank_first_choice_is_unmatched_not_choiceless() {
    let posts = "PMS Code,Postings,Vacancies,Match 1\nGM,General Medicine,1,M2\n";
    let officers = "Employee ID,Employee Name,1st choice,2nd choice\n\
                    M1,Tan,,GM\n\
                    M2,Lee,GM,\n";
    let input = MatchTableImporter::new(TableLayout::new(2, 1))
        .load(MatchTableSources {
            posts: posts.as_bytes(),
            officers: officers.as_bytes(),
            license_requirements: None,
            first_cohort: None,
            second_cohort: None,
        })
        .expect("tables import");

    let outcome = MatchEngine::new(MatchSettings::default())
        .run(&input)
        .expect("matching succeeds");

    assert!(outcome.no_choice_officers.is_empty());
    let unmatched: Vec<&str> = outcome.unmatched.iter().map(|id| id.as_str()).collect();
    assert_eq!(unmatched, ["M1"]);
    assert_eq!(outcome.final_matches.len(), 1);
    assert_eq!(outcome.final_matches[0].officer.as_str(), "M2");
}
