use super::layout::choice_header;
use crate::matching::report::views::{
    ExceptionRow, MatchRow, NoChoiceOfficerRow, PromotionRow, ResidualVacancyRow,
    UnmatchedOfficerRow, ZeroVacancyPostRow,
};
use crate::matching::{MatchReport, OfficerId, PostCode};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const FINAL_MATCHES_FILE: &str = "final_matches.csv";
pub const ROUND_ONE_MATCHES_FILE: &str = "round_one_matches.csv";
pub const UNMATCHED_OFFICERS_FILE: &str = "unmatched_officers.csv";
pub const RESIDUAL_VACANCIES_FILE: &str = "residual_vacancies.csv";
pub const EXCEPTIONS_FILE: &str = "exceptions.csv";
pub const NO_CHOICE_OFFICERS_FILE: &str = "no_choice_officers.csv";
pub const ZERO_VACANCY_POSTS_FILE: &str = "zero_vacancy_posts.csv";
pub const PROMOTIONS_FILE: &str = "priority_promotions.csv";

/// Writes every report table into `dir`, creating it when missing.
pub fn write_report_files(report: &MatchReport, dir: &Path) -> Result<Vec<PathBuf>, csv::Error> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(8);

    let mut create = |name: &str| -> Result<File, csv::Error> {
        let path = dir.join(name);
        let file = File::create(&path)?;
        written.push(path);
        Ok(file)
    };

    write_matches(create(FINAL_MATCHES_FILE)?, &report.final_matches)?;
    write_matches(create(ROUND_ONE_MATCHES_FILE)?, &report.round_one_matches)?;
    write_unmatched_officers(create(UNMATCHED_OFFICERS_FILE)?, &report.unmatched_officers)?;
    write_residual_vacancies(create(RESIDUAL_VACANCIES_FILE)?, &report.residual_vacancies)?;
    write_exceptions(create(EXCEPTIONS_FILE)?, &report.exceptions)?;
    write_no_choice_officers(create(NO_CHOICE_OFFICERS_FILE)?, &report.no_choice_officers)?;
    write_zero_vacancy_posts(create(ZERO_VACANCY_POSTS_FILE)?, &report.zero_vacancy_posts)?;
    write_promotions(create(PROMOTIONS_FILE)?, &report.promotions)?;

    Ok(written)
}

pub fn write_matches<W: Write>(writer: W, rows: &[MatchRow]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["Employee ID", "Employee Name", "PMS Code", "Posting", "Comment", "Round"])?;
    for row in rows {
        csv_writer.write_record([
            row.employee_id.as_str(),
            row.employee_name.as_str(),
            row.pms_code.as_str(),
            row.posting.as_str(),
            row.comment.as_str(),
            row.round_label,
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Choice columns widen to the longest preference list among the rows.
pub fn write_unmatched_officers<W: Write>(
    writer: W,
    rows: &[UnmatchedOfficerRow],
) -> Result<(), csv::Error> {
    let width = rows.iter().map(|row| row.choices.len()).max().unwrap_or(0);
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header: Vec<String> = ["Employee ID", "Employee Name", "Registration Type", "Comment"]
        .into_iter()
        .map(String::from)
        .collect();
    header.extend((1..=width).map(choice_header));
    csv_writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![
            row.employee_id.clone(),
            row.employee_name.clone(),
            row.license.map(|tier| tier.label().to_string()).unwrap_or_default(),
            row.comment.clone(),
        ];
        record.extend(row.choices.iter().cloned());
        record.resize(header.len(), String::new());
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_residual_vacancies<W: Write>(
    writer: W,
    rows: &[ResidualVacancyRow],
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["PMS Code", "Posting", "Remaining Vacancies"])?;
    for row in rows {
        csv_writer.write_record([
            row.pms_code.clone(),
            row.posting.clone(),
            row.remaining_vacancies.to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_exceptions<W: Write>(writer: W, rows: &[ExceptionRow]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["Employee ID", "PMS Code", "Reason"])?;
    for row in rows {
        csv_writer.write_record([
            row.employee_id.as_str(),
            row.pms_code.as_str(),
            row.reason.as_str(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_no_choice_officers<W: Write>(
    writer: W,
    rows: &[NoChoiceOfficerRow],
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["Employee ID", "Employee Name"])?;
    for row in rows {
        csv_writer.write_record([row.employee_id.as_str(), row.employee_name.as_str()])?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_zero_vacancy_posts<W: Write>(
    writer: W,
    rows: &[ZeroVacancyPostRow],
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["PMS Code", "Postings"])?;
    for row in rows {
        csv_writer.write_record([row.pms_code.as_str(), row.posting.as_str()])?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_promotions<W: Write>(writer: W, rows: &[PromotionRow]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["Employee ID", "Employee Name", "PMS Code", "Cohort", "Original Rank"])?;
    for row in rows {
        csv_writer.write_record([
            row.employee_id.clone(),
            row.employee_name.clone(),
            row.pms_code.clone(),
            row.cohort_label.to_string(),
            row.original_rank.to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// One posting-table row: `PMS Code,Match 1,...` for a compiled acceptance list.
pub fn write_acceptance_row<W: Write>(
    writer: W,
    post: &PostCode,
    ranking: &[OfficerId],
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut header = vec!["PMS Code".to_string()];
    header.extend((1..=ranking.len()).map(|position| format!("Match {position}")));
    csv_writer.write_record(&header)?;

    let mut record = vec![post.as_str()];
    record.extend(ranking.iter().map(OfficerId::as_str));
    csv_writer.write_record(&record)?;
    csv_writer.flush()?;
    Ok(())
}
