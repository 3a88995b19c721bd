use super::layout::TableLayout;
use super::normalizer::{clean_cell, normalize_header};
use super::TableImportError;
use crate::matching::ranking::RankingSubmission;
use crate::matching::{Choice, LicenseRequirements, LicenseTier, Officer, Post, PostCode, PriorityCandidate};
use csv::StringRecord;
use std::collections::HashMap;
use std::io::Read;
use tracing::warn;

const EMPLOYEE_ID: &str = "Employee ID";
const EMPLOYEE_NAME: &str = "Employee Name";
const REGISTRATION_TYPE: &str = "Registration Type";
const COMMENT: &str = "Comment";
const PMS_CODE: &str = "PMS Code";
const POSTINGS: &str = "Postings";
const VACANCIES: &str = "Vacancies";
const REQUIREMENT: &str = "Requirement";
const PRIORITISATION: &str = "Eligible for Prioritisation";
const HOD_RANKING: &str = "HOD Ranking";
const MO_RANKING: &str = "MO Ranking";

/// Column positions keyed by normalized header text.
struct HeaderIndex {
    table: &'static str,
    columns: HashMap<String, usize>,
}

impl HeaderIndex {
    fn new(table: &'static str, headers: &StringRecord) -> Self {
        let mut columns = HashMap::with_capacity(headers.len());
        for (position, header) in headers.iter().enumerate() {
            columns.entry(normalize_header(header)).or_insert(position);
        }
        Self { table, columns }
    }

    fn require(&self, column: &str) -> Result<usize, TableImportError> {
        self.optional(column)
            .ok_or_else(|| TableImportError::MissingColumn {
                table: self.table,
                column: column.to_string(),
            })
    }

    fn require_all(&self, columns: &[String]) -> Result<Vec<usize>, TableImportError> {
        columns.iter().map(|column| self.require(column)).collect()
    }

    fn optional(&self, column: &str) -> Option<usize> {
        self.columns.get(&normalize_header(column)).copied()
    }
}

fn open<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader)
}

fn cell(record: &StringRecord, position: usize) -> Option<String> {
    record.get(position).and_then(clean_cell)
}

pub(crate) fn parse_posts<R: Read>(
    reader: R,
    layout: &TableLayout,
) -> Result<Vec<Post>, TableImportError> {
    let mut csv_reader = open(reader);
    let headers = HeaderIndex::new("posts", csv_reader.headers()?);
    let code_column = headers.require(PMS_CODE)?;
    let label_column = headers.require(POSTINGS)?;
    let vacancy_column = headers.require(VACANCIES)?;
    let ranked_columns = headers.require_all(&layout.ranked_headers())?;

    let mut posts = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let Some(code) = cell(&record, code_column) else {
            continue;
        };
        let raw_vacancies = cell(&record, vacancy_column).unwrap_or_default();
        let vacancies =
            parse_vacancies(&raw_vacancies).ok_or_else(|| TableImportError::InvalidVacancies {
                post: code.clone(),
                value: raw_vacancies.clone(),
            })?;
        let label = cell(&record, label_column).unwrap_or_default();
        let ranking: Vec<String> = ranked_columns
            .iter()
            .filter_map(|&position| cell(&record, position))
            .collect();

        posts.push(Post::new(code, label, vacancies).with_ranking(ranking));
    }

    Ok(posts)
}

/// Whole, non-negative counts; spreadsheet exports sometimes write `3.0`.
fn parse_vacancies(value: &str) -> Option<u32> {
    if let Ok(count) = value.parse::<u32>() {
        return Some(count);
    }

    let count = value.parse::<f64>().ok()?;
    if count.is_finite() && count >= 0.0 && count.fract() == 0.0 && count <= f64::from(u32::MAX) {
        Some(count as u32)
    } else {
        None
    }
}

pub(crate) fn parse_officers<R: Read>(
    reader: R,
    layout: &TableLayout,
) -> Result<Vec<Officer>, TableImportError> {
    let mut csv_reader = open(reader);
    let headers = HeaderIndex::new("officers", csv_reader.headers()?);
    let id_column = headers.require(EMPLOYEE_ID)?;
    let name_column = headers.require(EMPLOYEE_NAME)?;
    let choice_columns = headers.require_all(&layout.choice_headers())?;
    let license_column = headers.optional(REGISTRATION_TYPE);
    let comment_column = headers.optional(COMMENT);

    let mut officers = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let Some(id) = cell(&record, id_column) else {
            continue;
        };

        let mut officer = Officer::new(id, cell(&record, name_column).unwrap_or_default());
        // A blank cell ends the preference list.
        let cells: Vec<Option<String>> = choice_columns
            .iter()
            .map(|&position| cell(&record, position))
            .collect();
        let listed = cells.iter().take_while(|value| value.is_some()).count();
        officer.choices = cells[..listed]
            .iter()
            .flatten()
            .map(|post| Choice::eligible(PostCode::new(post.as_str())))
            .collect();
        officer.unreached_choices = cells[listed..]
            .iter()
            .flatten()
            .map(|post| PostCode::new(post.as_str()))
            .collect();
        if !officer.unreached_choices.is_empty() {
            warn!(
                officer = %officer.id,
                listed,
                ignored = officer.unreached_choices.len(),
                "choices after a blank preference cell are ignored"
            );
        }

        if let Some(raw) = license_column.and_then(|position| cell(&record, position)) {
            let tier = LicenseTier::parse(&raw).ok_or_else(|| TableImportError::UnknownLicense {
                key: officer.id.to_string(),
                value: raw.clone(),
            })?;
            officer.license = Some(tier);
        }
        if let Some(comment) = comment_column.and_then(|position| cell(&record, position)) {
            officer.comment = comment;
        }

        officers.push(officer);
    }

    Ok(officers)
}

pub(crate) fn parse_license_requirements<R: Read>(
    reader: R,
) -> Result<LicenseRequirements, TableImportError> {
    let mut csv_reader = open(reader);
    let headers = HeaderIndex::new("license requirements", csv_reader.headers()?);
    let code_column = headers.require(PMS_CODE)?;
    let requirement_column = headers.require(REQUIREMENT)?;

    let mut requirements = LicenseRequirements::new();
    for record in csv_reader.records() {
        let record = record?;
        let (Some(code), Some(raw)) = (cell(&record, code_column), cell(&record, requirement_column))
        else {
            continue;
        };
        let tier = LicenseTier::parse(&raw).ok_or_else(|| TableImportError::UnknownLicense {
            key: code.clone(),
            value: raw.clone(),
        })?;
        requirements.require(PostCode::new(code), tier);
    }

    Ok(requirements)
}

pub(crate) fn parse_cohort<R: Read>(reader: R) -> Result<Vec<PriorityCandidate>, TableImportError> {
    let mut csv_reader = open(reader);
    let headers = HeaderIndex::new("priority cohort", csv_reader.headers()?);
    let id_column = headers.require(EMPLOYEE_ID)?;
    let flag_column = headers.require(PRIORITISATION)?;

    let mut candidates = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let Some(id) = cell(&record, id_column) else {
            continue;
        };
        let eligible = cell(&record, flag_column)
            .map(|flag| flag.eq_ignore_ascii_case("y") || flag.eq_ignore_ascii_case("yes"))
            .unwrap_or(false);
        candidates.push(PriorityCandidate::new(id, eligible));
    }

    Ok(candidates)
}

pub(crate) fn parse_ranking_sheet<R: Read>(
    reader: R,
) -> Result<Vec<RankingSubmission>, TableImportError> {
    let mut csv_reader = open(reader);
    let headers = HeaderIndex::new("ranking sheet", csv_reader.headers()?);
    let id_column = headers.require(EMPLOYEE_ID)?;
    let hod_column = headers.require(HOD_RANKING)?;
    let officer_column = headers.require(MO_RANKING)?;

    let mut submissions = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let Some(id) = cell(&record, id_column) else {
            continue;
        };
        let hod = cell(&record, hod_column).unwrap_or_default();
        let officer = cell(&record, officer_column).unwrap_or_default();
        submissions.push(RankingSubmission::from_cells(id, &hod, &officer));
    }

    Ok(submissions)
}
