//! CSV adapter between spreadsheet exports and the matching engine.

mod layout;
mod normalizer;
mod parser;
pub mod writer;

pub use layout::TableLayout;

use crate::matching::ranking::RankingSubmission;
use crate::matching::{LicenseRequirements, MatchInput, Officer, Post, PriorityCandidate, PriorityCohorts};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug)]
pub enum TableImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingColumn { table: &'static str, column: String },
    InvalidVacancies { post: String, value: String },
    UnknownLicense { key: String, value: String },
}

impl std::fmt::Display for TableImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableImportError::Io(err) => write!(f, "failed to read input table: {}", err),
            TableImportError::Csv(err) => write!(f, "invalid CSV data: {}", err),
            TableImportError::MissingColumn { table, column } => {
                write!(f, "{} table is missing column '{}'", table, column)
            }
            TableImportError::InvalidVacancies { post, value } => write!(
                f,
                "posting {} has vacancy count '{}', expected a whole number",
                post, value
            ),
            TableImportError::UnknownLicense { key, value } => {
                write!(f, "{} carries unknown license tier '{}'", key, value)
            }
        }
    }
}

impl std::error::Error for TableImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TableImportError::Io(err) => Some(err),
            TableImportError::Csv(err) => Some(err),
            TableImportError::MissingColumn { .. }
            | TableImportError::InvalidVacancies { .. }
            | TableImportError::UnknownLicense { .. } => None,
        }
    }
}

impl From<std::io::Error> for TableImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for TableImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Raw table sources for one run. Optional tables default to empty.
#[derive(Debug)]
pub struct MatchTableSources<R> {
    pub posts: R,
    pub officers: R,
    pub license_requirements: Option<R>,
    pub first_cohort: Option<R>,
    pub second_cohort: Option<R>,
}

/// File locations for [`MatchTableSources`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchTablePaths {
    pub posts: PathBuf,
    pub officers: PathBuf,
    pub license_requirements: Option<PathBuf>,
    pub first_cohort: Option<PathBuf>,
    pub second_cohort: Option<PathBuf>,
}

impl MatchTableSources<File> {
    pub fn open(paths: &MatchTablePaths) -> Result<Self, TableImportError> {
        fn open_optional(path: Option<&PathBuf>) -> Result<Option<File>, TableImportError> {
            path.map(File::open).transpose().map_err(TableImportError::from)
        }

        Ok(Self {
            posts: File::open(&paths.posts)?,
            officers: File::open(&paths.officers)?,
            license_requirements: open_optional(paths.license_requirements.as_ref())?,
            first_cohort: open_optional(paths.first_cohort.as_ref())?,
            second_cohort: open_optional(paths.second_cohort.as_ref())?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MatchTableImporter {
    layout: TableLayout,
}

impl MatchTableImporter {
    pub fn new(layout: TableLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    pub fn load_paths(&self, paths: &MatchTablePaths) -> Result<MatchInput, TableImportError> {
        self.load(MatchTableSources::open(paths)?)
    }

    pub fn load<R: Read>(&self, sources: MatchTableSources<R>) -> Result<MatchInput, TableImportError> {
        let posts = self.posts(sources.posts)?;
        let officers = self.officers(sources.officers)?;
        let license_requirements = sources
            .license_requirements
            .map(|reader| self.license_requirements(reader))
            .transpose()?
            .unwrap_or_default();
        let first = sources
            .first_cohort
            .map(|reader| self.cohort(reader))
            .transpose()?
            .unwrap_or_default();
        let second = sources
            .second_cohort
            .map(|reader| self.cohort(reader))
            .transpose()?
            .unwrap_or_default();

        info!(
            officers = officers.len(),
            posts = posts.len(),
            license_requirements = license_requirements.len(),
            first_cohort = first.len(),
            second_cohort = second.len(),
            "loaded match tables"
        );

        Ok(MatchInput {
            officers,
            posts,
            license_requirements,
            cohorts: PriorityCohorts { first, second },
        })
    }

    pub fn posts<R: Read>(&self, reader: R) -> Result<Vec<Post>, TableImportError> {
        parser::parse_posts(reader, &self.layout)
    }

    pub fn officers<R: Read>(&self, reader: R) -> Result<Vec<Officer>, TableImportError> {
        parser::parse_officers(reader, &self.layout)
    }

    pub fn license_requirements<R: Read>(
        &self,
        reader: R,
    ) -> Result<LicenseRequirements, TableImportError> {
        parser::parse_license_requirements(reader)
    }

    pub fn cohort<R: Read>(&self, reader: R) -> Result<Vec<PriorityCandidate>, TableImportError> {
        parser::parse_cohort(reader)
    }

    pub fn ranking_sheet<R: Read>(&self, reader: R) -> Result<Vec<RankingSubmission>, TableImportError> {
        parser::parse_ranking_sheet(reader)
    }

    pub fn ranking_sheet_from_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<Vec<RankingSubmission>, TableImportError> {
        let file = File::open(path)?;
        self.ranking_sheet(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::{LicenseTier, PostCode};
    use std::io::Cursor;

    const POSTS: &str = "PMS Code,Postings,Vacancies,Match 1,Match 2\n\
                         GM,General Medicine,1,M2,M1\n\
                         ED,Emergency,1,M1,\n";
    const OFFICERS: &str = "Employee ID,Employee Name,1st choice,2nd choice,Registration Type\n\
                            M1,Tan,GM,ED,Conditional-L1\n\
                            M2,Lee,GM,,Full\n";

    #[test]
    fn load_defaults_optional_tables_to_empty() {
        let importer = MatchTableImporter::new(TableLayout::new(2, 2));
        let input = importer
            .load(MatchTableSources {
                posts: Cursor::new(POSTS),
                officers: Cursor::new(OFFICERS),
                license_requirements: None,
                first_cohort: None,
                second_cohort: None,
            })
            .expect("tables load");

        assert_eq!(input.posts.len(), 2);
        assert_eq!(input.officers.len(), 2);
        assert!(input.license_requirements.is_empty());
        assert!(input.cohorts.first.is_empty());
    }

    #[test]
    fn load_reads_requirements_and_cohorts() {
        let importer = MatchTableImporter::new(TableLayout::new(2, 2));
        let input = importer
            .load(MatchTableSources {
                posts: Cursor::new(POSTS),
                officers: Cursor::new(OFFICERS),
                license_requirements: Some(Cursor::new("PMS Code,Requirement\nED,Full\n")),
                first_cohort: Some(Cursor::new("Employee ID,Eligible for Prioritisation\nM1,Y\n")),
                second_cohort: None,
            })
            .expect("tables load");

        assert_eq!(
            input.license_requirements.get(&PostCode::new("ED")),
            Some(LicenseTier::Full)
        );
        assert_eq!(input.cohorts.first, vec![PriorityCandidate::new("M1", true)]);
    }

    #[test]
    fn missing_file_surfaces_io_error() {
        let paths = MatchTablePaths {
            posts: PathBuf::from("/nonexistent/posts.csv"),
            officers: PathBuf::from("/nonexistent/officers.csv"),
            ..MatchTablePaths::default()
        };

        let error = MatchTableImporter::default()
            .load_paths(&paths)
            .expect_err("missing files");
        assert!(matches!(error, TableImportError::Io(_)));
    }
}
