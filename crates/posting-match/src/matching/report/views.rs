use super::super::domain::{Cohort, LicenseTier, MatchRound};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRow {
    pub employee_id: String,
    pub employee_name: String,
    pub pms_code: String,
    pub posting: String,
    pub comment: String,
    pub round: MatchRound,
    pub round_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedOfficerRow {
    pub employee_id: String,
    pub employee_name: String,
    pub choices: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<LicenseTier>,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResidualVacancyRow {
    pub pms_code: String,
    pub posting: String,
    pub remaining_vacancies: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExceptionRow {
    pub employee_id: String,
    pub pms_code: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoChoiceOfficerRow {
    pub employee_id: String,
    pub employee_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZeroVacancyPostRow {
    pub pms_code: String,
    pub posting: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromotionRow {
    pub employee_id: String,
    pub employee_name: String,
    pub pms_code: String,
    pub cohort: Cohort,
    pub cohort_label: &'static str,
    /// 1-based place on the posting's ranking before prioritisation.
    pub original_rank: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub officers: usize,
    pub matched_round_one: usize,
    pub matched_round_two: usize,
    pub unmatched: usize,
    pub no_choice: usize,
    pub promotions: usize,
    pub exceptions: usize,
    pub residual_vacancies: u32,
    pub zero_vacancy_posts: usize,
}
