use super::domain::OfficerId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

/// One line of a department's raw ranking sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingSubmission {
    pub officer: OfficerId,
    pub hod_rank: Option<f64>,
    pub officer_rank: Option<f64>,
}

impl RankingSubmission {
    /// Builds a submission from raw cell text; blank or non-numeric ranks are absent.
    pub fn from_cells(officer: impl Into<String>, hod_rank: &str, officer_rank: &str) -> Self {
        Self {
            officer: OfficerId::new(officer),
            hod_rank: parse_rank(hod_rank),
            officer_rank: parse_rank(officer_rank),
        }
    }
}

pub fn parse_rank(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|rank| rank.is_finite())
}

/// Orders a ranking sheet into a posting's acceptance list.
///
/// Sort key is (HOD rank, officer rank, officer id) with absent ranks last.
/// Officers the department did not rank are left off the list.
pub fn compile_acceptance_list(submissions: &[RankingSubmission]) -> Vec<OfficerId> {
    let mut ordered: Vec<&RankingSubmission> = submissions.iter().collect();
    ordered.sort_by(|left, right| {
        absent_last(left.hod_rank, right.hod_rank)
            .then_with(|| absent_last(left.officer_rank, right.officer_rank))
            .then_with(|| left.officer.cmp(&right.officer))
    });

    let mut seen = HashSet::new();
    ordered
        .into_iter()
        .filter(|submission| submission.hod_rank.is_some())
        .filter(|submission| seen.insert(&submission.officer))
        .map(|submission| submission.officer.clone())
        .collect()
}

fn absent_last(left: Option<f64>, right: Option<f64>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.total_cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
