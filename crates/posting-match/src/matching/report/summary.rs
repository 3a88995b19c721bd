use super::super::domain::{Match, MatchRound, Officer, OfficerId, Post, PostCode};
use super::super::orchestrator::MatchOutcome;
use super::views::{
    ExceptionRow, MatchRow, MatchSummary, NoChoiceOfficerRow, PromotionRow, ResidualVacancyRow,
    UnmatchedOfficerRow, ZeroVacancyPostRow,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// Output tables for one run, joined with names and posting labels.
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub run_date: NaiveDate,
    pub summary: MatchSummary,
    pub final_matches: Vec<MatchRow>,
    pub round_one_matches: Vec<MatchRow>,
    pub unmatched_officers: Vec<UnmatchedOfficerRow>,
    pub residual_vacancies: Vec<ResidualVacancyRow>,
    pub exceptions: Vec<ExceptionRow>,
    pub no_choice_officers: Vec<NoChoiceOfficerRow>,
    pub zero_vacancy_posts: Vec<ZeroVacancyPostRow>,
    pub promotions: Vec<PromotionRow>,
}

struct Directory<'a> {
    officers: HashMap<&'a OfficerId, &'a Officer>,
    posts: HashMap<&'a PostCode, &'a Post>,
}

impl<'a> Directory<'a> {
    fn new(outcome: &'a MatchOutcome) -> Self {
        Self {
            officers: outcome
                .officers
                .iter()
                .map(|officer| (&officer.id, officer))
                .collect(),
            posts: outcome.posts.iter().map(|post| (&post.code, post)).collect(),
        }
    }

    fn officer_name(&self, id: &OfficerId) -> String {
        self.officers
            .get(id)
            .map(|officer| officer.name.clone())
            .unwrap_or_default()
    }

    fn officer_comment(&self, id: &OfficerId) -> String {
        self.officers
            .get(id)
            .map(|officer| officer.display_comment())
            .unwrap_or_default()
    }

    fn posting_label(&self, code: &PostCode) -> String {
        self.posts
            .get(code)
            .map(|post| post.label.clone())
            .unwrap_or_default()
    }

    fn match_row(&self, entry: &Match) -> MatchRow {
        MatchRow {
            employee_id: entry.officer.to_string(),
            employee_name: self.officer_name(&entry.officer),
            pms_code: entry.post.to_string(),
            posting: self.posting_label(&entry.post),
            comment: self.officer_comment(&entry.officer),
            round: entry.round,
            round_label: entry.round.label(),
        }
    }
}

impl MatchReport {
    pub fn build(outcome: &MatchOutcome, run_date: NaiveDate) -> Self {
        let directory = Directory::new(outcome);

        let final_matches: Vec<MatchRow> = outcome
            .final_matches
            .iter()
            .map(|entry| directory.match_row(entry))
            .collect();
        let round_one_matches = outcome
            .round_one_matches
            .iter()
            .map(|entry| directory.match_row(entry))
            .collect();

        let unmatched_officers = outcome
            .unmatched
            .iter()
            .map(|id| match directory.officers.get(id) {
                Some(officer) => UnmatchedOfficerRow {
                    employee_id: id.to_string(),
                    employee_name: officer.name.clone(),
                    choices: officer.choices.iter().map(|choice| choice.label()).collect(),
                    license: officer.license,
                    comment: officer.display_comment(),
                },
                None => UnmatchedOfficerRow {
                    employee_id: id.to_string(),
                    employee_name: String::new(),
                    choices: Vec::new(),
                    license: None,
                    comment: String::new(),
                },
            })
            .collect();

        let residual_vacancies: Vec<ResidualVacancyRow> = outcome
            .residual
            .iter()
            .map(|residual| ResidualVacancyRow {
                pms_code: residual.post.to_string(),
                posting: directory.posting_label(&residual.post),
                remaining_vacancies: residual.remaining,
            })
            .collect();

        let exceptions: Vec<ExceptionRow> = outcome
            .exceptions
            .iter()
            .map(|exception| ExceptionRow {
                employee_id: exception.officer.to_string(),
                pms_code: exception.post.to_string(),
                reason: exception.reason.describe(),
            })
            .collect();

        let no_choice_officers = outcome
            .no_choice_officers
            .iter()
            .map(|id| NoChoiceOfficerRow {
                employee_id: id.to_string(),
                employee_name: directory.officer_name(id),
            })
            .collect();

        let zero_vacancy_posts = outcome
            .zero_vacancy_posts
            .iter()
            .map(|code| ZeroVacancyPostRow {
                pms_code: code.to_string(),
                posting: directory.posting_label(code),
            })
            .collect();

        let promotions = outcome
            .promotions
            .iter()
            .map(|promotion| PromotionRow {
                employee_id: promotion.officer.to_string(),
                employee_name: directory.officer_name(&promotion.officer),
                pms_code: promotion.post.to_string(),
                cohort: promotion.cohort,
                cohort_label: promotion.cohort.label(),
                original_rank: promotion.original_position + 1,
            })
            .collect();

        let matched_round_two = outcome
            .final_matches
            .iter()
            .filter(|entry| entry.round == MatchRound::Second)
            .count();

        let summary = MatchSummary {
            officers: outcome.officers.len(),
            matched_round_one: outcome.round_one_matches.len(),
            matched_round_two,
            unmatched: outcome.unmatched.len(),
            no_choice: outcome.no_choice_officers.len(),
            promotions: outcome.promotions.len(),
            exceptions: exceptions.len(),
            residual_vacancies: residual_vacancies
                .iter()
                .map(|row| row.remaining_vacancies)
                .sum(),
            zero_vacancy_posts: outcome.zero_vacancy_posts.len(),
        };

        Self {
            run_date,
            summary,
            final_matches,
            round_one_matches,
            unmatched_officers,
            residual_vacancies,
            exceptions,
            no_choice_officers,
            zero_vacancy_posts,
            promotions,
        }
    }
}
