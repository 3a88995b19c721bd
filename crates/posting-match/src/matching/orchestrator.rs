use super::domain::{
    Match, MatchError, MatchException, MatchRound, Officer, OfficerId, Post, PostCode,
    PriorityCohorts, Promotion, ResidualVacancy,
};
use super::eligibility::{apply_license_filter, LicenseRequirements};
use super::priority::apply_priority_override;
use super::round_one::run_round_one;
use super::round_two::run_round_two;
use super::validation::validate_tables;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::info;

/// Engine-level knobs that do not come from the input tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSettings {
    pub priority_posts: Vec<PostCode>,
}

impl MatchSettings {
    pub fn default_priority_posts() -> Vec<PostCode> {
        ["NHGPlyNHGPly", "SHSPlySHSPly", "NUPNUP"]
            .into_iter()
            .map(PostCode::new)
            .collect()
    }
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            priority_posts: Self::default_priority_posts(),
        }
    }
}

/// Fully materialised tables for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchInput {
    pub officers: Vec<Officer>,
    pub posts: Vec<Post>,
    pub license_requirements: LicenseRequirements,
    pub cohorts: PriorityCohorts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchOutcome {
    /// Officer snapshot after license gating and promotion tagging.
    pub officers: Vec<Officer>,
    /// Posting snapshot after priority reordering.
    pub posts: Vec<Post>,
    pub promotions: Vec<Promotion>,
    pub round_one_matches: Vec<Match>,
    pub final_matches: Vec<Match>,
    pub unmatched: Vec<OfficerId>,
    pub residual: Vec<ResidualVacancy>,
    pub exceptions: Vec<MatchException>,
    pub no_choice_officers: Vec<OfficerId>,
    pub zero_vacancy_posts: Vec<PostCode>,
}

pub struct MatchEngine {
    settings: MatchSettings,
}

impl MatchEngine {
    pub fn new(settings: MatchSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    pub fn run(&self, input: &MatchInput) -> Result<MatchOutcome, MatchError> {
        validate_tables(&input.officers, &input.posts)?;

        let no_choice_officers: Vec<OfficerId> = input
            .officers
            .iter()
            .filter(|officer| officer.stated_no_choices())
            .map(|officer| officer.id.clone())
            .collect();
        let zero_vacancy_posts: Vec<PostCode> = input
            .posts
            .iter()
            .filter(|post| post.vacancies == 0)
            .map(|post| post.code.clone())
            .collect();

        let gated = apply_license_filter(&input.officers, &input.license_requirements);
        let priority = apply_priority_override(
            &gated,
            &input.posts,
            &input.cohorts,
            &self.settings.priority_posts,
        );

        let active_officers: Vec<Officer> = priority
            .officers
            .iter()
            .filter(|officer| !officer.stated_no_choices())
            .cloned()
            .collect();
        let open_posts: Vec<Post> = priority
            .posts
            .iter()
            .filter(|post| post.vacancies > 0)
            .cloned()
            .collect();
        let closed: HashSet<PostCode> = zero_vacancy_posts.iter().cloned().collect();

        info!(
            officers = active_officers.len(),
            posts = open_posts.len(),
            no_choice = no_choice_officers.len(),
            zero_vacancy = zero_vacancy_posts.len(),
            promotions = priority.promotions.len(),
            "starting round one"
        );
        let first = run_round_one(&active_officers, &open_posts, &closed);

        let leftovers: HashSet<&OfficerId> = first.unmatched.iter().collect();
        let second_pool: Vec<Officer> = active_officers
            .iter()
            .filter(|officer| leftovers.contains(&officer.id))
            .cloned()
            .collect();

        info!(
            officers = second_pool.len(),
            posts = first.residual.len(),
            exceptions = first.exceptions.len(),
            "starting round two"
        );
        let second = run_round_two(&second_pool, &first.residual);

        let round_one_matches = flatten(&first.held, MatchRound::First);
        let mut final_matches = round_one_matches.clone();
        final_matches.extend(flatten(&second.held, MatchRound::Second));
        final_matches.sort_by(|left, right| {
            (&left.post, &left.officer).cmp(&(&right.post, &right.officer))
        });

        verify_assignments(&final_matches, &open_posts)?;

        let residual = second
            .residual
            .into_iter()
            .map(|(post, remaining)| ResidualVacancy { post, remaining })
            .collect();

        info!(
            matched = final_matches.len(),
            unmatched = second.unmatched.len(),
            "matching complete"
        );

        Ok(MatchOutcome {
            officers: priority.officers,
            posts: priority.posts,
            promotions: priority.promotions,
            round_one_matches,
            final_matches,
            unmatched: second.unmatched,
            residual,
            exceptions: first.exceptions,
            no_choice_officers,
            zero_vacancy_posts,
        })
    }
}

fn flatten(held: &BTreeMap<PostCode, Vec<OfficerId>>, round: MatchRound) -> Vec<Match> {
    held.iter()
        .flat_map(|(post, officers)| {
            officers.iter().map(move |officer| Match {
                officer: officer.clone(),
                post: post.clone(),
                round,
            })
        })
        .collect()
}

fn verify_assignments(matches: &[Match], posts: &[Post]) -> Result<(), MatchError> {
    let mut assigned: HashMap<&OfficerId, &PostCode> = HashMap::with_capacity(matches.len());
    let mut load: HashMap<&PostCode, usize> = HashMap::new();

    for entry in matches {
        if let Some(first) = assigned.insert(&entry.officer, &entry.post) {
            return Err(MatchError::DuplicateAssignment {
                officer: entry.officer.clone(),
                first: first.clone(),
                second: entry.post.clone(),
            });
        }
        *load.entry(&entry.post).or_default() += 1;
    }

    for post in posts {
        let count = load.get(&post.code).copied().unwrap_or(0);
        if count > post.vacancies as usize {
            return Err(MatchError::CapacityExceeded {
                post: post.code.clone(),
                assigned: count,
                vacancies: post.vacancies,
            });
        }
    }

    Ok(())
}
