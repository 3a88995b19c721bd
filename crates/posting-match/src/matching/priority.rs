use super::domain::{
    Cohort, Officer, OfficerId, Post, PostCode, PriorityCandidate, PriorityCohorts, Promotion,
};
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

/// Derived snapshots after prioritised candidates have been moved forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityOutcome {
    pub officers: Vec<Officer>,
    pub posts: Vec<Post>,
    pub promotions: Vec<Promotion>,
}

/// Moves eligible cohort candidates to the head of the overridable postings'
/// rankings. Cohort 2 is only consulted for postings that cohort 1 left short
/// of their vacancy count.
pub fn apply_priority_override(
    officers: &[Officer],
    posts: &[Post],
    cohorts: &PriorityCohorts,
    overridable: &[PostCode],
) -> PriorityOutcome {
    let officer_index: HashMap<&OfficerId, &Officer> =
        officers.iter().map(|officer| (&officer.id, officer)).collect();
    let post_index: HashMap<&PostCode, usize> = posts
        .iter()
        .enumerate()
        .map(|(index, post)| (&post.code, index))
        .collect();

    let mut targets = Vec::new();
    let mut seen = HashSet::new();
    for code in overridable {
        if !seen.insert(code) {
            continue;
        }
        match post_index.get(code) {
            None => warn!(post = %code, "overridable posting missing from posting table"),
            Some(&index) if posts[index].vacancies == 0 => {
                info!(post = %code, "skipping prioritisation, posting has no vacancies")
            }
            Some(&index) => targets.push(PostQueue::new(&posts[index])),
        }
    }

    let entrants = |cohort: Cohort| {
        let (known, missing) = resolve_cohort(cohorts.candidates(cohort), &officer_index);
        for officer in missing {
            warn!(
                officer = %officer,
                cohort = cohort.label(),
                "priority candidate missing from officer table"
            );
        }
        known
    };
    let first = entrants(Cohort::First);
    let second = entrants(Cohort::Second);

    for queue in targets.iter_mut() {
        queue.scan(Cohort::First, &first);
    }
    for queue in targets.iter_mut() {
        if queue.promoted.len() < queue.post.vacancies as usize {
            queue.scan(Cohort::Second, &second);
        }
    }

    let mut rebuilt: HashMap<&PostCode, Vec<OfficerId>> = HashMap::new();
    let mut promotions = Vec::new();
    for queue in &targets {
        if queue.promoted.is_empty() {
            continue;
        }
        let ordered = queue.ordered_promotions();
        rebuilt.insert(&queue.post.code, queue.rebuilt_ranking(&ordered));
        promotions.extend(ordered);
    }

    let posts = posts
        .iter()
        .map(|post| match rebuilt.remove(&post.code) {
            Some(ranking) => Post {
                ranking,
                ..post.clone()
            },
            None => post.clone(),
        })
        .collect();

    let tags: HashMap<&OfficerId, Cohort> = promotions
        .iter()
        .map(|promotion| (&promotion.officer, promotion.cohort))
        .collect();
    let officers = officers
        .iter()
        .map(|officer| match tags.get(&officer.id) {
            Some(&cohort) => Officer {
                promotion: Some(cohort),
                ..officer.clone()
            },
            None => officer.clone(),
        })
        .collect();

    for promotion in &promotions {
        info!(
            officer = %promotion.officer,
            post = %promotion.post,
            cohort = promotion.cohort.label(),
            original_position = promotion.original_position,
            "officer prioritised"
        );
    }

    PriorityOutcome {
        officers,
        posts,
        promotions,
    }
}

/// Eligible cohort members found in the officer table, in cohort order,
/// plus the distinct ids the officer table does not know.
fn resolve_cohort<'a>(
    candidates: &'a [PriorityCandidate],
    officer_index: &HashMap<&OfficerId, &'a Officer>,
) -> (Vec<&'a Officer>, Vec<&'a OfficerId>) {
    let mut known = Vec::new();
    let mut missing = Vec::new();
    let mut seen = HashSet::new();

    for candidate in candidates.iter().filter(|candidate| candidate.eligible) {
        if !seen.insert(&candidate.officer) {
            continue;
        }
        match officer_index.get(&candidate.officer) {
            Some(&officer) => known.push(officer),
            None => missing.push(&candidate.officer),
        }
    }

    (known, missing)
}

struct PostQueue<'a> {
    post: &'a Post,
    positions: HashMap<&'a OfficerId, usize>,
    promoted: Vec<Promotion>,
}

impl<'a> PostQueue<'a> {
    fn new(post: &'a Post) -> Self {
        let positions = post
            .ranking
            .iter()
            .enumerate()
            .map(|(position, officer)| (officer, position))
            .collect();

        Self {
            post,
            positions,
            promoted: Vec::new(),
        }
    }

    fn scan(&mut self, cohort: Cohort, entrants: &[&Officer]) {
        for officer in entrants {
            let wants_post = officer
                .top_choice()
                .map(|choice| choice.is_eligible() && choice.post == self.post.code)
                .unwrap_or(false);
            if !wants_post {
                continue;
            }

            // Already lifted out of the ranking by an earlier scan.
            if self
                .promoted
                .iter()
                .any(|promotion| promotion.officer == officer.id)
            {
                continue;
            }

            if let Some(&original_position) = self.positions.get(&officer.id) {
                self.promoted.push(Promotion {
                    officer: officer.id.clone(),
                    post: self.post.code.clone(),
                    cohort,
                    original_position,
                });
            }
        }
    }

    fn ordered_promotions(&self) -> Vec<Promotion> {
        let mut ordered = self.promoted.clone();
        ordered.sort_by_key(|promotion| (promotion.cohort, promotion.original_position));
        ordered
    }

    fn rebuilt_ranking(&self, ordered: &[Promotion]) -> Vec<OfficerId> {
        let lifted: HashSet<&OfficerId> = ordered.iter().map(|promotion| &promotion.officer).collect();
        ordered
            .iter()
            .map(|promotion| promotion.officer.clone())
            .chain(
                self.post
                    .ranking
                    .iter()
                    .filter(|officer| !lifted.contains(officer))
                    .cloned(),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::domain::{Choice, Eligibility, LicenseTier};

    fn ids(ranking: &[OfficerId]) -> Vec<&str> {
        ranking.iter().map(OfficerId::as_str).collect()
    }

    fn polyclinic() -> Post {
        Post::new("NUPNUP", "NUP Polyclinics", 2).with_ranking(["A", "B", "C", "D", "E", "F"])
    }

    fn officers() -> Vec<Officer> {
        ["A", "B", "C", "D", "E", "F"]
            .into_iter()
            .map(|id| Officer::new(id, format!("Officer {id}")).with_choices(["NUPNUP", "GM"]))
            .collect()
    }

    fn overridable() -> Vec<PostCode> {
        vec![PostCode::new("NUPNUP")]
    }

    #[test]
    fn lifts_fifth_ranked_candidate_to_front() {
        let cohorts = PriorityCohorts {
            first: vec![PriorityCandidate::new("E", true)],
            second: Vec::new(),
        };

        let outcome = apply_priority_override(&officers(), &[polyclinic()], &cohorts, &overridable());

        assert_eq!(ids(&outcome.posts[0].ranking), ["E", "A", "B", "C", "D", "F"]);
        assert_eq!(
            outcome.promotions,
            vec![Promotion {
                officer: OfficerId::new("E"),
                post: PostCode::new("NUPNUP"),
                cohort: Cohort::First,
                original_position: 4,
            }]
        );
        let promoted = outcome
            .officers
            .iter()
            .find(|officer| officer.id.as_str() == "E")
            .expect("officer present");
        assert_eq!(promoted.promotion, Some(Cohort::First));
    }

    #[test]
    fn same_cohort_keeps_original_ranking_order() {
        let cohorts = PriorityCohorts {
            first: vec![
                PriorityCandidate::new("F", true),
                PriorityCandidate::new("C", true),
                PriorityCandidate::new("E", true),
            ],
            second: Vec::new(),
        };

        let outcome = apply_priority_override(&officers(), &[polyclinic()], &cohorts, &overridable());

        assert_eq!(ids(&outcome.posts[0].ranking), ["C", "E", "F", "A", "B", "D"]);
    }

    #[test]
    fn second_cohort_fills_only_when_first_is_short() {
        let short = PriorityCohorts {
            first: vec![PriorityCandidate::new("F", true)],
            second: vec![PriorityCandidate::new("D", true)],
        };
        let outcome = apply_priority_override(&officers(), &[polyclinic()], &short, &overridable());
        assert_eq!(ids(&outcome.posts[0].ranking), ["F", "D", "A", "B", "C", "E"]);

        let full = PriorityCohorts {
            first: vec![
                PriorityCandidate::new("F", true),
                PriorityCandidate::new("E", true),
            ],
            second: vec![PriorityCandidate::new("B", true)],
        };
        let outcome = apply_priority_override(&officers(), &[polyclinic()], &full, &overridable());
        assert_eq!(ids(&outcome.posts[0].ranking), ["E", "F", "A", "B", "C", "D"]);
        assert!(outcome
            .promotions
            .iter()
            .all(|promotion| promotion.cohort == Cohort::First));
    }

    #[test]
    fn skips_ineligible_absent_and_uninterested_candidates() {
        let mut roster = officers();
        roster[1].choices = vec![Choice::eligible(PostCode::new("GM"))];
        roster[2].choices[0].eligibility = Eligibility::Ineligible {
            held: LicenseTier::ConditionalL1,
            required: LicenseTier::Full,
        };

        let cohorts = PriorityCohorts {
            first: vec![
                PriorityCandidate::new("A", false),
                PriorityCandidate::new("B", true),
                PriorityCandidate::new("C", true),
                PriorityCandidate::new("Z", true),
            ],
            second: Vec::new(),
        };

        let outcome = apply_priority_override(&roster, &[polyclinic()], &cohorts, &overridable());

        assert!(outcome.promotions.is_empty());
        assert_eq!(outcome.posts[0], polyclinic());
    }

    #[test]
    fn zero_vacancy_and_unknown_postings_are_left_alone() {
        let closed = Post::new("NUPNUP", "NUP Polyclinics", 0).with_ranking(["A", "B", "C", "D", "E"]);
        let cohorts = PriorityCohorts {
            first: vec![PriorityCandidate::new("E", true)],
            second: Vec::new(),
        };
        let overridable = vec![PostCode::new("NUPNUP"), PostCode::new("SHSPlySHSPly")];

        let outcome = apply_priority_override(&officers(), &[closed.clone()], &cohorts, &overridable);

        assert_eq!(outcome.posts, vec![closed]);
        assert!(outcome.promotions.is_empty());
        assert!(outcome.officers.iter().all(|officer| officer.promotion.is_none()));
    }

    #[test]
    fn candidate_missing_from_ranking_is_not_inserted() {
        let post = Post::new("NUPNUP", "NUP Polyclinics", 2).with_ranking(["A", "B"]);
        let cohorts = PriorityCohorts {
            first: vec![PriorityCandidate::new("E", true)],
            second: Vec::new(),
        };

        let outcome = apply_priority_override(&officers(), &[post.clone()], &cohorts, &overridable());
        assert_eq!(outcome.posts, vec![post]);
    }

    #[test]
    fn cohort_members_are_resolved_once() {
        let roster = officers();
        let index: HashMap<&OfficerId, &Officer> =
            roster.iter().map(|officer| (&officer.id, officer)).collect();
        let candidates = vec![
            PriorityCandidate::new("Z", true),
            PriorityCandidate::new("B", true),
            PriorityCandidate::new("Z", true),
            PriorityCandidate::new("A", false),
            PriorityCandidate::new("B", true),
        ];

        let (known, missing) = resolve_cohort(&candidates, &index);

        let known: Vec<&str> = known.iter().map(|officer| officer.id.as_str()).collect();
        assert_eq!(known, ["B"]);
        assert_eq!(missing, vec![&OfficerId::new("Z")]);
    }
}
