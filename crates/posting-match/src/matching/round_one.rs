use super::domain::{Eligibility, ExceptionReason, MatchException, Officer, OfficerId, Post, PostCode};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use tracing::{debug, warn};

/// Held sets, leftovers and passed-over entries from the first round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundOneOutcome {
    pub held: BTreeMap<PostCode, Vec<OfficerId>>,
    pub unmatched: Vec<OfficerId>,
    pub residual: BTreeMap<PostCode, u32>,
    pub exceptions: Vec<MatchException>,
}

struct Desk<'a> {
    post: &'a Post,
    positions: HashMap<&'a OfficerId, usize>,
    held: Vec<&'a OfficerId>,
}

impl<'a> Desk<'a> {
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
            held: Vec::new(),
        }
    }

    fn has_room(&self) -> bool {
        self.held.len() < self.post.vacancies as usize
    }

    /// Index into `held` of the officer ranked lowest by this posting.
    fn worst_held(&self) -> Option<(usize, usize)> {
        self.held
            .iter()
            .enumerate()
            .filter_map(|(slot, officer)| self.positions.get(officer).map(|&rank| (slot, rank)))
            .max_by_key(|&(_, rank)| rank)
    }
}

enum Proposal<'a> {
    Held,
    Displaced(&'a OfficerId),
    Rejected,
}

/// Deferred acceptance where each posting orders applicants by its own ranking.
///
/// Postings passed here must all carry at least one vacancy; codes listed in
/// `closed_posts` are treated as known-full and never raise an exception.
pub fn run_round_one(
    officers: &[Officer],
    posts: &[Post],
    closed_posts: &HashSet<PostCode>,
) -> RoundOneOutcome {
    let mut desks: BTreeMap<&PostCode, Desk<'_>> =
        posts.iter().map(|post| (&post.code, Desk::new(post))).collect();
    let index: HashMap<&OfficerId, &Officer> =
        officers.iter().map(|officer| (&officer.id, officer)).collect();

    let mut cursors: HashMap<&OfficerId, usize> = HashMap::with_capacity(officers.len());
    let mut queue: VecDeque<&OfficerId> = officers.iter().map(|officer| &officer.id).collect();
    let mut exhausted: HashSet<&OfficerId> = HashSet::new();
    let mut exceptions = Vec::new();
    let mut reported: HashSet<(&OfficerId, &PostCode)> = HashSet::new();

    while let Some(officer_id) = queue.pop_front() {
        let Some(&officer) = index.get(officer_id) else {
            continue;
        };
        let cursor = cursors.entry(officer_id).or_insert(0);
        let mut placed = false;

        while *cursor < officer.choices.len() {
            let choice = &officer.choices[*cursor];
            *cursor += 1;

            if let Eligibility::Ineligible { held, required } = choice.eligibility {
                if reported.insert((officer_id, &choice.post)) {
                    debug!(officer = %officer_id, post = %choice.post, "passed over gated choice");
                    exceptions.push(MatchException {
                        officer: officer_id.clone(),
                        post: choice.post.clone(),
                        reason: ExceptionReason::LicenseGated { held, required },
                    });
                }
                continue;
            }

            let Some(desk) = desks.get_mut(&choice.post) else {
                if !closed_posts.contains(&choice.post) && reported.insert((officer_id, &choice.post)) {
                    warn!(officer = %officer_id, post = %choice.post, "choice names unknown posting");
                    exceptions.push(MatchException::unknown_post(
                        officer_id.clone(),
                        choice.post.clone(),
                    ));
                }
                continue;
            };

            match propose(desk, officer_id) {
                Proposal::Held => {
                    placed = true;
                    break;
                }
                Proposal::Displaced(evicted) => {
                    debug!(officer = %officer_id, evicted = %evicted, post = %choice.post, "displaced lower ranked officer");
                    queue.push_back(evicted);
                    placed = true;
                    break;
                }
                Proposal::Rejected => {}
            }
        }

        if !placed {
            exhausted.insert(officer_id);
        }
    }

    let unmatched = officers
        .iter()
        .filter(|officer| exhausted.contains(&officer.id))
        .map(|officer| officer.id.clone())
        .collect();

    let mut held = BTreeMap::new();
    let mut residual = BTreeMap::new();
    for (code, desk) in desks {
        let remaining = desk.post.vacancies.saturating_sub(desk.held.len() as u32);
        if remaining > 0 {
            residual.insert(code.clone(), remaining);
        }
        held.insert(
            code.clone(),
            desk.held.into_iter().cloned().collect::<Vec<_>>(),
        );
    }

    RoundOneOutcome {
        held,
        unmatched,
        residual,
        exceptions,
    }
}

fn propose<'a>(desk: &mut Desk<'a>, officer: &'a OfficerId) -> Proposal<'a> {
    let Some(&rank) = desk.positions.get(officer) else {
        return Proposal::Rejected;
    };

    if desk.has_room() {
        desk.held.push(officer);
        return Proposal::Held;
    }

    match desk.worst_held() {
        Some((slot, worst_rank)) if rank < worst_rank => {
            let evicted = desk.held.remove(slot);
            desk.held.push(officer);
            Proposal::Displaced(evicted)
        }
        _ => Proposal::Rejected,
    }
}
