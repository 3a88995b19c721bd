use super::domain::{Officer, OfficerId, PostCode};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundTwoOutcome {
    pub held: BTreeMap<PostCode, Vec<OfficerId>>,
    pub unmatched: Vec<OfficerId>,
    pub residual: BTreeMap<PostCode, u32>,
}

/// A tentative hold, ordered by the officer's own preference rank then id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Bid<'a> {
    rank: usize,
    officer: &'a OfficerId,
}

/// Deferred acceptance over leftover vacancies. Postings have no ranking of
/// their own here; competing officers are ordered by how highly they listed
/// the posting.
pub fn run_round_two(officers: &[Officer], residual: &BTreeMap<PostCode, u32>) -> RoundTwoOutcome {
    let mut held: BTreeMap<&PostCode, Vec<Bid<'_>>> =
        residual.keys().map(|code| (code, Vec::new())).collect();
    let index: HashMap<&OfficerId, &Officer> =
        officers.iter().map(|officer| (&officer.id, officer)).collect();

    let mut cursors: HashMap<&OfficerId, usize> = HashMap::with_capacity(officers.len());
    let mut queue: VecDeque<&OfficerId> = officers.iter().map(|officer| &officer.id).collect();
    let mut exhausted: HashSet<&OfficerId> = HashSet::new();

    while let Some(officer_id) = queue.pop_front() {
        let Some(&officer) = index.get(officer_id) else {
            continue;
        };
        let cursor = cursors.entry(officer_id).or_insert(0);
        let mut placed = false;

        while *cursor < officer.choices.len() {
            let rank = *cursor;
            let choice = &officer.choices[rank];
            *cursor += 1;

            if !choice.is_eligible() {
                continue;
            }
            let (Some(&capacity), Some(bids)) = (residual.get(&choice.post), held.get_mut(&choice.post))
            else {
                continue;
            };

            let bid = Bid {
                rank,
                officer: officer_id,
            };

            if bids.len() < capacity as usize {
                bids.push(bid);
                placed = true;
                break;
            }

            bids.push(bid);
            bids.sort_unstable();
            let position = bids
                .iter()
                .position(|candidate| *candidate == bid)
                .unwrap_or(bids.len());

            if position < capacity as usize {
                if let Some(evicted) = bids.pop() {
                    debug!(officer = %officer_id, evicted = %evicted.officer, post = %choice.post, "displaced by stronger preference");
                    queue.push_back(evicted.officer);
                }
                placed = true;
                break;
            }

            bids.retain(|candidate| *candidate != bid);
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

    let mut assigned = BTreeMap::new();
    let mut remaining = BTreeMap::new();
    for (code, bids) in held {
        let capacity = residual.get(code).copied().unwrap_or(0);
        let left = capacity.saturating_sub(bids.len() as u32);
        if left > 0 {
            remaining.insert(code.clone(), left);
        }
        assigned.insert(
            code.clone(),
            bids.into_iter().map(|bid| bid.officer.clone()).collect::<Vec<_>>(),
        );
    }

    RoundTwoOutcome {
        held: assigned,
        unmatched,
        residual: remaining,
    }
}
