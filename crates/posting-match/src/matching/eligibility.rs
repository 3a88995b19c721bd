use super::domain::{Choice, Eligibility, LicenseTier, Officer, PostCode};
use std::collections::BTreeMap;
use tracing::debug;

/// Minimum registration tier demanded by gated postings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LicenseRequirements {
    minimums: BTreeMap<PostCode, LicenseTier>,
}

impl LicenseRequirements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(&mut self, post: PostCode, tier: LicenseTier) {
        self.minimums.insert(post, tier);
    }

    pub fn get(&self, post: &PostCode) -> Option<LicenseTier> {
        self.minimums.get(post).copied()
    }

    pub fn len(&self) -> usize {
        self.minimums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.minimums.is_empty()
    }
}

impl FromIterator<(PostCode, LicenseTier)> for LicenseRequirements {
    fn from_iter<T: IntoIterator<Item = (PostCode, LicenseTier)>>(iter: T) -> Self {
        Self {
            minimums: iter.into_iter().collect(),
        }
    }
}

/// Returns a new officer snapshot with gated choices tagged ineligible.
pub fn apply_license_filter(officers: &[Officer], requirements: &LicenseRequirements) -> Vec<Officer> {
    officers
        .iter()
        .map(|officer| filter_officer(officer, requirements))
        .collect()
}

fn filter_officer(officer: &Officer, requirements: &LicenseRequirements) -> Officer {
    let Some(held) = officer.license else {
        return officer.clone();
    };

    let choices = officer
        .choices
        .iter()
        .map(|choice| match (choice.eligibility, requirements.get(&choice.post)) {
            (Eligibility::Eligible, Some(required)) if !held.satisfies(required) => {
                debug!(
                    officer = %officer.id,
                    post = %choice.post,
                    held = held.label(),
                    required = required.label(),
                    "choice gated by license requirement"
                );
                Choice {
                    post: choice.post.clone(),
                    eligibility: Eligibility::Ineligible { held, required },
                }
            }
            _ => choice.clone(),
        })
        .collect();

    Officer {
        choices,
        ..officer.clone()
    }
}
