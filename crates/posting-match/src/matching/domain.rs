use serde::{Deserialize, Serialize};
use std::fmt;

/// Employee identifier as it appears in the officer and posting tables.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfficerId(pub String);

impl OfficerId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OfficerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// PMS code identifying a posting.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostCode(pub String);

impl PostCode {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Medical registration tier, ordered from most restricted to unrestricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseTier {
    ConditionalL1,
    ConditionalL2,
    ConditionalL3,
    Full,
}

impl LicenseTier {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::ConditionalL1,
            Self::ConditionalL2,
            Self::ConditionalL3,
            Self::Full,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ConditionalL1 => "Conditional-L1",
            Self::ConditionalL2 => "Conditional-L2",
            Self::ConditionalL3 => "Conditional-L3",
            Self::Full => "Full",
        }
    }

    /// Parses a registration label. Provisional registrations are expected to
    /// convert to full registration before the posting starts.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("provisional") {
            return Some(Self::Full);
        }

        Self::ordered()
            .into_iter()
            .find(|tier| tier.label().eq_ignore_ascii_case(trimmed))
    }

    pub fn satisfies(self, requirement: LicenseTier) -> bool {
        self >= requirement
    }
}

impl fmt::Display for LicenseTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum Eligibility {
    Eligible,
    Ineligible {
        held: LicenseTier,
        required: LicenseTier,
    },
}

/// A single ranked choice on an officer's preference list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub post: PostCode,
    pub eligibility: Eligibility,
}

impl Choice {
    pub fn eligible(post: PostCode) -> Self {
        Self {
            post,
            eligibility: Eligibility::Eligible,
        }
    }

    pub fn is_eligible(&self) -> bool {
        matches!(self.eligibility, Eligibility::Eligible)
    }

    /// Display form used in reports, e.g. `POST_Conditional-L1` for gated entries.
    pub fn label(&self) -> String {
        match self.eligibility {
            Eligibility::Eligible => self.post.to_string(),
            Eligibility::Ineligible { held, .. } => format!("{}_{}", self.post, held.label()),
        }
    }
}

/// Which priority cohort moved an officer to the front of a posting's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cohort {
    First,
    Second,
}

impl Cohort {
    pub const fn label(self) -> &'static str {
        match self {
            Self::First => "Priority Intake 1",
            Self::Second => "Priority Intake 2",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Officer {
    pub id: OfficerId,
    pub name: String,
    pub choices: Vec<Choice>,
    pub license: Option<LicenseTier>,
    pub comment: String,
    pub promotion: Option<Cohort>,
    /// Entries written after a blank preference cell. Never matched, but the
    /// officer still counts as having stated choices.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unreached_choices: Vec<PostCode>,
}

impl Officer {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: OfficerId::new(id),
            name: name.into(),
            choices: Vec::new(),
            license: None,
            comment: String::new(),
            promotion: None,
            unreached_choices: Vec::new(),
        }
    }

    pub fn with_choices<I, S>(mut self, posts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = posts
            .into_iter()
            .map(|post| Choice::eligible(PostCode::new(post)))
            .collect();
        self
    }

    pub fn with_license(mut self, license: LicenseTier) -> Self {
        self.license = Some(license);
        self
    }

    /// True only when every preference cell was blank.
    pub fn stated_no_choices(&self) -> bool {
        self.choices.is_empty() && self.unreached_choices.is_empty()
    }

    pub fn top_choice(&self) -> Option<&Choice> {
        self.choices.first()
    }

    /// Comment shown in reports: the promotion label wins over free text.
    pub fn display_comment(&self) -> String {
        match self.promotion {
            Some(cohort) => cohort.label().to_string(),
            None => self.comment.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub code: PostCode,
    pub label: String,
    pub vacancies: u32,
    pub ranking: Vec<OfficerId>,
}

impl Post {
    pub fn new(code: impl Into<String>, label: impl Into<String>, vacancies: u32) -> Self {
        Self {
            code: PostCode::new(code),
            label: label.into(),
            vacancies,
            ranking: Vec::new(),
        }
    }

    pub fn with_ranking<I, S>(mut self, officers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ranking = officers.into_iter().map(OfficerId::new).collect();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRound {
    First,
    Second,
}

impl MatchRound {
    pub const fn label(self) -> &'static str {
        match self {
            Self::First => "Round 1",
            Self::Second => "Round 2",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub officer: OfficerId,
    pub post: PostCode,
    pub round: MatchRound,
}

/// Why a preference entry was passed over without a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ExceptionReason {
    /// The posting is neither listed nor known to be full.
    UnknownPost,
    LicenseGated {
        held: LicenseTier,
        required: LicenseTier,
    },
}

impl ExceptionReason {
    pub fn describe(&self) -> String {
        match self {
            Self::UnknownPost => "unknown posting".to_string(),
            Self::LicenseGated { held, required } => {
                format!("requires {} registration, holds {}", required.label(), held.label())
            }
        }
    }
}

/// Preference entry the first round walked past without proposing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchException {
    pub officer: OfficerId,
    pub post: PostCode,
    pub reason: ExceptionReason,
}

impl MatchException {
    pub fn unknown_post(officer: OfficerId, post: PostCode) -> Self {
        Self {
            officer,
            post,
            reason: ExceptionReason::UnknownPost,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidualVacancy {
    pub post: PostCode,
    pub remaining: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCandidate {
    pub officer: OfficerId,
    pub eligible: bool,
}

impl PriorityCandidate {
    pub fn new(officer: impl Into<String>, eligible: bool) -> Self {
        Self {
            officer: OfficerId::new(officer),
            eligible,
        }
    }
}

/// Both prioritisation cohorts, scanned in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCohorts {
    pub first: Vec<PriorityCandidate>,
    pub second: Vec<PriorityCandidate>,
}

impl PriorityCohorts {
    pub fn candidates(&self, cohort: Cohort) -> &[PriorityCandidate] {
        match cohort {
            Cohort::First => &self.first,
            Cohort::Second => &self.second,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    pub officer: OfficerId,
    pub post: PostCode,
    pub cohort: Cohort,
    pub original_position: usize,
}

/// Fatal faults that stop a run before or after matching.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    #[error("officer {0} appears more than once in the officer table")]
    DuplicateOfficer(OfficerId),
    #[error("posting {0} appears more than once in the posting table")]
    DuplicatePost(PostCode),
    #[error("officer {officer} lists posting {post} more than once")]
    DuplicateChoice { officer: OfficerId, post: PostCode },
    #[error("posting {post} ranks officer {officer} more than once")]
    DuplicateRanking { post: PostCode, officer: OfficerId },
    #[error("officer {officer} was assigned to both {first} and {second}")]
    DuplicateAssignment {
        officer: OfficerId,
        first: PostCode,
        second: PostCode,
    },
    #[error("posting {post} received {assigned} officers for {vacancies} vacancies")]
    CapacityExceeded {
        post: PostCode,
        assigned: usize,
        vacancies: u32,
    },
}

impl MatchError {
    /// True when the input tables were malformed rather than the engine.
    pub fn is_input_fault(&self) -> bool {
        matches!(
            self,
            Self::DuplicateOfficer(_)
                | Self::DuplicatePost(_)
                | Self::DuplicateChoice { .. }
                | Self::DuplicateRanking { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn license_tiers_follow_registration_hierarchy() {
        assert!(LicenseTier::Full.satisfies(LicenseTier::ConditionalL3));
        assert!(LicenseTier::ConditionalL2.satisfies(LicenseTier::ConditionalL2));
        assert!(!LicenseTier::ConditionalL1.satisfies(LicenseTier::Full));
    }

    #[test]
    fn license_parse_accepts_labels_and_provisional() {
        assert_eq!(
            LicenseTier::parse(" conditional-l2 "),
            Some(LicenseTier::ConditionalL2)
        );
        assert_eq!(LicenseTier::parse("Provisional"), Some(LicenseTier::Full));
        assert_eq!(LicenseTier::parse("Temporary"), None);
    }

    #[test]
    fn ineligible_choice_label_carries_held_tier() {
        let choice = Choice {
            post: PostCode::new("CGHMed"),
            eligibility: Eligibility::Ineligible {
                held: LicenseTier::ConditionalL1,
                required: LicenseTier::Full,
            },
        };
        assert_eq!(choice.label(), "CGHMed_Conditional-L1");
        assert!(!choice.is_eligible());
    }

    #[test]
    fn gated_exception_names_both_tiers() {
        let reason = ExceptionReason::LicenseGated {
            held: LicenseTier::ConditionalL1,
            required: LicenseTier::Full,
        };
        assert_eq!(
            reason.describe(),
            "requires Full registration, holds Conditional-L1"
        );
        assert_eq!(ExceptionReason::UnknownPost.describe(), "unknown posting");
    }

    #[test]
    fn promotion_label_overrides_comment() {
        let mut officer = Officer::new("M1", "Tan");
        officer.comment = "Returning".to_string();
        assert_eq!(officer.display_comment(), "Returning");
        officer.promotion = Some(Cohort::Second);
        assert_eq!(officer.display_comment(), "Priority Intake 2");
    }
}
