//! Officer-to-posting assignment: license gating, priority reordering and two
//! rounds of deferred acceptance.

pub mod domain;
mod eligibility;
mod orchestrator;
mod priority;
pub mod ranking;
pub mod report;
mod round_one;
mod round_two;
mod validation;

pub use domain::{
    Choice, Cohort, Eligibility, ExceptionReason, LicenseTier, Match, MatchError, MatchException, MatchRound,
    Officer, OfficerId, Post, PostCode, PriorityCandidate, PriorityCohorts, Promotion,
    ResidualVacancy,
};
pub use eligibility::{apply_license_filter, LicenseRequirements};
pub use orchestrator::{MatchEngine, MatchInput, MatchOutcome, MatchSettings};
pub use priority::{apply_priority_override, PriorityOutcome};
pub use ranking::{compile_acceptance_list, RankingSubmission};
pub use report::MatchReport;
pub use round_one::{run_round_one, RoundOneOutcome};
pub use round_two::{run_round_two, RoundTwoOutcome};
pub use validation::validate_tables;
