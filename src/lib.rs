//! dday-labeler: keeps `D-<n>` countdown labels on GitHub pull requests in
//! sync with due dates embedded in their titles.
//!
//! A title carrying a `(~M/D)` marker names a due date. Each run computes
//! the number of days remaining ("D-day") for every open PR and adds,
//! replaces, or leaves its countdown label according to a near-term window
//! policy. All label mutations run concurrently; a failure on one PR never
//! blocks the others, but any failure fails the run once everything has
//! settled.

pub mod cli;
pub mod dday;
pub mod github;
pub mod graphql;
pub mod plan;
pub mod sync;
pub mod types;

pub use cli::parse_args;
pub use dday::{dday, extract_due_date};
pub use github::GitHub;
pub use plan::{dday_label, is_dday_label, plan_label_changes};
pub use sync::{apply_label_changes, sync_due_labels};
pub use types::{DisplayMode, Forge, LabelChange, PullRequest, Repo, SyncReport, SyncSpec};
