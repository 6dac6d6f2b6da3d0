//! Label synchronizer.
//!
//! Applies planned label deltas against the forge. All PRs are updated
//! concurrently, and within one PR's swap the remove and the add are issued
//! concurrently as well; no ordering holds between any two remote calls.

use anyhow::Result;
use chrono::NaiveDateTime;
use futures::future;
use tracing::{debug, info, warn};

use crate::{
    plan::plan_label_changes,
    types::{Forge, LabelChange, SyncReport, SyncSpec},
};

/// Runs one full synchronization pass: fetch open PRs, plan the label
/// deltas, and apply them (unless `spec.dry_run`).
///
/// `now` is injected by the caller so the whole pass observes a single
/// consistent notion of "today".
pub async fn sync_due_labels<F>(spec: &SyncSpec, forge: &F, now: NaiveDateTime) -> Result<SyncReport>
where
    F: Forge + Sync,
{
    let prs = forge.fetch_open_pull_requests(spec).await?;
    debug!(scanned = prs.len(), "fetched open pull requests");

    let changes = plan_label_changes(&prs, now, spec.window);
    debug!(planned = changes.len(), "planned label changes");

    let updated = if spec.dry_run {
        0
    } else {
        apply_label_changes(forge, &changes).await?
    };

    Ok(SyncReport {
        prs,
        changes,
        updated,
    })
}

/// Applies every change concurrently and reports how many PRs were mutated.
///
/// All per-PR operations are started before any is awaited; a failure in one
/// PR does not stop the others, but any failure makes the whole call fail
/// once every operation has settled.
pub async fn apply_label_changes<F>(forge: &F, changes: &[LabelChange]) -> Result<usize>
where
    F: Forge + Sync,
{
    let results =
        future::join_all(changes.iter().map(|change| apply_change(forge, change))).await;

    let mut updated = 0;
    let mut failed = 0;
    let mut first_error = None;

    for result in results {
        match result {
            Ok(true) => updated += 1,
            Ok(false) => {}
            Err(err) => {
                failed += 1;
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
    }

    match first_error {
        Some(err) => Err(err.context(format!(
            "{failed} of {} label updates failed ({updated} succeeded)",
            changes.len()
        ))),
        None => {
            info!("Successfully updated labels for all {updated} PRs");
            Ok(updated)
        }
    }
}

/// Applies one PR's delta. Returns whether a mutation occurred.
async fn apply_change<F>(forge: &F, change: &LabelChange) -> Result<bool>
where
    F: Forge + Sync,
{
    let LabelChange {
        number,
        current,
        next,
    } = change;

    match (current, next) {
        (None, Some(next_label)) => {
            match forge
                .add_labels(*number, std::slice::from_ref(next_label))
                .await
            {
                Ok(()) => {
                    info!(r#"Successfully added label "{next_label}" to PR #{number}"#);
                    Ok(true)
                }
                Err(err) => {
                    warn!("Failed to add label for PR #{number}: {err:#}");
                    Err(err)
                }
            }
        }
        (current, next) if current != next => {
            // Two independent remote calls, not atomic: both always run to
            // completion, and the first error only surfaces after both
            // settle.
            let remove = async {
                match current {
                    Some(label) => forge.remove_label(*number, label).await,
                    None => Ok(()),
                }
            };
            let add = async {
                match next {
                    Some(label) => forge.add_labels(*number, std::slice::from_ref(label)).await,
                    None => Ok(()),
                }
            };

            let (removed, added) = future::join(remove, add).await;
            match removed.and(added) {
                Ok(()) => {
                    let from = current.as_deref().unwrap_or("");
                    let to = next.as_deref().unwrap_or("");
                    info!(r#"Successfully updated label for PR #{number} from "{from}" to "{to}""#);
                    Ok(true)
                }
                Err(err) => {
                    warn!("Failed to update label for PR #{number}: {err:#}");
                    Err(err)
                }
            }
        }
        _ => Ok(false),
    }
}
