use tracing::{debug, warn};
use uuid::Uuid;

use super::repo_types::UpdateOutcome;
use crate::state::AppState;

/// Salary synchronizer.
///
/// Phase 1 updates the authoritative figure in the user directory. Phase 2
/// runs only on a confirmed modification and overwrites `salary` on every
/// payment record carrying the user's email, regardless of period. The two
/// phases are separate store writes with no surrounding transaction: a
/// failure after phase 1 leaves the directory updated and the ledger stale,
/// and is surfaced to the caller as an internal error rather than undone.
pub async fn sync_salary(
    state: &AppState,
    id: Uuid,
    salary: i64,
) -> anyhow::Result<UpdateOutcome> {
    let outcome = state.users.set_salary(id, salary).await?;
    if outcome.modified_count == 0 {
        // Unknown id, or the record already holds this value.
        return Ok(outcome);
    }

    let Some(user) = state.users.find_by_id(id).await? else {
        warn!(user_id = %id, "user vanished between salary write and re-fetch");
        return Ok(outcome);
    };

    let rewritten = state
        .payments
        .set_salary_for_email(&user.email, salary)
        .await?;
    debug!(user_id = %id, email = %user.email, rewritten, "payment history rewritten");

    Ok(outcome)
}
