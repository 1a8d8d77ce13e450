//! Repository for the `submissions` table.

use kiraa_core::store::{Pagination, SubmissionFilter};
use kiraa_core::submission::SubmissionStatus;
use kiraa_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::submission::SubmissionRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, requester_id, kind, target_product_id, payload, status, \
    moderation_note, submitted_at, decided_at, decided_by";

/// Fields for inserting a new pending submission.
pub struct InsertSubmission<'a> {
    pub requester_id: Option<DbId>,
    pub kind: &'a str,
    pub target_product_id: Option<DbId>,
    pub payload: &'a serde_json::Value,
}

/// Provides CRUD operations for submissions.
pub struct SubmissionRepo;

impl SubmissionRepo {
    /// Insert a new submission with status `pending`, returning the created row.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &InsertSubmission<'_>,
    ) -> Result<SubmissionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO submissions (requester_id, kind, target_product_id, payload)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SubmissionRow>(&query)
            .bind(input.requester_id)
            .bind(input.kind)
            .bind(input.target_product_id)
            .bind(input.payload)
            .fetch_one(executor)
            .await
    }

    /// Find a submission by its ID.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<SubmissionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM submissions WHERE id = $1");
        sqlx::query_as::<_, SubmissionRow>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a submission and lock its row until the transaction ends.
    pub async fn find_for_update<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<SubmissionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM submissions WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, SubmissionRow>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List submissions matching `filter`, newest first.
    pub async fn list<'e>(
        executor: impl PgExecutor<'e>,
        filter: &SubmissionFilter,
        page: Pagination,
    ) -> Result<Vec<SubmissionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM submissions
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::BIGINT IS NULL OR requester_id = $2)
             ORDER BY submitted_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, SubmissionRow>(&query)
            .bind(filter.status.map(SubmissionStatus::as_str))
            .bind(filter.requester)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(executor)
            .await
    }

    /// Record the terminal decision on a pending submission.
    ///
    /// Returns `None` if no pending row with the given `id` exists.
    pub async fn mark_decided<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        status: SubmissionStatus,
        decided_by: DbId,
        note: Option<&str>,
    ) -> Result<Option<SubmissionRow>, sqlx::Error> {
        let query = format!(
            "UPDATE submissions SET
                status = $2,
                decided_at = NOW(),
                decided_by = $3,
                moderation_note = $4
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SubmissionRow>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(decided_by)
            .bind(note)
            .fetch_optional(executor)
            .await
    }

    /// Permanently delete a submission by ID. Returns `true` if a row was removed.
    pub async fn hard_delete<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM submissions WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
