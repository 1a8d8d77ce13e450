//! Moderation client: drives optimistic actions against a [`MarketStore`].
//!
//! Each action updates the local [`SubmissionView`] first, suspends on the
//! remote call, then either commits and reloads the canonical list or
//! reverts the local change and records a failure notice.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::CoreError;
use crate::moderation::Moderator;
use crate::reconcile::{ModerationAction, Notice, ReconcileError, SubmissionView, ViewScope};
use crate::store::{MarketStore, Pagination, SubmissionFilter};
use crate::submission::{NewSubmission, Submission};
use crate::types::DbId;

/// Result of an action trigger, for optimistic-update bookkeeping.
#[derive(Debug)]
pub enum ActionOutcome {
    /// The store confirmed the action.
    Committed,
    /// The store rejected the action; the local view was restored.
    Failed(CoreError),
    /// The action was never dispatched (busy, unknown or already decided).
    Ignored(ReconcileError),
}

impl ActionOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, ActionOutcome::Committed)
    }
}

pub struct ModerationClient<S: MarketStore> {
    store: Arc<S>,
    filter: SubmissionFilter,
    view: Mutex<SubmissionView>,
}

impl<S: MarketStore> ModerationClient<S> {
    /// A client over `store` showing rows selected by `scope`.
    pub fn new(store: Arc<S>, scope: ViewScope) -> Self {
        let filter = match scope {
            ViewScope::PendingOnly => SubmissionFilter::pending(),
            ViewScope::AllStatuses => SubmissionFilter::default(),
        };
        Self {
            store,
            filter,
            view: Mutex::new(SubmissionView::new(scope)),
        }
    }

    /// Restrict the view to one submitter's rows.
    pub fn for_requester(mut self, requester: DbId) -> Self {
        self.filter.requester = Some(requester);
        self
    }

    /// Replace the local rows with the store's canonical list.
    ///
    /// Pages through the listing until a short page comes back. Rows shifted
    /// across a page boundary by concurrent inserts are kept once.
    pub async fn reload(&self) -> Result<(), CoreError> {
        let mut rows: Vec<Submission> = Vec::new();
        let mut seen = HashSet::new();
        let mut page = Pagination::full();
        loop {
            let batch = self.store.list_submissions(&self.filter, page).await?;
            let short = (batch.len() as i64) < page.limit;
            rows.extend(batch.into_iter().filter(|s| seen.insert(s.id)));
            if short {
                break;
            }
            page = page.next();
        }
        self.view.lock().await.replace_all(rows);
        Ok(())
    }

    /// Validate locally, then create the submission remotely.
    pub async fn submit(&self, input: NewSubmission) -> Result<Submission, CoreError> {
        let input = input.validated()?;
        let submission = self.store.create_submission(input).await?;
        self.reload_after_commit().await;
        Ok(submission)
    }

    pub async fn approve(
        &self,
        moderator: &Moderator,
        id: DbId,
        note: Option<String>,
    ) -> ActionOutcome {
        self.run(id, ModerationAction::Approve, || async move {
            self.store
                .approve_submission(id, moderator, note)
                .await
                .map(|_| ())
        })
        .await
    }

    pub async fn reject(
        &self,
        moderator: &Moderator,
        id: DbId,
        note: Option<String>,
    ) -> ActionOutcome {
        self.run(id, ModerationAction::Reject, || async move {
            self.store
                .reject_submission(id, moderator, note)
                .await
                .map(|_| ())
        })
        .await
    }

    pub async fn delete(&self, id: DbId) -> ActionOutcome {
        self.run(id, ModerationAction::Delete, || self.store.delete_submission(id))
            .await
    }

    pub async fn rows(&self) -> Vec<Submission> {
        self.view.lock().await.rows().to_vec()
    }

    pub async fn is_busy(&self, id: DbId) -> bool {
        self.view.lock().await.is_busy(id)
    }

    pub async fn notices(&self) -> Vec<Notice> {
        self.view.lock().await.notices().to_vec()
    }

    pub async fn drain_notices(&self) -> Vec<Notice> {
        self.view.lock().await.drain_notices()
    }

    async fn run<F, Fut>(&self, id: DbId, action: ModerationAction, call: F) -> ActionOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), CoreError>>,
    {
        if let Err(err) = self.view.lock().await.begin(id, action) {
            tracing::debug!(submission_id = id, action = action.as_str(), error = %err, "Action not dispatched");
            return ActionOutcome::Ignored(err);
        }

        // The view lock is not held across the remote call.
        match call().await {
            Ok(()) => {
                if let Err(err) = self.view.lock().await.commit(id) {
                    tracing::error!(submission_id = id, error = %err, "Commit without in-flight action");
                }
                tracing::info!(submission_id = id, action = action.as_str(), "Action committed");
                self.reload_after_commit().await;
                ActionOutcome::Committed
            }
            Err(err) => {
                if let Err(reconcile_err) = self.view.lock().await.revert(id, err.to_string()) {
                    tracing::error!(submission_id = id, error = %reconcile_err, "Revert without in-flight action");
                }
                ActionOutcome::Failed(err)
            }
        }
    }

    async fn reload_after_commit(&self) {
        if let Err(err) = self.reload().await {
            tracing::warn!(error = %err, "Reload after commit failed; keeping optimistic view");
        }
    }
}
