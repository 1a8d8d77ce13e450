//! Moderation state machine.
//!
//! A submission starts `pending` and is decided exactly once, moving to
//! `approved` or `rejected`. Approval carries a catalogue side effect that
//! depends on the submission kind; stores must confirm that effect before
//! marking the submission terminal.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::product::{NewProduct, ProductUpdate};
use crate::roles::ROLE_ADMIN;
use crate::submission::{validate_note_length, Submission, SubmissionPayload, SubmissionStatus};
use crate::types::{DbId, Timestamp};

/// A moderator's verdict on a pending submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    /// The terminal status this decision produces.
    pub fn target_status(self) -> SubmissionStatus {
        match self {
            Decision::Approve => SubmissionStatus::Approved,
            Decision::Reject => SubmissionStatus::Rejected,
        }
    }
}

/// Capability to decide submissions.
///
/// Only obtainable from an actor holding the admin role, so every operation
/// that needs moderator privilege takes one explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Moderator {
    user_id: DbId,
}

impl Moderator {
    /// Grant the capability to `user_id` if `role` is the admin role.
    pub fn from_role(user_id: DbId, role: &str) -> Result<Self, CoreError> {
        if role != ROLE_ADMIN {
            return Err(CoreError::Forbidden("Admin role required".into()));
        }
        Ok(Self { user_id })
    }

    pub fn user_id(&self) -> DbId {
        self.user_id
    }
}

/// The catalogue mutation an approval performs.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogueEffect {
    Create(NewProduct),
    Update {
        product_id: DbId,
        update: ProductUpdate,
    },
    Hide {
        product_id: DbId,
    },
}

/// An approved submission together with the catalogue product its effect
/// created, updated or hid.
#[derive(Debug, Clone, PartialEq)]
pub struct Approval {
    pub submission: Submission,
    pub product_id: DbId,
}

/// Derive the catalogue side effect of approving `payload`.
pub fn catalogue_effect(payload: &SubmissionPayload) -> Result<CatalogueEffect, CoreError> {
    match payload {
        SubmissionPayload::Add(fields) => Ok(CatalogueEffect::Create(NewProduct::from_fields(
            fields,
        )?)),
        SubmissionPayload::Modify {
            target_product_id,
            changes,
        } => Ok(CatalogueEffect::Update {
            product_id: *target_product_id,
            update: ProductUpdate::from_patch(changes)?,
        }),
        SubmissionPayload::Delete {
            target_product_id, ..
        } => Ok(CatalogueEffect::Hide {
            product_id: *target_product_id,
        }),
    }
}

/// Fail with [`CoreError::InvalidTransition`] unless `submission` is pending.
pub fn ensure_pending(submission: &Submission) -> Result<(), CoreError> {
    if submission.status.is_terminal() {
        return Err(CoreError::InvalidTransition {
            id: submission.id,
            status: submission.status,
        });
    }
    Ok(())
}

/// Fail with [`CoreError::Forbidden`] unless the actor owns the submission
/// or is a moderator.
pub fn ensure_can_manage(
    submission: &Submission,
    user_id: DbId,
    role: &str,
) -> Result<(), CoreError> {
    if role == ROLE_ADMIN || submission.requester == Some(user_id) {
        return Ok(());
    }
    Err(CoreError::Forbidden(
        "Only the submitter or a moderator may manage this submission".into(),
    ))
}

impl Submission {
    /// Apply the terminal transition for `decision`.
    ///
    /// Leaves the submission untouched on error. Rejections always carry a
    /// note (possibly empty); approvals keep the note only when given.
    pub fn decide(
        &mut self,
        decision: Decision,
        moderator: &Moderator,
        note: Option<String>,
        now: Timestamp,
    ) -> Result<(), CoreError> {
        ensure_pending(self)?;
        let note = normalize_note(decision, note)?;

        self.status = decision.target_status();
        self.decided_at = Some(now);
        self.decided_by = Some(moderator.user_id());
        self.moderation_note = note;
        Ok(())
    }
}

/// Trim and bound a moderation note for `decision`.
pub fn normalize_note(decision: Decision, note: Option<String>) -> Result<Option<String>, CoreError> {
    let note = note.map(|n| n.trim().to_string());
    if let Some(n) = &note {
        validate_note_length("note", n)?;
    }
    Ok(match decision {
        Decision::Approve => note.filter(|n| !n.is_empty()),
        Decision::Reject => Some(note.unwrap_or_default()),
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;

    use super::*;
    use crate::product::{ProductFields, ProductPatch, ProductStatus};
    use crate::roles::ROLE_USER;

    fn pending(payload: SubmissionPayload) -> Submission {
        Submission {
            id: 11,
            requester: Some(5),
            payload,
            status: SubmissionStatus::Pending,
            moderation_note: None,
            submitted_at: Utc::now(),
            decided_at: None,
            decided_by: None,
        }
    }

    fn add_payload() -> SubmissionPayload {
        SubmissionPayload::Add(ProductFields {
            tool_name: "مثقاب".to_string(),
            category: "أدوات".to_string(),
            daily_price: "50".to_string(),
            description: None,
            weekly_price: None,
            monthly_price: None,
            city: None,
            phone: None,
            image_url: None,
        })
    }

    fn moderator() -> Moderator {
        Moderator::from_role(1, ROLE_ADMIN).unwrap()
    }

    #[test]
    fn only_admins_get_the_moderator_capability() {
        assert!(Moderator::from_role(1, ROLE_ADMIN).is_ok());
        assert_matches!(Moderator::from_role(1, ROLE_USER), Err(CoreError::Forbidden(_)));
    }

    #[test]
    fn approve_sets_decision_fields() {
        let mut sub = pending(add_payload());
        let now = Utc::now();
        sub.decide(Decision::Approve, &moderator(), Some("تمام".into()), now)
            .unwrap();

        assert_eq!(sub.status, SubmissionStatus::Approved);
        assert_eq!(sub.decided_at, Some(now));
        assert_eq!(sub.decided_by, Some(1));
        assert_eq!(sub.moderation_note.as_deref(), Some("تمام"));
    }

    #[test]
    fn reject_keeps_empty_note() {
        let mut sub = pending(add_payload());
        sub.decide(Decision::Reject, &moderator(), None, Utc::now())
            .unwrap();
        assert_eq!(sub.status, SubmissionStatus::Rejected);
        assert_eq!(sub.moderation_note.as_deref(), Some(""));
    }

    #[test]
    fn terminal_submission_cannot_be_decided_again() {
        let mut sub = pending(add_payload());
        sub.decide(Decision::Reject, &moderator(), Some("ناقص".into()), Utc::now())
            .unwrap();
        let before = sub.clone();

        for decision in [Decision::Approve, Decision::Reject] {
            let result = sub.decide(decision, &moderator(), None, Utc::now());
            assert_matches!(
                result,
                Err(CoreError::InvalidTransition { id: 11, status: SubmissionStatus::Rejected })
            );
            assert_eq!(sub, before, "failed transition must leave state unchanged");
        }
    }

    #[test]
    fn decision_keeps_kind_and_target() {
        let mut sub = pending(SubmissionPayload::Delete {
            target_product_id: 42,
            reason: String::new(),
        });
        sub.decide(Decision::Approve, &moderator(), None, Utc::now())
            .unwrap();
        assert_eq!(sub.kind(), crate::submission::SubmissionKind::Delete);
        assert_eq!(sub.target_product_id(), Some(42));
    }

    #[test]
    fn overlong_note_is_rejected_without_transition() {
        let mut sub = pending(add_payload());
        let note = "x".repeat(crate::submission::MAX_NOTE_CHARS + 1);
        let result = sub.decide(Decision::Reject, &moderator(), Some(note), Utc::now());
        assert_matches!(result, Err(CoreError::Validation(_)));
        assert!(sub.is_pending());
        assert!(sub.decided_at.is_none());
    }

    #[test]
    fn catalogue_effect_matches_kind() {
        assert_matches!(
            catalogue_effect(&add_payload()),
            Ok(CatalogueEffect::Create(p)) if p.daily_price == 50.0 && p.status == ProductStatus::Available
        );

        let modify = SubmissionPayload::Modify {
            target_product_id: 3,
            changes: ProductPatch {
                daily_price: Some("150".into()),
                ..Default::default()
            },
        };
        assert_matches!(
            catalogue_effect(&modify),
            Ok(CatalogueEffect::Update { product_id: 3, update }) if update.daily_price == Some(150.0) && update.city.is_none()
        );

        let delete = SubmissionPayload::Delete {
            target_product_id: 8,
            reason: "مكسور".into(),
        };
        assert_matches!(catalogue_effect(&delete), Ok(CatalogueEffect::Hide { product_id: 8 }));
    }

    #[test]
    fn owner_or_admin_may_manage() {
        let sub = pending(add_payload());
        assert!(ensure_can_manage(&sub, 5, ROLE_USER).is_ok());
        assert!(ensure_can_manage(&sub, 99, ROLE_ADMIN).is_ok());
        assert_matches!(ensure_can_manage(&sub, 6, ROLE_USER), Err(CoreError::Forbidden(_)));
    }

    #[test]
    fn anonymous_submission_is_admin_only() {
        let mut sub = pending(add_payload());
        sub.requester = None;
        assert!(ensure_can_manage(&sub, 5, ROLE_USER).is_err());
    }
}
