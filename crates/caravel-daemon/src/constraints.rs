//! Manual-judgement constraint gate
//!
//! The gate is the only human-in-the-loop safety mechanism in the system:
//! a promotion cannot advance until someone explicitly judges its constraint
//! record, and every judgement is attributable and timestamped.
//!
//! The gate holds no state of its own; records live in the constraint store
//! and every call is an independent round trip against it.

use crate::error::GateError;
use crate::storage::ConstraintStore;
use caravel_types::{ConstraintKey, ConstraintState, ConstraintStatus};
use chrono::Utc;
use std::sync::Arc;

/// Bound applied to history listings when the caller does not supply one
pub const DEFAULT_CONSTRAINT_HISTORY_LIMIT: usize = 10;

/// Validates and applies status transitions on constraint records
pub struct ConstraintGate {
    store: Arc<dyn ConstraintStore>,
}

impl ConstraintGate {
    pub fn new(store: Arc<dyn ConstraintStore>) -> Self {
        Self { store }
    }

    /// Constraint records for an environment, newest first.
    ///
    /// An empty result is not an error.
    pub async fn history(
        &self,
        delivery_config: &str,
        environment: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ConstraintState>, GateError> {
        let limit = limit.unwrap_or(DEFAULT_CONSTRAINT_HISTORY_LIMIT);
        let history = self
            .store
            .constraint_state_history(delivery_config, environment, limit)
            .await?;
        Ok(history)
    }

    /// The current record at a key.
    pub async fn current(&self, key: &ConstraintKey) -> Result<ConstraintState, GateError> {
        self.store
            .get_constraint_state(key)
            .await?
            .ok_or_else(|| GateError::NotFound(key.clone()))
    }

    /// Apply a judgement to the record at `key`.
    ///
    /// The record must already exist; judgements never create records. The
    /// judgement commit time is sourced once here. Re-judging an already
    /// resolved record is allowed and overwrites it, last write wins.
    pub async fn judge(
        &self,
        key: &ConstraintKey,
        status: ConstraintStatus,
        comment: Option<String>,
        judged_by: &str,
    ) -> Result<ConstraintState, GateError> {
        if !status.is_terminal() {
            return Err(GateError::NotAJudgement {
                key: key.clone(),
                status,
            });
        }

        let current = self
            .store
            .get_constraint_state(key)
            .await?
            .ok_or_else(|| GateError::InvalidConstraint(key.clone()))?;

        let updated = current.with_judgement(status, comment, judged_by, Utc::now());
        self.store.store_constraint_state(updated.clone()).await?;

        tracing::info!(
            constraint = %key,
            status = %status,
            judged_by = judged_by,
            "Recorded constraint judgement"
        );

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;

    fn test_key() -> ConstraintKey {
        ConstraintKey::new("app1", "prod", "1.2.3", "manual-judgement")
    }

    async fn gate_with_pending(comment: Option<&str>) -> (ConstraintGate, Arc<InMemoryStorage>) {
        let storage = Arc::new(InMemoryStorage::new());
        storage
            .store_constraint_state(ConstraintState::pending(
                test_key(),
                comment.map(str::to_string),
            ))
            .await
            .unwrap();
        (ConstraintGate::new(storage.clone()), storage)
    }

    #[tokio::test]
    async fn test_judge_records_attribution_and_commit_time() {
        let (gate, _storage) = gate_with_pending(None).await;

        let judged = gate
            .judge(&test_key(), ConstraintStatus::Pass, None, "alice")
            .await
            .unwrap();

        assert_eq!(judged.status, ConstraintStatus::Pass);
        assert_eq!(judged.judged_by.as_deref(), Some("alice"));
        assert!(judged.judged_at.unwrap() >= judged.created_at);
    }

    #[tokio::test]
    async fn test_judge_preserves_comment_unless_supplied() {
        let (gate, _storage) = gate_with_pending(Some("x")).await;

        let kept = gate
            .judge(&test_key(), ConstraintStatus::Pass, None, "alice")
            .await
            .unwrap();
        assert_eq!(kept.comment.as_deref(), Some("x"));

        let replaced = gate
            .judge(
                &test_key(),
                ConstraintStatus::Fail,
                Some("y".to_string()),
                "alice",
            )
            .await
            .unwrap();
        assert_eq!(replaced.comment.as_deref(), Some("y"));
    }

    #[tokio::test]
    async fn test_judge_unknown_key_fails_without_mutation() {
        let storage = Arc::new(InMemoryStorage::new());
        let gate = ConstraintGate::new(storage.clone());

        let err = gate
            .judge(&test_key(), ConstraintStatus::Pass, None, "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::InvalidConstraint(_)));

        assert!(storage
            .get_constraint_state(&test_key())
            .await
            .unwrap()
            .is_none());
        assert!(gate.history("app1", "prod", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_judging_to_pending_is_rejected() {
        let (gate, storage) = gate_with_pending(None).await;

        let err = gate
            .judge(&test_key(), ConstraintStatus::Pending, None, "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::NotAJudgement { .. }));

        let current = storage
            .get_constraint_state(&test_key())
            .await
            .unwrap()
            .unwrap();
        assert!(current.is_pending());
    }

    #[tokio::test]
    async fn test_rejudging_a_resolved_record_overwrites_it() {
        let (gate, _storage) = gate_with_pending(None).await;

        gate.judge(&test_key(), ConstraintStatus::Fail, None, "alice")
            .await
            .unwrap();
        let second = gate
            .judge(&test_key(), ConstraintStatus::OverridePass, None, "bob")
            .await
            .unwrap();

        assert_eq!(second.status, ConstraintStatus::OverridePass);
        assert_eq!(second.judged_by.as_deref(), Some("bob"));

        let current = gate.current(&test_key()).await.unwrap();
        assert_eq!(current, second);
    }

    #[tokio::test]
    async fn test_current_for_unknown_key_is_not_found() {
        let storage = Arc::new(InMemoryStorage::new());
        let gate = ConstraintGate::new(storage);

        let err = gate.current(&test_key()).await.unwrap_err();
        assert!(matches!(err, GateError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_history_is_bounded_and_newest_first() {
        let (gate, _storage) = gate_with_pending(None).await;

        gate.judge(&test_key(), ConstraintStatus::Fail, None, "alice")
            .await
            .unwrap();
        gate.judge(&test_key(), ConstraintStatus::OverridePass, None, "bob")
            .await
            .unwrap();

        let bounded = gate.history("app1", "prod", Some(2)).await.unwrap();
        assert_eq!(bounded.len(), 2);
        assert_eq!(bounded[0].status, ConstraintStatus::OverridePass);
        assert_eq!(bounded[1].status, ConstraintStatus::Fail);

        let unbounded = gate.history("app1", "prod", None).await.unwrap();
        assert_eq!(unbounded.len(), 3);
    }
}
