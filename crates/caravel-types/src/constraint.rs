//! Manual-judgement constraint state
//!
//! A constraint record tracks one human decision point for one artifact
//! version in one environment. Records are created pending and resolved by
//! an explicit, attributable judgement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a manual-judgement constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintStatus {
    /// Awaiting judgement
    Pending,
    /// Approved
    Pass,
    /// Rejected
    Fail,
    /// Approved by override
    OverridePass,
    /// Rejected by override
    OverrideFail,
}

impl ConstraintStatus {
    /// Whether this status resolves the constraint. `Pending` is the only
    /// non-terminal status.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ConstraintStatus::Pending)
    }
}

impl fmt::Display for ConstraintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstraintStatus::Pending => "PENDING",
            ConstraintStatus::Pass => "PASS",
            ConstraintStatus::Fail => "FAIL",
            ConstraintStatus::OverridePass => "OVERRIDE_PASS",
            ConstraintStatus::OverrideFail => "OVERRIDE_FAIL",
        };
        f.write_str(name)
    }
}

/// Unique key of a judgement instance.
///
/// Once a record is created its key never changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstraintKey {
    /// Owning delivery config name
    pub delivery_config: String,

    /// Environment the promotion targets
    pub environment: String,

    /// Artifact version awaiting promotion
    pub artifact_version: String,

    /// Constraint type (e.g. "manual-judgement")
    pub constraint_type: String,
}

impl ConstraintKey {
    pub fn new(
        delivery_config: impl Into<String>,
        environment: impl Into<String>,
        artifact_version: impl Into<String>,
        constraint_type: impl Into<String>,
    ) -> Self {
        Self {
            delivery_config: delivery_config.into(),
            environment: environment.into(),
            artifact_version: artifact_version.into(),
            constraint_type: constraint_type.into(),
        }
    }
}

impl fmt::Display for ConstraintKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.delivery_config, self.environment, self.constraint_type, self.artifact_version
        )
    }
}

/// Record of a single manual-judgement decision point.
///
/// Invariant: `judged_at` and `judged_by` are `None` exactly when `status`
/// is `Pending`. The constructors below are the only way the daemon builds
/// these records, so the invariant holds at construction and update time
/// rather than being re-checked at call sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintState {
    #[serde(flatten)]
    pub key: ConstraintKey,

    pub status: ConstraintStatus,

    /// Free-form text attached by the creator or the judge
    #[serde(default)]
    pub comment: Option<String>,

    /// Set once, at creation
    pub created_at: DateTime<Utc>,

    /// Judgement commit time, set on transition out of `Pending`
    #[serde(default)]
    pub judged_at: Option<DateTime<Utc>>,

    /// Identity of the judge, set on transition out of `Pending`
    #[serde(default)]
    pub judged_by: Option<String>,
}

impl ConstraintState {
    /// Create a new record awaiting judgement.
    pub fn pending(key: ConstraintKey, comment: Option<String>) -> Self {
        Self {
            key,
            status: ConstraintStatus::Pending,
            comment,
            created_at: Utc::now(),
            judged_at: None,
            judged_by: None,
        }
    }

    /// Build the updated record for a judgement committed at `judged_at`.
    ///
    /// The existing comment is preserved unless the judgement supplies a new
    /// one. Key fields and `created_at` are unchanged.
    pub fn with_judgement(
        &self,
        status: ConstraintStatus,
        comment: Option<String>,
        judged_by: impl Into<String>,
        judged_at: DateTime<Utc>,
    ) -> Self {
        Self {
            key: self.key.clone(),
            status,
            comment: comment.or_else(|| self.comment.clone()),
            created_at: self.created_at,
            judged_at: Some(judged_at),
            judged_by: Some(judged_by.into()),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ConstraintStatus::Pending
    }
}
