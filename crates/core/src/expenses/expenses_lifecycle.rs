//! Pure lifecycle rules for the claim status state machine.
//!
//! The current status of a claim is never stored; it is the type of the last
//! entry of its append-only state history.

use serde::{Deserialize, Serialize};

use crate::expenses::expenses_errors::ExpenseError;
use crate::expenses::expenses_model::ExpenseState;
use crate::users::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseStatus {
    Submitted,
    Approved,
    Rejected,
    Resubmitted,
    Completed,
}

impl ExpenseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseStatus::Submitted => "SUBMITTED",
            ExpenseStatus::Approved => "APPROVED",
            ExpenseStatus::Rejected => "REJECTED",
            ExpenseStatus::Resubmitted => "RESUBMITTED",
            ExpenseStatus::Completed => "COMPLETED",
        }
    }

    pub fn from_str(value: &str) -> Result<Self, ExpenseError> {
        match value {
            "SUBMITTED" => Ok(ExpenseStatus::Submitted),
            "APPROVED" => Ok(ExpenseStatus::Approved),
            "REJECTED" => Ok(ExpenseStatus::Rejected),
            "RESUBMITTED" => Ok(ExpenseStatus::Resubmitted),
            "COMPLETED" => Ok(ExpenseStatus::Completed),
            other => Err(ExpenseError::InvalidData(format!(
                "Unknown expense state '{}'",
                other
            ))),
        }
    }
}

/// An attempted lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionEvent {
    Approve,
    Reject { notes: String },
    Complete,
    Resubmit,
}

impl TransitionEvent {
    pub fn target(&self) -> ExpenseStatus {
        match self {
            TransitionEvent::Approve => ExpenseStatus::Approved,
            TransitionEvent::Reject { .. } => ExpenseStatus::Rejected,
            TransitionEvent::Complete => ExpenseStatus::Completed,
            TransitionEvent::Resubmit => ExpenseStatus::Resubmitted,
        }
    }
}

/// The derived status: the type of the last element of the ordered history.
pub fn current_status(states: &[ExpenseState]) -> Option<ExpenseStatus> {
    states.last().map(|s| s.state_type)
}

/// Validates `event` against the current status and returns the status to
/// append. A stale precondition is a conflict, never a silent no-op.
pub fn next_status(
    current: Option<ExpenseStatus>,
    event: &TransitionEvent,
) -> Result<ExpenseStatus, ExpenseError> {
    match event {
        TransitionEvent::Approve | TransitionEvent::Reject { .. } => match current {
            Some(ExpenseStatus::Submitted) | Some(ExpenseStatus::Resubmitted) => {
                if let TransitionEvent::Reject { notes } = event {
                    if notes.trim().is_empty() {
                        return Err(ExpenseError::InvalidData(
                            "A rejection requires a reason".to_string(),
                        ));
                    }
                }
                Ok(event.target())
            }
            other => Err(stale(other, event)),
        },
        TransitionEvent::Complete => match current {
            Some(ExpenseStatus::Approved) => Ok(ExpenseStatus::Completed),
            other => Err(stale(other, event)),
        },
        TransitionEvent::Resubmit => match current {
            None | Some(ExpenseStatus::Rejected) => Ok(ExpenseStatus::Resubmitted),
            other => Err(stale(other, event)),
        },
    }
}

fn stale(current: Option<ExpenseStatus>, event: &TransitionEvent) -> ExpenseError {
    ExpenseError::InvalidTransition(format!(
        "Cannot move to {} from {}",
        event.target().as_str(),
        current.map(|s| s.as_str()).unwrap_or("no state")
    ))
}

/// A record is locked for field edits when the caller is a financial worker
/// (they never edit claim fields directly), or when a current state exists
/// and is anything other than Rejected.
pub fn is_locked(current: Option<ExpenseStatus>, role: Role) -> bool {
    if role == Role::FinancialWorker {
        return true;
    }
    matches!(current, Some(status) if status != ExpenseStatus::Rejected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn state(status: ExpenseStatus) -> ExpenseState {
        ExpenseState {
            id: "s".to_string(),
            expense_id: "e".to_string(),
            state_type: status,
            notes: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn current_status_is_last_entry() {
        assert_eq!(current_status(&[]), None);
        let history = vec![state(ExpenseStatus::Submitted), state(ExpenseStatus::Approved)];
        assert_eq!(current_status(&history), Some(ExpenseStatus::Approved));
    }

    #[test]
    fn approve_requires_submitted_or_resubmitted() {
        for from in [ExpenseStatus::Submitted, ExpenseStatus::Resubmitted] {
            assert_eq!(
                next_status(Some(from), &TransitionEvent::Approve).unwrap(),
                ExpenseStatus::Approved
            );
        }
        for from in [
            ExpenseStatus::Approved,
            ExpenseStatus::Rejected,
            ExpenseStatus::Completed,
        ] {
            assert!(matches!(
                next_status(Some(from), &TransitionEvent::Approve),
                Err(ExpenseError::InvalidTransition(_))
            ));
        }
    }

    #[test]
    fn reject_requires_non_empty_notes() {
        let reject = TransitionEvent::Reject {
            notes: "   ".to_string(),
        };
        assert!(matches!(
            next_status(Some(ExpenseStatus::Submitted), &reject),
            Err(ExpenseError::InvalidData(_))
        ));

        let reject = TransitionEvent::Reject {
            notes: "missing signature".to_string(),
        };
        assert_eq!(
            next_status(Some(ExpenseStatus::Submitted), &reject).unwrap(),
            ExpenseStatus::Rejected
        );
    }

    #[test]
    fn complete_requires_approved() {
        assert_eq!(
            next_status(Some(ExpenseStatus::Approved), &TransitionEvent::Complete).unwrap(),
            ExpenseStatus::Completed
        );
        assert!(matches!(
            next_status(Some(ExpenseStatus::Completed), &TransitionEvent::Complete),
            Err(ExpenseError::InvalidTransition(_))
        ));
    }

    #[test]
    fn resubmit_only_from_rejected_or_empty_history() {
        assert_eq!(
            next_status(None, &TransitionEvent::Resubmit).unwrap(),
            ExpenseStatus::Resubmitted
        );
        assert_eq!(
            next_status(Some(ExpenseStatus::Rejected), &TransitionEvent::Resubmit).unwrap(),
            ExpenseStatus::Resubmitted
        );
        assert!(matches!(
            next_status(Some(ExpenseStatus::Approved), &TransitionEvent::Resubmit),
            Err(ExpenseError::InvalidTransition(_))
        ));
    }

    #[test]
    fn lock_rules() {
        // Financial workers never edit claim fields.
        assert!(is_locked(None, Role::FinancialWorker));
        assert!(is_locked(Some(ExpenseStatus::Rejected), Role::FinancialWorker));

        // Fresh records and rejected records are editable for the submitter.
        assert!(!is_locked(None, Role::ExternalConsultant));
        assert!(!is_locked(Some(ExpenseStatus::Rejected), Role::InternalConsultant));

        for status in [
            ExpenseStatus::Submitted,
            ExpenseStatus::Approved,
            ExpenseStatus::Resubmitted,
            ExpenseStatus::Completed,
        ] {
            assert!(is_locked(Some(status), Role::ExternalConsultant));
        }
    }
}
