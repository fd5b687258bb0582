//! Per-role capabilities for the claims domain.
//!
//! One policy object per role replaces scattered role switches; the
//! repository consumes `ListingScope`, the service consumes the capability
//! checks.

use crate::expenses::expenses_lifecycle::TransitionEvent;
use crate::users::Role;

/// Which rows of the claims table a caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingScope {
    /// Every row.
    All,
    /// Rows whose handler holds the internal-consultant role.
    InternalConsultantHandled,
    /// Rows the caller handles or submitted.
    OwnRecords,
}

#[derive(Debug, Clone, Copy)]
pub struct RolePolicy {
    role: Role,
}

impl RolePolicy {
    pub fn for_role(role: Role) -> Self {
        RolePolicy { role }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn listing_scope(&self) -> ListingScope {
        match self.role {
            Role::FinancialWorker | Role::Administrator => ListingScope::All,
            Role::InternalEmployee => ListingScope::InternalConsultantHandled,
            Role::InternalConsultant | Role::ExternalConsultant => ListingScope::OwnRecords,
        }
    }

    /// Review actions belong to financial workers; resubmission belongs to
    /// everyone who may edit fields.
    pub fn may_transition(&self, event: &TransitionEvent) -> bool {
        match event {
            TransitionEvent::Approve
            | TransitionEvent::Reject { .. }
            | TransitionEvent::Complete => self.role == Role::FinancialWorker,
            TransitionEvent::Resubmit => self.may_edit_fields(),
        }
    }

    pub fn may_edit_fields(&self) -> bool {
        self.role != Role::FinancialWorker
    }
}
