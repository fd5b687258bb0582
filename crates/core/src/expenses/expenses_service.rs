use std::sync::Arc;

use log::warn;

use crate::documents::DocumentStoreTrait;
use crate::errors::{Result, ValidationError};
use crate::expenses::expenses_errors::ExpenseError;
use crate::expenses::expenses_lifecycle::{current_status, is_locked, TransitionEvent};
use crate::expenses::expenses_model::{
    ExpenseListQuery, ExpenseListResponse, ExpenseUpdate, ExpenseWithDetails, NewExpense,
};
use crate::expenses::expenses_policy::{ListingScope, RolePolicy};
use crate::expenses::expenses_traits::{ExpenseRepositoryTrait, ExpenseServiceTrait};
use crate::notifications::{EmailMessage, NotificationDispatcher};
use crate::users::{AuthContext, Role, UserRepositoryTrait};

pub struct ExpenseService {
    repository: Arc<dyn ExpenseRepositoryTrait>,
    users: Arc<dyn UserRepositoryTrait>,
    documents: Arc<dyn DocumentStoreTrait>,
    dispatcher: NotificationDispatcher,
    public_base_url: String,
}

impl ExpenseService {
    pub fn new(
        repository: Arc<dyn ExpenseRepositoryTrait>,
        users: Arc<dyn UserRepositoryTrait>,
        documents: Arc<dyn DocumentStoreTrait>,
        dispatcher: NotificationDispatcher,
        public_base_url: String,
    ) -> Self {
        ExpenseService {
            repository,
            users,
            documents,
            dispatcher,
            public_base_url,
        }
    }

    fn can_view(&self, actor: &AuthContext, details: &ExpenseWithDetails) -> Result<bool> {
        match RolePolicy::for_role(actor.role).listing_scope() {
            ListingScope::All => Ok(true),
            ListingScope::OwnRecords => Ok(details.expense.handler_id == actor.user_id
                || details.expense.created_by_id == actor.user_id),
            ListingScope::InternalConsultantHandled => {
                let handler = self.users.load_user_by_id(&details.expense.handler_id)?;
                Ok(handler.role == Role::InternalConsultant)
            }
        }
    }

    fn ensure_viewable(
        &self,
        actor: &AuthContext,
        details: ExpenseWithDetails,
    ) -> Result<ExpenseWithDetails> {
        if !self.can_view(actor, &details)? {
            return Err(ExpenseError::Forbidden(
                "You are not allowed to access this expense".to_string(),
            )
            .into());
        }
        Ok(details)
    }

    fn transition(
        &self,
        actor: &AuthContext,
        expense_id: &str,
        event: TransitionEvent,
    ) -> Result<ExpenseWithDetails> {
        if !RolePolicy::for_role(actor.role).may_transition(&event) {
            return Err(ExpenseError::Forbidden(
                "Your role cannot perform this action".to_string(),
            )
            .into());
        }
        let details = self.repository.apply_transition(expense_id, &event)?;
        self.notify_handler(&details, &event);
        Ok(details)
    }

    /// Mails the handler about a review outcome. Runs detached after the
    /// transition committed; a relay failure never reaches the caller.
    fn notify_handler(&self, details: &ExpenseWithDetails, event: &TransitionEvent) {
        let (subject, outcome) = match event {
            TransitionEvent::Approve => ("Verzoek goedgekeurd", "goedgekeurd".to_string()),
            TransitionEvent::Reject { notes } => (
                "Verzoek afgekeurd",
                format!("afgekeurd.\n\nReden: {}", notes),
            ),
            TransitionEvent::Complete => ("Verzoek afgerond", "afgerond".to_string()),
            TransitionEvent::Resubmit => return,
        };

        let handler = match self.users.load_user_by_id(&details.expense.handler_id) {
            Ok(user) => user,
            Err(e) => {
                warn!(
                    "Cannot notify handler of expense {}: {}",
                    details.expense.id, e
                );
                return;
            }
        };

        let content = format!(
            "Beste {},\n\nHet verzoek voor {} is {}",
            handler.name, details.expense.customer_last_name, outcome
        );
        self.dispatcher.dispatch_detached(EmailMessage {
            recipient_name: handler.name,
            recipient_email: handler.email,
            subject: subject.to_string(),
            content,
            button_url: format!(
                "{}/verzoeken/{}",
                self.public_base_url, details.expense.id
            ),
            button_text: "Bekijk verzoek".to_string(),
        });
    }
}

impl ExpenseServiceTrait for ExpenseService {
    fn create_expense(
        &self,
        actor: &AuthContext,
        new_expense: NewExpense,
    ) -> Result<ExpenseWithDetails> {
        if !RolePolicy::for_role(actor.role).may_edit_fields() {
            return Err(ExpenseError::Forbidden(
                "Your role cannot submit expenses".to_string(),
            )
            .into());
        }
        if new_expense.company_id.trim().is_empty() {
            return Err(ValidationError::MissingField("companyId".to_string()).into());
        }
        if new_expense.customer_last_name.trim().is_empty() {
            return Err(ValidationError::MissingField("customerLastName".to_string()).into());
        }

        // Consultants always handle their own submissions.
        let handler_id = match actor.role {
            Role::InternalConsultant | Role::ExternalConsultant => actor.user_id.clone(),
            _ => new_expense
                .handler_id
                .clone()
                .filter(|id| !id.trim().is_empty())
                .ok_or_else(|| ValidationError::MissingField("handlerId".to_string()))?,
        };

        self.repository
            .insert_new_expense(&actor.user_id, &handler_id, new_expense)
    }

    fn get_expense(&self, actor: &AuthContext, expense_id: &str) -> Result<ExpenseWithDetails> {
        let details = self.repository.load_details(expense_id)?;
        self.ensure_viewable(actor, details)
    }

    fn edit_expense(
        &self,
        actor: &AuthContext,
        expense_id: &str,
        update: ExpenseUpdate,
    ) -> Result<ExpenseWithDetails> {
        let details = self.repository.load_details(expense_id)?;
        let details = self.ensure_viewable(actor, details)?;

        if is_locked(current_status(&details.states), actor.role) {
            return Err(ExpenseError::Forbidden(
                "This expense is locked for editing".to_string(),
            )
            .into());
        }

        // Old blobs are removed only after the row update committed.
        let replaced: Vec<String> = [
            (&details.expense.signed_otdv, &update.signed_otdv),
            (&details.expense.zzp_invoice, &update.zzp_invoice),
            (
                &details.expense.spread_payment_agreement,
                &update.spread_payment_agreement,
            ),
        ]
        .into_iter()
        .filter_map(|(old, new)| match (old, new) {
            (Some(old), Some(new)) if old != new => Some(old.clone()),
            _ => None,
        })
        .collect();

        let updated = self
            .repository
            .update_fields_and_resubmit(expense_id, update.into())?;

        for key in replaced {
            if let Err(e) = self.documents.delete(&key) {
                warn!("Failed to delete replaced document '{}': {}", key, e);
            }
        }
        Ok(updated)
    }

    fn approve_expense(
        &self,
        actor: &AuthContext,
        expense_id: &str,
    ) -> Result<ExpenseWithDetails> {
        self.transition(actor, expense_id, TransitionEvent::Approve)
    }

    fn reject_expense(
        &self,
        actor: &AuthContext,
        expense_id: &str,
        notes: String,
    ) -> Result<ExpenseWithDetails> {
        self.transition(actor, expense_id, TransitionEvent::Reject { notes })
    }

    fn complete_expense(
        &self,
        actor: &AuthContext,
        expense_id: &str,
    ) -> Result<ExpenseWithDetails> {
        self.transition(actor, expense_id, TransitionEvent::Complete)
    }

    fn list_expenses(
        &self,
        actor: &AuthContext,
        query: &ExpenseListQuery,
    ) -> Result<ExpenseListResponse> {
        let scope = RolePolicy::for_role(actor.role).listing_scope();
        self.repository.list_expenses(scope, &actor.user_id, query)
    }
}
