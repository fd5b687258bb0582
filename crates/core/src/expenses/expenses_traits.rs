use crate::errors::Result;
use crate::expenses::expenses_lifecycle::TransitionEvent;
use crate::expenses::expenses_model::{
    ExpenseChangesetDB, ExpenseListQuery, ExpenseListResponse, ExpenseUpdate, ExpenseWithDetails,
    NewExpense,
};
use crate::expenses::expenses_policy::ListingScope;
use crate::users::AuthContext;

/// Trait for claim repository operations
pub trait ExpenseRepositoryTrait: Send + Sync {
    fn insert_new_expense(
        &self,
        created_by_id: &str,
        handler_id: &str,
        new_expense: NewExpense,
    ) -> Result<ExpenseWithDetails>;
    fn load_details(&self, expense_id: &str) -> Result<ExpenseWithDetails>;
    /// Re-checks the precondition and appends the state row in one
    /// transaction; concurrent callers serialize and the loser conflicts.
    fn apply_transition(
        &self,
        expense_id: &str,
        event: &TransitionEvent,
    ) -> Result<ExpenseWithDetails>;
    /// Applies field changes and appends the resubmission entry atomically.
    fn update_fields_and_resubmit(
        &self,
        expense_id: &str,
        changes: ExpenseChangesetDB,
    ) -> Result<ExpenseWithDetails>;
    fn list_expenses(
        &self,
        scope: ListingScope,
        actor_id: &str,
        query: &ExpenseListQuery,
    ) -> Result<ExpenseListResponse>;
}

/// Trait for claim service operations
pub trait ExpenseServiceTrait: Send + Sync {
    fn create_expense(
        &self,
        actor: &AuthContext,
        new_expense: NewExpense,
    ) -> Result<ExpenseWithDetails>;
    fn get_expense(&self, actor: &AuthContext, expense_id: &str) -> Result<ExpenseWithDetails>;
    fn edit_expense(
        &self,
        actor: &AuthContext,
        expense_id: &str,
        update: ExpenseUpdate,
    ) -> Result<ExpenseWithDetails>;
    fn approve_expense(&self, actor: &AuthContext, expense_id: &str)
        -> Result<ExpenseWithDetails>;
    fn reject_expense(
        &self,
        actor: &AuthContext,
        expense_id: &str,
        notes: String,
    ) -> Result<ExpenseWithDetails>;
    fn complete_expense(
        &self,
        actor: &AuthContext,
        expense_id: &str,
    ) -> Result<ExpenseWithDetails>;
    fn list_expenses(
        &self,
        actor: &AuthContext,
        query: &ExpenseListQuery,
    ) -> Result<ExpenseListResponse>;
}
