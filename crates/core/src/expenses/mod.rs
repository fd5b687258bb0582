//! Expenses module - the claim lifecycle, its policies and listing machinery.

pub mod expenses_errors;
pub mod expenses_lifecycle;
pub mod expenses_model;
pub mod expenses_policy;
pub mod expenses_query;
pub mod expenses_repository;
pub mod expenses_service;
pub mod expenses_traits;

pub use expenses_errors::ExpenseError;
pub use expenses_lifecycle::{current_status, is_locked, next_status, ExpenseStatus, TransitionEvent};
pub use expenses_model::{
    Expense, ExpenseListQuery, ExpenseListResponse, ExpenseState, ExpenseUpdate,
    ExpenseWithDetails, IbDeclaration, NewExpense, PaymentMethod,
};
pub use expenses_policy::{ListingScope, RolePolicy};
pub use expenses_repository::ExpenseRepository;
pub use expenses_service::ExpenseService;
pub use expenses_traits::{ExpenseRepositoryTrait, ExpenseServiceTrait};
