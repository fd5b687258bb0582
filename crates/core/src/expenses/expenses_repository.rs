use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use diesel::sqlite::Sqlite;
use uuid::Uuid;

use crate::constants::TAKE_ALL;
use crate::db::{get_connection, DbPool};
use crate::errors::{Result, ValidationError};
use crate::expenses::expenses_errors::ExpenseError;
use crate::expenses::expenses_lifecycle::{
    current_status, next_status, ExpenseStatus, TransitionEvent,
};
use crate::expenses::expenses_model::{
    decimal_to_stored, Expense, ExpenseChangesetDB, ExpenseDB, ExpenseListQuery,
    ExpenseListResponse, ExpenseState, ExpenseStateDB, ExpenseWithDetails, NewExpense,
    NewExpenseDB, NewExpenseStateDB,
};
use crate::expenses::expenses_policy::ListingScope;
use crate::expenses::expenses_query::{
    parse_plan, FieldPath, FilterGroup, Matcher, ScalarValue, SortDirection,
};
use crate::expenses::expenses_traits::ExpenseRepositoryTrait;
use crate::schema::{companies, expense_states, expenses, users};
use crate::users::Role;

type ExpensePredicate = Box<dyn BoxableExpression<expenses::table, Sqlite, SqlType = Bool>>;

pub struct ExpenseRepository {
    pool: Arc<DbPool>,
}

impl ExpenseRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        ExpenseRepository { pool }
    }
}

impl ExpenseRepositoryTrait for ExpenseRepository {
    fn insert_new_expense(
        &self,
        created_by_id: &str,
        handler_id: &str,
        new_expense: NewExpense,
    ) -> Result<ExpenseWithDetails> {
        let mut conn = get_connection(&self.pool)?;
        let now = Utc::now().naive_utc();
        let expense_id = Uuid::new_v4().to_string();

        let row = NewExpenseDB {
            id: expense_id.clone(),
            handler_id: handler_id.to_string(),
            created_by_id: created_by_id.to_string(),
            company_id: new_expense.company_id,
            customer_salutation: new_expense.customer_salutation,
            customer_initials: new_expense.customer_initials,
            customer_prefix: new_expense.customer_prefix,
            customer_last_name: new_expense.customer_last_name,
            customer_email: new_expense.customer_email,
            second_customer_salutation: new_expense.second_customer_salutation,
            second_customer_initials: new_expense.second_customer_initials,
            second_customer_prefix: new_expense.second_customer_prefix,
            second_customer_last_name: new_expense.second_customer_last_name,
            second_customer_email: new_expense.second_customer_email,
            invoice_address: new_expense.invoice_address,
            postal_code: new_expense.postal_code,
            city: new_expense.city,
            passing_date: new_expense.passing_date,
            notary_name: new_expense.notary_name,
            starter_loan: new_expense.starter_loan,
            object_address: new_expense.object_address,
            object_postal_code: new_expense.object_postal_code,
            object_city: new_expense.object_city,
            mortgage_invoice_amount: new_expense.mortgage_invoice_amount.map(decimal_to_stored),
            insurance_invoice_amount: new_expense.insurance_invoice_amount.map(decimal_to_stored),
            other_invoice_amount: new_expense.other_invoice_amount.map(decimal_to_stored),
            signed_otdv: new_expense.signed_otdv,
            zzp_invoice: new_expense.zzp_invoice,
            spread_payment_agreement: new_expense.spread_payment_agreement,
            payment_method: new_expense.payment_method.as_str().to_string(),
            ib_declaration: new_expense.ib_declaration.as_str().to_string(),
            notes: new_expense.notes,
            created_at: now,
        };

        // The row and its initial state entry appear together or not at all.
        conn.transaction::<_, crate::Error, _>(|conn| {
            diesel::insert_into(expenses::table)
                .values(&row)
                .execute(conn)
                .map_err(ExpenseError::from)?;
            append_state(conn, &expense_id, ExpenseStatus::Submitted, None)?;
            load_details_in(conn, &expense_id)
        })
    }

    fn load_details(&self, expense_id: &str) -> Result<ExpenseWithDetails> {
        let mut conn = get_connection(&self.pool)?;
        load_details_in(&mut conn, expense_id)
    }

    fn apply_transition(
        &self,
        expense_id: &str,
        event: &TransitionEvent,
    ) -> Result<ExpenseWithDetails> {
        let mut conn = get_connection(&self.pool)?;
        conn.transaction::<_, crate::Error, _>(|conn| {
            // Re-read the history inside the transaction so concurrent
            // reviewers serialize and the loser gets the conflict.
            let states = load_states_in(conn, expense_id)?;
            ensure_exists(conn, expense_id)?;
            let next = next_status(current_status(&states), event).map_err(crate::Error::Expense)?;

            let notes = match event {
                TransitionEvent::Reject { notes } => Some(notes.clone()),
                _ => None,
            };
            append_state(conn, expense_id, next, notes)?;

            let completed_at = if next == ExpenseStatus::Completed {
                Some(Utc::now().naive_utc())
            } else {
                None
            };
            diesel::update(expenses::table.find(expense_id))
                .set(expenses::completed_at.eq(completed_at))
                .execute(conn)
                .map_err(ExpenseError::from)?;

            load_details_in(conn, expense_id)
        })
    }

    fn update_fields_and_resubmit(
        &self,
        expense_id: &str,
        changes: ExpenseChangesetDB,
    ) -> Result<ExpenseWithDetails> {
        let mut conn = get_connection(&self.pool)?;
        conn.transaction::<_, crate::Error, _>(|conn| {
            let states = load_states_in(conn, expense_id)?;
            ensure_exists(conn, expense_id)?;
            next_status(current_status(&states), &TransitionEvent::Resubmit)
                .map_err(crate::Error::Expense)?;

            // The identity column keeps the changeset non-empty when the
            // caller only resubmits without field edits.
            diesel::update(expenses::table.find(expense_id))
                .set((&changes, expenses::id.eq(expense_id.to_string())))
                .execute(conn)
                .map_err(ExpenseError::from)?;
            append_state(conn, expense_id, ExpenseStatus::Resubmitted, None)?;

            load_details_in(conn, expense_id)
        })
    }

    fn list_expenses(
        &self,
        scope: ListingScope,
        actor_id: &str,
        query: &ExpenseListQuery,
    ) -> Result<ExpenseListResponse> {
        let mut conn = get_connection(&self.pool)?;
        let plan = parse_plan(&query.filter, &query.sort)?;
        let page = query.page.max(1);
        let take = query.take;

        // Count and page read from the same snapshot.
        conn.transaction::<_, crate::Error, _>(|conn| {
            let mut count_q = expenses::table.into_boxed();
            if let Some(scope_clause) = scope_predicate(scope, actor_id) {
                count_q = count_q.filter(scope_clause);
            }
            for group in &plan.groups {
                count_q = count_q.filter(group_predicate(group)?);
            }
            let count = count_q
                .count()
                .get_result::<i64>(conn)
                .map_err(ExpenseError::from)?;

            let mut data_q = expenses::table.select(ExpenseDB::as_select()).into_boxed();
            if let Some(scope_clause) = scope_predicate(scope, actor_id) {
                data_q = data_q.filter(scope_clause);
            }
            for group in &plan.groups {
                data_q = data_q.filter(group_predicate(group)?);
            }

            for (path, direction) in &plan.sort {
                let ascending = *direction == SortDirection::Asc;
                data_q = match (path, ascending) {
                    (FieldPath::Id, true) => data_q.then_order_by(expenses::id.asc()),
                    (FieldPath::Id, false) => data_q.then_order_by(expenses::id.desc()),
                    (FieldPath::CreatedAt, true) => {
                        data_q.then_order_by(expenses::created_at.asc())
                    }
                    (FieldPath::CreatedAt, false) => {
                        data_q.then_order_by(expenses::created_at.desc())
                    }
                    (FieldPath::CompletedAt, true) => {
                        data_q.then_order_by(expenses::completed_at.asc())
                    }
                    (FieldPath::CompletedAt, false) => {
                        data_q.then_order_by(expenses::completed_at.desc())
                    }
                    (FieldPath::PassingDate, true) => {
                        data_q.then_order_by(expenses::passing_date.asc())
                    }
                    (FieldPath::PassingDate, false) => {
                        data_q.then_order_by(expenses::passing_date.desc())
                    }
                    (FieldPath::CustomerLastName, true) => {
                        data_q.then_order_by(expenses::customer_last_name.asc())
                    }
                    (FieldPath::CustomerLastName, false) => {
                        data_q.then_order_by(expenses::customer_last_name.desc())
                    }
                    (FieldPath::ObjectAddress, true) => {
                        data_q.then_order_by(expenses::object_address.asc())
                    }
                    (FieldPath::ObjectAddress, false) => {
                        data_q.then_order_by(expenses::object_address.desc())
                    }
                    (FieldPath::ObjectCity, true) => {
                        data_q.then_order_by(expenses::object_city.asc())
                    }
                    (FieldPath::ObjectCity, false) => {
                        data_q.then_order_by(expenses::object_city.desc())
                    }
                    // Relation sorts run as correlated name lookups.
                    (FieldPath::CompanyName, true) => data_q.then_order_by(
                        companies::table
                            .filter(companies::id.eq(expenses::company_id))
                            .select(companies::name)
                            .single_value()
                            .asc(),
                    ),
                    (FieldPath::CompanyName, false) => data_q.then_order_by(
                        companies::table
                            .filter(companies::id.eq(expenses::company_id))
                            .select(companies::name)
                            .single_value()
                            .desc(),
                    ),
                    (FieldPath::HandlerName, true) => data_q.then_order_by(
                        users::table
                            .filter(users::id.eq(expenses::handler_id))
                            .select(users::name)
                            .single_value()
                            .asc(),
                    ),
                    (FieldPath::HandlerName, false) => data_q.then_order_by(
                        users::table
                            .filter(users::id.eq(expenses::handler_id))
                            .select(users::name)
                            .single_value()
                            .desc(),
                    ),
                    (FieldPath::MortgageInvoiceAmount, true) => {
                        data_q.then_order_by(expenses::mortgage_invoice_amount.asc())
                    }
                    (FieldPath::MortgageInvoiceAmount, false) => {
                        data_q.then_order_by(expenses::mortgage_invoice_amount.desc())
                    }
                    (FieldPath::InsuranceInvoiceAmount, true) => {
                        data_q.then_order_by(expenses::insurance_invoice_amount.asc())
                    }
                    (FieldPath::InsuranceInvoiceAmount, false) => {
                        data_q.then_order_by(expenses::insurance_invoice_amount.desc())
                    }
                    (FieldPath::OtherInvoiceAmount, true) => {
                        data_q.then_order_by(expenses::other_invoice_amount.asc())
                    }
                    (FieldPath::OtherInvoiceAmount, false) => {
                        data_q.then_order_by(expenses::other_invoice_amount.desc())
                    }
                };
            }
            if plan.sort.is_empty() {
                data_q = data_q.order(expenses::created_at.desc());
            }

            if take != TAKE_ALL {
                data_q = data_q.limit(take).offset((page - 1) * take);
            }

            let rows = data_q.load::<ExpenseDB>(conn).map_err(ExpenseError::from)?;
            let mut collection = assemble_details(conn, rows)?;

            // The derived status lives in the history, not in a column, so
            // this filter runs after the fetch. The count above is therefore
            // an upper bound while a status filter is active.
            if let Some(wanted) = &plan.states {
                collection.retain(|details| {
                    current_status(&details.states)
                        .map(|status| wanted.contains(&status))
                        .unwrap_or(false)
                });
            }

            Ok(ExpenseListResponse { count, collection })
        })
    }
}

fn ensure_exists(conn: &mut SqliteConnection, expense_id: &str) -> Result<()> {
    let found = expenses::table
        .find(expense_id)
        .select(expenses::id)
        .first::<String>(conn)
        .optional()
        .map_err(ExpenseError::from)?;
    if found.is_none() {
        return Err(ExpenseError::NotFound(format!("Expense '{}' not found", expense_id)).into());
    }
    Ok(())
}

fn append_state(
    conn: &mut SqliteConnection,
    expense_id: &str,
    status: ExpenseStatus,
    notes: Option<String>,
) -> Result<()> {
    let row = NewExpenseStateDB {
        id: Uuid::new_v4().to_string(),
        expense_id: expense_id.to_string(),
        state_type: status.as_str().to_string(),
        notes,
        created_at: Utc::now().naive_utc(),
    };
    diesel::insert_into(expense_states::table)
        .values(&row)
        .execute(conn)
        .map_err(ExpenseError::from)?;
    Ok(())
}

fn load_states_in(conn: &mut SqliteConnection, expense_id: &str) -> Result<Vec<ExpenseState>> {
    let rows = expense_states::table
        .filter(expense_states::expense_id.eq(expense_id))
        .order(expense_states::created_at.asc())
        .select(ExpenseStateDB::as_select())
        .load::<ExpenseStateDB>(conn)
        .map_err(ExpenseError::from)?;
    rows.into_iter()
        .map(|db| ExpenseState::try_from(db).map_err(crate::Error::Expense))
        .collect()
}

fn load_details_in(conn: &mut SqliteConnection, expense_id: &str) -> Result<ExpenseWithDetails> {
    let row = expenses::table
        .find(expense_id)
        .select(ExpenseDB::as_select())
        .first::<ExpenseDB>(conn)
        .optional()
        .map_err(ExpenseError::from)?
        .ok_or_else(|| ExpenseError::NotFound(format!("Expense '{}' not found", expense_id)))?;
    let mut details = assemble_details(conn, vec![row])?;
    details
        .pop()
        .ok_or_else(|| ExpenseError::NotFound(format!("Expense '{}' not found", expense_id)).into())
}

fn assemble_details(
    conn: &mut SqliteConnection,
    rows: Vec<ExpenseDB>,
) -> Result<Vec<ExpenseWithDetails>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
    let handler_ids: Vec<String> = rows.iter().map(|r| r.handler_id.clone()).collect();
    let company_ids: Vec<String> = rows.iter().map(|r| r.company_id.clone()).collect();

    let state_rows = expense_states::table
        .filter(expense_states::expense_id.eq_any(&ids))
        .order(expense_states::created_at.asc())
        .select(ExpenseStateDB::as_select())
        .load::<ExpenseStateDB>(conn)
        .map_err(ExpenseError::from)?;
    let mut states_by_expense: HashMap<String, Vec<ExpenseState>> = HashMap::new();
    for state_row in state_rows {
        let state = ExpenseState::try_from(state_row).map_err(crate::Error::Expense)?;
        states_by_expense
            .entry(state.expense_id.clone())
            .or_default()
            .push(state);
    }

    let handler_names: HashMap<String, String> = users::table
        .filter(users::id.eq_any(&handler_ids))
        .select((users::id, users::name))
        .load::<(String, String)>(conn)
        .map_err(ExpenseError::from)?
        .into_iter()
        .collect();
    let company_names: HashMap<String, String> = companies::table
        .filter(companies::id.eq_any(&company_ids))
        .select((companies::id, companies::name))
        .load::<(String, String)>(conn)
        .map_err(ExpenseError::from)?
        .into_iter()
        .collect();

    rows.into_iter()
        .map(|row| {
            let handler_name = handler_names.get(&row.handler_id).cloned().unwrap_or_default();
            let company_name = company_names.get(&row.company_id).cloned().unwrap_or_default();
            let states = states_by_expense.remove(&row.id).unwrap_or_default();
            let expense = Expense::try_from(row).map_err(crate::Error::Expense)?;
            Ok(ExpenseWithDetails::new(
                expense,
                states,
                handler_name,
                company_name,
            ))
        })
        .collect()
}

fn scope_predicate(scope: ListingScope, actor_id: &str) -> Option<ExpensePredicate> {
    match scope {
        ListingScope::All => None,
        ListingScope::InternalConsultantHandled => Some(Box::new(
            expenses::handler_id.eq_any(
                users::table
                    .filter(users::role.eq(Role::InternalConsultant.as_str()))
                    .select(users::id),
            ),
        )),
        ListingScope::OwnRecords => Some(Box::new(
            expenses::handler_id
                .eq(actor_id.to_string())
                .or(expenses::created_by_id.eq(actor_id.to_string())),
        )),
    }
}

fn group_predicate(group: &FilterGroup) -> Result<ExpensePredicate> {
    let mut paths = group.paths.iter();
    let first = paths.next().ok_or_else(|| {
        ValidationError::InvalidInput("Empty search key".to_string())
    })?;
    let mut acc = path_predicate(*first, &group.matcher)?;
    for path in paths {
        acc = Box::new(acc.or(path_predicate(*path, &group.matcher)?));
    }
    Ok(acc)
}

fn path_predicate(path: FieldPath, matcher: &Matcher) -> Result<ExpensePredicate> {
    let mismatch = || -> crate::Error {
        ValidationError::InvalidInput(format!("Matcher does not apply to {:?}", path)).into()
    };

    match path {
        FieldPath::Id => match matcher {
            Matcher::Equals(ScalarValue::Str(value)) => {
                Ok(Box::new(expenses::id.eq(value.clone())))
            }
            _ => Err(mismatch()),
        },
        FieldPath::CustomerLastName => match matcher {
            Matcher::Contains(needle) => Ok(Box::new(
                expenses::customer_last_name.like(like_pattern(needle)),
            )),
            Matcher::Equals(ScalarValue::Str(value)) => {
                Ok(Box::new(expenses::customer_last_name.eq(value.clone())))
            }
            _ => Err(mismatch()),
        },
        FieldPath::ObjectAddress => match matcher {
            Matcher::Contains(needle) => {
                Ok(Box::new(expenses::object_address.like(like_pattern(needle))))
            }
            Matcher::Equals(ScalarValue::Str(value)) => {
                Ok(Box::new(expenses::object_address.eq(value.clone())))
            }
            _ => Err(mismatch()),
        },
        FieldPath::ObjectCity => match matcher {
            Matcher::Contains(needle) => {
                Ok(Box::new(expenses::object_city.like(like_pattern(needle))))
            }
            Matcher::Equals(ScalarValue::Str(value)) => {
                Ok(Box::new(expenses::object_city.eq(value.clone())))
            }
            _ => Err(mismatch()),
        },
        FieldPath::CompanyName => match matcher {
            Matcher::Contains(needle) => Ok(Box::new(
                expenses::company_id.eq_any(
                    companies::table
                        .filter(companies::name.like(like_pattern(needle)))
                        .select(companies::id),
                ),
            )),
            Matcher::Equals(ScalarValue::Str(value)) => Ok(Box::new(
                expenses::company_id.eq_any(
                    companies::table
                        .filter(companies::name.eq(value.clone()))
                        .select(companies::id),
                ),
            )),
            _ => Err(mismatch()),
        },
        FieldPath::HandlerName => match matcher {
            Matcher::Contains(needle) => Ok(Box::new(
                expenses::handler_id.eq_any(
                    users::table
                        .filter(users::name.like(like_pattern(needle)))
                        .select(users::id),
                ),
            )),
            Matcher::Equals(ScalarValue::Str(value)) => Ok(Box::new(
                expenses::handler_id.eq_any(
                    users::table
                        .filter(users::name.eq(value.clone()))
                        .select(users::id),
                ),
            )),
            _ => Err(mismatch()),
        },
        FieldPath::CreatedAt => match matcher {
            Matcher::Equals(ScalarValue::DateTime(dt)) => {
                Ok(Box::new(expenses::created_at.eq(*dt)))
            }
            Matcher::Range { gte, lte } => {
                let gte = bound_datetime(gte)?.map(|dt| {
                    Box::new(expenses::created_at.ge(dt)) as ExpensePredicate
                });
                let lte = bound_datetime(lte)?.map(|dt| {
                    Box::new(expenses::created_at.le(dt)) as ExpensePredicate
                });
                and_bounds(gte, lte)
            }
            _ => Err(mismatch()),
        },
        FieldPath::CompletedAt => match matcher {
            Matcher::Equals(ScalarValue::DateTime(dt)) => Ok(Box::new(
                expenses::completed_at.assume_not_null().eq(*dt),
            )),
            Matcher::Range { gte, lte } => {
                let gte = bound_datetime(gte)?.map(|dt| {
                    Box::new(expenses::completed_at.assume_not_null().ge(dt))
                        as ExpensePredicate
                });
                let lte = bound_datetime(lte)?.map(|dt| {
                    Box::new(expenses::completed_at.assume_not_null().le(dt))
                        as ExpensePredicate
                });
                and_bounds(gte, lte)
            }
            _ => Err(mismatch()),
        },
        FieldPath::PassingDate => match matcher {
            Matcher::Equals(ScalarValue::DateTime(dt)) => Ok(Box::new(
                expenses::passing_date.assume_not_null().eq(dt.date()),
            )),
            Matcher::Range { gte, lte } => {
                let gte = bound_datetime(gte)?.map(|dt| {
                    Box::new(expenses::passing_date.assume_not_null().ge(dt.date()))
                        as ExpensePredicate
                });
                let lte = bound_datetime(lte)?.map(|dt| {
                    Box::new(expenses::passing_date.assume_not_null().le(dt.date()))
                        as ExpensePredicate
                });
                and_bounds(gte, lte)
            }
            _ => Err(mismatch()),
        },
        FieldPath::MortgageInvoiceAmount => {
            amount_predicate(matcher, |m| match m {
                AmountBound::Eq(v) => {
                    Box::new(expenses::mortgage_invoice_amount.assume_not_null().eq(v))
                }
                AmountBound::Ge(v) => {
                    Box::new(expenses::mortgage_invoice_amount.assume_not_null().ge(v))
                }
                AmountBound::Le(v) => {
                    Box::new(expenses::mortgage_invoice_amount.assume_not_null().le(v))
                }
            })
        }
        FieldPath::InsuranceInvoiceAmount => {
            amount_predicate(matcher, |m| match m {
                AmountBound::Eq(v) => {
                    Box::new(expenses::insurance_invoice_amount.assume_not_null().eq(v))
                }
                AmountBound::Ge(v) => {
                    Box::new(expenses::insurance_invoice_amount.assume_not_null().ge(v))
                }
                AmountBound::Le(v) => {
                    Box::new(expenses::insurance_invoice_amount.assume_not_null().le(v))
                }
            })
        }
        FieldPath::OtherInvoiceAmount => {
            amount_predicate(matcher, |m| match m {
                AmountBound::Eq(v) => {
                    Box::new(expenses::other_invoice_amount.assume_not_null().eq(v))
                }
                AmountBound::Ge(v) => {
                    Box::new(expenses::other_invoice_amount.assume_not_null().ge(v))
                }
                AmountBound::Le(v) => {
                    Box::new(expenses::other_invoice_amount.assume_not_null().le(v))
                }
            })
        }
    }
}

enum AmountBound {
    Eq(f64),
    Ge(f64),
    Le(f64),
}

fn amount_predicate(
    matcher: &Matcher,
    build: impl Fn(AmountBound) -> ExpensePredicate,
) -> Result<ExpensePredicate> {
    match matcher {
        Matcher::Equals(ScalarValue::Amount(value)) => Ok(build(AmountBound::Eq(*value))),
        Matcher::Range { gte, lte } => {
            let gte = bound_amount(gte)?.map(|v| build(AmountBound::Ge(v)));
            let lte = bound_amount(lte)?.map(|v| build(AmountBound::Le(v)));
            and_bounds(gte, lte)
        }
        _ => Err(ValidationError::InvalidInput(
            "Matcher does not apply to an amount field".to_string(),
        )
        .into()),
    }
}

fn bound_datetime(value: &Option<ScalarValue>) -> Result<Option<chrono::NaiveDateTime>> {
    match value {
        None => Ok(None),
        Some(ScalarValue::DateTime(dt)) => Ok(Some(*dt)),
        Some(_) => Err(ValidationError::InvalidInput(
            "Date bound must be a date value".to_string(),
        )
        .into()),
    }
}

fn bound_amount(value: &Option<ScalarValue>) -> Result<Option<f64>> {
    match value {
        None => Ok(None),
        Some(ScalarValue::Amount(v)) => Ok(Some(*v)),
        Some(_) => Err(ValidationError::InvalidInput(
            "Amount bound must be a number".to_string(),
        )
        .into()),
    }
}

fn and_bounds(
    gte: Option<ExpensePredicate>,
    lte: Option<ExpensePredicate>,
) -> Result<ExpensePredicate> {
    match (gte, lte) {
        (Some(a), Some(b)) => Ok(Box::new(a.and(b))),
        (Some(a), None) => Ok(a),
        (None, Some(b)) => Ok(b),
        (None, None) => Err(ValidationError::InvalidInput(
            "Range matcher carries no bound".to_string(),
        )
        .into()),
    }
}

fn like_pattern(needle: &str) -> String {
    format!("%{}%", needle)
}
