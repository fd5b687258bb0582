use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use log::warn;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::expenses::expenses_errors::ExpenseError;
use crate::expenses::expenses_lifecycle::ExpenseStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Settled by the notary at the legal transfer.
    Notary,
    /// Invoiced directly.
    Invoice,
    /// Paid in instalments per the signed agreement.
    Spread,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Notary => "NOTARY",
            PaymentMethod::Invoice => "INVOICE",
            PaymentMethod::Spread => "SPREAD",
        }
    }

    pub fn from_str(value: &str) -> Result<Self, ExpenseError> {
        match value {
            "NOTARY" => Ok(PaymentMethod::Notary),
            "INVOICE" => Ok(PaymentMethod::Invoice),
            "SPREAD" => Ok(PaymentMethod::Spread),
            other => Err(ExpenseError::InvalidData(format!(
                "Unknown payment method '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IbDeclaration {
    No,
    Yes,
}

impl IbDeclaration {
    pub fn as_str(&self) -> &'static str {
        match self {
            IbDeclaration::No => "NO",
            IbDeclaration::Yes => "YES",
        }
    }

    pub fn from_str(value: &str) -> Result<Self, ExpenseError> {
        match value {
            "NO" => Ok(IbDeclaration::No),
            "YES" => Ok(IbDeclaration::Yes),
            other => Err(ExpenseError::InvalidData(format!(
                "Unknown IB declaration '{}'",
                other
            ))),
        }
    }
}

#[derive(Queryable, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::expense_states)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExpenseStateDB {
    pub id: String,
    pub expense_id: String,
    pub state_type: String,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::expense_states)]
pub struct NewExpenseStateDB {
    pub id: String,
    pub expense_id: String,
    pub state_type: String,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

/// One entry of a claim's append-only status history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseState {
    pub id: String,
    pub expense_id: String,
    #[serde(rename = "type")]
    pub state_type: ExpenseStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

impl TryFrom<ExpenseStateDB> for ExpenseState {
    type Error = ExpenseError;

    fn try_from(db: ExpenseStateDB) -> Result<Self, Self::Error> {
        Ok(ExpenseState {
            state_type: ExpenseStatus::from_str(&db.state_type)?,
            id: db.id,
            expense_id: db.expense_id,
            notes: db.notes,
            created_at: db.created_at,
        })
    }
}

#[derive(Queryable, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::expenses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExpenseDB {
    pub id: String,
    pub handler_id: String,
    pub created_by_id: String,
    pub company_id: String,
    pub customer_salutation: String,
    pub customer_initials: String,
    pub customer_prefix: Option<String>,
    pub customer_last_name: String,
    pub customer_email: String,
    pub second_customer_salutation: Option<String>,
    pub second_customer_initials: Option<String>,
    pub second_customer_prefix: Option<String>,
    pub second_customer_last_name: Option<String>,
    pub second_customer_email: Option<String>,
    pub invoice_address: String,
    pub postal_code: String,
    pub city: String,
    pub passing_date: Option<NaiveDate>,
    pub notary_name: String,
    pub starter_loan: bool,
    pub object_address: String,
    pub object_postal_code: String,
    pub object_city: String,
    pub mortgage_invoice_amount: Option<f64>,
    pub insurance_invoice_amount: Option<f64>,
    pub other_invoice_amount: Option<f64>,
    pub signed_otdv: Option<String>,
    pub zzp_invoice: Option<String>,
    pub spread_payment_agreement: Option<String>,
    pub payment_method: String,
    pub ib_declaration: String,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
}

/// A claim as the rest of the application sees it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub handler_id: String,
    pub created_by_id: String,
    pub company_id: String,
    pub customer_salutation: String,
    pub customer_initials: String,
    pub customer_prefix: Option<String>,
    pub customer_last_name: String,
    pub customer_email: String,
    pub second_customer_salutation: Option<String>,
    pub second_customer_initials: Option<String>,
    pub second_customer_prefix: Option<String>,
    pub second_customer_last_name: Option<String>,
    pub second_customer_email: Option<String>,
    pub invoice_address: String,
    pub postal_code: String,
    pub city: String,
    pub passing_date: Option<NaiveDate>,
    pub notary_name: String,
    pub starter_loan: bool,
    pub object_address: String,
    pub object_postal_code: String,
    pub object_city: String,
    pub mortgage_invoice_amount: Option<Decimal>,
    pub insurance_invoice_amount: Option<Decimal>,
    pub other_invoice_amount: Option<Decimal>,
    pub signed_otdv: Option<String>,
    pub zzp_invoice: Option<String>,
    pub spread_payment_agreement: Option<String>,
    pub payment_method: PaymentMethod,
    pub ib_declaration: IbDeclaration,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
}

impl TryFrom<ExpenseDB> for Expense {
    type Error = ExpenseError;

    fn try_from(db: ExpenseDB) -> Result<Self, Self::Error> {
        Ok(Expense {
            payment_method: PaymentMethod::from_str(&db.payment_method)?,
            ib_declaration: IbDeclaration::from_str(&db.ib_declaration)?,
            mortgage_invoice_amount: db.mortgage_invoice_amount.map(decimal_from_stored),
            insurance_invoice_amount: db.insurance_invoice_amount.map(decimal_from_stored),
            other_invoice_amount: db.other_invoice_amount.map(decimal_from_stored),
            id: db.id,
            handler_id: db.handler_id,
            created_by_id: db.created_by_id,
            company_id: db.company_id,
            customer_salutation: db.customer_salutation,
            customer_initials: db.customer_initials,
            customer_prefix: db.customer_prefix,
            customer_last_name: db.customer_last_name,
            customer_email: db.customer_email,
            second_customer_salutation: db.second_customer_salutation,
            second_customer_initials: db.second_customer_initials,
            second_customer_prefix: db.second_customer_prefix,
            second_customer_last_name: db.second_customer_last_name,
            second_customer_email: db.second_customer_email,
            invoice_address: db.invoice_address,
            postal_code: db.postal_code,
            city: db.city,
            passing_date: db.passing_date,
            notary_name: db.notary_name,
            starter_loan: db.starter_loan,
            object_address: db.object_address,
            object_postal_code: db.object_postal_code,
            object_city: db.object_city,
            signed_otdv: db.signed_otdv,
            zzp_invoice: db.zzp_invoice,
            spread_payment_agreement: db.spread_payment_agreement,
            notes: db.notes,
            created_at: db.created_at,
            completed_at: db.completed_at,
        })
    }
}

pub(crate) fn decimal_from_stored(value: f64) -> Decimal {
    match Decimal::try_from(value) {
        Ok(d) => d.round_dp(2),
        Err(e) => {
            warn!("Failed to convert stored amount {}: {}", value, e);
            Decimal::ZERO
        }
    }
}

pub(crate) fn decimal_to_stored(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::expenses)]
pub struct NewExpenseDB {
    pub id: String,
    pub handler_id: String,
    pub created_by_id: String,
    pub company_id: String,
    pub customer_salutation: String,
    pub customer_initials: String,
    pub customer_prefix: Option<String>,
    pub customer_last_name: String,
    pub customer_email: String,
    pub second_customer_salutation: Option<String>,
    pub second_customer_initials: Option<String>,
    pub second_customer_prefix: Option<String>,
    pub second_customer_last_name: Option<String>,
    pub second_customer_email: Option<String>,
    pub invoice_address: String,
    pub postal_code: String,
    pub city: String,
    pub passing_date: Option<NaiveDate>,
    pub notary_name: String,
    pub starter_loan: bool,
    pub object_address: String,
    pub object_postal_code: String,
    pub object_city: String,
    pub mortgage_invoice_amount: Option<f64>,
    pub insurance_invoice_amount: Option<f64>,
    pub other_invoice_amount: Option<f64>,
    pub signed_otdv: Option<String>,
    pub zzp_invoice: Option<String>,
    pub spread_payment_agreement: Option<String>,
    pub payment_method: String,
    pub ib_declaration: String,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

/// A new claim as submitted by a consultant.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    /// Defaults to the submitter for consultant roles.
    pub handler_id: Option<String>,
    pub company_id: String,
    pub customer_salutation: String,
    pub customer_initials: String,
    #[serde(default)]
    pub customer_prefix: Option<String>,
    pub customer_last_name: String,
    pub customer_email: String,
    #[serde(default)]
    pub second_customer_salutation: Option<String>,
    #[serde(default)]
    pub second_customer_initials: Option<String>,
    #[serde(default)]
    pub second_customer_prefix: Option<String>,
    #[serde(default)]
    pub second_customer_last_name: Option<String>,
    #[serde(default)]
    pub second_customer_email: Option<String>,
    pub invoice_address: String,
    pub postal_code: String,
    pub city: String,
    #[serde(default)]
    pub passing_date: Option<NaiveDate>,
    pub notary_name: String,
    #[serde(default)]
    pub starter_loan: bool,
    pub object_address: String,
    pub object_postal_code: String,
    pub object_city: String,
    #[serde(default)]
    pub mortgage_invoice_amount: Option<Decimal>,
    #[serde(default)]
    pub insurance_invoice_amount: Option<Decimal>,
    #[serde(default)]
    pub other_invoice_amount: Option<Decimal>,
    #[serde(default)]
    pub signed_otdv: Option<String>,
    #[serde(default)]
    pub zzp_invoice: Option<String>,
    #[serde(default)]
    pub spread_payment_agreement: Option<String>,
    pub payment_method: PaymentMethod,
    pub ib_declaration: IbDeclaration,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Field edits for a claim; only present fields are written.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseUpdate {
    pub handler_id: Option<String>,
    pub company_id: Option<String>,
    pub customer_salutation: Option<String>,
    pub customer_initials: Option<String>,
    pub customer_prefix: Option<String>,
    pub customer_last_name: Option<String>,
    pub customer_email: Option<String>,
    pub second_customer_salutation: Option<String>,
    pub second_customer_initials: Option<String>,
    pub second_customer_prefix: Option<String>,
    pub second_customer_last_name: Option<String>,
    pub second_customer_email: Option<String>,
    pub invoice_address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub passing_date: Option<NaiveDate>,
    pub notary_name: Option<String>,
    pub starter_loan: Option<bool>,
    pub object_address: Option<String>,
    pub object_postal_code: Option<String>,
    pub object_city: Option<String>,
    pub mortgage_invoice_amount: Option<Decimal>,
    pub insurance_invoice_amount: Option<Decimal>,
    pub other_invoice_amount: Option<Decimal>,
    pub signed_otdv: Option<String>,
    pub zzp_invoice: Option<String>,
    pub spread_payment_agreement: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub ib_declaration: Option<IbDeclaration>,
    pub notes: Option<String>,
}

#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = crate::schema::expenses)]
pub struct ExpenseChangesetDB {
    pub handler_id: Option<String>,
    pub company_id: Option<String>,
    pub customer_salutation: Option<String>,
    pub customer_initials: Option<String>,
    pub customer_prefix: Option<String>,
    pub customer_last_name: Option<String>,
    pub customer_email: Option<String>,
    pub second_customer_salutation: Option<String>,
    pub second_customer_initials: Option<String>,
    pub second_customer_prefix: Option<String>,
    pub second_customer_last_name: Option<String>,
    pub second_customer_email: Option<String>,
    pub invoice_address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub passing_date: Option<NaiveDate>,
    pub notary_name: Option<String>,
    pub starter_loan: Option<bool>,
    pub object_address: Option<String>,
    pub object_postal_code: Option<String>,
    pub object_city: Option<String>,
    pub mortgage_invoice_amount: Option<f64>,
    pub insurance_invoice_amount: Option<f64>,
    pub other_invoice_amount: Option<f64>,
    pub signed_otdv: Option<String>,
    pub zzp_invoice: Option<String>,
    pub spread_payment_agreement: Option<String>,
    pub payment_method: Option<String>,
    pub ib_declaration: Option<String>,
    pub notes: Option<String>,
}

impl From<ExpenseUpdate> for ExpenseChangesetDB {
    fn from(update: ExpenseUpdate) -> Self {
        ExpenseChangesetDB {
            handler_id: update.handler_id,
            company_id: update.company_id,
            customer_salutation: update.customer_salutation,
            customer_initials: update.customer_initials,
            customer_prefix: update.customer_prefix,
            customer_last_name: update.customer_last_name,
            customer_email: update.customer_email,
            second_customer_salutation: update.second_customer_salutation,
            second_customer_initials: update.second_customer_initials,
            second_customer_prefix: update.second_customer_prefix,
            second_customer_last_name: update.second_customer_last_name,
            second_customer_email: update.second_customer_email,
            invoice_address: update.invoice_address,
            postal_code: update.postal_code,
            city: update.city,
            passing_date: update.passing_date,
            notary_name: update.notary_name,
            starter_loan: update.starter_loan,
            object_address: update.object_address,
            object_postal_code: update.object_postal_code,
            object_city: update.object_city,
            mortgage_invoice_amount: update.mortgage_invoice_amount.map(decimal_to_stored),
            insurance_invoice_amount: update.insurance_invoice_amount.map(decimal_to_stored),
            other_invoice_amount: update.other_invoice_amount.map(decimal_to_stored),
            signed_otdv: update.signed_otdv,
            zzp_invoice: update.zzp_invoice,
            spread_payment_agreement: update.spread_payment_agreement,
            payment_method: update.payment_method.map(|m| m.as_str().to_string()),
            ib_declaration: update.ib_declaration.map(|d| d.as_str().to_string()),
            notes: update.notes,
        }
    }
}

/// A claim with its full state history and listing relations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseWithDetails {
    #[serde(flatten)]
    pub expense: Expense,
    pub states: Vec<ExpenseState>,
    pub handler_name: String,
    pub company_name: String,
    /// Legal transfer date preceded submission; absent when no passing date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_early: Option<bool>,
}

impl ExpenseWithDetails {
    pub fn new(
        expense: Expense,
        states: Vec<ExpenseState>,
        handler_name: String,
        company_name: String,
    ) -> Self {
        let is_early = expense
            .passing_date
            .map(|date| date < expense.created_at.date());
        ExpenseWithDetails {
            expense,
            states,
            handler_name,
            company_name,
            is_early,
        }
    }
}

/// Listing request: pagination window plus free-form filter and sort maps,
/// both restricted to a closed set of recognized paths at parse time.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_take")]
    pub take: i64,
    #[serde(default)]
    pub filter: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub sort: serde_json::Map<String, serde_json::Value>,
}

fn default_page() -> i64 {
    1
}

fn default_take() -> i64 {
    crate::constants::DEFAULT_PAGE_SIZE
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseListResponse {
    /// Count over scope+filter at the storage layer. An upper bound while the
    /// derived-status filter is active.
    pub count: i64,
    pub collection: Vec<ExpenseWithDetails>,
}
