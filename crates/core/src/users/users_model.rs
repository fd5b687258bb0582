use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::users::users_errors::UserError;

/// Fixed role enumeration. The role determines both the listing scope and
/// which lifecycle transitions a user may trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Administrator,
    FinancialWorker,
    InternalConsultant,
    InternalEmployee,
    ExternalConsultant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "ADMINISTRATOR",
            Role::FinancialWorker => "FINANCIAL_WORKER",
            Role::InternalConsultant => "INTERNAL_CONSULTANT",
            Role::InternalEmployee => "INTERNAL_EMPLOYEE",
            Role::ExternalConsultant => "EXTERNAL_CONSULTANT",
        }
    }

    pub fn from_str(value: &str) -> Result<Self, UserError> {
        match value {
            "ADMINISTRATOR" => Ok(Role::Administrator),
            "FINANCIAL_WORKER" => Ok(Role::FinancialWorker),
            "INTERNAL_CONSULTANT" => Ok(Role::InternalConsultant),
            "INTERNAL_EMPLOYEE" => Ok(Role::InternalEmployee),
            "EXTERNAL_CONSULTANT" => Ok(Role::ExternalConsultant),
            other => Err(UserError::InvalidData(format!("Unknown role '{}'", other))),
        }
    }
}

/// The authenticated caller as handed over by the identity layer.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub role: Role,
}

#[derive(Queryable, Identifiable, Selectable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserDB {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub deactivated: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Argon2 hash, never serialized out.
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub deactivated: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<UserDB> for User {
    type Error = UserError;

    fn try_from(db: UserDB) -> Result<Self, Self::Error> {
        let role = Role::from_str(&db.role)?;
        Ok(User {
            id: db.id,
            name: db.name,
            email: db.email,
            password: db.password,
            role,
            deactivated: db.deactivated,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUserDB {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub deactivated: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    /// Already hashed by the caller; the core never sees plaintext passwords.
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub deactivated: Option<bool>,
}

#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = crate::schema::users)]
pub struct UserChangesetDB {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub deactivated: Option<bool>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Listing request for the users table. The filter is restricted to a closed
/// set of paths (`name`, `email`, `role`) with `contains`/`equals` matchers.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
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
pub struct UserListResponse {
    pub count: i64,
    pub collection: Vec<User>,
}
