use std::sync::Arc;

use chrono::Utc;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use diesel::sqlite::Sqlite;
use uuid::Uuid;

use crate::constants::TAKE_ALL;
use crate::db::{get_connection, DbPool};
use crate::errors::{Result, ValidationError};
use crate::schema::users;
use crate::users::users_errors::UserError;
use crate::users::users_model::{
    NewUser, NewUserDB, User, UserChangesetDB, UserDB, UserListQuery, UserUpdate,
};
use crate::users::users_traits::UserRepositoryTrait;

type UserPredicate = Box<dyn BoxableExpression<users::table, Sqlite, SqlType = Bool>>;

pub struct UserRepository {
    pool: Arc<DbPool>,
}

impl UserRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        UserRepository { pool }
    }
}

impl UserRepositoryTrait for UserRepository {
    fn load_user_by_id(&self, user_id: &str) -> Result<User> {
        let mut conn = get_connection(&self.pool)?;
        let db = users::table
            .find(user_id)
            .select(UserDB::as_select())
            .first::<UserDB>(&mut conn)
            .map_err(UserError::from)?;
        Ok(User::try_from(db).map_err(crate::Error::User)?)
    }

    fn load_user_by_email(&self, user_email: &str) -> Result<Option<User>> {
        let mut conn = get_connection(&self.pool)?;
        let db = users::table
            .filter(users::email.eq(user_email))
            .select(UserDB::as_select())
            .first::<UserDB>(&mut conn)
            .optional()
            .map_err(UserError::from)?;
        db.map(|d| User::try_from(d).map_err(crate::Error::User))
            .transpose()
    }

    fn insert_new_user(&self, new_user: NewUser) -> Result<User> {
        let mut conn = get_connection(&self.pool)?;
        let db = NewUserDB {
            id: Uuid::new_v4().to_string(),
            name: new_user.name,
            email: new_user.email,
            password: new_user.password,
            role: new_user.role.as_str().to_string(),
            deactivated: false,
        };
        let inserted = diesel::insert_into(users::table)
            .values(&db)
            .returning(UserDB::as_returning())
            .get_result::<UserDB>(&mut conn)
            .map_err(UserError::from)?;
        Ok(User::try_from(inserted).map_err(crate::Error::User)?)
    }

    fn update_user(&self, user_id: &str, update: UserUpdate) -> Result<User> {
        let mut conn = get_connection(&self.pool)?;
        let changes = UserChangesetDB {
            name: update.name,
            email: update.email,
            password: update.password,
            role: update.role.map(|r| r.as_str().to_string()),
            deactivated: update.deactivated,
            updated_at: Some(Utc::now().naive_utc()),
        };
        diesel::update(users::table.find(user_id))
            .set(&changes)
            .execute(&mut conn)
            .map_err(UserError::from)?;
        self.load_user_by_id(user_id)
    }

    fn set_password(&self, user_id: &str, password_hash: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        diesel::update(users::table.find(user_id))
            .set((
                users::password.eq(password_hash),
                users::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(&mut conn)
            .map_err(UserError::from)?;
        Ok(())
    }

    fn delete_user(&self, user_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        Ok(diesel::delete(users::table.find(user_id))
            .execute(&mut conn)
            .map_err(UserError::from)?)
    }

    fn list_users(&self, query: &UserListQuery) -> Result<(i64, Vec<User>)> {
        let mut conn = get_connection(&self.pool)?;

        let predicates = parse_filter(&query.filter)?;
        let sort = parse_sort(&query.sort)?;
        let page = query.page.max(1);
        let take = query.take;

        let build = || {
            let mut q = users::table.select(UserDB::as_select()).into_boxed();
            for clause in &predicates {
                q = q.filter(clause.to_expression());
            }
            q
        };

        conn.transaction::<_, crate::Error, _>(|conn| {
            let mut count_q = users::table.into_boxed();
            for clause in &predicates {
                count_q = count_q.filter(clause.to_expression());
            }
            let count = count_q.count().get_result::<i64>(conn)?;

            let mut data_q = build();
            for (field, descending) in &sort {
                data_q = match (field, descending) {
                    (UserField::Name, false) => data_q.then_order_by(users::name.asc()),
                    (UserField::Name, true) => data_q.then_order_by(users::name.desc()),
                    (UserField::Email, false) => data_q.then_order_by(users::email.asc()),
                    (UserField::Email, true) => data_q.then_order_by(users::email.desc()),
                    (UserField::Role, false) => data_q.then_order_by(users::role.asc()),
                    (UserField::Role, true) => data_q.then_order_by(users::role.desc()),
                };
            }
            if sort.is_empty() {
                data_q = data_q.order(users::name.asc());
            }

            if take != TAKE_ALL {
                data_q = data_q.limit(take).offset((page - 1) * take);
            }

            let rows = data_q.load::<UserDB>(conn)?;
            let collection = rows
                .into_iter()
                .map(|db| User::try_from(db).map_err(crate::Error::User))
                .collect::<Result<Vec<_>>>()?;
            Ok((count, collection))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UserField {
    Name,
    Email,
    Role,
}

impl UserField {
    fn from_path(path: &str) -> Result<Self> {
        match path {
            "name" => Ok(UserField::Name),
            "email" => Ok(UserField::Email),
            "role" => Ok(UserField::Role),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown user filter field '{}'",
                other
            ))
            .into()),
        }
    }
}

enum UserClause {
    Contains(UserField, String),
    Equals(UserField, String),
}

impl UserClause {
    fn to_expression(&self) -> UserPredicate {
        match self {
            UserClause::Contains(field, value) => {
                let pattern = format!("%{}%", value);
                match field {
                    UserField::Name => Box::new(users::name.like(pattern)),
                    UserField::Email => Box::new(users::email.like(pattern)),
                    UserField::Role => Box::new(users::role.like(pattern)),
                }
            }
            UserClause::Equals(field, value) => match field {
                UserField::Name => Box::new(users::name.eq(value.clone())),
                UserField::Email => Box::new(users::email.eq(value.clone())),
                UserField::Role => Box::new(users::role.eq(value.clone())),
            },
        }
    }
}

fn parse_filter(filter: &serde_json::Map<String, serde_json::Value>) -> Result<Vec<UserClause>> {
    let mut clauses = Vec::new();
    for (path, matcher) in filter {
        let field = UserField::from_path(path)?;
        let object = matcher.as_object().ok_or_else(|| {
            ValidationError::InvalidInput(format!("Filter for '{}' must be an object", path))
        })?;
        if let Some(value) = object.get("contains").and_then(|v| v.as_str()) {
            clauses.push(UserClause::Contains(field, value.to_string()));
        } else if let Some(value) = object.get("equals").and_then(|v| v.as_str()) {
            clauses.push(UserClause::Equals(field, value.to_string()));
        } else {
            return Err(ValidationError::InvalidInput(format!(
                "Unsupported matcher for user field '{}'",
                path
            ))
            .into());
        }
    }
    Ok(clauses)
}

fn parse_sort(
    sort: &serde_json::Map<String, serde_json::Value>,
) -> Result<Vec<(UserField, bool)>> {
    let mut clauses = Vec::new();
    for (path, direction) in sort {
        let field = UserField::from_path(path)?;
        let descending = match direction.as_str() {
            Some("asc") => false,
            Some("desc") => true,
            _ => {
                return Err(ValidationError::InvalidInput(format!(
                    "Sort direction for '{}' must be \"asc\" or \"desc\"",
                    path
                ))
                .into())
            }
        };
        clauses.push((field, descending));
    }
    Ok(clauses)
}
