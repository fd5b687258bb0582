use diesel::result::Error as DieselError;
use thiserror::Error;

use crate::companies::CompanyError;
use crate::documents::DocumentError;
use crate::expenses::ExpenseError;
use crate::notifications::NotificationError;
use crate::users::UserError;

// Create a type alias for Result using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the portal application
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Expense error: {0}")]
    Expense(#[from] ExpenseError),

    #[error("User error: {0}")]
    User(#[from] UserError),

    #[error("Company error: {0}")]
    Company(#[from] CompanyError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(#[from] diesel::result::ConnectionError),

    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(#[from] r2d2::Error),

    #[error("Database query failed: {0}")]
    QueryFailed(DieselError),

    #[error("Database migration failed: {0}")]
    MigrationFailed(String),
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

impl From<DieselError> for Error {
    fn from(err: DieselError) -> Self {
        Error::Database(DatabaseError::QueryFailed(err))
    }
}

impl From<diesel::r2d2::PoolError> for Error {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        Error::Database(DatabaseError::PoolCreationFailed(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Document(DocumentError::Io(err))
    }
}
