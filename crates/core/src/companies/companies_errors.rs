use diesel::result::Error as DieselError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompanyError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<DieselError> for CompanyError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => CompanyError::NotFound("Record not found".to_string()),
            _ => CompanyError::DatabaseError(err.to_string()),
        }
    }
}
