pub mod db;

pub mod companies;
pub mod documents;
pub mod expenses;
pub mod notifications;
pub mod users;

pub mod constants;
pub mod errors;
pub mod schema;

pub use errors::{Error, Result};
