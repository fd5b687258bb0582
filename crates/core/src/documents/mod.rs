//! Documents module - filesystem-backed storage for uploaded claim PDFs.

pub mod documents_errors;
pub mod documents_store;

pub use documents_errors::DocumentError;
pub use documents_store::{generate_document_key, DocumentStoreTrait, FsDocumentStore};
