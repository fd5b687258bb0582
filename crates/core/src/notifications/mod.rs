//! Notifications module - best-effort handler mail, dispatched after commit.

pub mod notifications_errors;
pub mod notifications_model;
pub mod notifications_service;
pub mod notifications_traits;

pub use notifications_errors::NotificationError;
pub use notifications_model::EmailMessage;
pub use notifications_service::{HttpMailRelay, NoopNotifier, NotificationDispatcher};
pub use notifications_traits::NotifierTrait;
