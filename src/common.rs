pub mod error;
pub mod format;
pub mod notify;

pub use error::{AppError, FieldErrors, StoreError};
pub use notify::{Notification, Notifier};
