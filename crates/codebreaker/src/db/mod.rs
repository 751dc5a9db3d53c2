//! SQLite persistence for completed levels.

mod error;
mod models;
mod repository;
mod schema;

pub use error::{DbError, DbErrorKind};
pub use models::{CompletedLevel, NewCompletedLevel};
pub use repository::ProgressRepository;
