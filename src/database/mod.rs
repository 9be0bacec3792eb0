pub mod diff;
pub mod manager;
pub mod models;
pub mod query_builder;

pub use diff::{compute_diff, ChangeType, FieldChange};
pub use manager::{DatabaseError, DatabaseManager};
pub use query_builder::QueryBuilder;
